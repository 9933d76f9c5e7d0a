//! Rule-based task suggestions.
//!
//! Two fixed rule sets: one scans free-text context notes for keywords, the
//! other looks for gaps in the current task list. Rules run in declaration
//! order and the output is truncated to the configured limits.

use crate::{Priority, SuggestionConfig, Task, Timestamp};
use chrono::{Datelike, Duration};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A canned task template. Posting one to `/tasks` turns it into a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: Timestamp,
    pub category: String,
    pub tags: Vec<String>,
    pub ai_suggested: bool,
    pub context_based: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextAnalysis {
    pub suggested_tasks: Vec<Suggestion>,
    /// Insight lines joined with `". "`.
    pub insights: String,
}

struct Template {
    title: &'static str,
    description: &'static str,
    priority: Priority,
    category: &'static str,
    tags: [&'static str; 2],
}

impl Template {
    fn at(&self, due_date: Timestamp) -> Suggestion {
        Suggestion {
            title: self.title.to_string(),
            description: self.description.to_string(),
            priority: self.priority,
            due_date,
            category: self.category.to_string(),
            tags: self.tags.iter().map(|t| t.to_string()).collect(),
            ai_suggested: false,
            context_based: false,
        }
    }
}

struct ContextRule {
    keywords: &'static [&'static str],
    due_in_days: i64,
    template: Template,
}

const CONTEXT_RULES: &[ContextRule] = &[
    ContextRule {
        keywords: &["meeting", "call", "conference"],
        due_in_days: 1,
        template: Template {
            title: "Prepare for upcoming meeting",
            description: "Review agenda and prepare materials for the meeting mentioned in context",
            priority: Priority::High,
            category: "Work",
            tags: ["meeting", "preparation"],
        },
    },
    ContextRule {
        keywords: &["follow up", "follow-up", "remind"],
        due_in_days: 2,
        template: Template {
            title: "Follow up on discussion",
            description: "Send follow-up message or email based on the conversation context",
            priority: Priority::Medium,
            category: "Work",
            tags: ["follow-up", "communication"],
        },
    },
    ContextRule {
        keywords: &["buy", "purchase", "order"],
        due_in_days: 3,
        template: Template {
            title: "Purchase items mentioned",
            description: "Buy the items or services discussed in the context",
            priority: Priority::Medium,
            category: "Personal",
            tags: ["shopping", "purchase"],
        },
    },
    ContextRule {
        keywords: &["doctor", "appointment", "health"],
        due_in_days: 1,
        template: Template {
            title: "Schedule health appointment",
            description: "Book or follow up on health-related appointments mentioned",
            priority: Priority::High,
            category: "Health",
            tags: ["health", "appointment"],
        },
    },
    ContextRule {
        keywords: &["learn", "research", "study"],
        due_in_days: 5,
        template: Template {
            title: "Research mentioned topic",
            description: "Look into the topic or subject mentioned in the context",
            priority: Priority::Low,
            category: "Learning",
            tags: ["research", "learning"],
        },
    },
];

const CONTEXT_FALLBACK: Template = Template {
    title: "Review context and take action",
    description: "Review the provided context and determine what actions need to be taken",
    priority: Priority::Medium,
    category: "Planning",
    tags: ["review", "planning"],
};

// "by " keeps its trailing space so words like "baby" or "nearby" do not count.
const INSIGHT_RULES: &[(&[&str], &str)] = &[
    (
        &["urgent", "asap", "immediately"],
        "⚡ Urgent action items detected - prioritize these tasks",
    ),
    (
        &["deadline", "due date", "by "],
        "📅 Time-sensitive items found - check for specific deadlines",
    ),
    (
        &["meeting", "call"],
        "🤝 Communication activities identified - prepare accordingly",
    ),
    (
        &["project", "work"],
        "💼 Work-related content detected - consider task dependencies",
    ),
];

const INSIGHT_FALLBACK: &str =
    "🔍 Context analyzed - consider breaking down complex activities into smaller tasks";

const EXERCISE: Template = Template {
    title: "Daily Exercise",
    description: "Schedule 30 minutes of physical activity to maintain health and productivity",
    priority: Priority::Medium,
    category: "Health",
    tags: ["health", "routine"],
};

const REVIEW_PRIORITIES: Template = Template {
    title: "Review Task Priorities",
    description:
        "Reassess high-priority tasks and delegate or reschedule some to maintain balance",
    priority: Priority::Medium,
    category: "Planning",
    tags: ["planning", "balance"],
};

const LEARN: Template = Template {
    title: "Learn Something New",
    description: "Dedicate time to learning a new skill or improving existing knowledge",
    priority: Priority::Low,
    category: "Learning",
    tags: ["learning", "development"],
};

const WEEKLY_PLANNING: Template = Template {
    title: "Weekly Planning Session",
    description: "Review completed tasks and plan for the upcoming week",
    priority: Priority::High,
    category: "Planning",
    tags: ["planning", "productivity"],
};

const CONNECT: Template = Template {
    title: "Connect with Friends/Family",
    description: "Reach out to someone important and maintain social connections",
    priority: Priority::Medium,
    category: "Personal",
    tags: ["social", "relationships"],
};

const ORGANIZE: Template = Template {
    title: "Organize Workspace",
    description: "Clean and organize your work environment for better productivity",
    priority: Priority::Low,
    category: "Personal",
    tags: ["organization", "productivity"],
};

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Applies both rule sets with limits taken from configuration.
#[derive(Debug, Clone, Default)]
pub struct SuggestionEngine {
    config: SuggestionConfig,
}

impl SuggestionEngine {
    pub fn new(config: SuggestionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SuggestionConfig {
        &self.config
    }

    pub fn from_context(&self, text: &str, now: Timestamp) -> ContextAnalysis {
        let content = text.to_lowercase();

        let mut suggested_tasks: Vec<Suggestion> = CONTEXT_RULES
            .iter()
            .filter(|rule| contains_any(&content, rule.keywords))
            .map(|rule| rule.template.at(now + Duration::days(rule.due_in_days)))
            .collect();
        if suggested_tasks.is_empty() {
            suggested_tasks.push(CONTEXT_FALLBACK.at(now + Duration::days(1)));
        }
        for suggestion in &mut suggested_tasks {
            suggestion.context_based = true;
        }
        suggested_tasks.truncate(self.config.context_limit);

        let insights = context_insights(&content).join(". ");
        debug!(
            suggestions = suggested_tasks.len(),
            "analyzed context entry"
        );

        ContextAnalysis {
            suggested_tasks,
            insights,
        }
    }

    pub fn from_task_list(&self, tasks: &[Task], now: Timestamp) -> Vec<Suggestion> {
        let none_titled = |needles: &[&str]| !tasks.iter().any(|t| t.title_contains_any(needles));
        let high_priority = tasks
            .iter()
            .filter(|t| t.priority == Priority::High)
            .count();
        let days = |n: i64| now + Duration::days(n);

        let mut suggestions = Vec::new();
        if none_titled(&["exercise", "workout"]) {
            suggestions.push(EXERCISE.at(days(1)));
        }
        if high_priority > self.config.high_priority_threshold {
            suggestions.push(REVIEW_PRIORITIES.at(now));
        }
        if none_titled(&["learn", "study"]) {
            suggestions.push(LEARN.at(days(3)));
        }
        if none_titled(&["plan", "review"]) {
            suggestions.push(WEEKLY_PLANNING.at(end_of_week(now)));
        }
        if none_titled(&["call", "meet"]) {
            suggestions.push(CONNECT.at(days(2)));
        }
        if none_titled(&["clean", "organize"]) {
            suggestions.push(ORGANIZE.at(days(1)));
        }

        for suggestion in &mut suggestions {
            suggestion.ai_suggested = true;
        }
        suggestions.truncate(self.config.task_list_limit);
        debug!(
            tasks = tasks.len(),
            suggestions = suggestions.len(),
            "generated task list suggestions"
        );
        suggestions
    }
}

/// Insight lines for already-lowercased content, fallback included.
pub fn context_insights(content: &str) -> Vec<&'static str> {
    let mut lines: Vec<&'static str> = INSIGHT_RULES
        .iter()
        .filter(|(keywords, _)| contains_any(content, keywords))
        .map(|(_, line)| *line)
        .collect();
    if lines.is_empty() {
        lines.push(INSIGHT_FALLBACK);
    }
    lines
}

/// The coming Sunday; a full week ahead when `now` is already Sunday.
pub fn end_of_week(now: Timestamp) -> Timestamp {
    let remaining = 7 - i64::from(now.weekday().num_days_from_sunday());
    now + Duration::days(remaining)
}

pub fn suggest_tasks_from_context(text: &str, now: Timestamp) -> ContextAnalysis {
    SuggestionEngine::default().from_context(text, now)
}

pub fn suggest_tasks_from_task_list(tasks: &[Task], now: Timestamp) -> Vec<Suggestion> {
    SuggestionEngine::default().from_task_list(tasks, now)
}
