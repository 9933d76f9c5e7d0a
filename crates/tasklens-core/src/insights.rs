use crate::{ContextEntry, Priority, Task, Timestamp};
use chrono::Duration;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriorityBreakdown {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// Whole percent, rounded half away from zero.
    pub completion_rate: u32,
    pub overdue: usize,
    pub by_priority: PriorityBreakdown,
}

impl TaskStats {
    pub fn compute(tasks: &[Task], now: Timestamp) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.completed).count();
        let completion_rate = if total == 0 {
            0
        } else {
            (completed as f64 / total as f64 * 100.0).round() as u32
        };

        let mut by_priority = PriorityBreakdown::default();
        for task in tasks {
            match task.priority {
                Priority::High => by_priority.high += 1,
                Priority::Medium => by_priority.medium += 1,
                Priority::Low => by_priority.low += 1,
            }
        }

        Self {
            total,
            completed,
            pending: total - completed,
            completion_rate,
            overdue: tasks.iter().filter(|t| t.is_overdue(now)).count(),
            by_priority,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Productivity,
    Priority,
    Deadline,
    Today,
    Context,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightTone {
    Positive,
    Neutral,
    Negative,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub message: String,
    pub tone: InsightTone,
}

impl Insight {
    fn new(kind: InsightKind, tone: InsightTone, message: String) -> Self {
        Self {
            kind,
            message,
            tone,
        }
    }
}

const PENDING_HIGH_PRIORITY_LIMIT: usize = 5;
const RECENT_CONTEXT_DAYS: i64 = 7;

/// Dashboard messages derived from task and context counts.
pub fn dashboard_insights(
    tasks: &[Task],
    contexts: &[ContextEntry],
    now: Timestamp,
) -> Vec<Insight> {
    let mut insights = Vec::new();
    let pending: Vec<&Task> = tasks.iter().filter(|t| !t.completed).collect();
    let completed = tasks.len() - pending.len();

    if completed > 0 {
        let rate = completed as f64 / tasks.len() as f64 * 100.0;
        let tone = if rate > 70.0 {
            InsightTone::Positive
        } else if rate > 40.0 {
            InsightTone::Neutral
        } else {
            InsightTone::Negative
        };
        insights.push(Insight::new(
            InsightKind::Productivity,
            tone,
            format!("You have a {:.1}% task completion rate", rate),
        ));
    }

    let high = pending
        .iter()
        .filter(|t| t.priority == Priority::High)
        .count();
    if high > PENDING_HIGH_PRIORITY_LIMIT {
        insights.push(Insight::new(
            InsightKind::Priority,
            InsightTone::Warning,
            format!(
                "You have {} high-priority tasks. Consider breaking them down.",
                high
            ),
        ));
    }

    let overdue = pending.iter().filter(|t| t.is_overdue(now)).count();
    if overdue > 0 {
        insights.push(Insight::new(
            InsightKind::Deadline,
            InsightTone::Negative,
            format!(
                "{} tasks are overdue. Review and reschedule if needed.",
                overdue
            ),
        ));
    }

    let due_today = pending.iter().filter(|t| t.is_due_on_day_of(now)).count();
    if due_today > 0 {
        insights.push(Insight::new(
            InsightKind::Today,
            InsightTone::Warning,
            format!(
                "{} tasks are due today. Focus on completing these first.",
                due_today
            ),
        ));
    }

    let window = Duration::days(RECENT_CONTEXT_DAYS);
    let recent = contexts
        .iter()
        .filter(|c| now - c.timestamp < window)
        .count();
    if recent > 0 {
        insights.push(Insight::new(
            InsightKind::Context,
            InsightTone::Positive,
            format!(
                "{} context entries this week. AI can suggest relevant tasks.",
                recent
            ),
        ));
    }

    insights
}
