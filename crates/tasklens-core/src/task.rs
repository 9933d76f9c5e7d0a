use crate::{Priority, Result, TaskId, TaskLensError, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: Option<Timestamp>,
    pub completed: bool,
    pub created_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub ai_suggested: bool,
    pub context_based: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_deadline: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enhanced_description: Option<String>,
    pub tags: Vec<String>,
}

impl Task {
    /// Materialize a create payload. The payload must already be validated.
    pub fn from_new(new: NewTask, created_at: Timestamp) -> Self {
        Self {
            id: TaskId::new_v4(),
            title: new.title,
            description: new.description,
            priority: new.priority,
            due_date: new.due_date,
            completed: false,
            created_at,
            category: new.category,
            ai_suggested: new.ai_suggested,
            context_based: new.context_based,
            priority_score: new.priority_score,
            suggested_deadline: new.suggested_deadline,
            enhanced_description: new.enhanced_description,
            tags: new.tags,
        }
    }

    pub fn is_overdue(&self, now: Timestamp) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < now)
    }

    pub fn is_due_on_day_of(&self, now: Timestamp) -> bool {
        self.due_date
            .is_some_and(|due| due.date_naive() == now.date_naive())
    }

    pub fn title_contains_any(&self, needles: &[&str]) -> bool {
        let title = self.title.to_lowercase();
        needles.iter().any(|needle| title.contains(needle))
    }
}

/// Body of `POST /tasks`. Suggestions serialize to a subset of this shape,
/// so a client accepts one by posting it back unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<Timestamp>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub ai_suggested: bool,
    #[serde(default)]
    pub context_based: bool,
    #[serde(default)]
    pub priority_score: Option<f64>,
    #[serde(default)]
    pub suggested_deadline: Option<Timestamp>,
    #[serde(default)]
    pub enhanced_description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_due_date(mut self, due_date: Timestamp) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_title(&self.title)
    }
}

/// Body of `PUT /tasks/{id}`. Absent fields are left untouched; nullable
/// fields distinguish "absent" from an explicit `null` that clears them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "nullable")]
    pub due_date: Option<Option<Timestamp>>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub category: Option<Option<String>>,
    #[serde(default)]
    pub ai_suggested: Option<bool>,
    #[serde(default)]
    pub context_based: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub priority_score: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub suggested_deadline: Option<Option<Timestamp>>,
    #[serde(default, deserialize_with = "nullable")]
    pub enhanced_description: Option<Option<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl TaskPatch {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    /// Apply onto `task`. Nothing is written when validation fails.
    pub fn apply(self, task: &mut Task) -> Result<()> {
        if let Some(ref title) = self.title {
            validate_title(title)?;
        }

        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(category) = self.category {
            task.category = category;
        }
        if let Some(ai_suggested) = self.ai_suggested {
            task.ai_suggested = ai_suggested;
        }
        if let Some(context_based) = self.context_based {
            task.context_based = context_based;
        }
        if let Some(priority_score) = self.priority_score {
            task.priority_score = priority_score;
        }
        if let Some(suggested_deadline) = self.suggested_deadline {
            task.suggested_deadline = suggested_deadline;
        }
        if let Some(enhanced_description) = self.enhanced_description {
            task.enhanced_description = enhanced_description;
        }
        if let Some(tags) = self.tags {
            task.tags = tags;
        }
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(TaskLensError::Validation("title must not be empty".into()));
    }
    Ok(())
}

/// Maps a present-but-null field to `Some(None)`; absence stays `None` via `default`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn sample() -> Task {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        Task::from_new(
            NewTask::titled("Write report")
                .with_priority(Priority::High)
                .with_category("Work"),
            created,
        )
    }

    #[test]
    fn new_task_defaults_from_minimal_json() {
        let new: NewTask = serde_json::from_str(r#"{"title":"Buy milk"}"#).unwrap();
        assert_eq!(new.priority, Priority::Medium);
        assert_eq!(new.description, "");
        assert!(new.due_date.is_none());
        assert!(new.tags.is_empty());
        assert!(!new.ai_suggested);
    }

    #[test]
    fn blank_title_is_rejected() {
        assert!(NewTask::titled("   ").validate().is_err());
        assert!(NewTask::titled("ok").validate().is_ok());
    }

    #[test]
    fn serializes_camel_case() {
        let value = serde_json::to_value(sample()).unwrap();
        assert!(value.get("createdAt").is_some());
        assert!(value.get("aiSuggested").is_some());
        assert_eq!(value["dueDate"], serde_json::Value::Null);
        assert_eq!(value["category"], "Work");
        assert!(value.get("priorityScore").is_none());
    }

    #[test]
    fn patch_leaves_absent_fields_and_clears_null_ones() {
        let mut task = sample();
        task.due_date = Some(task.created_at + Duration::days(1));

        let patch: TaskPatch =
            serde_json::from_str(r#"{"completed":true,"category":null}"#).unwrap();
        patch.apply(&mut task).unwrap();

        assert!(task.completed);
        assert!(task.category.is_none());
        assert!(task.due_date.is_some());
        assert_eq!(task.title, "Write report");
    }

    #[test]
    fn patch_cannot_touch_identity() {
        let mut task = sample();
        let (id, created) = (task.id, task.created_at);
        let patch: TaskPatch = serde_json::from_str(
            r#"{"id":"00000000-0000-0000-0000-000000000000","createdAt":"2000-01-01T00:00:00Z","title":"Renamed"}"#,
        )
        .unwrap();
        patch.apply(&mut task).unwrap();
        assert_eq!(task.id, id);
        assert_eq!(task.created_at, created);
        assert_eq!(task.title, "Renamed");
    }

    #[test]
    fn failed_patch_writes_nothing() {
        let mut task = sample();
        let patch = TaskPatch {
            title: Some(String::new()),
            completed: Some(true),
            ..TaskPatch::default()
        };
        assert!(patch.apply(&mut task).is_err());
        assert!(!task.completed);
    }

    #[test]
    fn overdue_ignores_completed_tasks() {
        let mut task = sample();
        let now = task.created_at + Duration::days(3);
        task.due_date = Some(task.created_at + Duration::days(1));
        assert!(task.is_overdue(now));
        task.completed = true;
        assert!(!task.is_overdue(now));
    }
}
