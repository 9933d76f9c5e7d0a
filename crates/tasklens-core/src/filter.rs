use crate::{Priority, Task, Timestamp};
use serde::{Deserialize, Deserializer};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DueFilter {
    #[default]
    All,
    Overdue,
    Today,
    Upcoming,
}

/// Task list filter. Every condition must hold; defaults match everything.
///
/// Deserializes from the query string of `GET /tasks`, where `all` stands
/// for "no constraint" on `priority` and `category`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFilter {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default, deserialize_with = "all_or_priority")]
    pub priority: Option<Priority>,
    #[serde(default, alias = "dueDateFilter")]
    pub due: DueFilter,
    #[serde(default, deserialize_with = "all_or_value")]
    pub category: Option<String>,
    #[serde(default)]
    pub ai_suggested: bool,
}

impl TaskFilter {
    pub fn is_active(&self) -> bool {
        !self.search.is_empty()
            || self.status != StatusFilter::All
            || self.priority.is_some()
            || self.due != DueFilter::All
            || self.category.is_some()
            || self.ai_suggested
    }

    pub fn matches(&self, task: &Task, now: Timestamp) -> bool {
        self.matches_search(task)
            && self.matches_status(task)
            && self.priority.map_or(true, |p| task.priority == p)
            && self.matches_due(task, now)
            && self
                .category
                .as_ref()
                .map_or(true, |c| task.category.as_ref() == Some(c))
            && (!self.ai_suggested || task.ai_suggested)
    }

    pub fn apply(&self, tasks: Vec<Task>, now: Timestamp) -> Vec<Task> {
        tasks.into_iter().filter(|t| self.matches(t, now)).collect()
    }

    fn matches_search(&self, task: &Task) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        task.title.to_lowercase().contains(&needle)
            || task.description.to_lowercase().contains(&needle)
    }

    fn matches_status(&self, task: &Task) -> bool {
        match self.status {
            StatusFilter::All => true,
            StatusFilter::Completed => task.completed,
            StatusFilter::Pending => !task.completed,
        }
    }

    fn matches_due(&self, task: &Task, now: Timestamp) -> bool {
        match self.due {
            DueFilter::All => true,
            DueFilter::Overdue => task.is_overdue(now),
            DueFilter::Today => task.is_due_on_day_of(now),
            DueFilter::Upcoming => task.due_date.is_some_and(|due| due > now),
        }
    }
}

/// Display order: open tasks first, then priority (high first), then
/// earliest due date with undated tasks last, then newest created.
pub fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| b.priority.rank().cmp(&a.priority.rank()))
        .then_with(|| match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| b.created_at.cmp(&a.created_at))
}

pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by(compare_tasks);
}

fn all_or_value<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all")))
}

fn all_or_priority<'de, D>(deserializer: D) -> Result<Option<Priority>, D::Error>
where
    D: Deserializer<'de>,
{
    all_or_value(deserializer)?
        .map(|v| v.parse().map_err(serde::de::Error::custom))
        .transpose()
}
