use crate::{
    ContextEntry, ContextId, ContextPatch, NewContextEntry, NewTask, RecordKind, Result, Task,
    TaskId, TaskLensError, TaskPatch,
};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// All tasks, newest first.
    async fn list(&self) -> Result<Vec<Task>>;
    async fn get(&self, id: TaskId) -> Result<Option<Task>>;
    async fn create(&self, new: NewTask) -> Result<Task>;
    async fn update(&self, id: TaskId, patch: TaskPatch) -> Result<Task>;
    /// Removes the task and hands it back.
    async fn delete(&self, id: TaskId) -> Result<Task>;
    async fn count(&self) -> Result<usize>;
}

#[async_trait]
pub trait ContextStore: Send + Sync {
    /// All entries, newest first.
    async fn list(&self) -> Result<Vec<ContextEntry>>;
    async fn get(&self, id: ContextId) -> Result<Option<ContextEntry>>;
    async fn create(&self, new: NewContextEntry) -> Result<ContextEntry>;
    async fn update(&self, id: ContextId, patch: ContextPatch) -> Result<ContextEntry>;
    async fn delete(&self, id: ContextId) -> Result<ContextEntry>;
    async fn mark_processed(&self, id: ContextId, insights: String) -> Result<ContextEntry>;
    async fn count(&self) -> Result<usize>;
}

trait Record: Clone {
    const KIND: RecordKind;
    fn id(&self) -> Uuid;
}

impl Record for Task {
    const KIND: RecordKind = RecordKind::Task;
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for ContextEntry {
    const KIND: RecordKind = RecordKind::ContextEntry;
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Newest-first vector shared by both memory stores.
struct Records<T> {
    items: RwLock<Vec<T>>,
}

impl<T: Record> Records<T> {
    fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
        }
    }

    fn snapshot(&self) -> Vec<T> {
        self.items.read().clone()
    }

    fn get(&self, id: Uuid) -> Option<T> {
        self.items.read().iter().find(|r| r.id() == id).cloned()
    }

    fn push_front(&self, record: T) -> T {
        self.items.write().insert(0, record.clone());
        record
    }

    fn modify<F>(&self, id: Uuid, f: F) -> Result<T>
    where
        F: FnOnce(&mut T) -> Result<()>,
    {
        let mut items = self.items.write();
        let Some(slot) = items.iter_mut().find(|r| r.id() == id) else {
            warn!(id = %id, "{} not found for update", T::KIND);
            return Err(TaskLensError::NotFound(T::KIND));
        };
        // Work on a copy so a rejected change leaves the stored record intact.
        let mut updated = slot.clone();
        f(&mut updated)?;
        *slot = updated.clone();
        Ok(updated)
    }

    fn remove(&self, id: Uuid) -> Result<T> {
        let mut items = self.items.write();
        let idx = items
            .iter()
            .position(|r| r.id() == id)
            .ok_or(TaskLensError::NotFound(T::KIND))?;
        Ok(items.remove(idx))
    }

    fn len(&self) -> usize {
        self.items.read().len()
    }
}

pub struct MemoryTaskStore {
    records: Records<Task>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self {
            records: Records::new(),
        }
    }
}

impl Default for MemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn list(&self) -> Result<Vec<Task>> {
        Ok(self.records.snapshot())
    }

    async fn get(&self, id: TaskId) -> Result<Option<Task>> {
        Ok(self.records.get(id))
    }

    async fn create(&self, new: NewTask) -> Result<Task> {
        new.validate()?;
        let task = Task::from_new(new, Utc::now());
        debug!(id = %task.id, priority = %task.priority, "task created");
        Ok(self.records.push_front(task))
    }

    async fn update(&self, id: TaskId, patch: TaskPatch) -> Result<Task> {
        self.records.modify(id, |task| patch.apply(task))
    }

    async fn delete(&self, id: TaskId) -> Result<Task> {
        self.records.remove(id)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.len())
    }
}

pub struct MemoryContextStore {
    records: Records<ContextEntry>,
}

impl MemoryContextStore {
    pub fn new() -> Self {
        Self {
            records: Records::new(),
        }
    }
}

impl Default for MemoryContextStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContextStore for MemoryContextStore {
    async fn list(&self) -> Result<Vec<ContextEntry>> {
        Ok(self.records.snapshot())
    }

    async fn get(&self, id: ContextId) -> Result<Option<ContextEntry>> {
        Ok(self.records.get(id))
    }

    async fn create(&self, new: NewContextEntry) -> Result<ContextEntry> {
        new.validate()?;
        let entry = ContextEntry::from_new(new, Utc::now());
        debug!(id = %entry.id, source = %entry.source, "context entry created");
        Ok(self.records.push_front(entry))
    }

    async fn update(&self, id: ContextId, patch: ContextPatch) -> Result<ContextEntry> {
        self.records.modify(id, |entry| patch.apply(entry))
    }

    async fn delete(&self, id: ContextId) -> Result<ContextEntry> {
        self.records.remove(id)
    }

    async fn mark_processed(&self, id: ContextId, insights: String) -> Result<ContextEntry> {
        self.records.modify(id, |entry| {
            entry.processed = true;
            entry.insights = Some(insights);
            Ok(())
        })
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.len())
    }
}
