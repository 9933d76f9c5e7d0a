use crate::task::nullable;
use crate::{ContextId, ContextSource, Result, TaskLensError, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextEntry {
    pub id: ContextId,
    pub content: String,
    pub source: ContextSource,
    pub timestamp: Timestamp,
    pub processed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<String>,
}

impl ContextEntry {
    pub fn from_new(new: NewContextEntry, timestamp: Timestamp) -> Self {
        Self {
            id: ContextId::new_v4(),
            content: new.content,
            source: new.source,
            timestamp,
            processed: false,
            insights: new.insights,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContextEntry {
    pub content: String,
    #[serde(default)]
    pub source: ContextSource,
    #[serde(default)]
    pub insights: Option<String>,
}

impl NewContextEntry {
    pub fn new(content: impl Into<String>, source: ContextSource) -> Self {
        Self {
            content: content.into(),
            source,
            insights: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_content(&self.content)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextPatch {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub source: Option<ContextSource>,
    #[serde(default)]
    pub processed: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub insights: Option<Option<String>>,
}

impl ContextPatch {
    pub fn apply(self, entry: &mut ContextEntry) -> Result<()> {
        if let Some(ref content) = self.content {
            validate_content(content)?;
        }

        if let Some(content) = self.content {
            entry.content = content;
        }
        if let Some(source) = self.source {
            entry.source = source;
        }
        if let Some(processed) = self.processed {
            entry.processed = processed;
        }
        if let Some(insights) = self.insights {
            entry.insights = insights;
        }
        Ok(())
    }
}

fn validate_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(TaskLensError::Validation("content must not be empty".into()));
    }
    Ok(())
}
