use serde::{Deserialize, Serialize};

/// Canonical news item.
///
/// `title` and `content` are never both empty once normalized; a missing one
/// is filled from the other.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsRecord {
    /// Publication time as reported by the provider
    pub time: String,
    pub title: String,
    pub content: String,
}

impl NewsRecord {
    pub fn new(
        time: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            time: time.into(),
            title: title.into(),
            content: content.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.content.trim().is_empty()
    }
}
