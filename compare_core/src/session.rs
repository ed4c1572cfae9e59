//! # Comparison Sessions
//!
//! A named record of which images were being compared. Sessions live in
//! memory only; hosts that want to keep one can serialize it themselves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named set of compared image ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSession {
    pub id: Uuid,
    pub name: String,
    pub image_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ComparisonSession {
    pub fn new(name: impl Into<String>, image_ids: Vec<String>) -> Self {
        let now = Utc::now();
        ComparisonSession {
            id: Uuid::new_v4(),
            name: name.into(),
            image_ids,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the image ids and bump `updated_at`.
    pub fn set_image_ids(&mut self, image_ids: Vec<String>) {
        self.image_ids = image_ids;
        self.touch();
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_creation() {
        let session = ComparisonSession::new("Lighting pass", vec!["A".to_string(), "B".to_string()]);
        assert_eq!(session.name, "Lighting pass");
        assert_eq!(session.image_ids.len(), 2);
        assert_eq!(session.created_at, session.updated_at);
    }

    #[test]
    fn test_set_image_ids_touches() {
        let mut session = ComparisonSession::new("s", Vec::new());
        let created = session.created_at;
        session.set_image_ids(vec!["C".to_string()]);
        assert_eq!(session.image_ids, vec!["C"]);
        assert!(session.updated_at >= created);
    }

    #[test]
    fn test_session_serialization() {
        let session = ComparisonSession::new("s", vec!["A".to_string()]);
        let json = serde_json::to_string(&session).unwrap();
        assert!(json.contains("imageIds"));
        assert!(json.contains("createdAt"));
        let roundtrip: ComparisonSession = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, session);
    }
}
