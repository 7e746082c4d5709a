use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coaching persona that drives a conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagerType {
    #[default]
    CareerCoach,
    ExecutiveCoach,
    LifeCoach,
    WellnessCoach,
}

impl ManagerType {
    pub const ALL: [ManagerType; 4] = [
        ManagerType::CareerCoach,
        ManagerType::ExecutiveCoach,
        ManagerType::LifeCoach,
        ManagerType::WellnessCoach,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ManagerType::CareerCoach => "career_coach",
            ManagerType::ExecutiveCoach => "executive_coach",
            ManagerType::LifeCoach => "life_coach",
            ManagerType::WellnessCoach => "wellness_coach",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ManagerType::CareerCoach => "Career Coach",
            ManagerType::ExecutiveCoach => "Executive Coach",
            ManagerType::LifeCoach => "Life Coach",
            ManagerType::WellnessCoach => "Wellness Coach",
        }
    }
}

impl fmt::Display for ManagerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ManagerType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        ManagerType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| {
                let known: Vec<&str> = ManagerType::ALL.iter().map(|k| k.as_str()).collect();
                format!(
                    "unknown manager type '{value}' (expected one of: {})",
                    known.join(", ")
                )
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub conversation_id: String,
    pub user_id: String,
    pub manager_type: ManagerType,
    pub created_at: DateTime<Utc>,
    /// Set when the conversation was created during this session.
    #[serde(skip)]
    pub is_new: bool,
    #[serde(skip)]
    pub is_loading: bool,
}

impl Conversation {
    pub fn mark_new(mut self) -> Self {
        self.is_new = true;
        self.is_loading = false;
        self
    }

    /// Short label used in title bars and listings.
    pub fn label(&self) -> String {
        format!(
            "{} · {}",
            self.manager_type.display_name(),
            self.created_at.format("%Y-%m-%d %H:%M")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manager_type_parses_loose_spellings() {
        assert_eq!(
            "career-coach".parse::<ManagerType>(),
            Ok(ManagerType::CareerCoach)
        );
        assert_eq!(
            "Life Coach".parse::<ManagerType>(),
            Ok(ManagerType::LifeCoach)
        );
        assert!("therapist".parse::<ManagerType>().is_err());
    }

    #[test]
    fn manager_type_uses_snake_case_on_the_wire() {
        let json = serde_json::to_string(&ManagerType::ExecutiveCoach).unwrap();
        assert_eq!(json, "\"executive_coach\"");
    }

    #[test]
    fn conversation_transient_flags_default_off() {
        let conversation: Conversation = serde_json::from_str(
            r#"{
                "conversation_id": "c1",
                "user_id": "u1",
                "manager_type": "wellness_coach",
                "created_at": "2024-05-01T10:00:00Z"
            }"#,
        )
        .unwrap();
        assert!(!conversation.is_new);
        assert!(!conversation.is_loading);
        assert!(conversation.clone().mark_new().is_new);
    }
}
