//! Member profile records

use crate::identifiers::UserId;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// How a member prefers to be contacted after connecting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactPreference {
    /// Reachable by email
    #[default]
    Email,
    /// Reachable via LinkedIn
    Linkedin,
    /// Either channel works
    Both,
}

/// A member's profile, 1:1 with the account.
///
/// Absence of a profile is meaningful: a member without one is treated as
/// onboarding-incomplete and never appears in browse results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// The account this profile belongs to
    pub user_id: UserId,
    /// Current role
    pub job_title: Option<String>,
    /// Current employer
    pub company: Option<String>,
    /// Free-text introduction
    pub bio: Option<String>,
    /// City or region
    pub location: Option<String>,
    /// LinkedIn profile URL
    pub linkedin_url: Option<String>,
    /// Years of professional experience
    pub years_experience: Option<u32>,
    /// Skill tags
    pub skills: Vec<String>,
    /// Interest tags
    pub interests: Vec<String>,
    /// Whether the member accepts connection requests
    pub is_open_for_connection: bool,
    /// Preferred contact channel once connected
    pub contact_preferences: ContactPreference,
    /// When the profile was created
    pub created_at: Timestamp,
    /// Last edit time
    pub updated_at: Timestamp,
}

impl ProfileRecord {
    /// Key prefix for profile records
    pub const KEY_PREFIX: &'static str = "profile:";

    /// Storage key for a member's profile
    pub fn key(user_id: UserId) -> String {
        format!("{}{}", Self::KEY_PREFIX, user_id.uuid())
    }

    /// Storage key for this record
    pub fn storage_key(&self) -> String {
        Self::key(self.user_id)
    }

    /// Case-insensitive match against any searchable text field.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        let hit = |field: &Option<String>| {
            field
                .as_deref()
                .is_some_and(|v| v.to_lowercase().contains(&needle))
        };
        hit(&self.job_title)
            || hit(&self.company)
            || hit(&self.bio)
            || self
                .skills
                .iter()
                .chain(self.interests.iter())
                .any(|tag| tag.to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn profile() -> ProfileRecord {
        ProfileRecord {
            user_id: UserId::from_uuid(Uuid::from_u128(1)),
            job_title: Some("Platform Engineer".into()),
            company: Some("Acme".into()),
            bio: None,
            location: Some("Berlin".into()),
            linkedin_url: None,
            years_experience: Some(6),
            skills: vec!["Rust".into(), "Distributed Systems".into()],
            interests: vec!["Hiking".into()],
            is_open_for_connection: true,
            contact_preferences: ContactPreference::Email,
            created_at: Timestamp::from_millis(0),
            updated_at: Timestamp::from_millis(0),
        }
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let p = profile();
        assert!(p.matches_search("rust"));
        assert!(p.matches_search("ACME"));
        assert!(p.matches_search("engineer"));
        assert!(!p.matches_search("haskell"));
    }
}
