//! Profile handler - create, edit, and browse member profiles

use parlor_core::effects::{ClockEffects, StorageEffects};
use parlor_core::records::{self, ConnectionRecord, ContactPreference, ProfileRecord, UserRecord};
use parlor_core::{Page, Paged, ParlorError, Result, UserId};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashSet;
use tracing::debug;

/// Fields collected when a profile is first created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDraft {
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
    /// Whether to accept connection requests (defaults to open)
    pub is_open_for_connection: Option<bool>,
    /// Preferred contact channel once connected
    pub contact_preferences: Option<ContactPreference>,
}

/// Partial edit; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    /// New role
    pub job_title: Option<String>,
    /// New employer
    pub company: Option<String>,
    /// New introduction
    pub bio: Option<String>,
    /// New location
    pub location: Option<String>,
    /// New LinkedIn URL
    pub linkedin_url: Option<String>,
    /// New experience figure
    pub years_experience: Option<u32>,
    /// Replacement skill tags
    pub skills: Option<Vec<String>>,
    /// Replacement interest tags
    pub interests: Option<Vec<String>>,
    /// New openness flag
    pub is_open_for_connection: Option<bool>,
    /// New contact preference
    pub contact_preferences: Option<ContactPreference>,
}

/// Search criteria for browse; all filters are case-insensitive substrings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseFilter {
    /// Free text matched against title, company, bio, skills, interests
    pub search: Option<String>,
    /// Location substring
    pub location: Option<String>,
    /// Company substring
    pub company: Option<String>,
}

/// A profile joined with the owning account's display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileView {
    /// The profile itself
    pub profile: ProfileRecord,
    /// Display name from the account
    pub name: String,
    /// Email from the account
    pub email: String,
    /// Avatar from the account
    pub picture: Option<String>,
}

/// Stateless profile engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileHandler;

impl ProfileHandler {
    /// Create a new profile handler
    pub fn new() -> Self {
        Self
    }

    /// Create the member's profile. One per account: creating a second is
    /// an invalid transition, use [`Self::update_profile`] instead.
    pub async fn create_profile<E>(
        &self,
        effects: &E,
        user_id: UserId,
        draft: ProfileDraft,
    ) -> Result<ProfileRecord>
    where
        E: StorageEffects + ClockEffects,
    {
        let key = ProfileRecord::key(user_id);
        if effects.exists(&key).await? {
            return Err(ParlorError::invalid_transition("profile already exists"));
        }

        let now = effects.now().await?;
        let profile = ProfileRecord {
            user_id,
            job_title: draft.job_title,
            company: draft.company,
            bio: draft.bio,
            location: draft.location,
            linkedin_url: draft.linkedin_url,
            years_experience: draft.years_experience,
            skills: draft.skills,
            interests: draft.interests,
            is_open_for_connection: draft.is_open_for_connection.unwrap_or(true),
            contact_preferences: draft.contact_preferences.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        records::put(effects, &key, &profile).await?;
        debug!(user = %user_id, "profile created");
        Ok(profile)
    }

    /// Load a member's profile.
    ///
    /// `NotFound` on the caller's own id is the onboarding-incomplete
    /// signal, not a failure.
    pub async fn get_profile<E>(&self, effects: &E, user_id: UserId) -> Result<ProfileRecord>
    where
        E: StorageEffects,
    {
        records::get(effects, &ProfileRecord::key(user_id))
            .await?
            .ok_or_else(|| ParlorError::not_found(format!("profile for {user_id}")))
    }

    /// Load a member's profile joined with account display data.
    pub async fn get_profile_view<E>(&self, effects: &E, user_id: UserId) -> Result<ProfileView>
    where
        E: StorageEffects,
    {
        let profile = self.get_profile(effects, user_id).await?;
        self.join_user(effects, profile).await
    }

    /// Apply a partial edit to an existing profile.
    pub async fn update_profile<E>(
        &self,
        effects: &E,
        user_id: UserId,
        update: ProfileUpdate,
    ) -> Result<ProfileRecord>
    where
        E: StorageEffects + ClockEffects,
    {
        let key = ProfileRecord::key(user_id);
        let mut profile: ProfileRecord = records::get(effects, &key)
            .await?
            .ok_or_else(|| ParlorError::not_found(format!("profile for {user_id}")))?;

        macro_rules! apply {
            ($($field:ident),+ $(,)?) => {
                $(if let Some(value) = update.$field {
                    profile.$field = Some(value);
                })+
            };
        }
        apply!(job_title, company, bio, location, linkedin_url, years_experience);
        if let Some(skills) = update.skills {
            profile.skills = skills;
        }
        if let Some(interests) = update.interests {
            profile.interests = interests;
        }
        if let Some(open) = update.is_open_for_connection {
            profile.is_open_for_connection = open;
        }
        if let Some(pref) = update.contact_preferences {
            profile.contact_preferences = pref;
        }
        profile.updated_at = effects.now().await?;

        records::put(effects, &key, &profile).await?;
        debug!(user = %user_id, "profile updated");
        Ok(profile)
    }

    /// Browse members open for connection.
    ///
    /// Excludes the viewer, closed profiles, and anyone the viewer already
    /// has an active (pending or accepted) request with; sending a
    /// request removes the member from the sender's future results.
    /// Sorted newest profile first.
    pub async fn browse<E>(
        &self,
        effects: &E,
        viewer: UserId,
        filter: &BrowseFilter,
        page: Page,
    ) -> Result<Paged<ProfileView>>
    where
        E: StorageEffects,
    {
        let engaged = self.actively_engaged_with(effects, viewer).await?;

        let profiles: Vec<ProfileRecord> =
            records::scan(effects, ProfileRecord::KEY_PREFIX).await?;
        let mut matches: Vec<ProfileRecord> = profiles
            .into_iter()
            .filter(|p| p.user_id != viewer)
            .filter(|p| p.is_open_for_connection)
            .filter(|p| !engaged.contains(&p.user_id))
            .filter(|p| Self::matches_filter(p, filter))
            .collect();
        matches.sort_by_key(|p| Reverse(p.created_at));

        let paged = Paged::slice(matches, page.clamped(Page::MAX_LIMIT));
        let mut views = Vec::with_capacity(paged.items.len());
        for profile in paged.items {
            views.push(self.join_user(effects, profile).await?);
        }
        Ok(Paged {
            items: views,
            page: paged.page,
        })
    }

    fn matches_filter(profile: &ProfileRecord, filter: &BrowseFilter) -> bool {
        let contains = |field: &Option<String>, needle: &str| {
            field
                .as_deref()
                .is_some_and(|v| v.to_lowercase().contains(&needle.to_lowercase()))
        };
        if let Some(search) = filter.search.as_deref() {
            if !profile.matches_search(search) {
                return false;
            }
        }
        if let Some(location) = filter.location.as_deref() {
            if !contains(&profile.location, location) {
                return false;
            }
        }
        if let Some(company) = filter.company.as_deref() {
            if !contains(&profile.company, company) {
                return false;
            }
        }
        true
    }

    async fn actively_engaged_with<E>(&self, effects: &E, viewer: UserId) -> Result<HashSet<UserId>>
    where
        E: StorageEffects,
    {
        let requests: Vec<ConnectionRecord> =
            records::scan(effects, ConnectionRecord::KEY_PREFIX).await?;
        Ok(requests
            .iter()
            .filter(|r| r.is_active())
            .filter_map(|r| r.counterpart(viewer))
            .collect())
    }

    async fn join_user<E>(&self, effects: &E, profile: ProfileRecord) -> Result<ProfileView>
    where
        E: StorageEffects,
    {
        let user: UserRecord = records::get(effects, &UserRecord::key(profile.user_id))
            .await?
            .ok_or_else(|| {
                ParlorError::internal(format!("profile without account: {}", profile.user_id))
            })?;
        Ok(ProfileView {
            profile,
            name: user.name,
            email: user.email,
            picture: user.picture,
        })
    }
}
