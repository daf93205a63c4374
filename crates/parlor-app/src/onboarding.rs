//! Onboarding wizard steps
//!
//! The logical flow only: no form state, no rendering. Front ends drive
//! their own inputs and ask these steps for ordering and copy.

use serde::{Deserialize, Serialize};

/// Steps in the onboarding flow.
///
/// 1. Welcome - what the network is for
/// 2. Identity - display name
/// 3. Work - role, company, experience
/// 4. Interests - skills, interests, contact preferences
/// 5. Review - confirm and submit
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OnboardingStep {
    /// Introduction screen
    #[default]
    Welcome,
    /// Display name entry
    Identity,
    /// Role, company, and experience
    Work,
    /// Skills, interests, openness, contact preference
    Interests,
    /// Summary and submission
    Review,
}

impl OnboardingStep {
    /// All steps in order.
    pub fn all() -> &'static [Self] {
        &[
            Self::Welcome,
            Self::Identity,
            Self::Work,
            Self::Interests,
            Self::Review,
        ]
    }

    /// The next step, or None at the end.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Welcome => Some(Self::Identity),
            Self::Identity => Some(Self::Work),
            Self::Work => Some(Self::Interests),
            Self::Interests => Some(Self::Review),
            Self::Review => None,
        }
    }

    /// The previous step, or None at the start.
    pub fn prev(self) -> Option<Self> {
        match self {
            Self::Welcome => None,
            Self::Identity => Some(Self::Welcome),
            Self::Work => Some(Self::Identity),
            Self::Interests => Some(Self::Work),
            Self::Review => Some(Self::Interests),
        }
    }

    /// Whether this is the first step.
    pub fn is_first(self) -> bool {
        self.prev().is_none()
    }

    /// Whether this is the last step.
    pub fn is_last(self) -> bool {
        self.next().is_none()
    }

    /// 1-indexed step number for display.
    pub fn number(self) -> u8 {
        match self {
            Self::Welcome => 1,
            Self::Identity => 2,
            Self::Work => 3,
            Self::Interests => 4,
            Self::Review => 5,
        }
    }

    /// Total number of steps.
    pub fn total_steps() -> u8 {
        Self::all().len() as u8
    }

    /// Step title for display.
    pub fn title(self) -> &'static str {
        match self {
            Self::Welcome => "Welcome",
            Self::Identity => "Your Name",
            Self::Work => "What You Do",
            Self::Interests => "Skills & Interests",
            Self::Review => "Review",
        }
    }
}
