//! Parlor Profile - member profiles and browse
//!
//! Profiles are 1:1 with accounts and gate two things: a member without
//! one is onboarding-incomplete, and only open-for-connection profiles
//! appear in browse. Browse additionally hides anyone the viewer already
//! has an active request with, so a sent request immediately removes the
//! member from future results.

#![forbid(unsafe_code)]

mod service;

pub use service::{BrowseFilter, ProfileDraft, ProfileHandler, ProfileUpdate, ProfileView};
