//! Route table and gating decisions
//!
//! The gate is a pure function of the route and the auth state: no
//! router library, no rendering. A front end asks what to do with a
//! navigation and gets exactly one answer; a route can never redirect to
//! itself.

use crate::gate::AuthState;
use serde::{Deserialize, Serialize};

/// The app's top-level destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    /// Public landing page
    Home,
    /// Public event listing
    Meetups,
    /// Received/sent/established requests
    Connections,
    /// Member browse
    Browse,
    /// Own profile
    Profile,
    /// Conversations and history
    Messaging,
    /// The onboarding flow itself
    Onboarding,
}

/// What a route demands of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteAccess {
    /// Renders for anyone
    Public,
    /// Needs a session, onboarding state irrelevant
    RequiresAuth,
    /// Needs a session with onboarding completed
    RequiresOnboarding,
}

/// The gate's answer to a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteDecision {
    /// Session still resolving; render nothing yet
    Pending,
    /// Render the route's content
    Render,
    /// Send the guest to the public landing
    RedirectToLanding,
    /// Send the member into the onboarding flow
    RedirectToOnboarding,
}

impl Route {
    /// Access level for this route.
    pub fn access(self) -> RouteAccess {
        match self {
            Self::Home | Self::Meetups => RouteAccess::Public,
            Self::Onboarding => RouteAccess::RequiresAuth,
            Self::Connections | Self::Browse | Self::Profile | Self::Messaging => {
                RouteAccess::RequiresOnboarding
            }
        }
    }

    /// Canonical path, for address-bar sync.
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Meetups => "/meetups",
            Self::Connections => "/connections",
            Self::Browse => "/browse",
            Self::Profile => "/profile",
            Self::Messaging => "/messaging",
            Self::Onboarding => "/signup",
        }
    }

    /// Resolve a path back to a route; unknown paths land on Home.
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/meetups" => Self::Meetups,
            "/connections" => Self::Connections,
            "/browse" => Self::Browse,
            "/profile" => Self::Profile,
            "/messaging" => Self::Messaging,
            "/signup" => Self::Onboarding,
            _ => Self::Home,
        }
    }
}

/// Decide what a navigation to `route` does under `auth`.
pub fn gate_route(route: Route, auth: &AuthState) -> RouteDecision {
    if matches!(auth, AuthState::Loading) {
        return RouteDecision::Pending;
    }
    match route.access() {
        RouteAccess::Public => RouteDecision::Render,
        RouteAccess::RequiresAuth => {
            if auth.is_authenticated() {
                RouteDecision::Render
            } else {
                RouteDecision::RedirectToLanding
            }
        }
        RouteAccess::RequiresOnboarding => match auth {
            AuthState::Active(_) => RouteDecision::Render,
            AuthState::OnboardingRequired(_) => RouteDecision::RedirectToOnboarding,
            _ => RouteDecision::RedirectToLanding,
        },
    }
}
