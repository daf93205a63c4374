//! Categorized application errors
//!
//! Front ends route failures to toasts by category, never by matching on
//! message strings. The mapping from [`ParlorError`] is total, so a new
//! error kind cannot silently fall through to a blank screen.

use parlor_core::ParlorError;

/// High-level error categories for front-end error handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// User input validation errors (correctable by the user)
    Input,
    /// Missing or expired session
    Auth,
    /// Session valid, action not allowed on the target
    Permission,
    /// Entity absent (transient or meaningful, see own-profile fetch)
    NotFound,
    /// Connectivity errors (often transient)
    Network,
    /// General operation failures (catch-all)
    Operation,
}

/// Toast severity for a surfaced error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToastLevel {
    /// Informational, auto-dismissing
    Info,
    /// Needs attention but not blocking
    Warning,
    /// Action failed
    Error,
}

impl ErrorCategory {
    /// Whether the user can fix this themselves (edit input, retry later).
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Self::Input)
    }

    /// Whether a retry may succeed without any change.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network | Self::NotFound)
    }

    /// The toast severity front ends should use.
    pub fn toast_severity(&self) -> ToastLevel {
        match self {
            Self::Input => ToastLevel::Warning,
            Self::Auth => ToastLevel::Warning,
            Self::Permission => ToastLevel::Error,
            Self::NotFound => ToastLevel::Info,
            Self::Network => ToastLevel::Warning,
            Self::Operation => ToastLevel::Error,
        }
    }
}

impl From<&ParlorError> for ErrorCategory {
    fn from(err: &ParlorError) -> Self {
        match err {
            ParlorError::InvalidRequest { .. }
            | ParlorError::EmptyMessage
            | ParlorError::DuplicateRequest { .. } => Self::Input,
            ParlorError::AuthRequired { .. } => Self::Auth,
            ParlorError::NotAuthorized { .. } | ParlorError::InvalidTransition { .. } => {
                Self::Permission
            }
            ParlorError::NotFound { .. } => Self::NotFound,
            ParlorError::Network { .. } => Self::Network,
            ParlorError::Storage { .. }
            | ParlorError::Serialization { .. }
            | ParlorError::Internal { .. } => Self::Operation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_failures_are_correctable_input() {
        let category = ErrorCategory::from(&ParlorError::EmptyMessage);
        assert_eq!(category, ErrorCategory::Input);
        assert!(category.is_user_correctable());
        assert_eq!(category.toast_severity(), ToastLevel::Warning);
    }

    #[test]
    fn transition_failures_are_permission_errors() {
        let category = ErrorCategory::from(&ParlorError::invalid_transition("already responded"));
        assert_eq!(category, ErrorCategory::Permission);
        assert_eq!(category.toast_severity(), ToastLevel::Error);
    }
}
