//! Transient success and failure banners shown next to a view.

use crate::error::Error;

/// Category of a banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    /// A fetch failed; stale or default data stays visible.
    LoadFailure,
    /// A save, update, delete, status change, or buyer removal failed.
    MutationFailure,
    /// The server rejected the request with its own message.
    ValidationFailure,
}

impl NoticeKind {
    #[must_use]
    pub const fn is_failure(self) -> bool {
        !matches!(self, Self::Success)
    }
}

/// Message surfaced to the user after an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    /// Banner for a failed fetch.
    #[must_use]
    pub fn load_failure(err: &Error, fallback: &str) -> Self {
        Self::failure(NoticeKind::LoadFailure, err, fallback)
    }

    /// Banner for a failed mutation.
    #[must_use]
    pub fn mutation_failure(err: &Error, fallback: &str) -> Self {
        Self::failure(NoticeKind::MutationFailure, err, fallback)
    }

    /// A server-supplied message always wins and marks the notice as a
    /// validation failure.
    fn failure(kind: NoticeKind, err: &Error, fallback: &str) -> Self {
        match err.server_message() {
            Some(message) => Self {
                kind: NoticeKind::ValidationFailure,
                text: message.to_string(),
            },
            None => Self {
                kind,
                text: fallback.to_string(),
            },
        }
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.kind.is_failure()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    #[test]
    fn server_message_becomes_validation_failure() {
        let err = Error::from(ApiError::Status {
            status: 400,
            message: Some("price too low".into()),
        });
        let notice = Notice::mutation_failure(&err, "Failed to update listing.");
        assert_eq!(notice.kind, NoticeKind::ValidationFailure);
        assert_eq!(notice.text, "price too low");
    }

    #[test]
    fn missing_message_uses_fallback_and_kind() {
        let err = Error::from(ApiError::Status {
            status: 503,
            message: None,
        });
        let notice = Notice::load_failure(&err, "Failed to load profile.");
        assert_eq!(notice.kind, NoticeKind::LoadFailure);
        assert_eq!(notice.text, "Failed to load profile.");
        assert!(notice.is_failure());
        assert!(!Notice::success("ok").is_failure());
    }
}
