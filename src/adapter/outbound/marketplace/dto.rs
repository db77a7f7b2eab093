//! Marketplace wire types that never leave the adapter.

use serde::Deserialize;

/// Body the server sends with a failed request.
///
/// Only `message` is read; anything else is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_message_and_ignores_extra_fields() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"message":"Not allowed","code":403}"#).unwrap();
        assert_eq!(body.message.as_deref(), Some("Not allowed"));
    }

    #[test]
    fn message_is_optional() {
        let body: ErrorBody = serde_json::from_str("{}").unwrap();
        assert!(body.message.is_none());
    }
}
