use serde::{Deserialize, Serialize};

pub const STATUS_OK: u16 = 200;

/// Uniform response wrapper every endpoint returns. Callers branch on
/// `status` alone, never on the transport-level HTTP status.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: u16,
    #[serde(default = "none")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

fn none<T>() -> Option<T> {
    None
}

impl<T> Envelope<T> {
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Server-provided message, or the caller's fallback when the server
    /// sent none (or an empty string).
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.message.as_deref() {
            Some(message) if !message.is_empty() => message,
            _ => fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_success_envelope() {
        let raw = r#"{"status":200,"data":{"token":"t1","jarId":"j1"},"message":null}"#;
        let envelope: Envelope<crate::model::LoginData> = serde_json::from_str(raw).unwrap();
        assert!(envelope.is_ok());
        let data = envelope.data.unwrap();
        assert_eq!(data.token, "t1");
        assert_eq!(data.jar_id, "j1");
    }

    #[test]
    fn decodes_failure_envelope_with_missing_data() {
        let raw = r#"{"status":401,"message":"bad credentials"}"#;
        let envelope: Envelope<crate::model::LoginData> = serde_json::from_str(raw).unwrap();
        assert!(!envelope.is_ok());
        assert!(envelope.data.is_none());
        assert_eq!(envelope.message_or("fallback"), "bad credentials");
    }

    #[test]
    fn message_or_falls_back_on_empty() {
        let envelope: Envelope<()> = Envelope {
            status: 500,
            data: None,
            message: Some(String::new()),
        };
        assert_eq!(envelope.message_or("fallback"), "fallback");
    }
}
