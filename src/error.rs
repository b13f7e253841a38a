// MIT License - Copyright (c) 2026 Peter Wright
// Error taxonomy

/// Reasons a datagram is rejected by the decoder.
///
/// All of these are local: the datagram is logged and dropped, the panel
/// still gets its ACK and the connection stays open.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// No `[` body checksum `]` structure.
    #[error("framing error: {reason}")]
    Framing { reason: String },

    /// Body checksum does not match the transmitted one.
    #[error("checksum mismatch: expected {expected:04X}, got {actual:04X}")]
    ChecksumMismatch { expected: u16, actual: u16 },

    /// Checksum is fine but the body does not fit the fixed Contact ID layout.
    #[error("grammar mismatch: {reason}")]
    GrammarMismatch { reason: String },

    /// Event code has no entry in the code table.
    #[error("unknown event code: {code}")]
    UnknownEventCode { code: String },
}

impl ParseError {
    pub(crate) fn framing(reason: impl Into<String>) -> Self {
        Self::Framing {
            reason: reason.into(),
        }
    }

    pub(crate) fn grammar(reason: impl Into<String>) -> Self {
        Self::GrammarMismatch {
            reason: reason.into(),
        }
    }

    /// Whether the datagram arrived damaged (bad checksum) rather than
    /// intact but in a layout we don't understand.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(self, ParseError::ChecksumMismatch { .. })
    }
}

/// All errors outside the decode path.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {details}")]
    Config { details: String },

    #[error("Code table error: {details}")]
    CodeTable { details: String },

    #[error("HTTP error: {details}")]
    Http { details: String },

    #[error("Webhook reported failure: {url}")]
    WebhookRejected { url: String },

    #[error("Notification failed: {details}")]
    Notify { details: String },

    #[error("MQTT error: {details}")]
    Mqtt { details: String },
}

// Webhook URLs carry credentials in the query string
impl From<reqwest::Error> for BridgeError {
    fn from(e: reqwest::Error) -> Self {
        BridgeError::Http {
            details: e.without_url().to_string(),
        }
    }
}

impl From<rumqttc::ClientError> for BridgeError {
    fn from(e: rumqttc::ClientError) -> Self {
        BridgeError::Mqtt {
            details: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_mismatch_display_is_hex() {
        let err = ParseError::ChecksumMismatch {
            expected: 0xD504,
            actual: 0x00AB,
        };
        assert_eq!(
            err.to_string(),
            "checksum mismatch: expected D504, got 00AB"
        );
    }

    #[test]
    fn test_integrity_failure() {
        assert!(
            ParseError::ChecksumMismatch {
                expected: 1,
                actual: 2
            }
            .is_integrity_failure()
        );
        assert!(!ParseError::framing("no brackets").is_integrity_failure());
        assert!(!ParseError::grammar("no marker").is_integrity_failure());
        assert!(
            !ParseError::UnknownEventCode {
                code: "999".into()
            }
            .is_integrity_failure()
        );
    }
}
