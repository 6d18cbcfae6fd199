//! Frame codec
//!
//! Translates between protocol messages and the JSON text frames carried on
//! the wire, one message object per frame. Decoding never panics and never
//! tears down a connection: every failure is classified into a `DecodeError`
//! the caller reports and then drops.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Wire Message Trait
// =============================================================================

/// Introspection over a topic's message set
///
/// Implemented by every `ClientMessage`/`ServerMessage` enum so the transport
/// layer can log and classify frames without knowing the concrete topic.
pub trait WireMessage {
    /// The wire discriminant (the `type` field) this value serializes to
    fn message_type(&self) -> &'static str;

    /// True for the forward-compatibility placeholder in server message sets
    fn is_unknown(&self) -> bool {
        false
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Failure to serialize an outbound message
#[derive(Debug, Error)]
#[error("failed to encode outbound frame: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

/// Failure to decode an inbound frame
///
/// Frames failing with any of these are dropped after reporting; only
/// transport-level events close a channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Frame is not valid JSON, or the payload does not match its tag's shape
    #[error("malformed frame: {0}")]
    Malformed(String),
    /// Frame carries no string `type` discriminant
    #[error("frame has no `type` field")]
    MissingType,
    /// Discriminant is outside this topic's message set
    #[error("unknown message type `{message_type}`")]
    UnknownType { message_type: String },
}

// =============================================================================
// Encode / Decode
// =============================================================================

/// Serialize an outbound message to a single JSON text frame
pub fn encode<M>(message: &M) -> Result<String, EncodeError>
where
    M: Serialize,
{
    Ok(serde_json::to_string(message)?)
}

/// Deserialize an inbound text frame into a topic's server message set
///
/// The `type` field is extracted first so that an out-of-set tag can be
/// reported by name; serde's `#[serde(other)]` arm would otherwise swallow it
/// silently. A known tag with a payload of the wrong shape is `Malformed`.
pub fn decode<M>(frame: &str) -> Result<M, DecodeError>
where
    M: DeserializeOwned + WireMessage,
{
    let value: serde_json::Value =
        serde_json::from_str(frame).map_err(|e| DecodeError::Malformed(e.to_string()))?;

    let tag = value
        .get("type")
        .and_then(serde_json::Value::as_str)
        .ok_or(DecodeError::MissingType)?
        .to_owned();

    let message: M =
        serde_json::from_value(value).map_err(|e| DecodeError::Malformed(e.to_string()))?;

    if message.is_unknown() {
        return Err(DecodeError::UnknownType { message_type: tag });
    }

    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lobby;

    #[test]
    fn test_decode_known_tag() {
        let frame = r#"{"type":"countdown","seconds":5}"#;
        let msg: lobby::ServerMessage = decode(frame).expect("countdown should decode");
        assert_eq!(msg, lobby::ServerMessage::Countdown { seconds: 5 });
        assert_eq!(msg.message_type(), "countdown");
    }

    #[test]
    fn test_decode_unknown_tag_reports_type() {
        let frame = r#"{"type":"emote","emoji":"confetti"}"#;
        let err = decode::<lobby::ServerMessage>(frame).expect_err("emote is not a lobby tag");
        assert_eq!(
            err,
            DecodeError::UnknownType {
                message_type: "emote".to_owned()
            }
        );
    }

    #[test]
    fn test_decode_invalid_json_is_malformed() {
        let err = decode::<lobby::ServerMessage>("{not json").expect_err("should not parse");
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn test_decode_missing_type_field() {
        let err = decode::<lobby::ServerMessage>(r#"{"seconds":5}"#).expect_err("no tag");
        assert_eq!(err, DecodeError::MissingType);

        // A non-object frame has no `type` either
        let err = decode::<lobby::ServerMessage>("[1,2,3]").expect_err("no tag");
        assert_eq!(err, DecodeError::MissingType);
    }

    #[test]
    fn test_decode_known_tag_wrong_shape_is_malformed() {
        // countdown requires a numeric `seconds`
        let frame = r#"{"type":"countdown","seconds":"soon"}"#;
        let err = decode::<lobby::ServerMessage>(frame).expect_err("bad payload");
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn test_encode_produces_tagged_object() {
        let json = encode(&lobby::ClientMessage::Ping { sent_at: 31_500 }).expect("encode ping");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["type"], "ping");
        assert_eq!(value["sent_at"], 31_500);
    }
}
