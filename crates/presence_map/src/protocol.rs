//! Wire format of the live count channel.
//!
//! The server pushes UTF-8 JSON text frames of the form
//! `{"type":"count","online":<non-negative integer>}`. Anything else is ignored.
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Server-to-client message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChannelMessage {
    Count { online: u64 },
}

impl ChannelMessage {
    pub fn count(online: u64) -> Self {
        ChannelMessage::Count { online }
    }

    /// Serializes the message as a JSON text payload.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::Other(format!("cannot encode message: {e}")))
    }
}

/// Extracts the count from a text payload, or `None` for malformed or foreign messages.
pub fn parse_count(text: &str) -> Option<u64> {
    match serde_json::from_str::<ChannelMessage>(text) {
        Ok(ChannelMessage::Count { online }) => Some(online),
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_count_messages() {
        assert_eq!(parse_count(r#"{"type":"count","online":3}"#), Some(3));
        assert_eq!(parse_count(r#"{"online":0,"type":"count","extra":true}"#), Some(0));
    }

    #[test]
    fn ignores_everything_else() {
        for text in [
            "not json",
            "",
            r#"{"type":"count"}"#,
            r#"{"type":"count","online":-1}"#,
            r#"{"type":"count","online":2.5}"#,
            r#"{"type":"count","online":"4"}"#,
            r#"{"type":"hello","online":4}"#,
            r#"[1,2,3]"#,
        ] {
            assert_eq!(parse_count(text), None, "{text}");
        }
    }

    #[test]
    fn encodes_tagged_count() {
        let json = ChannelMessage::count(12).to_json().unwrap();
        assert_eq!(json, r#"{"type":"count","online":12}"#);
        assert_eq!(parse_count(&json), Some(12));
        assert_eq!(
            parse_count(&ChannelMessage::count(u64::MAX).to_json().unwrap()),
            Some(u64::MAX)
        );
    }
}
