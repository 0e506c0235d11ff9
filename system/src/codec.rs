use crate::message::{IdentifiableCommand, IdentifiableEvent};
use thiserror::Error;

/// Encoding a connection speaks. Text frames carry JSON, binary frames bincode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WireFormat {
    Json,
    Bincode,
}

impl Default for WireFormat {
    fn default() -> Self {
        WireFormat::Json
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid binary payload: {0}")]
    Bincode(#[from] bincode::Error),
}

pub fn decode_command(format: WireFormat, bytes: &[u8]) -> Result<IdentifiableCommand, CodecError> {
    match format {
        WireFormat::Json => Ok(serde_json::from_slice(bytes)?),
        WireFormat::Bincode => Ok(bincode::deserialize(bytes)?),
    }
}

pub fn encode_command(format: WireFormat, command: &IdentifiableCommand) -> Result<Frame, CodecError> {
    match format {
        WireFormat::Json => Ok(Frame::Text(serde_json::to_string(command)?)),
        WireFormat::Bincode => Ok(Frame::Binary(bincode::serialize(command)?)),
    }
}

pub fn decode_event(format: WireFormat, bytes: &[u8]) -> Result<IdentifiableEvent, CodecError> {
    match format {
        WireFormat::Json => Ok(serde_json::from_slice(bytes)?),
        WireFormat::Bincode => Ok(bincode::deserialize(bytes)?),
    }
}

pub fn encode_event(format: WireFormat, event: &IdentifiableEvent) -> Result<Frame, CodecError> {
    match format {
        WireFormat::Json => Ok(Frame::Text(serde_json::to_string(event)?)),
        WireFormat::Bincode => Ok(Frame::Binary(bincode::serialize(event)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::*;
    use crate::property_bag::PropertyBag;
    use crate::types::Position;
    use serde_json::json;
    use std::convert::TryFrom;

    fn add_stroke() -> IdentifiableCommand {
        IdentifiableCommand {
            command_id: 3,
            command: SessionCommand::AddObject {
                session_id: Some("room1".into()),
                object: NewObject {
                    id: Some("s1".into()),
                    object_type: "stroke".into(),
                    properties: PropertyBag::try_from(json!({
                        "color": "#000",
                        "points": [[0, 0], [4, 4]]
                    }))
                    .expect("object"),
                },
            },
        }
    }

    #[test]
    fn it_decodes_json_commands_from_clients() {
        let raw = br##"{
            "commandId": 1,
            "command": {
                "join": { "sessionId": "room1", "participantId": "a", "displayName": "Alice" }
            }
        }"##;
        let command = decode_command(WireFormat::Json, raw).expect("valid");
        assert_eq!(
            command.command,
            SessionCommand::Join {
                session_id: "room1".into(),
                participant_id: "a".into(),
                display_name: "Alice".into(),
            }
        );
    }

    #[test]
    fn it_carries_property_bags_through_bincode() {
        let command = add_stroke();
        let bytes = match encode_command(WireFormat::Bincode, &command).expect("encode") {
            Frame::Binary(bytes) => bytes,
            other => panic!("unexpected frame {:?}", other),
        };
        assert_eq!(
            decode_command(WireFormat::Bincode, &bytes).expect("decode"),
            command
        );
    }

    #[test]
    fn it_encodes_events_as_text_for_json_connections() {
        let event = IdentifiableEvent::BySystem {
            session_event: SessionEvent::CursorMoved(LiveCursorEvent {
                participant_id: "a".into(),
                display_name: "Alice".into(),
                color: "#FF6B6B".into(),
                position: Position::new(1.0, 2.0),
            }),
        };
        let text = match encode_event(WireFormat::Json, &event).expect("encode") {
            Frame::Text(text) => text,
            other => panic!("unexpected frame {:?}", other),
        };
        let value: serde_json::Value = serde_json::from_str(&text).expect("json");
        assert_eq!(
            value["bySystem"]["sessionEvent"]["cursorMoved"]["participantId"],
            json!("a")
        );
        assert_eq!(decode_event(WireFormat::Json, text.as_bytes()).expect("decode"), event);
    }

    #[test]
    fn it_reports_malformed_payloads() {
        assert!(matches!(
            decode_command(WireFormat::Json, b"{\"commandId\":1}"),
            Err(CodecError::Json(_))
        ));
        assert!(matches!(
            decode_command(WireFormat::Bincode, &[0xff, 0x01]),
            Err(CodecError::Bincode(_))
        ));
    }
}
