//! The push-channel event envelope.
//!
//! Every state change is published as exactly one [`RobotEvent`]. The
//! JSON form is internally tagged:
//!
//! ```json
//! {"type": "alert", "message": "...", "state": {...}}
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::structs::RobotStateSnapshot;

/// An event pushed to every live subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum RobotEvent {
    /// Plain state snapshot (tick progress, send-on-connect).
    StatusUpdate {
        /// State after the change.
        state: RobotStateSnapshot,
    },
    /// Something needs attention (obstacle pause).
    Alert {
        /// Human-readable description.
        message: String,
        /// State after the change.
        state: RobotStateSnapshot,
    },
    /// Informational transition (start, stop, pause, resume, path clear).
    Info {
        /// Human-readable description.
        message: String,
        /// State after the change.
        state: RobotStateSnapshot,
    },
    /// A session reached 100% and was finalized.
    CleaningComplete {
        /// Human-readable description.
        message: String,
        /// State after the session was reset to idle.
        state: RobotStateSnapshot,
        /// Session length in whole seconds.
        duration: u64,
    },
}

impl RobotEvent {
    /// The state snapshot carried by this event.
    pub const fn state(&self) -> &RobotStateSnapshot {
        match self {
            Self::StatusUpdate { state }
            | Self::Alert { state, .. }
            | Self::Info { state, .. }
            | Self::CleaningComplete { state, .. } => state,
        }
    }

    /// The message text, if this event type carries one.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::StatusUpdate { .. } => None,
            Self::Alert { message, .. }
            | Self::Info { message, .. }
            | Self::CleaningComplete { message, .. } => Some(message),
        }
    }

    /// The `type` tag as it appears on the wire.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::StatusUpdate { .. } => "status_update",
            Self::Alert { .. } => "alert",
            Self::Info { .. } => "info",
            Self::CleaningComplete { .. } => "cleaning_complete",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn status_update_has_no_message_field() {
        let event = RobotEvent::StatusUpdate {
            state: RobotStateSnapshot::default(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "status_update");
        assert!(json.get("message").is_none());
        assert_eq!(json["state"]["status"], "idle");
    }

    #[test]
    fn completion_carries_duration() {
        let event = RobotEvent::CleaningComplete {
            message: String::from("done"),
            state: RobotStateSnapshot::default(),
            duration: 250,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.kind());
        assert_eq!(json["duration"], 250);
        assert_eq!(event.message(), Some("done"));
    }

    #[test]
    fn envelope_parses_back() {
        let raw = r#"{"type":"alert","message":"Obstacle","state":{"status":"paused","progress":12,"is_cleaning":true,"obstacle_detected":true,"start_time":null,"current_mode":"full_clean","pause_reason":"obstacle_detected"}}"#;
        let event: RobotEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.kind(), "alert");
        assert!(event.state().obstacle_detected);
    }
}
