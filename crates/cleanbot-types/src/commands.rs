//! Command gateway request and response types.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{CleaningMode, CommandKind};
use crate::structs::RobotStateSnapshot;

/// An operator command.
///
/// On the wire the kind is sent as `command` (`kind` is accepted too).
/// `mode` only matters for `start` and defaults to
/// [`CleaningMode::FullClean`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CommandRequest {
    /// Which command to run.
    #[serde(rename = "command")]
    #[serde(alias = "kind")]
    pub kind: CommandKind,
    /// Cleaning mode for `start`; ignored otherwise.
    #[serde(default)]
    #[ts(optional)]
    pub mode: Option<CleaningMode>,
}

impl CommandRequest {
    /// Build a command with no mode.
    pub const fn new(kind: CommandKind) -> Self {
        Self { kind, mode: None }
    }

    /// Build a `start` command for the given mode.
    pub const fn start(mode: CleaningMode) -> Self {
        Self {
            kind: CommandKind::Start,
            mode: Some(mode),
        }
    }

    /// The mode to start with, falling back to the default.
    pub fn mode_or_default(&self) -> CleaningMode {
        self.mode.unwrap_or_default()
    }
}

/// The structured outcome of a command.
///
/// `accepted = false` is a normal result for a command that is invalid in
/// the current state; it is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CommandResult {
    /// Whether the command was applied.
    pub accepted: bool,
    /// Human-readable outcome.
    pub message: String,
    /// State after the command (unchanged when rejected).
    pub state: RobotStateSnapshot,
    /// Soft failure that did not undo the transition (e.g. history write failed).
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub warning: Option<String>,
}

impl CommandResult {
    /// An applied command.
    pub fn accepted(message: impl Into<String>, state: RobotStateSnapshot) -> Self {
        Self {
            accepted: true,
            message: message.into(),
            state,
            warning: None,
        }
    }

    /// A command that was invalid for the current state.
    pub fn rejected(message: impl Into<String>, state: RobotStateSnapshot) -> Self {
        Self {
            accepted: false,
            message: message.into(),
            state,
            warning: None,
        }
    }

    /// Attach a soft-failure warning.
    #[must_use]
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn command_field_and_default_mode() {
        let req: CommandRequest = serde_json::from_str(r#"{"command":"start"}"#).unwrap();
        assert_eq!(req.kind, CommandKind::Start);
        assert_eq!(req.mode_or_default(), CleaningMode::FullClean);

        let req: CommandRequest =
            serde_json::from_str(r#"{"kind":"start","mode":"uv_only"}"#).unwrap();
        assert_eq!(req.mode_or_default(), CleaningMode::UvOnly);
    }

    #[test]
    fn binding_uses_wire_field_names() {
        let request = CommandRequest::decl();
        assert!(request.contains("command: CommandKind"), "{request}");
        assert!(!request.contains("kind:"), "{request}");

        let result = CommandResult::decl();
        assert!(result.contains("warning?: string"), "{result}");
    }

    #[test]
    fn unknown_command_is_rejected() {
        let parsed = serde_json::from_str::<CommandRequest>(r#"{"command":"dance"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn warning_omitted_when_absent() {
        let result = CommandResult::rejected("Cannot pause robot", RobotStateSnapshot::default());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["accepted"], false);
        assert!(json.get("warning").is_none());

        let json = serde_json::to_value(result.with_warning("log down")).unwrap();
        assert_eq!(json["warning"], "log down");
    }
}
