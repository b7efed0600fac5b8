//! Enumeration types for the robot controller.
//!
//! All enums serialize as `snake_case` strings so the JSON the dashboard
//! sees (`"uv_disinfecting"`, `"full_clean"`, `"obstacle_detected"`) is
//! stable regardless of Rust naming.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Operational status
// ---------------------------------------------------------------------------

/// The robot's current operational status.
///
/// `Mopping`, `Spraying` and `UvDisinfecting` are the active phases. A
/// session moves between them as progress crosses the phase thresholds.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum RobotStatus {
    /// No session is running.
    #[default]
    Idle,
    /// Wet mopping pass (start of the cycle and the final pass).
    Mopping,
    /// Disinfectant spraying pass.
    Spraying,
    /// Ultraviolet disinfection pass.
    UvDisinfecting,
    /// Session suspended by the user or by an obstacle.
    Paused,
}

impl RobotStatus {
    /// Whether this status is one of the active cleaning phases.
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Mopping | Self::Spraying | Self::UvDisinfecting)
    }

    /// Derive the active phase from session progress.
    ///
    /// `< 30` mops, `< 60` sprays, `< 90` disinfects, and everything from
    /// 90 up is the final mopping pass.
    pub const fn phase_for_progress(progress: u8) -> Self {
        if progress < 30 {
            Self::Mopping
        } else if progress < 60 {
            Self::Spraying
        } else if progress < 90 {
            Self::UvDisinfecting
        } else {
            Self::Mopping
        }
    }
}

// ---------------------------------------------------------------------------
// Cleaning mode
// ---------------------------------------------------------------------------

/// The cleaning program requested when a session starts.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum CleaningMode {
    /// Mop, spray and UV passes.
    #[default]
    FullClean,
    /// Mopping only.
    MopOnly,
    /// Spraying only.
    SprayOnly,
    /// UV disinfection only.
    UvOnly,
}

impl CleaningMode {
    /// Human-readable label used in event messages (e.g. `"full clean"`).
    pub const fn label(self) -> &'static str {
        match self {
            Self::FullClean => "full clean",
            Self::MopOnly => "mop only",
            Self::SprayOnly => "spray only",
            Self::UvOnly => "uv only",
        }
    }

    /// The `snake_case` wire name, also used as the database column value.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullClean => "full_clean",
            Self::MopOnly => "mop_only",
            Self::SprayOnly => "spray_only",
            Self::UvOnly => "uv_only",
        }
    }

    /// Parse a wire name back into a mode.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "full_clean" => Some(Self::FullClean),
            "mop_only" => Some(Self::MopOnly),
            "spray_only" => Some(Self::SprayOnly),
            "uv_only" => Some(Self::UvOnly),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Pause reason
// ---------------------------------------------------------------------------

/// Why the current session is paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum PauseReason {
    /// The obstacle sensor fired; cleared automatically after a grace interval.
    ObstacleDetected,
    /// An operator asked the robot to pause.
    UserRequest,
}

// ---------------------------------------------------------------------------
// Session outcome
// ---------------------------------------------------------------------------

/// How a cleaning session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum SessionOutcome {
    /// Progress reached 100%.
    Completed,
    /// A stop command ended the session early.
    Interrupted,
}

impl SessionOutcome {
    /// The `snake_case` wire name, also used as the database column value.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
        }
    }

    /// Parse a wire name back into an outcome.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "completed" => Some(Self::Completed),
            "interrupted" => Some(Self::Interrupted),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Command kind
// ---------------------------------------------------------------------------

/// The four commands an operator can send to the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum CommandKind {
    /// Begin a new session.
    Start,
    /// End the running session early.
    Stop,
    /// Suspend the running session.
    Pause,
    /// Continue a paused session.
    Resume,
}
