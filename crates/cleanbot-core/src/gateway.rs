//! Translates external commands into controller calls.
//!
//! A refused command is an ordinary answer (`accepted: false` with the
//! reason as the message), never a fault. A stop whose history record
//! could not be stored is still accepted; the result carries a warning.

use cleanbot_types::{
    CommandKind, CommandRequest, CommandResult, PauseReason, RobotStateSnapshot,
};
use tracing::debug;

use crate::controller::{Rejected, RobotController};

/// Command entry point shared by every transport.
#[derive(Debug, Clone)]
pub struct CommandGateway {
    controller: RobotController,
}

impl CommandGateway {
    /// Wrap a controller handle.
    pub const fn new(controller: RobotController) -> Self {
        Self { controller }
    }

    /// The controller this gateway drives.
    pub const fn controller(&self) -> &RobotController {
        &self.controller
    }

    /// Apply `request` and describe the outcome.
    ///
    /// `mode` is only read for `start`, defaulting to a full clean.
    pub async fn execute(&self, request: CommandRequest) -> CommandResult {
        debug!(command = ?request.kind, mode = ?request.mode, "Command received");

        match request.kind {
            CommandKind::Start => answer(
                self.controller.start(request.mode_or_default()).await,
                "Cleaning started",
            ),
            CommandKind::Pause => answer(
                self.controller.pause(PauseReason::UserRequest).await,
                "Cleaning paused",
            ),
            CommandKind::Resume => answer(self.controller.resume().await, "Cleaning resumed"),
            CommandKind::Stop => match self.controller.stop().await {
                Ok(outcome) => CommandResult {
                    warning: outcome
                        .storage_error
                        .map(|e| format!("Session history was not saved: {e}")),
                    ..CommandResult::accepted("Cleaning stopped", outcome.state)
                },
                Err(rejected) => refuse(rejected),
            },
        }
    }
}

fn answer(outcome: Result<RobotStateSnapshot, Rejected>, message: &str) -> CommandResult {
    match outcome {
        Ok(state) => CommandResult::accepted(message, state),
        Err(rejected) => refuse(rejected),
    }
}

fn refuse(rejected: Rejected) -> CommandResult {
    debug!(reason = %rejected.reason, "Command rejected");
    CommandResult::rejected(rejected.reason.to_string(), rejected.state)
}
