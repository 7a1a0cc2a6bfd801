//! Pointer actuation.
//!
//! The OS pointer primitive lives outside this process. Commands are either
//! written as JSON lines for an actuator sidecar or only logged (dry run).

use std::io::Write;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gaze::ScreenPoint;

#[derive(Debug, Error)]
pub enum PointerError {
    #[error("pointer io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("pointer encode error: {0}")]
    Encode(#[from] serde_json::Error),
    /// The device refused to move (e.g. a corner failsafe tripped).
    #[error("pointer failsafe triggered: {0}")]
    Failsafe(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "lowercase")]
pub enum PointerCommand {
    Move { x: i32, y: i32 },
    Click,
}

pub trait PointerDevice {
    /// Move to absolute screen pixels; the caller has already clamped them.
    fn move_to(&mut self, point: ScreenPoint) -> Result<(), PointerError>;
    /// Primary click at the current position.
    fn click(&mut self) -> Result<(), PointerError>;
}

/// Writes one JSON command per line and flushes after each.
pub struct JsonLinesPointer<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesPointer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn send(&mut self, cmd: PointerCommand) -> Result<(), PointerError> {
        serde_json::to_writer(&mut self.out, &cmd)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> PointerDevice for JsonLinesPointer<W> {
    fn move_to(&mut self, point: ScreenPoint) -> Result<(), PointerError> {
        self.send(PointerCommand::Move {
            x: point.x,
            y: point.y,
        })
    }

    fn click(&mut self) -> Result<(), PointerError> {
        self.send(PointerCommand::Click)
    }
}

/// Logs commands instead of actuating anything.
#[derive(Debug, Default)]
pub struct DryRunPointer {
    moves: u64,
    clicks: u64,
}

impl DryRunPointer {
    pub fn moves(&self) -> u64 {
        self.moves
    }

    pub fn clicks(&self) -> u64 {
        self.clicks
    }
}

impl PointerDevice for DryRunPointer {
    fn move_to(&mut self, point: ScreenPoint) -> Result<(), PointerError> {
        self.moves += 1;
        tracing::trace!(x = point.x, y = point.y, "Pointer move (dry run)");
        Ok(())
    }

    fn click(&mut self) -> Result<(), PointerError> {
        self.clicks += 1;
        tracing::info!(clicks = self.clicks, "Pointer click (dry run)");
        Ok(())
    }
}
