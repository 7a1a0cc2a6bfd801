#![allow(dead_code)]

pub mod face;

use iris_pointer::gaze::ScreenPoint;
use iris_pointer::pointer::{PointerCommand, PointerDevice, PointerError};

/// Pointer that records every command; can simulate a tripped failsafe on moves.
#[derive(Debug, Default)]
pub struct RecordingPointer {
    pub commands: Vec<PointerCommand>,
    pub failsafe: bool,
}

impl RecordingPointer {
    pub fn clicks(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, PointerCommand::Click))
            .count()
    }

    pub fn last_move(&self) -> Option<ScreenPoint> {
        self.commands.iter().rev().find_map(|c| match c {
            PointerCommand::Move { x, y } => Some(ScreenPoint::new(*x, *y)),
            PointerCommand::Click => None,
        })
    }
}

impl PointerDevice for RecordingPointer {
    fn move_to(&mut self, point: ScreenPoint) -> Result<(), PointerError> {
        if self.failsafe {
            return Err(PointerError::Failsafe("pointer in screen corner".to_string()));
        }
        self.commands.push(PointerCommand::Move {
            x: point.x,
            y: point.y,
        });
        Ok(())
    }

    fn click(&mut self) -> Result<(), PointerError> {
        self.commands.push(PointerCommand::Click);
        Ok(())
    }
}
