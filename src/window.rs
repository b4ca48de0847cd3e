//! Boundary between the game core and whatever puts pixels on screen.
//!
//! A window hands out events one at a time, blocking until one is available.
//! Frame events carry the key presses that arrived since the previous frame.
//! Drawing is described in pixel coordinates; the implementation decides how
//! to map them onto its surface.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::GameResult;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCommand {
    Rect { x: i32, y: i32, width: i32, height: i32, color: Color },
    Text { text: String, color: Color },
}

/// Draw commands accumulated for one frame, in painting order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub commands: Vec<DrawCommand>,
}

impl Frame {
    pub fn new() -> Self {
        Frame::default()
    }

    pub fn rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color) {
        self.commands.push(DrawCommand::Rect { x, y, width, height, color });
    }

    pub fn text(&mut self, text: String, color: Color) {
        self.commands.push(DrawCommand::Text { text, color });
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub name: String,
}

impl KeyPress {
    pub fn new(name: impl Into<String>) -> Self {
        KeyPress { name: name.into() }
    }
}

/// Pending key presses, filled by the window and drained by the render path.
#[derive(Debug, Clone, Default)]
pub struct KeySource {
    queue: Arc<Mutex<VecDeque<KeyPress>>>,
}

impl KeySource {
    pub fn new() -> Self {
        KeySource::default()
    }

    pub fn push(&self, key: KeyPress) {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).push_back(key);
    }

    /// Next pending key press, or `None` without blocking.
    pub fn event(&self) -> Option<KeyPress> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).pop_front()
    }
}

#[derive(Debug)]
pub struct FrameEvent {
    pub source: KeySource,
}

#[derive(Debug)]
pub enum WindowEvent {
    Frame(FrameEvent),
    /// The window is going away. Carries an error message if it failed.
    Destroy(Option<String>),
}

/// Asks the window to schedule a frame soon. Safe to call from any thread.
pub trait Invalidator: Send + Sync {
    fn invalidate(&self);
}

pub trait Window {
    /// Blocks until the next event.
    fn next_event(&mut self) -> WindowEvent;

    fn submit(&mut self, frame: Frame) -> GameResult<()>;
}
