use std::sync::Arc;
use std::time::Instant;

use log::{info, warn};

use crate::config::{GameConfig, CELL_SIZE, SCORE_COLOR, SNAKE_COLOR};
use crate::engine::MovementEngine;
use crate::error::{GameError, GameResult};
use crate::input::{InputController, InputOutcome};
use crate::snake::GameState;
use crate::sync::{CancelToken, SharedState, Snapshot};
use crate::window::{Frame, Invalidator, Window, WindowEvent};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Exit {
    /// The quit key was pressed.
    Quit,
    /// The window was closed without an error.
    Closed,
}

/// Consumes window events: applies input and draws one frame per request.
pub struct RenderLoop {
    state: SharedState,
    input: InputController,
}

impl RenderLoop {
    pub fn new(state: SharedState) -> Self {
        RenderLoop { input: InputController::new(state.clone()), state }
    }

    pub fn run(&self, window: &mut dyn Window) -> GameResult<Exit> {
        loop {
            match window.next_event() {
                WindowEvent::Destroy(Some(err)) => return Err(GameError::Presentation(err)),
                WindowEvent::Destroy(None) => return Ok(Exit::Closed),
                WindowEvent::Frame(ev) => {
                    if self.input.handle(&ev.source) == InputOutcome::Quit {
                        return Ok(Exit::Quit);
                    }

                    let frame = draw(&self.state.snapshot());
                    window.submit(frame)?;
                }
            }
        }
    }
}

/// Body cells first, then food, then the score label.
pub fn draw(snapshot: &Snapshot) -> Frame {
    let mut frame = Frame::new();

    for cell in snapshot.body.iter().chain(snapshot.food.iter()) {
        // The body can wander arbitrarily far off the grid.
        let x = cell.x.saturating_mul(CELL_SIZE);
        let y = cell.y.saturating_mul(CELL_SIZE);
        frame.rect(x, y, CELL_SIZE, CELL_SIZE, SNAKE_COLOR);
    }
    frame.text(format!("Score: {}", snapshot.body.len()), SCORE_COLOR);

    frame
}

/// Owns the shared state for one run and wires the threads around it.
pub struct SnakeGame {
    config: GameConfig,
    state: SharedState,
    token: CancelToken,
}

impl SnakeGame {
    pub fn new(config: GameConfig) -> Self {
        SnakeGame {
            config,
            state: SharedState::new(GameState::initial(Instant::now())),
            token: CancelToken::new(),
        }
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Runs until the render loop ends, then stops the movement thread.
    pub fn run(&self, window: &mut dyn Window, invalidator: Arc<dyn Invalidator>) -> GameResult<Exit> {
        let engine = MovementEngine::new(self.config.clone());
        let movement = engine.spawn(self.state.clone(), invalidator, self.token.clone());

        let result = RenderLoop::new(self.state.clone()).run(window);
        match &result {
            Ok(exit) => info!("render loop finished: {:?}", exit),
            Err(e) => warn!("render loop failed: {}", e),
        }

        self.token.cancel();
        if movement.join().is_err() {
            warn!("movement thread panicked");
        }

        result
    }
}
