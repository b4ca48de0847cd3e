use crate::snake::Direction::{self, *};
use crate::sync::SharedState;
use crate::window::{KeyPress, KeySource};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Control {
    Turn(Direction),
    Quit,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    Continue,
    Quit,
}

pub fn control_for(key: &KeyPress) -> Option<Control> {
    match key.name.as_str() {
        "W" => Some(Control::Turn(Up)),
        "S" => Some(Control::Turn(Down)),
        "A" => Some(Control::Turn(Left)),
        "D" => Some(Control::Turn(Right)),
        "Q" => Some(Control::Quit),
        _ => None,
    }
}

/// Applies pending key presses to the shared direction.
pub struct InputController {
    state: SharedState,
}

impl InputController {
    pub fn new(state: SharedState) -> Self {
        InputController { state }
    }

    /// Drains `source` without blocking. Any direction is accepted, the last
    /// one wins. Stops at the first quit key.
    pub fn handle(&self, source: &KeySource) -> InputOutcome {
        while let Some(key) = source.event() {
            match control_for(&key) {
                Some(Control::Turn(direction)) => self.state.set_direction(direction),
                Some(Control::Quit) => return InputOutcome::Quit,
                None => {}
            }
        }

        InputOutcome::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    use crate::snake::GameState;

    fn setup(keys: &[&str]) -> (SharedState, InputController, KeySource) {
        let state = SharedState::new(GameState::initial(Instant::now()));
        let source = KeySource::new();
        for key in keys {
            source.push(KeyPress::new(*key));
        }
        (state.clone(), InputController::new(state), source)
    }

    fn direction(state: &SharedState) -> Direction {
        state.update(|s| s.direction)
    }

    #[test]
    fn wasd_map_to_directions() {
        for (key, expected) in &[("W", Up), ("S", Down), ("A", Left), ("D", Right)] {
            let (state, input, source) = setup(&[*key]);
            assert_eq!(input.handle(&source), InputOutcome::Continue);
            assert_eq!(direction(&state), *expected);
        }
    }

    #[test]
    fn last_write_wins() {
        let (state, input, source) = setup(&["W", "D"]);
        input.handle(&source);
        assert_eq!(direction(&state), Right);
    }

    #[test]
    fn reversal_is_accepted() {
        let (state, input, source) = setup(&["A"]);
        input.handle(&source);
        assert_eq!(direction(&state), Left);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let (state, input, source) = setup(&["X", "Escape", "w"]);
        assert_eq!(input.handle(&source), InputOutcome::Continue);
        assert_eq!(direction(&state), Right);
        assert_eq!(source.event(), None);
    }

    #[test]
    fn quit_stops_processing() {
        let (state, input, source) = setup(&["W", "Q", "S"]);
        assert_eq!(input.handle(&source), InputOutcome::Quit);
        assert_eq!(direction(&state), Up);
    }

    #[test]
    fn empty_queue_changes_nothing() {
        let (state, input, source) = setup(&[]);
        assert_eq!(input.handle(&source), InputOutcome::Continue);
        assert_eq!(direction(&state), Right);
    }
}
