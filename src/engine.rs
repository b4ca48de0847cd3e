use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use log::debug;
use rand::Rng;

use crate::config::GameConfig;
use crate::snake::{GameState, Point};
use crate::sync::{CancelToken, SharedState};
use crate::window::Invalidator;

/// Advances the game state on a fixed interval.
pub struct MovementEngine {
    config: GameConfig,
}

impl MovementEngine {
    pub fn new(config: GameConfig) -> Self {
        MovementEngine { config }
    }

    /// One tick: refresh food if due, then shift the body.
    pub fn step<R: Rng>(&self, state: &mut GameState, now: Instant, rng: &mut R) {
        let food_due = match state.food {
            None => true,
            Some(_) => now.saturating_duration_since(state.last_food_placement) > self.config.food_delay,
        };
        if food_due {
            let food = Point::new(rng.gen_range(0..self.config.width), rng.gen_range(0..self.config.height));
            debug!("placing food at ({}, {})", food.x, food.y);
            state.food = Some(food);
            state.last_food_placement = now;
        }

        let eats = self.config.growth
            && state.food.is_some()
            && state.snake.reference_cell().map(|cell| cell.step(state.direction)) == state.food;

        state.snake.shift(state.direction, eats);

        if eats {
            state.food = None;
        }
    }

    /// Ticks until `token` is cancelled, invalidating the window after each tick.
    pub fn run<R: Rng>(&self, shared: &SharedState, invalidator: &dyn Invalidator, token: &CancelToken, rng: &mut R) {
        let interval = self.config.tick_interval;
        let mut next_tick = Instant::now() + interval;

        debug!("movement engine started, interval {:?}", interval);

        while !token.wait_until(next_tick) {
            shared.update(|state| self.step(state, Instant::now(), rng));
            invalidator.invalidate();

            next_tick += interval;
            let now = Instant::now();
            if next_tick < now {
                // Fell behind; drop the missed ticks instead of bursting.
                next_tick = now + interval;
            }
        }

        debug!("movement engine stopped");
    }

    pub fn spawn(
        self,
        shared: SharedState,
        invalidator: Arc<dyn Invalidator>,
        token: CancelToken,
    ) -> JoinHandle<()> {
        thread::spawn(move || {
            let mut rng = rand::thread_rng();
            self.run(&shared, &*invalidator, &token, &mut rng);
        })
    }
}
