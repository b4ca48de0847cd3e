use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::snake::{Direction, GameState, Point};

/// What the render path needs from one consistent view of the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub body: Vec<Point>,
    pub food: Option<Point>,
}

/// Handle to the game state. Every read and write goes through the lock.
#[derive(Debug, Clone)]
pub struct SharedState {
    inner: Arc<Mutex<GameState>>,
}

impl SharedState {
    pub fn new(state: GameState) -> Self {
        SharedState { inner: Arc::new(Mutex::new(state)) }
    }

    /// Runs `f` with exclusive access and returns its result.
    pub fn update<T>(&self, f: impl FnOnce(&mut GameState) -> T) -> T {
        f(&mut self.lock())
    }

    pub fn set_direction(&self, direction: Direction) {
        self.lock().direction = direction;
    }

    /// Copies body and food under a single lock acquisition.
    pub fn snapshot(&self) -> Snapshot {
        let state = self.lock();
        Snapshot { body: state.snake.body().to_vec(), food: state.food }
    }

    fn lock(&self) -> MutexGuard<'_, GameState> {
        // A panic elsewhere cannot leave GameState half-built, so keep going.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Process-wide stop signal, observed by every long-running thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        let (flag, cvar) = &*self.inner;
        *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleeps until `deadline` or cancellation, whichever comes first.
    /// Returns `true` if cancelled.
    pub fn wait_until(&self, deadline: Instant) -> bool {
        let (flag, cvar) = &*self.inner;
        let mut cancelled = flag.lock().unwrap_or_else(PoisonError::into_inner);

        while !*cancelled {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            cancelled = cvar
                .wait_timeout(cancelled, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }

        *cancelled
    }
}
