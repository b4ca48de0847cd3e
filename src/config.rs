use std::time::Duration;

use crate::window::Color;

pub const CELL_SIZE: i32 = 20;
pub const WIDTH: i32 = 30;
pub const HEIGHT: i32 = 30;

pub const FOOD_DELAY: Duration = Duration::from_secs(5);
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

pub const SNAKE_COLOR: Color = Color { r: 0x80, g: 0, b: 0 };
pub const SCORE_COLOR: Color = Color { r: 127, g: 0, b: 0 };

/// Environment variable naming the log file. No logging when unset.
pub const LOG_ENV_VAR: &str = "SNAKE_LOG";

/// Tunables for the movement engine. `Default` matches the constants above.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub width: i32,
    pub height: i32,
    pub tick_interval: Duration,
    pub food_delay: Duration,
    /// Keep the oldest segment when the new cell lands on food.
    /// Off by default: the body never grows.
    pub growth: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            width: WIDTH,
            height: HEIGHT,
            tick_interval: TICK_INTERVAL,
            food_delay: FOOD_DELAY,
            growth: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_constants() {
        let config = GameConfig::default();
        assert_eq!(config.width, WIDTH);
        assert_eq!(config.height, HEIGHT);
        assert_eq!(config.tick_interval, Duration::from_millis(100));
        assert_eq!(config.food_delay, Duration::from_secs(5));
        assert!(!config.growth);
    }
}
