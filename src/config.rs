use std::time::Duration;

use crate::vector::Vec2;

pub const MAP_WIDTH: i32 = 20;
pub const MAP_HEIGHT: i32 = 20;
pub const START_POS: Vec2 = Vec2::new(10, 10);
pub const FPS: u32 = 30;
pub const START_SPEED: f64 = 1.5;
pub const SPEED_INCREASE: f64 = 0.1;
pub const RESTART_COUNTDOWN_SECS: f64 = 5.0;
pub const INITIAL_SNAKE_LENGTH: u32 = 3;

pub const LOG_FILE: &str = "snake.log";

/// Fixed game parameters. Only tests ever build anything but the default.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub width: i32,
    pub height: i32,
    pub start: Vec2,
    pub fps: u32,
    pub start_speed: f64,
    pub speed_increase: f64,
    pub restart_countdown: f64,
    pub initial_length: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            width: MAP_WIDTH,
            height: MAP_HEIGHT,
            start: START_POS,
            fps: FPS,
            start_speed: START_SPEED,
            speed_increase: SPEED_INCREASE,
            restart_countdown: RESTART_COUNTDOWN_SECS,
            initial_length: INITIAL_SNAKE_LENGTH,
        }
    }
}

impl Settings {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps.max(1) as f64)
    }

    /// Tail growth banked at round start so the snake reaches its initial length.
    pub fn growth_seed(&self) -> u32 {
        self.initial_length.saturating_sub(1)
    }
}
