use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thiserror::Error;

use crate::config::Settings;
use crate::snake::{Direction, Snake};
use crate::vector::Vec2;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Tile {
    Empty,
    Snake,
    Apple,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("snake crashed at {0}")]
pub struct Collision(pub Vec2);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("no empty cell left for an apple")]
pub struct BoardFull;

#[derive(Debug, PartialEq, Eq)]
pub enum Meal {
    NotEaten,
    Respawned(Vec2),
    BoardFull,
}

#[derive(Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Reversal onto the neck; nothing changed.
    Ignored,
    Moved { new_head: Vec2, old_tail: Option<Vec2>, meal: Meal },
}

/// Grid occupancy plus everything a move can change: snake, apple, score,
/// speed and banked growth.
///
/// Invariant: the cells marked `Tile::Snake` are exactly the positions in the
/// snake body, and at most one cell is `Tile::Apple`.
pub struct Board {
    settings: Settings,
    grid: Vec<Tile>,
    snake: Snake,
    apple: Option<Vec2>,
    score: u32,
    hi_score: u32,
    speed: f64,
    growth: u32,
    rng: StdRng,
}

impl Board {
    pub fn new(settings: &Settings) -> Self {
        Board::with_rng(settings, StdRng::from_entropy())
    }

    pub fn with_rng(settings: &Settings, rng: StdRng) -> Self {
        let cells = (settings.width * settings.height).max(0) as usize;
        let mut board = Board {
            settings: settings.clone(),
            grid: vec![Tile::Empty; cells],
            snake: Snake::new(settings.start, Direction::Right),
            apple: None,
            score: 0,
            hi_score: 0,
            speed: settings.start_speed,
            growth: settings.growth_seed(),
            rng,
        };
        board.set(settings.start, Tile::Snake);
        board
    }

    /// Starts a fresh round heading `direction`. The hi-score survives.
    pub fn reset(&mut self, direction: Direction) -> Result<Vec2, BoardFull> {
        self.grid.iter_mut().for_each(|t| *t = Tile::Empty);
        self.snake = Snake::new(self.settings.start, direction);
        self.set(self.settings.start, Tile::Snake);
        self.apple = None;
        self.score = 0;
        self.speed = self.settings.start_speed;
        self.growth = self.settings.growth_seed();

        self.spawn_apple()
    }

    /// Places an apple on a uniformly chosen empty cell.
    pub fn spawn_apple(&mut self) -> Result<Vec2, BoardFull> {
        let width = self.settings.width;
        let empties: Vec<Vec2> = self.grid.iter().enumerate()
            .filter(|(_, tile)| **tile == Tile::Empty)
            .map(|(i, _)| Vec2::new(i as i32 % width, i as i32 / width))
            .collect();

        let pos = *empties.choose(&mut self.rng).ok_or(BoardFull)?;
        self.set(pos, Tile::Apple);
        self.apple = Some(pos);
        Ok(pos)
    }

    pub fn try_move(&mut self, dir: Direction) -> Result<MoveOutcome, Collision> {
        if self.snake.is_reversal(dir) {
            return Ok(MoveOutcome::Ignored);
        }

        let new_head = self.snake.head() + dir.offset();
        let target = self.tile(new_head);
        if matches!(target, None | Some(Tile::Snake)) {
            return Err(Collision(new_head));
        }

        self.snake.set_direction(dir);

        let ate = target == Some(Tile::Apple);
        if ate {
            self.score += 1;
            if self.score > self.hi_score {
                self.hi_score += 1;
            }
            self.speed += self.settings.speed_increase;
            self.growth += 1;
            self.apple = None;
            debug!("apple eaten at {}, score {}, speed {:.1}", new_head, self.score, self.speed);
        }

        self.set(new_head, Tile::Snake);
        self.snake.push_head(new_head);

        let old_tail = if self.growth == 0 {
            let tail = self.snake.pop_tail();
            if let Some(pos) = tail {
                self.set(pos, Tile::Empty);
            }
            tail
        } else {
            self.growth -= 1;
            None
        };

        let meal = if !ate {
            Meal::NotEaten
        } else {
            match self.spawn_apple() {
                Ok(pos) => Meal::Respawned(pos),
                Err(BoardFull) => Meal::BoardFull,
            }
        };

        Ok(MoveOutcome::Moved { new_head, old_tail, meal })
    }

    pub fn tile(&self, pos: Vec2) -> Option<Tile> {
        self.index(pos).map(|i| self.grid[i])
    }

    pub fn width(&self) -> i32 {
        self.settings.width
    }

    pub fn height(&self) -> i32 {
        self.settings.height
    }

    #[cfg(test)]
    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn direction(&self) -> Direction {
        self.snake.get_direction()
    }

    #[cfg(test)]
    pub fn apple(&self) -> Option<Vec2> {
        self.apple
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn hi_score(&self) -> u32 {
        self.hi_score
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    #[cfg(test)]
    pub fn growth(&self) -> u32 {
        self.growth
    }

    ///////////////////////////////////////////////////////////////////////////

    fn index(&self, pos: Vec2) -> Option<usize> {
        let (w, h) = (self.settings.width, self.settings.height);
        if pos.x < 0 || pos.y < 0 || pos.x >= w || pos.y >= h {
            return None;
        }
        Some((pos.y * w + pos.x) as usize)
    }

    fn set(&mut self, pos: Vec2, tile: Tile) {
        if let Some(i) = self.index(pos) {
            self.grid[i] = tile;
        }
    }

    #[cfg(test)]
    pub fn place_apple(&mut self, pos: Vec2) {
        if let Some(old) = self.apple.take() {
            self.set(old, Tile::Empty);
        }
        self.set(pos, Tile::Apple);
        self.apple = Some(pos);
    }
}
