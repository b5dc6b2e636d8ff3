use std::collections::VecDeque;

use crate::vector::Vec2;
use Direction::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub fn offset(self) -> Vec2 {
        match self {
            Up => Vec2::UP,
            Down => Vec2::DOWN,
            Left => Vec2::LEFT,
            Right => Vec2::RIGHT,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    pub fn is_orthogonal(self, other: Direction) -> bool {
        matches!((self, other), (Up, Left) | (Up, Right) | (Down, Left) | (Down, Right) |
                                (Left, Up) | (Left, Down) | (Right, Up) | (Right, Down))
    }
}

/// Snake body, head at the front. Occupancy bookkeeping lives in the board grid.
pub struct Snake {
    body: VecDeque<Vec2>,
    direction: Direction,
}

impl Snake {
    pub fn new(pos: Vec2, direction: Direction) -> Self {
        let mut body = VecDeque::new();
        body.push_front(pos);
        Snake { body, direction }
    }

    #[cfg(test)]
    pub fn body(&self) -> &VecDeque<Vec2> {
        &self.body
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn head(&self) -> Vec2 {
        // The body is never empty: it is created with one segment and
        // `pop_tail` always follows a `push_head`.
        self.body[0]
    }

    pub fn push_head(&mut self, pos: Vec2) {
        self.body.push_front(pos);
    }

    pub fn pop_tail(&mut self) -> Option<Vec2> {
        if self.body.len() <= 1 {
            return None;
        }
        self.body.pop_back()
    }

    pub fn get_direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, new_direction: Direction) {
        self.direction = new_direction;
    }

    /// A move towards the opposite of the current heading would fold the head
    /// back onto the neck and is ignored rather than treated as a crash.
    pub fn is_reversal(&self, dir: Direction) -> bool {
        dir == self.direction.opposite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orthogonality() {
        assert!(Up.is_orthogonal(Left));
        assert!(Right.is_orthogonal(Down));
        assert!(!Up.is_orthogonal(Up));
        assert!(!Up.is_orthogonal(Down));
        assert!(!Left.is_orthogonal(Right));
    }

    #[test]
    fn reversal_only_for_opposite() {
        let snake = Snake::new(Vec2::new(5, 5), Right);
        assert!(snake.is_reversal(Left));
        assert!(!snake.is_reversal(Right));
        assert!(!snake.is_reversal(Up));
        assert!(!snake.is_reversal(Down));
    }

    #[test]
    fn head_and_tail() {
        let mut snake = Snake::new(Vec2::new(5, 5), Right);
        assert_eq!(snake.pop_tail(), None);
        snake.push_head(Vec2::new(6, 5));
        assert_eq!(snake.head(), Vec2::new(6, 5));
        assert_eq!(snake.len(), 2);
        assert_eq!(snake.pop_tail(), Some(Vec2::new(5, 5)));
        assert_eq!(snake.body().iter().copied().collect::<Vec<_>>(), vec![Vec2::new(6, 5)]);
    }
}
