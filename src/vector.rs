use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Integer 2D vector. Screen convention: y grows downwards.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    pub const UP: Vec2 = Vec2::new(0, -1);
    pub const DOWN: Vec2 = Vec2::new(0, 1);
    pub const LEFT: Vec2 = Vec2::new(-1, 0);
    pub const RIGHT: Vec2 = Vec2::new(1, 0);

    pub const fn new(x: i32, y: i32) -> Self {
        Vec2 { x, y }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        *self = *self + rhs;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        *self = *self - rhs;
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn componentwise_arithmetic() {
        let mut v = Vec2::new(3, 4);
        v += Vec2::RIGHT;
        assert_eq!(v, Vec2::new(4, 4));
        v -= Vec2::new(1, 2);
        assert_eq!(v, Vec2::new(3, 2));
        assert_eq!(v - Vec2::new(3, 2), Vec2::default());
    }

    #[test]
    fn opposite_units_cancel() {
        assert_eq!(Vec2::UP + Vec2::DOWN, Vec2::default());
        assert_eq!(Vec2::LEFT + Vec2::RIGHT, Vec2::default());
        assert_eq!(Vec2::new(10, 10) + Vec2::UP, Vec2::new(10, 9));
    }

    #[test]
    fn display() {
        assert_eq!(Vec2::new(-1, 7).to_string(), "(-1, 7)");
    }
}
