use serde::{Deserialize, Serialize};

/// Direction Pointer — current movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dp {
    Right = 0,
    Down = 1,
    Left = 2,
    Up = 3,
}

impl Dp {
    /// Rotate(n) = (Dp + n) mod 4, with a true mathematical modulus so
    /// negative `n` rotates counter-clockwise rather than panicking or
    /// producing a negative index.
    pub fn rotate(self, n: i32) -> Self {
        let current = self as i32;
        match (current + n).rem_euclid(4) {
            0 => Dp::Right,
            1 => Dp::Down,
            2 => Dp::Left,
            3 => Dp::Up,
            _ => unreachable!(),
        }
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Dp::Right => (1, 0),
            Dp::Down => (0, 1),
            Dp::Left => (-1, 0),
            Dp::Up => (0, -1),
        }
    }
}

/// Codel Chooser — tie-break for exit-codel selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cc {
    Left = 0,
    Right = 1,
}

impl Cc {
    pub fn toggle(self) -> Self {
        match self {
            Cc::Left => Cc::Right,
            Cc::Right => Cc::Left,
        }
    }
}

/// A position in the codel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Step one codel in `dir`, or `None` if that would leave the grid.
    pub fn step(&self, dir: Dp, width: usize, height: usize) -> Option<Position> {
        let (dx, dy) = dir.delta();
        let new_x = self.x as i32 + dx;
        let new_y = self.y as i32 + dy;

        if new_x >= 0 && new_y >= 0 && (new_x as usize) < width && (new_y as usize) < height {
            Some(Position::new(new_x as usize, new_y as usize))
        } else {
            None
        }
    }
}
