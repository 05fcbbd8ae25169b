use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

/// One of the six principal axes of a grid, relative to the grid itself.
///
/// The declaration order is the order directions are reported in.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    TryFromPrimitive,
    IntoPrimitive,
)]
#[repr(u8)]
pub enum Direction {
    Forward = 0,
    Backward = 1,
    Left = 2,
    Right = 3,
    Up = 4,
    Down = 5,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Forward,
        Direction::Backward,
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// The opposite axis. A thruster facing `Backward` pushes the grid
    /// `Forward`.
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Forward => "Forward",
            Self::Backward => "Backward",
            Self::Left => "Left",
            Self::Right => "Right",
            Self::Up => "Up",
            Self::Down => "Down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

#[test]
fn flipping_twice_is_identity() {
    for dir in Direction::ALL {
        assert_ne!(dir.flipped(), dir);
        assert_eq!(dir.flipped().flipped(), dir);
    }
}

#[test]
fn display_honours_width() {
    assert_eq!(format!("{:<10}|", Direction::Up), "Up        |");
    assert_eq!(Direction::try_from(3u8).ok(), Some(Direction::Right));
    assert!(Direction::try_from(6u8).is_err());
    assert_eq!(u8::from(Direction::Down), 5);
}
