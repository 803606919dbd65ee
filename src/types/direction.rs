//! Cardinal facings.

use crate::error::ArchitectError;
use crate::geometry::Quaternion;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The six cardinal directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Down,
    Up,
    North,
    South,
    West,
    East,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Down,
        Direction::Up,
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// The cardinal rotation that turns north-facing geometry to this direction.
    pub fn rotation(&self) -> Quaternion {
        match self {
            Direction::North => Quaternion::NORTH,
            Direction::East => Quaternion::EAST,
            Direction::South => Quaternion::SOUTH,
            Direction::West => Quaternion::WEST,
            Direction::Up => Quaternion::UP,
            Direction::Down => Quaternion::DOWN,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Direction::Down => "down",
            Direction::Up => "up",
            Direction::North => "north",
            Direction::South => "south",
            Direction::West => "west",
            Direction::East => "east",
        }
    }
}

impl FromStr for Direction {
    type Err = ArchitectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Direction::ALL
            .into_iter()
            .find(|dir| dir.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ArchitectError::InvalidGeometry(format!("unknown direction '{}'", s)))
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec3;

    #[test]
    fn test_cardinal_rotations_about_y() {
        let north = Vec3::new(0.0, 0.0, -1.0);
        for dir in [Direction::North, Direction::East, Direction::South, Direction::West] {
            let rotated = dir.rotation().rotate_vector(north);
            let expected = match dir {
                Direction::East => Vec3::new(-1.0, 0.0, 0.0),
                Direction::West => Vec3::new(1.0, 0.0, 0.0),
                Direction::South => Vec3::new(0.0, 0.0, 1.0),
                _ => north,
            };
            assert!(rotated.abs_diff_eq(expected, 1e-9), "{dir}: {rotated}");
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!("NORTH".parse::<Direction>().unwrap(), Direction::North);
        assert_eq!(Direction::Up.to_string(), "up");
        assert!("sideways".parse::<Direction>().is_err());
        let json: Direction = serde_json::from_str("\"west\"").unwrap();
        assert_eq!(json, Direction::West);
    }
}
