mod astar;
mod open_set;

use std::fmt;
use std::str::FromStr;

pub use astar::{AStar, AStarSettings, SolverState};
pub use open_set::OpenSet;

use crate::error::ConfigError;
use crate::grid::{Coord, Grid, Neighborhood};

/// Distance estimate between two cells.
pub trait Heuristic: fmt::Debug {
    fn evaluate(&self, a: Coord, b: Coord) -> f64;
}

/// Which cells can be reached in one move, and what the move costs.
pub trait Movement: fmt::Debug {
    fn neighbors(&self, grid: &Grid, coord: Coord) -> Vec<Coord>;

    /// Cost of moving from `from` onto the adjacent `to`.
    fn step_cost(&self, grid: &Grid, _from: Coord, to: Coord) -> f64 {
        grid[to].cost
    }
}

fn deltas(a: Coord, b: Coord) -> (f64, f64) {
    (a.0.abs_diff(b.0) as f64, a.1.abs_diff(b.1) as f64)
}

/// Straight-line distance.
#[derive(Debug, Clone, Copy)]
pub struct Euclidean;

impl Heuristic for Euclidean {
    fn evaluate(&self, a: Coord, b: Coord) -> f64 {
        let (dr, dc) = deltas(a, b);
        (dr * dr + dc * dc).sqrt()
    }
}

/// Sum of the row and column distances.
#[derive(Debug, Clone, Copy)]
pub struct Manhattan;

impl Heuristic for Manhattan {
    fn evaluate(&self, a: Coord, b: Coord) -> f64 {
        let (dr, dc) = deltas(a, b);
        dr + dc
    }
}

/// North, south, east and west moves around wall cells.
#[derive(Debug, Clone, Copy)]
pub struct Orthogonal;

impl Movement for Orthogonal {
    fn neighbors(&self, grid: &Grid, coord: Coord) -> Vec<Coord> {
        grid.neighbors(coord, Neighborhood::FourWay)
    }
}

/// Moves to any of the eight surrounding cells. Diagonal moves cost `sqrt(2)` times the cell cost
/// rather than the plain cell cost, which keeps the euclidean estimate admissible. Distances
/// reported for 8-way searches are therefore geometric lengths, not move counts.
#[derive(Debug, Clone, Copy)]
pub struct Diagonal;

impl Movement for Diagonal {
    fn neighbors(&self, grid: &Grid, coord: Coord) -> Vec<Coord> {
        grid.neighbors(coord, Neighborhood::EightWay)
    }

    fn step_cost(&self, grid: &Grid, from: Coord, to: Coord) -> f64 {
        if from.0 != to.0 && from.1 != to.1 {
            grid[to].cost * std::f64::consts::SQRT_2
        } else {
            grid[to].cost
        }
    }
}

/// Moves only through walls open on both sides.
#[derive(Debug, Clone, Copy)]
pub struct ThroughWalls;

impl Movement for ThroughWalls {
    fn neighbors(&self, grid: &Grid, coord: Coord) -> Vec<Coord> {
        grid.neighbors(coord, Neighborhood::WallConstrained)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeuristicKind {
    #[default]
    Euclidean,
    Manhattan,
}

impl HeuristicKind {
    pub fn strategy(self) -> Box<dyn Heuristic> {
        match self {
            HeuristicKind::Euclidean => Box::new(Euclidean),
            HeuristicKind::Manhattan => Box::new(Manhattan),
        }
    }
}

impl FromStr for HeuristicKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euclidean" => Ok(HeuristicKind::Euclidean),
            "manhattan" => Ok(HeuristicKind::Manhattan),
            _ => Err(ConfigError::UnknownHeuristic(s.to_string())),
        }
    }
}

impl fmt::Display for HeuristicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeuristicKind::Euclidean => write!(f, "euclidean"),
            HeuristicKind::Manhattan => write!(f, "manhattan"),
        }
    }
}

/// Movement rule, named after the distance it corresponds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovementKind {
    /// 8-way moves.
    Euclidean,
    /// 4-way moves.
    #[default]
    Manhattan,
    /// 4-way moves through open cell walls.
    Walls,
}

impl MovementKind {
    pub fn strategy(self) -> Box<dyn Movement> {
        match self {
            MovementKind::Euclidean => Box::new(Diagonal),
            MovementKind::Manhattan => Box::new(Orthogonal),
            MovementKind::Walls => Box::new(ThroughWalls),
        }
    }
}

impl FromStr for MovementKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euclidean" => Ok(MovementKind::Euclidean),
            "manhattan" => Ok(MovementKind::Manhattan),
            "walls" => Ok(MovementKind::Walls),
            _ => Err(ConfigError::UnknownMovement(s.to_string())),
        }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovementKind::Euclidean => write!(f, "euclidean"),
            MovementKind::Manhattan => write!(f, "manhattan"),
            MovementKind::Walls => write!(f, "walls"),
        }
    }
}
