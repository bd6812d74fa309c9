//! Error types for the grid, generators and solver.

use thiserror::Error;

use crate::grid::Coord;

/// A component refused to build because of its configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid choice for heuristic: must be either euclidean or manhattan, not {0:?}")]
    UnknownHeuristic(String),

    #[error("invalid choice for movement: must be one of euclidean, manhattan or walls, not {0:?}")]
    UnknownMovement(String),

    #[error("invalid choice for generator: must be either growing-tree or wilson, not {0:?}")]
    UnknownGenerator(String),

    #[error("heuristic weight must be a finite number >= 0, got {0}")]
    InvalidWeight(f64),

    #[error("{name} must lie in [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },

    #[error("grid dimensions must be at least 1x1, got {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("coordinate {0:?} lies outside the grid")]
    OutOfBounds(Coord),

    #[error("{0} needs a grid with cell walls")]
    NotWalled(&'static str),

    #[error("invalid command-line option: {0}")]
    InvalidOption(String),
}

/// The maze being carved no longer forms a spanning tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MazeError {
    #[error("loop erasure at {at:?} ended without finding the loop origin")]
    LoopOriginLost { at: Coord },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("maze integrity lost: {0}")]
    Maze(#[from] MazeError),

    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
