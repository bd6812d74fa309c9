use rand::{SeedableRng, rngs::StdRng};

mod growing_tree;
mod wilson;

pub use growing_tree::GrowingTree;
pub use wilson::Wilson;

use crate::Step;
use crate::error::{ConfigError, Error, MazeError};
use crate::grid::Grid;

/// Get a random number generator, optionally seeded for reproducibility.
pub fn get_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

/// A maze generator that carves passages into a walled grid one unit of work at a time.
///
/// Generators use the `Visited` kind to mark cells joined to the maze, so endpoints should be
/// designated after generation (and after [`Grid::reset_search_state`]).
pub trait MazeGenerator {
    /// Performs up to `n` units of work. With `render_skip` set no changed cells are collected,
    /// for hosts that redraw the whole grid afterwards.
    fn advance(&mut self, n: usize, render_skip: bool) -> Result<Step, MazeError>;

    fn is_done(&self) -> bool;

    /// Number of cells joined to the maze so far.
    fn visited(&self) -> usize;

    fn grid(&self) -> &Grid;

    /// Hands the grid back, ending generation.
    fn into_grid(self: Box<Self>) -> Grid;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Generator {
    /// Growing tree with the probability of extending the newest cell rather than a random one.
    GrowingTree { backtrack_prob: f64 },
    Wilson,
}

impl Generator {
    pub const DEFAULT_BACKTRACK_PROB: f64 = 0.3;

    /// Builds the generator over `grid`, taking ownership of it until generation ends.
    pub fn build(
        self,
        grid: Grid,
        seed: Option<u64>,
    ) -> Result<Box<dyn MazeGenerator>, ConfigError> {
        Ok(match self {
            Generator::GrowingTree { backtrack_prob } => {
                Box::new(GrowingTree::new(grid, backtrack_prob, seed)?)
            }
            Generator::Wilson => Box::new(Wilson::new(grid, seed)?),
        })
    }

    /// Parses a generator name; `backtrack_prob` applies to the growing tree only.
    pub fn from_name(name: &str, backtrack_prob: f64) -> Result<Self, ConfigError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "growing-tree" | "growing_tree" | "growingtree" => {
                Ok(Generator::GrowingTree { backtrack_prob })
            }
            "wilson" => Ok(Generator::Wilson),
            _ => Err(ConfigError::UnknownGenerator(name.to_string())),
        }
    }
}

impl std::str::FromStr for Generator {
    type Err = ConfigError;

    /// Parses a generator name with the default backtrack probability.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Generator::from_name(s, Generator::DEFAULT_BACKTRACK_PROB)
    }
}

impl std::fmt::Display for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Generator::GrowingTree { backtrack_prob } => {
                write!(f, "Growing Tree (backtrack {:.2})", backtrack_prob)
            }
            Generator::Wilson => write!(f, "Wilson's Algorithm"),
        }
    }
}

/// Runs a generator over `grid` to completion and returns the carved grid.
pub fn generate_maze(grid: Grid, generator: Generator, seed: Option<u64>) -> Result<Grid, Error> {
    let mut maze = generator.build(grid, seed)?;
    while !maze.is_done() {
        maze.advance(1024, true)?;
    }
    Ok(maze.into_grid())
}
