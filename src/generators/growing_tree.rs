use rand::{Rng, rngs::StdRng};

use super::{MazeGenerator, get_rng};
use crate::Step;
use crate::error::{ConfigError, MazeError};
use crate::grid::{CellKind, Coord, Grid};

/// Growing-tree maze generator.
///
/// Keeps a list of cells already in the maze that may still have unvisited neighbours. Each step
/// extends either the newest cell (with probability `backtrack_prob`, like a recursive
/// backtracker) or a uniformly random one (like Prim's algorithm).
/// See <https://weblog.jamisbuck.org/2011/1/27/maze-generation-growing-tree-algorithm>
pub struct GrowingTree {
    grid: Grid,
    backtrack_prob: f64,
    /// Acts as both stack and sample pool
    working: Vec<Coord>,
    visited: usize,
    rng: StdRng,
}

impl GrowingTree {
    pub fn new(mut grid: Grid, backtrack_prob: f64, seed: Option<u64>) -> Result<Self, ConfigError> {
        if !grid.is_walled() {
            return Err(ConfigError::NotWalled("maze generation"));
        }
        if !(0.0..=1.0).contains(&backtrack_prob) {
            return Err(ConfigError::InvalidProbability {
                name: "backtrack probability",
                value: backtrack_prob,
            });
        }

        let mut rng = get_rng(seed);
        // Initialize the starting point
        let start: Coord = (
            rng.random_range(0..grid.rows()),
            rng.random_range(0..grid.cols()),
        );
        grid[start].kind = CellKind::Visited;
        tracing::debug!(
            "[growing tree] starting at {:?} with backtrack probability {}",
            start,
            backtrack_prob
        );

        Ok(GrowingTree {
            grid,
            backtrack_prob,
            working: vec![start],
            visited: 1,
            rng,
        })
    }

    /// Cells still eligible to grow from, oldest first.
    pub fn working(&self) -> &[Coord] {
        &self.working
    }

    fn done_message(&self) -> String {
        format!(
            "Maze generation complete -- ({},{})",
            self.grid.rows(),
            self.grid.cols()
        )
    }
}

impl MazeGenerator for GrowingTree {
    fn advance(&mut self, n: usize, render_skip: bool) -> Result<Step, MazeError> {
        let record = !render_skip;
        let mut step = Step::default();
        for _ in 0..n {
            if self.working.is_empty() {
                step.message = self.done_message();
                break;
            }

            let idx = if self.rng.random_bool(self.backtrack_prob) {
                self.working.len() - 1
            } else {
                self.rng.random_range(0..self.working.len())
            };
            let cell = self.working[idx];

            let unvisited = self
                .grid
                .adjacent(cell)
                .filter(|&c| self.grid[c].kind != CellKind::Visited)
                .collect::<Vec<_>>();

            if unvisited.is_empty() {
                // Dead end; keep the rest of the list in insertion order
                self.working.remove(idx);
                step.message = format!("cell removed -- {} remaining", self.working.len());
                if self.working.is_empty() {
                    tracing::info!(
                        "[growing tree] maze complete, {} cells visited",
                        self.visited
                    );
                }
                continue;
            }

            let neighbor = unvisited[self.rng.random_range(0..unvisited.len())];
            self.grid.tunnel(cell, neighbor);
            self.grid[neighbor].kind = CellKind::Visited;
            self.working.push(neighbor);
            self.visited += 1;
            step.touch(cell, record);
            step.touch(neighbor, record);
            step.message = format!("tunnelled to {:?}", neighbor);
        }
        Ok(step)
    }

    fn is_done(&self) -> bool {
        self.working.is_empty()
    }

    fn visited(&self) -> usize {
        self.visited
    }

    fn grid(&self) -> &Grid {
        &self.grid
    }

    fn into_grid(self: Box<Self>) -> Grid {
        self.grid
    }
}
