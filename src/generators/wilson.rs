use rand::{Rng, rngs::StdRng, seq::IndexedRandom};
use rand_set::RandSetDefault;

use super::{MazeGenerator, get_rng};
use crate::Step;
use crate::error::{ConfigError, MazeError};
use crate::grid::{CellKind, Coord, Grid};

/// The random walk in progress.
#[derive(Debug, Clone, Copy)]
struct Walk {
    /// Where the walk started
    origin: Coord,
    /// Cell about to be classified
    step: Coord,
    /// Cell the walk arrived at `step` from. It becomes `step`'s link only if `step` is a fresh
    /// cell, so revisiting the walk never overwrites an existing link.
    from: Coord,
}

/// Maze generator based on Wilson's algorithm, which samples a uniform spanning tree of the grid
/// with loop-erased random walks. Every step of every walk is a separate unit of work so the
/// process can be animated.
/// See <http://weblog.jamisbuck.org/2011/1/20/maze-generation-wilson-s-algorithm>
///
/// Cells in the tree are `Visited`; cells on the current walk are `OpenSet` and link back to
/// their predecessor on the walk through [`Cell::walk_link`](crate::grid::Cell::walk_link).
pub struct Wilson {
    grid: Grid,
    /// Cells not yet part of the tree
    working_set: RandSetDefault<Coord>,
    walk: Option<Walk>,
    visited: usize,
    rng: StdRng,
}

impl Wilson {
    pub fn new(mut grid: Grid, seed: Option<u64>) -> Result<Self, ConfigError> {
        if !grid.is_walled() {
            return Err(ConfigError::NotWalled("maze generation"));
        }
        let mut rng = get_rng(seed);
        let mut working_set = grid.coords().collect::<RandSetDefault<_>>();

        // Seed the tree with one random cell
        let seed_cell: Coord = (
            rng.random_range(0..grid.rows()),
            rng.random_range(0..grid.cols()),
        );
        grid[seed_cell].kind = CellKind::Visited;
        working_set.remove(&seed_cell);
        tracing::debug!("[wilson] tree seeded at {:?}", seed_cell);

        let mut wilson = Wilson {
            grid,
            working_set,
            walk: None,
            visited: 1,
            rng,
        };
        wilson.start_walk(&mut Step::default(), false);
        Ok(wilson)
    }

    /// Number of cells not yet joined to the tree.
    pub fn remaining(&self) -> usize {
        self.working_set.len()
    }

    /// Origin of the walk in progress.
    pub fn current_origin(&self) -> Option<Coord> {
        self.walk.map(|walk| walk.origin)
    }

    fn random_neighbor(&mut self, coord: Coord) -> Coord {
        let neighbors = self.grid.adjacent(coord).collect::<Vec<_>>();
        neighbors[self.rng.random_range(0..neighbors.len())]
    }

    /// Begins a new walk from a random cell outside the tree, if any remain.
    fn start_walk(&mut self, step: &mut Step, record: bool) {
        self.walk = None;
        // Drawn with our own rng so a seed fixes the whole maze
        let Some(&origin) = self.working_set.iter().as_slice().choose(&mut self.rng) else {
            return;
        };
        let cell = &mut self.grid[origin];
        cell.kind = CellKind::OpenSet;
        cell.walk_link = None;
        step.touch(origin, record);

        let next = self.random_neighbor(origin);
        self.walk = Some(Walk {
            origin,
            step: next,
            from: origin,
        });
    }

    /// The walk reached the tree: carve it in, from the join point back to its origin.
    fn join_tree(&mut self, walk: Walk, step: &mut Step, record: bool) {
        self.grid.tunnel(walk.step, walk.from);
        step.touch(walk.step, record);

        let mut cell = walk.from;
        loop {
            self.grid[cell].kind = CellKind::Visited;
            self.working_set.remove(&cell);
            self.visited += 1;
            step.touch(cell, record);
            match self.grid[cell].walk_link.take() {
                Some(prev) => {
                    self.grid.tunnel(cell, prev);
                    cell = prev;
                }
                None => break,
            }
        }

        step.message = format!("New path found from {:?} to {:?}", walk.origin, walk.step);
        tracing::debug!(
            "[wilson] walk from {:?} joined the tree at {:?}, {} cells left",
            walk.origin,
            walk.step,
            self.working_set.len()
        );
        self.start_walk(step, record);
    }

    /// The walk crossed itself at `walk.step`: erase the loop back to that cell and carry on
    /// from there.
    fn erase_loop(&mut self, walk: Walk, step: &mut Step, record: bool) -> Result<(), MazeError> {
        let mut cell = walk.from;
        while cell != walk.step {
            let erased = &mut self.grid[cell];
            erased.kind = CellKind::Empty;
            let link = erased.walk_link.take();
            step.touch(cell, record);
            match link {
                Some(prev) => cell = prev,
                None => {
                    tracing::warn!(
                        "[wilson] loop erasure from {:?} ended at {:?} without finding {:?}",
                        walk.from,
                        cell,
                        walk.step
                    );
                    return Err(MazeError::LoopOriginLost { at: walk.step });
                }
            }
        }

        step.message = format!("Loop removed at {:?}", walk.step);
        let next = self.random_neighbor(walk.step);
        self.walk = Some(Walk {
            origin: walk.origin,
            step: next,
            from: walk.step,
        });
        Ok(())
    }

    /// Ordinary step onto a fresh cell.
    fn extend_walk(&mut self, walk: Walk, step: &mut Step, record: bool) {
        let cell = &mut self.grid[walk.step];
        cell.kind = CellKind::OpenSet;
        cell.walk_link = Some(walk.from);
        step.touch(walk.step, record);

        step.message = format!("Walked to {:?}", walk.step);
        let next = self.random_neighbor(walk.step);
        self.walk = Some(Walk {
            origin: walk.origin,
            step: next,
            from: walk.step,
        });
    }
}

impl MazeGenerator for Wilson {
    fn advance(&mut self, n: usize, render_skip: bool) -> Result<Step, MazeError> {
        let record = !render_skip;
        let mut step = Step::default();
        for _ in 0..n {
            let Some(walk) = self.walk else {
                step.message = format!(
                    "Maze generation complete -- ({},{})",
                    self.grid.rows(),
                    self.grid.cols()
                );
                break;
            };

            match self.grid[walk.step].kind {
                CellKind::Visited => {
                    self.join_tree(walk, &mut step, record);
                    if self.walk.is_none() {
                        tracing::info!("[wilson] maze complete, {} cells visited", self.visited);
                    }
                }
                CellKind::OpenSet => self.erase_loop(walk, &mut step, record)?,
                _ => self.extend_walk(walk, &mut step, record),
            }
        }
        Ok(step)
    }

    fn is_done(&self) -> bool {
        self.walk.is_none()
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
