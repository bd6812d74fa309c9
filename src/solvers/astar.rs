use super::{Heuristic, HeuristicKind, Movement, MovementKind, OpenSet};
use crate::Step;
use crate::error::ConfigError;
use crate::grid::{CellKind, Coord, Grid};

/// Heuristic, movement rule and heuristic weight of a search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AStarSettings {
    pub heuristic: HeuristicKind,
    pub movement: MovementKind,
    /// Multiplies the heuristic term of the f-score. 1 gives plain A*; larger values search
    /// greedier and may miss the shortest path.
    pub weight: f64,
}

impl Default for AStarSettings {
    fn default() -> Self {
        Self {
            heuristic: HeuristicKind::Euclidean,
            movement: MovementKind::Manhattan,
            weight: 1.0,
        }
    }
}

impl AStarSettings {
    /// Builds settings from heuristic and movement names, as typed by a user.
    pub fn from_names(heuristic: &str, movement: &str, weight: f64) -> Result<Self, ConfigError> {
        let settings = Self {
            heuristic: heuristic.parse()?,
            movement: movement.parse()?,
            weight,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(ConfigError::InvalidWeight(self.weight));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolverState {
    Running,
    Found { distance: f64 },
    NotFound,
}

/// Weighted A* search that performs one cell expansion per unit of work, so a host can animate,
/// pause and single-step it. Owns the grid for as long as the search runs.
#[derive(Debug)]
pub struct AStar {
    grid: Grid,
    open_set: OpenSet,
    start: Coord,
    goal: Coord,
    heuristic: Box<dyn Heuristic>,
    movement: Box<dyn Movement>,
    weight: f64,
    state: SolverState,
    /// Number of cells expanded so far
    visited: usize,
}

impl AStar {
    /// Prepares a search from `start` to `goal`. The grid should have had its search state reset
    /// since any previous run.
    pub fn new(
        mut grid: Grid,
        start: Coord,
        goal: Coord,
        settings: AStarSettings,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        if settings.movement == MovementKind::Walls && !grid.is_walled() {
            return Err(ConfigError::NotWalled("walls movement"));
        }
        for coord in [start, goal] {
            if !grid.contains(coord) {
                return Err(ConfigError::OutOfBounds(coord));
            }
        }
        let heuristic = settings.heuristic.strategy();
        let movement = settings.movement.strategy();

        let start_cell = &mut grid[start];
        start_cell.g_score = 0.0;
        start_cell.f_score = heuristic.evaluate(start, goal);
        start_cell.predecessor = None;
        let mut open_set = OpenSet::new();
        open_set.insert(start, start_cell.f_score);

        tracing::debug!(
            "[astar] searching {:?} -> {:?} with {} heuristic, {} movement, weight {}",
            start,
            goal,
            settings.heuristic,
            settings.movement,
            settings.weight
        );

        Ok(AStar {
            grid,
            open_set,
            start,
            goal,
            heuristic,
            movement,
            weight: settings.weight,
            state: SolverState::Running,
            visited: 0,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Hands the grid back, ending the search.
    pub fn into_grid(self) -> Grid {
        self.grid
    }

    pub fn start(&self) -> Coord {
        self.start
    }

    pub fn goal(&self) -> Coord {
        self.goal
    }

    pub fn state(&self) -> SolverState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state != SolverState::Running
    }

    /// Number of cells expanded so far.
    pub fn visited(&self) -> usize {
        self.visited
    }

    /// Number of cells waiting in the frontier.
    pub fn open_len(&self) -> usize {
        self.open_set.len()
    }

    pub fn open_set(&self) -> &OpenSet {
        &self.open_set
    }

    /// Total cost of the path, once found.
    pub fn distance(&self) -> Option<f64> {
        match self.state {
            SolverState::Found { distance } => Some(distance),
            _ => None,
        }
    }

    /// Unweighted heuristic estimate between two arbitrary cells.
    pub fn heuristic(&self, a: Coord, b: Coord) -> f64 {
        self.heuristic.evaluate(a, b)
    }

    /// The route from start to goal, both included, once found.
    pub fn path(&self) -> Option<Vec<Coord>> {
        self.distance()?;
        let mut path = vec![self.goal];
        let mut link = self.grid[self.goal].predecessor;
        while let Some(coord) = link {
            path.push(coord);
            link = self.grid[coord].predecessor;
        }
        path.reverse();
        Some(path)
    }

    /// Performs up to `n` expansions, stopping early once the search is over. Cells changed by
    /// all expansions are collected; the message describes the last one.
    pub fn advance(&mut self, n: usize) -> Step {
        let mut step = Step::default();
        if self.is_done() {
            step.message = self.status();
            return step;
        }
        for _ in 0..n {
            if self.is_done() {
                break;
            }
            self.expand(&mut step);
        }
        step
    }

    /// Runs the search to completion.
    pub fn solve(&mut self) -> SolverState {
        while !self.is_done() {
            self.advance(1024);
        }
        self.state
    }

    fn status(&self) -> String {
        match self.state {
            SolverState::Running => format!(
                "visited: {} candidates: {}",
                self.visited,
                self.open_set.len()
            ),
            SolverState::Found { distance } => format!(
                "goal reached at {:?}. Total distance: {:.2}",
                self.goal, distance
            ),
            SolverState::NotFound => "No path found".to_string(),
        }
    }

    fn finish_not_found(&mut self, step: &mut Step) {
        self.state = SolverState::NotFound;
        tracing::info!(
            "[astar] no path from {:?} to {:?} after {} expansions",
            self.start,
            self.goal,
            self.visited
        );
        step.message = self.status();
    }

    fn expand(&mut self, step: &mut Step) {
        let Some((current, _)) = self.open_set.pop_min() else {
            self.finish_not_found(step);
            return;
        };

        if current == self.goal {
            self.trace_path(current, step);
            return;
        }

        if self.grid[current].kind != CellKind::Start {
            self.grid[current].kind = CellKind::Visited;
            step.changed.push(current);
        }
        self.visited += 1;

        let current_g = self.grid[current].g_score;
        let (mut updated, mut inserted) = (0, 0);
        for neighbor in self.movement.neighbors(&self.grid, current) {
            let tentative = current_g + self.movement.step_cost(&self.grid, current, neighbor);
            if tentative >= self.grid[neighbor].g_score {
                continue;
            }
            // Better route to this neighbour
            let f_score = tentative + self.weight * self.heuristic.evaluate(neighbor, self.goal);
            let cell = &mut self.grid[neighbor];
            cell.predecessor = Some(current);
            cell.g_score = tentative;
            cell.f_score = f_score;

            if self.open_set.update(neighbor, f_score) {
                updated += 1;
            } else {
                self.open_set.insert(neighbor, f_score);
                if !matches!(cell.kind, CellKind::Start | CellKind::Goal) {
                    cell.kind = CellKind::OpenSet;
                    step.changed.push(neighbor);
                }
                inserted += 1;
            }
        }

        step.message = format!(
            "current = {:?} -- ({} updated: {} inserted)",
            current, updated, inserted
        );

        if self.open_set.is_empty() {
            self.finish_not_found(step);
        }
    }

    fn trace_path(&mut self, goal: Coord, step: &mut Step) {
        let distance = self.grid[goal].g_score;
        self.grid[goal].kind = CellKind::Goal;
        step.changed.push(goal);

        let mut link = self.grid[goal].predecessor;
        while let Some(coord) = link {
            let cell = &mut self.grid[coord];
            if cell.kind != CellKind::Start {
                cell.kind = CellKind::Path;
                step.changed.push(coord);
            }
            link = cell.predecessor;
        }

        self.state = SolverState::Found { distance };
        tracing::info!(
            "[astar] goal {:?} reached after {} expansions, distance {:.2}",
            goal,
            self.visited,
            distance
        );
        step.message = self.status();
    }
}
