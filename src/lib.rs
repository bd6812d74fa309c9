pub mod app;
pub mod config;
pub mod error;
pub mod generators;
pub mod grid;
pub mod solvers;

use grid::Coord;

/// Outcome of one `advance` call: a status line for display and the cells whose kind or walls
/// changed, for the host to redraw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Step {
    pub message: String,
    pub changed: Vec<Coord>,
}

impl Step {
    fn touch(&mut self, coord: Coord, record: bool) {
        if record {
            self.changed.push(coord);
        }
    }
}
