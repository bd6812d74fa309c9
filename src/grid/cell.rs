use bitflags::bitflags;
use crossterm::style::{Color, Stylize};

use std::fmt;
use std::hash::{Hash, Hasher};

use super::Coord;

/// Classification of a cell, driving both the algorithms and the way the host draws it.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    #[default]
    Empty,
    Wall,
    Start,
    Goal,
    /// Finalized by the solver, or joined to the maze by a generator.
    Visited,
    /// Waiting in the solver frontier, or part of Wilson's current random walk.
    OpenSet,
    /// Part of the reconstructed route from start to goal.
    Path,
}

impl CellKind {
    /// The width of each cell when rendered, in character widths.
    pub const CELL_WIDTH: u16 = 2;

    /// Kinds that only exist as a by-product of a search or maze run.
    pub fn is_search_state(self) -> bool {
        matches!(self, CellKind::Visited | CellKind::OpenSet | CellKind::Path)
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let styled_symbol = match self {
            CellKind::Empty => "  ".with(Color::Reset),
            CellKind::Wall => "⬜".with(Color::White),
            CellKind::Start => "🟩".with(Color::Green),
            CellKind::Goal => "🟥".with(Color::Red),
            CellKind::Visited => "* ".with(Color::DarkYellow),
            CellKind::OpenSet => "o ".with(Color::Green),
            CellKind::Path => "🟦".with(Color::Blue),
        };

        #[cfg(debug_assertions)]
        {
            use unicode_width::UnicodeWidthStr;
            assert_eq!(
                styled_symbol.content().width(),
                CellKind::CELL_WIDTH as usize,
                "Each cell must occupy exactly two character widths."
            );
        }

        write!(f, "{}", styled_symbol)
    }
}

bitflags! {
    /// Sides of a cell that are closed. A set bit means the wall is present.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Walls: u8 {
        const NORTH = 1 << 0;
        const SOUTH = 1 << 1;
        const EAST = 1 << 2;
        const WEST = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// The wall bit guarding this side of a cell.
    pub fn wall(self) -> Walls {
        match self {
            Direction::North => Walls::NORTH,
            Direction::South => Walls::SOUTH,
            Direction::East => Walls::EAST,
            Direction::West => Walls::WEST,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// Direction leading from `from` to the orthogonally adjacent `to`, if they are adjacent.
    /// Rows grow southwards and columns grow eastwards.
    pub fn between(from: Coord, to: Coord) -> Option<Direction> {
        let (fr, fc) = from;
        let (tr, tc) = to;
        if fc == tc {
            if tr.checked_add(1) == Some(fr) {
                return Some(Direction::North);
            }
            if fr.checked_add(1) == Some(tr) {
                return Some(Direction::South);
            }
        } else if fr == tr {
            if fc.checked_add(1) == Some(tc) {
                return Some(Direction::East);
            }
            if tc.checked_add(1) == Some(fc) {
                return Some(Direction::West);
            }
        }
        None
    }
}

/// A single grid unit. Identity is the coordinate: two cells compare equal when they sit at the
/// same position, whatever their scores.
#[derive(Debug, Clone)]
pub struct Cell {
    coord: Coord,
    pub kind: CellKind,
    /// Cost of the best known route from the start.
    pub g_score: f64,
    /// `g_score` plus the weighted heuristic estimate to the goal.
    pub f_score: f64,
    /// Traversal cost of stepping onto this cell.
    pub cost: f64,
    /// Cell this one was reached from during a search.
    pub predecessor: Option<Coord>,
    /// Previous cell of a Wilson random walk passing through this cell.
    pub walk_link: Option<Coord>,
    pub walls: Walls,
}

impl Cell {
    pub const DEFAULT_COST: f64 = 1.0;

    pub fn new(coord: Coord, walled: bool) -> Self {
        Cell {
            coord,
            kind: CellKind::Empty,
            g_score: f64::INFINITY,
            f_score: f64::INFINITY,
            cost: Self::DEFAULT_COST,
            predecessor: None,
            walk_link: None,
            walls: if walled { Walls::all() } else { Walls::empty() },
        }
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub fn has_wall(&self, direction: Direction) -> bool {
        self.walls.contains(direction.wall())
    }

    /// Clear scores and back-links, leaving kind and walls untouched.
    pub fn reset_scores(&mut self) {
        self.g_score = f64::INFINITY;
        self.f_score = f64::INFINITY;
        self.predecessor = None;
        self.walk_link = None;
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.coord == other.coord
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.coord.hash(state);
    }
}
