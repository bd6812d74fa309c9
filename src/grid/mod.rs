pub mod cell;

use rand::Rng;

pub use cell::{Cell, CellKind, Direction, Walls};

use crate::error::ConfigError;

/// Position of a cell as `(row, col)`.
pub type Coord = (usize, usize);

/// Which cells count as adjacent when moving through the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Neighborhood {
    /// North, south, east and west, skipping wall cells.
    FourWay,
    /// The eight surrounding cells including diagonals, skipping wall cells.
    EightWay,
    /// North, south, east and west, only through sides that are open on both cells.
    WallConstrained,
}

/// Rectangular arena of cells. Owns every cell by value; cells never refer back to the grid.
#[derive(Debug, Clone)]
pub struct Grid {
    cells: Box<[Cell]>,
    rows: usize,
    cols: usize,
    walled: bool,
}

impl Grid {
    /// Creates a grid of `rows x cols` empty cells. When `walled` is set every cell starts with all
    /// four walls closed, ready for a maze generator to carve into.
    pub fn new(rows: usize, cols: usize, walled: bool) -> Result<Self, ConfigError> {
        if rows == 0 || cols == 0 {
            return Err(ConfigError::InvalidDimensions { rows, cols });
        }
        let cells = (0..rows)
            .flat_map(|r| (0..cols).map(move |c| (r, c)))
            .map(|coord| Cell::new(coord, walled))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Ok(Grid {
            cells,
            rows,
            cols,
            walled,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; a grid holds at least one cell.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether cells carry explicit walls (maze mode) rather than relying on wall cells.
    pub fn is_walled(&self) -> bool {
        self.walled
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.0 < self.rows && coord.1 < self.cols
    }

    fn ravel_index(&self, coord: Coord) -> usize {
        coord.0 * self.cols + coord.1
    }

    /// Looks up a cell, returning `None` for coordinates outside the grid.
    pub fn get(&self, coord: Coord) -> Option<&Cell> {
        if self.contains(coord) {
            Some(&self.cells[self.ravel_index(coord)])
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, coord: Coord) -> Option<&mut Cell> {
        if self.contains(coord) {
            let idx = self.ravel_index(coord);
            Some(&mut self.cells[idx])
        } else {
            None
        }
    }

    /// Looks up a cell from signed coordinates, as produced when mapping a pointer position that
    /// may fall outside the grid.
    pub fn cell_at(&self, row: i64, col: i64) -> Option<&Cell> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        self.get((row, col))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// All coordinates in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + use<> {
        let cols = self.cols;
        (0..self.rows).flat_map(move |r| (0..cols).map(move |c| (r, c)))
    }

    /// First cell of the given kind in row-major order.
    pub fn find(&self, kind: CellKind) -> Option<Coord> {
        self.cells
            .iter()
            .find(|cell| cell.kind == kind)
            .map(Cell::coord)
    }

    /// In-bounds orthogonal neighbours, ignoring cell kinds and walls.
    pub fn adjacent(&self, coord: Coord) -> impl Iterator<Item = Coord> + '_ {
        let (r, c) = coord;
        // wrapping_sub underflows to usize::MAX, which the bounds check then drops
        [
            (r.wrapping_sub(1), c),
            (r.saturating_add(1), c),
            (r, c.saturating_add(1)),
            (r, c.wrapping_sub(1)),
        ]
        .into_iter()
        .filter(move |&n| self.contains(coord) && self.contains(n))
    }

    /// In-bounds neighbours including diagonals, in row-major order, ignoring cell kinds and walls.
    pub fn adjacent_diagonal(&self, coord: Coord) -> impl Iterator<Item = Coord> + '_ {
        let (r, c) = coord;
        let rows = r.saturating_sub(1)..=r.saturating_add(1).min(self.rows.saturating_sub(1));
        let cols = c.saturating_sub(1)..=c.saturating_add(1).min(self.cols.saturating_sub(1));
        rows.flat_map(move |nr| cols.clone().map(move |nc| (nr, nc)))
            .filter(move |&n| n != coord && self.contains(coord))
    }

    /// Cells reachable in one move from `coord` under the given neighbourhood.
    pub fn neighbors(&self, coord: Coord, mode: Neighborhood) -> Vec<Coord> {
        match mode {
            Neighborhood::FourWay => self
                .adjacent(coord)
                .filter(|&n| self[n].kind != CellKind::Wall)
                .collect(),
            Neighborhood::EightWay => self
                .adjacent_diagonal(coord)
                .filter(|&n| self[n].kind != CellKind::Wall)
                .collect(),
            Neighborhood::WallConstrained => self
                .adjacent(coord)
                .filter(|&n| self[n].kind != CellKind::Wall && self.is_open_between(coord, n))
                .collect(),
        }
    }

    /// True when `a` and `b` are orthogonally adjacent and the wall between them is open on both
    /// sides.
    pub fn is_open_between(&self, a: Coord, b: Coord) -> bool {
        match Direction::between(a, b) {
            Some(direction) if self.contains(a) && self.contains(b) => {
                !self[a].has_wall(direction) && !self[b].has_wall(direction.opposite())
            }
            _ => false,
        }
    }

    /// Opens the wall between two orthogonally adjacent cells on both sides.
    ///
    /// # Panics
    /// * If either coordinate is out of bounds
    /// * If the cells are not orthogonally adjacent
    pub fn tunnel(&mut self, a: Coord, b: Coord) {
        if !self.contains(a) || !self.contains(b) {
            panic!("Cannot tunnel between {:?} and {:?}: out of bounds", a, b);
        }
        let Some(direction) = Direction::between(a, b) else {
            panic!("Cannot tunnel between non-adjacent cells {:?} and {:?}", a, b);
        };
        self[a].walls.remove(direction.wall());
        self[b].walls.remove(direction.opposite().wall());
    }

    /// Every pair of orthogonally adjacent cells joined by an open wall, each pair listed once
    /// with the north-west cell first.
    pub fn open_passages(&self) -> Vec<(Coord, Coord)> {
        self.coords()
            .flat_map(|(r, c)| [((r, c), (r + 1, c)), ((r, c), (r, c + 1))])
            .filter(|&(a, b)| self.is_open_between(a, b))
            .collect()
    }

    /// Clears scores and back-links everywhere and reverts visited, open-set and path cells to
    /// empty. Walls, wall cells and the start/goal designations survive.
    /// Returns the cells whose kind changed.
    pub fn reset_search_state(&mut self) -> Vec<Coord> {
        let mut changed = Vec::new();
        for cell in self.cells.iter_mut() {
            cell.reset_scores();
            if cell.kind.is_search_state() {
                cell.kind = CellKind::Empty;
                changed.push(cell.coord());
            }
        }
        tracing::debug!("[grid] reset search state, {} cells changed", changed.len());
        changed
    }

    /// Sets the kind of a single cell. The caller keeps start and goal unique; see
    /// [`Grid::relocate`] for moving them.
    pub fn designate(&mut self, coord: Coord, kind: CellKind) -> Result<(), ConfigError> {
        let cell = self.get_mut(coord).ok_or(ConfigError::OutOfBounds(coord))?;
        cell.kind = kind;
        Ok(())
    }

    /// Moves the unique start or goal cell to `to`. The previous cell of that kind becomes empty,
    /// and both cells lose their scores. Returns the cells whose kind changed.
    ///
    /// # Panics
    /// * If `kind` is neither `Start` nor `Goal`
    pub fn relocate(&mut self, kind: CellKind, to: Coord) -> Result<Vec<Coord>, ConfigError> {
        assert!(
            matches!(kind, CellKind::Start | CellKind::Goal),
            "Only start and goal cells can be relocated"
        );
        if !self.contains(to) {
            return Err(ConfigError::OutOfBounds(to));
        }
        let mut changed = Vec::new();
        while let Some(old) = self.find(kind) {
            self[old].kind = CellKind::Empty;
            self[old].reset_scores();
            changed.push(old);
        }
        self[to].kind = kind;
        self[to].reset_scores();
        changed.push(to);
        Ok(changed)
    }

    /// Endpoints near the top-left and bottom-right corners.
    pub fn default_endpoints(&self) -> (Coord, Coord) {
        let start = (1.min(self.rows - 1), 1.min(self.cols - 1));
        let goal = (self.rows.saturating_sub(2), self.cols.saturating_sub(2));
        (start, goal)
    }

    /// Designates the start and goal cells, replacing any previous ones.
    pub fn place_endpoints(&mut self, start: Coord, goal: Coord) -> Result<Vec<Coord>, ConfigError> {
        let mut changed = self.relocate(CellKind::Start, start)?;
        changed.extend(self.relocate(CellKind::Goal, goal)?);
        Ok(changed)
    }

    /// Turns each empty cell into a wall cell with probability `density`. Start and goal are never
    /// covered. Returns the new wall cells.
    pub fn scatter_walls<R: Rng>(
        &mut self,
        density: f64,
        rng: &mut R,
    ) -> Result<Vec<Coord>, ConfigError> {
        if !(0.0..=1.0).contains(&density) {
            return Err(ConfigError::InvalidProbability {
                name: "random wall density",
                value: density,
            });
        }
        let mut walls = Vec::new();
        for cell in self.cells.iter_mut() {
            if cell.kind == CellKind::Empty && rng.random_bool(density) {
                cell.kind = CellKind::Wall;
                walls.push(cell.coord());
            }
        }
        Ok(walls)
    }
}

impl std::ops::Index<Coord> for Grid {
    type Output = Cell;

    fn index(&self, index: Coord) -> &Self::Output {
        assert!(self.contains(index), "Coordinate {:?} is out of bounds", index);
        &self.cells[self.ravel_index(index)]
    }
}

impl std::ops::IndexMut<Coord> for Grid {
    fn index_mut(&mut self, index: Coord) -> &mut Self::Output {
        assert!(self.contains(index), "Coordinate {:?} is out of bounds", index);
        let idx = self.ravel_index(index);
        &mut self.cells[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn sorted(mut coords: Vec<Coord>) -> Vec<Coord> {
        coords.sort();
        coords
    }

    #[test]
    fn test_grid_indexing() {
        let mut grid = Grid::new(3, 5, false).unwrap();
        grid[(2, 3)].kind = CellKind::Start;
        assert_eq!(grid[(2, 3)].kind, CellKind::Start);
        for coord in grid.coords() {
            assert_eq!(grid[coord].coord(), coord);
        }
        assert_eq!(grid.len(), 15);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert_eq!(
            Grid::new(0, 4, false).unwrap_err(),
            ConfigError::InvalidDimensions { rows: 0, cols: 4 }
        );
    }

    #[test]
    fn test_out_of_bounds_lookup_is_none() {
        let grid = Grid::new(5, 5, false).unwrap();
        assert!(grid.get((5, 5)).is_none());
        assert!(grid.get((0, 5)).is_none());
        assert!(grid.get((4, 4)).is_some());
        assert!(grid.cell_at(-1, 2).is_none());
        assert!(grid.cell_at(2, -1).is_none());
        assert_eq!(grid.cell_at(2, 3).map(Cell::coord), Some((2, 3)));
    }

    #[test]
    fn test_four_way_neighbors_skip_walls() {
        let mut grid = Grid::new(3, 3, false).unwrap();
        assert_eq!(
            sorted(grid.neighbors((1, 1), Neighborhood::FourWay)),
            vec![(0, 1), (1, 0), (1, 2), (2, 1)]
        );
        assert_eq!(
            sorted(grid.neighbors((0, 0), Neighborhood::FourWay)),
            vec![(0, 1), (1, 0)]
        );
        grid.designate((0, 1), CellKind::Wall).unwrap();
        assert_eq!(grid.neighbors((0, 0), Neighborhood::FourWay), vec![(1, 0)]);
    }

    #[test]
    fn test_eight_way_neighbors() {
        let mut grid = Grid::new(3, 3, false).unwrap();
        assert_eq!(grid.neighbors((1, 1), Neighborhood::EightWay).len(), 8);
        assert_eq!(
            sorted(grid.neighbors((2, 2), Neighborhood::EightWay)),
            vec![(1, 1), (1, 2), (2, 1)]
        );
        grid.designate((1, 1), CellKind::Wall).unwrap();
        assert_eq!(
            sorted(grid.neighbors((0, 0), Neighborhood::EightWay)),
            vec![(0, 1), (1, 0)]
        );
    }

    #[test]
    fn test_wall_constrained_neighbors_need_both_sides_open() {
        let mut grid = Grid::new(2, 2, true).unwrap();
        assert!(grid.neighbors((0, 0), Neighborhood::WallConstrained).is_empty());

        grid.tunnel((0, 0), (0, 1));
        assert_eq!(
            grid.neighbors((0, 0), Neighborhood::WallConstrained),
            vec![(0, 1)]
        );
        assert_eq!(
            grid.neighbors((0, 1), Neighborhood::WallConstrained),
            vec![(0, 0)]
        );
        assert!(!grid[(0, 0)].has_wall(Direction::East));
        assert!(!grid[(0, 1)].has_wall(Direction::West));

        // A wall open on only one side still blocks
        grid[(1, 0)].walls.remove(Walls::NORTH);
        assert!(!grid.is_open_between((0, 0), (1, 0)));
        assert!(!grid.neighbors((1, 0), Neighborhood::WallConstrained).contains(&(0, 0)));
    }

    #[test]
    fn test_wall_constrained_neighbors_skip_wall_cells() {
        let mut grid = Grid::new(2, 2, true).unwrap();
        grid.tunnel((0, 0), (0, 1));
        grid.tunnel((0, 0), (1, 0));
        grid.designate((0, 1), CellKind::Wall).unwrap();
        assert_eq!(
            grid.neighbors((0, 0), Neighborhood::WallConstrained),
            vec![(1, 0)]
        );
    }

    #[test]
    #[should_panic(expected = "non-adjacent")]
    fn test_tunnel_rejects_non_adjacent() {
        let mut grid = Grid::new(3, 3, true).unwrap();
        grid.tunnel((0, 0), (1, 1));
    }

    #[test]
    fn test_open_passages() {
        let mut grid = Grid::new(2, 3, true).unwrap();
        assert!(grid.open_passages().is_empty());
        grid.tunnel((0, 1), (0, 0));
        grid.tunnel((1, 2), (0, 2));
        assert_eq!(
            grid.open_passages(),
            vec![((0, 0), (0, 1)), ((0, 2), (1, 2))]
        );
    }

    #[test]
    fn test_reset_search_state_is_idempotent() {
        let mut grid = Grid::new(4, 4, false).unwrap();
        grid.place_endpoints((0, 0), (3, 3)).unwrap();
        grid.designate((1, 1), CellKind::Wall).unwrap();
        for (coord, kind) in [
            ((0, 1), CellKind::Visited),
            ((0, 2), CellKind::OpenSet),
            ((2, 2), CellKind::Path),
        ] {
            grid.designate(coord, kind).unwrap();
            grid[coord].g_score = 2.0;
            grid[coord].f_score = 3.0;
            grid[coord].predecessor = Some((0, 0));
        }
        grid[(0, 0)].g_score = 0.0;

        let changed = grid.reset_search_state();
        assert_eq!(sorted(changed), vec![(0, 1), (0, 2), (2, 2)]);
        let once = grid.clone();
        assert!(grid.reset_search_state().is_empty());

        for (a, b) in once.iter().zip(grid.iter()) {
            assert_eq!(a.kind, b.kind);
            assert_eq!(a.walls, b.walls);
            assert!(b.g_score.is_infinite() && b.f_score.is_infinite());
            assert!(b.predecessor.is_none());
            assert!(!b.kind.is_search_state());
        }
        assert_eq!(grid[(0, 0)].kind, CellKind::Start);
        assert_eq!(grid[(3, 3)].kind, CellKind::Goal);
        assert_eq!(grid[(1, 1)].kind, CellKind::Wall);
    }

    #[test]
    fn test_relocate_keeps_endpoints_unique() {
        let mut grid = Grid::new(3, 3, false).unwrap();
        grid.place_endpoints((0, 0), (2, 2)).unwrap();
        let changed = grid.relocate(CellKind::Start, (1, 0)).unwrap();
        assert_eq!(changed, vec![(0, 0), (1, 0)]);
        assert_eq!(grid[(0, 0)].kind, CellKind::Empty);
        assert_eq!(grid.find(CellKind::Start), Some((1, 0)));
        assert_eq!(
            grid.relocate(CellKind::Goal, (3, 0)).unwrap_err(),
            ConfigError::OutOfBounds((3, 0))
        );
    }

    #[test]
    fn test_default_endpoints() {
        let grid = Grid::new(10, 20, false).unwrap();
        assert_eq!(grid.default_endpoints(), ((1, 1), (8, 18)));
        let tiny = Grid::new(1, 1, false).unwrap();
        assert_eq!(tiny.default_endpoints(), ((0, 0), (0, 0)));
    }

    #[test]
    fn test_scatter_walls_spares_endpoints() {
        let mut grid = Grid::new(6, 6, false).unwrap();
        grid.place_endpoints((0, 0), (5, 5)).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let walls = grid.scatter_walls(1.0, &mut rng).unwrap();
        assert_eq!(walls.len(), 34);
        assert_eq!(grid[(0, 0)].kind, CellKind::Start);
        assert_eq!(grid[(5, 5)].kind, CellKind::Goal);

        let mut open = Grid::new(6, 6, false).unwrap();
        assert!(open.scatter_walls(0.0, &mut rng).unwrap().is_empty());
        assert!(open.scatter_walls(1.5, &mut rng).is_err());
    }
}
