use std::io::{Stdout, Write};

use crossterm::{
    QueueableCommand, cursor, queue,
    style::{self, Attribute, Color, Stylize},
    terminal::{self, ClearType},
};

use crate::grid::{CellKind, Coord, Direction, Grid};

/// Draws a grid onto the terminal, either fully or cell by cell.
///
/// An unwalled grid maps each cell to one block. A walled grid is drawn on a
/// `(2 * rows + 1) x (2 * cols + 1)` block layout: cells sit on odd rows and columns, the blocks
/// between them show the shared wall, and corner blocks are always wall.
pub struct Renderer {
    stdout: Stdout,
    /// Grid size the layout was computed for, in blocks
    layout: Option<(u16, u16)>,
    /// Cell under the inspection cursor, drawn reversed
    cursor: Option<Coord>,
}

impl Renderer {
    pub fn new(stdout: Stdout) -> Self {
        Self {
            stdout,
            layout: None,
            cursor: None,
        }
    }

    /// Layout size of `grid` in blocks (columns, rows).
    pub fn layout_size(grid: &Grid) -> (u16, u16) {
        let (rows, cols) = if grid.is_walled() {
            (2 * grid.rows() + 1, 2 * grid.cols() + 1)
        } else {
            (grid.rows(), grid.cols())
        };
        (
            u16::try_from(cols).unwrap_or(u16::MAX),
            u16::try_from(rows).unwrap_or(u16::MAX),
        )
    }

    /// Screen block of the cell at `coord`.
    fn block_of(grid: &Grid, coord: Coord) -> (usize, usize) {
        if grid.is_walled() {
            (2 * coord.0 + 1, 2 * coord.1 + 1)
        } else {
            coord
        }
    }

    fn queue_block(&mut self, block: (usize, usize), kind: CellKind) -> std::io::Result<()> {
        let (row, col) = block;
        // Blocks off the u16 screen are clipped by check_size already
        let x = u16::try_from(col).unwrap_or(u16::MAX);
        let y = u16::try_from(row).unwrap_or(u16::MAX);
        queue!(
            self.stdout,
            cursor::MoveTo(x.saturating_mul(CellKind::CELL_WIDTH), y),
            style::Print(kind)
        )
    }

    /// What the open block between two cells shows.
    fn passage_kind(grid: &Grid, a: Coord, b: Coord) -> CellKind {
        let (ka, kb) = (grid[a].kind, grid[b].kind);
        match (ka, kb) {
            _ if ka == kb => ka,
            (CellKind::Path, CellKind::Start | CellKind::Goal)
            | (CellKind::Start | CellKind::Goal, CellKind::Path) => CellKind::Path,
            _ => CellKind::Empty,
        }
    }

    fn queue_cell(&mut self, grid: &Grid, coord: Coord) -> std::io::Result<()> {
        let block = Renderer::block_of(grid, coord);
        if self.cursor == Some(coord) {
            self.stdout.queue(style::SetAttribute(Attribute::Reverse))?;
            self.queue_block(block, grid[coord].kind)?;
            self.stdout.queue(style::SetAttribute(Attribute::Reset))?;
        } else {
            self.queue_block(block, grid[coord].kind)?;
        }

        if !grid.is_walled() {
            return Ok(());
        }
        // The four side blocks of a walled cell
        for dir in Direction::ALL {
            let side = match dir {
                Direction::North => (block.0 - 1, block.1),
                Direction::South => (block.0 + 1, block.1),
                Direction::East => (block.0, block.1 + 1),
                Direction::West => (block.0, block.1 - 1),
            };
            let neighbor = grid
                .adjacent(coord)
                .find(|&n| Direction::between(coord, n) == Some(dir));
            let kind = match neighbor {
                Some(n) if grid.is_open_between(coord, n) => Renderer::passage_kind(grid, coord, n),
                _ => CellKind::Wall,
            };
            self.queue_block(side, kind)?;
        }
        Ok(())
    }

    /// Whether the terminal can hold the grid plus `status_lines` lines below it. If not, a
    /// notice replaces the drawing.
    pub fn check_size(&mut self, grid: &Grid, status_lines: u16) -> std::io::Result<bool> {
        let (width, height) = Renderer::layout_size(grid);
        let (term_width, term_height) = terminal::size()?;
        let needed_width = width.saturating_mul(CellKind::CELL_WIDTH);
        let needed_height = height.saturating_add(status_lines);
        if term_width >= needed_width && term_height >= needed_height {
            return Ok(true);
        }

        let msg = format!(
            "Terminal size is too small ({}x{}) for the grid ({}x{} cells, needs {}x{}). Please resize the terminal.\r\n",
            term_width,
            term_height,
            grid.rows(),
            grid.cols(),
            needed_width,
            needed_height
        );
        queue!(
            self.stdout,
            terminal::Clear(ClearType::All),
            cursor::MoveTo(0, 0),
            style::PrintStyledContent(msg.with(Color::Yellow).attribute(Attribute::Bold)),
            style::PrintStyledContent(
                "Press Esc to exit...\r\n"
                    .with(Color::Blue)
                    .attribute(Attribute::Bold)
            )
        )?;
        self.stdout.flush()?;
        self.layout = None;
        Ok(false)
    }

    /// Clears the screen and draws every cell of `grid`.
    pub fn draw_grid(&mut self, grid: &Grid) -> std::io::Result<()> {
        self.stdout.queue(terminal::Clear(ClearType::All))?;
        if grid.is_walled() {
            // Corner blocks never change
            let (width, height) = Renderer::layout_size(grid);
            for row in (0..height as usize).step_by(2) {
                for col in (0..width as usize).step_by(2) {
                    self.queue_block((row, col), CellKind::Wall)?;
                }
            }
        }
        for coord in grid.coords() {
            self.queue_cell(grid, coord)?;
        }
        self.layout = Some(Renderer::layout_size(grid));
        self.stdout.flush()
    }

    /// Redraws the given cells, or the whole grid if its layout is not on screen yet.
    pub fn draw_cells(&mut self, grid: &Grid, changed: &[Coord]) -> std::io::Result<()> {
        if self.layout != Some(Renderer::layout_size(grid)) {
            return self.draw_grid(grid);
        }
        for &coord in changed {
            self.queue_cell(grid, coord)?;
        }
        self.stdout.flush()
    }

    /// Moves the inspection cursor, redrawing the cells it leaves and enters.
    pub fn set_cursor(&mut self, grid: &Grid, coord: Option<Coord>) -> std::io::Result<()> {
        let old = std::mem::replace(&mut self.cursor, coord);
        let touched = old.into_iter().chain(coord).collect::<Vec<_>>();
        self.draw_cells(grid, &touched)
    }

    /// Forgets the cursor without drawing, for when the grid is about to be replaced.
    pub fn clear_cursor(&mut self) {
        self.cursor = None;
    }

    /// Writes status lines below the grid, clearing what was there.
    pub fn draw_status(&mut self, lines: &[String]) -> std::io::Result<()> {
        let Some((_, height)) = self.layout else {
            return Ok(());
        };
        for (i, line) in lines.iter().enumerate() {
            let y = height.saturating_add(u16::try_from(i).unwrap_or(u16::MAX));
            queue!(
                self.stdout,
                cursor::MoveTo(0, y),
                terminal::Clear(ClearType::CurrentLine),
                style::PrintStyledContent(line.as_str().with(Color::Cyan))
            )?;
        }
        self.stdout.flush()
    }
}
