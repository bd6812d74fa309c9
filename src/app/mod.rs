mod renderer;

use std::{
    io::{Stdout, Write},
    time::{Duration, Instant},
};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind},
    queue,
    terminal::{self, ClearType},
};

use crate::{
    Step,
    config::Config,
    error::Result,
    generators::{MazeGenerator, get_rng},
    grid::{Coord, Grid},
    solvers::{AStar, SolverState},
};

pub use renderer::Renderer;

/// Number of status lines drawn below the grid.
const STATUS_LINES: u16 = 3;

/// What the current run is doing.
enum Phase {
    Generating(Box<dyn MazeGenerator>),
    Solving(AStar),
    /// The search has ended; kept around for the final picture and the cursor readout
    Finished(AStar),
}

impl Phase {
    fn grid(&self) -> &Grid {
        match self {
            Phase::Generating(generator) => generator.grid(),
            Phase::Solving(solver) | Phase::Finished(solver) => solver.grid(),
        }
    }
}

/// Interactive terminal host: animates maze generation (on walled grids) and then the search,
/// a configurable number of steps per tick.
pub struct App {
    config: Config,
    renderer: Renderer,
    paused: bool,
    steps_per_tick: usize,
    /// Inspection cursor, shown while paused
    cursor: Coord,
    /// Number of runs started, mixed into the seed so `r` gives a new grid
    runs: u64,
    /// Last status message from a generator or the solver
    message: String,
}

impl App {
    pub fn new(config: Config, stdout: Stdout) -> Self {
        let steps_per_tick = config.steps_per_tick;
        Self {
            config,
            renderer: Renderer::new(stdout),
            paused: false,
            steps_per_tick,
            cursor: (0, 0),
            runs: 0,
            message: String::new(),
        }
    }

    /// Set a panic hook to restore terminal state on panic
    /// This ensures that the terminal is not left in raw mode or alternate screen on panic
    fn set_panic_hook() {
        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = App::restore_terminal(&mut std::io::stdout()); // ignore any errors as we are already failing
            hook(panic_info);
        }));
    }

    /// Setup terminal in raw mode and enter alternate screen
    /// Also sets a panic hook to restore terminal on panic
    pub fn setup_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        terminal::enable_raw_mode()?;
        App::set_panic_hook();
        queue!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            cursor::Hide,
            cursor::MoveTo(0, 0)
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Restore terminal to original state
    /// Leave alternate screen and disable raw mode
    pub fn restore_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        queue!(stdout, terminal::LeaveAlternateScreen, cursor::Show)?;
        stdout.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Seed for the next run, if the configuration fixed one.
    fn run_seed(&self) -> Option<u64> {
        self.config.seed.map(|seed| seed.wrapping_add(self.runs))
    }

    /// Builds a fresh grid and the phase that starts working on it.
    fn start_run(&mut self) -> Result<Phase> {
        let seed = self.run_seed();
        self.runs += 1;
        let config = &self.config;
        let mut grid = Grid::new(config.rows, config.cols, config.walled)?;

        let phase = if config.walled {
            tracing::info!(
                "Run {}: generating a {}x{} maze with {}",
                self.runs,
                config.rows,
                config.cols,
                config.generator
            );
            Phase::Generating(config.generator.build(grid, seed)?)
        } else {
            let (start, goal) = grid.default_endpoints();
            grid.place_endpoints(start, goal)?;
            let mut rng = get_rng(seed);
            let walls = grid.scatter_walls(config.wall_density, &mut rng)?;
            tracing::info!(
                "Run {}: {}x{} grid with {} walls",
                self.runs,
                config.rows,
                config.cols,
                walls.len()
            );
            Phase::Solving(AStar::new(grid, start, goal, config.search)?)
        };
        self.message.clear();
        Ok(phase)
    }

    /// Hands a finished maze over to the solver.
    fn start_search(&mut self, generator: Box<dyn MazeGenerator>) -> Result<Phase> {
        let mut grid = generator.into_grid();
        grid.reset_search_state();
        let (start, goal) = grid.default_endpoints();
        grid.place_endpoints(start, goal)?;
        let solver = AStar::new(grid, start, goal, self.config.search)?;
        self.renderer.draw_grid(solver.grid())?;
        Ok(Phase::Solving(solver))
    }

    /// Performs `n` units of work in the current phase and draws what changed.
    fn advance(&mut self, phase: Phase, n: usize) -> Result<Phase> {
        let (phase, step) = match phase {
            Phase::Generating(mut generator) => {
                let step = generator.advance(n, false)?;
                self.renderer.draw_cells(generator.grid(), &step.changed)?;
                if generator.is_done() {
                    (self.start_search(generator)?, step)
                } else {
                    (Phase::Generating(generator), step)
                }
            }
            Phase::Solving(mut solver) => {
                let step = solver.advance(n);
                self.renderer.draw_cells(solver.grid(), &step.changed)?;
                if solver.is_done() {
                    (Phase::Finished(solver), step)
                } else {
                    (Phase::Solving(solver), step)
                }
            }
            Phase::Finished(solver) => (Phase::Finished(solver), Step::default()),
        };
        if !step.message.is_empty() {
            self.message = step.message;
        }
        Ok(phase)
    }

    fn status_lines(&self, phase: &Phase) -> Vec<String> {
        let progress = match phase {
            Phase::Generating(generator) => format!(
                "Generating: {}/{} cells joined",
                generator.visited(),
                generator.grid().len()
            ),
            Phase::Solving(solver) | Phase::Finished(solver) => {
                let outcome = match solver.state() {
                    SolverState::Running => "Searching".to_string(),
                    SolverState::Found { distance } => format!("Path found, distance {distance:.2}"),
                    SolverState::NotFound => "No path".to_string(),
                };
                format!(
                    "{}: {} visited, {} open | heuristic {} movement {} weight {}",
                    outcome,
                    solver.visited(),
                    solver.open_len(),
                    self.config.search.heuristic,
                    self.config.search.movement,
                    self.config.search.weight
                )
            }
        };

        let controls = if self.paused {
            let readout = match phase {
                Phase::Solving(solver) | Phase::Finished(solver) => {
                    let cell = &solver.grid()[self.cursor];
                    format!(
                        "{:?} {:?} f={:.2} g={:.2} h={:.2}",
                        self.cursor,
                        cell.kind,
                        cell.f_score,
                        cell.g_score,
                        solver.heuristic(self.cursor, solver.goal())
                    )
                }
                Phase::Generating(generator) => {
                    format!("{:?} {:?}", self.cursor, generator.grid()[self.cursor].kind)
                }
            };
            format!("[paused] {readout} | arrows: inspect  s: step  space: resume  q: quit")
        } else {
            format!(
                "{} steps/tick | space: pause  r: new run  +/-: speed  q: quit",
                self.steps_per_tick
            )
        };
        vec![self.message.clone(), progress, controls]
    }

    fn move_cursor(&mut self, grid: &Grid, code: KeyCode) {
        let (row, col) = self.cursor;
        self.cursor = match code {
            KeyCode::Up => (row.saturating_sub(1), col),
            KeyCode::Down => ((row + 1).min(grid.rows() - 1), col),
            KeyCode::Left => (row, col.saturating_sub(1)),
            KeyCode::Right => (row, (col + 1).min(grid.cols() - 1)),
            _ => (row, col),
        };
    }

    /// Main application loop. Returns when the user quits.
    pub fn run(&mut self) -> Result<()> {
        let mut phase = self.start_run()?;
        let mut next_tick = Instant::now();
        // False while the terminal is too small to draw the grid
        let mut fits = self.renderer.check_size(phase.grid(), STATUS_LINES)?;
        if fits {
            self.renderer.draw_grid(phase.grid())?;
        }

        loop {
            let timeout = next_tick.saturating_duration_since(Instant::now());
            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                        KeyCode::Esc | KeyCode::Char('q') => {
                            tracing::info!("Quit requested");
                            break;
                        }
                        KeyCode::Char(' ') => {
                            self.paused = !self.paused;
                            let cursor = self.paused.then_some(self.cursor);
                            if fits {
                                self.renderer.set_cursor(phase.grid(), cursor)?;
                            }
                        }
                        KeyCode::Char('s') if self.paused && fits => {
                            phase = self.advance(phase, 1)?;
                        }
                        KeyCode::Char('r') => {
                            self.renderer.clear_cursor();
                            self.paused = false;
                            phase = self.start_run()?;
                            fits = self.renderer.check_size(phase.grid(), STATUS_LINES)?;
                            if fits {
                                self.renderer.draw_grid(phase.grid())?;
                            }
                        }
                        KeyCode::Char('+') => {
                            self.steps_per_tick =
                                (self.steps_per_tick * 2).min(Config::MAX_STEPS_PER_TICK);
                        }
                        KeyCode::Char('-') => {
                            self.steps_per_tick = (self.steps_per_tick / 2).max(1);
                        }
                        code @ (KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right)
                            if self.paused && fits =>
                        {
                            self.move_cursor(phase.grid(), code);
                            self.renderer.set_cursor(phase.grid(), Some(self.cursor))?;
                        }
                        _ => {}
                    },
                    Event::Resize(_, _) => {
                        fits = self.renderer.check_size(phase.grid(), STATUS_LINES)?;
                        if fits {
                            self.renderer.draw_grid(phase.grid())?;
                        }
                    }
                    _ => {}
                }
                if fits {
                    self.renderer.draw_status(&self.status_lines(&phase))?;
                }
                continue;
            }

            // Tick
            next_tick = Instant::now() + self.config.tick;
            if !fits || self.paused {
                continue;
            }
            if !matches!(phase, Phase::Finished(_)) {
                phase = self.advance(phase, self.steps_per_tick)?;
            }
            self.renderer.draw_status(&self.status_lines(&phase))?;
        }
        Ok(())
    }

    /// Headless run for profiling: generates (on walled grids) and solves `iterations` times
    /// without touching the terminal, returning the time spent in each phase.
    pub fn profile(config: &Config, iterations: usize) -> Result<Vec<(Duration, Duration)>> {
        let mut timings = Vec::with_capacity(iterations);
        for i in 0..iterations {
            let seed = config.seed.map(|seed| seed.wrapping_add(i as u64));
            let mut grid = Grid::new(config.rows, config.cols, config.walled)?;

            let started = Instant::now();
            if config.walled {
                let mut generator = config.generator.build(grid, seed)?;
                while !generator.is_done() {
                    generator.advance(config.steps_per_tick, false)?;
                }
                grid = generator.into_grid();
                grid.reset_search_state();
            }
            let (start, goal) = grid.default_endpoints();
            grid.place_endpoints(start, goal)?;
            if !config.walled {
                grid.scatter_walls(config.wall_density, &mut get_rng(seed))?;
            }
            let generated = started.elapsed();

            let started = Instant::now();
            let mut solver = AStar::new(grid, start, goal, config.search)?;
            while !solver.is_done() {
                solver.advance(config.steps_per_tick);
            }
            let solved = started.elapsed();
            tracing::debug!(
                "Profile iteration {}: {:?} after {} expansions",
                i,
                solver.state(),
                solver.visited()
            );
            timings.push((generated, solved));
        }
        Ok(timings)
    }
}
