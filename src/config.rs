//! Run configuration for the terminal host and the profiler.

use std::time::Duration;

use clap::Parser;

use crate::error::ConfigError;
use crate::generators::Generator;
use crate::solvers::{AStarSettings, HeuristicKind, MovementKind};

/// Everything needed to set up one generate-then-solve run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub rows: usize,
    pub cols: usize,
    /// Carve a maze between walled cells instead of scattering wall cells
    pub walled: bool,
    /// Probability of an open cell becoming a wall on an unwalled grid
    pub wall_density: f64,
    pub search: AStarSettings,
    pub generator: Generator,
    pub seed: Option<u64>,
    /// Units of work per animation tick
    pub steps_per_tick: usize,
    pub tick: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rows: 31,
            cols: 51,
            walled: false,
            wall_density: 0.35,
            search: AStarSettings::default(),
            generator: Generator::Wilson,
            seed: None,
            steps_per_tick: 1,
            tick: Duration::from_millis(30),
        }
    }
}

/// Command-line options of the terminal host.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Grid height in cells
    #[arg(long, default_value_t = 31)]
    pub rows: usize,

    /// Grid width in cells
    #[arg(long, default_value_t = 51)]
    pub cols: usize,

    /// Carve a maze between walled cells instead of scattering wall cells
    #[arg(long)]
    pub walled: bool,

    /// Probability of an open cell becoming a wall on an unwalled grid
    #[arg(long = "walls", default_value_t = 0.35)]
    pub wall_density: f64,

    /// Heuristic: euclidean or manhattan
    #[arg(long, default_value_t = HeuristicKind::Euclidean)]
    pub heuristic: HeuristicKind,

    /// Movement: euclidean (8-way), manhattan (4-way) or walls [default: manhattan, walls on a
    /// walled grid]
    #[arg(long)]
    pub movement: Option<MovementKind>,

    /// Heuristic weight; 1 is plain A*
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub weight: f64,

    /// Maze generator: wilson or growing-tree [default: wilson]
    #[arg(long)]
    pub generator: Option<Generator>,

    /// Growing-tree probability of extending the newest cell; implies growing-tree when set
    /// without --generator
    #[arg(long, default_value_t = Generator::DEFAULT_BACKTRACK_PROB, allow_negative_numbers = true)]
    pub backtrack: f64,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Units of work per animation tick
    #[arg(long = "steps", default_value_t = 1)]
    pub steps_per_tick: usize,

    /// Milliseconds between animation ticks
    #[arg(long, default_value_t = 30)]
    pub tick_ms: u64,
}

impl TryFrom<Args> for Config {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let generator = match args.generator {
            Some(Generator::GrowingTree { .. }) => Generator::GrowingTree {
                backtrack_prob: args.backtrack,
            },
            Some(Generator::Wilson) => Generator::Wilson,
            None if args.backtrack != Generator::DEFAULT_BACKTRACK_PROB => {
                Generator::GrowingTree {
                    backtrack_prob: args.backtrack,
                }
            }
            None => Generator::Wilson,
        };
        let movement = args.movement.unwrap_or(if args.walled {
            MovementKind::Walls
        } else {
            MovementKind::Manhattan
        });

        let config = Config {
            rows: args.rows,
            cols: args.cols,
            walled: args.walled,
            wall_density: args.wall_density,
            search: AStarSettings {
                heuristic: args.heuristic,
                movement,
                weight: args.weight,
            },
            generator,
            seed: args.seed,
            steps_per_tick: args.steps_per_tick,
            tick: Duration::from_millis(args.tick_ms),
        };
        config.validate()?;
        Ok(config)
    }
}

impl Config {
    /// Most steps per tick the speed keys will go up to.
    pub const MAX_STEPS_PER_TICK: usize = 4096;

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::InvalidDimensions {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if !(0.0..=1.0).contains(&self.wall_density) {
            return Err(ConfigError::InvalidProbability {
                name: "wall density",
                value: self.wall_density,
            });
        }
        if let Generator::GrowingTree { backtrack_prob } = self.generator {
            if !(0.0..=1.0).contains(&backtrack_prob) {
                return Err(ConfigError::InvalidProbability {
                    name: "backtrack probability",
                    value: backtrack_prob,
                });
            }
        }
        if self.steps_per_tick == 0 || self.steps_per_tick > Self::MAX_STEPS_PER_TICK {
            return Err(ConfigError::InvalidOption(format!(
                "steps per tick must lie in 1..={}, got {}",
                Self::MAX_STEPS_PER_TICK,
                self.steps_per_tick
            )));
        }
        if self.search.movement == MovementKind::Walls && !self.walled {
            return Err(ConfigError::NotWalled("walls movement"));
        }
        self.search.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Config, ConfigError> {
        let args = Args::try_parse_from(std::iter::once("brickwall").chain(args.iter().copied()))
            .unwrap();
        Config::try_from(args)
    }

    fn parse_error(args: &[&str]) -> ErrorKind {
        Args::try_parse_from(std::iter::once("brickwall").chain(args.iter().copied()))
            .unwrap_err()
            .kind()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!((config.rows, config.cols), (31, 51));
        assert!(!config.walled);
        assert_eq!(config.search.heuristic, HeuristicKind::Euclidean);
        assert_eq!(config.search.movement, MovementKind::Manhattan);
        assert_eq!(config.tick, Duration::from_millis(30));
    }

    #[test]
    fn test_parse_options() {
        let config = parse(&[
            "--rows",
            "11",
            "--cols",
            "17",
            "--heuristic",
            "manhattan",
            "--movement",
            "euclidean",
            "--weight",
            "2.5",
            "--seed",
            "42",
            "--steps",
            "8",
            "--tick-ms",
            "5",
        ])
        .unwrap();
        assert_eq!((config.rows, config.cols), (11, 17));
        assert_eq!(config.search.heuristic, HeuristicKind::Manhattan);
        assert_eq!(config.search.movement, MovementKind::Euclidean);
        assert_eq!(config.search.weight, 2.5);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.steps_per_tick, 8);
        assert_eq!(config.tick, Duration::from_millis(5));
    }

    #[test]
    fn test_walled_grid_follows_passages() {
        let config = parse(&["--walled"]).unwrap();
        assert_eq!(config.search.movement, MovementKind::Walls);
        assert_eq!(config.generator, Generator::Wilson);

        let config = parse(&["--walled", "--movement", "manhattan"]).unwrap();
        assert_eq!(config.search.movement, MovementKind::Manhattan);
    }

    #[test]
    fn test_walls_movement_needs_walled_grid() {
        assert_eq!(
            parse(&["--movement", "walls"]).unwrap_err(),
            ConfigError::NotWalled("walls movement")
        );
    }

    #[test]
    fn test_generator_options_in_any_order() {
        let config = parse(&["--backtrack", "0.8", "--generator", "growing-tree"]).unwrap();
        assert_eq!(
            config.generator,
            Generator::GrowingTree { backtrack_prob: 0.8 }
        );

        let config = parse(&["--backtrack", "0.9"]).unwrap();
        assert_eq!(
            config.generator,
            Generator::GrowingTree { backtrack_prob: 0.9 }
        );

        let config = parse(&["--generator", "wilson", "--backtrack", "0.9"]).unwrap();
        assert_eq!(config.generator, Generator::Wilson);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            parse(&["--rows", "0"]).unwrap_err(),
            ConfigError::InvalidDimensions { rows: 0, cols: 51 }
        ));
        assert!(matches!(
            parse(&["--walls", "1.5"]).unwrap_err(),
            ConfigError::InvalidProbability { .. }
        ));
        assert!(matches!(
            parse(&["--backtrack", "-0.5"]).unwrap_err(),
            ConfigError::InvalidProbability { .. }
        ));
        assert_eq!(
            parse(&["--weight", "-1"]).unwrap_err(),
            ConfigError::InvalidWeight(-1.0)
        );
        assert!(matches!(
            parse(&["--steps", "0"]).unwrap_err(),
            ConfigError::InvalidOption(_)
        ));
    }

    #[test]
    fn test_malformed_arguments() {
        assert_eq!(parse_error(&["--heuristic", "chebyshev"]), ErrorKind::ValueValidation);
        assert_eq!(parse_error(&["--generator", "kruskal"]), ErrorKind::ValueValidation);
        assert_eq!(parse_error(&["--cols", "wide"]), ErrorKind::ValueValidation);
        assert_eq!(parse_error(&["--colour", "red"]), ErrorKind::UnknownArgument);
        assert_eq!(parse_error(&["--rows"]), ErrorKind::InvalidValue);
    }
}
