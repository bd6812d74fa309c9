use std::time::Duration;

use brickwall::{
    app::App,
    config::{Args, Config},
};
use clap::{CommandFactory, Parser, error::ErrorKind};

/// Headless benchmark: generates (on walled grids) and solves without drawing anything
#[derive(Parser, Debug)]
#[command(name = "profile")]
struct ProfileArgs {
    /// Number of runs, each seeded one past the previous when --seed is given
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    #[command(flatten)]
    run: Args,
}

fn main() -> brickwall::error::Result<()> {
    let args = ProfileArgs::parse();
    let mut config = Config::try_from(args.run).unwrap_or_else(|e| {
        ProfileArgs::command()
            .error(ErrorKind::ValueValidation, e)
            .exit()
    });
    // Batch steps as a host would at full speed
    config.steps_per_tick = Config::MAX_STEPS_PER_TICK;

    let timings = App::profile(&config, args.iterations)?;
    let (generated, solved) = timings.iter().fold(
        (Duration::ZERO, Duration::ZERO),
        |(g, s), (dg, ds)| (g + *dg, s + *ds),
    );
    println!(
        "{} iterations on a {}x{} {} grid",
        timings.len(),
        config.rows,
        config.cols,
        if config.walled { "walled" } else { "open" }
    );
    if config.walled {
        println!("  generation ({}): {:?} total", config.generator, generated);
    } else {
        println!("  wall scatter: {:?} total", generated);
    }
    println!(
        "  search ({} / {} / weight {}): {:?} total",
        config.search.heuristic, config.search.movement, config.search.weight, solved
    );
    if let Some(n) = u32::try_from(timings.len()).ok().filter(|&n| n > 0) {
        println!("  per iteration: {:?} + {:?}", generated / n, solved / n);
    }
    Ok(())
}
