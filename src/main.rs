use brickwall::{
    app::App,
    config::{Args, Config},
};
use clap::{CommandFactory, Parser, error::ErrorKind};

/// Log file written next to the working directory, since the terminal belongs to the maze.
const LOG_FILE: &str = "brickwall.log";

fn main() -> brickwall::error::Result<()> {
    let config = Config::try_from(Args::parse())
        .unwrap_or_else(|e| Args::command().error(ErrorKind::ValueValidation, e).exit());

    let level = std::env::var("BRICKWALL_LOG")
        .ok()
        .and_then(|level| level.parse::<tracing::Level>().ok())
        .unwrap_or(tracing::Level::INFO);
    let file_appender = tracing_appender::rolling::never(".", LOG_FILE);
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_max_level(level)
        .init();
    tracing::info!("Starting with {:?}", config);

    let mut stdout = std::io::stdout();
    App::setup_terminal(&mut stdout)?;
    let result = App::new(config, std::io::stdout()).run();
    App::restore_terminal(&mut stdout)?;
    if let Err(e) = &result {
        tracing::error!("Run aborted: {}", e);
    }
    result
}
