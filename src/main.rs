use std::path::PathBuf;

use clap::{ArgAction, Parser};
use luxdraw::config::Config;
use luxdraw::transport::{replay, serve};

#[derive(Parser, Debug)]
#[command(name = "luxdraw")]
#[command(version, about = "Gesture-driven sketchpad that evaluates handwritten arithmetic")]
struct Cli {
    /// Serve JSON-lines frame requests on stdin/stdout
    #[arg(long, short = 's', action = ArgAction::SetTrue, conflicts_with = "replay")]
    serve: bool,

    /// Replay a recorded landmark trace (JSON lines) and print each status
    #[arg(long, short = 'r', value_name = "TRACE")]
    replay: Option<PathBuf>,

    /// Write the final replayed frame to this PNG file
    #[arg(long, short = 'o', value_name = "PNG", requires = "replay")]
    output: Option<PathBuf>,

    /// Configuration file (defaults to ~/.config/luxdraw/config.toml)
    #[arg(long, short = 'c', value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    if cli.serve {
        let config = Config::load(cli.config.as_deref())?;
        log::info!("Starting luxdraw session server");
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(serve::run(config))?;
        log::info!("Session server stopped.");
    } else if let Some(trace) = cli.replay.as_deref() {
        let config = Config::load(cli.config.as_deref())?;
        log::info!("Replaying trace {}", trace.display());
        replay::run_to_stdout(&config, trace, cli.output.as_deref())?;
    } else {
        // No flags: show usage
        println!("luxdraw: Gesture-driven sketchpad that evaluates handwritten arithmetic");
        println!();
        println!("Usage:");
        println!("  luxdraw --serve                 Serve JSON-lines frame requests on stdio");
        println!("  luxdraw --replay <TRACE>        Replay a landmark trace");
        println!("  luxdraw --replay <TRACE> -o <PNG>  Also save the final frame");
        println!("  luxdraw --help                  Show help");
        println!();
        println!("Gestures:");
        println!("  - Point (index finger only): draw");
        println!("  - Fist: erase");
        println!("  - Open hand over the palette: pick a color");
        println!("  - Hold still (no hand / open hand): recognize and evaluate after the idle period");
        println!();
        println!("Requirements:");
        println!("  - An OCR command reading PNG on stdin (tesseract by default)");
        println!("  - A hand tracker helper, or landmarks sent with each frame");
    }

    Ok(())
}
