//! Offline replay of recorded landmark traces.
//!
//! Each trace line is `{"t_ms": u64, "width": u32, "height": u32,
//! "landmarks": [[x, y], ...]?}`. The session runs on a manual clock set to
//! `t_ms`, so idle timing is reproduced exactly regardless of how fast the
//! trace is read.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use image::RgbImage;
use serde::Deserialize;

use crate::config::Config;
use crate::input::HandLandmarks;
use crate::session::{ManualClock, Session};
use crate::transport::worker::frame_response;

/// One recorded frame.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TraceEvent {
    /// Milliseconds since the start of the trace
    pub t_ms: u64,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub landmarks: Option<Vec<[f64; 2]>>,
}

/// Replays `trace`, writing one status line per event to `out`.
///
/// When `output` is set, the final composite (over a black frame) is saved
/// there as PNG.
pub fn run<W: Write>(config: &Config, trace: &Path, output: Option<&Path>, out: &mut W) -> Result<()> {
    let file = File::open(trace).with_context(|| format!("Failed to open trace {}", trace.display()))?;
    let clock = Arc::new(ManualClock::new());
    let mut session = Session::with_clock(config, clock.clone());
    let mut last_frame: Option<(u32, u32, Option<HandLandmarks>)> = None;

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.context("Failed to read trace")?;
        if line.trim().is_empty() {
            continue;
        }
        let event: TraceEvent = serde_json::from_str(&line)
            .with_context(|| format!("Invalid trace event on line {}", index + 1))?;

        clock.set_elapsed(Duration::from_millis(event.t_ms));
        let hand = event.landmarks.as_deref().and_then(|points| {
            HandLandmarks::try_from(points)
                .map_err(|err| log::warn!("Line {}: {}", index + 1, err))
                .ok()
        });

        let outcome = session
            .step(event.width, event.height, hand.as_ref())
            .with_context(|| format!("Failed to process line {}", index + 1))?;
        log::debug!("Line {}: {:?}", index + 1, outcome);

        serde_json::to_writer(&mut *out, &frame_response(None, &session.status()))?;
        writeln!(out)?;
        last_frame = Some((event.width, event.height, hand));
    }

    if let Some(path) = output {
        let Some((width, height, hand)) = last_frame else {
            bail!("Trace {} has no events to render", trace.display());
        };
        let frame = RgbImage::new(width, height);
        let surface = session.compose(&frame, hand.as_ref())?;
        let mut png = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        surface.write_to_png(&mut png)?;
        log::info!("Wrote final frame to {}", path.display());
    }

    Ok(())
}

/// Replays `trace` to stdout.
pub fn run_to_stdout(config: &Config, trace: &Path, output: Option<&Path>) -> Result<()> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    run(config, trace, output, &mut lock)?;
    lock.flush()?;
    Ok(())
}
