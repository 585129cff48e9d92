use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use plock_core::logging::LOG_ENV;
use plock_gate::{GateConfig, LockGate};
use tracing_subscriber::EnvFilter;
use web_time::Instant;

use crate::error::Result;
use crate::replay::{ReplayOutput, TraceFile, TraceReplayer, replay_gate};

#[derive(Debug, Parser)]
#[command(
    name = "plock-replay",
    about = "Replay a JSONL pointer trace through a pattern lock gate",
    version
)]
pub struct ReplayArgs {
    /// Gate configuration (TOML, or JSON by extension). Defaults apply when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Trace file (`.jsonl`, or gzip-compressed).
    #[arg(long)]
    pub trace: PathBuf,

    /// Final tick this many milliseconds after the last record.
    #[arg(long, value_name = "MS")]
    pub settle_ms: Option<u64>,

    /// Use the trace header's surface width instead of the config's.
    #[arg(long)]
    pub header_width: bool,
}

/// Install a stderr fmt subscriber filtered by `PLOCK_LOG` (default `warn`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Replay the trace and write one JSON object per gate event to `out`.
pub fn run(args: &ReplayArgs, out: &mut impl Write) -> Result<Vec<ReplayOutput>> {
    let mut config = match &args.config {
        Some(path) => GateConfig::load(path)?,
        None => GateConfig::default(),
    };

    let trace = TraceFile::open(&args.trace)?;
    if args.header_width
        && let Some(width) = trace.surface_width()
    {
        config.layout.surface_width = width;
    }

    let mut gate = LockGate::from_config(&config)?;
    let mut replayer = TraceReplayer::from_trace(&trace);
    tracing::info!(
        trace = %args.trace.display(),
        steps = replayer.total(),
        "replaying trace"
    );

    let outputs = replay_gate(&mut gate, &mut replayer, Instant::now(), args.settle_ms);
    for output in &outputs {
        serde_json::to_writer(&mut *out, output)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(outputs)
}
