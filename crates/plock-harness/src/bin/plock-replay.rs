#![forbid(unsafe_code)]

use clap::Parser;
use plock_harness::cli::{ReplayArgs, init_tracing, run};

fn main() {
    init_tracing();
    let args = ReplayArgs::parse();
    let stdout = std::io::stdout();
    if let Err(error) = run(&args, &mut stdout.lock()) {
        eprintln!("{error}");
        std::process::exit(error.exit_code());
    }
}
