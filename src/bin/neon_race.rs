//! Neon lane-avoidance racer

use clap::Parser;
use tracing::error;

use lowpoly_worlds::arcade;
use lowpoly_worlds::config::RaceTuning;
use lowpoly_worlds::logging;

#[derive(Parser, Debug)]
#[command(name = "neon_race")]
#[command(about = "Dodge the obstacles; Space to start, mouse to steer")]
struct Args {
    /// Random seed for obstacle spawns (random if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Log filter, e.g. "info" or "lowpoly_worlds=debug"
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    let args = Args::parse();
    logging::init_logging(&args.log_level);

    if let Err(e) = arcade::run_arcade(RaceTuning::default(), args.seed) {
        error!("{}", e);
        std::process::exit(1);
    }
}
