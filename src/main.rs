use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{error, info};

use lowpoly_worlds::config::WorldConfig;
use lowpoly_worlds::error::Result;
use lowpoly_worlds::village::{VillageStyle, VillageWorld};
use lowpoly_worlds::{export, logging, viewer};

#[derive(Parser, Debug)]
#[command(name = "village")]
#[command(about = "Generate and explore a procedural low-poly village")]
struct Args {
    /// World config JSON (seed, worldSize, houseCount, treeCount)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed (overrides the config)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Side length of the square world
    #[arg(long)]
    world_size: Option<f32>,

    /// Number of houses to try to place
    #[arg(long)]
    houses: Option<usize>,

    /// Number of trees to try to place
    #[arg(long)]
    trees: Option<usize>,

    /// Village generator: classic or hamlet
    #[arg(long, default_value = "classic")]
    style: VillageStyle,

    /// Export a top-down map PNG (e.g., "village_map.png")
    #[arg(long)]
    export_map: Option<PathBuf>,

    /// Pixels per terrain vertex in the exported map
    #[arg(long, default_value = "4")]
    map_scale: usize,

    /// Render one frame to this image instead of opening a window
    #[arg(long)]
    screenshot: Option<PathBuf>,

    /// Generate and log stats only, no window
    #[arg(long)]
    headless: bool,

    /// Log filter, e.g. "info" or "lowpoly_worlds=debug"
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    /// Export and screenshot runs write their files and exit, like `--headless`.
    fn opens_window(&self) -> bool {
        !(self.headless || self.screenshot.is_some() || self.export_map.is_some())
    }

    fn world_config(&self) -> Result<WorldConfig> {
        let mut config = WorldConfig::load_or_default(self.config.as_deref());
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(size) = self.world_size {
            config.world_size = size;
        }
        if let Some(houses) = self.houses {
            config.house_count = houses;
        }
        if let Some(trees) = self.trees {
            config.tree_count = trees;
        }
        config.validate()?;
        Ok(config)
    }
}

fn run(args: &Args) -> Result<()> {
    let config = args.world_config()?;
    info!(
        seed = config.seed,
        world_size = config.world_size,
        houses = config.house_count,
        trees = config.tree_count,
        style = ?args.style,
        "Loaded world config"
    );

    if args.opens_window() {
        return viewer::run_viewer(config, args.style, Path::new("."));
    }

    let world = VillageWorld::new(config, args.style);
    info!("{}", world.stats());

    if let Some(path) = &args.export_map {
        export::export_village_map(&world, path, args.map_scale)?;
        info!(path = %path.display(), "Exported village map");
    }

    if let Some(path) = &args.screenshot {
        let fb = viewer::render_still(&world, viewer::WINDOW_WIDTH, viewer::WINDOW_HEIGHT);
        export::save_screenshot(&fb, path)?;
        info!(path = %path.display(), "Saved screenshot");
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    logging::init_logging(&args.log_level);

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_plain_run_opens_window() {
        assert!(parse(&["village"]).opens_window());
        assert!(parse(&["village", "--style", "hamlet", "--seed", "9"]).opens_window());
    }

    #[test]
    fn test_file_outputs_exit_without_window() {
        assert!(!parse(&["village", "--export-map", "map.png"]).opens_window());
        assert!(!parse(&["village", "--screenshot", "shot.png"]).opens_window());
        assert!(!parse(&["village", "--headless"]).opens_window());
    }

    #[test]
    fn test_flags_override_config() {
        let args = parse(&["village", "--seed", "5", "--houses", "12", "--trees", "34"]);
        let config = args.world_config().unwrap();
        assert_eq!(config.seed, 5);
        assert_eq!(config.house_count, 12);
        assert_eq!(config.tree_count, 34);
    }
}
