//! stable-layout - lay out a scenario and print the attributes as JSON.

use clap::Parser;
use stable_layout::geometry::Rect;
use stable_layout::scenario::Scenario;
use std::path::PathBuf;
use tracing::info;

/// Lay out a chat-style scenario and print the attributes of the elements
/// in the visible rectangle
#[derive(Parser, Debug)]
#[command(name = "stable-layout")]
#[command(version)]
#[command(about = "Lay out a chat-style scenario and print its layout attributes as JSON")]
pub struct Args {
    /// Path to the TOML scenario file
    pub scenario: PathBuf,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Scroll to this content offset before querying
    #[arg(long, allow_negative_numbers = true)]
    pub offset: Option<f64>,

    /// Query this rectangle ("x,y,width,height") instead of the visible bounds
    #[arg(long, value_parser = parse_rect)]
    pub rect: Option<Rect>,

    /// Enable pinned headers, footers and cells
    #[arg(long)]
    pub pinning: bool,
}

/// Parse `"x,y,width,height"`.
fn parse_rect(value: &str) -> Result<Rect, String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<f64>().map_err(|e| format!("{part:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    match parts.as_slice() {
        [x, y, width, height] if *width >= 0.0 && *height >= 0.0 => {
            Ok(Rect::new(*x, *y, *width, *height))
        }
        [_, _, _, _] => Err("width and height must not be negative".to_string()),
        _ => Err(format!("expected x,y,width,height, got {} values", parts.len())),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = stable_layout::config::load_config_with_precedence(args.config.clone())?;
        let merged = stable_layout::config::merge_config(config_file);
        let with_env = stable_layout::config::apply_env_overrides(merged);
        let pinning_override = if args.pinning { Some(true) } else { None };
        stable_layout::config::apply_cli_overrides(with_env, pinning_override)
    };

    stable_layout::logging::init(&config.log_file_path)?;

    info!(config = ?config, "Configuration loaded and resolved");

    let mut scenario = Scenario::load(&args.scenario)?;
    if let Some(offset) = args.offset {
        scenario.scroll_to(offset);
    }

    let rendering = scenario.render(config.settings, args.rect)?;
    println!("{}", serde_json::to_string_pretty(&rendering)?);

    Ok(())
}
