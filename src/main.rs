use std::env;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use concept_charts::charts::conference::{self, ConferenceChart};
use concept_charts::charts::phases::{self, PhaseChart};
use concept_charts::config::load_config;
use concept_charts::output::save_chart;
use concept_charts::plot::render::register_fonts;

fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(false)
        .init();

    let config = load_config()?;
    if config.style.draw_text {
        register_fonts(&config.style, &config.output)?;
    }
    let out_dir = &config.output.output_dir;

    let phase_chart = PhaseChart::four_phases()?;
    let rendered = phases::render(&phase_chart, &config.style, &config.output)?;
    save_chart(&rendered, out_dir)?;

    let conference_chart = ConferenceChart::ml_cycle()?;
    for rendered in conference::render_variants(&conference_chart, &config.style)? {
        save_chart(&rendered, out_dir)?;
    }

    info!(dir = %out_dir.display(), "all charts written");
    Ok(())
}
