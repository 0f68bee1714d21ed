pub mod audio;
pub mod breath;
pub mod dot;
pub mod session;
pub mod settings;
mod utils;

use anyhow::{Context, Result};
use log::{error, info, warn};

use audio::ChimeEmitter;
use dot::Surface;
use session::{RenderModel, SessionController, SessionRunner};
use settings::{BreathPattern, ConfigEdit, Configuration};

/// Nominal surface for headless runs, where nothing is ever laid out.
const HEADLESS_SURFACE: Surface = Surface {
    width: 800.0,
    height: 800.0,
};

fn debug_mode() -> bool {
    std::env::var("BREATHDOT_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Configuration from `BREATHDOT_CONFIG` (JSON) and `BREATHDOT_PATTERN`
/// (preset name), falling back to defaults.
pub fn load_configuration() -> Configuration {
    let mut config = match std::env::var("BREATHDOT_CONFIG") {
        Ok(raw) => settings::from_json_or_default(&raw),
        Err(_) => Configuration::default(),
    };

    if let Ok(name) = std::env::var("BREATHDOT_PATTERN") {
        match BreathPattern::from_name(&name) {
            Some(pattern) => config.apply(ConfigEdit::Pattern(pattern)),
            None => warn!("unknown breathing pattern {name:?}; keeping configured durations"),
        }
    }

    config
}

/// Runs a headless session until Ctrl-C, logging what a view would draw.
pub fn run() {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    info!("breathdot starting up...");

    if let Err(err) = run_headless(load_configuration(), debug_mode()) {
        error!("breathdot exited with error: {err:#}");
    }
}

fn run_headless(config: Configuration, debug: bool) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    runtime.block_on(async move {
        let controller = SessionController::new(config, Box::new(ChimeEmitter::new()));
        let runner = SessionRunner::new(controller);
        runner.set_surface(Some(HEADLESS_SURFACE)).await;

        let mut render_rx = runner.subscribe();
        let mut last_phase = render_rx.borrow().phase;
        runner.start().await;

        loop {
            tokio::select! {
                changed = render_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let model = render_rx.borrow_and_update().clone();
                    if debug {
                        log_model(&model)?;
                    } else if model.phase != last_phase {
                        info!(
                            "{} ({}) cycle {}/{} [{}%] {}",
                            model.phase_label,
                            model
                                .phase_remaining_seconds
                                .map(|secs| format!("{secs}s"))
                                .unwrap_or_else(|| "-".to_string()),
                            model.cycles_completed,
                            model.cycles_goal,
                            model.progress_percent,
                            model.elapsed,
                        );
                    }
                    last_phase = model.phase;
                }
                signal = tokio::signal::ctrl_c() => {
                    signal.context("failed to listen for ctrl-c")?;
                    break;
                }
            }
        }

        runner.shutdown().await;
        let summary = runner.render_model().await;
        info!(
            "session ended: {} cycle(s) in {}",
            summary.cycles_completed, summary.elapsed
        );
        Ok::<(), anyhow::Error>(())
    })
}

fn log_model(model: &RenderModel) -> Result<()> {
    let json = serde_json::to_string(model).context("failed to serialize render model")?;
    info!("{json}");
    Ok(())
}
