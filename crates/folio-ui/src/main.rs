//! folio - headless page load simulation.
//!
//! Plays a scripted page load through the preloader, the loading host and
//! the scroll-animation lifecycle, then prints a JSON summary.

use std::path::PathBuf;

use folio_core::MotionConfig;
use folio_ui::{SimOptions, Simulation};

// =============================================================================
// Arguments
// =============================================================================

#[derive(Debug, Default)]
struct Args {
    images: Option<u32>,
    already_loaded: bool,
    config: Option<PathBuf>,
    /// Pace frames with the wall clock instead of running flat out.
    realtime: bool,
}

const USAGE: &str = "usage: folio [--images N] [--already-loaded] [--config PATH] [--realtime]";

fn parse_args(mut args: pico_args::Arguments) -> Result<Args, String> {
    if args.contains(["-h", "--help"]) {
        return Err(USAGE.to_string());
    }
    let parsed = Args {
        images: args
            .opt_value_from_str("--images")
            .map_err(|e| e.to_string())?,
        already_loaded: args.contains("--already-loaded"),
        config: args
            .opt_value_from_str("--config")
            .map_err(|e| e.to_string())?,
        realtime: args.contains("--realtime"),
    };
    let rest = args.finish();
    if !rest.is_empty() {
        return Err(format!("unknown arguments {:?}\n{}", rest, USAGE));
    }
    Ok(parsed)
}

// =============================================================================
// Configuration
// =============================================================================

/// Load the motion config.
///
/// An explicit path must load. The default location falls back to defaults
/// when it is missing or broken.
fn load_config(path: Option<&PathBuf>) -> Result<MotionConfig, String> {
    if let Some(path) = path {
        tracing::info!("Loading config from: {}", path.display());
        return MotionConfig::load_from(path)
            .map_err(|e| format!("{}: {}", path.display(), e));
    }
    match MotionConfig::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            tracing::warn!("{} - using default configuration", e);
            Ok(MotionConfig::default())
        }
    }
}

// =============================================================================
// Main
// =============================================================================

async fn run(args: Args) -> Result<(), String> {
    let config = load_config(args.config.as_ref())?;
    let mut options = SimOptions {
        already_loaded: args.already_loaded,
        ..SimOptions::default()
    };
    if let Some(images) = args.images {
        options.images = images;
    }
    let frame = options.frame;

    let mut sim = Simulation::new(options, config);
    sim.start();

    let mut ticker = tokio::time::interval(frame);
    while !sim.is_finished() {
        if args.realtime {
            ticker.tick().await;
        }
        sim.step();
    }

    let report = sim.report();
    if !report.ready {
        tracing::warn!("Page was not ready after {} ms", report.elapsed_ms);
    }
    let json = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args(pico_args::Arguments::from_env()) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    tracing::info!("folio starting...");

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(run(args)) {
        tracing::error!("Simulation failed: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(list: &[&str]) -> Result<Args, String> {
        parse_args(pico_args::Arguments::from_vec(
            list.iter().map(std::ffi::OsString::from).collect(),
        ))
    }

    #[test]
    fn test_parse_args() {
        let parsed = args(&["--images", "6", "--already-loaded", "--config", "m.toml"]).unwrap();
        assert_eq!(parsed.images, Some(6));
        assert!(parsed.already_loaded);
        assert_eq!(parsed.config, Some(PathBuf::from("m.toml")));
        assert!(!parsed.realtime);

        assert!(args(&["--images"]).is_err());
        assert!(args(&["--images", "many"]).is_err());
        assert!(args(&["--bogus"]).is_err());
        assert_eq!(args(&["--help"]).unwrap_err(), USAGE);
    }

    #[test]
    fn test_explicit_config_must_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[preloader]\nshow_progress_bar = false").unwrap();
        let config = load_config(Some(&file.path().to_path_buf())).unwrap();
        assert!(!config.preloader.show_progress_bar);

        let missing = file.path().with_extension("missing");
        assert!(load_config(Some(&missing)).is_err());
    }
}
