use std::path::Path;
use std::sync::Arc;

use framewall::frames::ImageSequenceSource;
use framewall::scene::VisualizationData;
use framewall::{FramewallError, Options, Viewer};

/// Positional argument meaning "not given".
const SKIP: &str = "-";

fn load_data(path: &str) -> Result<VisualizationData, FramewallError> {
    let raw = std::fs::read_to_string(path)?;
    VisualizationData::from_json_str(&raw)
}

fn build_viewer(args: &[String]) -> Result<Viewer, FramewallError> {
    let arg = |i: usize| args.get(i).filter(|a| a.as_str() != SKIP);
    let mut builder = Viewer::builder();

    let data = arg(0).map(|path| load_data(path)).transpose()?;
    if let Some(path) = arg(1) {
        builder = builder.with_options(Options::load(Path::new(path))?);
    }
    if let Some(dir) = arg(2) {
        let size = data
            .as_ref()
            .map(|d| d.frame_dimensions)
            .unwrap_or_default();
        builder = builder.with_source(Arc::new(ImageSequenceSource::new(
            dir,
            ImageSequenceSource::DEFAULT_TEMPLATE,
            size,
        )));
    }
    if let Some(data) = data {
        builder = builder.with_data(data);
    }
    Ok(builder.build())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        log::error!(
            "Usage: framewall [data.json|-] [options.toml|-] [frames-dir]"
        );
        std::process::exit(1);
    }

    let viewer = match build_viewer(&args) {
        Ok(viewer) => viewer,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = viewer.run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
