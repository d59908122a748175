//! Desktop viewer of the Nepal boundary atlas.
//!
//! Usage: `nepal-atlas-egui [config.json]`. The configuration file can also be given with the
//! `NEPAL_ATLAS_CONFIG` environment variable. Without one the built-in defaults are used.

use std::error::Error;
use std::path::PathBuf;

use nepal_atlas::AtlasConfig;
use tokio::runtime::Runtime;

mod app;
mod map_widget;
mod tiles;

const CONFIG_ENV: &str = "NEPAL_ATLAS_CONFIG";

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match config_path() {
        Some(path) => {
            log::info!("Loading configuration from {}", path.display());
            AtlasConfig::from_json_file(&path)?
        }
        None => AtlasConfig::default(),
    };

    // Loaders spawn their tasks on this runtime. Worker threads run them while the UI owns the
    // main thread.
    let rt = Runtime::new()?;
    let _enter = rt.enter();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Nepal Atlas")
            .with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Nepal Atlas",
        native_options,
        Box::new(move |cc| {
            let app: Box<dyn eframe::App> = Box::new(app::AtlasApp::new(cc, config)?);
            Ok(app)
        }),
    )?;

    Ok(())
}

fn config_path() -> Option<PathBuf> {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
}
