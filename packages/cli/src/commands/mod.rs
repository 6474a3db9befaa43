pub mod init;
pub mod inspect;
pub mod replay;

pub use init::{init, InitArgs};
pub use inspect::{inspect, InspectArgs};
pub use replay::{replay, ReplayArgs};

use anyhow::Result;
use canvas_engine::EngineConfig;
use std::path::Path;

pub const DEFAULT_PAGES_FILE: &str = "pages.json";

/// Config from `--config`, or from the working directory
pub fn load_config(explicit: Option<&Path>, cwd: &Path) -> Result<EngineConfig> {
    let config = match explicit {
        Some(path) => EngineConfig::load_file(path)?,
        None => EngineConfig::load(cwd)?,
    };
    Ok(config)
}
