use super::PipelineConfig;
use crate::error::{Error, Result};
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, warn};

/// Read, parse and validate a pipeline configuration file.
pub async fn load_config(path: &Path) -> Result<PipelineConfig> {
    debug!("Reading pipeline config from {}", path.display());

    let content = fs::read_to_string(path).await.map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("failed to open config file {}: {e}", path.display()),
        ))
    })?;

    let config = PipelineConfig::from_yaml_str(&content)?;

    info!(
        lanes = config.lane_count(),
        depth = config.depth(),
        context = config.has_context(),
        "Loaded pipeline config from {}",
        path.display()
    );
    if !config.is_complete_reduction() {
        warn!(
            "reducer.depth {} stops short of log2({}) = {}; the final channel holds a partial result",
            config.depth(),
            config.lane_count(),
            config.complete_depth()
        );
    }

    Ok(config)
}
