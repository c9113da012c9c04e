//! Generation driver
//!
//! Load a pipeline config, plan it, render it, format it, write it.

use crate::config::{load_config, PipelineConfig};
use crate::error::Result;
use crate::format::{gofmt, tidy_source};
use crate::planner::{Topology, TopologyPlanner};
use crate::render::{check_renderable, Renderer};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_CONFIG_PATH: &str = "reco.yml";
pub const DEFAULT_OUTPUT_PATH: &str = "mapreduce.go";

/// Options for one generation run
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub config_path: PathBuf,
    pub output_path: PathBuf,
    /// Replacement for the built-in program template
    pub template_path: Option<PathBuf>,
    /// Pipe the tidied source through an external `gofmt`
    pub gofmt: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            template_path: None,
            gofmt: false,
        }
    }
}

/// What a generation run produced
#[derive(Debug, Clone)]
pub struct GenerateReport {
    pub output_path: PathBuf,
    pub topology: Topology,
    pub bytes_written: usize,
}

/// Plan and render `config` into formatted source text.
pub async fn render_source(
    config: &PipelineConfig,
    template_path: Option<&Path>,
    use_gofmt: bool,
) -> Result<(Topology, String)> {
    check_renderable(config)?;
    let topology = TopologyPlanner::new(config)?.plan();

    let renderer = match template_path {
        Some(path) => Renderer::from_template_file(path).await?,
        None => Renderer::new()?,
    };
    let rendered = renderer.render(config, &topology)?;
    debug!("Rendered {} bytes of program text", rendered.len());

    let mut source = tidy_source(&rendered);
    if use_gofmt {
        source = gofmt(&source).await?;
    }

    Ok((topology, source))
}

/// Run the whole pipeline for `options`.
pub async fn generate(options: &GenerateOptions) -> Result<GenerateReport> {
    let config = load_config(&options.config_path).await?;
    let (topology, source) =
        render_source(&config, options.template_path.as_deref(), options.gofmt).await?;

    tokio::fs::write(&options.output_path, &source).await?;
    info!(
        lanes = topology.lane_count,
        final_index = topology.last_index,
        "Wrote {} ({} bytes)",
        options.output_path.display(),
        source.len()
    );

    Ok(GenerateReport {
        output_path: options.output_path.clone(),
        topology,
        bytes_written: source.len(),
    })
}

/// Serialization used by the `plan` command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PlanFormat {
    #[default]
    Json,
    Yaml,
}

/// Load `config_path` and describe its topology in `format`.
pub async fn describe_plan(config_path: &Path, format: PlanFormat) -> Result<String> {
    let config = load_config(config_path).await?;
    let topology = TopologyPlanner::new(&config)?.plan();

    Ok(match format {
        PlanFormat::Json => serde_json::to_string_pretty(&topology)?,
        PlanFormat::Yaml => serde_yaml::to_string(&topology)?,
    })
}
