//! Program rendering
//!
//! Expands a planned [`Topology`] into program source through a tera
//! template. The bundled template emits the Go kernel skeleton: one channel
//! and goroutine per lane, one forwarding routine per context group and one
//! combine routine per reduce node, closed by a collector on the final
//! channel.

use crate::config::{ContextConfig, MapperConfig, PipelineConfig, ReducerConfig};
use crate::error::{Error, Result};
use crate::planner::{ContextGroupSpec, MapperLaneSpec, ReduceLevel, Topology};
use serde::Serialize;
use std::path::Path;
use tera::{Context, Tera};
use tracing::debug;

mod arena;

pub use arena::ChannelArena;

/// Name the program template is registered under
pub const TEMPLATE_NAME: &str = "mapreduce.go";

/// Built-in program skeleton
pub const DEFAULT_TEMPLATE: &str = include_str!("templates/mapreduce.go.tera");

/// The dispatcher counts lanes with a `uint8`, which must also hold the
/// lane count itself.
pub const MAX_DISPATCH_LANES: usize = 128;

#[derive(Debug, Serialize)]
struct MapperView<'a> {
    type_name: &'a str,
    type_width: u32,
    deserialize: &'a str,
    function: &'a str,
    replicate: usize,
}

impl<'a> From<&'a MapperConfig> for MapperView<'a> {
    fn from(mapper: &'a MapperConfig) -> Self {
        Self {
            type_name: &mapper.type_name,
            type_width: mapper.type_width,
            deserialize: &mapper.deserialize,
            function: &mapper.function,
            replicate: mapper.lane_count,
        }
    }
}

#[derive(Debug, Serialize)]
struct ReducerView<'a> {
    type_name: &'a str,
    type_width: u32,
    serialize: &'a str,
    function: &'a str,
    depth: usize,
    empty: &'a str,
}

impl<'a> From<&'a ReducerConfig> for ReducerView<'a> {
    fn from(reducer: &'a ReducerConfig) -> Self {
        Self {
            type_name: &reducer.type_name,
            type_width: reducer.type_width,
            serialize: &reducer.serialize,
            function: &reducer.function,
            depth: reducer.depth,
            empty: &reducer.empty,
        }
    }
}

/// Everything a template can see
#[derive(Debug, Serialize)]
struct TemplateView<'a> {
    has_context: bool,
    context: Option<&'a ContextConfig>,
    mapper: MapperView<'a>,
    reducer: ReducerView<'a>,
    use_intermediate: bool,
    context_shift: u32,
    contexts: &'a [ContextGroupSpec],
    mappers: &'a [MapperLaneSpec],
    reducers: &'a [ReduceLevel],
    last_index: usize,
}

/// Tera-backed renderer holding one compiled program template
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Renderer for the built-in template
    pub fn new() -> Result<Self> {
        Self::from_template_str(DEFAULT_TEMPLATE)
    }

    pub fn from_template_str(template: &str) -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]); // Generated code, not HTML
        tera.add_raw_template(TEMPLATE_NAME, template)?;
        Ok(Self { tera })
    }

    /// Renderer for a user-supplied template file
    pub async fn from_template_file(path: &Path) -> Result<Self> {
        debug!("Loading program template from {}", path.display());
        let template = tokio::fs::read_to_string(path).await?;
        Self::from_template_str(&template)
    }

    /// Render `topology`, planned from `config`, into program text.
    pub fn render(&self, config: &PipelineConfig, topology: &Topology) -> Result<String> {
        check_renderable(config)?;
        check_planned_lanes(config, topology)?;
        let arena = ChannelArena::from_topology(topology)?;
        debug!(
            channels = arena.len(),
            span = arena.span(),
            "Channel index space checked"
        );

        let view = TemplateView {
            has_context: config.has_context(),
            context: config.context.as_ref(),
            mapper: MapperView::from(&config.mapper),
            reducer: ReducerView::from(&config.reducer),
            use_intermediate: topology.use_intermediate,
            context_shift: topology.context_shift,
            contexts: &topology.contexts,
            mappers: &topology.mappers,
            reducers: &topology.reducers,
            last_index: topology.last_index,
        };

        let context = Context::from_serialize(&view)?;
        Ok(self.tera.render(TEMPLATE_NAME, &context)?)
    }
}

/// Reject configurations the built-in program cannot run.
///
/// Needs no topology, so callers can check before planning.
pub fn check_renderable(config: &PipelineConfig) -> Result<()> {
    if config.lane_count() > MAX_DISPATCH_LANES {
        return Err(Error::Configuration(format!(
            "cannot render {} lanes; the dispatcher supports at most {MAX_DISPATCH_LANES}",
            config.lane_count()
        )));
    }
    if !config.is_complete_reduction() {
        return Err(Error::Configuration(format!(
            "reducer.depth {} leaves {} values unreduced; rendering needs depth {}",
            config.depth(),
            config.lane_count() >> config.depth(),
            config.complete_depth()
        )));
    }
    Ok(())
}

fn check_planned_lanes(config: &PipelineConfig, topology: &Topology) -> Result<()> {
    if topology.lane_count != config.lane_count() {
        return Err(Error::Consistency(format!(
            "topology plans {} lanes but the config asks for {}",
            topology.lane_count,
            config.lane_count()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests;
