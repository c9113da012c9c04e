use super::*;
use crate::planner::{plan, ReduceNodeSpec};
use crate::testing::PipelineConfigBuilder;
use tempfile::TempDir;

fn render(config: &PipelineConfig) -> Result<String> {
    let topology = plan(config)?;
    Renderer::new()?.render(config, &topology)
}

#[test]
fn test_render_four_lanes_without_context() {
    let config = PipelineConfigBuilder::new().with_lanes(4).build();
    let source = render(&config).unwrap();

    assert!(source.starts_with("package main"));
    assert!(!source.contains("contextData"));
    assert!(!source.contains("arbitrate"));
    for lane in 0..4 {
        assert!(source.contains(&format!("data{lane} := make(chan uint32, 1)")));
        assert!(source.contains(&format!("c{lane} <- Identity(<-data{lane})")));
    }
    assert!(source.contains("c4 <- Max(<-c0, <-c1)"));
    assert!(source.contains("c5 <- Max(<-c2, <-c3)"));
    assert!(source.contains("c6 <- Max(<-c4, <-c5)"));
    assert!(source.contains("val <- <-c6"));
    assert!(source.contains("ret = Uint32Init()"));
    assert!(source.contains("go Serialize(retChan, outputDataChan)"));
    assert!(source.contains("length*(32/32)"));
}

#[test]
fn test_render_context_without_fanout_reads_broadcast_directly() {
    let config = PipelineConfigBuilder::new()
        .with_lanes(4)
        .with_context("uint32", "Rands")
        .build();
    let source = render(&config).unwrap();

    assert!(source.contains("contextData uintptr"));
    assert!(source.contains("go Rands(<-contextChan, context3)"));
    assert!(source.contains("c2 <- Identity(context2, <-data2)"));
    assert!(!source.contains("intermediateContext"));
}

#[test]
fn test_render_context_fanout_groups() {
    let config = PipelineConfigBuilder::new()
        .with_lanes(32)
        .with_context("uint32", "Rands")
        .build();
    let source = render(&config).unwrap();

    assert!(source.contains("intermediateContext0 := make(chan uint32, 1)"));
    assert!(source.contains("intermediateContext1 := make(chan uint32, 1)"));
    assert!(!source.contains("intermediateContext2 :="));
    assert!(source.contains("switch i >> 4 {"));
    assert!(source.contains("go Rands(<-intermediateContext0, context15)"));
    assert!(source.contains("go Rands(<-intermediateContext1, context16)"));
    assert!(source.contains("val <- <-c62"));
}

#[test]
fn test_render_single_lane_collects_lane_output() {
    let config = PipelineConfigBuilder::new().with_lanes(1).build();
    let source = render(&config).unwrap();

    assert!(source.contains("val <- <-c0"));
    assert!(!source.contains("<- Max(<-"));
}

#[test]
fn test_render_rejects_too_many_lanes() {
    let config = PipelineConfigBuilder::new().with_lanes(256).build();
    let err = render(&config).unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("at most 128"));
}

#[test]
fn test_render_rejects_partial_reduction() {
    let config = PipelineConfigBuilder::new().with_lanes(8).with_depth(2).build();
    let err = render(&config).unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("leaves 2 values unreduced"));
}

#[test]
fn test_render_rejects_mismatched_topology() {
    let config = PipelineConfigBuilder::new().with_lanes(4).build();
    let other = PipelineConfigBuilder::new().with_lanes(8).build();
    let topology = plan(&other).unwrap();

    let err = Renderer::new().unwrap().render(&config, &topology).unwrap_err();
    assert!(matches!(err, Error::Consistency(_)));
}

#[test]
fn test_custom_template() {
    let renderer = Renderer::from_template_str(
        "{{ mapper.type_name }}x{{ mapper.replicate }}->{% for level in reducers %}[{{ level | length }}]{% endfor %}c{{ last_index }}",
    )
    .unwrap();
    let config = PipelineConfigBuilder::new().with_lanes(8).build();
    let topology = plan(&config).unwrap();

    assert_eq!(
        renderer.render(&config, &topology).unwrap(),
        "uint32x8->[4][2][1]c14"
    );
}

#[test]
fn test_invalid_template_is_template_error() {
    let err = Renderer::from_template_str("{% for x in %}").err().unwrap();
    assert!(matches!(err, Error::Template(_)));
}

#[tokio::test]
async fn test_template_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tiny.tera");
    std::fs::write(&path, "final=c{{ last_index }}").unwrap();

    let renderer = Renderer::from_template_file(&path).await.unwrap();
    let config = PipelineConfigBuilder::new().with_lanes(2).build();
    let topology = plan(&config).unwrap();
    assert_eq!(renderer.render(&config, &topology).unwrap(), "final=c2");
}

#[test]
fn test_arena_declares_lanes_then_nodes() {
    let config = PipelineConfigBuilder::new().with_lanes(4).build();
    let arena = ChannelArena::from_topology(&plan(&config).unwrap()).unwrap();

    assert_eq!(arena.indices(), &[0, 1, 2, 3, 4, 5, 6]);
    assert_eq!(arena.len(), 7);
    assert_eq!(arena.span(), 7);
    assert!(arena.unread().is_empty());
    assert!(!arena.is_declared(7));
}

#[test]
fn test_arena_reports_unread_outputs_of_partial_tree() {
    let config = PipelineConfigBuilder::new().with_lanes(8).with_depth(2).build();
    let arena = ChannelArena::from_topology(&plan(&config).unwrap()).unwrap();

    assert_eq!(arena.unread(), vec![13]);
}

#[test]
fn test_arena_rejects_read_before_declaration() {
    let config = PipelineConfigBuilder::new().with_lanes(4).build();
    let mut topology = plan(&config).unwrap();
    topology.reducers[0][0].input_b = 5;

    let err = ChannelArena::from_topology(&topology).unwrap_err();
    assert!(matches!(err, Error::Consistency(_)));
    assert!(err.to_string().contains("before it is declared"));
}

#[test]
fn test_arena_rejects_shared_reader() {
    let config = PipelineConfigBuilder::new().with_lanes(4).build();
    let mut topology = plan(&config).unwrap();
    topology.reducers[1][0] = ReduceNodeSpec {
        output_index: 6,
        input_a: 4,
        input_b: 4,
        last: true,
    };

    let err = ChannelArena::from_topology(&topology).unwrap_err();
    assert!(err.to_string().contains("channel 4 has 2 readers"));
}

#[test]
fn test_arena_rejects_undeclared_final_index() {
    let config = PipelineConfigBuilder::new().with_lanes(4).build();
    let mut topology = plan(&config).unwrap();
    topology.last_index = 8;

    let err = ChannelArena::from_topology(&topology).unwrap_err();
    assert!(err.to_string().contains("final index 8"));
}
