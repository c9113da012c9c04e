//! Renders the bundled demo configs through the library API

mod common;

use common::demo_config;
use mapreduce_framework::config::load_config;
use mapreduce_framework::generate::render_source;
use mapreduce_framework::render::ChannelArena;

#[tokio::test]
async fn test_max_demo_declares_every_channel_once() {
    let config = load_config(&demo_config("max")).await.unwrap();
    let (topology, source) = render_source(&config, None, false).await.unwrap();

    let arena = ChannelArena::from_topology(&topology).unwrap();
    assert!(arena.unread().is_empty());
    for index in arena.indices() {
        let declaration = format!("c{index} := make(chan uint32, 1)");
        assert_eq!(
            source.matches(&declaration).count(),
            1,
            "channel c{index} should be declared exactly once"
        );
    }
    assert!(source.contains(&format!("val <- <-c{}", topology.last_index)));
}

#[tokio::test]
async fn test_monte_carlo_demo_fans_context_out_by_group() {
    let config = load_config(&demo_config("monte-carlo")).await.unwrap();
    let (topology, source) = render_source(&config, None, false).await.unwrap();

    assert!(topology.use_intermediate);
    assert_eq!(topology.contexts.len(), 2);
    assert!(source.contains("contextData uintptr,"));
    assert!(source.contains("go arbitrate.ReadArbitrateX2("));
    assert!(source.contains("context31 := make(chan fixed.Int26_6, 1)"));
    for lane in &topology.mappers {
        let read = format!(
            "go Rands(<-intermediateContext{}, context{})",
            lane.context_index, lane.index
        );
        assert!(source.contains(&read), "missing `{read}`");
    }
    assert!(source.contains("c62 <- Payoff(<-c60, <-c61)"));
    assert!(source.contains("length*(160/32)"));
    assert!(source.contains("outputData, 64/32, outputDataChan)"));
}

#[tokio::test]
async fn test_rendered_source_is_tidy() {
    let config = load_config(&demo_config("monte-carlo")).await.unwrap();
    let (_, source) = render_source(&config, None, false).await.unwrap();

    assert!(source.ends_with("}\n"));
    assert!(!source.contains("\n\n\n"));
    assert!(source.lines().all(|line| line == line.trim_end()));
    assert!(source.lines().all(|line| !line.starts_with(' ')));
    assert_eq!(
        mapreduce_framework::format::tidy_source(&source),
        source
    );
}
