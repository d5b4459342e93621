//! Integration tests for the graph builder, data collector and bridge

#[path = "testutils/mod.rs"]
mod testutils;

use std::collections::HashSet;

use pipelens::pipeline::{AsSingleton, CombineGlobally, Create, Flatten, Map, Pipeline};
use pipelens::viz::{render_pipeline_with, DataCollector, GraphBuilder, GraphNode};
use pipelens::{Item, VisualizationConfig};
use testutils::{ints, CountWords, Double, Nested};

fn collect_ids<'a>(nodes: &'a [GraphNode], ids: &mut Vec<&'a str>) {
    for node in nodes {
        ids.push(&node.id);
        collect_ids(&node.nodes, ids);
    }
}

/// Word count followed by a step that cannot double the `[word, count]` pairs
fn word_count_with_failing_tail() -> Pipeline {
    let mut pipeline = Pipeline::direct();
    let lines = pipeline
        .apply_root(&Create::new("Lines", vec![Item::from("a b"), Item::from("b c b")]))
        .unwrap();
    let counts = pipeline.apply(&lines, &CountWords).unwrap();
    pipeline.apply(&counts, &Double::new("Unused")).unwrap();
    pipeline
}

#[test]
fn test_one_graph_node_per_non_root_transform() {
    let pipeline = word_count_with_failing_tail();
    assert!(pipeline
        .nodes()
        .iter()
        .any(|node| node.full_label() == "Unused/Multiply"));

    let graph = GraphBuilder::new(&pipeline).build().unwrap();
    let mut ids = Vec::new();
    collect_ids(&graph, &mut ids);

    assert_eq!(ids.len(), pipeline.nodes().len() - 1);
    let unique: HashSet<&str> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len());
}

#[test]
fn test_nested_composite_scenario() {
    let mut pipeline = Pipeline::direct();
    let input = pipeline.apply_root(&Create::new("Input", ints(&[1]))).unwrap();
    pipeline.apply(&input, &Nested).unwrap();

    let graph = GraphBuilder::new(&pipeline).build().unwrap();
    let a = graph.iter().find(|node| node.id == "A").unwrap();

    assert_eq!(a.name, "A");
    let children: Vec<(&str, &str)> = a.nodes.iter().map(|n| (n.id.as_str(), n.name.as_str())).collect();
    assert_eq!(children, vec![("A/x", "x"), ("A/y", "y")]);
    assert!(a.find("A/x").unwrap().edges.contains(&"A/y".to_string()));
}

#[test]
fn test_every_consumed_input_has_an_edge() {
    let mut pipeline = Pipeline::direct();
    let left = pipeline.apply_root(&Create::new("Left", ints(&[1]))).unwrap();
    let right = pipeline.apply_root(&Create::new("Right", ints(&[2]))).unwrap();
    let merged = pipeline.apply_many(&[left, right], &Flatten::new("Merge")).unwrap();
    pipeline.apply(&merged, &Double::new("Double")).unwrap();

    let graph = GraphBuilder::new(&pipeline).build().unwrap();
    let edges_of = |id: &str| -> Vec<String> {
        graph
            .iter()
            .find_map(|node| node.find(id))
            .map(|node| node.edges.clone())
            .unwrap_or_default()
    };

    fn edge_count(nodes: &[GraphNode]) -> usize {
        nodes.iter().map(|n| n.edges.len() + edge_count(&n.nodes)).sum()
    }
    let consumed: usize = pipeline.nodes().iter().map(|n| n.inputs().len()).sum();
    assert_eq!(edge_count(&graph), consumed);

    for node in pipeline.nodes().iter().skip(1) {
        for input in node.inputs() {
            let producer = pipeline.node(input.producer()).unwrap();
            assert!(
                edges_of(producer.full_label()).contains(&node.full_label().to_string()),
                "missing edge {} -> {}",
                producer.full_label(),
                node.full_label()
            );
        }
    }
}

#[test]
fn test_large_collection_is_truncated() {
    let mut pipeline = Pipeline::direct();
    let numbers: Vec<i64> = (0..100).collect();
    pipeline.apply_root(&Create::new("Numbers", ints(&numbers))).unwrap();
    pipeline.run().unwrap();

    let samples = DataCollector::new(&pipeline).collect().unwrap();
    let record = &samples["Numbers"];

    assert_eq!(record.count, 100);
    assert_eq!(record.data, ints(&numbers[..25]));
}

#[test]
fn test_samples_follow_composite_leaves() {
    let mut pipeline = word_count_with_failing_tail();
    let err = pipeline.run().unwrap_err();
    assert!(err.to_string().contains("cannot double"));

    // The failing run leaves nothing materialized
    assert!(DataCollector::new(&pipeline).collect().unwrap().is_empty());

    let mut pipeline = Pipeline::direct();
    let lines = pipeline.apply_root(&Create::new("Lines", vec![Item::from("b a b")])).unwrap();
    pipeline.apply(&lines, &CountWords).unwrap();
    pipeline.run().unwrap();

    let samples = DataCollector::new(&pipeline).collect().unwrap();
    let keys: Vec<&str> = samples.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["CountWords/Group", "CountWords/Split", "CountWords/Sum", "Lines"]
    );
    assert_eq!(
        samples["CountWords/Sum"].data,
        vec![Item::pair("b", 2), Item::pair("a", 1)]
    );
}

#[test]
fn test_scalar_views_are_not_sampled() {
    let mut pipeline = Pipeline::direct();
    let numbers = pipeline.apply_root(&Create::new("Numbers", ints(&[1, 2, 3]))).unwrap();
    let total = pipeline
        .apply(
            &numbers,
            &CombineGlobally::new("Total", |items| {
                Ok(Item::Int(items.iter().filter_map(Item::as_i64).sum()))
            }),
        )
        .unwrap();
    pipeline.apply(&total, &AsSingleton::new("View")).unwrap();
    pipeline.run().unwrap();

    let samples = DataCollector::new(&pipeline).collect().unwrap();
    assert!(samples.contains_key("Total"));
    assert!(!samples.contains_key("View"));
    assert_eq!(samples["Total"].data, ints(&[6]));
}

#[test]
fn test_rendered_fragment_for_unrun_pipeline() {
    let mut pipeline = Pipeline::direct();
    let numbers = pipeline.apply_root(&Create::new("Numbers", ints(&[1]))).unwrap();
    pipeline
        .apply(&numbers, &Map::new("Same", |item| Ok(item.clone())))
        .unwrap();

    let html = render_pipeline_with(&pipeline, &VisualizationConfig::default()).unwrap();
    assert!(html.contains(r#""edges":["Same"]"#));
    assert!(html.ends_with("</script>"));
    assert!(html.contains("dataflow.renderPipeline(dom, "));
    assert!(html.contains(", {})"));
}
