//! Query surfaces. Each renders its result as text for stdout.

use anyhow::{Context, Result};
use neta_core::{
    community_alignment, degree_centrality, top_n, unique_seeds, AlignmentMode, ConnectorPathFinder, NodeId,
    RandomWalker, RecommendConfig, RecommendationEngine,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::load::LoadedGraph;
use crate::users::UserDirectory;

pub const DEFAULT_RECOMMENDATIONS: usize = 25;
pub const DEFAULT_CONNECTORS: usize = 5;

pub fn stats(graph: &LoadedGraph) -> String {
    let index = &graph.index;
    format!(
        "source:      {}\n\
         accounts:    {}\n\
         sources:     {}\n\
         entries:     {}\n\
         directed:    {}\n\
         memory:      {:.1}MB\n\
         load time:   {:.1}ms\n\
         from cache:  {}\n",
        graph.source.display(),
        index.endpoint_count(),
        index.node_count(),
        index.edge_count(),
        index.is_directed(),
        index.memory_usage() as f64 / 1_048_576.0,
        graph.load_time_ms,
        graph.from_cache
    )
}

pub fn degree(graph: &LoadedGraph, users: &UserDirectory, top: usize) -> String {
    degree_centrality(&graph.index, top)
        .into_iter()
        .map(|d| users.describe(d.node_id, d.out_degree) + "\n")
        .collect()
}

pub fn walk(
    graph: &LoadedGraph,
    users: &UserDirectory,
    source: NodeId,
    max_length: usize,
    count: usize,
    seed: Option<u64>,
) -> Result<String> {
    let walker = RandomWalker::new(&graph.index);
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    (0..count)
        .map(|_| -> Result<String> {
            let walk = walker.walk(source, max_length, &mut rng)?;
            Ok(format!(
                "{} -> {} ({} steps)\n",
                users.display(source),
                users.display(walk.destination),
                walk.steps
            ))
        })
        .collect()
}

pub fn recommend(
    graph: &LoadedGraph,
    users: &UserDirectory,
    seeds: &[NodeId],
    n: usize,
    config: &RecommendConfig,
) -> Result<String> {
    let seeds = unique_seeds(seeds);
    let engine = RecommendationEngine::new(&graph.index);
    let recs = engine
        .recommend(&seeds, n, config)
        .context("recommendation query failed")?;

    info!(
        seeds = seeds.len(),
        walks = recs.stats.walks,
        discarded = recs.stats.discarded,
        steps = recs.stats.steps,
        "recommendations computed"
    );

    Ok(recs
        .ranked
        .iter()
        .map(|s| users.describe(s.node_id, s.score) + "\n")
        .collect())
}

pub fn connectors(
    graph: &LoadedGraph,
    users: &UserDirectory,
    sources: &[NodeId],
    target: NodeId,
    n: usize,
    max_path_length: usize,
) -> Result<String> {
    let finder = ConnectorPathFinder::new(&graph.index);
    let paths = finder
        .find_paths(sources, target, n, max_path_length)
        .context("connector path query failed")?;

    info!(paths = paths.len(), "connector paths found");

    Ok(paths
        .iter()
        .map(|path| {
            let names: Vec<String> = path.iter().map(|&id| users.display(id)).collect();
            names.join(" -> ") + "\n"
        })
        .collect())
}

pub fn align(
    graph: &LoadedGraph,
    users: &UserDirectory,
    community: &[NodeId],
    mode: AlignmentMode,
    n: usize,
) -> String {
    let scores = community_alignment(&graph.index, community, mode);
    top_n(scores, Some(n))
        .into_iter()
        .map(|(id, score)| users.describe(id, format!("{:.4}", score)) + "\n")
        .collect()
}
