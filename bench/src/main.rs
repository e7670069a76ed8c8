use neta_core::{
    AdjacencyIndex, ConnectorPathFinder, EdgePair, RandomWalker, RecommendConfig, RecommendationEngine,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mode = args.get(1).map(|s| s.as_str()).unwrap_or("all");
    let node_count: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(1_000_000);

    if mode == "help" || mode == "--help" {
        println!("Usage: neta-bench [mode] [node_count]");
        println!();
        println!("Modes:");
        println!("  all         Run all generators and benchmark each (default)");
        println!("  scalefree   Preferential attachment (celebrity accounts)");
        println!("  smallworld  Watts-Strogatz ring lattice + shortcuts");
        println!("  random      Erdos-Renyi uniform random follows");
        println!("  communities Dense follow clusters joined by a few cross-follows");
        println!();
        println!("Default node_count: 1000000");
        return;
    }

    println!("neta-bench");
    println!("==========");
    println!();

    let generators: Vec<(&str, fn(u64) -> Vec<EdgePair>)> = match mode {
        "scalefree" => vec![("Scale-free (preferential attachment)", gen_scale_free)],
        "smallworld" => vec![("Small-world (Watts-Strogatz)", gen_small_world)],
        "random" => vec![("Erdos-Renyi random", gen_random)],
        "communities" => vec![("Communities (clusters + cross-follows)", gen_communities)],
        "all" => vec![
            ("Scale-free (preferential attachment)", gen_scale_free as fn(u64) -> Vec<EdgePair>),
            ("Small-world (Watts-Strogatz)", gen_small_world),
            ("Erdos-Renyi random", gen_random),
            ("Communities (clusters + cross-follows)", gen_communities),
        ],
        _ => {
            eprintln!("Unknown mode: {}. Use --help for options.", mode);
            return;
        }
    };

    for (name, generator) in generators {
        run_benchmark(name, generator, node_count);
    }
}

fn run_benchmark(name: &str, generator: fn(u64) -> Vec<EdgePair>, node_count: u64) {
    println!("--- {} ---", name);
    println!("Target: {} accounts", node_count);

    let t = Instant::now();
    let follows = generator(node_count);
    println!(
        "Generated {} follows in {:.2}s",
        follows.len(),
        t.elapsed().as_secs_f64()
    );

    let t = Instant::now();
    let index = AdjacencyIndex::build(&follows, true);
    println!(
        "Indexed in {:.2}s: {} sources, {} entries, ~{:.0}MB",
        t.elapsed().as_secs_f64(),
        index.node_count(),
        index.edge_count(),
        index.memory_usage() as f64 / 1_048_576.0
    );
    drop(follows);

    // Raw walk throughput from node 0
    let walker = RandomWalker::new(&index);
    let mut rng = StdRng::seed_from_u64(7);
    let walks = 1_000_000u64;
    let t = Instant::now();
    let mut steps = 0u64;
    for _ in 0..walks {
        if let Ok(walk) = walker.walk(0, 5, &mut rng) {
            steps += walk.steps as u64;
        }
    }
    let elapsed = t.elapsed().as_secs_f64();
    println!(
        "{} walks ({} steps) in {:.1}ms, {:.1}M steps/s",
        walks,
        steps,
        elapsed * 1000.0,
        steps as f64 / elapsed / 1e6
    );

    // Recommendations for a small seed community at increasing budgets
    let seeds: Vec<u64> = (0..10).collect();
    let engine = RecommendationEngine::new(&index);
    println!();
    println!("{:>10} {:>10} {:>10} {:>10}", "budget", "walks", "results", "time");
    println!("{:->10} {:->10} {:->10} {:->10}", "", "", "", "");

    for budget in [10_000u64, 100_000, 1_000_000, 10_000_000] {
        let config = RecommendConfig {
            max_walk_length: 5,
            step_budget: budget,
            seed: Some(42),
        };
        let t = Instant::now();
        let recs = match engine.recommend(&seeds, 100, &config) {
            Ok(recs) => recs,
            Err(e) => {
                eprintln!("recommend failed: {}", e);
                return;
            }
        };
        println!(
            "{:>10} {:>10} {:>10} {:>8.1}ms",
            budget,
            recs.stats.walks,
            recs.ranked.len(),
            t.elapsed().as_secs_f64() * 1000.0
        );
    }

    // Connector paths from the seed community to the last account
    let target = node_count.saturating_sub(1);
    let finder = ConnectorPathFinder::new(&index);
    println!();
    for max_len in [2, 3, 4] {
        let t = Instant::now();
        match finder.find_paths(&seeds, target, 5, max_len) {
            Ok(paths) => println!(
                "Connectors to {} (max {} edges): {} paths in {:.1}ms",
                target,
                max_len,
                paths.len(),
                t.elapsed().as_secs_f64() * 1000.0
            ),
            Err(e) => println!("Connectors to {}: {}", target, e),
        }
    }
    println!();
}

// ---------------------------------------------------------------------------
// Generators: (follower, followed) lists, deterministic per seed
// ---------------------------------------------------------------------------

/// Scale-free follows via endpoint sampling.
///
/// Each new account follows `follows_per_node` accounts picked from the
/// endpoint list, so accounts that are already followed a lot are picked
/// more often.
fn gen_scale_free(node_count: u64) -> Vec<EdgePair> {
    let follows_per_node = 10u64;
    let mut rng = StdRng::seed_from_u64(12345);
    let mut follows = Vec::with_capacity((node_count * follows_per_node) as usize);
    let mut endpoints: Vec<u64> = Vec::with_capacity((node_count * follows_per_node * 2) as usize);

    let seed = 5u64.min(node_count);
    for i in 0..seed {
        for j in 0..seed {
            if i != j {
                follows.push((i, j));
                endpoints.push(j);
            }
        }
    }

    for account in seed..node_count {
        let attach = follows_per_node.min(account);
        for _ in 0..attach {
            let followed = endpoints[rng.random_range(0..endpoints.len())];
            if followed != account {
                follows.push((account, followed));
                endpoints.push(followed);
                endpoints.push(account);
            }
        }
    }

    follows
}

/// Small-world (Watts-Strogatz): each account follows its K ring
/// neighbors, with each follow rewired to a random account with
/// probability p.
fn gen_small_world(node_count: u64) -> Vec<EdgePair> {
    let k = 10u64;
    let p = 0.05f64;
    let mut rng = StdRng::seed_from_u64(67890);
    let mut follows = Vec::with_capacity((node_count * k) as usize);

    for i in 0..node_count {
        for j in 1..=k {
            let neighbor = (i + j) % node_count;
            let followed = if rng.random_bool(p) {
                rng.random_range(0..node_count)
            } else {
                neighbor
            };
            if followed != i {
                follows.push((i, followed));
            }
        }
    }

    follows
}

/// Erdos-Renyi: ~10 uniformly random follows per account.
fn gen_random(node_count: u64) -> Vec<EdgePair> {
    let target = node_count * 10;
    let mut rng = StdRng::seed_from_u64(54321);
    let mut follows = Vec::with_capacity(target as usize);

    for _ in 0..target {
        let follower = rng.random_range(0..node_count);
        let followed = rng.random_range(0..node_count);
        if follower != followed {
            follows.push((follower, followed));
        }
    }

    follows
}

/// Clusters of 1000 accounts that mostly follow each other, plus a 1%
/// chance per follow of crossing into another cluster. Closest to what
/// community recommendations see in practice.
fn gen_communities(node_count: u64) -> Vec<EdgePair> {
    let cluster = 1000u64.min(node_count.max(1));
    let per_node = 15u64;
    let mut rng = StdRng::seed_from_u64(99999);
    let mut follows = Vec::with_capacity((node_count * per_node) as usize);

    for account in 0..node_count {
        let base = account - account % cluster;
        for _ in 0..per_node {
            let followed = if rng.random_bool(0.01) {
                rng.random_range(0..node_count)
            } else {
                (base + rng.random_range(0..cluster)).min(node_count - 1)
            };
            if followed != account {
                follows.push((account, followed));
            }
        }
    }

    follows
}
