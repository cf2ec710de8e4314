//! Builds a random tree and walks through every tree operation, printing the results
//!
//! Usage:
//!   cargo run --features demo --bin bstree-demo -- [--count N] [--max-key N] [--seed N]

use std::io;
use std::ops::Range;
use std::convert::TryFrom;

use bstree::{BSTree, Traversal};
use clap::Parser;
use rand::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "bstree-demo")]
#[command(about = "Demonstrates the operations of a binary search tree with parent links")]
struct Cli {
    /// Number of random keys to insert
    #[arg(long, default_value_t = 100)]
    count: usize,

    /// Keys are drawn from `0..max_key`
    #[arg(long, default_value_t = 100)]
    max_key: i32,

    /// Seed for the random keys, a fresh seed is used when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// First value used to naturally fill the tree
    #[arg(long, default_value_t = 200)]
    fill_start: i32,
}

fn main() -> io::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let max_key = cli.max_key.max(1);
    let mut tree = BSTree::with_capacity(cli.count);
    for _ in 0..cli.count {
        tree.insert(rng.gen_range(0..max_key));
    }
    tracing::info!(count = tree.len(), height = tree.height(), "built tree");

    for &traversal in &Traversal::ALL {
        println!("{} traversal of the tree:", traversal);
        tree.print_stdout(traversal)?;
    }

    println!("50 is present: {}", tree.search(&50));
    println!("51 is present: {}", tree.search(&51));

    match (tree.min(), tree.max()) {
        (Some(min), Some(max)) => println!("Minimum: {}\tMaximum: {}", min, max),
        _ => println!("The tree is empty"),
    }

    match tree.depth(&50) {
        Some(depth) => println!("Height: {}\tDepth of 50: {}", tree.height(), depth),
        None => println!("Height: {}\t50 is not in the tree", tree.height()),
    }

    let fill = fill_range(cli.fill_start, tree.len());
    if fill.is_empty() {
        println!("Natural fill with no numbers:");
    } else {
        println!("Natural fill with the numbers from {} to {}:", fill.start, fill.end - 1);
    }
    let filled = tree.natural_fill(fill);
    tracing::debug!(filled, "natural fill done");
    tree.print_stdout(Traversal::Inorder)?;

    Ok(())
}

/// One value per node starting at `start`, cut short at the end of the `i32` range
fn fill_range(start: i32, nodes: usize) -> Range<i32> {
    let len = i32::try_from(nodes).unwrap_or(i32::MAX);
    start..start.saturating_add(len)
}
