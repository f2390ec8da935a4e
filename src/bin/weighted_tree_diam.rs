// Test generator for the weighted tree diameter problem.
//
// Prints n, then n node weights that sum to s, then the n-1 tree edges,
// all 1-based. Run with --interactive to have missing parameters requested
// on stdout; otherwise a missing parameter dumps the spec table and fails.

use std::io::{self, BufWriter, Write};

use autotest::{IntegerParam, PartitionGen, Scope, ScopeConfig, TreeGen};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let config = ScopeConfig::from_args(std::env::args().skip(1))?;
    let mut scope = Scope::new(config);

    let n = IntegerParam::new(&mut scope, "n", 1, 100_000)?;
    let s = IntegerParam::new(&mut scope, "s", 1, 1_000_000_000)?;
    let trees = TreeGen::new(&mut scope)?;
    let partitions = PartitionGen::new(&mut scope)?;

    let n = n.get(&mut scope)? as usize;
    let s = s.get(&mut scope)? as u64;

    let tree = trees.generate(&mut scope, n)?;
    let values = partitions.generate(&mut scope, n, s)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    writeln!(out, "{}", n)?;
    for value in &values {
        write!(out, "{} ", value)?;
    }
    writeln!(out)?;
    for (child, parent) in tree.edges() {
        writeln!(out, "{} {}", child + 1, parent + 1)?;
    }
    out.flush()?;
    Ok(())
}
