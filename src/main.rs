use anyhow::Result;
use segtree::bench;
use segtree::report::{BenchConfig, Workload};
use segtree::Aggregate;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(about = "Times segment tree updates and queries on random workloads")]
struct Opt {
    /// Element type and combine operation
    #[structopt(long, default_value = "int", possible_values = Workload::VARIANTS, case_insensitive = true)]
    workload: Workload,

    /// Aggregate for the numeric workloads
    #[structopt(long, default_value = "sum", possible_values = Aggregate::VARIANTS, case_insensitive = true)]
    aggregate: Aggregate,

    /// Number of elements and of operations
    #[structopt(long, default_value = "100000")]
    len: usize,

    /// Share of operations that are range queries
    #[structopt(long, default_value = "0.5")]
    query_ratio: f64,

    /// Seed for the random number generator
    #[structopt(long, default_value = "13201512356123065126")]
    seed: u64,

    /// Do not replay the operations against the naive fold
    #[structopt(long)]
    skip_naive: bool,

    /// Pretty-print the JSON report
    #[structopt(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::new().filter_or("SEGTREE_LOG", "info"));
    let opt = Opt::from_args();

    let config = BenchConfig {
        workload: opt.workload,
        aggregate: opt.aggregate,
        len: opt.len,
        query_ratio: opt.query_ratio,
        seed: opt.seed,
        check_naive: !opt.skip_naive,
    };
    let report = bench::benchmark(&config)?;

    let json = if opt.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", json);

    if let Some(mismatches) = report.mismatches {
        anyhow::ensure!(
            mismatches == 0,
            "segment tree disagreed with the naive fold on {} queries",
            mismatches
        );
    }
    Ok(())
}
