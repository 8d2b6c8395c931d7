//! Randomized mixed update/query workloads for timing the tree against the
//! naive fold.

use crate::combine::{CombineOp, Dynamic, Max, Min, Sum};
use crate::dispatch::Aggregate;
use crate::error::Error;
use crate::naive::{NaiveFold, RangeFold};
use crate::report::{BenchConfig, BenchReport, RuntimeStats, Workload};
use crate::segtree::SegTree;
use anyhow::{ensure, Result};
use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};

const INT_BOUND: i64 = 1_000_000;
const FLOAT_BOUND: f64 = 1e6;

/// Modulus for the affine workload. Small enough that products fit in `u64`.
const AFFINE_MODULUS: u64 = 1_000_000_007;

/// Floating point sums are associated differently by the tree and the naive
/// fold, so results only have to agree up to rounding.
const FLOAT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub enum Operation<T> {
    Update(usize, T),
    Query(usize, usize),
}

/// Generates `len` operations on a sequence of `len` elements.
///
/// `len * query_ratio` of them (rounded down) are queries over non-empty
/// ranges, the rest are updates at uniformly random indices. The two streams
/// are interleaved randomly.
pub fn generate_ops<T, R: Rng>(
    len: usize,
    query_ratio: f64,
    rng: &mut R,
    mut random_value: impl FnMut(&mut R) -> T,
) -> Vec<Operation<T>> {
    let num_queries = ((len as f64 * query_ratio) as usize).min(len);
    let num_updates = len - num_queries;

    let updates: Vec<_> = (0..num_updates)
        .map(|_| {
            let index = rng.gen_range(0..len);
            Operation::Update(index, random_value(rng))
        })
        .collect();
    let queries: Vec<_> = (0..num_queries)
        .map(|_| {
            let left = rng.gen_range(0..len);
            Operation::Query(left, rng.gen_range(left + 1..=len))
        })
        .collect();

    let mut updates = updates.into_iter().peekable();
    let mut queries = queries.into_iter().peekable();
    let mut ops = Vec::with_capacity(len);
    loop {
        let take_update = match (updates.peek(), queries.peek()) {
            (None, None) => break,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (Some(_), Some(_)) => rng.gen(),
        };
        let next = if take_update {
            updates.next()
        } else {
            queries.next()
        };
        ops.extend(next);
    }
    ops
}

/// Applies `ops` in order and collects the result of every query.
pub fn run_ops<F>(fold: &mut F, ops: &[Operation<F::Item>]) -> Result<Vec<F::Item>, Error>
where
    F: RangeFold,
    F::Item: Clone,
{
    let mut results = Vec::new();
    for op in ops {
        match op {
            Operation::Update(index, value) => fold.update(*index, value.clone())?,
            Operation::Query(left, right) => results.push(fold.query(*left, *right)?),
        }
    }
    Ok(results)
}

struct Timings {
    segtree: Duration,
    naive: Option<Duration>,
    mismatches: Option<usize>,
}

fn time_workload<O: CombineOp>(
    values: Vec<O::Item>,
    ops: &[Operation<O::Item>],
    make_op: impl Fn() -> O,
    identity: Option<O::Item>,
    check_naive: bool,
    agree: impl Fn(&O::Item, &O::Item) -> bool,
) -> Result<Timings> {
    let naive_values = if check_naive {
        Some(values.clone())
    } else {
        None
    };

    let time_before = Instant::now();
    let mut tree = SegTree::new(values, make_op(), identity.clone())?;
    let tree_results = run_ops(&mut tree, ops)?;
    let segtree = Instant::now() - time_before;
    info!("Segment tree finished in {:.2?}", segtree);

    let naive_values = match naive_values {
        Some(values) => values,
        None => {
            return Ok(Timings {
                segtree,
                naive: None,
                mismatches: None,
            })
        }
    };

    let time_before = Instant::now();
    let mut naive = NaiveFold::new(naive_values, make_op(), identity)?;
    let naive_results = run_ops(&mut naive, ops)?;
    let naive_time = Instant::now() - time_before;
    info!("Naive fold finished in {:.2?}", naive_time);

    let mismatches = tree_results
        .iter()
        .zip(&naive_results)
        .filter(|(tree_result, naive_result)| !agree(tree_result, naive_result))
        .count();
    if mismatches > 0 {
        warn!(
            "Segment tree disagreed with the naive fold on {} of {} queries",
            mismatches,
            tree_results.len()
        );
    }
    Ok(Timings {
        segtree,
        naive: Some(naive_time),
        mismatches: Some(mismatches),
    })
}

fn floats_agree(a: &f64, b: &f64) -> bool {
    (a - b).abs() <= FLOAT_TOLERANCE * (1.0 + a.abs().max(b.abs()))
}

fn compose_affine(f: &(u64, u64), g: &(u64, u64)) -> (u64, u64) {
    (
        f.0 * g.0 % AFFINE_MODULUS,
        (f.1 * g.0 + g.1) % AFFINE_MODULUS,
    )
}

fn random_affine(rng: &mut impl Rng) -> (u64, u64) {
    (
        rng.gen_range(1..AFFINE_MODULUS),
        rng.gen_range(0..AFFINE_MODULUS),
    )
}

macro_rules! time_numeric {
    ($ty:ty, $aggregate:expr, $values:expr, $ops:expr, $check:expr, $agree:expr) => {
        match $aggregate {
            Aggregate::Min => {
                time_workload($values, $ops, Min::<$ty>::default, None, $check, $agree)
            }
            Aggregate::Max => {
                time_workload($values, $ops, Max::<$ty>::default, None, $check, $agree)
            }
            Aggregate::Sum => {
                time_workload($values, $ops, Sum::<$ty>::default, None, $check, $agree)
            }
        }
    };
}

impl BenchConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.len > 0, "benchmark length must be positive");
        ensure!(
            (0.0..=1.0).contains(&self.query_ratio),
            "query ratio must be within [0, 1], got {}",
            self.query_ratio
        );
        Ok(())
    }
}

/// Runs the workload described by `config` and reports timings.
pub fn benchmark(config: &BenchConfig) -> Result<BenchReport> {
    config.validate()?;
    let mut rng = rand_pcg::Pcg64Mcg::seed_from_u64(config.seed);
    let len = config.len;
    let check = config.check_naive;

    info!(
        "Running {} workload over {} elements (aggregate {}, query ratio {})",
        config.workload, len, config.aggregate, config.query_ratio
    );

    let time_before = Instant::now();
    let (generate, timings, num_queries) = match config.workload {
        Workload::Int => {
            let random = |rng: &mut rand_pcg::Pcg64Mcg| rng.gen_range(-INT_BOUND..=INT_BOUND);
            let values: Vec<i64> = (0..len).map(|_| random(&mut rng)).collect();
            let ops = generate_ops(len, config.query_ratio, &mut rng, random);
            let generate = Instant::now() - time_before;
            debug!("Generated {} operations in {:.2?}", ops.len(), generate);
            let timings = time_numeric!(i64, config.aggregate, values, &ops, check, |a, b| a == b)?;
            (generate, timings, count_queries(&ops))
        }
        Workload::Float => {
            let random = |rng: &mut rand_pcg::Pcg64Mcg| rng.gen_range(-FLOAT_BOUND..FLOAT_BOUND);
            let values: Vec<f64> = (0..len).map(|_| random(&mut rng)).collect();
            let ops = generate_ops(len, config.query_ratio, &mut rng, random);
            let generate = Instant::now() - time_before;
            debug!("Generated {} operations in {:.2?}", ops.len(), generate);
            let timings = time_numeric!(f64, config.aggregate, values, &ops, check, floats_agree)?;
            (generate, timings, count_queries(&ops))
        }
        Workload::Affine => {
            let values: Vec<_> = (0..len).map(|_| random_affine(&mut rng)).collect();
            let ops = generate_ops(len, config.query_ratio, &mut rng, |rng| random_affine(rng));
            let generate = Instant::now() - time_before;
            debug!("Generated {} operations in {:.2?}", ops.len(), generate);
            let timings = time_workload(
                values,
                &ops,
                || Dynamic::new(compose_affine),
                Some((1, 0)),
                check,
                |a, b| a == b,
            )?;
            (generate, timings, count_queries(&ops))
        }
    };

    Ok(BenchReport {
        settings: config.clone(),
        num_updates: len - num_queries,
        num_queries,
        runtimes: RuntimeStats {
            generate,
            segtree: timings.segtree,
            naive: timings.naive,
        },
        mismatches: timings.mismatches,
    })
}

fn count_queries<T>(ops: &[Operation<T>]) -> usize {
    ops.iter()
        .filter(|op| matches!(op, Operation::Query(..)))
        .count()
}
