use crate::dispatch::Aggregate;
use serde::{Serialize, Serializer};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

fn serialize_duration_as_seconds<S>(duration: &Duration, ser: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    ser.serialize_f64(duration.as_secs_f64())
}

fn serialize_opt_duration_as_seconds<S>(
    duration: &Option<Duration>,
    ser: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match duration {
        Some(duration) => ser.serialize_some(&duration.as_secs_f64()),
        None => ser.serialize_none(),
    }
}

/// Element type and combine operation a benchmark runs on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Workload {
    /// `i64` values in `-10^6..=10^6` under a named aggregate.
    Int,
    /// `f64` values in `-10^6..10^6` under a named aggregate.
    Float,
    /// Affine maps modulo a prime under composition, through a boxed closure.
    Affine,
}

impl Workload {
    pub const VARIANTS: &'static [&'static str] = &["int", "float", "affine"];
}

impl Display for Workload {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Affine => "affine",
        };
        f.write_str(name)
    }
}

impl FromStr for Workload {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "int" => Ok(Self::Int),
            "float" => Ok(Self::Float),
            "affine" => Ok(Self::Affine),
            _ => Err(format!("unknown workload '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchConfig {
    /// Element type and operation
    pub workload: Workload,

    /// Aggregate for the numeric workloads, ignored for `affine`
    pub aggregate: Aggregate,

    /// Number of elements, and also the total number of operations
    pub len: usize,

    /// Share of operations that are range queries
    pub query_ratio: f64,

    /// Seed for the random number generator
    pub seed: u64,

    /// Replay the operations against the naive fold and compare results
    pub check_naive: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RuntimeStats {
    #[serde(serialize_with = "serialize_duration_as_seconds")]
    pub generate: Duration,

    #[serde(serialize_with = "serialize_duration_as_seconds")]
    pub segtree: Duration,

    #[serde(serialize_with = "serialize_opt_duration_as_seconds")]
    pub naive: Option<Duration>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub settings: BenchConfig,
    pub num_updates: usize,
    pub num_queries: usize,
    pub runtimes: RuntimeStats,

    /// Queries where the tree disagreed with the naive fold, if it was run
    pub mismatches: Option<usize>,
}
