//! Grid search over strategy parameters.
//!
//! The search space is the cross product of three {min, max, step} ranges.
//! Every combination is scored by running the full multi-year pipeline
//! against a preloaded price cache; evaluations run in parallel on a
//! bounded pool and race for a single mutex-guarded best slot. The
//! comparator is a total order, so the winner never depends on which
//! worker finishes first.

use crate::domain::error::BandtraderError;
use crate::domain::execution;
use crate::domain::metrics::{self, BacktestResult};
use crate::domain::signal;
use crate::domain::strategy::StrategyParameters;
use crate::domain::universe::PriceCache;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::sync::Mutex;
use std::sync::atomic::{self, AtomicBool};

/// Inclusive integer range walked in `step` increments.
#[derive(Debug, Clone, PartialEq)]
pub struct IntParamRange {
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

impl IntParamRange {
    pub fn new(min: u32, max: u32, step: u32) -> Self {
        Self { min, max, step }
    }

    pub fn values(&self) -> Vec<u32> {
        (self.min..=self.max).step_by(self.step as usize).collect()
    }

    pub fn count(&self) -> usize {
        self.values().len()
    }
}

/// Inclusive float range walked in `step` increments. Accumulated values
/// are clamped to `max` so step rounding never escapes the range.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatParamRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl FloatParamRange {
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    pub fn values(&self) -> Vec<f64> {
        let mut result = Vec::new();
        let mut val = self.min;
        while val <= self.max + 1e-10 {
            result.push(val.min(self.max));
            val += self.step;
        }
        result
    }

    pub fn count(&self) -> usize {
        self.values().len()
    }
}

/// The grid the optimizer exhausts: holding-period days, band depth, and
/// lookback window.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpace {
    pub count: IntParamRange,
    pub pct: FloatParamRange,
    pub window: IntParamRange,
}

impl Default for ParameterSpace {
    fn default() -> Self {
        ParameterSpace {
            count: IntParamRange::new(10, 60, 10),
            pct: FloatParamRange::new(0.10, 0.50, 0.10),
            window: IntParamRange::new(10, 40, 10),
        }
    }
}

impl ParameterSpace {
    pub fn validate(&self) -> Result<(), BandtraderError> {
        validate_int_range("count", &self.count)?;
        validate_float_range("pct", &self.pct)?;
        validate_int_range("window", &self.window)?;

        if self.pct.min < 0.0 || self.pct.max > 1.0 {
            return Err(BandtraderError::InvalidParameter {
                name: "pct".to_string(),
                reason: "range must stay between 0 and 1".to_string(),
            });
        }
        if self.window.min == 0 {
            return Err(BandtraderError::InvalidParameter {
                name: "window".to_string(),
                reason: "minimum must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Total number of grid points.
    pub fn len(&self) -> usize {
        self.count.count() * self.pct.count() * self.window.count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every parameter set in the grid, in a fixed order.
    pub fn combinations(&self) -> Vec<StrategyParameters> {
        let mut combos = Vec::with_capacity(self.len());
        for count in self.count.values() {
            for pct in self.pct.values() {
                for window in self.window.values() {
                    combos.push(StrategyParameters::new(count, pct, window as usize));
                }
            }
        }
        combos
    }
}

fn validate_int_range(name: &str, range: &IntParamRange) -> Result<(), BandtraderError> {
    if range.min > range.max {
        return Err(BandtraderError::InvalidParameter {
            name: name.to_string(),
            reason: format!("range min {} exceeds max {}", range.min, range.max),
        });
    }
    if range.step == 0 {
        return Err(BandtraderError::InvalidParameter {
            name: name.to_string(),
            reason: "step must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_float_range(name: &str, range: &FloatParamRange) -> Result<(), BandtraderError> {
    if !range.min.is_finite() || !range.max.is_finite() || !range.step.is_finite() {
        return Err(BandtraderError::InvalidParameter {
            name: name.to_string(),
            reason: "range bounds must be finite".to_string(),
        });
    }
    if range.min > range.max {
        return Err(BandtraderError::InvalidParameter {
            name: name.to_string(),
            reason: format!("range min {} exceeds max {}", range.min, range.max),
        });
    }
    if range.step <= 0.0 {
        return Err(BandtraderError::InvalidParameter {
            name: name.to_string(),
            reason: "step must be positive".to_string(),
        });
    }
    Ok(())
}

/// Winner of a grid search.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    pub best_parameters: StrategyParameters,
    pub best_result: BacktestResult,
    pub search_space_size: usize,
    /// (ticker, year) pairs simulated across all parameter sets.
    pub trials_succeeded: usize,
    /// Pairs skipped for missing or too-short data across all sets.
    pub trials_skipped: usize,
}

#[derive(Debug, Clone)]
struct Candidate {
    params: StrategyParameters,
    result: BacktestResult,
}

impl Candidate {
    /// Higher compounded return wins; ties fall to the lower window, then
    /// the lower count, then the lower pct, which makes the order total.
    fn beats(&self, other: &Candidate) -> bool {
        match self
            .result
            .compounded_return
            .partial_cmp(&other.result.compounded_return)
        {
            Some(Ordering::Greater) => true,
            Some(Ordering::Less) => false,
            _ => {
                let by_shape = (self.params.window, self.params.count)
                    .cmp(&(other.params.window, other.params.count));
                by_shape.then(
                    self.params
                        .pct
                        .partial_cmp(&other.params.pct)
                        .unwrap_or(Ordering::Equal),
                ) == Ordering::Less
            }
        }
    }
}

struct Evaluation {
    result: BacktestResult,
    pairs_used: usize,
    pairs_skipped: usize,
}

/// Score one parameter set across the whole horizon without logging.
///
/// The space is validated before the search starts, so the only simulate
/// failure left here is a series shorter than the window; it is skipped
/// and counted, like a pair missing from the cache.
fn evaluate(
    cache: &PriceCache,
    tickers: &[String],
    years: &[i32],
    params: &StrategyParameters,
    initial_capital: f64,
) -> Evaluation {
    let mut pairs_used = 0usize;
    let mut pairs_skipped = 0usize;
    let mut all_executed = Vec::new();

    for &year in years {
        let mut candidates = Vec::new();
        for ticker in tickers {
            let Ok(series) = cache.get(ticker, year) else {
                pairs_skipped += 1;
                continue;
            };
            match signal::simulate(series, params) {
                Ok(trades) => {
                    pairs_used += 1;
                    candidates.extend(trades);
                }
                Err(_) => pairs_skipped += 1,
            }
        }
        let outcome = execution::execute_year(candidates, initial_capital);
        all_executed.extend(outcome.executed);
    }

    let final_year = years.last().copied().unwrap_or_default();
    Evaluation {
        result: metrics::aggregate(final_year, &all_executed),
        pairs_used,
        pairs_skipped,
    }
}

/// Exhaust the grid and return the best parameter set.
///
/// `workers` bounds the pool (0 uses the rayon default). `cancel` is
/// checked before each evaluation; in-flight evaluations finish. If the
/// flag was raised before anything completed, the search fails with
/// `Interrupted`; otherwise the best seen so far is returned.
pub fn optimize(
    cache: &PriceCache,
    tickers: &[String],
    years: &[i32],
    space: &ParameterSpace,
    workers: usize,
    cancel: &AtomicBool,
    initial_capital: f64,
) -> Result<OptimizationResult, BandtraderError> {
    space.validate()?;

    let combos = space.combinations();
    let search_space_size = combos.len();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| BandtraderError::Io(std::io::Error::other(e)))?;

    let best: Mutex<Option<Candidate>> = Mutex::new(None);

    let (trials_succeeded, trials_skipped) = pool.install(|| {
        combos
            .into_par_iter()
            .map(|params| {
                if cancel.load(atomic::Ordering::Relaxed) {
                    return (0usize, 0usize);
                }

                let eval = evaluate(cache, tickers, years, &params, initial_capital);
                let candidate = Candidate {
                    params,
                    result: eval.result,
                };

                let mut slot = best.lock().unwrap_or_else(|e| e.into_inner());
                let install = match slot.as_ref() {
                    None => true,
                    Some(incumbent) => candidate.beats(incumbent),
                };
                if install {
                    *slot = Some(candidate);
                }

                (eval.pairs_used, eval.pairs_skipped)
            })
            .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1))
    });

    let winner = best.into_inner().unwrap_or_else(|e| e.into_inner());
    match winner {
        Some(candidate) => Ok(OptimizationResult {
            best_parameters: candidate.params,
            best_result: candidate.result,
            search_space_size,
            trials_succeeded,
            trials_skipped,
        }),
        None => Err(BandtraderError::Interrupted),
    }
}
