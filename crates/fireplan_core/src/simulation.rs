//! Monte Carlo trial loop and aggregation.
//!
//! Every entry point funnels into [`simulate_with_sampler`]'s implementation,
//! so inline callers and the background dispatcher run identical logic.

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::{Result, SimulationError};
use crate::market::{PortfolioReturns, ReturnSampler, RngSampler};
use crate::model::{
    LifeEvent, LifeEventKind, SimulationParams, SimulationProgress, SimulationResult,
};
use crate::percentiles::YearColumns;

/// Tuition assumed for a `college` event without an `annualCost` param
pub const DEFAULT_COLLEGE_COST: f64 = 55_000.0;

/// Money in and out of the portfolio for one simulated year
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearFlows {
    pub contribution: f64,
    pub expense: f64,
}

/// One trial's year-by-year balances (`years + 1` entries) and whether it failed
#[derive(Debug, Clone, PartialEq)]
pub struct TrialOutcome {
    pub path: Vec<f64>,
    pub failed: bool,
}

/// Apply the year's events in order. Later events see the flows left by
/// earlier ones; `quit`/`layoff` overwrite both flows and latch `retired`.
pub fn apply_life_events<'a, I>(
    events: I,
    retirement_spend: f64,
    flows: &mut YearFlows,
    retired: &mut bool,
) where
    I: IntoIterator<Item = &'a LifeEvent>,
{
    for event in events {
        match event.kind {
            LifeEventKind::Quit | LifeEventKind::Layoff => {
                *retired = true;
                flows.contribution = final_year_income(event);
                flows.expense = retirement_spend;
            }
            LifeEventKind::College => {
                let cost = event.param("annualCost").unwrap_or(DEFAULT_COLLEGE_COST);
                let plan_529 = event
                    .param("plan529")
                    .or_else(|| event.param("plan529Annual"))
                    .unwrap_or(0.0);
                flows.expense += cost - plan_529;
            }
            LifeEventKind::Windfall => {
                flows.contribution += event.param("amount").unwrap_or(0.0);
            }
            LifeEventKind::Expense => {
                flows.expense += event.param("amount").unwrap_or(0.0);
            }
            LifeEventKind::Purchase => {
                flows.expense += event.param("downPayment").unwrap_or(0.0);
            }
        }
    }
}

/// Income credited in the year employment ends. A quit reads
/// `partTimeIncome` first, a layoff reads `severance` first; each falls back
/// to the other key, then 0.
fn final_year_income(event: &LifeEvent) -> f64 {
    let (primary, fallback) = match event.kind {
        LifeEventKind::Layoff => ("severance", "partTimeIncome"),
        _ => ("partTimeIncome", "severance"),
    };
    event
        .param(primary)
        .or_else(|| event.param(fallback))
        .unwrap_or(0.0)
}

/// Run a single trial path.
///
/// A trial fails the first year its balance is `<= 0` (checked before the
/// balance is clamped for reporting). Remaining years are recorded as 0.
pub fn run_trial<S: ReturnSampler + ?Sized>(
    params: &SimulationParams,
    returns: &PortfolioReturns,
    sampler: &mut S,
) -> Result<TrialOutcome> {
    let len = params.years as usize + 1;
    let mut path = Vec::with_capacity(len);
    let mut portfolio = params.starting_portfolio;
    let mut spend = params.annual_spend;
    let mut retired = false;
    path.push(portfolio);

    for year in 1..=params.years {
        let annual_return = returns.annual_return(sampler.standard_normal());

        let mut flows = if retired {
            YearFlows {
                contribution: 0.0,
                expense: params.retirement_spend,
            }
        } else {
            YearFlows {
                contribution: params.annual_contribution,
                expense: spend,
            }
        };
        apply_life_events(
            params.events_in(params.calendar_year(year)),
            params.retirement_spend,
            &mut flows,
            &mut retired,
        );

        portfolio = portfolio * (1.0 + annual_return) + flows.contribution - flows.expense;
        // Retirement spend is not indexed; only the pre-retirement baseline grows.
        spend *= 1.0 + params.inflation_rate;

        if portfolio.is_nan() {
            return Err(SimulationError::ComputationFailure(format!(
                "balance became NaN in simulated year {year}"
            )));
        }

        path.push(portfolio.max(0.0));

        if portfolio <= 0.0 {
            path.resize(len, 0.0);
            return Ok(TrialOutcome { path, failed: true });
        }
    }

    Ok(TrialOutcome {
        path,
        failed: false,
    })
}

/// Seed a run will use: `params.seed`, or fresh entropy when unset
pub fn effective_seed(params: &SimulationParams) -> u64 {
    params.seed.unwrap_or_else(|| rand::rng().next_u64())
}

/// Run a Monte Carlo simulation using `params.seed`, or fresh entropy when unset.
pub fn simulate(params: &SimulationParams) -> Result<SimulationResult> {
    simulate_seeded(params, effective_seed(params))
}

/// Run a reproducible Monte Carlo simulation.
///
/// Each trial gets its own generator seeded from `seed`, so the result is
/// bit-identical across calls and independent of thread scheduling.
pub fn simulate_seeded(params: &SimulationParams, seed: u64) -> Result<SimulationResult> {
    let seeds = trial_seeds(seed, params.num_simulations as usize);
    run_monte_carlo(params, |i| RngSampler::seeded(seeds[i]), None)
}

/// Same as [`simulate_seeded`], reporting finished trials to `progress` and
/// stopping with [`SimulationError::Cancelled`] once it is cancelled.
pub fn simulate_with_progress(
    params: &SimulationParams,
    seed: u64,
    progress: &SimulationProgress,
) -> Result<SimulationResult> {
    let seeds = trial_seeds(seed, params.num_simulations as usize);
    run_monte_carlo(params, |i| RngSampler::seeded(seeds[i]), Some(progress))
}

/// Run a simulation with caller-supplied randomness.
///
/// `sampler_for_trial(i)` is called once per trial and the sampler is private
/// to that trial.
pub fn simulate_with_sampler<S, F>(
    params: &SimulationParams,
    sampler_for_trial: F,
) -> Result<SimulationResult>
where
    S: ReturnSampler,
    F: Fn(usize) -> S + Sync,
{
    run_monte_carlo(params, sampler_for_trial, None)
}

fn trial_seeds(seed: u64, trials: usize) -> Vec<u64> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..trials).map(|_| rng.next_u64()).collect()
}

fn run_monte_carlo<S, F>(
    params: &SimulationParams,
    sampler_for_trial: F,
    progress: Option<&SimulationProgress>,
) -> Result<SimulationResult>
where
    S: ReturnSampler,
    F: Fn(usize) -> S + Sync,
{
    params.validate()?;

    let years = params.years as usize;
    let trials = params.num_simulations as usize;
    let returns = PortfolioReturns::from_weights(params.equity_pct, params.bond_pct);

    tracing::debug!(
        trials,
        years,
        mean = returns.mean,
        std_dev = returns.std_dev,
        events = params.life_events.len(),
        "Running Monte Carlo simulation"
    );

    let run_one = |i: usize| -> Result<TrialOutcome> {
        if progress.is_some_and(SimulationProgress::is_cancelled) {
            return Err(SimulationError::Cancelled);
        }
        let mut sampler = sampler_for_trial(i);
        let outcome = run_trial(params, &returns, &mut sampler)?;
        if let Some(progress) = progress {
            progress.increment();
        }
        Ok(outcome)
    };

    #[cfg(feature = "parallel")]
    let outcomes: Vec<TrialOutcome> = (0..trials)
        .into_par_iter()
        .map(run_one)
        .collect::<Result<_>>()?;
    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<TrialOutcome> = (0..trials).map(run_one).collect::<Result<_>>()?;

    // All trials are in; aggregate per year.
    let mut columns = YearColumns::new(years, trials);
    let mut successes = 0usize;
    for outcome in &outcomes {
        columns.push_path(&outcome.path);
        if !outcome.failed {
            successes += 1;
        }
    }
    drop(outcomes);

    let percentiles = columns.into_bands();
    let median_final_value = percentiles.p50[years];
    let success_rate = successes as f64 / trials as f64;

    tracing::debug!(
        success_rate,
        median_final_value,
        "Monte Carlo simulation complete"
    );

    Ok(SimulationResult {
        percentiles,
        success_rate,
        median_final_value,
    })
}
