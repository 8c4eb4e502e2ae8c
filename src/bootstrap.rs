use crate::binning::{discretize, BinTemplate, BinningMode};
use crate::error::PaucError;
use crate::param::{validate_auc, Auc};
use crate::utils::{sort_by_x, trapezoidal_area};
use log::{debug, info};
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

//-----------------------------------------------------------------------------
// Bootstrap replicate
//-----------------------------------------------------------------------------

/// Column names of the bootstrap table, in row order
pub const REPLICATE_COLUMNS: [&str; 4] = ["auc_complete", "auc_pmodel", "auc_prand", "ratio"];

/// Metrics of one bootstrap iteration
///
/// `None` marks a metric that could not be computed for this draw and is left out of the
/// summary; `Some(0.0)` marks a degenerate but valid draw.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct BootstrapReplicate {
    /// AUC over every bin (`None` unless requested)
    pub complete_auc: Option<f64>,
    /// Model AUC over the bins with sensitivity above `1 - threshold/100`
    pub partial_auc: Option<f64>,
    /// AUC of the random-model diagonal over the same bins
    pub random_partial_auc: Option<f64>,
    /// `partial_auc / random_partial_auc`
    pub ratio: Option<f64>,
}

impl BootstrapReplicate {
    /// Draw excluded from the summary: fewer than two bins reached the sensitivity threshold
    pub fn missing() -> BootstrapReplicate {
        BootstrapReplicate::default()
    }

    /// Draw where one of the partial AUCs is zero
    pub fn zero(compute_full_auc: bool) -> BootstrapReplicate {
        BootstrapReplicate {
            complete_auc: if compute_full_auc { Some(0.0) } else { None },
            partial_auc: Some(0.0),
            random_partial_auc: Some(0.0),
            ratio: Some(0.0),
        }
    }

    pub fn has_finite_ratio(&self) -> bool {
        matches!(self.ratio, Some(r) if r.is_finite())
    }

    /// Row of plain floats where `NaN` stands for a missing metric
    pub fn to_row(&self) -> [f64; 4] {
        [
            self.complete_auc.unwrap_or(f64::NAN),
            self.partial_auc.unwrap_or(f64::NAN),
            self.random_partial_auc.unwrap_or(f64::NAN),
            self.ratio.unwrap_or(f64::NAN),
        ]
    }

    /// Reads a row of plain floats; any non-finite value becomes a missing metric
    pub fn from_row(row: &[f64; 4]) -> BootstrapReplicate {
        let finite = |v: f64| if v.is_finite() { Some(v) } else { None };
        BootstrapReplicate {
            complete_auc: finite(row[0]),
            partial_auc: finite(row[1]),
            random_partial_auc: finite(row[2]),
            ratio: finite(row[3]),
        }
    }
}

//-----------------------------------------------------------------------------
// Single iteration
//-----------------------------------------------------------------------------

/// Read-only inputs shared by every bootstrap iteration
#[derive(Debug, Clone, Copy)]
pub struct BootstrapContext<'a> {
    template: &'a BinTemplate,
    fractional_area: &'a [f64],
    test_bins: &'a [usize],
    n_samp: usize,
    error_sens: f64,
    compute_full_auc: bool,
}

impl<'a> BootstrapContext<'a> {
    /// Bundles the iteration inputs; the sample size is the number of template rows
    ///
    /// # Errors
    ///
    /// [`PaucError::InvalidInput`] unless `0 < n_samp <= test_bins.len()`, the fractional area has
    /// one value per template column and `error_sens` is finite.
    pub fn new(
        template: &'a BinTemplate,
        fractional_area: &'a [f64],
        test_bins: &'a [usize],
        error_sens: f64,
        compute_full_auc: bool,
    ) -> Result<BootstrapContext<'a>, PaucError> {
        let n_samp = template.n_rows();
        if n_samp == 0 || n_samp > test_bins.len() {
            return Err(PaucError::invalid(format!(
                "Invalid sample size {} for {} test predictions",
                n_samp,
                test_bins.len()
            )));
        }
        if fractional_area.len() != template.n_cols() {
            return Err(PaucError::invalid(format!(
                "Fractional area has {} values for {} bins",
                fractional_area.len(),
                template.n_cols()
            )));
        }
        if !error_sens.is_finite() {
            return Err(PaucError::invalid("Sensitivity threshold must be finite"));
        }

        Ok(BootstrapContext {
            template,
            fractional_area,
            test_bins,
            n_samp,
            error_sens,
            compute_full_auc,
        })
    }

    pub fn n_samp(&self) -> usize {
        self.n_samp
    }

    pub fn error_sens(&self) -> f64 {
        self.error_sens
    }
}

/// Sensitivity per bin: one minus the share of sampled values below the column threshold
pub fn sensitivity_curve(template: &BinTemplate, sampled: &[usize]) -> Vec<f64> {
    let n_rows = template.n_rows() as f64;

    (0..template.n_cols())
        .into_par_iter()
        .map(|j| {
            let omitted = template
                .column(j)
                .iter()
                .zip(sampled)
                .filter(|(threshold, value)| threshold > value)
                .count();
            1.0 - omitted as f64 / n_rows
        })
        .collect()
}

/// Turns one sensitivity curve into the replicate metrics
///
/// # Arguments
///
/// * `fractional_area` - x axis, one value per bin
/// * `sensitivity` - y axis, one value per bin
/// * `error_sens` - only bins with a sensitivity strictly above this value enter the partial AUC
/// * `compute_full_auc` - whether to integrate the whole curve as well
pub fn replicate_from_curve(
    fractional_area: &[f64],
    sensitivity: &[f64],
    error_sens: f64,
    compute_full_auc: bool,
) -> BootstrapReplicate {
    let mut partial: Vec<(f64, f64)> = fractional_area
        .iter()
        .zip(sensitivity)
        .filter(|(_, s)| **s > error_sens)
        .map(|(&x, &s)| (x, s))
        .collect();

    if partial.len() < 2 {
        return BootstrapReplicate::missing();
    }

    let (x, y) = sort_by_x(&mut partial);
    let auc_pmodel = trapezoidal_area(&x, &y);
    let auc_prand = trapezoidal_area(&x, &x);

    if auc_pmodel == 0.0 || auc_prand == 0.0 {
        return BootstrapReplicate::zero(compute_full_auc);
    }

    let ratio = if auc_prand.abs() > f64::EPSILON {
        Some(auc_pmodel / auc_prand)
    } else {
        None
    };

    let complete_auc = if compute_full_auc {
        let mut full: Vec<(f64, f64)> = fractional_area
            .iter()
            .copied()
            .zip(sensitivity.iter().copied())
            .collect();
        let (x, y) = sort_by_x(&mut full);
        Some(trapezoidal_area(&x, &y))
    } else {
        None
    };

    BootstrapReplicate {
        complete_auc,
        partial_auc: Some(auc_pmodel),
        random_partial_auc: Some(auc_prand),
        ratio,
    }
}

/// Computes one bootstrap replicate: draws `n_samp` test bins without replacement,
/// derives the sensitivity curve and integrates it
pub fn compute_replicate<R: Rng + ?Sized>(
    ctx: &BootstrapContext,
    rng: &mut R,
) -> BootstrapReplicate {
    let rows_id = sample(rng, ctx.test_bins.len(), ctx.n_samp);
    let sampled: Vec<usize> = rows_id.iter().map(|i| ctx.test_bins[i]).collect();

    let sensitivity = sensitivity_curve(ctx.template, &sampled);

    replicate_from_curve(
        ctx.fractional_area,
        &sensitivity,
        ctx.error_sens,
        ctx.compute_full_auc,
    )
}

//-----------------------------------------------------------------------------
// Parallel driver
//-----------------------------------------------------------------------------

/// Runs `iterations` independent replicates on the current rayon pool
///
/// One seed per iteration is drawn from `rng` before the parallel section, so the table only
/// depends on the state of `rng`, never on scheduling. Rows are returned in iteration order.
pub fn iterate_replicates(
    ctx: &BootstrapContext,
    iterations: usize,
    rng: &mut ChaCha8Rng,
) -> Vec<BootstrapReplicate> {
    let seeds: Vec<u64> = (0..iterations).map(|_| rng.gen()).collect();

    seeds
        .into_par_iter()
        .map(|seed| {
            let mut iteration_rng = ChaCha8Rng::seed_from_u64(seed);
            compute_replicate(ctx, &mut iteration_rng)
        })
        .collect()
}

//-----------------------------------------------------------------------------
// Orchestrator
//-----------------------------------------------------------------------------

/// Number of test predictions drawn per iteration: `max(1, ceil(sample_pct/100 * n_test))`
pub fn sample_size(sample_pct: f64, n_test: usize) -> Result<usize, PaucError> {
    let n_samp = ((sample_pct / 100.0) * n_test as f64).ceil().max(1.0) as usize;
    if n_samp > n_test {
        return Err(PaucError::invalid(format!(
            "Sample size {} exceeds the {} test predictions available",
            n_samp, n_test
        )));
    }
    Ok(n_samp)
}

/// Bootstrap partial ROC test
///
/// Cleans and bins both samples (clamped bins), builds the bin-comparison template once and runs
/// `auc.iterations` replicates in parallel.
///
/// # Arguments
///
/// * `test` - Predictions on the presumed positives
/// * `background` - Predictions on the reference population
/// * `auc` - Threshold, sample percentage, iterations, bins and complete AUC flag
/// * `rng` - Source of the per-iteration seeds
///
/// # Returns
///
/// One [`BootstrapReplicate`] per iteration, in iteration order.
///
/// # Errors
///
/// [`PaucError::InvalidInput`] for empty samples, samples without finite values, identical values,
/// `n_bins <= 1`, a non-finite threshold or sample percentage, or a sample percentage above 100.
/// Nothing is computed in that case. A threshold of 0 (or below) is valid: no bin can reach the
/// sensitivity threshold and every row is missing.
///
/// # Examples
///
/// ```
/// # use pauc::bootstrap::bootstrap_partial_auc;
/// # use pauc::param::Auc;
/// # use rand::SeedableRng;
/// # use rand_chacha::ChaCha8Rng;
/// let background: Vec<f64> = (0..200).map(|i| i as f64 / 200.0).collect();
/// let test: Vec<f64> = (0..50).map(|i| 0.5 + i as f64 / 100.0).collect();
/// let mut auc = Auc::default();
/// auc.iterations = 10;
/// let mut rng = ChaCha8Rng::seed_from_u64(42);
/// let table = bootstrap_partial_auc(&test, &background, &auc, &mut rng).unwrap();
/// assert_eq!(table.len(), 10);
/// ```
pub fn bootstrap_partial_auc(
    test: &[f64],
    background: &[f64],
    auc: &Auc,
    rng: &mut ChaCha8Rng,
) -> Result<Vec<BootstrapReplicate>, PaucError> {
    let time = Instant::now();

    if test.is_empty() || background.is_empty() {
        return Err(PaucError::invalid("Input vectors cannot be empty"));
    }
    validate_auc(auc).map_err(PaucError::InvalidInput)?;

    let discretization = discretize(background, test, auc.n_bins, BinningMode::Clamp)?;
    let n_samp = sample_size(auc.sample_pct, discretization.test_bins.len())?;
    let error_sens = 1.0 - auc.threshold / 100.0;

    let template = BinTemplate::new(n_samp, auc.n_bins);
    let ctx = BootstrapContext::new(
        &template,
        &discretization.fractional_area,
        &discretization.test_bins,
        error_sens,
        auc.compute_full_auc,
    )?;

    debug!(
        "Bootstrap: {} iterations drawing {}/{} test predictions, sensitivity > {:.4}, {} bins",
        auc.iterations,
        ctx.n_samp(),
        discretization.test_bins.len(),
        ctx.error_sens(),
        auc.n_bins
    );

    let results = iterate_replicates(&ctx, auc.iterations, rng);

    info!(
        "Bootstrap computed {} iterations in {:.2?} ({} without enough bins above the threshold)",
        results.len(),
        time.elapsed(),
        results.iter().filter(|r| r.ratio.is_none()).count()
    );

    Ok(results)
}
