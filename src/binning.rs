use crate::error::PaucError;
use crate::utils::finite_values;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

//-----------------------------------------------------------------------------
// Discretization of the two prediction samples
//-----------------------------------------------------------------------------

/// How bin indices falling outside `[1, n_bins]` are handled
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub enum BinningMode {
    /// Floored positions are clamped into `[0, n_bins-1]` so every bin lies in `[1, n_bins]`.
    /// This is the mode of the bootstrap pipeline.
    Clamp,
    /// No clamping: out-of-range background bins are skipped when counting the histogram
    /// and test bins are kept as computed.
    Discard,
}

/// Background and test samples projected onto a shared bin space
#[derive(Debug, Clone, PartialEq)]
pub struct Discretization {
    pub n_bins: usize,
    pub min: f64,
    pub max: f64,
    /// Bin index of every cleaned background value, in input order
    pub background_bins: Vec<usize>,
    /// Bin index of every cleaned test value, in input order
    pub test_bins: Vec<usize>,
    /// Background counts in descending bin order: slot `k` counts bin `n_bins - k`
    pub counts: Vec<usize>,
    /// Cumulative normalised counts, the x axis of the ROC curve
    pub fractional_area: Vec<f64>,
}

/// Cleans, combines and bins both samples, then builds the background histogram
///
/// # Arguments
///
/// * `background` - Predictions on the reference population
/// * `test` - Predictions on the presumed positives
/// * `n_bins` - Number of bins, at least 2
/// * `mode` - Handling of out-of-range bins
///
/// # Errors
///
/// [`PaucError::InvalidInput`] if a sample is empty before or after removing non-finite values,
/// if `n_bins < 2`, or if all values are identical.
pub fn discretize(
    background: &[f64],
    test: &[f64],
    n_bins: usize,
    mode: BinningMode,
) -> Result<Discretization, PaucError> {
    if n_bins <= 1 {
        return Err(PaucError::invalid("Number of bins must be greater than 1"));
    }
    if background.is_empty() || test.is_empty() {
        return Err(PaucError::invalid("Input vectors cannot be empty"));
    }

    let background_clean = finite_values(background);
    if background_clean.is_empty() {
        return Err(PaucError::invalid("No finite values in background predictions"));
    }
    let test_clean = finite_values(test);
    if test_clean.is_empty() {
        return Err(PaucError::invalid("No finite values in test predictions"));
    }
    if background_clean.len() < background.len() || test_clean.len() < test.len() {
        debug!(
            "Removed {} non-finite background and {} non-finite test values",
            background.len() - background_clean.len(),
            test.len() - test_clean.len()
        );
    }

    // Background first: [0, n_background) is background, the remainder is test
    let n_background = background_clean.len();
    let combined: Vec<f64> = background_clean.into_iter().chain(test_clean).collect();

    let (min, max) = combined
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min;
    if range <= f64::EPSILON {
        return Err(PaucError::invalid("All prediction values are identical"));
    }

    let mut background_bins = bin_values(&combined, min, range, n_bins, mode);
    let test_bins = background_bins.split_off(n_background);

    let counts = histogram(&background_bins, n_bins);
    let fractional_area = fractional_area(&counts);

    debug!(
        "Discretized {} background and {} test values into {} bins over [{}, {}] ({:?})",
        background_bins.len(),
        test_bins.len(),
        n_bins,
        min,
        max,
        mode
    );

    Ok(Discretization {
        n_bins,
        min,
        max,
        background_bins,
        test_bins,
        counts,
        fractional_area,
    })
}

/// Maps one value to its bin: `floor((value - min) * (n_bins-1) / range) + 1`
pub fn bin_index(value: f64, min: f64, range: f64, n_bins: usize, mode: BinningMode) -> usize {
    let scale = (n_bins as f64 - 1.0) / range;
    let position = ((value - min) * scale).floor().max(0.0);
    let position = match mode {
        BinningMode::Clamp => position.min(n_bins as f64 - 1.0),
        BinningMode::Discard => position,
    };
    position as usize + 1
}

/// Bins every value independently, in parallel
pub fn bin_values(
    values: &[f64],
    min: f64,
    range: f64,
    n_bins: usize,
    mode: BinningMode,
) -> Vec<usize> {
    values
        .par_iter()
        .map(|&v| bin_index(v, min, range, n_bins, mode))
        .collect()
}

/// Counts bin occurrences in descending bin order (slot `k` holds bin `n_bins - k`).
/// Bins outside `[1, n_bins]` are ignored.
pub fn histogram(bins: &[usize], n_bins: usize) -> Vec<usize> {
    let counts: Vec<AtomicUsize> = (0..n_bins).map(|_| AtomicUsize::new(0)).collect();

    bins.par_iter().for_each(|&bin| {
        if (1..=n_bins).contains(&bin) {
            counts[n_bins - bin].fetch_add(1, Ordering::Relaxed);
        }
    });

    counts.into_iter().map(AtomicUsize::into_inner).collect()
}

/// Cumulative sum of the counts normalised by their total; all zeros when nothing was counted
pub fn fractional_area(counts: &[usize]) -> Vec<f64> {
    let cumulative: Vec<f64> = counts
        .iter()
        .scan(0.0, |acc, &c| {
            *acc += c as f64;
            Some(*acc)
        })
        .collect();

    match cumulative.last() {
        Some(&total) if total > f64::EPSILON => cumulative.iter().map(|c| c / total).collect(),
        _ => vec![0.0; counts.len()],
    }
}

//-----------------------------------------------------------------------------
// Bin-comparison template
//-----------------------------------------------------------------------------

/// `(n_samp x n_bins)` matrix whose column `j` is the constant `n_bins - j`.
/// Built once and shared read-only by every bootstrap iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct BinTemplate {
    n_samp: usize,
    n_bins: usize,
    values: Vec<usize>, // column-major
}

impl BinTemplate {
    pub fn new(n_samp: usize, n_bins: usize) -> BinTemplate {
        let mut values = Vec::with_capacity(n_samp * n_bins);
        for j in 0..n_bins {
            values.extend(std::iter::repeat(n_bins - j).take(n_samp));
        }

        BinTemplate { n_samp, n_bins, values }
    }

    pub fn n_rows(&self) -> usize {
        self.n_samp
    }

    pub fn n_cols(&self) -> usize {
        self.n_bins
    }

    pub fn column(&self, j: usize) -> &[usize] {
        &self.values[j * self.n_samp..(j + 1) * self.n_samp]
    }
}

/// Discretizes both samples and builds the template sized on the cleaned test sample
pub fn build_bins_and_template(
    test: &[f64],
    background: &[f64],
    n_bins: usize,
    mode: BinningMode,
) -> Result<(Discretization, BinTemplate), PaucError> {
    let discretization = discretize(background, test, n_bins, mode)?;
    let template = BinTemplate::new(discretization.test_bins.len(), n_bins);
    Ok((discretization, template))
}
