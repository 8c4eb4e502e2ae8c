use crate::bootstrap::BootstrapReplicate;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::fmt;

/// Column names of the summary, in `to_array` order
pub const SUMMARY_COLUMNS: [&str; 5] = [
    "mean_complete_auc",
    "mean_pauc",
    "mean_pauc_rand",
    "mean_pAUCratio",
    "p_value",
];

/// Aggregated result of the partial ROC test
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    pub mean_complete_auc: Option<f64>,
    pub mean_partial_auc: Option<f64>,
    pub mean_random_partial_auc: Option<f64>,
    pub mean_ratio: Option<f64>,
    /// One-sided p-value of "model better than random": 1 - share of iterations with ratio > 1
    pub p_value: Option<f64>,
}

impl Summary {
    /// Plain floats where `NaN` stands for a missing statistic
    pub fn to_array(&self) -> [f64; 5] {
        [
            self.mean_complete_auc.unwrap_or(f64::NAN),
            self.mean_partial_auc.unwrap_or(f64::NAN),
            self.mean_random_partial_auc.unwrap_or(f64::NAN),
            self.mean_ratio.unwrap_or(f64::NAN),
            self.p_value.unwrap_or(f64::NAN),
        ]
    }

    pub fn is_missing(&self) -> bool {
        *self == Summary::default()
    }
}

/// Reduces a bootstrap table to five statistics
///
/// Means are taken over the rows with a finite ratio (zero rows included, missing rows excluded).
/// The p-value is `1 - (rows with ratio > 1) / (all rows)`: its denominator counts every row,
/// missing ones included. When no row has a finite ratio every statistic is missing.
///
/// # Arguments
///
/// * `results` - Bootstrap table, one row per iteration
/// * `has_complete_auc` - Whether the complete AUC was requested when building the table
pub fn summarize(results: &[BootstrapReplicate], has_complete_auc: bool) -> Summary {
    let finite: Vec<&BootstrapReplicate> =
        results.iter().filter(|r| r.has_finite_ratio()).collect();
    if finite.is_empty() {
        return Summary::default();
    }

    let n_better = results
        .iter()
        .filter(|r| matches!(r.ratio, Some(ratio) if ratio > 1.0))
        .count();
    let prop_success = n_better as f64 / results.len() as f64;

    let mean_complete_auc = if has_complete_auc {
        mean_of(finite.iter().filter_map(|r| r.complete_auc))
    } else {
        None
    };

    Summary {
        mean_complete_auc,
        mean_partial_auc: mean_of(finite.iter().filter_map(|r| r.partial_auc)),
        mean_random_partial_auc: mean_of(finite.iter().filter_map(|r| r.random_partial_auc)),
        mean_ratio: mean_of(finite.iter().filter_map(|r| r.ratio)),
        p_value: Some(1.0 - prop_success),
    }
}

/// Same as [`summarize`] for a table of plain rows where non-finite values mark missing metrics
pub fn summarize_rows(rows: &[[f64; 4]], has_complete_auc: bool) -> Summary {
    let results: Vec<BootstrapReplicate> = rows.iter().map(BootstrapReplicate::from_row).collect();
    summarize(&results, has_complete_auc)
}

fn mean_of<I: Iterator<Item = f64>>(values: I) -> Option<f64> {
    let values: Vec<f64> = values.collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().mean())
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: Option<f64>| v.map_or("NA".to_string(), |v| format!("{:.4}", v));
        write!(
            f,
            "AUC {} | pAUC {} | random pAUC {} | pAUC ratio {} | p-value {}",
            show(self.mean_complete_auc),
            show(self.mean_partial_auc),
            show(self.mean_random_partial_auc),
            show(self.mean_ratio),
            show(self.p_value)
        )
    }
}
