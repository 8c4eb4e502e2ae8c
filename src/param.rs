use log::warn;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

// Field definitions and associated default values

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Param {
    #[serde(default)]
    pub general: General,
    #[serde(default)]
    pub data: Data,
    #[serde(default)]
    pub auc: Auc,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct General {
    #[serde(default = "seed_default")]
    pub seed: u64,
    #[serde(default = "one_default")]
    pub thread_number: usize,
    #[serde(default = "log_base_default")]
    pub log_base: String,
    #[serde(default = "log_suffix_default")]
    pub log_suffix: String,
    #[serde(default = "log_level_default")]
    pub log_level: String,
    #[serde(default = "save_experiment_default")]
    pub save_exp: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Data {
    /// Predictions on the presumed positives
    #[serde(default = "empty_string")]
    pub test: String,
    /// Predictions on the reference population
    #[serde(default = "empty_string")]
    pub background: String,
    /// Zero-based column holding the predictions in both files
    #[serde(default = "uzero_default")]
    pub column: usize,
    #[serde(default = "false_default")]
    pub has_header: bool,
}

/// Settings of the bootstrap partial ROC test
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Auc {
    /// Omission error in percent: the partial AUC covers sensitivities above `1 - threshold/100`
    #[serde(default = "threshold_default")]
    pub threshold: f64,
    /// Percentage of the test sample drawn, without replacement, at each iteration
    #[serde(default = "sample_pct_default")]
    pub sample_pct: f64,
    #[serde(default = "iterations_default")]
    pub iterations: usize,
    #[serde(default = "true_default")]
    pub compute_full_auc: bool,
    #[serde(default = "n_bins_default")]
    pub n_bins: usize,
}

// Default section definitions

impl Default for General {
    fn default() -> Self {
        serde_json::from_value(serde_json::json!({})).unwrap()
    }
}

impl Default for Data {
    fn default() -> Self {
        serde_json::from_value(serde_json::json!({})).unwrap()
    }
}

impl Default for Auc {
    fn default() -> Self {
        serde_json::from_value(serde_json::json!({})).unwrap()
    }
}

impl Default for Param {
    fn default() -> Self {
        serde_json::from_value(serde_json::json!({})).unwrap()
    }
}

impl Param {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Reads a parameter file: TOML when the extension is `.toml`, YAML otherwise
pub fn get<P: AsRef<Path>>(param_file: P) -> Result<Param, Box<dyn Error>> {
    let path = param_file.as_ref();
    let mut param_reader = BufReader::new(File::open(path)?);

    let is_toml = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);

    let mut config: Param = if is_toml {
        let mut content = String::new();
        param_reader.read_to_string(&mut content)?;
        toml::from_str(&content)?
    } else {
        serde_yaml::from_reader(param_reader)?
    };

    validate(&mut config)?;

    Ok(config)
}

pub fn validate(param: &mut Param) -> Result<(), String> {
    if param.general.thread_number == 0 {
        warn!("thread_number=0: using a single thread.");
        param.general.thread_number = 1;
    }

    validate_auc(&param.auc)?;

    if param.auc.sample_pct > 100.0 {
        return Err(format!(
            "Invalid sample_pct={:.3}. Cannot draw more than the whole test sample.",
            param.auc.sample_pct
        ));
    }
    if param.auc.sample_pct <= 0.0 {
        warn!(
            "sample_pct={:.3}: a single test prediction will be drawn per iteration.",
            param.auc.sample_pct
        );
    }
    if param.auc.threshold <= 0.0 || param.auc.threshold > 100.0 {
        warn!(
            "threshold={:.3} outside (0, 100]: no bin may reach the sensitivity threshold.",
            param.auc.threshold
        );
    }

    if param.auc.iterations == 0 {
        warn!("iterations=0: the bootstrap table will be empty and every statistic missing.");
    } else if param.auc.iterations < ITERATIONS_REC {
        warn!(
            "Bootstrap iterations={} < {}. The p-value resolution is only 1/{}.",
            param.auc.iterations, ITERATIONS_REC, param.auc.iterations
        );
    }

    Ok(())
}

const ITERATIONS_REC: usize = 100;

/// Checks the settings the bootstrap cannot run without: more than one bin and finite percentages.
/// A sample percentage above 100 is caught later, when the sample size is derived.
pub fn validate_auc(auc: &Auc) -> Result<(), String> {
    if auc.n_bins <= 1 {
        return Err(format!("Invalid n_bins={}. Must be greater than 1.", auc.n_bins));
    }

    if !auc.threshold.is_finite() {
        return Err(format!("Invalid threshold={}. Must be finite.", auc.threshold));
    }

    if !auc.sample_pct.is_finite() {
        return Err(format!("Invalid sample_pct={}. Must be finite.", auc.sample_pct));
    }

    Ok(())
}

// Default value definitions

fn seed_default() -> u64 {
    4815162342
}
fn empty_string() -> String {
    "".to_string()
}
fn save_experiment_default() -> String {
    "".to_string()
}
fn log_base_default() -> String {
    "".to_string()
}
fn log_suffix_default() -> String {
    "log".to_string()
}
fn log_level_default() -> String {
    "info".to_string()
}
fn false_default() -> bool {
    false
}
fn true_default() -> bool {
    true
}
fn uzero_default() -> usize {
    0
}
fn one_default() -> usize {
    1
}
fn threshold_default() -> f64 {
    5.0
}
fn sample_pct_default() -> f64 {
    50.0
}
fn iterations_default() -> usize {
    500
}
fn n_bins_default() -> usize {
    500
}
