use crate::bootstrap::{BootstrapReplicate, REPLICATE_COLUMNS};
use crate::param::Param;
use crate::summary::Summary;
use log::warn;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::error::Error;
use std::fmt;
use std::path::Path;

//-----------------------------------------------------------------------------
// Experiment record
//-----------------------------------------------------------------------------

/// Everything needed to trace back one partial ROC test
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Experiment {
    pub id: String,
    pub pauc_version: String,
    pub timestamp: String,

    pub parameters: Param,

    /// SHA-256 of the raw test predictions, as little-endian bytes
    pub test_digest: String,
    /// SHA-256 of the raw background predictions, as little-endian bytes
    pub background_digest: String,
    pub n_test: usize,
    pub n_background: usize,

    pub replicates: Vec<BootstrapReplicate>,
    pub summary: Summary,

    pub execution_time: f64,
}

/// Hex SHA-256 of a sample, so two experiments can be checked to share their inputs
pub fn sample_digest(values: &[f64]) -> String {
    let mut hasher = Sha256::new();
    for v in values {
        hasher.update(v.to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}

impl Experiment {
    /// Writes the bootstrap table as tab-separated values, missing metrics as `NA`
    pub fn replicates_to_tsv(&self) -> String {
        let mut out = format!("iteration\t{}\n", REPLICATE_COLUMNS.join("\t"));
        for (i, r) in self.replicates.iter().enumerate() {
            let cells: Vec<String> = r
                .to_row()
                .iter()
                .map(|v| if v.is_nan() { "NA".to_string() } else { v.to_string() })
                .collect();
            out.push_str(&format!("{}\t{}\n", i + 1, cells.join("\t")));
        }
        out
    }

    pub fn same_inputs(&self, other: &Experiment) -> bool {
        self.test_digest == other.test_digest && self.background_digest == other.background_digest
    }

    /// Saves the experiment in a suitable format based on file extension.
    pub fn save_auto<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn Error>> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "json" => self.save_json(path),
            "bin" | "bincode" => self.save_bincode(path),
            "tsv" => {
                std::fs::write(path, self.replicates_to_tsv())?;
                Ok(())
            }
            _ => {
                warn!("Unknown format. Saving experiment in bincode.");
                self.save_bincode(path.with_extension("bin"))
            }
        }
    }

    /// Saves to JSON (human readable; missing metrics are written as null)
    fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Saves as Bincode (compact binary, Rust-only)
    fn save_bincode<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn Error>> {
        let encoded = bincode::serialize(self)?;
        std::fs::write(path, encoded)?;
        Ok(())
    }

    /// Loads the experiment from a file, detecting the format from the file extension.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the experiment file.
    ///
    /// # Returns
    ///
    /// Result containing the loaded Experiment or an error.
    pub fn load_auto<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "json" => Self::load_json(path),
            "bin" | "bincode" => Self::load_bincode(path),
            _ => Self::load_with_fallback(path),
        }
    }

    fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let content = std::fs::read_to_string(path)?;
        let experiment: Experiment = serde_json::from_str(&content)?;
        Ok(experiment)
    }

    fn load_bincode<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let bytes = std::fs::read(path)?;
        let experiment: Experiment = bincode::deserialize(&bytes)?;
        Ok(experiment)
    }

    /// Tries Bincode, then JSON.
    fn load_with_fallback<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let path = path.as_ref();

        if let Ok(experiment) = Self::load_bincode(path) {
            return Ok(experiment);
        }

        if let Ok(experiment) = Self::load_json(path) {
            return Ok(experiment);
        }

        Err("Unable to load the experiment".into())
    }
}

impl fmt::Display for Experiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let auc = &self.parameters.auc;
        writeln!(f, "Experiment {} (pauc {}, {})", self.id, self.pauc_version, self.timestamp)?;
        writeln!(
            f,
            "{} test / {} background predictions | threshold {}% | sample {}% | {} bins | {} iter.",
            self.n_test,
            self.n_background,
            auc.threshold,
            auc.sample_pct,
            auc.n_bins,
            auc.iterations
        )?;
        let n_missing = self.replicates.iter().filter(|r| !r.has_finite_ratio()).count();
        writeln!(f, "{} iteration(s) without a finite ratio", n_missing)?;
        write!(f, "{}", self.summary)
    }
}
