use crate::error::PaucError;
use crate::param::Param;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// The two prediction samples of a partial ROC test
#[derive(Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Data {
    /// Predictions on the presumed positives
    pub test: Vec<f64>,
    /// Predictions on the reference population
    pub background: Vec<f64>,
}

impl Data {
    /// Create a new `Data` instance with default values
    pub fn new() -> Data {
        Data::default()
    }

    pub fn from_vectors(test: Vec<f64>, background: Vec<f64>) -> Data {
        Data { test, background }
    }

    /// Load both samples from delimited files
    ///
    /// Cells that do not parse as numbers (`NA`, empty, ...) are kept as `NaN`
    /// and removed later by the pipeline together with infinite values.
    pub fn load_data(
        &mut self,
        test_path: &str,
        background_path: &str,
        column: usize,
        has_header: bool,
    ) -> Result<(), PaucError> {
        info!("Loading files {} and {}...", test_path, background_path);
        self.test = load_predictions(test_path, column, has_header)?;
        self.background = load_predictions(background_path, column, has_header)?;
        Ok(())
    }

    /// Load both samples from the paths of the `data` section
    pub fn load_from_param(&mut self, param: &Param) -> Result<(), PaucError> {
        if param.data.test.is_empty() || param.data.background.is_empty() {
            return Err(PaucError::invalid("Both data.test and data.background must be provided"));
        }
        self.load_data(
            &param.data.test,
            &param.data.background,
            param.data.column,
            param.data.has_header,
        )
    }

    pub fn n_missing(&self) -> (usize, usize) {
        (
            self.test.iter().filter(|v| !v.is_finite()).count(),
            self.background.iter().filter(|v| !v.is_finite()).count(),
        )
    }
}

/// Reads one column of numbers; tab delimited for `.tsv`/`.tab`, comma delimited otherwise
pub fn load_predictions<P: AsRef<Path>>(
    path: P,
    column: usize,
    has_header: bool,
) -> Result<Vec<f64>, PaucError> {
    let path = path.as_ref();
    let extension = path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase());
    let delimiter = match extension {
        Some(ext) if ext == "tsv" || ext == "tab" => b'\t',
        _ => b',',
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(has_header)
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut values = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let cell = record.get(column).ok_or_else(|| {
            PaucError::Parse(format!(
                "{}: record {} has no column {}",
                path.display(),
                line + 1,
                column
            ))
        })?;
        values.push(cell.parse::<f64>().unwrap_or(f64::NAN));
    }

    let unparsed = values.iter().filter(|v| v.is_nan()).count();
    if unparsed > 0 {
        warn!("{}: {} value(s) missing or not numeric", path.display(), unparsed);
    }

    Ok(values)
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (test_missing, background_missing) = self.n_missing();
        writeln!(f, "Test predictions: {} ({} non-finite)", self.test.len(), test_missing)?;
        write!(
            f,
            "Background predictions: {} ({} non-finite)",
            self.background.len(),
            background_missing
        )
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Reuse the Display formatter
        write!(f, "{}", self)
    }
}
