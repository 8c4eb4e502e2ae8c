pub mod binning;
pub mod bootstrap;
pub mod data;
pub mod error;
pub mod experiment;
pub mod param;
pub mod summary;
pub mod utils;

pub use binning::{build_bins_and_template, BinningMode};
pub use bootstrap::{bootstrap_partial_auc, BootstrapReplicate};
pub use error::PaucError;
pub use summary::{summarize, Summary};
pub use utils::trapezoidal_area;

use crate::experiment::{sample_digest, Experiment};
use chrono::Local;
use data::Data;
use log::{debug, info};
use param::Param;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::ThreadPoolBuilder;
use std::error::Error;
use std::path::Path;

/// Version string recorded in experiments: crate version and short commit hash
pub fn version() -> String {
    format!("{}#{}", env!("CARGO_PKG_VERSION"), option_env!("PAUC_GIT_SHA").unwrap_or("unknown"))
}

/// Loads the samples named in `param.data` and runs the partial ROC test
pub fn run(param: &Param) -> Result<Experiment, Box<dyn Error>> {
    let mut data = Data::new();
    data.load_from_param(param)?;
    run_on_data(&data, param)
}

/// Runs the partial ROC test on samples already in memory
///
/// The bootstrap runs on a dedicated pool of `general.thread_number` threads and draws its
/// iteration seeds from `general.seed`, so identical parameters and data give identical experiments
/// (apart from timestamp and execution time).
pub fn run_on_data(data: &Data, param: &Param) -> Result<Experiment, Box<dyn Error>> {
    let start = std::time::Instant::now();
    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();

    info!("{}", data);

    let mut rng = ChaCha8Rng::seed_from_u64(param.general.seed);
    let pool = ThreadPoolBuilder::new()
        .num_threads(param.general.thread_number.max(1))
        .build()?;
    debug!("Thread pool of {} thread(s) ready", pool.current_num_threads());

    let replicates =
        pool.install(|| bootstrap_partial_auc(&data.test, &data.background, &param.auc, &mut rng))?;
    let summary = summarize(&replicates, param.auc.compute_full_auc);
    info!("{}", summary);

    let stem = Path::new(&param.general.save_exp)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("pauc");

    Ok(Experiment {
        id: format!("{}_{}", stem, timestamp),
        pauc_version: version(),
        timestamp,
        parameters: param.clone(),
        test_digest: sample_digest(&data.test),
        background_digest: sample_digest(&data.background),
        n_test: data.test.iter().filter(|v| v.is_finite()).count(),
        n_background: data.background.iter().filter(|v| v.is_finite()).count(),
        replicates,
        summary,
        execution_time: start.elapsed().as_secs_f64(),
    })
}
