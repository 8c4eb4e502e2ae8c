/// End-to-End Integration Test for the bootstrap partial ROC test
///
/// This test validates the complete workflow:
/// 1. Loading predictions from delimited files and parameters from YAML
/// 2. Running the bootstrap on a dedicated thread pool
/// 3. Summarizing the bootstrap table
/// 4. Checking the statistical behaviour on synthetic samples
/// 5. Testing experiment serialization/deserialization
///
/// Run with: cargo test --test test_pauc_e2e -- --nocapture
use pauc::data::Data;
use pauc::experiment::Experiment;
use pauc::param::{self, Param};
use pauc::{run, run_on_data, summarize, BootstrapReplicate};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;

fn uniform_sample(n: usize, low: f64, high: f64, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(low..high)).collect()
}

fn create_params(iterations: usize, n_bins: usize, thread_number: usize) -> Param {
    let mut param = Param::default();
    param.general.seed = 42;
    param.general.thread_number = thread_number;
    param.general.log_level = "info".to_string();
    param.auc.threshold = 5.0;
    param.auc.sample_pct = 50.0;
    param.auc.iterations = iterations;
    param.auc.compute_full_auc = true;
    param.auc.n_bins = n_bins;
    param
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(name)
}

#[test]
fn test_same_distribution_ratio_close_to_one() {
    let background = uniform_sample(2000, 0.0, 1.0, 1);
    let test = uniform_sample(1000, 0.0, 1.0, 2);
    let data = Data::from_vectors(test, background);

    let exp = run_on_data(&data, &create_params(300, 200, 4)).unwrap();
    let mean_ratio = exp.summary.mean_ratio.expect("a random model still gives finite ratios");

    assert_eq!(exp.replicates.len(), 300);
    assert!(
        (mean_ratio - 1.0).abs() < 0.1,
        "a model scored on its own distribution should have a ratio close to 1, got {}",
        mean_ratio
    );
    let complete = exp.summary.mean_complete_auc.unwrap();
    assert!((complete - 0.5).abs() < 0.1, "random AUC should be near 0.5: {}", complete);
}

#[test]
fn test_identical_samples_ratio_close_to_one() {
    let sample = uniform_sample(1500, 0.0, 1.0, 3);
    let data = Data::from_vectors(sample.clone(), sample);

    let exp = run_on_data(&data, &create_params(300, 200, 2)).unwrap();
    let mean_ratio = exp.summary.mean_ratio.unwrap();
    assert!(
        (mean_ratio - 1.0).abs() < 0.1,
        "test identical to background should give a ratio close to 1, got {}",
        mean_ratio
    );
}

#[test]
fn test_discriminating_model_beats_random() {
    let background = uniform_sample(2000, 0.0, 1.0, 4);
    let test = uniform_sample(500, 0.5, 1.0, 5);
    let data = Data::from_vectors(test, background);

    let exp = run_on_data(&data, &create_params(200, 200, 4)).unwrap();
    let summary = exp.summary;

    assert!(summary.mean_ratio.unwrap() > 1.2, "model should beat random, got {:?}", summary);
    assert!(summary.p_value.unwrap() < 0.05, "p-value should be small, got {:?}", summary);
    assert!(summary.mean_partial_auc.unwrap() > summary.mean_random_partial_auc.unwrap());
    assert!(summary.mean_complete_auc.unwrap() > 0.6);
}

#[test]
fn test_results_do_not_depend_on_thread_number() {
    let background = uniform_sample(800, 0.0, 1.0, 6);
    let test = uniform_sample(300, 0.2, 1.0, 7);
    let data = Data::from_vectors(test, background);

    let single = run_on_data(&data, &create_params(100, 100, 1)).unwrap();
    let multi = run_on_data(&data, &create_params(100, 100, 8)).unwrap();

    assert_eq!(single.replicates, multi.replicates, "table should only depend on the seed");
    assert_eq!(single.summary, multi.summary);
    assert!(single.same_inputs(&multi));
}

#[test]
fn test_complete_auc_not_requested() {
    let data =
        Data::from_vectors(uniform_sample(300, 0.3, 1.0, 8), uniform_sample(600, 0.0, 1.0, 9));
    let mut param = create_params(50, 100, 2);
    param.auc.compute_full_auc = false;

    let exp = run_on_data(&data, &param).unwrap();
    assert!(
        exp.replicates.iter().all(|r| r.complete_auc.is_none()),
        "complete AUC should be missing in every row"
    );
    assert_eq!(exp.summary.mean_complete_auc, None);
    assert!(exp.summary.mean_ratio.is_some());
}

#[test]
fn test_non_finite_values_are_cleaned() {
    let mut background = uniform_sample(500, 0.0, 1.0, 10);
    background.extend([f64::NAN, f64::INFINITY, f64::NEG_INFINITY]);
    let mut test = uniform_sample(200, 0.0, 1.0, 11);
    test.push(f64::NAN);
    let data = Data::from_vectors(test, background);

    let exp = run_on_data(&data, &create_params(20, 50, 2)).unwrap();
    assert_eq!(exp.n_background, 500);
    assert_eq!(exp.n_test, 200);
}

#[test]
fn test_degenerate_percentages_still_run() {
    let data =
        Data::from_vectors(uniform_sample(200, 0.3, 1.0, 15), uniform_sample(400, 0.0, 1.0, 16));

    let mut zero_threshold = create_params(30, 50, 2);
    zero_threshold.auc.threshold = 0.0;
    let exp = run_on_data(&data, &zero_threshold).unwrap();
    assert_eq!(exp.replicates.len(), 30);
    assert!(exp.replicates.iter().all(|r| *r == BootstrapReplicate::missing()));
    assert!(exp.summary.is_missing(), "no bin above the threshold leaves every statistic missing");

    let mut zero_sample = create_params(30, 50, 2);
    zero_sample.auc.sample_pct = 0.0;
    let exp = run_on_data(&data, &zero_sample).unwrap();
    assert_eq!(exp.replicates.len(), 30, "sample_pct=0 should draw one prediction per iteration");
}

#[test]
fn test_invalid_inputs_abort_the_run() {
    let param = create_params(20, 50, 2);

    let empty_test = Data::from_vectors(vec![], uniform_sample(10, 0.0, 1.0, 12));
    let err = run_on_data(&empty_test, &param).unwrap_err();
    assert!(err.to_string().contains("Invalid input"), "unexpected error: {}", err);

    let nan_background = Data::from_vectors(vec![0.5, 0.7], vec![f64::NAN; 4]);
    assert!(run_on_data(&nan_background, &param).is_err());

    let constant = Data::from_vectors(vec![0.2; 5], vec![0.2; 10]);
    assert!(run_on_data(&constant, &param).is_err());

    let mut one_bin = param.clone();
    one_bin.auc.n_bins = 1;
    let data = Data::from_vectors(vec![0.5, 0.7], vec![0.1, 0.9]);
    assert!(run_on_data(&data, &one_bin).is_err());
}

#[test]
fn test_run_from_files_and_serialization() {
    let test_path = temp_path("pauc_e2e_test_predictions.tsv");
    let background_path = temp_path("pauc_e2e_background_predictions.tsv");
    let param_path = temp_path("pauc_e2e_param.yaml");
    let json_path = temp_path("pauc_e2e_experiment.json");
    let bin_path = temp_path("pauc_e2e_experiment.bin");

    let to_tsv = |values: &[f64]| {
        let mut content = String::from("sample\tprediction\n");
        for (i, v) in values.iter().enumerate() {
            content.push_str(&format!("s{}\t{}\n", i, v));
        }
        content.push_str("missing\tNA\n");
        content
    };
    std::fs::write(&test_path, to_tsv(&uniform_sample(200, 0.4, 1.0, 13))).unwrap();
    std::fs::write(&background_path, to_tsv(&uniform_sample(600, 0.0, 1.0, 14))).unwrap();
    std::fs::write(
        &param_path,
        format!(
            "general:\n  seed: 7\n  thread_number: 2\n  save_exp: \"{}\"\n\
             data:\n  test: \"{}\"\n  background: \"{}\"\n  column: 1\n  has_header: true\n\
             auc:\n  iterations: 50\n  n_bins: 100\n",
            bin_path.display(),
            test_path.display(),
            background_path.display()
        ),
    )
    .unwrap();

    let param = param::get(&param_path).unwrap();
    let exp = run(&param).unwrap();

    assert_eq!(exp.n_test, 200, "the NA line should be cleaned from the test sample");
    assert_eq!(exp.n_background, 600);
    assert_eq!(exp.replicates.len(), 50);
    assert!(exp.id.starts_with("pauc_e2e_experiment_"), "id from save_exp: {}", exp.id);
    assert_eq!(exp.summary, summarize(&exp.replicates, true), "summary should match the table");

    exp.save_auto(&bin_path).unwrap();
    let from_bin = Experiment::load_auto(&bin_path).unwrap();
    assert_eq!(from_bin, exp, "bincode should restore the experiment exactly");

    exp.save_auto(&json_path).unwrap();
    let from_json = Experiment::load_auto(&json_path).unwrap();
    assert_eq!(from_json.replicates.len(), exp.replicates.len());
    assert_eq!(from_json.parameters, exp.parameters);
    assert!(from_json.same_inputs(&exp));
    let missing = |rows: &[BootstrapReplicate]| rows.iter().filter(|r| r.ratio.is_none()).count();
    assert_eq!(missing(&from_json.replicates), missing(&exp.replicates), "missing rows survive");

    for path in [&test_path, &background_path, &param_path, &json_path, &bin_path] {
        let _ = std::fs::remove_file(path);
    }
}
