//! Common code for integration tests.
use assert_cmd::cargo_bin_cmd;
use float_cmp::approx_eq;
use itertools::Itertools;
use sodra::cli::RunOpts;
use sodra::cli::example::handle_example_run_command;
use sodra::settings::Settings;
use std::env;
use std::fs::{File, read_dir};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

/// Relative tolerance for comparing floating-point fields in output files
const FLOAT_CMP_TOLERANCE: f64 = 1e-6;

// Each integration test binary only uses some of these functions, so we suppress the dead code
// warnings manually

/// Run sodra with the given arguments and check that it succeeds
#[allow(dead_code)]
pub fn assert_sodra_runs(args: &[&str]) {
    cargo_bin_cmd!("sodra")
        .env("SODRA_USE_DEFAULT_SETTINGS", "1")
        .args(args)
        .assert()
        .success();
}

/// Run sodra with the given arguments and check that it fails
#[allow(dead_code)]
pub fn assert_sodra_fails(args: &[&str]) {
    cargo_bin_cmd!("sodra")
        .env("SODRA_USE_DEFAULT_SETTINGS", "1")
        .args(args)
        .assert()
        .failure();
}

/// Run sodra with the given arguments and return what it wrote to stdout
#[allow(dead_code)]
pub fn get_sodra_stdout(args: &[&str]) -> String {
    let output = cargo_bin_cmd!("sodra")
        .env("SODRA_USE_DEFAULT_SETTINGS", "1")
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success());

    String::from_utf8(output.stdout).unwrap()
}

/// Run an example model and compare its output (including debug files) with the saved results
/// in `tests/data`
#[allow(dead_code)]
pub fn run_regression_test(example_name: &str) {
    unsafe { env::set_var("SODRA_LOG_LEVEL", "off") };

    // Allow user to set output dir for regression tests so they can examine results
    let tmp: TempDir;
    let output_dir = if let Ok(dir) = env::var("SODRA_TEST_OUTPUT_DIR") {
        [&dir, example_name].iter().collect()
    } else {
        tmp = tempdir().unwrap();
        tmp.path().join("results")
    };

    let opts = RunOpts {
        output_dir: Some(output_dir.clone()),
        overwrite: true,
        debug_model: Some(true),
        sell_excess_ra: false,
    };
    handle_example_run_command(example_name, &opts, Some(Settings::default())).unwrap();

    let test_data_dir = PathBuf::from(format!("tests/data/{example_name}"));
    compare_output_dirs(&output_dir, &test_data_dir);
}

fn compare_output_dirs(output_dir: &Path, test_data_dir: &Path) {
    let file_names1 = get_csv_file_names(output_dir);
    let file_names2 = get_csv_file_names(test_data_dir);

    // Check that output files haven't been added/removed
    assert_eq!(file_names1, file_names2);

    let mut errors = Vec::new();
    for file_name in file_names1 {
        compare_lines(output_dir, test_data_dir, &file_name, &mut errors);
    }

    assert!(
        errors.is_empty(),
        "The following errors occurred:\n  * {}",
        errors.join("\n  * ")
    );
}

fn compare_lines(
    output_dir1: &Path,
    output_dir2: &Path,
    file_name: &str,
    errors: &mut Vec<String>,
) {
    let lines1 = read_lines(&output_dir1.join(file_name));
    let lines2 = read_lines(&output_dir2.join(file_name));

    if lines1.len() != lines2.len() {
        errors.push(format!(
            "{}: Different number of lines: {} vs {}",
            file_name,
            lines1.len(),
            lines2.len()
        ));
    }

    for (num, (line1, line2)) in lines1.into_iter().zip(lines2).enumerate() {
        if !compare_line(num, &line1, &line2, file_name, errors) {
            errors.push(format!(
                "{file_name}: line {num}:\n    + \"{line1}\"\n    - \"{line2}\""
            ));
        }
    }
}

fn compare_line(
    num: usize,
    line1: &str,
    line2: &str,
    file_name: &str,
    errors: &mut Vec<String>,
) -> bool {
    let fields1 = line1.split(',').collect_vec();
    let fields2 = line2.split(',').collect_vec();
    if fields1.len() != fields2.len() {
        errors.push(format!(
            "{}: line {}: Different number of fields: {} vs {}",
            file_name,
            num,
            fields1.len(),
            fields2.len()
        ));
    }

    // Compare fields as floating-point values where possible, falling back on string comparison
    fields1
        .into_iter()
        .zip(fields2)
        .all(|(f1, f2)| try_compare_floats(f1, f2).unwrap_or_else(|| f1 == f2))
}

/// Parse a string into an `f64`, returning `None` if parsing fails or value is infinite/NaN
fn parse_finite(s: &str) -> Option<f64> {
    s.parse().ok().filter(|f: &f64| f.is_finite())
}

fn try_compare_floats(s1: &str, s2: &str) -> Option<bool> {
    let float1 = parse_finite(s1)?;
    let float2 = parse_finite(s2)?;
    let scale = float1.abs().max(float2.abs()).max(1.0);

    Some(approx_eq!(
        f64,
        float1 / scale,
        float2 / scale,
        epsilon = FLOAT_CMP_TOLERANCE
    ))
}

/// Get the names of CSV files in the given folder
fn get_csv_file_names(dir_path: &Path) -> Vec<String> {
    let mut file_names = read_dir(dir_path)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".csv"))
        .collect_vec();
    file_names.sort();
    file_names
}

/// Read all lines from a file into a `Vec`
fn read_lines(path: &Path) -> Vec<String> {
    let file = File::open(path).unwrap();
    BufReader::new(file).lines().map_while(Result::ok).collect()
}
