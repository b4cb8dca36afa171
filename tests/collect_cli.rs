//! End-to-end checks for `ray-coverage collect` against fake tools on PATH.
#![cfg(unix)]

mod common;

use common::{ray_coverage, stderr_of, stdout_of, FakeTools};

const REPORT_BODY: &str = "printf 'Name Stmts Miss Cover\\nTOTAL 12 3 75%%\\n'";

fn fake_toolchain() -> FakeTools {
    let tools = FakeTools::create();
    tools.install("bazel", "exit 0");
    tools.install("coverage", REPORT_BODY);
    tools.install("aws", "exit 0");
    tools
}

#[test]
fn collects_report_without_upload() {
    let tools = fake_toolchain();
    let work = tempfile::tempdir().expect("create work dir");
    let cov = work.path().join("data.cov");

    let output = ray_coverage()
        .env("PATH", tools.path_env())
        .current_dir(work.path())
        .args(["collect", "//release:unit", "--coverage-file"])
        .arg(&cov)
        .output()
        .expect("run ray-coverage");

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let bazel = tools.calls("bazel");
    assert_eq!(bazel.len(), 1);
    assert_eq!(bazel[0][0], "test");
    assert_eq!(bazel[0][1], "//release:unit");
    assert!(bazel[0].contains(&format!("--test_env=COVERAGE_FILE={}", cov.display())));
    let addopts = bazel[0]
        .iter()
        .find(|arg| arg.starts_with("--test_env=PYTEST_ADDOPTS="))
        .expect("PYTEST_ADDOPTS argument");
    assert!(
        addopts.starts_with("--test_env=PYTEST_ADDOPTS=--cov-context=test --cov=/"),
        "{addopts}"
    );
    assert!(addopts.ends_with("/release --cov-append"), "{addopts}");

    assert_eq!(
        tools.calls("coverage"),
        vec![vec![
            "report".to_string(),
            format!("--data-file={}", cov.display())
        ]]
    );
    assert!(tools.calls("aws").is_empty());

    let stderr = stderr_of(&output);
    assert!(stderr.contains("Collecting coverage for test target: //release:unit"));
    assert!(stderr.contains("TOTAL 12 3 75%"));
}

#[test]
fn productionize_uploads_and_reports_key_as_json() {
    let tools = fake_toolchain();
    let work = tempfile::tempdir().expect("create work dir");
    let cov = work.path().join("data.cov");

    let output = ray_coverage()
        .env("PATH", tools.path_env())
        .current_dir(work.path())
        .args(["collect", "//release:unit", "--productionize", "--json", "--coverage-file"])
        .arg(&cov)
        .output()
        .expect("run ray-coverage");

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let value: serde_json::Value =
        serde_json::from_str(&stdout_of(&output)).expect("parse outcome JSON");
    let key = value["uploaded_key"].as_str().expect("uploaded key");
    assert!(key.starts_with("continuous-release/ray-release-"), "{key}");
    assert!(key.ends_with(".cov"), "{key}");
    assert_eq!(value["summary"]["statements"], 12);

    let aws = tools.calls("aws");
    assert_eq!(aws.len(), 1);
    assert_eq!(
        aws[0],
        vec![
            "s3".to_string(),
            "cp".to_string(),
            "--only-show-errors".to_string(),
            cov.display().to_string(),
            format!("s3://ray-release-automation-results/{key}"),
        ]
    );
    assert!(stderr_of(&output).contains(&format!(
        "Successfully uploaded coverage data to s3 as {key}"
    )));
}

#[test]
fn bazel_override_is_split_into_words() {
    let tools = fake_toolchain();
    tools.install("bazelisk", "exit 0");
    let work = tempfile::tempdir().expect("create work dir");

    let output = ray_coverage()
        .env("PATH", tools.path_env())
        .env("RAY_COVERAGE_BAZEL", "bazelisk --bazelrc='ci rc'")
        .current_dir(work.path())
        .args(["collect", "//release:unit", "--coverage-file"])
        .arg(work.path().join("data.cov"))
        .output()
        .expect("run ray-coverage");

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert!(tools.calls("bazel").is_empty());
    let bazelisk = tools.calls("bazelisk");
    assert_eq!(bazelisk.len(), 1);
    assert_eq!(bazelisk[0][0], "--bazelrc=ci rc");
    assert_eq!(bazelisk[0][1], "test");
}

#[test]
fn failing_test_run_aborts_before_report() {
    let tools = fake_toolchain();
    tools.install("bazel", "exit 3");
    let work = tempfile::tempdir().expect("create work dir");

    let output = ray_coverage()
        .env("PATH", tools.path_env())
        .current_dir(work.path())
        .args(["collect", "//release:unit", "--upload", "--coverage-file"])
        .arg(work.path().join("data.cov"))
        .output()
        .expect("run ray-coverage");

    assert!(!output.status.success());
    let stderr = stderr_of(&output);
    assert!(stderr.contains("run bazel test for //release:unit"), "{stderr}");
    assert!(stderr.contains("exit code 3"), "{stderr}");
    assert!(tools.calls("coverage").is_empty());
    assert!(tools.calls("aws").is_empty());
}

#[test]
fn relative_paths_are_resolved_against_cwd() {
    let tools = fake_toolchain();
    let work = tempfile::tempdir().expect("create work dir");
    let work_dir = work.path().canonicalize().expect("canonical work dir");
    let cov = work_dir.join("data.cov");

    let output = ray_coverage()
        .env("PATH", tools.path_env())
        .current_dir(&work_dir)
        .args([
            "collect",
            "//release:unit",
            "--coverage-file",
            "data.cov",
            "--source-dir",
            "release",
        ])
        .output()
        .expect("run ray-coverage");

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let bazel = tools.calls("bazel");
    assert_eq!(bazel.len(), 1);
    assert!(
        bazel[0].contains(&format!("--test_env=COVERAGE_FILE={}", cov.display())),
        "{:?}",
        bazel[0]
    );
    assert!(bazel[0].contains(&format!(
        "--test_env=PYTEST_ADDOPTS=--cov-context=test --cov={} --cov-append",
        work_dir.join("release").display()
    )));
    assert_eq!(
        tools.calls("coverage"),
        vec![vec![
            "report".to_string(),
            format!("--data-file={}", cov.display())
        ]]
    );
}

#[test]
fn malformed_aws_override_is_ignored_without_upload() {
    let tools = fake_toolchain();
    let work = tempfile::tempdir().expect("create work dir");

    let output = ray_coverage()
        .env("PATH", tools.path_env())
        .env("RAY_COVERAGE_AWS", "'unterminated")
        .current_dir(work.path())
        .args(["collect", "//release:unit", "--coverage-file"])
        .arg(work.path().join("data.cov"))
        .output()
        .expect("run ray-coverage");

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(tools.calls("bazel").len(), 1);
    assert!(tools.calls("aws").is_empty());
}

#[test]
fn malformed_aws_override_fails_upload_before_running_tests() {
    let tools = fake_toolchain();
    let work = tempfile::tempdir().expect("create work dir");

    let output = ray_coverage()
        .env("PATH", tools.path_env())
        .env("RAY_COVERAGE_AWS", "'unterminated")
        .current_dir(work.path())
        .args(["collect", "//release:unit", "--upload", "--coverage-file"])
        .arg(work.path().join("data.cov"))
        .output()
        .expect("run ray-coverage");

    assert!(!output.status.success());
    let stderr = stderr_of(&output);
    assert!(stderr.contains("parse RAY_COVERAGE_AWS"), "{stderr}");
    assert!(tools.calls("bazel").is_empty());
}
