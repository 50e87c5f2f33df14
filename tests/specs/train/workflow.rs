//! End-to-end `smc train` runs
//!
//! The stub `mlflow run` writes a model into the file-store run it is given.

use crate::prelude::*;

const HYPERPARAMETERS: &str = r#"{
  "sagemaker_submit_directory": "\"file://${source}\"",
  "sagemaker_program": "\"train.py\"",
  "sagemaker_mlflow_run_experiment-id": "\"0\"",
  "alpha": "0.5"
}"#;

#[test]
fn train_runs_project_and_saves_artifacts() {
    let project = Project::with_source(HYPERPARAMETERS);

    project.smc().args(&["train"]).passes().stdout_has("trained run ").stderr_has("training completed");

    let code_dir = project.code_dir();
    assert!(code_dir.join("MLproject").is_file());
    assert!(code_dir.join("train.py").is_file());

    let saved = project.model_dir().join("mlflow_run_artifacts");
    assert!(saved.join("model/MLmodel").is_file());
    assert!(saved.join("model/model.pkl").is_file());

    let runs = project.runs();
    assert_eq!(runs.len(), 1);
    assert_eq!(project.run_status(&runs[0]), 3);
}

#[test]
fn train_invokes_conda_in_order() {
    let project = Project::with_source(HYPERPARAMETERS);
    project.smc().args(&["train"]).passes();

    let runs = project.runs();
    let run_id = runs[0].file_name().unwrap().to_string_lossy().into_owned();
    let code_dir = project.code_dir().display().to_string();
    let calls = project.conda_calls();

    assert_eq!(calls[0], "--version");
    assert_eq!(calls[1], "run -n training conda info");
    assert_eq!(calls[2], "run -n training mlflow --version");
    assert_eq!(calls[3], format!("env update -n training -f {code_dir}/conda.yaml"));
    assert_eq!(calls[4], "run -n training conda info --json");
    similar_asserts::assert_eq!(
        calls[5],
        format!("run -n training mlflow run --experiment-id 0 -P alpha=0.5 --run-id {run_id} {code_dir}")
    );
    assert_eq!(calls.len(), 6);
}

#[test]
fn train_puts_env_bin_first_on_path() {
    let project = Project::with_source(HYPERPARAMETERS);
    project.smc().args(&["train"]).passes().stdout_has("PATH=/stub/envs/training/bin:");
}

#[test]
fn train_resumes_run_given_by_hyperparameter() {
    let project = Project::with_source(HYPERPARAMETERS);
    project.smc().args(&["train"]).passes();
    let run_id = project.runs()[0].file_name().unwrap().to_string_lossy().into_owned();

    let resumed = HYPERPARAMETERS.replace(
        "\"alpha\"",
        &format!("\"sagemaker_mlflow_run_run-id\": \"\\\"{run_id}\\\"\",\n  \"alpha\""),
    );
    project.hyperparameters(&resumed);
    std::fs::remove_dir_all(project.model_dir()).unwrap();

    project.smc().args(&["train"]).passes().stdout_has(&format!("trained run {run_id}"));
    assert_eq!(project.runs().len(), 1);
    assert_eq!(project.run_status(&project.runs()[0]), 3);
}

#[test]
fn train_without_submit_directory_uses_code_dir() {
    let project = Project::empty();
    project.file("opt/ml/code/MLproject", MLPROJECT);
    project.file("opt/ml/code/conda.yaml", "name: demo\n");

    project.smc().args(&["train"]).passes();

    let saved = project.model_dir().join("mlflow_run_artifacts");
    assert!(saved.join("model/MLmodel").is_file());
}

#[test]
fn train_honors_base_dir_flag() {
    let project = Project::with_source(HYPERPARAMETERS);
    let base_dir = project.path().join("opt/ml").display().to_string();
    project
        .smc()
        .env("SAGEMAKER_BASE_DIR", "/nonexistent")
        .args(&["train", "--base-dir", &base_dir])
        .passes();
    assert!(project.model_dir().join("mlflow_run_artifacts/model/MLmodel").is_file());
}

#[test]
fn json_log_format_emits_json_lines() {
    let project = Project::with_source(HYPERPARAMETERS);
    let run = project.smc().args(&["--log-format", "json", "train"]).passes();
    let stderr = run.stderr();
    let line = stderr.lines().find(|l| l.contains("training completed")).unwrap();
    let value: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(value["level"], "INFO");
}
