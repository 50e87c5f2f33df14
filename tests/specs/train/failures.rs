use crate::prelude::*;

const HYPERPARAMETERS: &str = r#"{"sagemaker_submit_directory": "\"file://${source}\"", "alpha": "0.5"}"#;

#[test]
fn missing_env_stops_before_sync() {
    let project = Project::with_source(HYPERPARAMETERS);
    project
        .smc()
        .env("SMC_STUB_NO_ENV", "1")
        .args(&["train"])
        .fails()
        .exits_with(1)
        .stderr_has("training failed")
        .stderr_has("is not created");

    assert!(!project.conda_calls().iter().any(|c| c.starts_with("env update")));
    assert!(project.runs().is_empty());
}

#[test]
fn missing_mlproject_is_reported() {
    let project = Project::empty();
    project.file("source/train.py", "print('training')\n");
    project.hyperparameters(HYPERPARAMETERS);

    project.smc().args(&["train"]).fails().exits_with(1).stderr_has("can't find MLproject file");
    assert!(project.runs().is_empty());
}

#[test]
fn missing_code_location_is_reported() {
    let project = Project::empty();
    project.hyperparameters(HYPERPARAMETERS);
    project.smc().args(&["train"]).fails().exits_with(1).stderr_has("code download failed");
}

#[test]
fn failed_training_marks_run_failed() {
    let project = Project::with_source(HYPERPARAMETERS);
    project
        .smc()
        .env("SMC_STUB_TRAIN_FAILS", "1")
        .args(&["train"])
        .fails()
        .exits_with(1)
        .stdout_has("Traceback: training crashed")
        .stderr_has("mlflow run");

    let runs = project.runs();
    assert_eq!(runs.len(), 1);
    assert_eq!(project.run_status(&runs[0]), 4);
    assert!(!project.model_dir().join("mlflow_run_artifacts").exists());
}

#[test]
fn unsupported_tracking_uri_is_rejected() {
    let project = Project::with_source(HYPERPARAMETERS);
    project
        .smc()
        .env("MLFLOW_TRACKING_URI", "sqlite:///mlflow.db")
        .args(&["train"])
        .fails()
        .exits_with(1)
        .stderr_has("unsupported tracking uri");
    assert!(project.conda_calls().is_empty());
}

#[test]
fn invalid_hyperparameters_file_is_reported() {
    let project = Project::empty();
    project.file("opt/ml/input/config/hyperparameters.json", "{not json");
    project.smc().args(&["train"]).fails().exits_with(1).stderr_has("hyperparameters");
}

#[test]
fn existing_artifact_dir_is_not_overwritten() {
    let project = Project::with_source(HYPERPARAMETERS);
    project.file("opt/ml/model/mlflow_run_artifacts/keep.txt", "old");

    project.smc().args(&["train"]).fails().exits_with(1).stderr_has("already exists");
    let kept = project.model_dir().join("mlflow_run_artifacts/keep.txt");
    assert_eq!(std::fs::read_to_string(kept).unwrap(), "old");
}
