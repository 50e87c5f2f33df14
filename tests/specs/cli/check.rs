//! `smc check` against the stub conda

use crate::prelude::*;

#[test]
fn check_passes_with_complete_env() {
    let project = Project::empty();
    project
        .smc()
        .args(&["check"])
        .passes()
        .stderr_has("OK - conda binary found")
        .stderr_has("OK - conda env to run mlflow training found")
        .stderr_has("OK - mlflow binary found");

    assert_eq!(
        project.conda_calls(),
        vec!["--version", "run -n training conda info", "run -n training mlflow --version"]
    );
}

#[test]
fn check_uses_env_override() {
    let project = Project::empty();
    project.smc().env("CONDA_TRAINING_ENV", "py37").args(&["check"]).passes();
    assert!(project.conda_calls().contains(&"run -n py37 conda info".to_string()));

    let project = Project::empty();
    project.smc().args(&["check", "--conda-env", "py38"]).passes();
    assert!(project.conda_calls().contains(&"run -n py38 mlflow --version".to_string()));
}

#[test]
fn check_fails_without_conda() {
    let project = Project::empty();
    project
        .smc()
        .env("SMC_CONDA_BIN", &project.path().join("bin/missing-conda").display().to_string())
        .args(&["check"])
        .fails()
        .exits_with(1)
        .stderr_has("conda is not installed");
}

#[test]
fn check_fails_when_env_is_missing() {
    let project = Project::empty();
    project
        .smc()
        .env("SMC_STUB_NO_ENV", "1")
        .args(&["check"])
        .fails()
        .exits_with(1)
        .stderr_has("conda env 'training' is not created");
}

#[test]
fn check_fails_when_mlflow_is_missing() {
    let project = Project::empty();
    project
        .smc()
        .env("SMC_STUB_NO_MLFLOW", "1")
        .args(&["check"])
        .fails()
        .exits_with(1)
        .stderr_has("mlflow is not installed in conda env 'training'");
}
