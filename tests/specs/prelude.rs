//! Shared helpers for specs.

#![allow(dead_code)]

pub use std::path::{Path, PathBuf};

use std::os::unix::fs::PermissionsExt;
use std::process::Output;
use tempfile::TempDir;

/// Stub `conda` standing in for a container image with a `training` env.
///
/// Every invocation is appended to `$SMC_STUB_LOG`. `mlflow run` writes a
/// model into the file store run named by `--run-id`. Knobs:
/// `SMC_STUB_NO_ENV`, `SMC_STUB_NO_MLFLOW`, `SMC_STUB_TRAIN_FAILS`.
const CONDA_STUB: &str = r#"#!/bin/sh
echo "$*" >> "$SMC_STUB_LOG"
case "$1" in
  --version)
    echo "conda 4.8.3"
    exit 0
    ;;
  env)
    if [ ! -f "$6" ]; then
      echo "EnvironmentFileNotFound: '$6' file not found" >&2
      exit 1
    fi
    exit 0
    ;;
  run)
    if [ -n "$SMC_STUB_NO_ENV" ]; then
      echo "EnvironmentLocationNotFound: Not a conda environment: $3" >&2
      exit 1
    fi
    shift 3
    case "$1 $2" in
      "conda info")
        if [ "$3" = "--json" ]; then
          echo '{"active_prefix": "/stub/envs/training", "conda_version": "4.8.3"}'
        fi
        exit 0
        ;;
      "mlflow --version")
        if [ -n "$SMC_STUB_NO_MLFLOW" ]; then
          echo "mlflow: command not found" >&2
          exit 127
        fi
        echo "mlflow, version 1.7.0"
        exit 0
        ;;
      "mlflow run")
        echo "PATH=$PATH"
        if [ -n "$SMC_STUB_TRAIN_FAILS" ]; then
          echo "Traceback: training crashed" >&2
          exit 1
        fi
        run_id=""
        prev=""
        for arg in "$@"; do
          if [ "$prev" = "--run-id" ]; then run_id="$arg"; fi
          prev="$arg"
        done
        model="$SMC_STUB_MLRUNS/0/$run_id/artifacts/model"
        mkdir -p "$model"
        echo "artifact_path: model" > "$model/MLmodel"
        echo "pickle" > "$model/model.pkl"
        echo "trained run $run_id"
        exit 0
        ;;
    esac
    ;;
esac
echo "unexpected conda call: $*" >&2
exit 1
"#;

pub const MLPROJECT: &str = "name: demo\nconda_env: conda.yaml\nentry_points:\n  main:\n    parameters:\n      alpha: {type: float, default: 0.1}\n    command: python train.py {alpha}\n";

/// A temp dir laid out like a training container
pub struct Project {
    dir: TempDir,
}

impl Project {
    /// Container with the stub `conda` and nothing else
    pub fn empty() -> Self {
        let project = Self { dir: TempDir::new().unwrap() };
        project.executable("bin/conda", CONDA_STUB);
        project
    }

    /// Container whose job points at a complete MLflow project in `source/`
    pub fn with_source(hyperparameters: &str) -> Self {
        let project = Self::empty();
        project.file("source/MLproject", MLPROJECT);
        project.file("source/conda.yaml", "name: demo\ndependencies:\n  - python=3.7\n");
        project.file("source/train.py", "print('training')\n");
        project.hyperparameters(hyperparameters);
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, rel: &str, contents: &str) {
        let path = self.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    pub fn executable(&self, rel: &str, contents: &str) {
        self.file(rel, contents);
        let path = self.path().join(rel);
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    /// Write `hyperparameters.json`; `${source}` expands to the source dir.
    pub fn hyperparameters(&self, json: &str) {
        let json = json.replace("${source}", &self.path().join("source").display().to_string());
        self.file("opt/ml/input/config/hyperparameters.json", &json);
    }

    pub fn code_dir(&self) -> PathBuf {
        self.path().join("opt/ml/code")
    }

    pub fn model_dir(&self) -> PathBuf {
        self.path().join("opt/ml/model")
    }

    pub fn mlruns(&self) -> PathBuf {
        self.path().join("mlruns")
    }

    /// Conda invocations seen by the stub, one per line
    pub fn conda_calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.path().join("conda.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Run directories in the default experiment
    pub fn runs(&self) -> Vec<PathBuf> {
        let Ok(entries) = std::fs::read_dir(self.mlruns().join("0")) else {
            return Vec::new();
        };
        entries.flatten().map(|e| e.path()).filter(|p| p.is_dir()).collect()
    }

    /// `status` field of a run's `meta.yaml`
    pub fn run_status(&self, run_dir: &Path) -> i64 {
        let meta = std::fs::read_to_string(run_dir.join("meta.yaml")).unwrap();
        let meta: serde_yaml::Value = serde_yaml::from_str(&meta).unwrap();
        meta["status"].as_i64().unwrap()
    }

    /// `smc` configured for this container
    pub fn smc(&self) -> CliBuilder {
        let path = std::env::var("PATH").unwrap_or_default();
        cli()
            .env("PATH", &format!("{}:{}", self.path().join("bin").display(), path))
            .env("SAGEMAKER_BASE_DIR", &self.path().join("opt/ml").display().to_string())
            .env("MLFLOW_TRACKING_URI", &format!("file://{}", self.mlruns().display()))
            .env("SMC_STUB_LOG", &self.path().join("conda.log").display().to_string())
            .env("SMC_STUB_MLRUNS", &self.mlruns().display().to_string())
            .current_dir(self.path())
    }
}

pub fn cli() -> CliBuilder {
    let mut cmd = assert_cmd::Command::cargo_bin("smc").unwrap();
    for var in [
        "CONDA_TRAINING_ENV",
        "SMC_CONDA_BIN",
        "MLFLOW_TRACKING_URI",
        "MLFLOW_EXPERIMENT_ID",
        "MLFLOW_TRACKING_TOKEN",
        "SMC_STUB_NO_ENV",
        "SMC_STUB_NO_MLFLOW",
        "SMC_STUB_TRAIN_FAILS",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("SMC_LOG", "info");
    CliBuilder { cmd }
}

pub struct CliBuilder {
    cmd: assert_cmd::Command,
}

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.cmd.current_dir(dir);
        self
    }

    fn output(mut self) -> Output {
        self.cmd.output().unwrap()
    }

    /// Run and require exit code 0
    pub fn passes(self) -> RunAssert {
        let output = self.output();
        let run = RunAssert { output };
        assert!(run.output.status.success(), "expected success, got {}\n{}", run.output.status, run.describe());
        run
    }

    /// Run and require a non-zero exit code
    pub fn fails(self) -> RunAssert {
        let output = self.output();
        let run = RunAssert { output };
        assert!(!run.output.status.success(), "expected failure\n{}", run.describe());
        run
    }
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    fn describe(&self) -> String {
        format!("--- stdout ---\n{}\n--- stderr ---\n{}", self.stdout(), self.stderr())
    }

    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn code(&self) -> Option<i32> {
        self.output.status.code()
    }

    pub fn exits_with(self, code: i32) -> Self {
        assert_eq!(self.code(), Some(code), "{}", self.describe());
        self
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout().contains(needle), "stdout missing {needle:?}\n{}", self.describe());
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr().contains(needle), "stderr missing {needle:?}\n{}", self.describe());
        self
    }
}
