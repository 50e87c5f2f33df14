// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! MLflow tracking server client (REST API 2.0).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use smc_core::{Clock, SystemClock};

use super::{RunInfo, RunStatus, TrackingAdapter, TrackingError};

/// Credentials sent to the tracking server
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RestAuth {
    #[default]
    None,
    /// `MLFLOW_TRACKING_TOKEN`
    Bearer(String),
    /// `MLFLOW_TRACKING_USERNAME` / `MLFLOW_TRACKING_PASSWORD`
    Basic { username: String, password: Option<String> },
}

#[derive(Serialize)]
struct RunTag<'a> {
    key: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct CreateRun<'a> {
    experiment_id: &'a str,
    user_id: &'a str,
    start_time: u64,
    tags: Vec<RunTag<'a>>,
}

#[derive(Serialize)]
struct UpdateRun<'a> {
    run_id: &'a str,
    status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_time: Option<u64>,
}

#[derive(Deserialize)]
struct RunResponse {
    run: Run,
}

#[derive(Deserialize)]
struct Run {
    info: RunInfo,
}

/// Tracking adapter for a remote MLflow tracking server
#[derive(Debug, Clone)]
pub struct RestStore {
    base_url: String,
    experiment_id: String,
    user: String,
    auth: RestAuth,
    client: reqwest::Client,
}

impl RestStore {
    pub fn new(
        base_url: &str,
        experiment_id: impl Into<String>,
        user: impl Into<String>,
        auth: RestAuth,
    ) -> Result<Self, TrackingError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            experiment_id: experiment_id.into(),
            user: user.into(),
            auth,
            client,
        })
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/api/2.0/mlflow/{method}", self.base_url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            RestAuth::None => request,
            RestAuth::Bearer(token) => request.bearer_auth(token),
            RestAuth::Basic { username, password } => request.basic_auth(username, password.as_ref()),
        }
    }

    async fn send<T: for<'de> Deserialize<'de>>(
        &self,
        run_id: Option<&str>,
        request: reqwest::RequestBuilder,
    ) -> Result<T, TrackingError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let message = response.text().await.unwrap_or_default();
        match run_id {
            Some(id) if status == reqwest::StatusCode::NOT_FOUND || message.contains("RESOURCE_DOES_NOT_EXIST") => {
                Err(TrackingError::RunNotFound(id.to_string()))
            }
            _ => Err(TrackingError::Api { status: status.as_u16(), message }),
        }
    }

    async fn update(&self, run_id: &str, status: RunStatus, end_time: Option<u64>) -> Result<(), TrackingError> {
        let body = UpdateRun { run_id, status, end_time };
        let _: serde_json::Value =
            self.send(Some(run_id), self.client.post(self.endpoint("runs/update")).json(&body)).await?;
        Ok(())
    }
}

#[async_trait]
impl TrackingAdapter for RestStore {
    async fn start_run(&self, run_id: Option<&str>) -> Result<RunInfo, TrackingError> {
        if let Some(id) = run_id {
            self.update(id, RunStatus::Running, None).await?;
            tracing::info!(run_id = %id, "resumed run");
            return self.get_run(id).await;
        }

        let body = CreateRun {
            experiment_id: &self.experiment_id,
            user_id: &self.user,
            start_time: SystemClock.epoch_ms(),
            tags: vec![RunTag { key: "mlflow.user", value: &self.user }],
        };
        let response: RunResponse =
            self.send(None, self.client.post(self.endpoint("runs/create")).json(&body)).await?;
        tracing::info!(run_id = %response.run.info.run_id, "created run");
        Ok(response.run.info)
    }

    async fn end_run(&self, run_id: &str, status: RunStatus) -> Result<(), TrackingError> {
        self.update(run_id, status, Some(SystemClock.epoch_ms())).await
    }

    async fn get_run(&self, run_id: &str) -> Result<RunInfo, TrackingError> {
        let request = self.client.get(self.endpoint("runs/get")).query(&[("run_id", run_id)]);
        let response: RunResponse = self.send(Some(run_id), request).await?;
        Ok(response.run.info)
    }
}

#[cfg(test)]
#[path = "rest_tests.rs"]
mod tests;
