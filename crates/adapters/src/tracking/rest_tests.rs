// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve one canned response per connection; returns the raw requests seen.
async fn serve(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        let mut requests = Vec::new();
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            requests.push(read_request(&mut socket).await);
            let response = format!(
                "HTTP/1.1 {status} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        }
        requests
    });
    (url, handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = socket.read(&mut buf).await.unwrap();
        data.extend_from_slice(&buf[..n]);
        let text = String::from_utf8_lossy(&data).to_string();
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .find_map(|l| l.to_ascii_lowercase().strip_prefix("content-length:").map(|v| v.trim().to_string()))
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(0);
            if data.len() >= end + 4 + length {
                return text;
            }
        }
        if n == 0 {
            return String::from_utf8_lossy(&data).to_string();
        }
    }
}

const RUN: &str = r#"{"run": {"info": {"run_id": "abc123", "run_uuid": "abc123", "experiment_id": "0", "user_id": "sagemaker", "status": "RUNNING", "start_time": 1, "artifact_uri": "s3://bucket/0/abc123/artifacts", "lifecycle_stage": "active"}, "data": {}}}"#;

#[tokio::test]
async fn create_run_posts_experiment_and_user() {
    let (url, server) = serve(vec![(200, RUN)]).await;
    let store = RestStore::new(&url, "5", "sagemaker", RestAuth::Bearer("secret".into())).unwrap();

    let info = store.start_run(None).await.unwrap();

    assert_eq!(info.run_id, "abc123");
    assert_eq!(info.status, RunStatus::Running);
    assert_eq!(info.artifact_uri, "s3://bucket/0/abc123/artifacts");
    let requests = server.await.unwrap();
    assert!(requests[0].starts_with("POST /api/2.0/mlflow/runs/create "));
    assert!(requests[0].to_ascii_lowercase().contains("authorization: bearer secret"));
    assert!(requests[0].contains(r#""experiment_id":"5""#));
    assert!(requests[0].contains(r#""user_id":"sagemaker""#));
}

#[tokio::test]
async fn resume_updates_status_then_fetches_run() {
    let (url, server) = serve(vec![(200, "{}"), (200, RUN)]).await;
    let store = RestStore::new(&url, "0", "sagemaker", RestAuth::None).unwrap();

    let info = store.start_run(Some("abc123")).await.unwrap();

    assert_eq!(info.run_id, "abc123");
    let requests = server.await.unwrap();
    assert!(requests[0].starts_with("POST /api/2.0/mlflow/runs/update "));
    assert!(requests[0].contains(r#""status":"RUNNING""#));
    assert!(!requests[0].contains("end_time"));
    assert!(requests[1].starts_with("GET /api/2.0/mlflow/runs/get?run_id=abc123 "));
}

#[tokio::test]
async fn end_run_sends_terminal_status() {
    let (url, server) = serve(vec![(200, "{}")]).await;
    let store = RestStore::new(&format!("{url}/"), "0", "sagemaker", RestAuth::None).unwrap();

    store.end_run("abc123", RunStatus::Failed).await.unwrap();

    let requests = server.await.unwrap();
    assert!(requests[0].starts_with("POST /api/2.0/mlflow/runs/update "));
    assert!(requests[0].contains(r#""status":"FAILED""#));
    assert!(requests[0].contains("end_time"));
}

#[tokio::test]
async fn missing_run_maps_to_not_found() {
    let body = r#"{"error_code": "RESOURCE_DOES_NOT_EXIST", "message": "Run 'nope' not found"}"#;
    let (url, _server) = serve(vec![(404, body)]).await;
    let store = RestStore::new(&url, "0", "sagemaker", RestAuth::None).unwrap();

    let err = store.get_run("nope").await.unwrap_err();
    assert!(matches!(err, TrackingError::RunNotFound(id) if id == "nope"));
}

#[tokio::test]
async fn server_errors_keep_status_and_body() {
    let (url, _server) = serve(vec![(500, r#"{"error_code": "INTERNAL_ERROR"}"#)]).await;
    let store = RestStore::new(&url, "0", "sagemaker", RestAuth::None).unwrap();

    let err = store.start_run(None).await.unwrap_err();
    match err {
        TrackingError::Api { status, message } => {
            assert_eq!(status, 500);
            assert!(message.contains("INTERNAL_ERROR"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}
