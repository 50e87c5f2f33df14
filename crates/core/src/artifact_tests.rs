// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    triple_slash   = { "file:///opt/ml/mlruns/0/abc/artifacts",       "/opt/ml/mlruns/0/abc/artifacts" },
    with_host      = { "file://localhost/tmp/artifacts",              "/tmp/artifacts" },
    upper_scheme   = { "FILE:///tmp/artifacts",                       "/tmp/artifacts" },
    drops_query    = { "file:///tmp/artifacts?x=1",                   "/tmp/artifacts" },
)]
fn parses_local_uris(uri: &str, expected: &str) {
    let location = ArtifactLocation::parse(uri).unwrap();
    assert_eq!(location.local_path(), std::path::Path::new(expected));
}

#[yare::parameterized(
    s3    = { "s3://bucket/mlflow/0/abc/artifacts", Some("s3") },
    http  = { "http://server/artifacts",            Some("http") },
    dbfs  = { "dbfs:/databricks/mlflow",            None },
    bare  = { "/opt/ml/mlruns/0/abc/artifacts",     None },
)]
fn rejects_non_local_uris(uri: &str, scheme: Option<&str>) {
    let err = ArtifactLocation::parse(uri).unwrap_err();
    assert_eq!(
        err,
        ArtifactLocationError::UnsupportedScheme {
            uri: uri.to_string(),
            scheme: scheme.map(str::to_string),
        }
    );
}

#[test]
fn rejects_file_uri_without_path() {
    let err = ArtifactLocation::parse("file://host").unwrap_err();
    assert!(matches!(err, ArtifactLocationError::EmptyPath(_)));
}
