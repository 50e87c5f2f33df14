// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    level = { "info" },
    per_crate = { "smc_engine=debug,warn" },
    off = { "off" },
)]
fn accepts_valid_directives(directive: &str) {
    assert!(filter(directive).is_ok());
}

#[test]
fn rejects_bad_level() {
    let err = filter("smc=loud").unwrap_err();
    assert_eq!(err.to_string(), "invalid log filter 'smc=loud'");
}

#[test]
fn second_init_fails() {
    init("warn", LogFormat::Text).unwrap();
    assert!(matches!(init("warn", LogFormat::Json), Err(LoggingError::Init(_))));
}
