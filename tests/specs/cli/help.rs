//! CLI help and usage errors

use crate::prelude::*;

#[test]
fn help_lists_subcommands() {
    cli().args(&["--help"]).passes().stdout_has("Usage:").stdout_has("train").stdout_has("check");
}

#[test]
fn train_help_lists_overrides() {
    cli().args(&["train", "--help"]).passes().stdout_has("--base-dir").stdout_has("--conda-env");
}

#[test]
fn version_includes_build_hash() {
    cli().args(&["--version"]).passes().stdout_has("smc 0.1.0+");
}

#[test]
fn missing_subcommand_is_a_usage_error() {
    cli().fails().exits_with(2).stderr_has("Usage:");
}

#[test]
fn unknown_log_format_is_rejected() {
    cli().args(&["--log-format", "xml", "check"]).fails().exits_with(2).stderr_has("xml");
}
