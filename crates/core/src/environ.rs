// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process environment transforms for launching training subprocesses.

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};

pub const PATH_VAR: &str = "PATH";

/// Return a copy of `env` with `new_path` placed first on `PATH`.
///
/// All other entries are passed through unchanged. A missing `PATH` becomes
/// just `new_path`.
pub fn prepend_path<I, K, V>(env: I, new_path: &OsStr) -> HashMap<OsString, OsString>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<OsString>,
    V: Into<OsString>,
{
    let mut env: HashMap<OsString, OsString> =
        env.into_iter().map(|(k, v)| (k.into(), v.into())).collect();

    let mut path = new_path.to_os_string();
    if let Some(current) = env.get(OsStr::new(PATH_VAR)) {
        path.push(":");
        path.push(current);
    }
    env.insert(OsString::from(PATH_VAR), path);
    env
}

/// Copy the current process environment and prepend `new_path` to `PATH`.
///
/// The process environment itself is not modified.
pub fn copy_environ_and_prepend_path(new_path: &OsStr) -> HashMap<OsString, OsString> {
    prepend_path(std::env::vars_os(), new_path)
}

#[cfg(test)]
#[path = "environ_tests.rs"]
mod tests;
