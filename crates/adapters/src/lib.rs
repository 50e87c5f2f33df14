// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for external I/O

pub mod conda;
pub mod fetch;
pub mod fs;
pub mod subprocess;
pub mod tracking;

pub use conda::{CondaAdapter, CondaCli, CondaError};
pub use fetch::{CodeFetcher, CodeSource, FetchError, ShellCodeFetcher};
pub use fs::{copy_tree, CopyError};
pub use subprocess::SubprocessError;
pub use tracking::{
    tracking_store, FileStore, RestAuth, RestStore, RunInfo, RunStatus, TrackingAdapter, TrackingConfig,
    TrackingError, TrackingStore,
};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use conda::{CondaCall, CondaOp, FakeCondaAdapter};
#[cfg(any(test, feature = "test-support"))]
pub use fetch::{FakeCodeFetcher, FetchCall};
#[cfg(any(test, feature = "test-support"))]
pub use tracking::{FakeTrackingAdapter, TrackingCall};
