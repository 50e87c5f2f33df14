// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::params::{ParamValue, Params};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for parameter mappings.
pub mod strategies {
    use crate::params::{ParamValue, Params};
    use crate::settings::RUN_PARAMS_PREFIX;
    use proptest::prelude::*;

    pub fn arb_param_value() -> impl Strategy<Value = ParamValue> {
        prop_oneof![
            1 => Just(ParamValue::Flag),
            4 => "[a-zA-Z0-9._/-]{0,12}".prop_map(ParamValue::Value),
        ]
    }

    /// Keys with and without the run-control prefix, in arbitrary order.
    pub fn arb_param_key() -> impl Strategy<Value = String> {
        ("[a-z][a-z0-9_-]{0,10}", any::<bool>()).prop_map(|(name, prefixed)| {
            if prefixed {
                format!("{RUN_PARAMS_PREFIX}{name}")
            } else {
                name
            }
        })
    }

    pub fn arb_params() -> impl Strategy<Value = Params> {
        prop::collection::vec((arb_param_key(), arb_param_value()), 0..8)
            .prop_map(|pairs| pairs.into_iter().collect())
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────

/// Build a [`Params`] mapping from string pairs; `None` values become flags.
pub fn params(pairs: &[(&str, Option<&str>)]) -> Params {
    pairs.iter().map(|(k, v)| (k.to_string(), ParamValue::from(*v))).collect()
}

