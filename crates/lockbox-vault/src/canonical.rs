// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping of user-typed site names to vault lookup keys.
//!
//! The rule is a label-count heuristic, not a public-suffix lookup:
//!
//! | labels | key              | display            |
//! |--------|------------------|--------------------|
//! | 1      | the label        | label + `.com`     |
//! | 2      | first label      | unchanged          |
//! | 3      | middle label     | unchanged          |
//! | 4+     | label at index 2 | unchanged          |
//!
//! `www.example.co.uk` therefore keys on `co`, not `example`.

/// The canonical lookup key and display form of a site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteKey {
    pub key: String,
    pub display: String,
}

/// Canonicalize a raw site string. Pure and deterministic.
pub fn canonicalize(raw_site: &str) -> SiteKey {
    let labels: Vec<&str> = raw_site.split('.').collect();

    let (key, display) = match labels.as_slice() {
        [only] => (*only, format!("{raw_site}.com")),
        [first, _] => (*first, raw_site.to_string()),
        [_, middle, _] => (*middle, raw_site.to_string()),
        [_, _, third, ..] => (*third, raw_site.to_string()),
        // `str::split` always yields at least one item.
        [] => (raw_site, raw_site.to_string()),
    };

    SiteKey {
        key: key.to_string(),
        display,
    }
}
