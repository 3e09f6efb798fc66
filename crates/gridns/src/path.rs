// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Grid namespace paths
//!
//! Namespace paths are `/`-separated, always absolute and rooted by zone
//! name (`/<zone>/home/<user>/...`). They never touch the host
//! filesystem, so they are kept as strings rather than `std::path` values.

use crate::error::{Error, Result};

/// Longest path the catalog accepts, in bytes
pub const MAX_PATH_SIZE: usize = 1067;

/// A validated, normalized absolute namespace path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NsPath(String);

impl NsPath {
    #[must_use]
    pub fn root() -> Self {
        NsPath("/".to_string())
    }

    /// Validates and normalizes an absolute path
    ///
    /// Surrounding whitespace, duplicate and trailing slashes and `.`
    /// components are dropped; `..` removes the previous component.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid_argument("path is blank"));
        }
        if !trimmed.starts_with('/') {
            return Err(Error::invalid_argument(format!(
                "path is not absolute: {trimmed}"
            )));
        }
        if trimmed.len() > MAX_PATH_SIZE {
            return Err(Error::invalid_argument(format!(
                "path is longer than {MAX_PATH_SIZE} bytes"
            )));
        }

        let mut components: Vec<&str> = Vec::new();
        for part in trimmed.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    if components.pop().is_none() {
                        return Err(Error::invalid_argument(format!(
                            "path escapes the root: {trimmed}"
                        )));
                    }
                }
                name => components.push(name),
            }
        }

        if components.is_empty() {
            Ok(Self::root())
        } else {
            Ok(NsPath(format!("/{}", components.join("/"))))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|c| !c.is_empty())
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.components().count()
    }

    /// The zone is the first component
    #[must_use]
    pub fn zone(&self) -> Option<&str> {
        self.components().next()
    }

    #[must_use]
    pub fn parent(&self) -> Option<NsPath> {
        if self.is_root() {
            return None;
        }
        Some(NsPath(parent_str(&self.0).to_string()))
    }

    #[must_use]
    pub fn basename(&self) -> Option<&str> {
        if self.is_root() {
            None
        } else {
            Some(basename_str(&self.0))
        }
    }

    /// Appends a single component
    pub fn join(&self, name: &str) -> Result<NsPath> {
        let name = name.trim();
        if name.is_empty() || name == "." || name == ".." || name.contains('/') {
            return Err(Error::invalid_argument(format!(
                "not a single path component: '{name}'"
            )));
        }
        let joined = join_str(&self.0, name);
        if joined.len() > MAX_PATH_SIZE {
            return Err(Error::invalid_argument(format!(
                "path is longer than {MAX_PATH_SIZE} bytes"
            )));
        }
        Ok(NsPath(joined))
    }
}

impl std::fmt::Display for NsPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NsPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Joins a child name onto a raw parent path
#[must_use]
pub fn join_str(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{parent}{name}")
    } else {
        format!("{parent}/{name}")
    }
}

/// Final component of a raw path, or the path itself when it has none
#[must_use]
pub fn basename_str(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Parent of a raw path; `/` for top-level paths, empty for the root
#[must_use]
pub fn parent_str(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) => "/",
        Some(idx) => &trimmed[..idx],
        None => "",
    }
}
