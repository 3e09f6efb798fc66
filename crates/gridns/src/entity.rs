// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// Kind of object a namespace path names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    /// A directory-like container
    Collection,
    /// A file-like leaf
    DataObject,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Collection => "collection",
            EntityKind::DataObject => "data-object",
        }
    }

    #[must_use]
    pub fn is_collection(&self) -> bool {
        matches!(self, EntityKind::Collection)
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "collection" => Ok(EntityKind::Collection),
            "data-object" => Ok(EntityKind::DataObject),
            other => Err(format!("Unknown entity kind: {}", other)),
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_strings() {
        for kind in [EntityKind::Collection, EntityKind::DataObject] {
            assert_eq!(kind.as_str().parse::<EntityKind>().unwrap(), kind);
        }
        assert!("symlink".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_entity_kind_serde_matches_display() {
        let json = serde_json::to_string(&EntityKind::DataObject).unwrap();
        assert_eq!(json, "\"data-object\"");
        assert_eq!(EntityKind::DataObject.to_string(), "data-object");
    }
}
