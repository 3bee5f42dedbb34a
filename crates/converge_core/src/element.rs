//! Element and asset identity
//!
//! Elements are addressed by string ids chosen by the host (the same ids its
//! render tree uses). Assets are opaque references the core never inspects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifier of a visual element in the host render tree
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(Arc<str>);

impl ElementId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

/// Opaque reference to an image/icon, e.g. a URL or bundle path
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRef(Arc<str>);

impl AssetRef {
    pub fn new(reference: impl AsRef<str>) -> Self {
        Self(Arc::from(reference.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetRef {
    fn from(reference: &str) -> Self {
        Self::new(reference)
    }
}

impl From<String> for AssetRef {
    fn from(reference: String) -> Self {
        Self(Arc::from(reference))
    }
}
