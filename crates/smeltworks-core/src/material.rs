//! Material definitions and runtime units.

use crate::id::{CategoryId, MaterialId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A material definition in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialDef {
    pub name: String,
    pub categories: BTreeSet<CategoryId>,
}

/// A concrete material instance sitting inside a factory or an output queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialUnit {
    pub material: MaterialId,
}

impl MaterialUnit {
    pub fn new(material: MaterialId) -> Self {
        Self { material }
    }
}

impl From<MaterialId> for MaterialUnit {
    fn from(material: MaterialId) -> Self {
        Self { material }
    }
}
