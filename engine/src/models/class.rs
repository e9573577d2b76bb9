//! Class/struct/interface record (`spec.md` §4.2, "Class shape").

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassRecord {
    pub file: PathBuf,
    pub name: String,
    pub line_start: u32,
    pub line_end: u32,
    pub methods: Vec<String>,
    pub fields: BTreeSet<String>,
    /// Base-class names in declaration order (extends/implements clauses).
    pub bases: Vec<String>,
    /// Distinct type names referenced by the class body, for CBO.
    pub referenced_types: BTreeSet<String>,
    /// Per-method field-access set, for LCOM.
    pub method_field_accesses: BTreeMap<String, BTreeSet<String>>,
}

impl ClassRecord {
    pub fn scope_id(&self) -> String {
        format!("{}:{}", self.file.display(), self.name)
    }
}
