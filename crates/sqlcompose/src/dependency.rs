use std::collections::BTreeSet;

use crate::expr::Parameter;

/// Tables and CTEs a statement-like entity requires and provides.
///
/// Identifier sets are ordered so that anything derived from them is
/// deterministic regardless of construction order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet {
    pub required_tables: BTreeSet<String>,
    pub provided_tables: BTreeSet<String>,
    pub provided_outer_tables: BTreeSet<String>,
    pub required_ctes: BTreeSet<String>,
    pub provided_ctes: BTreeSet<String>,
    pub extra_tables: BTreeSet<String>,
    /// Parameters in order of appearance.
    pub parameters: Vec<Parameter>,
    pub tags: BTreeSet<String>,
}

impl DependencySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_required_table(mut self, table: impl Into<String>) -> Self {
        self.required_tables.insert(table.into());
        self
    }

    pub fn with_provided_table(mut self, table: impl Into<String>) -> Self {
        self.provided_tables.insert(table.into());
        self
    }

    pub fn with_required_cte(mut self, cte: impl Into<String>) -> Self {
        self.required_ctes.insert(cte.into());
        self
    }

    pub fn with_provided_cte(mut self, cte: impl Into<String>) -> Self {
        self.provided_ctes.insert(cte.into());
        self
    }

    pub fn with_parameter(mut self, param: Parameter) -> Self {
        self.parameters.push(param);
        self
    }

    /// Union every identifier set, appending `other`'s parameters after ours.
    pub fn merge(mut self, other: DependencySet) -> Self {
        self.merge_from(other);
        self
    }

    pub fn merge_from(&mut self, other: DependencySet) {
        self.required_tables.extend(other.required_tables);
        self.provided_tables.extend(other.provided_tables);
        self.provided_outer_tables.extend(other.provided_outer_tables);
        self.required_ctes.extend(other.required_ctes);
        self.provided_ctes.extend(other.provided_ctes);
        self.extra_tables.extend(other.extra_tables);
        self.parameters.extend(other.parameters);
        self.tags.extend(other.tags);
    }

    pub fn requires_table(&self, name: &str) -> bool {
        self.required_tables.contains(name)
    }

    pub fn provides_table(&self, name: &str) -> bool {
        self.provided_tables.contains(name)
    }

    pub fn requires_cte(&self, name: &str) -> bool {
        self.required_ctes.contains(name)
    }

    pub fn provides_cte(&self, name: &str) -> bool {
        self.provided_ctes.contains(name)
    }
}
