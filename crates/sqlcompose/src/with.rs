use std::collections::BTreeSet;
use std::fmt::{Debug, Write as _};

use tracing::{debug, trace};

use crate::cte::{Cte, CteRenderMode};
use crate::datatype::ResultShape;
use crate::dependency::DependencySet;
use crate::error::{CteError, Result};
use crate::serializer::{Serialize, SerializerContext};
use crate::statement::Statement;

/// Type-erased cte for storing ctes with different bodies in the same WITH
/// clause.
pub trait CommonTableExpr: Debug {
    fn alias(&self) -> &str;

    /// Dependencies when used as a table.
    fn dependencies(&self) -> DependencySet;

    fn is_recursive(&self) -> bool;

    fn serialize_definition(&self, ctx: &mut SerializerContext) -> Result<()>;
}

impl<S: Statement> CommonTableExpr for Cte<S> {
    fn alias(&self) -> &str {
        Cte::alias(self)
    }

    fn dependencies(&self) -> DependencySet {
        Cte::dependencies(self)
    }

    fn is_recursive(&self) -> bool {
        Cte::is_recursive(self)
    }

    fn serialize_definition(&self, ctx: &mut SerializerContext) -> Result<()> {
        self.serialize_with_mode(CteRenderMode::Definition, ctx)
    }
}

/// `WITH [RECURSIVE] <cte>, <cte>, ...`
///
/// Ctes may only reference themselves or ctes defined before them.
#[derive(Debug, Default)]
pub struct With {
    ctes: Vec<Box<dyn CommonTableExpr>>,
}

impl With {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cte<C>(mut self, cte: C) -> Result<Self>
    where
        C: CommonTableExpr + 'static,
    {
        let alias = cte.alias().to_string();
        let provided = self.provided_ctes();
        if provided.contains(&alias) {
            debug!(cte = %alias, "rejected duplicate cte");
            return Err(CteError::DuplicateCte(alias));
        }

        let missing: Vec<_> = cte
            .dependencies()
            .required_ctes
            .into_iter()
            .filter(|name| name != &alias && !provided.contains(name))
            .collect();
        if !missing.is_empty() {
            debug!(cte = %alias, ?missing, "rejected cte with undefined dependencies");
            return Err(CteError::UnknownCteReferenced {
                cte: alias,
                missing,
            });
        }

        trace!(cte = %alias, position = self.ctes.len(), "added cte to with clause");
        self.ctes.push(Box::new(cte));

        Ok(self)
    }

    /// Attach the main query.
    pub fn statement<S: Statement>(self, statement: S) -> WithStatement<S> {
        WithStatement {
            with: self,
            statement,
        }
    }

    pub fn is_recursive(&self) -> bool {
        self.ctes.iter().any(|c| c.is_recursive())
    }

    pub fn provided_ctes(&self) -> BTreeSet<String> {
        self.ctes.iter().map(|c| c.alias().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.ctes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ctes.is_empty()
    }
}

impl Serialize for With {
    fn serialize(&self, ctx: &mut SerializerContext) -> Result<()> {
        if self.ctes.is_empty() {
            return Ok(());
        }

        ctx.write_str("WITH ")?;
        if self.is_recursive() {
            ctx.write_str("RECURSIVE ")?;
        }
        for (idx, cte) in self.ctes.iter().enumerate() {
            if idx > 0 {
                ctx.write_str(", ")?;
            }
            cte.serialize_definition(ctx)?;
        }

        Ok(())
    }
}

/// A statement preceded by a WITH clause.
#[derive(Debug)]
pub struct WithStatement<S> {
    with: With,
    statement: S,
}

impl<S> WithStatement<S> {
    pub fn with(&self) -> &With {
        &self.with
    }

    pub fn statement(&self) -> &S {
        &self.statement
    }
}

impl<S: Statement> Statement for WithStatement<S> {
    fn result_shape(&self) -> Option<ResultShape> {
        self.statement.result_shape()
    }

    fn dependencies(&self) -> DependencySet {
        let provided = self.with.provided_ctes();

        // Parameters in render order, definitions first.
        let mut deps = DependencySet::new();
        for cte in &self.with.ctes {
            let cte_deps = cte.dependencies();
            deps.required_ctes.extend(cte_deps.required_ctes);
            deps.parameters.extend(cte_deps.parameters);
        }
        deps.merge_from(self.statement.dependencies());

        deps.required_ctes.retain(|c| !provided.contains(c));
        deps.provided_ctes.extend(provided);

        deps
    }

    fn check_complete(&self) -> Result<()> {
        self.statement.check_complete()
    }
}

impl<S: Statement> Serialize for WithStatement<S> {
    fn serialize(&self, ctx: &mut SerializerContext) -> Result<()> {
        if !self.with.is_empty() {
            self.with.serialize(ctx)?;
            ctx.write_char(' ')?;
        }
        self.statement.serialize(ctx)
    }
}
