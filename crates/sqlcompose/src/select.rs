use std::fmt::Write as _;

use crate::column::{ColumnRef, ColumnSpec};
use crate::datatype::{DataType, FieldSpec, ResultShape};
use crate::dependency::DependencySet;
use crate::error::{CteError, Result};
use crate::expr::Expr;
use crate::serializer::{Serialize, SerializerContext};
use crate::statement::Statement;

/// A base table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Table {
    name: String,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Table { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column(&self, name: impl Into<String>, datatype: DataType, nullable: bool) -> ColumnRef {
        ColumnRef::new(
            self.name.clone(),
            ColumnSpec::table_column(name, datatype, nullable),
        )
    }
}

/// An item in a FROM clause.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FromItem {
    Table(String),
    /// Reference to a common table expression by name.
    Cte(String),
}

impl FromItem {
    pub fn name(&self) -> &str {
        match self {
            Self::Table(name) | Self::Cte(name) => name,
        }
    }

    /// A cte reference provides a table like any other, but also requires the
    /// cte to be defined.
    pub fn dependencies(&self) -> DependencySet {
        match self {
            Self::Table(name) => DependencySet::new().with_provided_table(name.clone()),
            Self::Cte(name) => DependencySet::new()
                .with_provided_table(name.clone())
                .with_required_cte(name.clone()),
        }
    }
}

impl Serialize for FromItem {
    fn serialize(&self, ctx: &mut SerializerContext) -> Result<()> {
        ctx.write_ident(self.name())
    }
}

impl From<&Table> for FromItem {
    fn from(value: &Table) -> Self {
        FromItem::Table(value.name.clone())
    }
}

impl From<Table> for FromItem {
    fn from(value: Table) -> Self {
        FromItem::Table(value.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct SelectColumn {
    expr: Expr,
    field: FieldSpec,
    /// Conditionally present column.
    dynamic: bool,
}

/// Minimal SELECT statement.
///
/// Column result types are provided by the caller, the select doesn't try to
/// infer types from expressions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Select {
    distinct: bool,
    columns: Vec<SelectColumn>,
    from: Vec<FromItem>,
    filter: Option<Expr>,
}

impl Select {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Add a column to the select list, aliased to the field name.
    pub fn column(mut self, expr: impl Into<Expr>, field: FieldSpec) -> Self {
        self.columns.push(SelectColumn {
            expr: expr.into(),
            field,
            dynamic: false,
        });
        self
    }

    /// Add a column that's only conditionally present, making the result
    /// shape dynamic.
    pub fn dynamic_column(mut self, expr: impl Into<Expr>, field: FieldSpec) -> Self {
        self.columns.push(SelectColumn {
            expr: expr.into(),
            field,
            dynamic: true,
        });
        self
    }

    pub fn from(mut self, item: impl Into<FromItem>) -> Self {
        self.from.push(item.into());
        self
    }

    /// Set the WHERE clause, AND-ing with any existing filter.
    pub fn filter(mut self, expr: impl Into<Expr>) -> Self {
        let expr = expr.into();
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(expr),
            None => expr,
        });
        self
    }
}

impl Statement for Select {
    fn result_shape(&self) -> Option<ResultShape> {
        let fields = self
            .columns
            .iter()
            .filter(|c| !c.dynamic)
            .map(|c| c.field.clone())
            .collect();

        Some(ResultShape {
            fields,
            dynamic: self.columns.iter().any(|c| c.dynamic),
        })
    }

    fn dependencies(&self) -> DependencySet {
        let mut deps = DependencySet::new();
        for col in &self.columns {
            deps.merge_from(col.expr.dependencies());
        }
        if let Some(filter) = &self.filter {
            deps.merge_from(filter.dependencies());
        }

        let mut from_deps = DependencySet::new();
        for item in &self.from {
            from_deps.merge_from(item.dependencies());
        }

        // Tables provided by FROM satisfy column references, they're not
        // provided to the outside.
        deps.required_tables.retain(|t| !from_deps.provided_tables.contains(t));
        deps.required_ctes.extend(from_deps.required_ctes);

        deps
    }

    fn check_complete(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(CteError::IncompleteStatement(
                "select requires at least one column".to_string(),
            ));
        }
        Ok(())
    }
}

impl Serialize for Select {
    fn serialize(&self, ctx: &mut SerializerContext) -> Result<()> {
        ctx.write_str("SELECT ")?;
        if self.distinct {
            ctx.write_str("DISTINCT ")?;
        }

        for (idx, col) in self.columns.iter().enumerate() {
            if idx > 0 {
                ctx.write_str(", ")?;
            }
            col.expr.serialize(ctx)?;
            ctx.write_str(" AS ")?;
            ctx.write_ident(&col.field.name)?;
        }

        if !self.from.is_empty() {
            ctx.write_str(" FROM ")?;
            for (idx, item) in self.from.iter().enumerate() {
                if idx > 0 {
                    ctx.write_str(", ")?;
                }
                item.serialize(ctx)?;
            }
        }

        if let Some(filter) = &self.filter {
            ctx.write_str(" WHERE ")?;
            filter.serialize(ctx)?;
        }

        Ok(())
    }
}
