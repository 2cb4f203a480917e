//! Common table expressions.
//!
//! A cte starts out as a name ([`PreCte`]) which is then bound to an anchor
//! statement. Further branches can be added with `union_all` and
//! `union_distinct`, and these branches may reference the cte itself, making
//! it recursive.
//!
//! ```text
//! cte("cnt")                           -> PreCte
//!   .define(SELECT 1 AS n)?            -> Cte<Select>
//!   .union_all(SELECT n+1 AS n ...)?   -> Cte<Union<Select, Select>>
//! ```
//!
//! Every step returns a new value, previous values are left untouched.

use std::fmt::Write as _;

use tracing::{debug, trace};

use crate::column::{ColumnRef, ColumnSpec};
use crate::datatype::ResultShape;
use crate::dependency::DependencySet;
use crate::error::Result;
use crate::select::FromItem;
use crate::serializer::{Serialize, SerializerContext};
use crate::statement::Statement;
use crate::union::{Union, UnionFlag};
use crate::validate::{validate_anchor, validate_branch};

/// Start building a cte with the given name.
pub fn cte(alias: impl Into<String>) -> PreCte {
    PreCte {
        alias: alias.into(),
    }
}

/// How a cte is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CteRenderMode {
    /// `alias AS (body)`, only inside a WITH clause.
    Definition,
    /// Bare `alias`, everywhere else.
    Reference,
}

/// A cte name without a body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreCte {
    alias: String,
}

impl PreCte {
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Bind the anchor statement, producing a cte.
    ///
    /// The anchor must not reference unknown tables or the cte itself, and
    /// must produce a fixed set of columns.
    pub fn define<S: Statement>(&self, statement: S) -> Result<Cte<S>> {
        let shape = validate_anchor(&statement, &self.alias).inspect_err(|error| {
            debug!(cte = %self.alias, %error, "rejected cte anchor");
        })?;

        let columns: Vec<_> = shape.fields.iter().map(ColumnSpec::from_field).collect();
        trace!(cte = %self.alias, columns = columns.len(), "bound cte anchor");

        Ok(Cte {
            alias: self.alias.clone(),
            statement,
            columns,
        })
    }

    pub fn dependencies(&self) -> DependencySet {
        DependencySet::new()
            .with_required_cte(self.alias.clone())
            .with_provided_table(self.alias.clone())
    }
}

/// Without a body the only thing that can be written is the name.
impl Serialize for PreCte {
    fn serialize(&self, ctx: &mut SerializerContext) -> Result<()> {
        ctx.write_ident(&self.alias)
    }
}

impl From<&PreCte> for FromItem {
    fn from(value: &PreCte) -> Self {
        FromItem::Cte(value.alias.clone())
    }
}

/// A named, possibly recursive, sub-query.
#[derive(Debug, Clone, PartialEq)]
pub struct Cte<S> {
    alias: String,
    statement: S,
    columns: Vec<ColumnSpec>,
}

impl<S> Cte<S> {
    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn statement(&self) -> &S {
        &self.statement
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Get a reference to one of the cte's columns for use in expressions.
    pub fn column(&self, name: &str) -> Option<ColumnRef> {
        self.columns
            .iter()
            .find(|c| c.name() == name)
            .map(|c| ColumnRef::new(self.alias.clone(), c.clone()))
    }

    pub fn shape(&self) -> ResultShape {
        ResultShape::fixed(self.columns.iter().map(|c| c.to_field()))
    }

    /// Wrapper rendering this cte in definition mode.
    pub fn definition(&self) -> CteDefinition<'_, S> {
        CteDefinition(self)
    }
}

impl<S: Statement> Cte<S> {
    /// Dependencies of the cte when used as a table.
    ///
    /// The cte provides exactly one table, its alias. It requires whatever
    /// ctes its body requires, plus itself.
    pub fn dependencies(&self) -> DependencySet {
        let body = self.statement.dependencies();
        DependencySet {
            required_ctes: body.required_ctes,
            parameters: body.parameters,
            ..Default::default()
        }
        .with_required_cte(self.alias.clone())
        .with_provided_table(self.alias.clone())
    }

    /// If any branch of the body references this cte.
    pub fn is_recursive(&self) -> bool {
        self.statement.dependencies().requires_cte(&self.alias)
    }

    pub fn serialize_with_mode(
        &self,
        mode: CteRenderMode,
        ctx: &mut SerializerContext,
    ) -> Result<()> {
        match mode {
            CteRenderMode::Reference => ctx.write_ident(&self.alias),
            CteRenderMode::Definition => {
                ctx.write_ident(&self.alias)?;
                ctx.write_str(" AS (")?;
                self.statement.serialize(ctx)?;
                ctx.write_char(')')?;
                Ok(())
            }
        }
    }
}

impl<S: Statement + Clone> Cte<S> {
    /// `<body> UNION ALL <rhs>`
    pub fn union_all<R: Statement>(&self, rhs: R) -> Result<Cte<Union<S, R>>> {
        self.union_impl(UnionFlag::All, rhs)
    }

    /// `<body> UNION DISTINCT <rhs>`
    pub fn union_distinct<R: Statement>(&self, rhs: R) -> Result<Cte<Union<S, R>>> {
        self.union_impl(UnionFlag::Distinct, rhs)
    }

    fn union_impl<R: Statement>(&self, flag: UnionFlag, rhs: R) -> Result<Cte<Union<S, R>>> {
        validate_branch(&self.shape(), &rhs).inspect_err(|error| {
            debug!(cte = %self.alias, %flag, %error, "rejected cte union branch");
        })?;

        let recursive = rhs.dependencies().requires_cte(&self.alias);
        trace!(cte = %self.alias, %flag, recursive, "appended cte union branch");

        Ok(Cte {
            alias: self.alias.clone(),
            statement: Union::new(flag, self.statement.clone(), rhs),
            columns: self.columns.clone(),
        })
    }
}

/// Outside of a WITH clause a cte is only ever referenced by name.
impl<S: Statement> Serialize for Cte<S> {
    fn serialize(&self, ctx: &mut SerializerContext) -> Result<()> {
        self.serialize_with_mode(CteRenderMode::Reference, ctx)
    }
}

impl<S> From<&Cte<S>> for FromItem {
    fn from(value: &Cte<S>) -> Self {
        FromItem::Cte(value.alias.clone())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CteDefinition<'a, S>(&'a Cte<S>);

impl<S: Statement> Serialize for CteDefinition<'_, S> {
    fn serialize(&self, ctx: &mut SerializerContext) -> Result<()> {
        self.0.serialize_with_mode(CteRenderMode::Definition, ctx)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::SerializerConfig;
    use crate::datatype::{DataType, FieldSpec};
    use crate::error::CteError;
    use crate::expr::{Expr, Parameter};
    use crate::select::{Select, Table};
    use crate::serializer::to_sql;

    fn anchor() -> Select {
        Select::new().column(1, FieldSpec::not_null("n", DataType::Int64))
    }

    fn step<S>(cnt: &Cte<S>) -> Select {
        let n = cnt.column("n").unwrap();
        Select::new()
            .column(
                Expr::from(n.clone()).plus(1),
                FieldSpec::not_null("n", DataType::Int64),
            )
            .from(cnt)
            .filter(Expr::from(n).lt(5))
    }

    #[test]
    fn define_derives_columns() {
        logutil::init_test();

        let cnt = cte("cnt").define(anchor()).unwrap();
        assert_eq!("cnt", cnt.alias());
        assert_eq!(&anchor(), cnt.statement());
        assert_eq!(1, cnt.columns().len());

        let col = &cnt.columns()[0];
        assert_eq!("n", col.name());
        assert_eq!(DataType::Int64, col.datatype());
        assert!(!col.nullable());
        assert!(!col.can_insert());
        assert!(!col.can_update());
        assert!(!cnt.is_recursive());
    }

    #[test]
    fn provided_tables_is_alias() {
        let cnt = cte("cnt").define(anchor()).unwrap();
        let deps = cnt.dependencies();
        assert!(deps.required_tables.is_empty());
        assert!(deps.requires_cte("cnt"));
        assert_eq!(
            vec!["cnt".to_string()],
            deps.provided_tables.into_iter().collect::<Vec<_>>()
        );

        let recursive = cnt.union_all(step(&cnt)).unwrap();
        assert_eq!(
            vec!["cnt".to_string()],
            recursive
                .dependencies()
                .provided_tables
                .into_iter()
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn pre_cte_requires_and_provides_alias() {
        let pre = cte("cnt");
        let deps = pre.dependencies();
        assert!(deps.required_tables.is_empty());
        assert!(deps.requires_cte("cnt"));
        assert!(deps.provides_table("cnt"));
        assert_eq!(1, deps.required_ctes.len());
        assert_eq!(1, deps.provided_tables.len());

        let select = Select::new()
            .column(1, FieldSpec::not_null("n", DataType::Int64))
            .from(&pre);
        assert!(select.dependencies().requires_cte("cnt"));
        assert_eq!(
            "SELECT 1 AS n FROM cnt",
            to_sql(&select, &SerializerConfig::default()).unwrap()
        );
    }

    #[test]
    fn union_allows_self_reference() {
        logutil::init_test();

        let cnt = cte("cnt").define(anchor()).unwrap();
        let recursive = cnt.union_all(step(&cnt)).unwrap();

        assert!(recursive.is_recursive());
        assert_eq!(cnt.columns(), recursive.columns());
        assert_eq!(UnionFlag::All, recursive.statement().flag());

        // Previous value unaffected.
        assert!(!cnt.is_recursive());
    }

    #[test]
    fn anchor_self_reference_rejected() {
        logutil::init_test();

        let pre = cte("cnt");
        let select = Select::new()
            .column(1, FieldSpec::not_null("n", DataType::Int64))
            .from(&pre);

        let err = pre.define(select).unwrap_err();
        assert_eq!(
            CteError::IllegalSelfReferenceInAnchor {
                cte: "cnt".to_string()
            },
            err
        );
    }

    #[test]
    fn union_shape_mismatch() {
        let cnt = cte("cnt").define(anchor()).unwrap();
        let t = Table::new("t");
        let rhs = Select::new()
            .column(
                t.column("id", DataType::Int64, false),
                FieldSpec::not_null("id", DataType::Int64),
            )
            .column(
                t.column("active", DataType::Bool, false),
                FieldSpec::not_null("active", DataType::Bool),
            )
            .from(&t);

        let err = cnt.union_all(rhs.clone()).unwrap_err();
        assert!(matches!(err, CteError::ShapeMismatch { .. }));

        let err = cnt.union_distinct(rhs).unwrap_err();
        assert!(matches!(err, CteError::ShapeMismatch { .. }));
    }

    #[test]
    fn chained_unions() {
        let cnt = cte("cnt").define(anchor()).unwrap();
        let two = Select::new().column(2, FieldSpec::not_null("n", DataType::Int64));
        let chained = cnt
            .union_distinct(two)
            .unwrap()
            .union_all(step(&cnt))
            .unwrap();

        assert_eq!(
            "cnt AS (SELECT 1 AS n UNION DISTINCT SELECT 2 AS n UNION ALL SELECT n+1 AS n FROM cnt WHERE n<5)",
            to_sql(&chained.definition(), &SerializerConfig::default()).unwrap()
        );
    }

    #[test]
    fn render_modes() {
        let cnt = cte("cnt").define(anchor()).unwrap();
        let conf = SerializerConfig::default();

        assert_eq!("cnt", to_sql(&cnt, &conf).unwrap());
        assert_eq!("cnt AS (SELECT 1 AS n)", to_sql(&cnt.definition(), &conf).unwrap());
        assert_eq!("cnt", to_sql(&cte("cnt"), &conf).unwrap());

        let quoted = conf.with_quote_identifiers(true);
        assert_eq!(
            r#""cnt" AS (SELECT 1 AS "n")"#,
            to_sql(&cnt.definition(), &quoted).unwrap()
        );
    }

    #[test]
    fn parameters_propagate() {
        let p = Parameter::new("start", DataType::Int64);
        let base = Select::new().column(p.clone(), FieldSpec::not_null("n", DataType::Int64));
        let cnt = cte("cnt").define(base).unwrap();

        let params = cnt.dependencies().parameters;
        assert_eq!(vec![p], params);
    }

    #[test]
    fn unknown_column() {
        let cnt = cte("cnt").define(anchor()).unwrap();
        assert!(cnt.column("missing").is_none());
    }
}
