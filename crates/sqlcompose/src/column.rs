use std::fmt::Write as _;

use crate::datatype::{DataType, FieldSpec};
use crate::dependency::DependencySet;
use crate::error::Result;
use crate::serializer::{Serialize, SerializerContext};

/// Metadata for a column that can be referenced in expressions.
///
/// Columns of a common table expression are derived from the result fields of
/// its body and are read-only: they can never be the target of an insert or
/// update.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnSpec {
    name: String,
    datatype: DataType,
    nullable: bool,
    insertable: bool,
    updatable: bool,
}

impl ColumnSpec {
    /// Column of a base table.
    pub fn table_column(name: impl Into<String>, datatype: DataType, nullable: bool) -> Self {
        ColumnSpec {
            name: name.into(),
            datatype,
            nullable,
            insertable: true,
            updatable: true,
        }
    }

    /// Column of a common table expression, derived from one of its result
    /// fields.
    pub fn from_field(field: &FieldSpec) -> Self {
        ColumnSpec {
            name: field.name.clone(),
            datatype: field.datatype,
            nullable: field.nullable,
            insertable: false,
            updatable: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn datatype(&self) -> DataType {
        self.datatype
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }

    pub fn can_insert(&self) -> bool {
        self.insertable
    }

    pub fn can_update(&self) -> bool {
        self.updatable
    }

    pub fn to_field(&self) -> FieldSpec {
        FieldSpec::new(self.name.clone(), self.datatype, self.nullable)
    }
}

/// A column of some relation (table or cte).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub relation: String,
    pub spec: ColumnSpec,
}

impl ColumnRef {
    pub fn new(relation: impl Into<String>, spec: ColumnSpec) -> Self {
        ColumnRef {
            relation: relation.into(),
            spec,
        }
    }

    pub fn name(&self) -> &str {
        self.spec.name()
    }

    /// The relation must be provided by whatever statement uses this column.
    pub fn dependencies(&self) -> DependencySet {
        DependencySet::new().with_required_table(self.relation.clone())
    }
}

impl Serialize for ColumnRef {
    fn serialize(&self, ctx: &mut SerializerContext) -> Result<()> {
        if ctx.config().qualify_columns {
            ctx.write_ident(&self.relation)?;
            ctx.write_char('.')?;
        }
        ctx.write_ident(self.spec.name())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::SerializerConfig;
    use crate::serializer::to_sql;

    #[test]
    fn derived_columns_are_immutable() {
        let field = FieldSpec::nullable("parent", DataType::Int64);
        let col = ColumnSpec::from_field(&field);

        assert_eq!("parent", col.name());
        assert_eq!(DataType::Int64, col.datatype());
        assert!(col.nullable());
        assert!(!col.can_insert());
        assert!(!col.can_update());
        assert_eq!(field, col.to_field());
    }

    #[test]
    fn table_columns_are_mutable() {
        let col = ColumnSpec::table_column("id", DataType::Int32, false);
        assert!(col.can_insert());
        assert!(col.can_update());
    }

    #[test]
    fn serialize_qualified() {
        let col = ColumnRef::new(
            "users",
            ColumnSpec::table_column("id", DataType::Int64, false),
        );

        let conf = SerializerConfig::default();
        assert_eq!("id", to_sql(&col, &conf).unwrap());

        let conf = conf.with_qualify_columns(true).with_quote_identifiers(true);
        assert_eq!(r#""users"."id""#, to_sql(&col, &conf).unwrap());
    }
}
