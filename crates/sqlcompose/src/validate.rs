//! Construction time checks for common table expressions.
//!
//! Both checks only look at statement metadata and run exactly once per
//! construction step.

use crate::datatype::ResultShape;
use crate::error::{CteError, Result};
use crate::statement::Statement;

/// Validate the first (non-recursive) part of a cte named `alias`.
///
/// Returns the anchor's result shape on success.
pub fn validate_anchor<S>(statement: &S, alias: &str) -> Result<ResultShape>
where
    S: Statement + ?Sized,
{
    let shape = statement
        .result_shape()
        .ok_or(CteError::NotASelectStatement)?;
    statement.check_complete()?;

    let deps = statement.dependencies();
    if !deps.required_tables.is_empty() {
        return Err(CteError::UnknownTableReferenced {
            cte: alias.to_string(),
            tables: deps.required_tables.into_iter().collect(),
        });
    }

    // The only place self-reference is rejected. Branches added through a
    // union are allowed to reference the cte.
    if deps.requires_cte(alias) {
        return Err(CteError::IllegalSelfReferenceInAnchor {
            cte: alias.to_string(),
        });
    }

    if !shape.is_fixed() {
        return Err(CteError::DynamicResultShapeNotAllowed {
            cte: alias.to_string(),
        });
    }

    Ok(shape)
}

/// Validate a statement being unioned onto an existing cte body.
pub fn validate_branch<S>(expected: &ResultShape, statement: &S) -> Result<()>
where
    S: Statement + ?Sized,
{
    let actual = statement
        .result_shape()
        .ok_or(CteError::NotASelectStatement)?;
    statement.check_complete()?;

    if &actual != expected {
        return Err(CteError::ShapeMismatch {
            expected: expected.clone(),
            actual,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::datatype::{DataType, FieldSpec};
    use crate::select::{FromItem, Select, Table};

    fn n_shape() -> ResultShape {
        ResultShape::fixed([FieldSpec::not_null("n", DataType::Int64)])
    }

    #[test]
    fn anchor_ok() {
        let select = Select::new().column(1, FieldSpec::not_null("n", DataType::Int64));
        assert_eq!(n_shape(), validate_anchor(&select, "cnt").unwrap());
    }

    #[test]
    fn anchor_unknown_table() {
        let t = Table::new("t");
        let select = Select::new().column(
            t.column("n", DataType::Int64, false),
            FieldSpec::not_null("n", DataType::Int64),
        );

        let err = validate_anchor(&select, "cnt").unwrap_err();
        assert_eq!(
            CteError::UnknownTableReferenced {
                cte: "cnt".to_string(),
                tables: vec!["t".to_string()],
            },
            err
        );
    }

    #[test]
    fn anchor_self_reference() {
        let select = Select::new()
            .column(1, FieldSpec::not_null("n", DataType::Int64))
            .from(FromItem::Cte("cnt".to_string()));

        let err = validate_anchor(&select, "cnt").unwrap_err();
        assert_eq!(
            CteError::IllegalSelfReferenceInAnchor {
                cte: "cnt".to_string()
            },
            err
        );

        // Referencing some other cte is fine.
        validate_anchor(&select, "other").unwrap();
    }

    #[test]
    fn anchor_dynamic_shape() {
        let select = Select::new()
            .column(1, FieldSpec::not_null("n", DataType::Int64))
            .dynamic_column(2, FieldSpec::not_null("m", DataType::Int64));

        let err = validate_anchor(&select, "cnt").unwrap_err();
        assert_eq!(
            CteError::DynamicResultShapeNotAllowed {
                cte: "cnt".to_string()
            },
            err
        );
    }

    #[test]
    fn anchor_incomplete() {
        let err = validate_anchor(&Select::new(), "cnt").unwrap_err();
        assert!(matches!(err, CteError::IncompleteStatement(_)));
    }

    #[test]
    fn branch_mismatch() {
        let select = Select::new().column(1, FieldSpec::nullable("n", DataType::Int64));
        let err = validate_branch(&n_shape(), &select).unwrap_err();
        assert_eq!(
            CteError::ShapeMismatch {
                expected: n_shape(),
                actual: ResultShape::fixed([FieldSpec::nullable("n", DataType::Int64)]),
            },
            err
        );
    }

    #[test]
    fn branch_may_self_reference() {
        let select = Select::new()
            .column(1, FieldSpec::not_null("n", DataType::Int64))
            .from(FromItem::Cte("cnt".to_string()));
        validate_branch(&n_shape(), &select).unwrap();
    }
}
