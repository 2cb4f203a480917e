use crate::datatype::ResultShape;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CteError {
    #[error("common table expression '{cte}' must not use unknown tables: {}", tables.join(", "))]
    UnknownTableReferenced { cte: String, tables: Vec<String> },

    #[error(
        "common table expression '{cte}' must not self-reference in the first part, use union_all/union_distinct for recursion"
    )]
    IllegalSelfReferenceInAnchor { cte: String },

    #[error("common table expression '{cte}' must not have dynamically added columns")]
    DynamicResultShapeNotAllowed { cte: String },

    #[error(
        "both select statements in a union have to have the same result columns, expected {expected}, got {actual}"
    )]
    ShapeMismatch {
        expected: ResultShape,
        actual: ResultShape,
    },

    #[error("argument of union call has to be a select")]
    NotASelectStatement,

    #[error("statement is incomplete: {0}")]
    IncompleteStatement(String),

    #[error("common table expression '{cte}' depends on undefined ctes: {}", missing.join(", "))]
    UnknownCteReferenced { cte: String, missing: Vec<String> },

    #[error("common table expression '{0}' is already defined")]
    DuplicateCte(String),

    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),
}

pub type Result<T, E = CteError> = std::result::Result<T, E>;
