//! Composition and validation of common table expressions.
//!
//! Ctes are built from statement metadata alone: a name is bound to an anchor
//! statement, and further branches are unioned on. Illegal compositions
//! (unknown tables, self-reference in the anchor, mismatched union shapes) are
//! rejected when the cte is constructed, before any SQL text is produced.
pub mod column;
pub mod config;
pub mod cte;
pub mod datatype;
pub mod dependency;
pub mod error;
pub mod expr;
pub mod select;
pub mod serializer;
pub mod statement;
pub mod union;
pub mod validate;
pub mod with;

pub use cte::{Cte, CteDefinition, CteRenderMode, PreCte, cte};
pub use error::{CteError, Result};
pub use statement::Statement;
pub use with::{With, WithStatement};
