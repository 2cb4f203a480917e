use std::collections::BTreeSet;
use std::fmt::Debug;

use crate::datatype::ResultShape;
use crate::dependency::DependencySet;
use crate::error::Result;
use crate::expr::Parameter;
use crate::serializer::Serialize;

/// A composable query node.
///
/// Common table expressions only ever look at statements through this trait:
/// the result shape for validating unions, and the dependency set for
/// validating which tables and ctes a body may reference.
pub trait Statement: Serialize + Debug {
    /// Result columns produced by this statement.
    ///
    /// Returns `None` if the statement doesn't produce rows (e.g. an insert).
    fn result_shape(&self) -> Option<ResultShape>;

    /// Tables, ctes, and parameters this statement requires and provides.
    fn dependencies(&self) -> DependencySet;

    /// Check that all required parts of the statement have been provided.
    fn check_complete(&self) -> Result<()> {
        Ok(())
    }

    fn required_tables(&self) -> BTreeSet<String> {
        self.dependencies().required_tables
    }

    fn provided_tables(&self) -> BTreeSet<String> {
        self.dependencies().provided_tables
    }

    fn required_ctes(&self) -> BTreeSet<String> {
        self.dependencies().required_ctes
    }

    fn provided_ctes(&self) -> BTreeSet<String> {
        self.dependencies().provided_ctes
    }

    fn parameters(&self) -> Vec<Parameter> {
        self.dependencies().parameters
    }
}

impl<S: Statement + ?Sized> Statement for &S {
    fn result_shape(&self) -> Option<ResultShape> {
        (**self).result_shape()
    }

    fn dependencies(&self) -> DependencySet {
        (**self).dependencies()
    }

    fn check_complete(&self) -> Result<()> {
        (**self).check_complete()
    }
}

impl<S: Statement + ?Sized> Statement for Box<S> {
    fn result_shape(&self) -> Option<ResultShape> {
        self.as_ref().result_shape()
    }

    fn dependencies(&self) -> DependencySet {
        self.as_ref().dependencies()
    }

    fn check_complete(&self) -> Result<()> {
        self.as_ref().check_complete()
    }
}
