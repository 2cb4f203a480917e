use std::fmt::{self, Write as _};

use crate::datatype::ResultShape;
use crate::dependency::DependencySet;
use crate::error::Result;
use crate::serializer::{Serialize, SerializerContext};
use crate::statement::Statement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnionFlag {
    All,
    Distinct,
}

impl fmt::Display for UnionFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "ALL"),
            Self::Distinct => write!(f, "DISTINCT"),
        }
    }
}

/// `<lhs> UNION ALL|DISTINCT <rhs>`
///
/// Only constructed by common table expressions after the right side has been
/// validated against the left side's shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Union<L, R> {
    flag: UnionFlag,
    lhs: L,
    rhs: R,
}

impl<L, R> Union<L, R> {
    pub(crate) fn new(flag: UnionFlag, lhs: L, rhs: R) -> Self {
        Union { flag, lhs, rhs }
    }

    pub fn flag(&self) -> UnionFlag {
        self.flag
    }

    pub fn lhs(&self) -> &L {
        &self.lhs
    }

    pub fn rhs(&self) -> &R {
        &self.rhs
    }
}

impl<L, R> Statement for Union<L, R>
where
    L: Statement,
    R: Statement,
{
    fn result_shape(&self) -> Option<ResultShape> {
        self.lhs.result_shape()
    }

    fn dependencies(&self) -> DependencySet {
        self.lhs.dependencies().merge(self.rhs.dependencies())
    }

    fn check_complete(&self) -> Result<()> {
        self.lhs.check_complete()?;
        self.rhs.check_complete()
    }
}

impl<L, R> Serialize for Union<L, R>
where
    L: Serialize,
    R: Serialize,
{
    fn serialize(&self, ctx: &mut SerializerContext) -> Result<()> {
        self.lhs.serialize(ctx)?;
        write!(ctx, " UNION {} ", self.flag)?;
        self.rhs.serialize(ctx)
    }
}
