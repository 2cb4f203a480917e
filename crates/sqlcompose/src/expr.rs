use std::fmt::{self, Write as _};

use crate::column::ColumnRef;
use crate::datatype::DataType;
use crate::dependency::DependencySet;
use crate::error::Result;
use crate::serializer::{Serialize, SerializerContext};

/// A named placeholder whose value is bound at execution time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    pub name: String,
    pub datatype: DataType,
}

impl Parameter {
    pub fn new(name: impl Into<String>, datatype: DataType) -> Self {
        Parameter {
            name: name.into(),
            datatype,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(true) => write!(f, "TRUE"),
            Self::Bool(false) => write!(f, "FALSE"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) if v.is_nan() => write!(f, "'NaN'::float8"),
            Self::Float(v) if v.is_infinite() && *v > 0.0 => write!(f, "'Infinity'::float8"),
            Self::Float(v) if v.is_infinite() => write!(f, "'-Infinity'::float8"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => {
                f.write_char('\'')?;
                for c in s.chars() {
                    if c == '\'' {
                        f.write_char('\'')?;
                    }
                    f.write_char(c)?;
                }
                f.write_char('\'')
            }
        }
    }
}

impl Literal {
    /// Numeric literal whose text starts with a minus sign.
    fn is_negative_number(&self) -> bool {
        match self {
            Self::Int(v) => *v < 0,
            Self::Float(v) => v.is_finite() && v.is_sign_negative(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Multiply,
    Divide,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::Multiply => write!(f, "*"),
            Self::Divide => write!(f, "/"),
            Self::Eq => write!(f, "="),
            Self::NotEq => write!(f, "<>"),
            Self::Lt => write!(f, "<"),
            Self::LtEq => write!(f, "<="),
            Self::Gt => write!(f, ">"),
            Self::GtEq => write!(f, ">="),
            Self::And => write!(f, " AND "),
            Self::Or => write!(f, " OR "),
        }
    }
}

impl BinaryOperator {
    /// Binding strength, higher binds tighter.
    pub fn precedence(&self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq => 3,
            Self::Plus | Self::Minus => 4,
            Self::Multiply | Self::Divide => 5,
        }
    }
}

/// Scalar expressions usable in select lists and filters.
///
/// Only what's needed to reference columns and parameters. No type checking
/// is done, result types are provided by the caller when the expression is
/// used as a select column.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Column(ColumnRef),
    Parameter(Parameter),
    Binary {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },
    /// Parenthesized expression.
    Nested(Box<Expr>),
}

impl Expr {
    pub fn binary(left: impl Into<Expr>, op: BinaryOperator, right: impl Into<Expr>) -> Self {
        Expr::Binary {
            left: Box::new(left.into()),
            op,
            right: Box::new(right.into()),
        }
    }

    pub fn nested(self) -> Self {
        Expr::Nested(Box::new(self))
    }

    pub fn plus(self, right: impl Into<Expr>) -> Self {
        Self::binary(self, BinaryOperator::Plus, right)
    }

    pub fn minus(self, right: impl Into<Expr>) -> Self {
        Self::binary(self, BinaryOperator::Minus, right)
    }

    pub fn mul(self, right: impl Into<Expr>) -> Self {
        Self::binary(self, BinaryOperator::Multiply, right)
    }

    pub fn equals(self, right: impl Into<Expr>) -> Self {
        Self::binary(self, BinaryOperator::Eq, right)
    }

    pub fn not_eq(self, right: impl Into<Expr>) -> Self {
        Self::binary(self, BinaryOperator::NotEq, right)
    }

    pub fn lt(self, right: impl Into<Expr>) -> Self {
        Self::binary(self, BinaryOperator::Lt, right)
    }

    pub fn gt(self, right: impl Into<Expr>) -> Self {
        Self::binary(self, BinaryOperator::Gt, right)
    }

    pub fn and(self, right: impl Into<Expr>) -> Self {
        Self::binary(self, BinaryOperator::And, right)
    }

    pub fn or(self, right: impl Into<Expr>) -> Self {
        Self::binary(self, BinaryOperator::Or, right)
    }

    /// Tables referenced through columns, and parameters in order of
    /// appearance.
    pub fn dependencies(&self) -> DependencySet {
        match self {
            Self::Literal(_) => DependencySet::new(),
            Self::Column(col) => col.dependencies(),
            Self::Parameter(param) => DependencySet::new().with_parameter(param.clone()),
            Self::Binary { left, right, .. } => left.dependencies().merge(right.dependencies()),
            Self::Nested(expr) => expr.dependencies(),
        }
    }
}

impl Serialize for Expr {
    fn serialize(&self, ctx: &mut SerializerContext) -> Result<()> {
        match self {
            Self::Literal(lit) => write!(ctx, "{lit}")?,
            Self::Column(col) => col.serialize(ctx)?,
            Self::Parameter(_) => ctx.write_parameter()?,
            Self::Binary { left, op, right } => {
                left.serialize_operand(ctx, *op, false)?;
                write!(ctx, "{op}")?;
                right.serialize_operand(ctx, *op, true)?;
            }
            Self::Nested(expr) => {
                ctx.write_char('(')?;
                expr.serialize(ctx)?;
                ctx.write_char(')')?;
            }
        }
        Ok(())
    }
}

impl Expr {
    /// Serialize as an operand of `parent`, adding parentheses where the
    /// rendered text would otherwise parse differently.
    ///
    /// Operators are left associative, so a right operand with the same
    /// precedence as its parent is grouped too. Negative numbers are grouped
    /// so that `-` followed by `-1` can't turn into a `--` comment.
    fn serialize_operand(
        &self,
        ctx: &mut SerializerContext,
        parent: BinaryOperator,
        is_right: bool,
    ) -> Result<()> {
        let group = match self {
            Self::Binary { op, .. } if is_right => op.precedence() <= parent.precedence(),
            Self::Binary { op, .. } => op.precedence() < parent.precedence(),
            Self::Literal(lit) => lit.is_negative_number(),
            _ => false,
        };

        if group {
            ctx.write_char('(')?;
            self.serialize(ctx)?;
            ctx.write_char(')')?;
        } else {
            self.serialize(ctx)?;
        }
        Ok(())
    }
}

impl From<Literal> for Expr {
    fn from(value: Literal) -> Self {
        Expr::Literal(value)
    }
}

impl From<ColumnRef> for Expr {
    fn from(value: ColumnRef) -> Self {
        Expr::Column(value)
    }
}

impl From<Parameter> for Expr {
    fn from(value: Parameter) -> Self {
        Expr::Parameter(value)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::Literal(Literal::Int(value))
    }
}

impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        Expr::Literal(Literal::Int(value as i64))
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Expr::Literal(Literal::Bool(value))
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Expr::Literal(Literal::String(value.to_string()))
    }
}
