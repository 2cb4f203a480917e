use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DataType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Utf8,
    Binary,
    Date,
    Timestamp,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use DataType::*;
        match self {
            Bool => write!(f, "BOOL"),
            Int8 => write!(f, "INT8"),
            Int16 => write!(f, "INT16"),
            Int32 => write!(f, "INT32"),
            Int64 => write!(f, "INT64"),
            Float32 => write!(f, "FLOAT32"),
            Float64 => write!(f, "FLOAT64"),
            Utf8 => write!(f, "UTF8"),
            Binary => write!(f, "BINARY"),
            Date => write!(f, "DATE"),
            Timestamp => write!(f, "TIMESTAMP"),
        }
    }
}

/// A single result column produced by a statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub datatype: DataType,
    pub nullable: bool,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, datatype: DataType, nullable: bool) -> Self {
        FieldSpec {
            name: name.into(),
            datatype,
            nullable,
        }
    }

    pub fn not_null(name: impl Into<String>, datatype: DataType) -> Self {
        Self::new(name, datatype, false)
    }

    pub fn nullable(name: impl Into<String>, datatype: DataType) -> Self {
        Self::new(name, datatype, true)
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "{} {}", self.name, self.datatype)
        } else {
            write!(f, "{} {} NOT NULL", self.name, self.datatype)
        }
    }
}

/// The ordered result columns of a statement.
///
/// Two shapes are equal only if they have the same fields, in the same order,
/// with the same types and nullability, and agree on whether columns may be
/// added dynamically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultShape {
    pub fields: Vec<FieldSpec>,
    /// If columns are conditionally present at render time.
    pub dynamic: bool,
}

impl ResultShape {
    pub fn fixed(fields: impl IntoIterator<Item = FieldSpec>) -> Self {
        ResultShape {
            fields: fields.into_iter().collect(),
            dynamic: false,
        }
    }

    pub fn is_fixed(&self) -> bool {
        !self.dynamic
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for ResultShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (idx, field) in self.fields.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{field}")?;
        }
        if self.dynamic {
            if !self.fields.is_empty() {
                write!(f, ", ")?;
            }
            write!(f, "...")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn display_shape() {
        let shape = ResultShape::fixed([
            FieldSpec::not_null("id", DataType::Int64),
            FieldSpec::nullable("name", DataType::Utf8),
        ]);
        assert_eq!("(id INT64 NOT NULL, name UTF8)", shape.to_string());

        let dynamic = ResultShape {
            fields: vec![FieldSpec::not_null("id", DataType::Int64)],
            dynamic: true,
        };
        assert_eq!("(id INT64 NOT NULL, ...)", dynamic.to_string());
    }

    #[test]
    fn nullability_is_part_of_shape() {
        let a = ResultShape::fixed([FieldSpec::not_null("n", DataType::Int32)]);
        let b = ResultShape::fixed([FieldSpec::nullable("n", DataType::Int32)]);
        assert_ne!(a, b);
    }

    #[test]
    fn column_order_is_part_of_shape() {
        let a = ResultShape::fixed([
            FieldSpec::not_null("a", DataType::Int32),
            FieldSpec::not_null("b", DataType::Int32),
        ]);
        let b = ResultShape::fixed([
            FieldSpec::not_null("b", DataType::Int32),
            FieldSpec::not_null("a", DataType::Int32),
        ]);
        assert_ne!(a, b);
    }
}
