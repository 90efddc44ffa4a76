//! Column type system of the store

use serde::{Deserialize, Serialize};
use sqlparser::ast::{CharacterLength, ExactNumberInfo};

/// Declared type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    // Signed numeric types
    TinyInt,
    SmallInt,
    Integer,
    Long,
    Float,
    Double,
    Decimal,

    // Unsigned numeric types
    UnsignedInt,
    UnsignedLong,

    Boolean,

    // Character types
    Char,
    Varchar,

    // Binary types
    Binary,
    Varbinary,

    // Date/Time types
    Date,
    Time,
    Timestamp,
}

/// A data type together with the length and scale it was declared with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclaredType {
    pub data_type: DataType,
    pub max_length: Option<u32>,
    pub scale: Option<u32>,
}

impl DeclaredType {
    fn plain(data_type: DataType) -> Self {
        Self {
            data_type,
            max_length: None,
            scale: None,
        }
    }

    fn sized(data_type: DataType, max_length: Option<u64>) -> Self {
        Self {
            data_type,
            max_length: max_length.map(clamp_u32),
            scale: None,
        }
    }
}

impl DataType {
    /// Convert from sqlparser's DataType, returning `None` for types the store has no counterpart for
    pub fn from_ast(data_type: &sqlparser::ast::DataType) -> Option<DeclaredType> {
        use sqlparser::ast::DataType as Ast;

        let declared = match data_type {
            Ast::TinyInt(_) => DeclaredType::plain(DataType::TinyInt),
            Ast::SmallInt(_) | Ast::Int2(_) => DeclaredType::plain(DataType::SmallInt),
            Ast::Integer(_) | Ast::Int(_) | Ast::Int4(_) => DeclaredType::plain(DataType::Integer),
            Ast::BigInt(_) | Ast::Int8(_) => DeclaredType::plain(DataType::Long),
            Ast::UnsignedInteger(_) | Ast::UnsignedInt(_) => {
                DeclaredType::plain(DataType::UnsignedInt)
            }
            Ast::UnsignedBigInt(_) => DeclaredType::plain(DataType::UnsignedLong),

            Ast::Real | Ast::Float4 | Ast::Float(_) => DeclaredType::plain(DataType::Float),
            Ast::Double | Ast::DoublePrecision | Ast::Float8 => {
                DeclaredType::plain(DataType::Double)
            }

            Ast::Decimal(info) | Ast::Numeric(info) => {
                let (precision, scale) = match info {
                    ExactNumberInfo::None => (None, None),
                    ExactNumberInfo::Precision(p) => (Some(*p), None),
                    ExactNumberInfo::PrecisionAndScale(p, s) => (Some(*p), Some(*s)),
                };
                DeclaredType {
                    data_type: DataType::Decimal,
                    max_length: precision.map(clamp_u32),
                    scale: scale.map(clamp_u32),
                }
            }

            Ast::Boolean | Ast::Bool => DeclaredType::plain(DataType::Boolean),

            Ast::Char(info) | Ast::Character(info) => {
                DeclaredType::sized(DataType::Char, char_length(info.as_ref()))
            }
            Ast::Varchar(info) | Ast::CharacterVarying(info) => {
                DeclaredType::sized(DataType::Varchar, char_length(info.as_ref()))
            }
            Ast::Text | Ast::String(_) => DeclaredType::plain(DataType::Varchar),

            Ast::Binary(_) => DeclaredType::plain(DataType::Binary),
            Ast::Varbinary(_) | Ast::Bytea | Ast::Blob(_) => {
                DeclaredType::plain(DataType::Varbinary)
            }

            Ast::Date => DeclaredType::plain(DataType::Date),
            Ast::Time(..) => DeclaredType::plain(DataType::Time),
            Ast::Timestamp(..) | Ast::Datetime(_) => DeclaredType::plain(DataType::Timestamp),

            _ => return None,
        };
        Some(declared)
    }

    /// Get a human-readable name for this type
    pub fn display_name(&self) -> &'static str {
        match self {
            DataType::TinyInt => "tinyint",
            DataType::SmallInt => "smallint",
            DataType::Integer => "integer",
            DataType::Long => "bigint",
            DataType::Float => "float",
            DataType::Double => "double",
            DataType::Decimal => "decimal",
            DataType::UnsignedInt => "unsigned_int",
            DataType::UnsignedLong => "unsigned_long",
            DataType::Boolean => "boolean",
            DataType::Char => "char",
            DataType::Varchar => "varchar",
            DataType::Binary => "binary",
            DataType::Varbinary => "varbinary",
            DataType::Date => "date",
            DataType::Time => "time",
            DataType::Timestamp => "timestamp",
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Row key sort order annotation of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

fn char_length(info: Option<&CharacterLength>) -> Option<u64> {
    info.and_then(|i| match i {
        CharacterLength::IntegerLength { length, .. } => Some(*length),
        CharacterLength::Max => None,
    })
}

fn clamp_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlparser::ast::DataType as Ast;

    #[test]
    fn test_from_ast_lengths() {
        let declared = DataType::from_ast(&Ast::Varchar(Some(CharacterLength::IntegerLength {
            length: 20,
            unit: None,
        })))
        .unwrap();
        assert_eq!(declared.data_type, DataType::Varchar);
        assert_eq!(declared.max_length, Some(20));

        let declared =
            DataType::from_ast(&Ast::Decimal(ExactNumberInfo::PrecisionAndScale(10, 2))).unwrap();
        assert_eq!(declared.data_type, DataType::Decimal);
        assert_eq!(declared.max_length, Some(10));
        assert_eq!(declared.scale, Some(2));
    }

    #[test]
    fn test_from_ast_unsupported() {
        assert!(DataType::from_ast(&Ast::Uuid).is_none());
        assert_eq!(
            DataType::from_ast(&Ast::BigInt(None)).map(|d| d.data_type),
            Some(DataType::Long)
        );
    }
}
