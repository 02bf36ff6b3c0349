use std::fmt;

use fos_types::Oid;
use serde::{Deserialize, Serialize};

use crate::error::{CodecError, CodecResult};

/// Wire tag naming the type of a payload field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TypeTag {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    Oid,
}

impl TypeTag {
    pub const ALL: [TypeTag; 10] = [
        TypeTag::Boolean,
        TypeTag::Byte,
        TypeTag::Char,
        TypeTag::Short,
        TypeTag::Int,
        TypeTag::Long,
        TypeTag::Float,
        TypeTag::Double,
        TypeTag::String,
        TypeTag::Oid,
    ];

    pub fn to_byte(&self) -> u8 {
        match self {
            Self::Boolean => 1,
            Self::Byte => 2,
            Self::Char => 3,
            Self::Short => 4,
            Self::Int => 5,
            Self::Long => 6,
            Self::Float => 7,
            Self::Double => 8,
            Self::String => 9,
            Self::Oid => 10,
        }
    }

    pub fn from_byte(byte: u8) -> CodecResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.to_byte() == byte)
            .ok_or(CodecError::UnknownTypeTag(byte))
    }

    /// Encoded width, or `None` for variable-width types.
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            Self::Boolean | Self::Byte => Some(1),
            Self::Char | Self::Short => Some(2),
            Self::Int | Self::Float => Some(4),
            Self::Long | Self::Double => Some(8),
            Self::Oid => Some(Oid::WIDTH),
            Self::String => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
            Self::Oid => "oid",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded payload field.
///
/// `Char` holds a UTF-16 code unit, matching the 2-byte wire width.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Boolean(bool),
    Byte(i8),
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Oid(Oid),
}

impl Value {
    pub fn tag(&self) -> TypeTag {
        match self {
            Self::Boolean(_) => TypeTag::Boolean,
            Self::Byte(_) => TypeTag::Byte,
            Self::Char(_) => TypeTag::Char,
            Self::Short(_) => TypeTag::Short,
            Self::Int(_) => TypeTag::Int,
            Self::Long(_) => TypeTag::Long,
            Self::Float(_) => TypeTag::Float,
            Self::Double(_) => TypeTag::Double,
            Self::String(_) => TypeTag::String,
            Self::Oid(_) => TypeTag::Oid,
        }
    }
}
