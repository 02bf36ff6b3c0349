use std::io::{Read, Write};

use fos_types::Oid;

use crate::data::{DataInput, DataOutput};
use crate::error::CodecResult;
use crate::value::{TypeTag, Value};

/// Stateless codec for one field type.
///
/// `skip` must consume exactly the bytes `store` writes for any value, so a
/// reader can step over a field it has no use for.
pub trait Transcriber: Send + Sync + 'static {
    type Value;

    const TAG: TypeTag;

    fn store(&self, value: &Self::Value, out: &mut dyn Write) -> CodecResult<()>;

    fn fetch(&self, input: &mut dyn Read) -> CodecResult<Self::Value>;

    fn skip(&self, input: &mut dyn Read) -> CodecResult<()>;

    fn into_value(value: Self::Value) -> Value;

    fn from_value(value: &Value) -> Option<&Self::Value>;
}

macro_rules! fixed_transcriber {
    (
        $(#[$doc:meta])*
        $name:ident, $ty:ty, $variant:ident, $write:ident, $read:ident, $width:expr
    ) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $name;

        impl Transcriber for $name {
            type Value = $ty;

            const TAG: TypeTag = TypeTag::$variant;

            fn store(&self, value: &$ty, out: &mut dyn Write) -> CodecResult<()> {
                out.$write(*value)
            }

            fn fetch(&self, input: &mut dyn Read) -> CodecResult<$ty> {
                input.$read()
            }

            fn skip(&self, input: &mut dyn Read) -> CodecResult<()> {
                input.skip_bytes($width)
            }

            fn into_value(value: $ty) -> Value {
                Value::$variant(value)
            }

            fn from_value(value: &Value) -> Option<&$ty> {
                match value {
                    Value::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

fixed_transcriber!(
    /// Transcribes `bool` as one byte, 0 or 1.
    BooleanTranscriber, bool, Boolean, write_bool, read_bool, 1
);
fixed_transcriber!(ByteTranscriber, i8, Byte, write_i8, read_i8, 1);
fixed_transcriber!(
    /// Transcribes a UTF-16 code unit.
    CharTranscriber, u16, Char, write_u16, read_u16, 2
);
fixed_transcriber!(ShortTranscriber, i16, Short, write_i16, read_i16, 2);
fixed_transcriber!(IntTranscriber, i32, Int, write_i32, read_i32, 4);
fixed_transcriber!(LongTranscriber, i64, Long, write_i64, read_i64, 8);
fixed_transcriber!(
    /// Transcribes `f32` by bit pattern; NaN payloads are preserved.
    FloatTranscriber, f32, Float, write_f32, read_f32, 4
);
fixed_transcriber!(
    /// Transcribes `f64` by bit pattern; NaN payloads are preserved.
    DoubleTranscriber, f64, Double, write_f64, read_f64, 8
);

/// Transcribes strings as a 2-byte length plus UTF-8 bytes.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringTranscriber;

impl Transcriber for StringTranscriber {
    type Value = String;

    const TAG: TypeTag = TypeTag::String;

    fn store(&self, value: &String, out: &mut dyn Write) -> CodecResult<()> {
        out.write_utf(value)
    }

    fn fetch(&self, input: &mut dyn Read) -> CodecResult<String> {
        input.read_utf()
    }

    fn skip(&self, input: &mut dyn Read) -> CodecResult<()> {
        input.skip_utf()
    }

    fn into_value(value: String) -> Value {
        Value::String(value)
    }

    fn from_value(value: &Value) -> Option<&String> {
        match value {
            Value::String(v) => Some(v),
            _ => None,
        }
    }
}

/// Transcribes object identities as 8 big-endian bytes.
#[derive(Clone, Copy, Debug, Default)]
pub struct OidTranscriber;

impl Transcriber for OidTranscriber {
    type Value = Oid;

    const TAG: TypeTag = TypeTag::Oid;

    fn store(&self, value: &Oid, out: &mut dyn Write) -> CodecResult<()> {
        out.write_u64(value.as_u64())
    }

    fn fetch(&self, input: &mut dyn Read) -> CodecResult<Oid> {
        Ok(Oid::from_raw(input.read_u64()?))
    }

    fn skip(&self, input: &mut dyn Read) -> CodecResult<()> {
        input.skip_bytes(Oid::WIDTH as u64)
    }

    fn into_value(value: Oid) -> Value {
        Value::Oid(value)
    }

    fn from_value(value: &Value) -> Option<&Oid> {
        match value {
            Value::Oid(v) => Some(v),
            _ => None,
        }
    }
}
