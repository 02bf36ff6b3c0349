use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::sync::OnceLock;

use crate::error::{CodecError, CodecResult};
use crate::transcriber::{
    BooleanTranscriber, ByteTranscriber, CharTranscriber, DoubleTranscriber, FloatTranscriber,
    IntTranscriber, LongTranscriber, OidTranscriber, ShortTranscriber, StringTranscriber,
    Transcriber,
};
use crate::value::{TypeTag, Value};

/// Type-erased view of a [`Transcriber`], working on [`Value`]s.
pub trait DynTranscriber: Send + Sync {
    fn tag(&self) -> TypeTag;

    fn store_value(&self, value: &Value, out: &mut dyn Write) -> CodecResult<()>;

    fn fetch_value(&self, input: &mut dyn Read) -> CodecResult<Value>;

    fn skip_value(&self, input: &mut dyn Read) -> CodecResult<()>;
}

impl<T: Transcriber> DynTranscriber for T {
    fn tag(&self) -> TypeTag {
        T::TAG
    }

    fn store_value(&self, value: &Value, out: &mut dyn Write) -> CodecResult<()> {
        let typed = T::from_value(value).ok_or(CodecError::TypeMismatch {
            expected: T::TAG,
            actual: value.tag(),
        })?;
        self.store(typed, out)
    }

    fn fetch_value(&self, input: &mut dyn Read) -> CodecResult<Value> {
        self.fetch(input).map(T::into_value)
    }

    fn skip_value(&self, input: &mut dyn Read) -> CodecResult<()> {
        self.skip(input)
    }
}

static BOOLEAN: BooleanTranscriber = BooleanTranscriber;
static BYTE: ByteTranscriber = ByteTranscriber;
static CHAR: CharTranscriber = CharTranscriber;
static SHORT: ShortTranscriber = ShortTranscriber;
static INT: IntTranscriber = IntTranscriber;
static LONG: LongTranscriber = LongTranscriber;
static FLOAT: FloatTranscriber = FloatTranscriber;
static DOUBLE: DoubleTranscriber = DoubleTranscriber;
static STRING: StringTranscriber = StringTranscriber;
static OID: OidTranscriber = OidTranscriber;

static REGISTRY: OnceLock<TranscriberRegistry> = OnceLock::new();

/// Read-only map from [`TypeTag`] to the shared transcriber for that type.
///
/// Built once on first use and never mutated afterwards.
pub struct TranscriberRegistry {
    by_tag: BTreeMap<TypeTag, &'static dyn DynTranscriber>,
}

impl TranscriberRegistry {
    /// The process-wide registry.
    pub fn global() -> &'static TranscriberRegistry {
        REGISTRY.get_or_init(Self::build)
    }

    fn build() -> Self {
        let all: [&'static dyn DynTranscriber; 10] = [
            &BOOLEAN, &BYTE, &CHAR, &SHORT, &INT, &LONG, &FLOAT, &DOUBLE, &STRING, &OID,
        ];
        let by_tag = all.into_iter().map(|t| (t.tag(), t)).collect();
        Self { by_tag }
    }

    pub fn get(&self, tag: TypeTag) -> CodecResult<&'static dyn DynTranscriber> {
        self.by_tag
            .get(&tag)
            .copied()
            .ok_or(CodecError::UnknownTypeTag(tag.to_byte()))
    }

    /// Look up by wire byte.
    pub fn for_byte(&self, byte: u8) -> CodecResult<&'static dyn DynTranscriber> {
        self.get(TypeTag::from_byte(byte)?)
    }

    pub fn len(&self) -> usize {
        self.by_tag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }

    /// Store a value with the transcriber matching its own tag.
    pub fn store(&self, value: &Value, out: &mut dyn Write) -> CodecResult<()> {
        self.get(value.tag())?.store_value(value, out)
    }
}
