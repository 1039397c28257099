//! The decoded item model.
//!
//! One [`DecodedItem`] is produced per data item. The value is a flat
//! discriminated union; container items carry their child count and the
//! children follow as further items.

use crate::tags::TagSet;

/// The value of one decoded data item.
///
/// String-like arms borrow either from the decode input or, when the
/// item's `data_allocated` flag is set, from the string allocator's pool.
///
/// For `Array` the count is the number of items, for `Map` the number of
/// label/value pairs, and for `MapAsArray` the number of labels plus values.
/// `u16::MAX` means the container is indefinite-length and in progress; use
/// `next_nest_level` to find its end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'data> {
    /// Major 0 or 1 integer representable as `i64`.
    Int64(i64),
    /// Major 0 integer above `i64::MAX`.
    UInt64(u64),
    /// Array head.
    Array(u16),
    /// Map head.
    Map(u16),
    /// Map head reported in [`DecodeMode::MapAsArray`](crate::DecodeMode::MapAsArray).
    MapAsArray(u16),
    /// Byte string.
    ByteString(&'data [u8]),
    /// Text string. The bytes are not UTF-8 validated here; the
    /// [`text`](crate::Decoder::text) accessor validates.
    TextString(&'data [u8]),
    /// Tag 2: big-endian unsigned magnitude.
    PosBignum(&'data [u8]),
    /// Tag 3: big-endian magnitude `n` of the value `-1 - n`.
    NegBignum(&'data [u8]),
    /// Tag 0: RFC 3339 date text.
    DateString(&'data [u8]),
    /// Tag 1004: RFC 8943 date text.
    DaysString(&'data [u8]),
    /// Tag 1: seconds since the epoch, split into whole seconds and a
    /// non-negative fraction below one.
    DateEpoch {
        /// Whole seconds since 1970-01-01T00:00Z.
        seconds: i64,
        /// Fractional second in `[0, 1)`.
        fraction: f64,
    },
    /// Tag 100: days since the epoch per RFC 8943.
    DaysEpoch(i64),
    /// Tag 4: `mantissa * 10^exponent`.
    DecimalFraction {
        /// Base-10 exponent.
        exponent: i64,
        /// Mantissa.
        mantissa: Mantissa<'data>,
    },
    /// Tag 5: `mantissa * 2^exponent`.
    BigFloat {
        /// Base-2 exponent.
        exponent: i64,
        /// Mantissa.
        mantissa: Mantissa<'data>,
    },
    /// Simple values 20 and 21.
    Bool(bool),
    /// Simple value 22.
    Null,
    /// Simple value 23.
    Undefined,
    /// Any other simple value.
    Simple(u8),
    /// Single-precision float, only surfaced when float conversions are
    /// compiled out; otherwise singles widen to `Double`.
    Float(f32),
    /// Double-precision float (halves and singles widen to this).
    Double(f64),
}

/// The mantissa of a decimal fraction or big float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mantissa<'data> {
    /// Integer mantissa.
    Int64(i64),
    /// Tag 2 bignum mantissa.
    PosBignum(&'data [u8]),
    /// Tag 3 bignum mantissa.
    NegBignum(&'data [u8]),
}

/// The label of a map entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Label<'data> {
    /// The item is not a map entry.
    None,
    /// Integer label.
    Int64(i64),
    /// Integer label above `i64::MAX`.
    UInt64(u64),
    /// Byte-string label.
    ByteString(&'data [u8]),
    /// Text-string label.
    TextString(&'data [u8]),
}

impl Label<'_> {
    /// Label equality for map lookup: integers match numerically across the
    /// signed/unsigned arms, strings match by major type and bytes.
    #[must_use]
    pub fn matches(&self, other: &Label<'_>) -> bool {
        match (self, other) {
            (Label::Int64(a), Label::Int64(b)) => a == b,
            (Label::UInt64(a), Label::UInt64(b)) => a == b,
            (Label::Int64(a), Label::UInt64(b)) | (Label::UInt64(b), Label::Int64(a)) => {
                u64::try_from(*a).is_ok_and(|a| a == *b)
            }
            (Label::ByteString(a), Label::ByteString(b))
            | (Label::TextString(a), Label::TextString(b)) => a == b,
            _ => false,
        }
    }
}

/// The kind of a decoded item, used to state per-call type expectations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ItemType {
    /// Matches any kind.
    Any,
    /// See [`Value::Int64`].
    Int64,
    /// See [`Value::UInt64`].
    UInt64,
    /// See [`Value::Array`].
    Array,
    /// See [`Value::Map`].
    Map,
    /// See [`Value::MapAsArray`].
    MapAsArray,
    /// See [`Value::ByteString`].
    ByteString,
    /// See [`Value::TextString`].
    TextString,
    /// See [`Value::PosBignum`].
    PosBignum,
    /// See [`Value::NegBignum`].
    NegBignum,
    /// See [`Value::DateString`].
    DateString,
    /// See [`Value::DaysString`].
    DaysString,
    /// See [`Value::DateEpoch`].
    DateEpoch,
    /// See [`Value::DaysEpoch`].
    DaysEpoch,
    /// See [`Value::DecimalFraction`].
    DecimalFraction,
    /// See [`Value::BigFloat`].
    BigFloat,
    /// See [`Value::Bool`].
    Bool,
    /// See [`Value::Null`].
    Null,
    /// See [`Value::Undefined`].
    Undefined,
    /// See [`Value::Simple`].
    Simple,
    /// See [`Value::Float`].
    Float,
    /// See [`Value::Double`].
    Double,
}

impl Value<'_> {
    /// The kind of this value.
    #[must_use]
    pub const fn item_type(&self) -> ItemType {
        match self {
            Value::Int64(_) => ItemType::Int64,
            Value::UInt64(_) => ItemType::UInt64,
            Value::Array(_) => ItemType::Array,
            Value::Map(_) => ItemType::Map,
            Value::MapAsArray(_) => ItemType::MapAsArray,
            Value::ByteString(_) => ItemType::ByteString,
            Value::TextString(_) => ItemType::TextString,
            Value::PosBignum(_) => ItemType::PosBignum,
            Value::NegBignum(_) => ItemType::NegBignum,
            Value::DateString(_) => ItemType::DateString,
            Value::DaysString(_) => ItemType::DaysString,
            Value::DateEpoch { .. } => ItemType::DateEpoch,
            Value::DaysEpoch(_) => ItemType::DaysEpoch,
            Value::DecimalFraction { .. } => ItemType::DecimalFraction,
            Value::BigFloat { .. } => ItemType::BigFloat,
            Value::Bool(_) => ItemType::Bool,
            Value::Null => ItemType::Null,
            Value::Undefined => ItemType::Undefined,
            Value::Simple(_) => ItemType::Simple,
            Value::Float(_) => ItemType::Float,
            Value::Double(_) => ItemType::Double,
        }
    }
}

/// One decoded data item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedItem<'data> {
    /// The item's kind and value.
    pub value: Value<'data>,
    /// The item's map label, or [`Label::None`].
    pub label: Label<'data>,
    /// Nesting depth at which this item occurred; 0 is the top level.
    pub nest_level: u8,
    /// Nesting depth after this item. A value below `nest_level` means one
    /// or more containers closed with this item; it can drop by several
    /// levels when a run of indefinite-length containers ends.
    pub next_nest_level: u8,
    /// Bitmap of recognised, non-promoted tags on this item.
    pub tags: TagSet,
    /// Whether the value's string bytes live in allocator memory rather
    /// than the input buffer.
    pub data_allocated: bool,
    /// Whether the label's string bytes live in allocator memory.
    pub label_allocated: bool,
}

impl DecodedItem<'_> {
    /// The kind of this item.
    #[must_use]
    pub const fn item_type(&self) -> ItemType {
        self.value.item_type()
    }
}
