//! Tag numbers, the recognised-tag table, and the per-item tag bitmap.
//!
//! Tags in [`BUILTIN_TAGS`] map to bits 0..48 of the bitmap; tags from the
//! caller-configured list map to bits 48..64. Tags that promote an item to a
//! dedicated kind (dates, bignums, decimal fractions, big floats) are
//! consumed by the promotion and never appear in the bitmap.

/// Tag 0: RFC 3339 date/time text.
pub const TAG_DATE_STRING: u64 = 0;
/// Tag 1: epoch-based date/time.
pub const TAG_DATE_EPOCH: u64 = 1;
/// Tag 2: positive bignum.
pub const TAG_POS_BIGNUM: u64 = 2;
/// Tag 3: negative bignum.
pub const TAG_NEG_BIGNUM: u64 = 3;
/// Tag 4: decimal fraction.
pub const TAG_DECIMAL_FRACTION: u64 = 4;
/// Tag 5: big float.
pub const TAG_BIGFLOAT: u64 = 5;
/// Tag 16: COSE single-recipient encrypted message.
pub const TAG_COSE_ENCRYPT0: u64 = 16;
/// Tag 17: COSE MACed message with no recipients.
pub const TAG_COSE_MAC0: u64 = 17;
/// Tag 18: COSE single-signer signed message.
pub const TAG_COSE_SIGN1: u64 = 18;
/// Tag 21: expected conversion to base64url.
pub const TAG_ENC_AS_B64URL: u64 = 21;
/// Tag 22: expected conversion to base64.
pub const TAG_ENC_AS_B64: u64 = 22;
/// Tag 23: expected conversion to base16.
pub const TAG_ENC_AS_B16: u64 = 23;
/// Tag 24: embedded CBOR data item.
pub const TAG_CBOR: u64 = 24;
/// Tag 32: URI text.
pub const TAG_URI: u64 = 32;
/// Tag 33: base64url-encoded text.
pub const TAG_B64URL: u64 = 33;
/// Tag 34: base64-encoded text.
pub const TAG_B64: u64 = 34;
/// Tag 35: regular expression text.
pub const TAG_REGEX: u64 = 35;
/// Tag 36: MIME message text.
pub const TAG_MIME: u64 = 36;
/// Tag 37: binary UUID.
pub const TAG_BIN_UUID: u64 = 37;
/// Tag 61: CBOR Web Token.
pub const TAG_CWT: u64 = 61;
/// Tag 63: CBOR sequence.
pub const TAG_CBOR_SEQUENCE: u64 = 63;
/// Tag 96: COSE encrypted message.
pub const TAG_COSE_ENCRYPT: u64 = 96;
/// Tag 97: COSE MACed message.
pub const TAG_COSE_MAC: u64 = 97;
/// Tag 98: COSE signed message.
pub const TAG_COSE_SIGN: u64 = 98;
/// Tag 100: days since the epoch (RFC 8943).
pub const TAG_DAYS_EPOCH: u64 = 100;
/// Tag 103: geographic coordinates.
pub const TAG_GEO_COORD: u64 = 103;
/// Tag 257: binary MIME message.
pub const TAG_BINARY_MIME: u64 = 257;
/// Tag 1004: date text without time (RFC 8943).
pub const TAG_DAYS_STRING: u64 = 1004;
/// Tag 55799: self-described CBOR.
pub const TAG_CBOR_MAGIC: u64 = 55799;

/// Recognised tags, indexed by bitmap bit.
pub(crate) const BUILTIN_TAGS: &[u64] = &[
    TAG_DATE_STRING,
    TAG_DATE_EPOCH,
    TAG_POS_BIGNUM,
    TAG_NEG_BIGNUM,
    TAG_DECIMAL_FRACTION,
    TAG_BIGFLOAT,
    TAG_COSE_ENCRYPT0,
    TAG_COSE_MAC0,
    TAG_COSE_SIGN1,
    TAG_ENC_AS_B64URL,
    TAG_ENC_AS_B64,
    TAG_ENC_AS_B16,
    TAG_CBOR,
    TAG_URI,
    TAG_B64URL,
    TAG_B64,
    TAG_REGEX,
    TAG_MIME,
    TAG_BIN_UUID,
    TAG_CWT,
    TAG_CBOR_SEQUENCE,
    TAG_COSE_ENCRYPT,
    TAG_COSE_MAC,
    TAG_COSE_SIGN,
    TAG_DAYS_EPOCH,
    TAG_GEO_COORD,
    TAG_BINARY_MIME,
    TAG_DAYS_STRING,
    TAG_CBOR_MAGIC,
];

/// First bitmap bit assigned to caller-configured tags.
pub(crate) const CUSTOM_TAG_BASE: u32 = 48;

/// Bitmap of recognised tags attached to one decoded item.
///
/// Bits are positions in an internal table, so membership is queried through
/// [`Decoder::is_tagged`](crate::Decoder::is_tagged), which knows the
/// caller-configured part of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TagSet(pub(crate) u64);

impl TagSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Returns `true` if no recognised tags were attached.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub(crate) fn insert_builtin(&mut self, tag: u64) -> bool {
        if let Some(bit) = BUILTIN_TAGS.iter().position(|&t| t == tag) {
            self.0 |= 1 << bit;
            true
        } else {
            false
        }
    }

    pub(crate) fn insert_custom(&mut self, index: usize) {
        self.0 |= 1 << (CUSTOM_TAG_BASE + index as u32);
    }

    pub(crate) fn contains_builtin(&self, tag: u64) -> bool {
        BUILTIN_TAGS
            .iter()
            .position(|&t| t == tag)
            .is_some_and(|bit| self.0 & (1 << bit) != 0)
    }

    pub(crate) const fn contains_custom(&self, index: usize) -> bool {
        self.0 & (1 << (CUSTOM_TAG_BASE + index as u32)) != 0
    }
}
