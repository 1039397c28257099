use core::fmt;

/// A structured error code identifying why an encode or decode call failed.
///
/// Codes are stable numbers partitioned into bands so that classification
/// reduces to range comparisons:
///
/// - `1..=19` encoder errors,
/// - `20..=29` input not well-formed,
/// - `30..=39` input not well-formed and decoding cannot continue,
/// - `40..=59` content-valid input that hit an implementation limit
///   (decoding cannot continue),
/// - `60..` recoverable content errors (type mismatches, lookups,
///   conversions).
///
/// This enum is intentionally string-free to support `no_std` and to remain
/// hot-path friendly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
#[repr(u8)]
pub enum ErrorCode {
    /// The output buffer is too small for the encoded output.
    BufferTooSmall = 1,
    /// Attempt to encode a simple value between 24 and 31.
    EncodeUnsupported = 2,
    /// The encoded output grew past [`MAX_ARRAY_OFFSET`](crate::limits::MAX_ARRAY_OFFSET).
    BufferTooLarge = 3,
    /// Encoder array/map nesting deeper than [`MAX_ARRAY_NESTING`](crate::limits::MAX_ARRAY_NESTING).
    ArrayNestingTooDeep = 4,
    /// A close call named a different container kind than is open.
    CloseMismatch = 5,
    /// A container holds more than [`MAX_ITEMS_IN_ARRAY`](crate::limits::MAX_ITEMS_IN_ARRAY) items.
    ArrayTooLong = 6,
    /// More containers were closed than opened.
    TooManyCloses = 7,
    /// `finish` was called with an array, map, or wrap still open.
    ArrayOrMapStillOpen = 8,
    /// A byte-string wrap was opened while another wrap is open.
    OpenByteString = 9,
    /// A byte-string wrap was cancelled after content was written.
    CannotCancel = 10,

    /// A simple value below 32 was encoded in two bytes.
    BadType7 = 20,
    /// Input bytes remain after the decoded items.
    ExtraBytes = 21,
    /// A reserved additional-info value (28..=30) was used.
    Unsupported = 22,
    /// `finish` was called with an array or map not fully consumed.
    ArrayOrMapUnconsumed = 23,
    /// An integer or tag head carried an indefinite-length marker.
    BadInt = 24,
    /// A non-minimal integer encoding was rejected in strict mode.
    NonMinimalEncoding = 25,

    /// An indefinite-length string chunk is not of the string's major type.
    IndefiniteStringChunk = 30,
    /// The end of the input was hit mid-item.
    HitEnd = 31,
    /// A break occurred outside an indefinite-length container.
    BadBreak = 32,

    /// The input is larger than [`MAX_DECODE_INPUT_SIZE`](crate::limits::MAX_DECODE_INPUT_SIZE).
    InputTooLarge = 40,
    /// Decoder array/map nesting deeper than [`MAX_ARRAY_NESTING`](crate::limits::MAX_ARRAY_NESTING).
    ArrayDecodeNestingTooDeep = 41,
    /// A container head declares more than [`MAX_ITEMS_IN_ARRAY`](crate::limits::MAX_ITEMS_IN_ARRAY) items.
    ArrayDecodeTooLong = 42,
    /// A string's declared length does not fit this platform's `usize`.
    StringTooLong = 43,
    /// A decimal fraction or big float is not a two-element array of
    /// exponent and mantissa.
    BadExpAndMantissa = 44,
    /// An indefinite-length string was found but no string allocator is
    /// configured.
    NoStringAllocator = 45,
    /// The string allocator ran out of space.
    StringAllocate = 46,
    /// A map label's type cannot be handled in the current decode mode.
    MapLabelType = 47,
    /// Built-in tag decoding encountered content of an unexpected type.
    UnrecoverableTagContent = 48,
    /// Indefinite-length string support is compiled out.
    IndefLenStringsDisabled = 49,
    /// Indefinite-length array and map support is compiled out.
    IndefLenArraysDisabled = 50,
    /// Decimal fraction and big float support is compiled out.
    ExpMantissaDisabled = 51,

    /// More consecutive tags than [`MAX_TAGS_PER_ITEM`](crate::limits::MAX_TAGS_PER_ITEM), or a tag
    /// output slice was too small.
    TooManyTags = 60,
    /// The decoded item is not of the requested type.
    UnexpectedType = 61,
    /// Duplicate label detected in a map.
    DuplicateLabel = 62,
    /// The memory pool buffer is smaller than [`MIN_MEM_POOL_SIZE`](crate::limits::MIN_MEM_POOL_SIZE).
    MemPoolSize = 63,
    /// An integer below `i64::MIN` was decoded (CBOR can represent it, the
    /// item model cannot).
    IntOverflow = 64,
    /// An epoch date outside the representable ±292-billion-year range.
    DateOverflow = 65,
    /// An exit call named a different container kind than was entered.
    ExitMismatch = 66,
    /// All items have been consumed; the non-error end of a stream.
    NoMoreItems = 67,
    /// No item with the requested label exists in the map.
    LabelNotFound = 68,
    /// Number conversion failed because of sign.
    NumberSignConversion = 69,
    /// The value is too large or too small for the conversion target.
    ConversionUnderOverFlow = 70,
    /// An in-map operation was called without an entered map.
    MapNotEntered = 71,
    /// Half-precision float support is compiled out.
    HalfPrecisionDisabled = 74,
    /// Float/integer conversion support is compiled out.
    HwFloatDisabled = 75,
    /// A NaN or infinity was encountered where a finite number is required.
    FloatException = 76,
    /// Float support is compiled out entirely.
    AllFloatDisabled = 77,
    /// Tag content of an unexpected type was consumed; decoding may resume.
    RecoverableBadTagContent = 78,
    /// A text string is not valid UTF-8.
    InvalidUtf8 = 79,
}

impl ErrorCode {
    /// The stable numeric code.
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Returns `true` if this code means the input is not well-formed CBOR.
    #[inline]
    #[must_use]
    pub const fn is_not_well_formed(self) -> bool {
        let c = self as u8;
        c >= 20 && c <= 39
    }

    /// Returns `true` if no further decoding is possible after this error.
    #[inline]
    #[must_use]
    pub const fn is_unrecoverable(self) -> bool {
        let c = self as u8;
        c >= 30 && c <= 59
    }

    /// A short human-readable description of the code.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::BufferTooSmall => "output buffer too small",
            Self::EncodeUnsupported => "simple values 24..=31 cannot be encoded",
            Self::BufferTooLarge => "encoded output too large",
            Self::ArrayNestingTooDeep => "encoder nesting too deep",
            Self::CloseMismatch => "close does not match the open container",
            Self::ArrayTooLong => "too many items in array or map",
            Self::TooManyCloses => "more closes than opens",
            Self::ArrayOrMapStillOpen => "array or map still open at finish",
            Self::OpenByteString => "byte-string wrap already open",
            Self::CannotCancel => "byte-string wrap has content",

            Self::BadType7 => "two-byte encoding of simple value below 32",
            Self::ExtraBytes => "trailing bytes after decoded items",
            Self::Unsupported => "reserved additional-info value",
            Self::ArrayOrMapUnconsumed => "array or map not fully consumed",
            Self::BadInt => "indefinite-length marker on an integer or tag",
            Self::NonMinimalEncoding => "non-minimal integer encoding",

            Self::IndefiniteStringChunk => "bad indefinite-length string chunk",
            Self::HitEnd => "unexpected end of input",
            Self::BadBreak => "break outside an indefinite-length container",

            Self::InputTooLarge => "input too large",
            Self::ArrayDecodeNestingTooDeep => "decoder nesting too deep",
            Self::ArrayDecodeTooLong => "container declares too many items",
            Self::StringTooLong => "string length exceeds address space",
            Self::BadExpAndMantissa => "malformed exponent/mantissa array",
            Self::NoStringAllocator => "no string allocator configured",
            Self::StringAllocate => "string allocation failed",
            Self::MapLabelType => "map label type not handled in this mode",
            Self::UnrecoverableTagContent => "bad content for a built-in tag",
            Self::IndefLenStringsDisabled => "indefinite-length strings disabled",
            Self::IndefLenArraysDisabled => "indefinite-length containers disabled",
            Self::ExpMantissaDisabled => "decimal fractions and big floats disabled",

            Self::TooManyTags => "too many tags on one item",
            Self::UnexpectedType => "item is not of the requested type",
            Self::DuplicateLabel => "duplicate map label",
            Self::MemPoolSize => "memory pool too small",
            Self::IntOverflow => "integer below i64::MIN",
            Self::DateOverflow => "epoch date out of range",
            Self::ExitMismatch => "exit does not match the entered container",
            Self::NoMoreItems => "no more items",
            Self::LabelNotFound => "label not found in map",
            Self::NumberSignConversion => "number conversion failed on sign",
            Self::ConversionUnderOverFlow => "number conversion out of range",
            Self::MapNotEntered => "no map entered",
            Self::HalfPrecisionDisabled => "half-precision floats disabled",
            Self::HwFloatDisabled => "float conversions disabled",
            Self::FloatException => "NaN or infinity where a finite number is required",
            Self::AllFloatDisabled => "float support disabled",
            Self::RecoverableBadTagContent => "bad tag content (consumed)",
            Self::InvalidUtf8 => "text is not valid UTF-8",
        }
    }
}

/// An encode or decode error with a stable code and a byte offset.
///
/// For decode errors the offset is the input position where the error was
/// detected; for encode errors it is the number of bytes written so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Error {
    /// The error code.
    pub code: ErrorCode,
    /// Byte offset at which the error was detected.
    pub offset: usize,
}

impl Error {
    /// Construct an error at `offset`.
    #[inline]
    #[must_use]
    pub const fn new(code: ErrorCode, offset: usize) -> Self {
        Self { code, offset }
    }

    /// Returns `true` if the input is not well-formed CBOR.
    #[inline]
    #[must_use]
    pub const fn is_not_well_formed(&self) -> bool {
        self.code.is_not_well_formed()
    }

    /// Returns `true` if no further decoding is possible.
    #[inline]
    #[must_use]
    pub const fn is_unrecoverable(&self) -> bool {
        self.code.is_unrecoverable()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cbor error at {}: {}", self.offset, self.code.message())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
