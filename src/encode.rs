use crate::buffer::OutBuf;
use crate::head::{
    encode_break, encode_head, encode_indefinite_head, head_len, patch_head, MAJOR_ARRAY,
    MAJOR_BYTES, MAJOR_MAP, MAJOR_NEG_INT, MAJOR_POS_INT, MAJOR_SIMPLE, MAJOR_TAG, MAJOR_TEXT,
    SIMPLE_FALSE, SIMPLE_NULL, SIMPLE_TRUE, SIMPLE_UNDEF,
};
use crate::limits::{MAX_ARRAY_NESTING, MAX_ARRAY_OFFSET};
use crate::nesting::{EncodeNesting, OpenKind};
use crate::tags::{TAG_DATE_EPOCH, TAG_DATE_STRING, TAG_DAYS_EPOCH, TAG_DAYS_STRING,
    TAG_NEG_BIGNUM, TAG_POS_BIGNUM};
#[cfg(feature = "exp-mantissa")]
use crate::tags::{TAG_BIGFLOAT, TAG_DECIMAL_FRACTION};
use crate::{Error, ErrorCode};

#[cfg(feature = "preferred-float")]
use crate::float::{double_to_half, double_to_single, HALF_NAN};

/// Streaming CBOR encoder over a caller-supplied output buffer.
///
/// Bytes are written immediately; definite-length container heads reserve a
/// single byte at open and are widened on close by shifting the container's
/// payload right, so the common small container costs no shift at all.
///
/// A size-only encoder ([`Encoder::size_only`]) runs the same state machine
/// without a buffer and reports the length a buffered run would produce.
///
/// Multiple top-level items form a CBOR sequence; the encoder does not
/// reject them.
pub struct Encoder<'buf> {
    out: OutBuf<'buf>,
    nesting: EncodeNesting,
}

impl<'buf> Encoder<'buf> {
    /// Creates an encoder writing into `buffer`.
    #[must_use]
    pub fn new(buffer: &'buf mut [u8]) -> Self {
        Self {
            out: OutBuf::new(buffer),
            nesting: EncodeNesting::new(),
        }
    }

    /// Creates an encoder that computes the encoded size without writing.
    #[must_use]
    pub const fn size_only() -> Encoder<'static> {
        Encoder {
            out: OutBuf::size_only(),
            nesting: EncodeNesting::new(),
        }
    }

    /// The number of bytes written (or counted) so far.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.out.len()
    }

    fn err(&self, code: ErrorCode) -> Error {
        Error::new(code, self.out.len())
    }

    fn count_item(&mut self) -> Result<(), Error> {
        let off = self.out.len();
        self.nesting.increment(off)
    }

    /// Encodes an unsigned integer with preferred (minimal) length.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is exhausted or a container overflows.
    pub fn u64(&mut self, v: u64) -> Result<(), Error> {
        self.count_item()?;
        encode_head(&mut self.out, MAJOR_POS_INT, v)
    }

    /// Encodes a signed integer; negative values use major type 1 with the
    /// argument `-1 - v`.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is exhausted or a container overflows.
    pub fn i64(&mut self, v: i64) -> Result<(), Error> {
        self.count_item()?;
        if v >= 0 {
            encode_head(&mut self.out, MAJOR_POS_INT, v as u64)
        } else {
            let n = (-1_i128 - i128::from(v)) as u64;
            encode_head(&mut self.out, MAJOR_NEG_INT, n)
        }
    }

    /// Encodes a byte string.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is exhausted or a container overflows.
    pub fn bytes(&mut self, b: &[u8]) -> Result<(), Error> {
        self.count_item()?;
        encode_head(&mut self.out, MAJOR_BYTES, b.len() as u64)?;
        self.out.write(b)
    }

    /// Encodes a text string.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is exhausted or a container overflows.
    pub fn text(&mut self, s: &str) -> Result<(), Error> {
        self.count_item()?;
        let b = s.as_bytes();
        encode_head(&mut self.out, MAJOR_TEXT, b.len() as u64)?;
        self.out.write(b)
    }

    /// Encodes a boolean.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is exhausted or a container overflows.
    pub fn bool(&mut self, v: bool) -> Result<(), Error> {
        self.count_item()?;
        let arg = if v { SIMPLE_TRUE } else { SIMPLE_FALSE };
        encode_head(&mut self.out, MAJOR_SIMPLE, arg)
    }

    /// Encodes null.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is exhausted or a container overflows.
    pub fn null(&mut self) -> Result<(), Error> {
        self.count_item()?;
        encode_head(&mut self.out, MAJOR_SIMPLE, SIMPLE_NULL)
    }

    /// Encodes undefined.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is exhausted or a container overflows.
    pub fn undefined(&mut self) -> Result<(), Error> {
        self.count_item()?;
        encode_head(&mut self.out, MAJOR_SIMPLE, SIMPLE_UNDEF)
    }

    /// Encodes a simple value. Values 24..=31 are reserved by the wire
    /// format and rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorCode::EncodeUnsupported`] for reserved values, or a
    /// buffer/container error.
    pub fn simple(&mut self, v: u8) -> Result<(), Error> {
        if (24..=31).contains(&v) {
            return Err(self.err(ErrorCode::EncodeUnsupported));
        }
        self.count_item()?;
        encode_head(&mut self.out, MAJOR_SIMPLE, u64::from(v))
    }

    /// Encodes a tag head; the next item encoded inherits the tag. Calls
    /// stack, innermost last.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is exhausted.
    pub fn tag(&mut self, n: u64) -> Result<(), Error> {
        encode_head(&mut self.out, MAJOR_TAG, n)
    }

    /// Encodes a double with the narrowest width that represents the value
    /// exactly. NaN and the infinities always collapse to half precision.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is exhausted or a container overflows.
    #[cfg(feature = "float")]
    pub fn f64(&mut self, v: f64) -> Result<(), Error> {
        #[cfg(feature = "preferred-float")]
        {
            self.count_item()?;
            if v.is_nan() {
                return self.write_half(HALF_NAN);
            }
            if let Some(h) = double_to_half(v) {
                return self.write_half(h);
            }
            if let Some(s) = double_to_single(v) {
                return self.write_single(s);
            }
            self.write_double(v.to_bits())
        }
        #[cfg(not(feature = "preferred-float"))]
        {
            self.f64_full(v)
        }
    }

    /// Encodes a double at full width regardless of value.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is exhausted or a container overflows.
    #[cfg(feature = "float")]
    pub fn f64_full(&mut self, v: f64) -> Result<(), Error> {
        self.count_item()?;
        self.write_double(v.to_bits())
    }

    /// Encodes a single-precision float, narrowing to half when exact.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is exhausted or a container overflows.
    #[cfg(feature = "float")]
    pub fn f32(&mut self, v: f32) -> Result<(), Error> {
        #[cfg(feature = "preferred-float")]
        {
            self.count_item()?;
            if v.is_nan() {
                return self.write_half(HALF_NAN);
            }
            if let Some(h) = double_to_half(f64::from(v)) {
                return self.write_half(h);
            }
            self.write_single(v.to_bits())
        }
        #[cfg(not(feature = "preferred-float"))]
        {
            self.f32_full(v)
        }
    }

    /// Encodes a single-precision float at full width.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is exhausted or a container overflows.
    #[cfg(feature = "float")]
    pub fn f32_full(&mut self, v: f32) -> Result<(), Error> {
        self.count_item()?;
        self.write_single(v.to_bits())
    }

    #[cfg(feature = "float")]
    fn write_half(&mut self, h: u16) -> Result<(), Error> {
        self.out.write_u8(0xf9)?;
        self.out.write(&h.to_be_bytes())
    }

    #[cfg(feature = "float")]
    fn write_single(&mut self, s: u32) -> Result<(), Error> {
        self.out.write_u8(0xfa)?;
        self.out.write(&s.to_be_bytes())
    }

    #[cfg(feature = "float")]
    fn write_double(&mut self, d: u64) -> Result<(), Error> {
        self.out.write_u8(0xfb)?;
        self.out.write(&d.to_be_bytes())
    }

    /// Splices pre-encoded CBOR as the next item. The bytes are not
    /// validated.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is exhausted or a container overflows.
    pub fn raw_cbor(&mut self, encoded: &[u8]) -> Result<(), Error> {
        self.count_item()?;
        self.out.write(encoded)
    }

    fn open(&mut self, kind: OpenKind, indefinite: bool) -> Result<(), Error> {
        let start = self.out.len();
        if start > MAX_ARRAY_OFFSET {
            return Err(self.err(ErrorCode::BufferTooLarge));
        }
        if kind == OpenKind::Bstr && self.nesting.bstr_open() {
            return Err(self.err(ErrorCode::OpenByteString));
        }
        if self.nesting.depth() >= MAX_ARRAY_NESTING {
            return Err(self.err(ErrorCode::ArrayNestingTooDeep));
        }
        self.count_item()?;
        self.nesting.push(kind, indefinite, start, start)?;
        if indefinite {
            let major = match kind {
                OpenKind::Array => MAJOR_ARRAY,
                OpenKind::Map => MAJOR_MAP,
                OpenKind::Bstr => MAJOR_BYTES,
            };
            encode_indefinite_head(&mut self.out, major)
        } else {
            // Smallest possible head; widened on close if the count demands.
            self.out.write_u8(0)
        }
    }

    fn close(&mut self, kind: OpenKind) -> Result<(), Error> {
        let off = self.out.len();
        let frame = self.nesting.pop(kind, off)?;
        if frame.indefinite {
            return encode_break(&mut self.out);
        }
        let major = match kind {
            OpenKind::Array => MAJOR_ARRAY,
            OpenKind::Map => MAJOR_MAP,
            OpenKind::Bstr => MAJOR_BYTES,
        };
        let arg = match kind {
            OpenKind::Array => u64::from(frame.count),
            OpenKind::Map => {
                if frame.count % 2 != 0 {
                    return Err(Error::new(ErrorCode::CloseMismatch, off));
                }
                u64::from(frame.count / 2)
            }
            OpenKind::Bstr => (self.out.len() - frame.start - 1) as u64,
        };
        let need = head_len(arg);
        if need > 1 {
            self.out.insert_gap(frame.start + 1, need - 1)?;
        }
        patch_head(&mut self.out, frame.start, major, arg);
        Ok(())
    }

    /// Opens a definite-length array; items added until the matching close
    /// become its children.
    ///
    /// # Errors
    ///
    /// Returns an error on nesting or buffer exhaustion.
    pub fn open_array(&mut self) -> Result<(), Error> {
        self.open(OpenKind::Array, false)
    }

    /// Opens an indefinite-length array.
    ///
    /// # Errors
    ///
    /// Returns an error on nesting or buffer exhaustion.
    #[cfg(feature = "indef-containers")]
    pub fn open_array_indefinite(&mut self) -> Result<(), Error> {
        self.open(OpenKind::Array, true)
    }

    /// Opens a definite-length map; add entries as alternating label and
    /// value items.
    ///
    /// # Errors
    ///
    /// Returns an error on nesting or buffer exhaustion.
    pub fn open_map(&mut self) -> Result<(), Error> {
        self.open(OpenKind::Map, false)
    }

    /// Opens an indefinite-length map.
    ///
    /// # Errors
    ///
    /// Returns an error on nesting or buffer exhaustion.
    #[cfg(feature = "indef-containers")]
    pub fn open_map_indefinite(&mut self) -> Result<(), Error> {
        self.open(OpenKind::Map, true)
    }

    /// Opens a byte-string wrap: items encoded until the matching close
    /// become the payload of a byte string. Only one wrap may be open.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorCode::OpenByteString`] when a wrap is already open, or
    /// a nesting/buffer error.
    pub fn open_bytes_wrap(&mut self) -> Result<(), Error> {
        self.open(OpenKind::Bstr, false)
    }

    /// Closes the open array.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorCode::CloseMismatch`] if something else is open,
    /// [`ErrorCode::TooManyCloses`] if nothing is.
    pub fn close_array(&mut self) -> Result<(), Error> {
        self.close(OpenKind::Array)
    }

    /// Closes the open map.
    ///
    /// # Errors
    ///
    /// As [`close_array`](Self::close_array); additionally
    /// [`ErrorCode::CloseMismatch`] when an entry is missing its value.
    pub fn close_map(&mut self) -> Result<(), Error> {
        self.close(OpenKind::Map)
    }

    /// Closes the open byte-string wrap, backpatching the byte length.
    ///
    /// # Errors
    ///
    /// As [`close_array`](Self::close_array).
    pub fn close_bytes_wrap(&mut self) -> Result<(), Error> {
        self.close(OpenKind::Bstr)
    }

    /// Cancels a byte-string wrap that has no content yet.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorCode::CannotCancel`] once content has been written.
    pub fn cancel_bytes_wrap(&mut self) -> Result<(), Error> {
        let off = self.out.len();
        match self.nesting.top() {
            Some(frame) if frame.kind == OpenKind::Bstr => {
                if off != frame.start + 1 {
                    return Err(Error::new(ErrorCode::CannotCancel, off));
                }
            }
            _ => return Err(Error::new(ErrorCode::CloseMismatch, off)),
        }
        let frame = self.nesting.pop(OpenKind::Bstr, off)?;
        self.nesting.uncount();
        self.out.truncate_to(frame.start);
        Ok(())
    }

    /// Encodes a tag 1 epoch date from whole seconds.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is exhausted or a container overflows.
    pub fn date_epoch(&mut self, seconds: i64) -> Result<(), Error> {
        self.tag(TAG_DATE_EPOCH)?;
        self.i64(seconds)
    }

    /// Encodes a tag 100 epoch day count.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is exhausted or a container overflows.
    pub fn days_epoch(&mut self, days: i64) -> Result<(), Error> {
        self.tag(TAG_DAYS_EPOCH)?;
        self.i64(days)
    }

    /// Encodes a tag 0 RFC 3339 date string.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is exhausted or a container overflows.
    pub fn date_string(&mut self, s: &str) -> Result<(), Error> {
        self.tag(TAG_DATE_STRING)?;
        self.text(s)
    }

    /// Encodes a tag 1004 RFC 8943 date string.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is exhausted or a container overflows.
    pub fn days_string(&mut self, s: &str) -> Result<(), Error> {
        self.tag(TAG_DAYS_STRING)?;
        self.text(s)
    }

    /// Encodes a tag 2 positive bignum from a big-endian magnitude.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is exhausted or a container overflows.
    pub fn pos_bignum(&mut self, magnitude: &[u8]) -> Result<(), Error> {
        self.tag(TAG_POS_BIGNUM)?;
        self.bytes(magnitude)
    }

    /// Encodes a tag 3 negative bignum; the value is `-1 - magnitude`.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is exhausted or a container overflows.
    pub fn neg_bignum(&mut self, magnitude: &[u8]) -> Result<(), Error> {
        self.tag(TAG_NEG_BIGNUM)?;
        self.bytes(magnitude)
    }

    /// Encodes a tag 4 decimal fraction, `mantissa * 10^exponent`.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is exhausted or a container overflows.
    #[cfg(feature = "exp-mantissa")]
    pub fn decimal_fraction(&mut self, mantissa: i64, exponent: i64) -> Result<(), Error> {
        self.exp_mantissa_int(TAG_DECIMAL_FRACTION, mantissa, exponent)
    }

    /// Encodes a tag 4 decimal fraction with a bignum mantissa.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is exhausted or a container overflows.
    #[cfg(feature = "exp-mantissa")]
    pub fn decimal_fraction_bignum(
        &mut self,
        mantissa: &[u8],
        negative: bool,
        exponent: i64,
    ) -> Result<(), Error> {
        self.exp_mantissa_bignum(TAG_DECIMAL_FRACTION, mantissa, negative, exponent)
    }

    /// Encodes a tag 5 big float, `mantissa * 2^exponent`.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is exhausted or a container overflows.
    #[cfg(feature = "exp-mantissa")]
    pub fn big_float(&mut self, mantissa: i64, exponent: i64) -> Result<(), Error> {
        self.exp_mantissa_int(TAG_BIGFLOAT, mantissa, exponent)
    }

    /// Encodes a tag 5 big float with a bignum mantissa.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is exhausted or a container overflows.
    #[cfg(feature = "exp-mantissa")]
    pub fn big_float_bignum(
        &mut self,
        mantissa: &[u8],
        negative: bool,
        exponent: i64,
    ) -> Result<(), Error> {
        self.exp_mantissa_bignum(TAG_BIGFLOAT, mantissa, negative, exponent)
    }

    #[cfg(feature = "exp-mantissa")]
    fn exp_mantissa_int(&mut self, tag: u64, mantissa: i64, exponent: i64) -> Result<(), Error> {
        self.tag(tag)?;
        self.open_array()?;
        self.i64(exponent)?;
        self.i64(mantissa)?;
        self.close_array()
    }

    #[cfg(feature = "exp-mantissa")]
    fn exp_mantissa_bignum(
        &mut self,
        tag: u64,
        mantissa: &[u8],
        negative: bool,
        exponent: i64,
    ) -> Result<(), Error> {
        self.tag(tag)?;
        self.open_array()?;
        self.i64(exponent)?;
        if negative {
            self.neg_bignum(mantissa)?;
        } else {
            self.pos_bignum(mantissa)?;
        }
        self.close_array()
    }

    /// Finishes encoding, returning the total encoded length.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorCode::ArrayOrMapStillOpen`] if a container or wrap is
    /// still open.
    pub fn finish(self) -> Result<usize, Error> {
        if self.nesting.depth() != 0 {
            return Err(Error::new(ErrorCode::ArrayOrMapStillOpen, self.out.len()));
        }
        Ok(self.out.len())
    }

    /// Finishes encoding, returning the written prefix of the buffer. A
    /// size-only encoder returns an empty slice; use [`finish`](Self::finish)
    /// for the length.
    ///
    /// # Errors
    ///
    /// As [`finish`](Self::finish).
    pub fn finish_bytes(self) -> Result<&'buf [u8], Error> {
        if self.nesting.depth() != 0 {
            return Err(Error::new(ErrorCode::ArrayOrMapStillOpen, self.out.len()));
        }
        Ok(self.out.into_written())
    }
}
