//! Safe numeric conversions and the typed convenience accessors.
//!
//! The conversion functions take the union of source kinds the caller is
//! willing to accept as a [`Convert`] bitmask; a kind outside the mask is
//! `UnexpectedType` even when a conversion would be possible.

use crate::decode::Decoder;
use crate::item::{ItemType, Label, Value};
#[cfg(feature = "exp-mantissa")]
use crate::item::Mantissa;
use crate::utf8;
use crate::{Error, ErrorCode};

/// Source kinds accepted by a numeric conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Convert(u32);

impl Convert {
    /// Major type 0/1 integers.
    pub const XINT64: Self = Self(0x01);
    /// Half, single, and double floats.
    pub const FLOAT: Self = Self(0x02);
    /// Tag 2/3 bignums.
    pub const BIG_NUM: Self = Self(0x04);
    /// Tag 4 decimal fractions.
    pub const DECIMAL_FRACTION: Self = Self(0x08);
    /// Tag 5 big floats.
    pub const BIG_FLOAT: Self = Self(0x10);
    /// Every supported source kind.
    pub const ALL: Self = Self(0x1f);

    /// Whether every kind in `other` is included.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl core::ops::BitOr for Convert {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

fn bignum_to_u64(bytes: &[u8]) -> Result<u64, ErrorCode> {
    let mut acc: u64 = 0;
    for &b in bytes {
        acc = acc
            .checked_mul(256)
            .and_then(|acc| acc.checked_add(u64::from(b)))
            .ok_or(ErrorCode::ConversionUnderOverFlow)?;
    }
    Ok(acc)
}

/// `value * base^exponent` in checked integer arithmetic. A negative
/// exponent must divide exactly.
fn exponentiate_i64(value: i64, exponent: i64, base: i64) -> Result<i64, ErrorCode> {
    let mut v = value;
    if exponent >= 0 {
        for _ in 0..exponent {
            if v == 0 {
                return Ok(0);
            }
            v = v.checked_mul(base).ok_or(ErrorCode::ConversionUnderOverFlow)?;
        }
    } else {
        for _ in 0..exponent.unsigned_abs() {
            if v == 0 {
                return Ok(0);
            }
            if v % base != 0 {
                return Err(ErrorCode::ConversionUnderOverFlow);
            }
            v /= base;
        }
    }
    Ok(v)
}

fn exponentiate_u64(value: u64, exponent: i64, base: u64) -> Result<u64, ErrorCode> {
    let mut v = value;
    if exponent >= 0 {
        for _ in 0..exponent {
            if v == 0 {
                return Ok(0);
            }
            v = v.checked_mul(base).ok_or(ErrorCode::ConversionUnderOverFlow)?;
        }
    } else {
        for _ in 0..exponent.unsigned_abs() {
            if v == 0 {
                return Ok(0);
            }
            if v % base != 0 {
                return Err(ErrorCode::ConversionUnderOverFlow);
            }
            v /= base;
        }
    }
    Ok(v)
}

#[cfg(feature = "float-hw")]
fn floor_f64(d: f64) -> f64 {
    // d is within the i64 range when this is called.
    let t = (d as i64) as f64;
    if t > d {
        t - 1.0
    } else {
        t
    }
}

/// Round to nearest, ties to even; `d` must be finite.
#[cfg(feature = "float-hw")]
fn round_ties_even(d: f64) -> f64 {
    let fl = floor_f64(d);
    let frac = d - fl;
    if frac > 0.5 {
        fl + 1.0
    } else if frac < 0.5 {
        fl
    } else if (fl as i64) % 2 == 0 {
        fl
    } else {
        fl + 1.0
    }
}

#[cfg(feature = "float-hw")]
fn float_to_i64(d: f64) -> Result<i64, ErrorCode> {
    if d.is_nan() || d.is_infinite() {
        return Err(ErrorCode::FloatException);
    }
    if !(d >= -9.223_372_036_854_776e18 && d < 9.223_372_036_854_776e18) {
        return Err(ErrorCode::ConversionUnderOverFlow);
    }
    let r = round_ties_even(d);
    if !(r >= -9.223_372_036_854_776e18 && r < 9.223_372_036_854_776e18) {
        return Err(ErrorCode::ConversionUnderOverFlow);
    }
    Ok(r as i64)
}

#[cfg(feature = "float-hw")]
fn float_to_u64(d: f64) -> Result<u64, ErrorCode> {
    if d.is_nan() || d.is_infinite() {
        return Err(ErrorCode::FloatException);
    }
    if d >= 1.844_674_407_370_955_2e19 {
        return Err(ErrorCode::ConversionUnderOverFlow);
    }
    if d >= 9.223_372_036_854_776e18 {
        // Above the i64 range every representable double is integral.
        return Ok(d as u64);
    }
    if d <= -1.0 {
        return Err(ErrorCode::NumberSignConversion);
    }
    let r = round_ties_even(d);
    if r < 0.0 {
        return Err(ErrorCode::NumberSignConversion);
    }
    Ok(r as u64)
}

/// `base^exponent` by repeated multiplication; overflows to infinity and
/// underflows to zero, which is exactly the clamping the float conversions
/// want.
#[cfg(feature = "float-hw")]
fn pow_f64(base: f64, exponent: i64) -> f64 {
    let mut r = 1.0_f64;
    for _ in 0..exponent.unsigned_abs() {
        if exponent >= 0 {
            r *= base;
        } else {
            r /= base;
        }
        if r == 0.0 || r.is_infinite() {
            break;
        }
    }
    r
}

#[cfg(feature = "float-hw")]
fn bignum_to_f64(bytes: &[u8]) -> f64 {
    let mut acc = 0.0_f64;
    for &b in bytes {
        acc = acc * 256.0 + f64::from(b);
    }
    acc
}

#[cfg(all(feature = "exp-mantissa", feature = "float-hw"))]
fn mantissa_to_f64(m: &Mantissa<'_>) -> f64 {
    match m {
        Mantissa::Int64(v) => *v as f64,
        Mantissa::PosBignum(b) => bignum_to_f64(b),
        Mantissa::NegBignum(b) => -bignum_to_f64(b) - 1.0,
    }
}

#[cfg(feature = "exp-mantissa")]
fn mantissa_to_i64(m: &Mantissa<'_>) -> Result<i64, ErrorCode> {
    match m {
        Mantissa::Int64(v) => Ok(*v),
        Mantissa::PosBignum(b) => {
            i64::try_from(bignum_to_u64(b)?).map_err(|_| ErrorCode::ConversionUnderOverFlow)
        }
        Mantissa::NegBignum(b) => {
            let n = bignum_to_u64(b)?;
            i64::try_from(n)
                .map(|n| -1 - n)
                .map_err(|_| ErrorCode::ConversionUnderOverFlow)
        }
    }
}

pub(crate) fn to_i64(value: &Value<'_>, opts: Convert) -> Result<i64, ErrorCode> {
    match *value {
        Value::Int64(v) if opts.contains(Convert::XINT64) => Ok(v),
        Value::UInt64(v) if opts.contains(Convert::XINT64) => {
            i64::try_from(v).map_err(|_| ErrorCode::ConversionUnderOverFlow)
        }
        #[cfg(feature = "float")]
        Value::Double(_) | Value::Float(_) if opts.contains(Convert::FLOAT) => {
            #[cfg(not(feature = "float-hw"))]
            {
                Err(ErrorCode::HwFloatDisabled)
            }
            #[cfg(feature = "float-hw")]
            {
                let d = match *value {
                    Value::Double(d) => d,
                    Value::Float(f) => f64::from(f),
                    _ => unreachable!(),
                };
                float_to_i64(d)
            }
        }
        Value::PosBignum(b) if opts.contains(Convert::BIG_NUM) => {
            i64::try_from(bignum_to_u64(b)?).map_err(|_| ErrorCode::ConversionUnderOverFlow)
        }
        Value::NegBignum(b) if opts.contains(Convert::BIG_NUM) => {
            let n = bignum_to_u64(b)?;
            i64::try_from(n)
                .map(|n| -1 - n)
                .map_err(|_| ErrorCode::ConversionUnderOverFlow)
        }
        #[cfg(feature = "exp-mantissa")]
        Value::DecimalFraction { exponent, mantissa }
            if opts.contains(Convert::DECIMAL_FRACTION) =>
        {
            exponentiate_i64(mantissa_to_i64(&mantissa)?, exponent, 10)
        }
        #[cfg(feature = "exp-mantissa")]
        Value::BigFloat { exponent, mantissa } if opts.contains(Convert::BIG_FLOAT) => {
            exponentiate_i64(mantissa_to_i64(&mantissa)?, exponent, 2)
        }
        _ => Err(ErrorCode::UnexpectedType),
    }
}

pub(crate) fn to_u64(value: &Value<'_>, opts: Convert) -> Result<u64, ErrorCode> {
    match *value {
        Value::Int64(v) if opts.contains(Convert::XINT64) => {
            u64::try_from(v).map_err(|_| ErrorCode::NumberSignConversion)
        }
        Value::UInt64(v) if opts.contains(Convert::XINT64) => Ok(v),
        #[cfg(feature = "float")]
        Value::Double(_) | Value::Float(_) if opts.contains(Convert::FLOAT) => {
            #[cfg(not(feature = "float-hw"))]
            {
                Err(ErrorCode::HwFloatDisabled)
            }
            #[cfg(feature = "float-hw")]
            {
                let d = match *value {
                    Value::Double(d) => d,
                    Value::Float(f) => f64::from(f),
                    _ => unreachable!(),
                };
                float_to_u64(d)
            }
        }
        Value::PosBignum(b) if opts.contains(Convert::BIG_NUM) => bignum_to_u64(b),
        Value::NegBignum(_) if opts.contains(Convert::BIG_NUM) => {
            Err(ErrorCode::NumberSignConversion)
        }
        #[cfg(feature = "exp-mantissa")]
        Value::DecimalFraction { exponent, mantissa }
            if opts.contains(Convert::DECIMAL_FRACTION) =>
        {
            exponentiate_u64(unsigned_mantissa(&mantissa)?, exponent, 10)
        }
        #[cfg(feature = "exp-mantissa")]
        Value::BigFloat { exponent, mantissa } if opts.contains(Convert::BIG_FLOAT) => {
            exponentiate_u64(unsigned_mantissa(&mantissa)?, exponent, 2)
        }
        _ => Err(ErrorCode::UnexpectedType),
    }
}

#[cfg(feature = "exp-mantissa")]
fn unsigned_mantissa(m: &Mantissa<'_>) -> Result<u64, ErrorCode> {
    match m {
        Mantissa::Int64(v) => u64::try_from(*v).map_err(|_| ErrorCode::NumberSignConversion),
        Mantissa::PosBignum(b) => bignum_to_u64(b),
        Mantissa::NegBignum(_) => Err(ErrorCode::NumberSignConversion),
    }
}

#[cfg(feature = "float")]
pub(crate) fn to_f64(value: &Value<'_>, opts: Convert) -> Result<f64, ErrorCode> {
    match *value {
        Value::Double(d) if opts.contains(Convert::FLOAT) => Ok(d),
        Value::Float(f) if opts.contains(Convert::FLOAT) => Ok(f64::from(f)),
        Value::Int64(_)
        | Value::UInt64(_)
        | Value::PosBignum(_)
        | Value::NegBignum(_)
        | Value::DecimalFraction { .. }
        | Value::BigFloat { .. } => {
            #[cfg(not(feature = "float-hw"))]
            {
                Err(ErrorCode::HwFloatDisabled)
            }
            #[cfg(feature = "float-hw")]
            {
                match *value {
                    Value::Int64(v) if opts.contains(Convert::XINT64) => Ok(v as f64),
                    Value::UInt64(v) if opts.contains(Convert::XINT64) => Ok(v as f64),
                    Value::PosBignum(b) if opts.contains(Convert::BIG_NUM) => Ok(bignum_to_f64(b)),
                    Value::NegBignum(b) if opts.contains(Convert::BIG_NUM) => {
                        Ok(-bignum_to_f64(b) - 1.0)
                    }
                    #[cfg(feature = "exp-mantissa")]
                    Value::DecimalFraction { exponent, mantissa }
                        if opts.contains(Convert::DECIMAL_FRACTION) =>
                    {
                        Ok(mantissa_to_f64(&mantissa) * pow_f64(10.0, exponent))
                    }
                    #[cfg(feature = "exp-mantissa")]
                    Value::BigFloat { exponent, mantissa }
                        if opts.contains(Convert::BIG_FLOAT) =>
                    {
                        Ok(mantissa_to_f64(&mantissa) * pow_f64(2.0, exponent))
                    }
                    _ => Err(ErrorCode::UnexpectedType),
                }
            }
        }
        _ => Err(ErrorCode::UnexpectedType),
    }
}

impl<'data> Decoder<'data> {
    fn converted<T>(
        &mut self,
        opts: Convert,
        convert: impl Fn(&Value<'data>, Convert) -> Result<T, ErrorCode>,
    ) -> Result<T, Error> {
        self.check_sticky()?;
        let result = self.next_entry(false).and_then(|item| {
            convert(&item.value, opts).map_err(|code| Error::new(code, self.position()))
        });
        result.map_err(|e| self.record(e))
    }

    fn converted_in_map<T>(
        &mut self,
        label: &Label<'_>,
        opts: Convert,
        convert: impl Fn(&Value<'data>, Convert) -> Result<T, ErrorCode>,
    ) -> Result<T, Error> {
        self.check_sticky()?;
        let result = self.map_search(label, ItemType::Any).and_then(|(item, _)| {
            convert(&item.value, opts).map_err(|code| Error::new(code, self.position()))
        });
        result.map_err(|e| self.record(e))
    }

    /// Returns the next item as a signed integer.
    ///
    /// # Errors
    ///
    /// [`ErrorCode::UnexpectedType`] for non-integers,
    /// [`ErrorCode::ConversionUnderOverFlow`] for unsigned values above
    /// `i64::MAX`. Sticky.
    pub fn i64(&mut self) -> Result<i64, Error> {
        self.converted(Convert::XINT64, |v, o| to_i64(v, o))
    }

    /// Returns the entry with integer label `label` as a signed integer.
    ///
    /// # Errors
    ///
    /// As [`i64`](Self::i64), plus the map-lookup errors. Sticky.
    pub fn i64_in_map(&mut self, label: i64) -> Result<i64, Error> {
        self.converted_in_map(&Label::Int64(label), Convert::XINT64, |v, o| to_i64(v, o))
    }

    /// Returns the entry with text label `label` as a signed integer.
    ///
    /// # Errors
    ///
    /// As [`i64_in_map`](Self::i64_in_map). Sticky.
    pub fn i64_in_map_str(&mut self, label: &str) -> Result<i64, Error> {
        self.converted_in_map(
            &Label::TextString(label.as_bytes()),
            Convert::XINT64,
            |v, o| to_i64(v, o),
        )
    }

    /// Returns the next item as a signed integer, converting from any of
    /// the kinds in `opts`.
    ///
    /// # Errors
    ///
    /// As [`i64`](Self::i64), plus conversion-specific errors. Sticky.
    pub fn i64_convert(&mut self, opts: Convert) -> Result<i64, Error> {
        self.converted(opts, |v, o| to_i64(v, o))
    }

    /// As [`i64_convert`](Self::i64_convert) for an integer-labelled entry.
    ///
    /// # Errors
    ///
    /// As [`i64_convert`](Self::i64_convert) plus map-lookup errors. Sticky.
    pub fn i64_convert_in_map(&mut self, label: i64, opts: Convert) -> Result<i64, Error> {
        self.converted_in_map(&Label::Int64(label), opts, |v, o| to_i64(v, o))
    }

    /// As [`i64_convert`](Self::i64_convert) for a text-labelled entry.
    ///
    /// # Errors
    ///
    /// As [`i64_convert`](Self::i64_convert) plus map-lookup errors. Sticky.
    pub fn i64_convert_in_map_str(&mut self, label: &str, opts: Convert) -> Result<i64, Error> {
        self.converted_in_map(&Label::TextString(label.as_bytes()), opts, |v, o| {
            to_i64(v, o)
        })
    }

    /// Returns the next item as an unsigned integer.
    ///
    /// # Errors
    ///
    /// [`ErrorCode::NumberSignConversion`] for negative values; otherwise as
    /// [`i64`](Self::i64). Sticky.
    pub fn u64(&mut self) -> Result<u64, Error> {
        self.converted(Convert::XINT64, |v, o| to_u64(v, o))
    }

    /// Returns the entry with integer label `label` as an unsigned integer.
    ///
    /// # Errors
    ///
    /// As [`u64`](Self::u64) plus map-lookup errors. Sticky.
    pub fn u64_in_map(&mut self, label: i64) -> Result<u64, Error> {
        self.converted_in_map(&Label::Int64(label), Convert::XINT64, |v, o| to_u64(v, o))
    }

    /// Returns the entry with text label `label` as an unsigned integer.
    ///
    /// # Errors
    ///
    /// As [`u64`](Self::u64) plus map-lookup errors. Sticky.
    pub fn u64_in_map_str(&mut self, label: &str) -> Result<u64, Error> {
        self.converted_in_map(
            &Label::TextString(label.as_bytes()),
            Convert::XINT64,
            |v, o| to_u64(v, o),
        )
    }

    /// Returns the next item as an unsigned integer, converting from any of
    /// the kinds in `opts`.
    ///
    /// # Errors
    ///
    /// As [`u64`](Self::u64) plus conversion-specific errors. Sticky.
    pub fn u64_convert(&mut self, opts: Convert) -> Result<u64, Error> {
        self.converted(opts, |v, o| to_u64(v, o))
    }

    /// As [`u64_convert`](Self::u64_convert) for an integer-labelled entry.
    ///
    /// # Errors
    ///
    /// As [`u64_convert`](Self::u64_convert) plus map-lookup errors. Sticky.
    pub fn u64_convert_in_map(&mut self, label: i64, opts: Convert) -> Result<u64, Error> {
        self.converted_in_map(&Label::Int64(label), opts, |v, o| to_u64(v, o))
    }

    /// As [`u64_convert`](Self::u64_convert) for a text-labelled entry.
    ///
    /// # Errors
    ///
    /// As [`u64_convert`](Self::u64_convert) plus map-lookup errors. Sticky.
    pub fn u64_convert_in_map_str(&mut self, label: &str, opts: Convert) -> Result<u64, Error> {
        self.converted_in_map(&Label::TextString(label.as_bytes()), opts, |v, o| {
            to_u64(v, o)
        })
    }

    /// Returns the next item as a double.
    ///
    /// # Errors
    ///
    /// [`ErrorCode::UnexpectedType`] for non-floats. Sticky.
    #[cfg(feature = "float")]
    pub fn f64(&mut self) -> Result<f64, Error> {
        self.converted(Convert::FLOAT, |v, o| to_f64(v, o))
    }

    /// Returns the entry with integer label `label` as a double.
    ///
    /// # Errors
    ///
    /// As [`f64`](Self::f64) plus map-lookup errors. Sticky.
    #[cfg(feature = "float")]
    pub fn f64_in_map(&mut self, label: i64) -> Result<f64, Error> {
        self.converted_in_map(&Label::Int64(label), Convert::FLOAT, |v, o| to_f64(v, o))
    }

    /// Returns the entry with text label `label` as a double.
    ///
    /// # Errors
    ///
    /// As [`f64`](Self::f64) plus map-lookup errors. Sticky.
    #[cfg(feature = "float")]
    pub fn f64_in_map_str(&mut self, label: &str) -> Result<f64, Error> {
        self.converted_in_map(
            &Label::TextString(label.as_bytes()),
            Convert::FLOAT,
            |v, o| to_f64(v, o),
        )
    }

    /// Returns the next item as a double, converting from any of the kinds
    /// in `opts`. Integer conversions may silently lose precision; bignum,
    /// decimal-fraction, and big-float conversions clamp to infinity on
    /// overflow and to zero on underflow.
    ///
    /// # Errors
    ///
    /// As [`f64`](Self::f64) plus conversion-specific errors. Sticky.
    #[cfg(feature = "float")]
    pub fn f64_convert(&mut self, opts: Convert) -> Result<f64, Error> {
        self.converted(opts, |v, o| to_f64(v, o))
    }

    /// As [`f64_convert`](Self::f64_convert) for an integer-labelled entry.
    ///
    /// # Errors
    ///
    /// As [`f64_convert`](Self::f64_convert) plus map-lookup errors. Sticky.
    #[cfg(feature = "float")]
    pub fn f64_convert_in_map(&mut self, label: i64, opts: Convert) -> Result<f64, Error> {
        self.converted_in_map(&Label::Int64(label), opts, |v, o| to_f64(v, o))
    }

    /// As [`f64_convert`](Self::f64_convert) for a text-labelled entry.
    ///
    /// # Errors
    ///
    /// As [`f64_convert`](Self::f64_convert) plus map-lookup errors. Sticky.
    #[cfg(feature = "float")]
    pub fn f64_convert_in_map_str(&mut self, label: &str, opts: Convert) -> Result<f64, Error> {
        self.converted_in_map(&Label::TextString(label.as_bytes()), opts, |v, o| {
            to_f64(v, o)
        })
    }

    /// Returns the next item as a boolean.
    ///
    /// # Errors
    ///
    /// [`ErrorCode::UnexpectedType`] otherwise. Sticky.
    pub fn bool(&mut self) -> Result<bool, Error> {
        self.converted(Convert::ALL, |v, _| match *v {
            Value::Bool(b) => Ok(b),
            _ => Err(ErrorCode::UnexpectedType),
        })
    }

    /// Returns the entry with integer label `label` as a boolean.
    ///
    /// # Errors
    ///
    /// As [`bool`](Self::bool) plus map-lookup errors. Sticky.
    pub fn bool_in_map(&mut self, label: i64) -> Result<bool, Error> {
        self.converted_in_map(&Label::Int64(label), Convert::ALL, |v, _| match *v {
            Value::Bool(b) => Ok(b),
            _ => Err(ErrorCode::UnexpectedType),
        })
    }

    /// Returns the entry with text label `label` as a boolean.
    ///
    /// # Errors
    ///
    /// As [`bool`](Self::bool) plus map-lookup errors. Sticky.
    pub fn bool_in_map_str(&mut self, label: &str) -> Result<bool, Error> {
        self.converted_in_map(
            &Label::TextString(label.as_bytes()),
            Convert::ALL,
            |v, _| match *v {
                Value::Bool(b) => Ok(b),
                _ => Err(ErrorCode::UnexpectedType),
            },
        )
    }

    /// Returns the next item as a byte string.
    ///
    /// # Errors
    ///
    /// [`ErrorCode::UnexpectedType`] otherwise. Sticky.
    pub fn bytes(&mut self) -> Result<&'data [u8], Error> {
        self.converted(Convert::ALL, |v, _| match *v {
            Value::ByteString(b) => Ok(b),
            _ => Err(ErrorCode::UnexpectedType),
        })
    }

    /// Returns the entry with integer label `label` as a byte string.
    ///
    /// # Errors
    ///
    /// As [`bytes`](Self::bytes) plus map-lookup errors. Sticky.
    pub fn bytes_in_map(&mut self, label: i64) -> Result<&'data [u8], Error> {
        self.converted_in_map(&Label::Int64(label), Convert::ALL, |v, _| match *v {
            Value::ByteString(b) => Ok(b),
            _ => Err(ErrorCode::UnexpectedType),
        })
    }

    /// Returns the entry with text label `label` as a byte string.
    ///
    /// # Errors
    ///
    /// As [`bytes`](Self::bytes) plus map-lookup errors. Sticky.
    pub fn bytes_in_map_str(&mut self, label: &str) -> Result<&'data [u8], Error> {
        self.converted_in_map(
            &Label::TextString(label.as_bytes()),
            Convert::ALL,
            |v, _| match *v {
                Value::ByteString(b) => Ok(b),
                _ => Err(ErrorCode::UnexpectedType),
            },
        )
    }

    /// Returns the next item as UTF-8 validated text.
    ///
    /// # Errors
    ///
    /// [`ErrorCode::InvalidUtf8`] on bad bytes,
    /// [`ErrorCode::UnexpectedType`] otherwise. Sticky.
    pub fn text(&mut self) -> Result<&'data str, Error> {
        self.converted(Convert::ALL, |v, _| text_of(v))
    }

    /// Returns the entry with integer label `label` as text.
    ///
    /// # Errors
    ///
    /// As [`text`](Self::text) plus map-lookup errors. Sticky.
    pub fn text_in_map(&mut self, label: i64) -> Result<&'data str, Error> {
        self.converted_in_map(&Label::Int64(label), Convert::ALL, |v, _| text_of(v))
    }

    /// Returns the entry with text label `label` as text.
    ///
    /// # Errors
    ///
    /// As [`text`](Self::text) plus map-lookup errors. Sticky.
    pub fn text_in_map_str(&mut self, label: &str) -> Result<&'data str, Error> {
        self.converted_in_map(&Label::TextString(label.as_bytes()), Convert::ALL, |v, _| {
            text_of(v)
        })
    }

    /// Returns the next item as a positive bignum magnitude.
    ///
    /// # Errors
    ///
    /// [`ErrorCode::UnexpectedType`] otherwise. Sticky.
    pub fn pos_bignum(&mut self) -> Result<&'data [u8], Error> {
        self.converted(Convert::ALL, |v, _| match *v {
            Value::PosBignum(b) => Ok(b),
            _ => Err(ErrorCode::UnexpectedType),
        })
    }

    /// Returns the entry with integer label `label` as a positive bignum.
    ///
    /// # Errors
    ///
    /// As [`pos_bignum`](Self::pos_bignum) plus map-lookup errors. Sticky.
    pub fn pos_bignum_in_map(&mut self, label: i64) -> Result<&'data [u8], Error> {
        self.converted_in_map(&Label::Int64(label), Convert::ALL, |v, _| match *v {
            Value::PosBignum(b) => Ok(b),
            _ => Err(ErrorCode::UnexpectedType),
        })
    }

    /// Returns the entry with text label `label` as a positive bignum.
    ///
    /// # Errors
    ///
    /// As [`pos_bignum`](Self::pos_bignum) plus map-lookup errors. Sticky.
    pub fn pos_bignum_in_map_str(&mut self, label: &str) -> Result<&'data [u8], Error> {
        self.converted_in_map(
            &Label::TextString(label.as_bytes()),
            Convert::ALL,
            |v, _| match *v {
                Value::PosBignum(b) => Ok(b),
                _ => Err(ErrorCode::UnexpectedType),
            },
        )
    }

    /// Returns the next item as a negative bignum magnitude.
    ///
    /// # Errors
    ///
    /// [`ErrorCode::UnexpectedType`] otherwise. Sticky.
    pub fn neg_bignum(&mut self) -> Result<&'data [u8], Error> {
        self.converted(Convert::ALL, |v, _| match *v {
            Value::NegBignum(b) => Ok(b),
            _ => Err(ErrorCode::UnexpectedType),
        })
    }

    /// Returns the entry with integer label `label` as a negative bignum.
    ///
    /// # Errors
    ///
    /// As [`neg_bignum`](Self::neg_bignum) plus map-lookup errors. Sticky.
    pub fn neg_bignum_in_map(&mut self, label: i64) -> Result<&'data [u8], Error> {
        self.converted_in_map(&Label::Int64(label), Convert::ALL, |v, _| match *v {
            Value::NegBignum(b) => Ok(b),
            _ => Err(ErrorCode::UnexpectedType),
        })
    }

    /// Returns the entry with text label `label` as a negative bignum.
    ///
    /// # Errors
    ///
    /// As [`neg_bignum`](Self::neg_bignum) plus map-lookup errors. Sticky.
    pub fn neg_bignum_in_map_str(&mut self, label: &str) -> Result<&'data [u8], Error> {
        self.converted_in_map(
            &Label::TextString(label.as_bytes()),
            Convert::ALL,
            |v, _| match *v {
                Value::NegBignum(b) => Ok(b),
                _ => Err(ErrorCode::UnexpectedType),
            },
        )
    }
}

fn text_of<'data>(v: &Value<'data>) -> Result<&'data str, ErrorCode> {
    match *v {
        Value::TextString(b) => utf8::validate(b).map_err(|()| ErrorCode::InvalidUtf8),
        _ => Err(ErrorCode::UnexpectedType),
    }
}
