//! IEEE 754 binary16/binary32 widening and exact narrowing.
//!
//! Everything here is integer bit manipulation so the conversions behave
//! identically with or without floating-point hardware.

const F64_MANT_BITS: u32 = 52;
const F64_MANT_MASK: u64 = (1 << F64_MANT_BITS) - 1;
const F64_EXP_BIAS: i32 = 1023;

const F16_MANT_BITS: u32 = 10;
const F16_EXP_BIAS: i32 = 15;

const F32_MANT_BITS: u32 = 23;
const F32_EXP_BIAS: i32 = 127;

/// Canonical half-precision quiet NaN.
pub(crate) const HALF_NAN: u16 = 0x7e00;
pub(crate) const HALF_POS_INFINITY: u16 = 0x7c00;

/// Expands a half-precision bit pattern to `f64`, preserving the sign of
/// zeros and infinities and the NaN payload.
#[must_use]
pub(crate) fn half_to_double(h: u16) -> f64 {
    let sign = u64::from(h >> 15) << 63;
    let exp = (h >> 10) & 0x1f;
    let mant = u64::from(h & 0x3ff);

    let bits = if exp == 0x1f {
        // Infinity or NaN; the payload shifts into the top mantissa bits.
        sign | (0x7ff_u64 << F64_MANT_BITS) | (mant << (F64_MANT_BITS - F16_MANT_BITS))
    } else if exp != 0 {
        let e = i32::from(exp) - F16_EXP_BIAS + F64_EXP_BIAS;
        sign | ((e as u64) << F64_MANT_BITS) | (mant << (F64_MANT_BITS - F16_MANT_BITS))
    } else if mant == 0 {
        sign
    } else {
        // Subnormal: value is mant * 2^-24; renormalise for the wider format.
        let msb = 63 - mant.leading_zeros();
        let e = msb as i32 - 24 + F64_EXP_BIAS;
        let frac = (mant << (F64_MANT_BITS - msb)) & F64_MANT_MASK;
        sign | ((e as u64) << F64_MANT_BITS) | frac
    };
    f64::from_bits(bits)
}

/// Expands a single-precision bit pattern to `f64`.
#[must_use]
pub(crate) fn single_to_double(s: u32) -> f64 {
    f64::from(f32::from_bits(s))
}

/// Narrows `d` to half precision when the value is exactly representable.
///
/// NaN handling is the caller's business; this returns `None` for every NaN.
#[must_use]
pub(crate) fn double_to_half(d: f64) -> Option<u16> {
    let bits = d.to_bits();
    let sign = ((bits >> 48) & 0x8000) as u16;
    let exp_field = ((bits >> F64_MANT_BITS) & 0x7ff) as i32;
    let mant = bits & F64_MANT_MASK;

    if exp_field == 0x7ff {
        if mant == 0 {
            return Some(sign | HALF_POS_INFINITY);
        }
        return None;
    }
    if d == 0.0 {
        return Some(sign);
    }
    if exp_field == 0 {
        // f64 subnormals are far below the half-precision range.
        return None;
    }

    let e = exp_field - F64_EXP_BIAS;
    if (-14..=15).contains(&e) {
        let dropped = F64_MANT_BITS - F16_MANT_BITS;
        if mant & ((1 << dropped) - 1) != 0 {
            return None;
        }
        let exp16 = (e + F16_EXP_BIAS) as u16;
        Some(sign | (exp16 << 10) | (mant >> dropped) as u16)
    } else if (-24..-14).contains(&e) {
        // Half-precision subnormal.
        let sig = (1_u64 << F64_MANT_BITS) | mant;
        let shift = F64_MANT_BITS - F16_MANT_BITS + (-14 - e) as u32;
        if sig & ((1 << shift) - 1) != 0 {
            return None;
        }
        Some(sign | (sig >> shift) as u16)
    } else {
        None
    }
}

/// Narrows `d` to single precision when the value is exactly representable.
#[must_use]
pub(crate) fn double_to_single(d: f64) -> Option<u32> {
    let bits = d.to_bits();
    let sign = ((bits >> 32) & 0x8000_0000) as u32;
    let exp_field = ((bits >> F64_MANT_BITS) & 0x7ff) as i32;
    let mant = bits & F64_MANT_MASK;

    if exp_field == 0x7ff {
        if mant == 0 {
            return Some(sign | 0x7f80_0000);
        }
        return None;
    }
    if d == 0.0 {
        return Some(sign);
    }
    if exp_field == 0 {
        return None;
    }

    let e = exp_field - F64_EXP_BIAS;
    if (-126..=127).contains(&e) {
        let dropped = F64_MANT_BITS - F32_MANT_BITS;
        if mant & ((1 << dropped) - 1) != 0 {
            return None;
        }
        let exp32 = (e + F32_EXP_BIAS) as u32;
        Some(sign | (exp32 << F32_MANT_BITS) | (mant >> dropped) as u32)
    } else if (-149..-126).contains(&e) {
        let sig = (1_u64 << F64_MANT_BITS) | mant;
        let shift = F64_MANT_BITS - F32_MANT_BITS + (-126 - e) as u32;
        if sig & ((1 << shift) - 1) != 0 {
            return None;
        }
        Some(sign | (sig >> shift) as u32)
    } else {
        None
    }
}
