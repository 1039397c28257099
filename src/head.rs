//! Encode and decode of the CBOR item head: one byte of
//! `[major:3 | additional-info:5]` followed by an argument of 0, 1, 2, 4, or
//! 8 big-endian bytes.

use crate::buffer::{InBuf, OutBuf};
use crate::{Error, ErrorCode};

pub(crate) const MAJOR_POS_INT: u8 = 0;
pub(crate) const MAJOR_NEG_INT: u8 = 1;
pub(crate) const MAJOR_BYTES: u8 = 2;
pub(crate) const MAJOR_TEXT: u8 = 3;
pub(crate) const MAJOR_ARRAY: u8 = 4;
pub(crate) const MAJOR_MAP: u8 = 5;
pub(crate) const MAJOR_TAG: u8 = 6;
pub(crate) const MAJOR_SIMPLE: u8 = 7;

pub(crate) const AI_ONE_BYTE: u8 = 24;
pub(crate) const AI_TWO_BYTES: u8 = 25;
pub(crate) const AI_FOUR_BYTES: u8 = 26;
pub(crate) const AI_EIGHT_BYTES: u8 = 27;
pub(crate) const AI_INDEFINITE: u8 = 31;

pub(crate) const SIMPLE_FALSE: u64 = 20;
pub(crate) const SIMPLE_TRUE: u64 = 21;
pub(crate) const SIMPLE_NULL: u64 = 22;
pub(crate) const SIMPLE_UNDEF: u64 = 23;

/// One decoded item head.
///
/// For `ai` 25..=27 under major 7 the argument carries the raw float bits,
/// not a length.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Head {
    pub major: u8,
    pub ai: u8,
    pub arg: u64,
    /// Byte offset of the head's first byte.
    pub offset: usize,
}

impl Head {
    pub(crate) const fn is_break(&self) -> bool {
        self.major == MAJOR_SIMPLE && self.ai == AI_INDEFINITE
    }

    pub(crate) const fn is_indefinite(&self) -> bool {
        self.ai == AI_INDEFINITE && self.major != MAJOR_SIMPLE
    }
}

/// Reads one head, enforcing the wire-format rules that do not depend on
/// context: reserved additional-info values, indefinite markers on integer
/// majors, two-byte simple values below 32, and (in strict mode) minimal
/// integer argument lengths.
pub(crate) fn decode_head(input: &mut InBuf<'_>, strict: bool) -> Result<Head, Error> {
    let offset = input.position();
    let initial = input.read_u8()?;
    let major = initial >> 5;
    let ai = initial & 0x1f;

    let arg = match ai {
        0..=23 => u64::from(ai),
        AI_ONE_BYTE => {
            let v = u64::from(input.read_u8()?);
            if major == MAJOR_SIMPLE && v < 32 {
                return Err(Error::new(ErrorCode::BadType7, offset));
            }
            if strict && matches!(major, MAJOR_POS_INT | MAJOR_NEG_INT) && v < 24 {
                return Err(Error::new(ErrorCode::NonMinimalEncoding, offset));
            }
            v
        }
        AI_TWO_BYTES => {
            let v = u64::from(input.read_be_u16()?);
            if strict && matches!(major, MAJOR_POS_INT | MAJOR_NEG_INT) && v <= 0xff {
                return Err(Error::new(ErrorCode::NonMinimalEncoding, offset));
            }
            v
        }
        AI_FOUR_BYTES => {
            let v = u64::from(input.read_be_u32()?);
            if strict && matches!(major, MAJOR_POS_INT | MAJOR_NEG_INT) && v <= 0xffff {
                return Err(Error::new(ErrorCode::NonMinimalEncoding, offset));
            }
            v
        }
        AI_EIGHT_BYTES => {
            let v = input.read_be_u64()?;
            if strict && matches!(major, MAJOR_POS_INT | MAJOR_NEG_INT) && v <= 0xffff_ffff {
                return Err(Error::new(ErrorCode::NonMinimalEncoding, offset));
            }
            v
        }
        28..=30 => return Err(Error::new(ErrorCode::Unsupported, offset)),
        _ => {
            // ai 31: indefinite length or break.
            if matches!(major, MAJOR_POS_INT | MAJOR_NEG_INT | MAJOR_TAG) {
                return Err(Error::new(ErrorCode::BadInt, offset));
            }
            0
        }
    };

    Ok(Head {
        major,
        ai,
        arg,
        offset,
    })
}

/// Writes a head with the minimal-length argument encoding.
pub(crate) fn encode_head(out: &mut OutBuf<'_>, major: u8, arg: u64) -> Result<(), Error> {
    debug_assert!(major <= 7);
    if arg < 24 {
        return out.write_u8((major << 5) | arg as u8);
    }
    if arg <= 0xff {
        out.write_u8((major << 5) | AI_ONE_BYTE)?;
        return out.write_u8(arg as u8);
    }
    if arg <= 0xffff {
        out.write_u8((major << 5) | AI_TWO_BYTES)?;
        return out.write(&(arg as u16).to_be_bytes());
    }
    if arg <= 0xffff_ffff {
        out.write_u8((major << 5) | AI_FOUR_BYTES)?;
        return out.write(&(arg as u32).to_be_bytes());
    }
    out.write_u8((major << 5) | AI_EIGHT_BYTES)?;
    out.write(&arg.to_be_bytes())
}

/// Writes an indefinite-length head for a string, array, or map major.
pub(crate) fn encode_indefinite_head(out: &mut OutBuf<'_>, major: u8) -> Result<(), Error> {
    debug_assert!(matches!(
        major,
        MAJOR_BYTES | MAJOR_TEXT | MAJOR_ARRAY | MAJOR_MAP
    ));
    out.write_u8((major << 5) | AI_INDEFINITE)
}

pub(crate) fn encode_break(out: &mut OutBuf<'_>) -> Result<(), Error> {
    out.write_u8(0xff)
}

/// Encoded length of a head carrying `arg`.
pub(crate) const fn head_len(arg: u64) -> usize {
    if arg < 24 {
        1
    } else if arg <= 0xff {
        2
    } else if arg <= 0xffff {
        3
    } else if arg <= 0xffff_ffff {
        5
    } else {
        9
    }
}

/// Writes the head for `arg` into a previously reserved region of exactly
/// [`head_len`] bytes starting at `at`.
pub(crate) fn patch_head(out: &mut OutBuf<'_>, at: usize, major: u8, arg: u64) {
    let mut scratch = [0u8; 9];
    let n = head_len(arg);
    match n {
        1 => scratch[0] = (major << 5) | arg as u8,
        2 => {
            scratch[0] = (major << 5) | AI_ONE_BYTE;
            scratch[1] = arg as u8;
        }
        3 => {
            scratch[0] = (major << 5) | AI_TWO_BYTES;
            scratch[1..3].copy_from_slice(&(arg as u16).to_be_bytes());
        }
        5 => {
            scratch[0] = (major << 5) | AI_FOUR_BYTES;
            scratch[1..5].copy_from_slice(&(arg as u32).to_be_bytes());
        }
        _ => {
            scratch[0] = (major << 5) | AI_EIGHT_BYTES;
            scratch[1..9].copy_from_slice(&arg.to_be_bytes());
        }
    }
    out.patch(at, &scratch[..n]);
}
