//! # picocbor
//!
//! An allocation-free CBOR (RFC 8949) encoder and pull decoder for
//! constrained devices and protocol work such as COSE and CWT.
//!
//! ## Design principles
//!
//! - **The caller owns all memory.**
//!   The encoder writes into a caller-supplied buffer (or computes the size
//!   without one); the decoder borrows the input slice and hands out
//!   sub-slices. The only copies ever made go into a caller-supplied
//!   [`StringAllocator`] pool, and only for indefinite-length strings or
//!   when explicitly requested.
//! - **One item per call.**
//!   [`Decoder::next_item`] is a pre-order traversal over the item tree;
//!   `nest_level`/`next_nest_level` on each [`DecodedItem`] describe the
//!   tree shape. The map-mode layer ([`Decoder::enter_map`] and friends)
//!   adds labelled random access with duplicate detection on top.
//! - **Errors are numbers.**
//!   Every failure maps to a stable [`ErrorCode`] in a numeric band, so
//!   "is this input malformed" and "can decoding continue" are range
//!   checks, not enumerations.
//!
//! ## Feature flags
//!
//! - `std` *(default)*: implements `std::error::Error` for [`Error`].
//! - `simdutf8` *(default)*: SIMD UTF-8 validation for [`Decoder::text`].
//! - `float`, `preferred-float`, `float-hw` *(default)*: float decoding,
//!   half-precision and shortest-exact encoding, and float/integer
//!   conversions. Disabling surfaces dedicated error codes instead of
//!   changing the wire grammar.
//! - `indef-strings`, `indef-containers`, `exp-mantissa` *(default)*:
//!   indefinite-length strings, indefinite-length arrays/maps, and tag 4/5
//!   decoding.
//!
//! ## Safety
//!
//! This crate forbids `unsafe` code.
//!
//! ## `no_std`
//!
//! The crate is `no_std` compatible and never links `alloc`; contexts are
//! plain stack values.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::module_name_repetitions
)]

mod buffer;
mod convert;
mod decode;
mod encode;
mod error;
#[cfg(feature = "float")]
mod float;
mod head;
mod item;
pub mod limits;
mod map;
mod nesting;
mod pool;
pub mod tags;
mod utf8;

pub use crate::convert::Convert;
pub use crate::decode::{DecodeMode, DecodeOptions, Decoder};
pub use crate::encode::Encoder;
pub use crate::error::{Error, ErrorCode};
pub use crate::item::{DecodedItem, ItemType, Label, Mantissa, Value};
pub use crate::map::MapQueryEntry;
pub use crate::pool::{AllocError, MemPool, StringAllocator};
pub use crate::tags::TagSet;
