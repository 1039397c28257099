//! Implementation limits.
//!
//! These limits keep the encoder and decoder contexts fixed-size stack
//! values; none of them may depend on runtime configuration.

/// Maximum nesting of arrays and maps when encoding or decoding.
///
/// [`ErrorCode::ArrayNestingTooDeep`](crate::ErrorCode::ArrayNestingTooDeep)
/// or [`ErrorCode::ArrayDecodeNestingTooDeep`](crate::ErrorCode::ArrayDecodeNestingTooDeep)
/// is returned when exceeded.
pub const MAX_ARRAY_NESTING: usize = 15;

/// Maximum number of items in a single array or map.
///
/// One less than `u16::MAX` because `u16::MAX` marks an in-progress
/// indefinite-length container.
pub const MAX_ITEMS_IN_ARRAY: u64 = u16::MAX as u64 - 1;

/// Maximum decode input length in bytes.
pub const MAX_DECODE_INPUT_SIZE: usize = u32::MAX as usize - 2;

/// Maximum byte offset at which a container head may start when encoding.
pub const MAX_ARRAY_OFFSET: usize = u32::MAX as usize - 2;

/// Maximum number of consecutive tags on a single data item.
pub const MAX_TAGS_PER_ITEM: usize = 16;

/// Maximum number of caller-configured tags.
pub const MAX_CUSTOM_TAGS: usize = 16;

/// Minimum byte size of a [`MemPool`](crate::MemPool) buffer.
pub const MIN_MEM_POOL_SIZE: usize = 8;
