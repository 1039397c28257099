//! The string allocator interface and the bundled fixed-pool implementation.
//!
//! The decoder needs allocator memory in exactly one situation it cannot
//! avoid: concatenating the chunks of an indefinite-length string into one
//! contiguous payload. In all-strings mode it additionally copies every
//! string so the input buffer can be released after decoding.

use core::cell::Cell;

use crate::limits::MIN_MEM_POOL_SIZE;
use crate::{Error, ErrorCode};

/// Allocation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocError;

/// Incremental string storage with the classic four-mode allocator contract:
/// allocate ([`begin`](Self::begin)), reallocate ([`append`](Self::append),
/// which only ever grows the most recent allocation), free
/// ([`discard`](Self::discard)), and destruct ([`destruct`](Self::destruct),
/// called exactly once by [`Decoder::finish`](crate::Decoder::finish)).
///
/// At most one string is under construction at a time. Sealed strings must
/// stay valid for `'data` regardless of later allocator activity.
pub trait StringAllocator<'data> {
    /// Starts a fresh string, discarding any string under construction.
    fn begin(&self);

    /// Appends `bytes` to the string under construction.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] when storage is exhausted.
    fn append(&self, bytes: &[u8]) -> Result<(), AllocError>;

    /// Seals the string under construction and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] when the allocator has been destructed.
    fn seal(&self) -> Result<&'data [u8], AllocError>;

    /// Discards the string under construction.
    fn discard(&self);

    /// Tears the allocator down. Strings sealed earlier remain valid.
    fn destruct(&self);
}

/// The bundled fixed-pool allocator: a bump allocator over a caller-supplied
/// byte buffer. Nothing is ever freed individually; the pool is exhausted
/// front to back and sealed strings keep their place for `'data`.
pub struct MemPool<'data> {
    free: Cell<Option<&'data mut [u8]>>,
    pending: Cell<usize>,
}

impl<'data> core::fmt::Debug for MemPool<'data> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MemPool").finish_non_exhaustive()
    }
}

impl<'data> MemPool<'data> {
    /// Wraps `buffer` as pool storage.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorCode::MemPoolSize`] if the buffer is smaller than
    /// [`MIN_MEM_POOL_SIZE`].
    pub fn new(buffer: &'data mut [u8]) -> Result<Self, Error> {
        if buffer.len() < MIN_MEM_POOL_SIZE {
            return Err(Error::new(ErrorCode::MemPoolSize, 0));
        }
        Ok(Self {
            free: Cell::new(Some(buffer)),
            pending: Cell::new(0),
        })
    }

    /// Bytes still available for new strings.
    pub fn remaining(&self) -> usize {
        let free = self.free.take();
        let n = free.as_ref().map_or(0, |f| f.len());
        self.free.set(free);
        n.saturating_sub(self.pending.get())
    }
}

impl<'data> StringAllocator<'data> for MemPool<'data> {
    fn begin(&self) {
        self.pending.set(0);
    }

    fn append(&self, bytes: &[u8]) -> Result<(), AllocError> {
        let Some(free) = self.free.take() else {
            return Err(AllocError);
        };
        let pending = self.pending.get();
        let end = pending.checked_add(bytes.len());
        match end {
            Some(end) if end <= free.len() => {
                free[pending..end].copy_from_slice(bytes);
                self.pending.set(end);
                self.free.set(Some(free));
                Ok(())
            }
            _ => {
                self.free.set(Some(free));
                Err(AllocError)
            }
        }
    }

    fn seal(&self) -> Result<&'data [u8], AllocError> {
        let Some(free) = self.free.take() else {
            return Err(AllocError);
        };
        let (sealed, rest) = free.split_at_mut(self.pending.get());
        self.pending.set(0);
        self.free.set(Some(rest));
        Ok(sealed)
    }

    fn discard(&self) {
        self.pending.set(0);
    }

    fn destruct(&self) {
        self.pending.set(0);
        self.free.set(None);
    }
}
