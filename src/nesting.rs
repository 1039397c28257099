//! Fixed-capacity nesting stacks for the encoder and the decoder.

use crate::limits::MAX_ARRAY_NESTING;
use crate::{Error, ErrorCode};

/// Marks an in-progress indefinite-length container.
pub(crate) const INDEFINITE_COUNT: u16 = u16::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ContainerKind {
    Array,
    Map,
    MapAsArray,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) enum Frame {
    #[default]
    Top,
    Container {
        kind: ContainerKind,
        indefinite: bool,
        total: u16,
        /// Items left in a definite container. For an indefinite container
        /// this stays [`INDEFINITE_COUNT`] until its break is seen; a bounded
        /// indefinite frame records the break by dropping to zero.
        remaining: u16,
        /// Offset of the first child; only meaningful when `bounded`.
        start: usize,
        bounded: bool,
    },
    BstrWrap {
        start: usize,
        saved_limit: usize,
    },
}

/// Decoder nesting stack. `frames[0]` is the top sentinel; the current level
/// is the index of the innermost frame, so items at the top report level 0.
///
/// The whole tracker is `Copy`, which is what makes map-mode search cheap:
/// save the tracker and the input cursor, scan, restore.
#[derive(Clone, Copy)]
pub(crate) struct DecodeNesting {
    frames: [Frame; MAX_ARRAY_NESTING + 1],
    current: usize,
}

impl DecodeNesting {
    pub(crate) const fn new() -> Self {
        Self {
            frames: [Frame::Top; MAX_ARRAY_NESTING + 1],
            current: 0,
        }
    }

    pub(crate) const fn level(&self) -> usize {
        self.current
    }

    pub(crate) const fn at_top(&self) -> bool {
        self.current == 0
    }

    pub(crate) const fn in_container(&self) -> bool {
        self.current != 0
    }

    pub(crate) const fn frame(&self) -> Frame {
        self.frames[self.current]
    }

    pub(crate) fn descend(
        &mut self,
        kind: ContainerKind,
        indefinite: bool,
        total: u16,
        offset: usize,
    ) -> Result<(), Error> {
        if self.current >= MAX_ARRAY_NESTING {
            return Err(Error::new(ErrorCode::ArrayDecodeNestingTooDeep, offset));
        }
        self.current += 1;
        self.frames[self.current] = Frame::Container {
            kind,
            indefinite,
            total,
            remaining: if indefinite { INDEFINITE_COUNT } else { total },
            start: 0,
            bounded: false,
        };
        Ok(())
    }

    pub(crate) fn descend_bstr(
        &mut self,
        start: usize,
        saved_limit: usize,
        offset: usize,
    ) -> Result<(), Error> {
        if self.current >= MAX_ARRAY_NESTING {
            return Err(Error::new(ErrorCode::ArrayDecodeNestingTooDeep, offset));
        }
        self.current += 1;
        self.frames[self.current] = Frame::BstrWrap { start, saved_limit };
        Ok(())
    }

    pub(crate) fn pop(&mut self) {
        debug_assert!(self.current > 0);
        self.frames[self.current] = Frame::Top;
        self.current -= 1;
    }

    /// Notes one consumed child of the current frame.
    pub(crate) fn consume_one(&mut self) {
        if let Frame::Container {
            indefinite: false,
            remaining,
            ..
        } = &mut self.frames[self.current]
        {
            debug_assert!(*remaining > 0);
            *remaining -= 1;
        }
    }

    /// Marks the current (bounded) level and records its first-child offset.
    pub(crate) fn mark_bounded(&mut self, start: usize) {
        if let Frame::Container {
            start: s, bounded, ..
        } = &mut self.frames[self.current]
        {
            *s = start;
            *bounded = true;
        }
    }

    /// The innermost bounded level, if any.
    pub(crate) fn bounded_level(&self) -> Option<usize> {
        (1..=self.current).rev().find(|&i| {
            matches!(
                self.frames[i],
                Frame::Container { bounded: true, .. } | Frame::BstrWrap { .. }
            )
        })
    }

    pub(crate) const fn frame_at(&self, level: usize) -> Frame {
        self.frames[level]
    }

    /// Records that a bounded indefinite container consumed its break.
    pub(crate) fn mark_bounded_done(&mut self) {
        if let Frame::Container { remaining, .. } = &mut self.frames[self.current] {
            *remaining = 0;
        }
    }

    /// Resets the current bounded frame for a rewind.
    pub(crate) fn rewind_bounded(&mut self, level: usize) {
        while self.current > level {
            self.pop();
        }
        if let Frame::Container {
            indefinite,
            total,
            remaining,
            ..
        } = &mut self.frames[self.current]
        {
            *remaining = if *indefinite {
                INDEFINITE_COUNT
            } else {
                *total
            };
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::new();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum OpenKind {
    #[default]
    Array,
    Map,
    Bstr,
}

#[derive(Clone, Copy, Default)]
pub(crate) struct EncodeFrame {
    pub kind: OpenKind,
    pub indefinite: bool,
    /// Running child item count; a map pair counts twice.
    pub count: u16,
    /// Offset of the reserved or emitted head byte.
    pub start: usize,
}

/// Encoder nesting stack.
pub(crate) struct EncodeNesting {
    frames: [EncodeFrame; MAX_ARRAY_NESTING],
    depth: usize,
}

impl EncodeNesting {
    pub(crate) const fn new() -> Self {
        Self {
            frames: [EncodeFrame {
                kind: OpenKind::Array,
                indefinite: false,
                count: 0,
                start: 0,
            }; MAX_ARRAY_NESTING],
            depth: 0,
        }
    }

    pub(crate) const fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn push(
        &mut self,
        kind: OpenKind,
        indefinite: bool,
        start: usize,
        offset: usize,
    ) -> Result<(), Error> {
        if self.depth >= MAX_ARRAY_NESTING {
            return Err(Error::new(ErrorCode::ArrayNestingTooDeep, offset));
        }
        self.frames[self.depth] = EncodeFrame {
            kind,
            indefinite,
            count: 0,
            start,
        };
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn pop(&mut self, kind: OpenKind, offset: usize) -> Result<EncodeFrame, Error> {
        if self.depth == 0 {
            return Err(Error::new(ErrorCode::TooManyCloses, offset));
        }
        let frame = self.frames[self.depth - 1];
        if frame.kind != kind {
            return Err(Error::new(ErrorCode::CloseMismatch, offset));
        }
        self.depth -= 1;
        Ok(frame)
    }

    pub(crate) fn top(&self) -> Option<&EncodeFrame> {
        self.depth.checked_sub(1).map(|i| &self.frames[i])
    }

    /// Counts one item added at the current level.
    pub(crate) fn increment(&mut self, offset: usize) -> Result<(), Error> {
        if let Some(i) = self.depth.checked_sub(1) {
            let frame = &mut self.frames[i];
            if u64::from(frame.count) >= crate::limits::MAX_ITEMS_IN_ARRAY {
                return Err(Error::new(ErrorCode::ArrayTooLong, offset));
            }
            frame.count += 1;
        }
        Ok(())
    }

    /// Undoes the count of the most recently added item, for a cancelled
    /// byte-string wrap.
    pub(crate) fn uncount(&mut self) {
        if let Some(i) = self.depth.checked_sub(1) {
            let frame = &mut self.frames[i];
            frame.count = frame.count.saturating_sub(1);
        }
    }

    pub(crate) fn bstr_open(&self) -> bool {
        self.frames[..self.depth]
            .iter()
            .any(|f| f.kind == OpenKind::Bstr)
    }
}
