//! Labelled map/array navigation over the pull decoder.
//!
//! Entering a container bounds the traversal to it: `next_item` reports
//! `NoMoreItems` at the container's end instead of ascending into the
//! parent, the cursor can be rewound to the first child, and entries can be
//! fetched by label. Label lookups always scan the whole map, which is what
//! makes duplicate labels detectable no matter which entry is asked for.
//!
//! Every operation here participates in the sticky-error discipline: once
//! one fails, the rest short-circuit until the error is taken or the
//! decoder finishes.

use crate::decode::Decoder;
use crate::item::{DecodedItem, ItemType, Label, Value};
use crate::nesting::{ContainerKind, Frame};
use crate::{Error, ErrorCode};

/// One requested entry of a batch map lookup.
#[derive(Debug, Clone, Copy)]
pub struct MapQueryEntry<'q, 'data> {
    /// The label to search for.
    pub label: Label<'q>,
    /// The expected kind of the entry's value, or [`ItemType::Any`].
    pub expected: ItemType,
    /// The matched entry; filled by [`Decoder::items_in_map`].
    pub item: Option<DecodedItem<'data>>,
}

impl<'q, 'data> MapQueryEntry<'q, 'data> {
    /// A query for `label` expecting `expected`.
    #[must_use]
    pub const fn new(label: Label<'q>, expected: ItemType) -> Self {
        Self {
            label,
            expected,
            item: None,
        }
    }
}

impl<'data> Decoder<'data> {
    /// The sticky error, if one is set.
    #[must_use]
    pub const fn last_error(&self) -> Option<Error> {
        self.last_error
    }

    /// Takes and clears the sticky error. Decoding may be resumed afterward
    /// if the error was recoverable.
    pub fn take_last_error(&mut self) -> Option<Error> {
        self.last_error.take()
    }

    pub(crate) const fn check_sticky(&self) -> Result<(), Error> {
        match self.last_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub(crate) fn record(&mut self, e: Error) -> Error {
        if self.last_error.is_none() {
            self.last_error = Some(e);
        }
        e
    }

    /// Consumes the next item, which must be a map, and bounds the
    /// traversal to it. Returns the map head item.
    ///
    /// # Errors
    ///
    /// [`ErrorCode::UnexpectedType`] if the next item is not a map;
    /// otherwise a traversal error. Sticky.
    pub fn enter_map(&mut self) -> Result<DecodedItem<'data>, Error> {
        self.check_sticky()?;
        self.enter_container(ItemType::Map)
            .map_err(|e| self.record(e))
    }

    /// Consumes the next item, which must be an array, and bounds the
    /// traversal to it. Returns the array head item.
    ///
    /// # Errors
    ///
    /// As [`enter_map`](Self::enter_map). Sticky.
    pub fn enter_array(&mut self) -> Result<DecodedItem<'data>, Error> {
        self.check_sticky()?;
        self.enter_container(ItemType::Array)
            .map_err(|e| self.record(e))
    }

    /// Leaves the entered map, fast-forwarding past unconsumed entries.
    ///
    /// # Errors
    ///
    /// [`ErrorCode::ExitMismatch`] if the innermost entered container is not
    /// a map. Sticky.
    pub fn exit_map(&mut self) -> Result<(), Error> {
        self.check_sticky()?;
        self.exit_container(false).map_err(|e| self.record(e))
    }

    /// Leaves the entered array, fast-forwarding past unconsumed items.
    ///
    /// # Errors
    ///
    /// As [`exit_map`](Self::exit_map). Sticky.
    pub fn exit_array(&mut self) -> Result<(), Error> {
        self.check_sticky()?;
        self.exit_container(true).map_err(|e| self.record(e))
    }

    /// Resets the traversal cursor to the first child of the entered
    /// container, or to the start of the input when nothing is entered.
    pub fn rewind(&mut self) {
        if let Some(level) = self.nesting.bounded_level() {
            match self.nesting.frame_at(level) {
                Frame::Container { start, .. } => {
                    self.nesting.rewind_bounded(level);
                    self.input.set_position(start);
                }
                Frame::BstrWrap { start, .. } => {
                    while self.nesting.level() > level {
                        self.nesting.pop();
                    }
                    self.input.set_position(start);
                }
                Frame::Top => {}
            }
        } else {
            self.input.set_position(0);
            self.nesting.reset();
        }
    }

    /// Consumes the next item, which must be a definite-length byte string
    /// held in the input buffer, and bounds the traversal to its payload so
    /// wrapped CBOR can be decoded in place.
    ///
    /// # Errors
    ///
    /// [`ErrorCode::UnexpectedType`] if the next item is not such a byte
    /// string. Sticky.
    pub fn enter_bstr_wrapped(&mut self) -> Result<DecodedItem<'data>, Error> {
        self.check_sticky()?;
        self.enter_bstr_inner().map_err(|e| self.record(e))
    }

    fn enter_bstr_inner(&mut self) -> Result<DecodedItem<'data>, Error> {
        let item = self.next_entry(true)?;
        let end = self.input.position();
        let Value::ByteString(bytes) = item.value else {
            return Err(Error::new(ErrorCode::UnexpectedType, end));
        };
        if item.data_allocated {
            return Err(Error::new(ErrorCode::UnexpectedType, end));
        }
        let start = end - bytes.len();
        let saved_limit = self.input.limit();
        self.nesting.descend_bstr(start, saved_limit, end)?;
        self.input.set_limit(end);
        self.input.set_position(start);
        Ok(item)
    }

    /// Leaves the entered byte-string wrap, restoring the outer traversal
    /// window.
    ///
    /// # Errors
    ///
    /// [`ErrorCode::ExitMismatch`] if the innermost entered container is not
    /// a byte-string wrap. Sticky.
    pub fn exit_bstr_wrapped(&mut self) -> Result<(), Error> {
        self.check_sticky()?;
        self.exit_bstr_inner().map_err(|e| self.record(e))
    }

    fn exit_bstr_inner(&mut self) -> Result<(), Error> {
        let level = self
            .nesting
            .bounded_level()
            .ok_or(Error::new(ErrorCode::ExitMismatch, self.input.position()))?;
        let Frame::BstrWrap { saved_limit, .. } = self.nesting.frame_at(level) else {
            return Err(Error::new(ErrorCode::ExitMismatch, self.input.position()));
        };
        while self.nesting.level() > level {
            self.nesting.pop();
        }
        self.input.set_position(self.input.limit());
        self.input.set_limit(saved_limit);
        self.nesting.pop();
        self.ascend();
        Ok(())
    }

    /// Looks up the entry with integer label `label` in the entered map.
    ///
    /// The whole map is scanned: a second entry with the same label is
    /// reported as [`ErrorCode::DuplicateLabel`] regardless of entry order.
    /// The traversal cursor is left where it was.
    ///
    /// # Errors
    ///
    /// [`ErrorCode::LabelNotFound`], [`ErrorCode::DuplicateLabel`],
    /// [`ErrorCode::UnexpectedType`], or [`ErrorCode::MapNotEntered`].
    /// Sticky.
    pub fn item_in_map(
        &mut self,
        label: i64,
        expected: ItemType,
    ) -> Result<DecodedItem<'data>, Error> {
        self.check_sticky()?;
        self.map_search(&Label::Int64(label), expected)
            .map(|(item, _)| item)
            .map_err(|e| self.record(e))
    }

    /// As [`item_in_map`](Self::item_in_map) with a text label.
    ///
    /// # Errors
    ///
    /// As [`item_in_map`](Self::item_in_map). Sticky.
    pub fn item_in_map_str(
        &mut self,
        label: &str,
        expected: ItemType,
    ) -> Result<DecodedItem<'data>, Error> {
        self.check_sticky()?;
        self.map_search(&Label::TextString(label.as_bytes()), expected)
            .map(|(item, _)| item)
            .map_err(|e| self.record(e))
    }

    /// Looks up the map-valued entry with integer label `label` and enters
    /// it.
    ///
    /// # Errors
    ///
    /// As [`item_in_map`](Self::item_in_map). Sticky.
    pub fn enter_map_from_map(&mut self, label: i64) -> Result<DecodedItem<'data>, Error> {
        self.check_sticky()?;
        self.enter_from_map(&Label::Int64(label), ItemType::Map)
            .map_err(|e| self.record(e))
    }

    /// As [`enter_map_from_map`](Self::enter_map_from_map) with a text label.
    ///
    /// # Errors
    ///
    /// As [`item_in_map`](Self::item_in_map). Sticky.
    pub fn enter_map_from_map_str(&mut self, label: &str) -> Result<DecodedItem<'data>, Error> {
        self.check_sticky()?;
        self.enter_from_map(&Label::TextString(label.as_bytes()), ItemType::Map)
            .map_err(|e| self.record(e))
    }

    /// Looks up the array-valued entry with integer label `label` and
    /// enters it.
    ///
    /// # Errors
    ///
    /// As [`item_in_map`](Self::item_in_map). Sticky.
    pub fn enter_array_from_map(&mut self, label: i64) -> Result<DecodedItem<'data>, Error> {
        self.check_sticky()?;
        self.enter_from_map(&Label::Int64(label), ItemType::Array)
            .map_err(|e| self.record(e))
    }

    /// As [`enter_array_from_map`](Self::enter_array_from_map) with a text
    /// label.
    ///
    /// # Errors
    ///
    /// As [`item_in_map`](Self::item_in_map). Sticky.
    pub fn enter_array_from_map_str(&mut self, label: &str) -> Result<DecodedItem<'data>, Error> {
        self.check_sticky()?;
        self.enter_from_map(&Label::TextString(label.as_bytes()), ItemType::Array)
            .map_err(|e| self.record(e))
    }

    /// Fills `queries` from the entered map in a single pass.
    ///
    /// Every requested label must be present exactly once; unmatched map
    /// entries are skipped. The traversal cursor is left where it was.
    ///
    /// # Errors
    ///
    /// [`ErrorCode::LabelNotFound`] for an absent requested label,
    /// [`ErrorCode::DuplicateLabel`] for a repeated one,
    /// [`ErrorCode::UnexpectedType`] on a kind mismatch. Sticky.
    pub fn items_in_map(
        &mut self,
        queries: &mut [MapQueryEntry<'_, 'data>],
    ) -> Result<(), Error> {
        self.check_sticky()?;
        self.items_in_map_core(queries, |_| Ok(()))
            .map_err(|e| self.record(e))
    }

    /// As [`items_in_map`](Self::items_in_map), additionally handing every
    /// unmatched entry to `on_unmatched`; an error from the closure aborts
    /// the pass and is returned.
    ///
    /// # Errors
    ///
    /// As [`items_in_map`](Self::items_in_map), or the closure's error.
    /// Sticky.
    pub fn items_in_map_with_callback<F>(
        &mut self,
        queries: &mut [MapQueryEntry<'_, 'data>],
        on_unmatched: F,
    ) -> Result<(), Error>
    where
        F: FnMut(&DecodedItem<'data>) -> Result<(), Error>,
    {
        self.check_sticky()?;
        self.items_in_map_core(queries, on_unmatched)
            .map_err(|e| self.record(e))
    }

    fn enter_container(&mut self, want: ItemType) -> Result<DecodedItem<'data>, Error> {
        let item = self.next_entry(true)?;
        let offset = self.input.position();
        let (kind, empty) = match (want, item.value) {
            (ItemType::Map, Value::Map(n)) => (ContainerKind::Map, n == 0),
            (ItemType::Array, Value::Array(n)) => (ContainerKind::Array, n == 0),
            (ItemType::Array, Value::MapAsArray(n)) => (ContainerKind::MapAsArray, n == 0),
            _ => return Err(Error::new(ErrorCode::UnexpectedType, offset)),
        };
        if empty {
            // An empty definite container is a leaf for plain traversal, so
            // no frame was pushed; the bounded cursor still needs one.
            self.nesting.descend(kind, false, 0, offset)?;
        }
        self.nesting.mark_bounded(offset);
        Ok(item)
    }

    fn exit_container(&mut self, array: bool) -> Result<(), Error> {
        let offset = self.input.position();
        let level = self
            .nesting
            .bounded_level()
            .ok_or(Error::new(ErrorCode::ExitMismatch, offset))?;
        let kind_ok = match self.nesting.frame_at(level) {
            Frame::Container { kind, .. } => match kind {
                ContainerKind::Map => !array,
                ContainerKind::Array | ContainerKind::MapAsArray => array,
            },
            _ => false,
        };
        if !kind_ok {
            return Err(Error::new(ErrorCode::ExitMismatch, offset));
        }
        loop {
            match self.next_entry(false) {
                Ok(_) => {}
                Err(e) if e.code == ErrorCode::NoMoreItems => break,
                Err(e) => return Err(e),
            }
        }
        while self.nesting.level() > level {
            self.nesting.pop();
        }
        self.nesting.pop();
        self.ascend();
        Ok(())
    }

    fn enter_from_map(&mut self, target: &Label<'_>, want: ItemType) -> Result<DecodedItem<'data>, Error> {
        let (_, at_entry) = self.map_search(target, want)?;
        self.restore(at_entry);
        self.enter_container(want)
    }

    /// Scans the entered map for `target`; returns the matching entry and a
    /// snapshot positioned at the entry's start. The traversal cursor is
    /// restored.
    pub(crate) fn map_search(
        &mut self,
        target: &Label<'_>,
        expected: ItemType,
    ) -> Result<(DecodedItem<'data>, crate::decode::Snapshot<'data>), Error> {
        let level = self.entered_map_level()?;
        let save = self.snapshot();
        self.rewind();
        let mut found = None;
        loop {
            let at_entry = self.snapshot();
            let item = match self.next_entry(false) {
                Ok(item) => item,
                Err(e) if e.code == ErrorCode::NoMoreItems => break,
                Err(e) => {
                    self.restore(save);
                    return Err(e);
                }
            };
            if let Err(e) = self.skip_to_level(level) {
                self.restore(save);
                return Err(e);
            }
            if item.label.matches(target) {
                if found.is_some() {
                    let offset = self.input.position();
                    self.restore(save);
                    return Err(Error::new(ErrorCode::DuplicateLabel, offset));
                }
                found = Some((item, at_entry));
            }
        }
        self.restore(save);
        let (item, at_entry) =
            found.ok_or(Error::new(ErrorCode::LabelNotFound, self.input.position()))?;
        if expected != ItemType::Any && item.item_type() != expected {
            return Err(Error::new(ErrorCode::UnexpectedType, self.input.position()));
        }
        Ok((item, at_entry))
    }

    fn items_in_map_core<F>(
        &mut self,
        queries: &mut [MapQueryEntry<'_, 'data>],
        mut on_unmatched: F,
    ) -> Result<(), Error>
    where
        F: FnMut(&DecodedItem<'data>) -> Result<(), Error>,
    {
        let level = self.entered_map_level()?;
        let save = self.snapshot();
        self.rewind();
        for q in queries.iter_mut() {
            q.item = None;
        }
        loop {
            let item = match self.next_entry(false) {
                Ok(item) => item,
                Err(e) if e.code == ErrorCode::NoMoreItems => break,
                Err(e) => {
                    self.restore(save);
                    return Err(e);
                }
            };
            if let Err(e) = self.skip_to_level(level) {
                self.restore(save);
                return Err(e);
            }
            let matched = queries.iter_mut().find(|q| item.label.matches(&q.label));
            match matched {
                Some(q) => {
                    let offset = self.input.position();
                    if q.item.is_some() {
                        self.restore(save);
                        return Err(Error::new(ErrorCode::DuplicateLabel, offset));
                    }
                    if q.expected != ItemType::Any && item.item_type() != q.expected {
                        self.restore(save);
                        return Err(Error::new(ErrorCode::UnexpectedType, offset));
                    }
                    q.item = Some(item);
                }
                None => {
                    if let Err(e) = on_unmatched(&item) {
                        self.restore(save);
                        return Err(e);
                    }
                }
            }
        }
        self.restore(save);
        if queries.iter().any(|q| q.item.is_none()) {
            return Err(Error::new(ErrorCode::LabelNotFound, self.input.position()));
        }
        Ok(())
    }

    fn entered_map_level(&self) -> Result<usize, Error> {
        let offset = self.input.position();
        let level = self
            .nesting
            .bounded_level()
            .ok_or(Error::new(ErrorCode::MapNotEntered, offset))?;
        match self.nesting.frame_at(level) {
            Frame::Container {
                kind: ContainerKind::Map,
                ..
            } => Ok(level),
            _ => Err(Error::new(ErrorCode::MapNotEntered, offset)),
        }
    }

    /// Consumes items until the traversal is back at `level`; used to skip
    /// the subtree of a container-valued map entry.
    fn skip_to_level(&mut self, level: usize) -> Result<(), Error> {
        while self.nesting.level() > level {
            self.next_entry(false)?;
        }
        Ok(())
    }
}
