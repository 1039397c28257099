use crate::buffer::InBuf;
use crate::head::{
    decode_head, Head, AI_INDEFINITE, MAJOR_ARRAY, MAJOR_BYTES, MAJOR_MAP, MAJOR_NEG_INT,
    MAJOR_POS_INT, MAJOR_SIMPLE, MAJOR_TAG, MAJOR_TEXT,
};
use crate::item::{DecodedItem, Label, Value};
use crate::limits::{MAX_CUSTOM_TAGS, MAX_DECODE_INPUT_SIZE, MAX_ITEMS_IN_ARRAY, MAX_TAGS_PER_ITEM};
use crate::nesting::{ContainerKind, DecodeNesting, Frame, INDEFINITE_COUNT};
use crate::pool::StringAllocator;
use crate::tags::{TagSet, TAG_DATE_EPOCH, TAG_DATE_STRING, TAG_DAYS_EPOCH, TAG_DAYS_STRING,
    TAG_NEG_BIGNUM, TAG_POS_BIGNUM};
#[cfg(feature = "exp-mantissa")]
use crate::item::Mantissa;
#[cfg(feature = "exp-mantissa")]
use crate::tags::{TAG_BIGFLOAT, TAG_DECIMAL_FRACTION};
use crate::{Error, ErrorCode};

#[cfg(feature = "float")]
use crate::float;

/// How maps and their labels are handled during decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    /// Labels may be integers, byte strings, or text strings; map entries
    /// are delivered as one item carrying both label and value.
    #[default]
    Normal,
    /// As [`Normal`](Self::Normal), but only text-string labels are
    /// accepted.
    MapStringsOnly,
    /// Maps are reported as [`Value::MapAsArray`] with a doubled count and
    /// labels are delivered as ordinary items.
    MapAsArray,
}

/// Decoder configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// Map and label handling.
    pub mode: DecodeMode,
    /// Reject non-minimal integer argument encodings. Off by default; RFC
    /// 8949 well-formedness does not require minimal encoding.
    pub strict_minimal: bool,
}

#[derive(Clone, Copy)]
pub(crate) struct Descend {
    kind: ContainerKind,
    indefinite: bool,
    items: u16,
}

pub(crate) struct RawItem<'data> {
    value: Value<'data>,
    allocated: bool,
    tags: TagSet,
    descend: Option<Descend>,
}

pub(crate) enum Fetched<'data> {
    Break(usize),
    Item(RawItem<'data>),
}

/// Saved traversal position for non-consuming scans.
#[derive(Clone, Copy)]
pub(crate) struct Snapshot<'data> {
    input: InBuf<'data>,
    nesting: DecodeNesting,
}

/// Pull decoder over an in-memory CBOR byte sequence.
///
/// [`next_item`](Self::next_item) performs a pre-order traversal, one data
/// item per call; the map-mode layer adds labelled navigation on top. A
/// decoder borrows the input for `'data` and never copies string payloads
/// unless an allocator is configured.
///
/// Several top-level data items form a CBOR sequence and decode naturally;
/// [`next_item`](Self::next_item) reports
/// [`ErrorCode::NoMoreItems`] at the end.
pub struct Decoder<'data> {
    pub(crate) input: InBuf<'data>,
    pub(crate) nesting: DecodeNesting,
    mode: DecodeMode,
    strict: bool,
    pub(crate) last_error: Option<Error>,
    allocator: Option<&'data dyn StringAllocator<'data>>,
    copy_all_strings: bool,
    custom_tags: [u64; MAX_CUSTOM_TAGS],
    custom_tag_count: usize,
    last_tags: [u64; MAX_TAGS_PER_ITEM],
    last_tag_count: usize,
    init_error: Option<Error>,
}

impl<'data> Decoder<'data> {
    /// Creates a decoder over `input` in the given mode. Never fails; an
    /// oversized input is reported by the first decode call.
    #[must_use]
    pub fn new(input: &'data [u8], mode: DecodeMode) -> Self {
        Self::with_options(
            input,
            DecodeOptions {
                mode,
                ..DecodeOptions::default()
            },
        )
    }

    /// Creates a decoder with full options.
    #[must_use]
    pub fn with_options(input: &'data [u8], options: DecodeOptions) -> Self {
        let init_error = if input.len() > MAX_DECODE_INPUT_SIZE {
            Some(Error::new(ErrorCode::InputTooLarge, input.len()))
        } else {
            None
        };
        Self {
            input: InBuf::new(input),
            nesting: DecodeNesting::new(),
            mode: options.mode,
            strict: options.strict_minimal,
            last_error: None,
            allocator: None,
            copy_all_strings: false,
            custom_tags: [0; MAX_CUSTOM_TAGS],
            custom_tag_count: 0,
            last_tags: [0; MAX_TAGS_PER_ITEM],
            last_tag_count: 0,
            init_error,
        }
    }

    /// Configures the string allocator used for indefinite-length strings.
    /// With `all_strings` set, every string (labels included) is copied into
    /// allocator memory so the input buffer can be released after decoding.
    pub fn set_string_allocator(
        &mut self,
        allocator: &'data dyn StringAllocator<'data>,
        all_strings: bool,
    ) {
        self.allocator = Some(allocator);
        self.copy_all_strings = all_strings;
    }

    /// Configures additional tags to track in item tag bitmaps, beyond the
    /// built-in table.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorCode::TooManyTags`] for more than
    /// [`MAX_CUSTOM_TAGS`] tags.
    pub fn set_custom_tags(&mut self, tags: &[u64]) -> Result<(), Error> {
        if tags.len() > MAX_CUSTOM_TAGS {
            return Err(Error::new(ErrorCode::TooManyTags, 0));
        }
        self.custom_tags[..tags.len()].copy_from_slice(tags);
        self.custom_tag_count = tags.len();
        Ok(())
    }

    /// The current input byte offset.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.input.position()
    }

    /// Whether `item` carried `tag`, for tags in the built-in table or the
    /// caller-configured list.
    #[must_use]
    pub fn is_tagged(&self, item: &DecodedItem<'_>, tag: u64) -> bool {
        if item.tags.contains_builtin(tag) {
            return true;
        }
        self.custom_tags[..self.custom_tag_count]
            .iter()
            .position(|&t| t == tag)
            .is_some_and(|i| item.tags.contains_custom(i))
    }

    /// Returns the next data item of the pre-order traversal.
    ///
    /// A container item is its head only; the children follow on later
    /// calls, with `nest_level`/`next_nest_level` describing the tree.
    ///
    /// # Errors
    ///
    /// [`ErrorCode::NoMoreItems`] at the end of the input (or of an entered
    /// container); otherwise a well-formedness, limit, or content error.
    pub fn next_item(&mut self) -> Result<DecodedItem<'data>, Error> {
        self.next_entry(false)
    }

    /// As [`next_item`](Self::next_item), also writing the item's
    /// non-promoted tag numbers (innermost first) into `tags_out`.
    ///
    /// # Errors
    ///
    /// [`ErrorCode::TooManyTags`] when `tags_out` is too small; otherwise as
    /// [`next_item`](Self::next_item).
    pub fn next_item_with_tags(
        &mut self,
        tags_out: &mut [u64],
    ) -> Result<(DecodedItem<'data>, usize), Error> {
        let item = self.next_entry(false)?;
        let n = self.last_tag_count;
        if n > tags_out.len() {
            return Err(Error::new(ErrorCode::TooManyTags, self.input.position()));
        }
        tags_out[..n].copy_from_slice(&self.last_tags[..n]);
        Ok((item, n))
    }

    /// Returns the next item without consuming it.
    ///
    /// # Errors
    ///
    /// As [`next_item`](Self::next_item).
    pub fn peek_next(&mut self) -> Result<DecodedItem<'data>, Error> {
        let save = self.snapshot();
        let result = self.next_entry(false);
        self.restore(save);
        result
    }

    /// Finishes decoding: verifies that every container was consumed and no
    /// input remains, then destructs the allocator (exactly once).
    ///
    /// # Errors
    ///
    /// The sticky error if one is set; [`ErrorCode::ArrayOrMapUnconsumed`]
    /// or [`ErrorCode::ExtraBytes`] otherwise.
    pub fn finish(self) -> Result<(), Error> {
        let result = self.finish_check();
        if let Some(allocator) = self.allocator {
            allocator.destruct();
        }
        result
    }

    fn finish_check(&self) -> Result<(), Error> {
        if let Some(e) = self.init_error {
            return Err(e);
        }
        if let Some(e) = self.last_error {
            return Err(e);
        }
        if self.nesting.in_container() {
            return Err(Error::new(
                ErrorCode::ArrayOrMapUnconsumed,
                self.input.position(),
            ));
        }
        if !self.input.is_at_limit() {
            return Err(Error::new(ErrorCode::ExtraBytes, self.input.position()));
        }
        Ok(())
    }

    pub(crate) const fn snapshot(&self) -> Snapshot<'data> {
        Snapshot {
            input: self.input,
            nesting: self.nesting,
        }
    }

    pub(crate) fn restore(&mut self, save: Snapshot<'data>) {
        self.input = save.input;
        self.nesting = save.nesting;
    }

    /// One full traversal step. With `defer_ascend` set (used by the enter
    /// operations) the post-item ascent is skipped for non-descending items
    /// so the caller can splice in a bounded frame first.
    pub(crate) fn next_entry(&mut self, defer_ascend: bool) -> Result<DecodedItem<'data>, Error> {
        if let Some(e) = self.init_error {
            return Err(e);
        }
        loop {
            if self.at_end_of_bounded() || (self.nesting.at_top() && self.input.is_at_limit()) {
                return Err(Error::new(ErrorCode::NoMoreItems, self.input.position()));
            }

            let fetched = self.next_full()?;
            let raw = match fetched {
                Fetched::Break(offset) => {
                    self.close_indefinite(offset)?;
                    continue;
                }
                Fetched::Item(raw) => raw,
            };

            let level = self.nesting.level();
            let in_map = matches!(
                self.nesting.frame(),
                Frame::Container {
                    kind: ContainerKind::Map,
                    ..
                }
            );
            self.nesting.consume_one();

            let (raw, label, label_allocated) = if in_map {
                let label = self.label_of(&raw)?;
                let label_allocated = raw.allocated;
                let value = match self.next_full()? {
                    Fetched::Break(offset) => {
                        return Err(Error::new(ErrorCode::BadBreak, offset));
                    }
                    Fetched::Item(raw) => raw,
                };
                self.nesting.consume_one();
                (value, label, label_allocated)
            } else {
                (raw, Label::None, false)
            };

            let offset = self.input.position();
            let descends = match raw.descend {
                Some(d) if d.indefinite || d.items > 0 => {
                    self.nesting.descend(d.kind, d.indefinite, d.items, offset)?;
                    true
                }
                _ => false,
            };
            if !descends && !defer_ascend {
                self.ascend();
            }

            return Ok(DecodedItem {
                value: raw.value,
                label,
                nest_level: level as u8,
                next_nest_level: self.nesting.level() as u8,
                tags: raw.tags,
                data_allocated: raw.allocated,
                label_allocated,
            });
        }
    }

    fn label_of(&self, raw: &RawItem<'data>) -> Result<Label<'data>, Error> {
        let offset = self.input.position();
        let label = match raw.value {
            Value::Int64(v) => Label::Int64(v),
            Value::UInt64(v) => Label::UInt64(v),
            Value::ByteString(b) => Label::ByteString(b),
            Value::TextString(t) => Label::TextString(t),
            _ => return Err(Error::new(ErrorCode::MapLabelType, offset)),
        };
        if self.mode == DecodeMode::MapStringsOnly
            && !matches!(label, Label::TextString(_))
        {
            return Err(Error::new(ErrorCode::MapLabelType, offset));
        }
        Ok(label)
    }

    /// True when the traversal cursor sits at the end of the innermost
    /// entered container.
    fn at_end_of_bounded(&self) -> bool {
        let Some(level) = self.nesting.bounded_level() else {
            return false;
        };
        if level != self.nesting.level() {
            return false;
        }
        match self.nesting.frame_at(level) {
            Frame::Container { remaining, .. } => remaining == 0,
            Frame::BstrWrap { .. } => self.input.is_at_limit(),
            Frame::Top => false,
        }
    }

    /// Handles a break read where an item was expected.
    fn close_indefinite(&mut self, offset: usize) -> Result<(), Error> {
        match self.nesting.frame() {
            Frame::Container {
                indefinite: true,
                bounded,
                ..
            } => {
                if bounded {
                    self.nesting.mark_bounded_done();
                } else {
                    self.nesting.pop();
                    self.ascend();
                }
                Ok(())
            }
            _ => Err(Error::new(ErrorCode::BadBreak, offset)),
        }
    }

    /// Pops completed definite frames and consumes pending breaks of
    /// completed indefinite frames, stopping at bounded frames.
    pub(crate) fn ascend(&mut self) {
        loop {
            match self.nesting.frame() {
                Frame::Container {
                    indefinite: false,
                    remaining: 0,
                    bounded: false,
                    ..
                } => {
                    self.nesting.pop();
                }
                Frame::Container {
                    indefinite: true,
                    bounded,
                    remaining,
                    ..
                } if remaining != 0 => {
                    if self.input.peek_u8() != Some(0xff) {
                        return;
                    }
                    let _ = self.input.read_u8();
                    if bounded {
                        self.nesting.mark_bounded_done();
                        return;
                    }
                    self.nesting.pop();
                }
                _ => return,
            }
        }
    }

    /// Reads one raw item or break: head, tag chain, string payloads. Does
    /// not touch the nesting stack.
    fn next_full(&mut self) -> Result<Fetched<'data>, Error> {
        let head = decode_head(&mut self.input, self.strict)?;
        if head.is_break() {
            return Ok(Fetched::Break(head.offset));
        }

        if head.major != MAJOR_TAG {
            self.last_tag_count = 0;
            let raw = self.item_from_head(head)?;
            return Ok(Fetched::Item(raw));
        }

        // Absorb the tag chain, outermost first.
        let mut chain = [0_u64; MAX_TAGS_PER_ITEM];
        let mut count = 0;
        let mut head = head;
        while head.major == MAJOR_TAG {
            if count >= MAX_TAGS_PER_ITEM {
                return Err(Error::new(ErrorCode::TooManyTags, head.offset));
            }
            chain[count] = head.arg;
            count += 1;
            head = decode_head(&mut self.input, self.strict)?;
            if head.is_break() {
                return Err(Error::new(ErrorCode::BadBreak, head.offset));
            }
        }

        let innermost = chain[count - 1];
        let promoted = self.promote(innermost, head)?;
        let (raw, kept) = match promoted {
            Some((value, allocated)) => (
                RawItem {
                    value,
                    allocated,
                    tags: TagSet::EMPTY,
                    descend: None,
                },
                count - 1,
            ),
            None => (self.item_from_head(head)?, count),
        };

        // Remaining tags: bitmap for recognised ones, raw list innermost
        // first for `next_item_with_tags`.
        let mut tags = TagSet::EMPTY;
        for &tag in &chain[..kept] {
            if !tags.insert_builtin(tag) {
                if let Some(i) = self.custom_tags[..self.custom_tag_count]
                    .iter()
                    .position(|&t| t == tag)
                {
                    tags.insert_custom(i);
                }
            }
        }
        self.last_tag_count = kept;
        for i in 0..kept {
            self.last_tags[i] = chain[kept - 1 - i];
        }

        Ok(Fetched::Item(RawItem { tags, ..raw }))
    }

    /// Builds a raw item from an already-read non-tag head.
    fn item_from_head(&mut self, head: Head) -> Result<RawItem<'data>, Error> {
        let value = match head.major {
            MAJOR_POS_INT => match i64::try_from(head.arg) {
                Ok(v) => Value::Int64(v),
                Err(_) => Value::UInt64(head.arg),
            },
            MAJOR_NEG_INT => match i64::try_from(head.arg) {
                Ok(v) => Value::Int64(-1 - v),
                Err(_) => return Err(Error::new(ErrorCode::IntOverflow, head.offset)),
            },
            MAJOR_BYTES | MAJOR_TEXT => {
                let (bytes, allocated) = self.read_string_payload(head)?;
                let value = if head.major == MAJOR_BYTES {
                    Value::ByteString(bytes)
                } else {
                    Value::TextString(bytes)
                };
                return Ok(RawItem {
                    value,
                    allocated,
                    tags: TagSet::EMPTY,
                    descend: None,
                });
            }
            MAJOR_ARRAY | MAJOR_MAP => return self.container_from_head(head),
            MAJOR_SIMPLE => self.simple_from_head(head)?,
            _ => unreachable!("tag heads are absorbed by the caller"),
        };
        Ok(RawItem {
            value,
            allocated: false,
            tags: TagSet::EMPTY,
            descend: None,
        })
    }

    fn container_from_head(&mut self, head: Head) -> Result<RawItem<'data>, Error> {
        let indefinite = head.is_indefinite();
        #[cfg(not(feature = "indef-containers"))]
        if indefinite {
            return Err(Error::new(ErrorCode::IndefLenArraysDisabled, head.offset));
        }

        let as_array_map = head.major == MAJOR_MAP && self.mode == DecodeMode::MapAsArray;
        let items = if indefinite {
            0
        } else {
            let mult = if head.major == MAJOR_MAP { 2 } else { 1 };
            let items = head.arg.checked_mul(mult);
            match items {
                Some(items) if items <= MAX_ITEMS_IN_ARRAY => items as u16,
                _ => return Err(Error::new(ErrorCode::ArrayDecodeTooLong, head.offset)),
            }
        };

        let kind = if head.major == MAJOR_ARRAY {
            ContainerKind::Array
        } else if as_array_map {
            ContainerKind::MapAsArray
        } else {
            ContainerKind::Map
        };

        let count = if indefinite {
            INDEFINITE_COUNT
        } else if head.major == MAJOR_ARRAY || as_array_map {
            items
        } else {
            head.arg as u16
        };

        let value = match kind {
            ContainerKind::Array => Value::Array(count),
            ContainerKind::Map => Value::Map(count),
            ContainerKind::MapAsArray => Value::MapAsArray(count),
        };

        Ok(RawItem {
            value,
            allocated: false,
            tags: TagSet::EMPTY,
            descend: Some(Descend {
                kind,
                indefinite,
                items,
            }),
        })
    }

    fn simple_from_head(&self, head: Head) -> Result<Value<'data>, Error> {
        match head.ai {
            0..=24 => Ok(match head.arg {
                20 => Value::Bool(false),
                21 => Value::Bool(true),
                22 => Value::Null,
                23 => Value::Undefined,
                v => Value::Simple(v as u8),
            }),
            25 => {
                #[cfg(not(feature = "float"))]
                {
                    Err(Error::new(ErrorCode::AllFloatDisabled, head.offset))
                }
                #[cfg(all(feature = "float", not(feature = "preferred-float")))]
                {
                    Err(Error::new(ErrorCode::HalfPrecisionDisabled, head.offset))
                }
                #[cfg(all(feature = "float", feature = "preferred-float"))]
                {
                    Ok(Value::Double(float::half_to_double(head.arg as u16)))
                }
            }
            26 => {
                #[cfg(not(feature = "float"))]
                {
                    Err(Error::new(ErrorCode::AllFloatDisabled, head.offset))
                }
                #[cfg(all(feature = "float", not(feature = "float-hw")))]
                {
                    Ok(Value::Float(f32::from_bits(head.arg as u32)))
                }
                #[cfg(all(feature = "float", feature = "float-hw"))]
                {
                    Ok(Value::Double(float::single_to_double(head.arg as u32)))
                }
            }
            _ => {
                debug_assert_eq!(head.ai, 27);
                #[cfg(not(feature = "float"))]
                {
                    Err(Error::new(ErrorCode::AllFloatDisabled, head.offset))
                }
                #[cfg(feature = "float")]
                {
                    Ok(Value::Double(f64::from_bits(head.arg)))
                }
            }
        }
    }

    /// Reads a string payload for an already-read major 2/3 head, going
    /// through the allocator for indefinite-length strings and, in
    /// all-strings mode, for definite ones too.
    fn read_string_payload(&mut self, head: Head) -> Result<(&'data [u8], bool), Error> {
        if head.is_indefinite() {
            #[cfg(feature = "indef-strings")]
            {
                let bytes = self.read_indefinite_string(head)?;
                return Ok((bytes, true));
            }
            #[cfg(not(feature = "indef-strings"))]
            {
                return Err(Error::new(ErrorCode::IndefLenStringsDisabled, head.offset));
            }
        }
        let len = usize::try_from(head.arg)
            .map_err(|_| Error::new(ErrorCode::StringTooLong, head.offset))?;
        let bytes = self.input.read_exact(len)?;
        if self.copy_all_strings {
            if let Some(allocator) = self.allocator {
                let offset = self.input.position();
                allocator.begin();
                if allocator.append(bytes).is_err() {
                    allocator.discard();
                    return Err(Error::new(ErrorCode::StringAllocate, offset));
                }
                let copied = allocator
                    .seal()
                    .map_err(|_| Error::new(ErrorCode::StringAllocate, offset))?;
                return Ok((copied, true));
            }
        }
        Ok((bytes, false))
    }

    #[cfg(feature = "indef-strings")]
    fn read_indefinite_string(&mut self, head: Head) -> Result<&'data [u8], Error> {
        let Some(allocator) = self.allocator else {
            return Err(Error::new(ErrorCode::NoStringAllocator, head.offset));
        };
        allocator.begin();
        loop {
            let chunk_head = match decode_head(&mut self.input, self.strict) {
                Ok(h) => h,
                Err(e) => {
                    allocator.discard();
                    return Err(e);
                }
            };
            if chunk_head.is_break() {
                break;
            }
            if chunk_head.major != head.major || chunk_head.ai == AI_INDEFINITE {
                allocator.discard();
                return Err(Error::new(
                    ErrorCode::IndefiniteStringChunk,
                    chunk_head.offset,
                ));
            }
            let len = match usize::try_from(chunk_head.arg) {
                Ok(len) => len,
                Err(_) => {
                    allocator.discard();
                    return Err(Error::new(ErrorCode::StringTooLong, chunk_head.offset));
                }
            };
            let chunk = match self.input.read_exact(len) {
                Ok(chunk) => chunk,
                Err(e) => {
                    allocator.discard();
                    return Err(e);
                }
            };
            if allocator.append(chunk).is_err() {
                allocator.discard();
                return Err(Error::new(ErrorCode::StringAllocate, chunk_head.offset));
            }
        }
        allocator
            .seal()
            .map_err(|_| Error::new(ErrorCode::StringAllocate, self.input.position()))
    }

    /// Promotes the content of a recognised innermost tag; `Ok(None)` means
    /// the tag is not promotable and stays in the bitmap.
    fn promote(&mut self, tag: u64, head: Head) -> Result<Option<(Value<'data>, bool)>, Error> {
        match tag {
            TAG_DATE_STRING | TAG_DAYS_STRING => {
                if head.major != MAJOR_TEXT {
                    return Err(Error::new(ErrorCode::UnrecoverableTagContent, head.offset));
                }
                let (bytes, allocated) = self.read_string_payload(head)?;
                let value = if tag == TAG_DATE_STRING {
                    Value::DateString(bytes)
                } else {
                    Value::DaysString(bytes)
                };
                Ok(Some((value, allocated)))
            }
            TAG_POS_BIGNUM | TAG_NEG_BIGNUM => {
                if head.major != MAJOR_BYTES {
                    return Err(Error::new(ErrorCode::UnrecoverableTagContent, head.offset));
                }
                let (bytes, allocated) = self.read_string_payload(head)?;
                let value = if tag == TAG_POS_BIGNUM {
                    Value::PosBignum(bytes)
                } else {
                    Value::NegBignum(bytes)
                };
                Ok(Some((value, allocated)))
            }
            TAG_DATE_EPOCH => self.date_epoch(head).map(Some),
            TAG_DAYS_EPOCH => self.days_epoch(head).map(Some),
            #[cfg(feature = "exp-mantissa")]
            TAG_DECIMAL_FRACTION | TAG_BIGFLOAT => {
                let (exponent, mantissa) = self.exp_mantissa(head)?;
                let value = if tag == TAG_DECIMAL_FRACTION {
                    Value::DecimalFraction { exponent, mantissa }
                } else {
                    Value::BigFloat { exponent, mantissa }
                };
                Ok(Some((value, false)))
            }
            #[cfg(not(feature = "exp-mantissa"))]
            4 | 5 => Err(Error::new(ErrorCode::ExpMantissaDisabled, head.offset)),
            _ => Ok(None),
        }
    }

    fn date_epoch(&mut self, head: Head) -> Result<(Value<'data>, bool), Error> {
        let value = match head.major {
            MAJOR_POS_INT => match i64::try_from(head.arg) {
                Ok(seconds) => Value::DateEpoch {
                    seconds,
                    fraction: 0.0,
                },
                Err(_) => return Err(Error::new(ErrorCode::DateOverflow, head.offset)),
            },
            MAJOR_NEG_INT => match i64::try_from(head.arg) {
                Ok(n) => Value::DateEpoch {
                    seconds: -1 - n,
                    fraction: 0.0,
                },
                Err(_) => return Err(Error::new(ErrorCode::DateOverflow, head.offset)),
            },
            MAJOR_SIMPLE if matches!(head.ai, 25..=27) => self.float_date(head)?,
            _ => return Err(Error::new(ErrorCode::UnrecoverableTagContent, head.offset)),
        };
        Ok((value, false))
    }

    #[allow(clippy::unused_self)]
    fn float_date(&self, head: Head) -> Result<Value<'data>, Error> {
        #[cfg(not(feature = "float"))]
        {
            Err(Error::new(ErrorCode::AllFloatDisabled, head.offset))
        }
        #[cfg(all(feature = "float", not(feature = "float-hw")))]
        {
            Err(Error::new(ErrorCode::HwFloatDisabled, head.offset))
        }
        #[cfg(all(feature = "float", feature = "float-hw"))]
        {
            let d = match head.ai {
                25 => {
                    #[cfg(not(feature = "preferred-float"))]
                    {
                        return Err(Error::new(ErrorCode::HalfPrecisionDisabled, head.offset));
                    }
                    #[cfg(feature = "preferred-float")]
                    {
                        float::half_to_double(head.arg as u16)
                    }
                }
                26 => float::single_to_double(head.arg as u32),
                _ => f64::from_bits(head.arg),
            };
            // The full i64 range is the ±292-billion-year limit.
            if !(d >= -9.223_372_036_854_776e18 && d < 9.223_372_036_854_776e18) {
                return Err(Error::new(ErrorCode::DateOverflow, head.offset));
            }
            let truncated = d as i64;
            let seconds = if truncated as f64 > d {
                truncated - 1
            } else {
                truncated
            };
            Ok(Value::DateEpoch {
                seconds,
                fraction: d - seconds as f64,
            })
        }
    }

    fn days_epoch(&self, head: Head) -> Result<(Value<'data>, bool), Error> {
        let days = match head.major {
            MAJOR_POS_INT => i64::try_from(head.arg)
                .map_err(|_| Error::new(ErrorCode::DateOverflow, head.offset))?,
            MAJOR_NEG_INT => {
                let n = i64::try_from(head.arg)
                    .map_err(|_| Error::new(ErrorCode::DateOverflow, head.offset))?;
                -1 - n
            }
            _ => return Err(Error::new(ErrorCode::UnrecoverableTagContent, head.offset)),
        };
        Ok((Value::DaysEpoch(days), false))
    }

    /// Decodes the `[exponent, mantissa]` array of a tag 4/5. The children
    /// are read directly (no generic tag recursion): the only tag allowed
    /// inside is a bignum mantissa.
    #[cfg(feature = "exp-mantissa")]
    fn exp_mantissa(&mut self, head: Head) -> Result<(i64, Mantissa<'data>), Error> {
        if head.major != MAJOR_ARRAY || head.is_indefinite() || head.arg != 2 {
            return Err(Error::new(ErrorCode::BadExpAndMantissa, head.offset));
        }

        let exp_head = decode_head(&mut self.input, self.strict)?;
        let exponent = match exp_head.major {
            MAJOR_POS_INT => i64::try_from(exp_head.arg)
                .map_err(|_| Error::new(ErrorCode::BadExpAndMantissa, exp_head.offset))?,
            MAJOR_NEG_INT => {
                let n = i64::try_from(exp_head.arg)
                    .map_err(|_| Error::new(ErrorCode::BadExpAndMantissa, exp_head.offset))?;
                -1 - n
            }
            _ => return Err(Error::new(ErrorCode::BadExpAndMantissa, exp_head.offset)),
        };

        let mant_head = decode_head(&mut self.input, self.strict)?;
        let mantissa = match mant_head.major {
            MAJOR_POS_INT => Mantissa::Int64(
                i64::try_from(mant_head.arg)
                    .map_err(|_| Error::new(ErrorCode::BadExpAndMantissa, mant_head.offset))?,
            ),
            MAJOR_NEG_INT => {
                let n = i64::try_from(mant_head.arg)
                    .map_err(|_| Error::new(ErrorCode::BadExpAndMantissa, mant_head.offset))?;
                Mantissa::Int64(-1 - n)
            }
            MAJOR_TAG if matches!(mant_head.arg, TAG_POS_BIGNUM | TAG_NEG_BIGNUM) => {
                let content = decode_head(&mut self.input, self.strict)?;
                if content.major != MAJOR_BYTES {
                    return Err(Error::new(ErrorCode::BadExpAndMantissa, content.offset));
                }
                let (bytes, _) = self.read_string_payload(content)?;
                if mant_head.arg == TAG_POS_BIGNUM {
                    Mantissa::PosBignum(bytes)
                } else {
                    Mantissa::NegBignum(bytes)
                }
            }
            _ => return Err(Error::new(ErrorCode::BadExpAndMantissa, mant_head.offset)),
        };

        Ok((exponent, mantissa))
    }
}
