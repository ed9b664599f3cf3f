// SPDX-License-Identifier: Apache-2.0

use log::trace;

use crate::collection::CollectionData;
use crate::memory_pool::{Buffer, MemoryPool, POINTER_SIZE};
use crate::numbers::{Float, Integer, Number, UInt, FLOAT_SIZE, UINT_SIZE};
use crate::variant_slot::{VariantSlot, CONTENT_SIZE};
use crate::visitor::Visitor;
use crate::Error;

/// Type tag stored in the low bits of a slot's flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantTag {
    Null = 0x0,
    LinkedRaw = 0x2,
    OwnedRaw = 0x3,
    LinkedString = 0x4,
    OwnedString = 0x5,
    Boolean = 0x6,
    PositiveInteger = 0x7,
    NegativeInteger = 0x8,
    Float = 0x9,
    Array = 0xA,
    Object = 0xB,
}

impl VariantTag {
    fn from_flags(flags: u8) -> Self {
        match flags {
            0x2 => VariantTag::LinkedRaw,
            0x3 => VariantTag::OwnedRaw,
            0x4 => VariantTag::LinkedString,
            0x5 => VariantTag::OwnedString,
            0x6 => VariantTag::Boolean,
            0x7 => VariantTag::PositiveInteger,
            0x8 => VariantTag::NegativeInteger,
            0x9 => VariantTag::Float,
            0xA => VariantTag::Array,
            0xB => VariantTag::Object,
            _ => VariantTag::Null,
        }
    }

    /// Whether the content lives in the arena's string region.
    pub fn is_owned(self) -> bool {
        matches!(self, VariantTag::OwnedRaw | VariantTag::OwnedString)
    }

    pub fn is_collection(self) -> bool {
        matches!(self, VariantTag::Array | VariantTag::Object)
    }
}

/// Decoded view of a value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Content<'p> {
    Null,
    Boolean(bool),
    PositiveInteger(UInt),
    NegativeInteger(UInt),
    Float(Float),
    String(&'p str),
    /// Pre-serialized JSON, emitted verbatim by writers.
    Raw(&'p [u8]),
    Array(CollectionData),
    Object(CollectionData),
}

impl Content<'_> {
    pub fn number(&self) -> Option<Number> {
        match *self {
            Content::PositiveInteger(magnitude) => Some(Number::PositiveInteger(magnitude)),
            Content::NegativeInteger(magnitude) => Some(Number::NegativeInteger(magnitude)),
            Content::Float(value) => Some(Number::Float(value)),
            _ => None,
        }
    }
}

/// Handle to the value held by a slot.
///
/// All accessors take the arena the handle belongs to. A handle that does not
/// address a slot of that arena reads as null and rejects every write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariantData {
    offset: usize,
}

impl VariantData {
    pub(crate) const fn from_offset(offset: usize) -> Self {
        Self { offset }
    }

    pub fn slot(self) -> VariantSlot {
        VariantSlot::from_offset(self.offset)
    }

    pub fn tag<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> VariantTag {
        VariantTag::from_flags(self.slot().flags(pool))
    }

    fn position<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> Option<usize> {
        pool.slot_position(self.slot())
    }

    /// Position of the owned string an owned-content record points at.
    fn owned_position<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> Option<usize> {
        let position = self.position(pool)?;
        let displacement = pool.read_u32(position)? as usize;
        position.checked_sub(displacement)
    }

    /// Borrowed content with the lifetime of the memory it borrows.
    fn linked_bytes<'a, B: Buffer>(self, pool: &MemoryPool<'a, B>) -> Option<&'a [u8]> {
        match self.tag(pool) {
            VariantTag::LinkedString | VariantTag::LinkedRaw => {
                pool.read_linked(self.position(pool)?)
            }
            _ => None,
        }
    }

    fn decode<'p, B: Buffer>(self, pool: &'p MemoryPool<'_, B>) -> Option<Content<'p>> {
        let position = self.position(pool)?;
        let content = match self.tag(pool) {
            VariantTag::Null => Content::Null,
            VariantTag::Boolean => Content::Boolean(pool.read_bytes(position, 1)?[0] != 0),
            VariantTag::PositiveInteger => Content::PositiveInteger(UInt::from_ne_bytes(
                pool.read_array::<UINT_SIZE>(position)?,
            )),
            VariantTag::NegativeInteger => Content::NegativeInteger(UInt::from_ne_bytes(
                pool.read_array::<UINT_SIZE>(position)?,
            )),
            VariantTag::Float => {
                Content::Float(Float::from_ne_bytes(pool.read_array::<FLOAT_SIZE>(position)?))
            }
            VariantTag::LinkedString => {
                Content::String(core::str::from_utf8(pool.read_linked(position)?).ok()?)
            }
            VariantTag::OwnedString => Content::String(
                core::str::from_utf8(pool.owned_bytes(self.owned_position(pool)?)?).ok()?,
            ),
            VariantTag::LinkedRaw => Content::Raw(pool.read_linked(position)?),
            VariantTag::OwnedRaw => Content::Raw(pool.owned_bytes(self.owned_position(pool)?)?),
            VariantTag::Array => Content::Array(CollectionData::from_offset(self.offset)),
            VariantTag::Object => Content::Object(CollectionData::from_offset(self.offset)),
        };
        Some(content)
    }

    /// Decode the value. Invalid handles and unreadable records read as null.
    pub fn content<'p, B: Buffer>(self, pool: &'p MemoryPool<'_, B>) -> Content<'p> {
        self.decode(pool).unwrap_or(Content::Null)
    }

    pub fn is_null<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> bool {
        matches!(self.content(pool), Content::Null)
    }

    /// Whether the content is a copy inside the arena rather than a link.
    pub fn owns_content<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> bool {
        self.tag(pool).is_owned()
    }

    pub fn is_string<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> bool {
        matches!(self.content(pool), Content::String(_))
    }

    pub fn is_integer<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> bool {
        matches!(
            self.tag(pool),
            VariantTag::PositiveInteger | VariantTag::NegativeInteger
        )
    }

    pub fn is_float<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> bool {
        self.tag(pool) == VariantTag::Float
    }

    pub fn is_array<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> bool {
        self.tag(pool) == VariantTag::Array
    }

    pub fn is_object<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> bool {
        self.tag(pool) == VariantTag::Object
    }

    /// Booleans as is, numbers as `!= 0`, everything else false.
    pub fn as_bool<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> bool {
        match self.content(pool) {
            Content::Boolean(value) => value,
            Content::PositiveInteger(magnitude) | Content::NegativeInteger(magnitude) => {
                magnitude != 0
            }
            Content::Float(value) => value != 0.0,
            _ => false,
        }
    }

    pub fn as_number<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> Option<Number> {
        self.content(pool).number()
    }

    pub fn as_integer<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> Option<Integer> {
        self.as_number(pool)?.to_integer()
    }

    pub fn as_unsigned<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> Option<UInt> {
        self.as_number(pool)?.to_unsigned()
    }

    pub fn as_float<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> Option<Float> {
        self.as_number(pool).map(Number::to_float)
    }

    pub fn as_str<'p, B: Buffer>(self, pool: &'p MemoryPool<'_, B>) -> Option<&'p str> {
        match self.content(pool) {
            Content::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_raw<'p, B: Buffer>(self, pool: &'p MemoryPool<'_, B>) -> Option<&'p [u8]> {
        match self.content(pool) {
            Content::Raw(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_array<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> Option<CollectionData> {
        self.is_array(pool)
            .then(|| CollectionData::from_offset(self.offset))
    }

    pub fn as_object<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> Option<CollectionData> {
        self.is_object(pool)
            .then(|| CollectionData::from_offset(self.offset))
    }

    /// Either kind of collection.
    pub fn as_collection<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> Option<CollectionData> {
        self.tag(pool)
            .is_collection()
            .then(|| CollectionData::from_offset(self.offset))
    }

    /// Zero the content and retag the record. Key and link survive.
    fn reset<B: Buffer>(self, pool: &mut MemoryPool<'_, B>, tag: VariantTag) -> Result<usize, Error> {
        let position = self.position(pool).ok_or(Error::InvalidSlot)?;
        pool.zero(position, CONTENT_SIZE);
        self.slot().set_flags(pool, tag as u8);
        Ok(position)
    }

    pub fn set_null<B: Buffer>(self, pool: &mut MemoryPool<'_, B>) -> Result<(), Error> {
        self.reset(pool, VariantTag::Null).map(|_| ())
    }

    pub fn set_boolean<B: Buffer>(self, pool: &mut MemoryPool<'_, B>, value: bool) -> Result<(), Error> {
        let position = self.reset(pool, VariantTag::Boolean)?;
        pool.write_bytes(position, &[u8::from(value)]);
        Ok(())
    }

    fn set_number<B: Buffer>(self, pool: &mut MemoryPool<'_, B>, value: Number) -> Result<(), Error> {
        match value {
            Number::PositiveInteger(magnitude) => {
                let position = self.reset(pool, VariantTag::PositiveInteger)?;
                pool.write_bytes(position, &magnitude.to_ne_bytes());
            }
            Number::NegativeInteger(magnitude) => {
                let position = self.reset(pool, VariantTag::NegativeInteger)?;
                pool.write_bytes(position, &magnitude.to_ne_bytes());
            }
            Number::Float(value) => {
                let position = self.reset(pool, VariantTag::Float)?;
                pool.write_bytes(position, &value.to_ne_bytes());
            }
        }
        Ok(())
    }

    pub fn set_integer<B: Buffer>(self, pool: &mut MemoryPool<'_, B>, value: Integer) -> Result<(), Error> {
        self.set_number(pool, Number::from_integer(value))
    }

    pub fn set_unsigned<B: Buffer>(self, pool: &mut MemoryPool<'_, B>, value: UInt) -> Result<(), Error> {
        self.set_number(pool, Number::from_unsigned(value))
    }

    pub fn set_float<B: Buffer>(self, pool: &mut MemoryPool<'_, B>, value: Float) -> Result<(), Error> {
        self.set_number(pool, Number::Float(value))
    }

    /// Point the record at an owned string that is already in the arena.
    pub(crate) fn set_owned_at<B: Buffer>(
        self,
        pool: &mut MemoryPool<'_, B>,
        string: usize,
        tag: VariantTag,
    ) -> Result<(), Error> {
        let position = self.reset(pool, tag)?;
        let displacement = position.checked_sub(string).ok_or(Error::InvalidSlot)?;
        pool.write_u32(position, displacement as u32);
        Ok(())
    }

    fn set_owned<B: Buffer>(
        self,
        pool: &mut MemoryPool<'_, B>,
        bytes: &[u8],
        tag: VariantTag,
    ) -> Result<(), Error> {
        self.position(pool).ok_or(Error::InvalidSlot)?;
        let string = pool.alloc_owned_string(bytes).ok_or(Error::NoMemory)?;
        self.set_owned_at(pool, string, tag)
    }

    fn set_linked<'a, B: Buffer>(
        self,
        pool: &mut MemoryPool<'a, B>,
        bytes: &'a [u8],
        tag: VariantTag,
    ) -> Result<(), Error> {
        let position = self.reset(pool, tag)?;
        pool.write_linked(position, bytes);
        Ok(())
    }

    /// Copy `value` into the arena.
    pub fn set_owned_string<B: Buffer>(self, pool: &mut MemoryPool<'_, B>, value: &str) -> Result<(), Error> {
        self.set_owned(pool, value.as_bytes(), VariantTag::OwnedString)
    }

    /// Reference `value` without copying it.
    pub fn set_linked_string<'a, B: Buffer>(
        self,
        pool: &mut MemoryPool<'a, B>,
        value: &'a str,
    ) -> Result<(), Error> {
        self.set_linked(pool, value.as_bytes(), VariantTag::LinkedString)
    }

    pub fn set_owned_raw<B: Buffer>(self, pool: &mut MemoryPool<'_, B>, value: &[u8]) -> Result<(), Error> {
        self.set_owned(pool, value, VariantTag::OwnedRaw)
    }

    pub fn set_linked_raw<'a, B: Buffer>(
        self,
        pool: &mut MemoryPool<'a, B>,
        value: &'a [u8],
    ) -> Result<(), Error> {
        self.set_linked(pool, value, VariantTag::LinkedRaw)
    }

    /// Turn the value into an empty array.
    pub fn to_array<B: Buffer>(self, pool: &mut MemoryPool<'_, B>) -> Result<CollectionData, Error> {
        self.reset(pool, VariantTag::Array)?;
        Ok(CollectionData::from_offset(self.offset))
    }

    /// Turn the value into an empty object.
    pub fn to_object<B: Buffer>(self, pool: &mut MemoryPool<'_, B>) -> Result<CollectionData, Error> {
        self.reset(pool, VariantTag::Object)?;
        Ok(CollectionData::from_offset(self.offset))
    }

    /// Element or member count of a collection, 0 otherwise.
    pub fn size<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> usize {
        self.as_collection(pool).map_or(0, |collection| collection.size(pool))
    }

    /// Depth of the value: 1 for scalars and empty collections.
    pub fn nesting<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> usize {
        self.as_collection(pool)
            .map_or(1, |collection| collection.nesting(pool))
    }

    /// Arena bytes this value owns beyond its own slot.
    pub fn memory_usage<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> usize {
        match self.tag(pool) {
            VariantTag::OwnedString | VariantTag::OwnedRaw => self
                .owned_position(pool)
                .map_or(0, |string| pool.owned_footprint(string)),
            VariantTag::Array | VariantTag::Object => {
                CollectionData::from_offset(self.offset).memory_usage(pool)
            }
            _ => 0,
        }
    }

    /// Invoke the visitor method matching this value's kind.
    pub fn accept<B: Buffer, V: Visitor>(self, pool: &MemoryPool<'_, B>, visitor: &mut V) {
        match self.content(pool) {
            Content::Null => visitor.visit_null(),
            Content::Boolean(value) => visitor.visit_boolean(value),
            Content::PositiveInteger(magnitude) => visitor.visit_positive_integer(magnitude),
            Content::NegativeInteger(magnitude) => visitor.visit_negative_integer(magnitude),
            Content::Float(value) => visitor.visit_float(value),
            Content::String(value) => visitor.visit_string(value),
            Content::Raw(value) => visitor.visit_raw_json(value),
            Content::Array(array) => visitor.visit_array(pool, array),
            Content::Object(object) => visitor.visit_object(pool, object),
        }
    }

    /// Structural equality, across arenas.
    ///
    /// Numbers compare by value whatever their representation; null only
    /// equals null.
    pub fn equals<B: Buffer, B2: Buffer>(
        self,
        pool: &MemoryPool<'_, B>,
        other: VariantData,
        other_pool: &MemoryPool<'_, B2>,
    ) -> bool {
        match (self.content(pool), other.content(other_pool)) {
            (Content::Null, Content::Null) => true,
            (Content::Boolean(lhs), Content::Boolean(rhs)) => lhs == rhs,
            (Content::String(lhs), Content::String(rhs)) => lhs == rhs,
            (Content::Raw(lhs), Content::Raw(rhs)) => lhs == rhs,
            (Content::Array(lhs), Content::Array(rhs)) => lhs.equals_array(pool, rhs, other_pool),
            (Content::Object(lhs), Content::Object(rhs)) => {
                lhs.equals_object(pool, rhs, other_pool)
            }
            (lhs, rhs) => match (lhs.number(), rhs.number()) {
                (Some(lhs), Some(rhs)) => lhs.compare(rhs) == Some(core::cmp::Ordering::Equal),
                _ => false,
            },
        }
    }

    /// Deep copy `source` into this record.
    ///
    /// Owned content is duplicated into this arena, linked content stays
    /// linked, which is why the source's borrows must outlive this arena's.
    pub fn copy_from<'a, 's: 'a, B: Buffer, B2: Buffer>(
        self,
        pool: &mut MemoryPool<'a, B>,
        source: VariantData,
        source_pool: &MemoryPool<'s, B2>,
    ) -> Result<(), Error> {
        match source.tag(source_pool) {
            VariantTag::Array => {
                let array = self.to_array(pool)?;
                array.copy_from(pool, CollectionData::from_offset(source.offset), source_pool)
            }
            VariantTag::Object => {
                let object = self.to_object(pool)?;
                object.copy_from(pool, CollectionData::from_offset(source.offset), source_pool)
            }
            VariantTag::LinkedString => {
                let bytes = source.linked_bytes(source_pool).ok_or(Error::InvalidSlot)?;
                let value = core::str::from_utf8(bytes).map_err(|_| Error::InvalidSlot)?;
                self.set_linked_string(pool, value)
            }
            VariantTag::LinkedRaw => {
                let bytes = source.linked_bytes(source_pool).ok_or(Error::InvalidSlot)?;
                self.set_linked_raw(pool, bytes)
            }
            VariantTag::OwnedString => {
                let value = source.as_str(source_pool).ok_or(Error::InvalidSlot)?;
                self.set_owned_string(pool, value)
            }
            VariantTag::OwnedRaw => {
                let value = source.as_raw(source_pool).ok_or(Error::InvalidSlot)?;
                self.set_owned_raw(pool, value)
            }
            VariantTag::Null => self.set_null(pool),
            VariantTag::Boolean => self.set_boolean(pool, source.as_bool(source_pool)),
            VariantTag::PositiveInteger | VariantTag::NegativeInteger | VariantTag::Float => {
                let number = source.as_number(source_pool).ok_or(Error::InvalidSlot)?;
                self.set_number(pool, number)
            }
        }
    }

    /// Shift the displacement of owned content by `shift` bytes.
    pub(crate) fn move_pointers<B: Buffer>(self, pool: &mut MemoryPool<'_, B>, shift: isize) {
        if !self.tag(pool).is_owned() {
            return;
        }
        let Some(position) = self.position(pool) else {
            return;
        };
        if let Some(displacement) = pool.read_u32(position) {
            let moved = (displacement as usize).wrapping_add_signed(shift);
            trace!("rebased owned content at {}: {} -> {}", position, displacement, moved);
            pool.write_u32(position, moved as u32);
        }
    }
}

// Linked content is a (pointer, length) pair
const _: () = assert!(CONTENT_SIZE >= 2 * POINTER_SIZE);
const _: () = assert!(CONTENT_SIZE >= UINT_SIZE && CONTENT_SIZE >= FLOAT_SIZE);
