// SPDX-License-Identifier: Apache-2.0

//! Slot records: one value plus the links that chain it into a collection.
//!
//! A record is `CONTENT_SIZE` bytes of value content followed by two packed
//! words:
//!
//! ```text
//! +-------------------+------------------------+------------------------+
//! | content           | next (28) | flags (4)  | key disp (30) | kind(2)|
//! +-------------------+------------------------+------------------------+
//! ```
//!
//! `next` is the signed distance to the successor in slot units, 0 meaning
//! none. The key displacement is the byte distance from the record down to
//! the key data in the string region, 0 meaning no key.

use crate::memory_pool::{Buffer, MemoryPool, POINTER_SIZE};
use crate::variant_data::VariantData;

pub(crate) const CONTENT_SIZE: usize = if 2 * POINTER_SIZE > 8 {
    2 * POINTER_SIZE
} else {
    8
};

/// Bytes taken by every value in the arena.
pub const SLOT_SIZE: usize = CONTENT_SIZE + 8;

const FLAGS_FIELD: usize = CONTENT_SIZE;
const KEY_FIELD: usize = CONTENT_SIZE + 4;

pub(crate) const FLAG_MASK: u32 = 0xF;
const NEXT_SHIFT: u32 = 4;
const KEY_KIND_MASK: u32 = 0x3;
const KEY_SHIFT: u32 = 2;

/// Where the characters of a member key live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Copied into the arena.
    Owned = 0,
    /// Borrowed from caller memory.
    Linked = 1,
    /// Borrowed from the input a parser is reading.
    InSource = 2,
    /// Borrowed from a `'static` string.
    Static = 3,
}

impl KeyKind {
    fn from_bits(bits: u32) -> Self {
        match bits & KEY_KIND_MASK {
            0 => KeyKind::Owned,
            1 => KeyKind::Linked,
            2 => KeyKind::InSource,
            _ => KeyKind::Static,
        }
    }

    pub fn is_owned(self) -> bool {
        self == KeyKind::Owned
    }
}

/// Handle to a slot record.
///
/// Measured from the top of the slot region, so it stays valid when the
/// arena squashes or grows.
///
/// Keys are only attached through [`CollectionData`](crate::CollectionData),
/// which writes the key record itself. A key cannot be pointed at arbitrary
/// arena bytes:
///
/// ```compile_fail
/// use arenajson::{KeyKind, MemoryPool};
///
/// let mut buffer = [0u8; 128];
/// let mut pool = MemoryPool::new(&mut buffer[..]);
/// let position = pool.alloc_owned_string(b"not a key record").unwrap();
/// let slot = pool.alloc_variant().unwrap();
/// slot.set_linked_key(&mut pool, position, KeyKind::Linked);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariantSlot {
    offset: usize,
}

impl VariantSlot {
    pub(crate) const ROOT: VariantSlot = VariantSlot { offset: SLOT_SIZE };

    pub(crate) const fn from_offset(offset: usize) -> Self {
        Self { offset }
    }

    pub(crate) const fn offset(self) -> usize {
        self.offset
    }

    /// The value stored in this slot.
    pub fn data(self) -> VariantData {
        VariantData::from_offset(self.offset)
    }

    fn packed<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> Option<u32> {
        let position = pool.slot_position(self)?;
        pool.read_u32(position + FLAGS_FIELD)
    }

    fn set_packed<B: Buffer>(self, pool: &mut MemoryPool<'_, B>, packed: u32) {
        if let Some(position) = pool.slot_position(self) {
            pool.write_u32(position + FLAGS_FIELD, packed);
        }
    }

    /// Type tag of the value, 0 for an invalid handle.
    pub(crate) fn flags<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> u8 {
        self.packed(pool)
            .map_or(0, |packed| (packed & FLAG_MASK) as u8)
    }

    pub(crate) fn set_flags<B: Buffer>(self, pool: &mut MemoryPool<'_, B>, flags: u8) {
        let Some(packed) = self.packed(pool) else {
            return;
        };
        self.set_packed(pool, (packed & !FLAG_MASK) | (u32::from(flags) & FLAG_MASK));
    }

    /// Successor in the collection chain.
    pub fn next<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> Option<VariantSlot> {
        let distance = (self.packed(pool)? as i32) >> NEXT_SHIFT;
        if distance == 0 {
            return None;
        }
        let bytes = isize::try_from(distance)
            .ok()?
            .checked_mul(SLOT_SIZE as isize)?;
        let next = VariantSlot::from_offset(self.offset.checked_add_signed(bytes)?);
        pool.slot_position(next)?;
        Some(next)
    }

    /// Walk `distance` links forward.
    pub fn next_n<B: Buffer>(
        self,
        pool: &MemoryPool<'_, B>,
        distance: usize,
    ) -> Option<VariantSlot> {
        let mut slot = self;
        for _ in 0..distance {
            slot = slot.next(pool)?;
        }
        Some(slot)
    }

    pub fn set_next<B: Buffer>(self, pool: &mut MemoryPool<'_, B>, next: Option<VariantSlot>) {
        let Some(packed) = self.packed(pool) else {
            return;
        };
        let distance = match next {
            Some(next) => {
                let bytes = next.offset as isize - self.offset as isize;
                (bytes / SLOT_SIZE as isize) as i32
            }
            None => 0,
        };
        self.set_packed(pool, ((distance << NEXT_SHIFT) as u32) | (packed & FLAG_MASK));
    }

    fn key_field<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> Option<(usize, u32)> {
        let position = pool.slot_position(self)?;
        let field = pool.read_u32(position + KEY_FIELD)?;
        Some((position, field))
    }

    /// Absolute position of the key data and its kind.
    fn key_location<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> Option<(usize, KeyKind)> {
        let (position, field) = self.key_field(pool)?;
        let displacement = (field >> KEY_SHIFT) as usize;
        if displacement == 0 {
            return None;
        }
        Some((
            position.checked_sub(displacement)?,
            KeyKind::from_bits(field),
        ))
    }

    fn set_key<B: Buffer>(self, pool: &mut MemoryPool<'_, B>, key: usize, kind: KeyKind) {
        let Some(position) = pool.slot_position(self) else {
            return;
        };
        let Some(displacement) = position.checked_sub(key) else {
            return;
        };
        let field = ((displacement as u32) << KEY_SHIFT) | kind as u32;
        pool.write_u32(position + KEY_FIELD, field);
    }

    /// Attach the owned string at `position` as this slot's key.
    pub(crate) fn set_owned_key<B: Buffer>(self, pool: &mut MemoryPool<'_, B>, position: usize) {
        self.set_key(pool, position, KeyKind::Owned);
    }

    /// Attach the linked key record at `position` as this slot's key.
    pub(crate) fn set_linked_key<B: Buffer>(
        self,
        pool: &mut MemoryPool<'_, B>,
        position: usize,
        kind: KeyKind,
    ) {
        self.set_key(pool, position, kind);
    }

    pub fn key_kind<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> Option<KeyKind> {
        self.key_location(pool).map(|(_, kind)| kind)
    }

    pub fn owns_key<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> bool {
        self.key_kind(pool).is_some_and(KeyKind::is_owned)
    }

    /// The member key, if this slot has one.
    pub fn key<'p, B: Buffer>(self, pool: &'p MemoryPool<'_, B>) -> Option<&'p str> {
        let (position, kind) = self.key_location(pool)?;
        let bytes = match kind {
            KeyKind::Owned => pool.owned_bytes(position)?,
            _ => pool.read_linked(position)?,
        };
        core::str::from_utf8(bytes).ok()
    }

    /// A linked key with the lifetime of the memory it borrows.
    pub(crate) fn linked_key<'a, B: Buffer>(self, pool: &MemoryPool<'a, B>) -> Option<&'a str> {
        let (position, kind) = self.key_location(pool)?;
        if kind.is_owned() {
            return None;
        }
        core::str::from_utf8(pool.read_linked(position)?).ok()
    }

    /// Arena bytes held by an owned key.
    pub(crate) fn key_footprint<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> usize {
        match self.key_location(pool) {
            Some((position, KeyKind::Owned)) => pool.owned_footprint(position),
            _ => 0,
        }
    }

    /// Unlink the slot and drop its key and type tag; content is left as is.
    pub fn clear<B: Buffer>(self, pool: &mut MemoryPool<'_, B>) {
        if let Some(position) = pool.slot_position(self) {
            pool.zero(position + FLAGS_FIELD, 8);
        }
    }

    /// Rebase string displacements after the slot region moved by
    /// `variant_distance` and the string region by `string_distance`.
    pub(crate) fn move_pointers<B: Buffer>(
        self,
        pool: &mut MemoryPool<'_, B>,
        string_distance: isize,
        variant_distance: isize,
    ) {
        let shift = variant_distance - string_distance;
        if let Some((position, field)) = self.key_field(pool) {
            let displacement = (field >> KEY_SHIFT) as usize;
            if displacement != 0 {
                let moved = displacement.wrapping_add_signed(shift) as u32;
                pool.write_u32(
                    position + KEY_FIELD,
                    (moved << KEY_SHIFT) | (field & KEY_KIND_MASK),
                );
            }
        }
        self.data().move_pointers(pool, shift);
    }
}
