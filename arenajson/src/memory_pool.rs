// SPDX-License-Identifier: Apache-2.0

//! The arena every value of a document lives in.
//!
//! ```text
//! begin                                          end
//! v                                                v
//! +--------------+-----------------+---------------+
//! | strings...   |     (free)      |   ...variants |
//! +--------------+-----------------+---------------+
//!                ^                 ^
//!              left              right
//! ```
//!
//! Strings and key records grow upwards from `left`, slot records grow
//! downwards from `right`. The topmost slot is the document root.

use core::marker::PhantomData;

use log::{debug, trace};

use crate::variant_slot::{VariantSlot, SLOT_SIZE};

pub(crate) const POINTER_SIZE: usize = core::mem::size_of::<usize>();

/// Alignment of `right` and `end`, relative to the start of the buffer.
pub const ALIGNMENT: usize = POINTER_SIZE;

/// Largest arena the packed 30-bit key displacements can address.
pub const MAX_CAPACITY: usize = 1 << 30;

/// Reserved at `begin` so that a string position of 0 never addresses data.
const PLACEHOLDER_SIZE: usize = 2 * POINTER_SIZE;

/// `(pointer, length)` record of a linked key.
pub(crate) const LINKED_RECORD_SIZE: usize = 2 * POINTER_SIZE;

/// Length prefix in front of every owned string.
pub(crate) const STRING_HEADER_SIZE: usize = 4;

/// Prefix plus NUL terminator.
pub(crate) const STRING_OVERHEAD: usize = STRING_HEADER_SIZE + 1;

const fn align_down(n: usize) -> usize {
    n & !(ALIGNMENT - 1)
}

fn align_up(n: usize) -> Option<usize> {
    n.checked_add(ALIGNMENT - 1).map(align_down)
}

mod sealed {
    pub trait Sealed {}
}

/// Backing storage of a [`MemoryPool`].
///
/// Implemented for borrowed slices, owned arrays and, with the `alloc`
/// feature, `Vec<u8>`. Only the `Vec` implementation can be resized, which is
/// what makes a growable [`Document`](crate::Document) possible.
pub trait Buffer: sealed::Sealed {
    /// The whole storage.
    fn bytes(&self) -> &[u8];
    /// The whole storage, mutably.
    fn bytes_mut(&mut self) -> &mut [u8];
    /// Resize the storage to exactly `capacity` bytes, preserving the
    /// leading bytes. Returns false if this storage cannot be resized.
    fn try_resize(&mut self, capacity: usize) -> bool {
        let _ = capacity;
        false
    }
}

impl sealed::Sealed for &mut [u8] {}

impl Buffer for &mut [u8] {
    fn bytes(&self) -> &[u8] {
        self
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        self
    }
}

impl<const N: usize> sealed::Sealed for [u8; N] {}

impl<const N: usize> Buffer for [u8; N] {
    fn bytes(&self) -> &[u8] {
        self
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        self
    }
}

#[cfg(any(test, feature = "alloc"))]
impl sealed::Sealed for alloc::vec::Vec<u8> {}

#[cfg(any(test, feature = "alloc"))]
impl Buffer for alloc::vec::Vec<u8> {
    fn bytes(&self) -> &[u8] {
        self
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        self
    }

    fn try_resize(&mut self, capacity: usize) -> bool {
        if capacity > MAX_CAPACITY {
            return false;
        }
        self.resize(capacity, 0);
        true
    }
}

/// A string region claimed by [`MemoryPool::alloc_expandable_string`].
///
/// The claim spans all free space until it is frozen or released.
#[derive(Debug, PartialEq, Eq)]
pub struct StringSlot {
    position: usize,
    size: usize,
}

impl StringSlot {
    /// Position of the string (its length prefix) inside the arena.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of content bytes that fit in the claimed region.
    pub fn capacity(&self) -> usize {
        self.size.saturating_sub(STRING_OVERHEAD)
    }
}

/// Bump allocator carving one buffer into a string region and a slot region.
///
/// Every allocation reports exhaustion with `None` and leaves the arena
/// untouched. Memory is never reclaimed piecemeal; [`clear`](Self::clear)
/// resets everything at once.
///
/// `'a` is the lifetime of linked (borrowed, not copied) strings and keys.
pub struct MemoryPool<'a, B> {
    buffer: B,
    begin: usize,
    left: usize,
    right: usize,
    end: usize,
    /// Most recent owned string, the only one that may be reclaimed
    last_string: Option<usize>,
    /// Outstanding expandable string, if any
    expandable: Option<usize>,
    _linked: PhantomData<&'a [u8]>,
}

impl<'a, B: Buffer> MemoryPool<'a, B> {
    /// Create an arena over `buffer`.
    ///
    /// A buffer too small to hold the placeholders and the root slot gives a
    /// degenerate arena: it has no root and every allocation fails.
    pub fn new(buffer: B) -> Self {
        let end = align_down(buffer.bytes().len().min(MAX_CAPACITY));
        let mut pool = Self {
            buffer,
            begin: 0,
            left: 0,
            right: end,
            end,
            last_string: None,
            expandable: None,
            _linked: PhantomData,
        };
        pool.clear();
        pool
    }

    /// Drop every value and string and reset the root slot to null.
    pub fn clear(&mut self) {
        self.last_string = None;
        self.expandable = None;
        let span = self.end.saturating_sub(self.begin);
        if span < PLACEHOLDER_SIZE + SLOT_SIZE {
            self.left = self.end;
            self.right = self.end;
            return;
        }
        self.left = self.begin + PLACEHOLDER_SIZE;
        self.right = self.end - SLOT_SIZE;
        self.zero(self.right, SLOT_SIZE);
        self.check_invariants();
    }

    /// The root slot, absent for a degenerate arena.
    pub fn root_slot(&self) -> Option<VariantSlot> {
        self.slot_position(VariantSlot::ROOT)
            .map(|_| VariantSlot::ROOT)
    }

    /// Total bytes managed by this arena.
    pub fn capacity(&self) -> usize {
        self.end - self.begin
    }

    /// Bytes in use by strings and slots.
    pub fn size(&self) -> usize {
        (self.left - self.begin) + (self.end - self.right)
    }

    /// Free bytes between the two regions.
    pub fn available(&self) -> usize {
        self.right - self.left
    }

    pub fn begin(&self) -> usize {
        self.begin
    }

    pub fn left(&self) -> usize {
        self.left
    }

    pub fn right(&self) -> usize {
        self.right
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Whether `position` lies inside the used window of this arena.
    pub fn owns(&self, position: usize) -> bool {
        self.begin <= position && position < self.end
    }

    fn can_alloc(&self, bytes: usize) -> bool {
        self.left
            .checked_add(bytes)
            .is_some_and(|top| top <= self.right)
    }

    /// Whether `count` more slots fit.
    pub fn can_alloc_variants(&self, count: usize) -> bool {
        count
            .checked_mul(SLOT_SIZE)
            .is_some_and(|bytes| self.can_alloc(bytes))
    }

    /// Reserve one zeroed slot record at the bottom of the slot region.
    pub fn alloc_variant(&mut self) -> Option<VariantSlot> {
        if !self.can_alloc(SLOT_SIZE) {
            trace!("slot allocation failed: {} bytes free", self.available());
            return None;
        }
        self.right -= SLOT_SIZE;
        self.zero(self.right, SLOT_SIZE);
        self.check_invariants();
        Some(VariantSlot::from_offset(self.end - self.right))
    }

    /// Give back `slot` if it is the most recently allocated one.
    pub(crate) fn reclaim_last_variant(&mut self, slot: VariantSlot) -> bool {
        if self.slot_position(slot) != Some(self.right) || slot == VariantSlot::ROOT {
            return false;
        }
        self.right += SLOT_SIZE;
        true
    }

    /// Copy `bytes` into the string region as a length-prefixed,
    /// NUL-terminated string and return its position.
    pub fn alloc_owned_string(&mut self, bytes: &[u8]) -> Option<usize> {
        let len = u32::try_from(bytes.len()).ok()?;
        let total = bytes.len().checked_add(STRING_OVERHEAD)?;
        if self.expandable.is_some() || !self.can_alloc(total) {
            trace!("string allocation of {} bytes failed", total);
            return None;
        }
        let position = self.left;
        self.write_u32(position, len);
        self.write_bytes(position + STRING_HEADER_SIZE, bytes);
        self.write_bytes(position + STRING_HEADER_SIZE + bytes.len(), &[0]);
        self.left += total;
        self.last_string = Some(position);
        self.check_invariants();
        Some(position)
    }

    /// Store a `(pointer, length)` record for a key that stays in caller memory.
    pub fn alloc_linked_key(&mut self, key: &'a [u8]) -> Option<usize> {
        if self.expandable.is_some() || !self.can_alloc(LINKED_RECORD_SIZE) {
            return None;
        }
        let position = self.left;
        self.write_linked(position, key);
        self.left += LINKED_RECORD_SIZE;
        self.last_string = None;
        self.check_invariants();
        Some(position)
    }

    /// Claim all free space for a string whose length is not known yet.
    ///
    /// Until the claim is frozen or released, every other allocation fails.
    pub fn alloc_expandable_string(&mut self) -> Option<StringSlot> {
        if self.expandable.is_some() {
            return None;
        }
        let size = self.available();
        if size < STRING_OVERHEAD {
            return None;
        }
        let slot = StringSlot {
            position: self.left,
            size,
        };
        self.left = self.right;
        self.expandable = Some(slot.position);
        self.check_invariants();
        Some(slot)
    }

    /// Writable content area of an outstanding expandable string.
    pub fn expandable_bytes_mut(&mut self, slot: &StringSlot) -> Option<&mut [u8]> {
        if self.expandable != Some(slot.position) {
            return None;
        }
        let start = slot.position + STRING_HEADER_SIZE;
        let end = start + slot.capacity();
        self.buffer.bytes_mut().get_mut(start..end)
    }

    /// Shrink an expandable string to `len` content bytes and return the
    /// unused tail to the free region.
    pub fn freeze_string(&mut self, slot: &mut StringSlot, len: usize) -> Option<usize> {
        if self.expandable != Some(slot.position) || len > slot.capacity() {
            return None;
        }
        let header = u32::try_from(len).ok()?;
        let position = slot.position;
        self.write_u32(position, header);
        self.write_bytes(position + STRING_HEADER_SIZE + len, &[0]);
        slot.size = len + STRING_OVERHEAD;
        self.left = position + slot.size;
        self.expandable = None;
        self.last_string = Some(position);
        self.check_invariants();
        Some(position)
    }

    /// Abandon an expandable string, returning its whole claim.
    pub fn release_string(&mut self, slot: StringSlot) {
        if self.expandable == Some(slot.position) {
            self.left = slot.position;
            self.expandable = None;
            self.check_invariants();
        }
    }

    /// Roll `left` back over the most recently allocated owned string.
    pub fn reclaim_last_string(&mut self, position: usize) -> bool {
        if self.last_string != Some(position) || self.expandable.is_some() {
            return false;
        }
        self.left = position;
        self.last_string = None;
        self.check_invariants();
        true
    }

    /// Move the slot region down against the string region.
    ///
    /// Returns the number of bytes reclaimed. Slot handles stay valid since
    /// they are measured from `end`; string displacements are rebased.
    pub fn squash(&mut self) -> usize {
        if self.expandable.is_some() {
            return 0;
        }
        let Some(new_right) = align_up(self.left) else {
            return 0;
        };
        if new_right >= self.right || self.end > self.buffer.bytes().len() {
            return 0;
        }
        let region = self.end - self.right;
        self.buffer
            .bytes_mut()
            .copy_within(self.right..self.end, new_right);
        let reclaimed = self.right - new_right;
        self.right = new_right;
        self.end = new_right + region;
        self.rebase_slots(0, -(reclaimed as isize));
        self.check_invariants();
        debug!("squashed arena: {} bytes reclaimed", reclaimed);
        reclaimed
    }

    /// Move the slot region up to the top of a buffer that has room for
    /// `capacity` bytes. Returns the distance the slots moved.
    pub fn expand_to(&mut self, capacity: usize) -> usize {
        if self.expandable.is_some() {
            return 0;
        }
        let new_end = align_down(capacity.min(self.buffer.bytes().len()).min(MAX_CAPACITY));
        if new_end <= self.end {
            return 0;
        }
        let distance = new_end - self.end;
        if self.root_slot().is_none() {
            self.end = new_end;
            self.clear();
            debug!("initialized arena of {} bytes", self.capacity());
            return distance;
        }
        let region = self.end - self.right;
        self.buffer
            .bytes_mut()
            .copy_within(self.right..self.end, self.right + distance);
        self.right += distance;
        self.end = new_end;
        self.rebase_slots(0, distance as isize);
        self.check_invariants();
        debug!(
            "expanded arena to {} bytes, {} bytes of slots moved",
            self.capacity(),
            region
        );
        distance
    }

    /// Move the whole used window by `offset` bytes inside the buffer.
    pub fn relocate(&mut self, offset: isize) -> bool {
        let (Some(new_begin), Some(new_end)) = (
            self.begin.checked_add_signed(offset),
            self.end.checked_add_signed(offset),
        ) else {
            return false;
        };
        if new_end > self.buffer.bytes().len() || new_end % ALIGNMENT != 0 {
            return false;
        }
        self.buffer
            .bytes_mut()
            .copy_within(self.begin..self.end, new_begin);
        self.move_pointers(offset);
        debug!("relocated arena by {} bytes", offset);
        true
    }

    /// Shift all cursors by `offset` after the used window moved.
    ///
    /// Every stored reference is relative, so nothing inside the window
    /// needs rewriting.
    fn move_pointers(&mut self, offset: isize) {
        let shift = |cursor: usize| cursor.wrapping_add_signed(offset);
        self.begin = shift(self.begin);
        self.left = shift(self.left);
        self.right = shift(self.right);
        self.end = shift(self.end);
        self.last_string = self.last_string.map(shift);
        self.expandable = self.expandable.map(shift);
        self.check_invariants();
    }

    /// Rebase every slot record in the slot region, linked or not.
    fn rebase_slots(&mut self, string_distance: isize, variant_distance: isize) {
        let mut offset = SLOT_SIZE;
        while offset <= self.end - self.right {
            VariantSlot::from_offset(offset).move_pointers(self, string_distance, variant_distance);
            offset += SLOT_SIZE;
        }
        trace!(
            "rebased {} slots by {}",
            (self.end - self.right) / SLOT_SIZE,
            variant_distance - string_distance
        );
    }

    /// Resize the backing buffer, see [`Buffer::try_resize`].
    pub(crate) fn resize_buffer(&mut self, capacity: usize) -> bool {
        if capacity < self.end {
            return false;
        }
        self.buffer.try_resize(capacity)
    }

    /// Length of the backing buffer, which may exceed the arena capacity.
    pub fn buffer_len(&self) -> usize {
        self.buffer.bytes().len()
    }

    fn check_invariants(&self) {
        debug_assert!(self.begin <= self.left);
        debug_assert!(self.left <= self.right);
        debug_assert!(self.right <= self.end);
        debug_assert!(self.right % ALIGNMENT == 0);
        debug_assert!(self.end % ALIGNMENT == 0);
        debug_assert!((self.end - self.right) % SLOT_SIZE == 0);
    }

    /// Absolute position of a slot record, if `slot` addresses one.
    pub(crate) fn slot_position(&self, slot: VariantSlot) -> Option<usize> {
        let offset = slot.offset();
        if offset == 0 || offset % SLOT_SIZE != 0 || offset > self.end - self.right {
            return None;
        }
        Some(self.end - offset)
    }

    pub(crate) fn read_bytes(&self, position: usize, len: usize) -> Option<&[u8]> {
        self.buffer
            .bytes()
            .get(position..position.checked_add(len)?)
    }

    pub(crate) fn read_array<const N: usize>(&self, position: usize) -> Option<[u8; N]> {
        self.read_bytes(position, N)?.try_into().ok()
    }

    pub(crate) fn read_u32(&self, position: usize) -> Option<u32> {
        self.read_array(position).map(u32::from_ne_bytes)
    }

    pub(crate) fn read_usize(&self, position: usize) -> Option<usize> {
        self.read_array(position).map(usize::from_ne_bytes)
    }

    pub(crate) fn write_bytes(&mut self, position: usize, data: &[u8]) {
        let Some(end) = position.checked_add(data.len()) else {
            return;
        };
        if let Some(target) = self.buffer.bytes_mut().get_mut(position..end) {
            target.copy_from_slice(data);
        }
    }

    pub(crate) fn write_u32(&mut self, position: usize, value: u32) {
        self.write_bytes(position, &value.to_ne_bytes());
    }

    pub(crate) fn zero(&mut self, position: usize, len: usize) {
        let Some(end) = position.checked_add(len) else {
            return;
        };
        if let Some(target) = self.buffer.bytes_mut().get_mut(position..end) {
            target.fill(0);
        }
    }

    /// Store a `(pointer, length)` pair for `data`.
    pub(crate) fn write_linked(&mut self, position: usize, data: &'a [u8]) {
        self.write_bytes(position, &(data.as_ptr() as usize).to_ne_bytes());
        self.write_bytes(position + POINTER_SIZE, &data.len().to_ne_bytes());
    }

    /// Resolve a `(pointer, length)` pair written by [`write_linked`](Self::write_linked).
    pub(crate) fn read_linked(&self, position: usize) -> Option<&'a [u8]> {
        let pointer = self.read_usize(position)?;
        let len = self.read_usize(position + POINTER_SIZE)?;
        if pointer == 0 {
            return None;
        }
        // SAFETY: linked pairs are only written by `write_linked` from a
        // `&'a [u8]`, and slot records are rebased as a whole whenever the
        // slot region moves, so `position` always addresses such a pair.
        Some(unsafe { core::slice::from_raw_parts(pointer as *const u8, len) })
    }

    /// Content of the owned string whose prefix starts at `position`.
    pub(crate) fn owned_bytes(&self, position: usize) -> Option<&[u8]> {
        let len = self.read_u32(position)? as usize;
        self.read_bytes(position.checked_add(STRING_HEADER_SIZE)?, len)
    }

    /// Footprint of the owned string at `position`, prefix and terminator included.
    pub(crate) fn owned_footprint(&self, position: usize) -> usize {
        self.read_u32(position)
            .map_or(0, |len| len as usize + STRING_OVERHEAD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_cursors<B: Buffer>(pool: &MemoryPool<'_, B>) {
        assert!(pool.begin() <= pool.left());
        assert!(pool.left() <= pool.right());
        assert!(pool.right() <= pool.end());
        assert_eq!(pool.right() % ALIGNMENT, 0);
        assert_eq!(pool.end() % ALIGNMENT, 0);
    }

    #[test]
    fn test_new_pool_reserves_placeholders_and_root() {
        let mut buffer = [0xAAu8; 256];
        let pool = MemoryPool::new(&mut buffer[..]);

        assert_eq!(pool.capacity(), 256);
        assert_eq!(pool.left(), PLACEHOLDER_SIZE);
        assert_eq!(pool.right(), 256 - SLOT_SIZE);
        assert_eq!(pool.size(), PLACEHOLDER_SIZE + SLOT_SIZE);
        assert!(pool.root_slot().is_some());
        // Root record must be zeroed even though the buffer was not
        assert!(pool
            .read_bytes(pool.right(), SLOT_SIZE)
            .unwrap()
            .iter()
            .all(|&b| b == 0));
    }

    #[test]
    fn test_degenerate_pool() {
        let mut buffer = [0u8; 0];
        let mut pool = MemoryPool::new(&mut buffer[..]);
        assert_eq!(pool.capacity(), 0);
        assert!(pool.root_slot().is_none());
        assert!(pool.alloc_variant().is_none());
        assert!(pool.alloc_owned_string(b"x").is_none());

        let mut small = [0u8; SLOT_SIZE];
        let mut pool = MemoryPool::new(&mut small[..]);
        assert!(pool.root_slot().is_none());
        assert!(pool.alloc_variant().is_none());
    }

    #[test]
    fn test_unaligned_capacity_is_rounded_down() {
        let mut buffer = [0u8; 203];
        let pool = MemoryPool::new(&mut buffer[..]);
        assert_eq!(pool.end() % ALIGNMENT, 0);
        assert!(pool.capacity() <= 203);
        assert_cursors(&pool);
    }

    #[test]
    fn test_alloc_variant_until_exhausted() {
        let mut buffer = [0u8; 256];
        let mut pool = MemoryPool::new(&mut buffer[..]);
        let mut count = 0;
        while let Some(slot) = pool.alloc_variant() {
            assert!(pool.slot_position(slot).is_some());
            assert_cursors(&pool);
            count += 1;
        }
        assert_eq!(count, (256 - PLACEHOLDER_SIZE - SLOT_SIZE) / SLOT_SIZE);
        let right = pool.right();
        assert!(pool.alloc_variant().is_none());
        assert_eq!(pool.right(), right);
    }

    #[test]
    fn test_owned_string_layout() {
        let mut buffer = [0u8; 128];
        let mut pool = MemoryPool::new(&mut buffer[..]);
        let position = pool.alloc_owned_string(b"hello").unwrap();
        assert_eq!(position, PLACEHOLDER_SIZE);
        assert_eq!(pool.owned_bytes(position), Some(&b"hello"[..]));
        assert_eq!(pool.owned_footprint(position), 5 + STRING_OVERHEAD);
        assert_eq!(pool.left(), position + 5 + STRING_OVERHEAD);
        // NUL terminator follows the content
        assert_eq!(
            pool.read_bytes(position + STRING_HEADER_SIZE + 5, 1),
            Some(&[0u8][..])
        );
    }

    #[test]
    fn test_string_exhaustion_leaves_pool_unchanged() {
        let mut buffer = [0u8; 96];
        let mut pool = MemoryPool::new(&mut buffer[..]);
        let first = pool.alloc_owned_string(b"abc").unwrap();
        let left = pool.left();
        let huge = [b'x'; 200];
        assert!(pool.alloc_owned_string(&huge).is_none());
        assert_eq!(pool.left(), left);
        assert_eq!(pool.owned_bytes(first), Some(&b"abc"[..]));
    }

    #[test]
    fn test_linked_key_record() {
        let key = "sensor";
        let mut buffer = [0u8; 128];
        let mut pool = MemoryPool::new(&mut buffer[..]);
        let position = pool.alloc_linked_key(key.as_bytes()).unwrap();
        assert_eq!(pool.left(), position + LINKED_RECORD_SIZE);
        assert_eq!(pool.read_linked(position), Some(key.as_bytes()));
    }

    #[test]
    fn test_expandable_string_freeze() {
        let mut buffer = [0u8; 128];
        let mut pool = MemoryPool::new(&mut buffer[..]);
        let mut slot = pool.alloc_expandable_string().unwrap();
        assert_eq!(pool.available(), 0);
        // Nothing else can be allocated while the claim is outstanding
        assert!(pool.alloc_variant().is_none());
        assert!(pool.alloc_expandable_string().is_none());

        pool.expandable_bytes_mut(&slot).unwrap()[..3].copy_from_slice(b"abc");
        let position = pool.freeze_string(&mut slot, 3).unwrap();
        assert_eq!(pool.owned_bytes(position), Some(&b"abc"[..]));
        assert_eq!(pool.left(), position + 3 + STRING_OVERHEAD);
        assert!(pool.available() > 0);
        // A frozen slot cannot be frozen twice
        assert!(pool.freeze_string(&mut slot, 1).is_none());
    }

    #[test]
    fn test_release_expandable_string() {
        let mut buffer = [0u8; 128];
        let mut pool = MemoryPool::new(&mut buffer[..]);
        let left = pool.left();
        let slot = pool.alloc_expandable_string().unwrap();
        pool.release_string(slot);
        assert_eq!(pool.left(), left);
        assert!(pool.alloc_variant().is_some());
    }

    #[test]
    fn test_reclaim_only_last_string() {
        let mut buffer = [0u8; 128];
        let mut pool = MemoryPool::new(&mut buffer[..]);
        let first = pool.alloc_owned_string(b"one").unwrap();
        let second = pool.alloc_owned_string(b"two").unwrap();
        assert!(!pool.reclaim_last_string(first));
        assert!(pool.reclaim_last_string(second));
        assert_eq!(pool.left(), second);
        assert!(!pool.reclaim_last_string(second));
    }

    #[test]
    fn test_squash_moves_slots_down() {
        let mut buffer = [0u8; 256];
        let mut pool = MemoryPool::new(&mut buffer[..]);
        pool.alloc_owned_string(b"abc").unwrap();
        let slot = pool.alloc_variant().unwrap();
        let size = pool.size();

        let reclaimed = pool.squash();
        assert!(reclaimed > 0);
        assert_eq!(pool.right(), align_up(pool.left()).unwrap());
        assert_eq!(pool.capacity(), 256 - reclaimed);
        assert_eq!(pool.size(), size);
        assert!(pool.slot_position(slot).is_some());
        assert_cursors(&pool);

        // Nothing left to squash
        assert_eq!(pool.squash(), 0);
    }

    #[test]
    fn test_relocate_moves_window() {
        let mut buffer = [0u8; 256];
        let mut pool = MemoryPool::new(&mut buffer[..]);
        let position = pool.alloc_owned_string(b"abc").unwrap();
        pool.squash();
        let offset = (ALIGNMENT * 4) as isize;
        assert!(pool.relocate(offset));
        assert_eq!(pool.begin(), ALIGNMENT * 4);
        assert_eq!(
            pool.owned_bytes(position + ALIGNMENT * 4),
            Some(&b"abc"[..])
        );
        assert_cursors(&pool);
        // Past the end of the buffer
        assert!(!pool.relocate(4096));
        // Before the start of the buffer
        assert!(!pool.relocate(-(ALIGNMENT as isize) * 8));
    }

    #[test]
    fn test_vec_buffer_grows() {
        let mut pool = MemoryPool::new(alloc::vec![0u8; 64]);
        pool.alloc_owned_string(b"abc").unwrap();
        let root_before = pool.root_slot();
        pool.squash();
        assert!(pool.resize_buffer(256));
        let moved = pool.expand_to(256);
        assert!(moved > 0);
        assert_eq!(pool.end(), 256);
        assert_eq!(pool.root_slot(), root_before);
        assert_cursors(&pool);
    }

    #[test]
    fn test_fixed_buffer_does_not_resize() {
        let mut buffer = [0u8; 64];
        let mut pool = MemoryPool::new(&mut buffer[..]);
        assert!(!pool.resize_buffer(128));
    }
}
