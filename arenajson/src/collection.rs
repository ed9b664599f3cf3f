// SPDX-License-Identifier: Apache-2.0

//! Arrays and objects: singly linked chains of slots.
//!
//! The collection header lives in the content area of the owning slot:
//! head and tail displacements, in slot units, relative to that slot.
//! Objects are arrays whose slots carry keys. Member order is insertion
//! order; duplicate keys are allowed and lookups return the first match.

use log::trace;

use crate::memory_pool::{Buffer, MemoryPool};
use crate::variant_data::VariantData;
use crate::variant_slot::{KeyKind, VariantSlot, SLOT_SIZE};
use crate::Error;

const HEAD_FIELD: usize = 0;
const TAIL_FIELD: usize = 4;

/// Handle to an array or object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollectionData {
    offset: usize,
}

impl CollectionData {
    pub(crate) const fn from_offset(offset: usize) -> Self {
        Self { offset }
    }

    /// The value this collection is stored in.
    pub fn as_variant(self) -> VariantData {
        VariantData::from_offset(self.offset)
    }

    fn header<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> Option<usize> {
        pool.slot_position(VariantSlot::from_offset(self.offset))
    }

    fn link<B: Buffer>(self, pool: &MemoryPool<'_, B>, field: usize) -> Option<VariantSlot> {
        let header = self.header(pool)?;
        let distance = pool.read_u32(header + field)? as i32;
        if distance == 0 {
            return None;
        }
        let bytes = isize::try_from(distance)
            .ok()?
            .checked_mul(SLOT_SIZE as isize)?;
        let slot = VariantSlot::from_offset(self.offset.checked_add_signed(bytes)?);
        pool.slot_position(slot)?;
        Some(slot)
    }

    fn set_link<B: Buffer>(
        self,
        pool: &mut MemoryPool<'_, B>,
        field: usize,
        slot: Option<VariantSlot>,
    ) {
        let Some(header) = self.header(pool) else {
            return;
        };
        let distance = slot.map_or(0, |slot| {
            (slot.offset() as isize - self.offset as isize) / SLOT_SIZE as isize
        });
        pool.write_u32(header + field, distance as i32 as u32);
    }

    pub fn head<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> Option<VariantSlot> {
        self.link(pool, HEAD_FIELD)
    }

    pub fn tail<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> Option<VariantSlot> {
        self.link(pool, TAIL_FIELD)
    }

    /// Append an already allocated slot to the chain.
    fn append<B: Buffer>(self, pool: &mut MemoryPool<'_, B>, slot: VariantSlot) {
        match self.tail(pool) {
            Some(tail) => tail.set_next(pool, Some(slot)),
            None => self.set_link(pool, HEAD_FIELD, Some(slot)),
        }
        self.set_link(pool, TAIL_FIELD, Some(slot));
    }

    fn add_slot<B: Buffer>(self, pool: &mut MemoryPool<'_, B>) -> Result<VariantSlot, Error> {
        self.header(pool).ok_or(Error::InvalidSlot)?;
        let slot = pool.alloc_variant().ok_or(Error::NoMemory)?;
        self.append(pool, slot);
        Ok(slot)
    }

    /// Append a null element.
    pub fn add_element<B: Buffer>(self, pool: &mut MemoryPool<'_, B>) -> Result<VariantData, Error> {
        self.add_slot(pool).map(VariantSlot::data)
    }

    /// Append a null member whose key is copied into the arena.
    ///
    /// The slot is only linked once both slot and key are allocated.
    pub fn add_member<B: Buffer>(
        self,
        pool: &mut MemoryPool<'_, B>,
        key: &str,
    ) -> Result<VariantData, Error> {
        self.header(pool).ok_or(Error::InvalidSlot)?;
        let slot = pool.alloc_variant().ok_or(Error::NoMemory)?;
        let Some(position) = pool.alloc_owned_string(key.as_bytes()) else {
            pool.reclaim_last_variant(slot);
            return Err(Error::NoMemory);
        };
        slot.set_owned_key(pool, position);
        self.append(pool, slot);
        Ok(slot.data())
    }

    /// Append a null member whose key stays in caller memory.
    pub fn add_linked_member<'a, B: Buffer>(
        self,
        pool: &mut MemoryPool<'a, B>,
        key: &'a str,
        kind: KeyKind,
    ) -> Result<VariantData, Error> {
        if kind.is_owned() {
            return self.add_member(pool, key);
        }
        self.header(pool).ok_or(Error::InvalidSlot)?;
        let slot = pool.alloc_variant().ok_or(Error::NoMemory)?;
        let Some(position) = pool.alloc_linked_key(key.as_bytes()) else {
            pool.reclaim_last_variant(slot);
            return Err(Error::NoMemory);
        };
        slot.set_linked_key(pool, position, kind);
        self.append(pool, slot);
        Ok(slot.data())
    }

    pub fn get_slot<B: Buffer>(self, pool: &MemoryPool<'_, B>, index: usize) -> Option<VariantSlot> {
        self.head(pool)?.next_n(pool, index)
    }

    pub fn get_element<B: Buffer>(self, pool: &MemoryPool<'_, B>, index: usize) -> Option<VariantData> {
        self.get_slot(pool, index).map(VariantSlot::data)
    }

    /// First slot whose key equals `key`.
    pub fn get_slot_by_key<B: Buffer>(self, pool: &MemoryPool<'_, B>, key: &str) -> Option<VariantSlot> {
        self.slots(pool).find(|slot| slot.key(pool) == Some(key))
    }

    pub fn get_member<B: Buffer>(self, pool: &MemoryPool<'_, B>, key: &str) -> Option<VariantData> {
        self.get_slot_by_key(pool, key).map(VariantSlot::data)
    }

    pub fn contains_key<B: Buffer>(self, pool: &MemoryPool<'_, B>, key: &str) -> bool {
        self.get_slot_by_key(pool, key).is_some()
    }

    /// Element at `index`, appending nulls up to it if the array is shorter.
    ///
    /// Fails without modifying the array if the fill does not fit.
    pub fn get_or_add_element<B: Buffer>(
        self,
        pool: &mut MemoryPool<'_, B>,
        index: usize,
    ) -> Result<VariantData, Error> {
        self.header(pool).ok_or(Error::InvalidSlot)?;
        let mut size = 0;
        let mut cursor = self.head(pool);
        while let Some(slot) = cursor {
            if size == index {
                return Ok(slot.data());
            }
            size += 1;
            cursor = slot.next(pool);
        }
        let missing = index
            .checked_sub(size)
            .and_then(|gap| gap.checked_add(1))
            .ok_or(Error::NoMemory)?;
        if !pool.can_alloc_variants(missing) {
            return Err(Error::NoMemory);
        }
        trace!("filling array with {} null elements", missing);
        let mut last = self.add_slot(pool)?;
        for _ in 1..missing {
            last = self.add_slot(pool)?;
        }
        Ok(last.data())
    }

    /// Member with `key`, appended as null if absent.
    pub fn get_or_add_member<B: Buffer>(
        self,
        pool: &mut MemoryPool<'_, B>,
        key: &str,
    ) -> Result<VariantData, Error> {
        match self.get_member(pool, key) {
            Some(value) => Ok(value),
            None => self.add_member(pool, key),
        }
    }

    fn previous_slot<B: Buffer>(self, pool: &MemoryPool<'_, B>, target: VariantSlot) -> Option<VariantSlot> {
        self.slots(pool).find(|slot| slot.next(pool) == Some(target))
    }

    /// Unlink `slot`. Its memory is not reclaimed.
    pub fn remove_slot<B: Buffer>(self, pool: &mut MemoryPool<'_, B>, slot: VariantSlot) -> bool {
        let previous = self.previous_slot(pool, slot);
        if previous.is_none() && self.head(pool) != Some(slot) {
            return false;
        }
        let next = slot.next(pool);
        match previous {
            Some(previous) => previous.set_next(pool, next),
            None => self.set_link(pool, HEAD_FIELD, next),
        }
        if next.is_none() {
            self.set_link(pool, TAIL_FIELD, previous);
        }
        slot.set_next(pool, None);
        true
    }

    pub fn remove_element<B: Buffer>(self, pool: &mut MemoryPool<'_, B>, index: usize) -> bool {
        match self.get_slot(pool, index) {
            Some(slot) => self.remove_slot(pool, slot),
            None => false,
        }
    }

    /// Remove the first member with `key`.
    pub fn remove_member<B: Buffer>(self, pool: &mut MemoryPool<'_, B>, key: &str) -> bool {
        match self.get_slot_by_key(pool, key) {
            Some(slot) => self.remove_slot(pool, slot),
            None => false,
        }
    }

    /// Forget every member. Their memory is not reclaimed.
    pub fn clear<B: Buffer>(self, pool: &mut MemoryPool<'_, B>) {
        self.set_link(pool, HEAD_FIELD, None);
        self.set_link(pool, TAIL_FIELD, None);
    }

    pub fn size<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> usize {
        self.slots(pool).count()
    }

    /// 1 plus the deepest member.
    pub fn nesting<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> usize {
        1 + self
            .slots(pool)
            .map(|slot| slot.data().nesting(pool))
            .max()
            .unwrap_or(0)
    }

    /// Slots, owned keys and owned content reachable from this collection.
    pub fn memory_usage<B: Buffer>(self, pool: &MemoryPool<'_, B>) -> usize {
        self.slots(pool)
            .map(|slot| SLOT_SIZE + slot.key_footprint(pool) + slot.data().memory_usage(pool))
            .sum()
    }

    /// Element-wise equality.
    pub fn equals_array<B: Buffer, B2: Buffer>(
        self,
        pool: &MemoryPool<'_, B>,
        other: CollectionData,
        other_pool: &MemoryPool<'_, B2>,
    ) -> bool {
        let mut lhs = self.head(pool);
        let mut rhs = other.head(other_pool);
        loop {
            match (lhs, rhs) {
                (None, None) => return true,
                (Some(left), Some(right)) => {
                    if !left.data().equals(pool, right.data(), other_pool) {
                        return false;
                    }
                    lhs = left.next(pool);
                    rhs = right.next(other_pool);
                }
                _ => return false,
            }
        }
    }

    /// Same keys mapping to equal values, in any order.
    ///
    /// Keys are resolved with [`get_member`](Self::get_member), so with
    /// duplicate keys only the first match on the other side is consulted:
    /// `{"a":1,"a":1}` equals `{"a":1,"b":1}` since the member counts agree.
    pub fn equals_object<B: Buffer, B2: Buffer>(
        self,
        pool: &MemoryPool<'_, B>,
        other: CollectionData,
        other_pool: &MemoryPool<'_, B2>,
    ) -> bool {
        let mut count = 0;
        for slot in self.slots(pool) {
            let Some(key) = slot.key(pool) else {
                return false;
            };
            let Some(value) = other.get_member(other_pool, key) else {
                return false;
            };
            if !slot.data().equals(pool, value, other_pool) {
                return false;
            }
            count += 1;
        }
        count == other.size(other_pool)
    }

    /// Replace the members with deep copies of `source`'s.
    pub fn copy_from<'a, 's: 'a, B: Buffer, B2: Buffer>(
        self,
        pool: &mut MemoryPool<'a, B>,
        source: CollectionData,
        source_pool: &MemoryPool<'s, B2>,
    ) -> Result<(), Error> {
        self.clear(pool);
        for slot in source.slots(source_pool) {
            let target = match (slot.key_kind(source_pool), slot.linked_key(source_pool)) {
                (Some(kind), Some(key)) => self.add_linked_member(pool, key, kind)?,
                (Some(_), None) => {
                    let key = slot.key(source_pool).ok_or(Error::InvalidSlot)?;
                    self.add_member(pool, key)?
                }
                (None, _) => self.add_element(pool)?,
            };
            target.copy_from(pool, slot.data(), source_pool)?;
        }
        Ok(())
    }

    /// Member slots in order.
    pub fn slots<'p, 'a, B: Buffer>(self, pool: &'p MemoryPool<'a, B>) -> Slots<'p, 'a, B> {
        Slots {
            pool,
            cursor: self.head(pool),
        }
    }

    /// `(key, value)` pairs in order; elements have no key.
    pub fn iter<'p, 'a, B: Buffer>(self, pool: &'p MemoryPool<'a, B>) -> Iter<'p, 'a, B> {
        Iter {
            slots: self.slots(pool),
        }
    }
}

/// Iterator over the slots of a collection.
pub struct Slots<'p, 'a, B> {
    pool: &'p MemoryPool<'a, B>,
    cursor: Option<VariantSlot>,
}

impl<B: Buffer> Iterator for Slots<'_, '_, B> {
    type Item = VariantSlot;

    fn next(&mut self) -> Option<VariantSlot> {
        let slot = self.cursor?;
        self.cursor = slot.next(self.pool);
        Some(slot)
    }
}

/// Iterator over the members of a collection.
pub struct Iter<'p, 'a, B> {
    slots: Slots<'p, 'a, B>,
}

impl<'p, B: Buffer> Iterator for Iter<'p, '_, B> {
    type Item = (Option<&'p str>, VariantData);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.slots.next()?;
        Some((slot.key(self.slots.pool), slot.data()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn new_array<B: Buffer>(pool: &mut MemoryPool<'_, B>) -> CollectionData {
        pool.root_slot().unwrap().data().to_array(pool).unwrap()
    }

    fn new_object<B: Buffer>(pool: &mut MemoryPool<'_, B>) -> CollectionData {
        pool.root_slot().unwrap().data().to_object(pool).unwrap()
    }

    fn values<B: Buffer>(pool: &MemoryPool<'_, B>, array: CollectionData) -> Vec<i64> {
        array
            .iter(pool)
            .map(|(_, value)| value.as_integer(pool).unwrap() as i64)
            .collect()
    }

    #[test]
    fn test_empty_collection() {
        let mut buffer = [0u8; 256];
        let mut pool = MemoryPool::new(&mut buffer[..]);
        let array = new_array(&mut pool);
        assert_eq!(array.head(&pool), None);
        assert_eq!(array.tail(&pool), None);
        assert_eq!(array.size(&pool), 0);
        assert_eq!(array.nesting(&pool), 1);
        assert_eq!(array.get_element(&pool, 0), None);
    }

    #[test]
    fn test_add_elements_in_order() {
        let mut buffer = [0u8; 512];
        let mut pool = MemoryPool::new(&mut buffer[..]);
        let array = new_array(&mut pool);
        for i in 0..4 {
            array.add_element(&mut pool).unwrap().set_integer(&mut pool, i).unwrap();
        }
        assert_eq!(values(&pool, array), [0, 1, 2, 3]);
        assert_eq!(array.tail(&pool), array.get_slot(&pool, 3));
        assert_eq!(array.memory_usage(&pool), 4 * SLOT_SIZE);
    }

    #[test]
    fn test_remove_last_repairs_tail() {
        let mut buffer = [0u8; 512];
        let mut pool = MemoryPool::new(&mut buffer[..]);
        let array = new_array(&mut pool);
        for i in 0..3 {
            array.add_element(&mut pool).unwrap().set_integer(&mut pool, i).unwrap();
        }
        assert!(array.remove_element(&mut pool, 2));
        assert_eq!(array.tail(&pool), array.get_slot(&pool, 1));
        array.add_element(&mut pool).unwrap().set_integer(&mut pool, 9).unwrap();
        assert_eq!(values(&pool, array), [0, 1, 9]);
    }

    #[test]
    fn test_remove_head_and_only() {
        let mut buffer = [0u8; 512];
        let mut pool = MemoryPool::new(&mut buffer[..]);
        let array = new_array(&mut pool);
        array.add_element(&mut pool).unwrap().set_integer(&mut pool, 1).unwrap();
        array.add_element(&mut pool).unwrap().set_integer(&mut pool, 2).unwrap();

        assert!(array.remove_element(&mut pool, 0));
        assert_eq!(values(&pool, array), [2]);
        assert!(array.remove_element(&mut pool, 0));
        assert_eq!(array.head(&pool), None);
        assert_eq!(array.tail(&pool), None);
        assert!(!array.remove_element(&mut pool, 0));
    }

    #[test]
    fn test_remove_foreign_slot_is_rejected() {
        let mut buffer = [0u8; 512];
        let mut pool = MemoryPool::new(&mut buffer[..]);
        let array = new_array(&mut pool);
        array.add_element(&mut pool).unwrap();
        let stray = pool.alloc_variant().unwrap();
        assert!(!array.remove_slot(&mut pool, stray));
        assert_eq!(array.size(&pool), 1);
    }

    #[test]
    fn test_sparse_fill() {
        let mut buffer = [0u8; 512];
        let mut pool = MemoryPool::new(&mut buffer[..]);
        let array = new_array(&mut pool);
        let third = array.get_or_add_element(&mut pool, 2).unwrap();
        third.set_integer(&mut pool, 3).unwrap();
        assert_eq!(array.size(&pool), 3);
        assert!(array.get_element(&pool, 0).unwrap().is_null(&pool));
        assert!(array.get_element(&pool, 1).unwrap().is_null(&pool));
        assert_eq!(array.get_or_add_element(&mut pool, 2).unwrap(), third);
    }

    #[test]
    fn test_sparse_fill_is_all_or_nothing() {
        let mut buffer = [0u8; 128];
        let mut pool = MemoryPool::new(&mut buffer[..]);
        let array = new_array(&mut pool);
        let size = pool.size();
        assert_eq!(array.get_or_add_element(&mut pool, 100), Err(Error::NoMemory));
        assert_eq!(array.size(&pool), 0);
        assert_eq!(pool.size(), size);
    }

    #[test]
    fn test_sparse_fill_at_largest_index() {
        let mut buffer = [0u8; 256];
        let mut pool = MemoryPool::new(&mut buffer[..]);
        let array = new_array(&mut pool);
        array.add_element(&mut pool).unwrap().set_integer(&mut pool, 1).unwrap();
        let size = pool.size();
        assert_eq!(array.get_or_add_element(&mut pool, usize::MAX), Err(Error::NoMemory));
        assert_eq!(values(&pool, array), [1]);
        assert_eq!(pool.size(), size);
    }

    #[test]
    fn test_duplicate_keys_resolve_to_first_match() {
        let mut left_buffer = [0u8; 512];
        let mut right_buffer = [0u8; 512];
        let mut left_pool = MemoryPool::new(&mut left_buffer[..]);
        let mut right_pool = MemoryPool::new(&mut right_buffer[..]);
        let left = new_object(&mut left_pool);
        let right = new_object(&mut right_pool);
        for key in ["a", "a"] {
            left.add_member(&mut left_pool, key).unwrap().set_integer(&mut left_pool, 1).unwrap();
        }
        for key in ["a", "b"] {
            right.add_member(&mut right_pool, key).unwrap().set_integer(&mut right_pool, 1).unwrap();
        }
        assert!(left.equals_object(&left_pool, right, &right_pool));
        assert!(!right.equals_object(&right_pool, left, &left_pool));
    }

    #[test]
    fn test_members() {
        let mut buffer = [0u8; 512];
        let mut pool = MemoryPool::new(&mut buffer[..]);
        let object = new_object(&mut pool);
        object.add_member(&mut pool, "a").unwrap().set_integer(&mut pool, 1).unwrap();
        object.add_linked_member(&mut pool, "b", KeyKind::Static).unwrap().set_integer(&mut pool, 2).unwrap();
        object.add_member(&mut pool, "a").unwrap().set_integer(&mut pool, 3).unwrap();

        // Duplicate keys are kept, lookups return the first
        assert_eq!(object.size(&pool), 3);
        assert_eq!(object.get_member(&pool, "a").unwrap().as_integer(&pool), Some(1));
        assert_eq!(object.get_member(&pool, "b").unwrap().as_integer(&pool), Some(2));
        assert!(object.contains_key(&pool, "b"));
        assert!(!object.contains_key(&pool, "c"));

        let keys: Vec<_> = object.iter(&pool).map(|(key, _)| key.unwrap()).collect();
        assert_eq!(keys, ["a", "b", "a"]);

        assert!(object.remove_member(&mut pool, "a"));
        assert_eq!(object.get_member(&pool, "a").unwrap().as_integer(&pool), Some(3));
        assert!(!object.remove_member(&mut pool, "zzz"));
    }

    #[test]
    fn test_get_or_add_member() {
        let mut buffer = [0u8; 512];
        let mut pool = MemoryPool::new(&mut buffer[..]);
        let object = new_object(&mut pool);
        let first = object.get_or_add_member(&mut pool, "x").unwrap();
        let again = object.get_or_add_member(&mut pool, "x").unwrap();
        assert_eq!(first, again);
        assert_eq!(object.size(&pool), 1);
    }

    #[test]
    fn test_failed_key_is_not_linked() {
        let mut buffer = [0u8; 128];
        let mut pool = MemoryPool::new(&mut buffer[..]);
        let object = new_object(&mut pool);
        let right = pool.right();
        let long = "k".repeat(200);
        assert_eq!(object.add_member(&mut pool, &long), Err(Error::NoMemory));
        assert_eq!(object.size(&pool), 0);
        assert_eq!(pool.right(), right);
    }

    #[test]
    fn test_nesting_and_memory_usage() {
        let mut buffer = [0u8; 1024];
        let mut pool = MemoryPool::new(&mut buffer[..]);
        let object = new_object(&mut pool);
        let inner = object.add_member(&mut pool, "list").unwrap().to_array(&mut pool).unwrap();
        inner.add_element(&mut pool).unwrap().set_owned_string(&mut pool, "abc").unwrap();
        assert_eq!(object.nesting(&pool), 3);
        assert_eq!(
            object.memory_usage(&pool),
            2 * SLOT_SIZE + (4 + 5) + (3 + 5)
        );
    }

    #[test]
    fn test_equality() {
        let mut left_buffer = [0u8; 512];
        let mut right_buffer = [0u8; 512];
        let mut left = MemoryPool::new(&mut left_buffer[..]);
        let mut right = MemoryPool::new(&mut right_buffer[..]);
        let lhs = new_object(&mut left);
        let rhs = new_object(&mut right);

        lhs.add_member(&mut left, "a").unwrap().set_integer(&mut left, 1).unwrap();
        lhs.add_member(&mut left, "b").unwrap().set_boolean(&mut left, true).unwrap();
        rhs.add_member(&mut right, "b").unwrap().set_boolean(&mut right, true).unwrap();
        rhs.add_member(&mut right, "a").unwrap().set_float(&mut right, 1.0).unwrap();
        assert!(lhs.equals_object(&left, rhs, &right));

        rhs.add_member(&mut right, "c").unwrap();
        assert!(!lhs.equals_object(&left, rhs, &right));

        // Arrays are order sensitive
        let lhs = new_array(&mut left);
        let rhs = new_array(&mut right);
        lhs.add_element(&mut left).unwrap().set_integer(&mut left, 1).unwrap();
        lhs.add_element(&mut left).unwrap().set_integer(&mut left, 2).unwrap();
        rhs.add_element(&mut right).unwrap().set_integer(&mut right, 2).unwrap();
        rhs.add_element(&mut right).unwrap().set_integer(&mut right, 1).unwrap();
        assert!(!lhs.equals_array(&left, rhs, &right));
        assert!(lhs.equals_array(&left, lhs, &left));
    }

    #[test]
    fn test_copy_between_arenas() {
        let mut source_buffer = [0u8; 512];
        let mut target_buffer = [0u8; 512];
        let mut source = MemoryPool::new(&mut source_buffer[..]);
        let mut target = MemoryPool::new(&mut target_buffer[..]);
        let object = new_object(&mut source);
        object.add_member(&mut source, "n").unwrap().set_integer(&mut source, -5).unwrap();
        let list = object.add_linked_member(&mut source, "l", KeyKind::Linked).unwrap().to_array(&mut source).unwrap();
        list.add_element(&mut source).unwrap().set_owned_string(&mut source, "s").unwrap();

        let copy = target.root_slot().unwrap().data();
        copy.copy_from(&mut target, object.as_variant(), &source).unwrap();
        assert!(copy.equals(&target, object.as_variant(), &source));
        let copied = copy.as_object(&target).unwrap();
        let slot = copied.get_slot_by_key(&target, "l").unwrap();
        assert_eq!(slot.key_kind(&target), Some(KeyKind::Linked));
    }

    #[test]
    fn test_chain_survives_squash() {
        let mut buffer = [0u8; 512];
        let mut pool = MemoryPool::new(&mut buffer[..]);
        let object = new_object(&mut pool);
        object.add_member(&mut pool, "first").unwrap().set_owned_string(&mut pool, "one").unwrap();
        object.add_member(&mut pool, "second").unwrap().set_integer(&mut pool, 2).unwrap();
        assert!(pool.squash() > 0);
        assert_eq!(object.get_member(&pool, "first").unwrap().as_str(&pool), Some("one"));
        assert_eq!(object.get_member(&pool, "second").unwrap().as_integer(&pool), Some(2));
        assert_eq!(object.size(&pool), 2);
    }
}
