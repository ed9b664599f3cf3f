// SPDX-License-Identifier: Apache-2.0

use core::marker::PhantomData;

use log::{debug, warn};

use crate::collection::{CollectionData, Iter};
use crate::compare::{CompareResult, Probe};
use crate::memory_pool::{Buffer, MemoryPool, MAX_CAPACITY, STRING_OVERHEAD};
use crate::numbers::{Float, Integer, UInt};
use crate::string_builder::StringBuilder;
use crate::variant_data::{Content, VariantData};
use crate::variant_slot::{KeyKind, SLOT_SIZE};
use crate::Error;

/// Decides whether, and how far, a document's buffer grows when full.
pub trait GrowthPolicy {
    /// Capacity to grow to so that `required` bytes fit, or `None` to refuse.
    fn next_capacity(current: usize, required: usize) -> Option<usize>;
}

/// Never grow: exhaustion is reported to the caller.
pub struct Fixed;

impl GrowthPolicy for Fixed {
    fn next_capacity(_current: usize, _required: usize) -> Option<usize> {
        None
    }
}

/// Double the buffer until the request fits. Needs a resizable [`Buffer`].
pub struct Doubling;

/// First capacity of a growable document that starts out empty.
const MIN_GROWTH: usize = 256;

impl GrowthPolicy for Doubling {
    fn next_capacity(current: usize, required: usize) -> Option<usize> {
        if required > MAX_CAPACITY {
            return None;
        }
        let mut capacity = current.saturating_mul(2).max(MIN_GROWTH);
        while capacity < required {
            capacity = capacity.saturating_mul(2);
        }
        Some(capacity.min(MAX_CAPACITY))
    }
}

/// A JSON document: an arena plus the value tree rooted in it.
///
/// Operations that allocate report [`Error::NoMemory`] when the arena is
/// full. With a growing policy the document first grows once and retries.
///
/// `'a` is the lifetime of linked strings and keys.
pub struct Document<'a, B: Buffer, G: GrowthPolicy = Fixed> {
    pool: MemoryPool<'a, B>,
    _policy: PhantomData<G>,
}

impl<'a, B: Buffer> Document<'a, B, Fixed> {
    /// A document that never grows past `buffer`.
    pub fn new(buffer: B) -> Self {
        Self::with_policy(buffer)
    }
}

impl<'a, B: Buffer, G: GrowthPolicy> Document<'a, B, G> {
    /// A document growing according to `G`.
    ///
    /// A buffer too small for the root is grown right away if the policy
    /// allows; otherwise the document stays degenerate and has no root.
    pub fn with_policy(buffer: B) -> Self {
        let mut document = Self {
            pool: MemoryPool::new(buffer),
            _policy: PhantomData,
        };
        if document.pool.root_slot().is_none() {
            if let Err(error) = document.grow(0) {
                debug!("document has no root: {}", error);
            }
        }
        document
    }

    pub fn pool(&self) -> &MemoryPool<'a, B> {
        &self.pool
    }

    /// Direct access to the arena, for building with the handle APIs.
    pub fn pool_mut(&mut self) -> &mut MemoryPool<'a, B> {
        &mut self.pool
    }

    /// The root value, absent for a degenerate document.
    pub fn root(&self) -> Option<VariantData> {
        self.pool.root_slot().map(|slot| slot.data())
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Bytes taken from the arena, including abandoned values.
    pub fn memory_usage(&self) -> usize {
        self.pool.size()
    }

    /// Depth of the tree, 0 for a degenerate document.
    pub fn nesting(&self) -> usize {
        self.root().map_or(0, |root| root.nesting(&self.pool))
    }

    /// Drop everything; the root becomes null.
    pub fn clear(&mut self) {
        self.pool.clear();
    }

    pub fn content(&self, value: VariantData) -> Content<'_> {
        value.content(&self.pool)
    }

    pub fn size(&self, value: VariantData) -> usize {
        value.size(&self.pool)
    }

    fn with_retry<T>(
        &mut self,
        additional: usize,
        mut op: impl FnMut(&mut MemoryPool<'a, B>) -> Result<T, Error>,
    ) -> Result<T, Error> {
        match op(&mut self.pool) {
            Err(Error::NoMemory) => {
                self.grow(additional)?;
                op(&mut self.pool)
            }
            other => other,
        }
    }

    pub fn set_null(&mut self, value: VariantData) -> Result<(), Error> {
        value.set_null(&mut self.pool)
    }

    pub fn set_boolean(&mut self, value: VariantData, boolean: bool) -> Result<(), Error> {
        value.set_boolean(&mut self.pool, boolean)
    }

    pub fn set_integer(&mut self, value: VariantData, integer: Integer) -> Result<(), Error> {
        value.set_integer(&mut self.pool, integer)
    }

    pub fn set_unsigned(&mut self, value: VariantData, unsigned: UInt) -> Result<(), Error> {
        value.set_unsigned(&mut self.pool, unsigned)
    }

    pub fn set_float(&mut self, value: VariantData, float: Float) -> Result<(), Error> {
        value.set_float(&mut self.pool, float)
    }

    /// Store a copy of `text`.
    pub fn set_string(&mut self, value: VariantData, text: &str) -> Result<(), Error> {
        self.with_retry(text.len() + STRING_OVERHEAD, |pool| {
            value.set_owned_string(pool, text)
        })
    }

    /// Store a reference to `text`.
    pub fn set_linked_string(&mut self, value: VariantData, text: &'a str) -> Result<(), Error> {
        value.set_linked_string(&mut self.pool, text)
    }

    /// Store a copy of pre-serialized JSON.
    pub fn set_raw(&mut self, value: VariantData, json: &[u8]) -> Result<(), Error> {
        self.with_retry(json.len() + STRING_OVERHEAD, |pool| {
            value.set_owned_raw(pool, json)
        })
    }

    pub fn set_linked_raw(&mut self, value: VariantData, json: &'a [u8]) -> Result<(), Error> {
        value.set_linked_raw(&mut self.pool, json)
    }

    /// Format straight into the arena and store the result as a string.
    pub fn set_formatted(
        &mut self,
        value: VariantData,
        args: core::fmt::Arguments<'_>,
    ) -> Result<(), Error> {
        if self.pool.slot_position(value.slot()).is_none() {
            return Err(Error::InvalidSlot);
        }
        self.with_retry(0, |pool| {
            let mut builder = StringBuilder::new(pool);
            if core::fmt::Write::write_fmt(&mut builder, args).is_err() {
                return Err(Error::NoMemory);
            }
            builder.finish_into(value)
        })
    }

    /// Builder for an owned string, stored with [`StringBuilder::finish_into`].
    pub fn string_builder(&mut self) -> StringBuilder<'_, 'a, B> {
        StringBuilder::new(&mut self.pool)
    }

    pub fn to_array(&mut self, value: VariantData) -> Result<CollectionData, Error> {
        value.to_array(&mut self.pool)
    }

    pub fn to_object(&mut self, value: VariantData) -> Result<CollectionData, Error> {
        value.to_object(&mut self.pool)
    }

    fn array(&self, value: VariantData) -> Result<CollectionData, Error> {
        value.as_array(&self.pool).ok_or(Error::NotACollection)
    }

    fn object(&self, value: VariantData) -> Result<CollectionData, Error> {
        value.as_object(&self.pool).ok_or(Error::NotACollection)
    }

    /// Append a null element to the array `array`.
    pub fn add_element(&mut self, array: VariantData) -> Result<VariantData, Error> {
        let array = self.array(array)?;
        self.with_retry(SLOT_SIZE, |pool| array.add_element(pool))
    }

    /// Append a null member with a copied key to the object `object`.
    pub fn add_member(&mut self, object: VariantData, key: &str) -> Result<VariantData, Error> {
        let object = self.object(object)?;
        self.with_retry(SLOT_SIZE + key.len() + STRING_OVERHEAD, |pool| {
            object.add_member(pool, key)
        })
    }

    /// Append a null member whose key is borrowed, not copied.
    pub fn add_linked_member(
        &mut self,
        object: VariantData,
        key: &'a str,
        kind: KeyKind,
    ) -> Result<VariantData, Error> {
        let object = self.object(object)?;
        self.with_retry(SLOT_SIZE + key.len() + STRING_OVERHEAD, |pool| {
            object.add_linked_member(pool, key, kind)
        })
    }

    pub fn get_element(&self, array: VariantData, index: usize) -> Option<VariantData> {
        array.as_array(&self.pool)?.get_element(&self.pool, index)
    }

    pub fn get_member(&self, object: VariantData, key: &str) -> Option<VariantData> {
        object.as_object(&self.pool)?.get_member(&self.pool, key)
    }

    /// Element `index`, padding the array with nulls as needed.
    pub fn get_or_add_element(
        &mut self,
        array: VariantData,
        index: usize,
    ) -> Result<VariantData, Error> {
        let array = self.array(array)?;
        let additional = index.saturating_add(1).saturating_mul(SLOT_SIZE);
        self.with_retry(additional, |pool| array.get_or_add_element(pool, index))
    }

    pub fn get_or_add_member(&mut self, object: VariantData, key: &str) -> Result<VariantData, Error> {
        let object = self.object(object)?;
        self.with_retry(SLOT_SIZE + key.len() + STRING_OVERHEAD, |pool| {
            object.get_or_add_member(pool, key)
        })
    }

    pub fn remove_element(&mut self, array: VariantData, index: usize) -> bool {
        match array.as_array(&self.pool) {
            Some(array) => array.remove_element(&mut self.pool, index),
            None => false,
        }
    }

    pub fn remove_member(&mut self, object: VariantData, key: &str) -> bool {
        match object.as_object(&self.pool) {
            Some(object) => object.remove_member(&mut self.pool, key),
            None => false,
        }
    }

    /// Members of a collection, `None` for anything else.
    pub fn members(&self, value: VariantData) -> Option<Iter<'_, 'a, B>> {
        value
            .as_collection(&self.pool)
            .map(|collection| collection.iter(&self.pool))
    }

    pub fn compare<P: Probe>(&self, value: VariantData, probe: P) -> CompareResult {
        crate::compare::compare(&self.pool, value, probe)
    }

    /// Structural equality with a value of another document.
    pub fn equals<B2: Buffer, G2: GrowthPolicy>(
        &self,
        value: VariantData,
        other: &Document<'_, B2, G2>,
        other_value: VariantData,
    ) -> bool {
        value.equals(&self.pool, other_value, &other.pool)
    }

    /// Replace this document's contents with a deep copy of `source`.
    pub fn copy_from<'s: 'a, B2: Buffer, G2: GrowthPolicy>(
        &mut self,
        source: &Document<'s, B2, G2>,
    ) -> Result<(), Error> {
        let Some(source_root) = source.root() else {
            self.clear();
            return Ok(());
        };
        self.with_retry(source.memory_usage(), |pool| {
            pool.clear();
            let root = pool.root_slot().ok_or(Error::NoMemory)?;
            root.data().copy_from(pool, source_root, &source.pool)
        })
    }

    /// Close the gap between strings and slots. Returns the bytes reclaimed.
    pub fn squash(&mut self) -> usize {
        self.pool.squash()
    }

    /// Squash, then give the freed tail back if the buffer can shrink.
    ///
    /// A buffer that cannot shrink keeps all of its free space.
    pub fn shrink_to_fit(&mut self) -> usize {
        let previous_end = self.pool.end();
        let reclaimed = self.pool.squash();
        let end = self.pool.end();
        if self.pool.resize_buffer(end) {
            debug!("shrunk document buffer to {} bytes", end);
            reclaimed
        } else {
            self.pool.expand_to(previous_end);
            0
        }
    }

    /// Grow the buffer so that `additional` more bytes fit, as the policy
    /// allows.
    pub fn grow(&mut self, additional: usize) -> Result<(), Error> {
        let required = self
            .pool
            .size()
            .checked_add(additional)
            .ok_or(Error::CapacityOverflow)?;
        if required > MAX_CAPACITY {
            return Err(Error::CapacityOverflow);
        }
        let current = self.pool.capacity();
        let Some(capacity) = G::next_capacity(current, required) else {
            return Err(Error::NoMemory);
        };
        if capacity <= current {
            warn!("growth policy stopped at {} bytes", current);
            return Err(Error::NoMemory);
        }
        if !self.pool.resize_buffer(capacity) {
            warn!("buffer of {} bytes cannot grow to {}", current, capacity);
            return Err(Error::NoMemory);
        }
        self.pool.squash();
        self.pool.expand_to(capacity);
        debug!("grew document from {} to {} bytes", current, self.pool.capacity());
        Ok(())
    }
}
