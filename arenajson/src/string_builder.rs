// SPDX-License-Identifier: Apache-2.0

use log::trace;

use crate::memory_pool::{Buffer, MemoryPool, StringSlot};
use crate::variant_data::{VariantData, VariantTag};
use crate::Error;

/// Builds an owned string directly in the arena's free space.
///
/// The builder claims all free space up front and gives back what it did not
/// use when finished. While it is alive no other allocation can succeed.
/// Dropping an unfinished builder releases the claim.
pub struct StringBuilder<'p, 'a, B: Buffer> {
    pool: &'p mut MemoryPool<'a, B>,
    slot: Option<StringSlot>,
    len: usize,
    overflowed: bool,
}

impl<'p, 'a, B: Buffer> StringBuilder<'p, 'a, B> {
    pub fn new(pool: &'p mut MemoryPool<'a, B>) -> Self {
        let slot = pool.alloc_expandable_string();
        let overflowed = slot.is_none();
        Self {
            pool,
            slot,
            len: 0,
            overflowed,
        }
    }

    /// Append `text`; false, and the builder is spoiled, if it does not fit.
    pub fn append(&mut self, text: &str) -> bool {
        if self.overflowed {
            return false;
        }
        let Some(slot) = self.slot.as_ref() else {
            return false;
        };
        let end = self.len + text.len();
        if end > slot.capacity() {
            trace!("string builder overflow at {} bytes", end);
            self.overflowed = true;
            return false;
        }
        match self.pool.expandable_bytes_mut(slot) {
            Some(bytes) => bytes[self.len..end].copy_from_slice(text.as_bytes()),
            None => {
                self.overflowed = true;
                return false;
            }
        }
        self.len = end;
        true
    }

    pub fn push(&mut self, c: char) -> bool {
        self.append(c.encode_utf8(&mut [0; 4]))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether everything appended so far fit.
    pub fn is_valid(&self) -> bool {
        !self.overflowed
    }

    /// Freeze the string and store it in `value`.
    ///
    /// If anything failed to fit, or `value` is not a slot of this arena, the
    /// claim is released and `value` keeps its previous content.
    pub fn finish_into(mut self, value: VariantData) -> Result<(), Error> {
        if self.pool.slot_position(value.slot()).is_none() {
            return Err(Error::InvalidSlot);
        }
        let mut slot = self.slot.take().ok_or(Error::NoMemory)?;
        if self.overflowed {
            self.pool.release_string(slot);
            return Err(Error::NoMemory);
        }
        let Some(position) = self.pool.freeze_string(&mut slot, self.len) else {
            self.pool.release_string(slot);
            return Err(Error::NoMemory);
        };
        value.set_owned_at(&mut *self.pool, position, VariantTag::OwnedString)
    }
}

impl<B: Buffer> Drop for StringBuilder<'_, '_, B> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            self.pool.release_string(slot);
        }
    }
}

impl<B: Buffer> core::fmt::Write for StringBuilder<'_, '_, B> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        if self.append(s) {
            Ok(())
        } else {
            Err(core::fmt::Error)
        }
    }
}
