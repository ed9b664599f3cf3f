// SPDX-License-Identifier: Apache-2.0

use crate::collection::CollectionData;
use crate::memory_pool::{Buffer, MemoryPool};
use crate::numbers::{Float, UInt};

/// Per-kind callbacks for [`VariantData::accept`](crate::VariantData::accept).
///
/// Exactly one method is invoked per visited value. Unimplemented methods do
/// nothing, so a visitor only handles the kinds it cares about.
pub trait Visitor {
    fn visit_null(&mut self) {}

    fn visit_boolean(&mut self, _value: bool) {}

    fn visit_positive_integer(&mut self, _magnitude: UInt) {}

    fn visit_negative_integer(&mut self, _magnitude: UInt) {}

    fn visit_float(&mut self, _value: Float) {}

    /// Linked and owned strings alike.
    fn visit_string(&mut self, _value: &str) {}

    /// Pre-serialized JSON.
    fn visit_raw_json(&mut self, _value: &[u8]) {}

    fn visit_array<B: Buffer>(&mut self, _pool: &MemoryPool<'_, B>, _array: CollectionData) {}

    fn visit_object<B: Buffer>(&mut self, _pool: &MemoryPool<'_, B>, _object: CollectionData) {}
}
