// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), no_std)]

//! An in-place JSON document store: every value of a document lives in one
//! caller-provided buffer, with no per-value allocation.
//!
//! ```
//! use arenajson::{Content, Document};
//!
//! let mut document = Document::new([0u8; 512]);
//! let root = document.root().unwrap();
//! document.to_object(root).unwrap();
//! let name = document.add_member(root, "name").unwrap();
//! document.set_string(name, "sensor").unwrap();
//! let reading = document.add_member(root, "reading").unwrap();
//! document.set_float(reading, 21.5).unwrap();
//!
//! assert_eq!(document.content(name), Content::String("sensor"));
//! assert!(document.compare(reading, 21).is_gt());
//! ```

#[cfg(any(test, feature = "alloc"))]
extern crate alloc;

// Compile-time configuration validation
mod config_check;

mod error;
pub use error::Error;

mod numbers;
pub use numbers::{Float, Integer, Number, UInt};

mod memory_pool;
pub use memory_pool::{Buffer, MemoryPool, StringSlot, ALIGNMENT, MAX_CAPACITY};

mod variant_slot;
pub use variant_slot::{KeyKind, VariantSlot, SLOT_SIZE};

mod variant_data;
pub use variant_data::{Content, VariantData, VariantTag};

mod collection;
pub use collection::{CollectionData, Iter, Slots};

mod visitor;
pub use visitor::Visitor;

mod compare;
pub use compare::{compare, compare_variants, CompareResult, Null, Probe, RawJson, VariantProbe};

mod string_builder;
pub use string_builder::StringBuilder;

mod document;
pub use document::{Document, Doubling, Fixed, GrowthPolicy};
