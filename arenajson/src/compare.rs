// SPDX-License-Identifier: Apache-2.0

//! Ordering and equality of stored values against plain Rust values or
//! against other stored values.
//!
//! A comparison visits the stored value with a comparer specialized for the
//! probe's kind. Comparing two stored values is double dispatch: the left
//! value picks a comparer for its own kind, which then visits the right
//! value, and the result is reversed back.

use core::cmp::Ordering;

use crate::collection::CollectionData;
use crate::memory_pool::{Buffer, MemoryPool};
use crate::numbers::{Float, Number, UInt};
use crate::variant_data::VariantData;
use crate::visitor::Visitor;

/// Outcome of comparing a stored value with a probe.
///
/// Values of different kinds, collections that are not equal, and NaNs
/// `Differ`: they are neither equal nor ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareResult {
    Differ,
    Equal,
    Less,
    Greater,
}

impl CompareResult {
    /// The same comparison seen from the other side.
    pub fn reverse(self) -> Self {
        match self {
            CompareResult::Less => CompareResult::Greater,
            CompareResult::Greater => CompareResult::Less,
            other => other,
        }
    }

    pub fn is_eq(self) -> bool {
        self == CompareResult::Equal
    }

    pub fn is_ne(self) -> bool {
        self != CompareResult::Equal
    }

    pub fn is_lt(self) -> bool {
        self == CompareResult::Less
    }

    pub fn is_le(self) -> bool {
        matches!(self, CompareResult::Less | CompareResult::Equal)
    }

    pub fn is_gt(self) -> bool {
        self == CompareResult::Greater
    }

    pub fn is_ge(self) -> bool {
        matches!(self, CompareResult::Greater | CompareResult::Equal)
    }
}

impl From<Ordering> for CompareResult {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => CompareResult::Less,
            Ordering::Equal => CompareResult::Equal,
            Ordering::Greater => CompareResult::Greater,
        }
    }
}

impl From<Option<Ordering>> for CompareResult {
    fn from(ordering: Option<Ordering>) -> Self {
        ordering.map_or(CompareResult::Differ, CompareResult::from)
    }
}

/// A visitor holding one side of a comparison.
trait Comparer: Visitor {
    fn result(&self) -> CompareResult;

    /// Visit `value` and report "value vs held side".
    fn run<B: Buffer>(mut self, pool: &MemoryPool<'_, B>, value: VariantData) -> CompareResult
    where
        Self: Sized,
    {
        value.accept(pool, &mut self);
        self.result()
    }
}

macro_rules! impl_comparer {
    ($($name:ty),*) => {
        $(
            impl<B: Buffer> Comparer for $name {
                fn result(&self) -> CompareResult {
                    self.result
                }
            }
        )*
    };
}

struct NullComparer {
    result: CompareResult,
}

impl Visitor for NullComparer {
    fn visit_null(&mut self) {
        self.result = CompareResult::Equal;
    }
}

struct BooleanComparer {
    rhs: bool,
    result: CompareResult,
}

impl Visitor for BooleanComparer {
    fn visit_boolean(&mut self, lhs: bool) {
        self.result = lhs.cmp(&self.rhs).into();
    }
}

struct NumberComparer {
    rhs: Number,
    result: CompareResult,
}

impl NumberComparer {
    fn new(rhs: Number) -> Self {
        Self {
            rhs,
            result: CompareResult::Differ,
        }
    }

    fn compare(&mut self, lhs: Number) {
        self.result = lhs.compare(self.rhs).into();
    }
}

impl Visitor for NumberComparer {
    fn visit_positive_integer(&mut self, lhs: UInt) {
        self.compare(Number::PositiveInteger(lhs));
    }

    fn visit_negative_integer(&mut self, lhs: UInt) {
        self.compare(Number::NegativeInteger(lhs));
    }

    fn visit_float(&mut self, lhs: Float) {
        self.compare(Number::Float(lhs));
    }
}

struct StringComparer<'r> {
    rhs: &'r str,
    result: CompareResult,
}

impl Visitor for StringComparer<'_> {
    fn visit_string(&mut self, lhs: &str) {
        self.result = lhs.cmp(self.rhs).into();
    }
}

struct RawComparer<'r> {
    rhs: &'r [u8],
    result: CompareResult,
}

impl Visitor for RawComparer<'_> {
    fn visit_raw_json(&mut self, lhs: &[u8]) {
        self.result = lhs.cmp(self.rhs).into();
    }
}

/// Arrays are never ordered, only equal or different.
struct ArrayComparer<'p, 'a, B> {
    pool: &'p MemoryPool<'a, B>,
    rhs: CollectionData,
    result: CompareResult,
}

impl<B: Buffer> Visitor for ArrayComparer<'_, '_, B> {
    fn visit_array<L: Buffer>(&mut self, pool: &MemoryPool<'_, L>, lhs: CollectionData) {
        if lhs.equals_array(pool, self.rhs, self.pool) {
            self.result = CompareResult::Equal;
        }
    }
}

struct ObjectComparer<'p, 'a, B> {
    pool: &'p MemoryPool<'a, B>,
    rhs: CollectionData,
    result: CompareResult,
}

impl<B: Buffer> Visitor for ObjectComparer<'_, '_, B> {
    fn visit_object<L: Buffer>(&mut self, pool: &MemoryPool<'_, L>, lhs: CollectionData) {
        if lhs.equals_object(pool, self.rhs, self.pool) {
            self.result = CompareResult::Equal;
        }
    }
}

/// Visits the left value, then lets a comparer holding it visit the right
/// value.
struct VariantComparer<'p, 'a, B> {
    pool: &'p MemoryPool<'a, B>,
    rhs: VariantData,
    result: CompareResult,
}

impl<B: Buffer> VariantComparer<'_, '_, B> {
    /// `comparer` holds the left value, so its verdict is "right vs left".
    fn dispatch<C: Comparer>(&mut self, comparer: C) {
        self.result = comparer.run(self.pool, self.rhs).reverse();
    }
}

impl<B: Buffer> Visitor for VariantComparer<'_, '_, B> {
    fn visit_null(&mut self) {
        self.dispatch(NullComparer {
            result: CompareResult::Differ,
        });
    }

    fn visit_boolean(&mut self, lhs: bool) {
        self.dispatch(BooleanComparer {
            rhs: lhs,
            result: CompareResult::Differ,
        });
    }

    fn visit_positive_integer(&mut self, lhs: UInt) {
        self.dispatch(NumberComparer::new(Number::PositiveInteger(lhs)));
    }

    fn visit_negative_integer(&mut self, lhs: UInt) {
        self.dispatch(NumberComparer::new(Number::NegativeInteger(lhs)));
    }

    fn visit_float(&mut self, lhs: Float) {
        self.dispatch(NumberComparer::new(Number::Float(lhs)));
    }

    fn visit_string(&mut self, lhs: &str) {
        self.dispatch(StringComparer {
            rhs: lhs,
            result: CompareResult::Differ,
        });
    }

    fn visit_raw_json(&mut self, lhs: &[u8]) {
        self.dispatch(RawComparer {
            rhs: lhs,
            result: CompareResult::Differ,
        });
    }

    fn visit_array<L: Buffer>(&mut self, pool: &MemoryPool<'_, L>, lhs: CollectionData) {
        self.dispatch(ArrayComparer {
            pool,
            rhs: lhs,
            result: CompareResult::Differ,
        });
    }

    fn visit_object<L: Buffer>(&mut self, pool: &MemoryPool<'_, L>, lhs: CollectionData) {
        self.dispatch(ObjectComparer {
            pool,
            rhs: lhs,
            result: CompareResult::Differ,
        });
    }
}

impl Comparer for NullComparer {
    fn result(&self) -> CompareResult {
        self.result
    }
}

impl Comparer for BooleanComparer {
    fn result(&self) -> CompareResult {
        self.result
    }
}

impl Comparer for NumberComparer {
    fn result(&self) -> CompareResult {
        self.result
    }
}

impl Comparer for StringComparer<'_> {
    fn result(&self) -> CompareResult {
        self.result
    }
}

impl Comparer for RawComparer<'_> {
    fn result(&self) -> CompareResult {
        self.result
    }
}

impl_comparer!(
    ArrayComparer<'_, '_, B>,
    ObjectComparer<'_, '_, B>,
    VariantComparer<'_, '_, B>
);

/// Something a stored value can be compared with.
pub trait Probe {
    /// Compare `value` (left) with `self` (right).
    fn compare_with<B: Buffer>(&self, pool: &MemoryPool<'_, B>, value: VariantData) -> CompareResult;
}

/// Probe matching only null values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Null;

/// Probe matching raw (pre-serialized) values, ordered byte-wise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawJson<'r>(pub &'r [u8]);

/// A stored value, possibly from another arena, used as a probe.
pub struct VariantProbe<'p, 'a, B> {
    pool: &'p MemoryPool<'a, B>,
    value: VariantData,
}

impl<'p, 'a, B: Buffer> VariantProbe<'p, 'a, B> {
    pub fn new(pool: &'p MemoryPool<'a, B>, value: VariantData) -> Self {
        Self { pool, value }
    }
}

impl Probe for Null {
    fn compare_with<B: Buffer>(&self, pool: &MemoryPool<'_, B>, value: VariantData) -> CompareResult {
        NullComparer {
            result: CompareResult::Differ,
        }
        .run(pool, value)
    }
}

impl Probe for bool {
    fn compare_with<B: Buffer>(&self, pool: &MemoryPool<'_, B>, value: VariantData) -> CompareResult {
        BooleanComparer {
            rhs: *self,
            result: CompareResult::Differ,
        }
        .run(pool, value)
    }
}

fn compare_number<B: Buffer>(pool: &MemoryPool<'_, B>, value: VariantData, rhs: Number) -> CompareResult {
    NumberComparer::new(rhs).run(pool, value)
}

macro_rules! impl_probe_for_numbers {
    ($convert:ident as $wide:ty: $($t:ty),*) => {
        $(
            impl Probe for $t {
                fn compare_with<B: Buffer>(&self, pool: &MemoryPool<'_, B>, value: VariantData) -> CompareResult {
                    compare_number(pool, value, Number::$convert(*self as $wide))
                }
            }
        )*
    };
}

impl_probe_for_numbers!(from_i64 as i64: i8, i16, i32, i64, isize);
impl_probe_for_numbers!(from_u64 as u64: u8, u16, u32, u64, usize);

impl Probe for f32 {
    fn compare_with<B: Buffer>(&self, pool: &MemoryPool<'_, B>, value: VariantData) -> CompareResult {
        compare_number(pool, value, Number::Float(*self as Float))
    }
}

impl Probe for f64 {
    fn compare_with<B: Buffer>(&self, pool: &MemoryPool<'_, B>, value: VariantData) -> CompareResult {
        compare_number(pool, value, Number::Float(*self as Float))
    }
}

impl Probe for Number {
    fn compare_with<B: Buffer>(&self, pool: &MemoryPool<'_, B>, value: VariantData) -> CompareResult {
        compare_number(pool, value, *self)
    }
}

impl Probe for str {
    fn compare_with<B: Buffer>(&self, pool: &MemoryPool<'_, B>, value: VariantData) -> CompareResult {
        StringComparer {
            rhs: self,
            result: CompareResult::Differ,
        }
        .run(pool, value)
    }
}

impl Probe for RawJson<'_> {
    fn compare_with<B: Buffer>(&self, pool: &MemoryPool<'_, B>, value: VariantData) -> CompareResult {
        RawComparer {
            rhs: self.0,
            result: CompareResult::Differ,
        }
        .run(pool, value)
    }
}

/// `None` is null.
impl<T: Probe> Probe for Option<T> {
    fn compare_with<B: Buffer>(&self, pool: &MemoryPool<'_, B>, value: VariantData) -> CompareResult {
        match self {
            Some(probe) => probe.compare_with(pool, value),
            None => Null.compare_with(pool, value),
        }
    }
}

impl<T: Probe + ?Sized> Probe for &T {
    fn compare_with<B: Buffer>(&self, pool: &MemoryPool<'_, B>, value: VariantData) -> CompareResult {
        (**self).compare_with(pool, value)
    }
}

impl<R: Buffer> Probe for VariantProbe<'_, '_, R> {
    fn compare_with<B: Buffer>(&self, pool: &MemoryPool<'_, B>, value: VariantData) -> CompareResult {
        VariantComparer {
            pool: self.pool,
            rhs: self.value,
            result: CompareResult::Differ,
        }
        .run(pool, value)
    }
}

/// Compare a stored value with `probe`.
pub fn compare<B: Buffer, P: Probe>(pool: &MemoryPool<'_, B>, value: VariantData, probe: P) -> CompareResult {
    probe.compare_with(pool, value)
}

/// Compare two stored values, which may live in different arenas.
pub fn compare_variants<L: Buffer, R: Buffer>(
    lhs_pool: &MemoryPool<'_, L>,
    lhs: VariantData,
    rhs_pool: &MemoryPool<'_, R>,
    rhs: VariantData,
) -> CompareResult {
    compare(lhs_pool, lhs, VariantProbe::new(rhs_pool, rhs))
}
