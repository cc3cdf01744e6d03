//! Packet buffer allocation.
//!
//! The reassembler requests one buffer per frame once the declared length is
//! known. Allocation may fail under memory pressure; the reassembler then
//! abandons the frame.

use bytes::BytesMut;

/// Supplies packet buffers of an exact size.
pub trait PacketAllocator {
    /// Allocate a zero-filled buffer of `len` bytes, or `None` when memory is
    /// unavailable.
    fn allocate(&mut self, len: usize) -> Option<BytesMut>;
}

/// Allocator backed by the global heap. Never fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeapAllocator;

impl PacketAllocator for HeapAllocator {
    fn allocate(&mut self, len: usize) -> Option<BytesMut> { Some(BytesMut::zeroed(len)) }
}

/// Allocator that refuses any request above a fixed ceiling, modelling a
/// size-limited message pool.
///
/// # Examples
///
/// ```
/// use hciframe::{LimitedAllocator, PacketAllocator};
///
/// let mut allocator = LimitedAllocator::new(8);
/// assert!(allocator.allocate(8).is_some());
/// assert!(allocator.allocate(9).is_none());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct LimitedAllocator {
    ceiling: usize,
}

impl LimitedAllocator {
    /// Create an allocator serving requests of at most `ceiling` bytes.
    #[must_use]
    pub const fn new(ceiling: usize) -> Self { Self { ceiling } }

    /// Largest request that will succeed.
    #[must_use]
    pub const fn ceiling(&self) -> usize { self.ceiling }
}

impl PacketAllocator for LimitedAllocator {
    fn allocate(&mut self, len: usize) -> Option<BytesMut> {
        (len <= self.ceiling).then(|| BytesMut::zeroed(len))
    }
}

/// Allocator delegating to a closure; see [`from_fn`].
#[derive(Clone, Copy, Debug)]
pub struct FnAllocator<F>(F);

/// Build an allocator from a closure.
///
/// # Examples
///
/// ```
/// use bytes::BytesMut;
/// use hciframe::{PacketAllocator, allocator::from_fn};
///
/// let mut calls = 0;
/// let mut allocator = from_fn(|len| {
///     calls += 1;
///     (calls > 1).then(|| BytesMut::zeroed(len))
/// });
/// assert!(allocator.allocate(4).is_none());
/// assert!(allocator.allocate(4).is_some());
/// ```
pub fn from_fn<F>(allocate: F) -> FnAllocator<F>
where
    F: FnMut(usize) -> Option<BytesMut>,
{
    FnAllocator(allocate)
}

impl<F> PacketAllocator for FnAllocator<F>
where
    F: FnMut(usize) -> Option<BytesMut>,
{
    fn allocate(&mut self, len: usize) -> Option<BytesMut> { (self.0)(len) }
}

impl<A: PacketAllocator + ?Sized> PacketAllocator for Box<A> {
    fn allocate(&mut self, len: usize) -> Option<BytesMut> { (**self).allocate(len) }
}
