use core::cell::UnsafeCell;
use core::mem::MaybeUninit;

use crate::block::Block;
use crate::traits::{AlignedAllocator, Allocator, OwningAllocator};
use crate::utils::{align_up, PLATFORM_MAX_ALIGNMENT};

/// Forces the embedded buffer to the platform's default maximum alignment.
#[repr(C)]
struct MaxAligned {
    _ptr: *mut u8,
    _word: usize,
}

#[repr(C)]
struct AlignedBytes<const N: usize> {
    _align: [MaxAligned; 0],
    bytes: [MaybeUninit<u8>; N],
}

/// A fixed `N`-byte buffer embedded in the allocator value itself.
///
/// This is the cheapest possible leaf: allocation is a bounds check, and the
/// allocator keeps **no record of what it handed out**. Every plain
/// `allocate` that fits returns the *beginning of the buffer*, even if an
/// earlier block is still in use, and `deallocate` is a no-op.
///
/// # Overlap warning
///
/// Because successive allocations may overlap, an `InlineAllocator` is only
/// safe to use in two disciplined patterns:
///
/// * as scratch space where the caller holds at most one outstanding block
///   at a time, or
/// * composed behind a [`SegregateAllocator`](crate::SegregateAllocator) or
///   [`FallbackAllocator`](crate::FallbackAllocator) that routes each
///   distinct live size to a distinct region.
///
/// Anything else hands out aliasing memory and corrupts data. The allocator
/// pairs well with a segregating router and poorly as a fallback primary
/// that sees arbitrary request streams.
///
/// Moving the allocator moves the buffer, so it must not be moved while any
/// block is outstanding.
pub struct InlineAllocator<const N: usize> {
    buffer: UnsafeCell<AlignedBytes<N>>,
}

impl<const N: usize> InlineAllocator<N> {
    pub const fn new() -> Self {
        InlineAllocator {
            buffer: UnsafeCell::new(AlignedBytes {
                _align: [],
                bytes: [MaybeUninit::uninit(); N],
            }),
        }
    }

    fn base(&self) -> *mut u8 {
        self.buffer.get().cast::<u8>()
    }
}

impl<const N: usize> Default for InlineAllocator<N> {
    fn default() -> Self {
        Self::new()
    }
}

unsafe impl<const N: usize> Allocator for InlineAllocator<N> {
    const ALIGNMENT: usize = PLATFORM_MAX_ALIGNMENT;

    fn allocate(&mut self, size: usize) -> Block {
        if size <= N {
            Block {
                ptr: self.base(),
                len: size,
            }
        } else {
            Block::null()
        }
    }

    unsafe fn deallocate(&mut self, _block: Block) {}
}

unsafe impl<const N: usize> AlignedAllocator for InlineAllocator<N> {
    fn allocate_aligned(&mut self, size: usize, align: usize) -> Block {
        debug_assert!(
            align.is_power_of_two() && align >= Self::ALIGNMENT,
            "alignment must be a power of two and at least the buffer alignment"
        );

        let start = align_up(self.base() as usize, align);
        let end = match start.checked_add(size) {
            Some(end) => end,
            None => return Block::null(),
        };
        if end <= self.base() as usize + N {
            Block {
                ptr: start as *mut u8,
                len: size,
            }
        } else {
            Block::null()
        }
    }
}

unsafe impl<const N: usize> OwningAllocator for InlineAllocator<N> {
    fn owns(&self, block: Block) -> bool {
        let base = self.base() as usize;
        let begin = block.begin() as usize;
        let end = block.end() as usize;
        !block.is_null() && begin >= base && end <= base + N
    }
}
