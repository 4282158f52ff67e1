//! Leaves over the process heap.

use core::ptr;

use crate::block::Block;
use crate::traits::{AlignedAllocator, Allocator, StatelessAllocator};
use crate::utils::PLATFORM_MAX_ALIGNMENT;

/// Stateless wrapper over `malloc`/`free`.
///
/// Blocks come back with the platform's default maximum alignment. There is
/// no ownership query (`malloc` cannot tell its blocks apart from anyone
/// else's), so this type cannot serve as the primary of a
/// [`FallbackAllocator`](crate::FallbackAllocator); put it on the fallback
/// side, where deallocations are routed by elimination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MallocAllocator;

unsafe impl Allocator for MallocAllocator {
    const ALIGNMENT: usize = PLATFORM_MAX_ALIGNMENT;

    fn allocate(&mut self, size: usize) -> Block {
        let ptr = unsafe { libc::malloc(size) } as *mut u8;
        if ptr.is_null() {
            Block::null()
        } else {
            Block { ptr, len: size }
        }
    }

    unsafe fn deallocate(&mut self, block: Block) {
        unsafe { libc::free(block.ptr as *mut libc::c_void) };
    }
}

impl StatelessAllocator for MallocAllocator {
    const IT: Self = MallocAllocator;
}

/// Stateless heap wrapper honoring explicit power-of-two alignments.
///
/// Uses `posix_memalign`, so any requested alignment must be at least the
/// platform default (which also satisfies the `sizeof(void*)` multiple the
/// primitive demands). Plain [`allocate`](Allocator::allocate) requests go
/// out at the platform default alignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AlignedMallocAllocator;

unsafe impl Allocator for AlignedMallocAllocator {
    const ALIGNMENT: usize = PLATFORM_MAX_ALIGNMENT;

    fn allocate(&mut self, size: usize) -> Block {
        self.allocate_aligned(size, PLATFORM_MAX_ALIGNMENT)
    }

    unsafe fn deallocate(&mut self, block: Block) {
        unsafe { libc::free(block.ptr as *mut libc::c_void) };
    }
}

unsafe impl AlignedAllocator for AlignedMallocAllocator {
    fn allocate_aligned(&mut self, size: usize, align: usize) -> Block {
        debug_assert!(
            align.is_power_of_two() && align >= Self::ALIGNMENT,
            "alignment must be a power of two and at least the platform default"
        );

        let mut ptr: *mut libc::c_void = ptr::null_mut();
        let rc = unsafe { libc::posix_memalign(&mut ptr, align, size) };
        if rc != 0 || ptr.is_null() {
            Block::null()
        } else {
            Block {
                ptr: ptr as *mut u8,
                len: size,
            }
        }
    }
}

impl StatelessAllocator for AlignedMallocAllocator {
    const IT: Self = AlignedMallocAllocator;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malloc_roundtrip() {
        let mut a = MallocAllocator::IT;
        let b = a.allocate(257);
        assert!(!b.is_null());
        assert_eq!(b.len, 257);
        assert_eq!(b.ptr as usize % MallocAllocator::ALIGNMENT, 0);

        unsafe {
            b.ptr.write_bytes(0xAB, b.len);
            assert_eq!(*b.ptr, 0xAB);
            a.deallocate(b);
        }
    }

    #[test]
    fn free_of_null_is_a_no_op() {
        let mut a = MallocAllocator;
        unsafe { a.deallocate(Block::null()) };
    }

    #[test]
    fn aligned_malloc_honors_large_alignments() {
        let mut a = AlignedMallocAllocator::IT;
        for align in [64usize, 256, 4096] {
            let b = a.allocate_aligned(100, align);
            assert!(!b.is_null());
            assert_eq!(b.len, 100);
            assert_eq!(b.ptr as usize % align, 0);
            unsafe { a.deallocate(b) };
        }
    }

    #[test]
    fn aligned_malloc_default_path() {
        let mut a = AlignedMallocAllocator;
        let b = a.allocate(64);
        assert!(!b.is_null());
        assert_eq!(b.ptr as usize % PLATFORM_MAX_ALIGNMENT, 0);
        unsafe { a.deallocate(b) };
    }
}
