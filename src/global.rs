use core::alloc::{GlobalAlloc, Layout};

use spin::Mutex;

use crate::block::Block;
use crate::traits::{AlignedAllocator, Allocator};

/// Adapts any composition to the host's allocation contract.
///
/// The toolkit's allocators are single-threaded values; this facade wraps
/// one in a spinning mutex so it can serve a whole process as the
/// [`#[global_allocator]`](core::alloc::GlobalAlloc). The composition
/// underneath stays untouched: synchronisation happens out here, at the
/// boundary, which is the only place the toolkit takes a lock.
///
/// `dealloc` rebuilds the [`Block`] from the layout the caller is required
/// to repeat, so the block length (the routing key of the combinators)
/// survives the round-trip through the host interface.
///
/// ```rust,ignore
/// use allokit::{
///     AlignedMallocAllocator, Capped, FreelistAllocator, GlobalAllocator, SegregateAllocator,
/// };
///
/// type SmallCache = FreelistAllocator<AlignedMallocAllocator, 0, 128, Capped<64>>;
/// type Heap = SegregateAllocator<SmallCache, AlignedMallocAllocator, 128>;
///
/// #[global_allocator]
/// static GLOBAL: GlobalAllocator<Heap> = GlobalAllocator::new(SegregateAllocator::new(
///     FreelistAllocator::new(AlignedMallocAllocator),
///     AlignedMallocAllocator,
/// ));
/// ```
pub struct GlobalAllocator<A> {
    inner: Mutex<A>,
}

impl<A> GlobalAllocator<A> {
    pub const fn new(allocator: A) -> Self {
        GlobalAllocator {
            inner: Mutex::new(allocator),
        }
    }
}

unsafe impl<A> GlobalAlloc for GlobalAllocator<A>
where
    A: AlignedAllocator + Send,
{
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        // The allocator's own minimum may exceed the layout's.
        let align = layout.align().max(A::ALIGNMENT);
        self.inner.lock().allocate_aligned(layout.size(), align).ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe {
            self.inner.lock().deallocate(Block {
                ptr,
                len: layout.size(),
            })
        };
    }
}
