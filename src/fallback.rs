use crate::block::Block;
use crate::traits::{
    AlignedAllocator, Allocator, BulkDeallocator, OwningAllocator, StatelessAllocator,
};
use crate::utils::min;

/// Tries `Primary` first and falls back to `Fallback` when it is exhausted.
///
/// The primary must be an [`OwningAllocator`]: a deallocation is routed to
/// the primary exactly when `primary.owns(block)` holds, and to the fallback
/// otherwise. Without that query the combinator could not tell which child
/// produced a block, and returning it to the wrong one is undefined. This is
/// also why heap leaves like [`MallocAllocator`](crate::MallocAllocator),
/// which cannot recognise their own blocks, are rejected as primaries at
/// compile time.
///
/// Whether the null block is "owned" by the primary is the primary's call;
/// a [`NullAllocator`](crate::NullAllocator) primary owns it, which turns a
/// deallocated failure block into a no-op.
///
/// The combinator surfaces exactly the capabilities its children share:
/// aligned allocation, ownership, bulk deallocation and statelessness each
/// exist on the composite iff both children provide them.
#[derive(Clone, Copy, Debug, Default)]
pub struct FallbackAllocator<Primary, Fallback> {
    primary: Primary,
    fallback: Fallback,
}

impl<P, F> FallbackAllocator<P, F> {
    pub const fn new(primary: P, fallback: F) -> Self {
        FallbackAllocator { primary, fallback }
    }
}

unsafe impl<P, F> Allocator for FallbackAllocator<P, F>
where
    P: OwningAllocator,
    F: Allocator,
{
    const ALIGNMENT: usize = min(P::ALIGNMENT, F::ALIGNMENT);

    fn allocate(&mut self, size: usize) -> Block {
        let block = self.primary.allocate(size);
        if block.is_null() {
            self.fallback.allocate(size)
        } else {
            block
        }
    }

    unsafe fn deallocate(&mut self, block: Block) {
        if self.primary.owns(block) {
            unsafe { self.primary.deallocate(block) };
        } else {
            unsafe { self.fallback.deallocate(block) };
        }
    }
}

unsafe impl<P, F> AlignedAllocator for FallbackAllocator<P, F>
where
    P: OwningAllocator + AlignedAllocator,
    F: AlignedAllocator,
{
    fn allocate_aligned(&mut self, size: usize, align: usize) -> Block {
        let block = self.primary.allocate_aligned(size, align);
        if block.is_null() {
            self.fallback.allocate_aligned(size, align)
        } else {
            block
        }
    }
}

unsafe impl<P, F> OwningAllocator for FallbackAllocator<P, F>
where
    P: OwningAllocator,
    F: OwningAllocator,
{
    fn owns(&self, block: Block) -> bool {
        self.primary.owns(block) || self.fallback.owns(block)
    }
}

unsafe impl<P, F> BulkDeallocator for FallbackAllocator<P, F>
where
    P: OwningAllocator + BulkDeallocator,
    F: BulkDeallocator,
{
    unsafe fn deallocate_all(&mut self) {
        unsafe {
            self.primary.deallocate_all();
            self.fallback.deallocate_all();
        }
    }
}

impl<P, F> StatelessAllocator for FallbackAllocator<P, F>
where
    P: OwningAllocator + StatelessAllocator,
    F: StatelessAllocator,
{
    const IT: Self = FallbackAllocator {
        primary: P::IT,
        fallback: F::IT,
    };
}
