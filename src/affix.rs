use core::marker::PhantomData;
use core::mem::{align_of, size_of};

use crate::block::Block;
use crate::traits::{Allocator, BulkDeallocator, OwningAllocator, StatelessAllocator};
use crate::utils::align_up;

/// Attaches a `Prefix` header (and optional `Suffix` footer) to every
/// allocation, invisibly to the caller.
///
/// The block handed out hides the affixes: its pointer starts past the
/// prefix and its length is exactly the requested size. External
/// bookkeeping (statistics, guard cookies, debug tags) lives in the
/// affixes, reachable through [`prefix_of`] and [`suffix_of`]. This is the
/// canonical place to bolt per-block instrumentation onto any allocator
/// without touching it; a magic-cookie prefix is also the recommended
/// opt-in detector for double-frees and foreign blocks, which the toolkit
/// itself never checks.
///
/// A zero-sized affix type (the default `()` suffix, or `()` for both)
/// opts out at the type level and contributes no bytes.
///
/// Affix memory starts uninitialised, so the accessors return raw pointers
/// rather than references; initialise before reading.
///
/// The parent's alignment must satisfy the affix types' alignments for the
/// accessors to produce aligned pointers. The payload follows the prefix
/// directly, so the composite alignment is the prefix's when it has state,
/// the parent's otherwise.
///
/// [`prefix_of`]: AffixAllocator::prefix_of
/// [`suffix_of`]: AffixAllocator::suffix_of
pub struct AffixAllocator<Parent, Prefix, Suffix = ()> {
    parent: Parent,
    _affix: PhantomData<(Prefix, Suffix)>,
}

impl<Parent, Prefix, Suffix> AffixAllocator<Parent, Prefix, Suffix> {
    const PREFIX_SIZE: usize = size_of::<Prefix>();

    const HAS_PREFIX: () = assert!(
        size_of::<Prefix>() != 0,
        "the prefix type is zero-sized: there is no prefix to access"
    );
    const HAS_SUFFIX: () = assert!(
        size_of::<Suffix>() != 0,
        "the suffix type is zero-sized: there is no suffix to access"
    );

    pub const fn new(parent: Parent) -> Self {
        AffixAllocator {
            parent,
            _affix: PhantomData,
        }
    }

    /// The prefix slot of a block obtained from this allocator.
    ///
    /// The pointer is valid while `block` is outstanding; the slot is
    /// uninitialised until first written. Fails to compile for a
    /// zero-sized `Prefix`.
    pub fn prefix_of(block: Block) -> *mut Prefix {
        let _ = Self::HAS_PREFIX;
        block.ptr.wrapping_sub(Self::PREFIX_SIZE).cast::<Prefix>()
    }

    /// The suffix slot of a block obtained from this allocator.
    ///
    /// Sits at the first suitably aligned address past the payload. Fails
    /// to compile for a zero-sized `Suffix`.
    pub fn suffix_of(block: Block) -> *mut Suffix {
        let _ = Self::HAS_SUFFIX;
        align_up(block.ptr as usize + block.len, align_of::<Suffix>()) as *mut Suffix
    }

    /// Parent-side length of an allocation whose payload is `size` bytes.
    fn total_size(size: usize) -> Option<usize> {
        let with_prefix = size.checked_add(Self::PREFIX_SIZE)?;
        if size_of::<Suffix>() == 0 {
            Some(with_prefix)
        } else {
            let aligned = with_prefix.checked_add(align_of::<Suffix>() - 1)?
                & !(align_of::<Suffix>() - 1);
            aligned.checked_add(size_of::<Suffix>())
        }
    }

    /// Widens a caller-facing block back to the block the parent produced.
    fn actual_block(block: Block) -> Block {
        if block.is_null() {
            return Block::null();
        }
        match Self::total_size(block.len) {
            Some(total) => Block {
                ptr: block.ptr.wrapping_sub(Self::PREFIX_SIZE),
                len: total,
            },
            None => Block::null(),
        }
    }
}

impl<P: Clone, Prefix, Suffix> Clone for AffixAllocator<P, Prefix, Suffix> {
    fn clone(&self) -> Self {
        AffixAllocator {
            parent: self.parent.clone(),
            _affix: PhantomData,
        }
    }
}

impl<P: Copy, Prefix, Suffix> Copy for AffixAllocator<P, Prefix, Suffix> {}

impl<P: Default, Prefix, Suffix> Default for AffixAllocator<P, Prefix, Suffix> {
    fn default() -> Self {
        Self::new(P::default())
    }
}

unsafe impl<P, Prefix, Suffix> Allocator for AffixAllocator<P, Prefix, Suffix>
where
    P: Allocator,
{
    const ALIGNMENT: usize = if size_of::<Prefix>() != 0 {
        align_of::<Prefix>()
    } else {
        P::ALIGNMENT
    };

    fn allocate(&mut self, size: usize) -> Block {
        let total = match Self::total_size(size) {
            Some(total) => total,
            None => return Block::null(),
        };
        let parent_block = self.parent.allocate(total);
        if parent_block.is_null() {
            return Block::null();
        }
        Block {
            ptr: unsafe { parent_block.ptr.add(Self::PREFIX_SIZE) },
            len: size,
        }
    }

    unsafe fn deallocate(&mut self, block: Block) {
        if block.is_null() {
            return;
        }
        unsafe { self.parent.deallocate(Self::actual_block(block)) };
    }
}

unsafe impl<P, Prefix, Suffix> OwningAllocator for AffixAllocator<P, Prefix, Suffix>
where
    P: OwningAllocator,
{
    fn owns(&self, block: Block) -> bool {
        self.parent.owns(Self::actual_block(block))
    }
}

unsafe impl<P, Prefix, Suffix> BulkDeallocator for AffixAllocator<P, Prefix, Suffix>
where
    P: BulkDeallocator,
{
    unsafe fn deallocate_all(&mut self) {
        unsafe { self.parent.deallocate_all() };
    }
}

impl<P, Prefix, Suffix> StatelessAllocator for AffixAllocator<P, Prefix, Suffix>
where
    P: StatelessAllocator,
{
    const IT: Self = AffixAllocator {
        parent: P::IT,
        _affix: PhantomData,
    };
}
