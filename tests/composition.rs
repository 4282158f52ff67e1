//! End-to-end composition chains, exercised through the public API only.

use allokit::{
    allocate_array, allocate_for, AffixAllocator, AlignedMallocAllocator, Allocator, Block,
    BulkDeallocator, FallbackAllocator, FreelistAllocator, InlineAllocator, MallocAllocator,
    NullAllocator, OwningAllocator, SegregateAllocator, StatelessAllocator, Unbounded,
};

#[test]
fn small_large_split_routes_on_block_length() {
    let mut heap =
        SegregateAllocator::<InlineAllocator<1024>, MallocAllocator, 128>::default();

    let small = heap.allocate(64);
    assert!(!small.is_null());

    let large = heap.allocate(4096);
    assert!(!large.is_null());

    unsafe {
        // Write to both; the ranges must not alias.
        small.ptr.write_bytes(0x11, small.len);
        large.ptr.write_bytes(0x22, large.len);
        assert_eq!(*small.ptr, 0x11);
        assert_eq!(*large.ptr, 0x22);

        heap.deallocate(large);
        heap.deallocate(small);
    }
}

#[test]
fn scratch_with_heap_spill() {
    let mut heap = FallbackAllocator::new(InlineAllocator::<64>::new(), MallocAllocator);

    let scratch = heap.allocate(32);
    assert!(!scratch.is_null());

    let spilled = heap.allocate(128);
    assert!(!spilled.is_null());
    assert_eq!(spilled.len, 128);

    unsafe {
        spilled.ptr.write_bytes(0x7F, spilled.len);
        heap.deallocate(spilled);
        heap.deallocate(scratch);
    }
}

#[test]
fn cookie_tagged_composite() {
    type SmallSide = FallbackAllocator<InlineAllocator<256>, MallocAllocator>;
    type Tagged = AffixAllocator<SegregateAllocator<SmallSide, MallocAllocator, 200>, u64>;

    const COOKIE: u64 = 0x5EED_F00D_CAFE_D00D;

    let mut heap = Tagged::default();
    // One small-side block at a time: the inline primary does no tracking.
    let blocks: Vec<Block> = [10usize, 500, 1000, 4000]
        .iter()
        .map(|&n| heap.allocate(n))
        .collect();

    for b in &blocks {
        assert!(!b.is_null());
        unsafe {
            Tagged::prefix_of(*b).write(COOKIE);
            b.ptr.write_bytes(0xAA, b.len);
        }
    }
    for b in &blocks {
        unsafe {
            assert_eq!(Tagged::prefix_of(*b).read(), COOKIE);
            heap.deallocate(*b);
        }
    }
}

#[test]
fn freelist_under_a_router_recycles() {
    type Cached = FreelistAllocator<MallocAllocator, 129, 4096, Unbounded>;
    let mut heap = SegregateAllocator::<MallocAllocator, Cached, 128>::new(
        MallocAllocator,
        FreelistAllocator::new(MallocAllocator),
    );

    let a = heap.allocate(1000);
    let first_ptr = a.ptr;
    unsafe { heap.deallocate(a) };

    // The next in-band request must come out of the cache.
    let b = heap.allocate(2000);
    assert_eq!(b.ptr, first_ptr);
    unsafe { heap.deallocate(b) };

    // Out-of-band traffic is untouched by the cache.
    let c = heap.allocate(64);
    assert!(!c.is_null());
    unsafe { heap.deallocate(c) };
}

#[test]
fn bulk_release_leaves_the_allocator_usable() {
    let mut cache = FreelistAllocator::<MallocAllocator, 64, 64, Unbounded>::default();

    let blocks: Vec<Block> = (0..16).map(|_| cache.allocate(64)).collect();
    for b in blocks {
        unsafe { cache.deallocate(b) };
    }
    assert_eq!(cache.cached(), 16);

    unsafe { cache.deallocate_all() };
    assert_eq!(cache.cached(), 0);

    let b = cache.allocate(64);
    assert!(!b.is_null());
    unsafe { cache.deallocate(b) };
}

#[test]
fn stateless_composites_have_a_canonical_instance() {
    type Chain = FallbackAllocator<NullAllocator, MallocAllocator>;

    let mut heap = Chain::IT;
    let b = heap.allocate(32);
    assert!(!b.is_null());

    // Any copy of a stateless allocator is the same allocator.
    let mut other = Chain::IT;
    unsafe { other.deallocate(b) };
}

#[test]
fn typed_helpers_compose() {
    let mut heap = AlignedMallocAllocator::IT;

    let one = allocate_for::<u128, _>(&mut heap);
    assert_eq!(one.len, 16);

    let many = allocate_array::<u64, _>(&mut heap, 32);
    assert_eq!(many.len, 256);
    assert_eq!(many.ptr as usize % std::mem::align_of::<u64>(), 0);

    unsafe {
        heap.deallocate(many);
        heap.deallocate(one);
    }
}

#[test]
fn ownership_is_observable_from_outside() {
    let mut scratch = InlineAllocator::<128>::new();
    let b = scratch.allocate(64);
    assert!(scratch.owns(b));
    assert!(!scratch.owns(Block::null()));
    unsafe { scratch.deallocate(b) };
}

#[test]
fn exhausted_chains_report_failure_as_null() {
    let mut none = FallbackAllocator::new(NullAllocator, NullAllocator);
    assert!(none.allocate(1).is_null());

    let mut tiny = SegregateAllocator::<InlineAllocator<16>, NullAllocator, 16>::default();
    assert!(!tiny.allocate(8).is_null());
    assert!(tiny.allocate(17).is_null());
}
