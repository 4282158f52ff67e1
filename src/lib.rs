// Licensed under MIT license (the COPYING file). This file may not be
// copied, modified, or distributed except according to those terms.

//! Composable memory allocator building blocks.
//!
//! A toolkit of small allocators, leaves and combinators, that assemble at
//! compile time into arbitrarily sophisticated memory-management policies,
//! after Andrei Alexandrescu's composable-allocator design.
//!
//! # Introduction
//!
//! An allocator here is a *value* with a narrow contract: hand out raw byte
//! [`Block`]s, take them back. Complex policies are not written as monolithic
//! heaps; they are obtained by plugging simple allocators into each other.
//! A segregating router over an embedded buffer and the process heap, with a
//! free-list cache and per-block headers, is one type:
//!
//! ```rust
//! use allokit::{
//!     AffixAllocator, FallbackAllocator, FreelistAllocator, InlineAllocator,
//!     MallocAllocator, SegregateAllocator, Unbounded,
//! };
//!
//! type SmallSide = FallbackAllocator<InlineAllocator<4096>, MallocAllocator>;
//! type LargeSide = FreelistAllocator<MallocAllocator, 129, 4096, Unbounded>;
//! type Tagged = AffixAllocator<SegregateAllocator<SmallSide, LargeSide, 128>, u64>;
//! ```
//!
//! Every layer of that type still satisfies the same contract, so it can be
//! wrapped, routed and cached again.
//!
//! # Contract
//!
//! The whole toolkit trades in one value type, [`Block`]: a pointer/length
//! pair that is either null (allocation failure; the only failure channel,
//! nothing panics) or a live range of uninitialised bytes. Capabilities
//! beyond [`Allocator`] are extension traits, and each combinator exposes
//! exactly the union of what its children support, through conditional
//! `impl`s resolved at compile time:
//!
//! * [`AlignedAllocator`]: explicit per-request alignment;
//! * [`OwningAllocator`]: can tell its own blocks apart, which is what
//!   makes deallocation routing in composites sound;
//! * [`BulkDeallocator`]: releases everything outstanding in one step;
//! * [`StatelessAllocator`]: zero-sized, with the canonical instance
//!   [`IT`](StatelessAllocator::IT).
//!
//! # Building blocks
//!
//! Leaves: [`NullAllocator`] (always fails; the identity of a fallback
//! chain), [`MallocAllocator`] and [`AlignedMallocAllocator`] (the process
//! heap), [`InlineAllocator`] (an embedded scratch buffer with no
//! bookkeeping). Combinators: [`FallbackAllocator`] (primary, then
//! fallback), [`SegregateAllocator`] (size threshold routes small/large),
//! [`FreelistAllocator`] (caches freed blocks of a size band),
//! [`AffixAllocator`] (transparent per-block headers and footers).
//!
//! The [`GlobalAllocator`] facade wraps any composition in a spinning mutex
//! from the [`spin`] crate so it can back a whole process via
//! `#[global_allocator]`.
//!
//! # Safety
//!
//! Blocks are raw, uninitialised memory; using them is `unsafe` business of
//! the caller, and a block must go back to the allocator chain that produced
//! it, exactly once. The toolkit performs no tracking and detects no misuse
//! (an [`AffixAllocator`] carrying a magic cookie is the opt-in way to get
//! such checks). Apart from [`GlobalAllocator`], nothing here synchronises:
//! allocator values are single-threaded, and callers who share one must lock
//! around it.
//!
//! [`spin`]: https://docs.rs/spin/
//! [`Block`]: struct.Block.html

#![cfg_attr(not(test), no_std)]

mod affix;
mod block;
mod fallback;
mod freelist;
mod global;
mod inline;
mod malloc;
mod null;
mod segregate;
mod traits;
mod utils;

pub use affix::AffixAllocator;
pub use block::Block;
pub use fallback::FallbackAllocator;
pub use freelist::{Capped, FreelistAllocator, NodeCap, Unbounded};
pub use global::GlobalAllocator;
pub use inline::InlineAllocator;
pub use malloc::{AlignedMallocAllocator, MallocAllocator};
pub use null::NullAllocator;
pub use segregate::SegregateAllocator;
pub use traits::{
    allocate_array, allocate_for, AlignedAllocator, Allocator, BulkDeallocator, OwningAllocator,
    StatelessAllocator,
};
pub use utils::{align_down, align_up, PLATFORM_MAX_ALIGNMENT};
