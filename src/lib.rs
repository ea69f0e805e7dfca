//! # fitalloc - A Free-List Memory Allocator Library
//!
//! This crate provides a **fit-strategy free-list allocator** that manages a
//! single contiguous region obtained from the operating system with `mmap`
//! and serves allocation/free requests against it without touching the
//! platform's general-purpose allocator.
//!
//! ## Overview
//!
//! ```text
//!   Free-List Allocator Concept:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                      REGION (one anonymous mapping)                  │
//!   │                                                                      │
//!   │   ┌───┬──────┐ ┌───┬─────┐ ┌───┬──────────┐ ┌───┬─────────────────┐  │
//!   │   │ H │ free │ │ H │ A1  │ │ H │   free   │ │ H │       A2        │  │
//!   │   └─┬─┴──────┘ └───┴─────┘ └─▲─┴──────────┘ └───┴─────────────────┘  │
//!   │     │ next                   │                                       │
//!   │     └────────────────────────┘                                       │
//!   │                                                                      │
//!   └──────────────────────────────────────────────────────────────────────┘
//!
//!   Free blocks stay linked in strictly increasing address order.
//!   Allocation walks the list; freeing splices back in and merges
//!   with whichever neighbors it touches.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   fitalloc
//!   ├── align      - Alignment macros (align!, align_to!)
//!   ├── block      - Block header layout and allocation handles
//!   ├── region     - The OS-backed memory region (internal)
//!   └── freelist   - FreeListAllocator implementation
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use fitalloc::{AllocError, FreeListAllocator, SearchMode};
//!
//! fn main() -> Result<(), AllocError> {
//!   let mut allocator = FreeListAllocator::new();
//!
//!   // One region for the allocator's whole lifetime, rounded up to a
//!   // page boundary.
//!   allocator.init(4096)?;
//!
//!   // Allocate 64 bytes, taking the first block that fits.
//!   let handle = allocator.alloc(64, SearchMode::FirstFit)?;
//!
//!   // Use the memory.
//!   let ptr = allocator.payload_ptr(handle) as *mut u64;
//!   unsafe { ptr.write(42) };
//!
//!   // Give it back.
//!   allocator.free(Some(handle))?;
//!
//!   println!("{}", allocator.dump());
//!   Ok(())
//! }
//! ```
//!
//! ## How It Works
//!
//! `init` maps one private anonymous read-write region and installs a
//! single free block spanning it. Each block, free or allocated, carries a
//! 16-byte header in front of its payload:
//!
//! ```text
//!   Single Block:
//!   ┌───────────────────────┬────────────────────────────────┐
//!   │    Block Header       │           Payload              │
//!   │  ┌─────────────────┐  │                                │
//!   │  │ size: N         │  │  ┌──────────────────────────┐  │
//!   │  │ next: offset /  │  │  │   N bytes, N % 8 == 0    │  │
//!   │  │       sentinel  │  │  │                          │  │
//!   │  └─────────────────┘  │  └──────────────────────────┘  │
//!   │      16 bytes         │                                │
//!   └───────────────────────┴────────────────────────────────┘
//!                           ▲
//!                           └── Handle returned to the caller
//! ```
//!
//! Three fit strategies choose among the blocks large enough for a
//! request: [`SearchMode::FirstFit`] takes the first encountered,
//! [`SearchMode::BestFit`] the smallest, [`SearchMode::WorstFit`] the
//! largest. An oversized block is split when the remainder can hold a
//! header of its own; freeing inserts in address order and coalesces
//! with adjacent free neighbors on both sides.
//!
//! ## Features
//!
//! - **Three fit strategies**: first-fit, best-fit, worst-fit per call
//! - **Offset-based handles**: opaque tokens instead of raw addresses,
//!   validated on every `free`
//! - **Detected misuse**: double-free and foreign handles report
//!   [`AllocError::BadPointer`] instead of corrupting the list
//! - **Both-sided coalescing**: adjacent free blocks never accumulate
//!
//! ## Limitations
//!
//! - **Single-threaded only**: one logical owner, no locking
//! - **Fixed region**: the mapping never grows or shrinks after `init`
//! - **Fixed alignment**: payloads are 8-byte aligned, nothing larger
//! - **Unix-only**: requires `libc` and `mmap` (POSIX systems)
//!
//! ## Safety
//!
//! The allocator's own API is safe: handles are validated offsets into a
//! region it owns. Writing through [`FreeListAllocator::payload_ptr`] is
//! raw-pointer territory and needs `unsafe` blocks on the caller's side.

pub mod align;
mod block;
mod error;
mod freelist;
mod region;

pub use block::{ALIGN_UNIT, HEADER_SIZE, Handle};
pub use error::AllocError;
pub use freelist::{FreeListAllocator, SearchMode};
