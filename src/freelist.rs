use std::ptr;

use log::{debug, warn};

use crate::{
  align,
  block::{ALIGN_UNIT, BlockHeader, HEADER_SIZE, Handle, NIL, USED},
  error::AllocError,
  region::Region,
};

/// Policy for choosing among free blocks large enough to satisfy a
/// request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
  /// The first block encountered that fits. The scan stops as soon as
  /// one qualifies.
  FirstFit,
  /// The smallest block that fits. Scans the whole list.
  BestFit,
  /// The largest block that fits. Scans the whole list.
  WorstFit,
}

/// A fit-strategy allocator over one OS-backed region.
///
/// Free blocks form a singly linked list threaded through the region
/// itself, strictly increasing by offset. That ordering is what makes
/// coalescing on `free` a neighbor check instead of a full-list scan.
pub struct FreeListAllocator {
  region: Option<Region>,
  head: usize,
}

/// Reads the header at `offset`, rejecting anything a healthy list can
/// never contain: an offset out of bounds or out of address order
/// relative to `prev`, or a payload that would run past the region.
fn checked_header(
  region: &Region,
  offset: usize,
  prev: usize,
) -> Result<BlockHeader, AllocError> {
  if !region.contains_block(offset) {
    return Err(AllocError::CorruptFreeList);
  }

  if prev != NIL && offset <= prev {
    return Err(AllocError::CorruptFreeList);
  }

  let header = region.read_header(offset);

  if header.size % ALIGN_UNIT != 0 || region.block_end(offset, header.size).is_none() {
    return Err(AllocError::CorruptFreeList);
  }

  Ok(header)
}

impl FreeListAllocator {
  /// Creates an allocator with no backing region yet. Every operation
  /// except `free(None)` fails with `BadArgs` until `init` succeeds.
  pub fn new() -> Self {
    Self {
      region: None,
      head: NIL,
    }
  }

  /// Acquires the backing region and installs the initial free block.
  ///
  /// `size` is rounded up to the next page-size multiple and requested
  /// from the OS as a private anonymous mapping. Must be called exactly
  /// once: a second call fails with `BadArgs` and leaves the live
  /// region untouched.
  pub fn init(
    &mut self,
    size: usize,
  ) -> Result<(), AllocError> {
    if self.region.is_some() || size == 0 {
      return Err(AllocError::BadArgs);
    }

    let mut region = Region::map(size)?;

    let payload = region.len() - HEADER_SIZE;
    region.write_header(0, BlockHeader { size: payload, next: NIL });

    debug!("init: one free block of {payload} bytes in a {} byte region", region.len());

    self.region = Some(region);
    self.head = 0;

    Ok(())
  }

  /// Hands out a block of at least `size` bytes, chosen by `mode`.
  ///
  /// `size` is rounded up to the 8-byte unit. When several candidates
  /// share the extremal size, the one lowest in the list wins: the scan
  /// only updates its running choice on strict improvement. A chosen
  /// block is split when the remainder can host another header;
  /// anything smaller rides along as internal fragmentation. A failed
  /// search touches nothing.
  pub fn alloc(
    &mut self,
    size: usize,
    mode: SearchMode,
  ) -> Result<Handle, AllocError> {
    let region = self.region.as_mut().ok_or(AllocError::BadArgs)?;

    if size == 0 || size > usize::MAX - ALIGN_UNIT {
      return Err(AllocError::BadArgs);
    }

    let size = align!(size);

    let mut chosen = NIL;
    let mut chosen_prev = NIL;
    let mut chosen_size = 0;

    let mut prev = NIL;
    let mut current = self.head;

    while current != NIL {
      let header = checked_header(region, current, prev)?;

      if header.size >= size {
        let better = match mode {
          SearchMode::FirstFit => chosen == NIL,
          SearchMode::BestFit => chosen == NIL || header.size < chosen_size,
          SearchMode::WorstFit => chosen == NIL || header.size > chosen_size,
        };

        if better {
          chosen = current;
          chosen_prev = prev;
          chosen_size = header.size;
        }

        if mode == SearchMode::FirstFit {
          break;
        }
      }

      prev = current;
      current = header.next;
    }

    if chosen == NIL {
      return Err(AllocError::NoSpace);
    }

    let mut header = region.read_header(chosen);

    // Carve off the tail when it can hold a header of its own; the
    // remainder inherits the consumed block's place in the list.
    let replacement = if header.size - size >= HEADER_SIZE {
      let remainder = chosen + HEADER_SIZE + size;
      let remainder_size = header.size - size - HEADER_SIZE;

      region.write_header(
        remainder,
        BlockHeader { size: remainder_size, next: header.next },
      );
      header.size = size;

      debug!("alloc: split block at {chosen:#x}, remainder of {remainder_size} bytes at {remainder:#x}");

      remainder
    } else {
      header.next
    };

    if chosen_prev == NIL {
      self.head = replacement;
    } else {
      let mut before = region.read_header(chosen_prev);
      before.next = replacement;
      region.write_header(chosen_prev, before);
    }

    header.next = USED;
    region.write_header(chosen, header);

    debug!("alloc({size}, {mode:?}): block at {chosen:#x}, {} bytes", header.size);

    Ok(Handle::new(chosen + HEADER_SIZE))
  }

  /// Returns a block to the free list, merging it with whichever
  /// neighbors it touches.
  ///
  /// `None` frees nothing and succeeds. A handle that is out of
  /// bounds, misaligned, or not stamped as outstanding is rejected
  /// with `BadPointer`, so a double-free reports instead of corrupting
  /// the list.
  pub fn free(
    &mut self,
    handle: Option<Handle>,
  ) -> Result<(), AllocError> {
    let Some(handle) = handle else {
      return Ok(());
    };

    let region = self.region.as_mut().ok_or(AllocError::BadArgs)?;

    let block = handle
      .offset()
      .checked_sub(HEADER_SIZE)
      .ok_or(AllocError::BadPointer)?;

    if !region.contains_block(block) {
      return Err(AllocError::BadPointer);
    }

    let mut header = region.read_header(block);

    if header.next != USED {
      return Err(AllocError::BadPointer);
    }

    let end = region
      .block_end(block, header.size)
      .ok_or(AllocError::CorruptFreeList)?;

    if header.size % ALIGN_UNIT != 0 {
      return Err(AllocError::CorruptFreeList);
    }

    // Insertion point: the first free block past this one, tracking
    // the one before it.
    let mut prev = NIL;
    let mut current = self.head;

    while current != NIL && current < block {
      let ahead = checked_header(region, current, prev)?;
      prev = current;
      current = ahead.next;
    }

    // A live link to this offset despite the outstanding stamp means
    // the two views of the block disagree.
    if current == block {
      return Err(AllocError::CorruptFreeList);
    }

    let successor = if current == NIL {
      None
    } else {
      let ahead = checked_header(region, current, prev)?;

      if end > current {
        return Err(AllocError::CorruptFreeList);
      }

      Some(ahead)
    };

    header.next = current;
    region.write_header(block, header);

    if prev == NIL {
      self.head = block;
    } else {
      let mut before = region.read_header(prev);
      before.next = block;
      region.write_header(prev, before);
    }

    debug!("free: block at {block:#x}, {} bytes back on the list", header.size);

    // Merge forward: the payload runs right up to the next free block.
    if let Some(successor) = successor {
      if end == current {
        header.size += HEADER_SIZE + successor.size;
        header.next = successor.next;
        region.write_header(block, header);

        debug!("free: merged with successor at {current:#x}, now {} bytes", header.size);
      }
    }

    // Then backward, the same check from the predecessor's side.
    if prev != NIL {
      let mut before = region.read_header(prev);

      if prev + HEADER_SIZE + before.size == block {
        before.size += HEADER_SIZE + header.size;
        before.next = header.next;
        region.write_header(prev, before);

        debug!("free: merged into predecessor at {prev:#x}, now {} bytes", before.size);
      }
    }

    Ok(())
  }

  /// The free list as `(offset, size)` pairs, lowest offset first.
  ///
  /// Diagnostic only; never mutates. A corrupt link ends the walk early
  /// rather than following it.
  pub fn free_blocks(&self) -> Vec<(usize, usize)> {
    let mut blocks = Vec::new();

    let Some(region) = self.region.as_ref() else {
      return blocks;
    };

    let mut prev = NIL;
    let mut current = self.head;

    while current != NIL {
      let Ok(header) = checked_header(region, current, prev) else {
        warn!("free list walk stopped at corrupt link {current:#x}");
        break;
      };

      blocks.push((current, header.size));

      prev = current;
      current = header.next;
    }

    blocks
  }

  /// Human-readable listing of the free-block sizes in address order.
  pub fn dump(&self) -> String {
    let mut out = String::from("Free memory dump:\n");

    for (_, size) in self.free_blocks() {
      out.push_str(&format!("[size: {size} bytes]\n"));
    }

    out
  }

  /// Address of a handle's payload, or null for a handle that cannot
  /// point into the region. Dereferencing is the caller's contract.
  pub fn payload_ptr(
    &self,
    handle: Handle,
  ) -> *mut u8 {
    let Some(region) = self.region.as_ref() else {
      return ptr::null_mut();
    };

    if handle.offset() < HEADER_SIZE || handle.offset() > region.len() {
      return ptr::null_mut();
    }

    region.payload_ptr(handle.offset())
  }
}
