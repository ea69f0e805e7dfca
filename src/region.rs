use std::ptr::{self, NonNull};

use log::debug;

use crate::{
  align_to,
  block::{ALIGN_UNIT, BlockHeader, HEADER_SIZE},
  error::AllocError,
};

/// Queries the platform page size once per mapping.
pub(crate) fn page_size() -> usize {
  let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };

  if size > 0 { size as usize } else { 4096 }
}

/// The single contiguous span of memory backing an allocator.
///
/// Obtained from the OS as a private anonymous read-write mapping,
/// sized up to a page boundary, and returned with `munmap` when the
/// region is dropped. All raw-memory contact lives here: headers are
/// read and written by offset so that bounds and alignment checking
/// stays in one place.
#[derive(Debug)]
pub(crate) struct Region {
  base: NonNull<u8>,
  len: usize,
}

impl Region {
  /// Maps a fresh region of at least `requested` bytes, rounded up to
  /// the next page-size multiple. Any OS refusal reports as `BadArgs`;
  /// the caller cannot distinguish "too big" from "declined".
  pub(crate) fn map(
    requested: usize,
  ) -> Result<Self, AllocError> {
    let page = page_size();

    if requested == 0 || requested > usize::MAX - page {
      return Err(AllocError::BadArgs);
    }

    let len = align_to!(requested, page);

    let base = unsafe {
      libc::mmap(
        ptr::null_mut(),
        len,
        libc::PROT_READ | libc::PROT_WRITE,
        libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
        -1,
        0,
      )
    };

    if base == libc::MAP_FAILED {
      return Err(AllocError::BadArgs);
    }

    let base = NonNull::new(base as *mut u8).ok_or(AllocError::BadArgs)?;

    debug!("mapped region: {len} bytes at {:?}", base.as_ptr());

    Ok(Self { base, len })
  }

  pub(crate) fn len(&self) -> usize {
    self.len
  }

  /// Whether `offset` can be the start of a block header: aligned to
  /// the allocation unit, with room for the header before the region
  /// ends.
  pub(crate) fn contains_block(
    &self,
    offset: usize,
  ) -> bool {
    offset % ALIGN_UNIT == 0
      && offset
        .checked_add(HEADER_SIZE)
        .is_some_and(|end| end <= self.len)
  }

  /// End offset of a block with the given payload size, or `None` if
  /// the span overflows or leaves the region.
  pub(crate) fn block_end(
    &self,
    offset: usize,
    size: usize,
  ) -> Option<usize> {
    let end = offset.checked_add(HEADER_SIZE)?.checked_add(size)?;

    (end <= self.len).then_some(end)
  }

  pub(crate) fn read_header(
    &self,
    offset: usize,
  ) -> BlockHeader {
    debug_assert!(self.contains_block(offset));

    unsafe { (self.base.as_ptr().add(offset) as *const BlockHeader).read() }
  }

  pub(crate) fn write_header(
    &mut self,
    offset: usize,
    header: BlockHeader,
  ) {
    debug_assert!(self.contains_block(offset));

    unsafe { (self.base.as_ptr().add(offset) as *mut BlockHeader).write(header) }
  }

  /// Address of the byte at `offset`. The offset must already have been
  /// validated; dereferencing the result is the caller's contract.
  pub(crate) fn payload_ptr(
    &self,
    offset: usize,
  ) -> *mut u8 {
    debug_assert!(offset <= self.len);

    unsafe { self.base.as_ptr().add(offset) }
  }
}

impl Drop for Region {
  fn drop(&mut self) {
    unsafe {
      libc::munmap(self.base.as_ptr().cast(), self.len);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::block::NIL;

  #[test]
  fn test_map_rounds_to_page_size() {
    let page = page_size();

    let region = Region::map(1).unwrap();
    assert_eq!(region.len(), page);

    let region = Region::map(page + 1).unwrap();
    assert_eq!(region.len(), 2 * page);
  }

  #[test]
  fn test_map_rejects_zero() {
    assert_eq!(Region::map(0).unwrap_err(), AllocError::BadArgs);
  }

  #[test]
  fn test_header_round_trip() {
    let mut region = Region::map(1).unwrap();

    let header = BlockHeader { size: 128, next: NIL };
    region.write_header(64, header);

    assert_eq!(region.read_header(64), header);
  }

  #[test]
  fn test_contains_block_bounds() {
    let region = Region::map(1).unwrap();
    let len = region.len();

    assert!(region.contains_block(0));
    assert!(region.contains_block(len - HEADER_SIZE));
    assert!(!region.contains_block(len - HEADER_SIZE + ALIGN_UNIT));
    assert!(!region.contains_block(4)); // misaligned
    assert!(!region.contains_block(usize::MAX - 7));
  }

  #[test]
  fn test_block_end() {
    let region = Region::map(1).unwrap();
    let len = region.len();

    assert_eq!(region.block_end(0, 8), Some(HEADER_SIZE + 8));
    assert_eq!(region.block_end(0, len - HEADER_SIZE), Some(len));
    assert_eq!(region.block_end(0, len), None);
    assert_eq!(region.block_end(8, usize::MAX), None);
  }
}
