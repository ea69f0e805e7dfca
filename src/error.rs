use std::{error, fmt};

/// Everything an allocator call can fail with.
///
/// Errors are returned, never panicked, and a failing call leaves the
/// free list exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
  /// Invalid size, a second `init`, or the OS declining to provide the
  /// backing region. The caller must correct the request; retrying the
  /// same call cannot succeed.
  BadArgs,
  /// The arguments were valid but no free block is large enough. May
  /// succeed later, after something has been freed.
  NoSpace,
  /// The handle is out of bounds, misaligned, or does not name an
  /// outstanding allocation (double-free lands here).
  BadPointer,
  /// In-region metadata failed validation: a link out of bounds or out
  /// of address order, or an impossible block size.
  CorruptFreeList,
}

impl fmt::Display for AllocError {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    let message = match self {
      Self::BadArgs => "bad arguments or region unavailable",
      Self::NoSpace => "no free block large enough",
      Self::BadPointer => "handle does not name an outstanding allocation",
      Self::CorruptFreeList => "free list metadata failed validation",
    };

    f.write_str(message)
  }
}

impl error::Error for AllocError {}
