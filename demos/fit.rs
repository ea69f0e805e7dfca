use fitalloc::{AllocError, FreeListAllocator, SearchMode};

fn main() -> Result<(), AllocError> {
  // The allocator starts without a region; `init` maps one private
  // anonymous region from the OS, rounded up to a page boundary, and
  // everything afterwards is carved out of it.
  let mut allocator = FreeListAllocator::new();
  allocator.init(4096)?;

  println!("[0] Initialized a 4096-byte region");
  print!("{}", allocator.dump());

  // --------------------------------------------------------------------
  // 1) Allocate 16 bytes with first-fit and write through the handle.
  // --------------------------------------------------------------------
  let first = allocator.alloc(16, SearchMode::FirstFit)?;
  println!("\n[1] alloc(16, FirstFit) -> payload offset {}", first.offset());

  let first_ptr = allocator.payload_ptr(first) as *mut u64;
  unsafe { first_ptr.write(0xDEAD_BEEF) };
  println!("[1] Value written to first block = 0x{:X}", unsafe { first_ptr.read() });

  // --------------------------------------------------------------------
  // 2) Allocate 32 more bytes; the free block shrinks from the front.
  // --------------------------------------------------------------------
  let second = allocator.alloc(32, SearchMode::FirstFit)?;
  println!("\n[2] alloc(32, FirstFit) -> payload offset {}", second.offset());
  print!("{}", allocator.dump());

  // --------------------------------------------------------------------
  // 3) Free the first block. A 16-byte hole opens in front of the
  //    second allocation.
  // --------------------------------------------------------------------
  allocator.free(Some(first))?;
  println!("\n[3] Freed the first block");
  print!("{}", allocator.dump());

  // --------------------------------------------------------------------
  // 4) Best-fit prefers the snug 16-byte hole over the large tail,
  //    reusing the slot the first block came from.
  // --------------------------------------------------------------------
  let reused = allocator.alloc(8, SearchMode::BestFit)?;
  println!(
    "\n[4] alloc(8, BestFit) -> payload offset {} ({})",
    reused.offset(),
    if reused == first {
      "reused the freed block"
    } else {
      "landed somewhere else"
    }
  );
  print!("{}", allocator.dump());

  // --------------------------------------------------------------------
  // 5) Worst-fit does the opposite: it carves from the largest block.
  // --------------------------------------------------------------------
  let carved = allocator.alloc(8, SearchMode::WorstFit)?;
  println!("\n[5] alloc(8, WorstFit) -> payload offset {}", carved.offset());
  print!("{}", allocator.dump());

  // --------------------------------------------------------------------
  // 6) Free everything. Adjacent blocks merge back as they return, and
  //    the dump collapses to a single span.
  // --------------------------------------------------------------------
  allocator.free(Some(reused))?;
  allocator.free(Some(second))?;
  allocator.free(Some(carved))?;
  println!("\n[6] Freed everything; neighbors merged on the way back");
  print!("{}", allocator.dump());

  // --------------------------------------------------------------------
  // 7) Ask for more than the region holds: NoSpace, and the list is
  //    untouched.
  // --------------------------------------------------------------------
  match allocator.alloc(1024 * 1024, SearchMode::FirstFit) {
    Err(AllocError::NoSpace) => println!("\n[7] alloc(1 MiB) -> NoSpace, as expected"),
    other => println!("\n[7] alloc(1 MiB) -> unexpected result {other:?}"),
  }

  // --------------------------------------------------------------------
  // 8) A stale handle is rejected instead of corrupting the list.
  // --------------------------------------------------------------------
  match allocator.free(Some(carved)) {
    Err(AllocError::BadPointer) => println!("[8] double free -> BadPointer, as expected"),
    other => println!("[8] double free -> unexpected result {other:?}"),
  }

  println!("\n[9] End of demo. The region is unmapped when the allocator drops.");
  Ok(())
}
