//! Boxoffice benchmarks with an optimized global allocator.
//!
//! All benchmarks in this crate run with mimalloc as the global allocator:
//! the pool workloads are dominated by many small allocations (tickets and
//! log lines) from many threads at once, which is the profile mimalloc is
//! built for.

use mimalloc::MiMalloc;

/// Global allocator for every benchmark in this crate.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Re-export mimalloc for direct access if needed.
pub use mimalloc;

#[cfg(test)]
mod tests {
    use super::*;
    use std::alloc::{GlobalAlloc, Layout};

    #[test]
    fn test_mimalloc_allocator_works() {
        let layout = Layout::from_size_align(1024, 8).unwrap();
        unsafe {
            let ptr = GLOBAL.alloc(layout);
            assert!(!ptr.is_null(), "mimalloc should allocate successfully");

            std::ptr::write(ptr, 42u8);
            assert_eq!(std::ptr::read(ptr), 42u8);

            GLOBAL.dealloc(ptr, layout);
        }
    }
}
