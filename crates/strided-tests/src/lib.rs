//! Shared conformance suite for the strided workspace
//!
//! The modules here exercise the public surface of `strided-core` and
//! `strided-array` together: seed scenarios, brute-force cross-checks of the
//! shape predicates, element-lifecycle accounting, and comparisons against
//! the `ndarray` crate's layouts.

pub mod algorithm;
pub mod array;
pub mod shape;
pub mod view;

/// Test utilities
pub mod utils {
    use std::cell::Cell;

    thread_local! {
        static DEFAULTS: Cell<usize> = const { Cell::new(0) };
        static CLONES: Cell<usize> = const { Cell::new(0) };
        static DROPS: Cell<usize> = const { Cell::new(0) };
    }

    /// Element type that counts its constructions and destructions.
    ///
    /// Counters are thread-local, so tests running in parallel do not see
    /// each other's elements. Call [`Counted::reset`] at the start of each
    /// accounting block.
    #[derive(Debug, PartialEq)]
    pub struct Counted;

    impl Counted {
        pub fn reset() {
            DEFAULTS.with(|c| c.set(0));
            CLONES.with(|c| c.set(0));
            DROPS.with(|c| c.set(0));
        }

        pub fn defaults() -> usize {
            DEFAULTS.with(Cell::get)
        }

        pub fn clones() -> usize {
            CLONES.with(Cell::get)
        }

        pub fn drops() -> usize {
            DROPS.with(Cell::get)
        }

        pub fn constructs() -> usize {
            Self::defaults() + Self::clones()
        }
    }

    impl Default for Counted {
        fn default() -> Self {
            DEFAULTS.with(|c| c.set(c.get() + 1));
            Counted
        }
    }

    impl Clone for Counted {
        fn clone(&self) -> Self {
            CLONES.with(|c| c.set(c.get() + 1));
            Counted
        }
    }

    impl Drop for Counted {
        fn drop(&mut self) {
            DROPS.with(|c| c.set(c.get() + 1));
        }
    }
}
