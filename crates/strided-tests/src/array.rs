//! Array lifecycle conformance: element accounting and sparse storage

#[cfg(test)]
mod tests {
    use crate::utils::Counted;
    use strided_array::Array;
    use strided_core::{shape, Shape};

    fn lifetime_shape() -> Shape<2> {
        shape![(-2, 5, 2), (4, 10, 20)]
    }

    // ============ lifecycle accounting ============

    #[test]
    fn test_default_init_lifetime() {
        let shape = lifetime_shape();
        let size = shape.size() as usize;
        Counted::reset();
        {
            let _a: Array<Counted, 2> = Array::new(shape);
        }
        assert_eq!(Counted::defaults(), size);
        assert_eq!(Counted::drops(), size);
    }

    #[test]
    fn test_fill_init_lifetime() {
        let shape = lifetime_shape();
        let size = shape.size() as usize;
        Counted::reset();
        {
            let _a = Array::with_value(shape, Counted::default());
        }
        assert_eq!(Counted::clones(), size);
        // The fill source is dropped once on top of the cells.
        assert_eq!(Counted::drops(), size + 1);
    }

    #[test]
    fn test_copy_lifetime() {
        let shape = lifetime_shape();
        let size = shape.size() as usize;
        let source: Array<Counted, 2> = Array::new(shape);
        Counted::reset();
        {
            let _copy = source.clone();
            drop(source);
        }
        assert_eq!(Counted::clones(), size);
        assert_eq!(Counted::drops(), 2 * size);
    }

    #[test]
    fn test_move_lifetime() {
        let shape = lifetime_shape();
        let size = shape.size() as usize;
        let source: Array<Counted, 2> = Array::new(shape);
        Counted::reset();
        {
            let _moved = source;
        }
        assert_eq!(Counted::constructs(), 0);
        assert_eq!(Counted::drops(), size);
    }

    #[test]
    fn test_clear_lifetime() {
        let shape = lifetime_shape();
        let size = shape.size() as usize;
        Counted::reset();
        let mut a: Array<Counted, 2> = Array::new(shape);
        a.clear();
        assert_eq!(Counted::defaults(), size);
        assert_eq!(Counted::drops(), size);
        assert!(a.is_empty());
    }

    #[test]
    fn test_assign_lifetime() {
        let shape = lifetime_shape();
        let size = shape.size() as usize;
        let mut a: Array<Counted, 2> = Array::new(shape);
        Counted::reset();
        a.assign(shape, Counted::default());
        // Old cells dropped, new cells cloned in, fill source dropped.
        assert_eq!(Counted::drops(), size + 1);
        assert_eq!(Counted::clones(), size);
    }

    // ============ sparse storage ============

    #[test]
    fn test_sparse_assign_leaves_gaps_untouched() {
        let sparse_shape = lifetime_shape();
        let mut sparse: Array<i32, 2> = Array::new(sparse_shape);
        let flat_extent = sparse_shape.flat_extent() as usize;
        let size = sparse_shape.size() as usize;

        // Paint the whole allocation, in-domain or not.
        for slot in sparse.storage_mut() {
            slot.write(7);
        }
        sparse.assign(sparse_shape, 3);

        for y in 4..14 {
            for x in -2..3 {
                assert_eq!(sparse[[x, y]], 3);
            }
        }

        // Only the in-domain cells were assigned.
        let sevens = sparse
            .storage()
            .iter()
            .filter(|slot| unsafe { slot.assume_init_read() } == 7)
            .count();
        assert_eq!(sevens, flat_extent - size);
    }

    #[test]
    fn test_sparse_fill_reaches_every_cell() {
        // size 50 spread over 140 flat slots: 90 slots stay untouched.
        let s = shape![(0, 5, 1), (0, 10, 15)];
        assert_eq!(s.size(), 50);
        assert_eq!(s.flat_extent(), 140);

        let mut a: Array<u8, 2> = Array::new(s);
        for slot in a.storage_mut() {
            slot.write(0);
        }
        a.assign(s, 0xAB);
        for y in 0..10 {
            for x in 0..5 {
                assert_eq!(a[[x, y]], 0xAB);
            }
        }
        let untouched = a
            .storage()
            .iter()
            .filter(|slot| unsafe { slot.assume_init_read() } != 0xAB)
            .count();
        assert_eq!(untouched as isize, s.flat_extent() - s.size());
    }

    #[test]
    fn test_assign_reallocates_only_when_growing() {
        let big = Shape::dense([10, 10]).resolved();
        let small = Shape::dense([4, 4]).resolved();
        let mut a: Array<i32, 2> = Array::new(big);
        assert_eq!(a.storage().len(), 100);

        // Shrinking reuses the allocation.
        a.assign(small, 1);
        assert_eq!(a.storage().len(), 100);

        a.assign(big, 2);
        assert_eq!(a.storage().len(), 100);
    }
}
