use std::collections::VecDeque;

use log::debug;

use crate::block_store::BlockNumber;
use crate::error::{FsError, Result};

/// Tracks unused block numbers. Allocation pops from the head and release
/// pushes onto the tail, so the block freed longest ago is reused first.
/// The list is seeded in ascending order, so a fresh disk hands out
/// blocks 0..n-1 in order.
pub struct FreeList {
    blocks: VecDeque<BlockNumber>,
    #[cfg(debug_assertions)]
    is_free: Vec<bool>,
}

impl FreeList {
    pub fn new(num_blocks: usize) -> Self {
        FreeList {
            blocks: (0..num_blocks).collect(),
            #[cfg(debug_assertions)]
            is_free: vec![true; num_blocks],
        }
    }

    pub fn allocate(&mut self) -> Result<BlockNumber> {
        let blocknr = self.blocks.pop_front().ok_or(FsError::OutOfSpace)?;
        #[cfg(debug_assertions)]
        {
            self.is_free[blocknr] = false;
        }
        debug!("allocated block {} ({} free)", blocknr, self.blocks.len());
        Ok(blocknr)
    }

    /// Returns a block to the tail. Releasing a block that is already free
    /// is a caller bug; debug builds assert on it.
    pub fn release(&mut self, blocknr: BlockNumber) {
        #[cfg(debug_assertions)]
        {
            debug_assert!(!self.is_free[blocknr], "double release of block {}", blocknr);
            self.is_free[blocknr] = true;
        }
        self.blocks.push_back(blocknr);
        debug!("released block {} ({} free)", blocknr, self.blocks.len());
    }

    pub fn count(&self) -> usize {
        self.blocks.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockNumber> {
        self.blocks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_list_hands_out_ascending_blocks() {
        let mut list = FreeList::new(4);
        let got: Vec<_> = (0..4).map(|_| list.allocate().unwrap()).collect();
        assert_eq!(got, vec![0, 1, 2, 3]);
        assert_eq!(list.count(), 0);
    }

    #[test]
    fn empty_list_reports_out_of_space() {
        let mut list = FreeList::new(1);
        list.allocate().unwrap();
        assert!(matches!(list.allocate(), Err(FsError::OutOfSpace)));
    }

    #[test]
    fn released_blocks_are_reused_in_release_order() {
        let mut list = FreeList::new(3);
        let a = list.allocate().unwrap();
        let b = list.allocate().unwrap();
        let c = list.allocate().unwrap();
        list.release(c);
        list.release(a);
        list.release(b);
        assert_eq!(list.allocate().unwrap(), c);
        assert_eq!(list.allocate().unwrap(), a);
        assert_eq!(list.allocate().unwrap(), b);
    }

    #[test]
    fn released_block_goes_behind_never_used_ones() {
        let mut list = FreeList::new(3);
        let first = list.allocate().unwrap();
        list.release(first);
        assert_eq!(list.allocate().unwrap(), 1);
        assert_eq!(list.allocate().unwrap(), 2);
        assert_eq!(list.allocate().unwrap(), first);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "double release")]
    fn double_release_asserts_in_debug() {
        let mut list = FreeList::new(2);
        let b = list.allocate().unwrap();
        list.release(b);
        list.release(b);
    }
}
