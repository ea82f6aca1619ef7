// The simulated disk: one contiguous buffer of `total_blocks * block_size` bytes.

/// The block number to access ranging from 0 (the first block) to n - 1 (the last
/// block) where n is number of blocks available.
pub type BlockNumber = usize;

/// Passive block storage. Blocks carry no metadata; ownership of a block is
/// tracked entirely by the file that references it.
pub struct BlockStore {
    data: Vec<u8>,
    block_size: usize,
    num_blocks: usize,
}

impl BlockStore {
    pub fn new(num_blocks: usize, block_size: usize) -> Self {
        BlockStore {
            data: vec![0; num_blocks * block_size],
            block_size,
            num_blocks,
        }
    }

    pub fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Borrows one whole block.
    ///
    /// # Panics
    ///
    /// Panics if `blocknr` is out of range. Block numbers only ever come from
    /// the free list, so an out-of-range number is a bookkeeping bug.
    pub fn block(&self, blocknr: BlockNumber) -> &[u8] {
        assert!(blocknr < self.num_blocks, "block {} out of range", blocknr);
        let start = blocknr * self.block_size;
        &self.data[start..start + self.block_size]
    }

    pub fn block_mut(&mut self, blocknr: BlockNumber) -> &mut [u8] {
        assert!(blocknr < self.num_blocks, "block {} out of range", blocknr);
        let start = blocknr * self.block_size;
        &mut self.data[start..start + self.block_size]
    }

    /// Copies `buf` into block `blocknr` starting at `offset`.
    pub fn write_at(&mut self, blocknr: BlockNumber, offset: usize, buf: &[u8]) {
        self.block_mut(blocknr)[offset..offset + buf.len()].copy_from_slice(buf);
    }
}
