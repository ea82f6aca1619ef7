// Maps a file's logical byte stream onto its list of block numbers.

use log::debug;

use crate::block_store::BlockStore;
use crate::error::{FsError, Result};
use crate::free_list::FreeList;
use crate::fs_structs::FileData;

/// Decodes `\n`, `\t`, `\\` and `\"`. Any other escaped character stands for
/// itself; a trailing lone backslash is kept as is.
pub fn unescape(src: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(src.len());
    let mut bytes = src.bytes();
    while let Some(b) = bytes.next() {
        if b != b'\\' {
            out.push(b);
            continue;
        }
        match bytes.next() {
            Some(b'n') => out.push(b'\n'),
            Some(b't') => out.push(b'\t'),
            Some(other) => out.push(other),
            None => out.push(b'\\'),
        }
    }
    out
}

/// Appends `payload` to the end of `file`, growing its block list first.
///
/// Either the whole payload lands or nothing changes: the block shortfall is
/// checked against the free count before any block is taken.
pub fn append(
    file: &mut FileData,
    payload: &[u8],
    free_list: &mut FreeList,
    store: &mut BlockStore,
) -> Result<usize> {
    let block_size = store.block_size();
    let old_len = file.content_size;
    let new_len = old_len + payload.len();
    let total_needed = (new_len + block_size - 1) / block_size;
    let additional = total_needed.saturating_sub(file.num_blocks());

    if additional > free_list.count() {
        return Err(FsError::DiskFull {
            needed: additional,
            free: free_list.count(),
        });
    }

    file.block_pointers.reserve(additional);
    for _ in 0..additional {
        file.block_pointers.push(free_list.allocate()?);
    }

    let mut offset = old_len;
    let mut rest = payload;
    while !rest.is_empty() {
        let blocknr = file.block_pointers[offset / block_size];
        let in_block = offset % block_size;
        let chunk = rest.len().min(block_size - in_block);
        store.write_at(blocknr, in_block, &rest[..chunk]);
        offset += chunk;
        rest = &rest[chunk..];
    }

    file.content_size = new_len;
    debug!(
        "appended {} bytes ({} new blocks, {} total)",
        payload.len(),
        additional,
        file.num_blocks()
    );
    Ok(payload.len())
}

/// Gathers exactly `content_size` bytes, block by block, truncating the last one.
pub fn read(file: &FileData, store: &BlockStore) -> Vec<u8> {
    let mut out = Vec::with_capacity(file.content_size);
    let mut remaining = file.content_size;
    for &blocknr in &file.block_pointers {
        if remaining == 0 {
            break;
        }
        let take = remaining.min(store.block_size());
        out.extend_from_slice(&store.block(blocknr)[..take]);
        remaining -= take;
    }
    out
}

/// Gives every block back to the free list and empties the file.
/// Returns how many blocks were released.
pub fn truncate_and_release(file: &mut FileData, free_list: &mut FreeList) -> usize {
    let released = file.num_blocks();
    for blocknr in file.block_pointers.drain(..) {
        free_list.release(blocknr);
    }
    file.content_size = 0;
    released
}
