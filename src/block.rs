use alloc::vec::Vec;

/// Index of a block descriptor inside a [`BlockTable`].
pub type BlockId = usize;

/// A free or used extent of exactly one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    /// Index of the owning chunk.
    pub chunk: usize,
    /// Offset of the first byte from the start of the chunk.
    pub offset: usize,
    pub len: usize,
    pub used: bool,
    /// Alignment applied by the allocation that last used this block.
    pub align: usize,
    next: Option<BlockId>,
}

impl Block {
    pub fn free(chunk: usize, offset: usize, len: usize) -> Self {
        Self {
            chunk,
            offset,
            len,
            used: false,
            align: 1,
            next: None,
        }
    }

    #[inline]
    pub fn next(&self) -> Option<BlockId> {
        self.next
    }
}

/// Ordered collection of block descriptors.
///
/// Blocks live in a slot vector and link to their successor by index, slots
/// released by [`BlockTable::unlink_next`] are handed out again on insert.
#[derive(Debug, Default)]
pub struct BlockTable {
    slots: Vec<Option<Block>>,
    vacant: Vec<BlockId>,
    head: Option<BlockId>,
    tail: Option<BlockId>,
    len: usize,
}

impl BlockTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn head(&self) -> Option<BlockId> {
        self.head
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn get(&self, id: BlockId) -> &Block {
        self.slots[id].as_ref().expect("block id refers to a live slot")
    }

    pub fn get_mut(&mut self, id: BlockId) -> &mut Block {
        self.slots[id].as_mut().expect("block id refers to a live slot")
    }

    fn store(&mut self, block: Block) -> BlockId {
        self.len += 1;

        match self.vacant.pop() {
            Some(id) => {
                self.slots[id] = Some(block);
                id
            }
            None => {
                self.slots.push(Some(block));
                self.slots.len() - 1
            }
        }
    }

    /// Appends `block` at the tail of the table.
    pub fn push_back(&mut self, mut block: Block) -> BlockId {
        block.next = None;
        let id = self.store(block);

        match self.tail {
            Some(tail) => self.get_mut(tail).next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);

        id
    }

    /// Splices `block` right after `prev` in table order.
    pub fn insert_after(&mut self, prev: BlockId, mut block: Block) -> BlockId {
        block.next = self.get(prev).next;
        let id = self.store(block);

        self.get_mut(prev).next = Some(id);
        if self.tail == Some(prev) {
            self.tail = Some(id);
        }

        id
    }

    /// Removes the successor of `prev` from the table and returns it.
    pub fn unlink_next(&mut self, prev: BlockId) -> Option<Block> {
        let id = self.get(prev).next?;
        let removed = self.slots[id].take()?;

        self.get_mut(prev).next = removed.next;
        if self.tail == Some(id) {
            self.tail = Some(prev);
        }

        self.vacant.push(id);
        self.len -= 1;

        Some(removed)
    }

    /// Iterates over `(id, block)` pairs in table order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            table: self,
            cursor: self.head,
        }
    }
}

pub struct Iter<'a> {
    table: &'a BlockTable,
    cursor: Option<BlockId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (BlockId, &'a Block);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let block = self.table.get(id);
        self.cursor = block.next;
        Some((id, block))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offsets(table: &BlockTable) -> Vec<usize> {
        table.iter().map(|(_, b)| b.offset).collect()
    }

    #[test]
    fn push_back_keeps_creation_order() {
        let mut table = BlockTable::new();
        table.push_back(Block::free(0, 0, 64));
        table.push_back(Block::free(1, 0, 128));

        assert_eq!(table.len(), 2);
        let chunks: Vec<usize> = table.iter().map(|(_, b)| b.chunk).collect();
        assert_eq!(chunks, [0, 1]);
    }

    #[test]
    fn insert_after_splices_in_place() {
        let mut table = BlockTable::new();
        let first = table.push_back(Block::free(0, 0, 32));
        table.push_back(Block::free(0, 96, 32));

        table.insert_after(first, Block::free(0, 32, 64));
        assert_eq!(offsets(&table), [0, 32, 96]);

        // inserting after the tail moves the tail
        let last = table.iter().last().unwrap().0;
        table.insert_after(last, Block::free(0, 128, 8));
        table.push_back(Block::free(1, 0, 8));
        assert_eq!(offsets(&table), [0, 32, 96, 128, 0]);
    }

    #[test]
    fn unlink_next_recycles_slots() {
        let mut table = BlockTable::new();
        let first = table.push_back(Block::free(0, 0, 32));
        let second = table.push_back(Block::free(0, 32, 32));

        let removed = table.unlink_next(first).unwrap();
        assert_eq!(removed.offset, 32);
        assert_eq!(table.len(), 1);
        assert!(table.unlink_next(first).is_none());

        // the tail moved back to `first`, so the next push links after it
        let third = table.push_back(Block::free(1, 0, 16));
        assert_eq!(third, second);
        assert_eq!(offsets(&table), [0, 0]);
        assert_eq!(table.get(first).next(), Some(third));
    }
}
