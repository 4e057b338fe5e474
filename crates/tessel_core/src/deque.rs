// deque.rs - Chunked double-ended numeric queue
//
// Elements live in a list of fixed-capacity chunks addressed by a head and
// a tail cursor. Each end keeps at most one spare, fully consumed chunk so
// alternating push/pop at a chunk boundary does not allocate every time.

use crate::config::{StorageConfig, DEFAULT_CHUNK_CAPACITY};
use crate::numeric::Numeric;
use std::collections::VecDeque;
use std::fmt;

/// Double-ended queue of numeric values stored in fixed-size chunks.
///
/// Chunks are allocated lazily: a new or cleared deque owns none.
pub struct Deque<T: Numeric> {
    chunks: VecDeque<Box<[T]>>,
    chunk_capacity: usize,
    head_chunk: usize,
    head_index: usize,
    tail_chunk: usize,
    tail_index: usize,
    count: usize,
}

impl<T: Numeric> Deque<T> {
    pub fn new() -> Self {
        Self::with_chunk_capacity(DEFAULT_CHUNK_CAPACITY)
    }

    /// # Panics
    /// Panics if `chunk_capacity` is zero.
    pub fn with_chunk_capacity(chunk_capacity: usize) -> Self {
        assert!(chunk_capacity > 0, "chunk capacity must be greater than zero");
        Self {
            chunks: VecDeque::new(),
            chunk_capacity,
            head_chunk: 0,
            head_index: 0,
            tail_chunk: 0,
            tail_index: 0,
            count: 0,
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::with_chunk_capacity(config.deque_chunk_capacity)
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn chunk_capacity(&self) -> usize {
        self.chunk_capacity
    }

    /// Chunks currently allocated, spares included.
    #[inline]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    fn new_chunk(&self) -> Box<[T]> {
        tracing::trace!(chunk_capacity = self.chunk_capacity, "allocating deque chunk");
        vec![T::default(); self.chunk_capacity].into_boxed_slice()
    }

    /// Append at the back.
    pub fn push(&mut self, value: T) {
        if self.chunks.is_empty() {
            let chunk = self.new_chunk();
            self.chunks.push_back(chunk);
            self.reset_cursors(0);
        } else if self.tail_index == self.chunk_capacity {
            if self.tail_chunk == self.chunks.len() - 1 {
                let chunk = self.new_chunk();
                self.chunks.push_back(chunk);
            }
            self.tail_chunk += 1;
            self.tail_index = 0;
        }

        self.chunks[self.tail_chunk][self.tail_index] = value;
        self.tail_index += 1;
        self.count += 1;
    }

    /// Prepend at the front.
    pub fn unshift(&mut self, value: T) {
        if self.chunks.is_empty() {
            let chunk = self.new_chunk();
            self.chunks.push_back(chunk);
            self.reset_cursors(self.chunk_capacity);
        } else if self.head_index == 0 {
            if self.head_chunk == 0 {
                let chunk = self.new_chunk();
                self.chunks.push_front(chunk);
                self.tail_chunk += 1;
            } else {
                self.head_chunk -= 1;
            }
            self.head_index = self.chunk_capacity;
        }

        self.head_index -= 1;
        self.chunks[self.head_chunk][self.head_index] = value;
        self.count += 1;
    }

    /// Remove from the front.
    pub fn shift(&mut self) -> Option<T> {
        if self.count == 0 {
            return None;
        }
        let value = self.chunks[self.head_chunk][self.head_index];
        self.head_index += 1;
        self.count -= 1;

        if self.head_index == self.chunk_capacity {
            if self.head_chunk == 0 {
                // keep the consumed chunk as the front spare
                self.head_chunk += 1;
            } else {
                // a second consumed chunk: drop the older one, head stays at index 1
                tracing::trace!("releasing front deque chunk");
                self.chunks.pop_front();
                self.tail_chunk -= 1;
            }
            self.head_index = 0;
        }
        Some(value)
    }

    /// Remove from the back.
    pub fn pop(&mut self) -> Option<T> {
        if self.count == 0 {
            return None;
        }
        if self.tail_index == 0 {
            if self.tail_chunk + 2 == self.chunks.len() {
                tracing::trace!("releasing back deque chunk");
                self.chunks.pop_back();
            }
            self.tail_chunk -= 1;
            self.tail_index = self.chunk_capacity;
        }

        self.tail_index -= 1;
        self.count -= 1;
        Some(self.chunks[self.tail_chunk][self.tail_index])
    }

    pub fn front(&self) -> Option<T> {
        if self.count == 0 {
            return None;
        }
        Some(self.chunks[self.head_chunk][self.head_index])
    }

    pub fn back(&self) -> Option<T> {
        if self.count == 0 {
            return None;
        }
        if self.tail_index > 0 {
            Some(self.chunks[self.tail_chunk][self.tail_index - 1])
        } else {
            Some(self.chunks[self.tail_chunk - 1][self.chunk_capacity - 1])
        }
    }

    /// Element `index` positions from the front.
    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.count {
            return None;
        }
        let offset = self.head_index + index;
        let chunk = self.head_chunk + offset / self.chunk_capacity;
        Some(self.chunks[chunk][offset % self.chunk_capacity])
    }

    /// Front-to-back iterator.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = T> + '_ {
        (0..self.count).filter_map(move |index| self.get(index))
    }

    /// Drop every chunk and reset the cursors.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.reset_cursors(0);
        self.count = 0;
    }

    fn reset_cursors(&mut self, index: usize) {
        self.head_chunk = 0;
        self.tail_chunk = 0;
        self.head_index = index;
        self.tail_index = index;
    }
}

impl<T: Numeric> Default for Deque<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Numeric> fmt::Debug for Deque<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Numeric> Extend<T> for Deque<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<T: Numeric> FromIterator<T> for Deque<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut deque = Self::new();
        deque.extend(iter);
        deque
    }
}
