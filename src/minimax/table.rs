//! Fixed-size transposition table.
//!
//! One slot per index, addressed by the low bits of the Zobrist key and
//! always overwritten. Collisions are caught by comparing the full key.

/// How a stored value relates to the true value of the position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact,
    /// The true value is at least the stored value (fail high).
    Lower,
    /// The true value is at most the stored value (fail low).
    Upper,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Entry {
    pub key: u64,
    pub value: f32,
    /// Remaining depth the value was searched to; -1 marks an empty slot.
    pub depth: i32,
    pub bound: Bound,
}

impl Entry {
    const EMPTY: Entry = Entry {
        key: 0,
        value: 0.0,
        depth: -1,
        bound: Bound::Exact,
    };

    /// Value usable for a search of `depth` with window `(alpha, beta)`.
    #[must_use]
    pub fn usable(&self, depth: i32, alpha: f32, beta: f32) -> Option<f32> {
        if self.depth < depth {
            return None;
        }
        let hit = match self.bound {
            Bound::Exact => true,
            Bound::Lower => self.value >= beta,
            Bound::Upper => self.value <= alpha,
        };
        hit.then_some(self.value)
    }
}

#[derive(Clone, Debug)]
pub struct TranspositionTable {
    entries: Vec<Entry>,
    mask: u64,
}

impl TranspositionTable {
    /// Table with `2^size_log2` slots.
    pub fn new(size_log2: u32) -> Self {
        let size = 1usize << size_log2.min(40);
        Self {
            entries: vec![Entry::EMPTY; size],
            mask: size as u64 - 1,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry stored under exactly this key.
    #[must_use]
    pub fn probe(&self, key: u64) -> Option<&Entry> {
        let entry = &self.entries[(key & self.mask) as usize];
        (entry.depth >= 0 && entry.key == key).then_some(entry)
    }

    pub fn store(&mut self, key: u64, value: f32, depth: i32, bound: Bound) {
        self.entries[(key & self.mask) as usize] = Entry {
            key,
            value,
            depth,
            bound,
        };
    }

    pub fn clear(&mut self) {
        self.entries.fill(Entry::EMPTY);
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn occupied(&self) -> usize {
        self.entries.iter().filter(|e| e.depth >= 0).count()
    }
}
