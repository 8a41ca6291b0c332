//! Least Recently Used (LRU) Cache Set.
//!
//! One set of a set-associative cache, kept as a recency stack: index 0 is the
//! most recently used line and the last index is the least recently used.
//! Every hit, insertion or dirty update moves the line to the top.
//!
//! Lines invalidated by a snoop stay in place as tombstones. They never hit,
//! and the next insertion into a full set reuses a tombstone before evicting
//! the true LRU line.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `find()`: O(W) where W is the number of ways (associativity)
//!   - `touch_to_front()` / `insert()`: O(W) for the stack shift
//! - **Space Complexity:** O(W) per set, allocated lazily as lines are filled

/// Cache line entry containing tag, validity, and dirty bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheLine {
    /// Address tag identifying the block within its set.
    pub tag: u64,
    /// `false` once the line has been snooped out.
    pub valid: bool,
    /// Modified since it was filled; must be written back before discard.
    pub dirty: bool,
}

/// A single set: at most `ways` lines in MRU-to-LRU order.
#[derive(Debug, Clone)]
pub struct CacheSet {
    lines: Vec<CacheLine>,
    ways: usize,
}

impl CacheSet {
    /// Creates an empty set with room for `ways` lines.
    pub const fn new(ways: usize) -> Self {
        Self {
            lines: Vec::new(),
            ways,
        }
    }

    /// Position of the valid line holding `tag`, if any.
    pub fn find(&self, tag: u64) -> Option<usize> {
        self.lines.iter().position(|l| l.valid && l.tag == tag)
    }

    /// Moves the valid line holding `tag` to the MRU position, OR-ing
    /// `merge_dirty` into its dirty bit.
    ///
    /// Returns `false` (and changes nothing) if no valid line matches.
    pub fn touch_to_front(&mut self, tag: u64, merge_dirty: bool) -> bool {
        let Some(pos) = self.find(tag) else {
            return false;
        };
        let mut line = self.lines.remove(pos);
        line.dirty |= merge_dirty;
        self.lines.insert(0, line);
        true
    }

    /// Installs a valid line for `tag` at the MRU position.
    ///
    /// Fills an empty way if one exists, otherwise overwrites the first
    /// invalidated line, otherwise evicts the LRU line. Only the last case
    /// displaces live data, and that line is returned. Inserting a tag that is
    /// already resident refreshes it instead of duplicating it.
    pub fn insert(&mut self, tag: u64, is_write: bool) -> Option<CacheLine> {
        if self.touch_to_front(tag, is_write) {
            return None;
        }

        let line = CacheLine {
            tag,
            valid: true,
            dirty: is_write,
        };

        if self.lines.len() < self.ways {
            self.lines.insert(0, line);
            return None;
        }

        if let Some(pos) = self.lines.iter().position(|l| !l.valid) {
            let _ = self.lines.remove(pos);
            self.lines.insert(0, line);
            return None;
        }

        let victim = self.lines.pop();
        self.lines.insert(0, line);
        victim
    }

    /// Marks the valid line holding `tag` invalid, leaving it in place.
    ///
    /// Returns the line as it was before invalidation.
    pub fn invalidate(&mut self, tag: u64) -> Option<CacheLine> {
        let pos = self.find(tag)?;
        let before = self.lines[pos];
        self.lines[pos].valid = false;
        Some(before)
    }

    /// The valid line holding `tag`, if any.
    pub fn get(&self, tag: u64) -> Option<&CacheLine> {
        self.find(tag).map(|pos| &self.lines[pos])
    }

    /// Lines in recency order, MRU first. Includes tombstones.
    pub fn lines(&self) -> &[CacheLine] {
        &self.lines
    }

    /// Number of occupied ways, tombstones included.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// `true` if no way has ever been filled.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Associativity of the set.
    pub const fn ways(&self) -> usize {
        self.ways
    }
}
