use std::fmt;

/// A simple type for integer ranges
///
/// All ranges follow the bed file range convention: 0-indexed, half-closed, [start,end)
///
/// In breakpoint clustering this is mostly used to track the span of breakpoint positions observed
/// over all members of a cluster, so that the last observed position is `end - 1`.
///
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct IntRange {
    pub start: i64,
    pub end: i64,
}

impl IntRange {
    pub fn from_int(start: i64) -> Self {
        Self {
            start,
            end: start + 1,
        }
    }

    #[cfg(test)]
    pub fn from_pair(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn size(&self) -> i64 {
        self.end - self.start
    }

    /// Last position included in the range
    pub fn last(&self) -> i64 {
        self.end - 1
    }

    /// Distance between the first and last positions in the range
    ///
    /// This is zero for a range built from a single position.
    ///
    pub fn span(&self) -> i64 {
        self.size() - 1
    }

    /// Return true if pos intersects range (adjacency does not count)
    ///
    pub fn intersect_pos(&self, pos: i64) -> bool {
        pos >= self.start && pos < self.end
    }

    /// Return a copy of the range extended as required to include `pos`
    ///
    pub fn including_pos(&self, pos: i64) -> Self {
        Self {
            start: std::cmp::min(self.start, pos),
            end: std::cmp::max(self.end, pos + 1),
        }
    }
}

impl fmt::Debug for IntRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}-{})", self.start, self.end)
    }
}
