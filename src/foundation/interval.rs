use crate::foundation::{
    core::Interval,
    error::{LayerError, LayerResult},
};

/// Maps a query time to the interval that contains it.
///
/// Intervals are kept in construction order. When several intervals contain the
/// query time, the first one in construction order wins. Tables that are sorted by
/// start and pairwise disjoint (the common case, e.g. contiguous sequences) are
/// answered with a binary search; anything else falls back to a linear scan.
#[derive(Clone, Debug, Default)]
pub struct IntervalIndex {
    intervals: Vec<Interval>,
    sorted_disjoint: bool,
}

impl IntervalIndex {
    pub fn new(intervals: Vec<Interval>) -> Self {
        let sorted_disjoint = intervals
            .windows(2)
            .all(|w| w[0].start <= w[1].start && w[0].end <= w[1].start);
        Self {
            intervals,
            sorted_disjoint,
        }
    }

    /// Build from parallel start/end tables.
    pub fn from_bounds(starts: &[f64], ends: &[f64]) -> LayerResult<Self> {
        if starts.len() != ends.len() {
            return Err(LayerError::validation(format!(
                "start/end tables differ in length ({} vs {})",
                starts.len(),
                ends.len()
            )));
        }
        let intervals = starts
            .iter()
            .zip(ends)
            .map(|(&s, &e)| Interval::new(s, e))
            .collect::<LayerResult<Vec<_>>>()?;
        Ok(Self::new(intervals))
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Latest end across all intervals, or `0.0` when empty.
    pub fn max_end(&self) -> f64 {
        self.intervals.iter().map(|iv| iv.end).fold(0.0, f64::max)
    }

    pub fn lookup(&self, t: f64) -> Option<usize> {
        if t.is_nan() {
            return None;
        }
        if self.sorted_disjoint {
            // Last interval whose start is <= t.
            let idx = self.intervals.partition_point(|iv| iv.start <= t);
            let idx = idx.checked_sub(1)?;
            return self.intervals[idx].contains(t).then_some(idx);
        }
        self.intervals.iter().position(|iv| iv.contains(t))
    }
}
