//! Prefix cardinality sampler.
//!
//! Reads the first `max_rows` data rows into a fixed-capacity `SampleBuffer`
//! and counts distinct values per column along the way. Each column's distinct
//! set stops growing (and is released) as soon as it passes the dictionary
//! threshold, so sampling memory is bounded by the buffered rows.
//!
//! A prefix sample is biased toward whatever the head of the file looks like.
//! The verdict is final: a column that looked low-cardinality in the prefix
//! stays dictionary-eligible even if later rows disagree.

use std::collections::{HashSet, VecDeque};

use tabpq_core::config::DEFAULT_SAMPLE_ROWS;
use tabpq_core::error::{Error, Result};
use tabpq_core::row::Row;
use tabpq_core::source::RowSource;

/// Fixed-capacity FIFO of sampled rows, drained in read order during replay.
#[derive(Debug)]
pub struct SampleBuffer {
    rows: VecDeque<Row>,
    capacity: usize,
}

impl SampleBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: VecDeque::with_capacity(capacity.min(DEFAULT_SAMPLE_ROWS)),
            capacity,
        }
    }

    /// Append a row. Pushing into a full buffer is an invariant violation.
    pub fn push(&mut self, row: Row) -> Result<()> {
        if self.is_full() {
            return Err(Error::Invariant(format!(
                "sample buffer full ({} rows)",
                self.capacity
            )));
        }
        self.rows.push_back(row);
        Ok(())
    }

    /// Oldest buffered row, if any. The row leaves the buffer.
    pub fn pop_front(&mut self) -> Option<Row> {
        self.rows.pop_front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.rows.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Distinct values seen for one column during sampling.
#[derive(Debug, Clone)]
pub struct ColumnProfile {
    name: String,
    forced: bool,
    max_distinct: usize,
    distinct: HashSet<String>,
    distinct_count: usize,
}

impl ColumnProfile {
    pub fn new(name: impl Into<String>, max_distinct: usize, forced: bool) -> Self {
        Self {
            name: name.into(),
            forced,
            max_distinct,
            distinct: HashSet::new(),
            distinct_count: 0,
        }
    }

    pub fn observe(&mut self, value: &str) {
        if self.is_saturated() || self.distinct.contains(value) {
            return;
        }
        self.distinct.insert(value.to_owned());
        self.distinct_count += 1;
        if self.is_saturated() {
            // Past the threshold the exact set no longer matters.
            self.distinct = HashSet::new();
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_forced(&self) -> bool {
        self.forced
    }

    /// Distinct values observed, capped at `max_distinct + 1`.
    pub fn distinct_count(&self) -> usize {
        self.distinct_count
    }

    /// More distinct values than the threshold were observed.
    pub fn is_saturated(&self) -> bool {
        self.distinct_count > self.max_distinct
    }

    pub fn should_dictionary(&self) -> bool {
        self.forced || !self.is_saturated()
    }
}

/// Result of sampling: the buffered prefix plus one profile per column.
#[derive(Debug)]
pub struct Sample {
    pub buffer: SampleBuffer,
    pub profiles: Vec<ColumnProfile>,
}

impl Sample {
    pub fn verdicts(&self) -> Vec<bool> {
        self.profiles.iter().map(ColumnProfile::should_dictionary).collect()
    }
}

/// Read up to `max_rows` rows from `source`, buffering them and profiling
/// each column. Stops early at end of input. `forced` names are matched
/// case-sensitively against `columns`.
pub fn sample<S: RowSource>(
    source: &mut S,
    columns: &[String],
    max_rows: usize,
    max_distinct: usize,
    forced: &[String],
) -> Result<Sample> {
    let mut profiles: Vec<ColumnProfile> = columns
        .iter()
        .map(|name| ColumnProfile::new(name.as_str(), max_distinct, forced.contains(name)))
        .collect();
    let mut buffer = SampleBuffer::with_capacity(max_rows);

    while !buffer.is_full() {
        let Some(row) = source.next_row()? else {
            break;
        };
        if row.len() != profiles.len() {
            return Err(Error::MalformedRecord {
                row: source.rows_read(),
                reason: format!("found {} fields, expected {}", row.len(), profiles.len()),
            });
        }
        for (profile, value) in profiles.iter_mut().zip(row.fields()) {
            profile.observe(value);
        }
        buffer.push(row)?;
    }

    Ok(Sample { buffer, profiles })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabpq_core::source::VecRowSource;

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|s| s.to_string()).collect()
    }

    fn rows(n: usize, f: impl Fn(usize) -> Vec<String>) -> VecRowSource {
        VecRowSource::new((0..n).map(|i| Row::new(f(i))).collect())
    }

    #[test]
    fn buffer_rejects_push_past_capacity() {
        let mut buf = SampleBuffer::with_capacity(2);
        buf.push(["a"].into_iter().collect()).unwrap();
        buf.push(["b"].into_iter().collect()).unwrap();
        assert!(buf.is_full());
        let err = buf.push(["c"].into_iter().collect()).unwrap_err();
        assert!(matches!(err, Error::Invariant(_)));
        assert_eq!(buf.pop_front().unwrap().get(0), Some("a"));
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn short_input_is_fully_buffered() {
        let mut src = rows(5, |i| vec![i.to_string()]);
        let s = sample(&mut src, &names(&["n"]), 8192, 16, &[]).unwrap();
        assert_eq!(s.buffer.len(), 5);
        assert!(src.next_row().unwrap().is_none());
    }

    #[test]
    fn sampling_stops_at_max_rows() {
        let mut src = rows(10, |i| vec![i.to_string()]);
        let s = sample(&mut src, &names(&["n"]), 4, 16, &[]).unwrap();
        assert_eq!(s.buffer.len(), 4);
        assert_eq!(src.rows_read(), 4);
        // The fifth row is still in the source.
        assert_eq!(src.next_row().unwrap().unwrap().get(0), Some("4"));
    }

    #[test]
    fn threshold_is_inclusive() {
        let mut src = rows(100, |i| vec![(i % 16).to_string(), (i % 17).to_string()]);
        let s = sample(&mut src, &names(&["sixteen", "seventeen"]), 8192, 16, &[]).unwrap();
        assert_eq!(s.profiles[0].distinct_count(), 16);
        assert!(s.profiles[0].should_dictionary());
        assert_eq!(s.profiles[1].distinct_count(), 17);
        assert!(s.profiles[1].is_saturated());
        assert_eq!(s.verdicts(), vec![true, false]);
    }

    #[test]
    fn distinct_count_is_capped() {
        let mut src = rows(1000, |i| vec![i.to_string()]);
        let s = sample(&mut src, &names(&["id"]), 8192, 16, &[]).unwrap();
        assert_eq!(s.profiles[0].distinct_count(), 17);
    }

    #[test]
    fn forced_column_wins_over_cardinality() {
        let mut src = rows(100, |i| vec![i.to_string(), i.to_string()]);
        let forced = names(&["b"]);
        let s = sample(&mut src, &names(&["a", "b"]), 8192, 16, &forced).unwrap();
        assert!(!s.profiles[0].is_forced());
        assert!(s.profiles[1].is_forced());
        assert_eq!(s.verdicts(), vec![false, true]);
    }

    #[test]
    fn forced_match_is_case_sensitive() {
        let mut src = rows(100, |i| vec![i.to_string()]);
        let s = sample(&mut src, &names(&["Name"]), 8192, 16, &names(&["name"])).unwrap();
        assert_eq!(s.verdicts(), vec![false]);
    }

    #[test]
    fn late_cardinality_is_not_seen() {
        // 20 rows of one value, then 50 distinct ones past the sample window.
        let mut src = rows(70, |i| {
            vec![if i < 20 { "same".to_string() } else { format!("v{i}") }]
        });
        let s = sample(&mut src, &names(&["c"]), 20, 16, &[]).unwrap();
        assert_eq!(s.verdicts(), vec![true]);
    }

    #[test]
    fn wrong_width_row_is_malformed() {
        let mut src = VecRowSource::new(vec![
            ["1", "a"].into_iter().collect(),
            ["2"].into_iter().collect(),
        ]);
        let err = sample(&mut src, &names(&["n", "s"]), 8192, 16, &[]).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { row: 2, .. }));
    }

    #[test]
    fn empty_input_yields_empty_profiles() {
        let mut src = VecRowSource::new(Vec::new());
        let s = sample(&mut src, &names(&["a"]), 8192, 16, &[]).unwrap();
        assert!(s.buffer.is_empty());
        assert_eq!(s.profiles[0].distinct_count(), 0);
        assert!(s.profiles[0].should_dictionary());
    }
}
