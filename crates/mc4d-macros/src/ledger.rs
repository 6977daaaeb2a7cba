//! Move ledger - the moves of one macro plus a playback cursor
//!
//! Appends always land at the end; the cursor only moves during playback.

use crate::codec::{FormatError, LineReader};
use crate::moves::MoveRecord;
use mc4d_core::{Error, Grip, GripGeometry, Result};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoveLedger {
    records: Vec<MoveRecord>,
    /// Always within `0..=records.len()`.
    #[serde(skip)]
    cursor: usize,
}

impl MoveLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: MoveRecord) {
        self.records.push(record);
    }

    /// Drops the newest record, e.g. when the user undoes a twist mid-recording.
    pub fn pop(&mut self) -> Option<MoveRecord> {
        let record = self.records.pop()?;
        self.cursor = self.cursor.min(self.records.len());
        Some(record)
    }

    /// Record under the cursor, advancing it. `None` once the end is reached.
    pub fn next(&mut self) -> Option<MoveRecord> {
        let record = *self.records.get(self.cursor)?;
        self.cursor += 1;
        Some(record)
    }

    /// Steps the cursor back and returns the record it passed over.
    pub fn prev(&mut self) -> Option<MoveRecord> {
        self.cursor = self.cursor.checked_sub(1)?;
        Some(self.records[self.cursor])
    }

    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    pub fn seek_end(&mut self) {
        self.cursor = self.records.len();
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[MoveRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MoveRecord> {
        self.records.iter()
    }

    /// Count line, then one record per line.
    pub fn dump<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "{}", self.records.len())?;
        for record in &self.records {
            writeln!(w, "{}", record)?;
        }
        Ok(())
    }

    /// Inverse of [`MoveLedger::dump`]. Every record is checked against
    /// `geometry`; the first bad line aborts the parse.
    pub fn parse<R: BufRead>(
        lines: &mut LineReader<R>,
        geometry: &dyn GripGeometry,
    ) -> Result<Self> {
        let count = lines.next_count("move count")?;
        let mut records = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            records.push(parse_record(lines, geometry)?);
        }
        Ok(Self { records, cursor: 0 })
    }
}

impl<'a> IntoIterator for &'a MoveLedger {
    type Item = &'a MoveRecord;
    type IntoIter = std::slice::Iter<'a, MoveRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn parse_record<R: BufRead>(
    lines: &mut LineReader<R>,
    geometry: &dyn GripGeometry,
) -> Result<MoveRecord> {
    let [g0, g1, g2, g3, direction, slices] = lines.next_fields::<i64, 6>("move")?;
    let narrow = |v: i64, what: &'static str| {
        i32::try_from(v).map_err(|_| {
            lines.error(FormatError::BadToken {
                token: v.to_string(),
                what,
            })
        })
    };
    let coords = [
        narrow(g0, "grip coordinate")?,
        narrow(g1, "grip coordinate")?,
        narrow(g2, "grip coordinate")?,
        narrow(g3, "grip coordinate")?,
    ];
    let direction = narrow(direction, "direction")?;
    let slices = u32::try_from(slices).map_err(|_| {
        lines.error(FormatError::BadToken {
            token: slices.to_string(),
            what: "slices mask",
        })
    })?;
    if !geometry.is_valid_grip(&coords) {
        return Err(lines.error(FormatError::Invalid(format!(
            "{:?} is not a grip on this puzzle",
            coords
        ))));
    }
    MoveRecord::new(Grip::new(coords), direction, slices)
        .map_err(|e| Error::malformed(lines.line(), &e.message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc4d_core::{ErrorCode, HypercubeGeometry};

    fn record(coords: [i32; 4], direction: i32, slices: u32) -> MoveRecord {
        MoveRecord::new(Grip::new(coords), direction, slices).unwrap()
    }

    fn sample() -> MoveLedger {
        let mut ledger = MoveLedger::new();
        ledger.append(record([3, 0, 0, 0], 1, 1));
        ledger.append(record([0, -3, 2, 0], -1, 3));
        ledger.append(record([0, 0, 2, 3], 1, 4));
        ledger
    }

    #[test]
    fn next_walks_to_the_end() {
        let mut ledger = sample();
        assert_eq!(ledger.next().unwrap().grip.coords, [3, 0, 0, 0]);
        assert_eq!(ledger.next().unwrap().direction, -1);
        assert_eq!(ledger.next().unwrap().slices, 4);
        assert!(ledger.next().is_none());
        assert!(ledger.next().is_none());
        assert_eq!(ledger.cursor(), 3);

        ledger.rewind();
        assert_eq!(ledger.next().unwrap().grip.coords, [3, 0, 0, 0]);
    }

    #[test]
    fn prev_walks_backwards_from_the_end() {
        let mut ledger = sample();
        ledger.seek_end();
        assert_eq!(ledger.prev().unwrap().slices, 4);
        assert_eq!(ledger.prev().unwrap().slices, 3);
        assert_eq!(ledger.prev().unwrap().slices, 1);
        assert!(ledger.prev().is_none());
        assert_eq!(ledger.cursor(), 0);
    }

    #[test]
    fn pop_keeps_cursor_in_range() {
        let mut ledger = sample();
        ledger.seek_end();
        assert_eq!(ledger.pop().unwrap().slices, 4);
        assert_eq!(ledger.cursor(), 2);
        assert!(ledger.next().is_none());
    }

    #[test]
    fn dump_then_parse() {
        let ledger = sample();
        let mut out = Vec::new();
        ledger.dump(&mut out).unwrap();
        let text = String::from_utf8(out.clone()).unwrap();
        assert_eq!(text, "3\n3 0 0 0 1 1\n0 -3 2 0 -1 3\n0 0 2 3 1 4\n");

        let mut lines = LineReader::new(out.as_slice());
        let parsed = MoveLedger::parse(&mut lines, &HypercubeGeometry::default()).unwrap();
        assert_eq!(parsed.records(), ledger.records());
        assert_eq!(parsed.cursor(), 0);
    }

    #[test]
    fn parse_rejects_bad_lines() {
        let geometry = HypercubeGeometry::default();
        let cases = [
            ("2\n3 0 0 0 1 1\n", "unexpected end"),
            ("1\n3 0 0 0 1\n", "expected 6 fields"),
            ("1\n3 0 0 0 one 1\n", "'one'"),
            ("1\n3 3 0 0 1 1\n", "not a grip"),
            ("1\n3 0 0 0 0 1\n", "direction"),
            ("1\n3 0 0 0 1 -1\n", "slices mask"),
            ("1\n-2147483648 0 0 0 1 1\n", "not a grip"),
            ("1\n3 2147483647 0 0 1 1\n", "not a grip"),
            ("1\n3 0 0 0 -2147483648 1\n", "out of range"),
            ("1\n3 0 0 0 2147483648 1\n", "direction"),
            ("x\n", "move count"),
        ];
        for (text, needle) in cases {
            let mut lines = LineReader::new(text.as_bytes());
            let err = MoveLedger::parse(&mut lines, &geometry).unwrap_err();
            assert_eq!(err.code, ErrorCode::MalformedStream, "{}", text);
            assert!(err.message.contains(needle), "{} -> {}", text, err.message);
        }
    }
}
