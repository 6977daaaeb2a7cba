//! A named macro: reference stickers plus the moves recorded against them
//!
//! Moves are stored exactly as they were made, in the frame fixed by the
//! reference stickers at creation time. Replay re-expresses them in whatever
//! frame the host's current reference stickers describe.

use crate::codec::LineReader;
use crate::ledger::MoveLedger;
use crate::moves::{MoveRecord, PlayDirection};
use mc4d_core::{Error, Grip, GripGeometry, ReferenceFrame, Reorientation, Result, Vec4, MAXREFS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// Opaque value the host attaches to a macro (a menu item, a button id).
/// Never interpreted here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UiHandle(pub u64);

impl fmt::Display for UiHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ui:{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Macro {
    name: String,
    frame: ReferenceFrame,
    moves: MoveLedger,
    ui_handle: Option<UiHandle>,
    geometry: Arc<dyn GripGeometry>,
}

impl Macro {
    /// Fails with `INVALID_GRIP` unless every reference is a sticker of
    /// `geometry`, and with `DEGENERATE_FRAME` unless they are independent.
    pub fn new(
        name: impl Into<String>,
        refs: [Vec4; MAXREFS],
        geometry: Arc<dyn GripGeometry>,
    ) -> Result<Self> {
        Ok(Self {
            name: sanitize(&name.into()),
            frame: ReferenceFrame::checked(refs, &*geometry)?,
            moves: MoveLedger::new(),
            ui_handle: None,
            geometry,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = sanitize(&name.into());
    }

    pub fn frame(&self) -> &ReferenceFrame {
        &self.frame
    }

    /// Replaces the reference stickers. Recorded moves are kept as-is.
    pub fn set_refs(&mut self, refs: [Vec4; MAXREFS]) -> Result<()> {
        self.frame = ReferenceFrame::checked(refs, &*self.geometry)?;
        Ok(())
    }

    pub fn ui_handle(&self) -> Option<UiHandle> {
        self.ui_handle
    }

    pub fn set_ui_handle(&mut self, handle: Option<UiHandle>) {
        self.ui_handle = handle;
    }

    pub fn geometry(&self) -> &dyn GripGeometry {
        &*self.geometry
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn moves(&self) -> &MoveLedger {
        &self.moves
    }

    /// Appends a move in this macro's own frame.
    pub fn record_move(&mut self, grip: Grip, direction: i32, slices: u32) -> Result<()> {
        if !self.geometry.is_valid_grip(&grip.coords) {
            return Err(Error::invalid_grip(&grip.coords));
        }
        self.moves.append(MoveRecord::new(grip, direction, slices)?);
        Ok(())
    }

    /// Takes back the newest recorded move.
    pub fn remove_last_move(&mut self) -> Option<MoveRecord> {
        self.moves.pop()
    }

    /// Next move re-expressed through `reorientation`, or `None` once the
    /// ledger is exhausted in the chosen direction.
    ///
    /// `reorientation.matrix` carries current references onto recorded
    /// ones, so recorded grips travel back through its inverse. A
    /// reflection (`det == -1`) reverses every turn, and so does playing in
    /// reverse.
    pub fn play_move(
        &mut self,
        direction: PlayDirection,
        reorientation: &Reorientation,
    ) -> Option<MoveRecord> {
        let record = match direction {
            PlayDirection::Forward => self.moves.next()?,
            PlayDirection::Reverse => self.moves.prev()?,
        };
        Some(to_current(&record, reorientation, direction))
    }

    pub fn goto_beginning(&mut self) {
        self.moves.rewind();
    }

    pub fn goto_end(&mut self) {
        self.moves.seek_end();
    }

    /// The symmetry taking `current` onto this macro's recorded references.
    pub fn compute_reorientation(&self, current: &ReferenceFrame) -> Result<Reorientation> {
        self.frame.reorientation_from(current, &*self.geometry)
    }

    /// Every move of the macro expressed relative to `current`, in play
    /// order. Leaves the playback cursor alone.
    pub fn replay_all(
        &self,
        current: &ReferenceFrame,
        direction: PlayDirection,
    ) -> Result<Vec<MoveRecord>> {
        let reorientation = self.compute_reorientation(current)?;
        let mut out: Vec<MoveRecord> = self
            .moves
            .iter()
            .map(|m| to_current(m, &reorientation, direction))
            .collect();
        if direction == PlayDirection::Reverse {
            out.reverse();
        }
        Ok(out)
    }

    /// Name line, three reference lines, then the ledger.
    pub fn dump<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "{}", self.name)?;
        for r in self.frame.refs() {
            writeln!(w, "{} {} {} {}", r[0], r[1], r[2], r[3])?;
        }
        self.moves.dump(w)
    }

    /// Parses one macro written by [`Macro::dump`]. Nothing is built unless
    /// the whole macro parses.
    pub fn read<R: BufRead>(
        lines: &mut LineReader<R>,
        geometry: Arc<dyn GripGeometry>,
    ) -> Result<Self> {
        let name = lines.next_line("macro name")?.to_owned();
        let mut refs = [[0; 4]; MAXREFS];
        for r in refs.iter_mut() {
            *r = lines.next_vec4("reference sticker")?;
        }
        let frame = ReferenceFrame::checked(refs, &*geometry)
            .map_err(|e| Error::malformed(lines.line(), &e.message))?;
        let moves = MoveLedger::parse(lines, &*geometry)?;
        Ok(Self {
            name: sanitize(&name),
            frame,
            moves,
            ui_handle: None,
            geometry,
        })
    }

    /// Convenience for reading a single macro from a standalone stream.
    pub fn from_reader<R: BufRead>(reader: R, geometry: Arc<dyn GripGeometry>) -> Result<Self> {
        Self::read(&mut LineReader::new(reader), geometry)
    }
}

fn to_current(record: &MoveRecord, r: &Reorientation, direction: PlayDirection) -> MoveRecord {
    MoveRecord {
        grip: record.grip.transformed(&r.matrix.transpose()),
        direction: record
            .direction
            .saturating_mul(r.det)
            .saturating_mul(direction.sign()),
        slices: record.slices,
    }
}

/// Names live on one line of the macro file.
fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}
