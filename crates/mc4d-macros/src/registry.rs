//! Macro registry - owns every macro and brokers recording and playback
//!
//! At most one macro is open for writing and one for reading at a time. The
//! reorientation computed when a macro is opened for reading belongs to that
//! session, not to the macro, so the same macro can be read back under a
//! different orientation next time.

use crate::codec::LineReader;
use crate::moves::{MoveRecord, PlayDirection};
use crate::puzzle_macro::{Macro, UiHandle};
use mc4d_core::{
    Error, Grip, GripGeometry, HypercubeGeometry, ReferenceFrame, Reorientation, Result, Vec4,
    MAXREFS,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// Stable handle to a registry slot. Handles of destroyed macros may be
/// handed out again by a later `create`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MacroId(usize);

impl MacroId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for MacroId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for MacroId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenMode {
    Reading,
    Writing,
}

/// Outcome of forwarding a user move to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    Appended,
    /// Nothing is being recorded; the move was ignored.
    NoSession,
}

/// Outcome of asking for the next move of the macro being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    Move(MoveRecord),
    EndOfMacro,
}

#[derive(Debug, Clone, Copy)]
struct ReadSession {
    id: MacroId,
    reorientation: Reorientation,
    direction: PlayDirection,
}

#[derive(Debug)]
pub struct MacroManager {
    geometry: Arc<dyn GripGeometry>,
    slots: Vec<Option<Macro>>,
    free: Vec<usize>,
    writing: Option<MacroId>,
    reading: Option<ReadSession>,
}

impl MacroManager {
    pub fn new(geometry: Arc<dyn GripGeometry>) -> Self {
        Self {
            geometry,
            slots: Vec::new(),
            free: Vec::new(),
            writing: None,
            reading: None,
        }
    }

    /// Registry for an `length^4` hypercube.
    pub fn hypercube(length: i32) -> Self {
        Self::new(Arc::new(HypercubeGeometry::new(length)))
    }

    pub fn geometry(&self) -> &Arc<dyn GripGeometry> {
        &self.geometry
    }

    // ── CRUD ────────────────────────────────────────────────────────────

    pub fn create(&mut self, name: impl Into<String>, refs: [Vec4; MAXREFS]) -> Result<MacroId> {
        let m = Macro::new(name, refs, self.geometry.clone())?;
        let id = self.insert(m);
        tracing::info!(%id, "created macro");
        Ok(id)
    }

    /// Removes the macro, ending any session on it, and hands back its UI
    /// handle so the host can release whatever it was bound to.
    pub fn destroy(&mut self, id: MacroId) -> Result<Option<UiHandle>> {
        let m = self
            .slots
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or_else(|| Error::macro_not_found(id))?;
        self.free.push(id.0);
        if self.writing == Some(id) {
            self.writing = None;
        }
        if self.reading.is_some_and(|s| s.id == id) {
            self.reading = None;
        }
        tracing::info!(%id, name = m.name(), "destroyed macro");
        Ok(m.ui_handle())
    }

    pub fn get(&self, id: MacroId) -> Option<&Macro> {
        self.slots.get(id.0)?.as_ref()
    }

    pub fn get_mut(&mut self, id: MacroId) -> Option<&mut Macro> {
        self.slots.get_mut(id.0)?.as_mut()
    }

    fn require_mut(&mut self, id: MacroId) -> Result<&mut Macro> {
        self.get_mut(id).ok_or_else(|| Error::macro_not_found(id))
    }

    pub fn set_ui_handle(&mut self, id: MacroId, handle: Option<UiHandle>) -> Result<()> {
        self.require_mut(id)?.set_ui_handle(handle);
        Ok(())
    }

    pub fn ui_handle(&self, id: MacroId) -> Option<UiHandle> {
        self.get(id)?.ui_handle()
    }

    /// Linear scan; `None` when no macro carries `handle`.
    pub fn find_by_ui_handle(&self, handle: UiHandle) -> Option<MacroId> {
        self.iter()
            .find(|(_, m)| m.ui_handle() == Some(handle))
            .map(|(id, _)| id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<MacroId> {
        self.iter().find(|(_, m)| m.name() == name).map(|(id, _)| id)
    }

    pub fn set_macro_name(&mut self, id: MacroId, name: impl Into<String>) -> Result<()> {
        self.require_mut(id)?.set_name(name);
        Ok(())
    }

    pub fn macro_name(&self, id: MacroId) -> Option<&str> {
        self.get(id).map(Macro::name)
    }

    pub fn set_macro_refs(&mut self, id: MacroId, refs: [Vec4; MAXREFS]) -> Result<()> {
        self.require_mut(id)?.set_refs(refs)
    }

    pub fn macro_refs(&self, id: MacroId) -> Option<&ReferenceFrame> {
        self.get(id).map(Macro::frame)
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live macros in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (MacroId, &Macro)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|m| (MacroId(i), m)))
    }

    fn insert(&mut self, m: Macro) -> MacroId {
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(m);
                MacroId(index)
            }
            None => {
                self.slots.push(Some(m));
                MacroId(self.slots.len() - 1)
            }
        }
    }

    // ── Sessions ────────────────────────────────────────────────────────

    /// Starts a session on `id`.
    ///
    /// Writing just marks the macro as the recording target. Reading matches
    /// `current` against the macro's references first and fails, leaving no
    /// session, if they are not stickers of the puzzle or no symmetry of the
    /// puzzle relates them. A negative
    /// `direction` plays the macro backwards.
    pub fn open(
        &mut self,
        id: MacroId,
        current: [Vec4; MAXREFS],
        mode: OpenMode,
        direction: i32,
    ) -> Result<()> {
        match mode {
            OpenMode::Writing => {
                if self.writing.is_some() {
                    return Err(Error::session_busy("writing"));
                }
                self.require_mut(id)?.goto_end();
                self.writing = Some(id);
                tracing::debug!(%id, "opened macro for writing");
            }
            OpenMode::Reading => {
                if self.reading.is_some() {
                    return Err(Error::session_busy("reading"));
                }
                let geometry = self.geometry.clone();
                let m = self.require_mut(id)?;
                let reorientation = ReferenceFrame::checked(current, &*geometry)
                    .and_then(|frame| m.compute_reorientation(&frame))
                    .map_err(|e| {
                        tracing::warn!(%id, error = %e, "refusing to open macro for reading");
                        e
                    })?;
                let direction = PlayDirection::from_sign(direction);
                match direction {
                    PlayDirection::Forward => m.goto_beginning(),
                    PlayDirection::Reverse => m.goto_end(),
                }
                self.reading = Some(ReadSession {
                    id,
                    reorientation,
                    direction,
                });
                tracing::debug!(
                    %id,
                    det = reorientation.det,
                    ?direction,
                    "opened macro for reading"
                );
            }
        }
        Ok(())
    }

    /// Ends whatever sessions are open. Harmless when none is.
    pub fn close(&mut self) {
        if self.writing.is_some() || self.reading.is_some() {
            tracing::debug!(
                writing = ?self.writing,
                reading = ?self.reading.map(|s| s.id),
                "closing macro sessions"
            );
        }
        self.writing = None;
        self.reading = None;
    }

    pub fn writing(&self) -> Option<MacroId> {
        self.writing
    }

    pub fn reading(&self) -> Option<MacroId> {
        self.reading.map(|s| s.id)
    }

    /// The transform of the current read session.
    pub fn reading_reorientation(&self) -> Option<Reorientation> {
        self.reading.map(|s| s.reorientation)
    }

    /// Forwards a user move to the macro being written, if any. Hosts may
    /// call this after every twist without checking for a session.
    pub fn record_move(&mut self, grip: Grip, direction: i32, slices: u32) -> Result<Recorded> {
        let Some(id) = self.writing else {
            return Ok(Recorded::NoSession);
        };
        self.require_mut(id)?.record_move(grip, direction, slices)?;
        Ok(Recorded::Appended)
    }

    /// Next move of the macro being read, in the host's current frame.
    /// Calling this without a read session is an error; running off the end
    /// of the macro is not.
    pub fn play_move(&mut self) -> Result<Playback> {
        let session = self.reading.ok_or_else(|| Error::no_session("reading"))?;
        let m = self.require_mut(session.id)?;
        Ok(match m.play_move(session.direction, &session.reorientation) {
            Some(record) => Playback::Move(record),
            None => Playback::EndOfMacro,
        })
    }

    // ── Persistence ─────────────────────────────────────────────────────

    /// Macro count, then each macro in slot order.
    pub fn dump<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "{}", self.len())?;
        for (_, m) in self.iter() {
            m.dump(w)?;
        }
        Ok(())
    }

    pub fn read<R: BufRead>(&mut self, reader: R) -> Result<usize> {
        self.read_lines(&mut LineReader::new(reader))
    }

    /// Replaces the registry's contents with the macros in the stream.
    ///
    /// Everything is parsed before anything is replaced: a bad stream leaves
    /// the registry exactly as it was. On success sessions are closed and
    /// handles are renumbered from zero.
    pub fn read_lines<R: BufRead>(&mut self, lines: &mut LineReader<R>) -> Result<usize> {
        let staged = parse_macros(lines, &self.geometry).map_err(|e| {
            tracing::warn!(error = %e, "rejected macro stream");
            e
        })?;

        let count = staged.len();
        self.close();
        self.slots = staged;
        self.free.clear();
        tracing::info!(count, "loaded macros");
        Ok(count)
    }
}

fn parse_macros<R: BufRead>(
    lines: &mut LineReader<R>,
    geometry: &Arc<dyn GripGeometry>,
) -> Result<Vec<Option<Macro>>> {
    let count = lines.next_count("macro count")?;
    let mut staged = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        staged.push(Some(Macro::read(lines, geometry.clone())?));
    }
    Ok(staged)
}
