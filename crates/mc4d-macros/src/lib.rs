//! mc4d-macros - record 4D puzzle twists once, replay them in any orientation
//!
//! A macro stores its moves relative to three reference stickers. When it is
//! played back the host names the stickers that now occupy the reference
//! positions, and every move is carried through the symmetry that relates
//! the two, flipping turn directions when that symmetry is a reflection.

pub mod codec;
pub mod config;
pub mod ledger;
pub mod moves;
pub mod puzzle_macro;
pub mod registry;
pub mod storage;

pub use config::MacroConfig;
pub use ledger::MoveLedger;
pub use moves::{MoveRecord, PlayDirection};
pub use puzzle_macro::{Macro, UiHandle};
pub use registry::{MacroId, MacroManager, OpenMode, Playback, Recorded};
pub use storage::MacroStorage;

pub mod prelude {
    pub use crate::config::MacroConfig;
    pub use crate::ledger::MoveLedger;
    pub use crate::moves::{MoveRecord, PlayDirection};
    pub use crate::puzzle_macro::{Macro, UiHandle};
    pub use crate::registry::{MacroId, MacroManager, OpenMode, Playback, Recorded};
    pub use crate::storage::MacroStorage;
    pub use mc4d_core::prelude::*;
}
