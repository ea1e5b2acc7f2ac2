//! Stacksmith Core Library
//!
//! Platform-agnostic data structures and logic for stacking photographs into
//! a single vertical composite: the ordered item store, the layout solver,
//! the drag/reorder engine and the settings blob.

pub mod decode;
pub mod drag;
pub mod input;
pub mod item;
pub mod layout;
pub mod logo;
pub mod params;
pub mod settings;
pub mod snap;
pub mod state;
pub mod store;

pub use decode::{DecodeError, DecodeEvent, DecodeWorker, decode_item};
pub use drag::{DRAG_THRESHOLD, DragEngine, DragOutcome, DragPhase, DragSession, DragUpdate};
pub use input::{MouseButton, PointerEvent};
pub use item::{ImageItem, ItemId};
pub use layout::{
    LayoutError, LogoPlacement, PixelRect, PreviewLayout, SolvedLayout, StackLayout, Viewport,
    place_logo, solve, solve_export,
};
pub use logo::{LogoLibrary, LogoOverlay};
pub use params::{Background, LayoutParameters, ParamInputs};
pub use settings::{FileSettingsStore, MemorySettingsStore, Settings, SettingsError, SettingsStore};
pub use snap::{MagneticSlots, nearest_slot};
pub use state::AppState;
pub use store::Sequence;
