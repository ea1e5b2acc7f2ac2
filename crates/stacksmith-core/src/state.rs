//! Application state shared by the shell and the renderer.

use crate::decode::{DecodeError, DecodeEvent, decode_item};
use crate::drag::{DragEngine, DragOutcome, DragUpdate};
use crate::input::{MouseButton, PointerEvent};
use crate::item::{ImageItem, ItemId};
use crate::layout::{
    LayoutError, LayoutResult, PreviewLayout, SolvedLayout, StackLayout, Viewport, solve,
    solve_export,
};
use crate::logo::{DEFAULT_LOGO_SCALE, LogoLibrary, LogoOverlay};
use crate::params::{LayoutParameters, ParamInputs};
use crate::settings::Settings;
use crate::snap::MagneticSlots;
use crate::store::Sequence;
use kurbo::Point;
use std::path::{Path, PathBuf};

/// Directories last used for each kind of file dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RememberedDirs {
    pub images: Option<PathBuf>,
    pub export: Option<PathBuf>,
    pub logo: Option<PathBuf>,
}

/// Outcome of adding a batch of files synchronously.
#[derive(Debug, Default)]
pub struct AddReport {
    pub added: Vec<ItemId>,
    pub failed: Vec<(PathBuf, DecodeError)>,
}

/// Application state.
///
/// Owns the sequence and everything derived from it. Every mutation of the
/// sequence or of the parameters recomputes the layout, so the renderer
/// always sees a layout that matches the current order.
#[derive(Debug, Default)]
pub struct AppState {
    sequence: Sequence,
    params: LayoutParameters,
    logo: Option<LogoOverlay>,
    logo_library: LogoLibrary,
    selection: Option<ItemId>,
    drag: DragEngine,
    viewport: Option<Viewport>,
    /// Last successfully solved layout.
    layout: Option<SolvedLayout>,
    dirs: RememberedDirs,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore state from persisted settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            params: settings.layout_parameters(),
            logo: settings.logo_overlay(),
            logo_library: settings.logo_library.clone(),
            dirs: RememberedDirs {
                images: settings.last_image_dir.clone(),
                export: settings.last_export_dir.clone(),
                logo: settings.last_logo_dir.clone(),
            },
            ..Self::default()
        }
    }

    /// Snapshot the persistable parts of the state.
    pub fn to_settings(&self) -> Settings {
        let (logo_scale, logo_offset_x, logo_offset_y) = match &self.logo {
            Some(logo) => (logo.scale_percent(), logo.offset_x(), logo.offset_y()),
            None => (DEFAULT_LOGO_SCALE, 0, 0),
        };
        Settings {
            target_width: self.params.target_width,
            spacing: self.params.spacing,
            bottom_margin: self.params.bottom_margin,
            background: self.params.background,
            logo_path: self.logo.as_ref().map(|l| l.path.clone()),
            logo_scale,
            logo_offset_x,
            logo_offset_y,
            logo_library: self.logo_library.clone(),
            last_image_dir: self.dirs.images.clone(),
            last_export_dir: self.dirs.export.clone(),
            last_logo_dir: self.dirs.logo.clone(),
        }
    }

    // --- Accessors ---

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn params(&self) -> &LayoutParameters {
        &self.params
    }

    pub fn logo(&self) -> Option<&LogoOverlay> {
        self.logo.as_ref()
    }

    pub fn logo_library(&self) -> &LogoLibrary {
        &self.logo_library
    }

    pub fn selection(&self) -> Option<ItemId> {
        self.selection
    }

    pub fn drag(&self) -> &DragEngine {
        &self.drag
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    pub fn layout(&self) -> Option<&SolvedLayout> {
        self.layout.as_ref()
    }

    pub fn preview_layout(&self) -> Option<&PreviewLayout> {
        self.layout.as_ref().and_then(|l| l.preview.as_ref())
    }

    pub fn dirs(&self) -> &RememberedDirs {
        &self.dirs
    }

    // --- Sequence ---

    /// Decode and append files in order, skipping those that fail.
    pub fn add_paths(&mut self, paths: &[PathBuf]) -> AddReport {
        let mut report = AddReport::default();
        for path in paths {
            match decode_item(path) {
                Ok(item) => {
                    let id = item.id();
                    if self.push_item(item) {
                        report.added.push(id);
                    }
                }
                Err(e) => {
                    log::warn!("Skipping {}: {}", path.display(), e);
                    report.failed.push((path.clone(), e));
                }
            }
        }
        report
    }

    /// Append a decoded item to the bottom of the stack. Cancels any drag
    /// session, since its slots no longer match the layout.
    pub fn push_item(&mut self, item: ImageItem) -> bool {
        if let Some(parent) = item.source_path().parent() {
            self.dirs.images = Some(parent.to_path_buf());
        }
        let added = self.sequence.push(item);
        if added {
            if self.drag.is_active() {
                log::debug!("Image added mid-drag; cancelling the drag");
                self.drag.cancel();
            }
            self.refresh();
        }
        added
    }

    /// Apply an event from the decode worker. Returns the added item, if any.
    pub fn apply_decode_event(&mut self, event: DecodeEvent) -> Option<ItemId> {
        match event {
            DecodeEvent::Decoded { item, .. } => {
                let id = item.id();
                self.push_item(item).then_some(id)
            }
            DecodeEvent::Failed { path, error, .. } => {
                log::warn!("Skipping {}: {}", path.display(), error);
                None
            }
            DecodeEvent::BatchFinished { batch, decoded, failed } => {
                log::info!("Batch {batch} finished: {decoded} added, {failed} failed");
                None
            }
        }
    }

    /// Remove an item. Cancels any drag session.
    pub fn remove(&mut self, id: ItemId) -> Option<ImageItem> {
        let item = self.sequence.remove(id)?;
        self.drag.cancel();
        if self.selection == Some(id) {
            self.selection = None;
        }
        log::info!("Removed {}", item.display_name());
        self.refresh();
        Some(item)
    }

    pub fn remove_selected(&mut self) -> Option<ImageItem> {
        let id = self.selection?;
        self.remove(id)
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.sequence.clear();
        self.selection = None;
        self.drag.cancel();
        self.refresh();
    }

    // --- Parameters and layout ---

    /// Parse raw parameter text and apply it.
    pub fn apply_inputs(&mut self, inputs: &ParamInputs) -> LayoutResult<()> {
        let params = LayoutParameters::parse(inputs)?;
        self.set_params(params)
    }

    /// Replace the layout parameters. Invalid parameters leave the state untouched.
    pub fn set_params(&mut self, params: LayoutParameters) -> LayoutResult<()> {
        params.validate()?;
        let previous = std::mem::replace(&mut self.params, params);
        match self.relayout() {
            Ok(_) | Err(LayoutError::Empty) => Ok(()),
            Err(e) => {
                self.params = previous;
                Err(e)
            }
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
        self.refresh();
    }

    /// Recompute the layout from the current sequence and parameters.
    ///
    /// On failure the previous layout is kept, except for an empty sequence
    /// which clears it.
    pub fn relayout(&mut self) -> LayoutResult<&SolvedLayout> {
        let ratios = self.sequence.aspect_ratios();
        match solve(&ratios, &self.params, self.viewport.as_ref()) {
            Ok(solved) => {
                let solved = self.layout.insert(solved);
                Ok(&*solved)
            }
            Err(LayoutError::Empty) => {
                self.layout = None;
                Err(LayoutError::Empty)
            }
            Err(e) => {
                log::warn!("Layout failed: {e}");
                Err(e)
            }
        }
    }

    /// Full-resolution layout for the current sequence.
    pub fn export_layout(&self) -> LayoutResult<StackLayout> {
        solve_export(&self.sequence.aspect_ratios(), &self.params)
    }

    fn refresh(&mut self) {
        if let Err(e) = self.relayout() {
            log::debug!("Layout not refreshed: {e}");
        }
    }

    // --- Logo ---

    /// Use a logo file, keeping the current adjustments.
    pub fn set_logo(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.logo_library.remember(path.clone());
        if let Some(parent) = path.parent() {
            self.dirs.logo = Some(parent.to_path_buf());
        }
        match &mut self.logo {
            Some(logo) => logo.path = path,
            None => self.logo = Some(LogoOverlay::new(path)),
        }
    }

    /// Stop drawing a logo. The library is kept.
    pub fn clear_logo(&mut self) {
        self.logo = None;
    }

    /// Drop a logo from the library, clearing it if it is in use.
    pub fn forget_logo(&mut self, path: &Path) -> bool {
        if self.logo.as_ref().is_some_and(|l| l.path == path) {
            self.logo = None;
        }
        self.logo_library.forget(path)
    }

    /// Adjust the current logo. Returns false if no logo is set.
    pub fn adjust_logo(&mut self, scale_percent: i32, offset_x: i32, offset_y: i32) -> bool {
        match &mut self.logo {
            Some(logo) => {
                logo.set_scale(scale_percent);
                logo.set_offset(offset_x, offset_y);
                true
            }
            None => false,
        }
    }

    pub fn reset_logo_position(&mut self) -> bool {
        match &mut self.logo {
            Some(logo) => {
                logo.reset_position();
                true
            }
            None => false,
        }
    }

    // --- Selection ---

    /// Select an item, replacing any previous selection.
    pub fn select(&mut self, id: ItemId) -> bool {
        if !self.sequence.contains(id) {
            return false;
        }
        self.selection = Some(id);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Item under a viewport point.
    pub fn item_at(&self, point: Point) -> Option<ItemId> {
        let index = self.preview_layout()?.hit_test(point)?;
        self.sequence.get_at(index).map(ImageItem::id)
    }

    // --- Dragging ---

    /// Route a pointer event to the drag engine. Returns true if the preview
    /// needs a redraw.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Down {
                position,
                button: MouseButton::Left,
            } => match self.item_at(position) {
                Some(id) => self.begin_drag(id, position.y),
                None => false,
            },
            PointerEvent::Move { position } => !matches!(
                self.update_drag(position.y),
                DragUpdate::Ignored | DragUpdate::Armed
            ),
            PointerEvent::Up {
                button: MouseButton::Left,
                ..
            } => !matches!(self.end_drag(), DragOutcome::None),
            _ => false,
        }
    }

    /// Arm a drag on an item. Fails silently while another session is active.
    pub fn begin_drag(&mut self, id: ItemId, pointer_y: f64) -> bool {
        if self.drag.is_active() {
            log::debug!("Drag already in progress");
            return false;
        }
        let Some(index) = self.sequence.index_of(id) else {
            return false;
        };
        let Some(preview) = self.preview_layout() else {
            return false;
        };
        let slots = MagneticSlots::from_preview(preview);
        self.drag.begin_drag(id, index, pointer_y, slots)
    }

    pub fn update_drag(&mut self, pointer_y: f64) -> DragUpdate {
        let update = self.drag.update_drag(pointer_y);
        if let DragUpdate::Started { .. } = update {
            self.selection = self.drag.dragged_id();
        }
        update
    }

    /// Finish the drag, applying any reorder.
    pub fn end_drag(&mut self) -> DragOutcome {
        let outcome = self.drag.end_drag();
        match outcome {
            DragOutcome::None => {}
            DragOutcome::Click(id) => {
                self.select(id);
            }
            DragOutcome::Reorder { id, from, to } => {
                self.selection = Some(id);
                if self.sequence.index_of(id) != Some(from) {
                    log::warn!("Sequence changed during drag; ignoring reorder");
                } else if self.sequence.move_item(from, to) {
                    log::info!("Moved item from position {} to {}", from + 1, to + 1);
                }
                self.refresh();
            }
        }
        outcome
    }

    /// Displayed top of every item, in sequence order, while dragging.
    ///
    /// `None` when the preview should use the layout positions.
    pub fn display_tops(&self) -> Option<Vec<f64>> {
        if !self.drag.is_dragging() {
            return None;
        }
        self.drag.session().map(|s| s.display_tops())
    }

    // --- Directories ---

    /// Remember where the last export was written.
    pub fn remember_export_path(&mut self, path: &Path) {
        if let Some(parent) = path.parent() {
            self.dirs.export = Some(parent.to_path_buf());
        }
    }
}
