//! Interactive session: state, compositor, decode worker and settings store.

use crate::AppResult;
use crate::error::AppError;
use image::RgbImage;
use kurbo::Point;
use stacksmith_core::{
    AppState, DecodeEvent, DecodeWorker, DragOutcome, MagneticSlots, PointerEvent, Settings,
    SettingsStore,
};
use stacksmith_render::{Compositor, ExportOptions, RenderContext, export_composite};
use std::path::{Path, PathBuf};

/// Pointer moves used to replay a drag.
const DRAG_STEPS: usize = 8;

pub struct Session {
    state: AppState,
    compositor: Compositor,
    worker: DecodeWorker,
    store: Box<dyn SettingsStore>,
}

impl Session {
    /// Start a session from the stored settings, falling back to defaults.
    pub fn new(store: Box<dyn SettingsStore>) -> Self {
        let settings = store.load().unwrap_or_else(|e| {
            log::warn!("Could not load settings ({e}); using defaults");
            Settings::default()
        });
        Self {
            state: AppState::from_settings(&settings),
            compositor: Compositor::new(),
            worker: DecodeWorker::spawn(),
            store,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Decode images on the worker and wait for the batch. Returns the number added.
    pub fn load_images(&mut self, paths: Vec<PathBuf>) -> usize {
        if paths.is_empty() {
            return 0;
        }
        let batch = self.worker.submit(paths);
        let mut added = 0;
        while let Some(event) = self.worker.wait() {
            let finished = matches!(event, DecodeEvent::BatchFinished { batch: b, .. } if b == batch);
            if self.state.apply_decode_event(event).is_some() {
                added += 1;
            }
            if finished {
                break;
            }
        }
        added
    }

    /// Apply whatever the worker has finished so far. Returns the number added.
    pub fn pump(&mut self) -> usize {
        self.worker
            .poll()
            .into_iter()
            .filter_map(|event| self.state.apply_decode_event(event))
            .count()
    }

    /// Replay a drag of the image at `from` onto the slot at `to` through
    /// pointer events.
    pub fn drag_item(&mut self, from: usize, to: usize) -> AppResult<DragOutcome> {
        let preview = self
            .state
            .preview_layout()
            .ok_or(AppError::Move { from, to, reason: "nothing to drag" })?;
        let slots = MagneticSlots::from_preview(preview);
        let (Some(&start), Some(&target)) = (slots.centers().get(from), slots.centers().get(to)) else {
            return Err(AppError::Move {
                from,
                to,
                reason: "position out of range",
            });
        };
        let x = preview.canvas_rect().center().x;

        self.state.handle_pointer_event(PointerEvent::press(Point::new(x, start)));
        for step in 1..=DRAG_STEPS {
            let y = start + (target - start) * step as f64 / DRAG_STEPS as f64;
            self.state.handle_pointer_event(PointerEvent::motion(Point::new(x, y)));
        }
        let outcome = self.state.end_drag();
        log::debug!("Drag {from} -> {to}: {outcome:?}");
        Ok(outcome)
    }

    /// Render the current preview frame.
    pub fn render_preview(&mut self) -> Option<RgbImage> {
        self.compositor.render_preview(&RenderContext::new(&self.state))
    }

    /// Write the preview frame as an image. Returns false if there is no preview.
    pub fn save_preview(&mut self, path: &Path) -> AppResult<bool> {
        let Some(frame) = self.render_preview() else {
            return Ok(false);
        };
        frame.save(path).map_err(|source| AppError::Preview {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Wrote preview to {}", path.display());
        Ok(true)
    }

    /// Export the composite. Returns false if there was nothing to export.
    pub fn export(&mut self, path: &Path) -> AppResult<bool> {
        let written = export_composite(&self.state, path, &ExportOptions::default())?;
        if written {
            self.state.remember_export_path(path);
        }
        Ok(written)
    }

    pub fn save_settings(&self) -> AppResult<()> {
        self.store.save(&self.state.to_settings())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use stacksmith_core::{Background, LayoutParameters, MemorySettingsStore, Viewport};
    use std::sync::Arc;

    /// Shares a memory store between the session and the test.
    struct SharedStore(Arc<MemorySettingsStore>);

    impl SettingsStore for SharedStore {
        fn load(&self) -> stacksmith_core::settings::SettingsResult<Settings> {
            self.0.load()
        }

        fn save(&self, settings: &Settings) -> stacksmith_core::settings::SettingsResult<()> {
            self.0.save(settings)
        }
    }

    fn write_png(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(w, h, Rgb([120, 90, 60])).save(&path).unwrap();
        path
    }

    fn session_with_images(dir: &Path) -> (Session, Vec<PathBuf>) {
        let paths = vec![
            write_png(dir, "a.png", 100, 40),
            write_png(dir, "b.png", 100, 60),
            write_png(dir, "c.png", 100, 80),
        ];
        let mut session = Session::new(Box::new(MemorySettingsStore::new()));
        session
            .state_mut()
            .set_params(LayoutParameters::new(100, 10, 20, Background::Light))
            .unwrap();
        session.state_mut().set_viewport(Viewport::padded(520.0, 1000.0));
        assert_eq!(session.load_images(paths.clone()), 3);
        (session, paths)
    }

    fn order(session: &Session) -> Vec<PathBuf> {
        session
            .state()
            .sequence()
            .iter()
            .map(|item| item.source_path().to_path_buf())
            .collect()
    }

    #[test]
    fn test_load_images_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let (session, paths) = session_with_images(dir.path());
        assert_eq!(order(&session), paths);
        assert_eq!(session.state().layout().unwrap().export.height, 40 + 60 + 80 + 20 + 20);
    }

    #[test]
    fn test_load_images_skips_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_png(dir.path(), "good.png", 10, 10);
        let bad = dir.path().join("bad.jpg");
        std::fs::write(&bad, b"broken").unwrap();

        let mut session = Session::new(Box::new(MemorySettingsStore::new()));
        assert_eq!(session.load_images(vec![bad, good.clone()]), 1);
        assert_eq!(order(&session), vec![good]);
        assert_eq!(session.pump(), 0);
    }

    #[test]
    fn test_drag_item_reorders() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, paths) = session_with_images(dir.path());

        let outcome = session.drag_item(0, 2).unwrap();
        assert!(matches!(outcome, DragOutcome::Reorder { from: 0, to: 2, .. }));
        assert_eq!(order(&session), vec![paths[1].clone(), paths[2].clone(), paths[0].clone()]);

        let outcome = session.drag_item(2, 0).unwrap();
        assert!(matches!(outcome, DragOutcome::Reorder { from: 2, to: 0, .. }));
        assert_eq!(order(&session), paths);
    }

    #[test]
    fn test_drag_item_to_same_position_is_click() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, paths) = session_with_images(dir.path());
        let outcome = session.drag_item(1, 1).unwrap();
        assert!(matches!(outcome, DragOutcome::Click(_)));
        assert_eq!(order(&session), paths);
        assert!(session.state().selection().is_some());
    }

    #[test]
    fn test_drag_item_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _) = session_with_images(dir.path());
        assert!(matches!(session.drag_item(0, 3), Err(AppError::Move { .. })));
    }

    #[test]
    fn test_save_preview_and_export() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _) = session_with_images(dir.path());

        let preview = dir.path().join("preview.png");
        assert!(session.save_preview(&preview).unwrap());
        let frame = image::open(&preview).unwrap();
        assert_eq!((frame.width(), frame.height()), (520, 1000));

        let out_dir = dir.path().join("out");
        std::fs::create_dir(&out_dir).unwrap();
        let out = out_dir.join("stack.jpg");
        assert!(session.export(&out).unwrap());
        let exported = image::open(&out).unwrap();
        assert_eq!((exported.width(), exported.height()), (100, 220));
        assert_eq!(session.state().dirs().export, Some(out_dir));
    }

    #[test]
    fn test_export_empty_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(Box::new(MemorySettingsStore::new()));
        assert!(!session.export(&dir.path().join("x.jpg")).unwrap());
        assert!(!session.save_preview(&dir.path().join("x.png")).unwrap());
    }

    #[test]
    fn test_settings_saved_and_restored() {
        let store = Arc::new(MemorySettingsStore::new());
        let mut session = Session::new(Box::new(SharedStore(store.clone())));
        session
            .state_mut()
            .set_params(LayoutParameters::new(1600, 8, 120, Background::Dark))
            .unwrap();
        session.save_settings().unwrap();

        let stored = store.load().unwrap();
        assert_eq!(stored.target_width, 1600);
        assert_eq!(stored.background, Background::Dark);

        let restored = Session::new(Box::new(SharedStore(store)));
        assert_eq!(restored.state().params().bottom_margin, 120);
    }
}
