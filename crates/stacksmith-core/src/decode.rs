//! Image decoding: source files to stack items, off the interactive thread.

use crate::item::{ImageItem, is_supported_path};
use image::DynamicImage;
use image::imageops::FilterType;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use std::thread::{self, JoinHandle};
use thiserror::Error;

/// Longest side of the preview bitmap kept per item.
pub const PREVIEW_MAX_SIDE: u32 = 1600;

/// Errors that can occur while decoding a source image.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Unsupported file type: {}", .0.display())]
    Unsupported(PathBuf),

    #[error("Failed to decode {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Image has no pixels: {}", .0.display())]
    Empty(PathBuf),
}

/// Result type for decode operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Open a source image at full resolution.
pub fn open_source(path: &Path) -> DecodeResult<DynamicImage> {
    if !is_supported_path(path) {
        return Err(DecodeError::Unsupported(path.to_path_buf()));
    }
    let image = image::open(path).map_err(|source| DecodeError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    if image.width() == 0 || image.height() == 0 {
        return Err(DecodeError::Empty(path.to_path_buf()));
    }
    Ok(image)
}

/// Decode a source file into a stack item.
///
/// The aspect ratio comes from the full-resolution dimensions; the stored
/// bitmap is shrunk to fit [`PREVIEW_MAX_SIDE`] and converted to RGB.
pub fn decode_item(path: &Path) -> DecodeResult<ImageItem> {
    let image = open_source(path)?;
    let (width, height) = (image.width(), image.height());
    let preview = preview_bitmap(&image);
    log::debug!(
        "Decoded {} ({}x{}, preview {}x{})",
        path.display(),
        width,
        height,
        preview.width(),
        preview.height()
    );
    ImageItem::new(path.to_path_buf(), width, height, preview)
        .ok_or_else(|| DecodeError::Empty(path.to_path_buf()))
}

/// Shrink an image to fit the preview bound, never enlarging it.
pub fn preview_bitmap(image: &DynamicImage) -> image::RgbImage {
    if image.width() > PREVIEW_MAX_SIDE || image.height() > PREVIEW_MAX_SIDE {
        image
            .resize(PREVIEW_MAX_SIDE, PREVIEW_MAX_SIDE, FilterType::Lanczos3)
            .to_rgb8()
    } else {
        image.to_rgb8()
    }
}

/// Split a drop payload into path tokens.
///
/// Tokens are either brace-wrapped (`{/path/with spaces.jpg}`) or separated
/// by whitespace. Surrounding quotes are stripped.
pub fn parse_drop_payload(raw: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    let mut chars = raw.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        let mut token = String::new();
        if c == '{' {
            chars.next();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                token.push(c);
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                token.push(c);
                chars.next();
            }
        }
        let token = token.trim().trim_matches(|c| c == '"' || c == '\'');
        if !token.is_empty() {
            paths.push(PathBuf::from(token));
        }
    }
    paths
}

/// Existing files with a supported extension, in payload order.
pub fn dropped_image_paths(raw: &str) -> Vec<PathBuf> {
    parse_drop_payload(raw)
        .into_iter()
        .filter(|p| p.is_file() && is_supported_path(p))
        .collect()
}

/// Events reported by the [`DecodeWorker`].
#[derive(Debug)]
pub enum DecodeEvent {
    Decoded { batch: u64, item: ImageItem },
    Failed { batch: u64, path: PathBuf, error: DecodeError },
    /// Every path of a batch has been reported.
    BatchFinished { batch: u64, decoded: usize, failed: usize },
}

/// Commands sent to the decode thread.
enum DecodeCommand {
    Batch { batch: u64, paths: Vec<PathBuf> },
    Shutdown,
}

/// Background image decoder.
///
/// Batches are decoded one path at a time on a dedicated thread. Results
/// arrive in submission order and are drained with [`DecodeWorker::poll`].
pub struct DecodeWorker {
    /// Channel to send commands to the decode thread.
    cmd_tx: Option<Sender<DecodeCommand>>,
    /// Channel to receive events from the decode thread.
    event_rx: Receiver<DecodeEvent>,
    /// Handle to the decode thread.
    thread: Option<JoinHandle<()>>,
    next_batch: u64,
}

impl DecodeWorker {
    /// Start the decode thread.
    pub fn spawn() -> Self {
        let (cmd_tx, cmd_rx) = channel::<DecodeCommand>();
        let (event_tx, event_rx) = channel::<DecodeEvent>();

        let handle = thread::spawn(move || {
            log::debug!("Decode thread started");
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    DecodeCommand::Batch { batch, paths } => {
                        let (mut decoded, mut failed) = (0, 0);
                        for path in paths {
                            let event = match decode_item(&path) {
                                Ok(item) => {
                                    decoded += 1;
                                    DecodeEvent::Decoded { batch, item }
                                }
                                Err(error) => {
                                    log::warn!("{error}");
                                    failed += 1;
                                    DecodeEvent::Failed { batch, path, error }
                                }
                            };
                            if event_tx.send(event).is_err() {
                                return;
                            }
                        }
                        let _ = event_tx.send(DecodeEvent::BatchFinished { batch, decoded, failed });
                    }
                    DecodeCommand::Shutdown => break,
                }
            }
            log::debug!("Decode thread exiting");
        });

        Self {
            cmd_tx: Some(cmd_tx),
            event_rx,
            thread: Some(handle),
            next_batch: 0,
        }
    }

    /// Queue a batch of paths. Returns the batch number.
    pub fn submit(&mut self, paths: Vec<PathBuf>) -> u64 {
        let batch = self.next_batch;
        self.next_batch += 1;
        log::info!("Queued {} image(s) for decoding (batch {batch})", paths.len());
        let sent = match &self.cmd_tx {
            Some(tx) => tx.send(DecodeCommand::Batch { batch, paths }).is_ok(),
            None => false,
        };
        if !sent {
            log::error!("Decode thread is gone; batch {batch} dropped");
        }
        batch
    }

    /// Drain pending events (non-blocking).
    pub fn poll(&self) -> Vec<DecodeEvent> {
        let mut events = Vec::new();
        loop {
            match self.event_rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }

    /// Block until the next event. Returns `None` if the thread has exited.
    pub fn wait(&self) -> Option<DecodeEvent> {
        self.event_rx.recv().ok()
    }

    /// Stop the thread after the queued batches finish.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.cmd_tx.take() {
            let _ = tx.send(DecodeCommand::Shutdown);
        }
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                log::error!("Decode thread panicked");
            }
        }
    }
}

impl Default for DecodeWorker {
    fn default() -> Self {
        Self::spawn()
    }
}

impl Drop for DecodeWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_png(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(w, h, Rgb([10, 20, 30])).save(&path).unwrap();
        path
    }

    #[test]
    fn test_decode_item_small_image_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "small.png", 40, 30);
        let item = decode_item(&path).unwrap();
        assert_eq!(item.source_size(), (40, 30));
        assert!((item.aspect_ratio() - 0.75).abs() < 1e-12);
        assert_eq!(item.preview().dimensions(), (40, 30));
        assert_eq!(item.source_path(), path.as_path());
    }

    #[test]
    fn test_decode_item_large_image_shrunk() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "tall.png", 400, 2000);
        let item = decode_item(&path).unwrap();
        assert_eq!(item.source_size(), (400, 2000));
        assert!((item.aspect_ratio() - 5.0).abs() < 1e-12);
        assert_eq!(item.preview().dimensions(), (320, 1600));
    }

    #[test]
    fn test_decode_item_rgba_converted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alpha.png");
        image::RgbaImage::from_pixel(8, 4, image::Rgba([1, 2, 3, 100]))
            .save(&path)
            .unwrap();
        let item = decode_item(&path).unwrap();
        assert_eq!(item.preview().get_pixel(0, 0), &Rgb([1, 2, 3]));
    }

    #[test]
    fn test_decode_item_errors() {
        let dir = tempfile::tempdir().unwrap();
        let text = dir.path().join("notes.txt");
        std::fs::write(&text, b"hello").unwrap();
        assert!(matches!(decode_item(&text), Err(DecodeError::Unsupported(_))));

        let bogus = dir.path().join("broken.jpg");
        std::fs::write(&bogus, b"not a jpeg").unwrap();
        assert!(matches!(decode_item(&bogus), Err(DecodeError::Image { .. })));

        let missing = dir.path().join("missing.png");
        assert!(matches!(decode_item(&missing), Err(DecodeError::Image { .. })));
    }

    #[test]
    fn test_parse_drop_payload() {
        let paths = parse_drop_payload("{/tmp/my photo.jpg} /tmp/b.png  \"/tmp/c.tif\"");
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/tmp/my photo.jpg"),
                PathBuf::from("/tmp/b.png"),
                PathBuf::from("/tmp/c.tif"),
            ]
        );
        assert!(parse_drop_payload("   ").is_empty());
        assert!(parse_drop_payload("{}").is_empty());
    }

    #[test]
    fn test_parse_drop_payload_unterminated_brace() {
        assert_eq!(
            parse_drop_payload("{/tmp/open ended.png"),
            vec![PathBuf::from("/tmp/open ended.png")]
        );
    }

    #[test]
    fn test_dropped_image_paths_filters() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_png(dir.path(), "with space.png", 2, 2);
        let text = dir.path().join("readme.txt");
        std::fs::write(&text, b"x").unwrap();
        let missing = dir.path().join("missing.jpg");

        let raw = format!("{{{}}} {} {}", good.display(), text.display(), missing.display());
        assert_eq!(dropped_image_paths(&raw), vec![good]);
    }

    #[test]
    fn test_worker_reports_in_submission_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_png(dir.path(), "a.png", 10, 5);
        let bad = dir.path().join("bad.png");
        std::fs::write(&bad, b"garbage").unwrap();
        let b = write_png(dir.path(), "b.png", 10, 20);

        let mut worker = DecodeWorker::spawn();
        let batch = worker.submit(vec![a.clone(), bad.clone(), b.clone()]);

        let mut events = Vec::new();
        while let Some(event) = worker.wait() {
            let done = matches!(event, DecodeEvent::BatchFinished { .. });
            events.push(event);
            if done {
                break;
            }
        }

        assert_eq!(events.len(), 4);
        match &events[0] {
            DecodeEvent::Decoded { batch: n, item } => {
                assert_eq!(*n, batch);
                assert_eq!(item.source_path(), a.as_path());
            }
            other => panic!("unexpected event {other:?}"),
        }
        match &events[1] {
            DecodeEvent::Failed { path, .. } => assert_eq!(path, &bad),
            other => panic!("unexpected event {other:?}"),
        }
        match &events[2] {
            DecodeEvent::Decoded { item, .. } => assert_eq!(item.source_path(), b.as_path()),
            other => panic!("unexpected event {other:?}"),
        }
        match &events[3] {
            DecodeEvent::BatchFinished { decoded, failed, .. } => {
                assert_eq!((*decoded, *failed), (2, 1));
            }
            other => panic!("unexpected event {other:?}"),
        }

        worker.shutdown();
        assert!(worker.poll().is_empty());
    }
}
