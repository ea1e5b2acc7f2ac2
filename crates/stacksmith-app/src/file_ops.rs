//! Native file dialogs.

use std::path::{Path, PathBuf};

#[cfg(feature = "native")]
mod native {
    use super::*;
    use stacksmith_core::item::SUPPORTED_EXTENSIONS;

    fn dialog(title: &str, start_dir: Option<&Path>) -> rfd::FileDialog {
        let dialog = rfd::FileDialog::new().set_title(title);
        match start_dir {
            Some(dir) if dir.is_dir() => dialog.set_directory(dir),
            _ => dialog,
        }
    }

    /// Pick images to stack.
    pub fn choose_images(start_dir: Option<&Path>) -> Vec<PathBuf> {
        let picked = dialog("Add Images", start_dir)
            .add_filter("Images", SUPPORTED_EXTENSIONS)
            .pick_files()
            .unwrap_or_default();
        log::info!("Picked {} image(s)", picked.len());
        picked
    }

    /// Pick a logo file.
    pub fn choose_logo(start_dir: Option<&Path>) -> Option<PathBuf> {
        let picked = dialog("Choose Logo", start_dir)
            .add_filter("Images", SUPPORTED_EXTENSIONS)
            .pick_file();
        if let Some(path) = &picked {
            log::info!("Picked logo: {:?}", path);
        }
        picked
    }

    /// Choose where to write the export.
    pub fn choose_export_path(start_dir: Option<&Path>) -> Option<PathBuf> {
        let picked = dialog("Export Composite", start_dir)
            .set_file_name("stack.jpg")
            .add_filter("JPEG", &["jpg", "jpeg"])
            .save_file();
        match &picked {
            Some(path) => log::info!("Export target: {:?}", path),
            None => log::info!("Export cancelled"),
        }
        picked
    }
}

#[cfg(not(feature = "native"))]
mod native {
    use super::*;

    pub fn choose_images(_start_dir: Option<&Path>) -> Vec<PathBuf> {
        log::warn!("File dialogs require the native feature");
        Vec::new()
    }

    pub fn choose_logo(_start_dir: Option<&Path>) -> Option<PathBuf> {
        log::warn!("File dialogs require the native feature");
        None
    }

    pub fn choose_export_path(_start_dir: Option<&Path>) -> Option<PathBuf> {
        log::warn!("File dialogs require the native feature");
        None
    }
}

pub use native::{choose_export_path, choose_images, choose_logo};
