//! Command-line driver.

use crate::cli::Cli;
use crate::error::AppResult;
use crate::file_ops;
use crate::session::Session;
use stacksmith_core::decode::dropped_image_paths;
use stacksmith_core::{
    AppState, DragOutcome, FileSettingsStore, MemorySettingsStore, SettingsStore, Viewport,
};

/// Run one command-line session.
pub fn run(cli: Cli) -> AppResult<()> {
    let store: Box<dyn SettingsStore> = match &cli.settings {
        Some(path) => Box::new(FileSettingsStore::new(path)),
        None => match FileSettingsStore::default_location() {
            Ok(store) => {
                log::debug!("Using settings at {}", store.path().display());
                Box::new(store)
            }
            Err(e) => {
                log::warn!("{e}; settings will not persist");
                Box::new(MemorySettingsStore::new())
            }
        },
    };
    let mut session = Session::new(store);

    session.state_mut().set_viewport(Viewport::padded(
        cli.viewport.width as f64,
        cli.viewport.height as f64,
    ));
    apply_parameters(&mut session, &cli)?;
    apply_logo(&mut session, &cli);
    if cli.list_logos {
        for line in logo_listing(session.state()) {
            println!("{line}");
        }
    }

    let mut paths = cli.images.clone();
    if let Some(raw) = &cli.drop {
        paths.extend(dropped_image_paths(raw));
    }
    if cli.pick_images {
        paths.extend(file_ops::choose_images(session.state().dirs().images.as_deref()));
    }
    let added = session.load_images(paths);
    log::info!("{} image(s) in the stack", session.state().sequence().len());
    if added == 0 && session.state().sequence().is_empty() {
        log::warn!("No images loaded");
    }

    for mv in &cli.moves {
        match session.drag_item(mv.from, mv.to)? {
            DragOutcome::Reorder { from, to, .. } if from != to => {}
            _ => log::info!("Move {}:{} left the order unchanged", mv.from + 1, mv.to + 1),
        }
    }

    if let Some(path) = &cli.preview {
        if !session.save_preview(path)? {
            log::warn!("No preview to write");
        }
    }

    let output = match &cli.output {
        Some(path) => Some(path.clone()),
        None if cli.choose_output && !session.state().sequence().is_empty() => {
            file_ops::choose_export_path(session.state().dirs().export.as_deref())
        }
        None => None,
    };
    if let Some(path) = output {
        if session.export(&path)? {
            println!("{}", path.display());
        }
    }

    if !cli.no_save_settings {
        if let Err(e) = session.save_settings() {
            log::error!("Failed to save settings: {e}");
        }
    }
    Ok(())
}

/// Merge parameter flags over the current parameters and apply them.
fn apply_parameters(session: &mut Session, cli: &Cli) -> AppResult<()> {
    if !cli.has_param_overrides() {
        return Ok(());
    }
    let mut inputs = session.state().params().to_inputs();
    if let Some(width) = &cli.width {
        inputs.width = width.clone();
    }
    if let Some(spacing) = &cli.spacing {
        inputs.spacing = spacing.clone();
    }
    if let Some(bottom) = &cli.bottom_margin {
        inputs.bottom_margin = bottom.clone();
    }
    if let Some(background) = &cli.background {
        inputs.background = background.clone();
    }
    session.state_mut().apply_inputs(&inputs)?;
    Ok(())
}

fn apply_logo(session: &mut Session, cli: &Cli) {
    let state = session.state_mut();
    if cli.no_logo {
        state.clear_logo();
    }
    if let Some(path) = &cli.logo {
        state.set_logo(path.clone());
    } else if cli.pick_logo {
        if let Some(path) = file_ops::choose_logo(state.dirs().logo.as_deref()) {
            state.set_logo(path);
        }
    }
    if cli.reset_logo {
        state.reset_logo_position();
    }
    if cli.has_logo_adjustments() {
        let Some(logo) = state.logo() else {
            log::warn!("Logo adjustments ignored: no logo set");
            return;
        };
        let scale = cli.logo_scale.unwrap_or(logo.scale_percent());
        let offset_x = cli.logo_offset_x.unwrap_or(logo.offset_x());
        let offset_y = cli.logo_offset_y.unwrap_or(logo.offset_y());
        state.adjust_logo(scale, offset_x, offset_y);
    }
}

/// Remembered logos still on disk, most recent first. The logo in use is
/// marked with `*`.
fn logo_listing(state: &AppState) -> Vec<String> {
    let current = state.logo().map(|l| l.path.as_path());
    state
        .logo_library()
        .available()
        .into_iter()
        .enumerate()
        .map(|(i, path)| {
            let mark = if current == Some(path) { "*" } else { " " };
            format!("{mark} {}. {}", i + 1, path.display())
        })
        .collect()
}
