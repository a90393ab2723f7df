//! # Parallel Tree Walk
//!
//! Visits every regular file below a directory on `ignore`'s parallel
//! walker. Asset roots are walked verbatim: hidden files and ignore files
//! get no special treatment.

use std::io;
use std::path::Path;

use ignore::{DirEntry, WalkBuilder, WalkState};
use parking_lot::Mutex;

use crate::error::RomfsError;

/// Call `visit` for every regular file below `dir`.
///
/// Symlinks and other special files are not followed. The first error
/// returned by `visit` or by a directory listing stops the walk and is
/// returned; visits already running on other workers still complete.
pub fn par_walk_files<F, E>(dir: &Path, visit: &F) -> Result<(), E>
where
    F: Fn(&Path) -> Result<(), E> + Sync,
    E: From<RomfsError> + Send,
{
    let first_error: Mutex<Option<E>> = Mutex::new(None);
    let fail = |error: E| {
        first_error.lock().get_or_insert(error);
        WalkState::Quit
    };
    let fail = &fail;

    WalkBuilder::new(dir)
        .standard_filters(false)
        .follow_links(false)
        .build_parallel()
        .run(move || {
            Box::new(move |entry: Result<DirEntry, ignore::Error>| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => return fail(E::from(walk_error(dir, err))),
                };
                if !entry.file_type().is_some_and(|kind| kind.is_file()) {
                    return WalkState::Continue;
                }
                match visit(entry.path()) {
                    Ok(()) => WalkState::Continue,
                    Err(error) => fail(error),
                }
            })
        });

    match first_error.into_inner() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

fn walk_error(root: &Path, err: ignore::Error) -> RomfsError {
    let path = error_path(&err).unwrap_or(root).to_path_buf();
    let message = err.to_string();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::other(message));
    RomfsError::ReadDir { path, source }
}

fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.as_path()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        _ => None,
    }
}
