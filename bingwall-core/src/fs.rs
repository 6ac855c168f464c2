//! Replace-on-disk helpers shared by the publisher and the settings store.

use std::{
    fs::File,
    io::{self, Write},
    path::{Path, PathBuf},
};

use uuid::Uuid;

/// Replace `path` with `bytes` so readers only ever see the old or the new
/// content in full.
///
/// The payload is staged in a sibling temp file, flushed and synced, then
/// renamed over the target. The target never disappears in between.
pub fn replace_file_blocking(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = parent_dir(path);
    std::fs::create_dir_all(parent)?;

    let tmp = staging_path(path);
    let staged = File::create(&tmp).and_then(|mut file| {
        file.write_all(bytes)?;
        file.flush()?;
        file.sync_all()
    });

    let result = staged.and_then(|()| std::fs::rename(&tmp, path));
    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result
}

fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// Hidden sibling of `path`, unique per call.
fn staging_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "staged".to_string());
    parent_dir(path).join(format!(
        ".{file_name}.tmp-{}",
        Uuid::new_v4().simple()
    ))
}
