//! Temp file removal after each request.

use std::io::ErrorKind;
use std::path::Path;

use tokio::fs;
use tracing::{debug, warn};

/// Remove every path, ignoring ones that are already gone.
///
/// Never fails: other I/O errors are logged and skipped. Returns how many
/// files were actually removed.
pub async fn cleanup_files<P: AsRef<Path>>(paths: &[P]) -> usize {
    let mut removed = 0;
    for path in paths {
        let path = path.as_ref();
        match fs::remove_file(path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Removed temp file");
                removed += 1;
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove temp file"),
        }
    }
    removed
}
