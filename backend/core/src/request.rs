//! Local file layout for one in-flight request.

use std::path::{Path, PathBuf};

use crate::types::MediaKind;

/// Input and output paths of a request, derived from the platform file id.
///
/// Two requests with the same file id share paths; platform file ids are
/// unique per upload so that case is not guarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPaths {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl RequestPaths {
    pub fn new(downloads_dir: &Path, file_id: &str, kind: MediaKind) -> Self {
        let name = sanitize_file_id(file_id);
        let ext = kind.extension();
        Self {
            input: downloads_dir.join(format!("{name}.{ext}")),
            output: downloads_dir.join(format!("watermarked_{name}.{ext}")),
        }
    }

    /// Every path that cleanup must remove.
    pub fn all(&self) -> [&Path; 2] {
        [self.input.as_path(), self.output.as_path()]
    }
}

/// Keep file ids from escaping the downloads directory.
fn sanitize_file_id(file_id: &str) -> String {
    file_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
