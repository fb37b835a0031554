use std::fs::File;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tar::Archive;
use tracing::debug;

use crate::{Error, Result};

/// Unpacks a `.tar.gz` into `target`, stripping leading path components.
pub fn extract_tar_gz(archive: &Path, target: &Path, strip_components: usize) -> Result<usize> {
    let file = File::open(archive).map_err(|e| Error::Io("failed to open archive", e))?;
    let mut archive = Archive::new(GzDecoder::new(file));
    let mut unpacked = 0;

    for entry in archive
        .entries()
        .map_err(|e| Error::Io("failed to read archive", e))?
    {
        let mut entry = entry.map_err(|e| Error::Io("failed to read archive entry", e))?;
        let path = entry
            .path()
            .map_err(|e| Error::Io("failed to read archive entry path", e))?
            .into_owned();

        let Some(relative) = strip(&path, strip_components)? else {
            continue;
        };

        let destination = target.join(&relative);
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Io("failed to create archive parent dir", e))?;
        }

        entry
            .unpack(&destination)
            .map_err(|e| Error::Io("failed to unpack archive entry", e))?;
        unpacked += 1;
    }

    debug!("unpacked {} entries into {}", unpacked, target.display());

    Ok(unpacked)
}

fn strip(path: &Path, strip_components: usize) -> Result<Option<PathBuf>> {
    let mut stripped = PathBuf::new();

    for component in path.components().skip(strip_components) {
        match component {
            Component::Normal(part) => stripped.push(part),
            Component::CurDir => {}
            _ => return Err(Error::ArchiveEntryOutsideTarget(path.to_path_buf())),
        }
    }

    Ok((!stripped.as_os_str().is_empty()).then_some(stripped))
}
