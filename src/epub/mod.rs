// The EPUB module reads the text content out of an EPUB container.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

use tracing::debug;
use zip::ZipArchive;

use crate::error::{Error, Result};
use crate::xhtml::{strip_markup, Markup};

/// Returns the character data of every markup entry of the container, in the order the
/// entries are stored, concatenated without separators.
pub fn extract_text(epub_path: &Path) -> Result<String> {
    let not_found = || Error::NotFound(epub_path.to_path_buf());

    let metadata = fs::metadata(epub_path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => not_found(),
        _ => Error::Io(e),
    })?;
    if !metadata.is_file() {
        return Err(not_found());
    }

    let file = File::open(epub_path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => not_found(),
        _ => Error::Io(e),
    })?;

    let container_error = |source| Error::ContainerFormat {
        path: epub_path.to_path_buf(),
        source,
    };

    let mut archive = ZipArchive::new(file).map_err(container_error)?;

    let mut text = String::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(container_error)?;
        let Some(markup) = Markup::from_entry_name(entry.name()) else {
            continue;
        };

        let name = entry.name().to_string();
        let mut buffer = Vec::new();
        entry
            .read_to_end(&mut buffer)
            .map_err(|e| container_error(e.into()))?;

        let content = std::str::from_utf8(&buffer).map_err(|source| Error::Decode {
            entry: name.clone(),
            source,
        })?;

        let stripped = strip_markup(content, markup);
        debug!(entry = %name, chars = stripped.chars().count(), "extracted entry");
        text.push_str(&stripped);
    }

    Ok(text)
}
