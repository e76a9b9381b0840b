use log::debug;
use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::core::constants::files;
use crate::core::error::{LinkScoutError, Result};
use crate::core::types::ContentPayload;

/// Read a single file into a payload.
pub fn read_file(path: &Path) -> Result<ContentPayload> {
    let bytes = fs::read(path).map_err(|e| LinkScoutError::io(path, e))?;
    Ok(ContentPayload::from_file(path, &bytes))
}

/// One item produced while walking a directory.
#[derive(Debug)]
pub enum SourceEntry {
    /// A regular file that was read successfully
    Loaded(ContentPayload),
    /// A file that was found but could not be read; the walk continues
    Unreadable { path: PathBuf, error: io::Error },
}

/// Lazy walk over every file below a directory.
///
/// Yields `Ok(SourceEntry)` per file and `Err(FileWalking)` when the walk
/// itself cannot enumerate an entry. Whether to skip or abort is up to the
/// consumer.
pub struct DirectoryPayloads {
    walker: ignore::Walk,
}

impl Iterator for DirectoryPayloads {
    type Item = Result<SourceEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(err) => return Some(Err(LinkScoutError::FileWalking(err))),
            };

            if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                continue;
            }

            let path = entry.into_path();
            return Some(Ok(match fs::read(&path) {
                Ok(bytes) => SourceEntry::Loaded(ContentPayload::from_file(&path, &bytes)),
                Err(error) => SourceEntry::Unreadable { path, error },
            }));
        }
    }
}

/// Start a recursive walk of `root`.
///
/// The root is checked up front, so an unreadable or missing directory fails
/// here instead of part-way through the walk.
pub fn read_directory(root: &Path) -> Result<DirectoryPayloads> {
    fs::read_dir(root).map_err(|e| LinkScoutError::io(root, e))?;

    let mut builder = ignore::WalkBuilder::new(root);
    // Every file counts: hidden files, ignore files and git rules are not honored.
    builder.standard_filters(false).follow_links(false);

    debug!("Walking directory {}", root.display());
    Ok(DirectoryPayloads {
        walker: builder.build(),
    })
}

/// Read a newline-delimited list of URLs.
///
/// Blank lines and `#` comments are skipped, surrounding whitespace is trimmed.
pub fn read_url_list(path: &Path) -> Result<Vec<String>> {
    let file = fs::File::open(path).map_err(|e| LinkScoutError::io(path, e))?;

    let mut urls = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| LinkScoutError::io(path, e))?;
        let url = line.trim();
        if url.is_empty() || url.starts_with(files::URL_LIST_COMMENT) {
            continue;
        }
        urls.push(url.to_string());
    }

    debug!("Read {} URL(s) from {}", urls.len(), path.display());
    Ok(urls)
}
