//! Access to the files of a GTFS feed, unpacked or zipped.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use zip::ZipArchive;

use super::error::GtfsError;

/// Where a feed's files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feed {
    /// A directory holding `stops.txt` and friends
    Directory(PathBuf),
    /// A zip archive, possibly with the files in a subdirectory
    Zip(PathBuf),
}

impl Feed {
    /// Opens a feed at `path`, which may be a directory or a zip archive.
    pub fn open(path: &Path) -> Result<Self, GtfsError> {
        if path.is_dir() {
            Ok(Self::Directory(path.to_path_buf()))
        } else if path.is_file() {
            Ok(Self::Zip(path.to_path_buf()))
        } else {
            Err(GtfsError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no GTFS feed at {}", path.display()),
            )))
        }
    }

    /// Reads every row of a required file.
    pub fn read<T: DeserializeOwned>(&self, name: &'static str) -> Result<Vec<T>, GtfsError> {
        self.read_optional(name)?
            .ok_or(GtfsError::MissingFile(name))
    }

    /// Reads every row of a file, or `None` if the feed doesn't have it.
    pub fn read_optional<T: DeserializeOwned>(
        &self,
        name: &'static str,
    ) -> Result<Option<Vec<T>>, GtfsError> {
        match self {
            Self::Directory(dir) => {
                let path = dir.join(name);
                if !path.is_file() {
                    return Ok(None);
                }
                parse_rows(name, File::open(path)?).map(Some)
            }
            Self::Zip(path) => {
                let mut archive = ZipArchive::new(File::open(path)?)?;
                let Some(entry) = find_entry(&archive, name) else {
                    return Ok(None);
                };
                let file = archive.by_name(&entry)?;
                parse_rows(name, file).map(Some)
            }
        }
    }
}

/// Name of the archive entry for `name`, at the top level or in a subdirectory.
fn find_entry<R: Read + std::io::Seek>(archive: &ZipArchive<R>, name: &str) -> Option<String> {
    let nested = format!("/{name}");
    let mut matches: Vec<&str> = archive
        .file_names()
        .filter(|entry| *entry == name || entry.ends_with(&nested))
        .collect();
    // Shallowest match first
    matches.sort_by_key(|entry| (entry.matches('/').count(), *entry));
    matches.first().map(|entry| entry.to_string())
}

fn parse_rows<T: DeserializeOwned, R: Read>(name: &'static str, reader: R) -> Result<Vec<T>, GtfsError> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|source| GtfsError::Csv { file: name, source })
}
