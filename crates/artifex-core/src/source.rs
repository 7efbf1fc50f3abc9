//! Normalizes the different shapes a file selection arrives in.
//!
//! A selection is either a ready-made list, a drop event carrying a
//! platform file collection, or the file list of a picker input. All three
//! resolve to the same ordered `Vec<FileCandidate>`; no validation happens here.

use crate::drag::Point;
use crate::models::FileCandidate;

/// Platform file collection, as produced by a picker input or a drop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileList {
    files: Vec<FileCandidate>,
}

impl FileList {
    pub fn new(files: Vec<FileCandidate>) -> Self {
        Self { files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn item(&self, index: usize) -> Option<&FileCandidate> {
        self.files.get(index)
    }
}

impl IntoIterator for FileList {
    type Item = FileCandidate;
    type IntoIter = std::vec::IntoIter<FileCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

impl FromIterator<FileCandidate> for FileList {
    fn from_iter<T: IntoIterator<Item = FileCandidate>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Drag payload. Only the file collection is of interest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTransfer {
    pub files: FileList,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DropEvent {
    pub position: Point,
    /// Absent when the drop carried no files (e.g. dragged text).
    pub data_transfer: Option<DataTransfer>,
}

impl DropEvent {
    pub fn with_files(position: Point, files: Vec<FileCandidate>) -> Self {
        Self {
            position,
            data_transfer: Some(DataTransfer {
                files: FileList::new(files),
            }),
        }
    }
}

/// Where a selection came from.
#[derive(Debug, Clone, PartialEq)]
pub enum FileSource {
    Files(Vec<FileCandidate>),
    Drop(DropEvent),
    List(FileList),
}

impl From<Vec<FileCandidate>> for FileSource {
    fn from(files: Vec<FileCandidate>) -> Self {
        FileSource::Files(files)
    }
}

impl From<DropEvent> for FileSource {
    fn from(event: DropEvent) -> Self {
        FileSource::Drop(event)
    }
}

impl From<FileList> for FileSource {
    fn from(list: FileList) -> Self {
        FileSource::List(list)
    }
}

/// Flatten a selection into candidates, preserving order and count.
pub fn extract_files(source: FileSource) -> Vec<FileCandidate> {
    match source {
        FileSource::Files(files) => files,
        FileSource::Drop(event) => event
            .data_transfer
            .map(|transfer| transfer.files.into_iter().collect())
            .unwrap_or_default(),
        FileSource::List(list) => list.into_iter().collect(),
    }
}
