use std::io::{Cursor, Write};

use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use super::ExportedFile;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("Could not write archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Could not write archive entry: {0}")]
    Io(#[from] std::io::Error),
}

/// Bundles the files in order. Images are compressed already, entries are stored as is.
pub(super) fn build_archive(files: &[ExportedFile]) -> Result<Vec<u8>, ArchiveError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for file in files {
        writer.start_file(file.name.as_str(), options)?;
        writer.write_all(&file.bytes)?;
    }
    Ok(writer.finish()?.into_inner())
}
