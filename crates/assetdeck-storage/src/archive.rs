//! In-memory ZIP archive builder.

use std::io::{Cursor, Write};

use bytes::Bytes;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use assetdeck_core::error::{AppError, ErrorKind};
use assetdeck_core::result::AppResult;

/// Accumulates entries into a ZIP archive held in memory.
pub struct ZipArchiver {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
    entries: usize,
}

impl std::fmt::Debug for ZipArchiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipArchiver")
            .field("entries", &self.entries)
            .finish()
    }
}

impl Default for ZipArchiver {
    fn default() -> Self {
        Self::new()
    }
}

impl ZipArchiver {
    /// Start an empty archive.
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
            entries: 0,
        }
    }

    /// Append a file entry. `name` uses `/` as separator.
    pub fn add_entry(&mut self, name: &str, data: &[u8]) -> AppResult<()> {
        self.writer
            .start_file(name, self.options)
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Internal,
                    format!("Failed to start archive entry: {name}"),
                    e,
                )
            })?;
        self.writer.write_all(data).map_err(|e| {
            AppError::with_source(
                ErrorKind::Internal,
                format!("Failed to write archive entry: {name}"),
                e,
            )
        })?;
        self.entries += 1;
        Ok(())
    }

    /// Number of entries written so far.
    pub fn len(&self) -> usize {
        self.entries
    }

    /// Whether no entries were written.
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Finish the archive and return its bytes.
    pub fn finish(self) -> AppResult<Bytes> {
        let cursor = self.writer.finish().map_err(|e| {
            AppError::with_source(ErrorKind::Internal, "Failed to finalize archive", e)
        })?;
        Ok(Bytes::from(cursor.into_inner()))
    }
}
