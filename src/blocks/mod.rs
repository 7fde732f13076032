// ABOUTME: Managed-region ("delimited block") reader and atomic rewriter.
// ABOUTME: Keeps everything outside the region and exactly one .bak of the prior file.

mod error;

pub use error::BlockError;

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use snafu::ResultExt;

use error::{
    BackupSnafu, FileMissingSnafu, ReadSnafu, RemoveBackupSnafu, SwapSnafu, WriteTempSnafu,
};

/// Literal marker lines bounding a managed region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockMarkers {
    begin: String,
    end: String,
}

impl BlockMarkers {
    pub fn for_product(product: &str) -> Self {
        Self {
            begin: format!("#-----BEGIN {product}-----"),
            end: format!("#-----END {product}-----"),
        }
    }

    pub fn begin(&self) -> &str {
        &self.begin
    }

    pub fn end(&self) -> &str {
        &self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    Before,
    Inside,
    After,
}

/// Reads and rewrites the single managed region of a text file.
///
/// Only the first BEGIN marker opens a region. Marker lines are matched by
/// prefix, so trailing text after a marker is tolerated on read and dropped
/// on rewrite.
#[derive(Debug, Clone)]
pub struct DelimitedBlockStore {
    markers: BlockMarkers,
}

impl DelimitedBlockStore {
    pub fn new(product: &str) -> Self {
        Self {
            markers: BlockMarkers::for_product(product),
        }
    }

    pub fn markers(&self) -> &BlockMarkers {
        &self.markers
    }

    /// Path of the single backup kept next to `path`.
    pub fn backup_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(".bak");
        PathBuf::from(name)
    }

    /// Return the text of the managed region, one `\n`-terminated line per
    /// region line. A file without a region yields an empty string.
    ///
    /// The file may hold arbitrary bytes; region lines that are not UTF-8
    /// are decoded lossily.
    pub fn read(&self, path: &Path) -> Result<String, BlockError> {
        let content = load(path)?;

        let mut block = Vec::new();
        let mut state = Scan::Before;
        for line in lines(&content) {
            match state {
                Scan::Before if self.is_begin(line) => state = Scan::Inside,
                Scan::Inside if self.is_end(line) => break,
                Scan::Inside => {
                    block.extend_from_slice(line);
                    block.push(b'\n');
                }
                _ => {}
            }
        }

        tracing::debug!(path = %path.display(), bytes = block.len(), "read managed region");
        Ok(String::from_utf8_lossy(&block).into_owned())
    }

    /// Replace the managed region of `path` with `block`, appending a new
    /// region when the file has none.
    ///
    /// The new content is written and synced to a sibling temporary file
    /// before the original is renamed to `<path>.bak` and the temporary file
    /// is renamed into place. A failed rename is returned as is; nothing is
    /// rolled back.
    pub fn replace(&self, path: &Path, block: &str) -> Result<(), BlockError> {
        let original = load(path)?;
        let rendered = self.render(&original, block);
        let permissions = fs::metadata(path).context(ReadSnafu { path })?.permissions();

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut temp = tempfile::Builder::new()
            .prefix(&format!(".{file_name}."))
            .suffix(".tmp")
            .tempfile_in(dir)
            .context(WriteTempSnafu { path })?;
        temp.write_all(&rendered).context(WriteTempSnafu { path })?;
        temp.as_file().sync_all().context(WriteTempSnafu { path })?;
        fs::set_permissions(temp.path(), permissions).context(WriteTempSnafu { path })?;

        let backup = Self::backup_path(path);
        match fs::remove_file(&backup) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e).context(RemoveBackupSnafu { path: &backup }),
        }
        fs::rename(path, &backup).context(BackupSnafu {
            from: path,
            to: &backup,
        })?;
        temp.persist(path)
            .map_err(|e| e.error)
            .context(SwapSnafu { path })?;

        tracing::info!(
            path = %path.display(),
            backup = %backup.display(),
            "replaced managed region"
        );
        Ok(())
    }

    /// Build the new file content. Lines outside the region are copied with
    /// their original bytes and line endings.
    fn render(&self, original: &[u8], block: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(original.len() + block.len() + 64);
        let mut state = Scan::Before;

        for raw in original.split_inclusive(|b| *b == b'\n') {
            let line = trim_eol(raw);
            match state {
                Scan::Before if self.is_begin(line) => {
                    self.write_region(&mut out, block);
                    state = Scan::Inside;
                }
                Scan::Inside if self.is_end(line) => state = Scan::After,
                Scan::Inside => {}
                Scan::Before | Scan::After => out.extend_from_slice(raw),
            }
        }

        if state == Scan::Before {
            if out.last().is_some_and(|b| *b != b'\n') {
                out.push(b'\n');
            }
            self.write_region(&mut out, block);
        }
        out
    }

    fn write_region(&self, out: &mut Vec<u8>, block: &str) {
        out.extend_from_slice(self.markers.begin().as_bytes());
        out.push(b'\n');
        out.extend_from_slice(block.as_bytes());
        if !block.is_empty() && !block.ends_with('\n') {
            out.push(b'\n');
        }
        out.extend_from_slice(self.markers.end().as_bytes());
        out.push(b'\n');
    }

    fn is_begin(&self, line: &[u8]) -> bool {
        line.starts_with(self.markers.begin().as_bytes())
    }

    fn is_end(&self, line: &[u8]) -> bool {
        line.starts_with(self.markers.end().as_bytes())
    }
}

/// Lines of `content` without their `\n` or `\r\n` terminators.
fn lines(content: &[u8]) -> impl Iterator<Item = &[u8]> {
    content.split_inclusive(|b| *b == b'\n').map(trim_eol)
}

fn trim_eol(raw: &[u8]) -> &[u8] {
    let line = raw.strip_suffix(b"\n").unwrap_or(raw);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn load(path: &Path) -> Result<Vec<u8>, BlockError> {
    match fs::read(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == ErrorKind::NotFound => FileMissingSnafu { path }.fail(),
        Err(e) => Err(e).context(ReadSnafu { path }),
    }
}
