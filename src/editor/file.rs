//! Reading and writing raw file contents
//!
//! Files have no header or trailer: the buffer bytes are the file bytes.

use std::io;
use std::path::Path;

use super::buffer::ByteBuffer;

/// Result of loading the file being edited
#[derive(Debug)]
pub struct LoadedFile {
    pub bytes: Vec<u8>,
    /// The file did not exist and an empty buffer was started instead
    pub new_file: bool,
}

/// Load the file being edited; a missing file starts an empty buffer
pub fn load(path: &Path) -> io::Result<LoadedFile> {
    match std::fs::read(path) {
        Ok(bytes) => {
            log::info!("Loaded {} ({} bytes)", path.display(), bytes.len());
            Ok(LoadedFile {
                bytes,
                new_file: false,
            })
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::info!("{} does not exist, starting a new file", path.display());
            Ok(LoadedFile {
                bytes: Vec::new(),
                new_file: true,
            })
        }
        Err(e) => Err(e),
    }
}

/// Read a whole file for splicing into the buffer
pub fn read_bytes(path: &Path) -> io::Result<Vec<u8>> {
    std::fs::read(path).inspect_err(|e| log::warn!("Failed to read {}: {}", path.display(), e))
}

/// Write the whole buffer to `path`
pub fn write_all(path: &Path, buffer: &ByteBuffer) -> io::Result<()> {
    std::fs::write(path, buffer.as_slice())?;
    log::info!("Wrote {} bytes to {}", buffer.len(), path.display());
    Ok(())
}

/// Write the inclusive range `[start, end]` to `path`, zero filling past the end
pub fn write_range(path: &Path, buffer: &ByteBuffer, start: usize, end: usize) -> io::Result<usize> {
    let bytes = buffer.slice(start, end);
    std::fs::write(path, &bytes)?;
    log::info!(
        "Wrote {:#x}..={:#x} ({} bytes) to {}",
        start,
        end,
        bytes.len(),
        path.display()
    );
    Ok(bytes.len())
}
