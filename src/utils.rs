use anyhow::{Context, Error};
use std::fs;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Create a buffered file for writing, creating parent directories as needed
pub fn create_file<P: AsRef<Path>>(path: P) -> Result<BufWriter<File>, Error> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}
