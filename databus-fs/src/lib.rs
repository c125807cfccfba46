//! Capability-based helpers for writing downloaded files to local disk.
//!
//! Paths are UTF-8 (`camino`) and every operation goes through a `cap-std`
//! directory handle anchored at the filesystem root, a drive prefix, or the
//! current directory.
#![forbid(unsafe_code)]

use std::io::{self, Write};
use std::path::Component;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs::OpenOptions;
use cap_std::{ambient_authority, fs_utf8};

/// Open the directory containing `path` and return it with the file name.
pub fn open_parent(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?
        .to_owned();
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, name))
}

/// Create every missing directory above `path`.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() {
        return Ok(());
    }
    let (anchor, relative) = split_anchor(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    anchor.create_dir_all(&relative)
}

/// Whether `path` names an existing regular file.
///
/// A missing parent directory counts as "no file".
pub fn is_regular_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = match open_parent(path) {
        Ok(found) => found,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };
    file_exists(&dir, &name)
}

/// A file written under a hidden staging name beside `path` and moved into
/// place by [`StagedFile::commit`].
///
/// Dropping an uncommitted file removes the staging file, so a write that
/// fails halfway leaves nothing at `path`.
#[derive(Debug)]
pub struct StagedFile {
    dir: fs_utf8::Dir,
    name: String,
    staging: String,
    file: Option<fs_utf8::File>,
    overwrite: bool,
}

/// Start writing `path`, creating parent directories as needed.
///
/// Without `overwrite` an existing file is an `AlreadyExists` error, both
/// now and when committing.
pub fn stage_output_file(path: &Utf8Path, overwrite: bool) -> io::Result<StagedFile> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_parent(path)?;
    if !overwrite && file_exists(&dir, &name)? {
        return Err(already_exists(&name));
    }
    let staging = format!(".{name}.part");
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    let file = dir.open_with(staging.as_str(), &options)?;
    Ok(StagedFile {
        dir,
        name,
        staging,
        file: Some(file),
        overwrite,
    })
}

impl StagedFile {
    /// Flush the staged bytes and rename them to the final name.
    pub fn commit(mut self) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
        }
        if !self.overwrite && file_exists(&self.dir, &self.name)? {
            return Err(already_exists(&self.name));
        }
        self.dir
            .rename(self.staging.as_str(), &self.dir, self.name.as_str())?;
        self.staging.clear();
        Ok(())
    }
}

impl Write for StagedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::other("staged file already committed"))?
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.as_mut().map_or(Ok(()), Write::flush)
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        drop(self.file.take());
        if !self.staging.is_empty() {
            drop(self.dir.remove_file(self.staging.as_str()));
        }
    }
}

fn file_exists(dir: &fs_utf8::Dir, name: &str) -> io::Result<bool> {
    match dir.metadata(name) {
        Ok(meta) => Ok(meta.is_file()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

fn already_exists(name: &str) -> io::Error {
    io::Error::new(io::ErrorKind::AlreadyExists, format!("{name} already exists"))
}

/// Split a directory path into an ambient anchor and the path below it.
fn split_anchor(dir: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let std_dir = dir.as_std_path();
    let (anchor, below) = match std_dir.components().next() {
        Some(Component::Prefix(prefix)) => {
            let prefix_str = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;
            let anchor = Utf8PathBuf::from(prefix_str).join(std::path::MAIN_SEPARATOR.to_string());
            let below = std_dir
                .strip_prefix(anchor.as_std_path())
                .or_else(|_| std_dir.strip_prefix(prefix.as_os_str()))
                .map_err(|_| io::Error::other("failed to strip prefix from path"))?
                .to_path_buf();
            (anchor, below)
        }
        Some(Component::RootDir) => {
            let anchor = Utf8PathBuf::from(std::path::MAIN_SEPARATOR.to_string());
            let below = std_dir
                .strip_prefix(anchor.as_std_path())
                .map_err(|_| io::Error::other("failed to strip root from path"))?
                .to_path_buf();
            (anchor, below)
        }
        _ => (Utf8PathBuf::from("."), std_dir.to_path_buf()),
    };
    let handle = fs_utf8::Dir::open_ambient_dir(&anchor, ambient_authority())?;
    let relative =
        Utf8PathBuf::from_path_buf(below).map_err(|_| io::Error::other("non-UTF-8 path"))?;
    Ok((handle, relative))
}
