//! Create a file and preallocate it in one go.

use std::{
    fs::{File, OpenOptions},
    path::{Path, PathBuf, MAIN_SEPARATOR},
};

use crate::{preallocate_file, Error};

/// Open (or create) the file at `path` for writing and preallocate it.
///
/// The file is not truncated. If the preallocation fails the file is
/// closed, but not removed.
pub fn preallocate_at_path(path: impl AsRef<Path>, size: i64) -> Result<File, Error> {
    if size < 0 {
        return Err(Error::InvalidSize(size));
    }
    let path = path.as_ref();

    let mut options = OpenOptions::new();
    options.write(true).create(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }
    let mut file = options.open(path).map_err(|source| Error::Open {
        path: path.to_owned(),
        source,
    })?;

    preallocate_file(&mut file, size).map_err(|source| Error::Reserve {
        path: path.to_owned(),
        source,
    })?;
    Ok(file)
}

/// Create a new uniquely named file in `dir` and preallocate it.
///
/// The last `*` in the `pattern` is replaced with a random string; if there
/// is no `*` the random string is appended. An empty `dir` stands for the
/// system temporary directory.
///
/// The file is not removed automatically, the caller owns it, so its path
/// is returned alongside the handle.
pub fn preallocate_temp_file(
    dir: impl AsRef<Path>,
    pattern: &str,
    size: i64,
) -> Result<(File, PathBuf), Error> {
    if size < 0 {
        return Err(Error::InvalidSize(size));
    }
    let (prefix, suffix) = split_pattern(pattern)?;

    let dir = dir.as_ref();
    let dir = if dir.as_os_str().is_empty() {
        std::env::temp_dir()
    } else {
        dir.to_owned()
    };

    let (mut file, path) = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(suffix)
        .tempfile_in(&dir)
        .and_then(|temp_file| temp_file.keep().map_err(|err| err.error))
        .map_err(|source| Error::CreateTemp { dir, source })?;

    match preallocate_file(&mut file, size) {
        Ok(()) => Ok((file, path)),
        Err(source) => Err(Error::Reserve { path, source }),
    }
}

/// Split the temporary file name pattern into a prefix and a suffix.
fn split_pattern(pattern: &str) -> Result<(&str, &str), Error> {
    if pattern.contains(MAIN_SEPARATOR) || pattern.contains('/') {
        return Err(Error::InvalidPattern(pattern.to_owned()));
    }
    Ok(match pattern.rfind('*') {
        Some(pos) => (&pattern[..pos], &pattern[pos + 1..]),
        None => (pattern, ""),
    })
}
