//! File-based storage backend for persistent storage.

use crate::backend::{validate_name, StorageBackend};
use crate::error::StorageResult;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// A directory-based storage backend.
///
/// Every blob is stored as `<dir>/<name>.<extension>`. Data survives
/// process restarts.
///
/// # Durability
///
/// Writes go to a uniquely named temporary file next to the target, which
/// is then renamed over it. When `sync_on_write` is enabled the temporary
/// file is `fsync`ed before the rename and the directory afterwards, so a
/// completed `write` survives a crash.
///
/// # Thread Safety
///
/// This backend is thread-safe. Concurrent writers of the *same* name are
/// not coordinated here; last rename wins.
///
/// # Example
///
/// ```no_run
/// use shelfdb_storage::{StorageBackend, FileBackend};
/// use std::path::Path;
///
/// let backend = FileBackend::open(Path::new("db"), "json", true).unwrap();
/// backend.write("players", b"[]").unwrap();
/// assert_eq!(backend.read("players").unwrap(), Some(b"[]".to_vec()));
/// ```
#[derive(Debug)]
pub struct FileBackend {
    dir: PathBuf,
    extension: String,
    sync_on_write: bool,
    temp_counter: AtomicU64,
}

impl FileBackend {
    /// Opens a backend rooted at `dir`, creating the directory (and any
    /// missing parents) if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: &Path, extension: &str, sync_on_write: bool) -> StorageResult<Self> {
        fs::create_dir_all(dir)?;

        Ok(Self {
            dir: dir.to_path_buf(),
            extension: extension.trim_start_matches('.').to_string(),
            sync_on_write,
            temp_counter: AtomicU64::new(0),
        })
    }

    /// Returns the root directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file extension used for blobs, without the dot.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Returns the path of the file backing `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid.
    pub fn path_for(&self, name: &str) -> StorageResult<PathBuf> {
        validate_name(name)?;
        Ok(self.dir.join(format!("{name}.{}", self.extension)))
    }

    fn temp_path_for(&self, name: &str) -> PathBuf {
        let n = self.temp_counter.fetch_add(1, Ordering::Relaxed);
        self.dir.join(format!(
            "{name}.{}.{}-{n}.tmp",
            self.extension,
            std::process::id()
        ))
    }

    /// Syncs the directory so renames and unlinks are durable.
    #[cfg(unix)]
    fn sync_directory(&self) -> io::Result<()> {
        File::open(&self.dir)?.sync_all()
    }

    #[cfg(not(unix))]
    fn sync_directory(&self) -> io::Result<()> {
        // NTFS journals metadata; directory handles cannot be fsynced.
        Ok(())
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, name: &str) -> StorageResult<Option<Vec<u8>>> {
        let path = self.path_for(name)?;
        match fs::read(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, name: &str, data: &[u8]) -> StorageResult<()> {
        let path = self.path_for(name)?;
        let temp_path = self.temp_path_for(name);

        let result = (|| -> io::Result<()> {
            let mut file = File::create(&temp_path)?;
            file.write_all(data)?;
            if self.sync_on_write {
                file.sync_all()?;
            }
            drop(file);
            fs::rename(&temp_path, &path)
        })();

        if let Err(e) = result {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        if self.sync_on_write {
            self.sync_directory()?;
        }
        Ok(())
    }

    fn create_if_absent(&self, name: &str, initial: &[u8]) -> StorageResult<bool> {
        let path = self.path_for(name)?;
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        file.write_all(initial)?;
        if self.sync_on_write {
            file.sync_all()?;
            self.sync_directory()?;
        }
        Ok(true)
    }

    fn remove(&self, name: &str) -> StorageResult<bool> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                if self.sync_on_write {
                    self.sync_directory()?;
                }
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, name: &str) -> StorageResult<bool> {
        Ok(self.path_for(name)?.is_file())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let suffix = format!(".{}", self.extension);
        let mut names = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if let Some(stem) = file_name.strip_suffix(&suffix) {
                if validate_name(stem).is_ok() {
                    names.push(stem.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }
}
