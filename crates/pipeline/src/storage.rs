//! Storage backends for persisted artifacts.
//!
//! Artifacts are opaque byte blobs under string keys. The pipeline reads an
//! artifact if it exists and otherwise regenerates and writes it. Concurrent
//! runs against the same backend are not coordinated: the last writer wins.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

/// A keyed blob store with `exists`, `read` and `write`.
pub trait Storage {
    /// Returns `true` if an artifact is stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot determine whether it exists.
    fn exists(&self, key: &str) -> io::Result<bool>;

    /// Returns the artifact stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no such artifact or it cannot be read.
    fn read(&self, key: &str) -> io::Result<Vec<u8>>;

    /// Stores `bytes` under `key`, replacing any previous artifact.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact cannot be written.
    fn write(&mut self, key: &str, bytes: &[u8]) -> io::Result<()>;

    /// Returns `true` if writes are dropped, so callers can skip encoding.
    fn discards_writes(&self) -> bool {
        false
    }
}

/// No storage: nothing exists, writes are discarded.
impl Storage for () {
    fn exists(&self, _key: &str) -> io::Result<bool> {
        Ok(false)
    }

    fn read(&self, key: &str) -> io::Result<Vec<u8>> {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no artifact {key}"),
        ))
    }

    fn write(&mut self, _key: &str, _bytes: &[u8]) -> io::Result<()> {
        Ok(())
    }

    fn discards_writes(&self) -> bool {
        true
    }
}

impl<S: Storage + ?Sized> Storage for &mut S {
    fn exists(&self, key: &str) -> io::Result<bool> {
        (**self).exists(key)
    }

    fn read(&self, key: &str) -> io::Result<Vec<u8>> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, bytes: &[u8]) -> io::Result<()> {
        (**self).write(key, bytes)
    }

    fn discards_writes(&self) -> bool {
        (**self).discards_writes()
    }
}

/// Artifacts stored as files in a directory, one file per key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    root: PathBuf,
}

impl Directory {
    /// Stores artifacts under `root`, which is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl Storage for Directory {
    fn exists(&self, key: &str) -> io::Result<bool> {
        self.path(key).try_exists()
    }

    fn read(&self, key: &str) -> io::Result<Vec<u8>> {
        fs::read(self.path(key))
    }

    fn write(&mut self, key: &str, bytes: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.path(key), bytes)
    }
}

/// Artifacts held in memory, for tests and throwaway runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Memory {
    artifacts: BTreeMap<String, Vec<u8>>,
    writes: usize,
}

impl Memory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.artifacts.keys().map(String::as_str)
    }

    /// Returns the number of writes performed so far.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Removes the artifact under `key`, returning it if there was one.
    pub fn remove(&mut self, key: &str) -> Option<Vec<u8>> {
        self.artifacts.remove(key)
    }
}

impl Storage for Memory {
    fn exists(&self, key: &str) -> io::Result<bool> {
        Ok(self.artifacts.contains_key(key))
    }

    fn read(&self, key: &str) -> io::Result<Vec<u8>> {
        self.artifacts
            .get(key)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no artifact {key}")))
    }

    fn write(&mut self, key: &str, bytes: &[u8]) -> io::Result<()> {
        self.writes += 1;
        self.artifacts.insert(key.to_owned(), bytes.to_vec());
        Ok(())
    }
}
