//! Database facade
//!
//! A [`Database`] is an explicit session handle: it owns the in-memory store
//! of one directory and the commit scheduler writing its snapshot. Several
//! databases can be open at once on different directories.
//!
//! # Commits
//!
//! | Operation | Persistence |
//! |-----------|-------------|
//! | `put`, `create_*`, `create_or_get_*`, `delete` | Needs an explicit commit |
//! | `update_list`, `update_object` | Fire-and-forget async commit after the callback |
//! | `get*`, `query` | Read-only |
//!
//! # Example
//!
//! ```ignore
//! let mut db = Database::open(dir)?;
//! db.put("visits", 3)?;
//! db.create_list("tags", ["rust", "db"])?;
//! db.update_list("tags", |tags| tags.push("snapshot".into()))?;
//! db.commit_sync()?;
//! db.close().map_err(|e| e.into_error())?;
//! ```

use crate::config::{CorruptionPolicy, SnapConfig};
use crate::query::Query;
use snapdb_core::{
    validate_key, Document, DocumentCell, Element, Error, IntoPrimitive, Primitive, Record,
    Result, ValueKind,
};
use snapdb_durability::{CommitListener, CommitScheduler, CommitStats, LoadReport, SnapshotFile};
use snapdb_storage::MemoryStore;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// An open database session
pub struct Database {
    dir: PathBuf,
    config: SnapConfig,
    store: MemoryStore,
    committer: CommitScheduler,
    load_report: LoadReport,
}

impl Database {
    /// Open the database in `dir`
    ///
    /// Reads `dir/snapdb.toml` if present. See [`Database::open_with_config`].
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        check_directory(dir)?;
        let config = SnapConfig::load(dir)?;
        Self::open_with_config(dir, config)
    }

    /// Open the database in `dir` with an explicit configuration
    ///
    /// The directory must exist and be writable. A missing snapshot is
    /// created empty. An unreadable snapshot either resets the store (the
    /// loss is visible in [`Database::load_report`]) or fails with
    /// [`Error::LoadCorruption`], depending on the corruption policy.
    pub fn open_with_config(dir: impl AsRef<Path>, config: SnapConfig) -> Result<Self> {
        let dir = dir.as_ref();
        check_directory(dir)?;

        let file = SnapshotFile::new(dir, &config.snapshot_file, config.fsync);
        let (image, load_report) = file.load()?;

        if let Some(reason) = load_report.corruption() {
            if config.on_corruption == CorruptionPolicy::Abort {
                return Err(Error::LoadCorruption {
                    reason: reason.to_string(),
                });
            }
        }

        let store = MemoryStore::from_image(image);
        let committer = CommitScheduler::start(file)?;

        tracing::info!(
            target: "snapdb::engine",
            dir = %dir.display(),
            records = store.len(),
            primitives = store.primitive_count(),
            "Opened database"
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            config,
            store,
            committer,
            load_report,
        })
    }

    /// Directory this database lives in
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the snapshot file
    pub fn snapshot_path(&self) -> &Path {
        self.committer.path()
    }

    /// Active configuration
    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    /// What happened when the snapshot was loaded
    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    /// Commit counters
    pub fn commit_stats(&self) -> CommitStats {
        self.committer.stats()
    }

    /// Number of lists and documents
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// True when nothing at all is stored
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Check if a list or document exists under `id`
    pub fn contains_key(&self, id: &str) -> bool {
        self.store.contains(id)
    }

    // =========================================================================
    // Primitives
    // =========================================================================

    /// Insert, replace, or remove a primitive
    ///
    /// `value` must be text, a number, or a boolean; `None` (or JSON null)
    /// removes the entry. Requires a commit.
    ///
    /// # Errors
    ///
    /// - `InvalidKey`: `id` is empty
    /// - `InvalidValueType`: `value` is not a primitive
    pub fn put(&mut self, id: &str, value: impl IntoPrimitive) -> Result<()> {
        validate_key(id)?;
        let value = value.into_primitive()?;
        self.store.set_primitive(id, value);
        Ok(())
    }

    /// Get a primitive
    pub fn get(&self, id: &str) -> Option<&Primitive> {
        self.store.primitive(id)
    }

    /// Get a primitive, or `default` if it is not set
    pub fn get_or(&self, id: &str, default: impl Into<Primitive>) -> Primitive {
        self.store
            .primitive(id)
            .cloned()
            .unwrap_or_else(|| default.into())
    }

    // =========================================================================
    // Lists
    // =========================================================================

    /// Create or replace a list. Requires a commit.
    ///
    /// Elements may be primitives, documents, or a mix:
    ///
    /// ```ignore
    /// db.create_list("tags", ["rust", "db"])?;
    /// db.create_list("team", [alice, bob])?;
    /// db.create_list("mixed", [Element::from(1), Element::from(alice)])?;
    /// ```
    pub fn create_list<I, E>(&mut self, id: &str, items: I) -> Result<()>
    where
        I: IntoIterator<Item = E>,
        E: Into<Element>,
    {
        validate_key(id)?;
        let items = items.into_iter().map(Into::into).collect();
        self.store.insert(id, Record::List(items));
        Ok(())
    }

    /// Mutate a stored list in place, then schedule an async commit
    ///
    /// # Errors
    ///
    /// - `NoSuchKey`: nothing is stored under `id`
    /// - `TypeMismatch`: `id` holds a document
    pub fn update_list<F>(&mut self, id: &str, updater: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<Element>),
    {
        let record = self.store.get_mut(id).ok_or_else(|| Error::no_such_key(id))?;
        let describe = record.describe();
        let items = record
            .as_list_mut()
            .ok_or_else(|| Error::type_mismatch(id, ValueKind::List, describe))?;
        updater(items);
        self.commit_async();
        Ok(())
    }

    /// Return the list under `id`, creating an empty one if absent
    ///
    /// The returned list is live: changes are persisted by the next commit.
    pub fn create_or_get_list(&mut self, id: &str) -> Result<&mut Vec<Element>> {
        validate_key(id)?;
        let record = self
            .store
            .get_or_insert_with(id, || Record::List(Vec::new()));
        let describe = record.describe();
        record
            .as_list_mut()
            .ok_or_else(|| Error::type_mismatch(id, ValueKind::List, describe))
    }

    /// Read-only view of a list, or `None` if absent
    ///
    /// # Errors
    ///
    /// - `TypeMismatch`: `id` holds a document
    pub fn get_list(&self, id: &str) -> Result<Option<&[Element]>> {
        match self.store.get(id) {
            None => Ok(None),
            Some(Record::List(items)) => Ok(Some(items.as_slice())),
            Some(other) => Err(Error::type_mismatch(id, ValueKind::List, other.describe())),
        }
    }

    // =========================================================================
    // Documents
    // =========================================================================

    /// Create or replace a document. Requires a commit.
    pub fn create_object<T: Document>(&mut self, id: &str, doc: T) -> Result<()> {
        validate_key(id)?;
        self.store.insert(id, Record::Document(DocumentCell::new(doc)));
        Ok(())
    }

    /// Return the document under `id`, inserting `T::default()` if absent
    ///
    /// The returned reference is live: changes are persisted by the next
    /// commit.
    ///
    /// # Errors
    ///
    /// - `TypeMismatch`: `id` holds a list or another document type
    /// - `DocumentDecode`: the stored payload is not a valid `T`
    pub fn create_or_get_object<T: Document + Default>(&mut self, id: &str) -> Result<&mut T> {
        validate_key(id)?;
        let record = self
            .store
            .get_or_insert_with(id, || Record::Document(DocumentCell::new(T::default())));
        document_mut::<T>(id, record)
    }

    /// Borrow the document under `id` as `T`, or `None` if absent
    ///
    /// # Errors
    ///
    /// - `TypeMismatch`: `id` holds a list or another document type
    /// - `DocumentDecode`: the stored payload is not a valid `T`
    pub fn get_object<T: Document>(&self, id: &str) -> Result<Option<&T>> {
        let record = match self.store.get(id) {
            None => return Ok(None),
            Some(record) => record,
        };
        let cell = match record {
            Record::Document(cell) => cell,
            Record::List(_) => {
                return Err(Error::type_mismatch(id, document_kind::<T>(), record.describe()))
            }
        };
        match cell.downcast_ref::<T>() {
            Ok(Some(doc)) => Ok(Some(doc)),
            Ok(None) => Err(Error::type_mismatch(id, document_kind::<T>(), record.describe())),
            Err(reason) => Err(Error::DocumentDecode {
                key: id.to_string(),
                reason,
            }),
        }
    }

    /// Mutate a stored document in place, then schedule an async commit
    ///
    /// # Errors
    ///
    /// - `NoSuchKey`: nothing is stored under `id`
    /// - `TypeMismatch`: `id` holds a list or another document type
    /// - `DocumentDecode`: the stored payload is not a valid `T`
    pub fn update_object<T, F>(&mut self, id: &str, updater: F) -> Result<()>
    where
        T: Document,
        F: FnOnce(&mut T),
    {
        let record = self.store.get_mut(id).ok_or_else(|| Error::no_such_key(id))?;
        updater(document_mut::<T>(id, record)?);
        self.commit_async();
        Ok(())
    }

    // =========================================================================
    // Common
    // =========================================================================

    /// Remove the list or document under `id`. Requires a commit.
    ///
    /// Returns whether something was removed. Primitives are removed with
    /// `put(id, None)`.
    pub fn delete(&mut self, id: &str) -> bool {
        self.store.remove(id).is_some()
    }

    /// Read-only queries over the current contents
    pub fn query(&self) -> Query<'_> {
        Query::new(&self.store)
    }

    // =========================================================================
    // Commits
    // =========================================================================

    /// Write the snapshot now, blocking until it is on disk
    ///
    /// The session stays open whether or not the write succeeds.
    ///
    /// # Errors
    ///
    /// - `Encode`: a document failed to serialize
    /// - `CommitFailure`: the file could not be written
    pub fn commit_sync(&self) -> Result<()> {
        let bytes = self.encode()?;
        self.committer.commit_sync(bytes)
    }

    /// Schedule a snapshot write without waiting for it
    ///
    /// Failures are only logged.
    pub fn commit_async(&self) {
        self.schedule(None);
    }

    /// Schedule a snapshot write and report the outcome to `listener`
    pub fn commit_async_with(&self, listener: impl CommitListener) {
        self.schedule(Some(Box::new(listener)));
    }

    /// Block until every scheduled async commit has finished
    pub fn wait_for_commits(&self) {
        self.committer.wait_idle();
    }

    /// Final commit: write the snapshot and end the session
    ///
    /// On failure the session is handed back inside [`CloseError`] so the
    /// commit can be retried.
    pub fn close(self) -> std::result::Result<(), CloseError> {
        match self.commit_sync() {
            Ok(()) => {
                tracing::info!(target: "snapdb::engine", dir = %self.dir.display(), "Closed database");
                Ok(())
            }
            Err(error) => Err(CloseError {
                database: self,
                error,
            }),
        }
    }

    fn schedule(&self, listener: Option<Box<dyn CommitListener>>) {
        match self.encode() {
            Ok(bytes) => self.committer.commit_async(bytes, listener),
            Err(e) => {
                tracing::error!(target: "snapdb::engine", error = %e, "Async commit not scheduled");
                if let Some(listener) = listener {
                    listener.on_failed(&e);
                }
            }
        }
    }

    fn encode(&self) -> Result<Vec<u8>> {
        let image = self.store.to_image()?;
        tracing::debug!(
            target: "snapdb::engine",
            records = image.records.len(),
            primitives = image.primitives.len(),
            "Encoding snapshot"
        );
        image.encode()
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("dir", &self.dir)
            .field("records", &self.store.len())
            .field("primitives", &self.store.primitive_count())
            .finish()
    }
}

/// A failed [`Database::close`]
///
/// Carries the still-open database so the final commit can be retried.
pub struct CloseError {
    database: Database,
    error: Error,
}

impl CloseError {
    /// The commit error
    pub fn error(&self) -> &Error {
        &self.error
    }

    /// Drop the database, keeping the error
    pub fn into_error(self) -> Error {
        self.error
    }

    /// Recover the database and the error
    pub fn into_parts(self) -> (Database, Error) {
        (self.database, self.error)
    }
}

impl fmt::Debug for CloseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloseError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for CloseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "closing database failed: {}", self.error)
    }
}

impl std::error::Error for CloseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

fn document_kind<T: Document>() -> String {
    format!("{}({})", ValueKind::Document, T::type_tag())
}

fn document_mut<'r, T: Document>(id: &str, record: &'r mut Record) -> Result<&'r mut T> {
    let describe = record.describe();
    let cell = match record {
        Record::Document(cell) => cell,
        Record::List(_) => return Err(Error::type_mismatch(id, document_kind::<T>(), describe)),
    };
    match cell.downcast_mut::<T>() {
        Ok(Some(doc)) => Ok(doc),
        Ok(None) => Err(Error::type_mismatch(id, document_kind::<T>(), describe)),
        Err(reason) => Err(Error::DocumentDecode {
            key: id.to_string(),
            reason,
        }),
    }
}

fn check_directory(dir: &Path) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidDirectory {
        path: dir.to_path_buf(),
        reason: reason.to_string(),
    };
    let metadata = fs::metadata(dir).map_err(|e| invalid(&e.to_string()))?;
    if !metadata.is_dir() {
        return Err(invalid("not a directory"));
    }
    // mode bits alone do not tell whether this process may write
    tempfile::NamedTempFile::new_in(dir)
        .and_then(|scratch| scratch.close())
        .map_err(|e| invalid(&format!("not writable: {}", e)))
}
