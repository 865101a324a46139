use crate::child::{Child, Word};
use crate::errors::BackendError;
use crate::recording::RecordingDate;

pub mod schema;

/// Operations the orchestration layer performs against the document
/// store. Absent children and words are `Option`/`bool` results, not
/// errors.
pub trait Db: Send + Sync {
    /// Returns every child in the store, in document order.
    fn children(&self) -> Result<Vec<Child>, BackendError>;

    /// Returns the child with exactly the given name.
    fn child(&self, name: &str) -> Result<Option<Child>, BackendError>;

    /// Replaces the stored child of the same name with the given one,
    /// appending it if no such child exists. The caller passes the
    /// fully mutated child, not a delta.
    fn save_child(&self, child: &Child) -> Result<(), BackendError>;

    /// Removes the named child. Returns whether anything was deleted.
    fn delete_child(&self, name: &str) -> Result<bool, BackendError>;

    /// Adds a word to the named child's vocabulary. Returns false
    /// when the child does not exist. Adding a word that already
    /// exists is a no-op.
    fn add_word(&self, child_name: &str, word: Word) -> Result<bool, BackendError>;

    /// Records an audio filename for the given word and date. Returns
    /// false when the child or word does not exist.
    fn add_recording(
        &self,
        child_name: &str,
        word_text: &str,
        date: RecordingDate,
        filename: &str,
    ) -> Result<bool, BackendError>;
}

pub use self::json::*;

mod json {
    use std::fs;
    use std::io::{ErrorKind, Write};
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex, MutexGuard};

    use tempfile::NamedTempFile;

    use super::schema::{Document, StoredChild};
    use crate::child::{Child, Word};
    use crate::errors::BackendError;
    use crate::log::{warn, Logger};
    use crate::recording::RecordingDate;

    /// A store that keeps the whole collection of children in one
    /// JSON file.
    ///
    /// Mutating operations are serialized through an internal lock so
    /// an in-process load-modify-save cannot drop a concurrent
    /// update. A writer in another process still wins wholesale (last
    /// write wins), which is the documented limit of the
    /// single-document model.
    pub struct JsonDb {
        logger: Arc<Logger>,
        path: PathBuf,
        writer: Mutex<()>,
    }

    impl JsonDb {
        pub fn new(logger: Arc<Logger>, path: impl Into<PathBuf>) -> Self {
            JsonDb {
                logger,
                path: path.into(),
                writer: Mutex::new(()),
            }
        }

        /// Reads the whole persisted document. A missing file is a
        /// first run and yields the empty document; an unreadable or
        /// unparseable one does too, with a warning, so corruption is
        /// distinguishable from first use in the logs.
        pub fn load(&self) -> Document {
            let raw = match fs::read(&self.path) {
                Ok(raw) => raw,
                Err(e) => {
                    if e.kind() != ErrorKind::NotFound {
                        warn!(self.logger, "Unable to read document, starting empty";
                              "path" => %self.path.display(), "error" => %e);
                    }

                    return Document::default();
                }
            };

            match serde_json::from_slice(&raw) {
                Ok(document) => document,
                Err(e) => {
                    warn!(self.logger, "Unable to parse document, starting empty";
                          "path" => %self.path.display(), "error" => %e);

                    Document::default()
                }
            }
        }

        /// Serializes and replaces the persisted document. The
        /// content is written to a temporary file in the same
        /// directory and renamed over the old one, so a reader never
        /// observes a partial document.
        pub fn save(&self, document: &Document) -> Result<(), BackendError> {
            let serialized = serde_json::to_vec_pretty(document)?;

            let directory = match self.path.parent() {
                Some(parent) if parent != Path::new("") => parent,
                _ => Path::new("."),
            };
            fs::create_dir_all(directory)?;

            let mut file =
                NamedTempFile::new_in(directory).map_err(BackendError::TemporaryFileError)?;
            file.write_all(&serialized)
                .map_err(BackendError::TemporaryFileError)?;
            file.persist(&self.path).map_err(|e| BackendError::Io(e.error))?;

            Ok(())
        }

        fn write_guard(&self) -> MutexGuard<()> {
            self.writer.lock().unwrap_or_else(|e| e.into_inner())
        }

        /// Loads and upgrades every stored child. A document that
        /// parses but does not survive the schema migration is
        /// treated like an unparseable one.
        fn load_children(&self) -> Vec<Child> {
            let document = self.load();

            match document
                .children
                .into_iter()
                .map(StoredChild::upgrade)
                .collect::<Result<Vec<_>, _>>()
            {
                Ok(children) => children,
                Err(e) => {
                    warn!(self.logger, "Unable to migrate document, starting empty";
                          "path" => %self.path.display(), "error" => %e);

                    vec![]
                }
            }
        }

        /// Whole-child replace inside an already-held write guard.
        fn replace_child(&self, child: &Child) -> Result<(), BackendError> {
            let mut document = self.load();

            document.children.retain(|c| c.name != child.name());
            document.children.push(StoredChild::from_domain(child));

            self.save(&document)
        }
    }

    impl super::Db for JsonDb {
        fn children(&self) -> Result<Vec<Child>, BackendError> {
            Ok(self.load_children())
        }

        fn child(&self, name: &str) -> Result<Option<Child>, BackendError> {
            Ok(self
                .load_children()
                .into_iter()
                .find(|child| child.name() == name))
        }

        fn save_child(&self, child: &Child) -> Result<(), BackendError> {
            let _guard = self.write_guard();

            self.replace_child(child)
        }

        fn delete_child(&self, name: &str) -> Result<bool, BackendError> {
            let _guard = self.write_guard();

            let mut document = self.load();
            let before = document.children.len();
            document.children.retain(|c| c.name != name);

            if document.children.len() == before {
                return Ok(false);
            }

            self.save(&document)?;

            Ok(true)
        }

        fn add_word(&self, child_name: &str, word: Word) -> Result<bool, BackendError> {
            let _guard = self.write_guard();

            let mut child = match self
                .load_children()
                .into_iter()
                .find(|child| child.name() == child_name)
            {
                Some(child) => child,
                None => return Ok(false),
            };

            child.add_word(word);
            self.replace_child(&child)?;

            Ok(true)
        }

        fn add_recording(
            &self,
            child_name: &str,
            word_text: &str,
            date: RecordingDate,
            filename: &str,
        ) -> Result<bool, BackendError> {
            let _guard = self.write_guard();

            let mut child = match self
                .load_children()
                .into_iter()
                .find(|child| child.name() == child_name)
            {
                Some(child) => child,
                None => return Ok(false),
            };

            match child.word_mut(word_text) {
                Some(word) => word.add_recording(date, filename),
                None => return Ok(false),
            }

            self.replace_child(&child)?;

            Ok(true)
        }
    }
}
