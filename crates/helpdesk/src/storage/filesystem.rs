use std::io::Write;
use std::path::{Path, PathBuf};

use crate::db::AttachmentContainer;
use crate::error::StorageError;

/// Filesystem store for mail attachment contents.
///
/// Files land in `<root>/tickets/<id>/` or `<root>/comments/<id>/` under
/// their (already sanitized) original name.
pub struct AttachmentStore {
    root: PathBuf,
}

impl AttachmentStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `content` for the given container and returns the final path.
    pub fn store(
        &self,
        container: AttachmentContainer,
        filename: &str,
        content: &[u8],
    ) -> Result<PathBuf, StorageError> {
        let dir_path = self.container_directory(container);
        self.ensure_directory(&dir_path)?;

        self.store_with_atomic_creation(&dir_path, filename, content)
    }

    /// Directory holding the attachments of one ticket or comment.
    pub fn container_directory(&self, container: AttachmentContainer) -> PathBuf {
        let group = match container {
            AttachmentContainer::Ticket(_) => "tickets",
            AttachmentContainer::Comment(_) => "comments",
        };
        self.root.join(group).join(container.id().to_string())
    }

    /// Creates the file with `create_new` so an existing attachment is never
    /// overwritten; collisions get a `_2`, `_3`, ... suffix before the extension.
    fn store_with_atomic_creation(
        &self,
        dir_path: &Path,
        filename: &str,
        content: &[u8],
    ) -> Result<PathBuf, StorageError> {
        let (base, ext) = match filename.rfind('.') {
            Some(dot_pos) if dot_pos > 0 => (&filename[..dot_pos], Some(&filename[dot_pos..])),
            _ => (filename, None),
        };

        for counter in 1..=1000 {
            let try_filename = if counter == 1 {
                filename.to_string()
            } else {
                match ext {
                    Some(ext) => format!("{}_{}{}", base, counter, ext),
                    None => format!("{}_{}", base, counter),
                }
            };

            let try_path = dir_path.join(&try_filename);

            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&try_path)
            {
                Ok(mut file) => {
                    file.write_all(content)
                        .map_err(|e| StorageError::WriteFile {
                            path: try_path.clone(),
                            source: e,
                        })?;
                    return Ok(try_path);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(StorageError::WriteFile {
                        path: try_path,
                        source: e,
                    });
                }
            }
        }

        Err(StorageError::FileExists(dir_path.join(filename)))
    }

    fn ensure_directory(&self, path: &Path) -> Result<(), StorageError> {
        if !path.exists() {
            std::fs::create_dir_all(path).map_err(|e| StorageError::CreateDirectory {
                path: path.to_path_buf(),
                source: e,
            })?;
        }
        Ok(())
    }
}
