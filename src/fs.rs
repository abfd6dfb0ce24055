use std::io;
use std::path::Path;

/// The file operations the alias store performs.
///
/// [`crate::config::manager::ConfigManager`] is generic over this so tests
/// can run it against an in-memory store.
pub trait FileSystem {
    /// # Errors
    ///
    /// Fails when the file is missing, unreadable or not UTF-8.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replaces the file's contents, creating it when absent.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be created or written.
    fn write_all(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// # Errors
    ///
    /// Fails when any missing directory on `path` cannot be created.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    fn exists(&self, path: &Path) -> bool;
}

/// [`FileSystem`] backed by `std::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write_all(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        std::fs::write(path, contents)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
