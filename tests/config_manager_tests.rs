use aepcli::config::manager::ConfigManager;
use aepcli::config::models::ApiAlias;
use aepcli::error::ErrorKind;
use aepcli::fs::FileSystem;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// Mock FileSystem implementation for testing
#[derive(Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, Vec<u8>>>>,
    dirs: Arc<Mutex<HashMap<PathBuf, bool>>>,
    io_error_on_write: Arc<Mutex<bool>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_io_error_on_write(&self, value: bool) {
        *self.io_error_on_write.lock().unwrap() = value;
    }

    pub fn add_file(&self, path: &Path, content: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), content.as_bytes().to_vec());
    }

    pub fn get_file_content(&self, path: &Path) -> Option<String> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .map(|v| String::from_utf8_lossy(v).to_string())
    }

    pub fn has_dir(&self, path: &Path) -> bool {
        self.dirs.lock().unwrap().contains_key(path)
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .map(|v| String::from_utf8_lossy(v).to_string())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "File not found"))
    }

    fn write_all(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        if *self.io_error_on_write.lock().unwrap() {
            return Err(io::Error::other("Mock I/O error on write"));
        }
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.dirs.lock().unwrap().insert(path.to_path_buf(), true);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
            || self.dirs.lock().unwrap().contains_key(path)
    }
}

fn setup_manager() -> (ConfigManager<MockFileSystem>, MockFileSystem) {
    let fs = MockFileSystem::new();
    let manager = ConfigManager::with_fs(fs.clone(), PathBuf::from("/home/user/.config/aepcli"));
    (manager, fs)
}

fn alias(name: &str, openapi_path: &str) -> ApiAlias {
    ApiAlias {
        name: name.to_string(),
        openapi_path: openapi_path.to_string(),
        ..ApiAlias::default()
    }
}

#[test]
fn test_missing_config_file_is_empty_config() {
    let (manager, _fs) = setup_manager();
    let config = manager.load().unwrap();
    assert!(config.apis.is_empty());
    assert!(manager.list_apis().unwrap().is_empty());
}

#[test]
fn test_add_api_writes_toml_and_creates_dir() {
    let (manager, fs) = setup_manager();
    let api = ApiAlias {
        name: "bookstore".to_string(),
        openapi_path: "bookstore.json".to_string(),
        server_url: "http://localhost:8081".to_string(),
        headers: vec!["Authorization=Bearer x".to_string()],
        path_prefix: "/v1".to_string(),
    };
    manager.add_api(api.clone(), false).unwrap();

    assert!(fs.has_dir(Path::new("/home/user/.config/aepcli")));
    let content = fs
        .get_file_content(Path::new("/home/user/.config/aepcli/config.toml"))
        .unwrap();
    assert!(content.contains("[apis.bookstore]"));
    assert!(content.contains("openapi_path = \"bookstore.json\""));
    assert_eq!(manager.get_api("bookstore").unwrap(), api);
}

#[test]
fn test_add_existing_api_requires_overwrite() {
    let (manager, _fs) = setup_manager();
    manager.add_api(alias("bookstore", "a.json"), false).unwrap();

    let err = manager
        .add_api(alias("bookstore", "b.json"), false)
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Config));
    assert!(err.to_string().contains("already exists"));
    assert_eq!(manager.get_api("bookstore").unwrap().openapi_path, "a.json");

    manager.add_api(alias("bookstore", "b.json"), true).unwrap();
    assert_eq!(manager.get_api("bookstore").unwrap().openapi_path, "b.json");
}

#[test]
fn test_add_api_rejects_empty_name_and_bad_headers() {
    let (manager, fs) = setup_manager();
    let err = manager.add_api(alias("  ", "a.json"), false).unwrap_err();
    assert!(err.to_string().contains("api name cannot be empty"));

    let mut api = alias("bookstore", "a.json");
    api.headers = vec!["no-separator".to_string()];
    let err = manager.add_api(api, false).unwrap_err();
    assert!(err.to_string().contains("invalid header format"));
    assert!(fs
        .get_file_content(Path::new("/home/user/.config/aepcli/config.toml"))
        .is_none());
}

#[test]
fn test_get_unknown_api_is_error() {
    let (manager, _fs) = setup_manager();
    let err = manager.get_api("nope").unwrap_err();
    assert!(err
        .to_string()
        .contains("No API configuration found with name 'nope'"));
    assert!(manager.find_api("nope").unwrap().is_none());
}

#[test]
fn test_list_apis_is_sorted_by_name() {
    let (manager, _fs) = setup_manager();
    manager.add_api(alias("zoo", "z.json"), false).unwrap();
    manager.add_api(alias("bookstore", "b.json"), false).unwrap();
    let names: Vec<String> = manager
        .list_apis()
        .unwrap()
        .into_iter()
        .map(|api| api.name)
        .collect();
    assert_eq!(names, vec!["bookstore", "zoo"]);
}

#[test]
fn test_load_existing_file_with_defaults() {
    let (manager, fs) = setup_manager();
    fs.add_file(
        Path::new("/home/user/.config/aepcli/config.toml"),
        "[apis.roads]\nname = \"roads\"\nopenapi_path = \"https://roads.example.com/openapi.json\"\n",
    );
    let api = manager.get_api("roads").unwrap();
    assert_eq!(api.server_url, "");
    assert!(api.headers.is_empty());
    assert_eq!(
        manager.resolve_openapi_path(&api),
        "https://roads.example.com/openapi.json"
    );
}

#[test]
fn test_invalid_toml_is_config_error() {
    let (manager, fs) = setup_manager();
    fs.add_file(
        Path::new("/home/user/.config/aepcli/config.toml"),
        "[apis.roads\nname = ",
    );
    let err = manager.load().unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Config));
    assert!(err.to_string().contains("unable to decode config file"));
}

#[test]
fn test_write_failure_is_reported() {
    let (manager, fs) = setup_manager();
    fs.set_io_error_on_write(true);
    assert!(manager.add_api(alias("bookstore", "a.json"), false).is_err());
}

#[test]
fn test_resolve_openapi_path_relative_to_config_dir() {
    let fs = MockFileSystem::new();
    let manager =
        ConfigManager::with_config_file(fs, PathBuf::from("/etc/aepcli/custom.toml"));
    assert_eq!(manager.config_dir(), Path::new("/etc/aepcli"));
    assert_eq!(
        manager.resolve_openapi_path(&alias("a", "specs/bookstore.json")),
        "/etc/aepcli/specs/bookstore.json"
    );
    assert_eq!(
        manager.resolve_openapi_path(&alias("a", "/srv/bookstore.json")),
        "/srv/bookstore.json"
    );
}
