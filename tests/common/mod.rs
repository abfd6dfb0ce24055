//! Shared test utilities for binary tests

use std::path::PathBuf;

/// Cached binary path for the aepcli binary
#[allow(deprecated)]
pub static AEPCLI_BIN: std::sync::LazyLock<PathBuf> =
    std::sync::LazyLock::new(|| assert_cmd::cargo::cargo_bin("aepcli"));

/// Command for the aepcli binary with an isolated config directory
pub fn aepcli_cmd(config_dir: &std::path::Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(&*AEPCLI_BIN);
    cmd.env("AEPCLI_CONFIG_DIR", config_dir)
        .env_remove("AEPCLI_LOG")
        .env_remove("AEPCLI_LOG_FORMAT")
        .env_remove("AEPCLI_LOG_FILE");
    cmd
}

/// Path of a file under `tests/fixtures`
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}
