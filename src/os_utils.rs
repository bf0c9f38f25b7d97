//! Utilities pertaining to filesystem and other os-level settings
//!

use camino::Utf8Path;
use unwrap::unwrap;

/// Create a directory and all of its parents if it does not exist already
///
/// * `label` - used to describe the directory in an error message
///
pub fn create_dir_all(dir: &Utf8Path, label: &str) {
    if !dir.is_dir() {
        unwrap!(
            std::fs::create_dir_all(dir),
            "Can't create new {label} directory at '{dir}'"
        );
    }
}

/// Attempt to increase open file limit to the system's hard limit on *nix-like systems
///
/// This is an optional increase so continue through all failure cases without error.
///
pub fn attempt_max_open_file_limit() {
    use rlimit::Resource;

    let Ok((soft, hard)) = Resource::NOFILE.get() else {
        return;
    };

    if soft < hard {
        rlimit::setrlimit(Resource::NOFILE, hard, hard).unwrap_or_default();
    }
}
