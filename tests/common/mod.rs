#![allow(dead_code)]

use std::path::{Path, PathBuf};

pub use cadence_test_utils::builders;
pub use cadence_test_utils::fakes;
pub use cadence_test_utils::{init_tracing, local, utc, with_timeout};

/// Write a task file below `dir`, creating parent directories.
pub fn write_task_file(dir: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create task dir");
    }
    std::fs::write(&path, contents).expect("write task file");
    path
}
