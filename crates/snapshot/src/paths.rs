use crate::GameDate;
use std::path::{Path, PathBuf};

pub const BUILD_DIR_NAME: &str = "build";
pub const GENERATED_DIR_NAME: &str = "generated";
pub const SAVEGAME_EXTENSION: &str = "gz";

const STORE_FILE_PREFIX: &str = "savegame_";
const STORE_FILE_EXTENSION: &str = "db";

/// `<build_dir>/savegame_<YYYY-MM-DD>.db`
#[must_use]
pub fn store_path(build_dir: &Path, date: &GameDate) -> PathBuf {
    build_dir.join(format!(
        "{STORE_FILE_PREFIX}{}.{STORE_FILE_EXTENSION}",
        date.iso()
    ))
}

/// File-name pattern of savegames for `date`: `*_<Y>-<M>-<D>.gz`.
#[must_use]
pub fn savegame_pattern(date: &GameDate) -> String {
    format!("*_{}.{SAVEGAME_EXTENSION}", date.savegame_token())
}
