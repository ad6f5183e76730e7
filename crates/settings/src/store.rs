use std::fs;
use std::path::Path;

use analyse_core::{AnalyseSession, Pattern, PatternList};

use crate::document::{parse_config, render_config};
use crate::ConfigError;

/// 載入設定時要取代或附加既有清單。 / Whether a loaded configuration replaces or extends the current list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadMode {
    #[default]
    Replace,
    Append,
}

/// 讀取設定檔中的樣式清單。 / Reads the patterns stored in a configuration file.
pub fn load_config(path: impl AsRef<Path>) -> Result<Vec<Pattern>, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let patterns = parse_config(&contents).map_err(|err| match err {
        ConfigError::Decode(source) => ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })?;
    log::info!("loaded {} patterns from {}", patterns.len(), path.display());
    Ok(patterns)
}

/// 載入設定到工作階段；失敗時不更動既有內容。 / Loads a configuration into the session.
/// The file is parsed completely before the session is touched, so a failed
/// load leaves the previous list in place. Returns the number of patterns read.
pub fn load_into(
    path: impl AsRef<Path>,
    session: &mut AnalyseSession,
    mode: LoadMode,
) -> Result<usize, ConfigError> {
    let patterns = load_config(path)?;
    let count = patterns.len();
    match mode {
        LoadMode::Replace => session.replace_patterns(patterns),
        LoadMode::Append => session.append_patterns(patterns),
    }
    Ok(count)
}

/// 儲存樣式清單。 / Saves the pattern list.
pub fn save_config(path: impl AsRef<Path>, patterns: &PatternList) -> Result<(), ConfigError> {
    let xml = render_config(patterns, None)?;
    write_atomic(path.as_ref(), &xml)
}

/// 匯出樣式與命中數。 / Writes the pattern list together with each pattern's hit count.
pub fn export_with_hits(
    path: impl AsRef<Path>,
    session: &AnalyseSession,
) -> Result<(), ConfigError> {
    let xml = render_config(session.patterns(), Some(session.results()))?;
    write_atomic(path.as_ref(), &xml)
}

fn write_atomic(path: &Path, payload: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, payload.as_bytes()).map_err(|source| ConfigError::Write {
        path: tmp_path.clone(),
        source,
    })?;
    if let Err(source) = fs::rename(&tmp_path, path) {
        if let Err(err) = fs::remove_file(&tmp_path) {
            log::warn!("unable to remove {}: {err}", tmp_path.display());
        }
        return Err(ConfigError::Write {
            path: path.to_path_buf(),
            source,
        });
    }
    log::debug!("wrote {}", path.display());
    Ok(())
}
