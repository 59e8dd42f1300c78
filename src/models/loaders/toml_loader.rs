use crate::error::{AppError, AppResult, FileError};
use crate::models::quiz::QuizSettings;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载测验设置预设，加载后立即校验
pub async fn load_settings_preset(toml_file_path: &Path) -> AppResult<QuizSettings> {
    let path_str = toml_file_path.display().to_string();

    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(&path_str, e))?;

    let settings: QuizSettings = toml::from_str(&content).map_err(|e| FileError::TomlParseFailed {
        path: path_str.clone(),
        source: Box::new(e),
    })?;

    settings.validate()?;
    Ok(settings)
}

/// 加载文件夹中所有的设置预设，返回 (文件名, 设置)
///
/// 单个文件解析失败只记录警告，不影响其他文件
pub async fn load_all_settings_presets(folder_path: &str) -> AppResult<Vec<(String, QuizSettings)>> {
    let folder = PathBuf::from(folder_path);

    let mut presets = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .map_err(|e| AppError::file_read_failed(folder_path, e))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("toml") {
            continue;
        }

        let name = path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        tracing::info!("正在加载设置预设: {}", name);

        match load_settings_preset(&path).await {
            Ok(settings) => presets.push((name, settings)),
            Err(e) => tracing::warn!("加载预设失败 {}: {}", path.display(), e),
        }
    }

    presets.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(presets)
}
