//! 接続設定の保存（localStorage）

use essay_grader_common::WorkflowConfig;
use gloo::storage::{LocalStorage, Storage};

const CONFIG_KEY: &str = "essay-grader.config";

/// ビルド時の `ESSAY_GRADER_API` をベースURLにした既定値
pub fn default_config() -> WorkflowConfig {
    let mut config = WorkflowConfig::default();
    if let Some(base_url) = option_env!("ESSAY_GRADER_API") {
        config.endpoints.base_url = base_url.to_string();
    }
    config
}

/// 保存済みの設定、なければ既定値
pub fn load_config() -> WorkflowConfig {
    LocalStorage::get(CONFIG_KEY).unwrap_or_else(|_| default_config())
}

pub fn save_config(config: &WorkflowConfig) -> Result<(), String> {
    LocalStorage::set(CONFIG_KEY, config).map_err(|e| format!("保存失败: {}", e))
}

pub fn clear_config() {
    LocalStorage::delete(CONFIG_KEY);
}
