use crate::error::{EssayGraderError, Result};
use essay_grader_common::{ProcessMode, WorkflowConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// ベースURLを上書きする環境変数
pub const BASE_URL_ENV: &str = "ESSAY_GRADER_BASE_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub workflow: WorkflowConfig,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workflow: WorkflowConfig::default(),
            timeout_seconds: 120,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| EssayGraderError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("essay-grader").join("config.json"))
    }

    /// 実行時に使うワークフロー設定（環境変数を優先）
    pub fn effective_workflow(&self) -> WorkflowConfig {
        let mut workflow = self.workflow.clone();
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            if !base_url.trim().is_empty() {
                workflow.endpoints.base_url = base_url.trim().to_string();
            }
        }
        workflow
    }

    pub fn set_base_url(&mut self, base_url: String) -> Result<()> {
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(EssayGraderError::Config(format!(
                "URLは http:// または https:// で始めてください: {}",
                base_url
            )));
        }
        self.workflow.endpoints.base_url = base_url;
        self.save()
    }

    pub fn set_process_mode(&mut self, mode: ProcessMode) -> Result<()> {
        self.workflow.process_mode = mode;
        self.save()
    }
}
