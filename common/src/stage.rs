//! ワークフローのステージ定義
//!
//! upload < locate < process < ocr < result の全順序を持つ閉じた列挙型

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Upload,
    Locate,
    Process,
    Ocr,
    Result,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Upload,
        Stage::Locate,
        Stage::Process,
        Stage::Ocr,
        Stage::Result,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<Stage> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(self) -> Option<Stage> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Upload => "upload",
            Stage::Locate => "locate",
            Stage::Process => "process",
            Stage::Ocr => "ocr",
            Stage::Result => "result",
        }
    }

    /// 画面表示用の名前
    pub fn label(self) -> &'static str {
        match self {
            Stage::Upload => "上传",
            Stage::Locate => "定位",
            Stage::Process => "处理",
            Stage::Ocr => "识别",
            Stage::Result => "结果",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s.to_lowercase())
            .ok_or_else(|| format!("Unknown stage: {}", s))
    }
}
