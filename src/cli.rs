use clap::{Parser, Subcommand};
use essay_grader_common::ProcessMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "essay-grader")]
#[command(about = "作文画像の定位・処理・OCR・批改をまとめて実行するツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 作文画像をアップロードして全ステージを実行
    Run {
        /// 画像ファイルまたはフォルダ（複数指定可）
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// 出力フォルダ（デフォルト: ./essay-grader-YYYYmmdd-HHMMSS）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 処理結果の扱い (replace-image/keep-original)
        #[arg(long)]
        process_mode: Option<ProcessMode>,

        /// サーバーのベースURL（設定・環境変数より優先）
        #[arg(long)]
        base_url: Option<String>,

        /// OCR結果の確認・修正と、失敗時の再試行を対話で行う
        #[arg(short, long)]
        interactive: bool,
    },

    /// 設定を表示・変更
    Config {
        /// サーバーのベースURLを保存
        #[arg(long)]
        set_base_url: Option<String>,

        /// 処理結果の扱いを保存 (replace-image/keep-original)
        #[arg(long)]
        set_process_mode: Option<ProcessMode>,

        /// 現在の設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::parse_from([
            "essay-grader",
            "run",
            "a.jpg",
            "scans",
            "--process-mode",
            "keep-original",
            "-i",
        ]);
        match cli.command {
            Commands::Run { inputs, process_mode, interactive, .. } => {
                assert_eq!(inputs.len(), 2);
                assert_eq!(process_mode, Some(ProcessMode::KeepOriginal));
                assert!(interactive);
            }
            _ => panic!("run として解析されるべき"),
        }
    }

    #[test]
    fn test_run_requires_inputs() {
        assert!(Cli::try_parse_from(["essay-grader", "run"]).is_err());
    }
}
