use anyhow::Context;
use clap::Parser;
use essay_grader::{cli, config, pipeline, review, scanner, transport};
use essay_grader_common::Workflow;
use cli::{Cli, Commands};
use config::Config;

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load().context("設定ファイルの読み込みに失敗")?;

    match cli.command {
        Commands::Run { inputs, output, process_mode, base_url, interactive } => {
            println!("📝 essay-grader - 作文批改\n");

            let mut workflow_config = config.effective_workflow();
            if let Some(base_url) = base_url {
                workflow_config.endpoints.base_url = base_url;
            }
            if let Some(mode) = process_mode {
                workflow_config.process_mode = mode;
            }
            println!("- サーバー: {}", workflow_config.endpoints.base_url);
            println!("- 処理結果: {}\n", workflow_config.process_mode);

            let files = scanner::collect_uploads(&inputs)?;
            println!("✔ {}枚の画像を検出\n", files.len());

            let http = transport::HttpTransport::new(config.timeout_seconds)?;
            let mut workflow = Workflow::new(http, workflow_config);

            let outcome = if interactive {
                pipeline::run_pipeline(&mut workflow, &files, &mut review::PromptReviewer).await
            } else {
                pipeline::run_pipeline(&mut workflow, &files, &mut review::AutoApprove).await
            };

            // 失敗しても途中までの結果は書き出す
            let output_dir = output.unwrap_or_else(pipeline::default_output_dir);
            let written = pipeline::write_outputs(workflow.state(), &output_dir)
                .with_context(|| format!("出力に失敗: {}", output_dir.display()))?;

            if let Err(e) = outcome {
                println!("\n途中結果を保存: {}", written.workflow.display());
                return Err(e.into());
            }

            for path in &written.results {
                println!("✔ 批改結果: {}", path.display());
            }
            if let Some(path) = &written.ocr {
                println!("✔ OCR結果: {}", path.display());
            }
            println!("\n✅ 完了: {}", output_dir.display());
        }

        Commands::Config { set_base_url, set_process_mode, show } => {
            let mut config = config;

            if let Some(url) = set_base_url {
                config.set_base_url(url)?;
                println!("✔ サーバーのURLを設定しました");
            }

            if let Some(mode) = set_process_mode {
                config.set_process_mode(mode)?;
                println!("✔ 処理結果の扱いを設定しました");
            }

            if show {
                let workflow = config.effective_workflow();
                println!("設定:");
                println!("  サーバー: {}", workflow.endpoints.base_url);
                println!("  定位: {}", workflow.endpoints.locate_url());
                println!("  処理: {}", workflow.endpoints.process_url());
                println!("  OCR: {}", workflow.endpoints.ocr_url());
                println!("  批改: {}", workflow.endpoints.render_url());
                println!("  処理結果: {}", workflow.process_mode);
                println!("  ファイル上限: {}MB ({})", workflow.upload.max_size_mb, workflow.upload.accept.join(", "));
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                if std::env::var(config::BASE_URL_ENV).is_ok() {
                    println!("  ({} で上書き中)", config::BASE_URL_ENV);
                }
            }
        }
    }

    Ok(())
}
