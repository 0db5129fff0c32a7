use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use outlet_forge::api::{self, Endpoint, Health};
use outlet_forge::classifier::{Classifier, HttpClassifier, OfflineClassifier};
use outlet_forge::cli::{Cli, Commands};
use outlet_forge::config::Config;
use outlet_forge::download::DownloadDispatcher;
use outlet_forge::generator::{Generator, HttpGenerator, OfflineGenerator};
use outlet_forge::report::{self, DownloadReport};
use outlet_forge::{prompt, Workflow};
use outlet_forge_common::workflow::CLASSIFYING_MESSAGE;
use outlet_forge_common::{CustomizationOptions, Selections};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

type CliWorkflow = Workflow<Box<dyn Classifier>, Box<dyn Generator>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load().context("設定ファイルを読み込めません")?;

    match cli.command {
        Commands::Run {
            images,
            color,
            arrangement,
            wall_thickness,
            depth,
            notes,
            output,
            interactive,
        } => {
            println!("🔌 outlet-forge - モデル作成\n");

            let download_dir = output.unwrap_or_else(|| config.download_dir());
            let mut workflow = build_workflow(&config, cli.offline, download_dir)?;

            // 1-2. 取り込み・分類
            classify_images(&mut workflow, &images, 4).await?;
            for line in report::classification_lines(workflow.state().results()) {
                println!("  {}", line);
            }
            println!();

            // 3. カスタマイズ・生成
            workflow.customize()?;
            let mut selections = Selections {
                color,
                arrangement,
                wall_thickness,
                depth,
                notes,
            };
            loop {
                if interactive {
                    selections = prompt::ask_selections(&selections)?;
                    let options = match workflow.review(&selections) {
                        Ok(options) => options,
                        Err(e) if e.validation().is_some() => {
                            println!("⚠ {}\n", e);
                            continue;
                        }
                        Err(e) => return Err(e.into()),
                    };
                    print_summary(&options);
                    if !prompt::confirm_generate()? {
                        workflow.back_to_results()?;
                        workflow.customize()?;
                        continue;
                    }
                }

                let pending = workflow
                    .start_generation(&selections)
                    .context("カスタマイズ内容が不正です")?;
                if !interactive {
                    print_summary(pending.options());
                }
                println!("[3/4] モデル生成中...");
                let spinner = spinner(workflow.state().loading_message());
                let artifact = workflow.run_generation(&pending).await;
                spinner.finish_and_clear();
                workflow.complete_generation(pending, artifact)?;
                println!("✔ 生成完了\n");
                break;
            }

            // 4. 保存
            println!("[4/4] 保存中...");
            let path = workflow.download().with_context(|| {
                format!("保存に失敗しました: {}", workflow.download_dir().display())
            })?;
            if let Some(artifact) = workflow.state().artifact() {
                for line in DownloadReport::new(artifact, &path).lines() {
                    println!("  {}", line);
                }
            }

            println!("\n3Dプリントのヒント:");
            for line in report::tip_lines() {
                println!("  {}", line);
            }

            println!("\n✅ 完了");
        }

        Commands::Classify { images, json } => {
            if !json {
                println!("🔍 outlet-forge - 分類\n");
            }

            let mut workflow = build_workflow(&config, cli.offline, config.download_dir())?;
            classify_images(&mut workflow, &images, 2).await?;

            let results = workflow.state().results();
            if json {
                if let Some(result) = results.result() {
                    println!("{}", serde_json::to_string_pretty(result)?);
                }
            } else {
                for line in report::classification_lines(results) {
                    println!("  {}", line);
                }
                println!("\n✅ 分類完了");
            }
        }

        Commands::Health => {
            let endpoint = Endpoint::from_config(&config);
            println!("接続先: {}", endpoint.base_url());
            match api::check_health(&endpoint).await? {
                Health::Reachable(status) => println!("✔ 接続できました (HTTP {})", status),
                Health::Unreachable(reason) => {
                    println!("✘ 接続できません: {}", reason);
                    println!("  分類・生成はデモモード（代替値）で動作します");
                }
            }
        }

        Commands::Types => {
            println!("対応規格:");
            for line in report::outlet_type_lines() {
                println!("  {}", line);
            }
        }

        Commands::Config { set_api_url, show } => {
            let mut config = config;

            if let Some(url) = set_api_url {
                config.set_api_base_url(url)?;
                println!("✔ APIベースURLを設定しました");
            }

            if show {
                println!("設定:");
                println!("  設定ファイル: {}", Config::config_path()?.display());
                println!("  APIベースURL: {}", config.api_base_url());
                println!("  フォールバック待ち時間: {}ms", config.fallback_delay_ms);
                match config.timeout() {
                    Some(timeout) => println!("  タイムアウト: {}秒", timeout.as_secs()),
                    None => println!("  タイムアウト: 既定"),
                }
                println!("  保存先: {}", config.download_dir().display());
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build_workflow(
    config: &Config,
    offline: bool,
    download_dir: PathBuf,
) -> anyhow::Result<CliWorkflow> {
    let dispatcher = DownloadDispatcher::new(download_dir);

    if offline {
        let classifier: Box<dyn Classifier> =
            Box::new(OfflineClassifier::new(config.fallback_delay()));
        let generator: Box<dyn Generator> = Box::new(OfflineGenerator);
        return Ok(Workflow::new(classifier, generator, dispatcher));
    }

    let endpoint = Endpoint::from_config(config);
    let classifier: Box<dyn Classifier> = Box::new(
        HttpClassifier::new(endpoint.clone(), config.fallback_delay())
            .context("HTTPクライアントを作成できません")?,
    );
    let generator: Box<dyn Generator> =
        Box::new(HttpGenerator::new(endpoint).context("HTTPクライアントを作成できません")?);
    Ok(Workflow::new(classifier, generator, dispatcher))
}

/// 取り込みと分類（Idle → Results）
async fn classify_images(
    workflow: &mut CliWorkflow,
    images: &[PathBuf],
    total_steps: u8,
) -> anyhow::Result<()> {
    println!("[1/{}] 画像を取り込み中...", total_steps);
    let state = workflow.submit(images).await.context("画像を取り込めません")?;
    if let Some(candidate) = state.candidate() {
        println!(
            "✔ {} ({}, {})\n",
            candidate.file_name(),
            candidate.mime().as_mime(),
            report::format_size(candidate.bytes().len())
        );
    }

    println!("[2/{}] 分類中...", total_steps);
    let spinner = spinner(CLASSIFYING_MESSAGE);
    let classified = workflow.classify().await;
    spinner.finish_and_clear();
    let state = classified?;
    println!("✔ 分類完了");
    if let Some(preview) = state.preview() {
        println!("  {}", report::preview_line(preview));
    }
    println!();
    Ok(())
}

fn print_summary(options: &CustomizationOptions) {
    println!("カスタマイズ内容:");
    for line in report::summary_lines(options) {
        println!("  {}", line);
    }
    println!();
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner());
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
