use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use spike_coach::config::Config;
use spike_coach::feedback::read_feedback_log;
use spike_coach::pipeline::CancelToken;
use spike_coach::session::{analyze_video, SessionRequest};
use spike_coach::tracker::BBox;
use spike_coach::video::Rotation;

#[derive(Parser, Debug)]
#[command(name = "spike_coach", version = env!("GIT_VERSION"), about = "Jump and spike-arm feedback for volleyball videos")]
struct Cli {
    /// 設定ファイル。省略時は ./spike_coach.toml があれば読み、無ければデフォルト値
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 動画を解析して注釈つき動画とフィードバックログを出力する
    Analyze {
        #[arg(long, value_name = "PATH")]
        input: PathBuf,
        /// 出力動画（拡張子は .mp4 に置き換える）
        #[arg(long, value_name = "PATH")]
        output: PathBuf,
        /// 初期領域 x,y,w,h。省略時はウィンドウで選択
        #[arg(long, value_name = "X,Y,W,H")]
        roi: Option<BBox>,
        /// 強制回転（時計回り 0/90/180/270）
        #[arg(long, value_name = "DEGREES")]
        rotation: Option<Rotation>,
        #[arg(long, value_name = "PATH")]
        model: Option<PathBuf>,
    },
    /// フィードバックログを表示する
    Inspect {
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("spike_coach=info,ort=warn")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Analyze {
            input,
            output,
            roi,
            rotation,
            model,
        } => {
            let config = Config::resolve(cli.config.as_deref())?;

            let cancel = CancelToken::new();
            let handler_token = cancel.clone();
            ctrlc::set_handler(move || handler_token.cancel()).context("Error setting Ctrl-C handler")?;

            let request = SessionRequest {
                input,
                output,
                region: roi,
                rotation,
                model,
            };
            let artifacts = analyze_video(&request, &config, &cancel)?;

            info!(
                "Wrote {} ({} frames) and {} ({} events)",
                artifacts.video.display(),
                artifacts.summary.frames_written,
                artifacts.feedback.display(),
                artifacts.summary.events.len()
            );
            Ok(())
        }
        Command::Inspect { path, json } => {
            let rows = read_feedback_log(&path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for row in &rows {
                    println!("{:>8.2}  {:<5}  {}", row.time, row.kind.as_str(), row.feedback);
                }
            }
            Ok(())
        }
    }
}
