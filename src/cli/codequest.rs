use std::{io::Read as _, path::PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use crate::{app::App, config::BotConfig};

#[derive(Parser, Debug)]
#[command(name = "codequest", version, about = "CodeQuest Slack assistant", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: BotConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer Slack mentions over Socket Mode
    Serve,

    /// Answer one documentation question and exit
    Ask { question: String },

    /// Explain a code snippet and exit
    Explain {
        #[arg(help = "File holding the snippet. Reads stdin when omitted.")]
        file: Option<PathBuf>,
    },
}

pub async fn codequest_cli(args: Vec<String>) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse_from(args);
    let config = cli.config.with_env_api_key();

    match cli.command {
        Commands::Serve => {
            config.slack_tokens()?;
            let app = App::init(config).await?;
            app.serve().await
        }
        Commands::Ask { question } => {
            let app = App::init(config).await?;
            let answer = app.doc.answer(question.trim()).await?;
            println!("{}", answer.text);
            Ok(())
        }
        Commands::Explain { file } => {
            let snippet = match file {
                Some(path) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("Failed to read stdin")?;
                    buf
                }
            };
            let explainer = App::init_code_explainer(&config)?;
            let answer = explainer.explain(&snippet).await?;
            println!("{}", answer.text);
            Ok(())
        }
    }
}
