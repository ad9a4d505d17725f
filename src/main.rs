mod commands;
mod gateway;
mod replies;

use clap::{Parser, Subcommand};
use recap_channels::{TelegramChannel, WhisperTranscriber};
use recap_core::{
    config::{self, shellexpand, Config},
    traits::{Provider, Transcriber},
};
use recap_memory::Store;
use recap_providers::{AnthropicProvider, OpenAiProvider, RetryPolicy, RetryingProvider};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "recap",
    version,
    about = "Recap — group-chat recorder and summary bot"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml", env = "RECAP_CONFIG")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot.
    Start,
    /// Show configuration and database statistics.
    Status,
    /// Delete stored messages older than the retention period, once.
    Cleanup {
        /// Override the configured retention period.
        #[arg(long)]
        days: Option<u32>,
    },
    /// Write a timestamped copy of the database.
    Backup {
        /// Target directory. Defaults to `{data_dir}/backups`.
        #[arg(long)]
        dir: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;
    let _guard = init_logging(&cfg)?;

    match cli.command {
        Commands::Start => {
            cfg.validate()?;

            let provider = build_provider(&cfg)?;
            if !provider.is_available().await {
                anyhow::bail!("provider '{}' is not available", provider.name());
            }

            let tg = cfg.channel.telegram.clone().unwrap_or_default();
            let channel = Arc::new(TelegramChannel::new(tg));
            let transcriber = build_transcriber(&cfg);
            let store = Store::new(&cfg.memory).await?;

            info!("Recap — starting bot '{}'", cfg.bot.name);
            let gw = Arc::new(gateway::Gateway::new(
                provider,
                channel,
                transcriber,
                store,
                &cfg,
            )?);
            gw.run().await?;
        }
        Commands::Status => {
            println!("Recap — Status\n");
            println!("Config: {}", cli.config);
            println!("Provider: {}", cfg.provider.default);
            println!("Database: {}", shellexpand(&cfg.memory.db_path));
            println!(
                "Transcription: {}",
                if cfg.transcription.enabled {
                    "enabled"
                } else {
                    "disabled"
                }
            );
            println!(
                "Retention: {} days, sweep every {}h",
                cfg.retention.cleanup_days, cfg.retention.interval_hours
            );
            match cfg.validate() {
                Ok(()) => println!("Config check: ok"),
                Err(e) => println!("Config check: {e}"),
            }
            println!();

            let store = Store::new(&cfg.memory).await?;
            println!("  messages: {}", store.count(None).await?);
            println!("  size: {} bytes", store.db_size().await?);
            store.close().await;
        }
        Commands::Cleanup { days } => {
            let days = days.unwrap_or(cfg.retention.cleanup_days);
            let store = Store::new(&cfg.memory).await?;
            let deleted = store.cleanup(days).await?;
            println!("Deleted {deleted} messages older than {days} days.");
            store.close().await;
        }
        Commands::Backup { dir } => {
            let dir = match dir {
                Some(d) => PathBuf::from(shellexpand(&d)),
                None => PathBuf::from(shellexpand(&cfg.bot.data_dir)).join("backups"),
            };
            let store = Store::new(&cfg.memory).await?;
            let dest = backup_path(&dir, chrono::Local::now());
            let result = store.backup(&dest).await;
            store.close().await;
            result?;

            let size = std::fs::metadata(&dest)?.len();
            if size == 0 {
                anyhow::bail!("backup at {} is empty", dest.display());
            }
            println!("Backup written to {} ({size} bytes).", dest.display());
        }
    }

    Ok(())
}

/// `{dir}/recap_backup_YYYYmmdd_HHMMSS.db`.
fn backup_path(dir: &Path, now: chrono::DateTime<chrono::Local>) -> PathBuf {
    dir.join(format!("recap_backup_{}.db", now.format("%Y%m%d_%H%M%S")))
}

/// Stdout plus a daily rolling file under `{data_dir}/logs`.
///
/// The returned guard flushes the file writer on drop; keep it alive.
fn init_logging(cfg: &Config) -> anyhow::Result<WorkerGuard> {
    let log_dir = PathBuf::from(shellexpand(&cfg.bot.data_dir)).join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&log_dir, "recap.log"));

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.bot.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();
    Ok(guard)
}

/// Build the configured provider, wrapped in the retry policy.
fn build_provider(cfg: &Config) -> anyhow::Result<Arc<dyn Provider>> {
    let p = &cfg.provider;
    let inner: Box<dyn Provider> = match p.default.as_str() {
        "openai" => Box::new(OpenAiProvider::from_config(
            &p.openai.clone().unwrap_or_default(),
            p.max_tokens,
            p.temperature,
        )),
        "anthropic" => Box::new(AnthropicProvider::from_config(
            &p.anthropic.clone().unwrap_or_default(),
            p.max_tokens,
            p.temperature,
        )),
        "yagpt" => Box::new(OpenAiProvider::yandex(
            &p.yandex.clone().unwrap_or_default(),
            p.max_tokens,
            p.temperature,
        )),
        other => anyhow::bail!("unsupported provider: {other}"),
    };
    Ok(Arc::new(RetryingProvider::new(inner, RetryPolicy::default())))
}

/// Speech-to-text, if enabled and a key is available.
///
/// Falls back to the OpenAI key when no dedicated one is configured.
fn build_transcriber(cfg: &Config) -> Option<Arc<dyn Transcriber>> {
    if !cfg.transcription.enabled {
        return None;
    }
    let key = if cfg.transcription.api_key.is_empty() {
        cfg.provider
            .openai
            .as_ref()
            .map(|c| c.api_key.clone())
            .unwrap_or_default()
    } else {
        cfg.transcription.api_key.clone()
    };
    if key.is_empty() {
        warn!("transcription enabled but no API key configured; voice messages will be skipped");
        return None;
    }
    Some(Arc::new(WhisperTranscriber::new(&cfg.transcription, key)))
}
