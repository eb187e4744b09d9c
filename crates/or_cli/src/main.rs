use clap::{Parser, Subcommand};
use or_analysis::{aggregate_external_links, BatchConfig, BatchPolicy, BatchRunner};
use or_fetchers::{init_logging, FetchArgs, FetchConfig, FetcherRegistry};
use or_inference::{create_model, Config, ModelKind};
use or_storage::{create_cache, CacheKind};
use or_web::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(name = "outrank", author, version, about = "Analyze competing content and synthesize an outline to outrank it", long_about = None)]
pub struct Cli {
    /// Text model backend: openai or dummy
    #[arg(long, env = "OUTRANK_MODEL", default_value = "openai")]
    model: String,
    #[arg(long, env = "OUTRANK_MODEL_NAME")]
    model_name: Option<String>,
    #[arg(long, env = "OPENAI_BASE_URL")]
    model_url: Option<String>,
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,
    #[arg(long, env = "EXTRACTION_API_TOKEN", hide_env_values = true)]
    extraction_token: Option<String>,
    #[arg(long, env = "EXTRACTION_API_URL")]
    extraction_url: Option<String>,
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    youtube_api_key: Option<String>,
    /// Transcript cache backend: memory or sqlite
    #[arg(long, env = "OUTRANK_CACHE", default_value = "memory")]
    cache: String,
    #[arg(long, env = "OUTRANK_CACHE_PATH")]
    cache_path: Option<PathBuf>,
    /// -v for debug, -vv for trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze competitor URLs and print the batch result as JSON
    Analyze {
        /// Focus keyword the outline should rank for
        #[arg(short, long)]
        keyword: String,
        #[arg(required = true)]
        urls: Vec<String>,
        /// Keep going when some URLs fail
        #[arg(long)]
        partial: bool,
        /// Fill recommended external links from the competitors' links
        #[arg(long)]
        with_links: bool,
        /// Attempts for the whole batch
        #[arg(long, default_value_t = 3)]
        attempts: u32,
    },
    /// Fetch a single URL and print what was retrieved
    Fetch(FetchArgs),
    /// Start the HTTP API
    Serve {
        #[arg(long, env = "OUTRANK_ADDR", default_value = "127.0.0.1:8080")]
        addr: SocketAddr,
        /// Include error debug chains in responses
        #[arg(long)]
        dev: bool,
    },
}

impl Cli {
    fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }

    fn fetch_config(&self) -> FetchConfig {
        let mut config = FetchConfig::default()
            .with_extraction_token(self.extraction_token.clone())
            .with_youtube_api_key(self.youtube_api_key.clone());
        if let Some(url) = &self.extraction_url {
            config.extraction_base_url = url.clone();
        }
        config
    }

    fn model_config(&self) -> Config {
        Config {
            api_key: self.openai_api_key.clone(),
            model_name: self.model_name.clone(),
            base_url: self.model_url.clone(),
        }
    }

    async fn registry(&self) -> or_core::Result<FetcherRegistry> {
        let cache = create_cache(CacheKind::parse(&self.cache, self.cache_path.as_deref())?).await?;
        FetcherRegistry::with_defaults(self.fetch_config(), cache)
    }

    async fn runner(&self, config: BatchConfig) -> or_core::Result<BatchRunner> {
        let model = create_model(ModelKind::parse(&self.model)?, self.model_config())?;
        Ok(BatchRunner::from_parts(self.registry().await?, model, config))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level());

    match &cli.command {
        Commands::Analyze { keyword, urls, partial, with_links, attempts } => {
            let config = BatchConfig {
                max_attempts: *attempts,
                backoff_step: Duration::from_secs(2),
                policy: if *partial { BatchPolicy::Partial } else { BatchPolicy::FailFast },
            };
            let runner = cli.runner(config).await?;
            let mut batch = runner.run_batch_analysis(urls, keyword).await?;
            if *with_links {
                batch.ideal_structure.recommended_external_links = aggregate_external_links(&batch.analyses);
            }
            info!(
                "✅ {} analyses, {} outline sections, target {} words",
                batch.analyses.len(),
                batch.ideal_structure.outline.len(),
                batch.ideal_structure.target_word_count
            );
            println!("{}", serde_json::to_string_pretty(&batch)?);
        }
        Commands::Fetch(args) => {
            let registry = cli.registry().await?;
            or_fetchers::handle_command(args.clone(), &registry).await?;
        }
        Commands::Serve { addr, dev } => {
            let runner = cli.runner(BatchConfig::default()).await?;
            or_web::serve(*addr, AppState::new(runner).with_dev_mode(*dev)).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_analyze() {
        let cli = Cli::try_parse_from([
            "outrank",
            "--model",
            "dummy",
            "-vv",
            "analyze",
            "--keyword",
            "indoor composting",
            "https://a.test/1",
            "https://b.test/2",
            "--partial",
        ])
        .unwrap();
        assert_eq!(cli.model, "dummy");
        assert_eq!(cli.log_level(), Level::TRACE);
        match cli.command {
            Commands::Analyze { keyword, urls, partial, with_links, attempts } => {
                assert_eq!(keyword, "indoor composting");
                assert_eq!(urls.len(), 2);
                assert!(partial);
                assert!(!with_links);
                assert_eq!(attempts, 3);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_analyze_requires_urls() {
        assert!(Cli::try_parse_from(["outrank", "analyze", "--keyword", "x"]).is_err());
    }

    #[test]
    fn test_fetch_and_serve() {
        let cli = Cli::try_parse_from(["outrank", "fetch", "https://redd.it/abc", "--kind"]).unwrap();
        assert!(matches!(cli.command, Commands::Fetch(FetchArgs { kind: true, .. })));

        let cli = Cli::try_parse_from(["outrank", "serve", "--addr", "0.0.0.0:9000"]).unwrap();
        match cli.command {
            Commands::Serve { addr, dev } => {
                assert_eq!(addr.port(), 9000);
                assert!(!dev);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_extraction_url_override() {
        let cli = Cli::try_parse_from([
            "outrank",
            "--extraction-url",
            "http://localhost:9999/v3",
            "fetch",
            "https://example.com",
        ])
        .unwrap();
        assert_eq!(cli.fetch_config().extraction_base_url, "http://localhost:9999/v3");
    }
}
