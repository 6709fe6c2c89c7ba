use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use nsum_inference::models::{create_model, VaderModel};
use nsum_inference::{Backend, SentimentAnalyzer, Summarizer};
use nsum_scrapers::{ArticlePipeline, ProxyConfig, ScraperConfig};
use nsum_web::{create_app, cors_layer, AppState, NewsService};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Find, summarize and score a news article for a topic", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    settings: Settings,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve POST /process-news
    Serve {
        #[arg(long, env = "NSUM_BIND", default_value = "127.0.0.1:5000")]
        bind: SocketAddr,
        /// Allowed CORS origin; any origin when unset
        #[arg(long, env = "NSUM_CORS_ORIGIN")]
        cors_origin: Option<String>,
    },
    /// Run the pipeline once and print the result as JSON
    Process {
        topic: String,
    },
}

#[derive(Args, Debug)]
struct Settings {
    #[arg(long, env = "SMARTPROXY_URL", global = true)]
    proxy_url: Option<String>,
    #[arg(long, env = "SMARTPROXY_USERNAME", global = true)]
    proxy_username: Option<String>,
    #[arg(long, env = "SMARTPROXY_PASSWORD", global = true, hide_env_values = true)]
    proxy_password: Option<String>,
    /// Chrome/Chromium executable; detected when unset
    #[arg(long, env = "CHROME_BIN", global = true)]
    chrome_bin: Option<PathBuf>,
    /// Launch Chrome without its sandbox (containers)
    #[arg(long, env = "NSUM_NO_SANDBOX", global = true)]
    no_sandbox: bool,
    #[arg(long, env = "NSUM_SUMMARIZER", value_enum, default_value = "huggingface", global = true)]
    summarizer: Backend,
    #[arg(long, env = "NSUM_MODEL", default_value = "facebook/bart-large-cnn", global = true)]
    model_name: String,
    #[arg(long, env = "NSUM_INFERENCE_URL", global = true)]
    inference_url: Option<String>,
    #[arg(long, env = "HF_API_TOKEN", global = true, hide_env_values = true)]
    api_key: Option<String>,
    /// Maximum simultaneous summarization calls
    #[arg(long, env = "NSUM_INFERENCE_CONCURRENCY", global = true)]
    inference_concurrency: Option<usize>,
}

impl Settings {
    fn scraper_config(&self) -> ScraperConfig {
        let mut config = ScraperConfig {
            proxy: ProxyConfig::from_parts(
                self.proxy_url.clone(),
                self.proxy_username.clone(),
                self.proxy_password.clone(),
            ),
            ..ScraperConfig::default()
        };
        config.browser.chrome_bin = self.chrome_bin.clone();
        config.browser.no_sandbox = self.no_sandbox;
        config
    }

    fn inference_config(&self) -> nsum_inference::Config {
        nsum_inference::Config {
            backend: self.summarizer,
            model_name: self.model_name.clone(),
            api_key: self.api_key.clone(),
            endpoint: self.inference_url.clone(),
            max_concurrency: self.inference_concurrency,
            ..nsum_inference::Config::default()
        }
    }

    fn build_service(&self) -> anyhow::Result<NewsService> {
        let scraper_config = self.scraper_config();
        if let Some(proxy) = &scraper_config.proxy {
            info!(proxy = %proxy.server, "🌐 Routing scraper traffic through proxy");
        }
        let pipeline = ArticlePipeline::from_config(&scraper_config).context("building article pipeline")?;

        let model = create_model(&self.inference_config()).context("initializing summarization model")?;
        info!("🧠 Inference model initialized successfully (using {})", model.name());

        Ok(NewsService::new(
            pipeline,
            Summarizer::new(model),
            SentimentAnalyzer::new(Arc::new(VaderModel::new())),
        ))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let service = cli.settings.build_service()?;

    match cli.command {
        Commands::Serve { bind, cors_origin } => {
            let cors = cors_layer(cors_origin.as_deref())?;
            let app = create_app(AppState::new(service), cors);

            let listener = tokio::net::TcpListener::bind(bind)
                .await
                .with_context(|| format!("binding {}", bind))?;
            info!("🚀 Listening on http://{}", bind);
            axum::serve(listener, app).await.context("server error")?;
        }
        Commands::Process { topic } => {
            info!("🦗 Processing topic {:?}", topic);
            let article = service.process(&topic).await?;
            println!("{}", serde_json::to_string_pretty(&article)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_process_with_lead_backend() {
        let cli = Cli::try_parse_from([
            "nsum",
            "process",
            "climate change",
            "--summarizer",
            "lead",
            "--inference-concurrency",
            "2",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Process { ref topic } if topic == "climate change"));
        let config = cli.settings.inference_config();
        assert_eq!(config.backend, Backend::Lead);
        assert_eq!(config.max_concurrency, Some(2));
    }

    #[test]
    fn test_parse_serve_with_proxy() {
        let cli = Cli::try_parse_from([
            "nsum",
            "serve",
            "--bind",
            "0.0.0.0:8080",
            "--proxy-url",
            "http://gate.example:7000",
            "--proxy-username",
            "user",
            "--proxy-password",
            "secret",
            "--no-sandbox",
        ])
        .unwrap();

        match cli.command {
            Commands::Serve { bind, .. } => assert_eq!(bind.port(), 8080),
            other => panic!("unexpected command: {:?}", other),
        }
        let config = cli.settings.scraper_config();
        let proxy = config.proxy.unwrap();
        assert_eq!(proxy.server, "http://gate.example:7000");
        assert_eq!(proxy.credentials(), Some(("user", "secret")));
        assert!(config.browser.no_sandbox);
    }

    #[test]
    fn test_blank_proxy_url_means_direct() {
        let cli = Cli::try_parse_from(["nsum", "process", "rust", "--proxy-url", ""]).unwrap();
        assert!(cli.settings.scraper_config().proxy.is_none());
    }
}
