// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, debug, info, warn};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use translate_relay::app_config::{self, BackendKind, Config, parse_weight_list};
use translate_relay::providers::mock::MockBackend;
use translate_relay::translation::{FsModelRegistry, PivotTranslationRouter, TagProtector};
use translate_relay::{AppError, Backend, EndpointConfiguration, TranslationOptions, TranslationService};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the merged language catalog of all endpoints as JSON
    Languages,

    /// Pick the endpoint serving a language pair
    Select {
        /// Source language code
        #[arg(short, long)]
        from: String,

        /// Target language code
        #[arg(short, long)]
        to: String,

        /// Number of draws; above 1 the selection split is printed instead
        #[arg(short = 'n', long, default_value_t = 1)]
        samples: usize,
    },

    /// Show how markup in a text is protected before translation
    Protect {
        /// Text to protect
        text: String,
    },

    /// Show how the local engine's models serve a language pair
    Route {
        /// Source language code
        #[arg(short, long)]
        from: String,

        /// Target language code
        #[arg(short, long)]
        to: String,
    },

    /// List the language pairs installed in the models directory
    Models,

    /// Run texts through the full relay against an echoing backend (no network)
    Translate {
        /// Source language code, or 'auto'
        #[arg(short, long, default_value = "auto")]
        from: String,

        /// Target language code
        #[arg(short, long)]
        to: String,

        /// Texts to translate
        #[arg(required = true)]
        texts: Vec<String>,
    },

    /// Generate shell completions for translate-relay
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// translate-relay - routing core of a Google Translate compatible relay
#[derive(Parser, Debug)]
#[command(name = "translate-relay")]
#[command(version)]
#[command(about = "Endpoint selection, markup protection and pivot routing for a translation relay")]
#[command(long_about = "Inspect and exercise the routing core of the translation relay.

EXAMPLES:
    translate-relay languages                          # Merged language catalog
    translate-relay select -f en -t es -n 10000        # Traffic split for en -> es
    translate-relay protect '<b>Hello</b> world'       # Markup protection
    translate-relay route -f de -t fr                  # Direct or pivot model route
    translate-relay translate -f de -t fr Hallo        # Dry run through the relay
    translate-relay completions bash > relay.bash      # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one is created. Endpoint weights can be overridden with a
    comma-separated list in RELAY_ENDPOINT_WEIGHTS.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Comma-separated endpoint weights overriding the configuration file
    #[arg(short, long, env = "RELAY_ENDPOINT_WEIGHTS")]
    weights: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set with set_max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "translate-relay", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_or_create_config(&cli.config_path)?;

    let log_level = match &cli.log_level {
        Some(level) => level.clone().into(),
        None => config.log_level.clone(),
    };
    log::set_max_level(level_filter(&log_level));

    config.validate().context("Configuration validation failed")?;

    match cli.command {
        Commands::Languages => {
            let endpoints = build_endpoints(&config, cli.weights.as_deref())
                .context("Failed to set up endpoint configuration")?;
            println!("{}", serde_json::to_string_pretty(endpoints.languages())?);
        }
        Commands::Select { from, to, samples } => {
            let endpoints = build_endpoints(&config, cli.weights.as_deref())
                .context("Failed to set up endpoint configuration")?;
            if samples <= 1 {
                println!("{}", endpoints.select(&from, &to));
            } else {
                let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
                for _ in 0..samples {
                    *counts.entry(endpoints.select(&from, &to)).or_insert(0) += 1;
                }
                for endpoint in endpoints.endpoints() {
                    let count = counts.get(endpoint.as_str()).copied().unwrap_or(0);
                    println!(
                        "{}\t{}\t{:.2}%",
                        endpoint,
                        count,
                        100.0 * count as f64 / samples as f64
                    );
                }
            }
        }
        Commands::Protect { text } => {
            let protected = TagProtector::encode(&text);
            println!("{}", serde_json::json!({
                "cleaned": protected.cleaned,
                "tokens": protected.tokens,
            }));
        }
        Commands::Route { from, to } => {
            let router = local_router(&config, Arc::new(MockBackend::working()));
            println!("{}", router.resolve(&from, &to));
        }
        Commands::Models => {
            let registry = FsModelRegistry::new(&config.models_dir);
            let pairs = registry.available_pairs();
            if pairs.is_empty() {
                warn!("No models found in {}", registry.root().display());
            }
            for (from, to) in pairs {
                println!("{}\t{}", from, to);
            }
        }
        Commands::Translate { from, to, texts } => {
            let translated = dry_run_translate(&config, cli.weights.as_deref(), &texts, &from, &to)
                .await
                .context("Translation failed")?;
            println!("{}", serde_json::to_string_pretty(&translated)?);
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Load the configuration file, writing a default one if it does not exist
fn load_or_create_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        return Config::load(config_path);
    }

    warn!("Config file not found at '{}', creating default config.", config_path);
    let config = Config::default();
    config.save(config_path)?;
    Ok(config)
}

/// Build the endpoint configuration, applying the weight override if given
fn build_endpoints(config: &Config, weights: Option<&str>) -> Result<EndpointConfiguration, AppError> {
    let weight_override = weights
        .map(|raw| parse_weight_list(raw, config.endpoints.len()))
        .transpose()?;

    let endpoints = config.endpoint_configuration(weight_override)?;

    info!("Loaded {} endpoint(s)", endpoints.endpoints().len());
    Ok(endpoints)
}

/// Run texts through the configured backend kind, served by an echoing mock
async fn dry_run_translate(
    config: &Config,
    weights: Option<&str>,
    texts: &[String],
    from: &str,
    to: &str,
) -> Result<Vec<String>, AppError> {
    let backend = MockBackend::working();
    let service_backend = match config.backend {
        BackendKind::Endpoints => Backend::Endpoints {
            configuration: Arc::new(build_endpoints(config, weights)?),
            client: Arc::new(backend.clone()),
        },
        BackendKind::Local => Backend::Local(local_router(config, Arc::new(backend.clone()))),
    };

    let service = TranslationService::new(
        service_backend,
        TranslationOptions {
            protect_tags: config.protect_tags,
        },
    );

    let translated = service.translate(texts, from, to).await?;

    for call in backend.calls() {
        debug!(
            "Backend call {} -> {} on {}: {:?}",
            call.source_language,
            call.target_language,
            call.endpoint.as_deref().unwrap_or("local engine"),
            call.texts
        );
    }
    Ok(translated)
}

fn local_router(config: &Config, engine: Arc<MockBackend>) -> PivotTranslationRouter {
    PivotTranslationRouter::new(Arc::new(FsModelRegistry::new(&config.models_dir)), engine)
}
