use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use tokio::io::AsyncReadExt;

use oagp_cli::web::{self, AppState};
use oagp_core::config::{self, CONFIG_FILE_NAME, OagpConfig};
use oagp_core::{FormState, GenerationApi, Mode, Notification, SelectedFile, SpecSource};
use oagp_gateway::ApiGateway;

#[derive(Parser)]
#[command(
    name = "oagp",
    about = "Generate client or server code from an OpenAPI spec via a remote generator",
    version
)]
struct Cli {
    /// Base URL of the generation service (overrides the config file)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Path to the config file
    #[arg(long, global = true, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the languages and frameworks the service supports
    Languages {
        /// Only list one kind of target
        #[arg(long)]
        mode: Option<ModeArg>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: ListFormat,
    },

    /// Submit a spec for generation and print the download link
    Generate {
        /// Generate a client or a server (defaults to the configured mode)
        #[arg(long)]
        mode: Option<ModeArg>,

        /// Target language or framework (defaults to the first one listed)
        #[arg(short, long)]
        lang: Option<String>,

        #[command(flatten)]
        spec: SpecArgs,
    },

    /// Serve the generator form on a local address
    Serve {
        /// Address to listen on (overrides the config file)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Initialize a new oagp configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct SpecArgs {
    /// URL of the OpenAPI spec
    #[arg(long)]
    url: Option<String>,

    /// Path to the OpenAPI spec file (JSON)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Read the OpenAPI spec from stdin
    #[arg(long)]
    paste: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Client,
    Server,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Client => Mode::Client,
            ModeArg::Server => Mode::Server,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum ListFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => cmd_init(&cli.config, force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "oagp", &mut std::io::stdout());
            Ok(())
        }

        Commands::Languages { mode, format } => {
            let (_, gateway) = connect(&cli.config, cli.base_url)?;
            cmd_languages(&gateway, mode.map(Mode::from), format).await
        }

        Commands::Generate { mode, lang, spec } => {
            let (cfg, gateway) = connect(&cli.config, cli.base_url)?;
            cmd_generate(&gateway, &cfg, mode.map(Mode::from), lang, spec).await
        }

        Commands::Serve { bind } => {
            let (cfg, gateway) = connect(&cli.config, cli.base_url)?;
            cmd_serve(gateway, &cfg, bind).await
        }
    }
}

/// Load the config file if present, apply command-line overrides, and build
/// the gateway to the generation service.
fn connect(path: &Path, base_url: Option<String>) -> Result<(OagpConfig, ApiGateway)> {
    let mut cfg = config::load_config(path)?.unwrap_or_default();
    if let Some(base_url) = base_url {
        cfg.service.base_url = base_url;
    }
    log::debug!("using generation service at {}", cfg.service.base_url);
    let gateway = ApiGateway::from_config(&cfg.service)?;
    Ok((cfg, gateway))
}

fn print_notifications(notifications: Vec<Notification>) {
    for note in notifications {
        eprintln!("{}: {}", note.title, note.description);
    }
}

async fn cmd_languages(
    gateway: &ApiGateway,
    mode: Option<Mode>,
    format: ListFormat,
) -> Result<()> {
    let catalog = gateway
        .fetch_languages()
        .await
        .context("Failed to load available languages")?;

    match format {
        ListFormat::Json => {
            let json = match mode {
                Some(mode) => serde_json::to_string_pretty(catalog.languages(mode))?,
                None => serde_json::to_string_pretty(&catalog)?,
            };
            println!("{}", json);
        }
        ListFormat::Text => {
            for m in [Mode::Client, Mode::Server] {
                if mode.is_some_and(|wanted| wanted != m) {
                    continue;
                }
                if mode.is_none() {
                    println!("{}:", m.title());
                }
                for lang in catalog.languages(m) {
                    if mode.is_none() {
                        println!("  {}", lang);
                    } else {
                        println!("{}", lang);
                    }
                }
            }
        }
    }
    Ok(())
}

async fn cmd_generate(
    gateway: &ApiGateway,
    cfg: &OagpConfig,
    mode: Option<Mode>,
    lang: Option<String>,
    spec: SpecArgs,
) -> Result<()> {
    let mut form = FormState::with_default_mode(cfg.default_mode);
    let loaded = form.load_catalog(gateway.fetch_languages().await);
    print_notifications(form.take_notifications());
    loaded.context("language discovery failed")?;

    if let Some(mode) = mode {
        form.set_mode(mode);
    }
    if let Some(lang) = lang {
        form.select_language(lang);
    }

    if let Some(url) = spec.url {
        form.set_source(SpecSource::Url);
        form.set_url(url);
    } else if let Some(path) = spec.file {
        form.set_source(SpecSource::File);
        form.select_file(SelectedFile::read(&path).await?);
    } else if spec.paste {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("failed to read spec from stdin")?;
        form.set_source(SpecSource::Paste);
        form.set_paste(text);
    }

    eprintln!("Generating {} code for {}", form.mode(), form.language());
    let outcome = form.submit(gateway, gateway).await;
    print_notifications(form.take_notifications());

    let result = outcome?;
    println!("{}", result.link);
    Ok(())
}

async fn cmd_serve(gateway: ApiGateway, cfg: &OagpConfig, bind: Option<String>) -> Result<()> {
    let mut form = FormState::with_default_mode(cfg.default_mode);
    if let Err(e) = form.load_catalog(gateway.fetch_languages().await) {
        eprintln!("warning: {e}; the form will start without languages");
    }

    let addr = bind.unwrap_or_else(|| cfg.server.bind.clone());
    web::serve(AppState::new(form, gateway), &addr).await
}

fn cmd_init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(config_path, config::default_config_content())
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
