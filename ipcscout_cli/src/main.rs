use ipcscout_core::catalog::{Catalog, ComponentKind, ManifestIndex};
use ipcscout_core::config::ScoutConfig;
use ipcscout_core::discovery::{DiscoveryEngine, DiscoveryReport, JobState};
use ipcscout_core::dispatch::{Dispatcher, InvocationRequest};
use ipcscout_core::permission::PermissionGate;
use ipcscout_core::prober::CommandProber;
use ipcscout_core::sink::{FileSink, read_persisted};
use ipcscout_core::wordlist::Wordlist;

use anyhow::anyhow;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(short, long, value_parser)]
    config_file: Option<PathBuf>,
    /// JSON manifest index, overrides `catalog.manifest-index`.
    #[clap(long, value_parser)]
    manifest_index: Option<PathBuf>,
    /// Permission held by the prober; may be repeated.
    #[clap(long = "grant")]
    granted: Vec<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the exported components of a package.
    List {
        package: String,
        #[clap(long)]
        json: bool,
    },
    /// Brute-force readable paths under a provider authority.
    Discover {
        authority: String,
        #[clap(short, long, value_parser)]
        wordlist: Option<PathBuf>,
        #[clap(short, long, value_parser)]
        output: Option<PathBuf>,
        #[clap(long)]
        json: bool,
    },
    /// Print the paths persisted by the last discovery of an authority.
    ShowPaths {
        authority: String,
        #[clap(short, long, value_parser)]
        output: Option<PathBuf>,
    },
    /// Fire a single invocation at a component.
    Invoke(InvokeArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Activity,
    Service,
    Receiver,
    Provider,
}

impl From<KindArg> for ComponentKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Activity => ComponentKind::Activity,
            KindArg::Service => ComponentKind::Service,
            KindArg::Receiver => ComponentKind::Receiver,
            KindArg::Provider => ComponentKind::Provider,
        }
    }
}

#[derive(clap::Args, Debug)]
struct InvokeArgs {
    #[clap(value_enum)]
    kind: KindArg,
    #[clap(long, default_value = "")]
    package: String,
    /// Component class, or the authority for providers.
    #[clap(long)]
    component: Option<String>,
    #[clap(long)]
    action: Option<String>,
    #[clap(long)]
    category: Option<String>,
    #[clap(long)]
    data_uri: Option<String>,
    /// KEY=VALUE string extra; may be repeated for activities.
    #[clap(long = "extra", value_parser = parse_extra)]
    extras: Vec<(String, String)>,
    #[clap(long)]
    permission: Option<String>,
    #[clap(long)]
    method: Option<String>,
}

fn parse_extra(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))
}

impl InvokeArgs {
    fn into_request(self) -> (ComponentKind, InvocationRequest) {
        let mut request = InvocationRequest::new(self.package);
        request.target_component = self.component;
        request.action = self.action;
        request.category = self.category;
        request.data_uri = self.data_uri;
        request.permission = self.permission;
        request.method = self.method;
        request.extras = self.extras.into_iter().collect();
        (self.kind.into(), request)
    }
}

fn load_config(cli: &Cli) -> Result<ScoutConfig, anyhow::Error> {
    let mut config = match &cli.config_file {
        Some(config_path) => {
            info!("Loading configuration from specified path: {config_path:?}");
            ScoutConfig::load_from_file(config_path)?
        }
        None => {
            let default_config_path = PathBuf::from("ipcscout.toml");
            if default_config_path.exists() {
                info!("No config file specified via CLI, loading default: {default_config_path:?}");
                ScoutConfig::load_from_file(&default_config_path)?
            } else {
                debug!(
                    "No config file specified and default 'ipcscout.toml' not found, \
                     using built-in defaults."
                );
                ScoutConfig::default()
            }
        }
    };

    if let Some(index) = &cli.manifest_index {
        config.catalog.manifest_index = Some(index.clone());
    }
    config
        .host
        .granted_permissions
        .extend(cli.granted.iter().cloned());

    debug!("Effective configuration: {config:#?}");
    Ok(config)
}

/// Without a configured index nothing resolves, so the gate requires
/// nothing and only `list` has to fail.
fn load_index(config: &ScoutConfig) -> Result<ManifestIndex, anyhow::Error> {
    match &config.catalog.manifest_index {
        Some(path) => Ok(ManifestIndex::load_from_file(path)?),
        None => Ok(ManifestIndex::default()),
    }
}

fn print_report(report: &DiscoveryReport, json: bool) -> Result<(), anyhow::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    for path in &report.accessible {
        println!("{path}");
    }
    let summary = match report.state {
        JobState::Cancelled => "cancelled",
        JobState::Failed => "failed",
        _ => "completed",
    };
    eprintln!(
        "Discovery {summary} for {}: {} entries probed, {} accessible",
        report.authority,
        report.processed,
        report.accessible.len()
    );
    if let Some(error) = &report.error {
        eprintln!("Error: {error}");
    }
    Ok(())
}

async fn discover(
    config: &ScoutConfig,
    authority: &str,
    wordlist: Option<PathBuf>,
    output: Option<PathBuf>,
    json: bool,
) -> Result<(), anyhow::Error> {
    let wordlist = wordlist
        .or_else(|| config.discovery.wordlist.clone())
        .ok_or_else(|| anyhow!("No wordlist given; pass --wordlist or set discovery.wordlist"))?;
    let output = output.unwrap_or_else(|| config.discovery.output_path_for(authority));

    let index = load_index(config)?;
    let holder = config.host.permissions();
    let gate = PermissionGate::new(&index, &holder);
    let engine = DiscoveryEngine::new(config.discovery.options());

    info!(authority, ?wordlist, ?output, "starting discovery");
    let handle = engine.start_authorized(
        &gate,
        authority,
        Wordlist::File(wordlist),
        FileSink::new(&output),
        CommandProber::new(config.prober.command_config()),
    )?;

    let token = handle.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling discovery");
            token.cancel();
        }
    });

    let report = handle.wait().await?;
    print_report(&report, json)?;
    if report.state == JobState::Failed {
        return Err(anyhow!("Discovery for {authority} failed"));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ipcscout=info,ipcscout_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::List { package, json } => {
            if config.catalog.manifest_index.is_none() {
                return Err(anyhow!(
                    "No manifest index configured; \
                     pass --manifest-index or set catalog.manifest-index"
                ));
            }
            let index = load_index(&config)?;
            let catalog = Catalog::new(&index, config.host.identity());
            let components = catalog.list_exported_components(&package)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&components)?);
            } else if components.is_empty() {
                eprintln!("{package} exports no components");
            } else {
                for component in &components {
                    match &component.authority {
                        Some(authority) => println!(
                            "{:<9} {} ({authority})",
                            component.kind.as_str(),
                            component.qualified_name
                        ),
                        None => println!(
                            "{:<9} {}",
                            component.kind.as_str(),
                            component.qualified_name
                        ),
                    }
                }
            }
        }
        Commands::Discover {
            authority,
            wordlist,
            output,
            json,
        } => discover(&config, &authority, wordlist, output, json).await?,
        Commands::ShowPaths { authority, output } => {
            let path = output.unwrap_or_else(|| config.discovery.output_path_for(&authority));
            let paths = read_persisted(&path)
                .map_err(|e| anyhow!("No discovery results for {authority}: {e}"))?;
            if paths.is_empty() {
                eprintln!("No accessible paths recorded for {authority}");
            }
            for p in paths {
                println!("{p}");
            }
        }
        Commands::Invoke(args) => {
            let (kind, request) = args.into_request();
            let invoker = config.invoker.invoker();
            let dispatcher = Dispatcher::new(&invoker);
            if !dispatcher.dispatch(kind, request) {
                return Err(anyhow!("{kind} invocation failed"));
            }
            println!("{kind} invocation delivered");
        }
    }

    Ok(())
}
