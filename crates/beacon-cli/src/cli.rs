use std::{
    net::IpAddr,
    path::{Path, PathBuf},
};

use beacon::{
    banner::{self, Banner},
    certificate::{self, CertificatePaths, OpensslProvider},
    config::{CertificateConfig, Config, Format, Generator, LogLevel, toml::Toml},
    error::ServerError,
    filesystem::local::LocalFS,
    server::Server,
};
use clap::{Args, Parser, Subcommand};
use log::{debug, info};

use crate::error::CliError;

const CONFIG_FILE: &str = "beacon.toml";

#[derive(Debug, Default, Args)]
pub struct RunArgs {
    /// Path to the configuration file (default: beacon.toml, if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// The address to bind to
    #[arg(long)]
    host: Option<IpAddr>,

    /// The port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// The directory to serve files from
    #[arg(short, long)]
    root: Option<String>,

    /// Path to the PEM certificate
    #[arg(long)]
    cert: Option<String>,

    /// Path to the PEM private key
    #[arg(long)]
    key: Option<String>,

    /// How to create a missing certificate: `openssl` or `builtin`
    #[arg(short, long)]
    generator: Option<Generator>,

    /// The script to advertise in the startup banner
    #[arg(short, long)]
    script: Option<String>,

    /// Do not send CORS headers or answer preflight requests
    #[arg(long)]
    no_cors: bool,
}

impl RunArgs {
    /// Apply command-line overrides on top of the configuration file
    fn apply(&self, config: &mut Config) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(root) = &self.root {
            config.document_root = root.clone();
        }
        if let Some(cert) = &self.cert {
            config.certificate.cert_file = cert.clone();
        }
        if let Some(key) = &self.key {
            config.certificate.key_file = key.clone();
        }
        if let Some(generator) = self.generator {
            config.certificate.generator = generator;
        }
        if let Some(script) = &self.script {
            config.tracking_script = Some(script.clone());
        }
        if self.no_cors {
            config.headers.cors = false;
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the server (the default when no command is given)
    Run(RunArgs),

    /// Create a new configuration file in the target directory
    Init {
        /// The directory to create the configuration file in (default: current directory)
        target_dir: Option<PathBuf>,
    },

    /// Print the version
    Version,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// The log level, overrides the one in the configuration file
    #[arg(short, long, global = true)]
    log_level: Option<LogLevel>,

    #[clap(subcommand)]
    pub command: Option<Commands>,
}

fn init_logger(level: LogLevel) {
    let _ = env_logger::Builder::new()
        .filter_level(level.to_log_level_filter())
        .try_init();
}

/// Read the configuration file, falling back to the defaults when the implicit one is absent
fn load_config(path: Option<&Path>) -> Result<Config, CliError> {
    let (path, explicit) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(CONFIG_FILE), false),
    };

    if !path.exists() {
        if explicit {
            return Err(CliError::ConfigNotFound(path));
        }
        return Ok(Config::default());
    }

    let input = std::fs::read_to_string(&path)?;
    Ok(Toml::from(input.as_str()).parse()?)
}

impl Cli {
    pub fn new() -> Self {
        Cli::parse()
    }

    pub async fn execute(self) -> Result<(), CliError> {
        match self.command {
            Some(Commands::Run(args)) => run(args, self.log_level).await,
            None => run(RunArgs::default(), self.log_level).await,
            Some(Commands::Init { target_dir }) => {
                init_logger(self.log_level.unwrap_or_default());
                init(target_dir)
            }
            Some(Commands::Version) => {
                println!("beacon {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

async fn run(args: RunArgs, log_level: Option<LogLevel>) -> Result<(), CliError> {
    let mut config = load_config(args.config.as_deref())?;
    args.apply(&mut config);

    init_logger(log_level.or(config.log_level).unwrap_or_default());
    debug!("Running with configuration: {config:?}");
    config.validate()?;

    let openssl = OpensslProvider::new(
        config.certificate.common_name.clone(),
        config.certificate.validity_days,
    );
    check_tooling(&config.certificate, &openssl)?;

    let provider = certificate::provider_for(&config.certificate);
    let server = Server::bootstrap(config, provider.as_ref())?;
    let listener = server.bind().await?;

    let config = server.config();
    let address = listener
        .local_addr()
        .map_err(|e| CliError::Generic(format!("Failed to read the bound address: {e}")))?;
    let root = LocalFS::new(config.document_root()).map_err(ServerError::from)?;

    Banner::new(&config, address, root.root())
        .with_network_ip(banner::local_ip())
        .with_scripts(banner::javascript_files(&root))
        .print();

    server.serve(listener).await?;
    info!("Server stopped by user");
    Ok(())
}

/// Make sure `openssl` can run before anything else when it has a pair to generate
fn check_tooling(config: &CertificateConfig, openssl: &OpensslProvider) -> Result<(), CliError> {
    if config.generator != Generator::Openssl || CertificatePaths::from(config).exist() {
        return Ok(());
    }

    let version = openssl.check().map_err(ServerError::from)?;
    info!("OpenSSL found ({}): {version}", openssl.program());
    Ok(())
}

fn init(target_dir: Option<PathBuf>) -> Result<(), CliError> {
    let target = match target_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    if !target.is_dir() {
        return Err(CliError::Generic(format!(
            "The target directory does not exist or is not a directory: {}",
            target.display()
        )));
    }

    let path = target.join(CONFIG_FILE);
    if path.exists() {
        return Err(CliError::Generic(format!(
            "Config file already exists at `{}`",
            path.display()
        )));
    }

    Config::default().write_to_file(&path, &Toml::default())?;
    info!("Created new config file at `{}`", path.display());
    Ok(())
}
