//! request-decompress CLI binary.
//!
//! # Commands
//!
//! - `serve` - Start the HTTP server with request decompression
//! - `decode` - Decode a compressed file with the same decoders
//! - `encodings` - List supported Content-Encoding tokens

use std::io::{self, Read, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};
use request_decompress::{
    config::{parse_encoding_list, Config},
    server::{create_router, serve, AppState, ServerConfig},
    Encoding, VERSION,
};

#[derive(Parser)]
#[command(name = "request-decompress")]
#[command(version = VERSION)]
#[command(about = "Transparent HTTP request body decompression", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Config file (default: <config dir>/request-decompress/config.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Listen port
        #[arg(short, long)]
        port: Option<u16>,

        /// Listen host
        #[arg(long)]
        host: Option<String>,

        /// Bind to all interfaces
        #[arg(long)]
        bind_all: bool,

        /// Enabled encodings, comma separated (e.g. gzip,bz2,zstd,br)
        #[arg(short, long)]
        encodings: Option<String>,

        /// Maximum compressed body size in bytes
        #[arg(long)]
        max_body_size: Option<usize>,

        /// Disable request tracing
        #[arg(long)]
        quiet: bool,

        /// Emit logs as JSON
        #[arg(long)]
        json_logs: bool,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Decode a compressed file
    Decode {
        /// Content-Encoding token (gzip, bz2, zstd, br)
        #[arg(short, long)]
        encoding: String,

        /// Input file path (default: stdin)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum decoded size in bytes
        #[arg(long, default_value = "67108864")]
        max_size: usize,

        /// Show decode statistics on stderr
        #[arg(short, long)]
        stats: bool,
    },

    /// List supported encodings
    Encodings,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            port,
            host,
            bind_all,
            encodings,
            max_body_size,
            quiet,
            json_logs,
            verbose,
        } => cmd_serve(
            config,
            port,
            host,
            bind_all,
            encodings,
            max_body_size,
            quiet,
            json_logs,
            verbose,
        ),

        Commands::Decode {
            encoding,
            file,
            output,
            max_size,
            stats,
        } => cmd_decode(&encoding, file, output, max_size, stats),

        Commands::Encodings => {
            cmd_encodings();
            Ok(())
        },
    }
}

fn init_logging(verbose: bool, json: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[allow(clippy::too_many_arguments, clippy::fn_params_excessive_bools)]
fn cmd_serve(
    config_path: Option<PathBuf>,
    port: Option<u16>,
    host: Option<String>,
    bind_all: bool,
    encodings: Option<String>,
    max_body_size: Option<usize>,
    quiet: bool,
    json_logs: bool,
    verbose: bool,
) -> anyhow::Result<()> {
    init_logging(verbose, json_logs);

    // File config (explicit path, or the default location if it exists)
    let file_config = match config_path {
        Some(path) => Config::from_file(path)?,
        None => match Config::default_path().filter(|p| p.exists()) {
            Some(path) => {
                tracing::info!("Loading config from {}", path.display());
                Config::from_file(path)?
            },
            None => Config::default(),
        },
    };
    let mut config = file_config.merge(Config::from_env()?);

    // CLI flags take precedence
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(list) = encodings {
        config.request_decompress.encodings = parse_encoding_list(&list)?;
    }
    if let Some(size) = max_body_size {
        config.request_decompress.max_body_size = size;
    }
    if quiet {
        config.server.logging = false;
    }
    config.request_decompress.validate()?;

    let mut server_config = ServerConfig::from_config(&config)?;
    if bind_all {
        server_config = server_config.bind_all();
    }

    let state = Arc::new(AppState::new(server_config.clone()));
    let app = create_router(Arc::clone(&state));

    tracing::info!("Starting request-decompress server on {}", server_config.addr);
    tracing::info!("Encodings: {}", state.enabled_encodings().join(", "));
    tracing::info!(
        "Limits: body {} bytes, decoded {} bytes",
        server_config.decompression.max_body_size,
        server_config.decompression.max_decoded_size
    );

    let addr: SocketAddr = server_config.addr;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        serve(addr, app).await?;
        Ok::<_, anyhow::Error>(())
    })
}

fn cmd_decode(
    token: &str,
    file: Option<PathBuf>,
    output: Option<PathBuf>,
    max_size: usize,
    stats: bool,
) -> anyhow::Result<()> {
    let encoding: Encoding = token.parse()?;
    let input = read_input(file)?;

    let start = Instant::now();
    let decoded = encoding.decode(&input, max_size)?;
    let elapsed = start.elapsed();

    write_output(output, &decoded)?;

    if stats {
        eprintln!("Encoding:   {}", encoding);
        eprintln!("Compressed: {} bytes", input.len());
        eprintln!("Decoded:    {} bytes", decoded.len());
        eprintln!("Time:       {:.3} ms", elapsed.as_secs_f64() * 1000.0);
    }

    Ok(())
}

fn cmd_encodings() {
    for encoding in Encoding::all() {
        let default = if Encoding::default_enabled().contains(encoding) {
            "enabled by default"
        } else {
            "opt-in"
        };
        println!("{:<6} {:<8} {}", encoding.token(), encoding.name(), default);
    }
}

// Helper functions

fn read_input(file: Option<PathBuf>) -> anyhow::Result<Vec<u8>> {
    if let Some(path) = file {
        Ok(std::fs::read(path)?)
    } else {
        let mut buffer = Vec::new();
        io::stdin().read_to_end(&mut buffer)?;
        Ok(buffer)
    }
}

fn write_output(output: Option<PathBuf>, content: &[u8]) -> anyhow::Result<()> {
    if let Some(path) = output {
        std::fs::write(path, content)?;
    } else {
        let mut stdout = io::stdout().lock();
        stdout.write_all(content)?;
        stdout.flush()?;
    }
    Ok(())
}
