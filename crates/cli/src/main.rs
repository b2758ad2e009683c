use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "projbot")]
#[command(about = "WhatsApp project-brief assistant", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and an empty config file.
    Init {
        /// Config file path (default: PROJBOT_CONFIG_PATH or ~/.projbot/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Serve the Twilio WhatsApp webhook. Requires GOOGLE_API_KEY and the TWILIO_* credentials.
    Serve {
        /// Config file path (default: PROJBOT_CONFIG_PATH or ~/.projbot/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from config or 5000)
        #[arg(long, short)]
        port: Option<u16>,

        /// Run the self-description crew once before serving.
        #[arg(long)]
        self_describe: bool,
    },

    /// Print the intent a message would be classified as. No network.
    Classify {
        /// Message text
        text: String,
    },

    /// Run the self-description crew and print its report. Requires GOOGLE_API_KEY.
    Describe {
        /// Config file path (default: PROJBOT_CONFIG_PATH or ~/.projbot/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("projbot {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Serve {
            config,
            port,
            self_describe,
        }) => {
            if let Err(e) = run_serve(config, port, self_describe).await {
                log::error!("serve failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Classify { text }) => {
            let words = lib::intent::word_count(&text);
            println!("{} ({} words)", lib::intent::classify(&text), words);
        }
        Some(Commands::Describe { config }) => {
            if let Err(e) = run_describe(config).await {
                log::error!("describe failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(lib::config::default_config_path);
    let dir = lib::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_serve(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
    self_describe: bool,
) -> anyhow::Result<()> {
    let (mut config, path) = lib::config::load_config(config_path)?;
    if let Some(p) = port {
        config.gateway.port = p;
    }
    log::info!(
        "starting gateway on {}:{} (config {})",
        config.gateway.bind,
        config.gateway.port,
        path.display()
    );
    lib::gateway::run_gateway(config, self_describe).await
}

async fn run_describe(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let (config, _) = lib::config::load_config(config_path)?;
    let key = lib::config::resolve_google_api_key(&config)?;
    let llm = lib::llm::GeminiClient::from_config(&config.llm, key);
    let report = lib::bootstrap::self_describe(&llm).await?;
    println!("{}", report.trim());
    Ok(())
}
