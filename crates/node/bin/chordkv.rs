use std::sync::Arc;

use chordkv_core::dht::TStabilize;
use chordkv_node::logging::init_logging;
use chordkv_node::logging::LogLevel;
use chordkv_node::native::cli::Client;
use chordkv_node::native::config::Config;
use chordkv_node::native::endpoint::run_http_api;
use chordkv_node::processor::Processor;
use clap::Args;
use clap::Parser;
use clap::Subcommand;

#[derive(Parser, Debug)]
#[command(about, version, author)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(long, default_value_t = LogLevel::Info, value_enum, env)]
    log_level: LogLevel,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
enum Command {
    #[command(about = "Initializes a node with the default configuration.")]
    Init(InitCommand),
    #[command(about = "Starts a long-running node.")]
    Run(RunCommand),
    #[command(about = "Stores a key-value pair on the ring.")]
    Put(PutCommand),
    #[command(about = "Reads a key from the ring.")]
    Get(GetCommand),
    #[command(about = "Deletes a key from the ring.")]
    Delete(DeleteCommand),
    #[command(about = "Shows successors, predecessor and finger table of a node.")]
    Inspect(InspectCommand),
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[arg(
        long,
        short = 'c',
        env,
        default_value = "~/.chordkv/config.yaml",
        help = "Config file location"
    )]
    config: String,
}

#[derive(Args, Debug)]
struct InitCommand {
    #[command(flatten)]
    config_args: ConfigArgs,
}

#[derive(Args, Debug)]
struct RunCommand {
    #[command(flatten)]
    config_args: ConfigArgs,

    #[arg(long, help = "Listen on this address instead of the configured one")]
    bind: Option<String>,

    #[arg(
        long,
        help = "Join the ring through this peer; a fresh ring is created when neither this nor the config names one"
    )]
    bootstrap: Option<String>,
}

#[derive(Args, Debug)]
struct EndpointArgs {
    #[arg(
        long,
        short = 'u',
        env = "CHORDKV_ENDPOINT",
        default_value = "http://127.0.0.1:7401",
        help = "Node endpoint to talk to"
    )]
    endpoint_url: String,
}

#[derive(Args, Debug)]
struct PutCommand {
    #[command(flatten)]
    endpoint: EndpointArgs,
    key: String,
    value: String,
}

#[derive(Args, Debug)]
struct GetCommand {
    #[command(flatten)]
    endpoint: EndpointArgs,
    key: String,
}

#[derive(Args, Debug)]
struct DeleteCommand {
    #[command(flatten)]
    endpoint: EndpointArgs,
    key: String,
}

#[derive(Args, Debug)]
struct InspectCommand {
    #[command(flatten)]
    endpoint: EndpointArgs,
}

async fn run_node(cmd: RunCommand) -> anyhow::Result<()> {
    let mut config = match Config::read_fs(&cmd.config_args.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(
                "no usable config at {} ({}), falling back to defaults",
                cmd.config_args.config,
                e
            );
            Config::new()
        }
    };
    if let Some(bind) = cmd.bind {
        config.bind_addr = bind;
    }
    if cmd.bootstrap.is_some() {
        config.bootstrap = cmd.bootstrap;
    }

    let processor = Arc::new(Processor::from_config(&config)?);

    let endpoint = tokio::spawn(run_http_api(config.bind_addr.clone(), processor.clone()));
    processor.bootstrap(config.bootstrap.as_deref()).await?;
    tokio::spawn(processor.stabilization.clone().wait());

    tokio::select! {
        res = endpoint => res??,
        _ = tokio::signal::ctrl_c() => {
            processor.node.shutdown();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    match cli.command {
        Command::Init(cmd) => {
            let path = Config::new().write_fs(&cmd.config_args.config)?;
            println!("initialized config at {path}");
            Ok(())
        }
        Command::Run(cmd) => run_node(cmd).await,
        Command::Put(cmd) => {
            let resp = Client::new(&cmd.endpoint.endpoint_url)
                .put(&cmd.key, &cmd.value)
                .await?;
            if resp.success {
                println!("stored '{}'", cmd.key);
            } else {
                println!("put failed: {}", resp.message);
            }
            Ok(())
        }
        Command::Get(cmd) => {
            let resp = Client::new(&cmd.endpoint.endpoint_url).get(&cmd.key).await?;
            match resp.value {
                Some(value) if resp.found => println!("{value}"),
                _ => println!("key '{}' not found", cmd.key),
            }
            Ok(())
        }
        Command::Delete(cmd) => {
            let resp = Client::new(&cmd.endpoint.endpoint_url)
                .delete(&cmd.key)
                .await?;
            if resp.success {
                println!("deleted '{}'", cmd.key);
            } else {
                println!("key '{}' was not present", cmd.key);
            }
            Ok(())
        }
        Command::Inspect(cmd) => {
            let inspect = Client::new(&cmd.endpoint.endpoint_url).inspect().await?;
            println!("{}", serde_json::to_string_pretty(&inspect)?);
            Ok(())
        }
    }
}
