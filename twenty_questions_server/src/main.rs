// CLI entry point for the 20 Questions lobby server.
//
// Starts the lobby listener and serves until the process is killed. Players
// connect to the lobby to create a game on a port of their choosing, then
// both players connect to that port with the `client` binary (or any line
// client such as telnet/nc).
//
// Usage:
//   lobby [OPTIONS]
//     --config <FILE>   JSON config file (see `config.rs`)
//     --host <HOST>     Interface to bind (default: 0.0.0.0)
//     --port <PORT>     Lobby listen port (default: 9999)
//     -v, --verbose     More logging (-v debug, -vv trace)

use std::path::PathBuf;

use clap::Parser;
use tracing::error;
use twenty_questions_server::config::ServerConfig;
use twenty_questions_server::error::error_chain;
use twenty_questions_server::lobby::start_lobby;
use twenty_questions_server::logging::init_logging;

#[derive(Parser, Debug)]
#[command(name = "lobby")]
#[command(about = "20 Questions lobby server: create game sessions on chosen ports")]
#[command(version)]
struct Cli {
    /// JSON config file; command-line flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Interface the lobby and game sessions bind to
    #[arg(long)]
    host: Option<String>,

    /// Lobby listen port
    #[arg(long)]
    port: Option<u16>,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => match ServerConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                error!(error = %error_chain(&e), "failed to load config");
                std::process::exit(1);
            }
        },
        None => ServerConfig::default(),
    };
    if let Some(host) = cli.host {
        config.bind_host = host;
    }
    if let Some(port) = cli.port {
        config.lobby_port = port;
    }

    let (handle, addr) = match start_lobby(config) {
        Ok(result) => result,
        Err(e) => {
            error!(error = %error_chain(&e), "failed to start lobby");
            std::process::exit(1);
        }
    };

    println!("Lobby server started on {addr}");
    println!("Press Ctrl+C to stop.");

    // The listener only exits on a fatal accept error; sessions die with
    // the process.
    handle.wait();
    std::process::exit(1);
}
