// CLI line client for 20 Questions.
//
// Connects to a lobby or game port on the given host and plays from the
// terminal: server lines are printed, and any line ending in `:` or `!` waits
// for one line of keyboard input. See `client.rs` in the library.
//
// Usage:
//   client <PORT> [--host <HOST>]

use std::net::{IpAddr, SocketAddr};

use clap::Parser;
use twenty_questions_server::client::{ClientExit, connect};

#[derive(Parser, Debug)]
#[command(name = "client")]
#[command(about = "Connect to a 20 Questions lobby or game session")]
#[command(version)]
struct Cli {
    /// Lobby or game port to connect to
    port: u16,

    /// Server address
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,
}

fn main() {
    let cli = Cli::parse();
    let addr = SocketAddr::new(cli.host, cli.port);

    match connect(addr) {
        Ok(ClientExit::ServerClosed) => {}
        Ok(ClientExit::InputClosed) => {
            eprintln!("Input closed, disconnecting.");
        }
        Err(e) => {
            eprintln!("Error: {e}");
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            std::process::exit(1);
        }
    }
}
