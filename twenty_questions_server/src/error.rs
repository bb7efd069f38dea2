// Error types for the lobby, sessions, configuration, and client.
//
// Only transport- and resource-level failures become errors here. Invalid
// answerer input never does: the normalizer absorbs it by re-prompting.
// A `SessionError` aborts one session and nothing else; the lobby logs it
// and keeps serving.

use std::error::Error as StdError;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;
use twenty_questions_protocol::Role;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to bind session port {port}")]
    Bind {
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("failed to accept the {role} connection")]
    Accept {
        role: Role,
        #[source]
        source: io::Error,
    },

    #[error("i/o error on the {role} connection")]
    Io {
        role: Role,
        #[source]
        source: io::Error,
    },

    #[error("{role} disconnected while the server awaited {awaiting}")]
    Disconnected { role: Role, awaiting: &'static str },

    #[error("cannot turn away extra connections on port {port}")]
    Rejector {
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("failed to spawn session thread")]
    Spawn {
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum LobbyError {
    #[error("failed to bind lobby listener on {addr}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("lobby client disconnected before choosing a port")]
    NoPort,

    #[error("invalid port number {input:?}")]
    InvalidPort { input: String },

    #[error("failed to spawn lobby thread")]
    Spawn {
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect to {addr}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Render an error and every source under it as one line, outermost first,
/// separated by ": ".
pub fn error_chain(err: &dyn StdError) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
