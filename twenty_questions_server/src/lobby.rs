// Lobby dispatcher: the well-known port where players create game sessions.
//
// Architecture: one listener thread plus one short-lived worker thread per
// lobby request.
//
// - **Listener thread** (`TcpListener::accept()` loop): polls a non-blocking
//   accept guarded by a `keep_running` flag, so `LobbyHandle::stop` can end
//   it without closing the socket out from under a blocked call.
// - **Request workers** (one per accepted connection): run the one-exchange
//   lobby protocol. Prompt for a port, probe it, launch a session, report
//   the result, close.
//
// The availability probe binds and releases the port. It is advisory only:
// two requests for the same port can both pass it. The real claim is the
// bind inside `session::launch`, and losing that race is reported to the
// requester as "port in use" like any other taken port.
//
// Sessions launched here are detached. They live on their own threads and
// outlast both the request that created them and `LobbyHandle::stop`.

use std::io::{self, BufReader, BufWriter, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};
use twenty_questions_protocol::{ServerLine, read_line, write_line};

use crate::config::ServerConfig;
use crate::error::LobbyError;
use crate::session;

/// How often the listener re-checks `keep_running` while idle.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long a lobby client may take to send its port choice.
const REQUEST_READ_TIMEOUT: Duration = Duration::from_secs(300);

/// Handle returned by `start_lobby` to control the running lobby.
pub struct LobbyHandle {
    keep_running: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl LobbyHandle {
    /// Stop accepting lobby requests and wait for the listener to exit.
    /// Running sessions are unaffected.
    pub fn stop(mut self) {
        self.keep_running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }

    /// Block until the listener exits (it only does so on error or `stop`).
    pub fn wait(mut self) {
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

/// What a lobby request produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LobbyReply {
    Started { port: u16 },
    PortInUse { port: u16 },
}

/// Bind the lobby listener and serve requests on a background thread.
/// Returns a handle for stopping it and the actual bound address (useful
/// when port 0 is configured to let the OS pick).
pub fn start_lobby(config: ServerConfig) -> Result<(LobbyHandle, SocketAddr), LobbyError> {
    let bind_addr = format!("{}:{}", config.bind_host, config.lobby_port);
    let listener = TcpListener::bind(&bind_addr).map_err(|source| LobbyError::Bind {
        addr: bind_addr.clone(),
        source,
    })?;
    let addr = listener.local_addr()?;
    // Poll so the accept thread can check keep_running periodically.
    listener.set_nonblocking(true)?;

    let keep_running = Arc::new(AtomicBool::new(true));
    let keep_running_listener = keep_running.clone();
    let config = Arc::new(config);

    let thread = thread::Builder::new()
        .name("lobby-listener".into())
        .spawn(move || accept_loop(listener, config, keep_running_listener))
        .map_err(|source| LobbyError::Spawn { source })?;

    info!(%addr, "lobby server started");
    Ok((
        LobbyHandle {
            keep_running,
            thread: Some(thread),
        },
        addr,
    ))
}

fn accept_loop(listener: TcpListener, config: Arc<ServerConfig>, keep_running: Arc<AtomicBool>) {
    while keep_running.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, peer)) => {
                debug!(%peer, "lobby request accepted");
                let config = config.clone();
                let spawned = thread::Builder::new()
                    .name(format!("lobby-{peer}"))
                    .spawn(move || {
                        if let Err(e) = handle_lobby_request(stream, &config) {
                            warn!(%peer, error = %e, "error in lobby setup");
                        }
                    });
                if let Err(e) = spawned {
                    error!(%peer, error = %e, "failed to spawn lobby worker");
                }
            }
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_POLL_INTERVAL);
            }
            Err(e) => {
                error!(error = %e, "lobby listener failed");
                break;
            }
        }
    }
    info!("lobby server stopped");
}

/// Run the one-exchange lobby protocol on `stream`. The connection is
/// closed when this returns, whatever the result.
pub fn handle_lobby_request(
    stream: TcpStream,
    config: &ServerConfig,
) -> Result<LobbyReply, LobbyError> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(REQUEST_READ_TIMEOUT))?;
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = BufWriter::new(stream);

    send(&mut writer, &ServerLine::PortPrompt)?;
    let input = read_line(&mut reader)?.ok_or(LobbyError::NoPort)?;
    let port = match parse_port(&input) {
        Ok(port) => port,
        Err(e) => {
            send(&mut writer, &ServerLine::InvalidPort)?;
            return Err(e);
        }
    };

    if !port_available(&config.bind_host, port) {
        info!(port, "requested port is in use");
        send(&mut writer, &ServerLine::PortInUse)?;
        return Ok(LobbyReply::PortInUse { port });
    }

    start_session(&mut writer, &config.bind_host, port)
}

/// Launch a detached session on `port` and tell the requester how it went.
/// The bind here is the real claim on the port; losing it after the probe
/// passed is reported like any other taken port.
pub fn start_session<W: Write>(
    writer: &mut W,
    host: &str,
    port: u16,
) -> Result<LobbyReply, LobbyError> {
    match session::launch(host, port) {
        Ok(handle) => {
            handle.detach();
            send(writer, &ServerLine::LobbyStarted { port })?;
            send(writer, &ServerLine::RoleNotice)?;
            Ok(LobbyReply::Started { port })
        }
        Err(e) => {
            // Another request claimed the port between probe and bind.
            error!(port, error = %e, "session aborted before start");
            send(writer, &ServerLine::PortInUse)?;
            Ok(LobbyReply::PortInUse { port })
        }
    }
}

/// Parse a requested port: surrounding whitespace is ignored, port 0 is
/// not a real port.
pub fn parse_port(input: &str) -> Result<u16, LobbyError> {
    match input.trim().parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(LobbyError::InvalidPort {
            input: input.to_string(),
        }),
    }
}

/// Best-effort check that nothing is listening on `host:port`. Binds and
/// immediately releases the port, so the answer can be stale by the time
/// the caller acts on it.
pub fn port_available(host: &str, port: u16) -> bool {
    TcpListener::bind((host, port)).is_ok()
}

fn send<W: Write>(writer: &mut W, line: &ServerLine) -> io::Result<()> {
    write_line(writer, &line.to_string())
}
