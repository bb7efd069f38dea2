// Game session lifecycle: bind, assign roles, run the turn engine, tear down.
//
// A session owns one listening port and runs on its own thread:
//
// 1. `launch()` binds the port on the caller's thread, so a bind failure is
//    reported to the caller as a fatal `SessionError::Bind` rather than lost
//    on a background thread. The lobby's availability probe is advisory; this
//    bind is what actually claims the port.
// 2. Role assignment blocks on two accepts. Arrival order decides the role:
//    first is the answerer, second the questioner. Nobody else gets one.
// 3. The listener then moves into the rejector thread, which tells every
//    further connection the lobby is full and closes it. It polls a
//    non-blocking accept loop guarded by a stop flag, the same pattern the
//    lobby uses for its own listener. If the rejector cannot start, both
//    players are disconnected and the session ends before the first prompt.
// 4. The turn engine runs on the session thread until a terminal state or a
//    transport failure.
// 5. Teardown: shut down both participant sockets, then stop and join the
//    rejector, which drops the listener and frees the port.
//
// The session thread and the rejector share nothing but the stop flag. Each
// session is fully isolated from every other session.

use std::io::{self, BufWriter};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info};
use twenty_questions_protocol::{Role, ServerLine, write_line};

use crate::channel::TcpChannel;
use crate::engine::{Outcome, TurnEngine};
use crate::error::SessionError;

/// How often the rejector re-checks its stop flag while idle.
const REJECT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// The two connections that received roles.
pub struct Seats {
    pub answerer: TcpStream,
    pub questioner: TcpStream,
}

impl Seats {
    /// Disconnect both players without a word.
    fn close(self) {
        let _ = self.answerer.shutdown(Shutdown::Both);
        let _ = self.questioner.shutdown(Shutdown::Both);
    }
}

/// Handle to a running session thread.
pub struct SessionHandle {
    port: u16,
    local_addr: SocketAddr,
    thread: JoinHandle<Result<Outcome, SessionError>>,
}

impl SessionHandle {
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Address the session listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Wait for the session to finish and return how it ended.
    pub fn join(self) -> Result<Outcome, SessionError> {
        match self.thread.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    /// Let the session run on without anyone waiting for it.
    pub fn detach(self) {
        debug!(port = self.port, "session detached");
    }
}

/// Bind `host:port` and run a game session on a dedicated thread.
///
/// Port 0 binds an OS-assigned port; `SessionHandle::port` reports the
/// actual one.
pub fn launch(host: &str, port: u16) -> Result<SessionHandle, SessionError> {
    let listener =
        TcpListener::bind((host, port)).map_err(|source| SessionError::Bind { port, source })?;
    let local_addr = listener
        .local_addr()
        .map_err(|source| SessionError::Bind { port, source })?;
    let port = local_addr.port();
    info!(port, "game session started, waiting for 2 players");

    let thread = thread::Builder::new()
        .name(format!("session-{port}"))
        .spawn(move || {
            let result = run_session(listener, port);
            match &result {
                Ok(outcome) => info!(port, %outcome, "game session closed"),
                Err(e) => error!(port, error = %e, "game session aborted"),
            }
            result
        })
        .map_err(|source| SessionError::Spawn { source })?;

    Ok(SessionHandle {
        port,
        local_addr,
        thread,
    })
}

/// Accept the first two connections on `listener` and label them by
/// arrival order.
pub fn assign_roles(listener: &TcpListener) -> Result<Seats, SessionError> {
    let answerer = accept_seat(listener, Role::Answerer)?;
    let questioner = accept_seat(listener, Role::Questioner)?;
    Ok(Seats {
        answerer,
        questioner,
    })
}

fn accept_seat(listener: &TcpListener, role: Role) -> Result<TcpStream, SessionError> {
    let (stream, peer) = listener
        .accept()
        .map_err(|source| SessionError::Accept { role, source })?;
    info!(%peer, %role, "player connected");
    Ok(stream)
}

/// Run one session to completion on an already-bound listener.
pub fn run_session(listener: TcpListener, port: u16) -> Result<Outcome, SessionError> {
    let seats = assign_roles(&listener)?;
    let rejector = Rejector::spawn(listener, port);
    play_guarded(seats, rejector, port)
}

/// Play only while extra connections are being turned away. Without a
/// rejector the seated players are disconnected before the first prompt.
fn play_guarded(
    seats: Seats,
    rejector: Result<Rejector, SessionError>,
    port: u16,
) -> Result<Outcome, SessionError> {
    let rejector = match rejector {
        Ok(rejector) => rejector,
        Err(e) => {
            seats.close();
            return Err(e);
        }
    };

    let result = play(seats, port);

    rejector.stop();
    debug!(port, "session listener closed");
    result
}

/// Run the turn engine over the seated players, then close both sockets.
fn play(seats: Seats, port: u16) -> Result<Outcome, SessionError> {
    let answerer = match TcpChannel::from_stream(Role::Answerer, seats.answerer) {
        Ok(channel) => channel,
        Err(e) => {
            let _ = seats.questioner.shutdown(Shutdown::Both);
            return Err(e);
        }
    };
    let questioner = match TcpChannel::from_stream(Role::Questioner, seats.questioner) {
        Ok(channel) => channel,
        Err(e) => {
            answerer.close();
            return Err(e);
        }
    };

    let mut engine = TurnEngine::new(port, answerer, questioner);
    let result = engine.run();

    let (answerer, questioner) = engine.into_channels();
    answerer.close();
    questioner.close();
    result
}

/// Background task that turns away every connection past the first two.
struct Rejector {
    keep_running: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl Rejector {
    /// Move `listener` to a rejector thread.
    fn spawn(listener: TcpListener, port: u16) -> Result<Rejector, SessionError> {
        listener
            .set_nonblocking(true)
            .map_err(|source| SessionError::Rejector { port, source })?;
        let keep_running = Arc::new(AtomicBool::new(true));
        let flag = keep_running.clone();
        let thread = thread::Builder::new()
            .name(format!("session-{port}-reject"))
            .spawn(move || reject_loop(listener, port, flag))
            .map_err(|source| SessionError::Spawn { source })?;
        Ok(Rejector {
            keep_running,
            thread,
        })
    }

    /// Stop the loop and wait for it, which drops the listener.
    fn stop(self) {
        self.keep_running.store(false, Ordering::SeqCst);
        let _ = self.thread.join();
    }
}

fn reject_loop(listener: TcpListener, port: u16, keep_running: Arc<AtomicBool>) {
    while keep_running.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, peer)) => {
                info!(port, %peer, "rejecting extra connection, lobby full");
                if let Err(e) = reject(stream) {
                    debug!(port, %peer, error = %e, "failed to notify rejected connection");
                }
            }
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(REJECT_POLL_INTERVAL);
            }
            Err(e) => {
                // The listener is going away with the session.
                debug!(port, error = %e, "session listener closed while rejecting");
                break;
            }
        }
    }
}

/// Send the lobby-full notice and close from the server side.
fn reject(stream: TcpStream) -> io::Result<()> {
    stream.set_nonblocking(false)?;
    let mut writer = BufWriter::new(stream);
    write_line(&mut writer, &ServerLine::LobbyFull.to_string())?;
    writer.get_ref().shutdown(Shutdown::Both)
}
