// Test-only players for end-to-end 20 Questions tests.
//
// `TestPlayer` is a plain TCP line client with blocking, timeout-guarded
// helpers for asserting on what the server sends. Scenarios drive a real
// lobby (`start_lobby`) and real game sessions over localhost. The only
// test-specific code is here: waiting for exact lines and polling for a
// port to be released.
//
// See also: `tests/full_pipeline.rs` for the scenarios.

use std::io::{BufReader, BufWriter};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use twenty_questions_protocol::{ServerLine, read_line, write_line};
use twenty_questions_server::ServerConfig;
use twenty_questions_server::lobby::{LobbyHandle, port_available, start_lobby};

/// Read timeout for every test socket. A stuck test fails instead of hanging.
const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// How long to wait for a finished session to release its port.
const RELEASE_TIMEOUT: Duration = Duration::from_secs(5);

/// Sleep between port release checks.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// One connection to a lobby or a game session.
pub struct TestPlayer {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl TestPlayer {
    pub fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).expect("connect failed");
        stream
            .set_read_timeout(Some(READ_TIMEOUT))
            .expect("set_read_timeout failed");
        let reader_stream = stream.try_clone().expect("clone failed");
        Self {
            reader: BufReader::new(reader_stream),
            writer: BufWriter::new(stream),
        }
    }

    /// Next line from the server, or `None` once the server has closed.
    pub fn recv(&mut self) -> Option<String> {
        read_line(&mut self.reader).expect("read from server failed")
    }

    /// Assert the next line is exactly `expected`.
    pub fn expect(&mut self, expected: &ServerLine) {
        let line = self.recv();
        assert_eq!(
            line.as_deref(),
            Some(expected.to_string().as_str()),
            "expected {expected:?}"
        );
    }

    /// Assert the next line is exactly `expected` text.
    pub fn expect_text(&mut self, expected: &str) {
        assert_eq!(self.recv().as_deref(), Some(expected));
    }

    /// Assert the server has closed the connection.
    pub fn expect_closed(&mut self) {
        let line = self.recv();
        assert_eq!(line, None, "expected the server to close the connection");
    }

    pub fn send(&mut self, text: &str) {
        write_line(&mut self.writer, text).expect("write to server failed");
    }
}

/// Start a lobby on an OS-assigned loopback port.
pub fn start_test_lobby() -> (LobbyHandle, SocketAddr) {
    start_lobby(ServerConfig::local_ephemeral()).expect("start_lobby failed")
}

/// A loopback port nothing is listening on right now.
pub fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind failed");
    listener.local_addr().expect("local_addr failed").port()
}

/// Ask the lobby for a game on `port` and return every line it sent.
/// The lobby closes the connection after one exchange.
pub fn request_game(lobby: SocketAddr, port_text: &str) -> Vec<String> {
    let mut client = TestPlayer::connect(lobby);
    client.expect(&ServerLine::PortPrompt);
    client.send(port_text);
    let mut lines = Vec::new();
    while let Some(line) = client.recv() {
        lines.push(line);
    }
    lines
}

/// Create a game on a fresh port through the lobby and return its address.
pub fn create_game(lobby: SocketAddr) -> SocketAddr {
    let port = free_port();
    let lines = request_game(lobby, &port.to_string());
    assert_eq!(
        lines,
        vec![
            ServerLine::LobbyStarted { port }.to_string(),
            ServerLine::RoleNotice.to_string(),
        ]
    );
    SocketAddr::from(([127, 0, 0, 1], port))
}

/// Connect the answerer and then the questioner to a game, and walk through
/// the secret and category exchange. Returns (answerer, questioner) with the
/// questioner waiting on its first question prompt already consumed.
pub fn seat_players(game: SocketAddr, secret: &str, category: &str) -> (TestPlayer, TestPlayer) {
    let mut answerer = TestPlayer::connect(game);
    let mut questioner = TestPlayer::connect(game);

    answerer.expect(&ServerLine::SecretPrompt);
    answerer.send(secret);
    answerer.expect(&ServerLine::CategoryPrompt);
    answerer.send(category);

    let announcement = questioner.recv().expect("missing category announcement");
    assert!(
        announcement.starts_with("You are the questioner. The category is "),
        "{announcement}"
    );
    questioner.expect(&ServerLine::QuestionPrompt { number: 1 });

    (answerer, questioner)
}

/// Block until nothing is listening on `port`, or panic after a timeout.
pub fn wait_for_port_release(port: u16) {
    let start = Instant::now();
    while !port_available("127.0.0.1", port) {
        assert!(
            start.elapsed() < RELEASE_TIMEOUT,
            "port {port} was never released"
        );
        thread::sleep(POLL_INTERVAL);
    }
}
