// twenty_questions_server — lobby and game sessions for 20 Questions over TCP.
//
// A lobby listens on a well-known port. A player connects, names a port, and
// the lobby starts a game session there. The first two connections to that
// port become the answerer and the questioner; anyone after them is told the
// lobby is full. The session runs a line-based question/answer protocol until
// the secret is guessed, the answerer concedes, or 20 questions are used.
//
// Module overview:
// - `engine.rs`:     Turn engine — the state machine for one game, the `Game`
//                    record, and the win test. The core of the crate.
// - `normalizer.rs`: Response normalizer — maps the answerer's numeric reply
//                    to a `Response`, re-prompting on invalid input.
// - `channel.rs`:    Per-participant line channel tagged with its `Role`.
// - `session.rs`:    Session lifecycle — bind, role assignment, rejection of
//                    extra connections, teardown.
// - `lobby.rs`:      Lobby dispatcher — listener thread, per-request workers,
//                    advisory port probe.
// - `client.rs`:     Prompt-driven line client used by the `client` binary.
// - `config.rs`, `error.rs`, `logging.rs`: configuration, error types,
//                    tracing setup.
//
// Concurrency is `std::net` and `std::thread` throughout: one thread per lobby
// request, and two per live session (the turn engine and the rejector).
// Sessions share no state with each other or with the lobby.
//
// Dependencies: `twenty_questions_protocol` (line framing and the server's
// vocabulary).

pub mod channel;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod lobby;
pub mod logging;
pub mod normalizer;
pub mod session;

pub use config::ServerConfig;
pub use engine::{Outcome, TurnEngine};
pub use lobby::{LobbyHandle, start_lobby};
pub use session::{SessionHandle, launch};
