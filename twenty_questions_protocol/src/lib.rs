// twenty_questions_protocol — line protocol for the 20 Questions server.
//
// This crate defines the text vocabulary, framing, and value types used by
// the lobby/session server (`twenty_questions_server`) and by line clients.
// It is shared by both sides and has no networking of its own.
//
// Module overview:
// - `types.rs`:    Domain value types — `Role`, `Response`, `Category`, and
//                  the `MAX_QUESTIONS` budget.
// - `message.rs`:  `ServerLine`, every line the server can send, with its
//                  rendered text and prompt/notice classification, plus the
//                  client-side `line_is_prompt` heuristic.
// - `framing.rs`:  Newline-delimited framing over any `BufRead`/`Write`
//                  stream, with a maximum line length.
//
// Design decisions:
// - **Plain text, no tags.** Any telnet-style client can play. The meaning
//   of a line is positional: the receiver's state decides how to read it.
// - **Prompt convention.** Prompts end in `:`; notices never end in `:` or
//   `!`. The tests in `message.rs` check every variant against the client
//   heuristic.
// - **No async runtime.** Framing uses `std::io`, compatible with blocking
//   TCP streams and in-memory buffers alike.

pub mod framing;
pub mod message;
pub mod types;

pub use framing::{MAX_LINE_LEN, read_line, write_line};
pub use message::{ServerLine, line_is_prompt, strip_prompt_markers};
pub use types::{Category, MAX_QUESTIONS, Response, Role};
