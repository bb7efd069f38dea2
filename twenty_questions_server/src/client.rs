// Line client for the lobby and game sessions.
//
// The client knows nothing about game state. It prints every server line and,
// when a line looks like a prompt (`line_is_prompt`: trailing `:` or `!`),
// reads one line of user input and sends it back. The same loop works for
// the lobby exchange and for either role in a game, because the server's
// prompts carry all the sequencing.
//
// `run_client` is generic over the four streams so tests can drive it with
// in-memory buffers; `connect` wires it to a TCP socket and the terminal.

use std::io::{BufRead, BufReader, BufWriter, Write};
use std::net::{SocketAddr, TcpStream};

use twenty_questions_protocol::{line_is_prompt, read_line, write_line};

use crate::error::ClientError;

/// Why the client loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientExit {
    /// The server closed the connection.
    ServerClosed,
    /// User input ran out while the server was waiting for a reply.
    InputClosed,
}

/// Relay server lines to `display` and user replies to the server until one
/// side closes.
pub fn run_client<SR, SW, UI, D>(
    server_reader: &mut SR,
    server_writer: &mut SW,
    user_input: &mut UI,
    display: &mut D,
) -> Result<ClientExit, ClientError>
where
    SR: BufRead,
    SW: Write,
    UI: BufRead,
    D: Write,
{
    while let Some(line) = read_line(server_reader)? {
        writeln!(display, "{line}")?;
        display.flush()?;
        if line_is_prompt(&line) {
            let Some(reply) = read_line(user_input)? else {
                return Ok(ClientExit::InputClosed);
            };
            write_line(server_writer, &reply)?;
        }
    }
    Ok(ClientExit::ServerClosed)
}

/// Connect to `addr` and play from the terminal.
pub fn connect(addr: SocketAddr) -> Result<ClientExit, ClientError> {
    let stream =
        TcpStream::connect(addr).map_err(|source| ClientError::Connect { addr, source })?;
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = BufWriter::new(stream);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_client(&mut reader, &mut writer, &mut stdin.lock(), &mut stdout.lock())
}
