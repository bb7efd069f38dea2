// Newline-delimited text framing over TCP.
//
// Every message in both the lobby exchange and the game session is one line
// of UTF-8 text terminated by `\n`. There are no type tags: the receiver's
// current state decides how to interpret the next line. `read_line` and
// `write_line` work on any `BufRead`/`Write`, so the same code drives real
// sockets and in-memory buffers in tests.
//
// A `MAX_LINE_LEN` constant (64 KiB) protects against unbounded buffering
// from a peer that never sends a newline. Questions and secrets are short;
// 64 KiB is far more than any human will type.

use std::io::{self, BufRead, Read, Write};

/// Maximum accepted line length in bytes, excluding the terminator.
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Read one line, stripping the trailing `\n` (and `\r`, if present).
///
/// Returns `Ok(None)` on a clean end of stream before any byte of a new
/// line. Returns `InvalidData` if the line exceeds `MAX_LINE_LEN` or is not
/// valid UTF-8.
pub fn read_line<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut buf = String::new();
    let limit = MAX_LINE_LEN as u64 + 1;
    let read = reader.by_ref().take(limit).read_line(&mut buf)?;
    if read == 0 {
        return Ok(None);
    }
    if buf.ends_with('\n') {
        buf.pop();
        if buf.ends_with('\r') {
            buf.pop();
        }
    }
    if buf.len() > MAX_LINE_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("line too long: more than {MAX_LINE_LEN} bytes"),
        ));
    }
    Ok(Some(buf))
}

/// Write `text` followed by `\n`, then flush so the peer sees it at once.
pub fn write_line<W: Write>(writer: &mut W, text: &str) -> io::Result<()> {
    writer.write_all(text.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}
