// Response normalizer: turn the answerer's raw reply into a `Response`.
//
// The answerer picks a response by number. A reply that is not an integer
// gets the "invalid input" prompt; an integer outside 1-5 gets the "choose
// 1-5" prompt. Either way the normalizer keeps asking until it gets a valid
// choice. Retries are unbounded and do not count against the question
// budget. This is the only place in the protocol that repeats a prompt.
//
// End of stream while waiting is fatal to the session and propagates out.

use std::io::{BufRead, Write};

use tracing::debug;
use twenty_questions_protocol::{Response, ServerLine};

use crate::channel::Channel;
use crate::error::SessionError;

/// Why a raw reply was not a valid response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    NotANumber,
    OutOfRange(i64),
}

impl Rejection {
    /// The re-prompt sent back to the answerer.
    pub fn reprompt(self) -> ServerLine {
        match self {
            Rejection::NotANumber => ServerLine::InvalidResponse,
            Rejection::OutOfRange(_) => ServerLine::OutOfRange,
        }
    }
}

/// Classify one raw line. The text must be a plain 32-bit integer, with no
/// surrounding whitespace; anything wider counts as not a number.
pub fn normalize(raw: &str) -> Result<Response, Rejection> {
    let choice = i64::from(raw.parse::<i32>().map_err(|_| Rejection::NotANumber)?);
    Response::from_choice(choice).ok_or(Rejection::OutOfRange(choice))
}

/// Read replies from the answerer until one is a valid response,
/// re-prompting after each invalid one.
pub fn read_response<R: BufRead, W: Write>(
    answerer: &mut Channel<R, W>,
) -> Result<Response, SessionError> {
    loop {
        let raw = answerer.expect_line("a response")?;
        match normalize(&raw) {
            Ok(response) => return Ok(response),
            Err(rejection) => {
                debug!(raw = %raw, ?rejection, "rejected answerer response");
                answerer.send(&rejection.reprompt())?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use twenty_questions_protocol::Role;

    use super::*;

    fn answerer(input: &str) -> Channel<Cursor<Vec<u8>>, Vec<u8>> {
        Channel::new(
            Role::Answerer,
            Cursor::new(input.as_bytes().to_vec()),
            Vec::new(),
        )
    }

    fn written_lines(channel: Channel<Cursor<Vec<u8>>, Vec<u8>>) -> Vec<String> {
        let (_, written) = channel.into_parts();
        String::from_utf8(written)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn normalize_valid_choices() {
        assert_eq!(normalize("1"), Ok(Response::Yes));
        assert_eq!(normalize("2"), Ok(Response::No));
        assert_eq!(normalize("3"), Ok(Response::Maybe));
        assert_eq!(normalize("4"), Ok(Response::NotSure));
        assert_eq!(normalize("5"), Ok(Response::CloseEnough));
    }

    #[test]
    fn normalize_rejects_non_numbers() {
        for raw in ["", "x", "yes", "1.0", " 2", "2 ", "two", "3000000000"] {
            assert_eq!(normalize(raw), Err(Rejection::NotANumber), "{raw:?}");
        }
    }

    #[test]
    fn normalize_rejects_out_of_range() {
        assert_eq!(normalize("0"), Err(Rejection::OutOfRange(0)));
        assert_eq!(normalize("6"), Err(Rejection::OutOfRange(6)));
        assert_eq!(normalize("-3"), Err(Rejection::OutOfRange(-3)));
    }

    #[test]
    fn reprompts_until_valid() {
        let mut channel = answerer("7\nx\n2\n");
        assert_eq!(read_response(&mut channel).unwrap(), Response::No);
        assert_eq!(
            written_lines(channel),
            vec![
                ServerLine::OutOfRange.to_string(),
                ServerLine::InvalidResponse.to_string(),
            ]
        );
    }

    #[test]
    fn valid_first_reply_sends_nothing() {
        let mut channel = answerer("5\n");
        assert_eq!(read_response(&mut channel).unwrap(), Response::CloseEnough);
        assert!(written_lines(channel).is_empty());
    }

    #[test]
    fn long_retry_run_still_terminates_on_valid_reply() {
        let mut input = "nope\n".repeat(50);
        input.push_str("4\n");
        let mut channel = answerer(&input);
        assert_eq!(read_response(&mut channel).unwrap(), Response::NotSure);
        assert_eq!(written_lines(channel).len(), 50);
    }

    #[test]
    fn end_of_stream_is_fatal() {
        let mut channel = answerer("9\n");
        let err = read_response(&mut channel).unwrap_err();
        assert!(
            matches!(
                err,
                SessionError::Disconnected {
                    role: Role::Answerer,
                    ..
                }
            ),
            "{err:?}"
        );
    }
}
