// Every line the server sends, in one enum.
//
// `ServerLine` is the full vocabulary of the lobby exchange and the game
// session. Rendering goes through `Display`, and each variant knows whether
// it is a prompt. Clients have no message tags to go on; they treat a line
// ending in `:` or `!` as a request for one line of input and everything
// else as display-only (`line_is_prompt`). Every prompt therefore renders
// with a trailing `:`, and no notice may end in `:` or `!`.
//
// Notices that echo user text (the category, a relayed question) pass it
// through `strip_prompt_markers` first, so a question typed as "is it big!"
// can't turn the relay line into a prompt.

use std::fmt;

use crate::types::{Category, MAX_QUESTIONS, Response};

/// Lines sent by the lobby and by a game session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServerLine {
    // Lobby exchange.
    PortPrompt,
    PortInUse,
    InvalidPort,
    LobbyStarted { port: u16 },
    RoleNotice,

    // To the answerer.
    SecretPrompt,
    CategoryPrompt,
    QuestionRelay { number: u8, text: String },
    ResponsePrompt,
    InvalidResponse,
    OutOfRange,
    GuessedNotice,
    CloseEnoughNotice,
    ExhaustedNotice,

    // To the questioner.
    CategoryAnnouncement { category: Category },
    QuestionPrompt { number: u8 },
    Answer { response: Response },
    Guessed,
    CloseEnough,
    Exhausted,

    /// To any connection beyond the first two on a session port.
    LobbyFull,
}

impl ServerLine {
    /// True if the receiving client is expected to reply with one line.
    pub fn is_prompt(&self) -> bool {
        matches!(
            self,
            ServerLine::PortPrompt
                | ServerLine::SecretPrompt
                | ServerLine::CategoryPrompt
                | ServerLine::ResponsePrompt
                | ServerLine::InvalidResponse
                | ServerLine::OutOfRange
                | ServerLine::QuestionPrompt { .. }
        )
    }
}

impl fmt::Display for ServerLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerLine::PortPrompt => f.write_str(
                "Welcome! Enter a port number for your game lobby (e.g., 1000-9998):",
            ),
            ServerLine::PortInUse => {
                f.write_str("That port is already in use. Please choose a different one.")
            }
            ServerLine::InvalidPort => f.write_str("That is not a valid port number."),
            ServerLine::LobbyStarted { port } => write!(f, "Game lobby started on port {port}."),
            ServerLine::RoleNotice => f.write_str(
                "Whoever connects first will be the answerer; the second will be the questioner.",
            ),
            ServerLine::SecretPrompt => {
                f.write_str("You are the answerer. Enter the object to be guessed:")
            }
            ServerLine::CategoryPrompt => {
                f.write_str("Enter the category (Person, Place, or Thing):")
            }
            ServerLine::QuestionRelay { number, text } => {
                write!(f, "Question {number}: {}", strip_prompt_markers(text))
            }
            ServerLine::ResponsePrompt => f.write_str(
                "Respond with the number: Yes (1), No (2), Maybe (3), Not Sure (4), Close Enough (5):",
            ),
            ServerLine::InvalidResponse => f.write_str("Invalid input. Enter a number (1-5):"),
            ServerLine::OutOfRange => f.write_str("Please enter a number between 1-5:"),
            ServerLine::GuessedNotice => f.write_str("Game over. The questioner got it."),
            ServerLine::CloseEnoughNotice => f.write_str("Game over. You called it close enough."),
            ServerLine::ExhaustedNotice => write!(
                f,
                "Game over. The questioner used all {MAX_QUESTIONS} questions."
            ),
            ServerLine::CategoryAnnouncement { category } => {
                let category = category.to_string();
                write!(
                    f,
                    "You are the questioner. The category is {}.",
                    strip_prompt_markers(&category)
                )
            }
            ServerLine::QuestionPrompt { number: 1 } => {
                write!(f, "Enter your question (1/{MAX_QUESTIONS}):")
            }
            ServerLine::QuestionPrompt { number } => {
                write!(f, "Enter your next question ({number}/{MAX_QUESTIONS}):")
            }
            ServerLine::Answer { response } => write!(f, "Answer: {}", response.label()),
            ServerLine::Guessed => f.write_str("YOU GOT IT, CONGRATS"),
            ServerLine::CloseEnough => {
                f.write_str("The answerer says you are close enough. Game over.")
            }
            ServerLine::Exhausted => f.write_str("Game over. You ran out of questions."),
            ServerLine::LobbyFull => f.write_str("Lobby full. This game already has 2 players."),
        }
    }
}

/// Client-side heuristic: a line ending in `:` or `!` asks for a reply.
pub fn line_is_prompt(line: &str) -> bool {
    line.ends_with(':') || line.ends_with('!')
}

/// Trim trailing whitespace and any trailing `:`/`!` from echoed user text.
pub fn strip_prompt_markers(text: &str) -> &str {
    text.trim_end_matches(|c: char| c.is_whitespace() || c == ':' || c == '!')
}
