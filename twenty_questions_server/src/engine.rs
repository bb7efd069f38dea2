// Turn engine: the state machine that runs one game of 20 Questions.
//
// `TurnEngine` owns both participant channels and the `Game` record. Each
// call to `step` performs exactly one transition:
//
//   AwaitSecret -> AwaitCategory -> AwaitQuestion
//   AwaitQuestion -> AwaitAnswererResponse | Terminal
//   AwaitAnswererResponse -> AwaitQuestion | Terminal
//
// Every read blocks only the session thread that runs the engine. Turn
// taking needs no locks: the state decides which participant is read next,
// and the other one simply isn't read from.
//
// The win check happens before the question counter moves, so a question
// that names the secret never uses up a turn. The check is a literal
// case-insensitive substring test of the secret inside the trimmed
// question, never the reverse.
//
// Transport failures (end of stream from the answerer, any I/O error)
// abort the session with a `SessionError`. End of stream from the
// questioner while a question is awaited is a normal terminal transition
// (`Outcome::Abandoned`), not an error.
//
// See also: `normalizer.rs` for response validation, `session.rs` for the
// socket lifecycle around the engine.

use std::fmt;
use std::io::{BufRead, Write};

use tracing::{debug, info};
use twenty_questions_protocol::{Category, MAX_QUESTIONS, Response, Role, ServerLine};

use crate::channel::Channel;
use crate::error::SessionError;
use crate::normalizer;

/// How a game ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The questioner's question contained the secret.
    Guessed { questions_asked: u8 },
    /// The answerer conceded with "Close Enough" on this question.
    CloseEnough { question: u8 },
    /// All questions were asked and answered without a win.
    Exhausted,
    /// The questioner closed the connection instead of asking.
    Abandoned { questions_asked: u8 },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Guessed { questions_asked } => {
                write!(f, "guessed after {questions_asked} questions")
            }
            Outcome::CloseEnough { question } => {
                write!(f, "conceded close enough on question {question}")
            }
            Outcome::Exhausted => write!(f, "all {MAX_QUESTIONS} questions used"),
            Outcome::Abandoned { questions_asked } => {
                write!(f, "questioner left after {questions_asked} questions")
            }
        }
    }
}

/// Where the engine is in the protocol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnState {
    AwaitSecret,
    AwaitCategory,
    AwaitQuestion,
    AwaitAnswererResponse { question: String },
    Terminal(Outcome),
}

/// One question and the response it got.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Turn {
    pub number: u8,
    pub question: String,
    pub response: Response,
}

/// The game record: what the answerer chose and how far play has gone.
/// Secret and category are written once, by the engine only.
#[derive(Clone, Debug)]
pub struct Game {
    port: u16,
    secret: Option<String>,
    category: Option<Category>,
    questions_asked: u8,
}

impl Game {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            secret: None,
            category: None,
            questions_asked: 0,
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }

    pub fn category(&self) -> Option<&Category> {
        self.category.as_ref()
    }

    pub fn questions_asked(&self) -> u8 {
        self.questions_asked
    }

    /// True if `question` names the secret: the secret, lowercased, is a
    /// substring of the trimmed, lowercased question. False before the
    /// secret is set.
    pub fn is_guessed_by(&self, question: &str) -> bool {
        self.secret
            .as_deref()
            .is_some_and(|secret| secret_in_question(secret, question))
    }

    fn set_secret(&mut self, secret: String) {
        debug_assert!(self.secret.is_none(), "secret is set once");
        if self.secret.is_none() {
            self.secret = Some(secret);
        }
    }

    fn set_category(&mut self, category: Category) {
        debug_assert!(self.category.is_none(), "category is set once");
        if self.category.is_none() {
            self.category = Some(category);
        }
    }

    /// Count a new question and return its number.
    fn record_question(&mut self) -> u8 {
        debug_assert!(self.questions_asked < MAX_QUESTIONS);
        self.questions_asked = (self.questions_asked + 1).min(MAX_QUESTIONS);
        self.questions_asked
    }

    fn budget_exhausted(&self) -> bool {
        self.questions_asked >= MAX_QUESTIONS
    }
}

/// The win test. Asymmetric on purpose: a question that is contained in
/// the secret does not win.
pub fn secret_in_question(secret: &str, question: &str) -> bool {
    question
        .trim()
        .to_lowercase()
        .contains(&secret.to_lowercase())
}

/// Drives one session's protocol over an answerer and a questioner channel.
pub struct TurnEngine<R, W> {
    answerer: Channel<R, W>,
    questioner: Channel<R, W>,
    game: Game,
    state: TurnState,
    last_turn: Option<Turn>,
}

impl<R: BufRead, W: Write> TurnEngine<R, W> {
    pub fn new(port: u16, answerer: Channel<R, W>, questioner: Channel<R, W>) -> Self {
        debug_assert_eq!(answerer.role(), Role::Answerer);
        debug_assert_eq!(questioner.role(), Role::Questioner);
        Self {
            answerer,
            questioner,
            game: Game::new(port),
            state: TurnState::AwaitSecret,
            last_turn: None,
        }
    }

    pub fn state(&self) -> &TurnState {
        &self.state
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// The most recently completed question/response pair.
    pub fn last_turn(&self) -> Option<&Turn> {
        self.last_turn.as_ref()
    }

    /// Outcome, once the engine has reached `Terminal`.
    pub fn outcome(&self) -> Option<&Outcome> {
        match &self.state {
            TurnState::Terminal(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Step until `Terminal` and return the outcome.
    pub fn run(&mut self) -> Result<Outcome, SessionError> {
        loop {
            if let Some(outcome) = self.outcome() {
                return Ok(outcome.clone());
            }
            self.step()?;
        }
    }

    /// Perform one transition. A no-op once `Terminal`.
    pub fn step(&mut self) -> Result<(), SessionError> {
        let next = match &self.state {
            TurnState::AwaitSecret => self.await_secret()?,
            TurnState::AwaitCategory => self.await_category()?,
            TurnState::AwaitQuestion => self.await_question()?,
            TurnState::AwaitAnswererResponse { question } => {
                let question = question.clone();
                self.await_answerer_response(question)?
            }
            TurnState::Terminal(_) => return Ok(()),
        };
        if let TurnState::Terminal(outcome) = &next {
            info!(port = self.game.port, %outcome, "game over");
        }
        self.state = next;
        Ok(())
    }

    /// Hand back both channels for teardown.
    pub fn into_channels(self) -> (Channel<R, W>, Channel<R, W>) {
        (self.answerer, self.questioner)
    }

    fn await_secret(&mut self) -> Result<TurnState, SessionError> {
        self.answerer.send(&ServerLine::SecretPrompt)?;
        let secret = self.answerer.expect_line("the secret")?;
        debug!(port = self.game.port, "secret received");
        self.game.set_secret(secret);
        Ok(TurnState::AwaitCategory)
    }

    fn await_category(&mut self) -> Result<TurnState, SessionError> {
        self.answerer.send(&ServerLine::CategoryPrompt)?;
        let category = Category::parse(&self.answerer.expect_line("the category")?);
        debug!(port = self.game.port, %category, "category received");
        self.questioner.send(&ServerLine::CategoryAnnouncement {
            category: category.clone(),
        })?;
        self.game.set_category(category);
        self.questioner
            .send(&ServerLine::QuestionPrompt { number: 1 })?;
        Ok(TurnState::AwaitQuestion)
    }

    fn await_question(&mut self) -> Result<TurnState, SessionError> {
        let Some(question) = self.questioner.recv()? else {
            return Ok(TurnState::Terminal(Outcome::Abandoned {
                questions_asked: self.game.questions_asked,
            }));
        };

        if self.game.is_guessed_by(&question) {
            self.questioner.send(&ServerLine::Guessed)?;
            self.answerer.send(&ServerLine::GuessedNotice)?;
            return Ok(TurnState::Terminal(Outcome::Guessed {
                questions_asked: self.game.questions_asked,
            }));
        }

        let number = self.game.record_question();
        debug!(port = self.game.port, number, question = %question, "question asked");
        self.answerer.send(&ServerLine::QuestionRelay {
            number,
            text: question.clone(),
        })?;
        self.answerer.send(&ServerLine::ResponsePrompt)?;
        Ok(TurnState::AwaitAnswererResponse { question })
    }

    fn await_answerer_response(&mut self, question: String) -> Result<TurnState, SessionError> {
        let response = normalizer::read_response(&mut self.answerer)?;
        let number = self.game.questions_asked;
        debug!(port = self.game.port, number, %response, "question answered");
        self.questioner.send(&ServerLine::Answer { response })?;
        self.last_turn = Some(Turn {
            number,
            question,
            response,
        });

        if response.is_concession() {
            self.questioner.send(&ServerLine::CloseEnough)?;
            self.answerer.send(&ServerLine::CloseEnoughNotice)?;
            return Ok(TurnState::Terminal(Outcome::CloseEnough { question: number }));
        }

        if self.game.budget_exhausted() {
            self.questioner.send(&ServerLine::Exhausted)?;
            self.answerer.send(&ServerLine::ExhaustedNotice)?;
            return Ok(TurnState::Terminal(Outcome::Exhausted));
        }

        self.questioner
            .send(&ServerLine::QuestionPrompt { number: number + 1 })?;
        Ok(TurnState::AwaitQuestion)
    }
}
