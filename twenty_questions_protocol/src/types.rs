// Core value types for the 20 Questions protocol.
//
// These are shared by the server's turn engine and by anything that needs to
// reason about what a line means: the participant `Role`, the answerer's
// canonical `Response`, and the game `Category`. The line protocol only ever
// sends their `Display` text. The serde derives are for code that keeps a
// game record as data (a saved transcript, a test fixture) rather than as
// rendered lines.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of questions the questioner may ask in one session.
pub const MAX_QUESTIONS: u8 = 20;

/// Which side of the game a connection plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Supplies the secret, the category, and a response to every question.
    Answerer,
    /// Asks questions and tries to name the secret.
    Questioner,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Answerer => f.write_str("answerer"),
            Role::Questioner => f.write_str("questioner"),
        }
    }
}

/// The answerer's reply to one question, chosen by number 1-5.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Response {
    Yes,
    No,
    Maybe,
    NotSure,
    /// Concession: ends the game in the questioner's favor.
    CloseEnough,
}

impl Response {
    /// All responses in menu order (choice 1 first).
    pub const ALL: [Response; 5] = [
        Response::Yes,
        Response::No,
        Response::Maybe,
        Response::NotSure,
        Response::CloseEnough,
    ];

    /// Map a menu number to a response. Only 1 through 5 are valid.
    pub fn from_choice(choice: i64) -> Option<Response> {
        match choice {
            1 => Some(Response::Yes),
            2 => Some(Response::No),
            3 => Some(Response::Maybe),
            4 => Some(Response::NotSure),
            5 => Some(Response::CloseEnough),
            _ => None,
        }
    }

    /// Menu number for this response.
    pub fn choice(self) -> u8 {
        match self {
            Response::Yes => 1,
            Response::No => 2,
            Response::Maybe => 3,
            Response::NotSure => 4,
            Response::CloseEnough => 5,
        }
    }

    /// Human-readable label sent to the questioner after `Answer: `.
    pub fn label(self) -> &'static str {
        match self {
            Response::Yes => "Yes",
            Response::No => "No",
            Response::Maybe => "Maybe",
            Response::NotSure => "Not Sure",
            Response::CloseEnough => "Close Enough",
        }
    }

    /// True if this response ends the game.
    pub fn is_concession(self) -> bool {
        self == Response::CloseEnough
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The category the answerer announces for the secret.
///
/// The answerer types free text. The three canonical names are recognized
/// case-insensitively; anything else is carried through as typed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Person,
    Place,
    Thing,
    Other(String),
    /// The answerer sent a blank line.
    Unspecified,
}

impl Category {
    pub fn parse(raw: &str) -> Category {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Category::Unspecified;
        }
        match trimmed.to_lowercase().as_str() {
            "person" => Category::Person,
            "place" => Category::Place,
            "thing" => Category::Thing,
            _ => Category::Other(trimmed.to_string()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Person => f.write_str("Person"),
            Category::Place => f.write_str("Place"),
            Category::Thing => f.write_str("Thing"),
            Category::Other(text) => f.write_str(text),
            Category::Unspecified => f.write_str("unspecified"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choices_map_to_responses() {
        assert_eq!(Response::from_choice(1), Some(Response::Yes));
        assert_eq!(Response::from_choice(2), Some(Response::No));
        assert_eq!(Response::from_choice(3), Some(Response::Maybe));
        assert_eq!(Response::from_choice(4), Some(Response::NotSure));
        assert_eq!(Response::from_choice(5), Some(Response::CloseEnough));
    }

    #[test]
    fn out_of_range_choices_have_no_response() {
        for choice in [i64::MIN, -1, 0, 6, 7, 100, i64::MAX] {
            assert_eq!(Response::from_choice(choice), None, "choice {choice}");
        }
    }

    #[test]
    fn choice_is_inverse_of_from_choice() {
        for response in Response::ALL {
            assert_eq!(
                Response::from_choice(i64::from(response.choice())),
                Some(response)
            );
        }
    }

    #[test]
    fn only_close_enough_concedes() {
        let concessions: Vec<_> = Response::ALL
            .into_iter()
            .filter(|r| r.is_concession())
            .collect();
        assert_eq!(concessions, vec![Response::CloseEnough]);
    }

    #[test]
    fn labels_never_look_like_prompts() {
        for response in Response::ALL {
            let label = response.label();
            assert!(!label.ends_with(':') && !label.ends_with('!'), "{label}");
        }
    }

    #[test]
    fn category_parse_canonical_names() {
        assert_eq!(Category::parse("Person"), Category::Person);
        assert_eq!(Category::parse("  place "), Category::Place);
        assert_eq!(Category::parse("THING"), Category::Thing);
    }

    #[test]
    fn category_parse_keeps_free_text() {
        assert_eq!(
            Category::parse(" Animal "),
            Category::Other("Animal".into())
        );
        assert_eq!(Category::parse("   "), Category::Unspecified);
        assert_eq!(Category::parse("Animal").to_string(), "Animal");
    }

    #[test]
    fn role_serializes_as_variant_name() {
        let json = serde_json::to_string(&Role::Questioner).unwrap();
        assert_eq!(json, "\"Questioner\"");
    }

    #[test]
    fn free_text_category_keeps_its_text_as_data() {
        let category = Category::parse("Animal");
        let json = serde_json::to_string(&category).unwrap();
        assert_eq!(json, r#"{"Other":"Animal"}"#);
        let back: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(back, category);
    }
}
