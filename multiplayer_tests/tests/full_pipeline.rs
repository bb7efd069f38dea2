// End-to-end tests through the lobby and real game sessions.
//
// Each test starts a real lobby on localhost, creates a game through the
// lobby protocol, connects plain TCP players, and checks the exact lines both
// sides see, through to the server closing the connections.

use multiplayer_tests::{
    TestPlayer, create_game, free_port, request_game, seat_players, start_test_lobby,
    wait_for_port_release,
};
use twenty_questions_protocol::{MAX_QUESTIONS, Response, ServerLine};

/// Ask one question that misses and answer it with `choice`.
fn ask_and_answer(
    answerer: &mut TestPlayer,
    questioner: &mut TestPlayer,
    number: u8,
    question: &str,
    choice: &str,
) {
    questioner.send(question);
    answerer.expect(&ServerLine::QuestionRelay {
        number,
        text: question.into(),
    });
    answerer.expect(&ServerLine::ResponsePrompt);
    answerer.send(choice);
}

// ---------------------------------------------------------------------------
// Test scenarios
// ---------------------------------------------------------------------------

/// A question that names the secret wins at once, before any question is
/// counted.
#[test]
fn immediate_win_before_any_question() {
    let (lobby, lobby_addr) = start_test_lobby();
    let game = create_game(lobby_addr);

    let (mut answerer, mut questioner) = seat_players(game, "banana", "Thing");
    questioner.send("is it a banana");

    questioner.expect(&ServerLine::Guessed);
    questioner.expect_closed();
    answerer.expect(&ServerLine::GuessedNotice);
    answerer.expect_closed();

    lobby.stop();
}

/// Invalid responses are re-prompted without using up a question.
#[test]
fn normalizer_reprompts_then_answers() {
    let (lobby, lobby_addr) = start_test_lobby();
    let game = create_game(lobby_addr);

    let (mut answerer, mut questioner) = seat_players(game, "banana", "Thing");
    ask_and_answer(&mut answerer, &mut questioner, 1, "is it an animal?", "7");
    answerer.expect(&ServerLine::OutOfRange);
    answerer.send("x");
    answerer.expect(&ServerLine::InvalidResponse);
    answerer.send("2");

    questioner.expect(&ServerLine::Answer {
        response: Response::No,
    });
    questioner.expect(&ServerLine::QuestionPrompt { number: 2 });

    // The next question is number 2: retries did not count.
    questioner.send("Is it a BANANA?");
    questioner.expect(&ServerLine::Guessed);
    answerer.expect(&ServerLine::GuessedNotice);
    answerer.expect_closed();
    questioner.expect_closed();

    lobby.stop();
}

/// Twenty unanswered questions end the game for both sides.
#[test]
fn twenty_questions_exhaust_the_budget() {
    let (lobby, lobby_addr) = start_test_lobby();
    let game = create_game(lobby_addr);

    let (mut answerer, mut questioner) = seat_players(game, "banana", "Thing");
    for number in 1..=MAX_QUESTIONS {
        ask_and_answer(
            &mut answerer,
            &mut questioner,
            number,
            &format!("guess number {number}?"),
            "2",
        );
        questioner.expect(&ServerLine::Answer {
            response: Response::No,
        });
        if number < MAX_QUESTIONS {
            questioner.expect(&ServerLine::QuestionPrompt { number: number + 1 });
        }
    }

    questioner.expect(&ServerLine::Exhausted);
    questioner.expect_closed();
    answerer.expect(&ServerLine::ExhaustedNotice);
    answerer.expect_closed();

    lobby.stop();
}

/// "Close Enough" ends the game with budget left.
#[test]
fn close_enough_concedes_mid_game() {
    let (lobby, lobby_addr) = start_test_lobby();
    let game = create_game(lobby_addr);

    let (mut answerer, mut questioner) = seat_players(game, "banana", "thing");
    ask_and_answer(&mut answerer, &mut questioner, 1, "is it food?", "1");
    questioner.expect(&ServerLine::Answer {
        response: Response::Yes,
    });
    questioner.expect(&ServerLine::QuestionPrompt { number: 2 });

    ask_and_answer(&mut answerer, &mut questioner, 2, "is it a plantain?", "5");
    questioner.expect_text("Answer: Close Enough");
    questioner.expect(&ServerLine::CloseEnough);
    questioner.expect_closed();
    answerer.expect(&ServerLine::CloseEnoughNotice);
    answerer.expect_closed();

    lobby.stop();
}

/// A third connection gets exactly one line and is closed by the server;
/// the game in progress is unaffected.
#[test]
fn third_connection_is_turned_away() {
    let (lobby, lobby_addr) = start_test_lobby();
    let game = create_game(lobby_addr);

    let (mut answerer, mut questioner) = seat_players(game, "banana", "Thing");

    let mut extra = TestPlayer::connect(game);
    extra.expect(&ServerLine::LobbyFull);
    extra.expect_closed();

    ask_and_answer(&mut answerer, &mut questioner, 1, "is it yellow?", "1");
    questioner.expect(&ServerLine::Answer {
        response: Response::Yes,
    });
    questioner.expect(&ServerLine::QuestionPrompt { number: 2 });
    questioner.send("banana");
    questioner.expect(&ServerLine::Guessed);
    answerer.expect(&ServerLine::GuessedNotice);

    lobby.stop();
}

/// A port with a live session is reported in use; once the session ends the
/// port can host a new game.
#[test]
fn busy_port_is_refused_until_session_ends() {
    let (lobby, lobby_addr) = start_test_lobby();
    let game = create_game(lobby_addr);
    let port = game.port();

    let lines = request_game(lobby_addr, &port.to_string());
    assert_eq!(lines, vec![ServerLine::PortInUse.to_string()]);

    let (mut answerer, mut questioner) = seat_players(game, "banana", "Thing");
    questioner.send("banana");
    questioner.expect(&ServerLine::Guessed);
    answerer.expect(&ServerLine::GuessedNotice);
    answerer.expect_closed();

    wait_for_port_release(port);
    let lines = request_game(lobby_addr, &port.to_string());
    assert_eq!(
        lines,
        vec![
            ServerLine::LobbyStarted { port }.to_string(),
            ServerLine::RoleNotice.to_string(),
        ]
    );

    lobby.stop();
}

/// Malformed port input gets a notice and no session.
#[test]
fn malformed_port_starts_nothing() {
    let (lobby, lobby_addr) = start_test_lobby();

    assert_eq!(
        request_game(lobby_addr, "not a port"),
        vec![ServerLine::InvalidPort.to_string()]
    );
    assert_eq!(
        request_game(lobby_addr, "0"),
        vec![ServerLine::InvalidPort.to_string()]
    );

    // The lobby keeps serving.
    let _game = create_game(lobby_addr);

    lobby.stop();
}

/// The questioner hanging up ends the session and frees the port.
#[test]
fn questioner_disconnect_ends_session() {
    let (lobby, lobby_addr) = start_test_lobby();
    let game = create_game(lobby_addr);

    let (mut answerer, questioner) = seat_players(game, "banana", "Thing");
    drop(questioner);

    answerer.expect_closed();
    wait_for_port_release(game.port());

    lobby.stop();
}

/// Two games on different ports run independently.
#[test]
fn concurrent_sessions_are_isolated() {
    let (lobby, lobby_addr) = start_test_lobby();
    let game_a = create_game(lobby_addr);
    let game_b = create_game(lobby_addr);
    assert_ne!(game_a.port(), game_b.port());

    let (mut answerer_a, mut questioner_a) = seat_players(game_a, "banana", "Thing");
    let (mut answerer_b, mut questioner_b) = seat_players(game_b, "paris", "Place");

    // Game B finishes first; game A is still waiting on its questioner.
    questioner_b.send("is it Paris");
    questioner_b.expect(&ServerLine::Guessed);
    answerer_b.expect(&ServerLine::GuessedNotice);
    answerer_b.expect_closed();

    ask_and_answer(&mut answerer_a, &mut questioner_a, 1, "is it paris?", "2");
    questioner_a.expect(&ServerLine::Answer {
        response: Response::No,
    });
    questioner_a.expect(&ServerLine::QuestionPrompt { number: 2 });

    lobby.stop();
}

/// Stopping the lobby leaves running sessions alone.
#[test]
fn sessions_outlive_the_lobby() {
    let (lobby, lobby_addr) = start_test_lobby();
    let game = create_game(lobby_addr);
    lobby.stop();

    let (mut answerer, mut questioner) = seat_players(game, "banana", "Thing");
    questioner.send("banana");
    questioner.expect(&ServerLine::Guessed);
    answerer.expect(&ServerLine::GuessedNotice);
}

/// Sanity check for the helper itself.
#[test]
fn free_port_is_bindable() {
    let port = free_port();
    assert_ne!(port, 0);
    wait_for_port_release(port);
}
