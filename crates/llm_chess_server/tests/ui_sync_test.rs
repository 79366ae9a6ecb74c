//! Tests for the human-facing sync client.

mod common;

use common::{FakeApi, spawn_server, transport_error};
use llm_chess_core::{MoveRequest, STARTING_FEN, Side};
use llm_chess_server::ui_sync::{AI_THINKING, TELL_AI_TO_PLAY, YOUR_TURN};
use llm_chess_server::{ChessApiClient, UiSyncClient};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
const AFTER_E4_E5: &str = "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2";
const AFTER_E4_E5_NF3: &str = "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2";

const FAST: Duration = Duration::from_millis(10);

async fn wait_for_board<A: llm_chess_server::MoveApi + 'static>(
    client: &UiSyncClient<A>,
    fen: &str,
) {
    let mut updates = client.subscribe();
    tokio::time::timeout(Duration::from_secs(5), async {
        while client.board().as_str() != fen {
            if updates.changed().await.is_err() {
                break;
            }
        }
    })
    .await
    .expect("board reached expected position");
}

#[tokio::test]
async fn test_mount_resets_and_shows_intro() {
    let api = Arc::new(FakeApi::new(STARTING_FEN));
    let client = UiSyncClient::mount(api.clone(), Side::White, FAST).await;

    assert_eq!(api.resets.load(Ordering::SeqCst), 1);
    assert!(api.board_reads.load(Ordering::SeqCst) >= 1);
    assert!(client.intro_visible());
    assert!(client.is_human_turn());
    assert_eq!(client.status_line(), YOUR_TURN);
    assert!(client.is_polling());
}

#[tokio::test]
async fn test_polling_follows_the_server() {
    let api = Arc::new(
        FakeApi::new(STARTING_FEN)
            .then_board(STARTING_FEN)
            .then_board(AFTER_E4)
            .then_board(AFTER_E4_E5),
    );
    let client = UiSyncClient::mount(api, Side::White, FAST).await;

    wait_for_board(&client, AFTER_E4_E5).await;
    assert!(!client.intro_visible());
    assert_eq!(client.turn().map(|t| t.move_number), Some(2));
    assert_eq!(client.status_line(), YOUR_TURN);
}

#[tokio::test]
async fn test_status_line_on_the_agents_turn() {
    let api = Arc::new(FakeApi::new(STARTING_FEN).then_board(AFTER_E4));
    let client = UiSyncClient::mount(api, Side::White, FAST).await;
    wait_for_board(&client, AFTER_E4).await;
    assert_eq!(client.status_line(), TELL_AI_TO_PLAY);

    let api = Arc::new(FakeApi::new(STARTING_FEN).then_board(AFTER_E4_E5_NF3));
    let client = UiSyncClient::mount(api, Side::White, FAST).await;
    wait_for_board(&client, AFTER_E4_E5_NF3).await;
    assert_eq!(client.status_line(), AI_THINKING);
}

#[tokio::test]
async fn test_out_of_turn_drop_is_not_sent() {
    let api = Arc::new(FakeApi::new(STARTING_FEN).then_board(AFTER_E4));
    let client = UiSyncClient::mount(api.clone(), Side::White, FAST).await;
    wait_for_board(&client, AFTER_E4).await;

    let outcome = client.on_drop("d2", "d4").await.expect("no transport used");
    assert!(outcome.is_none());
    assert!(api.moves.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn test_poll_failure_keeps_last_board() {
    let api = Arc::new(
        FakeApi::new(STARTING_FEN)
            .then_board(AFTER_E4)
            .then_error(transport_error())
            .then_error(transport_error()),
    );
    let client = UiSyncClient::mount(api.clone(), Side::White, FAST).await;
    wait_for_board(&client, AFTER_E4).await;

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(client.board().as_str(), AFTER_E4);
    assert!(client.is_polling());
}

#[tokio::test]
async fn test_unmount_stops_polling() {
    let api = Arc::new(FakeApi::new(STARTING_FEN));
    let mut client = UiSyncClient::mount(api.clone(), Side::White, FAST).await;

    client.unmount();
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(!client.is_polling());

    let reads = api.board_reads.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(api.board_reads.load(Ordering::SeqCst), reads);
}

#[tokio::test]
async fn test_human_move_against_real_server() {
    let (base_url, session) = spawn_server().await;
    session
        .apply_move(&MoveRequest::squares("e2", "e4"))
        .expect("stale game move");

    let client = UiSyncClient::mount(ChessApiClient::new(base_url), Side::White, FAST).await;
    // Mounting resets the stale game.
    assert!(session.get().is_starting());
    assert!(client.intro_visible());

    let rejected = client
        .on_drop("e2", "e5")
        .await
        .expect("server reachable")
        .expect("human's turn");
    assert!(!rejected.valid);
    assert!(client.board().is_starting());

    let accepted = client
        .on_drop("e2", "e4")
        .await
        .expect("server reachable")
        .expect("human's turn");
    assert!(accepted.valid);
    assert_eq!(accepted.board.as_str(), AFTER_E4);
    assert_eq!(session.get().as_str(), AFTER_E4);
    wait_for_board(&client, AFTER_E4).await;
    assert!(!client.is_human_turn());

    // The agent replies through the session; the poll picks it up.
    session
        .apply_move(&MoveRequest::squares("e7", "e5"))
        .expect("agent move");
    wait_for_board(&client, AFTER_E4_E5).await;
    assert!(client.is_human_turn());
}

#[tokio::test]
async fn test_zero_interval_still_polls() {
    let api = Arc::new(FakeApi::new(STARTING_FEN).then_board(STARTING_FEN).then_board(AFTER_E4));
    let client = UiSyncClient::mount(api, Side::White, Duration::ZERO).await;

    wait_for_board(&client, AFTER_E4).await;
    assert!(client.is_polling());
}
