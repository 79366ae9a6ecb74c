//! Line-based terminal front-end for the human player.

use crate::api_client::{ChessApiClient, MoveApi};
use crate::config::ChessConfig;
use crate::ui_sync::UiSyncClient;
use anyhow::Result;
use llm_chess_core::{MoveRequest, Side, render_board};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, instrument};

/// Log file used while the terminal owns stdout.
pub const PLAY_LOG_FILE: &str = "llm_chess_play.log";

/// A line of player input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayCommand {
    /// Leave the game.
    Quit,
    /// Redraw the board.
    Redraw,
    /// Attempt a move.
    Move(MoveRequest),
}

/// Parses a line of input.
///
/// `q` quits, an empty line redraws, `e2 e4` is a coordinate move and any
/// single word (`e2e4`, `e7e8q`, `Nf3`) is passed on as move notation.
pub fn parse_command(line: &str) -> Option<PlayCommand> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        [] => Some(PlayCommand::Redraw),
        [word] if word.eq_ignore_ascii_case("q") || word.eq_ignore_ascii_case("quit") => {
            Some(PlayCommand::Quit)
        }
        [word] => Some(PlayCommand::Move(MoveRequest::notation(*word))),
        [from, to] => Some(PlayCommand::Move(MoveRequest::squares(*from, *to))),
        [from, to, promotion] => Some(PlayCommand::Move(MoveRequest::Squares {
            from: from.to_string(),
            to: to.to_string(),
            promotion: Some(promotion.to_string()),
        })),
        _ => None,
    }
}

/// Opening instructions for a human playing `human_side`.
pub fn intro_text(human_side: Side) -> String {
    match human_side {
        Side::White => format!(
            "Make your first move. Then tell the LLM it's time to play chess and they play as {}.",
            human_side.opponent()
        ),
        Side::Black => format!(
            "Tell the LLM it's time to play chess and they play as {}. They move first.",
            human_side.opponent()
        ),
    }
}

/// Runs the terminal player against the configured move API.
pub async fn run_play(config: ChessConfig) -> Result<()> {
    let log_file = std::fs::File::create(PLAY_LOG_FILE)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .try_init();

    info!(api_base_url = %config.api_base_url(), "Starting terminal player");

    let api = ChessApiClient::new(config.api_base_url().clone());
    let client = UiSyncClient::mount(api, *config.human_side(), config.ui_poll_interval()).await;
    play_loop(client).await
}

#[instrument(skip_all)]
async fn play_loop<A: MoveApi + 'static>(mut client: UiSyncClient<A>) -> Result<()> {
    let mut updates = client.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    draw(&client);
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                draw(&client);
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("Input closed");
                    break;
                };
                match parse_command(&line) {
                    Some(PlayCommand::Quit) => break,
                    Some(PlayCommand::Redraw) => draw(&client),
                    Some(PlayCommand::Move(request)) => match client.submit(request).await {
                        Ok(Some(envelope)) if !envelope.valid => {
                            println!("Illegal move. {}", envelope.prompt);
                        }
                        Ok(Some(_)) => {}
                        Ok(None) => println!("Wait for your turn."),
                        Err(e) => {
                            error!(error = %e, "Move failed");
                            println!("Could not reach the game server: {}", e);
                        }
                    },
                    None => println!("Enter a move like 'e2 e4', 'e2e4' or 'Nf3', or 'q' to quit."),
                }
            }
        }
    }

    client.unmount();
    info!("Terminal player stopped");
    Ok(())
}

fn draw<A: MoveApi + 'static>(client: &UiSyncClient<A>) {
    println!();
    println!("LLM Chess");
    println!("{}", render_board(&client.board()));
    if client.intro_visible() {
        println!("{}", intro_text(client.human_side()));
    } else {
        println!("{}", client.status_line());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_and_blank_lines() {
        assert_eq!(parse_command("q"), Some(PlayCommand::Quit));
        assert_eq!(parse_command(" QUIT "), Some(PlayCommand::Quit));
        assert_eq!(parse_command(""), Some(PlayCommand::Redraw));
    }

    #[test]
    fn test_square_pairs_and_notation() {
        assert_eq!(
            parse_command("e2 e4"),
            Some(PlayCommand::Move(MoveRequest::squares("e2", "e4")))
        );
        assert_eq!(
            parse_command("Nf3"),
            Some(PlayCommand::Move(MoveRequest::notation("Nf3")))
        );
        assert_eq!(
            parse_command("e7 e8 n"),
            Some(PlayCommand::Move(MoveRequest::Squares {
                from: "e7".to_string(),
                to: "e8".to_string(),
                promotion: Some("n".to_string()),
            }))
        );
        assert_eq!(parse_command("e2 to e4 now"), None);
    }

    #[test]
    fn test_intro_names_the_agent_side() {
        assert_eq!(
            intro_text(Side::White),
            "Make your first move. Then tell the LLM it's time to play chess and they play as black."
        );
        let as_black = intro_text(Side::Black);
        assert!(as_black.contains("they play as white"));
        assert!(!as_black.contains("Make your first move"));
    }
}
