use common::log;
use common::session::EventSender;
use common::{ConnectionState, PresentationCommand, SessionEndpoint, SessionEvent};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::LinesStream;

use crate::console::{ConsoleCommand, ConsoleView, HELP, parse_command, render_board, render_scoreboard};

/// Drives the terminal until the session disconnects.
pub async fn run(endpoint: SessionEndpoint<EventSender>, mut events: mpsc::UnboundedReceiver<SessionEvent>) {
    let mut view = ConsoleView::new(endpoint.role(), endpoint.snapshot().await.config);
    let mut lines = LinesStream::new(BufReader::new(tokio::io::stdin()).lines());
    let mut stdin_open = true;

    println!("{}", HELP);

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    break;
                };
                for line in view.describe(&event) {
                    println!("{}", line);
                }
                if event == SessionEvent::ConnectionStateChanged(ConnectionState::Disconnected) {
                    break;
                }
            }
            line = lines.next(), if stdin_open => {
                match line {
                    Some(Ok(line)) => handle_line(&endpoint, &line).await,
                    Some(Err(e)) => {
                        log!("Failed to read stdin: {}", e);
                        stdin_open = false;
                    }
                    None => {
                        stdin_open = false;
                        endpoint.disconnect().await;
                    }
                }
            }
        }
    }
}

async fn handle_line(endpoint: &SessionEndpoint<EventSender>, line: &str) {
    let command = match parse_command(line) {
        Ok(command) => command,
        Err(message) => {
            println!("{}", message);
            return;
        }
    };

    let presentation_command = match command {
        ConsoleCommand::Move { row, col } => PresentationCommand::RequestMove { row, col },
        ConsoleCommand::Quit => PresentationCommand::Disconnect,
        ConsoleCommand::Board => {
            println!("{}", render_board(&endpoint.snapshot().await.board));
            return;
        }
        ConsoleCommand::Score => {
            println!("{}", render_scoreboard(&endpoint.snapshot().await));
            return;
        }
        ConsoleCommand::Help => {
            println!("{}", HELP);
            return;
        }
    };

    // Rejections arrive as MoveRejected events and are printed from there.
    if let Err(e) = endpoint.handle_command(presentation_command).await
        && !e.is_rejection()
    {
        log!("Command failed: {}", e);
        println!("{}", e);
    }
}
