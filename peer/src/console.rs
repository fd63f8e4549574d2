use common::log;
use common::game::{BOARD_SIZE, RoundResult, TournamentResult};
use common::{
    Board, Cell, ConnectionState, Move, Position, Role, SessionConfig, SessionEvent, SessionSnapshot,
    Turn,
};

pub const HELP: &str = "Commands: '<row> <col>' to move, 'board', 'score', 'help', 'quit'";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Move { row: usize, col: usize },
    Board,
    Score,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<ConsoleCommand, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.as_slice() {
        ["board"] => Ok(ConsoleCommand::Board),
        ["score"] => Ok(ConsoleCommand::Score),
        ["help"] => Ok(ConsoleCommand::Help),
        ["quit"] | ["exit"] => Ok(ConsoleCommand::Quit),
        [row, col] => {
            let row = row.parse().map_err(|_| format!("'{}' is not a row number", row))?;
            let col = col.parse().map_err(|_| format!("'{}' is not a column number", col))?;
            Ok(ConsoleCommand::Move { row, col })
        }
        [] => Err("Empty input".to_string()),
        _ => Err(format!("Unknown command '{}'. {}", line.trim(), HELP)),
    }
}

pub fn render_board(board: &Board) -> String {
    let mut lines = vec![format!("  {}", (0..BOARD_SIZE).map(|c| c.to_string()).collect::<Vec<_>>().join(" "))];
    for (row, cells) in board.rows().iter().enumerate() {
        let marks: Vec<String> = cells
            .iter()
            .map(|cell| match cell {
                Cell::Empty => ".".to_string(),
                Cell::Marked(symbol) => symbol.to_string(),
            })
            .collect();
        lines.push(format!("{} {}", row, marks.join(" ")));
    }
    lines.join("\n")
}

pub fn render_scoreboard(snapshot: &SessionSnapshot) -> String {
    let mut lines = Vec::new();
    match snapshot.config {
        Some(config) => lines.push(format!(
            "Best of {}, you are {}. Round {}, wins {}, losses {}",
            config.rounds, config.local_symbol, snapshot.current_round, snapshot.wins, snapshot.losses
        )),
        None => lines.push("Waiting for the host's first move".to_string()),
    }
    lines.extend(snapshot.history.iter().map(|record| record.to_string()));
    lines.join("\n")
}

/// Keeps a presentation copy of the board fed only by events, so the last
/// mark of a round is still shown before the reset.
pub struct ConsoleView {
    role: Role,
    config: Option<SessionConfig>,
    board: Board,
}

impl ConsoleView {
    pub fn new(role: Role, config: Option<SessionConfig>) -> Self {
        Self {
            role,
            config,
            board: Board::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn describe(&mut self, event: &SessionEvent) -> Vec<String> {
        match event {
            SessionEvent::CellMarked { position, symbol } => {
                if let Err(e) = self.board.apply(Move {
                    position: *position,
                    symbol: *symbol,
                }) {
                    log!("Console board out of sync at {}: {}", position, e);
                }
                vec![format!("{} marked {}", symbol, position), render_board(&self.board)]
            }
            SessionEvent::TurnChanged(Turn::Local) => match self.config {
                Some(config) => vec![format!("Your move ({})", config.local_symbol)],
                None => vec!["Your move".to_string()],
            },
            SessionEvent::TurnChanged(Turn::Remote) => vec!["Waiting for opponent".to_string()],
            SessionEvent::RoundEnded { round_number, result } => {
                self.board.reset();
                let text = match result {
                    RoundResult::LocalWin => "you won",
                    RoundResult::RemoteWin => "opponent won",
                    RoundResult::Draw => "draw, the round is replayed",
                };
                vec![format!("Round {}: {}", round_number, text)]
            }
            SessionEvent::TournamentEnded(summary) => {
                self.board.reset();
                let headline = match summary.result {
                    TournamentResult::LocalWin => "You won the match!",
                    TournamentResult::RemoteWin => "You lost the match.",
                };
                let mut lines = vec![headline.to_string()];
                lines.extend(summary.scoreboard_lines());
                lines.push("A new match starts".to_string());
                lines
            }
            SessionEvent::ConnectionStateChanged(ConnectionState::AwaitingConnection) => {
                vec!["Waiting for a connector".to_string()]
            }
            SessionEvent::ConnectionStateChanged(ConnectionState::Connected) => {
                vec![format!("Connected as {}", self.role)]
            }
            SessionEvent::ConnectionStateChanged(ConnectionState::Disconnected) => {
                self.board.reset();
                vec!["Disconnected".to_string()]
            }
            SessionEvent::ConfigReceived(config) => {
                self.config = Some(*config);
                vec![format!(
                    "Host chose best of {}; you play {}",
                    config.rounds, config.local_symbol
                )]
            }
            SessionEvent::MoveRejected(e) => vec![format!("Move rejected: {}", e)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::game::{RoundRecord, TournamentSummary};
    use common::{RoundCount, RoundOutcome, Symbol};

    fn host_config() -> SessionConfig {
        SessionConfig::new(Symbol::X, RoundCount::new(3).unwrap())
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("1 2"), Ok(ConsoleCommand::Move { row: 1, col: 2 }));
        assert_eq!(parse_command("  0   0 "), Ok(ConsoleCommand::Move { row: 0, col: 0 }));
        assert_eq!(parse_command("score"), Ok(ConsoleCommand::Score));
        assert_eq!(parse_command("board"), Ok(ConsoleCommand::Board));
        assert_eq!(parse_command("quit"), Ok(ConsoleCommand::Quit));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse_command("").is_err());
        assert!(parse_command("a 1").is_err());
        assert!(parse_command("-1 0").is_err());
        assert!(parse_command("1 2 3").is_err());
    }

    #[test]
    fn test_out_of_range_numbers_reach_the_session() {
        assert_eq!(parse_command("5 0"), Ok(ConsoleCommand::Move { row: 5, col: 0 }));
    }

    #[test]
    fn test_render_board() {
        let board = Board::from_pattern(["X..", ".O.", "..X"]).unwrap();
        assert_eq!(render_board(&board), "  0 1 2\n0 X . .\n1 . O .\n2 . . X");
    }

    #[test]
    fn test_view_keeps_winning_mark_until_round_ends() {
        let mut view = ConsoleView::new(Role::Host, Some(host_config()));

        let lines = view.describe(&SessionEvent::CellMarked {
            position: Position::new(1, 1),
            symbol: Symbol::X,
        });
        assert_eq!(lines[0], "X marked (1, 1)");
        assert_eq!(view.board().cell(Position::new(1, 1)), Cell::Marked(Symbol::X));

        let lines = view.describe(&SessionEvent::RoundEnded {
            round_number: 1,
            result: RoundResult::LocalWin,
        });
        assert_eq!(lines, vec!["Round 1: you won".to_string()]);
        assert_eq!(view.board(), &Board::new());
    }

    #[test]
    fn test_conflicting_mark_keeps_first_symbol() {
        let mut view = ConsoleView::new(Role::Host, Some(host_config()));
        view.describe(&SessionEvent::CellMarked {
            position: Position::new(0, 0),
            symbol: Symbol::X,
        });

        let lines = view.describe(&SessionEvent::CellMarked {
            position: Position::new(0, 0),
            symbol: Symbol::O,
        });

        assert_eq!(lines.len(), 2);
        assert_eq!(view.board().cell(Position::new(0, 0)), Cell::Marked(Symbol::X));
    }

    #[test]
    fn test_tournament_end_lists_history() {
        let mut view = ConsoleView::new(Role::Connector, None);
        let summary = TournamentSummary {
            result: TournamentResult::RemoteWin,
            winner: Symbol::X,
            history: vec![
                RoundRecord {
                    round_number: 1,
                    outcome: RoundOutcome::Draw,
                },
                RoundRecord {
                    round_number: 1,
                    outcome: RoundOutcome::WinFor(Symbol::X),
                },
            ],
        };

        let lines = view.describe(&SessionEvent::TournamentEnded(summary));

        assert_eq!(
            lines,
            vec![
                "You lost the match.".to_string(),
                "Round 1: Draw!".to_string(),
                "Round 1: X won!".to_string(),
                "X won the match!".to_string(),
                "A new match starts".to_string(),
            ]
        );
    }

    #[test]
    fn test_connector_learns_symbol_from_config() {
        let mut view = ConsoleView::new(Role::Connector, None);
        let connector_config = SessionConfig::new(Symbol::O, RoundCount::new(3).unwrap());

        view.describe(&SessionEvent::ConfigReceived(connector_config));

        assert_eq!(
            view.describe(&SessionEvent::TurnChanged(Turn::Local)),
            vec!["Your move (O)".to_string()]
        );
    }

    #[test]
    fn test_scoreboard_before_config() {
        let snapshot = SessionSnapshot {
            role: Role::Connector,
            config: None,
            board: Board::new(),
            turn: Turn::Remote,
            current_round: 1,
            wins: 0,
            losses: 0,
            history: Vec::new(),
        };
        assert_eq!(render_scoreboard(&snapshot), "Waiting for the host's first move");
    }
}
