use std::fmt;

use super::settings::RoundCount;
use super::types::{RoundOutcome, Symbol};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundResult {
    LocalWin,
    RemoteWin,
    Draw,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TournamentResult {
    LocalWin,
    RemoteWin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundRecord {
    pub round_number: u32,
    pub outcome: RoundOutcome,
}

impl fmt::Display for RoundRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            RoundOutcome::WinFor(symbol) => write!(f, "Round {}: {} won!", self.round_number, symbol),
            RoundOutcome::Draw => write!(f, "Round {}: Draw!", self.round_number),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentSummary {
    pub result: TournamentResult,
    pub winner: Symbol,
    pub history: Vec<RoundRecord>,
}

impl TournamentSummary {
    pub fn scoreboard_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.history.iter().map(|record| record.to_string()).collect();
        lines.push(format!("{} won the match!", self.winner));
        lines
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundProgress {
    RoundEnded {
        record: RoundRecord,
        result: RoundResult,
    },
    TournamentEnded(TournamentSummary),
}

#[derive(Debug, Clone)]
pub struct TournamentTracker {
    local_symbol: Symbol,
    rounds: RoundCount,
    current_round: u32,
    wins: u32,
    losses: u32,
    history: Vec<RoundRecord>,
}

impl TournamentTracker {
    pub fn new(local_symbol: Symbol, rounds: RoundCount) -> Self {
        Self {
            local_symbol,
            rounds,
            current_round: 1,
            wins: 0,
            losses: 0,
            history: Vec::new(),
        }
    }

    pub fn rounds(&self) -> RoundCount {
        self.rounds
    }

    pub fn majority(&self) -> u32 {
        self.rounds.majority()
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn wins(&self) -> u32 {
        self.wins
    }

    pub fn losses(&self) -> u32 {
        self.losses
    }

    pub fn history(&self) -> &[RoundRecord] {
        &self.history
    }

    pub fn advance_round(&mut self, outcome: RoundOutcome) -> RoundProgress {
        let record = RoundRecord {
            round_number: self.current_round,
            outcome,
        };
        self.history.push(record.clone());

        let result = match outcome {
            RoundOutcome::Draw => {
                return RoundProgress::RoundEnded {
                    record,
                    result: RoundResult::Draw,
                };
            }
            RoundOutcome::WinFor(symbol) if symbol == self.local_symbol => {
                self.wins += 1;
                RoundResult::LocalWin
            }
            RoundOutcome::WinFor(_) => {
                self.losses += 1;
                RoundResult::RemoteWin
            }
        };

        let majority = self.majority();
        let tournament_result = if self.wins == majority {
            Some(TournamentResult::LocalWin)
        } else if self.losses == majority {
            Some(TournamentResult::RemoteWin)
        } else {
            None
        };

        match tournament_result {
            Some(tournament_result) => {
                let winner = match tournament_result {
                    TournamentResult::LocalWin => self.local_symbol,
                    TournamentResult::RemoteWin => self.local_symbol.opponent(),
                };
                let history = std::mem::take(&mut self.history);
                self.reset();
                RoundProgress::TournamentEnded(TournamentSummary {
                    result: tournament_result,
                    winner,
                    history,
                })
            }
            None => {
                self.current_round += 1;
                RoundProgress::RoundEnded { record, result }
            }
        }
    }

    pub fn reset(&mut self) {
        self.current_round = 1;
        self.wins = 0;
        self.losses = 0;
        self.history.clear();
    }
}
