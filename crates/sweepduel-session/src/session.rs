//! The game session: one board shared by the players of a room.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use sweepduel_board::{Board, BoardConfig, Cell, reveal_from};
use sweepduel_protocol::{Outcome, PlayerId, RevealedCell};

use crate::{SessionError, SessionState};

/// A terminal result decided for one player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerResult {
    pub player: PlayerId,
    pub outcome: Outcome,
    /// Elapsed game time in seconds. Only set when the game ended because
    /// someone revealed every safe cell.
    pub time: Option<f64>,
}

/// What a resolved click did.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// The click landed on a safe cell.
    Revealed {
        /// Cells the clicker had not seen before. Empty for a re-click.
        cells: Vec<RevealedCell>,
        /// The clicker's revealed-cell count after this click.
        found_count: usize,
        /// Non-empty only if this click revealed the last safe cell.
        results: Vec<PlayerResult>,
    },

    /// The click landed on a mine. The clicker's loss is always in
    /// `results`; a winner is too if only one player was left standing.
    Detonated { results: Vec<PlayerResult> },
}

impl ClickOutcome {
    /// Results decided by this click, if any.
    pub fn results(&self) -> &[PlayerResult] {
        match self {
            Self::Revealed { results, .. } | Self::Detonated { results } => {
                results
            }
        }
    }
}

/// State of one game in progress.
///
/// Invariants:
/// - every coordinate in a player's revealed set is a safe cell that one
///   of that player's own clicks disclosed;
/// - a player receives at most one [`PlayerResult`];
/// - once [`SessionState::Finished`], nothing changes any more.
#[derive(Debug)]
pub struct GameSession {
    board: Board,
    state: SessionState,
    /// Players still clicking, in join order.
    active: Vec<PlayerId>,
    revealed: HashMap<PlayerId, HashSet<(usize, usize)>>,
    results: HashMap<PlayerId, Outcome>,
    started_at: Instant,
}

impl GameSession {
    /// Activates a session: generates the board and starts the clock.
    ///
    /// This is the `WaitingForPlayers → InProgress` transition; a room
    /// calls it once, when its roster reaches the activation threshold.
    ///
    /// # Panics
    /// If `config` does not pass [`BoardConfig::validate`].
    pub fn start(config: &BoardConfig, players: &[PlayerId]) -> Self {
        Self::with_board(config.generate(), players)
    }

    /// Activates a session on an existing board.
    pub fn with_board(board: Board, players: &[PlayerId]) -> Self {
        tracing::info!(
            width = board.width(),
            height = board.height(),
            mines = board.mines(),
            seed = ?board.seed(),
            players = players.len(),
            "session started"
        );
        debug_assert!(
            SessionState::WaitingForPlayers
                .can_transition_to(SessionState::InProgress)
        );

        Self {
            board,
            state: SessionState::InProgress,
            active: players.to_vec(),
            revealed: players.iter().map(|p| (*p, HashSet::new())).collect(),
            results: HashMap::new(),
            started_at: Instant::now(),
        }
    }

    /// Resolves a click by `player` at `(row, col)`.
    ///
    /// # Errors
    /// - [`SessionError::NotInProgress`] once the game has finished.
    /// - [`SessionError::UnknownPlayer`] if `player` is not in play.
    /// - [`SessionError::InvalidCoordinate`] if the cell is off the board.
    ///
    /// The session is unchanged in every error case.
    pub fn resolve_click(
        &mut self,
        player: PlayerId,
        row: i64,
        col: i64,
    ) -> Result<ClickOutcome, SessionError> {
        if !self.state.is_active() {
            return Err(SessionError::NotInProgress(self.state));
        }
        if !self.active.contains(&player) {
            return Err(SessionError::UnknownPlayer(player));
        }
        let (r, c) = self
            .locate(row, col)
            .ok_or(SessionError::InvalidCoordinate { row, col })?;

        match self.board.cell(r, c) {
            Some(Cell::Mine) => {
                tracing::info!(%player, row = r, col = c, "mine hit");
                Ok(ClickOutcome::Detonated {
                    results: self.detonate(player),
                })
            }
            _ => Ok(self.reveal(player, r, c)),
        }
    }

    /// Takes a player out of play without deciding any result.
    ///
    /// Used when a connection goes away; the game carries on for the
    /// others. Returns `false` if the player was not in play.
    pub fn remove_player(&mut self, player: PlayerId) -> bool {
        let before = self.active.len();
        self.active.retain(|p| *p != player);
        let removed = self.active.len() != before;
        if removed {
            tracing::debug!(%player, active = self.active.len(), "player removed from session");
        }
        removed
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Number of safe cells; revealing this many wins.
    pub fn safe_cells(&self) -> usize {
        self.board.safe_cells()
    }

    /// How many cells `player` has revealed.
    pub fn found_count(&self, player: PlayerId) -> usize {
        self.revealed.get(&player).map_or(0, HashSet::len)
    }

    /// The result decided for `player`, if any.
    pub fn result(&self, player: PlayerId) -> Option<Outcome> {
        self.results.get(&player).copied()
    }

    /// Players still clicking, in join order.
    pub fn active_players(&self) -> &[PlayerId] {
        &self.active
    }

    /// Time since the session started.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    fn locate(&self, row: i64, col: i64) -> Option<(usize, usize)> {
        let r = usize::try_from(row).ok()?;
        let c = usize::try_from(col).ok()?;
        self.board.contains(r, c).then_some((r, c))
    }

    fn reveal(&mut self, player: PlayerId, row: usize, col: usize) -> ClickOutcome {
        let seen = self.revealed.entry(player).or_default();

        // Re-clicking a known cell is a no-op rather than a second flood
        // fill over the same region.
        let cells: Vec<RevealedCell> = if seen.contains(&(row, col)) {
            Vec::new()
        } else {
            reveal_from(&self.board, row, col)
                .into_iter()
                .filter(|r| seen.insert((r.row, r.col)))
                .map(|r| RevealedCell {
                    row: r.row,
                    col: r.col,
                    value: r.value,
                })
                .collect()
        };
        let found_count = seen.len();

        tracing::debug!(
            %player,
            row,
            col,
            new = cells.len(),
            found_count,
            "cells revealed"
        );

        let results = if found_count == self.board.safe_cells() {
            self.complete(player)
        } else {
            Vec::new()
        };

        ClickOutcome::Revealed {
            cells,
            found_count,
            results,
        }
    }

    /// The clicker hit a mine: they are out, and the last one standing (if
    /// exactly one) wins.
    fn detonate(&mut self, player: PlayerId) -> Vec<PlayerResult> {
        self.active.retain(|p| *p != player);
        let mut results = vec![self.decide(player, Outcome::Lose, None)];

        match self.active.len() {
            0 => self.finish(),
            1 => {
                let survivor = self.active[0];
                results.push(self.decide(survivor, Outcome::Win, None));
                self.active.clear();
                self.finish();
            }
            _ => {}
        }
        results
    }

    /// `winner` revealed every safe cell: everyone else still in play loses.
    fn complete(&mut self, winner: PlayerId) -> Vec<PlayerResult> {
        let time = Some(self.elapsed().as_secs_f64());
        let others: Vec<PlayerId> = self
            .active
            .iter()
            .copied()
            .filter(|p| *p != winner)
            .collect();

        let mut results = vec![self.decide(winner, Outcome::Win, time)];
        for loser in others {
            results.push(self.decide(loser, Outcome::Lose, time));
        }
        self.active.clear();
        self.finish();
        results
    }

    fn decide(
        &mut self,
        player: PlayerId,
        outcome: Outcome,
        time: Option<f64>,
    ) -> PlayerResult {
        self.results.insert(player, outcome);
        PlayerResult {
            player,
            outcome,
            time,
        }
    }

    fn finish(&mut self) {
        debug_assert!(self.state.can_transition_to(SessionState::Finished));
        self.state = SessionState::Finished;
        tracing::info!(
            elapsed_ms = self.elapsed().as_millis() as u64,
            decided = self.results.len(),
            "session finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: PlayerId = PlayerId(1);
    const B: PlayerId = PlayerId(2);
    const C: PlayerId = PlayerId(3);

    /// 4x3, one mine in the top-left corner:
    ///
    /// ```text
    /// * 1 0 0
    /// 1 1 0 0
    /// 0 0 0 0
    /// ```
    fn corner_mine_session(players: &[PlayerId]) -> GameSession {
        GameSession::with_board(Board::with_mines(4, 3, [(0, 0)]), players)
    }

    fn revealed(outcome: &ClickOutcome) -> (&[RevealedCell], usize) {
        match outcome {
            ClickOutcome::Revealed {
                cells, found_count, ..
            } => (cells.as_slice(), *found_count),
            other => panic!("expected Revealed, got {other:?}"),
        }
    }

    #[test]
    fn test_start_is_in_progress() {
        let session = GameSession::start(&BoardConfig::default(), &[A, B]);
        assert_eq!(session.state(), SessionState::InProgress);
        assert_eq!(session.active_players(), &[A, B]);
        assert_eq!(session.safe_cells(), 90);
        assert!(session.board().seed().is_some());
    }

    #[test]
    fn test_invalid_coordinates_leave_state_untouched() {
        let mut session = corner_mine_session(&[A, B]);
        for (row, col) in [(-1, 0), (0, -1), (3, 0), (0, 4), (i64::MAX, 0)] {
            assert_eq!(
                session.resolve_click(A, row, col),
                Err(SessionError::InvalidCoordinate { row, col })
            );
        }
        assert_eq!(session.found_count(A), 0);
        assert_eq!(session.state(), SessionState::InProgress);
    }

    #[test]
    fn test_numbered_click_reveals_one_cell() {
        let mut session = corner_mine_session(&[A, B]);
        let outcome = session.resolve_click(A, 1, 1).unwrap();
        let (cells, found) = revealed(&outcome);
        assert_eq!(cells, &[RevealedCell { row: 1, col: 1, value: 1 }]);
        assert_eq!(found, 1);
        assert!(outcome.results().is_empty());
    }

    #[test]
    fn test_reclick_is_noop() {
        let mut session = corner_mine_session(&[A, B]);
        session.resolve_click(A, 1, 1).unwrap();

        let outcome = session.resolve_click(A, 1, 1).unwrap();
        let (cells, found) = revealed(&outcome);
        assert!(cells.is_empty());
        assert_eq!(found, 1);
    }

    #[test]
    fn test_overlapping_reveal_never_double_counts() {
        let mut session = corner_mine_session(&[A, B]);
        session.resolve_click(A, 0, 1).unwrap();
        session.resolve_click(A, 1, 0).unwrap();
        assert_eq!(session.found_count(A), 2);

        // The flood fill re-discovers (0,1) and (1,0); only new ones count.
        let outcome = session.resolve_click(A, 2, 3).unwrap();
        let (cells, found) = revealed(&outcome);
        assert_eq!(cells.len(), 9);
        assert_eq!(found, 11);
    }

    #[test]
    fn test_revealed_sets_are_per_player() {
        let mut session = corner_mine_session(&[A, B]);
        session.resolve_click(A, 1, 1).unwrap();
        assert_eq!(session.found_count(A), 1);
        assert_eq!(session.found_count(B), 0);

        let outcome = session.resolve_click(B, 1, 1).unwrap();
        assert_eq!(revealed(&outcome).0.len(), 1);
    }

    #[test]
    fn test_mine_click_two_players_opposite_results() {
        let mut session = corner_mine_session(&[A, B]);
        let outcome = session.resolve_click(B, 0, 0).unwrap();

        assert_eq!(
            outcome,
            ClickOutcome::Detonated {
                results: vec![
                    PlayerResult { player: B, outcome: Outcome::Lose, time: None },
                    PlayerResult { player: A, outcome: Outcome::Win, time: None },
                ]
            }
        );
        assert_eq!(session.state(), SessionState::Finished);
        assert_eq!(session.result(A), Some(Outcome::Win));
        assert_eq!(session.result(B), Some(Outcome::Lose));
    }

    #[test]
    fn test_clearing_board_wins_with_time() {
        let mut session = corner_mine_session(&[A, B]);
        session.resolve_click(B, 1, 1).unwrap();

        session.resolve_click(A, 2, 3).unwrap();
        // 11 safe cells, the fill from (2,3) reaches all of them.
        assert_eq!(session.state(), SessionState::Finished);
        assert_eq!(session.result(A), Some(Outcome::Win));
        assert_eq!(session.result(B), Some(Outcome::Lose));
    }

    #[test]
    fn test_completion_results_carry_elapsed_time() {
        let mut session = corner_mine_session(&[A, B]);
        let outcome = session.resolve_click(A, 2, 3).unwrap();
        let results = outcome.results();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].player, A);
        assert_eq!(results[0].outcome, Outcome::Win);
        assert!(results[0].time.is_some_and(|t| t >= 0.0));
        assert_eq!(results[1].player, B);
        assert_eq!(results[1].outcome, Outcome::Lose);
    }

    #[test]
    fn test_win_exactly_when_all_safe_cells_found() {
        let board = Board::generate(10, 10, 10, Some(42));
        let safe: Vec<(usize, usize)> = board
            .cells()
            .filter(|(_, _, c)| !c.is_mine())
            .map(|(r, c, _)| (r, c))
            .collect();
        let mut session = GameSession::with_board(board, &[A, B]);

        for (row, col) in safe {
            let outcome = session
                .resolve_click(A, row as i64, col as i64)
                .expect("game continues until the last safe cell");
            let (_, found) = revealed(&outcome);
            if found < 90 {
                assert!(outcome.results().is_empty());
                assert_eq!(session.state(), SessionState::InProgress);
            } else {
                assert_eq!(found, 90);
                assert_eq!(outcome.results()[0].outcome, Outcome::Win);
                break;
            }
        }
        assert_eq!(session.found_count(A), 90);
        assert_eq!(session.result(A), Some(Outcome::Win));
        assert_eq!(session.result(B), Some(Outcome::Lose));
    }

    #[test]
    fn test_clicks_refused_after_finish() {
        let mut session = corner_mine_session(&[A, B]);
        session.resolve_click(A, 0, 0).unwrap();
        assert_eq!(
            session.resolve_click(B, 1, 1),
            Err(SessionError::NotInProgress(SessionState::Finished))
        );
    }

    #[test]
    fn test_unknown_player_refused() {
        let mut session = corner_mine_session(&[A, B]);
        assert_eq!(
            session.resolve_click(C, 1, 1),
            Err(SessionError::UnknownPlayer(C))
        );
    }

    #[test]
    fn test_last_standing_with_three_players() {
        let mut session = corner_mine_session(&[A, B, C]);

        let first = session.resolve_click(A, 0, 0).unwrap();
        assert_eq!(first.results().len(), 1);
        assert_eq!(first.results()[0].outcome, Outcome::Lose);
        assert_eq!(session.state(), SessionState::InProgress);
        assert_eq!(session.active_players(), &[B, C]);

        // An eliminated player can't keep clicking.
        assert_eq!(
            session.resolve_click(A, 1, 1),
            Err(SessionError::UnknownPlayer(A))
        );

        let second = session.resolve_click(C, 0, 0).unwrap();
        assert_eq!(
            second.results(),
            &[
                PlayerResult { player: C, outcome: Outcome::Lose, time: None },
                PlayerResult { player: B, outcome: Outcome::Win, time: None },
            ]
        );
        assert_eq!(session.state(), SessionState::Finished);
    }

    #[test]
    fn test_remove_player_keeps_game_running() {
        let mut session = corner_mine_session(&[A, B]);
        assert!(session.remove_player(B));
        assert!(!session.remove_player(B));
        assert_eq!(session.state(), SessionState::InProgress);
        assert_eq!(session.result(B), None);

        // The remaining player can still win by clearing the board, and the
        // departed one gets no result.
        let outcome = session.resolve_click(A, 2, 3).unwrap();
        assert_eq!(outcome.results().len(), 1);
        assert_eq!(session.result(B), None);
    }

    #[test]
    fn test_lone_player_hitting_mine_ends_without_winner() {
        let mut session = corner_mine_session(&[A, B]);
        session.remove_player(B);
        let outcome = session.resolve_click(A, 0, 0).unwrap();
        assert_eq!(outcome.results().len(), 1);
        assert_eq!(session.state(), SessionState::Finished);
    }
}
