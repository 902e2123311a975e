use std::cmp::Ordering;
use std::time::Instant;
use log::{debug, info, trace};
use crate::board::{Board, Move, Player};
use crate::config::{DepthSchedule, Weights};
use crate::eval;

/// Value of a search node, always from our side.
///
/// `Loss` and `Win` are kept apart from heuristic scores and only collapse to
/// infinite bounds when two outcomes are compared.
#[derive(Debug, Clone, Copy)]
pub enum Outcome {
    Loss,
    Value(f64),
    Draw,
    Win,
}

impl Outcome {
    pub fn bound(self) -> f64 {
        match self {
            Outcome::Loss => f64::NEG_INFINITY,
            Outcome::Value(value) => value,
            Outcome::Draw => 0.0,
            Outcome::Win => f64::INFINITY,
        }
    }
}

impl PartialEq for Outcome {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Outcome {}

impl PartialOrd for Outcome {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Outcome {
    fn cmp(&self, other: &Self) -> Ordering {
        // weights are validated finite, so NaN never reaches here
        self.bound().partial_cmp(&other.bound()).unwrap_or(Ordering::Equal)
    }
}

/// Search horizon that deepens as the game fills up.
pub struct DepthController {
    schedule: DepthSchedule,
    limit: u32,
    moves: u32,
}

impl DepthController {
    pub fn new(schedule: DepthSchedule) -> Self {
        Self {
            limit: schedule.initial,
            moves: 0,
            schedule,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Counts one real move; every `moves_per_step` moves the limit grows by `increment`.
    pub fn record_move(&mut self) {
        self.moves += 1;
        if self.moves >= self.schedule.moves_per_step {
            self.moves = 0;
            self.limit = self.limit.saturating_add(self.schedule.increment).min(self.schedule.max);
            debug!("Depth limit raised to {}", self.limit);
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Best root move, `None` only when the sub-board had no empty cell.
    pub best: Option<Move>,
    pub outcome: Outcome,
    pub nodes: u64,
    pub depth_limit: u32,
}

/// Alpha-beta search over a single shared board, mutated and restored in place.
pub struct Engine {
    weights: Weights,
    nodes: u64,
    depth_limit: u32,
}

impl Engine {
    pub fn new(weights: Weights) -> Self {
        Self {
            weights,
            nodes: 0,
            depth_limit: 0,
        }
    }

    /// Finds our best move in `sub_board`, looking `depth_limit` plies ahead.
    ///
    /// The board is left exactly as it was passed in, `active` included.
    pub fn best_move(&mut self, board: &mut Board, sub_board: usize, depth_limit: u32) -> SearchResult {
        self.nodes = 0;
        self.depth_limit = depth_limit;
        let started = Instant::now();
        let active = board.active();

        let mut alpha = Outcome::Loss;
        let beta = Outcome::Win;
        let mut best: Option<(usize, Outcome)> = None;

        for cell in board.legal_moves(sub_board) {
            board.set(sub_board, cell, Player::Us);
            let value = self.min_value(board, sub_board, cell, alpha, beta, 1);
            board.clear(sub_board, cell);
            debug!("Root move {} scored {:?}", Move { sub_board, cell }, value);

            if best.map_or(true, |(_, best_value)| value > best_value) {
                best = Some((cell, value));
            }
            alpha = alpha.max(value);
            if beta <= alpha {
                break;
            }
        }
        board.set_active(active);

        let result = SearchResult {
            best: best.map(|(cell, _)| Move { sub_board, cell }),
            outcome: best.map_or(Outcome::Draw, |(_, value)| value),
            nodes: self.nodes,
            depth_limit,
        };
        info!(
            "Searched {} nodes at depth {} in {:?}: {:?} -> {:?}",
            result.nodes, result.depth_limit, started.elapsed(), result.best, result.outcome
        );
        result
    }

    /// Their turn in sub-board `target`, right after we played `cell` of `played`.
    fn min_value(
        &mut self,
        board: &mut Board,
        played: usize,
        target: usize,
        alpha: Outcome,
        mut beta: Outcome,
        depth: u32,
    ) -> Outcome {
        self.nodes += 1;

        if board.is_won_by(played, Player::Us) {
            return Outcome::Win;
        }
        if depth >= self.depth_limit {
            return eval::evaluate(board, &self.weights, target, Player::Us);
        }

        let moves = board.legal_moves(target);
        if moves.is_empty() {
            return Outcome::Draw;
        }

        let mut value = Outcome::Win;
        for cell in moves {
            board.set(target, cell, Player::Them);
            let child = self.max_value(board, target, cell, alpha, beta, depth + 1);
            board.clear(target, cell);

            value = value.min(child);
            beta = beta.min(value);
            if beta <= alpha {
                trace!("Cut at depth {} after ({}, {})", depth, target, cell);
                break;
            }
        }
        value
    }

    /// Our turn in sub-board `target`, right after they played in `played`.
    fn max_value(
        &mut self,
        board: &mut Board,
        played: usize,
        target: usize,
        mut alpha: Outcome,
        beta: Outcome,
        depth: u32,
    ) -> Outcome {
        self.nodes += 1;

        if board.is_won_by(played, Player::Them) {
            return Outcome::Loss;
        }
        if depth >= self.depth_limit {
            return eval::evaluate(board, &self.weights, target, Player::Them);
        }

        let moves = board.legal_moves(target);
        if moves.is_empty() {
            return Outcome::Draw;
        }

        let mut value = Outcome::Loss;
        for cell in moves {
            board.set(target, cell, Player::Us);
            let child = self.min_value(board, target, cell, alpha, beta, depth + 1);
            board.clear(target, cell);

            value = value.max(child);
            alpha = alpha.max(value);
            if beta <= alpha {
                trace!("Cut at depth {} after ({}, {})", depth, target, cell);
                break;
            }
        }
        value
    }
}
