use crate::board::{line_masks, Board, Player, SIZE};
use crate::config::Weights;
use crate::engine::Outcome;

/// Weighted count of the open lines `player` is building in `sub_board`.
fn line_score(board: &Board, sub_board: usize, player: Player, weights: &Weights) -> f64 {
    let mine = board.squares(player);
    let theirs = board.squares(player.other());
    line_masks(sub_board).iter().map(|mask| {
        let own = (*mask & mine).count_ones();
        let opp = (*mask & theirs).count_ones();
        match (own, opp) {
            (2, 0) => weights.two_in_a_row,
            (1, 0) => weights.single,
            _ => 0.0,
        }
    }).sum()
}

/// Scores one sub-board from `perspective`.
///
/// Decided sub-boards map to the terminal outcomes; an undecided one scores
/// `mine - opponent_penalty * theirs`.
pub fn sub_board_score(board: &Board, sub_board: usize, perspective: Player, weights: &Weights) -> Outcome {
    if board.is_won_by(sub_board, perspective) {
        return Outcome::Win;
    }
    if board.is_won_by(sub_board, perspective.other()) {
        return Outcome::Loss;
    }
    if board.is_draw(sub_board) {
        return Outcome::Draw;
    }
    let mine = line_score(board, sub_board, perspective, weights);
    let theirs = line_score(board, sub_board, perspective.other(), weights);
    Outcome::Value(mine - weights.opponent_penalty * theirs)
}

/// Bonus for forcing the opponent into `target` while `mover` holds more of it.
///
/// Signed from our side: positive when we just moved, negative when they did.
pub fn competitiveness(board: &Board, weights: &Weights, target: usize, mover: Player) -> f64 {
    if !board.is_open(target) {
        return 0.0;
    }
    let mine = board.count(target, mover) as f64;
    let theirs = board.count(target, mover.other()) as f64;
    let bonus = weights.competitiveness * ((mine + 1.0) / (theirs + 1.0) - 1.0);
    match mover {
        Player::Us => bonus,
        Player::Them => -bonus,
    }
}

/// Horizon evaluation of the whole meta-board, always from our side.
///
/// `mover` is whoever played last and `target` the sub-board that move forces next.
pub fn evaluate(board: &Board, weights: &Weights, target: usize, mover: Player) -> Outcome {
    let mut total = 0.0;
    for sub_board in 1..=SIZE {
        match sub_board_score(board, sub_board, Player::Us, weights) {
            Outcome::Value(value) => total += value,
            Outcome::Draw => {}
            decided => return decided,
        }
    }
    Outcome::Value(total + competitiveness(board, weights, target, mover))
}
