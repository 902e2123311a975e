use std::io::{Error, ErrorKind};
use log::{debug, warn};
use crate::board::{is_valid_index, Board, Player};
use crate::config::Config;
use crate::engine::{DepthController, Engine};

/// Owns the game board and answers move requests from the protocol loop.
pub struct Agent {
    board: Board,
    depth: DepthController,
    engine: Engine,
}

impl Agent {
    pub fn new(config: Config) -> Self {
        Self {
            board: Board::new(),
            depth: DepthController::new(config.depth),
            engine: Engine::new(config.weights),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn depth_limit(&self) -> u32 {
        self.depth.limit()
    }

    /// Commits an observed move. Indices are 1-based; anything else is rejected.
    pub fn apply_move(&mut self, sub_board: usize, cell: usize, player: Player) -> Result<(), Error> {
        if !is_valid_index(sub_board) || !is_valid_index(cell) {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("Move ({}, {}) out of range", sub_board, cell),
            ));
        }
        self.board.set(sub_board, cell, player);
        self.depth.record_move();
        Ok(())
    }

    /// Searches the active sub-board, plays the chosen cell for us and returns it.
    ///
    /// `None` means there is nothing to play: no move has been made yet, or the
    /// active sub-board is full.
    pub fn choose_move(&mut self) -> Option<usize> {
        let sub_board = self.board.active()?;
        if self.board.is_game_over() {
            warn!("Move requested on a decided board, sub-board {}", sub_board);
        }
        debug!("Board before search:\n{}", self.board);

        let result = self.engine.best_move(&mut self.board, sub_board, self.depth.limit());
        let cell = match result.best {
            Some(best) => best.cell,
            None => {
                let fallback = self.board.first_empty(sub_board);
                debug_assert!(fallback.is_none(), "search found no move in a sub-board with room");
                warn!("Search returned no move in sub-board {}, falling back to {:?}", sub_board, fallback);
                fallback?
            }
        };

        self.board.set(sub_board, cell, Player::Us);
        self.depth.record_move();
        Some(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Cell, SIZE};
    use crate::config::DepthSchedule;

    fn agent(initial_depth: u32) -> Agent {
        let mut config = Config::default();
        config.depth = DepthSchedule { initial: initial_depth, ..DepthSchedule::default() };
        Agent::new(config)
    }

    fn occupied(board: &Board) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        for sub_board in 1..=SIZE {
            for cell in 1..=SIZE {
                if board.get(sub_board, cell) != Cell::Empty {
                    cells.push((sub_board, cell));
                }
            }
        }
        cells
    }

    #[test]
    fn test_apply_move_rejects_out_of_range() {
        let mut agent = agent(3);
        for (sub_board, cell) in [(0, 1), (1, 0), (10, 5), (5, 10)] {
            let err = agent.apply_move(sub_board, cell, Player::Them).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
        }
        assert!(occupied(agent.board()).is_empty());
        assert_eq!(agent.board().active(), None);
    }

    #[test]
    fn test_apply_move_forces_next_sub_board() {
        let mut agent = agent(3);
        agent.apply_move(3, 7, Player::Us).unwrap();
        assert_eq!(agent.board().active(), Some(7));
        assert_eq!(agent.board().get(3, 7), Cell::Us);
    }

    #[test]
    fn test_choose_move_before_any_move() {
        let mut agent = agent(3);
        assert_eq!(agent.choose_move(), None);
    }

    #[test]
    fn test_choose_move_commits_one_cell() {
        let mut agent = agent(3);
        agent.apply_move(1, 5, Player::Them).unwrap();
        let before = occupied(agent.board());

        let cell = agent.choose_move().unwrap();
        assert_eq!(agent.board().get(5, cell), Cell::Us);
        assert_eq!(agent.board().active(), Some(cell));

        let after = occupied(agent.board());
        assert_eq!(after.len(), before.len() + 1);
        assert!(after.contains(&(5, cell)));
    }

    #[test]
    fn test_opening_reply_takes_centre() {
        let mut agent = agent(3);
        agent.apply_move(4, 5, Player::Them).unwrap();
        assert_eq!(agent.choose_move(), Some(5));
    }

    #[test]
    fn test_choose_move_on_full_sub_board() {
        let mut agent = agent(3);
        for (cell, player) in [
            (1, Player::Us), (2, Player::Them), (3, Player::Us),
            (4, Player::Us), (5, Player::Them), (6, Player::Them),
            (7, Player::Them), (8, Player::Us), (9, Player::Us),
        ] {
            agent.apply_move(6, cell, player).unwrap();
        }
        agent.apply_move(2, 6, Player::Them).unwrap();
        assert_eq!(agent.choose_move(), None);
        assert_eq!(agent.board().get(6, 1), Cell::Us);
    }

    #[test]
    fn test_every_committed_move_is_legal() {
        let mut agent = agent(2);
        agent.apply_move(5, 5, Player::Them).unwrap();
        for _ in 0..6 {
            let sub_board = agent.board().active().unwrap();
            let legal = agent.board().legal_moves(sub_board);
            let cell = agent.choose_move().unwrap();
            assert!(legal.contains(&cell));

            if agent.board().is_game_over() {
                break;
            }
            let reply = agent.board().first_empty(cell).unwrap();
            agent.apply_move(cell, reply, Player::Them).unwrap();
            if agent.board().is_game_over() {
                break;
            }
        }
    }

    #[test]
    fn test_depth_grows_with_committed_moves() {
        let mut config = Config::default();
        config.depth = DepthSchedule { initial: 1, moves_per_step: 2, increment: 1, max: 4 };
        let mut agent = Agent::new(config);
        agent.apply_move(1, 2, Player::Them).unwrap();
        assert_eq!(agent.depth_limit(), 1);
        agent.choose_move().unwrap();
        assert_eq!(agent.depth_limit(), 2);
    }
}
