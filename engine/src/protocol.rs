use std::io::{Error, ErrorKind};
use std::str::FromStr;
use log::info;
use crate::agent::Agent;
use crate::board::{is_valid_index, Player};

/// One line sent by the game server.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Command {
    Init,
    /// Which mark we play, `x` or `o`.
    Start(char),
    /// Their opening move `(sub_board, cell)`.
    SecondMove(usize, usize),
    /// Our opening move `(sub_board, cell)` and their answer in sub-board `cell`.
    ThirdMove(usize, usize, usize),
    /// Their move in the active sub-board.
    NextMove(usize),
    Win,
    Loss,
    Draw,
    End,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum GameResult {
    Won,
    Lost,
    Drawn,
    Ended,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Response {
    /// Cell to send back, in the sub-board forced by the last move.
    Play(usize),
    Wait,
    GameOver(GameResult),
}

fn malformed(line: &str) -> Error {
    Error::new(ErrorKind::InvalidData, format!("Malformed command: {}", line))
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, args) = match line.split_once('(') {
            Some((name, rest)) => {
                let (inner, _) = rest.split_once(')').ok_or_else(|| malformed(line))?;
                (name.trim(), inner.split(',').map(str::trim).collect::<Vec<_>>())
            }
            None => (line, Vec::new()),
        };
        let numbers = || -> Result<Vec<usize>, Error> {
            args.iter().map(|arg| arg.parse::<usize>().map_err(|_| malformed(line))).collect()
        };

        match (name, args.len()) {
            ("init", 0) => Ok(Command::Init),
            ("start", 1) => match args[0] {
                "x" | "o" => Ok(Command::Start(args[0].chars().next().unwrap_or('x'))),
                _ => Err(malformed(line)),
            },
            ("second_move", 2) => {
                let n = numbers()?;
                Ok(Command::SecondMove(n[0], n[1]))
            }
            ("third_move", 3) => {
                let n = numbers()?;
                Ok(Command::ThirdMove(n[0], n[1], n[2]))
            }
            ("next_move", 1) => {
                let n = numbers()?;
                Ok(Command::NextMove(n[0]))
            }
            ("win", 0) => Ok(Command::Win),
            ("loss", 0) => Ok(Command::Loss),
            ("draw", 0) => Ok(Command::Draw),
            ("end", 0) => Ok(Command::End),
            _ => Err(malformed(line)),
        }
    }
}

/// Applies a server command to the agent and decides what to send back.
pub fn handle_command(agent: &mut Agent, command: Command) -> Result<Response, Error> {
    match command {
        Command::Init => Ok(Response::Wait),
        Command::Start(mark) => {
            info!("Playing as {}", mark);
            Ok(Response::Wait)
        }
        Command::SecondMove(sub_board, cell) => {
            agent.apply_move(sub_board, cell, Player::Them)?;
            play(agent)
        }
        Command::ThirdMove(sub_board, cell, reply) => {
            if ![sub_board, cell, reply].iter().all(|&index| is_valid_index(index)) {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    format!("third_move({}, {}, {}) out of range", sub_board, cell, reply),
                ));
            }
            agent.apply_move(sub_board, cell, Player::Us)?;
            agent.apply_move(cell, reply, Player::Them)?;
            play(agent)
        }
        Command::NextMove(cell) => {
            let sub_board = agent.board().active().ok_or_else(|| {
                Error::new(ErrorKind::InvalidInput, "next_move received before any move was played")
            })?;
            agent.apply_move(sub_board, cell, Player::Them)?;
            play(agent)
        }
        Command::Win => Ok(Response::GameOver(GameResult::Won)),
        Command::Loss => Ok(Response::GameOver(GameResult::Lost)),
        Command::Draw => Ok(Response::GameOver(GameResult::Drawn)),
        Command::End => Ok(Response::GameOver(GameResult::Ended)),
    }
}

fn play(agent: &mut Agent) -> Result<Response, Error> {
    agent.choose_move().map(Response::Play).ok_or_else(|| {
        Error::new(ErrorKind::Other, "No move available in the active sub-board")
    })
}
