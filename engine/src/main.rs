mod agent;
mod board;
mod config;
mod engine;
mod eval;
mod protocol;

use std::io::{Error, ErrorKind};
use std::path::PathBuf;
use clap::Parser;
use log::{info, error};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use crate::agent::Agent;
use crate::config::Config;
use crate::protocol::{handle_command, Command, Response};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, default_value = "localhost")]
    host: String,
    #[arg(short, long)]
    port: u16,
    /// JSON file with heuristic weights and depth schedule
    #[arg(long)]
    config: Option<PathBuf>,
    /// Starting search depth, overrides the config file
    #[arg(long)]
    depth: Option<u32>,
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();
    let level = match args.verbose {
        0 => log::Level::Info,
        1 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    simple_logger::init_with_level(level).map_err(|e| Error::new(ErrorKind::Other, e.to_string()))?;

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(depth) = args.depth {
        config.depth.initial = depth;
        config.depth.max = config.depth.max.max(depth);
    }
    config.validate()?;
    info!("Weights: {:?}, depth: {:?}", config.weights, config.depth);

    let address = format!("{}:{}", args.host, args.port);
    let stream = TcpStream::connect(&address).await?;
    info!("Connected to: {}", address);

    play_game(stream, Agent::new(config)).await
}

async fn play_game(stream: TcpStream, mut agent: Agent) -> Result<(), Error> {
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        info!("Received: {}", line);

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                error!("Error parsing command: {:?}", e);
                continue;
            }
        };
        match handle_command(&mut agent, command) {
            Ok(Response::Play(cell)) => {
                write.write_all(format!("{}\n", cell).as_bytes()).await?;
                info!("Sent: {} (depth limit {})", cell, agent.depth_limit());
            }
            Ok(Response::Wait) => {}
            Ok(Response::GameOver(result)) => {
                info!("Game over: {:?}\n{}", result, agent.board());
                break;
            }
            Err(e) => { error!("Error handling command: {:?}", e); }
        }
    }

    Ok(())
}
