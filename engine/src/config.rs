use std::fs::File;
use std::io::{BufReader, Error, ErrorKind};
use std::path::Path;
use serde::Deserialize;

/// Heuristic weighting constants used at the search horizon.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Weights {
    /// Score per line holding two of a player's marks and one empty cell.
    pub two_in_a_row: f64,
    /// Score per line holding one of a player's marks and two empty cells.
    pub single: f64,
    /// Multiplier applied to the opponent's line score (lambda, at least 1).
    pub opponent_penalty: f64,
    /// Scale of the mark-ratio bonus for the sub-board handed to the opponent.
    pub competitiveness: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            two_in_a_row: 10.0,
            single: 1.0,
            opponent_penalty: 1.5,
            competitiveness: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DepthSchedule {
    pub initial: u32,
    /// Applied moves (both sides) between two depth increases.
    pub moves_per_step: u32,
    pub increment: u32,
    pub max: u32,
}

impl Default for DepthSchedule {
    fn default() -> Self {
        Self {
            initial: 5,
            moves_per_step: 22,
            increment: 2,
            max: 81,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub weights: Weights,
    pub depth: DepthSchedule,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let file = File::open(path)?;
        let config: Config = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        let weights = &self.weights;
        let finite = [weights.two_in_a_row, weights.single, weights.opponent_penalty, weights.competitiveness]
            .iter()
            .all(|w| w.is_finite() && *w >= 0.0);
        if !finite {
            return Err(invalid("Weights must be finite and non-negative"));
        }
        if weights.opponent_penalty < 1.0 {
            return Err(invalid("opponent_penalty must be at least 1"));
        }
        let depth = &self.depth;
        if depth.initial == 0 {
            return Err(invalid("depth.initial must be positive"));
        }
        if depth.moves_per_step == 0 {
            return Err(invalid("depth.moves_per_step must be positive"));
        }
        if depth.max < depth.initial {
            return Err(invalid("depth.max must not be below depth.initial"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> Error {
    Error::new(ErrorKind::InvalidInput, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.depth.initial, 5);
        assert_eq!(config.depth.moves_per_step, 22);
        assert!(config.weights.two_in_a_row > config.weights.single);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: Config = serde_json::from_str(
            r#"{ "weights": { "opponent_penalty": 2.0 }, "depth": { "initial": 3 } }"#
        ).unwrap();
        assert_eq!(config.weights.opponent_penalty, 2.0);
        assert_eq!(config.weights.two_in_a_row, Weights::default().two_in_a_row);
        assert_eq!(config.depth.initial, 3);
        assert_eq!(config.depth.increment, 2);
    }

    #[test]
    fn test_rejects_small_penalty() {
        let mut config = Config::default();
        config.weights.opponent_penalty = 0.5;
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_rejects_bad_depth() {
        let mut config = Config::default();
        config.depth.moves_per_step = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.depth.initial = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.depth.max = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("uttt-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "weights": { "single": 2.5 } }"#).unwrap();
        let config = Config::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.weights.single, 2.5);
        assert_eq!(config.depth, DepthSchedule::default());
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("uttt-config-does-not-exist.json");
        assert!(Config::load(&path).is_err());
    }
}
