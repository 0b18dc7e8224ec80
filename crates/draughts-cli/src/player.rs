//! Players selectable from the command line.

use std::{convert::Infallible, path::PathBuf, str::FromStr};

use anyhow::Context;
use draughts_evaluator::{
    board_evaluator::{NetworkEvaluator, StaticEvaluatorKind},
    minimax::MinimaxBot,
    network::Network,
};

use crate::util;

/// A heuristic name (`basic`, `progressive`) or the path of a network JSON file.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PlayerSpec {
    Heuristic(StaticEvaluatorKind),
    Network(PathBuf),
}

impl FromStr for PlayerSpec {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<StaticEvaluatorKind>()
            .map_or_else(|_| Self::Network(PathBuf::from(s)), Self::Heuristic))
    }
}

impl PlayerSpec {
    /// Builds a minimax bot searching to `depth` with the described evaluator.
    pub(crate) fn build(&self, depth: usize) -> anyhow::Result<MinimaxBot> {
        match self {
            Self::Heuristic(kind) => Ok(MinimaxBot::new(
                format!("minimax_{}", kind.to_string().to_lowercase()),
                depth,
                kind.build(),
            )),
            Self::Network(path) => {
                let network: Network = util::read_json_file("network", path)?;
                let evaluator = NetworkEvaluator::new(network).with_context(|| {
                    format!("Network cannot evaluate boards: {}", path.display())
                })?;
                let id = path
                    .file_stem()
                    .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into());
                Ok(MinimaxBot::new(id, depth, Box::new(evaluator)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_player_spec() {
        assert_eq!(
            "basic".parse(),
            Ok(PlayerSpec::Heuristic(StaticEvaluatorKind::Basic))
        );
        assert_eq!(
            "Progressive".parse(),
            Ok(PlayerSpec::Heuristic(StaticEvaluatorKind::Progressive))
        );
        assert_eq!(
            "runs/a/gen3_net0.json".parse(),
            Ok(PlayerSpec::Network(PathBuf::from("runs/a/gen3_net0.json")))
        );
    }

    #[test]
    fn test_heuristic_bot_id() {
        let bot = PlayerSpec::Heuristic(StaticEvaluatorKind::Progressive)
            .build(2)
            .unwrap();
        assert_eq!(draughts_evaluator::minimax::Player::id(&bot), "minimax_progressive");
        assert_eq!(bot.max_depth(), 2);
    }
}
