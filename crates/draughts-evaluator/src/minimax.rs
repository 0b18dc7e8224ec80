//! Depth-limited alpha-beta minimax search.
//!
//! A [`MinimaxBot`] picks a move by searching the game tree to a fixed depth and scoring
//! the leaves with a [`BoardEvaluator`]. White maximises the score and Black minimises
//! it.
//!
//! # Search Rules
//!
//! - **Leaves**: at `max_depth` the static evaluation is returned without a move
//! - **No legal moves**: the side to move loses, scored `f64::MIN` for White to move
//!   and `f64::MAX` for Black to move
//! - **Forced reply**: at the root, a single legal move is returned immediately and the
//!   evaluator is never called
//! - **Cycles**: children equal to a position on the current path are skipped entirely
//! - **Transpositions**: every expanded position is cached for the rest of the call, and
//!   the cache is consulted before expanding a node
//! - **Pruning**: each child receives its parent's running best as a bound. As soon as
//!   a node's own running best passes that bound (strictly), the remaining siblings are
//!   skipped
//! - **Tie-break**: the move is chosen uniformly at random among the children scoring
//!   within [`TIE_EPSILON`] of the optimum
//!
//! All per-call state lives in a call-scoped `SearchContext`, so one bot can serve any
//! number of concurrent searches.
//!
//! # Progress
//!
//! The search can report its completion (0 to 100) to a progress sink. Every node owns
//! a share of the total, split evenly among its children; skipped and pruned children
//! are credited as if searched. Reports are emitted for nodes up to
//! [`MinimaxBot::REPORT_DEPTH`] plies deep.

use std::{collections::HashMap, fmt};

use draughts_engine::{BoardState, Move, Rules};
use rand::{RngCore, seq::IndexedRandom as _};

use crate::{board_evaluator::BoardEvaluator, cancel::CancellationToken};

/// Scores closer than this to the optimum are considered equal.
pub const TIE_EPSILON: f64 = 0.001;

const FULL_PROGRESS: f64 = 100.0;

/// Anything that can choose a move in a game.
pub trait Player: fmt::Debug + Send + Sync {
    /// Identifier used in logs and reports.
    fn id(&self) -> &str;

    /// Chooses a move for the side to move, or `None` if it has no legal move.
    ///
    /// Returns `None` as well once `cancel` has been triggered.
    fn select_move(
        &self,
        rules: &dyn Rules,
        state: &BoardState,
        rng: &mut dyn RngCore,
        cancel: &CancellationToken,
    ) -> Option<Move>;
}

/// Minimax player backed by a static evaluator.
#[derive(Debug)]
pub struct MinimaxBot {
    id: String,
    max_depth: usize,
    evaluator: Box<dyn BoardEvaluator>,
}

impl MinimaxBot {
    /// Deepest ply for which progress is reported.
    pub const REPORT_DEPTH: usize = 3;

    #[must_use]
    pub fn new(id: impl Into<String>, max_depth: usize, evaluator: Box<dyn BoardEvaluator>) -> Self {
        Self {
            id: id.into(),
            max_depth,
            evaluator,
        }
    }

    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    #[must_use]
    pub fn evaluator(&self) -> &dyn BoardEvaluator {
        &*self.evaluator
    }

    /// Chooses a move like [`Player::select_move`], reporting progress to `progress`.
    ///
    /// If the search ends without a move although legal moves exist (every reply
    /// repeats the position, or `max_depth` is zero), a random legal move is returned.
    pub fn select_move_with_progress(
        &self,
        rules: &dyn Rules,
        state: &BoardState,
        rng: &mut dyn RngCore,
        cancel: &CancellationToken,
        progress: Option<&dyn Fn(f64)>,
    ) -> Option<Move> {
        let result = {
            let mut ctx = SearchContext {
                rules,
                evaluator: &*self.evaluator,
                max_depth: self.max_depth,
                rng: &mut *rng,
                cancel,
                progress_sink: progress,
                progress: 0.0,
                cache: HashMap::new(),
                ancestors: vec![*state],
                evaluations: 0,
            };
            let result = ctx.search(state, 0, None, FULL_PROGRESS);
            log::trace!(
                "{}: searched depth {}, {} positions cached, {} evaluations, score {}",
                self.id,
                self.max_depth,
                ctx.cache.len(),
                ctx.evaluations,
                result.score,
            );
            result
        };

        if cancel.is_cancelled() {
            return None;
        }
        result
            .mv
            .or_else(|| rules.available_moves(state).choose(rng).cloned())
    }
}

impl Player for MinimaxBot {
    fn id(&self) -> &str {
        &self.id
    }

    fn select_move(
        &self,
        rules: &dyn Rules,
        state: &BoardState,
        rng: &mut dyn RngCore,
        cancel: &CancellationToken,
    ) -> Option<Move> {
        self.select_move_with_progress(rules, state, rng, cancel, None)
    }
}

/// Score of a searched position and the move achieving it.
#[derive(Debug, Clone)]
struct Scored {
    score: f64,
    mv: Option<Move>,
}

impl Scored {
    fn leaf(score: f64) -> Self {
        Self { score, mv: None }
    }
}

/// State of a single search call.
struct SearchContext<'a> {
    rules: &'a dyn Rules,
    evaluator: &'a dyn BoardEvaluator,
    max_depth: usize,
    rng: &'a mut dyn RngCore,
    cancel: &'a CancellationToken,
    progress_sink: Option<&'a dyn Fn(f64)>,
    progress: f64,
    cache: HashMap<BoardState, Scored>,
    ancestors: Vec<BoardState>,
    evaluations: usize,
}

impl SearchContext<'_> {
    fn advance(&mut self, share: f64, depth: usize) {
        self.progress += share;
        if depth <= MinimaxBot::REPORT_DEPTH {
            self.report();
        }
    }

    fn report(&self) {
        if let Some(sink) = self.progress_sink {
            sink(self.progress.min(FULL_PROGRESS));
        }
    }

    fn evaluate(&mut self, state: &BoardState) -> f64 {
        self.evaluations += 1;
        self.evaluator.evaluate(state)
    }

    #[expect(clippy::cast_precision_loss)]
    fn search(&mut self, state: &BoardState, depth: usize, bound: Option<f64>, share: f64) -> Scored {
        if let Some(hit) = self.cache.get(state) {
            let hit = hit.clone();
            self.advance(share, depth);
            return hit;
        }

        if depth == self.max_depth {
            self.advance(share, depth);
            return Scored::leaf(self.evaluate(state));
        }

        let mut moves = self.rules.available_moves(state);
        let maximizing = state.on_move().is_white();
        if moves.is_empty() {
            self.progress += share;
            return Scored::leaf(if maximizing { f64::MIN } else { f64::MAX });
        }
        if depth == 0 && moves.len() == 1 {
            self.progress += share;
            return Scored {
                score: 0.0,
                mv: moves.pop(),
            };
        }

        let count = moves.len();
        let child_share = share / count as f64;
        let mut best = if maximizing { f64::MIN } else { f64::MAX };
        let mut scored: Vec<(f64, Move)> = Vec::with_capacity(count);

        for (i, mv) in moves.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Scored::leaf(0.0);
            }

            let child = state.apply_move(&mv);
            if self.ancestors.contains(&child) {
                self.progress += child_share;
                continue;
            }

            self.ancestors.push(child);
            let score = self.search(&child, depth + 1, Some(best), child_share).score;
            self.ancestors.pop();
            if self.cancel.is_cancelled() {
                return Scored::leaf(0.0);
            }
            scored.push((score, mv));

            let improves = if maximizing { score > best } else { score < best };
            if improves {
                best = score;
                let cut = bound.is_some_and(|bound| {
                    if maximizing { best > bound } else { best < bound }
                });
                if cut {
                    self.progress += (count - i - 1) as f64 * child_share;
                    break;
                }
            }
        }

        if depth <= MinimaxBot::REPORT_DEPTH {
            self.report();
        }

        // every reply repeats a position on the current path
        if scored.is_empty() {
            return Scored::leaf(self.evaluate(state));
        }

        let better: fn(f64, f64) -> f64 = if maximizing { f64::max } else { f64::min };
        let optimum = scored
            .iter()
            .map(|(score, _)| *score)
            .reduce(better)
            .unwrap_or(best);
        let candidates: Vec<usize> = scored
            .iter()
            .enumerate()
            .filter(|(_, (score, _))| (score - optimum).abs() <= TIE_EPSILON)
            .map(|(i, _)| i)
            .collect();
        let pick = candidates.choose(&mut *self.rng).copied().unwrap_or(0);
        let (score, mv) = scored.swap_remove(pick);

        let result = Scored {
            score,
            mv: Some(mv),
        };
        self.cache.insert(*state, result.clone());
        result
    }
}

#[cfg(test)]
mod tests {
    use std::{
        cell::RefCell,
        collections::HashSet,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use draughts_engine::{
        BoardLayout, EnglishDraughts, PieceColor, PieceType, Position, RulesVariant,
    };
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;
    use crate::board_evaluator::BasicEvaluator;

    #[derive(Debug, Default)]
    struct CountingEvaluator {
        calls: Arc<AtomicUsize>,
    }

    impl BoardEvaluator for CountingEvaluator {
        fn evaluate(&self, state: &BoardState) -> f64 {
            self.calls.fetch_add(1, Ordering::Relaxed);
            BasicEvaluator.evaluate(state)
        }
    }

    /// Each side owns a king shuttling between three squares, so positions repeat
    /// every few plies and the game never ends.
    #[derive(Debug)]
    struct ShuttleRules {
        layout: BoardLayout,
    }

    impl ShuttleRules {
        const WHITE_TRACK: [Position; 3] = [
            Position::new(1, 0),
            Position::new(3, 0),
            Position::new(2, 1),
        ];
        const BLACK_TRACK: [Position; 3] = [
            Position::new(0, 3),
            Position::new(2, 3),
            Position::new(1, 2),
        ];

        fn new() -> Self {
            Self {
                layout: BoardLayout::new(RulesVariant::Custom(1), 4, 4).unwrap(),
            }
        }
    }

    impl Rules for ShuttleRules {
        fn variant(&self) -> RulesVariant {
            self.layout.variant()
        }

        fn layout(&self) -> BoardLayout {
            self.layout
        }

        fn initial_state(&self) -> BoardState {
            BoardState::empty(self.layout, PieceColor::White)
                .with_piece(Self::WHITE_TRACK[0], PieceType::WhiteKing)
                .with_piece(Self::BLACK_TRACK[0], PieceType::BlackKing)
        }

        fn starting_color(&self) -> PieceColor {
            PieceColor::White
        }

        fn move_limit_for_tie(&self) -> usize {
            20
        }

        fn available_moves(&self, state: &BoardState) -> Vec<Move> {
            let track = match state.on_move() {
                PieceColor::White => Self::WHITE_TRACK,
                PieceColor::Black => Self::BLACK_TRACK,
            };
            let Some(from) = track
                .into_iter()
                .find(|pos| state.piece(*pos).color() == Some(state.on_move()))
            else {
                return vec![];
            };
            track
                .into_iter()
                .filter(|to| *to != from)
                .map(|to| Move::step(from, to, false))
                .collect()
        }
    }

    /// Rules following an explicit game tree; positions without listed moves are
    /// terminal.
    #[derive(Debug)]
    struct TreeRules {
        root: BoardState,
        moves: HashMap<BoardState, Vec<Move>>,
    }

    impl TreeRules {
        fn new(root: BoardState) -> Self {
            Self {
                root,
                moves: HashMap::new(),
            }
        }

        fn add(&mut self, state: BoardState, mv: Move) -> BoardState {
            let child = state.apply_move(&mv);
            self.moves.entry(state).or_default().push(mv);
            child
        }
    }

    impl Rules for TreeRules {
        fn variant(&self) -> RulesVariant {
            self.root.layout().variant()
        }

        fn layout(&self) -> BoardLayout {
            *self.root.layout()
        }

        fn initial_state(&self) -> BoardState {
            self.root
        }

        fn starting_color(&self) -> PieceColor {
            self.root.on_move()
        }

        fn move_limit_for_tie(&self) -> usize {
            100
        }

        fn available_moves(&self, state: &BoardState) -> Vec<Move> {
            self.moves.get(state).cloned().unwrap_or_default()
        }
    }

    /// Returns preset scores (0 for unknown positions) and counts its calls.
    #[derive(Debug, Default)]
    struct ScriptedEvaluator {
        scores: HashMap<BoardState, f64>,
        calls: Arc<AtomicUsize>,
    }

    impl BoardEvaluator for ScriptedEvaluator {
        fn evaluate(&self, state: &BoardState) -> f64 {
            self.calls.fetch_add(1, Ordering::Relaxed);
            self.scores.get(state).copied().unwrap_or_default()
        }
    }

    fn tree_root(white: &[Position], black: Position) -> BoardState {
        let layout = BoardLayout::new(RulesVariant::Custom(2), 8, 8).unwrap();
        white.iter().fold(
            BoardState::empty(layout, PieceColor::White).with_piece(black, PieceType::BlackKing),
            |state, &pos| state.with_piece(pos, PieceType::WhiteKing),
        )
    }

    fn english(on_move: PieceColor, art: &str) -> BoardState {
        BoardState::from_ascii(EnglishDraughts::new().layout(), on_move, art)
    }

    #[test]
    fn test_selected_move_is_legal() {
        let rules = EnglishDraughts::new();
        let bot = MinimaxBot::new("basic", 3, Box::new(BasicEvaluator));
        let mut rng = Pcg64Mcg::seed_from_u64(1);
        let cancel = CancellationToken::new();

        let mut state = rules.initial_state();
        for _ in 0..6 {
            let mv = bot.select_move(&rules, &state, &mut rng, &cancel).unwrap();
            assert!(rules.available_moves(&state).contains(&mv));
            state = state.apply_move(&mv);
        }
    }

    #[test]
    fn test_no_moves_returns_none() {
        let rules = EnglishDraughts::new();
        let bot = MinimaxBot::new("basic", 3, Box::new(BasicEvaluator));
        let state = english(
            PieceColor::Black,
            "
            ........
            ........
            ........
            ........
            ........
            ........
            ........
            w.......
            ",
        );
        let mut rng = Pcg64Mcg::seed_from_u64(0);
        assert!(
            bot.select_move(&rules, &state, &mut rng, &CancellationToken::new())
                .is_none()
        );
    }

    #[test]
    fn test_forced_reply_skips_evaluation() {
        let rules = EnglishDraughts::new();
        let evaluator = CountingEvaluator::default();
        let calls = Arc::clone(&evaluator.calls);
        let bot = MinimaxBot::new("counting", 4, Box::new(evaluator));
        let state = english(
            PieceColor::White,
            "
            ........
            ........
            ........
            ........
            ........
            w.......
            ........
            ........
            ",
        );
        let moves = rules.available_moves(&state);
        assert_eq!(moves.len(), 1);

        let mut rng = Pcg64Mcg::seed_from_u64(0);
        let mv = bot.select_move(&rules, &state, &mut rng, &CancellationToken::new());
        assert_eq!(mv.as_ref(), moves.first());
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_repeated_positions_are_skipped() {
        let rules = ShuttleRules::new();
        let bot = MinimaxBot::new("shuttle", 64, Box::new(BasicEvaluator));
        let mut rng = Pcg64Mcg::seed_from_u64(7);
        let state = rules.initial_state();
        let mv = bot
            .select_move(&rules, &state, &mut rng, &CancellationToken::new())
            .unwrap();
        assert!(rules.available_moves(&state).contains(&mv));
    }

    #[test]
    fn test_cancelled_search_returns_none() {
        let rules = EnglishDraughts::new();
        let bot = MinimaxBot::new("basic", 3, Box::new(BasicEvaluator));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut rng = Pcg64Mcg::seed_from_u64(0);
        assert!(
            bot.select_move(&rules, &rules.initial_state(), &mut rng, &cancel)
                .is_none()
        );
    }

    #[test]
    fn test_zero_depth_picks_legal_move() {
        let rules = EnglishDraughts::new();
        let bot = MinimaxBot::new("basic", 0, Box::new(BasicEvaluator));
        let mut rng = Pcg64Mcg::seed_from_u64(3);
        let state = rules.initial_state();
        let mv = bot
            .select_move(&rules, &state, &mut rng, &CancellationToken::new())
            .unwrap();
        assert!(rules.available_moves(&state).contains(&mv));
    }

    #[test]
    fn test_progress_reaches_completion() {
        let rules = EnglishDraughts::new();
        let bot = MinimaxBot::new("basic", 3, Box::new(BasicEvaluator));
        let mut rng = Pcg64Mcg::seed_from_u64(5);
        let reports = RefCell::new(vec![]);
        let sink = |p: f64| reports.borrow_mut().push(p);

        bot.select_move_with_progress(
            &rules,
            &rules.initial_state(),
            &mut rng,
            &CancellationToken::new(),
            Some(&sink),
        );

        let reports = reports.into_inner();
        assert!(!reports.is_empty());
        assert!(reports.is_sorted_by(|a, b| a <= b));
        let last = reports.last().copied().unwrap_or_default();
        assert!((last - 100.0).abs() < 1e-6, "{last}");
    }

    #[test]
    fn test_avoids_losing_a_man() {
        let rules = EnglishDraughts::new();
        let bot = MinimaxBot::new("basic", 2, Box::new(BasicEvaluator));
        // stepping to (3,4) lets Black jump into the vacated square
        let state = english(
            PieceColor::White,
            "
            ........
            ........
            ........
            ....b...
            ........
            ..w.....
            ........
            ........
            ",
        );
        let mut rng = Pcg64Mcg::seed_from_u64(0);
        let mv = bot
            .select_move(&rules, &state, &mut rng, &CancellationToken::new())
            .unwrap();
        assert_eq!(mv, Move::step(Position::new(2, 5), Position::new(1, 4), false));
    }

    #[test]
    fn test_equal_scores_are_broken_randomly() {
        let p = Position::new;
        let root = tree_root(&[p(3, 0)], p(0, 7));
        let mut rules = TreeRules::new(root);
        let mut evaluator = ScriptedEvaluator::default();
        for (to, score) in [(p(2, 1), 2.0), (p(4, 1), 2.0005), (p(5, 2), 2.0), (p(6, 3), 1.0)] {
            let child = rules.add(root, Move::step(p(3, 0), to, false));
            evaluator.scores.insert(child, score);
        }
        let bot = MinimaxBot::new("tree", 1, Box::new(evaluator));

        let mut picks = HashSet::new();
        for seed in 0..32 {
            let mut rng = Pcg64Mcg::seed_from_u64(seed);
            let mv = bot
                .select_move(&rules, &root, &mut rng, &CancellationToken::new())
                .unwrap();
            assert_ne!(mv.to(), p(6, 3), "seed {seed} picked a worse move");
            picks.insert(mv.to());
        }
        assert!(picks.len() > 1, "{picks:?}");
    }

    #[test]
    fn test_refuted_sibling_is_cut_off() {
        let p = Position::new;
        let root = tree_root(&[p(1, 0)], p(0, 7));
        let mut rules = TreeRules::new(root);
        let mut evaluator = ScriptedEvaluator::default();

        // Black can hold White to 5 after the first move.
        let first = rules.add(root, Move::step(p(1, 0), p(2, 1), false));
        for (to, score) in [(p(1, 6), 5.0), (p(2, 5), 6.0)] {
            let leaf = rules.add(first, Move::step(p(0, 7), to, false));
            evaluator.scores.insert(leaf, score);
        }
        // The first reply to the second move already scores 1, refuting it.
        let second = rules.add(root, Move::step(p(1, 0), p(4, 1), false));
        for (to, score) in [(p(1, 6), 1.0), (p(2, 5), 9.0), (p(3, 6), 9.0)] {
            let leaf = rules.add(second, Move::step(p(0, 7), to, false));
            evaluator.scores.insert(leaf, score);
        }

        let calls = Arc::clone(&evaluator.calls);
        let bot = MinimaxBot::new("tree", 2, Box::new(evaluator));
        let mut rng = Pcg64Mcg::seed_from_u64(0);
        let mv = bot
            .select_move(&rules, &root, &mut rng, &CancellationToken::new())
            .unwrap();
        assert_eq!(mv.to(), p(2, 1));
        assert_eq!(calls.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn test_transposed_position_is_searched_once() {
        let p = Position::new;
        let root = tree_root(&[p(1, 0), p(3, 0)], p(0, 7));
        let mut rules = TreeRules::new(root);
        let mut evaluator = ScriptedEvaluator::default();
        let left = Move::step(p(1, 0), p(2, 1), false);
        let right = Move::step(p(3, 0), p(4, 1), false);
        let black = Move::step(p(0, 7), p(1, 6), false);

        // left, black, right and right, black, left reach the same position
        let after_left = rules.add(root, left.clone());
        let after_left = rules.add(after_left, black.clone());
        let meeting = rules.add(after_left, right.clone());
        let after_right = rules.add(root, right);
        let after_right = rules.add(after_right, black);
        assert_eq!(rules.add(after_right, left), meeting);

        for (to, score) in [(p(0, 5), 3.0), (p(2, 5), 4.0)] {
            let leaf = rules.add(meeting, Move::step(p(1, 6), to, false));
            evaluator.scores.insert(leaf, score);
        }

        let calls = Arc::clone(&evaluator.calls);
        let bot = MinimaxBot::new("tree", 4, Box::new(evaluator));
        let mut rng = Pcg64Mcg::seed_from_u64(0);
        let mv = bot.select_move(&rules, &root, &mut rng, &CancellationToken::new());
        assert!(mv.is_some());
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }
}
