//! Agent that searches a few plies ahead and scores the frontier with a network, learning from
//! the outcome of every game it plays.

use std::mem;
use std::time::Instant;

use log::debug;

use crate::activation::{Activation, Sigmoid};
use crate::agents::{Agent, Seat};
use crate::board_game::{Outcome, Player};
use crate::error::AgentError;
use crate::evaluator::Evaluator;
use crate::network::Network;
use crate::search::{self, Cutoff};
use crate::tic_tac_toe::Board;

/// A network input together with the player whose score it was asked for.
pub type Example = (Vec<f64>, Player);

/// Network inference as a leaf evaluator.
///
/// The network sees [`Board::encode`] of the position and `player`, its single sigmoid output is
/// doubled onto the (0, 2) outcome scale. When recording, every input it is shown is kept as a
/// training example.
pub struct NetworkEvaluator<'a, A: Activation = Sigmoid> {
    network: &'a Network<A>,
    examples: Option<&'a mut Vec<Example>>,
}

impl<'a, A: Activation> NetworkEvaluator<'a, A> {
    pub fn new(network: &'a Network<A>) -> Self {
        NetworkEvaluator {
            network,
            examples: None,
        }
    }

    pub fn recording(network: &'a Network<A>, examples: &'a mut Vec<Example>) -> Self {
        NetworkEvaluator {
            network,
            examples: Some(examples),
        }
    }
}

impl<A: Activation> Evaluator for NetworkEvaluator<'_, A> {
    fn evaluate(&mut self, board: &Board, player: Player) -> f64 {
        let input = board.encode(player);
        let output = self.network.run(&input)[0];
        if let Some(examples) = self.examples.as_deref_mut() {
            examples.push((input, player));
        }
        2.0 * output
    }
}

pub struct NetworkAgent<A: Activation = Sigmoid> {
    seat: Seat,
    network: Network<A>,
    // plies searched before the network takes over
    depth: usize,
    // every network input seen since the last game ended
    examples: Vec<Example>,
    training: bool,
}

impl<A: Activation> NetworkAgent<A> {
    /// `network` must have a single output; its input width must be size * size + 1 for the
    /// boards it will play on.
    pub fn new(player: Player, network: Network<A>, depth: usize) -> Self {
        assert!(depth >= 1, "network agent must search at least one ply");
        let layout = network.layout();
        assert_eq!(
            layout[layout.len() - 1],
            1,
            "network agent needs a single output, got layout {:?}",
            layout
        );
        NetworkAgent {
            seat: Seat::new(player),
            network,
            depth,
            examples: Vec::new(),
            training: true,
        }
    }

    /// With training off the network is only used for play; examples are still dropped at the
    /// end of each game.
    pub fn with_training(mut self, training: bool) -> Self {
        self.training = training;
        self
    }

    pub fn network(&self) -> &Network<A> {
        &self.network
    }

    pub fn into_network(self) -> Network<A> {
        self.network
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    /// Training target of every recorded example once the game ended with `outcome` for this
    /// agent. An example scored for the opponent is labelled with the opponent's result.
    fn targets(&self, outcome: Outcome) -> Vec<Vec<f64>> {
        self.examples
            .iter()
            .map(|(_, player)| {
                let result = if *player == self.seat.player {
                    outcome
                } else {
                    outcome.complement()
                };
                vec![result.value() / 2.0]
            })
            .collect()
    }
}

impl<A: Activation> Agent for NetworkAgent<A> {
    fn name(&self) -> &str {
        "Network"
    }

    fn seat(&self) -> &Seat {
        &self.seat
    }

    fn seat_mut(&mut self) -> &mut Seat {
        &mut self.seat
    }

    fn choose_move(&mut self, board: &Board) -> Result<Board, AgentError> {
        let now = Instant::now();
        let player = self.seat.player;
        let recorded = self.examples.len();
        let mut evaluator = NetworkEvaluator::recording(&self.network, &mut self.examples);
        let (score, next) = search::search(
            board,
            player,
            Some(Cutoff::new(&mut evaluator, self.depth)),
        );
        debug!(
            "{:?} {} chose cell {:?} (score {:.3}, {} positions evaluated) in {:?}",
            player,
            self.name(),
            board.move_index(&next),
            score,
            self.examples.len() - recorded,
            now.elapsed()
        );
        Ok(next)
    }

    /// Label every position evaluated during the game with the final result, train on them,
    /// then forget them.
    fn game_over(&mut self, outcome: Outcome) {
        self.seat.score += outcome.points();
        if !self.training || self.examples.is_empty() {
            self.examples.clear();
            return;
        }
        let targets = self.targets(outcome);
        let inputs: Vec<Vec<f64>> = mem::take(&mut self.examples)
            .into_iter()
            .map(|(input, _)| input)
            .collect();
        let mean_delta = self.network.train(&inputs, &targets);
        debug!(
            "{:?} {} trained on {} positions after a {}, mean delta {:.6}",
            self.seat.player,
            self.name(),
            inputs.len(),
            outcome,
            mean_delta
        );
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::board_game::Player::{P1, P2};
    use crate::tic_tac_toe::tests::board_from;

    fn network(seed: u64) -> Network {
        let mut rng = StdRng::seed_from_u64(seed);
        Network::create(&[10, 8, 1], 0.1, Sigmoid, &mut rng)
    }

    #[test]
    fn test_evaluator_scale_and_recording() {
        let network = network(1);
        let board = board_from(3, "x.. .o. ...");
        let mut examples = vec![];
        let score = {
            let mut evaluator = NetworkEvaluator::recording(&network, &mut examples);
            evaluator.evaluate(&board, P2)
        };
        assert!(score > 0.0 && score < 2.0);
        assert_eq!(score, 2.0 * network.run(&board.encode(P2))[0]);
        assert_eq!(examples, vec![(board.encode(P2), P2)]);

        let mut plain = NetworkEvaluator::new(&network);
        assert_eq!(plain.evaluate(&board, P2), score);
    }

    #[test]
    fn test_move_records_the_evaluated_positions() {
        let board = board_from(3, "x.. ... ...");
        let mut agent = NetworkAgent::new(P2, network(2), 1);
        let next = agent.choose_move(&board).unwrap();
        assert!(board.move_index(&next).is_some());
        // one position per reply, each scored for O who just moved
        assert_eq!(agent.examples().len(), 8);
        assert!(agent
            .examples()
            .iter()
            .all(|(e, player)| e.len() == 10 && e[9] == -1.0 && *player == P2));
    }

    #[test]
    fn test_targets_follow_the_example_player() {
        let board = board_from(3, "... ... ...");
        for (depth, scored_for) in [(1, P1), (2, P2), (3, P1)] {
            let mut agent = NetworkAgent::new(P1, network(7), depth);
            agent.choose_move(&board).unwrap();
            assert!(!agent.examples().is_empty());
            for (input, player) in agent.examples() {
                assert_eq!(*player, scored_for, "depth {}", depth);
                assert_eq!(input[9], player.sign());
            }

            let own = if scored_for == P1 { 1.0 } else { 0.0 };
            assert!(agent.targets(Outcome::Win).iter().all(|t| t == &vec![own]));
            assert!(agent
                .targets(Outcome::Loss)
                .iter()
                .all(|t| t == &vec![1.0 - own]));
            assert!(agent.targets(Outcome::Tie).iter().all(|t| t == &vec![0.5]));
        }
    }

    #[test]
    fn test_repeated_wins_lower_the_opponents_evaluation() {
        // cutoffs at depth 2 are scored for the opponent, who lost every game
        let board = board_from(3, "... ... ...");
        let mut agent = NetworkAgent::new(P1, network(8), 2);
        agent.choose_move(&board).unwrap();
        let positions: Vec<Vec<f64>> = agent.examples().iter().map(|(e, _)| e.clone()).collect();
        let before = agent.network().clone();
        agent.game_over(Outcome::Win);
        for _ in 0..50 {
            agent.choose_move(&board).unwrap();
            agent.game_over(Outcome::Win);
        }

        let mean = |n: &Network| positions.iter().map(|e| n.run(e)[0]).sum::<f64>();
        assert!(mean(agent.network()) < mean(&before));
    }

    #[test]
    fn test_game_over_trains_and_clears() {
        let board = board_from(3, "x.. ... ...");
        let mut agent = NetworkAgent::new(P2, network(3), 2);
        agent.choose_move(&board).unwrap();
        let examples: Vec<Vec<f64>> = agent.examples().iter().map(|(e, _)| e.clone()).collect();
        assert!(!examples.is_empty());
        // two plies down, every cutoff was scored for X
        assert!(agent.examples().iter().all(|(_, player)| *player == P1));
        let before = agent.network().clone();

        agent.game_over(Outcome::Loss);
        assert!(agent.examples().is_empty());
        assert_eq!(agent.score(), 0);
        assert_ne!(agent.network().weights(), before.weights());

        // O lost, so X's recorded positions were trained towards a win
        let mean = |n: &Network| examples.iter().map(|e| n.run(e)[0]).sum::<f64>();
        assert!(mean(agent.network()) > mean(&before));
    }

    #[test]
    fn test_frozen_agent_does_not_train() {
        let board = board_from(3, "x.. ... ...");
        let mut agent = NetworkAgent::new(P2, network(4), 1).with_training(false);
        agent.choose_move(&board).unwrap();
        let before = agent.network().weights().clone();
        agent.game_over(Outcome::Win);
        assert!(agent.examples().is_empty());
        assert_eq!(agent.score(), 2);
        assert_eq!(agent.network().weights(), &before);
    }

    #[test]
    fn test_finishes_a_won_position() {
        // whatever the network thinks, a terminal win inside the horizon is exact
        let board = board_from(3, "xx. oo. ...");
        let mut agent = NetworkAgent::new(P1, network(5), 2);
        let next = agent.choose_move(&board).unwrap();
        assert_eq!(board.move_index(&next), Some(2));
    }

    #[test]
    #[should_panic(expected = "at least one ply")]
    fn test_zero_depth_is_rejected() {
        NetworkAgent::new(P1, network(6), 0);
    }
}
