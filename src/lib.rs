//! N x N tic-tac-toe played by a multi-layer perceptron that searches a few plies with alpha-beta
//! negamax and learns the value of the positions it evaluates from the results of its games.

pub mod activation;
pub mod agents;
pub mod board_game;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod network;
pub mod search;
pub mod self_play;
pub mod tic_tac_toe;
pub mod weights;
