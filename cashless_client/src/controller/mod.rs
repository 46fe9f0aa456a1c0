//! The wallet view controller: owns the state, performs every network and
//! device call, and feeds the results through the reducer.

pub mod handler;

pub use handler::WalletController;
