//! Voting primitives and the vote aggregator.
//!
//! [`aggregate`] is the single entry point for turning a panel's independent
//! categorical votes into a consensus value with disagreement detection.

pub mod aggregate;
pub mod ballot;

pub use aggregate::{aggregate, AggregatedVotes, VoteCounts};
pub use ballot::{Vote, VoteValue};
