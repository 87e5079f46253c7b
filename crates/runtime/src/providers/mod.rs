//! Declaration sources for automated participants.

mod opponent;

pub use opponent::OpponentPolicy;
