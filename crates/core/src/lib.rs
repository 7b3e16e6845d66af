//! Core data types for the lurker bot.

pub mod chain;
pub mod mention;
pub mod social;
pub mod token;

pub use chain::*;
pub use mention::*;
pub use social::*;
pub use token::*;
