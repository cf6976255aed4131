//! Nordic stock fundamentals screener
//!
//! Collects EBIT history, enterprise value and return on equity for every
//! ticker in a market's universe file, persists results to append-only CSV
//! tables so interrupted runs resume where they stopped, and ranks each
//! market by a combined earnings-yield and profitability score.

pub mod cli;
pub mod commands;
pub mod constants;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
