//! # vanity_eth
//!
//! Ethereum vanity address search over account addresses and the contract
//! addresses they deploy.
//!
//! ## Architecture
//!
//! - `crypto`: Key generation, address and contract address derivation, EIP-55
//! - `matcher`: Prefix/regex patterns and the match predicate
//! - `worker`: Supervised worker pool, stop conditions and throughput reporting
//! - `config`: Runtime configuration

pub mod config;
pub mod counter;
pub mod crypto;
pub mod matcher;
pub mod result;
pub mod worker;

pub use config::{Config, ConfigError};
pub use counter::SearchCounter;
pub use crypto::{Account, Address, KeyError, Keypair};
pub use matcher::{MatchConfig, Matcher, Pattern, PatternError};
pub use result::VanityResult;
pub use worker::{Fault, SearchEvent, SearchSummary, StopCondition, StopReason, WorkerPool};
