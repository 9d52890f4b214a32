//! Runtime configuration for the vanity address search.

use std::time::Duration;

use clap::Parser;

use crate::crypto::{Account, KeyError};
use crate::matcher::{MatchConfig, Pattern, PatternError};
use crate::worker::StopCondition;

/// Contract depth used when contract addresses are needed but no depth was given.
pub const DEFAULT_CONTRACT_DEPTH: usize = 10;

/// Upper bound on `--distance`.
pub const MAX_CONTRACT_DEPTH: usize = 1_000_000;

/// Ethereum vanity address search
///
/// A hex-only SEARCH is matched as a literal prefix; anything else is a regular
/// expression anchored right after the leading `0x`.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Prefix or regex to search for
    #[arg(value_name = "SEARCH")]
    pub pattern: Option<String>,

    /// Search the main address (combine with -c to search both)
    #[arg(short = 'a', long = "address")]
    pub search_main: bool,

    /// Search the first DEPTH contract addresses
    #[arg(short = 'c', long = "contract")]
    pub search_contracts: bool,

    /// List every contract address up to DEPTH with each result
    #[arg(short = 'l', long = "list")]
    pub list: bool,

    /// Don't render addresses with checksum casing
    #[arg(short = 's', long = "no-sum")]
    pub no_checksum: bool,

    /// Case-insensitive matching
    #[arg(short = 'i', long)]
    pub ignore_case: bool,

    /// Don't print rate updates (forced when stdout is not a terminal)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Number of contract addresses to derive (default 10 when needed)
    #[arg(short = 'd', long = "distance", value_name = "DEPTH", default_value = "0")]
    pub depth: usize,

    /// Stop after finding N results
    #[arg(short = 'n', long, default_value = "0")]
    pub count: usize,

    /// Stop after the given number of seconds
    #[arg(short = 't', long = "timed", value_name = "SECONDS")]
    pub timed: Option<u64>,

    /// Number of simultaneous workers (default: number of CPU cores)
    #[arg(long = "max-procs")]
    pub workers: Option<usize>,

    /// Evaluate a single private key instead of searching
    #[arg(long, value_name = "KEY")]
    pub key: Option<String>,

    /// Evaluate the contract addresses of an existing address
    #[arg(long, value_name = "ADDRESS")]
    pub scan: Option<String>,

    /// Rate report interval in seconds
    #[arg(short = 'r', long, default_value = "1")]
    pub report_interval: u64,
}

impl Config {
    /// Returns the number of workers, defaulting to CPU count
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.key.is_some() && self.scan.is_some() {
            return Err(ConfigError::ConflictingSources);
        }

        let pattern_empty = self.pattern.as_deref().map_or(true, str::is_empty);
        if pattern_empty && !self.is_single() {
            return Err(ConfigError::MissingPattern);
        }

        if self.workers == Some(0) {
            return Err(ConfigError::InvalidWorkers);
        }

        if self.depth > MAX_CONTRACT_DEPTH {
            return Err(ConfigError::DepthTooLarge(self.depth));
        }

        Ok(())
    }

    /// True when evaluating one supplied key or address instead of searching.
    pub fn is_single(&self) -> bool {
        self.key.is_some() || self.scan.is_some()
    }

    /// Builds the matcher configuration, compiling the search pattern.
    pub fn match_config(&self) -> Result<MatchConfig, ConfigError> {
        let pattern = Pattern::parse(self.pattern.as_deref().unwrap_or(""), self.ignore_case)?;

        // Scanning a bare address only makes sense for its contracts.
        let search_contracts = self.search_contracts || self.scan.is_some();
        let search_main = self.search_main || !self.search_contracts;

        let contract_depth = if self.depth == 0 && (search_contracts || self.list) {
            DEFAULT_CONTRACT_DEPTH
        } else {
            self.depth
        };

        Ok(MatchConfig {
            search_main,
            search_contracts,
            contract_depth,
            ignore_case: self.ignore_case,
            no_checksum: self.no_checksum,
            list_contracts: self.list,
            pattern,
        })
    }

    /// Builds the account for `--key` or `--scan`, if either was given.
    pub fn single_account(&self) -> Result<Option<Account>, ConfigError> {
        if let Some(key) = &self.key {
            return Ok(Some(Account::from_private_key(key)?));
        }
        if let Some(address) = &self.scan {
            return Ok(Some(Account::from_address(address)?));
        }
        Ok(None)
    }

    /// Builds the stop condition from `-n` and `-t`.
    pub fn stop_condition(&self) -> StopCondition {
        StopCondition::new(self.count, self.timed.map(Duration::from_secs))
    }

    /// Interval between rate reports; `None` in quiet mode.
    pub fn rate_interval(&self) -> Option<Duration> {
        if self.quiet || self.report_interval == 0 {
            None
        } else {
            Some(Duration::from_secs(self.report_interval))
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no search string provided")]
    MissingPattern,

    #[error("--key and --scan cannot be used together")]
    ConflictingSources,

    #[error("--max-procs must be at least 1")]
    InvalidWorkers,

    #[error("contract depth {0} is too large (max 1000000)")]
    DepthTooLarge(usize),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Pattern(#[from] PatternError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["vanity-eth"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_valid_pattern() {
        let config = parse(&["dead"]);
        assert!(config.validate().is_ok());
        let mc = config.match_config().unwrap();
        assert!(mc.search_main);
        assert!(!mc.search_contracts);
        assert_eq!(mc.contract_depth, 0);
        assert_eq!(mc.pattern.prefix(), Some("0xdead"));
    }

    #[test]
    fn test_missing_pattern() {
        let config = parse(&[]);
        assert!(matches!(config.validate(), Err(ConfigError::MissingPattern)));
    }

    #[test]
    fn test_invalid_regex() {
        let config = parse(&["(ab"]);
        assert!(matches!(config.match_config(), Err(ConfigError::Pattern(_))));
    }

    #[test]
    fn test_contract_defaults() {
        let mc = parse(&["-c", "ABC"]).match_config().unwrap();
        assert!(!mc.search_main);
        assert!(mc.search_contracts);
        assert_eq!(mc.contract_depth, DEFAULT_CONTRACT_DEPTH);

        let mc = parse(&["-ac", "-d", "3", "ABC"]).match_config().unwrap();
        assert!(mc.search_main);
        assert!(mc.search_contracts);
        assert_eq!(mc.contract_depth, 3);
    }

    #[test]
    fn test_scan_forces_contracts() {
        let config = parse(&["-l", "--scan", "0x950024ae4d9934c65c9fd04249e0f383910d27f2"]);
        assert!(config.validate().is_ok());
        let mc = config.match_config().unwrap();
        assert!(mc.search_contracts);
        assert!(mc.list_contracts);
        assert_eq!(mc.contract_depth, DEFAULT_CONTRACT_DEPTH);
        assert!(config.single_account().unwrap().unwrap().key().is_none());
    }

    #[test]
    fn test_bad_key_is_typed_error() {
        let config = parse(&["--key", "0xnothex"]);
        assert!(matches!(config.single_account(), Err(ConfigError::Key(_))));
    }

    #[test]
    fn test_conflicting_sources() {
        let config = parse(&["--key", "01", "--scan", "02"]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ConflictingSources)
        ));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = parse(&["--max-procs", "0", "ab"]);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidWorkers)));
    }

    #[test]
    fn test_stop_condition_defaults_to_one() {
        assert_eq!(parse(&["ab"]).stop_condition().max_results, Some(1));
        let timed = parse(&["-t", "5", "ab"]).stop_condition();
        assert_eq!(timed.max_results, None);
        assert_eq!(timed.time_limit, Some(Duration::from_secs(5)));
    }
}
