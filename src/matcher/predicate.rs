//! The match predicate and single-account evaluation.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::counter::SearchCounter;
use crate::crypto::{Account, Address};
use crate::result::VanityResult;

use super::Pattern;

/// Immutable configuration for one search run.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Test the account address itself
    pub search_main: bool,
    /// Test the first `contract_depth` contract addresses
    pub search_contracts: bool,
    /// Number of contract nonces to derive (0..depth)
    pub contract_depth: usize,
    /// Match against the lowercase rendering
    pub ignore_case: bool,
    /// Render without EIP-55 casing
    pub no_checksum: bool,
    /// Report every contract address up to the depth with each match
    pub list_contracts: bool,
    pub pattern: Pattern,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            search_main: true,
            search_contracts: false,
            contract_depth: 0,
            ignore_case: false,
            no_checksum: false,
            list_contracts: false,
            pattern: Pattern::default(),
        }
    }
}

/// Applies a [`MatchConfig`] to addresses and accounts, counting every test.
#[derive(Debug, Clone)]
pub struct Matcher {
    config: Arc<MatchConfig>,
    counter: Arc<SearchCounter>,
}

impl Matcher {
    /// Creates a matcher that records attempts on `counter`.
    pub fn new(config: MatchConfig, counter: Arc<SearchCounter>) -> Self {
        Self {
            config: Arc::new(config),
            counter,
        }
    }

    /// Returns the match configuration.
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Returns the shared attempt counter.
    pub fn counter(&self) -> &Arc<SearchCounter> {
        &self.counter
    }

    /// Renders an address the way the predicate sees it.
    ///
    /// Case-insensitive matching always uses the lowercase form since
    /// checksum casing only matters when case does.
    #[inline]
    pub fn render(&self, address: &Address) -> String {
        if self.config.ignore_case || self.config.no_checksum {
            address.to_hex_prefixed()
        } else {
            address.to_checksum()
        }
    }

    /// Renders an address for output.
    fn display(&self, address: &Address) -> String {
        if self.config.no_checksum {
            address.to_hex_prefixed()
        } else {
            address.to_checksum()
        }
    }

    /// Tests one address against the configured pattern.
    #[inline]
    pub fn is_match(&self, address: &Address) -> bool {
        self.counter.increment();
        self.config.pattern.matches(&self.render(address))
    }

    /// Runs the match logic once for `account`.
    ///
    /// The main address is checked first and takes priority: if it matches
    /// and contracts are not being listed, the contract range is skipped.
    pub fn evaluate(&self, account: &Account) -> Option<VanityResult> {
        let (found, contracts) = self.find(account);
        if !found {
            return None;
        }

        let contracts = contracts.filter(|c| !c.is_empty()).map(|c| {
            c.into_iter()
                .map(|(ordinal, addr)| (ordinal, self.display(&addr)))
                .collect()
        });

        Some(VanityResult {
            address: self.display(account.address()),
            public: account.public_key_hex(),
            private: account.private_key_hex(),
            contracts,
        })
    }

    fn find(&self, account: &Account) -> (bool, Option<BTreeMap<usize, Address>>) {
        let cfg = &*self.config;
        let main_hit = cfg.search_main && self.is_match(account.address());

        if cfg.list_contracts {
            let all = account.contracts(cfg.contract_depth);
            let mut contract_hit = false;
            if cfg.search_contracts {
                // Every ordinal is tested; the full list is reported either way.
                for addr in all.values() {
                    contract_hit |= self.is_match(addr);
                }
            }
            return (main_hit || contract_hit, Some(all));
        }

        if main_hit {
            return (true, None);
        }

        if cfg.search_contracts {
            for nonce in 0..cfg.contract_depth {
                let addr = account.contract(nonce as u64);
                if self.is_match(&addr) {
                    return (true, Some(BTreeMap::from([(nonce + 1, addr)])));
                }
            }
        }

        (false, None)
    }
}
