//! Ethereum Vanity Address Search CLI
//!
//! Usage:
//!   vanity-eth -n 3 ABC           # Find 3 addresses starting with "ABC"
//!   vanity-eth -t 5 ABC           # Find as many as possible in 5 seconds
//!   vanity-eth -c ABC             # Search the first 10 contract addresses
//!   vanity-eth -cd1 '00+AB'       # First contract address, regex match
//!   vanity-eth '.*DEF$'           # Address ending in "DEF"
//!   vanity-eth -ld5 --key=0x...   # Show a key and its first 5 contracts
//!   vanity-eth -l --scan=0x...    # Show the first 10 contracts of an address

use std::io::{self, IsTerminal, Write};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vanity_eth::{Config, Matcher, SearchCounter, SearchEvent, VanityResult, WorkerPool};

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = Config::parse();

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        process::exit(1);
    }

    let match_config = match config.match_config() {
        Ok(mc) => mc,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };
    let matcher = Matcher::new(match_config, Arc::new(SearchCounter::new()));

    // --key / --scan: evaluate once and exit
    match config.single_account() {
        Ok(Some(account)) => {
            print_json(&matcher.evaluate(&account));
            return;
        }
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }

    let quiet = config.quiet || !io::stdout().is_terminal();

    let pool = match WorkerPool::new(config.worker_count(), matcher) {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Failed to start workers: {}", e);
            process::exit(1);
        }
    };

    // Set up ctrl-c handler
    let stop_flag = pool.stop_flag_clone();
    if let Err(e) = ctrlc::set_handler(move || stop_flag.store(true, Ordering::Relaxed)) {
        warn!(error = %e, "could not install Ctrl-C handler");
    }

    let interval = if quiet { None } else { config.rate_interval() };
    let stop_flag = pool.stop_flag_clone();
    let mut output = EventWriter::new(io::stdout());

    let summary = pool.run(config.stop_condition(), interval, |event| {
        output.handle(event, &stop_flag)
    });

    if let Err(e) = output.finish() {
        warn!(error = %e, "could not write output");
    }

    info!(
        found = summary.found,
        searches = summary.total_searches,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        reason = ?summary.reason,
        "search finished"
    );
}

fn print_json(result: &Option<VanityResult>) {
    match serde_json::to_string(result) {
        Ok(line) => println!("{}", line),
        Err(e) => {
            eprintln!("Error encoding result: {}", e);
            process::exit(1);
        }
    }
}

/// Writes search events as JSON lines plus an in-place rate line.
struct EventWriter<W: Write> {
    out: W,
    /// A rate line is on screen without a trailing newline
    rated: bool,
}

impl<W: Write> EventWriter<W> {
    fn new(out: W) -> Self {
        Self { out, rated: false }
    }

    /// Writes one event; a write failure stops the search.
    fn handle(&mut self, event: SearchEvent, stop_flag: &AtomicBool) {
        if let Err(e) = self.write_event(event) {
            warn!(error = %e, "could not write output, stopping search");
            stop_flag.store(true, Ordering::Relaxed);
        }
    }

    fn write_event(&mut self, event: SearchEvent) -> io::Result<()> {
        match event {
            SearchEvent::Found(result) => {
                let line = match result.to_json() {
                    Ok(line) => line,
                    Err(e) => {
                        warn!(error = %e, address = %result.address, "could not encode result");
                        return Ok(());
                    }
                };
                if self.rated {
                    self.rated = false;
                    writeln!(self.out, "\r{}", line)?;
                } else {
                    writeln!(self.out, "{}", line)?;
                }
                self.out.flush()
            }
            SearchEvent::Rate(n) => {
                self.rated = true;
                write!(self.out, "\rRate: {}/sec   \x08\x08", format_rate(n))?;
                self.out.flush()
            }
        }
    }

    /// Ends a hanging rate line.
    fn finish(&mut self) -> io::Result<()> {
        if self.rated {
            self.rated = false;
            writeln!(self.out)?;
        }
        self.out.flush()
    }
}

/// Formats a count with thousands separators.
fn format_rate(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accepts `budget` writes, then fails like a closed pipe.
    struct ClosingPipe {
        budget: usize,
        written: Vec<u8>,
    }

    impl Write for ClosingPipe {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::Error::from(io::ErrorKind::BrokenPipe));
            }
            self.budget -= 1;
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn found() -> SearchEvent {
        SearchEvent::Found(VanityResult {
            address: "0xAB00000000000000000000000000000000000000".into(),
            public: None,
            private: None,
            contracts: None,
        })
    }

    #[test]
    fn test_write_failure_sets_stop_flag() {
        let stop = AtomicBool::new(false);
        let mut output = EventWriter::new(ClosingPipe {
            budget: 0,
            written: Vec::new(),
        });

        output.handle(found(), &stop);
        assert!(stop.load(Ordering::Relaxed));
    }

    #[test]
    fn test_rate_write_failure_sets_stop_flag() {
        let stop = AtomicBool::new(false);
        let mut output = EventWriter::new(ClosingPipe {
            budget: 0,
            written: Vec::new(),
        });

        output.handle(SearchEvent::Rate(10), &stop);
        assert!(stop.load(Ordering::Relaxed));
    }

    #[test]
    fn test_successful_writes_keep_running() {
        let stop = AtomicBool::new(false);
        let mut output = EventWriter::new(ClosingPipe {
            budget: usize::MAX,
            written: Vec::new(),
        });

        output.handle(SearchEvent::Rate(1_500), &stop);
        output.handle(found(), &stop);
        output.finish().unwrap();

        assert!(!stop.load(Ordering::Relaxed));
        let text = String::from_utf8(output.out.written).unwrap();
        assert!(text.starts_with("\rRate: 1,500/sec"));
        assert!(text.contains("\r{\"address\":\"0xAB00"));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(0), "0");
        assert_eq!(format_rate(999), "999");
        assert_eq!(format_rate(1_000), "1,000");
        assert_eq!(format_rate(1_234_567), "1,234,567");
    }
}
