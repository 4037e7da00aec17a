use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use diner_core::PartialConfig;

pub fn build_cli() -> Command {
    Command::new("diner")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Dining tables that deadlock, migrate one diner per stall and stop when the overflow table deadlocks")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Read settings from this TOML file (applied after ./diner.toml)"),
        )
        .arg(count_arg("tables", "N", "Number of regular tables"))
        .arg(count_arg("seats", "C", "Seats and forks per table, overflow included"))
        .arg(units_arg("think-max", "Longest think period"))
        .arg(units_arg("eat-max", "Longest eat period"))
        .arg(units_arg("settle", "Pause between left and right fork"))
        .arg(units_arg("poll", "Right-fork retry and deadlock check interval"))
        .arg(
            Arg::new("time-unit-ms")
                .long("time-unit-ms")
                .value_name("MS")
                .value_parser(value_parser!(u64))
                .help("Length of one time unit in milliseconds"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("SEED")
                .value_parser(value_parser!(u64))
                .help("Seed the delay generator for a reproducible run"),
        )
        .arg(units_arg("max-runtime", "Give up after this long"))
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print events and the summary as JSON lines"),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .action(ArgAction::SetTrue)
                .help("Print only the summary"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::Count)
                .help("Log to stderr (-v info, -vv debug)"),
        )
}

fn count_arg(name: &'static str, value_name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name(value_name)
        .value_parser(value_parser!(usize))
        .help(help)
}

fn units_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("UNITS")
        .value_parser(value_parser!(u64))
        .help(help)
}

/// Parsed command line
#[derive(Debug, Clone)]
pub struct Options {
    pub config: Option<PathBuf>,
    pub overrides: PartialConfig,
    pub json: bool,
    pub quiet: bool,
    pub verbose: u8,
}

impl Options {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let overrides = PartialConfig {
            table_count: matches.get_one::<usize>("tables").copied(),
            seats_per_table: matches.get_one::<usize>("seats").copied(),
            think_max: matches.get_one::<u64>("think-max").copied(),
            eat_max: matches.get_one::<u64>("eat-max").copied(),
            settle_delay: matches.get_one::<u64>("settle").copied(),
            poll_interval: matches.get_one::<u64>("poll").copied(),
            time_unit_ms: matches.get_one::<u64>("time-unit-ms").copied(),
            seed: matches.get_one::<u64>("seed").copied(),
            max_runtime: matches.get_one::<u64>("max-runtime").copied(),
            shutdown_grace_ms: None,
        };
        Self {
            config: matches.get_one::<PathBuf>("config").cloned(),
            overrides,
            json: matches.get_flag("json"),
            quiet: matches.get_flag("quiet"),
            verbose: matches.get_count("verbose"),
        }
    }
}
