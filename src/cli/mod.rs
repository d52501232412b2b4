//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Args as ClapArgs, Parser, Subcommand};

/// Head-to-head latency and throughput comparison of two document-processing APIs
#[derive(Parser, Debug)]
#[command(name = "api-battle")]
#[command(version)]
#[command(about = "Compare latency and throughput of two functionally identical endpoints")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Endpoint A base URL (overrides config and environment)
    #[arg(long, global = true)]
    pub endpoint_a: Option<String>,

    /// Endpoint B base URL (overrides config and environment)
    #[arg(long, global = true)]
    pub endpoint_b: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Output format (table, json, json-pretty, csv, summary)
    #[arg(short, long, global = true)]
    pub format: Option<String>,

    /// Disable ANSI colors in table output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// One request per endpoint, compare self-reported processing time
    Single(SingleArgs),

    /// Concurrent batch per endpoint, compare requests per second
    Load(LoadArgs),

    /// Single-shot comparison of both endpoints followed by a load test
    Battle(BattleArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Where the document text comes from
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct DocumentArgs {
    /// Document text
    #[arg(short, long, conflicts_with = "file")]
    pub text: Option<String>,

    /// Read document text from a file (`-` for stdin)
    #[arg(long)]
    pub file: Option<String>,
}

/// Arguments for single command
#[derive(Parser, Debug)]
pub struct SingleArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    /// Endpoint(s) to benchmark: a, b or both
    #[arg(long, default_value = "both")]
    pub target: String,
}

/// Arguments for load command
#[derive(Parser, Debug)]
pub struct LoadArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    /// Requests per endpoint batch
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Run endpoint B's batch only after endpoint A's has settled
    #[arg(long)]
    pub sequential: bool,
}

/// Arguments for battle command
#[derive(Parser, Debug)]
pub struct BattleArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    /// Requests per endpoint batch
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Run endpoint B's batch only after endpoint A's has settled
    #[arg(long)]
    pub sequential: bool,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write an example configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "./api-battle.yaml")]
        output: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show effective configuration
    Show {
        /// Show environment variables instead
        #[arg(long)]
        env: bool,
    },

    /// Validate a configuration file
    Validate {
        /// File to validate (defaults to the first standard location)
        file: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_args() {
        let args = Args::parse_from([
            "api-battle",
            "single",
            "--text",
            "hello",
            "--target",
            "a",
        ]);
        match args.command {
            Command::Single(single) => {
                assert_eq!(single.document.text.as_deref(), Some("hello"));
                assert_eq!(single.target, "a");
            }
            _ => panic!("Expected Single command"),
        }
    }

    #[test]
    fn test_load_args_with_globals() {
        let args = Args::parse_from([
            "api-battle",
            "load",
            "--file",
            "doc.txt",
            "--batch-size",
            "100",
            "--sequential",
            "--endpoint-b",
            "http://10.0.0.2:8081",
            "--format",
            "json",
        ]);
        assert_eq!(args.endpoint_b.as_deref(), Some("http://10.0.0.2:8081"));
        assert_eq!(args.format.as_deref(), Some("json"));
        match args.command {
            Command::Load(load) => {
                assert_eq!(load.document.file.as_deref(), Some("doc.txt"));
                assert_eq!(load.batch_size, Some(100));
                assert!(load.sequential);
            }
            _ => panic!("Expected Load command"),
        }
    }

    #[test]
    fn test_text_and_file_conflict() {
        let result = Args::try_parse_from([
            "api-battle",
            "single",
            "--text",
            "x",
            "--file",
            "doc.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_init_defaults() {
        let args = Args::parse_from(["api-battle", "config", "init"]);
        match args.command {
            Command::Config(ConfigArgs {
                action: ConfigAction::Init { output, force },
            }) => {
                assert_eq!(output, "./api-battle.yaml");
                assert!(!force);
            }
            _ => panic!("Expected Config Init command"),
        }
    }
}
