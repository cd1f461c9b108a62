//! Command-line arguments.

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "ollama-cors-proxy")]
#[command(
    about = "Reverse proxy that adds permissive CORS headers in front of an Ollama server",
    long_about = None
)]
pub struct Cli {
    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Environment file loaded before reading variables
    #[arg(long, default_value = ".env")]
    pub env_file: PathBuf,

    /// Log level used when RUST_LOG is not set
    #[arg(short, long, default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["ollama-cors-proxy"]);
        assert!(cli.config.is_none());
        assert_eq!(cli.env_file, PathBuf::from(".env"));
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn test_flags() {
        let cli = Cli::parse_from([
            "ollama-cors-proxy",
            "--config",
            "proxy.toml",
            "--env-file",
            "dev.env",
            "-l",
            "debug",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("proxy.toml")));
        assert_eq!(cli.env_file, PathBuf::from("dev.env"));
        assert_eq!(cli.log_level, "debug");
    }

    #[test]
    fn test_command_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
