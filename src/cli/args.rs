//! CLI argument parsing

use crate::logging::LogFormat;
use crate::output::{DiagramKind, OutputFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Extract code structure and render it as diagrams
#[derive(Parser, Debug)]
#[command(name = "codevision")]
#[command(about = "Extract code structure and render it as diagrams")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a project and write diagrams
    Analyze {
        /// Path to the project to analyze
        path: PathBuf,

        /// Output directory (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Config file path (defaults to ./codevision.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Glob patterns to exclude (can be repeated)
        #[arg(long)]
        exclude: Vec<String>,

        /// Glob patterns to include, replacing the configured ones (can be repeated)
        #[arg(long)]
        include: Vec<String>,

        /// Diagram kinds to render: class, dependency, component (can be repeated)
        #[arg(short, long = "kind")]
        kind: Vec<DiagramKind>,

        /// Output formats: mermaid, dot, plantuml, json (can be repeated)
        #[arg(short, long = "format")]
        format: Vec<OutputFormat>,

        /// Refuse to render diagrams with more nodes than this
        #[arg(long)]
        max_nodes: Option<usize>,

        /// Print diagrams to stdout instead of writing files
        #[arg(long)]
        stdout: bool,

        /// Extract files one at a time
        #[arg(long)]
        sequential: bool,

        /// Log filter directive, e.g. debug or "info,codevision::parser=trace"
        #[arg(long)]
        log_level: Option<String>,

        /// Log format: compact, pretty, json
        #[arg(long)]
        log_format: Option<LogFormat>,

        /// Verbose output with a progress bar
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show version information
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_defaults() {
        let args = Args::try_parse_from(["codevision", "analyze", "./src"]).unwrap();
        match args.command {
            Command::Analyze {
                path,
                output,
                kind,
                format,
                include,
                stdout,
                sequential,
                ..
            } => {
                assert_eq!(path, PathBuf::from("./src"));
                assert_eq!(output, None);
                assert!(kind.is_empty());
                assert!(format.is_empty());
                assert!(include.is_empty());
                assert!(!stdout);
                assert!(!sequential);
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_analyze_with_options() {
        let args = Args::try_parse_from([
            "codevision", "analyze", "./project",
            "--output", "/tmp/diagrams",
            "--exclude", "tests/**",
            "--include", "**/*.py",
            "--include", "**/*.ts",
            "--config", "custom.toml",
            "--kind", "class",
            "--kind", "deps",
            "--format", "graphviz",
            "--max-nodes", "40",
            "--log-level", "debug",
            "--log-format", "json",
            "--stdout",
            "--sequential",
            "--verbose",
        ])
        .unwrap();

        match args.command {
            Command::Analyze {
                path,
                output,
                config,
                exclude,
                include,
                kind,
                format,
                max_nodes,
                stdout,
                sequential,
                log_level,
                log_format,
                verbose,
            } => {
                assert_eq!(path, PathBuf::from("./project"));
                assert_eq!(output, Some(PathBuf::from("/tmp/diagrams")));
                assert_eq!(config, Some(PathBuf::from("custom.toml")));
                assert_eq!(exclude, vec!["tests/**".to_string()]);
                assert_eq!(include, vec!["**/*.py".to_string(), "**/*.ts".to_string()]);
                assert_eq!(kind, vec![DiagramKind::Class, DiagramKind::Dependency]);
                assert_eq!(format, vec![OutputFormat::Dot]);
                assert_eq!(max_nodes, Some(40));
                assert_eq!(log_level.as_deref(), Some("debug"));
                assert_eq!(log_format, Some(LogFormat::Json));
                assert!(stdout);
                assert!(sequential);
                assert!(verbose);
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_rejects_unknown_format() {
        let result = Args::try_parse_from(["codevision", "analyze", ".", "--format", "svg"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_unknown_kind() {
        let result = Args::try_parse_from(["codevision", "analyze", ".", "--kind", "sequence"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_version_command() {
        let args = Args::try_parse_from(["codevision", "version"]).unwrap();
        assert!(matches!(args.command, Command::Version));
    }
}
