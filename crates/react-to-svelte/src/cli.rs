//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};

/// Convert React components into Svelte single-file components.
#[derive(Debug, Parser)]
#[command(name = "react-to-svelte")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Component files or directories to convert (default: current directory)
    pub paths: Vec<Utf8PathBuf>,

    /// Path to the config file (default: reactToSvelte.conf.js or .json in the working directory)
    #[arg(long, short)]
    pub config: Option<Utf8PathBuf>,

    /// Directory generated components are written to (overrides `outputPath`)
    #[arg(long = "output-dir", short)]
    pub output_dir: Option<Utf8PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    pub output: OutputFormat,

    /// Print the generated components instead of writing them
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Glob patterns to ignore
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Watch mode
    #[arg(long)]
    pub watch: bool,

    /// Verbose logging
    #[arg(long, short)]
    pub verbose: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON report
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["react-to-svelte"]);
        assert!(args.paths.is_empty());
        assert_eq!(args.output, OutputFormat::Human);
        assert!(args.config.is_none());
        assert!(!args.dry_run);
        assert!(!args.watch);
    }

    #[test]
    fn test_all_flags() {
        let args = Args::parse_from([
            "react-to-svelte",
            "src/components",
            "src/Button.jsx",
            "--config",
            "conf/reactToSvelte.conf.js",
            "--output-dir",
            "svelte",
            "--output",
            "json",
            "--dry-run",
            "--ignore",
            "**/legacy/**",
            "--ignore",
            "**/*.stories.js",
            "--watch",
            "-v",
        ]);
        assert_eq!(
            args.paths,
            vec![
                Utf8PathBuf::from("src/components"),
                Utf8PathBuf::from("src/Button.jsx")
            ]
        );
        assert_eq!(
            args.config,
            Some(Utf8PathBuf::from("conf/reactToSvelte.conf.js"))
        );
        assert_eq!(args.output_dir, Some(Utf8PathBuf::from("svelte")));
        assert_eq!(args.output, OutputFormat::Json);
        assert!(args.dry_run);
        assert_eq!(args.ignore, vec!["**/legacy/**", "**/*.stories.js"]);
        assert!(args.watch);
        assert!(args.verbose);
    }
}
