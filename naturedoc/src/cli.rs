//! Command-line interface definitions for naturedoc

use clap::{Args, Parser, Subcommand, ValueEnum};
use naturedoc::renderer::AlignmentMode;
use std::path::PathBuf;

/// How image alignment is written, overriding the configuration
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AlignmentArg {
    /// `class="align-*"` attributes for the site stylesheet
    Class,
    /// Inline `style` attributes
    Style,
}

impl From<AlignmentArg> for AlignmentMode {
    fn from(arg: AlignmentArg) -> Self {
        match arg {
            AlignmentArg::Class => AlignmentMode::Class,
            AlignmentArg::Style => AlignmentMode::Style,
        }
    }
}

/// CLI structure for the naturedoc application
#[derive(Parser)]
#[command(name = "naturedoc")]
#[command(version)]
#[command(about = "Rich-text content pipeline for Nature Magazine articles", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./naturedoc.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Where stored content is read from
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Content file, or `-` for stdin (the default)
    #[arg(value_name = "FILE", conflicts_with = "article")]
    pub input: Option<PathBuf>,

    /// Read the content of this article from the configured store
    #[arg(short, long, value_name = "ID")]
    pub article: Option<String>,
}

/// Available subcommands for naturedoc
#[derive(Subcommand)]
pub enum Commands {
    /// Create a naturedoc.toml with default settings
    Init {
        /// Directory to initialize (defaults to current directory)
        path: Option<PathBuf>,

        /// Overwrite an existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Render stored content to HTML
    Render {
        #[command(flatten)]
        source: InputArgs,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Wrap the fragment in a complete HTML page
        #[arg(long)]
        standalone: bool,

        /// How image alignment is written
        #[arg(long, value_enum)]
        alignment: Option<AlignmentArg>,
    },

    /// Rewrite stored content in the current encoding
    Normalize {
        #[command(flatten)]
        source: InputArgs,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Indent the output
        #[arg(long)]
        pretty: bool,
    },

    /// Report how stored content is read and what had to be repaired
    Check {
        #[command(flatten)]
        source: InputArgs,

        /// Fail if anything was repaired or dropped
        #[arg(long)]
        strict: bool,
    },

    /// Re-encode every article in the store that is not yet current
    Migrate {
        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// List the articles in the store
    List,
}
