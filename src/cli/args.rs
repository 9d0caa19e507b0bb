//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};
use clap_complete::Shell;

use crate::config::KeyKind;

/// Unbalanced binary search tree: build, inspect and script trees of ordered keys
#[derive(Parser, Debug)]
#[command(name = "bstree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (repeat for more: -dd, -ddd)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Settings file (layered over the global config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Key type (overrides settings)
    #[arg(short = 'k', long = "keys", value_enum, global = true)]
    pub key_kind: Option<KeyKind>,

    /// Generate shell completions
    #[arg(long = "completion", value_enum)]
    pub generator: Option<Shell>,

    /// Print author and version
    #[arg(long)]
    pub info: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Insert keys and print them in order
    Build {
        /// Keys to insert, duplicates are ignored
        #[arg(required = true, allow_negative_numbers = true)]
        keys: Vec<String>,
    },

    /// Insert keys and print size, height, min and max
    Stats {
        /// Keys to insert, duplicates are ignored
        #[arg(required = true, allow_negative_numbers = true)]
        keys: Vec<String>,
    },

    /// Insert keys and show the tree shape
    Tree {
        /// Keys to insert, duplicates are ignored
        #[arg(required = true, allow_negative_numbers = true)]
        keys: Vec<String>,
    },

    /// Execute an operation script
    Run {
        /// Script file, one command per line
        #[arg(value_hint = ValueHint::FilePath)]
        script: PathBuf,
    },
}
