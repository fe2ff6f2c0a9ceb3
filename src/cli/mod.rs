//! CLI module - Command-line interface for Bibliophile
//!
//! Subcommands cover the HTTP server and the content maintenance jobs.

mod commands;

use clap::{Parser, Subcommand};

/// Bibliophile - curated reading lists for niche topics
#[derive(Parser)]
#[command(name = "bibliophile")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    #[command(alias = "web")]
    Serve,

    /// Generate a collection for a topic and print it as JSON
    #[command(alias = "g")]
    Generate {
        /// Niche topic, e.g. "Stoic philosophy for engineers"
        #[arg(required = true)]
        topic: Vec<String>,
    },

    /// Render sitemap.xml from the content document
    Sitemap {
        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<String>,
    },

    /// Refresh cover images of every catalog item
    #[command(alias = "fix-covers")]
    Covers,

    /// Move catalog purchase links onto the current affiliate tag
    #[command(alias = "update-affiliate")]
    Retag,

    /// Regenerate one niche of the catalog
    Refresh {
        /// Niche slug; a random niche when omitted
        #[arg(long)]
        slug: Option<String>,
        /// Print the result without saving
        #[arg(long)]
        dry_run: bool,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
