//! Command-line configuration
//!
//! ```bash
//! httppost --post-file report.json --post-header pre.txt \
//!   -O reply.txt http://collector.example.net:8080/upload
//! ```
//!
//! `HTTPPOST_TIMEOUT` may be set instead of `--timeout`.

use crate::http::{self, ParsedUrl, PostJob};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// POST a file to an HTTP server and write the response body
#[derive(Debug, Clone, Parser)]
#[command(name = "httppost")]
#[command(version, about)]
pub struct Config {
    /// Target URL, http://host[:port][/path]
    pub url: String,

    /// Write the response body here instead of standard output
    #[arg(short = 'O', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// File whose contents form the request body
    #[arg(long = "post-file", value_name = "PATH")]
    pub post_file: PathBuf,

    /// File sent before the post file
    #[arg(long = "post-header", value_name = "PATH")]
    pub post_header: Option<PathBuf>,

    /// File sent after the post file
    #[arg(long = "post-footer", value_name = "PATH")]
    pub post_footer: Option<PathBuf>,

    /// Remove the post file after a successful exchange (header and footer are kept)
    #[arg(long = "delete-file")]
    pub delete_file: bool,

    /// Give up on connect, read or write after this many seconds
    #[arg(long, value_name = "SECONDS", env = "HTTPPOST_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Trace received header and chunk lines on standard error
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Build the job this configuration describes
    pub fn into_job(self) -> http::Result<PostJob> {
        let url = ParsedUrl::parse(&self.url)?;

        Ok(PostJob {
            url,
            post_file: self.post_file,
            post_header: self.post_header,
            post_footer: self.post_footer,
            output: self.output,
            delete_file: self.delete_file,
            timeout: self.timeout.map(Duration::from_secs),
        })
    }

    /// Log filter implied by the flags
    pub fn log_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        }
    }
}
