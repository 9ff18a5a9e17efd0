use std::{fmt, fs, path::PathBuf, str::FromStr};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use url::Url;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log decisions to stderr (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Import the citation records at one or more Zenodo URLs
    Fetch {
        #[arg(value_name = "SRC", required = true)]
        from: Vec<Source>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Import every search result without prompting
        #[arg(long)]
        all: bool,

        /// Target schema has no dataset type; map datasets to documents
        #[arg(long)]
        no_dataset_type: bool,

        /// Per-request timeout in seconds
        #[arg(long, value_name = "SECS", default_value_t = 15)]
        timeout: u64,
    },
    /// Print what kind of page a URL is
    Detect {
        #[arg(value_name = "URL")]
        url: Url,

        /// Target schema has no dataset type; map datasets to documents
        #[arg(long)]
        no_dataset_type: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Biblatex,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Defines where we can get page URLs from, which can either be
///
/// - a single URL, or
/// - a file listing URLs, one per line.
///
/// The latter will be treated as a list of the former.
pub enum Source {
    Url(Url),
    File(PathBuf),
}

impl FromStr for Source {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Is this a path?
        if let Ok(path) = fs::canonicalize(s) {
            Ok(Source::File(path))
        }
        // No? Must be a URL then!
        else {
            Url::parse(s)
                .map(Source::Url)
                .map_err(|e| format!("not a file or URL: {s} ({e})"))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Url(url) => write!(f, "{url}"),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl Source {
    /// Expand into the URLs this source stands for. Blank lines and `#` comments are skipped.
    ///
    /// Only an unreadable file fails the whole source; a malformed line fails on its own.
    pub fn urls(&self) -> anyhow::Result<Vec<anyhow::Result<Url>>> {
        match self {
            Source::Url(url) => Ok(vec![Ok(url.clone())]),
            Source::File(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                Ok(text
                    .lines()
                    .enumerate()
                    .map(|(n, l)| (n + 1, l.trim()))
                    .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'))
                    .map(|(n, l)| {
                        Url::parse(l).with_context(|| {
                            format!("invalid URL {l:?} at {}:{n}", path.display())
                        })
                    })
                    .collect())
            }
        }
    }
}
