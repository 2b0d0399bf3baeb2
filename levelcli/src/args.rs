//! Command line definitions.

use std::path::PathBuf;

use anyhow::Context as _;
use anyhow::Result;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use levelcli_kv::KeyOrder;
use levelcli_kv::KeyRange;

use super::*;

/// A command-line interface for LevelDB
#[derive(Parser, Debug)]
#[command(name = "levelcli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the database directory
    #[arg(short, long, env = "DBPATH", default_value = ".", global = true)]
    pub dbpath: PathBuf,

    /// Open a Chromium IndexedDB database (idb_cmp1 key order)
    #[arg(short, long, global = true)]
    pub indexeddb: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    pub fn order(&self) -> KeyOrder {
        if self.indexeddb {
            KeyOrder::IndexedDb
        } else {
            KeyOrder::Bytewise
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a new database
    #[command(visible_alias = "i")]
    Init,

    /// Print the value of a key
    #[command(visible_alias = "g")]
    Get {
        #[command(flatten)]
        format: Encoding,
        key: String,
    },

    /// Store a value, read from stdin when VALUE is omitted
    #[command(visible_alias = "p")]
    Put {
        #[command(flatten)]
        format: Encoding,
        key: String,
        value: Option<String>,
    },

    /// Remove a key
    #[command(visible_alias = "d")]
    Delete {
        #[command(flatten)]
        format: Encoding,
        key: String,
    },

    /// List keys
    #[command(visible_alias = "k")]
    Keys {
        #[command(flatten)]
        format: Encoding,
        #[command(flatten)]
        range: RangeArgs,
    },

    /// List entries as `key: value`
    #[command(visible_alias = "s")]
    Show {
        #[command(flatten)]
        format: Encoding,
        #[command(flatten)]
        range: RangeArgs,
        /// Do not pretty-print JSON values
        #[arg(short = 'J', long)]
        no_json: bool,
        /// Do not truncate long values
        #[arg(short = 'w', long)]
        no_truncate: bool,
    },

    /// Write every entry as MessagePack to FILE or stdout
    Dump {
        /// Fail if FILE already exists
        #[arg(short = 'n', long)]
        no_clobber: bool,
        file: Option<PathBuf>,
    },

    /// Read a MessagePack dump from FILE or stdin into the database
    Load { file: Option<PathBuf> },

    /// Rewrite the database through a dump and load
    Compact,

    /// Remove the database files
    Destroy {
        /// Print the files that would be removed
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::Show {
            format: Encoding::default(),
            range: RangeArgs::default(),
            no_json: false,
            no_truncate: false,
        }
    }
}

/// How byte strings are read from and written to the command line.
#[derive(Args, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Encoding {
    /// Take arguments and print output verbatim
    #[arg(short, long, conflicts_with = "base64")]
    pub raw: bool,

    /// Take arguments and print output as base64
    #[arg(short, long)]
    pub base64: bool,
}

impl Encoding {
    pub fn decode(&self, arg: &str) -> Result<Vec<u8>> {
        if self.base64 {
            decode_base64(arg.as_bytes())
        } else if self.raw {
            Ok(arg.as_bytes().to_vec())
        } else {
            unescape(arg.as_bytes())
        }
    }
}

/// Key range selection for `keys` and `show`. A prefix takes precedence over start and end.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeArgs {
    /// Only keys starting with PREFIX
    #[arg(short = 'p', long)]
    pub prefix: Option<String>,
    /// Like --prefix, without escape processing
    #[arg(short = 'P', long)]
    pub prefix_raw: Option<String>,
    /// Like --prefix, base64 encoded
    #[arg(long)]
    pub prefix_base64: Option<String>,

    /// First key to list
    #[arg(short = 's', long)]
    pub start: Option<String>,
    /// Like --start, without escape processing
    #[arg(short = 'S', long)]
    pub start_raw: Option<String>,
    /// Like --start, base64 encoded
    #[arg(long)]
    pub start_base64: Option<String>,

    /// Stop before this key
    #[arg(short = 'e', long)]
    pub end: Option<String>,
    /// Like --end, without escape processing
    #[arg(short = 'E', long)]
    pub end_raw: Option<String>,
    /// Like --end, base64 encoded
    #[arg(long)]
    pub end_base64: Option<String>,
}

impl RangeArgs {
    pub fn key_range(&self, order: KeyOrder) -> Result<KeyRange> {
        let prefix = option_bytes(
            "prefix",
            &self.prefix,
            &self.prefix_raw,
            &self.prefix_base64,
        )?;
        if let Some(prefix) = prefix {
            return order.prefix_range(&prefix);
        }

        let start = option_bytes("start", &self.start, &self.start_raw, &self.start_base64)?;
        let limit = option_bytes("end", &self.end, &self.end_raw, &self.end_base64)?;
        Ok(KeyRange::new(start, limit).clamp(order))
    }
}

/// Resolve one of the three spellings of option `name`, base64 first.
fn option_bytes(
    name: &str,
    escaped: &Option<String>,
    raw: &Option<String>,
    base64: &Option<String>,
) -> Result<Option<Vec<u8>>> {
    if let Some(arg) = base64 {
        return decode_base64(arg.as_bytes())
            .map(Some)
            .with_context(|| format!("option --{name}-base64"));
    }
    if let Some(arg) = raw {
        return Ok(Some(arg.as_bytes().to_vec()));
    }
    if let Some(arg) = escaped {
        return unescape(arg.as_bytes())
            .map(Some)
            .with_context(|| format!("option --{name}"));
    }
    Ok(None)
}
