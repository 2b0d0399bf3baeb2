//! Inspect and edit LevelDB databases from the command line, including the IndexedDB stores
//! Chromium keeps under the `idb_cmp1` key order.
mod args;
mod commands;
mod dump;
mod escape;
mod files;
mod printer;

pub use args::*;
pub use commands::*;
pub use dump::*;
pub use escape::*;
pub use files::*;
pub use printer::*;

#[cfg(test)]
mod test;
