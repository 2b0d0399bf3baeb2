mod commands;
mod dump;

use anyhow::Result;
use levelcli_kv::KeyOrder;

use crate::*;

/// A fresh database with `entries` written to it, in the `db` directory of a tempdir. The
/// rest of the tempdir is free for dump files and backups.
pub fn database(order: KeyOrder, entries: &[(&[u8], &[u8])]) -> Result<(tempfile::TempDir, Context)> {
    let dir = tempfile::tempdir()?;
    let context = Context::new(dir.path().join("db"), order);
    let kv = context.open(levelcli_kv::OpenMode::Create)?;
    for (key, value) in entries {
        levelcli_kv::KV::put(&kv, key, value)?;
    }
    levelcli_kv::KV::flush(&kv)?;
    Ok((dir, context))
}

/// Run `command` with empty stdin and return stdout.
pub fn output(context: &Context, command: Command) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    execute(context, command, std::io::empty(), &mut out)?;
    Ok(out)
}
