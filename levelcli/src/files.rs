use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::Context as _;
use anyhow::Result;
use regex::Regex;

static LEVELDB_FILENAME_RE: OnceLock<Regex> = OnceLock::new();

/// Whether `name` is a file LevelDB creates in a database directory.
pub fn is_leveldb_file(name: &str) -> bool {
    LEVELDB_FILENAME_RE
        .get_or_init(|| {
            Regex::new(r"^(?:LOCK|LOG(?:\.old)?|CURRENT(?:\.bak|\.\d+)?|MANIFEST-\d+|\d+\.(?:ldb|log|sst|tmp))$")
                .expect("valid regex")
        })
        .is_match(name)
}

/// Remove the LevelDB files in `dbpath`, leaving anything else in place. With `dry_run` the
/// files are only listed on `out`. Returns the matched paths.
pub fn destroy<W: Write>(dbpath: &Path, dry_run: bool, out: &mut W) -> Result<Vec<PathBuf>> {
    let mut targets = Vec::new();
    for entry in std::fs::read_dir(dbpath)
        .with_context(|| format!("failed to read {}", dbpath.display()))?
    {
        let entry = entry?;
        if entry.file_name().to_str().is_some_and(is_leveldb_file) {
            targets.push(entry.path());
        }
    }
    targets.sort();

    for target in &targets {
        if dry_run {
            writeln!(out, "Would remove {}", target.display())?;
            continue;
        }
        log::debug!("removing {}", target.display());
        std::fs::remove_file(target)
            .with_context(|| format!("failed to remove {}", target.display()))?;
    }
    Ok(targets)
}
