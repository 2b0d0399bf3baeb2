use std::fs::File;
use std::fs::OpenOptions;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context as _;
use anyhow::Result;
use levelcli_kv::Entry;
use levelcli_kv::KV;
use levelcli_kv::KeyOrder;
use levelcli_kv::KeyRange;
use levelcli_kv::LevelDbKV;
use levelcli_kv::OpenMode;

use super::*;

/// Appended to the database directory name to name the dump `compact` keeps while it
/// rewrites the store. LevelDB refuses to open a directory holding files it did not write, so
/// the backup sits beside the directory.
pub const BACKUP_SUFFIX: &str = ".leveldb.bak";

/// Where and how a command opens the database.
#[derive(Debug, Clone)]
pub struct Context {
    pub dbpath: PathBuf,
    pub order: KeyOrder,
}

impl Context {
    pub fn new(dbpath: impl Into<PathBuf>, order: KeyOrder) -> Self {
        Self {
            dbpath: dbpath.into(),
            order,
        }
    }

    pub fn open(&self, mode: OpenMode) -> Result<LevelDbKV> {
        LevelDbKV::open(&self.dbpath, self.order, mode)
    }
}

/// Run a parsed command line against stdin and stdout.
///
/// A LOCK file left behind by a failed command is removed unless it was there before.
pub fn run(cli: Cli) -> Result<()> {
    let context = Context::new(&cli.dbpath, cli.order());
    let lock = cli.dbpath.join("LOCK");
    let lock_existed = lock.exists();

    let stdin = std::io::stdin().lock();
    let stdout = BufWriter::new(std::io::stdout().lock());
    let result = execute(&context, cli.command.unwrap_or_default(), stdin, stdout);
    if result.is_err() && !lock_existed && lock.exists() {
        if let Err(e) = std::fs::remove_file(&lock) {
            log::warn!("failed to remove {}: {e}", lock.display());
        }
    }
    result
}

pub fn execute<R: Read, W: Write>(
    context: &Context,
    command: Command,
    mut input: R,
    mut output: W,
) -> Result<()> {
    log::debug!("{command:?} on {}", context.dbpath.display());
    match command {
        Command::Init => {
            context.open(OpenMode::Create)?;
        }
        Command::Get { format, key } => {
            let key = format.decode(&key)?;
            let kv = context.open(OpenMode::Existing)?;
            output.write_all(&get(&kv, &key)?)?;
        }
        Command::Put { format, key, value } => {
            let key = format.decode(&key)?;
            let value = match value {
                Some(value) => format.decode(&value)?,
                None => {
                    let mut value = Vec::new();
                    input.read_to_end(&mut value)?;
                    value
                }
            };
            let kv = context.open(OpenMode::Existing)?;
            kv.put(&key, &value)?;
            kv.flush()?;
        }
        Command::Delete { format, key } => {
            let key = format.decode(&key)?;
            let kv = context.open(OpenMode::Existing)?;
            kv.delete(&key)?;
            kv.flush()?;
        }
        Command::Keys { format, range } => {
            let range = range.key_range(context.order)?;
            let kv = context.open(OpenMode::Existing)?;
            let printer = Printer::new(format, PrettyOptions::default());
            keys(&kv, &range, printer, &mut output)?;
        }
        Command::Show {
            format,
            range,
            no_json,
            no_truncate,
        } => {
            let range = range.key_range(context.order)?;
            let kv = context.open(OpenMode::Existing)?;
            let key_printer = Printer::new(
                format,
                PrettyOptions {
                    quoting: true,
                    ..Default::default()
                },
            );
            let value_printer = Printer::new(
                format,
                PrettyOptions {
                    quoting: true,
                    truncate: !no_truncate,
                    parse_json: !no_json,
                },
            );
            show(&kv, &range, key_printer, value_printer, &mut output)?;
        }
        Command::Dump { no_clobber, file } => {
            let kv = context.open(OpenMode::Existing)?;
            let count = match stdio_path(file) {
                None => dump(&kv, &mut output)?,
                Some(path) => {
                    let mut out = BufWriter::new(create_dump_file(&path, no_clobber)?);
                    let count = dump(&kv, &mut out)?;
                    out.flush()?;
                    count
                }
            };
            log::debug!("dumped {count} entries");
        }
        Command::Load { file } => {
            let file = stdio_path(file)
                .map(|path| {
                    File::open(&path).with_context(|| format!("failed to open {}", path.display()))
                })
                .transpose()?;
            let kv = context.open(OpenMode::CreateIfMissing)?;
            let count = match file {
                None => load(&kv, &mut input)?,
                Some(file) => load(&kv, BufReader::new(file))?,
            };
            kv.flush()?;
            log::debug!("loaded {count} entries");
        }
        Command::Compact => compact(context)?,
        Command::Destroy { dry_run } => {
            destroy(&context.dbpath, dry_run, &mut output)?;
        }
    }
    output.flush()?;
    Ok(())
}

pub fn get<K: KV>(kv: &K, key: &[u8]) -> Result<Vec<u8>> {
    match kv.get(key)? {
        Some(value) => Ok(value),
        None => anyhow::bail!("not found"),
    }
}

/// Print each key in `range` on its own line.
pub fn keys<K: KV, W: Write>(
    kv: &K,
    range: &KeyRange,
    printer: Printer,
    out: &mut W,
) -> Result<()> {
    kv.scan(range, |key, _| {
        printer.write(out, key)?;
        out.write_all(b"\n")?;
        Ok(true)
    })
}

/// Print each entry in `range` as `key: value`.
pub fn show<K: KV, W: Write>(
    kv: &K,
    range: &KeyRange,
    key_printer: Printer,
    value_printer: Printer,
    out: &mut W,
) -> Result<()> {
    kv.scan(range, |key, value| {
        key_printer.write(out, key)?;
        out.write_all(b": ")?;
        value_printer.write(out, value)?;
        out.write_all(b"\n")?;
        Ok(true)
    })
}

/// Where `compact` writes its backup for `dbpath`.
pub fn backup_path(dbpath: &Path) -> Result<PathBuf> {
    let dbpath = std::fs::canonicalize(dbpath)
        .with_context(|| format!("database not found: {}", dbpath.display()))?;
    let (Some(parent), Some(name)) = (dbpath.parent(), dbpath.file_name()) else {
        anyhow::bail!("no place for a backup beside {}", dbpath.display());
    };
    let mut name = name.to_os_string();
    name.push(BACKUP_SUFFIX);
    Ok(parent.join(name))
}

/// Rewrite the database: read every entry, save them to the [`backup_path`] file, remove the
/// store files and write the entries back. The backup is removed once the store is rebuilt,
/// or right away if the entries could not be read.
pub fn compact(context: &Context) -> Result<()> {
    let path = backup_path(&context.dbpath)?;
    let mut backup = create_exclusive(&path)?;
    let entries = match back_up(context, &mut backup) {
        Ok(entries) => entries,
        Err(e) => {
            drop(backup);
            if let Err(e) = std::fs::remove_file(&path) {
                log::warn!("failed to remove {}: {e}", path.display());
            }
            return Err(e);
        }
    };
    drop(backup);
    log::debug!("backed up {} entries to {}", entries.len(), path.display());

    destroy(&context.dbpath, false, &mut std::io::sink())?;
    {
        let kv = context.open(OpenMode::CreateIfMissing)?;
        kv.write_batch(&entries)?;
        kv.flush()?;
    }
    std::fs::remove_file(&path)
        .with_context(|| format!("failed to remove {}", path.display()))?;
    Ok(())
}

fn back_up(context: &Context, backup: &mut File) -> Result<Vec<Entry>> {
    let entries = context.open(OpenMode::Existing)?.range(&KeyRange::all())?;
    let mut out = BufWriter::new(&mut *backup);
    write_dump(&entries, &mut out)?;
    out.flush()?;
    drop(out);
    backup.sync_all()?;
    Ok(entries)
}

/// `None` and `-` both mean stdin or stdout.
fn stdio_path(file: Option<PathBuf>) -> Option<PathBuf> {
    file.filter(|path| path.as_os_str() != "-")
}

fn create_dump_file(path: &Path, no_clobber: bool) -> Result<File> {
    let file = if no_clobber {
        OpenOptions::new().write(true).create_new(true).open(path)
    } else {
        File::create(path)
    };
    file.with_context(|| format!("failed to create {}", path.display()))
}

fn create_exclusive(path: &Path) -> Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options
        .open(path)
        .with_context(|| format!("failed to create {}", path.display()))
}
