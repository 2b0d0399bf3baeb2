//! MessagePack dump files: a single map from binary keys to binary values, in key order.

use std::io::Read;
use std::io::Write;

use anyhow::Result;
use levelcli_kv::Entry;
use levelcli_kv::KV;
use levelcli_kv::KeyRange;

/// Write every entry of `kv` to `out`. Returns the number of entries written.
pub fn dump<K: KV, W: Write>(kv: &K, out: &mut W) -> Result<usize> {
    let entries = kv.range(&KeyRange::all())?;
    write_dump(&entries, out)?;
    Ok(entries.len())
}

pub fn write_dump<W: Write>(entries: &[Entry], out: &mut W) -> Result<()> {
    let len = u32::try_from(entries.len())
        .map_err(|_| anyhow::anyhow!("too many entries to dump: {}", entries.len()))?;
    rmp::encode::write_map_len(out, len)?;
    for entry in entries {
        rmp::encode::write_bin(out, &entry.key)?;
        rmp::encode::write_bin(out, &entry.value)?;
    }
    Ok(())
}

/// Read a dump written by [`write_dump`].
pub fn read_dump<R: Read>(mut input: R) -> Result<Vec<Entry>> {
    let len = rmp::decode::read_map_len(&mut input)
        .map_err(|e| anyhow::anyhow!("corrupted dump: {e}"))?;
    log::debug!("reading {len} entries");
    let mut entries = Vec::new();
    for _ in 0..len {
        let key = read_bin(&mut input)?;
        let value = read_bin(&mut input)?;
        entries.push(Entry { key, value });
    }
    Ok(entries)
}

/// Read a dump from `input` and write it to `kv` in one batch.
pub fn load<K: KV, R: Read>(kv: &K, input: R) -> Result<usize> {
    let entries = read_dump(input)?;
    kv.write_batch(&entries)?;
    Ok(entries.len())
}

fn read_bin<R: Read>(input: &mut R) -> Result<Vec<u8>> {
    let len = rmp::decode::read_bin_len(input).map_err(|e| anyhow::anyhow!("corrupted dump: {e}"))?;
    let mut buf = Vec::new();
    input.take(u64::from(len)).read_to_end(&mut buf)?;
    if buf.len() != len as usize {
        anyhow::bail!("corrupted dump: truncated entry");
    }
    Ok(buf)
}
