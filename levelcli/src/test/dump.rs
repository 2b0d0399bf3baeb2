use levelcli_kv::Entry;
use levelcli_kv::KV;
use levelcli_kv::KeyRange;
use levelcli_kv::MemoryKV;

use super::*;

#[test]
fn dump_is_a_msgpack_map() -> Result<()> {
    let kv = MemoryKV::new(KeyOrder::Bytewise);
    kv.put(b"b", b"2")?;
    kv.put(b"a", b"1")?;

    let mut out = Vec::new();
    assert_eq!(dump(&kv, &mut out)?, 2);
    // fixmap of 2, then bin8 key/value pairs in key order
    assert_eq!(
        out,
        [
            0x82, 0xc4, 0x01, b'a', 0xc4, 0x01, b'1', 0xc4, 0x01, b'b', 0xc4, 0x01, b'2'
        ]
    );
    Ok(())
}

#[test]
fn load_restores_every_entry() -> Result<()> {
    let source = MemoryKV::new(KeyOrder::Bytewise);
    let mut entries = (0..200)
        .map(|i| Entry {
            key: rand::random::<[u8; 12]>().to_vec(),
            value: vec![0xab; i * 3],
        })
        .collect::<Vec<_>>();
    source.write_batch(&entries)?;

    let mut out = Vec::new();
    dump(&source, &mut out)?;

    let target = MemoryKV::new(KeyOrder::Bytewise);
    assert_eq!(load(&target, out.as_slice())?, entries.len());
    entries.sort_by(|a, b| a.key.cmp(&b.key));
    assert_eq!(target.range(&KeyRange::all())?, entries);
    Ok(())
}

#[test]
fn empty_dump() -> Result<()> {
    let kv = MemoryKV::new(KeyOrder::IndexedDb);
    let mut out = Vec::new();
    assert_eq!(dump(&kv, &mut out)?, 0);
    assert_eq!(out, [0x80]);
    assert!(read_dump(out.as_slice())?.is_empty());
    Ok(())
}

#[test]
fn corrupted_dumps() {
    // not a map
    assert!(read_dump(&[0xc4, 0x00][..]).is_err());
    // map shorter than its header
    assert!(read_dump(&[0x81, 0xc4, 0x01, b'a'][..]).is_err());
    // bin longer than the input
    assert!(read_dump(&[0x81, 0xc4, 0x05, b'a', 0xc4, 0x00][..]).is_err());
    assert!(read_dump(std::io::empty()).is_err());
}
