use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use levelcli_idb::EncodedValue;
use levelcli_idb::KeyPrefix;
use levelcli_kv::KV;
use levelcli_kv::OpenMode;

use super::*;

fn get_cmd(key: &str) -> Command {
    Command::Get {
        format: Encoding::default(),
        key: key.into(),
    }
}

fn put_cmd(key: &str, value: &str) -> Command {
    Command::Put {
        format: Encoding::default(),
        key: key.into(),
        value: Some(value.into()),
    }
}

#[test]
fn init_once() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let context = Context::new(dir.path().join("db"), KeyOrder::Bytewise);

    let err = output(&context, get_cmd("a")).unwrap_err();
    assert!(err.to_string().starts_with("database not found"));

    output(&context, Command::Init)?;
    let err = output(&context, Command::Init).unwrap_err();
    assert!(err.to_string().starts_with("database already exists"));
    Ok(())
}

#[test]
fn put_get_delete() -> Result<()> {
    let (_dir, context) = database(KeyOrder::Bytewise, &[])?;

    output(&context, put_cmd(r"k\x00", r"v\n"))?;
    assert_eq!(output(&context, get_cmd(r"k\0"))?, b"v\n");

    let err = output(&context, get_cmd("k")).unwrap_err();
    assert_eq!(err.to_string(), "not found");

    output(
        &context,
        Command::Delete {
            format: Encoding::default(),
            key: r"k\0".into(),
        },
    )?;
    assert!(output(&context, get_cmd(r"k\0")).is_err());

    let base64 = Encoding {
        raw: false,
        base64: true,
    };
    output(
        &context,
        Command::Put {
            format: base64,
            key: "AAE=".into(),
            value: Some("/w".into()),
        },
    )?;
    let value = output(
        &context,
        Command::Get {
            format: base64,
            key: "AAE".into(),
        },
    )?;
    assert_eq!(value, [0xff]);
    Ok(())
}

#[test]
fn put_reads_value_from_stdin() -> Result<()> {
    let (_dir, context) = database(KeyOrder::Bytewise, &[])?;
    let command = Command::Put {
        format: Encoding::default(),
        key: "key".into(),
        value: None,
    };
    execute(&context, command, &b"\x00from stdin\n"[..], Vec::new())?;
    assert_eq!(output(&context, get_cmd("key"))?, b"\x00from stdin\n");
    Ok(())
}

#[test]
fn keys_formats() -> Result<()> {
    let (_dir, context) = database(
        KeyOrder::Bytewise,
        &[(b"b\n", b"2"), (b"a", b"1"), (b"c", b"3")],
    )?;

    let keys = output(
        &context,
        Command::Keys {
            format: Encoding::default(),
            range: RangeArgs::default(),
        },
    )?;
    assert_eq!(String::from_utf8(keys)?, "a\nb\\n\nc\n");

    let keys = output(
        &context,
        Command::Keys {
            format: Encoding {
                raw: true,
                base64: false,
            },
            range: RangeArgs {
                start: Some("b".into()),
                ..Default::default()
            },
        },
    )?;
    assert_eq!(keys, b"b\n\nc\n");

    let keys = output(
        &context,
        Command::Keys {
            format: Encoding {
                raw: false,
                base64: true,
            },
            range: RangeArgs {
                prefix: Some("a".into()),
                ..Default::default()
            },
        },
    )?;
    assert_eq!(keys, b"YQ==\n");

    let keys = output(
        &context,
        Command::Keys {
            format: Encoding::default(),
            range: RangeArgs {
                start: Some("c".into()),
                end: Some("a".into()),
                ..Default::default()
            },
        },
    )?;
    assert!(keys.is_empty());
    Ok(())
}

#[test]
fn show_entries() -> Result<()> {
    let long = "x".repeat(150);
    let (_dir, context) = database(
        KeyOrder::Bytewise,
        &[
            (b"\x00k", b"v"),
            (b"json", br#"{"b":[1,2],"a":"\"q\""}"#),
            (b"long", long.as_bytes()),
            (b"number", b"1"),
        ],
    )?;

    let shown = String::from_utf8(output(&context, Command::default())?)?;
    let want = format!(
        "\"\\0k\": \"v\"\n\"json\": {}\n\"long\": \"{}...\"\n\"number\": 1\n",
        "{\n  \"a\": \"\\\"q\\\"\",\n  \"b\": [\n    1,\n    2\n  ]\n}",
        "x".repeat(TRUNCATE_COLUMNS + 1),
    );
    assert_eq!(shown, want);

    let shown = output(
        &context,
        Command::Show {
            format: Encoding::default(),
            range: RangeArgs {
                prefix: Some("long".into()),
                ..Default::default()
            },
            no_json: true,
            no_truncate: true,
        },
    )?;
    assert_eq!(String::from_utf8(shown)?, format!("\"long\": \"{long}\"\n"));

    let shown = output(
        &context,
        Command::Show {
            format: Encoding::default(),
            range: RangeArgs {
                prefix: Some("number".into()),
                ..Default::default()
            },
            no_json: true,
            no_truncate: false,
        },
    )?;
    assert_eq!(shown, b"\"number\": \"1\"\n");
    Ok(())
}

#[test]
fn dump_and_load() -> Result<()> {
    let (dir, context) = database(KeyOrder::Bytewise, &[(b"a", b"1"), (b"b", b"2")])?;
    let path = dir.path().join("dump.msgpack");

    output(
        &context,
        Command::Dump {
            no_clobber: true,
            file: Some(path.clone()),
        },
    )?;
    let err = output(
        &context,
        Command::Dump {
            no_clobber: true,
            file: Some(path.clone()),
        },
    )
    .unwrap_err();
    assert!(err.to_string().starts_with("failed to create"));

    let stdout = output(
        &context,
        Command::Dump {
            no_clobber: false,
            file: Some("-".into()),
        },
    )?;
    assert_eq!(std::fs::read(&path)?, stdout);

    // load creates the target when it is missing
    let target = Context::new(dir.path().join("copy"), KeyOrder::Bytewise);
    output(&target, Command::Load { file: Some(path) })?;
    assert_eq!(output(&target, get_cmd("b"))?, b"2");

    let third = Context::new(dir.path().join("third"), KeyOrder::Bytewise);
    execute(&third, Command::Load { file: None }, stdout.as_slice(), Vec::new())?;
    assert_eq!(output(&third, get_cmd("a"))?, b"1");

    // the dump files never land in a store directory, so the stores still open
    assert_eq!(output(&context, get_cmd("a"))?, b"1");
    Ok(())
}

#[test]
fn load_missing_file_creates_nothing() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let target = Context::new(dir.path().join("db"), KeyOrder::Bytewise);
    let err = output(
        &target,
        Command::Load {
            file: Some(dir.path().join("missing.msgpack")),
        },
    )
    .unwrap_err();
    assert!(err.to_string().starts_with("failed to open"), "{err}");
    assert!(!target.dbpath.exists());
    Ok(())
}

#[test]
fn compact_keeps_entries() -> Result<()> {
    let entries = (0..50u8)
        .map(|i| (vec![i], vec![i; 100]))
        .collect::<Vec<_>>();
    let (_dir, context) = database(KeyOrder::Bytewise, &[])?;
    {
        let kv = context.open(OpenMode::Existing)?;
        for (key, value) in &entries {
            kv.put(key, value)?;
        }
        kv.delete(&[7])?;
        kv.flush()?;
    }

    output(&context, Command::Compact)?;
    assert!(!backup_path(&context.dbpath)?.exists());

    let kv = context.open(OpenMode::Existing)?;
    assert_eq!(kv.count(&levelcli_kv::KeyRange::all())?, 49);
    assert!(kv.get(&[7])?.is_none());
    assert_eq!(kv.get(&[8])?, Some(vec![8; 100]));
    Ok(())
}

#[test]
fn compact_refuses_existing_backup() -> Result<()> {
    let (dir, context) = database(KeyOrder::Bytewise, &[(b"a", b"1")])?;
    let backup = backup_path(&context.dbpath)?;
    assert_eq!(backup, dir.path().canonicalize()?.join("db.leveldb.bak"));
    std::fs::write(&backup, b"keep")?;
    assert!(output(&context, Command::Compact).is_err());
    assert_eq!(std::fs::read(&backup)?, b"keep");
    assert_eq!(output(&context, get_cmd("a"))?, b"1");
    Ok(())
}

#[test]
fn failed_compact_leaves_no_backup() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let context = Context::new(dir.path().join("db"), KeyOrder::Bytewise);
    std::fs::create_dir(&context.dbpath)?;

    let err = output(&context, Command::Compact).unwrap_err();
    assert!(err.to_string().starts_with("database not found"), "{err}");
    assert!(!backup_path(&context.dbpath)?.exists());
    assert_eq!(std::fs::read_dir(&context.dbpath)?.count(), 0);

    output(&context, Command::Init)?;
    output(&context, Command::Compact)?;
    assert!(!backup_path(&context.dbpath)?.exists());
    Ok(())
}

#[test]
fn compact_indexeddb_store() -> Result<()> {
    let (_dir, context) = database(KeyOrder::IndexedDb, &[])?;
    let keys = [3.0, -1.0, 2.5].map(|n| {
        let mut key = KeyPrefix::new(1, 1, 1).encode();
        EncodedValue::Number(n).encode_into(&mut key);
        key
    });
    {
        let kv = context.open(OpenMode::Existing)?;
        for key in &keys {
            kv.put(key, b"v")?;
        }
        kv.flush()?;
    }

    output(&context, Command::Compact)?;
    let kv = context.open(OpenMode::Existing)?;
    let stored = kv
        .range(&levelcli_kv::KeyRange::all())?
        .into_iter()
        .map(|entry| entry.key)
        .collect::<Vec<_>>();
    assert_eq!(stored, vec![keys[1].clone(), keys[2].clone(), keys[0].clone()]);
    Ok(())
}

#[test]
fn destroy_removes_the_store() -> Result<()> {
    let (_dir, context) = database(KeyOrder::Bytewise, &[(b"a", b"1")])?;
    let listing = output(&context, Command::Destroy { dry_run: true })?;
    assert!(String::from_utf8(listing)?.contains("CURRENT"));
    assert_eq!(output(&context, get_cmd("a"))?, b"1");

    output(&context, Command::Destroy { dry_run: false })?;
    assert!(output(&context, get_cmd("a")).is_err());
    Ok(())
}

#[test]
fn indexeddb_prefix_selects_object_store() -> Result<()> {
    let record = |object_store_id: i64, name: &str| {
        let mut key = KeyPrefix::new(1, object_store_id, 1).encode();
        EncodedValue::string(name).encode_into(&mut key);
        key
    };
    let (_dir, context) = database(KeyOrder::IndexedDb, &[])?;
    {
        let kv = context.open(OpenMode::Existing)?;
        for (store, name) in [(2, "z"), (1, "b"), (1, "a"), (2, "a")] {
            kv.put(&record(store, name), name.as_bytes())?;
        }
        kv.flush()?;
    }

    let keys = |range: RangeArgs| {
        output(
            &context,
            Command::Keys {
                format: Encoding {
                    raw: false,
                    base64: true,
                },
                range,
            },
        )
    };
    let encode = |key: Vec<u8>| format!("{}\n", STANDARD.encode(key));

    let all = String::from_utf8(keys(RangeArgs::default())?)?;
    let want = [(1, "a"), (1, "b"), (2, "a"), (2, "z")]
        .into_iter()
        .map(|(store, name)| encode(record(store, name)))
        .collect::<String>();
    assert_eq!(all, want);

    let store = String::from_utf8(keys(RangeArgs {
        prefix_base64: Some(STANDARD.encode(KeyPrefix::new(1, 1, 1).encode())),
        ..Default::default()
    })?)?;
    assert_eq!(store, encode(record(1, "a")) + &encode(record(1, "b")));
    Ok(())
}
