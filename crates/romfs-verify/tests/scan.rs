//! Tree scans over temporary asset roots.

use std::fs;
use std::path::{Path, PathBuf};

use romfs_codec::{Codec, DictionaryRegistry};
use romfs_core::{content_checksum, CanonicalKey};
use romfs_table::{ChecksumEntry, ChecksumTable};
use romfs_verify::{ScanOptions, Verdict, Verifier};

fn write(root: &Path, rel: &str, bytes: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, bytes).unwrap();
}

fn row(rel: &str, content: &[u8]) -> (romfs_core::NameHash, Vec<ChecksumEntry>) {
    (
        CanonicalKey::new(rel).name_hash(),
        vec![ChecksumEntry::new(
            100,
            content.len() as i32,
            content_checksum(content),
        )],
    )
}

struct Fixture {
    _dir: tempfile::TempDir,
    root: PathBuf,
    table: ChecksumTable,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();

    let item = b"item table".as_slice();
    let actor = b"actor parameters".as_slice();
    let quest = b"quest flow".as_slice();

    write(&root, "Data/Item.bgyml", item);
    write(
        &root,
        "Actor/Sword.engine__actor__ActorParam.bgyml.zs",
        &Codec::default().compress(actor).unwrap(),
    );
    write(&root, "Quest/Main.bfevfl", b"quest FLOW");
    write(&root, "Mods/NewThing.bgyml", b"added by a mod");
    write(&root, "Pack/ZsDic.pack.zs", b"dictionary pack");
    write(&root, "Model/Variant.bfres.mc", b"variant");

    let table = ChecksumTable::from_rows(
        100,
        [
            row("Data/Item.bgyml", item),
            row("Actor/Sword.engine__actor__ActorParam.bgyml", actor),
            row("Quest/Main.bfevfl", quest),
        ],
    )
    .unwrap();

    Fixture {
        _dir: dir,
        root,
        table,
    }
}

#[test]
fn scan_sorts_files_into_categories() {
    let fx = fixture();
    let dictionaries = DictionaryRegistry::new();
    let verifier = Verifier::new(&fx.table, &dictionaries);

    let report = verifier.scan_tree(&fx.root, 100).unwrap();
    assert_eq!(report.version, 100);
    assert_eq!(report.vanilla, 2);
    assert_eq!(report.modified.len(), 1);
    assert_eq!(report.modified[0].key.as_str(), "Quest/Main.bfevfl");
    assert!(matches!(
        report.modified[0].verdict,
        Verdict::ChecksumMismatch { .. }
    ));
    assert_eq!(report.extra, vec![PathBuf::from("Mods/NewThing.bgyml")]);
    assert_eq!(
        report.ignored,
        vec![
            PathBuf::from("Model/Variant.bfres.mc"),
            PathBuf::from("Pack/ZsDic.pack.zs"),
        ]
    );
    assert!(!report.is_clean());
    assert!(!report.aborted);
    assert_eq!(report.checked(), 4);
}

#[test]
fn fail_fast_marks_report_aborted() {
    let fx = fixture();
    let dictionaries = DictionaryRegistry::new();
    let verifier = Verifier::new(&fx.table, &dictionaries);

    let report = verifier
        .scan_tree_with(&fx.root, 100, ScanOptions { fail_fast: true })
        .unwrap();
    assert!(report.aborted);
    assert_eq!(report.modified.len(), 1);
}

#[test]
fn scan_of_missing_root_fails() {
    let fx = fixture();
    let dictionaries = DictionaryRegistry::new();
    let verifier = Verifier::new(&fx.table, &dictionaries);
    assert!(verifier.scan_tree(&fx.root.join("missing"), 100).is_err());
}

#[test]
fn report_serializes_to_json() {
    let fx = fixture();
    let dictionaries = DictionaryRegistry::new();
    let verifier = Verifier::new(&fx.table, &dictionaries);
    let report = verifier.scan_tree(&fx.root, 100).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["vanilla"], 2);
    assert_eq!(json["modified"][0]["verdict"]["status"], "checksum_mismatch");
}
