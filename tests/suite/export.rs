use std::env;
use std::fs::read as read_file;
use std::fs::write as write_file;
use std::hint::black_box;
use std::path::Path;

use funcsym::export::Exporter;
use funcsym::table::Table;
use funcsym::ErrorKind;

use tempfile::tempdir;
use tempfile::NamedTempFile;

use test_log::test;


/// A function we expect to find in the debug information of the test
/// binary.
#[inline(never)]
fn funcsym_marker_fn(x: u64) -> u64 {
    x.wrapping_mul(31).rotate_left(7)
}


/// Check that we can export the function symbols of the running test
/// binary and map a known function's address back to its name.
#[cfg(target_os = "linux")]
#[test]
fn export_own_binary() {
    assert_ne!(black_box(funcsym_marker_fn)(black_box(3)), 0);

    let exe = env::current_exe().unwrap();
    let mut table = Vec::new();
    let summary = Exporter::new().export_elf(&exe, &mut table).unwrap();
    assert!(summary.symbols > 0);

    let table = Table::new(&table);
    assert_eq!(table.validate().unwrap(), summary.symbols);

    let marker = table
        .records()
        .map(Result::unwrap)
        .find(|record| record.name() == b"funcsym_marker_fn")
        .unwrap();
    assert!(marker.low_pc() < marker.high_pc());

    let found = table.find_addr(marker.low_pc()).unwrap().unwrap();
    assert!(found.contains(marker.low_pc()), "{found:?}");
    // Out-of-line functions do not overlap, so the marker's range is
    // only covered by itself.
    assert_eq!(found.name(), b"funcsym_marker_fn");
}

/// Check that exporting to a file produces the same table as
/// exporting to memory.
#[cfg(target_os = "linux")]
#[test]
fn export_own_binary_to_file() {
    let exe = env::current_exe().unwrap();
    let dir = tempdir().unwrap();
    let dst = dir.path().join("funcs");

    let summary = Exporter::new().export_file(&exe, &dst).unwrap();
    let data = read_file(&dst).unwrap();
    assert_eq!(Table::new(&data).validate().unwrap(), summary.symbols);

    let mut table = Vec::new();
    let _summary = Exporter::new().export_elf(&exe, &mut table).unwrap();
    assert_eq!(data, table);
}

/// Make sure that we report a missing input file as such.
#[test]
fn export_missing_file() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("does-not-exist");
    let dst = dir.path().join("funcs");

    let err = Exporter::new().export_file(&src, &dst).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound, "{err:?}");
    assert!(!dst.exists());
}

/// Make sure that we fail gracefully on input that is not an ELF file.
#[test]
fn export_non_elf_file() {
    let file = NamedTempFile::new().unwrap();
    let () = write_file(file.path(), b"this is not an ELF file").unwrap();

    let mut table = Vec::new();
    let err = Exporter::new()
        .export_elf(file.path(), &mut table)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData, "{err:?}");
    assert!(table.is_empty());

    let err = Exporter::new()
        .export_elf(Path::new(env!("CARGO_MANIFEST_DIR")), &mut table)
        .unwrap_err();
    assert_ne!(format!("{err:#}"), "");
}
