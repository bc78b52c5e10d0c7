use funcsym::entry::Attr;
use funcsym::entry::AttrName;
use funcsym::entry::Entry;
use funcsym::entry::Tag;
use funcsym::entry::Units;
use funcsym::export::Exporter;
use funcsym::table::Table;
use funcsym::ErrorKind;

use test_log::test;


fn function<'dat>(name: &'dat [u8], low_pc: u64, high_pc: Attr<'dat>) -> Entry<'dat> {
    Entry::new(Tag::Subprogram)
        .with_attr(AttrName::Name, Attr::string(name))
        .with_attr(AttrName::LowPc, Attr::address(low_pc))
        .with_attr(AttrName::HighPc, high_pc)
}


/// Check that a table created from a couple of functions spread over
/// multiple units can be used for address lookup, the way a consumer
/// of it would.
#[test]
fn export_and_lookup() {
    let units = Units::from(vec![
        vec![
            Entry::new(Tag::Other(0x11)),
            function(b"start", 0x1000, Attr::constant(0x40)),
            function(b"main", 0x1040, Attr::address(0x1100)),
        ],
        vec![
            Entry::new(Tag::Other(0x11)),
            function(b"panic", 0x2000, Attr::constant(0x8)),
            Entry::new(Tag::Subprogram).with_attr(AttrName::Name, Attr::string(b"decl")),
        ],
    ]);

    let mut data = Vec::new();
    let summary = Exporter::new().export(&units, &mut data).unwrap();
    assert_eq!(summary.symbols, 3);
    assert_eq!(summary.incomplete, 1);
    assert_eq!(summary.not_subprogram, 2);

    let table = Table::new(&data);
    assert_eq!(table.validate().unwrap(), 3);

    let lookup = |addr| {
        table
            .find_addr(addr)
            .unwrap()
            .map(|record| String::from_utf8_lossy(record.name()).into_owned())
            .unwrap_or_else(|| "??".to_string())
    };
    assert_eq!(lookup(0x1000), "start");
    assert_eq!(lookup(0x103f), "start");
    assert_eq!(lookup(0x1040), "main");
    assert_eq!(lookup(0x10ff), "main");
    assert_eq!(lookup(0x1100), "??");
    assert_eq!(lookup(0x2004), "panic");
    assert_eq!(lookup(0xfff), "??");
}

/// Check that strict mode rejects functions that cannot be encoded
/// while the default mode merely skips them.
#[test]
fn strict_export() {
    let units = Units::from(vec![vec![
        function(b"low", 0x1000, Attr::constant(0x10)),
        function(b"high", 0x1_0000_0000, Attr::constant(0x10)),
    ]]);

    let mut data = Vec::new();
    let summary = Exporter::new().export(&units, &mut data).unwrap();
    assert_eq!(summary.symbols, 1);
    assert_eq!(summary.invalid, 1);
    assert_eq!(Table::new(&data).validate().unwrap(), 1);

    let mut data = Vec::new();
    let err = Exporter::builder()
        .set_strict(true)
        .build()
        .export(&units, &mut data)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(format!("{err:#}").contains("`high`"), "{err:#}");
}
