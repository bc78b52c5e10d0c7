#![allow(clippy::let_and_return, clippy::let_unit_value)]

mod args;

use std::fs::read as read_file;
use std::io::stderr;

use anyhow::Context;
use anyhow::Result;

use clap::Parser as _;

use funcsym::export::Exporter;
use funcsym::table::SymbolRecord;
use funcsym::table::Table;

use tracing::subscriber::set_global_default as set_global_subscriber;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::SystemTime;
use tracing_subscriber::FmtSubscriber;


fn format_record(record: &SymbolRecord<'_>) -> String {
    let name = String::from_utf8_lossy(record.name());
    format!("{:#010x}-{:#010x} {name}", record.low_pc(), record.high_pc())
}

/// The handler for the 'export' command.
fn export(export: args::Export) -> Result<()> {
    let args::Export {
        path,
        output,
        strict,
    } = export;

    let exporter = Exporter::builder().set_strict(strict).build();
    let summary = exporter.export_file(&path, &output).with_context(|| {
        format!(
            "failed to export function symbols of `{}` to `{}`",
            path.display(),
            output.display()
        )
    })?;
    println!(
        "exported {} functions to {}",
        summary.symbols,
        output.display()
    );
    Ok(())
}

/// The handler for the 'dump' command.
fn dump(dump: args::Dump) -> Result<()> {
    let args::Dump { path } = dump;
    let data =
        read_file(&path).with_context(|| format!("failed to read `{}`", path.display()))?;
    let table = Table::new(&data);
    for record in table.records() {
        let record = record.with_context(|| format!("failed to parse `{}`", path.display()))?;
        println!("{}", format_record(&record));
    }
    Ok(())
}

/// The handler for the 'lookup' command.
fn lookup(lookup: args::Lookup) -> Result<()> {
    let args::Lookup { path, addrs } = lookup;
    let data =
        read_file(&path).with_context(|| format!("failed to read `{}`", path.display()))?;
    let table = Table::new(&data);
    for addr in addrs {
        let record = table
            .find_addr(addr)
            .with_context(|| format!("failed to look up address {addr:#x}"))?;
        match record {
            Some(record) => {
                let name = String::from_utf8_lossy(record.name());
                println!("{addr:#x}: {name}")
            }
            None => println!("{addr:#x}: ??"),
        }
    }
    Ok(())
}


fn main() -> Result<()> {
    let args = args::Args::parse();
    let level = match args.verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_timer(SystemTime)
        .with_writer(stderr)
        .finish();

    let () =
        set_global_subscriber(subscriber).with_context(|| "failed to set tracing subscriber")?;

    match args.command {
        args::Command::Export(export) => self::export(export),
        args::Command::Dump(dump) => self::dump(dump),
        args::Command::Lookup(lookup) => self::lookup(lookup),
    }
}


#[cfg(test)]
mod tests {
    use super::*;


    /// Check the textual representation of a record.
    #[test]
    fn record_formatting() {
        let record = SymbolRecord::new(b"main", 0x1000, 0x1010).unwrap();
        assert_eq!(format_record(&record), "0x00001000-0x00001010 main");
    }
}
