use std::path::PathBuf;

use anyhow::Context as _;
use anyhow::Result;

use clap::ArgAction;
use clap::Args as Arguments;
use clap::Parser;
use clap::Subcommand;


/// Parse a table address from a string.
fn parse_addr(s: &str) -> Result<u32> {
    // Addresses are always represented in hex, with or without 0x
    // prefix.
    u32::from_str_radix(s.trim_start_matches("0x"), 16)
        .with_context(|| format!("failed to parse address: {s}"))
}


/// A command line interface for funcsym.
#[derive(Debug, Parser)]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
    /// Increase verbosity (can be supplied multiple times).
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    pub verbosity: u8,
}


#[derive(Debug, Subcommand)]
pub enum Command {
    /// Export the function symbols of an ELF file into a table.
    Export(Export),
    /// Dump all records of a table.
    Dump(Dump),
    /// Look up one or more addresses in a table.
    Lookup(Lookup),
}


/// A type representing the `export` command.
#[derive(Debug, Arguments)]
pub struct Export {
    /// The path to the ELF file containing DWARF debug information.
    pub path: PathBuf,
    /// The path to write the table to.
    #[clap(short, long)]
    pub output: PathBuf,
    /// Abort on functions that cannot be represented in the table
    /// instead of skipping them.
    #[clap(long)]
    pub strict: bool,
}

/// A type representing the `dump` command.
#[derive(Debug, Arguments)]
pub struct Dump {
    /// The path to the table.
    pub path: PathBuf,
}

/// A type representing the `lookup` command.
#[derive(Debug, Arguments)]
pub struct Lookup {
    /// The path to the table.
    pub path: PathBuf,
    /// The addresses to look up.
    #[arg(value_parser = parse_addr, required = true)]
    pub addrs: Vec<u32>,
}


#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory as _;


    /// Verify that the command line interface is consistent.
    #[test]
    fn cli_verification() {
        let () = Args::command().debug_assert();
    }

    /// Check that addresses are parsed as hex, with or without prefix.
    #[test]
    fn address_parsing() {
        assert_eq!(parse_addr("0x1004").unwrap(), 0x1004);
        assert_eq!(parse_addr("1004").unwrap(), 0x1004);
        assert!(parse_addr("0x100000000").is_err());
        assert!(parse_addr("main").is_err());
    }

    /// Check that sub-commands and their arguments are recognized.
    #[test]
    fn command_parsing() {
        let args = Args::try_parse_from([
            "funcsym", "-vv", "export", "vmlinux", "--output", "funcs", "--strict",
        ])
        .unwrap();
        assert_eq!(args.verbosity, 2);
        match args.command {
            Command::Export(export) => {
                assert_eq!(export.path, PathBuf::from("vmlinux"));
                assert_eq!(export.output, PathBuf::from("funcs"));
                assert!(export.strict);
            }
            command => panic!("unexpected command: {command:?}"),
        }

        let args = Args::try_parse_from(["funcsym", "lookup", "funcs", "0x1004", "2000"]).unwrap();
        match args.command {
            Command::Lookup(lookup) => assert_eq!(lookup.addrs, vec![0x1004, 0x2000]),
            command => panic!("unexpected command: {command:?}"),
        }

        assert!(Args::try_parse_from(["funcsym", "lookup", "funcs"]).is_err());
    }
}
