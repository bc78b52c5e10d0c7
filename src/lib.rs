//! **funcsym** extracts function symbols (names and address ranges)
//! from a program's debug information and stores them in a compact
//! binary table. The table can be consumed by minimal runtime
//! environments, such as operating system kernels, that have no means
//! of parsing debug information themselves but want to map instruction
//! addresses back to function names, say, when reporting a fault.
//!
//! The main entry point is the [`Exporter`][export::Exporter], which
//! walks a [`DebugInfo`][entry::DebugInfo] provider and writes a table
//! using a [`TableWriter`][table::TableWriter]. The
//! [`DwarfInfo`][dwarf::DwarfInfo] provider reads DWARF debug
//! information, for example from an ELF file via
//! [`Exporter::export_elf`][export::Exporter::export_elf]. Tables can
//! be inspected using [`Table`][table::Table].
//!
//! ```no_run
//! # use std::path::Path;
//! use funcsym::export::Exporter;
//!
//! let exporter = Exporter::builder().set_strict(true).build();
//! let summary = exporter
//!     .export_file(Path::new("build/kernel.debug"), Path::new("initrd/.funcs"))
//!     .unwrap();
//! println!("exported {} functions", summary.symbols);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "dwarf")]
#[cfg_attr(docsrs, doc(cfg(feature = "dwarf")))]
pub mod dwarf;
#[cfg(feature = "dwarf")]
mod elf;
pub mod entry;
mod error;
pub mod export;
pub mod extract;
mod log;
#[cfg(feature = "dwarf")]
mod mmap;
pub mod table;
#[cfg(all(test, feature = "dwarf"))]
mod test_helper;
mod util;


pub use crate::error::Error;
pub use crate::error::ErrorExt;
pub use crate::error::ErrorKind;
pub use crate::error::IntoError;

/// A result type using our [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;
