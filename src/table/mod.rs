//! Reading and writing of symbol tables.
//!
//! A symbol table is a sequence of records, each describing one
//! function, followed by a two byte sentinel (`0x00 0x00`). There is no
//! header, record count, padding, or byte order marker. Each record has
//! the following layout, with all integers stored in little endian byte
//! order:
//!
//! ```text
//! +--------------+-------------+--------------+------------+------+
//! | len: u16     | low_pc: u32 | high_pc: u32 | name       | 0x00 |
//! +--------------+-------------+--------------+------------+------+
//! ```
//!
//! `len` is the length of the full record, including the length field
//! itself and the terminating NUL byte, i.e., `11 + name.len()`. A
//! reader can hence skip a record without looking at its contents.
//! Records are stored in the order in which they were produced; they
//! are neither sorted nor deduplicated.

mod parser;
mod types;
mod writer;

pub use parser::Records;
pub use parser::Table;
pub use types::record_len;
pub use types::RecordError;
pub use types::SymbolRecord;
pub use types::RECORD_OVERHEAD;
pub use types::SENTINEL;
pub use writer::TableWriter;
