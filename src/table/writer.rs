use std::io::Write;

use crate::log::trace;
use crate::ErrorExt as _;
use crate::Result;

use super::types::SymbolRecord;
use super::types::SENTINEL;


/// A writer emitting a symbol table.
///
/// Records are written in the order in which they are provided. The
/// table is only complete once [`TableWriter::finish`] has been
/// called.
#[derive(Debug)]
pub struct TableWriter<W> {
    writer: W,
    /// The number of records written so far.
    count: usize,
}

impl<W> TableWriter<W>
where
    W: Write,
{
    /// Create a new `TableWriter` emitting data to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer, count: 0 }
    }

    /// Append a single record to the table.
    pub fn write_record(&mut self, record: &SymbolRecord<'_>) -> Result<()> {
        let len = record.encoded_len();
        trace!(
            "writing record {}: {:#x}-{:#x} (length {len})",
            self.count,
            record.low_pc(),
            record.high_pc()
        );

        let mut buf = [0u8; 10];
        let () = buf[0..2].copy_from_slice(&len.to_le_bytes());
        let () = buf[2..6].copy_from_slice(&record.low_pc().to_le_bytes());
        let () = buf[6..10].copy_from_slice(&record.high_pc().to_le_bytes());

        let () = self
            .writer
            .write_all(&buf)
            .and_then(|()| self.writer.write_all(record.name()))
            .and_then(|()| self.writer.write_all(&[0]))
            .context("failed to write symbol record")?;
        self.count += 1;
        Ok(())
    }

    /// Retrieve the number of records written so far.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Terminate the table, flush it, and return the underlying
    /// writer.
    pub fn finish(mut self) -> Result<W> {
        let () = self
            .writer
            .write_all(&SENTINEL)
            .and_then(|()| self.writer.flush())
            .context("failed to terminate symbol table")?;
        Ok(self.writer)
    }
}
