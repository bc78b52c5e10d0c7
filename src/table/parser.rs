use std::iter::FusedIterator;

use crate::util::ReadRaw as _;
use crate::Error;
use crate::ErrorExt as _;
use crate::IntoError as _;
use crate::Result;

use super::types::SymbolRecord;
use super::types::RECORD_OVERHEAD;


/// Decode the record at the start of `data`, advancing it.
///
/// Returns `None` once the sentinel is reached.
fn parse_record<'dat>(data: &mut &'dat [u8]) -> Result<Option<SymbolRecord<'dat>>> {
    let len = data
        .read_u16_le()
        .ok_or_invalid_data(|| "symbol table is not terminated")?;
    if len == 0 {
        return Ok(None)
    }

    let len = usize::from(len);
    if len < RECORD_OVERHEAD {
        return Err(Error::with_invalid_data(format!(
            "encountered invalid record length ({len})"
        )))
    }

    let mut record = data
        .read_slice(len - 2)
        .ok_or_invalid_data(|| format!("record of length {len} is truncated"))?;
    // SANITY: The length check above guarantees the presence of both
    //         addresses and at least one more byte.
    let low_pc = record.read_u32_le().unwrap_or_default();
    let high_pc = record.read_u32_le().unwrap_or_default();
    let name = match record.split_last() {
        Some((0, name)) => name,
        _ => return Err(Error::with_invalid_data("record name is not NUL terminated")),
    };

    let record = SymbolRecord::new(name, low_pc.into(), high_pc.into())
        .map_err(Error::with_invalid_data)
        .context("encountered invalid record")?;
    Ok(Some(record))
}


/// An iterator over the records of a [`Table`].
///
/// Iteration ends at the sentinel or with the first error.
#[derive(Clone, Debug)]
pub struct Records<'dat> {
    /// The data yet to be decoded.
    data: &'dat [u8],
    /// Whether we reached the end of the table (or failed to decode
    /// it).
    done: bool,
}

impl<'dat> Iterator for Records<'dat> {
    type Item = Result<SymbolRecord<'dat>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None
        }

        let result = parse_record(&mut self.data);
        match result {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for Records<'_> {}


/// A symbol table, as produced by [`TableWriter`][super::TableWriter].
///
/// Lookups work the same way a runtime consumer of the table is
/// expected to perform them: by scanning the records sequentially.
///
/// ```
/// use funcsym::table::Table;
///
/// let data = b"\x0f\x00\x00\x10\x00\x00\x10\x10\x00\x00main\x00\x00\x00";
/// let table = Table::new(data);
/// let record = table.find_addr(0x1004).unwrap().unwrap();
/// assert_eq!(record.name(), b"main");
/// assert!(table.find_addr(0x1010).unwrap().is_none());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Table<'dat> {
    data: &'dat [u8],
}

impl<'dat> Table<'dat> {
    /// Wrap the provided table data.
    #[inline]
    pub fn new(data: &'dat [u8]) -> Self {
        Self { data }
    }

    /// Iterate over all records, in table order.
    pub fn records(&self) -> Records<'dat> {
        Records {
            data: self.data,
            done: false,
        }
    }

    /// Find the record covering `addr`.
    ///
    /// If multiple records cover the address, the first one wins.
    /// Records past the match are not decoded.
    pub fn find_addr(&self, addr: u32) -> Result<Option<SymbolRecord<'dat>>> {
        for result in self.records() {
            let record = result?;
            if record.contains(addr) {
                return Ok(Some(record))
            }
        }
        Ok(None)
    }

    /// Check the table as a whole, returning the number of records it
    /// contains.
    ///
    /// Data following the sentinel is reported as an error.
    pub fn validate(&self) -> Result<usize> {
        let mut records = self.records();
        let mut count = 0;
        for result in records.by_ref() {
            let _record = result.with_context(|| format!("failed to decode record {count}"))?;
            count += 1;
        }

        if !records.data.is_empty() {
            return Err(Error::with_invalid_data(format!(
                "symbol table is followed by {} bytes of trailing data",
                records.data.len()
            )))
        }
        Ok(count)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::table::TableWriter;
    use crate::ErrorKind;


    fn table(records: &[(&[u8], u32, u32)]) -> Vec<u8> {
        let mut writer = TableWriter::new(Vec::new());
        for (name, low, high) in records {
            let record = SymbolRecord::new(name, (*low).into(), (*high).into()).unwrap();
            let () = writer.write_record(&record).unwrap();
        }
        writer.finish().unwrap()
    }


    /// Exercise the `Debug` representation of various types.
    #[test]
    fn debug_repr() {
        let table = Table::new(&[0, 0]);
        assert_ne!(format!("{table:?}"), "");
        assert_ne!(format!("{:?}", table.records()), "");
    }

    /// Check that decoding a written table reproduces the records in
    /// order.
    #[test]
    fn record_iteration() {
        let data = table(&[
            (b"main", 0x1000, 0x1010),
            (b"helper", 0x1020, 0x1040),
            (b"main", 0x1000, 0x1010),
        ]);
        let table = Table::new(&data);
        let records = table.records().collect::<Result<Vec<_>>>().unwrap();
        let records = records
            .iter()
            .map(|record| (record.name(), record.low_pc(), record.high_pc()))
            .collect::<Vec<_>>();
        assert_eq!(
            records,
            vec![
                (b"main".as_slice(), 0x1000, 0x1010),
                (b"helper".as_slice(), 0x1020, 0x1040),
                (b"main".as_slice(), 0x1000, 0x1010),
            ]
        );
        assert_eq!(table.validate().unwrap(), 3);
    }

    /// Check that the first covering record wins a lookup.
    #[test]
    fn address_lookup() {
        let data = table(&[
            (b"outer", 0x1000, 0x1100),
            (b"inner", 0x1010, 0x1020),
            (b"empty", 0x2000, 0x2000),
        ]);
        let table = Table::new(&data);

        let record = table.find_addr(0x1015).unwrap().unwrap();
        assert_eq!(record.name(), b"outer");
        let record = table.find_addr(0x1000).unwrap().unwrap();
        assert_eq!(record.name(), b"outer");
        assert_eq!(table.find_addr(0x1100).unwrap(), None);
        assert_eq!(table.find_addr(0x2000).unwrap(), None);
        assert_eq!(table.find_addr(0).unwrap(), None);
    }

    /// Check that the empty table is handled properly.
    #[test]
    fn empty_table() {
        let table = Table::new(&[0, 0]);
        assert_eq!(table.records().count(), 0);
        assert_eq!(table.validate().unwrap(), 0);
        assert_eq!(table.find_addr(0x1000).unwrap(), None);
    }

    /// Make sure that malformed tables are rejected.
    #[test]
    fn malformed_tables() {
        let data = table(&[(b"main", 0x1000, 0x1010)]);

        // Missing sentinel.
        let err = Table::new(&data[..data.len() - 2]).validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);

        // Truncated record.
        let err = Table::new(&data[..8]).validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);

        // Record length too small.
        let err = Table::new(&[0x0a, 0x00, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0])
            .validate()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);

        // Name not NUL terminated.
        let mut bad = data.clone();
        bad[14] = b'x';
        let err = Table::new(&bad).validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);

        // Embedded NUL byte.
        let mut bad = data.clone();
        bad[11] = 0;
        let err = Table::new(&bad).validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);

        // Empty name.
        let err = Table::new(&[0x0b, 0x00, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0])
            .validate()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);

        // Trailing data.
        let mut bad = data.clone();
        bad.push(0x42);
        let err = Table::new(&bad).validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        // Lookups stop at the sentinel and don't care.
        assert!(Table::new(&bad).find_addr(0x1000).unwrap().is_some());
    }

    /// Check that iteration stops after the first error.
    #[test]
    fn fused_iteration() {
        let mut records = Table::new(&[0x0a, 0x00]).records();
        assert!(records.next().unwrap().is_err());
        assert!(records.next().is_none());
        assert!(records.next().is_none());
    }
}
