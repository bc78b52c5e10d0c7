use std::error;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

use crate::Error;


/// The number of bytes of an encoded record that are not part of the
/// name: the length, the two addresses, and the terminating NUL byte.
pub const RECORD_OVERHEAD: usize = 2 + 4 + 4 + 1;

/// The pattern terminating a table.
pub const SENTINEL: [u8; 2] = [0, 0];


/// The reason why a [`SymbolRecord`] could not be created.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordError {
    /// An address does not fit into 32 bits.
    AddressOverflow {
        /// The offending address.
        addr: u64,
    },
    /// The encoded record would exceed the maximum representable
    /// length.
    OversizeRecord {
        /// The length the encoded record would have.
        len: usize,
    },
    /// Adding the length of the address range to its start address
    /// exceeds the 64 bit address space.
    RangeOverflow {
        /// The start address.
        low_pc: u64,
        /// The length of the range.
        offset: u64,
    },
    /// The address range was stored with a negative length.
    NegativeLength {
        /// The stored length.
        offset: i64,
    },
    /// The name is empty.
    EmptyName,
    /// The name contains a NUL byte.
    EmbeddedNul,
}

impl Display for RecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::AddressOverflow { addr } => {
                write!(f, "address {addr:#x} does not fit into 32 bits")
            }
            Self::OversizeRecord { len } => write!(
                f,
                "encoded record length ({len}) exceeds maximum of {}",
                u16::MAX
            ),
            Self::RangeOverflow { low_pc, offset } => write!(
                f,
                "address range of {offset:#x} bytes starting at {low_pc:#x} exceeds the 64 bit address space"
            ),
            Self::NegativeLength { offset } => {
                write!(f, "address range has negative length ({offset})")
            }
            Self::EmptyName => f.write_str("symbol name is empty"),
            Self::EmbeddedNul => f.write_str("symbol name contains a NUL byte"),
        }
    }
}

impl error::Error for RecordError {}

impl From<RecordError> for Error {
    fn from(err: RecordError) -> Self {
        Error::with_invalid_input(err)
    }
}


/// Calculate the length of the encoded record for a symbol with the
/// given name.
pub fn record_len(name: &[u8]) -> Result<u16, RecordError> {
    let len = name.len().saturating_add(RECORD_OVERHEAD);
    u16::try_from(len).map_err(|_err| RecordError::OversizeRecord { len })
}


/// A function symbol, as stored in a table.
///
/// Every `SymbolRecord` is guaranteed to be encodable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SymbolRecord<'name> {
    name: &'name [u8],
    low_pc: u32,
    high_pc: u32,
}

impl<'name> SymbolRecord<'name> {
    /// Create a new record for the function `name` covering the address
    /// range `[low_pc, high_pc)`.
    ///
    /// `high_pc` is expected to not be below `low_pc`; this property is
    /// not checked.
    pub fn new(name: &'name [u8], low_pc: u64, high_pc: u64) -> Result<Self, RecordError> {
        if name.is_empty() {
            return Err(RecordError::EmptyName)
        }
        if name.contains(&b'\0') {
            return Err(RecordError::EmbeddedNul)
        }

        let to_u32 = |addr: u64| {
            u32::try_from(addr).map_err(|_err| RecordError::AddressOverflow { addr })
        };
        let low_pc = to_u32(low_pc)?;
        let high_pc = to_u32(high_pc)?;
        let _len = record_len(name)?;

        let slf = Self {
            name,
            low_pc,
            high_pc,
        };
        Ok(slf)
    }

    /// Retrieve the function's name.
    #[inline]
    pub fn name(&self) -> &'name [u8] {
        self.name
    }

    /// Retrieve the function's start address.
    #[inline]
    pub fn low_pc(&self) -> u32 {
        self.low_pc
    }

    /// Retrieve the address one past the function's end.
    #[inline]
    pub fn high_pc(&self) -> u32 {
        self.high_pc
    }

    /// Retrieve the length of the record once encoded.
    #[inline]
    pub fn encoded_len(&self) -> u16 {
        // A record's name length is checked on construction.
        (self.name.len() + RECORD_OVERHEAD) as u16
    }

    /// Check whether the record covers the provided address.
    #[inline]
    pub fn contains(&self, addr: u32) -> bool {
        self.low_pc <= addr && addr < self.high_pc
    }
}
