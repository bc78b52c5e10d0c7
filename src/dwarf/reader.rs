use std::borrow::Cow;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

use gimli::EndianSlice;
use gimli::SectionId;

use crate::elf::ElfParser;
use crate::log::debug;
use crate::Error;
use crate::ErrorExt as _;
use crate::Result;


#[cfg(target_endian = "little")]
pub(crate) type Endianess = gimli::LittleEndian;
#[cfg(target_endian = "big")]
pub(crate) type Endianess = gimli::BigEndian;

/// The gimli reader type we currently use. Could be made generic if
/// need be, but we keep things simple while we can.
pub(crate) type R<'dat> = EndianSlice<'dat, Endianess>;


/// The DWARF sections we need for extracting function symbols.
///
/// `.debug_line` is not used directly, but unit headers cannot be
/// parsed without it if they carry a `DW_AT_stmt_list` attribute.
const SECTIONS: [SectionId; 7] = [
    SectionId::DebugAbbrev,
    SectionId::DebugAddr,
    SectionId::DebugInfo,
    SectionId::DebugLine,
    SectionId::DebugLineStr,
    SectionId::DebugStr,
    SectionId::DebugStrOffsets,
];


/// DWARF section data read from an ELF file, decompressed as
/// necessary.
pub(crate) struct DwarfSections<'elf> {
    sections: Vec<(SectionId, Cow<'elf, [u8]>)>,
}

impl<'elf> DwarfSections<'elf> {
    /// Load the relevant DWARF sections from the provided ELF file.
    ///
    /// Loading fails with [`ErrorKind::NotFound`][crate::ErrorKind::NotFound]
    /// if the file contains no (or an empty) `.debug_info` section.
    pub fn load(parser: &'elf ElfParser) -> Result<Self> {
        let mut sections = Vec::with_capacity(SECTIONS.len());
        for id in SECTIONS {
            let name = id.name();
            if let Some(idx) = parser.find_section(name)? {
                let data = parser
                    .section_data_decompressed(idx)
                    .with_context(|| format!("failed to read section `{name}`"))?;
                debug!("loaded section `{name}` ({} bytes)", data.len());
                let () = sections.push((id, data));
            }
        }

        let slf = Self { sections };
        if slf.section(SectionId::DebugInfo).is_empty() {
            return Err(Error::with_not_found(
                "ELF file does not contain DWARF debug information",
            ))
        }
        Ok(slf)
    }

    /// Retrieve the data of the given section.
    ///
    /// Sections that do not exist (or that we did not load) are
    /// reported as empty.
    pub fn section(&self, id: SectionId) -> &[u8] {
        self.sections
            .iter()
            .find_map(|(sid, data)| (*sid == id).then_some(data.as_ref()))
            .unwrap_or(&[])
    }
}

impl Debug for DwarfSections<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut list = f.debug_list();
        for (id, data) in &self.sections {
            let _entry = list.entry(&format_args!("{}: {} bytes", id.name(), data.len()));
        }
        list.finish()
    }
}
