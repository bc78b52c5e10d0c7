use std::borrow::Cow;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::mem;
use std::mem::size_of;
use std::ops::Deref as _;
use std::path::Path;

use crate::log::debug;
use crate::mmap::Mmap;
use crate::util::Pod;
use crate::util::ReadRaw as _;
use crate::Error;
use crate::ErrorExt as _;
use crate::IntoError as _;
use crate::Result;

use super::types::Elf32_Chdr;
use super::types::Elf32_Ehdr;
use super::types::Elf32_Shdr;
use super::types::Elf64_Chdr;
use super::types::Elf64_Ehdr;
use super::types::Elf64_Shdr;
use super::types::EI_CLASS;
use super::types::EI_DATA;
use super::types::EI_NIDENT;
use super::types::ELFCLASS32;
use super::types::ELFCLASS64;
use super::types::SHF_COMPRESSED;
use super::types::SHN_XINDEX;
use super::types::SHT_NOBITS;


/// The byte order value we expect in `e_ident[EI_DATA]`.
#[cfg(target_endian = "little")]
const ELFDATA_NATIVE: u8 = super::types::ELFDATA2LSB;
#[cfg(target_endian = "big")]
const ELFDATA_NATIVE: u8 = super::types::ELFDATA2MSB;


/// The "class" of an ELF file, i.e., whether it is a 32 bit or a 64
/// bit one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Class {
    Elf32,
    Elf64,
}


/// A class independent representation of an ELF section header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SectionHeader {
    pub name: u32,
    pub type_: u32,
    pub flags: u64,
    pub offset: u64,
    pub size: u64,
    pub link: u32,
}


/// Class specific ELF header accessors.
trait Ehdr: Pod {
    type Shdr: Shdr;

    fn shoff(&self) -> u64;
    fn shentsize(&self) -> u16;
    fn shnum(&self) -> u16;
    fn shstrndx(&self) -> u16;
}

impl Ehdr for Elf32_Ehdr {
    type Shdr = Elf32_Shdr;

    fn shoff(&self) -> u64 {
        self.e_shoff.into()
    }

    fn shentsize(&self) -> u16 {
        self.e_shentsize
    }

    fn shnum(&self) -> u16 {
        self.e_shnum
    }

    fn shstrndx(&self) -> u16 {
        self.e_shstrndx
    }
}

impl Ehdr for Elf64_Ehdr {
    type Shdr = Elf64_Shdr;

    fn shoff(&self) -> u64 {
        self.e_shoff
    }

    fn shentsize(&self) -> u16 {
        self.e_shentsize
    }

    fn shnum(&self) -> u16 {
        self.e_shnum
    }

    fn shstrndx(&self) -> u16 {
        self.e_shstrndx
    }
}


trait Shdr: Pod {
    fn to_header(&self) -> SectionHeader;
}

impl Shdr for Elf32_Shdr {
    fn to_header(&self) -> SectionHeader {
        SectionHeader {
            name: self.sh_name,
            type_: self.sh_type,
            flags: self.sh_flags.into(),
            offset: self.sh_offset.into(),
            size: self.sh_size.into(),
            link: self.sh_link,
        }
    }
}

impl Shdr for Elf64_Shdr {
    fn to_header(&self) -> SectionHeader {
        SectionHeader {
            name: self.sh_name,
            type_: self.sh_type,
            flags: self.sh_flags,
            offset: self.sh_offset,
            size: self.sh_size,
            link: self.sh_link,
        }
    }
}


/// Parse the section headers of an ELF file of the class described by
/// `E`, returning them along with the index of the section header
/// string table.
fn parse_shdrs<E>(elf_data: &[u8]) -> Result<(Box<[SectionHeader]>, usize)>
where
    E: Ehdr,
{
    let ehdr = { elf_data }
        .read_pod::<E>()
        .ok_or_invalid_data(|| "failed to read ELF header")?;

    let shoff = usize::try_from(ehdr.shoff())
        .ok()
        .ok_or_invalid_data(|| "e_shoff is invalid")?;
    if shoff == 0 {
        // No section header table at all.
        return Ok((Box::default(), 0))
    }

    if usize::from(ehdr.shentsize()) != size_of::<E::Shdr>() {
        return Err(Error::with_invalid_data(format!(
            "ELF file has unexpected section header size ({})",
            ehdr.shentsize()
        )))
    }

    let shdr_data = elf_data
        .get(shoff..)
        .ok_or_invalid_data(|| "e_shoff is invalid")?;

    // Section header zero holds the real section count and string table
    // index if they do not fit into the ELF header.
    let first = { shdr_data }
        .read_pod::<E::Shdr>()
        .ok_or_invalid_data(|| "failed to read section header")?
        .to_header();

    // "If the number of entries in the section header table is larger
    // than or equal to SHN_LORESERVE, e_shnum holds the value zero and
    // the real number of entries in the section header table is held in
    // the sh_size member of the initial entry in section header table."
    let shnum = if ehdr.shnum() == 0 {
        usize::try_from(first.size).ok().ok_or_invalid_data(|| {
            format!(
                "ELF file contains unsupported number of sections ({})",
                first.size
            )
        })?
    } else {
        ehdr.shnum().into()
    };

    // "If the index of section name string table section is larger than
    // or equal to SHN_LORESERVE (0xff00), this member holds SHN_XINDEX
    // (0xffff) and the real index of the section name string table
    // section is held in the sh_link member of the initial entry in
    // section header table."
    let shstrndx = if ehdr.shstrndx() == SHN_XINDEX {
        first.link
    } else {
        u32::from(ehdr.shstrndx())
    };
    let shstrndx = usize::try_from(shstrndx).ok().ok_or_invalid_data(|| {
        format!("ELF file contains unsupported section name string table index ({shstrndx})")
    })?;

    let mut data = shdr_data;
    let shdrs = (0..shnum)
        .map(|idx| {
            data.read_pod::<E::Shdr>()
                .map(|shdr| shdr.to_header())
                .ok_or_invalid_data(|| format!("failed to read section header {idx}"))
        })
        .collect::<Result<Box<[_]>>>()?;

    Ok((shdrs, shstrndx))
}


/// A parser for ELF32 and ELF64 files.
///
/// The file is expected to be in the host's byte order, which is what
/// `gimli` is configured for down the line.
pub(crate) struct ElfParser {
    /// The file's class.
    class: Class,
    /// All section headers, including the null one at index zero.
    shdrs: Box<[SectionHeader]>,
    /// The index of the section header string table.
    shstrndx: usize,
    /// The raw ELF data.
    // SAFETY: We must not hand out references with a 'static lifetime to
    //         this member. Rather, they should never outlive `self`.
    //         Furthermore, this member has to be listed before `_mmap`
    //         to make sure we never end up with a dangling reference.
    elf_data: &'static [u8],
    /// The memory mapped file.
    _mmap: Mmap,
}

impl ElfParser {
    /// Create an `ElfParser` for a path.
    pub fn open(path: &Path) -> Result<Self> {
        let mmap = Mmap::open(path)?;
        Self::from_mmap(mmap)
            .with_context(|| format!("failed to parse ELF file `{}`", path.display()))
    }

    /// Create an `ElfParser` from mmap'ed data.
    pub fn from_mmap(mmap: Mmap) -> Result<Self> {
        // We transmute the mmap's lifetime to static here as that is a
        // necessity for self-referentiality.
        // SAFETY: We never hand out any 'static references to the
        //         mapped data.
        let elf_data = unsafe { mem::transmute::<&[u8], &'static [u8]>(mmap.deref()) };

        let ident = elf_data
            .get(..EI_NIDENT)
            .ok_or_invalid_data(|| "file is too small to be an ELF file")?;
        if ident[..4] != [0x7f, b'E', b'L', b'F'] {
            return Err(Error::with_invalid_data(format!(
                "encountered unexpected e_ident: {:x?}",
                &ident[..4]
            )))
        }

        let data = ident[EI_DATA];
        if data != ELFDATA_NATIVE {
            return Err(Error::with_unsupported(format!(
                "ELF byte order ({data}) differs from host byte order"
            )))
        }

        let (class, (shdrs, shstrndx)) = match ident[EI_CLASS] {
            ELFCLASS32 => (Class::Elf32, parse_shdrs::<Elf32_Ehdr>(elf_data)?),
            ELFCLASS64 => (Class::Elf64, parse_shdrs::<Elf64_Ehdr>(elf_data)?),
            class => {
                return Err(Error::with_invalid_data(format!(
                    "encountered unknown ELF class ({class})"
                )))
            }
        };
        debug!("parsed {class:?} ELF file with {} sections", shdrs.len());

        let parser = Self {
            class,
            shdrs,
            shstrndx,
            elf_data,
            _mmap: mmap,
        };
        Ok(parser)
    }

    /// Retrieve the class of the ELF file.
    #[cfg(test)]
    #[inline]
    pub fn class(&self) -> Class {
        self.class
    }

    fn section_header(&self, idx: usize) -> Result<&SectionHeader> {
        self.shdrs
            .get(idx)
            .ok_or_invalid_input(|| format!("ELF section index ({idx}) out of bounds"))
    }

    /// Retrieve the raw data of the section with index `idx`.
    ///
    /// Sections without file contents (`SHT_NOBITS`) are reported as
    /// empty.
    pub fn section_data(&self, idx: usize) -> Result<&[u8]> {
        let shdr = self.section_header(idx)?;
        if shdr.type_ == SHT_NOBITS {
            return Ok(&[])
        }

        let offset = usize::try_from(shdr.offset).ok();
        let size = usize::try_from(shdr.size).ok();
        let data = offset
            .and_then(|offset| self.elf_data.get(offset..))
            .ok_or_invalid_data(|| "failed to read section data: invalid offset")?
            .read_slice(size.unwrap_or(usize::MAX))
            .ok_or_invalid_data(|| "failed to read section data: invalid size")?;
        Ok(data)
    }

    /// Retrieve the name of the section with index `idx`.
    pub fn section_name(&self, idx: usize) -> Result<&str> {
        let shdr = self.section_header(idx)?;
        let shstrtab = self.section_data(self.shstrndx)?;
        let name = shstrtab
            .get(shdr.name as usize..)
            .ok_or_invalid_data(|| "string table index out of bounds")?
            .read_cstr()
            .ok_or_invalid_data(|| "no valid string found in string table")?
            .to_str()
            .map_err(Error::with_invalid_data)
            .context("invalid section name")?;
        Ok(name)
    }

    /// Find the section of a given name.
    ///
    /// This function return the index of the section if found.
    pub fn find_section(&self, name: &str) -> Result<Option<usize>> {
        for idx in 1..self.shdrs.len() {
            if self.section_name(idx)? == name {
                return Ok(Some(idx))
            }
        }
        Ok(None)
    }

    /// Retrieve the data of the section with index `idx`, inflating it
    /// if it is compressed.
    pub fn section_data_decompressed(&self, idx: usize) -> Result<Cow<'_, [u8]>> {
        let shdr = self.section_header(idx)?;
        let data = self.section_data(idx)?;
        if shdr.flags & SHF_COMPRESSED == 0 {
            return Ok(Cow::Borrowed(data))
        }

        let (type_, size, compressed) = self.read_chdr(data)?;
        let data = decompress(type_, size, compressed)
            .with_context(|| format!("failed to decompress ELF section {idx}"))?;
        Ok(Cow::Owned(data))
    }

    /// Read the compression header at the start of a compressed
    /// section, returning the compression type, the uncompressed size,
    /// and the remaining (compressed) data.
    fn read_chdr<'dat>(&self, mut data: &'dat [u8]) -> Result<(u32, u64, &'dat [u8])> {
        let (type_, size) = match self.class {
            Class::Elf32 => {
                let chdr = data
                    .read_pod::<Elf32_Chdr>()
                    .ok_or_invalid_data(|| "failed to read Elf32_Chdr")?;
                (chdr.ch_type, u64::from(chdr.ch_size))
            }
            Class::Elf64 => {
                let chdr = data
                    .read_pod::<Elf64_Chdr>()
                    .ok_or_invalid_data(|| "failed to read Elf64_Chdr")?;
                (chdr.ch_type, chdr.ch_size)
            }
        };
        Ok((type_, size, data))
    }
}

impl Debug for ElfParser {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ElfParser")
            .field("class", &self.class)
            .field("sections", &self.shdrs.len())
            .finish()
    }
}


#[cfg(feature = "zlib")]
fn decompress(type_: u32, size: u64, data: &[u8]) -> Result<Vec<u8>> {
    use miniz_oxide::inflate::decompress_to_vec_zlib_with_limit;

    use super::types::ELFCOMPRESS_ZLIB;

    if type_ != ELFCOMPRESS_ZLIB {
        return Err(Error::with_unsupported(format!(
            "ELF section is compressed with unsupported method ({type_})"
        )))
    }

    let size = usize::try_from(size)
        .ok()
        .ok_or_invalid_data(|| format!("decompressed section size ({size}) is too large"))?;
    let decompressed = decompress_to_vec_zlib_with_limit(data, size).map_err(|err| {
        Error::with_invalid_data(format!("failed to inflate data: {:?}", err.status))
    })?;

    if decompressed.len() != size {
        return Err(Error::with_invalid_data(format!(
            "decompressed section has unexpected size ({}; expected {size})",
            decompressed.len()
        )))
    }
    Ok(decompressed)
}

#[cfg(not(feature = "zlib"))]
fn decompress(_type: u32, _size: u64, _data: &[u8]) -> Result<Vec<u8>> {
    Err(Error::with_unsupported(
        "ELF section is compressed but zlib support is not enabled",
    ))
}
