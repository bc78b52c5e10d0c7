use gimli::write;
use gimli::write::Address;
use gimli::write::AttributeValue as WriteValue;
use gimli::write::DwarfUnit;
use gimli::write::EndianVec;
use gimli::write::LineProgram;
use gimli::write::LineString;
use gimli::write::Sections;
use gimli::Encoding;
use gimli::Format;
use gimli::LineEncoding;
use gimli::RunTimeEndian;
use gimli::SectionId;

use crate::elf::types::ELFCLASS32;
use crate::elf::types::ELFCLASS64;
use crate::elf::types::ELFDATA2LSB;
use crate::elf::types::ELFDATA2MSB;


/// A section to place into an ELF file created by [`create_elf`].
#[derive(Debug)]
pub(crate) struct Section<'dat> {
    pub name: &'dat str,
    pub flags: u64,
    pub data: &'dat [u8],
}

impl<'dat> Section<'dat> {
    pub fn new(name: &'dat str, data: &'dat [u8]) -> Self {
        Self {
            name,
            flags: 0,
            data,
        }
    }
}


#[derive(Default)]
struct Buf {
    data: Vec<u8>,
}

impl Buf {
    fn u16(&mut self, v: u16) {
        self.data.extend_from_slice(&v.to_ne_bytes())
    }

    fn u32(&mut self, v: u32) {
        self.data.extend_from_slice(&v.to_ne_bytes())
    }

    fn u64(&mut self, v: u64) {
        self.data.extend_from_slice(&v.to_ne_bytes())
    }

    /// Write a "word" of the given ELF class.
    fn word(&mut self, class: u8, v: u64) {
        if class == ELFCLASS32 {
            self.u32(u32::try_from(v).unwrap())
        } else {
            self.u64(v)
        }
    }
}


/// Create an ELF file in memory, containing the provided sections (in
/// order) as well as a section header string table.
///
/// The file uses the host's byte order and has no program headers.
pub(crate) fn create_elf(class: u8, sections: &[Section<'_>]) -> Vec<u8> {
    assert!(class == ELFCLASS32 || class == ELFCLASS64, "{class}");
    let (ehsize, shentsize) = if class == ELFCLASS32 {
        (52u16, 40u16)
    } else {
        (64u16, 64u16)
    };

    let mut shstrtab = vec![0u8];
    let mut name_offsets = Vec::new();
    for section in sections.iter().map(|s| s.name).chain([".shstrtab"]) {
        name_offsets.push(shstrtab.len() as u32);
        let () = shstrtab.extend_from_slice(section.as_bytes());
        let () = shstrtab.push(0);
    }

    // Section contents immediately follow the ELF header.
    let mut offsets = Vec::new();
    let mut body = Vec::new();
    for data in sections.iter().map(|s| s.data).chain([shstrtab.as_slice()]) {
        offsets.push(u64::from(ehsize) + body.len() as u64);
        let () = body.extend_from_slice(data);
    }
    while (usize::from(ehsize) + body.len()) % 8 != 0 {
        let () = body.push(0);
    }
    let shoff = u64::from(ehsize) + body.len() as u64;
    let shnum = u16::try_from(sections.len() + 2).unwrap();

    let mut buf = Buf::default();
    let data = if cfg!(target_endian = "little") {
        ELFDATA2LSB
    } else {
        ELFDATA2MSB
    };
    let () = buf
        .data
        .extend_from_slice(&[0x7f, b'E', b'L', b'F', class, data, 1, 0]);
    let () = buf.data.extend_from_slice(&[0; 8]);
    // e_type (ET_EXEC), e_machine, e_version
    let () = buf.u16(2);
    let () = buf.u16(if class == ELFCLASS32 { 3 } else { 62 });
    let () = buf.u32(1);
    // e_entry, e_phoff, e_shoff
    let () = buf.word(class, 0);
    let () = buf.word(class, 0);
    let () = buf.word(class, shoff);
    // e_flags, e_ehsize, e_phentsize, e_phnum, e_shentsize, e_shnum,
    // e_shstrndx
    let () = buf.u32(0);
    let () = buf.u16(ehsize);
    let () = buf.u16(0);
    let () = buf.u16(0);
    let () = buf.u16(shentsize);
    let () = buf.u16(shnum);
    let () = buf.u16(shnum - 1);
    assert_eq!(buf.data.len(), usize::from(ehsize));

    let () = buf.data.extend_from_slice(&body);

    let mut write_shdr = |name: u32, type_: u32, flags: u64, offset: u64, size: u64| {
        let () = buf.u32(name);
        let () = buf.u32(type_);
        let () = buf.word(class, flags);
        // sh_addr
        let () = buf.word(class, 0);
        let () = buf.word(class, offset);
        let () = buf.word(class, size);
        // sh_link, sh_info
        let () = buf.u32(0);
        let () = buf.u32(0);
        // sh_addralign, sh_entsize
        let () = buf.word(class, 1);
        let () = buf.word(class, 0);
    };

    let () = write_shdr(0, 0, 0, 0, 0);
    for (i, section) in sections.iter().enumerate() {
        // SHT_PROGBITS
        let () = write_shdr(
            name_offsets[i],
            1,
            section.flags,
            offsets[i],
            section.data.len() as u64,
        );
    }
    // SHT_STRTAB
    let () = write_shdr(
        name_offsets[sections.len()],
        3,
        0,
        offsets[sections.len()],
        shstrtab.len() as u64,
    );

    buf.data
}


/// The native byte order, as used for writing DWARF.
fn native_endian() -> RunTimeEndian {
    if cfg!(target_endian = "little") {
        RunTimeEndian::Little
    } else {
        RunTimeEndian::Big
    }
}

/// Create DWARF data for a single compilation unit containing the
/// provided subprograms (name, low_pc, high_pc), followed by a
/// variable. The unit refers to a minimal line program.
pub(crate) fn create_dwarf(
    version: u16,
    subprograms: &[(Option<&str>, u64, WriteValue)],
) -> Vec<(SectionId, Vec<u8>)> {
    let encoding = Encoding {
        format: Format::Dwarf32,
        version,
        address_size: 4,
    };
    let mut dwarf = DwarfUnit::new(encoding);
    let root = dwarf.unit.root();
    let () = dwarf.unit.get_mut(root).set(
        gimli::DW_AT_name,
        WriteValue::String(b"test.c".to_vec()),
    );

    for (name, low_pc, high_pc) in subprograms {
        let id = dwarf.unit.add(root, gimli::DW_TAG_subprogram);
        let entry = dwarf.unit.get_mut(id);
        if let Some(name) = name {
            let () = entry.set(
                gimli::DW_AT_name,
                WriteValue::StringRef(dwarf.strings.add(*name)),
            );
        }
        let () = entry.set(
            gimli::DW_AT_low_pc,
            WriteValue::Address(Address::Constant(*low_pc)),
        );
        let () = entry.set(gimli::DW_AT_high_pc, high_pc.clone());
    }
    // Compilers emit a line program for every unit they produce, which
    // is referenced from the unit's root via `DW_AT_stmt_list`.
    let mut program = LineProgram::new(
        encoding,
        LineEncoding::default(),
        LineString::String(b"/src".to_vec()),
        None,
        LineString::String(b"test.c".to_vec()),
        None,
    );
    let dir = program.default_directory();
    let file = program.add_file(LineString::String(b"test.c".to_vec()), dir, None);
    let base = subprograms
        .iter()
        .map(|(_name, low_pc, _high_pc)| *low_pc)
        .min()
        .unwrap_or(0);
    let () = program.begin_sequence(Some(Address::Constant(base)));
    program.row().file = file;
    program.row().line = 1;
    let () = program.generate_row();
    let () = program.end_sequence(0x10);
    dwarf.unit.line_program = program;

    let var = dwarf.unit.add(root, gimli::DW_TAG_variable);
    let () = dwarf.unit.get_mut(var).set(
        gimli::DW_AT_name,
        WriteValue::String(b"global".to_vec()),
    );

    let mut sections = Sections::new(EndianVec::new(native_endian()));
    let () = dwarf.write(&mut sections).unwrap();

    let mut result = Vec::new();
    let () = sections
        .for_each(|id, data| {
            result.push((id, data.slice().to_vec()));
            Ok::<_, write::Error>(())
        })
        .unwrap();
    result
}
