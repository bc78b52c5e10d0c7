//! Conversion of debug information into symbol tables.

#[cfg(feature = "dwarf")]
use std::fs;
#[cfg(feature = "dwarf")]
use std::fs::File;
#[cfg(feature = "dwarf")]
use std::io::BufWriter;
use std::io::Write;
use std::ops::ControlFlow;
#[cfg(feature = "dwarf")]
use std::path::Path;

use crate::entry::AttrName;
use crate::entry::DebugInfo;
use crate::extract::for_each_resolution;
use crate::extract::report;
use crate::extract::Resolution;
#[cfg(feature = "dwarf")]
use crate::log::debug;
use crate::log::info;
use crate::table::TableWriter;
use crate::Error;
use crate::ErrorExt as _;
use crate::Result;

#[cfg(feature = "dwarf")]
use crate::dwarf::DwarfInfo;
#[cfg(feature = "dwarf")]
use crate::dwarf::DwarfSections;
#[cfg(feature = "dwarf")]
use crate::elf::ElfParser;


/// A summary of an export operation, accounting for every visited
/// debug information entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// The number of records written.
    pub symbols: usize,
    /// The number of entries not describing a function.
    pub not_subprogram: usize,
    /// The number of functions skipped for lack of a required
    /// attribute.
    pub incomplete: usize,
    /// The number of functions skipped because their end address used
    /// an unsupported encoding.
    pub unsupported: usize,
    /// The number of functions skipped because they could not be
    /// represented in the table.
    pub invalid: usize,
}

impl Summary {
    fn count(&mut self, resolution: &Resolution<'_>) {
        let counter = match resolution {
            Resolution::Symbol(..) => &mut self.symbols,
            Resolution::NotSubprogram => &mut self.not_subprogram,
            Resolution::Incomplete(..) => &mut self.incomplete,
            Resolution::UnsupportedEncoding(..) => &mut self.unsupported,
            Resolution::Invalid(..) => &mut self.invalid,
        };
        *counter += 1;
    }
}


/// A builder for configurable construction of [`Exporter`] objects.
///
/// By default invalid records are skipped.
#[derive(Clone, Debug, Default)]
pub struct Builder {
    /// See [`Builder::set_strict`].
    strict: bool,
}

impl Builder {
    /// Enable/disable strict mode.
    ///
    /// In strict mode a function that cannot be represented in a table
    /// (because its addresses exceed 32 bits, say) fails the export with
    /// an [`ErrorKind::InvalidInput`][crate::ErrorKind::InvalidInput]
    /// error. Otherwise such functions are skipped with a warning.
    pub fn set_strict(mut self, strict: bool) -> Builder {
        self.strict = strict;
        self
    }

    /// Create the [`Exporter`] object.
    pub fn build(self) -> Exporter {
        let Builder { strict } = self;
        Exporter { strict }
    }
}


/// An exporter turning debug information into a symbol table.
///
/// Records are emitted in a single pass over the debug information, in
/// the order the provider enumerates them.
///
/// ```
/// use funcsym::entry::Attr;
/// use funcsym::entry::AttrName;
/// use funcsym::entry::Entry;
/// use funcsym::entry::Tag;
/// use funcsym::entry::Units;
/// use funcsym::export::Exporter;
///
/// let main = Entry::new(Tag::Subprogram)
///     .with_attr(AttrName::Name, Attr::string(b"main"))
///     .with_attr(AttrName::LowPc, Attr::address(0x1000))
///     .with_attr(AttrName::HighPc, Attr::constant(0x10));
/// let units = Units::from(vec![vec![main]]);
///
/// let mut table = Vec::new();
/// let summary = Exporter::new().export(&units, &mut table).unwrap();
/// assert_eq!(summary.symbols, 1);
/// assert_eq!(
///     table,
///     b"\x0f\x00\x00\x10\x00\x00\x10\x10\x00\x00main\x00\x00\x00"
/// );
/// ```
#[derive(Clone, Debug, Default)]
pub struct Exporter {
    /// See [`Builder::set_strict`].
    strict: bool,
}

impl Exporter {
    /// Create a new [`Exporter`].
    ///
    /// This method is just a short hand for instantiating an `Exporter`
    /// from the default [`Builder`].
    #[inline]
    pub fn new() -> Self {
        Builder::default().build()
    }

    /// Retrieve a [`Builder`] object for configurable construction of
    /// an [`Exporter`].
    #[inline]
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Write a symbol table for all functions of `info` to `writer`.
    ///
    /// The table is terminated and `writer` flushed on success. On
    /// failure, a partial table may have been written.
    pub fn export<W>(&self, info: &dyn DebugInfo, writer: W) -> Result<Summary>
    where
        W: Write,
    {
        let mut writer = TableWriter::new(writer);
        let mut summary = Summary::default();
        let mut result = Ok(());

        let () = for_each_resolution(info, |entry, resolution| {
            let () = summary.count(&resolution);
            match resolution {
                Resolution::Symbol(record) => {
                    if let Err(err) = writer.write_record(&record) {
                        result = Err(err);
                        return ControlFlow::Break(())
                    }
                }
                Resolution::Invalid(err) if self.strict => {
                    let name = entry
                        .attr(AttrName::Name)
                        .and_then(|attr| attr.bytes())
                        .map(String::from_utf8_lossy)
                        .unwrap_or_default();
                    let err = Error::from(err)
                        .with_context(|| format!("failed to create record for function `{name}`"));
                    result = Err(err);
                    return ControlFlow::Break(())
                }
                resolution => report(&resolution, entry),
            }
            ControlFlow::Continue(())
        })?;
        let () = result?;
        let _writer = writer.finish()?;

        info!(
            "wrote {} symbols; skipped {} incomplete, {} unsupported, and {} invalid functions",
            summary.symbols,
            summary.incomplete,
            summary.unsupported,
            summary.invalid
        );
        Ok(summary)
    }

    /// Load the DWARF debug information of the ELF file at `path` and
    /// invoke `f` with it.
    #[cfg(feature = "dwarf")]
    fn with_dwarf<F, T>(path: &Path, f: F) -> Result<T>
    where
        F: FnOnce(&DwarfInfo<'_>) -> Result<T>,
    {
        let parser = ElfParser::open(path)?;
        let sections = DwarfSections::load(&parser).with_context(|| {
            format!(
                "failed to load debug information from `{}`",
                path.display()
            )
        })?;
        let info = DwarfInfo::load(|id| Ok(sections.section(id)))?;
        f(&info)
    }

    /// Write a symbol table for all functions described by the DWARF
    /// debug information of the ELF file at `path`.
    ///
    /// An ELF file without debug information is reported as
    /// [`ErrorKind::NotFound`][crate::ErrorKind::NotFound].
    #[cfg(feature = "dwarf")]
    pub fn export_elf<W>(&self, path: &Path, writer: W) -> Result<Summary>
    where
        W: Write,
    {
        Self::with_dwarf(path, |info| self.export(info, writer))
    }

    /// Write a symbol table for all functions described by the DWARF
    /// debug information of the ELF file at `src` to the file `dst`.
    ///
    /// `dst` is only created once debug information was found and it is
    /// removed again should the export fail.
    #[cfg(feature = "dwarf")]
    pub fn export_file(&self, src: &Path, dst: &Path) -> Result<Summary> {
        Self::with_dwarf(src, |info| {
            debug!("writing symbol table to `{}`", dst.display());
            let file = File::create(dst)
                .with_context(|| format!("failed to create `{}`", dst.display()))?;
            let result = self.export(info, BufWriter::new(file));
            if result.is_err() {
                let _result = fs::remove_file(dst);
            }
            result
        })
    }
}
