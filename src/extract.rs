//! Extraction of function symbols from debug information.

use std::ops::ControlFlow;

use crate::entry::AttrName;
use crate::entry::AttrValue;
use crate::entry::DebugInfo;
use crate::entry::Entry;
use crate::entry::FormClass;
use crate::entry::Tag;
use crate::log::error;
use crate::log::trace;
use crate::log::warn;
use crate::table::RecordError;
use crate::table::SymbolRecord;
use crate::Result;


/// The outcome of resolving a single debug information entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution<'name> {
    /// The entry describes a function and was converted into a record.
    Symbol(SymbolRecord<'name>),
    /// The entry does not describe a function.
    NotSubprogram,
    /// The entry lacks the named attribute (or its value is not of the
    /// expected kind).
    Incomplete(AttrName),
    /// The entry's high address is encoded in a way we do not support.
    UnsupportedEncoding(FormClass),
    /// The entry's data do not form a valid record.
    Invalid(RecordError),
}


/// Resolve a debug information entry into a [`SymbolRecord`].
///
/// The end of the address range may either be stored as an absolute
/// address or as an offset relative to the start address.
pub fn resolve<'dat>(entry: &Entry<'dat>) -> Resolution<'dat> {
    if entry.tag() != Tag::Subprogram {
        return Resolution::NotSubprogram
    }

    let low_pc = match entry.attr(AttrName::LowPc).and_then(|attr| attr.udata()) {
        Some(low_pc) => low_pc,
        None => return Resolution::Incomplete(AttrName::LowPc),
    };
    let name = match entry.attr(AttrName::Name).and_then(|attr| attr.bytes()) {
        Some(name) => name,
        None => return Resolution::Incomplete(AttrName::Name),
    };
    let high_pc = match entry.attr(AttrName::HighPc) {
        Some(attr) => attr,
        None => return Resolution::Incomplete(AttrName::HighPc),
    };

    let high_pc = match (high_pc.class, high_pc.value) {
        (FormClass::Address, AttrValue::Udata(addr)) => addr,
        (FormClass::Constant, AttrValue::Udata(offset)) => match low_pc.checked_add(offset) {
            Some(addr) => addr,
            None => return Resolution::Invalid(RecordError::RangeOverflow { low_pc, offset }),
        },
        // Constants stored with a signed form are only a problem if they
        // are actually negative.
        (FormClass::Constant, AttrValue::Sdata(offset)) => match u64::try_from(offset) {
            Ok(offset) => match low_pc.checked_add(offset) {
                Some(addr) => addr,
                None => {
                    return Resolution::Invalid(RecordError::RangeOverflow { low_pc, offset })
                }
            },
            Err(..) => return Resolution::Invalid(RecordError::NegativeLength { offset }),
        },
        (class, _) => return Resolution::UnsupportedEncoding(class),
    };

    match SymbolRecord::new(name, low_pc, high_pc) {
        Ok(record) => Resolution::Symbol(record),
        Err(err) => Resolution::Invalid(err),
    }
}


/// Report a resolution that did not produce a record.
pub(crate) fn report(resolution: &Resolution<'_>, entry: &Entry<'_>) {
    let name = entry
        .attr(AttrName::Name)
        .and_then(|attr| attr.bytes())
        .map(String::from_utf8_lossy)
        .unwrap_or_default();

    match resolution {
        Resolution::Symbol(..) | Resolution::NotSubprogram => (),
        Resolution::Incomplete(attr) => {
            trace!("skipping function `{name}` without {attr} attribute")
        }
        Resolution::UnsupportedEncoding(class) => {
            error!("skipping function `{name}`: invalid high_pc class ({class})")
        }
        Resolution::Invalid(err) => warn!("skipping function `{name}`: {err}"),
    }
}


/// Resolve every entry of `info`, handing each [`Resolution`] along
/// with the entry it was produced from to `f`.
///
/// Entries are visited in the order the provider enumerates them. The
/// walk stops once `f` returns [`ControlFlow::Break`].
pub fn for_each_resolution<F>(info: &dyn DebugInfo, mut f: F) -> Result<()>
where
    F: FnMut(&Entry<'_>, Resolution<'_>) -> ControlFlow<()>,
{
    info.for_each_entry(&mut |entry| f(entry, resolve(entry)))
}


/// Hand every function symbol of `info` to `f`, skipping entries that
/// cannot be resolved.
///
/// Skipped functions are logged.
pub fn for_each_symbol<F>(info: &dyn DebugInfo, mut f: F) -> Result<()>
where
    F: FnMut(&SymbolRecord<'_>) -> ControlFlow<()>,
{
    for_each_resolution(info, |entry, resolution| match resolution {
        Resolution::Symbol(record) => f(&record),
        resolution => {
            let () = report(&resolution, entry);
            ControlFlow::Continue(())
        }
    })
}
