//! A [`DebugInfo`][crate::entry::DebugInfo] provider reading DWARF
//! debug information.

mod form;
mod info;
mod reader;

pub use gimli::SectionId;

pub use form::classify_form;
pub use info::DwarfInfo;

pub(crate) use reader::DwarfSections;
