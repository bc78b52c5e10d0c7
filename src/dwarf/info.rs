use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::ops::ControlFlow;

use gimli::AttributeValue;
use gimli::Dwarf;
use gimli::EndianSlice;
use gimli::SectionId;
use gimli::UnitType;

use crate::entry::Attr;
use crate::entry::AttrName;
use crate::entry::AttrValue;
use crate::entry::DebugInfo;
use crate::entry::Entry;
use crate::entry::FormClass;
use crate::entry::Tag;
use crate::log::debug;
use crate::log::trace;
use crate::Result;

use super::form::classify_form;
use super::form::classify_value;
use super::reader::Endianess;
use super::reader::R;


/// A [`DebugInfo`] provider backed by DWARF data.
pub struct DwarfInfo<'dat> {
    dwarf: Dwarf<R<'dat>>,
}

impl<'dat> DwarfInfo<'dat> {
    /// Create a `DwarfInfo` object, retrieving the data of the various
    /// DWARF sections through `loader`.
    ///
    /// Section data are expected to be in the host's byte order. The
    /// loader should report sections that do not exist as empty.
    pub fn load<F>(mut loader: F) -> Result<Self>
    where
        F: FnMut(SectionId) -> Result<&'dat [u8]>,
    {
        let load_section = |id| -> Result<R<'dat>> {
            let data = loader(id)?;
            Ok(EndianSlice::new(data, Endianess::default()))
        };
        let dwarf = Dwarf::load(load_section)?;
        Ok(Self { dwarf })
    }

    /// Decode the value of an attribute of the given class.
    ///
    /// Values of classes we have no use for, as well as addresses and
    /// names that cannot be looked up, are reported as opaque.
    fn attr_value(
        &self,
        unit: &gimli::Unit<R<'dat>>,
        class: FormClass,
        attr: &gimli::Attribute<R<'dat>>,
    ) -> AttrValue<'dat> {
        match class {
            FormClass::Address => match attr.value() {
                AttributeValue::Addr(addr) => AttrValue::Udata(addr),
                AttributeValue::DebugAddrIndex(index) => match self.dwarf.address(unit, index) {
                    Ok(addr) => AttrValue::Udata(addr),
                    Err(err) => {
                        debug!("failed to look up address attribute: {err}");
                        AttrValue::Opaque
                    }
                },
                _ => AttrValue::Opaque,
            },
            FormClass::Constant => {
                if let Some(value) = attr.udata_value() {
                    AttrValue::Udata(value)
                } else if let Some(value) = attr.sdata_value() {
                    AttrValue::Sdata(value)
                } else {
                    AttrValue::Opaque
                }
            }
            FormClass::String => match self.dwarf.attr_string(unit, attr.value()) {
                Ok(string) => AttrValue::Bytes(string.slice()),
                Err(err) => {
                    debug!("failed to look up string attribute: {err}");
                    AttrValue::Opaque
                }
            },
            FormClass::Block
            | FormClass::ExprLoc
            | FormClass::Flag
            | FormClass::Reference
            | FormClass::SectionOffset
            | FormClass::Unknown(..) => AttrValue::Opaque,
        }
    }

    /// Visit all entries of a single unit.
    fn visit_unit(
        &self,
        unit: &gimli::Unit<R<'dat>>,
        f: &mut dyn FnMut(&Entry<'_>) -> ControlFlow<()>,
    ) -> Result<ControlFlow<()>> {
        let mut entries = unit.entries_raw(None)?;
        while !entries.is_empty() {
            if let Some(abbrev) = entries.read_abbreviation()? {
                let entry = if abbrev.tag() == gimli::DW_TAG_subprogram {
                    let mut entry = Entry::new(Tag::Subprogram);
                    for spec in abbrev.attributes() {
                        let attr = entries.read_attribute(*spec)?;
                        let name = match attr.name() {
                            gimli::DW_AT_low_pc => AttrName::LowPc,
                            gimli::DW_AT_high_pc => AttrName::HighPc,
                            gimli::DW_AT_name => AttrName::Name,
                            _ => continue,
                        };
                        // The actual form of `DW_FORM_indirect` attributes
                        // is only known once the value has been read.
                        let class = match spec.form() {
                            gimli::DW_FORM_indirect => classify_value(&attr.raw_value()),
                            form => classify_form(form),
                        };
                        let value = self.attr_value(unit, class, &attr);
                        let () = entry.set_attr(name, Attr::new(class, value));
                    }
                    entry
                } else {
                    let () = entries.skip_attributes(abbrev.attributes())?;
                    Entry::new(Tag::Other(abbrev.tag().0))
                };

                if f(&entry).is_break() {
                    return Ok(ControlFlow::Break(()))
                }
            }
        }
        Ok(ControlFlow::Continue(()))
    }
}

impl DebugInfo for DwarfInfo<'_> {
    fn for_each_entry(&self, f: &mut dyn FnMut(&Entry<'_>) -> ControlFlow<()>) -> Result<()> {
        let mut headers = self.dwarf.units();
        while let Some(header) = headers.next()? {
            match header.type_() {
                UnitType::Type { .. } | UnitType::SplitType { .. } => continue,
                _ => (),
            }

            trace!("visiting unit at {:?}", header.offset());
            let unit = self.dwarf.unit(header)?;
            if self.visit_unit(&unit, f)?.is_break() {
                break
            }
        }
        Ok(())
    }
}

impl Debug for DwarfInfo<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "DwarfInfo")
    }
}
