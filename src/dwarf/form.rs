use gimli::AttributeValue;
use gimli::DwForm;
use gimli::Reader;

use crate::entry::FormClass;


/// Determine the class of the provided attribute form.
///
/// Classes are assigned as per the DWARF 5 standard (section 7.5.5),
/// with GNU extensions mapped to the class of their standardized
/// counterparts. Forms of the `lineptr`, `loclist`, `loclistsptr`,
/// `rnglist`, and similar classes are all reported as
/// [`FormClass::SectionOffset`].
pub fn classify_form(form: DwForm) -> FormClass {
    match form {
        gimli::DW_FORM_addr
        | gimli::DW_FORM_addrx
        | gimli::DW_FORM_addrx1
        | gimli::DW_FORM_addrx2
        | gimli::DW_FORM_addrx3
        | gimli::DW_FORM_addrx4
        | gimli::DW_FORM_GNU_addr_index => FormClass::Address,
        gimli::DW_FORM_block
        | gimli::DW_FORM_block1
        | gimli::DW_FORM_block2
        | gimli::DW_FORM_block4 => FormClass::Block,
        gimli::DW_FORM_data1
        | gimli::DW_FORM_data2
        | gimli::DW_FORM_data4
        | gimli::DW_FORM_data8
        | gimli::DW_FORM_data16
        | gimli::DW_FORM_sdata
        | gimli::DW_FORM_udata
        | gimli::DW_FORM_implicit_const => FormClass::Constant,
        gimli::DW_FORM_exprloc => FormClass::ExprLoc,
        gimli::DW_FORM_flag | gimli::DW_FORM_flag_present => FormClass::Flag,
        gimli::DW_FORM_ref1
        | gimli::DW_FORM_ref2
        | gimli::DW_FORM_ref4
        | gimli::DW_FORM_ref8
        | gimli::DW_FORM_ref_udata
        | gimli::DW_FORM_ref_addr
        | gimli::DW_FORM_ref_sig8
        | gimli::DW_FORM_ref_sup4
        | gimli::DW_FORM_ref_sup8
        | gimli::DW_FORM_GNU_ref_alt => FormClass::Reference,
        gimli::DW_FORM_sec_offset | gimli::DW_FORM_loclistx | gimli::DW_FORM_rnglistx => {
            FormClass::SectionOffset
        }
        gimli::DW_FORM_string
        | gimli::DW_FORM_strp
        | gimli::DW_FORM_line_strp
        | gimli::DW_FORM_strp_sup
        | gimli::DW_FORM_strx
        | gimli::DW_FORM_strx1
        | gimli::DW_FORM_strx2
        | gimli::DW_FORM_strx3
        | gimli::DW_FORM_strx4
        | gimli::DW_FORM_GNU_str_index
        | gimli::DW_FORM_GNU_strp_alt => FormClass::String,
        form => FormClass::Unknown(form.0),
    }
}


/// Determine the class of an attribute based on its raw (i.e., not
/// normalized) value.
///
/// This is only needed for `DW_FORM_indirect` attributes, whose actual
/// form is stored alongside the value. Values not read from any of the
/// standard forms are reported as `Unknown(DW_FORM_indirect)`.
pub(crate) fn classify_value<R>(value: &AttributeValue<R>) -> FormClass
where
    R: Reader,
{
    match value {
        AttributeValue::Addr(..) | AttributeValue::DebugAddrIndex(..) => FormClass::Address,
        AttributeValue::Block(..) => FormClass::Block,
        AttributeValue::Data1(..)
        | AttributeValue::Data2(..)
        | AttributeValue::Data4(..)
        | AttributeValue::Data8(..)
        | AttributeValue::Sdata(..)
        | AttributeValue::Udata(..) => FormClass::Constant,
        AttributeValue::Exprloc(..) => FormClass::ExprLoc,
        AttributeValue::Flag(..) => FormClass::Flag,
        AttributeValue::UnitRef(..)
        | AttributeValue::DebugInfoRef(..)
        | AttributeValue::DebugInfoRefSup(..)
        | AttributeValue::DebugTypesRef(..) => FormClass::Reference,
        AttributeValue::SecOffset(..)
        | AttributeValue::DebugAddrBase(..)
        | AttributeValue::DebugLineRef(..)
        | AttributeValue::LocationListsRef(..)
        | AttributeValue::DebugLocListsBase(..)
        | AttributeValue::DebugLocListsIndex(..)
        | AttributeValue::DebugMacinfoRef(..)
        | AttributeValue::DebugMacroRef(..)
        | AttributeValue::RangeListsRef(..)
        | AttributeValue::DebugRngListsBase(..)
        | AttributeValue::DebugRngListsIndex(..)
        | AttributeValue::DebugStrOffsetsBase(..) => FormClass::SectionOffset,
        AttributeValue::String(..)
        | AttributeValue::DebugStrRef(..)
        | AttributeValue::DebugStrRefSup(..)
        | AttributeValue::DebugStrOffsetsIndex(..)
        | AttributeValue::DebugLineStrRef(..) => FormClass::String,
        _ => FormClass::Unknown(gimli::DW_FORM_indirect.0),
    }
}
