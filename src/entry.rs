//! A minimal model of debug information, as consumed by the symbol
//! extractor.
//!
//! Debug information is organized in units, each containing an ordered
//! list of entries. Every entry carries a [`Tag`] and the subset of its
//! attributes that is relevant for symbol extraction. Attribute values
//! keep track of the [`FormClass`] they were encoded with, as the
//! meaning of some attributes (e.g., [`AttrName::HighPc`]) depends on
//! it.

use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::ops::ControlFlow;

use crate::Result;


/// The tag of a debug information entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tag {
    /// An entry describing a function.
    Subprogram,
    /// Any other kind of entry, with its raw tag value.
    Other(u16),
}


/// The attributes of an entry that are of interest to us.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttrName {
    /// The lowest address of the entry's code.
    LowPc,
    /// The address one past the end of the entry's code, either as an
    /// absolute address or as an offset relative to
    /// [`AttrName::LowPc`].
    HighPc,
    /// The entry's name.
    Name,
}

impl Display for AttrName {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Self::LowPc => "low_pc",
            Self::HighPc => "high_pc",
            Self::Name => "name",
        };
        f.write_str(name)
    }
}


/// The class of the encoding used for an attribute value.
///
/// The classes mirror the attribute classes of DWARF.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormClass {
    /// A machine address.
    Address,
    /// An uninterpreted block of bytes.
    Block,
    /// An integer constant.
    Constant,
    /// A location expression.
    ExprLoc,
    /// A boolean flag.
    Flag,
    /// A reference to another entry.
    Reference,
    /// An offset into another debug section.
    SectionOffset,
    /// A string, possibly stored out of line.
    String,
    /// A form we do not know the class of, with its raw value.
    Unknown(u16),
}

impl Display for FormClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let class = match self {
            Self::Address => "address",
            Self::Block => "block",
            Self::Constant => "constant",
            Self::ExprLoc => "exprloc",
            Self::Flag => "flag",
            Self::Reference => "reference",
            Self::SectionOffset => "section offset",
            Self::String => "string",
            Self::Unknown(form) => return write!(f, "unknown ({form:#x})"),
        };
        f.write_str(class)
    }
}


/// A decoded attribute value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttrValue<'dat> {
    /// An unsigned integer (an address or a constant).
    Udata(u64),
    /// A signed constant, e.g., a negative one stored with
    /// `DW_FORM_sdata`.
    Sdata(i64),
    /// A byte string, not including any terminating NUL byte.
    Bytes(&'dat [u8]),
    /// A value that was not decoded.
    Opaque,
}


/// An attribute value along with the class of its encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Attr<'dat> {
    /// The class of the encoding the value was stored with.
    pub class: FormClass,
    /// The decoded value.
    pub value: AttrValue<'dat>,
}

impl<'dat> Attr<'dat> {
    /// Create a new attribute from its encoding class and value.
    #[inline]
    pub fn new(class: FormClass, value: AttrValue<'dat>) -> Self {
        Self { class, value }
    }

    /// Create an address class attribute.
    #[inline]
    pub fn address(addr: u64) -> Self {
        Self::new(FormClass::Address, AttrValue::Udata(addr))
    }

    /// Create a constant class attribute.
    #[inline]
    pub fn constant(value: u64) -> Self {
        Self::new(FormClass::Constant, AttrValue::Udata(value))
    }

    /// Create a string class attribute.
    #[inline]
    pub fn string(value: &'dat [u8]) -> Self {
        Self::new(FormClass::String, AttrValue::Bytes(value))
    }

    /// Retrieve the value as an unsigned integer, if it is one.
    #[inline]
    pub fn udata(&self) -> Option<u64> {
        match self.value {
            AttrValue::Udata(value) => Some(value),
            AttrValue::Sdata(..) | AttrValue::Bytes(..) | AttrValue::Opaque => None,
        }
    }

    /// Retrieve the value as a byte string, if it is one.
    #[inline]
    pub fn bytes(&self) -> Option<&'dat [u8]> {
        match self.value {
            AttrValue::Bytes(value) => Some(value),
            AttrValue::Udata(..) | AttrValue::Sdata(..) | AttrValue::Opaque => None,
        }
    }
}


/// A single debug information entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry<'dat> {
    tag: Tag,
    low_pc: Option<Attr<'dat>>,
    high_pc: Option<Attr<'dat>>,
    name: Option<Attr<'dat>>,
}

impl<'dat> Entry<'dat> {
    /// Create a new entry without any attributes.
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            low_pc: None,
            high_pc: None,
            name: None,
        }
    }

    /// Set an attribute, returning the modified entry.
    pub fn with_attr(mut self, name: AttrName, attr: Attr<'dat>) -> Self {
        let () = self.set_attr(name, attr);
        self
    }

    /// Set an attribute, replacing any previous value.
    pub fn set_attr(&mut self, name: AttrName, attr: Attr<'dat>) {
        *self.slot(name) = Some(attr);
    }

    fn slot(&mut self, name: AttrName) -> &mut Option<Attr<'dat>> {
        match name {
            AttrName::LowPc => &mut self.low_pc,
            AttrName::HighPc => &mut self.high_pc,
            AttrName::Name => &mut self.name,
        }
    }

    /// Retrieve the entry's tag.
    #[inline]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Look up an attribute.
    pub fn attr(&self, name: AttrName) -> Option<&Attr<'dat>> {
        match name {
            AttrName::LowPc => self.low_pc.as_ref(),
            AttrName::HighPc => self.high_pc.as_ref(),
            AttrName::Name => self.name.as_ref(),
        }
    }
}


/// A read-only provider of debug information.
pub trait DebugInfo {
    /// Invoke `f` for every entry of every unit, in unit order and in
    /// tree traversal order within each unit.
    ///
    /// The walk ends early once `f` returns [`ControlFlow::Break`].
    fn for_each_entry(&self, f: &mut dyn FnMut(&Entry<'_>) -> ControlFlow<()>) -> Result<()>;
}


/// An in-memory [`DebugInfo`] provider.
///
/// ```
/// use funcsym::entry::Attr;
/// use funcsym::entry::AttrName;
/// use funcsym::entry::Entry;
/// use funcsym::entry::Tag;
/// use funcsym::entry::Units;
///
/// let main = Entry::new(Tag::Subprogram)
///     .with_attr(AttrName::Name, Attr::string(b"main"))
///     .with_attr(AttrName::LowPc, Attr::address(0x1000))
///     .with_attr(AttrName::HighPc, Attr::constant(0x10));
/// let units = Units::from(vec![vec![main]]);
/// assert_eq!(units.len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Units<'dat> {
    units: Vec<Vec<Entry<'dat>>>,
}

impl<'dat> Units<'dat> {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a unit, comprised of the provided entries.
    pub fn push_unit<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = Entry<'dat>>,
    {
        let () = self.units.push(entries.into_iter().collect());
    }

    /// Retrieve the number of units.
    #[inline]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Check whether there are no units.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl<'dat> From<Vec<Vec<Entry<'dat>>>> for Units<'dat> {
    fn from(units: Vec<Vec<Entry<'dat>>>) -> Self {
        Self { units }
    }
}

impl DebugInfo for Units<'_> {
    fn for_each_entry(&self, f: &mut dyn FnMut(&Entry<'_>) -> ControlFlow<()>) -> Result<()> {
        for entry in self.units.iter().flatten() {
            if f(entry).is_break() {
                break
            }
        }
        Ok(())
    }
}
