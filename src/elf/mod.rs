mod parser;
pub(crate) mod types;

pub(crate) use parser::ElfParser;
