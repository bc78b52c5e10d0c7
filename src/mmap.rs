use std::fs::File;
use std::ops::Deref;
use std::path::Path;

use memmap2::Mmap as Mapping;
use memmap2::MmapOptions;

use crate::Error;
use crate::ErrorExt as _;
use crate::Result;


/// A read-only memory mapping of a complete file.
#[derive(Debug)]
pub(crate) struct Mmap {
    /// The mapping, if any. Empty files cannot be mapped and are
    /// represented as `None`.
    mapping: Option<Mapping>,
}

impl Mmap {
    /// Open and map the file at `path`.
    pub(crate) fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("failed to open `{}`", path.display()))?;
        Self::map(&file).with_context(|| format!("failed to map `{}`", path.display()))
    }

    /// Map an already opened file.
    pub(crate) fn map(file: &File) -> Result<Self> {
        let size = file.metadata()?.len();
        let len = usize::try_from(size)
            .map_err(Error::with_invalid_data)
            .with_context(|| format!("file of {size} bytes exceeds address space"))?;

        let mapping = if len > 0 {
            // SAFETY: We only ever read from the mapping. Concurrent
            //         modification of the underlying file is not
            //         something we can guard against.
            let mapping = unsafe { MmapOptions::new().len(len).map(file) }?;
            Some(mapping)
        } else {
            None
        };
        Ok(Self { mapping })
    }
}

impl Deref for Mmap {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match &self.mapping {
            Some(mapping) => &mapping[..],
            None => &[],
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write as _;

    use tempfile::NamedTempFile;
    use test_log::test;

    use crate::ErrorKind;


    /// Check that a file's content is accessible through the mapping.
    #[test]
    fn file_mapping() {
        let mut file = NamedTempFile::new().unwrap();
        let data = b"\x0f\x00\x00\x10\x00\x00\x10\x10\x00\x00main\x00\x00\x00";
        let () = file.write_all(data).unwrap();
        let () = file.flush().unwrap();

        let mmap = Mmap::open(file.path()).unwrap();
        assert_ne!(format!("{mmap:?}"), "");
        assert_eq!(&*mmap, data);
    }

    /// Empty files map to empty data.
    #[test]
    fn empty_file_mapping() {
        let file = NamedTempFile::new().unwrap();
        let mmap = Mmap::map(file.as_file()).unwrap();
        assert!(mmap.is_empty());
    }

    /// Make sure that a missing file is reported as such, with the path
    /// as context.
    #[test]
    fn open_missing_file() {
        let err = Mmap::open("/does-not-exist").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("/does-not-exist"), "{err}");
    }
}
