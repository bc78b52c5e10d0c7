#[cfg(feature = "dwarf")]
use std::ffi::CStr;
#[cfg(feature = "dwarf")]
use std::mem::size_of;


/// A marker trait for types that can be read directly from file data.
///
/// # Safety
/// Implementors must be valid for any bit pattern.
#[cfg(feature = "dwarf")]
pub(crate) unsafe trait Pod {}


/// Cursor style reading of binary data.
///
/// All operations consume the data they return and leave the input
/// untouched if not enough data is available.
pub(crate) trait ReadRaw<'data> {
    /// Consume `len` bytes.
    fn read_slice(&mut self, len: usize) -> Option<&'data [u8]>;

    /// Consume a NUL terminated string, including the NUL byte.
    #[cfg(feature = "dwarf")]
    fn read_cstr(&mut self) -> Option<&'data CStr>;

    /// Consume `N` bytes.
    #[inline]
    fn read_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        self.read_slice(N)
            .and_then(|data| <[u8; N]>::try_from(data).ok())
    }

    /// Consume a `T` stored in the host's byte order, irrespective of
    /// alignment.
    #[cfg(feature = "dwarf")]
    #[inline]
    fn read_pod<T>(&mut self) -> Option<T>
    where
        T: Pod,
    {
        let data = self.read_slice(size_of::<T>())?;
        // SAFETY: `data` covers `size_of::<T>()` bytes and `T` is `Pod`,
        //         so any content makes for a valid `T`.
        let value = unsafe { data.as_ptr().cast::<T>().read_unaligned() };
        Some(value)
    }

    /// Consume a little endian `u16`.
    #[inline]
    fn read_u16_le(&mut self) -> Option<u16> {
        self.read_array().map(u16::from_le_bytes)
    }

    /// Consume a little endian `u32`.
    #[inline]
    fn read_u32_le(&mut self) -> Option<u32> {
        self.read_array().map(u32::from_le_bytes)
    }
}

impl<'data> ReadRaw<'data> for &'data [u8] {
    #[inline]
    fn read_slice(&mut self, len: usize) -> Option<&'data [u8]> {
        if len > self.len() {
            return None
        }
        let (head, tail) = self.split_at(len);
        *self = tail;
        Some(head)
    }

    #[cfg(feature = "dwarf")]
    #[inline]
    fn read_cstr(&mut self) -> Option<&'data CStr> {
        let cstr = CStr::from_bytes_until_nul(self).ok()?;
        let _nul_terminated = self.read_slice(cstr.to_bytes_with_nul().len())?;
        Some(cstr)
    }
}


#[cfg(test)]
mod tests {
    use super::*;


    /// Check that short reads fail without consuming anything.
    #[test]
    fn short_reads() {
        let mut raw = [1u8, 2, 3].as_slice();
        assert_eq!(raw.read_slice(4), None);
        assert_eq!(raw.read_array::<4>(), None);
        assert_eq!(raw.read_u32_le(), None);
        assert_eq!(raw, &[1, 2, 3]);

        assert_eq!(raw.read_slice(0), Some([].as_slice()));
        assert_eq!(raw.read_slice(3), Some([1, 2, 3].as_slice()));
        assert!(raw.is_empty());
    }

    /// Check that little endian values are decoded independent of the
    /// host's byte order.
    #[test]
    fn le_reading() {
        let mut raw = [0x0f, 0x00, 0x00, 0x10, 0x00, 0x00, 0x42].as_slice();
        assert_eq!(raw.read_u16_le(), Some(0x000f));
        assert_eq!(raw.read_u32_le(), Some(0x1000));
        // Only a single byte is left.
        assert_eq!(raw.read_u16_le(), None);
        assert_eq!(raw, &[0x42]);
    }

    /// Check that we can read host byte order values irrespective of
    /// alignment.
    #[cfg(feature = "dwarf")]
    #[test]
    fn pod_reading() {
        #[derive(Debug, PartialEq)]
        #[repr(C)]
        struct Pair {
            a: u32,
            b: u32,
        }

        // SAFETY: `Pair` is made up of integers only.
        unsafe impl Pod for Pair {}

        let mut data = vec![0xffu8];
        let () = data.extend_from_slice(&0xdeadbeefu32.to_ne_bytes());
        let () = data.extend_from_slice(&7u32.to_ne_bytes());

        let mut raw = &data[1..];
        let pair = raw.read_pod::<Pair>().unwrap();
        assert_eq!(
            pair,
            Pair {
                a: 0xdeadbeef,
                b: 7
            }
        );
        assert_eq!(raw.read_pod::<Pair>(), None);
    }

    /// Check that we can read a NUL terminated string from a slice.
    #[cfg(feature = "dwarf")]
    #[test]
    fn cstr_reading() {
        let mut raw = b".text\0.data".as_slice();
        let cstr = raw.read_cstr().unwrap();
        assert_eq!(cstr.to_bytes(), b".text");
        assert_eq!(raw, b".data");

        // The remainder lacks a terminator.
        assert_eq!(raw.read_cstr(), None);
        assert_eq!(raw, b".data");
    }
}
