//! Conversions between wide strings and the process multibyte
//! encoding, which is assumed to be UTF-8.
//!
//! Both directions work in two passes: a query pass computes the
//! exact output length and validates the input, then a second
//! pass writes into a buffer of exactly that size. The input
//! must not be mutated between the passes. Callers holding only
//! raw pointers (see [`crate::ffi`]) inherit the same
//! assumption the CRT makes.

use std::ffi::CString;

use cfg_if::cfg_if;
use tracing::trace;
use widestring::{WideCStr, WideCString, WideChar};

use crate::{
    buf::{WideBuf, WideOut},
    error::{Error, Result},
    locale,
};

cfg_if! {
    if #[cfg(windows)] {
        // `wchar_t` holds UTF-16 code units.
        fn decode(units: &[WideChar]) -> impl Iterator<Item = Option<char>> + '_ {
            char::decode_utf16(units.iter().copied()).map(|r| r.ok())
        }

        fn wide_len(s: &str) -> usize {
            s.encode_utf16().count()
        }

        fn encode_into(s: &str, dst: &mut [WideChar]) -> usize {
            dst.iter_mut().zip(s.encode_utf16()).map(|(d, u)| *d = u).count()
        }

        fn encode_extend(s: &str, dst: &mut Vec<WideChar>) {
            dst.extend(s.encode_utf16())
        }
    } else {
        // `wchar_t` holds UTF-32 code points.
        fn decode(units: &[WideChar]) -> impl Iterator<Item = Option<char>> + '_ {
            units.iter().map(|&u| char::from_u32(u))
        }

        fn wide_len(s: &str) -> usize {
            s.chars().count()
        }

        fn encode_into(s: &str, dst: &mut [WideChar]) -> usize {
            dst.iter_mut()
                .zip(s.chars())
                .map(|(d, c)| *d = WideChar::from(c))
                .count()
        }

        fn encode_extend(s: &str, dst: &mut Vec<WideChar>) {
            dst.extend(s.chars().map(WideChar::from))
        }
    }
}

/// Returns the number of bytes `src` occupies once encoded,
/// not counting the null terminator.
///
/// This is the query pass of [`to_multibyte`].
pub fn multibyte_len(src: &WideCStr) -> Result<usize> {
    decode(src.as_slice()).try_fold(0usize, |n, c| {
        let c = c.ok_or(Error::Encoding)?;
        n.checked_add(c.len_utf8()).ok_or(Error::OutOfMemory)
    })
}

/// Converts a wide string into a null-terminated multibyte
/// string suitable for the byte-string OS primitives.
///
/// The returned buffer is exactly `multibyte_len(src) + 1`
/// bytes long.
pub fn to_multibyte(src: &WideCStr) -> Result<CString> {
    locale::init();

    let len = multibyte_len(src)?;
    let total = len.checked_add(1).ok_or(Error::OutOfMemory)?;

    let mut buf = Vec::new();
    buf.try_reserve_exact(total)?;
    let mut tmp = [0u8; 4];
    for c in decode(src.as_slice()) {
        let c = c.ok_or(Error::Encoding)?;
        buf.extend_from_slice(c.encode_utf8(&mut tmp).as_bytes());
    }
    buf.push(0);
    trace!(len, "encoded wide string");

    // `src` cannot contain an interior null, so neither can
    // `buf`.
    CString::from_vec_with_nul(buf).map_err(|_| Error::InvalidArgument)
}

/// Converts a multibyte string into a wide string.
///
/// `src` is read up to its first null byte, if any. The result
/// is written according to `dst`; see [`WideBuf`].
pub fn to_wide<'a>(src: &[u8], dst: WideBuf<'a>) -> Result<WideOut<'a>> {
    locale::init();

    let src = src
        .iter()
        .position(|&b| b == 0)
        .and_then(|n| src.get(..n))
        .unwrap_or(src);
    let s = core::str::from_utf8(src).map_err(|_| Error::Encoding)?;

    let len = wide_len(s);
    let total = len.checked_add(1).ok_or(Error::OutOfMemory)?;
    trace!(len, "decoded multibyte string");

    match dst {
        WideBuf::Allocate => {
            let mut buf = Vec::new();
            buf.try_reserve_exact(total)?;
            encode_extend(s, &mut buf);
            // `from_vec` appends the terminator into the
            // capacity reserved above.
            let out = WideCString::from_vec(buf).map_err(|_| Error::InvalidArgument)?;
            Ok(WideOut::Allocated(out))
        }
        WideBuf::Caller(buf) => {
            if total > buf.len() {
                return Err(Error::RangeTooSmall);
            }
            let (out, _) = buf.split_at_mut(total);
            let n = encode_into(s, out);
            debug_assert_eq!(n, len);
            if let Some(nul) = out.last_mut() {
                *nul = 0;
            }
            // SAFETY: `out` ends with the null terminator we
            // just wrote and, since `s` is valid UTF-8 with no
            // null bytes, contains no other nulls.
            Ok(WideOut::Written(unsafe {
                WideCStr::from_slice_unchecked(out)
            }))
        }
    }
}

/// Converts a multibyte string into the caller's wide buffer.
///
/// `src` is read up to its first null byte, if any. Returns the
/// number of wide units written, not counting the null
/// terminator, which is always written. Fails with
/// [`Error::RangeTooSmall`] (without writing) if `dst` cannot
/// hold the whole result, and with [`Error::InvalidArgument`]
/// if `dst` is empty.
pub fn multibyte_to_wide(src: &[u8], dst: &mut [WideChar]) -> Result<usize> {
    if dst.is_empty() {
        return Err(Error::InvalidArgument);
    }
    let out = to_wide(src, WideBuf::Caller(dst))?;
    Ok(out.len())
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn wide(s: &str) -> WideCString {
        WideCString::from_str(s).expect("no interior nul")
    }

    /// A lone high surrogate, which no UTF-8 locale can
    /// represent.
    fn unpaired_surrogate() -> WideCString {
        WideCString::from_vec(vec![WideChar::from(b'a'), 0xD800])
            .expect("no interior nul")
    }

    #[test]
    fn test_round_trip() {
        let tests = ["", "a", "hello, world", "données", "日本語/ファイル", "🦀.rs"];
        for (i, input) in tests.into_iter().enumerate() {
            let w = wide(input);
            let mb = to_multibyte(&w).expect("encodable");
            assert_eq!(mb.to_bytes(), input.as_bytes(), "#{i}");
            assert_eq!(mb.as_bytes_with_nul().len(), input.len() + 1, "#{i}");

            let back = to_wide(mb.to_bytes(), WideBuf::Allocate).expect("decodable");
            assert_eq!(back.as_wide_cstr(), w.as_ucstr(), "#{i}");
        }
    }

    #[test]
    fn test_multibyte_len() {
        assert_eq!(multibyte_len(&wide("")), Ok(0));
        assert_eq!(multibyte_len(&wide("abc")), Ok(3));
        assert_eq!(multibyte_len(&wide("é")), Ok(2));
        assert_eq!(multibyte_len(&wide("🦀")), Ok(4));
        assert_eq!(multibyte_len(&unpaired_surrogate()), Err(Error::Encoding));
    }

    #[test]
    fn test_to_multibyte_rejects_unpaired_surrogate() {
        assert_eq!(to_multibyte(&unpaired_surrogate()), Err(Error::Encoding));
    }

    #[test]
    fn test_to_wide_rejects_invalid_utf8() {
        let tests: [&[u8]; 3] = [b"\xff", b"abc\xc3", b"\xed\xa0\x80"];
        for (i, input) in tests.into_iter().enumerate() {
            assert_eq!(
                to_wide(input, WideBuf::Allocate),
                Err(Error::Encoding),
                "#{i}"
            );
        }
    }

    #[test]
    fn test_to_wide_allocates_exactly() {
        let out = to_wide("données".as_bytes(), WideBuf::Allocate).expect("valid");
        assert!(out.is_allocated());
        assert_eq!(out.len(), 7);
        assert_eq!(out.as_slice_with_nul().len(), 8);
    }

    #[test]
    fn test_to_wide_caller_buffer() {
        let mut buf: [WideChar; 8] = [0x55; 8];
        let out = to_wide(b"abc", WideBuf::Caller(&mut buf)).expect("fits");
        assert!(!out.is_allocated());
        assert_eq!(out.as_wide_cstr(), wide("abc").as_ucstr());
        assert_eq!(&buf[..4], &[0x61, 0x62, 0x63, 0]);
        assert_eq!(&buf[4..], &[0x55; 4], "wrote past the terminator");
    }

    #[test]
    fn test_to_wide_too_small_leaves_buffer_untouched() {
        // Exactly large enough, then one unit short.
        let mut buf: [WideChar; 4] = [0x55; 4];
        assert!(to_wide(b"abc", WideBuf::Caller(&mut buf)).is_ok());

        let mut buf: [WideChar; 3] = [0x55; 3];
        assert_eq!(
            to_wide(b"abc", WideBuf::Caller(&mut buf)),
            Err(Error::RangeTooSmall)
        );
        assert_eq!(buf, [0x55; 3]);
    }

    #[test]
    fn test_to_wide_stops_at_nul() {
        let out = to_wide(b"ab\0cd", WideBuf::Allocate).expect("valid");
        assert_eq!(out.as_wide_cstr(), wide("ab").as_ucstr());
    }

    #[test]
    fn test_multibyte_to_wide() {
        let mut buf: [WideChar; 16] = [0x55; 16];
        assert_eq!(multibyte_to_wide("données".as_bytes(), &mut buf), Ok(7));
        assert_eq!(buf[7], 0);

        assert_eq!(multibyte_to_wide(b"", &mut buf), Ok(0));
        assert_eq!(buf[0], 0);

        assert_eq!(
            multibyte_to_wide(b"abc", &mut []),
            Err(Error::InvalidArgument)
        );
        assert_eq!(
            multibyte_to_wide(b"abc", &mut [0; 3]),
            Err(Error::RangeTooSmall)
        );
        assert_eq!(
            multibyte_to_wide(b"\xff", &mut buf),
            Err(Error::Encoding)
        );
    }

    mod prop {
        use proptest::prelude::*;
        use test_log::test;

        use super::*;

        proptest! {
            #[test]
            fn proptest_round_trip(s in "\\PC*") {
                let w = wide(&s);
                let mb = to_multibyte(&w).expect("valid Unicode is encodable");
                assert_eq!(mb.to_bytes(), s.as_bytes());

                let back = to_wide(mb.to_bytes(), WideBuf::Allocate).expect("decodable");
                assert_eq!(back.as_wide_cstr(), w.as_ucstr());
            }

            #[test]
            fn proptest_arbitrary_bytes(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
                let prefix = bytes.split(|&b| b == 0).next().unwrap_or_default();
                match to_wide(&bytes, WideBuf::Allocate) {
                    Ok(out) => {
                        let mb = to_multibyte(&out).expect("decoded text is encodable");
                        assert_eq!(mb.to_bytes(), prefix);
                    }
                    Err(err) => {
                        assert_eq!(err, Error::Encoding);
                        assert!(core::str::from_utf8(prefix).is_err());
                    }
                }
            }
        }
    }
}
