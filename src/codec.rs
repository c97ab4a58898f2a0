//! Textual and binary encodings of byte strings: quoted literals with
//! backslash escapes, and a compact variable-width length prefix.
//!
//! Both encodings append into a caller-supplied [`ByteString`] and decode
//! from a caller-supplied byte slice, reporting how much input they
//! consumed, so they embed cleanly inside whatever framing a larger
//! document format defines around them.

use core::fmt;

use crate::storage::TryReserveError;
use crate::string::ByteString;

/// The error type for the decoding half of the codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The input does not begin with an opening quote.
    MissingQuote,
    /// The input ran out before the closing quote.
    UnterminatedLiteral,
    /// An escape sequence is unrecognized, or its octal value does not fit
    /// one byte.
    InvalidEscape,
    /// The input ran out before the bytes its length marker promised.
    Truncated,
    /// The encoded length does not fit the platform's size domain.
    Overflow,
    /// Decoded output could not acquire storage.
    Reserve(TryReserveError),
}

impl From<TryReserveError> for DecodeError {
    #[inline]
    fn from(e: TryReserveError) -> Self {
        DecodeError::Reserve(e)
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::MissingQuote => f.write_str("literal does not begin with a quote"),
            DecodeError::UnterminatedLiteral => {
                f.write_str("literal ends before its closing quote")
            }
            DecodeError::InvalidEscape => {
                f.write_str("unrecognized or out-of-range escape sequence")
            }
            DecodeError::Truncated => f.write_str("input ends before the encoded length"),
            DecodeError::Overflow => {
                f.write_str("encoded length does not fit the platform size domain")
            }
            DecodeError::Reserve(e) => e.fmt(f),
        }
    }
}

/// How a byte is rendered inside a quoted literal.
pub(crate) enum Escape {
    /// Printable ASCII, written as itself.
    Verbatim,
    /// One of the two-character escapes, written as `\` plus this byte.
    Short(u8),
    /// Everything else, written as `\` plus three octal digits.
    Octal,
}

pub(crate) fn escape_byte(byte: u8) -> Escape {
    match byte {
        b'\\' => Escape::Short(b'\\'),
        b'"' => Escape::Short(b'"'),
        b'\n' => Escape::Short(b'n'),
        b'\t' => Escape::Short(b't'),
        b'\r' => Escape::Short(b'r'),
        0x20..=0x7E => Escape::Verbatim,
        _ => Escape::Octal,
    }
}

impl ByteString {
    /// Appends the contents to `dest` as a quoted literal: wrapped in
    /// `"`, with `\` `"` LF HT CR as two-character escapes and every other
    /// byte outside printable ASCII as a three-digit octal escape.
    ///
    /// Clearing `dest` first turns the append into an overwrite. On
    /// failure `dest` keeps whatever had been appended so far.
    ///
    /// # Examples
    /// ```
    /// let s = corda::ByteString::from_bytes(b"say \"hi\"\n");
    /// let mut out = corda::ByteString::new();
    /// s.quote_into(&mut out).unwrap();
    /// assert_eq!(out, *r#""say \"hi\"\n""#);
    /// ```
    pub fn quote_into(&self, dest: &mut ByteString) -> Result<(), TryReserveError> {
        dest.try_push_byte(b'"')?;
        for &b in self.as_bytes() {
            match escape_byte(b) {
                Escape::Verbatim => dest.try_push_byte(b)?,
                Escape::Short(c) => dest.try_push_bytes(&[b'\\', c])?,
                Escape::Octal => {
                    let esc = [b'\\', b'0' + (b >> 6), b'0' + (b >> 3 & 7), b'0' + (b & 7)];
                    dest.try_push_bytes(&esc)?;
                }
            }
        }
        dest.try_push_byte(b'"')
    }

    /// Returns the contents encoded as a quoted literal.
    ///
    /// See [`quote_into`](ByteString::quote_into) for the escape rules.
    pub fn to_quoted(&self) -> Result<ByteString, TryReserveError> {
        let mut out = ByteString::new();
        self.quote_into(&mut out)?;
        Ok(out)
    }

    /// Decodes one quoted literal from the front of `src`, returning the
    /// decoded string and the number of input bytes consumed (closing
    /// quote included).
    ///
    /// Escape handling mirrors [`quote_into`](ByteString::quote_into):
    /// the five two-character escapes and exactly-three-digit octal
    /// escapes up to `\377`. Any other byte before the closing quote is
    /// taken verbatim, so a literal containing raw control bytes still
    /// decodes. On any failure the partially decoded value is discarded;
    /// no output state ever escapes an unsuccessful parse.
    ///
    /// # Errors
    /// [`DecodeError::MissingQuote`] if `src` does not start with `"`;
    /// [`DecodeError::UnterminatedLiteral`] if the input ends early;
    /// [`DecodeError::InvalidEscape`] for an unknown escape or an octal
    /// value past one byte.
    ///
    /// # Examples
    /// ```
    /// let (s, used) = corda::ByteString::from_quoted(br#""a\tb" rest"#).unwrap();
    /// assert_eq!(s, *"a\tb");
    /// assert_eq!(used, 6);
    ///
    /// assert!(corda::ByteString::from_quoted(b"\"no closing").is_err());
    /// ```
    pub fn from_quoted(src: &[u8]) -> Result<(ByteString, usize), DecodeError> {
        if src.first() != Some(&b'"') {
            return Err(DecodeError::MissingQuote);
        }
        let mut out = ByteString::new();
        let mut i = 1;
        loop {
            match src.get(i) {
                None => return Err(DecodeError::UnterminatedLiteral),
                Some(&b'"') => return Ok((out, i + 1)),
                Some(&b'\\') => {
                    let &next = src.get(i + 1).ok_or(DecodeError::UnterminatedLiteral)?;
                    let (byte, used) = match next {
                        b'\\' => (b'\\', 2),
                        b'"' => (b'"', 2),
                        b'n' => (b'\n', 2),
                        b't' => (b'\t', 2),
                        b'r' => (b'\r', 2),
                        b'0'..=b'7' => {
                            let digits =
                                src.get(i + 1..i + 4).ok_or(DecodeError::UnterminatedLiteral)?;
                            let mut value = 0u16;
                            for &d in digits {
                                if !d.is_ascii_digit() || d > b'7' {
                                    return Err(DecodeError::InvalidEscape);
                                }
                                value = value << 3 | u16::from(d - b'0');
                            }
                            if value > 0xFF {
                                return Err(DecodeError::InvalidEscape);
                            }
                            (value as u8, 4)
                        }
                        _ => return Err(DecodeError::InvalidEscape),
                    };
                    out.try_push_byte(byte)?;
                    i += used;
                }
                Some(&b) => {
                    out.try_push_byte(b)?;
                    i += 1;
                }
            }
        }
    }
}

/// Appends `value` to `dest` as a variable-width length prefix.
///
/// Values below `253` take a single byte. Larger values write a marker
/// byte followed by the value in big-endian form: `253` plus two bytes up
/// to `0xFFFF`, `254` plus four bytes up to `0xFFFF_FFFF`, and `255` plus
/// eight bytes beyond that. The encoding is written in one step, so on
/// failure `dest` is unchanged.
///
/// # Examples
/// ```
/// let mut buf = corda::ByteString::new();
/// corda::write_length_prefix(&mut buf, 7).unwrap();
/// corda::write_length_prefix(&mut buf, 300).unwrap();
/// assert_eq!(buf.as_bytes(), &[7, 253, 1, 44]);
/// ```
pub fn write_length_prefix(dest: &mut ByteString, value: usize) -> Result<(), TryReserveError> {
    let mut enc = [0u8; 9];
    let enc: &[u8] = if value < 253 {
        enc[0] = value as u8;
        &enc[..1]
    } else if value <= 0xFFFF {
        enc[0] = 253;
        enc[1..3].copy_from_slice(&(value as u16).to_be_bytes());
        &enc[..3]
    } else if value as u64 <= u64::from(u32::MAX) {
        enc[0] = 254;
        enc[1..5].copy_from_slice(&(value as u32).to_be_bytes());
        &enc[..5]
    } else {
        enc[0] = 255;
        enc[1..9].copy_from_slice(&(value as u64).to_be_bytes());
        &enc[..9]
    };
    dest.try_push_bytes(enc)
}

/// Decodes one length prefix from the front of `src`, returning the value
/// and the number of input bytes consumed.
///
/// # Errors
/// [`DecodeError::Truncated`] if `src` holds fewer bytes than its marker
/// promises; [`DecodeError::Overflow`] if the value does not fit the
/// platform's size domain.
///
/// # Examples
/// ```
/// let mut buf = corda::ByteString::new();
/// corda::write_length_prefix(&mut buf, 70_000).unwrap();
/// assert_eq!(corda::read_length_prefix(&buf), Ok((70_000, 5)));
///
/// assert_eq!(
///     corda::read_length_prefix(&[253, 1]),
///     Err(corda::DecodeError::Truncated),
/// );
/// ```
pub fn read_length_prefix(src: &[u8]) -> Result<(usize, usize), DecodeError> {
    let &marker = src.first().ok_or(DecodeError::Truncated)?;
    match marker {
        253 => {
            let bytes = src.get(1..3).ok_or(DecodeError::Truncated)?;
            let value = u16::from_be_bytes([bytes[0], bytes[1]]);
            Ok((usize::from(value), 3))
        }
        254 => {
            let bytes = src.get(1..5).ok_or(DecodeError::Truncated)?;
            let value = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
            let value = usize::try_from(value).map_err(|_| DecodeError::Overflow)?;
            Ok((value, 5))
        }
        255 => {
            let bytes = src.get(1..9).ok_or(DecodeError::Truncated)?;
            let mut wide = [0u8; 8];
            wide.copy_from_slice(bytes);
            let value = u64::from_be_bytes(wide);
            let value = usize::try_from(value).map_err(|_| DecodeError::Overflow)?;
            Ok((value, 9))
        }
        direct => Ok((usize::from(direct), 1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn quoting_round_trips_every_byte_value() {
        let all: Vec<u8> = (0..=255).collect();
        let s = ByteString::from_bytes(&all);

        let quoted = s.to_quoted().unwrap();
        let (back, used) = ByteString::from_quoted(&quoted).unwrap();
        assert_eq!(back, s);
        assert_eq!(used, quoted.len());
    }

    #[test]
    fn quoting_round_trips_text() {
        for text in ["", "plain", "tabs\tand\nbreaks\r", "q\"q", "back\\slash", "héllo 💖"] {
            let s = ByteString::from_bytes(text.as_bytes());
            let quoted = s.to_quoted().unwrap();
            let (back, used) = ByteString::from_quoted(&quoted).unwrap();
            assert_eq!(back, s, "{:?}", text);
            assert_eq!(used, quoted.len());
        }
    }

    #[test]
    fn quoted_output_uses_the_documented_escapes() {
        let s = ByteString::from_bytes(b"a\tb\x01c\xC3");
        assert_eq!(s.to_quoted().unwrap(), *r#""a\tb\001c\303""#);
    }

    #[test]
    fn quote_into_appends_after_existing_contents() {
        let mut out = ByteString::from_bytes(b"name=");
        ByteString::from_bytes(b"x").quote_into(&mut out).unwrap();
        assert_eq!(out, *r#"name="x""#);
    }

    #[test]
    fn decoding_stops_at_the_closing_quote() {
        let (s, used) = ByteString::from_quoted(br#""one" "two""#).unwrap();
        assert_eq!(s, *"one");
        assert_eq!(used, 5);

        let (rest, used) = ByteString::from_quoted(&br#""one" "two""#[6..]).unwrap();
        assert_eq!(rest, *"two");
        assert_eq!(used, 5);
    }

    #[test]
    fn decoding_accepts_raw_bytes_before_the_quote() {
        let (s, used) = ByteString::from_quoted(b"\"a\nb\"").unwrap();
        assert_eq!(s, *"a\nb");
        assert_eq!(used, 5);
    }

    #[test]
    fn malformed_literals_are_rejected() {
        assert_eq!(ByteString::from_quoted(b"abc"), Err(DecodeError::MissingQuote));
        assert_eq!(ByteString::from_quoted(b""), Err(DecodeError::MissingQuote));
        assert_eq!(
            ByteString::from_quoted(b"\"abc"),
            Err(DecodeError::UnterminatedLiteral)
        );
        assert_eq!(
            ByteString::from_quoted(b"\"abc\\"),
            Err(DecodeError::UnterminatedLiteral)
        );
        assert_eq!(
            ByteString::from_quoted(b"\"ab\\q\""),
            Err(DecodeError::InvalidEscape)
        );
        // octal escapes take exactly three digits, valued at most \377
        assert_eq!(
            ByteString::from_quoted(b"\"\\7\" and more"),
            Err(DecodeError::InvalidEscape)
        );
        assert_eq!(
            ByteString::from_quoted(b"\"\\777\""),
            Err(DecodeError::InvalidEscape)
        );
        assert_eq!(
            ByteString::from_quoted(b"\"\\12"),
            Err(DecodeError::UnterminatedLiteral)
        );
    }

    #[test]
    fn length_prefix_round_trips_across_every_band() {
        let probes: &[usize] = &[0, 1, 127, 252, 253, 254, 65_535, 65_536, 1 << 20];
        let widths: &[usize] = &[1, 1, 1, 1, 3, 3, 3, 5, 5];

        for (&value, &width) in probes.iter().zip(widths) {
            let mut buf = ByteString::new();
            write_length_prefix(&mut buf, value).unwrap();
            assert_eq!(buf.len(), width, "width of {}", value);
            assert_eq!(read_length_prefix(&buf), Ok((value, width)));
        }
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn length_prefix_round_trips_the_widest_band() {
        for value in [u32::MAX as usize, u32::MAX as usize + 1, usize::MAX] {
            let mut buf = ByteString::new();
            write_length_prefix(&mut buf, value).unwrap();
            let expected = if value <= u32::MAX as usize { 5 } else { 9 };
            assert_eq!(buf.len(), expected);
            assert_eq!(read_length_prefix(&buf), Ok((value, expected)));
        }
    }

    #[test]
    fn truncated_prefixes_are_rejected() {
        assert_eq!(read_length_prefix(&[]), Err(DecodeError::Truncated));
        assert_eq!(read_length_prefix(&[253]), Err(DecodeError::Truncated));
        assert_eq!(read_length_prefix(&[253, 9]), Err(DecodeError::Truncated));
        assert_eq!(read_length_prefix(&[254, 1, 2, 3]), Err(DecodeError::Truncated));
        assert_eq!(
            read_length_prefix(&[255, 1, 2, 3, 4, 5, 6, 7]),
            Err(DecodeError::Truncated)
        );
    }

    #[test]
    fn prefixes_frame_payloads_back_to_back() {
        let payloads: [&[u8]; 3] = [b"", b"alpha", b"a longer payload with spaces"];

        let mut buf = ByteString::new();
        for p in payloads {
            write_length_prefix(&mut buf, p.len()).unwrap();
            buf.try_push_bytes(p).unwrap();
        }

        let mut at = 0;
        for p in payloads {
            let (len, used) = read_length_prefix(&buf[at..]).unwrap();
            at += used;
            assert_eq!(&buf[at..at + len], p);
            at += len;
        }
        assert_eq!(at, buf.len());
    }
}
