//! A growable, heap-avoiding byte string with in-place editing operations.

use core::fmt;
use core::hash::{BuildHasher, Hash, Hasher};
use core::ops::RangeBounds;

use crate::storage::{normalize_range, Buf, TryReserveError};

/// A growable string of bytes.
///
/// Short contents are stored inline in the value itself; longer contents
/// move to a heap buffer whose capacity is tracked with a two-byte
/// mantissa/exponent header. The transition between the two layouts is
/// transparent: every operation reads and writes through the same API
/// regardless of where the bytes live.
///
/// Contents are arbitrary bytes. The codepoint-level view (see
/// [`codepoints`](ByteString::codepoints)) decodes on the fly and reports
/// malformed sequences instead of assuming valid UTF-8. One terminator byte
/// is maintained directly behind the contents at all times for interop with
/// byte-oriented APIs; it is not part of the length.
///
/// Every operation that can grow the buffer has a `try_` form returning
/// `Result`, paired with a panicking convenience wrapper.
///
/// # Examples
/// ```
/// let mut s = corda::ByteString::new();
/// s.push_bytes(b"Hello");
/// s.push_bytes(b", world!");
///
/// assert_eq!(s.len(), 13);
/// assert_eq!(s, *"Hello, world!");
/// ```
pub struct ByteString {
    pub(crate) buf: Buf,
}

impl ByteString {
    /// Constructs a new, empty `ByteString` without allocating.
    ///
    /// # Examples
    /// ```
    /// let s = corda::ByteString::new();
    /// assert!(s.is_empty());
    /// assert!(s.is_inline());
    /// ```
    #[inline]
    pub const fn new() -> Self {
        ByteString { buf: Buf::new() }
    }

    /// Constructs an empty `ByteString` with at least `capacity` writable
    /// bytes, returning [`Err`] if the storage cannot be acquired.
    ///
    /// The terminator slot counts against the capacity, so holding `n`
    /// content bytes requires a capacity of `n + 1`.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        let mut s = ByteString::new();
        s.try_reserve(capacity)?;
        Ok(s)
    }

    /// Constructs an empty `ByteString` with at least `capacity` writable
    /// bytes.
    ///
    /// # Panics
    /// Panics if the storage cannot be acquired. See
    /// [`try_with_capacity`](ByteString::try_with_capacity) for a checked
    /// version.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::try_with_capacity(capacity).expect("byte string allocation failed")
    }

    /// Constructs a `ByteString` holding a copy of the given bytes,
    /// returning [`Err`] if the storage cannot be acquired.
    ///
    /// # Examples
    /// ```
    /// let s = corda::ByteString::try_from_bytes(b"spindle").unwrap();
    /// assert_eq!(s.len(), 7);
    /// ```
    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self, TryReserveError> {
        let mut s = ByteString::new();
        s.try_assign(bytes)?;
        Ok(s)
    }

    /// Constructs a `ByteString` holding a copy of the given bytes.
    ///
    /// # Panics
    /// Panics if the storage cannot be acquired. See
    /// [`try_from_bytes`](ByteString::try_from_bytes) for a checked version.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::try_from_bytes(bytes).expect("byte string allocation failed")
    }

    /// Returns the length of the contents in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if the string holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of writable bytes, terminator slot included.
    ///
    /// Always strictly greater than [`len`](ByteString::len).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Returns `true` while the contents are stored inside the value
    /// itself, with no heap allocation.
    #[inline]
    pub fn is_inline(&self) -> bool {
        self.buf.is_inline()
    }

    /// Returns the byte at position `index`, or [`None`] if it is out of
    /// bounds.
    ///
    /// # Examples
    /// ```
    /// let s = corda::ByteString::from_bytes(b"abc");
    /// assert_eq!(s.get(1), Some(b'b'));
    /// assert_eq!(s.get(3), None);
    /// ```
    #[inline]
    pub fn get(&self, index: usize) -> Option<u8> {
        self.as_bytes().get(index).copied()
    }

    /// Returns a slice over the contents.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.buf.contents()
    }

    /// Returns the contents followed by the terminator byte.
    ///
    /// The result is one byte longer than [`len`](ByteString::len) and
    /// always ends in `0`, which is what byte-oriented foreign interfaces
    /// expect to receive.
    ///
    /// # Examples
    /// ```
    /// let s = corda::ByteString::from_bytes(b"abc");
    /// assert_eq!(s.as_bytes_with_terminator(), b"abc\0");
    /// ```
    #[inline]
    pub fn as_bytes_with_terminator(&self) -> &[u8] {
        &self.buf.as_slice()[..self.len() + 1]
    }

    /// Truncates the string, removing all contents.
    ///
    /// The capacity and the active representation are unaffected.
    #[inline]
    pub fn clear(&mut self) {
        self.buf.set_len(0);
    }

    /// Raises or lowers the capacity to `capacity` bytes (terminator slot
    /// included), returning [`Err`] if the storage cannot be acquired.
    ///
    /// Requests below `len() + 1` are clamped up to it. A clamped request
    /// small enough for the inline representation moves the contents back
    /// into the value and releases the heap buffer. Reserving the current
    /// capacity does nothing.
    ///
    /// # Examples
    /// ```
    /// let mut s = corda::ByteString::from_bytes(b"ok");
    /// s.try_reserve(1000).unwrap();
    /// assert!(s.capacity() >= 1000);
    ///
    /// s.try_reserve(0).unwrap();
    /// assert!(s.is_inline());
    /// assert_eq!(s, *"ok");
    /// ```
    pub fn try_reserve(&mut self, capacity: usize) -> Result<(), TryReserveError> {
        self.buf.try_reserve(capacity)
    }

    /// Raises or lowers the capacity to `capacity` bytes.
    ///
    /// # Panics
    /// Panics if the storage cannot be acquired. See
    /// [`try_reserve`](ByteString::try_reserve) for a checked version.
    pub fn reserve(&mut self, capacity: usize) {
        self.try_reserve(capacity).expect("byte string allocation failed")
    }

    /// Replaces the contents with a copy of `src`, returning [`Err`] if
    /// the storage cannot be acquired (in which case the contents are
    /// unchanged).
    pub fn try_assign(&mut self, src: &[u8]) -> Result<(), TryReserveError> {
        self.buf.try_fit(src.len() + 1)?;
        self.buf.as_mut_slice()[..src.len()].copy_from_slice(src);
        self.buf.set_len(src.len());
        Ok(())
    }

    /// Replaces the contents with a copy of `src`.
    ///
    /// # Panics
    /// Panics if the storage cannot be acquired. See
    /// [`try_assign`](ByteString::try_assign) for a checked version.
    pub fn assign(&mut self, src: &[u8]) {
        #[cold]
        #[inline(never)]
        fn assert_failed() -> ! {
            panic!("byte string allocation failed")
        }

        if self.try_assign(src).is_err() {
            assert_failed();
        }
    }

    /// Appends one byte, returning [`Err`] if the storage cannot be
    /// acquired.
    pub fn try_push_byte(&mut self, byte: u8) -> Result<(), TryReserveError> {
        let len = self.len();
        self.buf.try_fit(len + 2)?;
        self.buf.as_mut_slice()[len] = byte;
        self.buf.set_len(len + 1);
        Ok(())
    }

    /// Appends one byte.
    ///
    /// # Panics
    /// Panics if the storage cannot be acquired. See
    /// [`try_push_byte`](ByteString::try_push_byte) for a checked version.
    pub fn push_byte(&mut self, byte: u8) {
        #[cold]
        #[inline(never)]
        fn assert_failed() -> ! {
            panic!("byte string allocation failed")
        }

        if self.try_push_byte(byte).is_err() {
            assert_failed();
        }
    }

    /// Appends a copy of `src`, returning [`Err`] if the storage cannot be
    /// acquired (in which case the contents are unchanged).
    ///
    /// # Examples
    /// ```
    /// let mut s = corda::ByteString::from_bytes(b"foo");
    /// assert!(s.try_push_bytes(b"bar").is_ok());
    /// assert_eq!(s, *"foobar");
    /// ```
    pub fn try_push_bytes(&mut self, src: &[u8]) -> Result<(), TryReserveError> {
        let len = self.len();
        self.buf.try_fit(len + src.len() + 1)?;
        self.buf.as_mut_slice()[len..len + src.len()].copy_from_slice(src);
        self.buf.set_len(len + src.len());
        Ok(())
    }

    /// Appends a copy of `src`.
    ///
    /// # Panics
    /// Panics if the storage cannot be acquired. See
    /// [`try_push_bytes`](ByteString::try_push_bytes) for a checked version.
    pub fn push_bytes(&mut self, src: &[u8]) {
        #[cold]
        #[inline(never)]
        fn assert_failed() -> ! {
            panic!("byte string allocation failed")
        }

        if self.try_push_bytes(src).is_err() {
            assert_failed();
        }
    }

    /// Hashes the contents with a hasher drawn from `build`, so distinct
    /// seeds produce distinct hash functions.
    ///
    /// Threading the seed through the builder (rather than keeping global
    /// state) is what makes the result reproducible and lets hash-table
    /// owners pick their own flooding protection.
    ///
    /// # Examples
    /// ```
    /// use core::hash::BuildHasherDefault;
    /// use rustc_hash::FxHasher;
    ///
    /// let build = BuildHasherDefault::<FxHasher>::default();
    /// let a = corda::ByteString::from_bytes(b"abc");
    /// let b = corda::ByteString::from_bytes(b"abc");
    /// assert_eq!(a.hash_with(&build), b.hash_with(&build));
    /// ```
    pub fn hash_with<H: BuildHasher>(&self, build: &H) -> u64 {
        let mut hasher = build.build_hasher();
        self.as_bytes().hash(&mut hasher);
        hasher.finish()
    }

    /// Returns the position of the first occurrence of `byte` at or after
    /// `from`, or [`None`].
    ///
    /// # Examples
    /// ```
    /// let s = corda::ByteString::from_bytes(b"ababab");
    /// assert_eq!(s.find_byte(b'b', 0), Some(1));
    /// assert_eq!(s.find_byte(b'b', 2), Some(3));
    /// assert_eq!(s.find_byte(b'z', 0), None);
    /// ```
    pub fn find_byte(&self, byte: u8, from: usize) -> Option<usize> {
        debug_assert!(from <= self.len());
        let from = from.min(self.len());
        self.as_bytes()[from..].iter().position(|&b| b == byte).map(|i| from + i)
    }

    /// Returns the position of the last occurrence of `byte`, or [`None`].
    pub fn rfind_byte(&self, byte: u8) -> Option<usize> {
        self.as_bytes().iter().rposition(|&b| b == byte)
    }

    /// Returns the position of the first occurrence of `needle` at or
    /// after `from`, or [`None`].
    ///
    /// An empty needle matches immediately at `from`.
    ///
    /// # Examples
    /// ```
    /// let s = corda::ByteString::from_bytes(b"one two two");
    /// assert_eq!(s.find(b"two", 0), Some(4));
    /// assert_eq!(s.find(b"two", 5), Some(8));
    /// assert_eq!(s.find(b"three", 0), None);
    /// ```
    pub fn find(&self, needle: &[u8], from: usize) -> Option<usize> {
        debug_assert!(from <= self.len());
        let from = from.min(self.len());
        find_in(&self.as_bytes()[from..], needle).map(|i| from + i)
    }

    /// Returns the position of the last occurrence of `needle`, or
    /// [`None`].
    ///
    /// An empty needle matches immediately at the end of the contents.
    pub fn rfind(&self, needle: &[u8]) -> Option<usize> {
        rfind_in(self.as_bytes(), needle)
    }

    /// Returns the position of the first byte at or after `from` that
    /// appears in `set`, or [`None`].
    ///
    /// # Examples
    /// ```
    /// let s = corda::ByteString::from_bytes(b"key = value");
    /// assert_eq!(s.find_any_of(b"=:", 0), Some(4));
    /// assert_eq!(s.find_any_of(b"\0\x01", 0), None);
    /// ```
    pub fn find_any_of(&self, set: &[u8], from: usize) -> Option<usize> {
        debug_assert!(from <= self.len());
        let from = from.min(self.len());
        self.as_bytes()[from..]
            .iter()
            .position(|b| set.contains(b))
            .map(|i| from + i)
    }

    /// Returns the contents with leading and trailing ASCII whitespace
    /// removed. The string itself is not modified.
    ///
    /// # Examples
    /// ```
    /// let s = corda::ByteString::from_bytes(b"  padded\t\n");
    /// assert_eq!(s.trim(), b"padded");
    /// assert_eq!(s.len(), 10);
    /// ```
    pub fn trim(&self) -> &[u8] {
        self.trim_matches(b" \t\n\r")
    }

    /// Returns the contents with leading and trailing bytes from `set`
    /// removed. The string itself is not modified.
    pub fn trim_matches(&self, set: &[u8]) -> &[u8] {
        let bytes = self.as_bytes();
        let start = bytes.iter().position(|b| !set.contains(b)).unwrap_or(bytes.len());
        let end = bytes.iter().rposition(|b| !set.contains(b)).map_or(start, |e| e + 1);
        &bytes[start..end]
    }

    /// Shortens the string to its first `new_len` bytes.
    ///
    /// If `new_len` is greater than the current length, this has no
    /// effect.
    ///
    /// # Examples
    /// ```
    /// let mut s = corda::ByteString::from_bytes(b"hello");
    /// s.truncate(2);
    /// assert_eq!(s, *"he");
    /// ```
    #[inline]
    pub fn truncate(&mut self, new_len: usize) {
        if new_len < self.len() {
            self.buf.set_len(new_len);
        }
    }

    /// Shortens the string to its last `keep` bytes, shifting them to the
    /// front.
    ///
    /// If `keep` is greater than the current length, this has no effect.
    ///
    /// # Examples
    /// ```
    /// let mut s = corda::ByteString::from_bytes(b"filename.txt");
    /// s.keep_last(3);
    /// assert_eq!(s, *"txt");
    /// ```
    pub fn keep_last(&mut self, keep: usize) {
        let len = self.len();
        if keep < len {
            self.buf.as_mut_slice().copy_within(len - keep..len, 0);
            self.buf.set_len(keep);
        }
    }

    /// Keeps only the bytes in `range`, shifting them to the front.
    ///
    /// The shift tolerates the source and destination overlapping.
    ///
    /// # Panics
    /// Panics if the starting point is greater than the end point, or if
    /// the end point is greater than the length of the string.
    ///
    /// # Examples
    /// ```
    /// let mut s = corda::ByteString::from_bytes(b"prefix:core:suffix");
    /// s.keep_range(7..11);
    /// assert_eq!(s, *"core");
    /// ```
    pub fn keep_range<R: RangeBounds<usize>>(&mut self, range: R) {
        let range = normalize_range(range, self.len());
        let kept = range.len();
        self.buf.as_mut_slice().copy_within(range, 0);
        self.buf.set_len(kept);
    }

    /// Replaces the bytes in `range` with a copy of `replacement`,
    /// returning [`Err`] if the storage cannot be acquired (in which case
    /// the contents are unchanged).
    ///
    /// The two sides may differ in length; the tail of the string is
    /// shifted to fit.
    ///
    /// # Panics
    /// Panics if the starting point is greater than the end point, or if
    /// the end point is greater than the length of the string.
    ///
    /// # Examples
    /// ```
    /// let mut s = corda::ByteString::from_bytes(b"a <> b");
    /// s.try_replace_range(2..4, b"!=").unwrap();
    /// assert_eq!(s, *"a != b");
    ///
    /// s.try_replace_range(2..4, b"equals").unwrap();
    /// assert_eq!(s, *"a equals b");
    /// ```
    pub fn try_replace_range<R: RangeBounds<usize>>(
        &mut self,
        range: R,
        replacement: &[u8],
    ) -> Result<(), TryReserveError> {
        let range = normalize_range(range, self.len());
        self.splice(range.start, range.end, replacement)
    }

    /// Replaces the bytes in `range` with a copy of `replacement`.
    ///
    /// # Panics
    /// Panics on an invalid range, or if the storage cannot be acquired.
    /// See [`try_replace_range`](ByteString::try_replace_range) for a
    /// version that reports allocation failure instead.
    pub fn replace_range<R: RangeBounds<usize>>(&mut self, range: R, replacement: &[u8]) {
        self.try_replace_range(range, replacement)
            .expect("byte string allocation failed")
    }

    /// Replaces the first occurrence of `pattern` with `replacement`.
    ///
    /// Returns whether a replacement took place, or [`Err`] if the storage
    /// could not be acquired. An empty pattern is a contract violation; it
    /// trips a debug assertion and matches nothing in release builds.
    ///
    /// # Examples
    /// ```
    /// let mut s = corda::ByteString::from_bytes(b"Hello, world!");
    /// assert_eq!(s.try_replace_first(b"world", b"Paul"), Ok(true));
    /// assert_eq!(s.try_replace_first(b"Paul", b"Juliette"), Ok(true));
    /// assert_eq!(s, *"Hello, Juliette!");
    ///
    /// assert_eq!(s.try_replace_first(b"world", b"-"), Ok(false));
    /// ```
    pub fn try_replace_first(
        &mut self,
        pattern: &[u8],
        replacement: &[u8],
    ) -> Result<bool, TryReserveError> {
        debug_assert!(!pattern.is_empty());
        if pattern.is_empty() {
            return Ok(false);
        }
        match self.find(pattern, 0) {
            Some(at) => {
                self.splice(at, at + pattern.len(), replacement)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Replaces the first occurrence of `pattern` with `replacement`,
    /// returning whether a replacement took place.
    ///
    /// # Panics
    /// Panics if the storage cannot be acquired. See
    /// [`try_replace_first`](ByteString::try_replace_first) for a checked
    /// version.
    pub fn replace_first(&mut self, pattern: &[u8], replacement: &[u8]) -> bool {
        self.try_replace_first(pattern, replacement)
            .expect("byte string allocation failed")
    }

    /// Replaces every occurrence of `pattern` with `replacement`, scanning
    /// left to right without re-examining replaced text.
    ///
    /// Returns the number of replacements, or [`Err`] if the storage could
    /// not be acquired (in which case the contents are unchanged). An
    /// empty pattern is a contract violation; it trips a debug assertion
    /// and matches nothing in release builds.
    ///
    /// A replacement no longer than the pattern is spliced in place with a
    /// single forward pass. A longer replacement grows the buffer once up
    /// front, then splices backward from the end so that the tail moves
    /// rightward ahead of each insertion and no byte is read after it has
    /// been overwritten.
    ///
    /// # Examples
    /// ```
    /// let mut s = corda::ByteString::from_bytes(b"1, 2, 3");
    /// assert_eq!(s.try_replace_all(b", ", b";"), Ok(2));
    /// assert_eq!(s, *"1;2;3");
    ///
    /// assert_eq!(s.try_replace_all(b";", b" and "), Ok(2));
    /// assert_eq!(s, *"1 and 2 and 3");
    /// ```
    pub fn try_replace_all(
        &mut self,
        pattern: &[u8],
        replacement: &[u8],
    ) -> Result<usize, TryReserveError> {
        debug_assert!(!pattern.is_empty());
        if pattern.is_empty() || self.len() < pattern.len() {
            return Ok(0);
        }
        if replacement.len() <= pattern.len() {
            Ok(self.replace_all_shrinking(pattern, replacement))
        } else {
            self.replace_all_growing(pattern, replacement)
        }
    }

    /// Replaces every occurrence of `pattern` with `replacement`,
    /// returning the number of replacements.
    ///
    /// # Panics
    /// Panics if the storage cannot be acquired. See
    /// [`try_replace_all`](ByteString::try_replace_all) for a checked
    /// version.
    pub fn replace_all(&mut self, pattern: &[u8], replacement: &[u8]) -> usize {
        self.try_replace_all(pattern, replacement)
            .expect("byte string allocation failed")
    }

    /// One-shot splice of `replacement` over `start..end`, choosing the
    /// copy order by comparing lengths.
    fn splice(
        &mut self,
        start: usize,
        end: usize,
        replacement: &[u8],
    ) -> Result<(), TryReserveError> {
        let len = self.len();
        let gap = end - start;
        if replacement.len() <= gap {
            // the replacement fits where the gap was: write it, then pull
            // the tail leftward to close up
            let buf = self.buf.as_mut_slice();
            buf[start..start + replacement.len()].copy_from_slice(replacement);
            buf.copy_within(end..len, start + replacement.len());
            self.buf.set_len(len - gap + replacement.len());
        } else {
            // push the tail rightward into freshly assured capacity first,
            // then the replacement cannot clobber unread bytes
            let new_len = len - gap + replacement.len();
            self.buf.try_fit(new_len + 1)?;
            let buf = self.buf.as_mut_slice();
            buf.copy_within(end..len, start + replacement.len());
            buf[start..start + replacement.len()].copy_from_slice(replacement);
            self.buf.set_len(new_len);
        }
        Ok(())
    }

    fn replace_all_shrinking(&mut self, pattern: &[u8], replacement: &[u8]) -> usize {
        let mut pos = 0;
        let mut count = 0;
        while let Some(at) = self.find(pattern, pos) {
            let len = self.len();
            let buf = self.buf.as_mut_slice();
            buf[at..at + replacement.len()].copy_from_slice(replacement);
            buf.copy_within(at + pattern.len()..len, at + replacement.len());
            self.buf.set_len(len - (pattern.len() - replacement.len()));
            pos = at + replacement.len();
            count += 1;
        }
        count
    }

    fn replace_all_growing(
        &mut self,
        pattern: &[u8],
        replacement: &[u8],
    ) -> Result<usize, TryReserveError> {
        let mut count: usize = 0;
        let mut pos = 0;
        while let Some(at) = self.find(pattern, pos) {
            count += 1;
            pos = at + pattern.len();
        }
        if count == 0 {
            return Ok(0);
        }

        let delta = replacement.len() - pattern.len();
        let new_len = count
            .checked_mul(delta)
            .and_then(|g| g.checked_add(self.len()))
            .ok_or(TryReserveError::CapacityOverflow)?;

        let mut positions = alloc::vec::Vec::new();
        positions.try_reserve_exact(count).map_err(|_| TryReserveError::AllocError {
            size: count * core::mem::size_of::<usize>(),
        })?;
        let mut pos = 0;
        while let Some(at) = self.find(pattern, pos) {
            positions.push(at);
            pos = at + pattern.len();
        }

        self.buf.try_fit(new_len + 1)?;
        let len = self.len();
        let buf = self.buf.as_mut_slice();
        let mut src_end = len;
        let mut dst_end = new_len;
        for &at in positions.iter().rev() {
            // move the not-yet-relocated bytes behind this match to their
            // final position, then write the replacement to their left
            let chunk = src_end - (at + pattern.len());
            buf.copy_within(at + pattern.len()..src_end, dst_end - chunk);
            dst_end -= chunk;
            buf[dst_end - replacement.len()..dst_end].copy_from_slice(replacement);
            dst_end -= replacement.len();
            src_end = at;
        }
        self.buf.set_len(new_len);
        Ok(count)
    }
}

fn find_in(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn rfind_in(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(haystack.len());
    }
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

impl core::ops::Deref for ByteString {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl core::ops::DerefMut for ByteString {
    #[inline]
    fn deref_mut(&mut self) -> &mut [u8] {
        let len = self.len();
        &mut self.buf.as_mut_slice()[..len]
    }
}

impl core::convert::AsRef<[u8]> for ByteString {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl Default for ByteString {
    #[inline]
    fn default() -> Self {
        ByteString::new()
    }
}

impl Clone for ByteString {
    #[inline]
    fn clone(&self) -> Self {
        ByteString::from_bytes(self.as_bytes())
    }
}

impl From<&[u8]> for ByteString {
    #[inline]
    fn from(bytes: &[u8]) -> Self {
        ByteString::from_bytes(bytes)
    }
}

impl From<&str> for ByteString {
    #[inline]
    fn from(string: &str) -> Self {
        ByteString::from_bytes(string.as_bytes())
    }
}

impl PartialEq for ByteString {
    #[inline]
    fn eq(&self, other: &ByteString) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for ByteString {}

impl PartialEq<[u8]> for ByteString {
    #[inline]
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl PartialEq<&[u8]> for ByteString {
    #[inline]
    fn eq(&self, other: &&[u8]) -> bool {
        self.as_bytes() == *other
    }
}

impl<const N: usize> PartialEq<[u8; N]> for ByteString {
    #[inline]
    fn eq(&self, other: &[u8; N]) -> bool {
        self.as_bytes() == other
    }
}

impl PartialEq<str> for ByteString {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for ByteString {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialOrd for ByteString {
    #[inline]
    fn partial_cmp(&self, other: &ByteString) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ByteString {
    #[inline]
    fn cmp(&self, other: &ByteString) -> core::cmp::Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl Hash for ByteString {
    #[inline]
    fn hash<H: Hasher>(&self, hasher: &mut H) {
        self.as_bytes().hash(hasher)
    }
}

impl fmt::Debug for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write;

        f.write_char('"')?;
        for &b in self.as_bytes() {
            match crate::codec::escape_byte(b) {
                crate::codec::Escape::Verbatim => f.write_char(b as char)?,
                crate::codec::Escape::Short(c) => {
                    f.write_char('\\')?;
                    f.write_char(c as char)?;
                }
                crate::codec::Escape::Octal => write!(f, "\\{:03o}", b)?,
            }
        }
        f.write_char('"')
    }
}

impl fmt::Display for ByteString {
    /// Renders the contents as text, substituting U+FFFD for any byte
    /// sequence that does not decode.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write;

        for decoded in self.codepoints() {
            f.write_char(decoded.unwrap_or('\u{FFFD}'))?;
        }
        Ok(())
    }
}

impl fmt::Write for ByteString {
    #[inline]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.try_push_bytes(s.as_bytes()).map_err(|_| fmt::Error)
    }

    #[inline]
    fn write_char(&mut self, c: char) -> fmt::Result {
        self.try_push_codepoint(c).map_err(|_| fmt::Error)
    }
}

impl core::iter::Extend<u8> for ByteString {
    #[inline]
    fn extend<It: IntoIterator<Item = u8>>(&mut self, iter: It) {
        for byte in iter {
            self.push_byte(byte);
        }
    }
}

impl core::iter::Extend<char> for ByteString {
    #[inline]
    fn extend<It: IntoIterator<Item = char>>(&mut self, iter: It) {
        for ch in iter {
            self.push_codepoint(ch);
        }
    }
}

impl<'a> core::iter::Extend<&'a str> for ByteString {
    #[inline]
    fn extend<It: IntoIterator<Item = &'a str>>(&mut self, iter: It) {
        for s in iter {
            self.push_bytes(s.as_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{CompactCapacity, INLINE_CAPACITY};
    use alloc::vec::Vec;
    use rand::{rngs::SmallRng, Rng, SeedableRng};

    fn naive_replace_all(s: &[u8], pattern: &[u8], replacement: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut i = 0;
        while i + pattern.len() <= s.len() {
            if &s[i..i + pattern.len()] == pattern {
                out.extend_from_slice(replacement);
                i += pattern.len();
            } else {
                out.push(s[i]);
                i += 1;
            }
        }
        out.extend_from_slice(&s[i..]);
        out
    }

    fn check_invariants(s: &ByteString) {
        assert!(s.len() < s.capacity());
        assert_eq!(s.as_bytes_with_terminator().last(), Some(&0));
        if !s.is_inline() {
            let (_, rounded) = CompactCapacity::round_up(s.capacity());
            assert_eq!(rounded, s.capacity());
        }
    }

    #[test]
    fn append_compare_replace_end_to_end() {
        let mut s = ByteString::new();
        s.push_bytes(b"Hello");
        s.push_bytes(b", world!");
        assert_eq!(s.len(), 13);
        assert_eq!(s, *"Hello, world!");
        assert_eq!(s.cmp(&ByteString::from_bytes(b"Hello, world!")), core::cmp::Ordering::Equal);

        assert!(s.replace_first(b"world", b"Paul"));
        assert!(s.replace_first(b"Paul", b"Juliette"));
        assert_eq!(s, *"Hello, Juliette!");
    }

    #[test]
    fn embedding_boundary_migration_preserves_contents() {
        let limit = INLINE_CAPACITY - 1;
        let content: Vec<u8> = (0..limit).map(|i| b'a' + (i % 26) as u8).collect();

        let mut s = ByteString::from_bytes(&content);
        assert!(s.is_inline());
        assert_eq!(s.len(), limit);

        s.push_byte(b'!');
        assert!(!s.is_inline());
        assert_eq!(s.len(), limit + 1);
        assert_eq!(&s[..limit], &content[..]);
        assert_eq!(s[limit], b'!');

        s.truncate(limit);
        s.reserve(0);
        assert!(s.is_inline());
        assert_eq!(s, *&content[..]);
    }

    #[test]
    fn reserve_of_current_capacity_changes_nothing() {
        let mut s = ByteString::from_bytes(b"just enough bytes to be on the heap here");
        assert!(!s.is_inline());
        let cap = s.capacity();
        let ptr = s.as_bytes().as_ptr();

        s.reserve(cap);
        assert_eq!(s.capacity(), cap);
        assert_eq!(s.as_bytes().as_ptr(), ptr);
        assert!(!s.is_inline());
    }

    #[test]
    fn assign_reuses_and_grows() {
        let mut s = ByteString::new();
        s.assign(b"short");
        assert_eq!(s, *"short");
        assert!(s.is_inline());

        s.assign(b"a very considerably longer replacement payload");
        assert!(!s.is_inline());
        assert_eq!(s, *"a very considerably longer replacement payload");

        s.assign(b"short again");
        assert_eq!(s, *"short again");
        check_invariants(&s);
    }

    #[test]
    fn slicing_keeps_the_requested_window() {
        let mut s = ByteString::from_bytes(b"0123456789");
        s.keep_range(2..=5);
        assert_eq!(s, *"2345");

        s.keep_last(2);
        assert_eq!(s, *"45");

        s.truncate(1);
        assert_eq!(s, *"4");

        s.keep_last(7);
        assert_eq!(s, *"4");
    }

    #[test]
    fn searches_respect_the_start_bound() {
        let s = ByteString::from_bytes(b"mississippi");
        assert_eq!(s.find(b"ss", 0), Some(2));
        assert_eq!(s.find(b"ss", 3), Some(5));
        assert_eq!(s.find(b"ss", 6), None);
        assert_eq!(s.rfind(b"ss"), Some(5));
        assert_eq!(s.find_byte(b'p', 0), Some(8));
        assert_eq!(s.rfind_byte(b'p'), Some(9));
        assert_eq!(s.find_any_of(b"sp", 0), Some(2));
        assert_eq!(s.find_any_of(b"sp", 7), Some(8));
    }

    #[test]
    fn trim_is_read_only() {
        let s = ByteString::from_bytes(b"\t  text  \r\n");
        assert_eq!(s.trim(), b"text");
        assert_eq!(s.len(), 11);

        let t = ByteString::from_bytes(b"xxyx");
        assert_eq!(t.trim_matches(b"x"), b"y");
        assert_eq!(ByteString::from_bytes(b"   ").trim(), b"");
    }

    #[test]
    fn replace_range_handles_both_directions() {
        let mut s = ByteString::from_bytes(b"aaaa BBBB cccc");
        s.replace_range(5..9, b"-");
        assert_eq!(s, *"aaaa - cccc");

        s.replace_range(5..6, b"0123456789");
        assert_eq!(s, *"aaaa 0123456789 cccc");

        s.replace_range(0..0, b">");
        assert_eq!(s, *">aaaa 0123456789 cccc");
        check_invariants(&s);
    }

    #[test]
    fn replace_all_matches_the_naive_rebuild_exhaustively() {
        let mut strings = Vec::new();
        for len in 0..=6usize {
            for bits in 0..1u32 << len {
                let s: Vec<u8> = (0..len)
                    .map(|i| if bits >> i & 1 == 0 { b'a' } else { b'b' })
                    .collect();
                strings.push(s);
            }
        }
        let mut patterns = Vec::new();
        for len in 1..=3usize {
            for bits in 0..1u32 << len {
                let p: Vec<u8> = (0..len)
                    .map(|i| if bits >> i & 1 == 0 { b'a' } else { b'b' })
                    .collect();
                patterns.push(p);
            }
        }
        let replacements: [&[u8]; 5] = [b"", b"x", b"ab", b"xyz", b"abab"];

        for s in &strings {
            for p in &patterns {
                for r in replacements {
                    let mut subject = ByteString::from_bytes(s);
                    let count = subject.try_replace_all(p, r).unwrap();
                    let expected = naive_replace_all(s, p, r);
                    assert_eq!(
                        subject.as_bytes(),
                        &expected[..],
                        "replace_all({:?}, {:?}, {:?})",
                        s,
                        p,
                        r
                    );
                    assert_eq!(count, naive_replace_all(s, p, b"\x01").iter().filter(|&&b| b == 1).count());
                    check_invariants(&subject);
                }
            }
        }
    }

    #[test]
    fn replace_all_matches_the_naive_rebuild_randomized() {
        let mut rng = SmallRng::seed_from_u64(0x5432_1012_3454_3210);
        for _ in 0..200 {
            let len = rng.gen_range(0..200);
            let s: Vec<u8> = (0..len).map(|_| b'a' + rng.gen_range(0..3u8)).collect();
            let pat_len = rng.gen_range(1..=6);
            let p: Vec<u8> = (0..pat_len).map(|_| b'a' + rng.gen_range(0..3u8)).collect();
            let rep_len = rng.gen_range(0..=9);
            let r: Vec<u8> = (0..rep_len).map(|_| b'a' + rng.gen_range(0..4u8)).collect();

            let mut subject = ByteString::from_bytes(&s);
            subject.try_replace_all(&p, &r).unwrap();
            assert_eq!(subject.as_bytes(), &naive_replace_all(&s, &p, &r)[..]);
            check_invariants(&subject);
        }
    }

    #[test]
    fn invariants_hold_across_random_mutations() {
        let mut rng = SmallRng::seed_from_u64(0xfeed_beef_cafe_f00d);
        let mut s = ByteString::new();
        for _ in 0..2000 {
            match rng.gen_range(0..7) {
                0 => {
                    let n = rng.gen_range(0..40);
                    let chunk: Vec<u8> = (0..n).map(|_| rng.gen()).collect();
                    s.push_bytes(&chunk);
                }
                1 => s.push_byte(rng.gen()),
                2 => {
                    let at = rng.gen_range(0..=s.len());
                    s.truncate(at);
                }
                3 => {
                    let cap = rng.gen_range(0..300);
                    s.reserve(cap);
                }
                4 => {
                    let keep = rng.gen_range(0..=s.len());
                    s.keep_last(keep);
                }
                5 => {
                    s.replace_all(b"aa", b"b");
                }
                6 => {
                    if rng.gen_bool(0.1) {
                        s.clear();
                    }
                }
                _ => unreachable!(),
            }
            check_invariants(&s);
        }
    }

    #[test]
    fn comparisons_and_hashes_agree() {
        use core::hash::BuildHasherDefault;
        use rustc_hash::FxHasher;

        let a = ByteString::from_bytes(b"alpha");
        let b = ByteString::from_bytes(b"alpha");
        let c = ByteString::from_bytes(b"beta");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a < c);
        assert_eq!(a, *"alpha");
        assert_eq!(a, *b"alpha");

        let build = BuildHasherDefault::<FxHasher>::default();
        assert_eq!(a.hash_with(&build), b.hash_with(&build));
        assert_ne!(a.hash_with(&build), c.hash_with(&build));
    }

    #[test]
    fn write_and_extend_append() {
        use core::fmt::Write;

        let mut s = ByteString::new();
        write!(s, "{}-{}", 4, 2).unwrap();
        assert_eq!(s, *"4-2");

        s.extend([b'!', b'?']);
        assert_eq!(s, *"4-2!?");

        s.extend(["ab", "cd"]);
        assert_eq!(s, *"4-2!?abcd");
    }

    #[test]
    fn clone_copies_into_a_fitting_capacity() {
        let long = ByteString::from_bytes(&[b'z'; 100]);
        let copy = long.clone();
        assert_eq!(long, copy);
        assert!(copy.capacity() >= 101);

        let short = ByteString::from_bytes(b"tiny");
        assert!(short.clone().is_inline());
    }

    #[test]
    fn in_place_byte_edits_do_not_move_the_buffer() {
        let mut s = ByteString::from_bytes(b"patch");
        let ptr = s.as_bytes().as_ptr();
        s[0] = b'm';
        assert_eq!(s, *"match");
        assert_eq!(s.as_bytes().as_ptr(), ptr);
    }
}
