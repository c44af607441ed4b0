//! SysEx frame boundaries, signatures, and construction.
//!
//! A frame is `0xF0 … 0xF7`. Dumps saved to disk or received in bursts are
//! simply frames laid end to end, so most parsing starts by splitting a
//! buffer with [`split_frames`] and matching each piece against a
//! [`Signature`].

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::checksum::checksum;
use crate::error::CodecError;

/// First byte of every SysEx frame.
pub const SYSEX_START: u8 = 0xF0;
/// Last byte of every SysEx frame.
pub const SYSEX_END: u8 = 0xF7;

/// Index one past the first `0xF7` at or after `from`.
pub fn frame_end(data: &[u8], from: usize) -> Option<usize> {
    data.get(from..)?
        .iter()
        .position(|&b| b == SYSEX_END)
        .map(|pos| from + pos + 1)
}

/// Checks that `frame` is a single well-delimited SysEx message.
pub fn validate(frame: &[u8]) -> Result<(), CodecError> {
    match (frame.first(), frame.last()) {
        (Some(&SYSEX_START), Some(&SYSEX_END)) if frame.len() >= 2 => Ok(()),
        (Some(&SYSEX_START), _) => Err(CodecError::Unterminated),
        _ => Err(CodecError::BadHeader),
    }
}

/// Iterator over the complete frames in a concatenated buffer.
///
/// Bytes between frames are skipped. A final frame without `0xF7` is
/// dropped.
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for Frames<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.data.get(self.pos..)?;
        let start = self.pos + rest.iter().position(|&b| b == SYSEX_START)?;
        match frame_end(self.data, start) {
            Some(end) => {
                self.pos = end;
                Some(&self.data[start..end])
            }
            None => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    "dropping unterminated frame at offset {start} ({} bytes)",
                    self.data.len() - start
                );
                self.pos = self.data.len();
                None
            }
        }
    }
}

/// Splits `data` into its frames.
///
/// ```rust
/// use patchwire_core::frame::split_frames;
///
/// let data = [0xF0, 0x43, 0xF7, 0x00, 0xF0, 0x7E, 0xF7];
/// let frames: Vec<&[u8]> = split_frames(&data).collect();
/// assert_eq!(frames, vec![&data[0..3], &data[4..7]]);
/// ```
pub fn split_frames(data: &[u8]) -> Frames<'_> {
    Frames { data, pos: 0 }
}

/// Fixed-position bytes (and optionally an exact length) identifying a frame
/// type.
#[derive(Debug, Clone, Copy)]
pub struct Signature {
    /// Exact frame length, if fixed.
    pub len: Option<usize>,
    /// `(offset, value)` pairs that must match.
    pub bytes: &'static [(usize, u8)],
    /// ASCII tag that must appear at `tag_offset`, if any.
    pub tag: Option<(usize, &'static [u8])>,
}

impl Signature {
    /// Signature with only fixed bytes.
    pub const fn new(len: usize, bytes: &'static [(usize, u8)]) -> Self {
        Self {
            len: Some(len),
            bytes,
            tag: None,
        }
    }

    /// Adds an ASCII tag requirement.
    pub const fn with_tag(mut self, offset: usize, tag: &'static [u8]) -> Self {
        self.tag = Some((offset, tag));
        self
    }

    /// True when `frame` has the exact length and every fixed byte.
    pub fn matches(&self, frame: &[u8]) -> bool {
        if self.len.is_some_and(|len| frame.len() != len) {
            return false;
        }
        let bytes_ok = self
            .bytes
            .iter()
            .all(|&(offset, value)| frame.get(offset) == Some(&value));
        let tag_ok = self.tag.is_none_or(|(offset, tag)| {
            frame.get(offset..offset + tag.len()) == Some(tag)
        });
        bytes_ok && tag_ok
    }
}

/// Incremental frame writer: header, payload, optional checksum, `0xF7`.
///
/// ```rust
/// use patchwire_core::frame::FrameBuilder;
///
/// let frame = FrameBuilder::new(&[0xF0, 0x43, 0x00])
///     .checksum_from_here()
///     .extend(&[0x01, 0x02])
///     .finish();
/// assert_eq!(frame, vec![0xF0, 0x43, 0x00, 0x01, 0x02, 0x7D, 0xF7]);
/// ```
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    bytes: Vec<u8>,
    checksum_start: Option<usize>,
}

impl FrameBuilder {
    /// Starts a frame with `header` (which includes `0xF0`).
    pub fn new(header: &[u8]) -> Self {
        Self {
            bytes: header.to_vec(),
            checksum_start: None,
        }
    }

    /// Starts the checksummed range at the current end of the frame.
    pub fn checksum_from_here(mut self) -> Self {
        self.checksum_start = Some(self.bytes.len());
        self
    }

    /// Starts the checksummed range at absolute `offset`.
    pub fn checksum_from(mut self, offset: usize) -> Self {
        self.checksum_start = Some(offset);
        self
    }

    /// Appends one byte.
    pub fn push(mut self, byte: u8) -> Self {
        self.bytes.push(byte);
        self
    }

    /// Appends bytes.
    pub fn extend(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True before anything has been written.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Appends the checksum (when a range was marked) and `0xF7`.
    pub fn finish(mut self) -> Vec<u8> {
        if let Some(start) = self.checksum_start {
            let cs = checksum(self.bytes.get(start..).unwrap_or_default());
            self.bytes.push(cs);
        }
        self.bytes.push(SYSEX_END);
        self.bytes
    }
}

/// Recomputes the checksum byte at `len - 2` of `frame` over
/// `frame[start..len - 2]`.
pub fn refresh_checksum(frame: &mut [u8], start: usize) {
    let len = frame.len();
    if len >= 2 && start <= len - 2 {
        frame[len - 2] = checksum(&frame[start..len - 2]);
    }
}
