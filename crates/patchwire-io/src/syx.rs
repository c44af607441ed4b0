//! `.syx` file reading and writing.

use std::path::Path;

use patchwire_core::frame::{SYSEX_START, frame_end, split_frames};
use tracing::{debug, info};

use crate::{Error, Result};

/// Where one frame sits in a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    /// Offset of the `0xF0` byte.
    pub offset: usize,
    /// Frame length including `0xF0` and `0xF7`.
    pub len: usize,
}

/// Frame inventory of a buffer, computed without decoding anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyxInfo {
    /// Complete frames in order.
    pub frames: Vec<FrameInfo>,
    /// Buffer length.
    pub total_bytes: usize,
    /// Bytes outside any frame, not counting an unterminated tail.
    pub stray_bytes: usize,
    /// True when the buffer ends inside a frame.
    pub unterminated: bool,
}

impl SyxInfo {
    /// Number of complete frames.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// Inventory of `data`.
///
/// Frames follow the same rules as [`split_frames`]: a frame runs from
/// `0xF0` to the next `0xF7`, and a final frame without `0xF7` is reported
/// through [`SyxInfo::unterminated`].
pub fn syx_info(data: &[u8]) -> SyxInfo {
    let mut info = SyxInfo {
        total_bytes: data.len(),
        ..SyxInfo::default()
    };
    let mut pos = 0;
    while pos < data.len() {
        if data[pos] != SYSEX_START {
            info.stray_bytes += 1;
            pos += 1;
            continue;
        }
        match frame_end(data, pos) {
            Some(end) => {
                info.frames.push(FrameInfo {
                    offset: pos,
                    len: end - pos,
                });
                pos = end;
            }
            None => {
                info.unterminated = true;
                break;
            }
        }
    }
    info
}

/// Read a `.syx` file as raw bytes.
pub fn read_syx<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    debug!(path = %path.display(), bytes = data.len(), "read syx file");
    Ok(data)
}

/// Read a `.syx` file and split it into frames.
///
/// Returns [`Error::NoFrames`] when the file holds no complete frame.
pub fn read_frames<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<u8>>> {
    let data = read_syx(path)?;
    let frames: Vec<Vec<u8>> = split_frames(&data).map(<[u8]>::to_vec).collect();
    if frames.is_empty() {
        return Err(Error::NoFrames);
    }
    Ok(frames)
}

/// Write frames back to back to a `.syx` file.
///
/// # Example
/// ```ignore
/// let frames = vec![vec![0xF0, 0x43, 0x20, 0x03, 0xF7]];
/// write_syx("request.syx", &frames)?;
/// ```
pub fn write_syx<P: AsRef<Path>>(path: P, frames: &[Vec<u8>]) -> Result<()> {
    let path = path.as_ref();
    let data = frames.concat();
    std::fs::write(path, &data)?;
    info!(
        path = %path.display(),
        frames = frames.len(),
        bytes = data.len(),
        "wrote syx file"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_info_counts_frames_and_strays() {
        let data = [0x00, 0xF0, 0x43, 0xF7, 0x12, 0x34, 0xF0, 0x7E, 0x01, 0xF7];
        let info = syx_info(&data);
        assert_eq!(info.total_bytes, 10);
        assert_eq!(info.frame_count(), 2);
        assert_eq!(info.frames[0], FrameInfo { offset: 1, len: 3 });
        assert_eq!(info.frames[1], FrameInfo { offset: 6, len: 4 });
        assert_eq!(info.stray_bytes, 3);
        assert!(!info.unterminated);
    }

    #[test]
    fn test_info_flags_unterminated_tail() {
        let data = [0xF0, 0x43, 0xF7, 0xF0, 0x43, 0x10];
        let info = syx_info(&data);
        assert_eq!(info.frame_count(), 1);
        assert_eq!(info.stray_bytes, 0);
        assert!(info.unterminated);
    }

    #[test]
    fn test_info_empty() {
        let info = syx_info(&[]);
        assert_eq!(info, SyxInfo::default());
    }

    #[test]
    fn test_roundtrip_frames() {
        let frames = vec![
            vec![0xF0, 0x43, 0x20, 0x03, 0xF7],
            vec![0xF0, 0x00, 0x01, 0x05, 0x21, 0x7F, 0x7D, 0xF7],
        ];
        let file = NamedTempFile::new().unwrap();
        write_syx(file.path(), &frames).unwrap();

        assert_eq!(read_syx(file.path()).unwrap(), frames.concat());
        assert_eq!(read_frames(file.path()).unwrap(), frames);
    }

    #[test]
    fn test_no_frames() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), [0x01, 0x02, 0xF0, 0x03]).unwrap();
        assert!(matches!(read_frames(file.path()), Err(Error::NoFrames)));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_syx(dir.path().join("missing.syx"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
