use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{IoContext, Result};

/// Positioned reads over a seekable byte source. Every section decoder
/// seeks to its header-specified offset, reads its records, and lets the
/// caller restore the cursor afterwards -- this mirrors the original
/// engine's on-disk layout, where nested data (events, anim streams,
/// meshes, vertices...) lives at its own offset independent of the
/// containing array's on-disk order.
pub struct ByteReader<R> {
    inner: R,
    path: PathBuf,
}

impl<R: Read + Seek> ByteReader<R> {
    pub fn new(inner: R, path: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn seek_to(&mut self, offset: u32) -> Result<()> {
        self.inner
            .seek(SeekFrom::Start(offset as u64))
            .with_path(&self.path)?;
        Ok(())
    }

    pub fn position(&mut self) -> Result<u64> {
        self.inner.stream_position().with_path(&self.path)
    }

    pub fn seek_to_raw(&mut self, offset: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Start(offset)).with_path(&self.path)?;
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.inner.read_u8().with_path(&self.path)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.inner.read_i8().with_path(&self.path)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.inner.read_u16::<LittleEndian>().with_path(&self.path)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.inner.read_i16::<LittleEndian>().with_path(&self.path)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.inner.read_u32::<LittleEndian>().with_path(&self.path)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.inner.read_i32::<LittleEndian>().with_path(&self.path)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.inner.read_f32::<LittleEndian>().with_path(&self.path)
    }

    pub fn read_vec3(&mut self) -> Result<[f32; 3]> {
        Ok([self.read_f32()?, self.read_f32()?, self.read_f32()?])
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.inner.read_exact(&mut buf).with_path(&self.path)?;
        Ok(buf)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.inner.read_exact(&mut buf).with_path(&self.path)?;
        Ok(buf)
    }

    /// Reads a fixed-width zero-padded name field and returns the string
    /// up to (but not including) the first zero byte. Never assumes the
    /// buffer is null-terminated at the last byte.
    pub fn read_name<const N: usize>(&mut self) -> Result<String> {
        let buf = self.read_array::<N>()?;
        Ok(name_from_bytes(&buf))
    }
}

pub fn name_from_bytes(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn name_from_bytes_stops_at_first_zero() {
        let mut buf = [0u8; 32];
        buf[..5].copy_from_slice(b"torso");
        buf[10] = b'x'; // tail bytes after terminator are ignored
        assert_eq!(name_from_bytes(&buf), "torso");
    }

    #[test]
    fn reads_little_endian_primitives() {
        let data = vec![0x01, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF];
        let mut reader = ByteReader::new(Cursor::new(data), "test.mdl");
        assert_eq!(reader.read_i32().unwrap(), 1);
        assert_eq!(reader.read_i32().unwrap(), -1);
    }

    #[test]
    fn restores_cursor_after_nested_read() {
        let data = (0..40u8).collect::<Vec<_>>();
        let mut reader = ByteReader::new(Cursor::new(data), "test.mdl");
        reader.seek_to(4).unwrap();
        let saved = reader.position().unwrap();
        reader.seek_to(32).unwrap();
        let _ = reader.read_u8().unwrap();
        reader.seek_to_raw(saved).unwrap();
        assert_eq!(reader.read_u8().unwrap(), 4);
    }
}
