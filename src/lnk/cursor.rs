use byteorder::{ByteOrder, LE};

use crate::lnk::helpers::Guid;

/// A read past the end of the buffer. Offsets are absolute file offsets.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("read of {requested} bytes at offset {offset:#x} exceeds buffer end {end:#x}")]
pub struct OutOfBounds {
    pub offset: usize,
    pub requested: usize,
    pub end: usize,
}

/// Little-endian reader over a borrowed buffer.
///
/// The cursor never copies the buffer. Sub-cursors created with
/// [`ByteCursor::sub_cursor`] remember where their window starts in the file
/// so that errors and diagnostics still carry absolute offsets.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    position: usize,
    base: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            base: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Position in the whole file, for reporting.
    pub fn absolute_position(&self) -> usize {
        self.base + self.position
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    fn out_of_bounds(&self, offset: usize, requested: usize) -> OutOfBounds {
        OutOfBounds {
            offset: self.base + offset,
            requested,
            end: self.base + self.data.len(),
        }
    }

    pub fn seek(&mut self, position: usize) -> Result<(), OutOfBounds> {
        if position > self.data.len() {
            return Err(self.out_of_bounds(position, 0));
        }
        self.position = position;
        Ok(())
    }

    /// Runs `read` with the cursor placed at `position`, then puts the cursor
    /// back where it was, whether `read` succeeded or not.
    pub fn jump<T, E>(
        &mut self,
        position: usize,
        read: impl FnOnce(&mut Self) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<OutOfBounds>,
    {
        let saved = self.position;
        self.seek(position)?;
        let result = read(self);
        self.position = saved;
        result
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], OutOfBounds> {
        let end = self
            .position
            .checked_add(count)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| self.out_of_bounds(self.position, count))?;
        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], OutOfBounds> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.read_bytes(N)?);
        Ok(array)
    }

    pub fn skip(&mut self, count: usize) -> Result<(), OutOfBounds> {
        self.read_bytes(count).map(|_| ())
    }

    /// Consumes `count` bytes and returns a cursor confined to them.
    pub fn sub_cursor(&mut self, count: usize) -> Result<ByteCursor<'a>, OutOfBounds> {
        let base = self.absolute_position();
        let data = self.read_bytes(count)?;
        Ok(ByteCursor {
            data,
            position: 0,
            base,
        })
    }

    pub fn read_u8(&mut self) -> Result<u8, OutOfBounds> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, OutOfBounds> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16, OutOfBounds> {
        Ok(LE::read_u16(self.read_bytes(2)?))
    }

    pub fn read_i16(&mut self) -> Result<i16, OutOfBounds> {
        Ok(LE::read_i16(self.read_bytes(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32, OutOfBounds> {
        Ok(LE::read_u32(self.read_bytes(4)?))
    }

    pub fn read_i32(&mut self) -> Result<i32, OutOfBounds> {
        Ok(LE::read_i32(self.read_bytes(4)?))
    }

    pub fn read_u64(&mut self) -> Result<u64, OutOfBounds> {
        Ok(LE::read_u64(self.read_bytes(8)?))
    }

    pub fn read_i64(&mut self) -> Result<i64, OutOfBounds> {
        Ok(LE::read_i64(self.read_bytes(8)?))
    }

    pub fn read_f32(&mut self) -> Result<f32, OutOfBounds> {
        Ok(LE::read_f32(self.read_bytes(4)?))
    }

    pub fn read_f64(&mut self) -> Result<f64, OutOfBounds> {
        Ok(LE::read_f64(self.read_bytes(8)?))
    }

    /// Bytes up to the next NUL. The NUL is consumed but not returned.
    pub fn read_null_terminated(&mut self) -> Result<&'a [u8], OutOfBounds> {
        let rest = &self.data[self.position..];
        let length = rest
            .iter()
            .position(|&byte| byte == 0)
            .ok_or_else(|| self.out_of_bounds(self.data.len(), 1))?;
        let bytes = self.read_bytes(length)?;
        self.skip(1)?;
        Ok(bytes)
    }

    /// UTF-16 code units up to the next NUL code unit, which is consumed.
    pub fn read_null_terminated_utf16(&mut self) -> Result<Vec<u16>, OutOfBounds> {
        let mut units = Vec::new();
        loop {
            let unit = self.read_u16()?;
            if unit == 0 {
                break;
            }
            units.push(unit);
        }
        Ok(units)
    }

    pub fn read_guid(&mut self) -> Result<Guid, OutOfBounds> {
        Ok(Guid::from_bytes(self.read_array::<16>()?))
    }
}
