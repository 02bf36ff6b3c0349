use std::io::{self, Read, Write};

use crate::error::{CodecError, CodecResult};

/// Longest string the 2-byte length prefix can describe.
pub const MAX_STRING_LEN: usize = u16::MAX as usize;

/// Big-endian primitive reads over any byte source.
///
/// Implemented for every [`Read`], including `dyn Read`, so the reply
/// handler can work on whatever stream the transport hands it.
pub trait DataInput: Read {
    fn read_fixed<const N: usize>(&mut self) -> CodecResult<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn read_bool(&mut self) -> CodecResult<bool> {
        match self.read_fixed::<1>()?[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::InvalidBoolean(other)),
        }
    }

    fn read_u8(&mut self) -> CodecResult<u8> {
        Ok(self.read_fixed::<1>()?[0])
    }

    fn read_i8(&mut self) -> CodecResult<i8> {
        Ok(i8::from_be_bytes(self.read_fixed()?))
    }

    fn read_u16(&mut self) -> CodecResult<u16> {
        Ok(u16::from_be_bytes(self.read_fixed()?))
    }

    fn read_i16(&mut self) -> CodecResult<i16> {
        Ok(i16::from_be_bytes(self.read_fixed()?))
    }

    fn read_u32(&mut self) -> CodecResult<u32> {
        Ok(u32::from_be_bytes(self.read_fixed()?))
    }

    fn read_i32(&mut self) -> CodecResult<i32> {
        Ok(i32::from_be_bytes(self.read_fixed()?))
    }

    fn read_i64(&mut self) -> CodecResult<i64> {
        Ok(i64::from_be_bytes(self.read_fixed()?))
    }

    fn read_u64(&mut self) -> CodecResult<u64> {
        Ok(u64::from_be_bytes(self.read_fixed()?))
    }

    /// Reads the raw bit pattern, so NaN payloads survive.
    fn read_f32(&mut self) -> CodecResult<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    fn read_f64(&mut self) -> CodecResult<f64> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    /// Length-prefixed UTF-8 string.
    fn read_utf(&mut self) -> CodecResult<String> {
        let len = self.read_u16()? as usize;
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf)?;
        String::from_utf8(buf).map_err(|e| CodecError::InvalidUtf8(e.to_string()))
    }

    /// Consume exactly `n` bytes, failing with `UnexpectedEof` if the
    /// stream ends first.
    fn skip_bytes(&mut self, n: u64) -> CodecResult<()> {
        let skipped = io::copy(&mut (&mut *self).take(n), &mut io::sink())?;
        if skipped < n {
            return Err(CodecError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("skipped {skipped} of {n} bytes"),
            )));
        }
        Ok(())
    }

    /// Skip a length-prefixed string without decoding it.
    fn skip_utf(&mut self) -> CodecResult<()> {
        let len = self.read_u16()?;
        self.skip_bytes(len as u64)
    }
}

impl<R: Read + ?Sized> DataInput for R {}

/// Big-endian primitive writes over any byte sink.
pub trait DataOutput: Write {
    fn write_bool(&mut self, value: bool) -> CodecResult<()> {
        self.write_all(&[value as u8])?;
        Ok(())
    }

    fn write_u8(&mut self, value: u8) -> CodecResult<()> {
        self.write_all(&[value])?;
        Ok(())
    }

    fn write_i8(&mut self, value: i8) -> CodecResult<()> {
        self.write_all(&value.to_be_bytes())?;
        Ok(())
    }

    fn write_u16(&mut self, value: u16) -> CodecResult<()> {
        self.write_all(&value.to_be_bytes())?;
        Ok(())
    }

    fn write_i16(&mut self, value: i16) -> CodecResult<()> {
        self.write_all(&value.to_be_bytes())?;
        Ok(())
    }

    fn write_u32(&mut self, value: u32) -> CodecResult<()> {
        self.write_all(&value.to_be_bytes())?;
        Ok(())
    }

    fn write_i32(&mut self, value: i32) -> CodecResult<()> {
        self.write_all(&value.to_be_bytes())?;
        Ok(())
    }

    fn write_i64(&mut self, value: i64) -> CodecResult<()> {
        self.write_all(&value.to_be_bytes())?;
        Ok(())
    }

    fn write_u64(&mut self, value: u64) -> CodecResult<()> {
        self.write_all(&value.to_be_bytes())?;
        Ok(())
    }

    fn write_f32(&mut self, value: f32) -> CodecResult<()> {
        self.write_u32(value.to_bits())
    }

    fn write_f64(&mut self, value: f64) -> CodecResult<()> {
        self.write_u64(value.to_bits())
    }

    fn write_utf(&mut self, value: &str) -> CodecResult<()> {
        let bytes = value.as_bytes();
        if bytes.len() > MAX_STRING_LEN {
            return Err(CodecError::StringTooLong {
                len: bytes.len(),
                max: MAX_STRING_LEN,
            });
        }
        self.write_u16(bytes.len() as u16)?;
        self.write_all(bytes)?;
        Ok(())
    }
}

impl<W: Write + ?Sized> DataOutput for W {}
