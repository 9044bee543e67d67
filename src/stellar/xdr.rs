//! XDR codec primitives
//!
//! Big-endian, 4-byte aligned. Variable-length opaques and strings carry a
//! u32 length prefix and zero padding.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::error::{WalletError, WalletResult};

/// Nesting limit for recursive types (ScVal, auth invocations)
pub const MAX_DEPTH: u32 = 128;

/// Types that have an XDR representation
pub trait XdrCodec: Sized {
    fn encode(&self, w: &mut XdrWriter);
    fn decode(r: &mut XdrReader<'_>) -> WalletResult<Self>;

    fn to_xdr(&self) -> Vec<u8> {
        let mut w = XdrWriter::new();
        self.encode(&mut w);
        w.into_bytes()
    }

    fn from_xdr(bytes: &[u8]) -> WalletResult<Self> {
        let mut r = XdrReader::new(bytes);
        let value = Self::decode(&mut r)?;
        r.finish()?;
        Ok(value)
    }

    fn to_xdr_base64(&self) -> String {
        BASE64.encode(self.to_xdr())
    }

    fn from_xdr_base64(encoded: &str) -> WalletResult<Self> {
        let bytes = BASE64.decode(encoded.trim())?;
        Self::from_xdr(&bytes)
    }
}

fn padding(len: usize) -> usize {
    (4 - len % 4) % 4
}

#[derive(Debug, Default)]
pub struct XdrWriter {
    buf: Vec<u8>,
}

impl XdrWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn bool(&mut self, v: bool) {
        self.u32(v as u32);
    }

    /// Fixed-length opaque
    pub fn fixed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
        self.buf.extend(std::iter::repeat(0u8).take(padding(bytes.len())));
    }

    /// Variable-length opaque or string
    pub fn var(&mut self, bytes: &[u8]) {
        self.u32(bytes.len() as u32);
        self.fixed(bytes);
    }

    /// Already-encoded XDR, written verbatim
    pub fn raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn option<T>(&mut self, value: Option<&T>, f: impl FnOnce(&mut Self, &T)) {
        match value {
            Some(v) => {
                self.bool(true);
                f(self, v);
            }
            None => self.bool(false),
        }
    }

    pub fn array<T: XdrCodec>(&mut self, items: &[T]) {
        self.u32(items.len() as u32);
        for item in items {
            item.encode(self);
        }
    }
}

#[derive(Debug)]
pub struct XdrReader<'a> {
    data: &'a [u8],
    pos: usize,
    depth: u32,
}

impl<'a> XdrReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0, depth: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Bytes consumed since `start`
    pub fn slice_from(&self, start: usize) -> &'a [u8] {
        &self.data[start..self.pos]
    }

    /// Fails if any input is left
    pub fn finish(&self) -> WalletResult<()> {
        if self.remaining() != 0 {
            return Err(WalletError::xdr_error(format!(
                "{} trailing bytes after XDR value",
                self.remaining()
            )));
        }
        Ok(())
    }

    pub fn enter(&mut self) -> WalletResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(WalletError::xdr_error("XDR nesting too deep"));
        }
        Ok(())
    }

    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn take(&mut self, n: usize) -> WalletResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(WalletError::xdr_error("Unexpected end of XDR input"));
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn word<const N: usize>(&mut self) -> WalletResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn u32(&mut self) -> WalletResult<u32> {
        Ok(u32::from_be_bytes(self.word()?))
    }

    pub fn i32(&mut self) -> WalletResult<i32> {
        Ok(i32::from_be_bytes(self.word()?))
    }

    pub fn u64(&mut self) -> WalletResult<u64> {
        Ok(u64::from_be_bytes(self.word()?))
    }

    pub fn i64(&mut self) -> WalletResult<i64> {
        Ok(i64::from_be_bytes(self.word()?))
    }

    pub fn bool(&mut self) -> WalletResult<bool> {
        match self.u32()? {
            0 => Ok(false),
            1 => Ok(true),
            v => Err(WalletError::xdr_error(format!("Invalid XDR bool: {}", v))),
        }
    }

    fn skip_padding(&mut self, len: usize) -> WalletResult<()> {
        let pad = self.take(padding(len))?;
        if pad.iter().any(|b| *b != 0) {
            return Err(WalletError::xdr_error("Non-zero XDR padding"));
        }
        Ok(())
    }

    pub fn fixed<const N: usize>(&mut self) -> WalletResult<[u8; N]> {
        let out = self.word::<N>()?;
        self.skip_padding(N)?;
        Ok(out)
    }

    /// Variable-length opaque with an upper bound
    pub fn var(&mut self, max: u32) -> WalletResult<Vec<u8>> {
        let len = self.u32()?;
        if len > max {
            return Err(WalletError::xdr_error(format!(
                "XDR length {} exceeds limit {}",
                len, max
            )));
        }
        let bytes = self.take(len as usize)?.to_vec();
        self.skip_padding(len as usize)?;
        Ok(bytes)
    }

    pub fn string(&mut self, max: u32) -> WalletResult<String> {
        let bytes = self.var(max)?;
        String::from_utf8(bytes).map_err(|_| WalletError::xdr_error("Invalid UTF-8 in XDR string"))
    }

    pub fn option<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> WalletResult<T>,
    ) -> WalletResult<Option<T>> {
        if self.bool()? {
            Ok(Some(f(self)?))
        } else {
            Ok(None)
        }
    }

    /// Array length, checked against the bytes left so hostile lengths fail early
    pub fn array_len(&mut self, max: u32) -> WalletResult<usize> {
        let len = self.u32()?;
        if len > max || len as usize > self.remaining() / 4 {
            return Err(WalletError::xdr_error(format!("Invalid XDR array length {}", len)));
        }
        Ok(len as usize)
    }

    pub fn array<T: XdrCodec>(&mut self, max: u32) -> WalletResult<Vec<T>> {
        let len = self.array_len(max)?;
        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            items.push(T::decode(self)?);
        }
        Ok(items)
    }
}

impl XdrCodec for u32 {
    fn encode(&self, w: &mut XdrWriter) {
        w.u32(*self);
    }

    fn decode(r: &mut XdrReader<'_>) -> WalletResult<Self> {
        r.u32()
    }
}

impl XdrCodec for [u8; 32] {
    fn encode(&self, w: &mut XdrWriter) {
        w.fixed(self);
    }

    fn decode(r: &mut XdrReader<'_>) -> WalletResult<Self> {
        r.fixed::<32>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_padding() {
        let mut w = XdrWriter::new();
        w.var(b"abcde");
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), 4 + 8);
        assert_eq!(&bytes[..4], &[0, 0, 0, 5]);

        let mut r = XdrReader::new(&bytes);
        assert_eq!(r.var(64).unwrap(), b"abcde");
        r.finish().unwrap();
    }

    #[test]
    fn test_rejects_bad_input() {
        // Non-zero padding
        let bytes = [0, 0, 0, 1, b'a', 1, 0, 0];
        assert!(XdrReader::new(&bytes).var(64).is_err());

        // Length over limit
        let bytes = [0, 0, 0, 9, 0, 0, 0, 0];
        assert!(XdrReader::new(&bytes).var(4).is_err());

        // Bool out of range
        assert!(XdrReader::new(&[0, 0, 0, 2]).bool().is_err());

        // Trailing bytes
        assert!(u32::from_xdr(&[0, 0, 0, 1, 0]).is_err());
    }

    #[test]
    fn test_array_length_bounded_by_input() {
        let bytes = [0xff, 0xff, 0xff, 0xff];
        assert!(XdrReader::new(&bytes).array::<u32>(u32::MAX).is_err());
    }

    #[test]
    fn test_base64() {
        let value = 7u32;
        assert_eq!(value.to_xdr_base64(), "AAAABw==");
        assert_eq!(u32::from_xdr_base64("AAAABw==").unwrap(), 7);
    }
}
