//! Canonical binary encoding.
//!
//! Every protocol object implements [`Packable`]. Integers are fixed-width
//! little-endian; byte strings and collections carry a `u8`, `u16` or `u32`
//! length prefix declared per field through [`Bounds`].

use primitive_types::U256;

use crate::{errors::CodecError, params::ProtocolParameters};

/// Unions nested deeper than this are rejected while decoding.
pub const MAX_NESTING_DEPTH: usize = 32;

#[inline]
#[must_use]
pub const fn le64(x: u64) -> [u8; 8] {
    x.to_le_bytes()
}

#[inline]
#[must_use]
pub const fn le32(x: u32) -> [u8; 4] {
    x.to_le_bytes()
}

#[inline]
#[must_use]
pub const fn le16(x: u16) -> [u8; 2] {
    x.to_le_bytes()
}

/// Width of a length or count prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prefix {
    U8,
    U16,
    U32,
}

impl Prefix {
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }
}

/// Prefix width plus the inclusive element range a field accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub prefix: Prefix,
    pub min: usize,
    pub max: usize,
}

impl Bounds {
    #[must_use]
    pub const fn new(prefix: Prefix, min: usize, max: usize) -> Self {
        Self { prefix, min, max }
    }

    #[must_use]
    pub const fn contains(&self, n: usize) -> bool {
        n >= self.min && n <= self.max
    }

    fn describe(&self, n: usize) -> String {
        format!("length {n} outside [{}, {}]", self.min, self.max)
    }
}

/// A value with a canonical binary form.
pub trait Packable: Sized {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError>;

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError>;

    /// Domain checks that depend on protocol parameters or on relations
    /// between fields. Structural checks already ran in `pack`/`unpack`.
    fn validate(&self, _params: &ProtocolParameters) -> Result<(), CodecError> {
        Ok(())
    }
}

/// Discriminant of a union value.
pub trait Kinded {
    fn kind(&self) -> u8;
}

#[derive(Debug, Default)]
pub struct Packer {
    buf: Vec<u8>,
}

impl Packer {
    #[must_use]
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn u8(&mut self, x: u8) {
        self.buf.push(x);
    }

    pub fn u16(&mut self, x: u16) {
        self.buf.extend_from_slice(&le16(x));
    }

    pub fn u32(&mut self, x: u32) {
        self.buf.extend_from_slice(&le32(x));
    }

    pub fn u64(&mut self, x: u64) {
        self.buf.extend_from_slice(&le64(x));
    }

    pub fn bytes(&mut self, b: &[u8]) {
        self.buf.extend_from_slice(b);
    }

    /// Write a length or count prefix after checking it against `bounds`.
    pub fn prefix(&mut self, bounds: Bounds, n: usize, ty: &'static str) -> Result<(), CodecError> {
        if !bounds.contains(n) {
            return Err(CodecError::schema(ty, bounds.describe(n)));
        }
        let too_wide = || CodecError::schema(ty, format!("length {n} does not fit its prefix"));
        match bounds.prefix {
            Prefix::U8 => self.u8(u8::try_from(n).map_err(|_| too_wide())?),
            Prefix::U16 => self.u16(u16::try_from(n).map_err(|_| too_wide())?),
            Prefix::U32 => self.u32(u32::try_from(n).map_err(|_| too_wide())?),
        }
        Ok(())
    }

    pub fn prefixed_bytes(&mut self, bounds: Bounds, b: &[u8], ty: &'static str) -> Result<(), CodecError> {
        self.prefix(bounds, b.len(), ty)?;
        self.bytes(b);
        Ok(())
    }

    pub fn list<T: Packable>(&mut self, bounds: Bounds, items: &[T], ty: &'static str) -> Result<(), CodecError> {
        self.prefix(bounds, items.len(), ty)?;
        for item in items {
            item.pack(self)?;
        }
        Ok(())
    }

    /// Like [`Packer::list`], for unions restricted to a subset of kinds.
    pub fn kinded_list<T: Packable + Kinded>(
        &mut self,
        bounds: Bounds,
        items: &[T],
        allowed: &[u8],
        ty: &'static str,
    ) -> Result<(), CodecError> {
        for item in items {
            if !allowed.contains(&item.kind()) {
                return Err(CodecError::schema(ty, format!("type {} not allowed", item.kind())));
            }
        }
        self.list(bounds, items, ty)
    }

    /// Single union value restricted to a subset of kinds.
    pub fn kinded<T: Packable + Kinded>(&mut self, value: &T, allowed: &[u8], ty: &'static str) -> Result<(), CodecError> {
        if !allowed.contains(&value.kind()) {
            return Err(CodecError::schema(ty, format!("type {} not allowed", value.kind())));
        }
        value.pack(self)
    }

    /// `u32` byte length followed by the encoded value; zero length means absent.
    pub fn optional<T: Packable>(&mut self, value: Option<&T>, ty: &'static str) -> Result<(), CodecError> {
        let Some(value) = value else {
            self.u32(0);
            return Ok(());
        };
        let inner = encode(value)?;
        let len = u32::try_from(inner.len())
            .map_err(|_| CodecError::schema(ty, "payload longer than u32::MAX"))?;
        self.u32(len);
        self.bytes(&inner);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

#[derive(Debug)]
pub struct Unpacker<'a> {
    src: &'a [u8],
    consumed: usize,
    depth: usize,
}

impl<'a> Unpacker<'a> {
    #[must_use]
    pub const fn new(src: &'a [u8]) -> Self {
        Self { src, consumed: 0, depth: 0 }
    }

    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.src.len()
    }

    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.src.len() < n {
            return Err(CodecError::TruncatedInput { needed: n, remaining: self.src.len() });
        }
        let (a, b) = self.src.split_at(n);
        self.src = b;
        self.consumed += n;
        Ok(a)
    }

    pub fn array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let b = self.read_exact(N)?;
        let mut a = [0u8; N];
        a.copy_from_slice(b);
        Ok(a)
    }

    pub fn u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.array::<1>()?[0])
    }

    pub fn u16(&mut self) -> Result<u16, CodecError> {
        self.array().map(u16::from_le_bytes)
    }

    pub fn u32(&mut self) -> Result<u32, CodecError> {
        self.array().map(u32::from_le_bytes)
    }

    pub fn u64(&mut self) -> Result<u64, CodecError> {
        self.array().map(u64::from_le_bytes)
    }

    /// Read a length or count prefix and check it against `bounds`.
    pub fn prefix(&mut self, bounds: Bounds, ty: &'static str) -> Result<usize, CodecError> {
        let n = match bounds.prefix {
            Prefix::U8 => usize::from(self.u8()?),
            Prefix::U16 => usize::from(self.u16()?),
            Prefix::U32 => usize::try_from(self.u32()?)
                .map_err(|_| CodecError::malformed(ty, "length exceeds address space"))?,
        };
        if !bounds.contains(n) {
            return Err(CodecError::malformed(ty, bounds.describe(n)));
        }
        Ok(n)
    }

    pub fn prefixed_bytes(&mut self, bounds: Bounds, ty: &'static str) -> Result<&'a [u8], CodecError> {
        let n = self.prefix(bounds, ty)?;
        self.read_exact(n)
    }

    pub fn list<T: Packable>(&mut self, bounds: Bounds, ty: &'static str) -> Result<Vec<T>, CodecError> {
        let n = self.prefix(bounds, ty)?;
        let mut items = Vec::with_capacity(n.min(self.src.len()));
        for _ in 0..n {
            items.push(T::unpack(self)?);
        }
        Ok(items)
    }

    pub fn kinded_list<T: Packable + Kinded>(
        &mut self,
        bounds: Bounds,
        allowed: &[u8],
        ty: &'static str,
    ) -> Result<Vec<T>, CodecError> {
        let items: Vec<T> = self.list(bounds, ty)?;
        if let Some(bad) = items.iter().find(|i| !allowed.contains(&i.kind())) {
            return Err(CodecError::malformed(ty, format!("type {} not allowed", bad.kind())));
        }
        Ok(items)
    }

    pub fn kinded<T: Packable + Kinded>(&mut self, allowed: &[u8], ty: &'static str) -> Result<T, CodecError> {
        let value = T::unpack(self)?;
        if !allowed.contains(&value.kind()) {
            return Err(CodecError::malformed(ty, format!("type {} not allowed", value.kind())));
        }
        Ok(value)
    }

    /// Counterpart of [`Packer::optional`]. The inner value must consume
    /// exactly the announced length.
    pub fn optional<T: Packable>(&mut self, ty: &'static str) -> Result<Option<T>, CodecError> {
        let len = usize::try_from(self.u32()?)
            .map_err(|_| CodecError::malformed(ty, "length exceeds address space"))?;
        if len == 0 {
            return Ok(None);
        }
        let mut sub = Unpacker { src: self.read_exact(len)?, consumed: 0, depth: self.depth };
        let value = T::unpack(&mut sub)?;
        if !sub.src.is_empty() {
            return Err(CodecError::malformed(
                ty,
                format!("{} bytes left inside length-prefixed field", sub.remaining()),
            ));
        }
        Ok(Some(value))
    }

    /// Track union nesting; paired with [`Unpacker::leave`].
    pub fn enter(&mut self, ty: &'static str) -> Result<(), CodecError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(CodecError::malformed(ty, "nesting too deep"));
        }
        self.depth += 1;
        Ok(())
    }

    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn finish(&self) -> Result<(), CodecError> {
        if !self.src.is_empty() {
            return Err(CodecError::TrailingData(self.src.len()));
        }
        Ok(())
    }
}

/// Canonical bytes of `value`.
pub fn encode<T: Packable>(value: &T) -> Result<Vec<u8>, CodecError> {
    let mut p = Packer::new();
    value.pack(&mut p)?;
    Ok(p.into_bytes())
}

/// Strict decode: every byte must be consumed.
pub fn decode<T: Packable>(bytes: &[u8]) -> Result<T, CodecError> {
    let mut u = Unpacker::new(bytes);
    let value = T::unpack(&mut u)?;
    u.finish()?;
    Ok(value)
}

/// Lenient decode: returns the value and the number of bytes it used.
pub fn decode_prefix<T: Packable>(bytes: &[u8]) -> Result<(T, usize), CodecError> {
    let mut u = Unpacker::new(bytes);
    let value = T::unpack(&mut u)?;
    Ok((value, u.consumed()))
}

macro_rules! impl_packable_int {
    ($($t:ty => $w:ident),+ $(,)?) => {$(
        impl Packable for $t {
            fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
                p.$w(*self);
                Ok(())
            }
            fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
                u.$w()
            }
        }
    )+};
}
impl_packable_int!(u8 => u8, u16 => u16, u32 => u32, u64 => u64);

impl<const N: usize> Packable for [u8; N] {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.bytes(self);
        Ok(())
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        u.array()
    }
}

/// 256-bit unsigned integers travel as 32 little-endian bytes.
impl Packable for U256 {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        let mut out = [0u8; 32];
        self.to_little_endian(&mut out);
        p.bytes(&out);
        Ok(())
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self::from_little_endian(&u.array::<32>()?))
    }
}

impl<T: Packable> Packable for Box<T> {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        (**self).pack(p)
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        T::unpack(u).map(Self::new)
    }

    fn validate(&self, params: &ProtocolParameters) -> Result<(), CodecError> {
        (**self).validate(params)
    }
}

/// Fail with `SchemaViolation` unless `keys` is strictly ascending.
pub(crate) fn ensure_strictly_sorted<K: Ord>(
    keys: impl IntoIterator<Item = K>,
    ty: &'static str,
    what: &str,
) -> Result<(), CodecError> {
    let mut prev: Option<K> = None;
    for key in keys {
        if let Some(p) = &prev {
            if *p >= key {
                return Err(CodecError::schema(ty, format!("{what} must be sorted and unique")));
            }
        }
        prev = Some(key);
    }
    Ok(())
}
