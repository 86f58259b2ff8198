use crate::params::{OTS_BYTES, OTS_N, OTS_PK_BYTES, TREE_MAX_ARITY};
use crate::tree::{leaf_digest, level_digest};
use crate::wots::{OtsPublicKey, OtsSignature, Wots};
use crate::{Error, Result};

/// How a signature's tree width is conveyed to the verifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidthEncoding {
    /// The signature starts with a single width byte.
    Prefixed,
    /// The verifier already knows the width.
    OutOfBand(u8),
}

/// One level of a signature path: the public keys of the level, the parent's OTS
/// signature over them, and the index of the key that continues the path.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct LevelAuth {
    pub keys: Vec<OtsPublicKey>,
    pub signature: OtsSignature,
    pub index: u8,
}

/// A decoded tree signature.
///
/// On the wire every level is laid out as `keys || signature || index`, levels in root
/// to leaf order, followed by the leaf OTS signature over the message digest.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct TreeSignature {
    pub levels: Vec<LevelAuth>,
    pub leaf: OtsSignature,
}

impl TreeSignature {
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Width of the levels, or `None` for a signature without any level.
    pub fn width(&self) -> Option<usize> {
        self.levels.first().map(|level| level.keys.len())
    }

    pub fn encoded_len(&self, encoding: WidthEncoding) -> usize {
        let prefix = match encoding {
            WidthEncoding::Prefixed => 1,
            WidthEncoding::OutOfBand(_) => 0,
        };
        prefix
            + self
                .levels
                .iter()
                .map(|level| level.keys.len() * OTS_PK_BYTES + OTS_BYTES + 1)
                .sum::<usize>()
            + OTS_BYTES
    }

    /// Encodes the signature, with a leading width byte for [`WidthEncoding::Prefixed`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedSignature`] for any signature [`from_bytes`](Self::from_bytes)
    /// would refuse: no level or more than `TREE_MAX_ARITY` of them, a width outside
    /// `1..=TREE_MAX_ARITY`, levels of differing widths, an out-of-band width that differs
    /// from the levels, or an index outside its level.
    pub fn to_bytes(&self, encoding: WidthEncoding) -> Result<Vec<u8>> {
        let width = self.encodable_width(encoding)?;
        let mut bytes = Vec::with_capacity(self.encoded_len(encoding));
        if encoding == WidthEncoding::Prefixed {
            bytes.push(width);
        }
        for level in &self.levels {
            for key in &level.keys {
                bytes.extend_from_slice(key.as_ref());
            }
            bytes.extend_from_slice(level.signature.as_ref());
            bytes.push(level.index);
        }
        bytes.extend_from_slice(self.leaf.as_ref());
        Ok(bytes)
    }

    fn encodable_width(&self, encoding: WidthEncoding) -> Result<u8> {
        if self.levels.is_empty() || self.levels.len() > TREE_MAX_ARITY {
            return Err(Error::MalformedSignature(format!(
                "{} levels outside 1..={TREE_MAX_ARITY}",
                self.levels.len()
            )));
        }
        let width = self.width().unwrap_or(0);
        let width = u8::try_from(width)
            .ok()
            .filter(|&width| width != 0)
            .ok_or_else(|| Error::MalformedSignature(format!("unencodable width {width}")))?;
        if let WidthEncoding::OutOfBand(expected) = encoding {
            if expected != width {
                return Err(Error::MalformedSignature(format!(
                    "levels of width {width} encoded for width {expected}"
                )));
            }
        }
        for (depth, level) in self.levels.iter().enumerate() {
            if level.keys.len() != width as usize {
                return Err(Error::MalformedSignature(format!(
                    "level {depth} has {} keys, expected {width}",
                    level.keys.len()
                )));
            }
            if level.index >= width {
                return Err(Error::MalformedSignature(format!(
                    "level {depth} selects key {} of {width}",
                    level.index
                )));
            }
        }
        Ok(width)
    }

    /// Parses an encoded signature.
    ///
    /// Levels are read for as long as more than one OTS signature's worth of bytes
    /// remains; exactly one leaf signature must then be left over.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedSignature`] if the input is truncated, has trailing
    /// bytes, declares a width of zero, carries no level, or selects a key index outside
    /// its level.
    pub fn from_bytes(bytes: &[u8], encoding: WidthEncoding) -> Result<Self> {
        let mut reader = SignatureReader::new(bytes);
        let width = match encoding {
            WidthEncoding::Prefixed => reader.read_u8()?,
            WidthEncoding::OutOfBand(width) => width,
        } as usize;
        if width == 0 {
            return Err(Error::MalformedSignature("zero tree width".to_string()));
        }

        let mut levels = Vec::new();
        while reader.remaining() > OTS_BYTES {
            if levels.len() == TREE_MAX_ARITY {
                return Err(Error::MalformedSignature(format!(
                    "more than {TREE_MAX_ARITY} levels"
                )));
            }
            let keys = reader
                .read(width * OTS_PK_BYTES)?
                .chunks_exact(OTS_PK_BYTES)
                .map(OtsPublicKey::try_from)
                .collect::<Result<Vec<_>>>()?;
            let signature = OtsSignature::try_from(reader.read(OTS_BYTES)?)?;
            let index = reader.read_u8()?;
            if index as usize >= width {
                return Err(Error::MalformedSignature(format!(
                    "level {} selects key {index} of {width}",
                    levels.len()
                )));
            }
            levels.push(LevelAuth {
                keys,
                signature,
                index,
            });
        }

        let leaf = OtsSignature::try_from(reader.read(OTS_BYTES)?)?;
        reader.finish()?;
        if levels.is_empty() {
            return Err(Error::MalformedSignature("no tree levels".to_string()));
        }
        Ok(Self { levels, leaf })
    }

    /// Walks the path from `root` to the leaf and checks every OTS signature on it.
    pub fn verify(&self, digest: &[u8; OTS_N], root: &OtsPublicKey) -> bool {
        let mut parent = *root;
        for level in &self.levels {
            let child = match level.keys.get(level.index as usize) {
                Some(child) => *child,
                None => return false,
            };
            if !Wots::verify(&level_digest(&level.keys), &level.signature, &parent) {
                return false;
            }
            parent = child;
        }
        Wots::verify(&leaf_digest(digest), &self.leaf, &parent)
    }
}

/// Bounds-checked cursor over an encoded signature.
pub(crate) struct SignatureReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> SignatureReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    pub(crate) fn read(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(Error::MalformedSignature(format!(
                "truncated at offset {}: needed {len} bytes, {} left",
                self.offset,
                self.remaining()
            )));
        }
        let bytes = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read(1)?[0])
    }

    pub(crate) fn finish(self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            left => Err(Error::MalformedSignature(format!("{left} trailing bytes"))),
        }
    }
}
