pub(crate) fn xor_in_place(dst: &mut [u8], src: &[u8]) {
    dst.iter_mut().zip(src.iter()).for_each(|(d, s)| *d ^= s);
}

macro_rules! array_struct {
    ($(#[$meta:meta])* $type: ident, $size: expr) => {
        $(#[$meta])*
        ///
        /// The internal `u8` array implements `Zeroize`, so callers holding it can wipe it
        /// explicitly. Serialization is available via the `serialization` feature.
        #[derive(Clone, Debug, Zeroize)]
        #[cfg_attr(
            feature = "serialization",
            derive(serde::Serialize, serde::Deserialize)
        )]
        pub struct $type(
            #[cfg_attr(feature = "serialization", serde(with = "serde_big_array::BigArray"))]
            pub(crate) [u8; $size],
        );

        impl $type {
            /// Byte size of the value.
            pub const SIZE: usize = $size;

            /// Returns the raw bytes.
            pub fn as_bytes(&self) -> &[u8; $size] {
                &self.0
            }
        }

        impl AsRef<[u8]> for $type {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; $size]> for $type {
            fn from(value: [u8; $size]) -> Self {
                Self(value)
            }
        }

        impl TryFrom<&[u8]> for $type {
            type Error = Error;
            fn try_from(data: &[u8]) -> ::core::result::Result<$type, Error> {
                if data.len() != $size {
                    Err(Error::BadLength($size, data.len()))
                } else {
                    let mut array = [0u8; $size];
                    array.copy_from_slice(data);
                    Ok($type(array))
                }
            }
        }

        impl PartialEq for $type {
            /// Constant time comparison.
            fn eq(&self, other: &Self) -> bool {
                use subtle::ConstantTimeEq;
                self.0[..].ct_eq(&other.0[..]).into()
            }
        }

        impl Eq for $type {}
    };
}

pub(crate) use array_struct;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xor_in_place() {
        let mut dst = [0b1010_1010u8, 0xff, 0x00];
        xor_in_place(&mut dst, &[0b0101_0101, 0xff, 0x11]);
        assert_eq!(dst, [0xff, 0x00, 0x11]);
    }
}
