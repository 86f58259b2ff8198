use crate::params::OTS_N;
use crate::wots::{OtsKeyPair, OtsPublicKey, OtsSecretKey, OtsSignature};
use crate::{Error, Result};

/// A W-OTS keypair held by a tree node, tracking whether its secret has been spent.
///
/// The first [`sign`](Self::sign) consumes the secret key and remembers the digest and
/// signature. Signing the same digest again replays the remembered signature, since tree
/// nodes re-certify the same child keys on every path through them; signing any other
/// digest fails with [`Error::KeyReused`].
#[derive(Debug)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct OneTimeKey {
    public: OtsPublicKey,
    secret: Option<OtsSecretKey>,
    issued: Option<Issued>,
}

#[derive(Debug)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
struct Issued {
    digest: [u8; OTS_N],
    signature: OtsSignature,
}

impl From<OtsKeyPair> for OneTimeKey {
    fn from(keypair: OtsKeyPair) -> Self {
        let OtsKeyPair { public, secret } = keypair;
        Self {
            public,
            secret: Some(secret),
            issued: None,
        }
    }
}

impl OneTimeKey {
    pub fn public_key(&self) -> &OtsPublicKey {
        &self.public
    }

    /// Whether the secret key has already been consumed.
    pub fn is_spent(&self) -> bool {
        self.secret.is_none()
    }

    /// Signs `digest` with this key, consuming the secret on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyReused`] if the key already signed a different digest.
    pub fn sign(&mut self, digest: &[u8; OTS_N]) -> Result<OtsSignature> {
        if let Some(issued) = &self.issued {
            return if issued.digest == *digest {
                Ok(issued.signature.clone())
            } else {
                Err(Error::KeyReused)
            };
        }

        let secret = self.secret.take().ok_or(Error::KeyReused)?;
        let signature = secret.sign(digest);
        self.issued = Some(Issued {
            digest: *digest,
            signature: signature.clone(),
        });
        Ok(signature)
    }
}
