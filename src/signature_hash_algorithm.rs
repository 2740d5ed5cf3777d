//! RFC 5246 §7.4.1.4.1 `signature_and_hash_algorithm`, as exchanged in
//! `CertificateRequest` and `CertificateVerify` for the certificate suite.

use std::convert::TryFrom;
use std::io::{Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt};

use crate::error::{Error, Result};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum HashAlgorithm {
    Sha256 = 4,
    Sha384 = 5,
}

impl TryFrom<u8> for HashAlgorithm {
    type Error = Error;

    fn try_from(val: u8) -> Result<Self> {
        match val {
            4 => Ok(HashAlgorithm::Sha256),
            5 => Ok(HashAlgorithm::Sha384),
            _ => Err(Error::AlertHandshakeFailure(format!(
                "unsupported hash algorithm {val}"
            ))),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SignatureAlgorithm {
    Rsa = 1,
    Ecdsa = 3,
}

impl TryFrom<u8> for SignatureAlgorithm {
    type Error = Error;

    fn try_from(val: u8) -> Result<Self> {
        match val {
            1 => Ok(SignatureAlgorithm::Rsa),
            3 => Ok(SignatureAlgorithm::Ecdsa),
            _ => Err(Error::AlertHandshakeFailure(format!(
                "unsupported signature algorithm {val}"
            ))),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct SignatureHashAlgorithm {
    pub hash: HashAlgorithm,
    pub signature: SignatureAlgorithm,
}

impl SignatureHashAlgorithm {
    pub const ECDSA_SHA256: SignatureHashAlgorithm = SignatureHashAlgorithm {
        hash: HashAlgorithm::Sha256,
        signature: SignatureAlgorithm::Ecdsa,
    };

    pub fn marshal<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(self.hash as u8)?;
        writer.write_u8(self.signature as u8)?;
        Ok(())
    }

    pub fn unmarshal<R: Read>(reader: &mut R) -> Result<Self> {
        let hash = HashAlgorithm::try_from(reader.read_u8().map_err(Error::from)?)?;
        let signature = SignatureAlgorithm::try_from(reader.read_u8().map_err(Error::from)?)?;
        Ok(SignatureHashAlgorithm { hash, signature })
    }
}

pub fn default_signature_hash_algorithms() -> Vec<SignatureHashAlgorithm> {
    vec![SignatureHashAlgorithm::ECDSA_SHA256]
}
