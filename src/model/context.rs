use serde::{Deserialize, Serialize};

/// Classification tag grouping detections by cryptographic domain.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "camelCase")]
pub enum ContextKind {
    Cipher,
    BlockCipher,
    StreamCipher,
    WrapEngine,
    WrapRfc,
    Mac,
    Digest,
    Signature,
    KeyDerivation,
    KeyAgreement,
    PublicKeyEncryption,
    Padding,
    SecretKey,
    PrivateKey,
    Random,
    #[default]
    Unknown,
}

impl ContextKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cipher => "cipher",
            Self::BlockCipher => "block-cipher",
            Self::StreamCipher => "stream-cipher",
            Self::WrapEngine => "wrap-engine",
            Self::WrapRfc => "wrap-rfc",
            Self::Mac => "mac",
            Self::Digest => "digest",
            Self::Signature => "signature",
            Self::KeyDerivation => "key-derivation",
            Self::KeyAgreement => "key-agreement",
            Self::PublicKeyEncryption => "public-key-encryption",
            Self::Padding => "padding",
            Self::SecretKey => "secret-key",
            Self::PrivateKey => "private-key",
            Self::Random => "random",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ContextKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
