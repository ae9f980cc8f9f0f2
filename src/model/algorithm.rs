//! Algorithm descriptors as passed to the subtle surface

/// Hash algorithm reference nested inside an [`Algorithm`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashAlgorithm {
    pub name: String,
}

impl HashAlgorithm {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Algorithm descriptor supplied by callers
///
/// Names are matched case-insensitively by the public surface. Only the
/// parameters relevant to `name` need to be set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Algorithm {
    pub name: String,
    pub hash: Option<HashAlgorithm>,
    /// RSA modulus length in bits
    pub modulus_length: Option<u32>,
    /// RSA public exponent, big-endian
    pub public_exponent: Option<Vec<u8>>,
    /// Elliptic curve name (`P-256`, ...)
    pub named_curve: Option<String>,
    /// Key length in bits for symmetric keys
    pub length: Option<u32>,
    pub iv: Option<Vec<u8>>,
    pub additional_data: Option<Vec<u8>>,
    /// Authentication tag length in bits
    pub tag_length: Option<u32>,
    pub salt: Option<Vec<u8>>,
    pub info: Option<Vec<u8>>,
}

impl Algorithm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(HashAlgorithm::new(hash));
        self
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_modulus(mut self, modulus_length: u32, public_exponent: Vec<u8>) -> Self {
        self.modulus_length = Some(modulus_length);
        self.public_exponent = Some(public_exponent);
        self
    }

    pub fn with_iv(mut self, iv: impl Into<Vec<u8>>) -> Self {
        self.iv = Some(iv.into());
        self
    }

    pub fn with_additional_data(mut self, aad: impl Into<Vec<u8>>) -> Self {
        self.additional_data = Some(aad.into());
        self
    }

    pub fn with_salt(mut self, salt: impl Into<Vec<u8>>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    pub fn with_info(mut self, info: impl Into<Vec<u8>>) -> Self {
        self.info = Some(info.into());
        self
    }

    /// Case-insensitive comparison of the algorithm name
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Name of the nested hash, if any
    pub fn hash_name(&self) -> Option<&str> {
        self.hash.as_ref().map(|h| h.name.as_str())
    }
}

/// Algorithm metadata attached to a [`crate::model::CryptoKey`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyAlgorithm {
    pub name: String,
    pub hash: Option<HashAlgorithm>,
    pub modulus_length: Option<u32>,
    pub public_exponent: Option<Vec<u8>>,
    pub named_curve: Option<String>,
    pub length: Option<u32>,
}

impl KeyAlgorithm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}
