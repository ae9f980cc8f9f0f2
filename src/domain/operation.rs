use std::fmt;

/// Methods of the subtle surface that wait for readiness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Decrypt,
    Digest,
    DeriveKey,
    Encrypt,
    ExportKey,
    GenerateKey,
    ImportKey,
    Sign,
    UnwrapKey,
    Verify,
    WrapKey,
}

impl Operation {
    pub const GATED: [Operation; 11] = [
        Operation::Decrypt,
        Operation::Digest,
        Operation::DeriveKey,
        Operation::Encrypt,
        Operation::ExportKey,
        Operation::GenerateKey,
        Operation::ImportKey,
        Operation::Sign,
        Operation::UnwrapKey,
        Operation::Verify,
        Operation::WrapKey,
    ];

    /// Method name as exposed by the standard API
    pub fn name(self) -> &'static str {
        match self {
            Operation::Decrypt => "decrypt",
            Operation::Digest => "digest",
            Operation::DeriveKey => "deriveKey",
            Operation::Encrypt => "encrypt",
            Operation::ExportKey => "exportKey",
            Operation::GenerateKey => "generateKey",
            Operation::ImportKey => "importKey",
            Operation::Sign => "sign",
            Operation::UnwrapKey => "unwrapKey",
            Operation::Verify => "verify",
            Operation::WrapKey => "wrapKey",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
