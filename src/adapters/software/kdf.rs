use hkdf::Hkdf;
use sha2::{Sha256, Sha384, Sha512};

use super::{Family, HashKind};
use crate::error::{EngineError, EngineResult};
use crate::model::{
    Algorithm, CryptoKey, KeyAlgorithm, KeyData, KeyFormat, KeyMaterial, KeyType, KeyUsage,
};

pub(super) fn import(
    format: KeyFormat,
    key_data: &KeyData,
    extractable: bool,
    usages: &[KeyUsage],
) -> EngineResult<CryptoKey> {
    let KeyData::Bytes(bytes) = key_data else {
        return Err(EngineError::DataError {
            format: format.to_string(),
            reason: "HKDF keys import from raw bytes only".to_string(),
        });
    };
    if format != KeyFormat::Raw {
        return Err(EngineError::NotSupported {
            operation: "importKey",
            algorithm: format!("hkdf/{format}"),
        });
    }
    Ok(CryptoKey {
        key_type: KeyType::Secret,
        extractable,
        algorithm: KeyAlgorithm::new(Family::Hkdf.internal_name()),
        usages: usages.to_vec(),
        material: KeyMaterial::new(bytes.clone()),
    })
}

/// HKDF extract-and-expand to `bits` of output keying material
pub(super) fn derive_bits(algorithm: &Algorithm, base_key: &CryptoKey, bits: u32) -> EngineResult<Vec<u8>> {
    if bits == 0 || bits % 8 != 0 {
        return Err(EngineError::InvalidParameters {
            reason: format!("derived length must be a positive multiple of 8, got {bits}"),
        });
    }
    let hash = HashKind::require(algorithm.hash_name(), "deriveKey")?;
    let salt = algorithm.salt.as_deref().unwrap_or(&[]);
    let info = algorithm.info.as_deref().unwrap_or(&[]);
    let ikm = base_key.material.as_bytes();

    let mut okm = vec![0u8; (bits / 8) as usize];
    let expanded = match hash {
        HashKind::Sha256 => Hkdf::<Sha256>::new(Some(salt), ikm).expand(info, &mut okm),
        HashKind::Sha384 => Hkdf::<Sha384>::new(Some(salt), ikm).expand(info, &mut okm),
        HashKind::Sha512 => Hkdf::<Sha512>::new(Some(salt), ikm).expand(info, &mut okm),
    };
    expanded.map_err(|_| EngineError::InvalidParameters {
        reason: format!("HKDF cannot produce {bits} bits with {}", hash.name()),
    })?;
    Ok(okm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc5869_case_1() {
        let ikm = vec![0x0b; 22];
        let base = import(KeyFormat::Raw, &KeyData::Bytes(ikm), false, &[]).unwrap();
        let params = Algorithm::new("HKDF")
            .with_hash("SHA-256")
            .with_salt(hex::decode("000102030405060708090a0b0c").unwrap())
            .with_info(hex::decode("f0f1f2f3f4f5f6f7f8f9").unwrap());

        let okm = derive_bits(&params, &base, 42 * 8).unwrap();
        assert_eq!(
            hex::encode(okm),
            "3cb25f25faacd57a90434f64d0362f2a2d2d0a90cf1a5a4c5db02d56ecc4c5bf34007208d5b887185865"
        );
    }

    #[test]
    fn test_rejects_odd_length() {
        let base = import(KeyFormat::Raw, &KeyData::Bytes(vec![1]), false, &[]).unwrap();
        let params = Algorithm::new("HKDF").with_hash("SHA-256");
        assert!(derive_bits(&params, &base, 7).is_err());
    }
}
