//! 解密密钥

use super::aes::AesHandler;
use super::error::DecryptError;
use std::fmt;

/// V1 签名文件使用的固定 AES 密钥
pub const FALLBACK_AES_KEY: [u8; AesHandler::KEY_SIZE] = *b"cfcd208495d565ef";

/// 一次解密所需的全部密钥
///
/// 由调用方提供,解密过程中只读。AES 密钥长度在构造时校验,之后恒为 16 字节。
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct KeyMaterial {
    xor_key: u8,
    aes_key: [u8; AesHandler::KEY_SIZE],
}

impl KeyMaterial {
    /// 创建密钥,AES 密钥必须正好 16 字节
    pub fn new(xor_key: u8, aes_key: &[u8]) -> Result<Self, DecryptError> {
        let aes_key: [u8; AesHandler::KEY_SIZE] = aes_key.try_into().map_err(|_| {
            DecryptError::InvalidKeyMaterial(format!(
                "AES 密钥必须为 {} 字节,实际 {} 字节",
                AesHandler::KEY_SIZE,
                aes_key.len()
            ))
        })?;

        Ok(Self { xor_key, aes_key })
    }

    /// 未获取用户 AES 密钥时使用固定密钥
    pub fn with_fallback_key(xor_key: u8) -> Self {
        Self {
            xor_key,
            aes_key: FALLBACK_AES_KEY,
        }
    }

    pub fn xor_key(&self) -> u8 {
        self.xor_key
    }

    pub fn aes_key(&self) -> &[u8; AesHandler::KEY_SIZE] {
        &self.aes_key
    }

    pub fn uses_fallback_key(&self) -> bool {
        self.aes_key == FALLBACK_AES_KEY
    }
}

// 日志中不输出 AES 密钥
impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("xor_key", &format_args!("{:#04x}", self.xor_key))
            .field("aes_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_length_validation() {
        assert!(KeyMaterial::new(0x12, b"0123456789abcdef").is_ok());
        assert!(matches!(
            KeyMaterial::new(0x12, b"short"),
            Err(DecryptError::InvalidKeyMaterial(_))
        ));
        assert!(matches!(
            KeyMaterial::new(0x12, b"0123456789abcdef0"),
            Err(DecryptError::InvalidKeyMaterial(_))
        ));
    }

    #[test]
    fn test_fallback_key() {
        let keys = KeyMaterial::with_fallback_key(0xAA);
        assert_eq!(keys.xor_key(), 0xAA);
        assert_eq!(keys.aes_key(), b"cfcd208495d565ef");
        assert!(keys.uses_fallback_key());
    }

    #[test]
    fn test_debug_redacts_aes_key() {
        let keys = KeyMaterial::new(0x37, b"secret-aes-key!!").unwrap();
        let printed = format!("{:?}", keys);
        assert!(printed.contains("0x37"));
        assert!(!printed.contains("secret"));
    }
}
