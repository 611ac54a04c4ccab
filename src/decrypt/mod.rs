//! 微信 DAT 文件解密模块
//!
//! 该模块提供了解密微信 DAT 格式文件的功能,支持 v3 和 v4 两个版本。
//! - v3: 使用简单的 XOR 加密
//! - v4: 使用 AES-ECB + XOR 混合加密

pub mod aes;
pub mod error;
pub mod keys;
pub mod v3;
pub mod v4;
pub mod version;

// 重新导出公共类型
pub use error::DecryptError;
pub use keys::{KeyMaterial, FALLBACK_AES_KEY};
pub use v3::V3Decryptor;
pub use v4::{V4Decryptor, V4Header};
pub use version::{SchemeVariant, VersionDetector};

use crate::format::FormatHint;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// 解密后的明文图片数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaintextImage {
    bytes: Vec<u8>,
    hint: FormatHint,
}

impl PlaintextImage {
    /// 校验解密结果的魔数,无法识别时视为解密失败
    pub fn from_decrypted(bytes: Vec<u8>) -> Result<Self, DecryptError> {
        let hint = FormatHint::sniff(&bytes).ok_or_else(|| {
            DecryptError::DecryptionFailure("解密结果不是有效图片".to_string())
        })?;

        Ok(Self { bytes, hint })
    }

    pub fn hint(&self) -> FormatHint {
        self.hint
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// DAT 文件解密器
pub struct DatDecryptor;

impl DatDecryptor {
    /// 检测 DAT 文件版本
    pub fn detect_version(header: &[u8]) -> Result<SchemeVariant, DecryptError> {
        VersionDetector::detect(header)
    }

    /// 解密 v3 版本的 DAT 数据
    pub fn decrypt_dat_v3(data: &[u8], xor_key: u8) -> Result<Vec<u8>, DecryptError> {
        V3Decryptor::decrypt(data, xor_key)
    }

    /// 解密 v4 版本的 DAT 数据
    pub fn decrypt_dat_v4(
        data: &[u8],
        xor_key: u8,
        aes_key: &[u8],
    ) -> Result<Vec<u8>, DecryptError> {
        V4Decryptor::decrypt(data, xor_key, aes_key)
    }

    /// 自动检测版本并解密 DAT 数据
    ///
    /// V1 签名的文件总是使用固定 AES 密钥,忽略 `keys` 中的 AES 密钥;
    /// 密钥错误时直接返回错误,不会尝试其他密钥。
    pub fn decrypt(data: &[u8], keys: &KeyMaterial) -> Result<PlaintextImage, DecryptError> {
        let version = Self::detect_version(data)?;

        log::debug!("检测到加密方案: {:?}", version);

        let decrypted = match version {
            SchemeVariant::LegacyXorOnly => Self::decrypt_dat_v3(data, keys.xor_key())?,
            SchemeVariant::CurrentCipherDefaultKey => {
                Self::decrypt_dat_v4(data, keys.xor_key(), &FALLBACK_AES_KEY)?
            }
            SchemeVariant::CurrentCipherUserKey => {
                Self::decrypt_dat_v4(data, keys.xor_key(), keys.aes_key())?
            }
        };

        PlaintextImage::from_decrypted(decrypted)
    }

    /// 读取文件并解密
    ///
    /// 文件句柄在读取完成后立即释放。
    pub fn decrypt_file<P: AsRef<Path>>(
        input_path: P,
        keys: &KeyMaterial,
    ) -> Result<PlaintextImage, DecryptError> {
        let data = {
            let mut file = File::open(input_path)?;
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            data
        };

        Self::decrypt(&data, keys)
    }
}
