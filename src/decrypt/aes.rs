//! AES 解密模块

use super::error::DecryptError;

#[allow(deprecated)]
use aes::cipher::{generic_array::GenericArray, BlockDecrypt, KeyInit};
use aes::Aes128;

/// AES 解密处理器
pub struct AesHandler;

impl AesHandler {
    pub const BLOCK_SIZE: usize = 16;
    pub const KEY_SIZE: usize = 16;

    /// AES-128-ECB 解密并移除 PKCS7 填充
    ///
    /// 填充校验失败通常意味着密钥错误,统一报告为 `DecryptionFailure`。
    #[allow(deprecated)]
    pub fn decrypt_ecb(data: &[u8], key: &[u8]) -> Result<Vec<u8>, DecryptError> {
        if key.len() != Self::KEY_SIZE {
            return Err(DecryptError::InvalidKeyMaterial(format!(
                "AES 密钥必须为 {} 字节,实际 {} 字节",
                Self::KEY_SIZE,
                key.len()
            )));
        }

        if data.is_empty() || data.len() % Self::BLOCK_SIZE != 0 {
            return Err(DecryptError::DecryptionFailure(format!(
                "AES 密文长度 {} 不是块大小的整数倍",
                data.len()
            )));
        }

        let cipher = Aes128::new_from_slice(key)
            .map_err(|_| DecryptError::InvalidKeyMaterial("AES 密钥长度无效".to_string()))?;

        let mut result = data.to_vec();

        for chunk in result.chunks_exact_mut(Self::BLOCK_SIZE) {
            let block = GenericArray::from_mut_slice(chunk);
            cipher.decrypt_block(block);
        }

        Self::pkcs7_unpad(&mut result)?;

        Ok(result)
    }

    pub fn pkcs7_unpad(data: &mut Vec<u8>) -> Result<(), DecryptError> {
        let Some(&last) = data.last() else {
            return Err(DecryptError::DecryptionFailure("数据为空".to_string()));
        };

        let padding_len = last as usize;

        if padding_len == 0 || padding_len > Self::BLOCK_SIZE || padding_len > data.len() {
            return Err(DecryptError::DecryptionFailure(
                "无效的填充,AES 密钥可能错误".to_string(),
            ));
        }

        let start = data.len() - padding_len;
        if !data[start..].iter().all(|&b| b == last) {
            return Err(DecryptError::DecryptionFailure(
                "填充验证失败,AES 密钥可能错误".to_string(),
            ));
        }

        data.truncate(start);
        Ok(())
    }

    /// PKCS7 填充后的长度,已对齐时也会多出一个完整块
    pub fn align_size(size: usize) -> usize {
        size + (Self::BLOCK_SIZE - size % Self::BLOCK_SIZE)
    }
}
