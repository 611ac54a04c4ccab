//! DAT v3 版本解密模块

use super::error::DecryptError;
use crate::format::FormatHint;

/// v3 版本解密器
pub struct V3Decryptor;

impl V3Decryptor {
    /// 解密 v3 版本的 DAT 数据
    ///
    /// # 参数
    ///
    /// * `data` - 文件内容
    /// * `xor_key` - XOR 密钥
    ///
    /// # 返回
    ///
    /// 解密后的字节数据,开头不是已知图片魔数时返回 `DecryptionFailure`
    pub fn decrypt(data: &[u8], xor_key: u8) -> Result<Vec<u8>, DecryptError> {
        log::debug!("解密 v3 DAT 文件,大小: {} 字节", data.len());

        let decrypted = Self::xor_decrypt(data, xor_key);

        if FormatHint::sniff(&decrypted).is_none() {
            return Err(DecryptError::DecryptionFailure(format!(
                "XOR 密钥 {:#04x} 解密结果不是有效图片",
                xor_key
            )));
        }

        log::debug!("v3 解密完成");

        Ok(decrypted)
    }

    /// XOR 解密,加密与解密是同一操作
    pub fn xor_decrypt(data: &[u8], key: u8) -> Vec<u8> {
        data.iter().map(|&b| b ^ key).collect()
    }
}
