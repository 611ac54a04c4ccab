//! DAT v4 版本解密模块
//!
//! 文件结构:
//!
//! ```text
//! | 签名 6 | AES 大小 u32 LE | XOR 大小 u32 LE | 保留 1 |
//! | AES-ECB 密文 (align_size(AES 大小)) | 原始数据 | XOR 数据 (XOR 大小) |
//! ```

use super::aes::AesHandler;
use super::error::DecryptError;
use super::v3::V3Decryptor;
use crate::format::FormatHint;

/// v4 版本文件头结构
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V4Header {
    /// 签名 (6 字节)
    pub signature: [u8; 6],
    /// AES 加密部分解密后的大小
    pub aes_size: u32,
    /// XOR 加密部分大小
    pub xor_size: u32,
}

/// 各数据段在文件中的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct V4Layout {
    aes_end: usize,
    raw_end: usize,
}

impl V4Header {
    /// 文件头大小
    pub const SIZE: usize = 15;

    /// 从字节数组解析文件头
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecryptError> {
        if bytes.len() < Self::SIZE {
            return Err(DecryptError::TruncatedInput {
                needed: Self::SIZE,
                actual: bytes.len(),
            });
        }

        let mut signature = [0u8; 6];
        signature.copy_from_slice(&bytes[0..6]);

        let aes_size = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]);
        let xor_size = u32::from_le_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]);

        Ok(Self {
            signature,
            aes_size,
            xor_size,
        })
    }

    /// 根据文件总长度计算各段边界
    fn layout(&self, file_len: usize) -> Result<V4Layout, DecryptError> {
        // u64 计算,避免 32 位平台上溢出
        let block = AesHandler::BLOCK_SIZE as u64;
        let aes_size = self.aes_size as u64;
        let aes_len = aes_size + (block - aes_size % block);
        let xor_len = self.xor_size as u64;
        let needed = Self::SIZE as u64 + aes_len + xor_len;

        if needed > file_len as u64 {
            return Err(DecryptError::TruncatedInput {
                needed: usize::try_from(needed).unwrap_or(usize::MAX),
                actual: file_len,
            });
        }

        // needed <= file_len,以下转换不会截断
        Ok(V4Layout {
            aes_end: Self::SIZE + aes_len as usize,
            raw_end: file_len - xor_len as usize,
        })
    }
}

/// v4 版本解密器
pub struct V4Decryptor;

impl V4Decryptor {
    /// 解密 v4 版本的 DAT 数据
    ///
    /// # 参数
    ///
    /// * `data` - 文件内容
    /// * `xor_key` - XOR 密钥 (用于尾部 XOR 段)
    /// * `aes_key` - AES 密钥 (16 字节)
    ///
    /// # 返回
    ///
    /// 解密后的字节数据
    pub fn decrypt(data: &[u8], xor_key: u8, aes_key: &[u8]) -> Result<Vec<u8>, DecryptError> {
        if aes_key.len() != AesHandler::KEY_SIZE {
            return Err(DecryptError::InvalidKeyMaterial(format!(
                "AES 密钥必须为 {} 字节,实际 {} 字节",
                AesHandler::KEY_SIZE,
                aes_key.len()
            )));
        }

        let header = V4Header::from_bytes(data)?;
        let layout = header.layout(data.len())?;

        log::debug!(
            "解密 v4 DAT 文件,AES 大小: {}, XOR 大小: {}",
            header.aes_size,
            header.xor_size
        );

        // 解密 AES 部分
        let mut result = AesHandler::decrypt_ecb(&data[V4Header::SIZE..layout.aes_end], aes_key)?;

        // 中间原始数据
        result.extend_from_slice(&data[layout.aes_end..layout.raw_end]);

        // 尾部 XOR 数据
        let xored = V3Decryptor::xor_decrypt(&data[layout.raw_end..], xor_key);
        result.extend_from_slice(&xored);

        if FormatHint::sniff(&result).is_none() {
            return Err(DecryptError::DecryptionFailure(
                "v4 解密结果不是有效图片,密钥可能错误".to_string(),
            ));
        }

        log::debug!("v4 解密完成,总大小: {} 字节", result.len());

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(aes_size: u32, xor_size: u32) -> Vec<u8> {
        let mut bytes = b"\x07\x08V1\x08\x07".to_vec();
        bytes.extend_from_slice(&aes_size.to_le_bytes());
        bytes.extend_from_slice(&xor_size.to_le_bytes());
        bytes.push(0x01);
        bytes
    }

    #[test]
    fn test_header_parse() {
        let header = V4Header::from_bytes(&header_bytes(1024, 0x0010_0000)).unwrap();
        assert_eq!(&header.signature, b"\x07\x08V1\x08\x07");
        assert_eq!(header.aes_size, 1024);
        assert_eq!(header.xor_size, 0x0010_0000);
    }

    #[test]
    fn test_header_truncated() {
        let result = V4Header::from_bytes(&header_bytes(16, 0)[..10]);
        assert!(matches!(
            result,
            Err(DecryptError::TruncatedInput {
                needed: 15,
                actual: 10
            })
        ));
    }

    #[test]
    fn test_layout() {
        let header = V4Header::from_bytes(&header_bytes(20, 8)).unwrap();
        // 15 头 + 32 AES + 5 原始 + 8 XOR
        let layout = header.layout(60).unwrap();
        assert_eq!(layout.aes_end, 47);
        assert_eq!(layout.raw_end, 52);
    }

    #[test]
    fn test_declared_regions_exceed_file() {
        let mut data = header_bytes(1024, 64);
        data.extend_from_slice(&[0u8; 100]);
        let result = V4Decryptor::decrypt(&data, 0x00, b"cfcd208495d565ef");
        assert!(matches!(result, Err(DecryptError::TruncatedInput { .. })));
    }

    #[test]
    fn test_huge_declared_sizes_do_not_overflow() {
        let mut data = header_bytes(u32::MAX, u32::MAX);
        data.extend_from_slice(&[0u8; 32]);
        let result = V4Decryptor::decrypt(&data, 0x00, b"cfcd208495d565ef");
        assert!(matches!(result, Err(DecryptError::TruncatedInput { .. })));
    }

    #[test]
    fn test_invalid_key_length() {
        let mut data = header_bytes(16, 0);
        data.extend_from_slice(&[0u8; 32]);
        let result = V4Decryptor::decrypt(&data, 0x00, b"too-short");
        assert!(matches!(result, Err(DecryptError::InvalidKeyMaterial(_))));
    }
}
