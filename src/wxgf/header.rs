//! wxgf 文件头解析

use super::error::TranscodeError;
use crate::format::{WXGF_MAGIC, WXGF_MAGIC_UPPER};

/// wxgf 文件头
///
/// ```text
/// | 魔数 4 | 编码 1 | 保留 3 | 宽 u32 LE | 高 u32 LE | 数据偏移 u32 LE | 数据长度 u32 LE |
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WxgfHeader {
    pub magic: [u8; 4],
    pub codec_flag: u8,
    pub width: u32,
    pub height: u32,
    /// 数据段相对文件开头的偏移
    pub payload_offset: u32,
    pub payload_length: u32,
}

impl WxgfHeader {
    /// 文件头大小
    pub const SIZE: usize = 24;

    /// 从字节数组解析文件头
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TranscodeError> {
        // 不足 4 字节的签名前缀同样视为截断
        let magic_len = bytes.len().min(WXGF_MAGIC.len());
        let prefix = &bytes[..magic_len];
        if !WXGF_MAGIC.starts_with(prefix) && !WXGF_MAGIC_UPPER.starts_with(prefix) {
            return Err(TranscodeError::MalformedContainer(
                "缺少 wxgf 签名".to_string(),
            ));
        }

        if bytes.len() < Self::SIZE {
            return Err(TranscodeError::TruncatedInput {
                needed: Self::SIZE,
                actual: bytes.len(),
            });
        }

        let read_u32 = |at: usize| {
            u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };

        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);

        Ok(Self {
            magic,
            codec_flag: bytes[4],
            width: read_u32(8),
            height: read_u32(12),
            payload_offset: read_u32(16),
            payload_length: read_u32(20),
        })
    }

    /// 取出数据段,不复制
    pub fn payload<'a>(&self, bytes: &'a [u8]) -> Result<&'a [u8], TranscodeError> {
        let start = self.payload_offset as usize;
        if start < Self::SIZE {
            return Err(TranscodeError::MalformedContainer(format!(
                "数据偏移 {} 位于文件头内",
                start
            )));
        }

        let end = self.payload_offset as u64 + self.payload_length as u64;
        if end > bytes.len() as u64 {
            return Err(TranscodeError::TruncatedInput {
                needed: usize::try_from(end).unwrap_or(usize::MAX),
                actual: bytes.len(),
            });
        }

        Ok(&bytes[start..end as usize])
    }
}
