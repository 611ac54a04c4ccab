//! DAT 文件版本检测模块

use super::error::DecryptError;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// DAT 文件加密方案
///
/// 微信 DAT 文件有三种加密版本:
/// - v3: 整个文件与单字节 XOR,文件头是被 XOR 掩盖的图片魔数
/// - v4 V1: 带 `\x07\x08V1\x08\x07` 签名,使用固定 AES 密钥 + XOR 混合加密
/// - v4 V2: 带 `\x07\x08V2\x08\x07` 签名,使用用户 AES 密钥 + XOR 混合加密
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemeVariant {
    /// v3 (仅 XOR)
    LegacyXorOnly,
    /// v4 V1 (固定 AES 密钥)
    CurrentCipherDefaultKey,
    /// v4 V2 (用户 AES 密钥)
    CurrentCipherUserKey,
}

/// 版本检测器
pub struct VersionDetector;

impl VersionDetector {
    /// v4 V1 签名 (固定 AES)
    pub const V4_V1_SIGNATURE: &'static [u8; 6] = b"\x07\x08V1\x08\x07";
    /// v4 V2 签名 (用户 AES)
    pub const V4_V2_SIGNATURE: &'static [u8; 6] = b"\x07\x08V2\x08\x07";

    /// 检测只需要的文件头长度
    pub const HEADER_LEN: usize = 6;

    /// v3 文件头可能对应的图片魔数
    const LEGACY_MAGICS: &'static [&'static [u8]] = &[
        &[0xFF, 0xD8, 0xFF],       // JPEG
        &[0x89, 0x50, 0x4E, 0x47], // PNG
        b"GIF8",
        b"RIFF", // WebP
        b"wxgf",
        b"WXGF",
    ];

    /// v3 检测至少需要的字节数
    const LEGACY_MIN_LEN: usize = 3;

    /// 根据文件头检测加密方案
    ///
    /// 只读取前 `HEADER_LEN` 字节,不尝试任何密钥。
    pub fn detect(header: &[u8]) -> Result<SchemeVariant, DecryptError> {
        let head = &header[..header.len().min(Self::HEADER_LEN)];

        if head == Self::V4_V1_SIGNATURE {
            return Ok(SchemeVariant::CurrentCipherDefaultKey);
        }
        if head == Self::V4_V2_SIGNATURE {
            return Ok(SchemeVariant::CurrentCipherUserKey);
        }

        if Self::legacy_xor_candidate(head).is_some() {
            return Ok(SchemeVariant::LegacyXorOnly);
        }

        Err(DecryptError::UnsupportedFormat)
    }

    /// 从文件读取文件头并检测加密方案
    pub fn detect_file<P: AsRef<Path>>(input_path: P) -> Result<SchemeVariant, DecryptError> {
        let file = File::open(input_path)?;
        let mut header = Vec::with_capacity(Self::HEADER_LEN);
        file.take(Self::HEADER_LEN as u64).read_to_end(&mut header)?;

        Self::detect(&header)
    }

    /// 推算 v3 文件头对应的 XOR 值
    ///
    /// 若文件头与某个图片魔数之间相差同一个 XOR 字节,返回该字节。
    pub fn legacy_xor_candidate(header: &[u8]) -> Option<u8> {
        if header.len() < Self::LEGACY_MIN_LEN {
            return None;
        }

        Self::LEGACY_MAGICS.iter().find_map(|magic| {
            let key = header[0] ^ magic[0];
            let matched = header
                .iter()
                .zip(magic.iter())
                .all(|(&h, &m)| h ^ key == m);
            matched.then_some(key)
        })
    }
}
