//! 图片格式识别模块
//!
//! 通过文件头魔数识别标准图片格式,并给出 MIME 类型与导出时使用的扩展名。

use base64::Engine;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// wxgf 容器签名 (小写为主,部分客户端写入大写)
pub const WXGF_MAGIC: &[u8; 4] = b"wxgf";
pub const WXGF_MAGIC_UPPER: &[u8; 4] = b"WXGF";

/// 标准图片格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
    /// 无法识别的数据
    Unknown,
}

impl ImageFormat {
    /// 根据魔数识别图片格式
    pub fn sniff(data: &[u8]) -> Self {
        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return ImageFormat::Jpeg;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return ImageFormat::Png;
        }

        // GIF: 47 49 46 38
        if data.starts_with(b"GIF8") {
            return ImageFormat::Gif;
        }

        // WebP: 52 49 46 46 ... 57 45 42 50
        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return ImageFormat::Webp;
        }

        ImageFormat::Unknown
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
            ImageFormat::Unknown => "application/octet-stream",
        }
    }

    /// 导出文件时使用的扩展名 (不含点)
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
            ImageFormat::Unknown => "bin",
        }
    }
}

/// 解密后数据的来源格式提示
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatHint {
    /// 标准图片格式,可直接显示
    Standard(ImageFormat),
    /// wxgf 容器,需要转码
    Container,
}

impl FormatHint {
    /// 识别解密结果的格式,无法识别时返回 `None`
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if is_wxgf(data) {
            return Some(FormatHint::Container);
        }

        match ImageFormat::sniff(data) {
            ImageFormat::Unknown => None,
            format => Some(FormatHint::Standard(format)),
        }
    }
}

/// 检查数据是否以 wxgf 签名开头
pub fn is_wxgf(data: &[u8]) -> bool {
    data.starts_with(WXGF_MAGIC) || data.starts_with(WXGF_MAGIC_UPPER)
}

/// 最终交给调用方的标准格式图片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl DisplayImage {
    pub fn new(bytes: Vec<u8>, format: ImageFormat) -> Self {
        Self { bytes, format }
    }

    /// 按魔数标记格式,不复制数据
    pub fn sniffed(bytes: Vec<u8>) -> Self {
        let format = ImageFormat::sniff(&bytes);
        Self { bytes, format }
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn extension(&self) -> &'static str {
        self.format.extension()
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    /// 生成可直接用于前端 `<img src>` 的 data URL
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), self.to_base64())
    }

    /// 导出文件名: 源文件名去掉扩展名后加上实际格式的扩展名
    ///
    /// Sns 缓存文件没有扩展名,直接追加。
    pub fn output_file_name(&self, source: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());
        PathBuf::from(format!("{}.{}", stem, self.extension()))
    }
}
