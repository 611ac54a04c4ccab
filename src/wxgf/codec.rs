//! wxgf 数据段编码
//!
//! 每个编码标志对应一个 [`PayloadCodec`] 实现,新逆向出的编码只需注册到
//! [`CodecRegistry`],不影响版本检测与解密逻辑。

use super::error::TranscodeError;
use super::header::WxgfHeader;
use crate::format::{DisplayImage, ImageFormat};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use std::collections::HashMap;

/// 已知的编码标志
pub mod flags {
    pub const RAW_RGBA8: u8 = 0x00;
    pub const RAW_RGB8: u8 = 0x01;
    pub const RAW_LUMA8: u8 = 0x02;
    pub const EMBEDDED_JPEG: u8 = 0x10;
    pub const EMBEDDED_PNG: u8 = 0x11;
    pub const EMBEDDED_GIF: u8 = 0x12;
    /// HEVC 动图,尚未实现
    pub const HEVC: u8 = 0x20;
}

/// 数据段解码能力
pub trait PayloadCodec: Send + Sync {
    /// 该实现处理的编码标志
    fn flag(&self) -> u8;

    fn name(&self) -> &'static str;

    /// 将数据段转换为标准格式图片
    fn decode(&self, header: &WxgfHeader, payload: &[u8]) -> Result<DisplayImage, TranscodeError>;
}

/// 整个容器的解码能力
///
/// 用于客户端实际写入的容器布局: 文件头长度可变,编码方式不在固定位置,
/// 无法拆成文件头加数据段交给 [`PayloadCodec`]。
pub trait ContainerDecoder: Send + Sync {
    fn name(&self) -> &'static str;

    /// 将完整的 wxgf 数据 (含签名) 转换为标准格式图片
    fn decode_container(&self, data: &[u8]) -> Result<DisplayImage, TranscodeError>;
}

/// 未压缩像素,重新编码为 PNG
pub struct RawPixelCodec {
    flag: u8,
    color: ExtendedColorType,
    channels: u64,
    name: &'static str,
}

impl RawPixelCodec {
    pub fn rgba8() -> Self {
        Self {
            flag: flags::RAW_RGBA8,
            color: ExtendedColorType::Rgba8,
            channels: 4,
            name: "raw-rgba8",
        }
    }

    pub fn rgb8() -> Self {
        Self {
            flag: flags::RAW_RGB8,
            color: ExtendedColorType::Rgb8,
            channels: 3,
            name: "raw-rgb8",
        }
    }

    pub fn luma8() -> Self {
        Self {
            flag: flags::RAW_LUMA8,
            color: ExtendedColorType::L8,
            channels: 1,
            name: "raw-luma8",
        }
    }

    fn expected_len(&self, header: &WxgfHeader) -> Result<usize, TranscodeError> {
        if header.width == 0 || header.height == 0 {
            return Err(TranscodeError::MalformedContainer(format!(
                "图片尺寸无效: {}x{}",
                header.width, header.height
            )));
        }

        (header.width as u64)
            .checked_mul(header.height as u64)
            .and_then(|pixels| pixels.checked_mul(self.channels))
            .and_then(|len| usize::try_from(len).ok())
            .ok_or_else(|| {
                TranscodeError::MalformedContainer(format!(
                    "图片尺寸溢出: {}x{}",
                    header.width, header.height
                ))
            })
    }
}

impl PayloadCodec for RawPixelCodec {
    fn flag(&self) -> u8 {
        self.flag
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn decode(&self, header: &WxgfHeader, payload: &[u8]) -> Result<DisplayImage, TranscodeError> {
        let expected = self.expected_len(header)?;

        if payload.len() < expected {
            return Err(TranscodeError::TruncatedInput {
                needed: expected,
                actual: payload.len(),
            });
        }
        if payload.len() > expected {
            return Err(TranscodeError::MalformedContainer(format!(
                "像素数据长度 {} 与尺寸 {}x{} 不符",
                payload.len(),
                header.width,
                header.height
            )));
        }

        let mut png = Vec::new();
        PngEncoder::new(&mut png)
            .write_image(payload, header.width, header.height, self.color)
            .map_err(|e| TranscodeError::Encode(format!("PNG 编码失败: {}", e)))?;

        log::debug!(
            "{} 像素数据已编码为 PNG: {}x{}, {} 字节",
            self.name,
            header.width,
            header.height,
            png.len()
        );

        Ok(DisplayImage::new(png, ImageFormat::Png))
    }
}

/// 数据段本身就是标准图片流,仅需取出
pub struct EmbeddedStreamCodec {
    flag: u8,
    format: ImageFormat,
    name: &'static str,
}

impl EmbeddedStreamCodec {
    pub fn jpeg() -> Self {
        Self {
            flag: flags::EMBEDDED_JPEG,
            format: ImageFormat::Jpeg,
            name: "embedded-jpeg",
        }
    }

    pub fn png() -> Self {
        Self {
            flag: flags::EMBEDDED_PNG,
            format: ImageFormat::Png,
            name: "embedded-png",
        }
    }

    pub fn gif() -> Self {
        Self {
            flag: flags::EMBEDDED_GIF,
            format: ImageFormat::Gif,
            name: "embedded-gif",
        }
    }
}

impl PayloadCodec for EmbeddedStreamCodec {
    fn flag(&self) -> u8 {
        self.flag
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn decode(&self, _header: &WxgfHeader, payload: &[u8]) -> Result<DisplayImage, TranscodeError> {
        let actual = ImageFormat::sniff(payload);
        if actual != self.format {
            return Err(TranscodeError::MalformedContainer(format!(
                "内嵌数据应为 {:?},实际为 {:?}",
                self.format, actual
            )));
        }

        Ok(DisplayImage::new(payload.to_vec(), self.format))
    }
}

/// 编码标志到解码实现的映射
pub struct CodecRegistry {
    codecs: HashMap<u8, Box<dyn PayloadCodec>>,
}

impl CodecRegistry {
    /// 空注册表
    pub fn empty() -> Self {
        Self {
            codecs: HashMap::new(),
        }
    }

    /// 注册解码实现,同一标志的旧实现会被替换
    pub fn register(&mut self, codec: Box<dyn PayloadCodec>) -> &mut Self {
        let flag = codec.flag();
        if let Some(previous) = self.codecs.insert(flag, codec) {
            log::debug!("编码 {:#04x} 的实现 {} 已被替换", flag, previous.name());
        }
        self
    }

    pub fn get(&self, flag: u8) -> Option<&dyn PayloadCodec> {
        self.codecs.get(&flag).map(|codec| codec.as_ref())
    }

    pub fn supports(&self, flag: u8) -> bool {
        self.codecs.contains_key(&flag)
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register(Box::new(RawPixelCodec::rgba8()))
            .register(Box::new(RawPixelCodec::rgb8()))
            .register(Box::new(RawPixelCodec::luma8()))
            .register(Box::new(EmbeddedStreamCodec::jpeg()))
            .register(Box::new(EmbeddedStreamCodec::png()))
            .register(Box::new(EmbeddedStreamCodec::gif()));
        registry
    }
}
