//! 微信 wxgf 图片容器转码模块
//!
//! 解密后的数据若以 `wxgf` 签名开头,需要根据编码标志转换为标准图片格式;
//! 其他数据原样返回,仅标记格式。
//!
//! [`WxgfHeader`] 描述的是固定的 24 字节文件头,由本库的编码集合解码。
//! 客户端实际写入的容器无法按该布局解析时,交给配置的 [`ContainerDecoder`]
//! (Windows 上默认为 `VoipEngine.dll`)。

pub mod codec;
pub mod error;
pub mod header;
#[cfg(windows)]
pub mod wxam;

pub use codec::{
    flags, CodecRegistry, ContainerDecoder, EmbeddedStreamCodec, PayloadCodec, RawPixelCodec,
};
pub use error::TranscodeError;
pub use header::WxgfHeader;

use crate::format::{is_wxgf, DisplayImage, WXGF_MAGIC, WXGF_MAGIC_UPPER};

/// wxgf 转码器
pub struct ContainerTranscoder {
    registry: CodecRegistry,
    fallback: Option<Box<dyn ContainerDecoder>>,
}

impl Default for ContainerTranscoder {
    /// 默认编码集合;Windows 上附带 DLL 解码器
    fn default() -> Self {
        let transcoder = Self::new(CodecRegistry::default());

        #[cfg(windows)]
        let transcoder = transcoder.with_fallback(Box::new(wxam::WxamDecoder::default()));

        transcoder
    }
}

impl ContainerTranscoder {
    /// 只使用给定编码集合,不带后备解码器
    pub fn new(registry: CodecRegistry) -> Self {
        Self {
            registry,
            fallback: None,
        }
    }

    /// 设置固定布局解码失败时使用的解码器
    pub fn with_fallback(mut self, decoder: Box<dyn ContainerDecoder>) -> Self {
        self.fallback = Some(decoder);
        self
    }

    pub fn registry(&self) -> &CodecRegistry {
        &self.registry
    }

    pub fn fallback(&self) -> Option<&dyn ContainerDecoder> {
        self.fallback.as_deref()
    }

    /// 若为 wxgf 容器则转码,否则原样返回
    pub fn transcode_if_proprietary(&self, data: Vec<u8>) -> Result<DisplayImage, TranscodeError> {
        if !Self::claims_container(&data) {
            return Ok(DisplayImage::sniffed(data));
        }

        let err = match self.decode_pinned(&data) {
            Ok(image) => return Ok(image),
            Err(err) => err,
        };

        // 截断的签名不可能是完整容器
        match &self.fallback {
            Some(decoder) if is_wxgf(&data) => {
                log::debug!("wxgf 固定布局解码失败 ({}),改用 {}", err, decoder.name());
                decoder.decode_container(&data)
            }
            _ => Err(err),
        }
    }

    /// 按固定文件头布局解码
    fn decode_pinned(&self, data: &[u8]) -> Result<DisplayImage, TranscodeError> {
        let header = WxgfHeader::from_bytes(data)?;
        let payload = header.payload(data)?;

        let codec = self
            .registry
            .get(header.codec_flag)
            .ok_or(TranscodeError::UnsupportedCodec(header.codec_flag))?;

        log::debug!(
            "检测到 wxgf 图片,编码: {}, 尺寸: {}x{}, 数据: {} 字节",
            codec.name(),
            header.width,
            header.height,
            payload.len()
        );

        codec.decode(&header, payload)
    }

    /// 完整签名,或被截断的签名前缀
    fn claims_container(data: &[u8]) -> bool {
        if is_wxgf(data) {
            return true;
        }

        !data.is_empty()
            && data.len() < WXGF_MAGIC.len()
            && (WXGF_MAGIC.starts_with(data) || WXGF_MAGIC_UPPER.starts_with(data))
    }
}
