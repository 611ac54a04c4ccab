//! wxgf 转码错误类型

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscodeError {
    #[error("wxgf 数据不完整: 需要 {needed} 字节,实际 {actual} 字节")]
    TruncatedInput { needed: usize, actual: usize },

    #[error("不支持的 wxgf 编码: {0:#04x}")]
    UnsupportedCodec(u8),

    #[error("wxgf 容器格式无效: {0}")]
    MalformedContainer(String),

    #[error("图片编码失败: {0}")]
    Encode(String),

    #[error("wxgf 解码器失败: {0}")]
    Decoder(String),
}
