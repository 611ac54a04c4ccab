//! 统一的错误处理模块
//!
//! 解密与转码子模块各自定义错误类型,在这里汇总为 `AppError`,
//! 并为调用方提供稳定的错误代码。

use crate::decrypt::DecryptError;
use crate::wxgf::TranscodeError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// 错误类型
///
/// 每个错误只影响当前文件,批量处理时由调用方逐个统计。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    // ===== 文件系统错误 =====
    #[error("文件读取失败: {0}")]
    IoFailure(String),

    // ===== 解密错误 =====
    #[error("不支持的 DAT 版本")]
    UnsupportedFormat,

    #[error("数据不完整: 需要 {needed} 字节,实际 {actual} 字节")]
    TruncatedInput { needed: usize, actual: usize },

    #[error("密钥无效: {0}")]
    InvalidKeyMaterial(String),

    #[error("解密失败: {0}")]
    DecryptionFailure(String),

    // ===== 转码错误 =====
    #[error("不支持的 wxgf 编码: {0:#04x}")]
    UnsupportedContainerCodec(u8),

    #[error("wxgf 容器格式无效: {0}")]
    MalformedContainer(String),

    #[error("图片编码失败: {0}")]
    ImageEncodeFailed(String),

    #[error("wxgf 解码失败: {0}")]
    ContainerDecodeFailed(String),

    // ===== 配置错误 =====
    #[error("配置文件格式错误: {0}")]
    ConfigParseError(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    Internal(String),
}

/// 结构化的错误响应
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// 错误代码
    pub code: String,
    /// 错误消息
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl From<AppError> for ErrorResponse {
    fn from(err: AppError) -> Self {
        ErrorResponse::new(err.code(), err.to_string())
    }
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        ErrorResponse::new(err.code(), err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoFailure(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::ConfigParseError(err.to_string())
    }
}

impl From<DecryptError> for AppError {
    fn from(err: DecryptError) -> Self {
        match err {
            DecryptError::IoError(e) => AppError::IoFailure(e.to_string()),
            DecryptError::UnsupportedFormat => AppError::UnsupportedFormat,
            DecryptError::TruncatedInput { needed, actual } => {
                AppError::TruncatedInput { needed, actual }
            }
            DecryptError::InvalidKeyMaterial(msg) => AppError::InvalidKeyMaterial(msg),
            DecryptError::DecryptionFailure(msg) => AppError::DecryptionFailure(msg),
        }
    }
}

impl From<TranscodeError> for AppError {
    fn from(err: TranscodeError) -> Self {
        match err {
            TranscodeError::TruncatedInput { needed, actual } => {
                AppError::TruncatedInput { needed, actual }
            }
            TranscodeError::UnsupportedCodec(flag) => AppError::UnsupportedContainerCodec(flag),
            TranscodeError::MalformedContainer(msg) => AppError::MalformedContainer(msg),
            TranscodeError::Encode(msg) => AppError::ImageEncodeFailed(msg),
            TranscodeError::Decoder(msg) => AppError::ContainerDecodeFailed(msg),
        }
    }
}

impl AppError {
    /// 错误代码
    pub fn code(&self) -> &'static str {
        match self {
            AppError::IoFailure(_) => "IO_FAILURE",
            AppError::UnsupportedFormat => "UNSUPPORTED_FORMAT",
            AppError::TruncatedInput { .. } => "TRUNCATED_INPUT",
            AppError::InvalidKeyMaterial(_) => "INVALID_KEY_MATERIAL",
            AppError::DecryptionFailure(_) => "DECRYPTION_FAILURE",
            AppError::UnsupportedContainerCodec(_) => "UNSUPPORTED_CONTAINER_CODEC",
            AppError::MalformedContainer(_) => "MALFORMED_CONTAINER",
            AppError::ImageEncodeFailed(_) => "IMAGE_ENCODE_FAILED",
            AppError::ContainerDecodeFailed(_) => "CONTAINER_DECODE_FAILED",
            AppError::ConfigParseError(_) => "CONFIG_PARSE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 将错误转换为错误代码和消息
    pub fn to_code_and_message(&self) -> (String, String) {
        (self.code().to_string(), self.to_string())
    }
}

/// 转换为 `"[CODE] message"` 形式的字符串
impl From<AppError> for String {
    fn from(err: AppError) -> Self {
        ErrorResponse::from(err).to_string()
    }
}
