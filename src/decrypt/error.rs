//! DAT 解密错误类型

use thiserror::Error;

/// DAT 解密错误类型
#[derive(Error, Debug)]
pub enum DecryptError {
    #[error("文件读取失败: {0}")]
    IoError(#[from] std::io::Error),

    #[error("不支持的 DAT 版本")]
    UnsupportedFormat,

    #[error("数据不完整: 需要 {needed} 字节,实际 {actual} 字节")]
    TruncatedInput { needed: usize, actual: usize },

    #[error("密钥无效: {0}")]
    InvalidKeyMaterial(String),

    #[error("解密失败: {0}")]
    DecryptionFailure(String),
}
