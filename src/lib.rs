//! 微信 DAT 图片缓存解密
//!
//! 检测缓存文件的加密版本,解密后将 wxgf 容器转换为标准图片格式。
//!
//! ```no_run
//! use wxdat_decoder::{decrypt_and_convert, KeyMaterial};
//!
//! let keys = KeyMaterial::new(0xAA, b"0123456789abcdef")?;
//! let image = decrypt_and_convert("FileStorage/Image/2024-05/abc.dat", &keys)?;
//! std::fs::write(format!("abc.{}", image.extension()), &image.bytes)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
pub use error::{AppError, ErrorResponse};

pub mod batch;
pub mod config;
pub mod decrypt;
pub mod format;
pub mod pipeline;
pub mod wxgf;

pub use batch::{convert_batch, BatchReport, BatchSummary};
pub use config::KeyConfig;
pub use decrypt::{DatDecryptor, DecryptError, KeyMaterial, SchemeVariant, VersionDetector};
pub use format::{DisplayImage, ImageFormat};
pub use pipeline::{decrypt_and_convert, Pipeline};
pub use wxgf::{ContainerTranscoder, TranscodeError};
