//! 检测 → 解密 → 转码 流水线

use crate::decrypt::{DatDecryptor, KeyMaterial};
use crate::error::AppError;
use crate::format::DisplayImage;
use crate::wxgf::ContainerTranscoder;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// 磁盘上读取的原始文件内容
#[derive(Debug, Clone)]
pub struct RawBlob {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

impl RawBlob {
    /// 读取整个文件,返回前关闭文件句柄
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref();
        let mut file = File::open(path)
            .map_err(|e| AppError::IoFailure(format!("{}: {}", path.display(), e)))?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| AppError::IoFailure(format!("{}: {}", path.display(), e)))?;

        Ok(Self {
            path: path.to_path_buf(),
            bytes,
        })
    }
}

/// 解密并转码的流水线
///
/// 不持有可变状态,可在任意数量的线程间共享。
#[derive(Default)]
pub struct Pipeline {
    transcoder: ContainerTranscoder,
}

impl Pipeline {
    pub fn new(transcoder: ContainerTranscoder) -> Self {
        Self { transcoder }
    }

    /// 解密缓存文件并转换为可显示的图片
    pub fn decrypt_and_convert<P: AsRef<Path>>(
        &self,
        path: P,
        keys: &KeyMaterial,
    ) -> Result<DisplayImage, AppError> {
        let blob = RawBlob::read(path)?;

        log::debug!("解密文件 {},大小: {} 字节", blob.path.display(), blob.bytes.len());

        self.convert_bytes(&blob.bytes, keys)
    }

    /// 对内存中的文件内容执行同样的流程
    pub fn convert_bytes(&self, data: &[u8], keys: &KeyMaterial) -> Result<DisplayImage, AppError> {
        let plaintext = DatDecryptor::decrypt(data, keys)?;
        let image = self
            .transcoder
            .transcode_if_proprietary(plaintext.into_bytes())?;
        Ok(image)
    }
}

static DEFAULT_PIPELINE: OnceLock<Pipeline> = OnceLock::new();

/// 使用默认编码集合的流水线
pub fn default_pipeline() -> &'static Pipeline {
    DEFAULT_PIPELINE.get_or_init(Pipeline::default)
}

/// 解密缓存文件并转换为可显示的图片
pub fn decrypt_and_convert<P: AsRef<Path>>(
    path: P,
    keys: &KeyMaterial,
) -> Result<DisplayImage, AppError> {
    default_pipeline().decrypt_and_convert(path, keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decrypt::V3Decryptor;
    use crate::format::ImageFormat;

    #[test]
    fn test_missing_file() {
        let keys = KeyMaterial::with_fallback_key(0x00);
        let result = decrypt_and_convert("/definitely/not/here.dat", &keys);
        assert!(matches!(result, Err(AppError::IoFailure(_))));
    }

    #[test]
    fn test_convert_legacy_bytes() {
        let plain = b"GIF89a\x01\x00\x01\x00".to_vec();
        let encrypted = V3Decryptor::xor_decrypt(&plain, 0x42);
        let keys = KeyMaterial::with_fallback_key(0x42);

        let image = default_pipeline().convert_bytes(&encrypted, &keys).unwrap();
        assert_eq!(image.format, ImageFormat::Gif);
        assert_eq!(image.bytes, plain);
    }

    #[test]
    fn test_convert_legacy_wrong_key() {
        let plain = b"GIF89a\x01\x00\x01\x00".to_vec();
        let encrypted = V3Decryptor::xor_decrypt(&plain, 0x42);
        let keys = KeyMaterial::with_fallback_key(0x43);

        let result = default_pipeline().convert_bytes(&encrypted, &keys);
        assert!(matches!(result, Err(AppError::DecryptionFailure(_))));
    }
}
