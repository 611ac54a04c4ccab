//! 密钥配置
//!
//! 读取查看器保存的 `config.json` 并转换为 [`KeyMaterial`]。只读,不负责写入。

use crate::decrypt::aes::AesHandler;
use crate::decrypt::KeyMaterial;
use crate::error::AppError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// 默认配置文件路径
pub const CONFIG_FILE: &str = "config.json";

/// 配置结构
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct KeyConfig {
    pub xor: u8,
    #[serde(default)]
    pub aes: String,
}

impl KeyConfig {
    pub fn from_json(content: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(content)?)
    }

    /// 读取配置文件
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// 转换为解密密钥
    ///
    /// - AES 字符串超过 16 字节时截取前 16 字节
    /// - 为空时使用固定密钥
    /// - 不足 16 字节时忽略该密钥,XOR 值照常使用,只有 V2 文件会解密失败
    pub fn to_key_material(&self) -> Result<KeyMaterial, AppError> {
        let aes_bytes = self.aes.as_bytes();

        if aes_bytes.is_empty() {
            log::info!("未配置 AES 密钥,使用固定密钥");
            return Ok(KeyMaterial::with_fallback_key(self.xor));
        }

        if aes_bytes.len() < AesHandler::KEY_SIZE {
            log::warn!(
                "AES 密钥长度不足 {} 字节 (实际 {} 字节),已忽略,使用固定密钥",
                AesHandler::KEY_SIZE,
                aes_bytes.len()
            );
            return Ok(KeyMaterial::with_fallback_key(self.xor));
        }

        let aes_key = &aes_bytes[..AesHandler::KEY_SIZE];
        Ok(KeyMaterial::new(self.xor, aes_key)?)
    }
}
