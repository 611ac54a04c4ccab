// 测试用的 DAT 加密工具,按客户端的写入方式构造样本
#![allow(dead_code)]

#[allow(deprecated)]
use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::Aes128;
use std::path::{Path, PathBuf};

pub const V1_SIGNATURE: &[u8; 6] = b"\x07\x08V1\x08\x07";
pub const V2_SIGNATURE: &[u8; 6] = b"\x07\x08V2\x08\x07";
pub const FALLBACK_KEY: &[u8; 16] = b"cfcd208495d565ef";
pub const USER_KEY: &[u8; 16] = b"3a1f9c0e7b2d4f6a";

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 一个最小的 JPEG 字节序列 (只需要魔数正确)
pub fn sample_jpeg(len: usize) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];
    let mut seed = 0x2545_F491u32;
    while data.len() < len.saturating_sub(2) {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        data.push(seed as u8);
    }
    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

pub fn encrypt_v3(plain: &[u8], xor_key: u8) -> Vec<u8> {
    plain.iter().map(|&b| b ^ xor_key).collect()
}

#[allow(deprecated)]
fn encrypt_ecb(plain: &[u8], key: &[u8]) -> Vec<u8> {
    let cipher = Aes128::new_from_slice(key).expect("16 字节密钥");
    let pad = 16 - plain.len() % 16;
    let mut data = plain.to_vec();
    data.extend(std::iter::repeat(pad as u8).take(pad));
    for chunk in data.chunks_exact_mut(16) {
        cipher.encrypt_block(GenericArray::from_mut_slice(chunk));
    }
    data
}

/// 按 v4 结构加密: 头 | AES(前 aes_size 字节) | 原始数据 | XOR(后 xor_size 字节)
pub fn encrypt_v4(
    plain: &[u8],
    signature: &[u8; 6],
    aes_key: &[u8],
    xor_key: u8,
    aes_size: usize,
    xor_size: usize,
) -> Vec<u8> {
    assert!(aes_size + xor_size <= plain.len());

    let mut data = signature.to_vec();
    data.extend_from_slice(&(aes_size as u32).to_le_bytes());
    data.extend_from_slice(&(xor_size as u32).to_le_bytes());
    data.push(0x01);

    data.extend_from_slice(&encrypt_ecb(&plain[..aes_size], aes_key));
    data.extend_from_slice(&plain[aes_size..plain.len() - xor_size]);
    data.extend(encrypt_v3(&plain[plain.len() - xor_size..], xor_key));
    data
}

/// 构造 wxgf 容器
pub fn wxgf_container(codec: u8, width: u32, height: u32, payload: &[u8]) -> Vec<u8> {
    let mut data = b"wxgf".to_vec();
    data.extend_from_slice(&[codec, 0, 0, 0]);
    data.extend_from_slice(&width.to_le_bytes());
    data.extend_from_slice(&height.to_le_bytes());
    data.extend_from_slice(&24u32.to_le_bytes());
    data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    data.extend_from_slice(payload);
    data
}

pub fn write_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).expect("写入测试文件");
    path
}
