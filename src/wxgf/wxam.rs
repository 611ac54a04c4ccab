//! 通过微信自带的 `VoipEngine.dll` 解码 wxgf 容器
//!
//! 仅在 Windows 上可用。DLL 需放在可执行文件同目录下,首次使用时加载,
//! 之后在进程内复用。

use super::codec::ContainerDecoder;
use super::error::TranscodeError;
use crate::format::{DisplayImage, ImageFormat};
use std::path::PathBuf;
use std::sync::OnceLock;
use windows::core::{PCSTR, PCWSTR};
use windows::Win32::Foundation::HMODULE;
use windows::Win32::System::LibraryLoader::{FreeLibrary, GetProcAddress, LoadLibraryW};

/// DLL 支持的输出格式
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WxamOutput {
    Jpeg = 0,
    Gif = 3,
}

/// 解码配置,布局与 DLL 一致
#[repr(C)]
struct WxamConfig {
    mode: i32,
    reserved: i32,
}

/// `wxam_dec_wxam2pic_5` 函数签名
type WxamDecFunction = unsafe extern "system" fn(
    input_addr: i64,
    input_size: i32,
    output_addr: i64,
    output_size_ptr: *mut i32,
    config_addr: i64,
) -> i64;

struct DllHolder {
    handle: HMODULE,
    function: WxamDecFunction,
}

// 句柄与函数指针在加载后只读,DLL 函数本身不保存调用间状态
unsafe impl Send for DllHolder {}
unsafe impl Sync for DllHolder {}

impl Drop for DllHolder {
    fn drop(&mut self) {
        unsafe {
            let _ = FreeLibrary(self.handle);
        }
    }
}

static DLL_INSTANCE: OnceLock<Result<DllHolder, String>> = OnceLock::new();

/// 调用 `VoipEngine.dll` 的 wxgf 解码器
pub struct WxamDecoder {
    output: WxamOutput,
}

impl Default for WxamDecoder {
    fn default() -> Self {
        Self::new(WxamOutput::Jpeg)
    }
}

impl WxamDecoder {
    /// 最大输出大小 (52MB)
    const MAX_OUTPUT_SIZE: usize = 52 * 1024 * 1024;

    const DLL_NAME: &'static str = "VoipEngine.dll";

    pub fn new(output: WxamOutput) -> Self {
        Self { output }
    }

    fn load_dll() -> Result<&'static DllHolder, TranscodeError> {
        DLL_INSTANCE
            .get_or_init(Self::load_dll_internal)
            .as_ref()
            .map_err(|e| TranscodeError::Decoder(e.clone()))
    }

    fn load_dll_internal() -> Result<DllHolder, String> {
        let dll_path = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::DLL_NAME);

        if !dll_path.exists() {
            return Err(format!("DLL 文件不存在: {}", dll_path.display()));
        }

        let dll_path_wide: Vec<u16> = dll_path
            .to_string_lossy()
            .encode_utf16()
            .chain(std::iter::once(0))
            .collect();

        let handle = unsafe {
            LoadLibraryW(PCWSTR::from_raw(dll_path_wide.as_ptr()))
                .map_err(|e| format!("LoadLibrary 失败: {}", e))?
        };

        let func_name = b"wxam_dec_wxam2pic_5\0";
        let func_ptr = unsafe { GetProcAddress(handle, PCSTR::from_raw(func_name.as_ptr())) };
        let func_ptr = match func_ptr {
            Some(ptr) => ptr,
            None => {
                unsafe {
                    let _ = FreeLibrary(handle);
                }
                return Err("无法找到函数 wxam_dec_wxam2pic_5".to_string());
            }
        };

        let function: WxamDecFunction = unsafe { std::mem::transmute(func_ptr) };

        log::info!("成功加载 {}", Self::DLL_NAME);

        Ok(DllHolder { handle, function })
    }

    /// 解码为 DLL 输出的原始字节
    pub fn decode_bytes(&self, data: &[u8]) -> Result<Vec<u8>, TranscodeError> {
        if data.is_empty() {
            return Err(TranscodeError::TruncatedInput {
                needed: 1,
                actual: 0,
            });
        }
        let input_size = i32::try_from(data.len()).map_err(|_| {
            TranscodeError::MalformedContainer(format!("数据过大: {} 字节", data.len()))
        })?;

        let dll = Self::load_dll()?;

        let config = WxamConfig {
            mode: self.output as i32,
            reserved: 0,
        };

        let mut output_buffer = vec![0u8; Self::MAX_OUTPUT_SIZE];
        let mut output_size = Self::MAX_OUTPUT_SIZE as i32;

        log::debug!(
            "开始解码 wxgf 数据,大小: {} 字节,格式: {:?}",
            data.len(),
            self.output
        );

        let result = unsafe {
            (dll.function)(
                data.as_ptr() as i64,
                input_size,
                output_buffer.as_mut_ptr() as i64,
                &mut output_size as *mut i32,
                &config as *const WxamConfig as i64,
            )
        };

        if result != 0 {
            return Err(TranscodeError::Decoder(format!(
                "DLL 解码失败,错误代码: {}",
                result
            )));
        }

        if output_size <= 0 || output_size as usize > Self::MAX_OUTPUT_SIZE {
            return Err(TranscodeError::Decoder(format!(
                "解码结果大小无效: {}",
                output_size
            )));
        }

        output_buffer.truncate(output_size as usize);

        log::debug!("解码成功,输出大小: {} 字节", output_size);

        Ok(output_buffer)
    }
}

impl ContainerDecoder for WxamDecoder {
    fn name(&self) -> &'static str {
        "voip-engine"
    }

    fn decode_container(&self, data: &[u8]) -> Result<DisplayImage, TranscodeError> {
        let image = DisplayImage::sniffed(self.decode_bytes(data)?);
        if image.format == ImageFormat::Unknown {
            return Err(TranscodeError::Decoder(
                "解码结果不是有效图片".to_string(),
            ));
        }
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_checked_before_loading() {
        let result = WxamDecoder::default().decode_bytes(&[]);
        assert!(matches!(result, Err(TranscodeError::TruncatedInput { .. })));
    }

    #[test]
    fn test_output_mode_values() {
        assert_eq!(WxamOutput::Jpeg as i32, 0);
        assert_eq!(WxamOutput::Gif as i32, 3);
    }
}
