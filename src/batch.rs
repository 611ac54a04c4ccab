//! 批量解密
//!
//! 每个文件在阻塞线程池中独立处理,单个文件失败只记录在该文件的结果中,
//! 不会中断其余文件。

use crate::decrypt::KeyMaterial;
use crate::error::{AppError, ErrorResponse};
use crate::format::DisplayImage;
use crate::pipeline::Pipeline;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// 单个文件的处理结果
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: Result<DisplayImage, AppError>,
}

/// 失败文件的摘要
#[derive(Debug, Clone, Serialize)]
pub struct FailedFile {
    pub path: String,
    #[serde(flatten)]
    pub error: ErrorResponse,
}

/// 批量处理统计
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<FailedFile>,
}

/// 批量处理结果,顺序与输入一致
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = (&PathBuf, &DisplayImage)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|image| (&o.path, image)))
    }

    pub fn failed(&self) -> impl Iterator<Item = (&PathBuf, &AppError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|err| (&o.path, err)))
    }

    pub fn success_count(&self) -> usize {
        self.succeeded().count()
    }

    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }

    pub fn summary(&self) -> BatchSummary {
        let errors: Vec<FailedFile> = self
            .failed()
            .map(|(path, err)| FailedFile {
                path: path.to_string_lossy().to_string(),
                error: ErrorResponse::from(err),
            })
            .collect();

        BatchSummary {
            total: self.outcomes.len(),
            succeeded: self.outcomes.len() - errors.len(),
            failed: errors.len(),
            errors,
        }
    }
}

/// 并发解密一组文件
///
/// 所有文件共用 `pipeline` 的编码集合。`max_workers` 为同时处理的文件数上限,
/// 小于 1 时按 1 处理。
pub async fn convert_batch(
    pipeline: Arc<Pipeline>,
    paths: Vec<PathBuf>,
    keys: KeyMaterial,
    max_workers: usize,
) -> BatchReport {
    let semaphore = Arc::new(Semaphore::new(max_workers.max(1)));
    let mut tasks = Vec::with_capacity(paths.len());

    for path in paths {
        let semaphore = semaphore.clone();
        let pipeline = pipeline.clone();
        let task_path = path.clone();

        let task = tokio::spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| AppError::Internal(format!("获取并发许可失败: {}", e)))?;

            tokio::task::spawn_blocking(move || {
                pipeline.decrypt_and_convert(&task_path, &keys)
            })
            .await
            .map_err(|e| AppError::Internal(format!("解密任务异常: {}", e)))?
        });

        tasks.push((path, task));
    }

    let mut outcomes = Vec::with_capacity(tasks.len());
    for (path, task) in tasks {
        let result = match task.await {
            Ok(result) => result,
            Err(e) => Err(AppError::Internal(format!("解密任务异常: {}", e))),
        };

        if let Err(err) = &result {
            log::warn!("解密失败 {}: {}", path.display(), err);
        }

        outcomes.push(FileOutcome { path, result });
    }

    let report = BatchReport { outcomes };
    log::debug!(
        "批量解密完成: 成功 {} 个,失败 {} 个",
        report.success_count(),
        report.failure_count()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let report = BatchReport {
            outcomes: vec![
                FileOutcome {
                    path: PathBuf::from("a.dat"),
                    result: Ok(DisplayImage::sniffed(vec![0xFF, 0xD8, 0xFF])),
                },
                FileOutcome {
                    path: PathBuf::from("b.dat"),
                    result: Err(AppError::UnsupportedFormat),
                },
            ],
        };

        let summary = report.summary();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.errors[0].path, "b.dat");
        assert_eq!(summary.errors[0].error.code, "UNSUPPORTED_FORMAT");

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["errors"][0]["code"], "UNSUPPORTED_FORMAT");
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let keys = KeyMaterial::with_fallback_key(0x00);
        let pipeline = Arc::new(Pipeline::default());
        let report = convert_batch(pipeline, Vec::new(), keys, 4).await;
        assert_eq!(report.success_count(), 0);
        assert_eq!(report.failure_count(), 0);
    }
}
