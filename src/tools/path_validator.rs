use crate::error::{PipelineError, PipelineResult};
use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

pub fn validate_directory_exists(path: &Path) -> PipelineResult<()> {
    if !path.is_dir() {
        return Err(PipelineError::DirectoryNotFound(path.to_path_buf()));
    }
    Ok(())
}

pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("無法建立資料夾: {}", path.display()))?;
    }
    Ok(())
}

/// 清空並重新建立資料夾，確保每次執行都從乾淨狀態開始
pub fn reset_directory(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("無法清除資料夾: {}", path.display()))?;
    }
    fs::create_dir_all(path).with_context(|| format!("無法建立資料夾: {}", path.display()))
}

/// 刪除檔案，檔案不存在時視為成功
pub fn remove_file_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("無法刪除檔案: {}", path.display())),
    }
}

/// 暫存資料夾：建立時清空，離開作用域時整個刪除（成功或失敗都一樣）
#[derive(Debug)]
pub struct ScopedDirectory {
    path: PathBuf,
}

impl ScopedDirectory {
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        reset_directory(&path)?;
        Ok(Self { path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScopedDirectory {
    fn drop(&mut self) {
        match fs::remove_dir_all(&self.path) {
            Ok(()) => debug!("已移除暫存資料夾: {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("無法移除暫存資料夾 {}: {e}", self.path.display()),
        }
    }
}
