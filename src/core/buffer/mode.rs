// 数据源模式配置
//
// 职责：根据文件大小自适应选择后备数据源

use std::fs;
use std::io;
use std::path::Path;

use crate::core::buffer::{LARGE_FILE_THRESHOLD, SMALL_FILE_THRESHOLD};
use crate::io::{ByteSource, FileSource, MemorySource, MmapSource};

/// 数据源工作模式（根据文件大小自适应）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceMode {
    /// 小文件模式（<10MB）：整体读入内存
    #[default]
    InMemory,

    /// 大文件模式（10-100MB）：内存映射
    MemoryMapped,

    /// 超大文件模式（>=100MB）：每次读取时打开文件
    Streamed,
}

impl SourceMode {
    /// 根据文件大小选择模式
    pub fn for_file_size(file_size: u64) -> Self {
        if file_size < SMALL_FILE_THRESHOLD {
            SourceMode::InMemory
        } else if file_size < LARGE_FILE_THRESHOLD {
            SourceMode::MemoryMapped
        } else {
            SourceMode::Streamed
        }
    }

    /// 根据文件当前大小选择模式
    pub fn for_path(path: &Path) -> io::Result<Self> {
        Ok(Self::for_file_size(fs::metadata(path)?.len()))
    }

    /// 按模式打开数据源
    pub fn open(self, path: &Path) -> io::Result<Box<dyn ByteSource>> {
        let source: Box<dyn ByteSource> = match self {
            SourceMode::InMemory => Box::new(MemorySource::new(fs::read(path)?)),
            SourceMode::MemoryMapped => Box::new(MmapSource::from_file(path)?),
            SourceMode::Streamed => Box::new(FileSource::new(path)),
        };
        Ok(source)
    }

    /// 是否是大文件模式
    pub fn is_large_file(&self) -> bool {
        matches!(self, SourceMode::MemoryMapped | SourceMode::Streamed)
    }
}
