// 错误类型
//
// 职责：定义缓冲区引擎对外报告的失败种类，
//       所有公开操作通过返回值报告，不向外抛出 panic

use std::io;

use thiserror::Error;

/// 缓冲区引擎错误
#[derive(Debug, Error)]
pub enum BufferError {
    /// 位置超出有效范围，结构性操作不做任何修改
    #[error("位置超出范围: {pos} (大小 {size})")]
    OutOfRange { pos: u64, size: u64 },

    /// 数据源无法打开或读取
    #[error("无法读取数据源: {0}")]
    SourceUnavailable(#[source] io::Error),

    /// 写入目标无法打开或提交
    #[error("无法写入目标: {0}")]
    SinkUnavailable(#[source] io::Error),
}

impl BufferError {
    pub fn out_of_range(pos: u64, size: u64) -> Self {
        BufferError::OutOfRange { pos, size }
    }

    /// 是否为越界错误
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, BufferError::OutOfRange { .. })
    }
}

pub type BufferResult<T> = Result<T, BufferError>;
