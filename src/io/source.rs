// 数据源接口
//
// 职责：描述只读、可定位的后备字节流，
//       每次读操作独立打开，操作结束即关闭

use std::fmt;
use std::io::{self, Cursor, Read, Seek};
use std::path::Path;
use std::sync::Arc;

/// 一次读操作期间持有的读取器
pub trait SourceReader: Read + Seek {}

impl<T: Read + Seek + ?Sized> SourceReader for T {}

/// 后备数据源
///
/// 引擎从不修改数据源；所有编辑保存在块中，直到显式保存。
pub trait ByteSource: fmt::Debug {
    /// 数据源总长度（字节）
    fn len(&self) -> io::Result<u64>;

    /// 打开一个读取器，仅在单次操作内使用
    fn open(&self) -> io::Result<Box<dyn SourceReader + '_>>;

    /// 对应的文件路径（如果有）
    fn path(&self) -> Option<&Path> {
        None
    }
}

/// 内存数据源（Arc共享）
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Arc<[u8]>,
}

impl MemorySource {
    pub fn new(data: impl Into<Arc<[u8]>>) -> Self {
        Self { data: data.into() }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::empty()
    }
}

impl ByteSource for MemorySource {
    fn len(&self) -> io::Result<u64> {
        Ok(self.data.len() as u64)
    }

    fn open(&self) -> io::Result<Box<dyn SourceReader + '_>> {
        Ok(Box::new(Cursor::new(&self.data[..])))
    }
}
