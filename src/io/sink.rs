// 写入目标接口
//
// 职责：描述保存/导出的目标，写入内容需显式提交才生效

use std::io::{self, Write};

/// 一次写操作期间持有的写入器；丢弃而不提交即放弃全部写入
pub trait SinkWriter: Write {
    fn commit(self: Box<Self>) -> io::Result<()>;
}

/// 写入目标（打开时截断）
pub trait ByteSink {
    fn create(&mut self) -> io::Result<Box<dyn SinkWriter + '_>>;
}

/// 内存写入目标
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    data: Vec<u8>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl ByteSink for MemorySink {
    fn create(&mut self) -> io::Result<Box<dyn SinkWriter + '_>> {
        Ok(Box::new(MemoryWriter {
            target: &mut self.data,
            staged: Vec::new(),
        }))
    }
}

struct MemoryWriter<'a> {
    target: &'a mut Vec<u8>,
    staged: Vec<u8>,
}

impl Write for MemoryWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.staged.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SinkWriter for MemoryWriter<'_> {
    fn commit(self: Box<Self>) -> io::Result<()> {
        let MemoryWriter { target, staged } = *self;
        *target = staged;
        Ok(())
    }
}
