// 编辑缓冲区
//
// 职责：在 ChunkStore 之上提供按逻辑字节寻址的公开接口，
//       只包含单字节的结构性编辑，多字节操作由撤销栈拆分

use std::io::Write;

use tracing::debug;

use crate::core::buffer::{ChunkIter, ChunkStore, Mutation};
use crate::core::error::{BufferError, BufferResult};
use crate::io::{ByteSink, ByteSource, MemorySource};
use crate::search::SearchEngine;

/// 逻辑字节缓冲区
#[derive(Debug, Default)]
pub struct EditBuffer {
    store: ChunkStore,
    position: u64, // 最近一次编辑的位置，供状态显示
}

// ========== 构造方法 ==========

impl EditBuffer {
    /// 创建空缓冲区
    pub fn new() -> Self {
        Self::default()
    }

    /// 从内存字节创建
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        let mut buffer = Self::new();
        // 内存数据源总是可读
        let _ = buffer.attach(Box::new(MemorySource::new(bytes)));
        buffer
    }

    /// 挂接数据源（失败时退回空缓冲区并返回错误）
    pub fn attach(&mut self, source: Box<dyn ByteSource>) -> BufferResult<()> {
        self.position = 0;
        self.store.attach(source)
    }
}

// ========== 基本查询 ==========

impl EditBuffer {
    pub fn size(&self) -> u64 {
        self.store.size()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// 最近一次编辑的位置
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn chunk_store(&self) -> &ChunkStore {
        &self.store
    }
}

// ========== 读取 ==========

impl EditBuffer {
    /// 读取 `[pos, pos + len)`，超出末尾的部分截断，`pos >= size` 时为空
    pub fn read(&self, pos: u64, len: usize) -> BufferResult<Vec<u8>> {
        self.store.read_range(pos, len)
    }

    /// 读取字节及逐字节修改标记
    pub fn read_with_changes(&self, pos: u64, len: usize) -> BufferResult<(Vec<u8>, Vec<bool>)> {
        self.store.read_range_with_changes(pos, len)
    }

    /// 读取单个字节
    pub fn byte_at(&self, pos: u64) -> BufferResult<u8> {
        self.byte_with_flag(pos).map(|(byte, _)| byte)
    }

    /// 单个字节是否被修改过
    pub fn byte_changed(&self, pos: u64) -> BufferResult<bool> {
        self.byte_with_flag(pos).map(|(_, changed)| changed)
    }

    /// 读取单个字节及其修改标记
    pub fn byte_with_flag(&self, pos: u64) -> BufferResult<(u8, bool)> {
        let (bytes, changed) = self.read_with_changes(pos, 1)?;
        match (bytes.first(), changed.first()) {
            (Some(&byte), Some(&flag)) => Ok((byte, flag)),
            _ => Err(BufferError::out_of_range(pos, self.size())),
        }
    }

    /// 按窗口迭代一段范围
    pub fn iter_range(&self, pos: u64, len: u64, window: usize) -> ChunkIter<'_> {
        ChunkIter::new(self, pos, len, window)
    }

    /// 把 `[pos, pos + len)` 流式写入目标，全部成功后提交
    pub fn write_range(&self, sink: &mut dyn ByteSink, pos: u64, len: u64) -> BufferResult<()> {
        let mut writer = sink.create().map_err(BufferError::SinkUnavailable)?;

        let mut written = 0u64;
        for window in ChunkIter::with_default_chunk_size(self, pos, len) {
            let window = window?;
            writer.write_all(&window).map_err(BufferError::SinkUnavailable)?;
            written += window.len() as u64;
        }

        writer.commit().map_err(BufferError::SinkUnavailable)?;
        debug!(pos, written, "范围已写出");
        Ok(())
    }
}

// ========== 单字节编辑 ==========

impl EditBuffer {
    /// 插入一个字节（`0 <= pos <= size`），修改标记置位
    pub fn insert_byte(&mut self, pos: u64, byte: u8) -> BufferResult<()> {
        self.store.mutate(pos, Mutation::Insert(byte))?;
        self.position = pos;
        Ok(())
    }

    /// 覆盖一个字节（`0 <= pos < size`），修改标记置位
    pub fn overwrite_byte(&mut self, pos: u64, byte: u8) -> BufferResult<()> {
        self.store.mutate(pos, Mutation::Overwrite(byte))?;
        self.position = pos;
        Ok(())
    }

    /// 删除一个字节（`0 <= pos < size`）
    pub fn remove_byte(&mut self, pos: u64) -> BufferResult<()> {
        self.store.mutate(pos, Mutation::Remove)?;
        self.position = pos;
        Ok(())
    }

    /// 直接设置修改标记（撤销时恢复原标记）
    pub fn set_byte_changed(&mut self, pos: u64, changed: bool) -> BufferResult<()> {
        self.store.set_changed(pos, changed)
    }
}

// ========== 搜索 ==========

impl EditBuffer {
    /// 从 `from` 向后查找第一个匹配
    pub fn index_of(&self, needle: &[u8], from: u64) -> BufferResult<Option<u64>> {
        SearchEngine::default().index_of(self, needle, from)
    }

    /// 查找起点不超过 `from` 的最后一个匹配
    pub fn last_index_of(&self, needle: &[u8], from: u64) -> BufferResult<Option<u64>> {
        SearchEngine::default().last_index_of(self, needle, from)
    }
}

// ========== 测试 ==========
