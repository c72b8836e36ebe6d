// 十六进制文档
//
// 职责：组合 EditBuffer、UndoStack 与 Config，
//       提供界面层调用的编辑、搜索、保存、导出操作

use std::path::Path;

use tracing::{debug, info};

use crate::config::Config;
use crate::core::buffer::{EditBuffer, SourceMode};
use crate::core::error::{BufferError, BufferResult};
use crate::core::undo::UndoStack;
use crate::io::{to_readable, ByteSink, ByteSource, FileSink, MemorySource};
use crate::search::SearchEngine;

/// 输入模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    Insert,
    #[default]
    Overwrite,
}

/// 十六进制列中正在输入的半字节
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nibble {
    High,
    Low,
}

/// 可编辑的二进制文档
#[derive(Debug)]
pub struct HexDocument {
    buffer: EditBuffer,
    history: UndoStack,
    config: Config,
    mode: SourceMode, // 按路径打开时选定的数据源模式
}

// ========== 构造方法 ==========

impl HexDocument {
    /// 创建空文档
    pub fn new(config: Config) -> Self {
        Self {
            buffer: EditBuffer::new(),
            history: UndoStack::with_limit(config.undo_limit),
            config,
            mode: SourceMode::default(),
        }
    }

    /// 从内存字节创建
    pub fn from_bytes(bytes: impl Into<Vec<u8>>, config: Config) -> Self {
        let mut document = Self::new(config);
        document.buffer = EditBuffer::from_bytes(bytes);
        document
    }

    /// 打开文件（按大小选择数据源模式）
    pub fn open(path: &Path, config: Config) -> BufferResult<Self> {
        let mut document = Self::new(config);
        document.attach_path(path)?;
        info!(
            path = %path.display(),
            size = document.size(),
            mode = ?document.mode,
            "文件已打开"
        );
        Ok(document)
    }

    /// 挂接新数据源并清空历史；失败时文档退回为空
    pub fn attach(&mut self, source: Box<dyn ByteSource>) -> BufferResult<()> {
        self.mode = SourceMode::default();
        self.history.clear();
        self.buffer.attach(source)
    }

    /// 按文件大小选择模式后挂接文件
    fn attach_path(&mut self, path: &Path) -> BufferResult<()> {
        let mode = SourceMode::for_path(path).map_err(BufferError::SourceUnavailable)?;
        let source = mode.open(path).map_err(BufferError::SourceUnavailable)?;
        if mode.is_large_file() {
            debug!(path = %path.display(), ?mode, "大文件，按需读取");
        }
        self.attach(source)?;
        self.mode = mode;
        Ok(())
    }
}

// ========== 基本查询 ==========

impl HexDocument {
    pub fn buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 当前数据源模式
    pub fn source_mode(&self) -> SourceMode {
        self.mode
    }

    /// 数据源是否按大文件方式访问（内存映射或流式）
    pub fn is_large_file(&self) -> bool {
        self.mode.is_large_file()
    }

    pub fn size(&self) -> u64 {
        self.buffer.size()
    }

    /// 最近一次编辑的位置
    pub fn cursor(&self) -> u64 {
        self.buffer.position()
    }

    pub fn data_at(&self, pos: u64, len: usize) -> BufferResult<Vec<u8>> {
        self.buffer.read(pos, len)
    }

    pub fn byte_changed(&self, pos: u64) -> BufferResult<bool> {
        self.buffer.byte_changed(pos)
    }

    /// 自加载以来是否有未撤销的编辑
    pub fn is_modified(&self) -> bool {
        self.history.is_modified()
    }
}

// ========== 编辑 ==========

impl HexDocument {
    pub fn insert(&mut self, pos: u64, bytes: &[u8]) -> BufferResult<()> {
        self.history.insert(&mut self.buffer, pos, bytes)
    }

    pub fn remove(&mut self, pos: u64, len: u64) -> BufferResult<()> {
        self.history.remove(&mut self.buffer, pos, len)
    }

    /// 从 `pos` 起用 `bytes` 覆盖
    pub fn replace(&mut self, pos: u64, bytes: &[u8]) -> BufferResult<()> {
        self.history.overwrite(&mut self.buffer, pos, bytes)
    }

    /// 把 `[pos, pos + len)` 替换为 `bytes`
    pub fn replace_range(&mut self, pos: u64, len: u64, bytes: &[u8]) -> BufferResult<()> {
        self.history.replace(&mut self.buffer, pos, len, bytes)
    }

    /// 在十六进制列输入一个半字节
    ///
    /// 插入模式下输入高半字节前先插入一个 0 字节；之后的覆盖与之合并，
    /// 同一字节上的连续按键只占一条历史。
    pub fn type_nibble(
        &mut self,
        pos: u64,
        nibble: Nibble,
        value: u8,
        mode: EditMode,
    ) -> BufferResult<()> {
        let value = value & 0x0f;
        if mode == EditMode::Insert && nibble == Nibble::High {
            self.history.insert_byte(&mut self.buffer, pos, 0)?;
        }

        let current = self.buffer.byte_at(pos)?;
        let byte = match nibble {
            Nibble::High => (value << 4) | (current & 0x0f),
            Nibble::Low => (current & 0xf0) | value,
        };
        self.history.overwrite_byte(&mut self.buffer, pos, byte)
    }

    /// 在 ASCII 列输入一个字节
    pub fn type_byte(&mut self, pos: u64, byte: u8, mode: EditMode) -> BufferResult<()> {
        match mode {
            EditMode::Insert => self.history.insert_byte(&mut self.buffer, pos, byte),
            EditMode::Overwrite => self.history.overwrite_byte(&mut self.buffer, pos, byte),
        }
    }

    pub fn undo(&mut self) -> BufferResult<bool> {
        self.history.undo(&mut self.buffer)
    }

    pub fn redo(&mut self) -> BufferResult<bool> {
        self.history.redo(&mut self.buffer)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// 调整撤销历史容量（0 表示不限制），立即淘汰超出部分
    pub fn set_undo_limit(&mut self, limit: usize) {
        self.config.undo_limit = limit;
        self.history.set_limit(limit);
    }
}

// ========== 搜索 ==========

impl HexDocument {
    fn search_engine(&self) -> SearchEngine {
        SearchEngine::new(self.config.search_window)
    }

    pub fn index_of(&self, needle: &[u8], from: u64) -> BufferResult<Option<u64>> {
        self.search_engine().index_of(&self.buffer, needle, from)
    }

    pub fn last_index_of(&self, needle: &[u8], from: u64) -> BufferResult<Option<u64>> {
        self.search_engine().last_index_of(&self.buffer, needle, from)
    }
}

// ========== 保存与导出 ==========

impl HexDocument {
    /// 把全部内容写入目标
    pub fn save_to(&self, sink: &mut dyn ByteSink) -> BufferResult<()> {
        self.buffer.write_range(sink, 0, self.buffer.size())
    }

    /// 导出部分范围
    pub fn export_range(&self, sink: &mut dyn ByteSink, pos: u64, len: u64) -> BufferResult<()> {
        self.buffer.write_range(sink, pos, len)
    }

    /// 原子保存到文件，然后重新挂接该文件
    ///
    /// 保存后块与数据源的偏移对应关系失效，因此块与历史都会被清空。
    pub fn save_as(&mut self, path: &Path) -> BufferResult<()> {
        let mut sink = FileSink::new(path);
        self.save_to(&mut sink)?;
        debug!(path = %path.display(), size = self.size(), "文件已保存");

        self.attach_path(path)
    }

    /// 丢弃全部内容，回到空文档
    pub fn close(&mut self) {
        // 空内存数据源总是可读
        let _ = self.attach(Box::new(MemorySource::empty()));
    }

    /// 渲染一段范围的可读文本
    pub fn to_readable(&self, pos: u64, len: usize) -> BufferResult<String> {
        let bytes = self.buffer.read(pos, len)?;
        Ok(to_readable(
            &bytes,
            self.config.address_offset + pos,
            self.config.address_base,
        ))
    }

    /// 渲染全部内容的可读文本
    pub fn to_readable_string(&self) -> BufferResult<String> {
        let len = usize::try_from(self.size()).unwrap_or(usize::MAX);
        self.to_readable(0, len)
    }
}

impl Default for HexDocument {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
