// 块存储
//
// 职责：维护按逻辑偏移有序的块列表，按需从数据源加载页，
//       把逻辑偏移翻译为“块内字节”或“数据源读取位置”，
//       并在单字节编辑时保持逻辑大小与块偏移一致

use std::io::{self, Read, Seek, SeekFrom};

use tracing::{debug, trace, warn};

use crate::core::buffer::{Chunk, CHUNK_SIZE};
use crate::core::error::{BufferError, BufferResult};
use crate::io::source::{ByteSource, MemorySource, SourceReader};

/// 单字节结构性编辑
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Insert(u8),
    Overwrite(u8),
    Remove,
}

impl Mutation {
    /// 对逻辑大小的影响
    pub fn size_delta(&self) -> i64 {
        match self {
            Mutation::Insert(_) => 1,
            Mutation::Overwrite(_) => 0,
            Mutation::Remove => -1,
        }
    }
}

/// 块存储：独占所有块以及数据源句柄
#[derive(Debug)]
pub struct ChunkStore {
    source: Box<dyn ByteSource>,
    chunks: Vec<Chunk>,
    size: u64,
    next_chunk_id: u64,
}

// ========== 构造方法 ==========

impl ChunkStore {
    /// 创建空存储（零长度内存数据源）
    pub fn new() -> Self {
        Self {
            source: Box::new(MemorySource::empty()),
            chunks: Vec::new(),
            size: 0,
            next_chunk_id: 0,
        }
    }

    /// 挂接新的数据源，清空全部块
    ///
    /// 数据源无法读取时退回空缓冲区，同时返回错误供调用方提示。
    pub fn attach(&mut self, source: Box<dyn ByteSource>) -> BufferResult<()> {
        self.chunks.clear();

        let status = source.open().map(drop).and_then(|()| source.len());
        match status {
            Ok(len) => {
                debug!(len, path = ?source.path(), "数据源已挂接");
                self.source = source;
                self.size = len;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, path = ?source.path(), "数据源不可用，退回空缓冲区");
                self.source = Box::new(MemorySource::empty());
                self.size = 0;
                Err(BufferError::SourceUnavailable(err))
            }
        }
    }
}

// ========== 基本查询 ==========

impl ChunkStore {
    /// 逻辑大小（字节）
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn source(&self) -> &dyn ByteSource {
        self.source.as_ref()
    }
}

// ========== 块定位和加载 ==========

impl ChunkStore {
    /// 查找包含逻辑偏移的块，不存在则从数据源加载对应页
    pub fn locate_or_load(&mut self, pos: u64) -> BufferResult<usize> {
        let idx = self.chunks.partition_point(|c| c.logical_end() <= pos);
        if self.chunks.get(idx).is_some_and(|c| c.contains(pos)) {
            return Ok(idx);
        }

        let idx = self.load_chunk(idx, pos)?;
        if self.chunks[idx].contains(pos) {
            Ok(idx)
        } else {
            // 数据源比记录的短（外部被截断）
            let chunk = self.chunks.remove(idx);
            warn!(pos, page_len = chunk.page_len(), "数据源页不包含请求位置");
            Err(BufferError::SourceUnavailable(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("数据源在偏移 {} 处提前结束", pos),
            )))
        }
    }

    /// 插入位置对应的块
    ///
    /// 末尾插入使用包含最后一个字节的块；缓冲区为空时复用已有的空块，
    /// 没有块时才在偏移 0 处创建一个。
    fn chunk_for_insert(&mut self, pos: u64) -> BufferResult<usize> {
        if self.size == 0 {
            if self.chunks.is_empty() {
                return self.load_chunk(0, 0);
            }
            return Ok(0);
        }

        if pos == self.size {
            self.locate_or_load(pos - 1)
        } else {
            self.locate_or_load(pos)
        }
    }

    /// 从数据源读入一页，作为新块插入到 `idx`
    fn load_chunk(&mut self, idx: usize, pos: u64) -> BufferResult<usize> {
        let source_pos = Self::to_source_pos(pos, self.drift_before(idx));
        let page_start = source_pos - source_pos % CHUNK_SIZE as u64;

        let mut page = Vec::with_capacity(CHUNK_SIZE);
        {
            let mut reader = self.source.open().map_err(BufferError::SourceUnavailable)?;
            read_at(&mut *reader, page_start, CHUNK_SIZE as u64, &mut page)
                .map_err(BufferError::SourceUnavailable)?;
        }

        let logical_start = pos - (source_pos - page_start);
        let chunk = Chunk::new(self.next_chunk_id, page, logical_start);
        self.next_chunk_id += 1;

        debug!(
            id = chunk.id(),
            page_start,
            logical_start,
            len = chunk.len(),
            "加载数据块"
        );

        self.chunks.insert(idx, chunk);
        Ok(idx)
    }

    /// `idx` 之前所有块的漂移之和（原始页长 - 当前长度）
    fn drift_before(&self, idx: usize) -> i64 {
        self.chunks[..idx].iter().map(Chunk::drift).sum()
    }

    fn to_source_pos(pos: u64, drift: i64) -> u64 {
        (pos as i64 + drift) as u64
    }
}

// ========== 读取 ==========

impl ChunkStore {
    /// 从逻辑偏移读取至多 `max_len` 字节
    pub fn read_range(&self, pos: u64, max_len: usize) -> BufferResult<Vec<u8>> {
        self.read_into(pos, max_len, None)
    }

    /// 读取字节及对应的修改标记
    pub fn read_range_with_changes(
        &self,
        pos: u64,
        max_len: usize,
    ) -> BufferResult<(Vec<u8>, Vec<bool>)> {
        let mut changed = Vec::new();
        let data = self.read_into(pos, max_len, Some(&mut changed))?;
        Ok((data, changed))
    }

    fn read_into(
        &self,
        mut pos: u64,
        max_len: usize,
        mut changed: Option<&mut Vec<bool>>,
    ) -> BufferResult<Vec<u8>> {
        if pos >= self.size {
            return Ok(Vec::new());
        }

        let mut remaining = (max_len as u64).min(self.size - pos) as usize;
        let mut out = Vec::with_capacity(remaining);

        let mut idx = self.chunks.partition_point(|c| c.logical_end() <= pos);
        let mut drift = self.drift_before(idx);
        let mut reader: Option<Box<dyn SourceReader + '_>> = None;

        while remaining > 0 {
            // 跳过已经读完的块，累计漂移
            while let Some(chunk) = self.chunks.get(idx) {
                if chunk.logical_end() > pos {
                    break;
                }
                drift += chunk.drift();
                idx += 1;
            }

            match self.chunks.get(idx) {
                Some(chunk) if chunk.logical_start() <= pos => {
                    let offset = (pos - chunk.logical_start()) as usize;
                    let count = remaining.min(chunk.len() - offset);

                    out.extend_from_slice(&chunk.data()[offset..offset + count]);
                    if let Some(flags) = changed.as_deref_mut() {
                        flags.extend_from_slice(&chunk.changed()[offset..offset + count]);
                    }

                    pos += count as u64;
                    remaining -= count;
                }
                next => {
                    // 未加载区域：按漂移修正后直接读数据源
                    let gap = match next {
                        Some(chunk) => (chunk.logical_start() - pos).min(remaining as u64) as usize,
                        None => remaining,
                    };

                    if reader.is_none() {
                        reader = Some(self.source.open().map_err(BufferError::SourceUnavailable)?);
                    }
                    let Some(source) = reader.as_mut() else {
                        break;
                    };

                    let source_pos = Self::to_source_pos(pos, drift);
                    let count = read_at(&mut **source, source_pos, gap as u64, &mut out)
                        .map_err(BufferError::SourceUnavailable)?;
                    if let Some(flags) = changed.as_deref_mut() {
                        flags.resize(flags.len() + count, false);
                    }

                    pos += count as u64;
                    remaining -= count;

                    if count < gap {
                        // 数据源比记录的短（外部被截断），不返回残缺内容
                        warn!(pos, expected = gap, got = count, "数据源读取不足");
                        return Err(BufferError::SourceUnavailable(io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            format!("数据源在偏移 {} 处提前结束", source_pos + count as u64),
                        )));
                    }
                }
            }
        }

        Ok(out)
    }
}

// ========== 编辑 ==========

impl ChunkStore {
    /// 在逻辑偏移处执行单字节编辑
    pub fn mutate(&mut self, pos: u64, op: Mutation) -> BufferResult<()> {
        let valid = match op {
            Mutation::Insert(_) => pos <= self.size,
            Mutation::Overwrite(_) | Mutation::Remove => pos < self.size,
        };
        if !valid {
            return Err(BufferError::out_of_range(pos, self.size));
        }

        let idx = match op {
            Mutation::Insert(_) => self.chunk_for_insert(pos)?,
            _ => self.locate_or_load(pos)?,
        };

        let chunk = &mut self.chunks[idx];
        let offset = (pos - chunk.logical_start()) as usize;
        match op {
            Mutation::Insert(byte) => chunk.insert(offset, byte),
            Mutation::Overwrite(byte) => chunk.overwrite(offset, byte),
            Mutation::Remove => chunk.remove(offset),
        }

        let delta = op.size_delta();
        if delta != 0 {
            for chunk in &mut self.chunks[idx + 1..] {
                chunk.shift(delta);
            }
            self.size = (self.size as i64 + delta) as u64;
        }

        trace!(pos, ?op, size = self.size, "单字节编辑");
        Ok(())
    }

    /// 设置单个字节的修改标记
    pub fn set_changed(&mut self, pos: u64, changed: bool) -> BufferResult<()> {
        if pos >= self.size {
            return Err(BufferError::out_of_range(pos, self.size));
        }

        let idx = self.locate_or_load(pos)?;
        let chunk = &mut self.chunks[idx];
        let offset = (pos - chunk.logical_start()) as usize;
        chunk.set_changed(offset, changed);
        Ok(())
    }
}

/// 定位到 `offset` 并追加读取至多 `len` 字节，返回实际读到的字节数
fn read_at<R: Read + Seek + ?Sized>(
    reader: &mut R,
    offset: u64,
    len: u64,
    out: &mut Vec<u8>,
) -> io::Result<usize> {
    reader.seek(SeekFrom::Start(offset))?;
    Read::take(reader, len).read_to_end(out)
}

impl Default for ChunkStore {
    fn default() -> Self {
        Self::new()
    }
}

// ========== 测试 ==========
