// 流式迭代器
//
// 职责：按固定窗口迭代 EditBuffer 的一段逻辑范围，避免一次性读出全部内容

use crate::core::buffer::{EditBuffer, BUFFER_SIZE};
use crate::core::error::BufferResult;

/// EditBuffer 的流式迭代器
///
/// 读取出错时产出该错误后结束。
pub struct ChunkIter<'a> {
    buffer: &'a EditBuffer,
    current_pos: u64,
    end: u64,
    chunk_size: usize,
}

impl<'a> ChunkIter<'a> {
    pub fn new(buffer: &'a EditBuffer, pos: u64, len: u64, chunk_size: usize) -> Self {
        let start = pos.min(buffer.size());
        Self {
            buffer,
            current_pos: start,
            end: start.saturating_add(len).min(buffer.size()),
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn with_default_chunk_size(buffer: &'a EditBuffer, pos: u64, len: u64) -> Self {
        Self::new(buffer, pos, len, BUFFER_SIZE)
    }
}

impl<'a> Iterator for ChunkIter<'a> {
    type Item = BufferResult<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_pos >= self.end {
            return None;
        }

        let len = (self.end - self.current_pos).min(self.chunk_size as u64) as usize;
        match self.buffer.read(self.current_pos, len) {
            Ok(chunk) if !chunk.is_empty() => {
                self.current_pos += chunk.len() as u64;
                Some(Ok(chunk))
            }
            Ok(_) => {
                self.current_pos = self.end;
                None
            }
            Err(err) => {
                self.current_pos = self.end;
                Some(Err(err))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end.saturating_sub(self.current_pos);
        let chunks = remaining.div_ceil(self.chunk_size as u64) as usize;
        (0, Some(chunks))
    }
}
