// 窗口化字节搜索
//
// 职责：以固定步长读取窗口（相邻窗口重叠 needle 长度 - 1 字节），
//       保证跨窗口边界的匹配不会遗漏

use memchr::memmem;

use crate::core::buffer::{EditBuffer, BUFFER_SIZE};
use crate::core::error::BufferResult;

/// 搜索引擎
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchEngine {
    window: usize, // 窗口步长
}

impl SearchEngine {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// 返回 `>= from` 的第一个匹配位置
    ///
    /// 空 needle 不匹配任何位置。
    pub fn index_of(&self, buffer: &EditBuffer, needle: &[u8], from: u64) -> BufferResult<Option<u64>> {
        if needle.is_empty() {
            return Ok(None);
        }

        let finder = memmem::Finder::new(needle);
        let span = self.window + needle.len() - 1;
        let mut pos = from;

        while pos < buffer.size() {
            let window = buffer.read(pos, span)?;
            if window.len() < needle.len() {
                break;
            }
            if let Some(found) = finder.find(&window) {
                return Ok(Some(pos + found as u64));
            }
            pos += self.window as u64;
        }

        Ok(None)
    }

    /// 返回起点 `<= from` 的最后一个匹配位置
    pub fn last_index_of(
        &self,
        buffer: &EditBuffer,
        needle: &[u8],
        from: u64,
    ) -> BufferResult<Option<u64>> {
        let needle_len = needle.len() as u64;
        if needle.is_empty() || buffer.size() < needle_len {
            return Ok(None);
        }

        let finder = memmem::FinderRev::new(needle);
        let span = (self.window + needle.len() - 1) as u64;
        let mut end = from.saturating_add(needle_len).min(buffer.size());

        while end >= needle_len {
            let start = end.saturating_sub(span);
            let window = buffer.read(start, (end - start) as usize)?;
            if let Some(found) = finder.rfind(&window) {
                return Ok(Some(start + found as u64));
            }
            if start == 0 {
                break;
            }
            // 下一个窗口的尾部与本窗口头部重叠
            end = start + needle_len - 1;
        }

        Ok(None)
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(BUFFER_SIZE)
    }
}
