// 引擎配置

use crate::core::buffer::BUFFER_SIZE;
use crate::core::undo::DEFAULT_UNDO_LIMIT;
use crate::io::AddressBase;

/// 引擎配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// 撤销历史容量（事务数，0 表示不限制）
    pub undo_limit: usize,
    /// 可读导出的地址进制
    pub address_base: AddressBase,
    /// 可读导出的地址偏移
    pub address_offset: u64,
    /// 搜索窗口步长
    pub search_window: usize,
}

impl Config {
    pub fn with_undo_limit(mut self, limit: usize) -> Self {
        self.undo_limit = limit;
        self
    }

    pub fn with_address_base(mut self, base: AddressBase) -> Self {
        self.address_base = base;
        self
    }

    pub fn with_address_offset(mut self, offset: u64) -> Self {
        self.address_offset = offset;
        self
    }

    pub fn with_search_window(mut self, window: usize) -> Self {
        self.search_window = window;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            undo_limit: DEFAULT_UNDO_LIMIT,
            address_base: AddressBase::Decimal,
            address_offset: 0,
            search_window: BUFFER_SIZE,
        }
    }
}
