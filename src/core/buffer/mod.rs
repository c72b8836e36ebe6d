// 分块缓冲区 - 二进制编辑缓冲区核心实现
//
// 职责：以固定页为单位按需加载数据源，写时复制，
//       支持超过内存大小的文件、单字节插入/覆盖/删除、修改标记

mod chunk;
mod chunk_store;
mod edit_buffer;
mod mode;
mod chunk_iter;

// 重新导出
pub use self::chunk::Chunk;
pub use self::chunk_store::{ChunkStore, Mutation};
pub use self::edit_buffer::EditBuffer;
pub use self::mode::SourceMode;
pub use self::chunk_iter::ChunkIter;

/// 页大小：块按数据源原始地址以此对齐加载
pub const CHUNK_SIZE: usize = 0x1000; // 4KB

/// 流式读写、搜索窗口大小
pub const BUFFER_SIZE: usize = 0x10000; // 64KB

/// 文件大小阈值（选择数据源模式）
pub const SMALL_FILE_THRESHOLD: u64 = 10 * 1024 * 1024; // 10MB
pub const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024; // 100MB
