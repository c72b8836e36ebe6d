// IO System - IO系统
//
// 职责：提供统一的数据源/写入目标接口，
//       支持内存、按次打开的文件、内存映射，以及可读文本导出

pub mod source;
pub mod file;
pub mod mmap;
pub mod sink;
pub mod readable;

pub use source::{ByteSource, MemorySource, SourceReader};
pub use file::{FileSink, FileSource};
pub use mmap::MmapSource;
pub use sink::{ByteSink, MemorySink, SinkWriter};
pub use readable::{to_readable, AddressBase};
