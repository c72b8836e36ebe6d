// Editor Core - 编辑器核心
//
// 职责：管理分块缓冲区与撤销历史，
//       向嵌入方提供插入/删除/替换/搜索/撤销重做等操作

pub mod buffer;
pub mod undo;
pub mod document;
pub mod error;

pub use buffer::{Chunk, ChunkStore, EditBuffer, Mutation, SourceMode};
pub use undo::{Command, Transaction, UndoStack};
pub use document::{EditMode, HexDocument, Nibble};
pub use error::{BufferError, BufferResult};
