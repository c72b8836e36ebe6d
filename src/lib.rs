// hexbuf - 分块写时复制的二进制编辑缓冲区
//
// Copyright (c) 2025 zedit team
//
// Licensed under MIT License

pub mod config;
pub mod core;
pub mod io;
pub mod search;

pub use crate::config::Config;
pub use crate::core::{BufferError, BufferResult, EditBuffer, HexDocument, UndoStack};
