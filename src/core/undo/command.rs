// 单字节命令
//
// 职责：记录一次单字节结构性编辑及撤销所需的旧值，
//       提供显式的逆命令与合并判定

use tracing::trace;

use crate::core::buffer::EditBuffer;
use crate::core::error::BufferResult;

/// 单字节命令
///
/// `changed` 是执行后目标字节应带的修改标记（用户编辑恒为 true，
/// 逆命令用它恢复旧标记）；`old`/`was_changed` 在执行时从缓冲区读取。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Insert {
        pos: u64,
        byte: u8,
        changed: bool,
    },
    Overwrite {
        pos: u64,
        byte: u8,
        changed: bool,
        old: u8,
        was_changed: bool,
    },
    Remove {
        pos: u64,
        old: u8,
        was_changed: bool,
    },
}

impl Command {
    pub fn insert(pos: u64, byte: u8) -> Self {
        Command::Insert {
            pos,
            byte,
            changed: true,
        }
    }

    pub fn overwrite(pos: u64, byte: u8) -> Self {
        Command::Overwrite {
            pos,
            byte,
            changed: true,
            old: 0,
            was_changed: false,
        }
    }

    /// 删除命令；旧字节在执行时读取保存
    pub fn remove(pos: u64) -> Self {
        Command::Remove {
            pos,
            old: 0,
            was_changed: false,
        }
    }

    pub fn pos(&self) -> u64 {
        match *self {
            Command::Insert { pos, .. } | Command::Overwrite { pos, .. } | Command::Remove { pos, .. } => pos,
        }
    }

    pub fn is_remove(&self) -> bool {
        matches!(self, Command::Remove { .. })
    }

    /// 逆命令：Insert <-> Remove，Overwrite 交换新旧字节与标记
    pub fn inverse(&self) -> Command {
        match *self {
            Command::Insert { pos, byte, changed } => Command::Remove {
                pos,
                old: byte,
                was_changed: changed,
            },
            Command::Overwrite {
                pos,
                byte,
                changed,
                old,
                was_changed,
            } => Command::Overwrite {
                pos,
                byte: old,
                changed: was_changed,
                old: byte,
                was_changed: changed,
            },
            Command::Remove {
                pos,
                old,
                was_changed,
            } => Command::Insert {
                pos,
                byte: old,
                changed: was_changed,
            },
        }
    }

    /// 执行命令，保存被覆盖/删除的字节及其标记
    pub fn redo(&mut self, buffer: &mut EditBuffer) -> BufferResult<()> {
        trace!(command = ?self, "执行命令");
        match self {
            Command::Insert { pos, byte, changed } => {
                buffer.insert_byte(*pos, *byte)?;
                if !*changed {
                    buffer.set_byte_changed(*pos, false)?;
                }
            }
            Command::Overwrite {
                pos,
                byte,
                changed,
                old,
                was_changed,
            } => {
                (*old, *was_changed) = buffer.byte_with_flag(*pos)?;
                buffer.overwrite_byte(*pos, *byte)?;
                if !*changed {
                    buffer.set_byte_changed(*pos, false)?;
                }
            }
            Command::Remove {
                pos,
                old,
                was_changed,
            } => {
                (*old, *was_changed) = buffer.byte_with_flag(*pos)?;
                buffer.remove_byte(*pos)?;
            }
        }
        Ok(())
    }

    /// 撤销命令（执行逆命令）
    pub fn undo(&self, buffer: &mut EditBuffer) -> BufferResult<()> {
        self.inverse().redo(buffer)
    }

    /// 尝试把紧随其后的命令合并进来
    ///
    /// 仅当自身不是 Remove、后者是同一位置的 Overwrite 时合并：
    /// 目标字节替换为后者的字节，旧字节保持第一次执行前的值。
    pub fn try_merge_with(&mut self, next: &Command) -> bool {
        match (self, next) {
            (
                Command::Insert { pos, byte, .. } | Command::Overwrite { pos, byte, .. },
                Command::Overwrite {
                    pos: next_pos,
                    byte: next_byte,
                    ..
                },
            ) if *pos == *next_pos => {
                *byte = *next_byte;
                true
            }
            _ => false,
        }
    }
}
