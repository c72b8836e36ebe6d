// 撤销引擎
//
// 职责：记录通过 EditBuffer 发出的每个单字节编辑，
//       以事务为单位撤销/重做，并合并连续按键产生的覆盖

mod command;
mod stack;

pub use self::command::Command;
pub use self::stack::{Transaction, UndoStack, DEFAULT_UNDO_LIMIT};
