// 撤销栈
//
// 职责：把多字节编辑拆成单字节命令并组成原子事务，
//       维护有界的线性撤销/重做历史，合并连续的同位置覆盖

use std::collections::VecDeque;

use tracing::{debug, trace, warn};

use crate::core::buffer::EditBuffer;
use crate::core::error::{BufferError, BufferResult};
use crate::core::undo::Command;

/// 默认历史容量（事务数）
pub const DEFAULT_UNDO_LIMIT: usize = 1000;

/// 原子事务：一组按顺序执行、整体撤销/重做的单字节命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    label: String,
    commands: Vec<Command>,
}

impl Transaction {
    pub fn new(label: impl Into<String>, commands: Vec<Command>) -> Self {
        Self {
            label: label.into(),
            commands,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// 按顺序执行；中途失败时回滚已执行的命令
    fn redo(&mut self, buffer: &mut EditBuffer) -> BufferResult<()> {
        for i in 0..self.commands.len() {
            if let Err(err) = self.commands[i].redo(buffer) {
                warn!(label = %self.label, step = i, error = %err, "事务执行失败，回滚");
                for (step, command) in self.commands[..i].iter().enumerate().rev() {
                    if let Err(rollback) = command.undo(buffer) {
                        warn!(label = %self.label, step, error = %rollback, "回滚步骤失败，缓冲区可能不一致");
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }

    /// 逆序撤销；中途失败时重新执行已撤销的命令
    fn undo(&mut self, buffer: &mut EditBuffer) -> BufferResult<()> {
        let len = self.commands.len();
        for i in (0..len).rev() {
            if let Err(err) = self.commands[i].undo(buffer) {
                warn!(label = %self.label, step = i, error = %err, "事务撤销失败，回滚");
                for (step, command) in self.commands.iter_mut().enumerate().skip(i + 1) {
                    if let Err(rollback) = command.redo(buffer) {
                        warn!(label = %self.label, step, error = %rollback, "回滚步骤失败，缓冲区可能不一致");
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }
}

/// 有界的线性撤销历史
///
/// `index` 把历史分为已应用（之前）和可重做（之后）两部分；
/// 0 表示全部撤销，`len()` 表示最新。
#[derive(Debug, Clone)]
pub struct UndoStack {
    transactions: VecDeque<Transaction>,
    index: usize,
    limit: usize,
}

// ========== 构造与查询 ==========

impl UndoStack {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_UNDO_LIMIT)
    }

    /// 指定容量；0 表示不限制
    pub fn with_limit(limit: usize) -> Self {
        Self {
            transactions: VecDeque::new(),
            index: 0,
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// 调整容量，立即淘汰超出部分中最旧的事务
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        self.evict();
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index < self.transactions.len()
    }

    /// 自加载以来是否存在已应用且未撤销的编辑
    pub fn is_modified(&self) -> bool {
        self.index != 0
    }

    pub fn undo_text(&self) -> Option<&str> {
        self.index
            .checked_sub(1)
            .and_then(|i| self.transactions.get(i))
            .map(Transaction::label)
    }

    pub fn redo_text(&self) -> Option<&str> {
        self.transactions.get(self.index).map(Transaction::label)
    }

    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter()
    }

    /// 清空历史（挂接新数据源时）
    pub fn clear(&mut self) {
        self.transactions.clear();
        self.index = 0;
    }
}

// ========== 事务入口 ==========

impl UndoStack {
    /// 以单个事务执行一组命令并压栈（不参与合并）
    ///
    /// 返回 `false` 表示命令为空，未做任何事。
    pub fn apply(
        &mut self,
        buffer: &mut EditBuffer,
        label: impl Into<String>,
        commands: Vec<Command>,
    ) -> BufferResult<bool> {
        if commands.is_empty() {
            return Ok(false);
        }

        let mut transaction = Transaction::new(label, commands);
        transaction.redo(buffer)?;
        self.push_transaction(transaction);
        Ok(true)
    }

    /// 插入字节序列（`pos <= size`）
    pub fn insert(&mut self, buffer: &mut EditBuffer, pos: u64, bytes: &[u8]) -> BufferResult<()> {
        if pos > buffer.size() {
            return Err(BufferError::out_of_range(pos, buffer.size()));
        }

        match bytes {
            [] => Ok(()),
            [byte] => self.push_single(buffer, Command::insert(pos, *byte)),
            _ => {
                let commands = insert_commands(pos, bytes);
                self.apply(buffer, format!("Insert {} chars", bytes.len()), commands)
                    .map(drop)
            }
        }
    }

    /// 插入单个字节
    pub fn insert_byte(&mut self, buffer: &mut EditBuffer, pos: u64, byte: u8) -> BufferResult<()> {
        self.insert(buffer, pos, &[byte])
    }

    /// 从 `pos` 起删除至多 `len` 字节（`pos < size`，超出末尾部分截断）
    pub fn remove(&mut self, buffer: &mut EditBuffer, pos: u64, len: u64) -> BufferResult<()> {
        if pos >= buffer.size() {
            return Err(BufferError::out_of_range(pos, buffer.size()));
        }

        let count = len.min(buffer.size() - pos);
        match count {
            0 => Ok(()),
            1 => self.push_single(buffer, Command::remove(pos)),
            _ => {
                let commands = remove_commands(pos, count);
                self.apply(buffer, format!("Delete {} chars", count), commands)
                    .map(drop)
            }
        }
    }

    /// 覆盖字节序列（`pos < size`）
    ///
    /// 单字节覆盖可与前一个事务合并；多字节覆盖拆为“删除 + 插入”。
    pub fn overwrite(&mut self, buffer: &mut EditBuffer, pos: u64, bytes: &[u8]) -> BufferResult<()> {
        if pos >= buffer.size() {
            return Err(BufferError::out_of_range(pos, buffer.size()));
        }

        match bytes {
            [] => Ok(()),
            [byte] => self.push_single(buffer, Command::overwrite(pos, *byte)),
            _ => {
                let removed = (bytes.len() as u64).min(buffer.size() - pos);
                let mut commands = remove_commands(pos, removed);
                commands.extend(insert_commands(pos, bytes));
                self.apply(buffer, format!("Overwrite {} chars", bytes.len()), commands)
                    .map(drop)
            }
        }
    }

    /// 覆盖单个字节
    pub fn overwrite_byte(&mut self, buffer: &mut EditBuffer, pos: u64, byte: u8) -> BufferResult<()> {
        self.overwrite(buffer, pos, &[byte])
    }

    /// 把 `[pos, pos + len)` 替换为 `bytes`（长度可以不同）
    pub fn replace(
        &mut self,
        buffer: &mut EditBuffer,
        pos: u64,
        len: u64,
        bytes: &[u8],
    ) -> BufferResult<()> {
        if pos >= buffer.size() {
            return Err(BufferError::out_of_range(pos, buffer.size()));
        }

        let removed = len.min(buffer.size() - pos);
        let mut commands = remove_commands(pos, removed);
        commands.extend(insert_commands(pos, bytes));
        self.apply(buffer, format!("Overwrite {} chars", removed), commands)
            .map(drop)
    }

    /// 执行单命令事务；满足条件时合并进前一个事务
    fn push_single(&mut self, buffer: &mut EditBuffer, mut command: Command) -> BufferResult<()> {
        command.redo(buffer)?;
        self.transactions.truncate(self.index);

        if let Some(last) = self.transactions.back_mut() {
            if let [previous] = last.commands.as_mut_slice() {
                if previous.try_merge_with(&command) {
                    trace!(pos = command.pos(), "合并覆盖命令");
                    return Ok(());
                }
            }
        }

        let label = match command {
            Command::Insert { .. } => "Insert 1 chars",
            Command::Overwrite { .. } => "Overwrite 1 chars",
            Command::Remove { .. } => "Delete 1 chars",
        };
        self.push_transaction(Transaction::new(label, vec![command]));
        Ok(())
    }

    /// 压入已执行的事务，丢弃重做尾部并淘汰超出容量的最旧事务
    fn push_transaction(&mut self, transaction: Transaction) {
        self.transactions.truncate(self.index);
        trace!(label = %transaction.label, commands = transaction.len(), "压入事务");
        self.transactions.push_back(transaction);
        self.index = self.transactions.len();
        self.evict();
    }

    fn evict(&mut self) {
        if self.limit == 0 {
            return;
        }
        while self.transactions.len() > self.limit {
            // 全部撤销时先丢弃重做尾部，保持剩余历史可连续重做
            if self.index == 0 {
                self.transactions.pop_back();
            } else {
                self.transactions.pop_front();
                self.index -= 1;
            }
        }
    }
}

// ========== 撤销/重做 ==========

impl UndoStack {
    /// 撤销当前索引之前的事务；已在起点时返回 `false`
    pub fn undo(&mut self, buffer: &mut EditBuffer) -> BufferResult<bool> {
        if self.index == 0 {
            return Ok(false);
        }

        let transaction = &mut self.transactions[self.index - 1];
        transaction.undo(buffer)?;
        debug!(label = %transaction.label, "撤销");
        self.index -= 1;
        Ok(true)
    }

    /// 重做当前索引处的事务；已在末尾时返回 `false`
    pub fn redo(&mut self, buffer: &mut EditBuffer) -> BufferResult<bool> {
        let Some(transaction) = self.transactions.get_mut(self.index) else {
            return Ok(false);
        };

        transaction.redo(buffer)?;
        debug!(label = %transaction.label, "重做");
        self.index += 1;
        Ok(true)
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

fn insert_commands(pos: u64, bytes: &[u8]) -> Vec<Command> {
    bytes
        .iter()
        .enumerate()
        .map(|(i, &byte)| Command::insert(pos + i as u64, byte))
        .collect()
}

fn remove_commands(pos: u64, count: u64) -> Vec<Command> {
    (0..count).map(|_| Command::remove(pos)).collect()
}
