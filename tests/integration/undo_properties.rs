// 撤销引擎性质测试

use proptest::prelude::*;

use hexbuf::core::buffer::{EditBuffer, CHUNK_SIZE};
use hexbuf::core::undo::UndoStack;

#[derive(Debug, Clone)]
enum Edit {
    Insert(u64, Vec<u8>),
    Remove(u64, u64),
    Overwrite(u64, Vec<u8>),
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (any::<u64>(), prop::collection::vec(any::<u8>(), 1..5))
            .prop_map(|(pos, bytes)| Edit::Insert(pos, bytes)),
        (any::<u64>(), 1u64..6).prop_map(|(pos, len)| Edit::Remove(pos, len)),
        (any::<u64>(), prop::collection::vec(any::<u8>(), 1..4))
            .prop_map(|(pos, bytes)| Edit::Overwrite(pos, bytes)),
    ]
}

/// 参照模型：字节与修改标记
#[derive(Debug, Clone, PartialEq)]
struct Model {
    bytes: Vec<u8>,
    changed: Vec<bool>,
}

impl Model {
    fn new(bytes: Vec<u8>) -> Self {
        let changed = vec![false; bytes.len()];
        Self { bytes, changed }
    }

    fn insert(&mut self, pos: usize, bytes: &[u8]) {
        self.bytes.splice(pos..pos, bytes.iter().copied());
        self.changed.splice(pos..pos, bytes.iter().map(|_| true));
    }

    fn remove(&mut self, pos: usize, len: usize) {
        let end = (pos + len).min(self.bytes.len());
        self.bytes.drain(pos..end);
        self.changed.drain(pos..end);
    }
}

fn state(buffer: &EditBuffer) -> Model {
    let (bytes, changed) = buffer.read_with_changes(0, buffer.size() as usize).unwrap();
    Model { bytes, changed }
}

fn initial_bytes() -> Vec<u8> {
    (0..2 * CHUNK_SIZE + 37).map(|i| (i * 31 % 256) as u8).collect()
}

/// 执行一次编辑并同步更新模型；缓冲区为空时跳过需要已有字节的编辑
fn apply(buffer: &mut EditBuffer, stack: &mut UndoStack, model: &mut Model, edit: &Edit) {
    let size = buffer.size();
    match edit {
        Edit::Insert(raw, bytes) => {
            let pos = raw % (size + 1);
            stack.insert(buffer, pos, bytes).unwrap();
            model.insert(pos as usize, bytes);
        }
        Edit::Remove(raw, len) if size > 0 => {
            let pos = raw % size;
            stack.remove(buffer, pos, *len).unwrap();
            model.remove(pos as usize, *len as usize);
        }
        Edit::Overwrite(raw, bytes) if size > 0 => {
            let pos = (raw % size) as usize;
            stack.overwrite(buffer, pos as u64, bytes).unwrap();
            if let [byte] = bytes.as_slice() {
                model.bytes[pos] = *byte;
                model.changed[pos] = true;
            } else {
                model.remove(pos, bytes.len());
                model.insert(pos, bytes);
            }
        }
        _ => {}
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn edits_match_reference_model(edits in prop::collection::vec(edit_strategy(), 1..40)) {
        let mut buffer = EditBuffer::from_bytes(initial_bytes());
        let mut stack = UndoStack::with_limit(0);
        let mut model = Model::new(initial_bytes());

        for edit in &edits {
            apply(&mut buffer, &mut stack, &mut model, edit);
            prop_assert_eq!(buffer.size(), model.bytes.len() as u64);
        }
        prop_assert_eq!(state(&buffer), model);
    }

    #[test]
    fn undo_then_redo_restores_every_state(
        edits in prop::collection::vec(edit_strategy(), 1..30),
        steps in 0usize..30,
    ) {
        let mut buffer = EditBuffer::from_bytes(initial_bytes());
        let mut stack = UndoStack::with_limit(0);
        let mut model = Model::new(initial_bytes());

        // 每个历史条目之后的状态；合并的覆盖替换最后一个快照
        let mut snapshots = vec![state(&buffer)];
        for edit in &edits {
            apply(&mut buffer, &mut stack, &mut model, edit);
            if stack.len() + 1 > snapshots.len() {
                snapshots.push(state(&buffer));
            } else if let Some(last) = snapshots.last_mut() {
                *last = state(&buffer);
            }
        }
        prop_assert_eq!(snapshots.len(), stack.len() + 1);

        let steps = steps.min(stack.len());
        for k in 1..=steps {
            prop_assert!(stack.undo(&mut buffer).unwrap());
            prop_assert_eq!(&state(&buffer), &snapshots[snapshots.len() - 1 - k]);
        }
        for _ in 0..steps {
            prop_assert!(stack.redo(&mut buffer).unwrap());
        }
        prop_assert_eq!(&state(&buffer), &snapshots[snapshots.len() - 1]);
        prop_assert!(!stack.can_redo());
    }

    #[test]
    fn single_byte_buffer_keeps_its_chunk(cycles in prop::collection::vec(any::<bool>(), 1..50)) {
        let mut buffer = EditBuffer::from_bytes(vec![0xAA]);
        let mut stack = UndoStack::new();

        stack.remove(&mut buffer, 0, 1).unwrap();
        prop_assert_eq!(buffer.size(), 0);
        prop_assert_eq!(buffer.chunk_store().chunk_count(), 1);
        let id = buffer.chunk_store().chunks()[0].id();

        for undo in cycles {
            if undo {
                stack.undo(&mut buffer).unwrap();
            } else {
                stack.redo(&mut buffer).unwrap();
            }
            prop_assert_eq!(buffer.chunk_store().chunk_count(), 1);
            prop_assert_eq!(buffer.chunk_store().chunks()[0].id(), id);
        }
    }
}
