// 撤销栈单元测试

use std::fs;

use hexbuf::core::buffer::{EditBuffer, CHUNK_SIZE};
use hexbuf::core::undo::{Command, UndoStack};
use hexbuf::core::BufferError;
use hexbuf::io::FileSource;

fn snapshot(buffer: &EditBuffer) -> (Vec<u8>, Vec<bool>) {
    buffer.read_with_changes(0, buffer.size() as usize).unwrap()
}

#[test]
fn test_scenario_insert_remove_undo_redo() {
    let mut buffer = EditBuffer::from_bytes(vec![0xAA, 0xBB, 0xCC]);
    let mut stack = UndoStack::new();

    stack.overwrite(&mut buffer, 1, &[0xFF]).unwrap();
    assert_eq!(snapshot(&buffer), (vec![0xAA, 0xFF, 0xCC], vec![false, true, false]));
    stack.undo(&mut buffer).unwrap();
    assert_eq!(snapshot(&buffer), (vec![0xAA, 0xBB, 0xCC], vec![false; 3]));

    stack.insert(&mut buffer, 3, &[0x00]).unwrap();
    assert_eq!(buffer.size(), 4);
    stack.remove(&mut buffer, 0, 1).unwrap();
    assert_eq!(buffer.read(0, 10).unwrap(), vec![0xBB, 0xCC, 0x00]);

    assert!(stack.undo(&mut buffer).unwrap());
    assert_eq!(buffer.read(0, 10).unwrap(), vec![0xAA, 0xBB, 0xCC, 0x00]);

    assert!(stack.undo(&mut buffer).unwrap());
    let (bytes, changed) = snapshot(&buffer);
    assert_eq!(bytes, vec![0xAA, 0xBB, 0xCC]);
    assert_eq!(changed, vec![false, false, false]);
    assert!(!stack.is_modified());

    assert!(stack.redo(&mut buffer).unwrap());
    assert!(stack.redo(&mut buffer).unwrap());
    assert_eq!(buffer.read(0, 10).unwrap(), vec![0xBB, 0xCC, 0x00]);
    assert!(!stack.redo(&mut buffer).unwrap());
}

#[test]
fn test_consecutive_overwrites_merge_into_one_entry() {
    let mut buffer = EditBuffer::from_bytes(vec![0x10, 0x20, 0x30]);
    let mut stack = UndoStack::new();

    stack.overwrite_byte(&mut buffer, 1, 0x01).unwrap();
    stack.overwrite_byte(&mut buffer, 1, 0x02).unwrap();
    stack.overwrite_byte(&mut buffer, 1, 0x03).unwrap();
    assert_eq!(stack.len(), 1);
    assert_eq!(buffer.byte_at(1).unwrap(), 0x03);

    stack.undo(&mut buffer).unwrap();
    let (bytes, changed) = snapshot(&buffer);
    assert_eq!(bytes, vec![0x10, 0x20, 0x30]);
    assert_eq!(changed, vec![false, false, false]);

    stack.redo(&mut buffer).unwrap();
    assert_eq!(buffer.byte_at(1).unwrap(), 0x03);
}

#[test]
fn test_overwrites_at_different_positions_do_not_merge() {
    let mut buffer = EditBuffer::from_bytes(vec![0; 4]);
    let mut stack = UndoStack::new();

    stack.overwrite_byte(&mut buffer, 0, 1).unwrap();
    stack.overwrite_byte(&mut buffer, 1, 2).unwrap();
    stack.remove(&mut buffer, 2, 1).unwrap();
    stack.overwrite_byte(&mut buffer, 2, 3).unwrap();
    assert_eq!(stack.len(), 4);
}

#[test]
fn test_multi_byte_edit_is_one_transaction() {
    let mut buffer = EditBuffer::from_bytes(b"hello world".to_vec());
    let mut stack = UndoStack::new();

    stack.insert(&mut buffer, 5, b", big").unwrap();
    assert_eq!(buffer.read(0, 64).unwrap(), b"hello, big world");
    assert_eq!(stack.len(), 1);
    assert_eq!(stack.undo_text(), Some("Insert 5 chars"));

    stack.undo(&mut buffer).unwrap();
    assert_eq!(buffer.read(0, 64).unwrap(), b"hello world");
    assert_eq!(stack.redo_text(), Some("Insert 5 chars"));
}

#[test]
fn test_remove_clamps_to_end() {
    let mut buffer = EditBuffer::from_bytes(vec![1, 2, 3, 4]);
    let mut stack = UndoStack::new();

    stack.remove(&mut buffer, 2, 100).unwrap();
    assert_eq!(buffer.read(0, 10).unwrap(), vec![1, 2]);
    assert_eq!(stack.undo_text(), Some("Delete 2 chars"));

    stack.undo(&mut buffer).unwrap();
    assert_eq!(buffer.read(0, 10).unwrap(), vec![1, 2, 3, 4]);
}

#[test]
fn test_multi_byte_overwrite_past_end_grows_buffer() {
    let mut buffer = EditBuffer::from_bytes(vec![1, 2, 3]);
    let mut stack = UndoStack::new();

    stack.overwrite(&mut buffer, 2, &[7, 8, 9]).unwrap();
    assert_eq!(buffer.read(0, 10).unwrap(), vec![1, 2, 7, 8, 9]);
    assert_eq!(stack.len(), 1);

    stack.undo(&mut buffer).unwrap();
    assert_eq!(snapshot(&buffer), (vec![1, 2, 3], vec![false; 3]));
}

#[test]
fn test_replace_with_different_length() {
    let mut buffer = EditBuffer::from_bytes(b"abcdef".to_vec());
    let mut stack = UndoStack::new();

    stack.replace(&mut buffer, 1, 3, b"XY").unwrap();
    assert_eq!(buffer.read(0, 10).unwrap(), b"aXYef");

    stack.undo(&mut buffer).unwrap();
    assert_eq!(buffer.read(0, 10).unwrap(), b"abcdef");
}

#[test]
fn test_out_of_range_edits_leave_history_untouched() {
    let mut buffer = EditBuffer::from_bytes(vec![1, 2]);
    let mut stack = UndoStack::new();

    assert!(stack.insert(&mut buffer, 3, &[0]).unwrap_err().is_out_of_range());
    assert!(stack.remove(&mut buffer, 2, 1).unwrap_err().is_out_of_range());
    assert!(stack.overwrite(&mut buffer, 2, &[0]).unwrap_err().is_out_of_range());
    assert!(stack.is_empty());
    assert_eq!(buffer.read(0, 10).unwrap(), vec![1, 2]);
}

#[test]
fn test_new_edit_discards_redo_tail() {
    let mut buffer = EditBuffer::from_bytes(vec![0; 3]);
    let mut stack = UndoStack::new();

    stack.insert_byte(&mut buffer, 0, 1).unwrap();
    stack.insert_byte(&mut buffer, 0, 2).unwrap();
    stack.undo(&mut buffer).unwrap();
    assert!(stack.can_redo());

    stack.insert_byte(&mut buffer, 0, 3).unwrap();
    assert!(!stack.can_redo());
    assert_eq!(stack.len(), 2);
    assert_eq!(buffer.read(0, 2).unwrap(), vec![3, 1]);
}

#[test]
fn test_limit_evicts_oldest() {
    let mut buffer = EditBuffer::new();
    let mut stack = UndoStack::with_limit(3);

    for byte in 0..5u8 {
        let end = buffer.size();
        stack.insert_byte(&mut buffer, end, byte).unwrap();
    }
    assert_eq!(stack.len(), 3);
    assert_eq!(stack.index(), 3);

    while stack.undo(&mut buffer).unwrap() {}
    // 最早的两次插入已不可撤销
    assert_eq!(buffer.read(0, 10).unwrap(), vec![0, 1]);
    assert!(!stack.is_modified());
}

#[test]
fn test_zero_limit_is_unbounded() {
    let mut buffer = EditBuffer::new();
    let mut stack = UndoStack::with_limit(0);

    for byte in 0..50u8 {
        stack.insert_byte(&mut buffer, 0, byte).unwrap();
    }
    assert_eq!(stack.len(), 50);
}

#[test]
fn test_apply_custom_commands() {
    let mut buffer = EditBuffer::from_bytes(vec![5, 6]);
    let mut stack = UndoStack::new();

    let applied = stack
        .apply(
            &mut buffer,
            "swap",
            vec![Command::overwrite(0, 6), Command::overwrite(1, 5)],
        )
        .unwrap();
    assert!(applied);
    assert_eq!(buffer.read(0, 2).unwrap(), vec![6, 5]);

    assert!(!stack.apply(&mut buffer, "nothing", Vec::new()).unwrap());
    assert_eq!(stack.len(), 1);

    stack.undo(&mut buffer).unwrap();
    assert_eq!(buffer.read(0, 2).unwrap(), vec![5, 6]);
}

#[test]
fn test_failed_transaction_rolls_back() {
    let mut buffer = EditBuffer::from_bytes(vec![1, 2, 3]);
    let mut stack = UndoStack::new();

    // 第三个命令越界
    let result = stack.apply(
        &mut buffer,
        "bad",
        vec![Command::remove(0), Command::insert(0, 9), Command::remove(10)],
    );
    assert!(result.is_err());
    assert!(stack.is_empty());
    assert_eq!(snapshot(&buffer), (vec![1, 2, 3], vec![false; 3]));
}

#[test]
fn test_source_failure_mid_transaction_rolls_back_loaded_edits() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("two_pages.bin");
    fs::write(&path, vec![0x5Au8; 2 * CHUNK_SIZE]).unwrap();

    let mut buffer = EditBuffer::new();
    buffer.attach(Box::new(FileSource::new(&path))).unwrap();
    let mut stack = UndoStack::new();

    // 第二页在事务执行前消失
    fs::write(&path, vec![0x5Au8; 10]).unwrap();

    let result = stack.apply(
        &mut buffer,
        "Delete 2 chars",
        vec![Command::remove(0), Command::remove(CHUNK_SIZE as u64)],
    );
    assert!(matches!(result, Err(BufferError::SourceUnavailable(_))));
    assert!(stack.is_empty());

    // 第一步已被回滚
    assert_eq!(buffer.size(), 2 * CHUNK_SIZE as u64);
    assert_eq!(buffer.read(0, 10).unwrap(), vec![0x5A; 10]);
    assert!(!buffer.byte_changed(0).unwrap());
}
