// 数据块
//
// 职责：数据源中一页的内存副本，附带逐字节修改标记

/// 内存中的数据块
///
/// `data` 与 `changed` 长度始终一致；`logical_start` 是块首字节在
/// 编辑后逻辑地址空间中的偏移，随前面块的增长/收缩而移动。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    id: u64,
    data: Vec<u8>,
    changed: Vec<bool>,
    logical_start: u64,
    page_len: usize, // 从数据源读入时的原始长度
}

impl Chunk {
    pub(crate) fn new(id: u64, page: Vec<u8>, logical_start: u64) -> Self {
        let page_len = page.len();
        Self {
            id,
            changed: vec![false; page_len],
            data: page,
            logical_start,
            page_len,
        }
    }

    /// 块标识（创建时分配，块存活期间不变）
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn changed(&self) -> &[bool] {
        &self.changed
    }

    pub fn logical_start(&self) -> u64 {
        self.logical_start
    }

    /// 逻辑结束位置（不含）
    pub fn logical_end(&self) -> u64 {
        self.logical_start + self.data.len() as u64
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 加载时读入的字节数
    pub fn page_len(&self) -> usize {
        self.page_len
    }

    /// 原始页长度与当前长度之差（漂移量贡献）
    pub fn drift(&self) -> i64 {
        self.page_len as i64 - self.data.len() as i64
    }

    pub fn contains(&self, pos: u64) -> bool {
        self.logical_start <= pos && pos < self.logical_end()
    }

    pub(crate) fn insert(&mut self, offset: usize, byte: u8) {
        self.data.insert(offset, byte);
        self.changed.insert(offset, true);
    }

    pub(crate) fn overwrite(&mut self, offset: usize, byte: u8) {
        self.data[offset] = byte;
        self.changed[offset] = true;
    }

    pub(crate) fn remove(&mut self, offset: usize) {
        self.data.remove(offset);
        self.changed.remove(offset);
    }

    pub(crate) fn set_changed(&mut self, offset: usize, changed: bool) {
        self.changed[offset] = changed;
    }

    pub(crate) fn shift(&mut self, delta: i64) {
        self.logical_start = (self.logical_start as i64 + delta) as u64;
    }
}
