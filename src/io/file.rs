// 文件数据源与写入目标
//
// 职责：按次打开文件读取（不长期持有句柄），
//       通过临时文件 + 重命名实现原子替换保存

use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::io::sink::{ByteSink, SinkWriter};
use crate::io::source::{ByteSource, SourceReader};

/// 文件数据源：每次读操作重新打开文件
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ByteSource for FileSource {
    fn len(&self) -> io::Result<u64> {
        Ok(fs::metadata(&self.path)?.len())
    }

    fn open(&self) -> io::Result<Box<dyn SourceReader + '_>> {
        let file = File::open(&self.path)?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// 文件写入目标：提交时原子替换目标文件，未提交则丢弃
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSink for FileSink {
    fn create(&mut self) -> io::Result<Box<dyn SinkWriter + '_>> {
        // 临时文件必须与目标在同一目录，重命名才是原子的
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file = NamedTempFile::new_in(dir)?;

        Ok(Box::new(FileWriter {
            file,
            target: self.path.clone(),
        }))
    }
}

struct FileWriter {
    file: NamedTempFile,
    target: PathBuf,
}

impl Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl SinkWriter for FileWriter {
    fn commit(self: Box<Self>) -> io::Result<()> {
        let FileWriter { mut file, target } = *self;
        file.flush()?;
        file.as_file().sync_all()?;
        file.persist(&target).map_err(|e| e.error)?;
        Ok(())
    }
}
