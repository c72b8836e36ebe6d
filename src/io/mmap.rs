// 内存映射数据源
//
// 职责：为中等大小文件提供内存映射支持，避免一次性读入全部内容

use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[cfg(not(target_arch = "wasm32"))]
use memmap2::Mmap;

use crate::io::source::{ByteSource, SourceReader};

/// 内存映射数据源（只读）
#[derive(Debug, Clone)]
pub struct MmapSource {
    #[cfg(not(target_arch = "wasm32"))]
    mmap: Option<Arc<Mmap>>,

    path: PathBuf,
    length: u64,
}

impl MmapSource {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_file(path: &Path) -> io::Result<Self> {
        use std::fs::File;

        let file = File::open(path)?;
        let length = file.metadata()?.len();

        // 空文件无法映射
        let mmap = if length == 0 {
            None
        } else {
            // 映射期间文件被外部截断属于未定义行为，调用方需保证独占
            let mmap = unsafe { Mmap::map(&file)? };
            Some(Arc::new(mmap))
        };

        Ok(Self {
            mmap,
            path: path.to_path_buf(),
            length,
        })
    }

    #[cfg(target_arch = "wasm32")]
    pub fn from_file(_path: &Path) -> io::Result<Self> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "WebAssembly环境不支持文件内存映射",
        ))
    }

    fn as_bytes(&self) -> &[u8] {
        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.mmap {
                Some(ref mmap) => &mmap[..],
                None => &[],
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            &[]
        }
    }
}

impl ByteSource for MmapSource {
    fn len(&self) -> io::Result<u64> {
        Ok(self.length)
    }

    fn open(&self) -> io::Result<Box<dyn SourceReader + '_>> {
        Ok(Box::new(Cursor::new(self.as_bytes())))
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}
