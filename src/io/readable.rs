// 可读文本导出
//
// 职责：把字节序列渲染为“地址 + 十六进制 + ASCII”文本，
//       供“保存为文本”类功能使用

use std::fmt::Write;

/// 每行字节数
pub const BYTES_PER_LINE: usize = 16;

/// 地址列的进制
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressBase {
    #[default]
    Decimal,
    Octal,
    Hex,
}

impl AddressBase {
    /// 地址宽度：导出长度小于 base^4 时用 4 位，否则 8 位
    fn width_for(self, size: usize) -> usize {
        let limit = match self {
            AddressBase::Decimal => 10_000,
            AddressBase::Octal => 0o10000,
            AddressBase::Hex => 0x10000,
        };
        if size < limit {
            4
        } else {
            8
        }
    }

    fn format(self, out: &mut String, address: u64, width: usize) {
        let _ = match self {
            AddressBase::Decimal => write!(out, "{:0width$}", address),
            AddressBase::Octal => write!(out, "{:0width$o}", address),
            AddressBase::Hex => write!(out, "{:0width$x}", address),
        };
    }
}

/// 渲染可读文本
///
/// 每行：地址、两个空格、16 个以单空格分隔的两位小写十六进制单元
/// （不足补两个空格）、两个空格、ASCII 列（不可打印字符显示为 `.`）。
pub fn to_readable(bytes: &[u8], address_offset: u64, base: AddressBase) -> String {
    let width = base.width_for(bytes.len());
    let lines = bytes.len().div_ceil(BYTES_PER_LINE);
    let mut out = String::with_capacity(lines * (width + 4 + BYTES_PER_LINE * 4 + 1));

    for (line_idx, line) in bytes.chunks(BYTES_PER_LINE).enumerate() {
        let address = address_offset + (line_idx * BYTES_PER_LINE) as u64;
        base.format(&mut out, address, width);
        out.push_str("  ");

        for col in 0..BYTES_PER_LINE {
            if col > 0 {
                out.push(' ');
            }
            match line.get(col) {
                Some(b) => {
                    let _ = write!(out, "{:02x}", b);
                }
                None => out.push_str("  "),
            }
        }

        out.push_str("  ");
        out.extend(line.iter().map(|&b| printable(b)));
        out.push('\n');
    }

    out
}

fn printable(b: u8) -> char {
    if (0x20..=0x7e).contains(&b) {
        b as char
    } else {
        '.'
    }
}
