// Search System - 搜索系统
//
// 职责：在逻辑缓冲区上按窗口查找字节序列，
//       与编辑状态解耦，只通过 EditBuffer 的读取接口访问数据

pub mod search;

pub use search::SearchEngine;
