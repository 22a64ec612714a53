//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`printers`] - 打印机列表
//! - [`print`] - 单张打印与预览
//! - [`batch`] - 批量打印、取消与状态
//! - [`template`] - 模板占位符检测

pub mod batch;
pub mod health;
pub mod print;
pub mod printers;
pub mod template;
