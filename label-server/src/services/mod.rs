//! 服务层 - 服务器核心服务
//!
//! # 服务列表
//!
//! - [`http`] - HTTP 路由组装、访问日志与优雅停机

pub mod http;

pub use self::http::{build_app, build_router};
