//! Label Server - 标签打印服务
//!
//! # 架构概述
//!
//! 通过 HTTP 提供标签打印能力：
//!
//! - **打印机解析** (`printing::resolver`): 真实设备优先，无设备时回退到虚拟打印机
//! - **模板替换** (`printing::template`): `:name:` 占位符按数据行展开
//! - **批量任务** (`printing::batch`): 单任务运行，NDJSON 流式进度，可取消
//! - **HTTP API** (`api`): axum 路由
//!
//! # 模块结构
//!
//! ```text
//! label-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── printing/      # 解析、渲染、模板、批量任务
//! ├── services/      # HTTP 路由组装
//! ├── api/           # HTTP 处理器
//! └── utils/         # 错误响应、日志
//! ```

pub mod api;
pub mod core;
pub mod printing;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use printing::{BatchJobManager, PrinterResolver};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// 设置运行环境
///
/// 1. 加载 `.env`
/// 2. 创建工作目录
/// 3. 初始化日志 (控制台 + WORK_DIR/logs 按天滚动)
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    std::fs::create_dir_all(&config.work_dir)?;

    init_logger_with_file(
        &config.log_level,
        config.log_json,
        Some(config.log_dir().as_path()),
    )?;

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    __          __         __
   / /   ____ _/ /_  ___  / /
  / /   / __ `/ __ \/ _ \/ /
 / /___/ /_/ / /_/ /  __/ /
/_____/\__,_/_.___/\___/_/
   _____
  / ___/___  ______   _____  _____
  \__ \/ _ \/ ___/ | / / _ \/ ___/
 ___/ /  __/ /   | |/ /  __/ /
/____/\___/_/    |___/\___/_/
    "#
    );
}
