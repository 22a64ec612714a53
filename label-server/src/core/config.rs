use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use label_printer::{OutputMode, VirtualPrinterConfig};
use serde_json::Value;

/// 环境变量：虚拟打印机 JSON 数组
pub const VIRTUAL_PRINTERS_ENV: &str = "VIRTUAL_PRINTERS";

/// 服务器配置 - 标签打印服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./work_dir | 工作目录 (日志在 WORK_DIR/logs) |
/// | HTTP_PORT | 5000 | HTTP 服务端口 |
/// | UPLOAD_DIR | WORK_DIR/uploads | 图片组件引用的文件目录 |
/// | LOG_LEVEL | info | 日志级别 (RUST_LOG 优先) |
/// | LOG_JSON | false | JSON 格式日志 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LABEL_PRINTERS | (空) | 网络标签打印机，逗号分隔 host:port |
/// | VIRTUAL_PRINTERS | (空) | 虚拟打印机 JSON 数组，每次解析时重新读取 |
/// | BATCH_JOB_RETENTION_SECS | 600 | 已完成批量任务的保留时间 |
/// | BATCH_EVENT_BUFFER | 32 | 批量事件通道容量 |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | 优雅关闭超时(毫秒) |
///
/// # 示例
///
/// ```ignore
/// HTTP_PORT=8080 VIRTUAL_PRINTERS='[{"name":"Desk","path":"/tmp/labels"}]' cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 上传文件目录
    pub upload_dir: String,
    /// 日志级别
    pub log_level: String,
    /// JSON 日志
    pub log_json: bool,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 网络标签打印机地址列表
    pub label_printers: Vec<String>,
    /// 已完成任务保留时间 (秒)
    pub batch_job_retention_secs: u64,
    /// 批量事件通道容量
    pub batch_event_buffer: usize,
    /// 关闭超时时间 (毫秒)
    pub shutdown_timeout_ms: u64,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./work_dir".into());
        let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| {
            PathBuf::from(&work_dir)
                .join("uploads")
                .to_string_lossy()
                .into_owned()
        });

        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            upload_dir,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            label_printers: std::env::var("LABEL_PRINTERS")
                .map(|v| split_list(&v))
                .unwrap_or_default(),
            batch_job_retention_secs: std::env::var("BATCH_JOB_RETENTION_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(600),
            batch_event_buffer: std::env::var("BATCH_EVENT_BUFFER")
                .ok()
                .and_then(|p| p.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(32),
            shutdown_timeout_ms: std::env::var("SHUTDOWN_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10000),
            work_dir,
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.upload_dir = PathBuf::from(&config.work_dir)
            .join("uploads")
            .to_string_lossy()
            .into_owned();
        config.http_port = http_port;
        config
    }

    /// 日志目录
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    pub fn batch_job_retention(&self) -> Duration {
        Duration::from_secs(self.batch_job_retention_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Read `VIRTUAL_PRINTERS` from the environment
///
/// Unset or blank means no virtual printers.
pub fn load_virtual_printers() -> Vec<VirtualPrinterConfig> {
    match std::env::var(VIRTUAL_PRINTERS_ENV) {
        Ok(raw) if !raw.trim().is_empty() => parse_virtual_printers(&raw),
        _ => Vec::new(),
    }
}

/// Parse a virtual printer JSON array
///
/// 容错解析：单个条目格式错误时跳过并告警，其余条目照常加载。
/// 整体不是合法 JSON 数组时返回空列表。
/// 同一 id 出现多次时保留第一个。
pub fn parse_virtual_printers(raw: &str) -> Vec<VirtualPrinterConfig> {
    let entries = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(entries)) => entries,
        Ok(_) => {
            tracing::error!("{} must be a JSON array", VIRTUAL_PRINTERS_ENV);
            return Vec::new();
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to parse {}", VIRTUAL_PRINTERS_ENV);
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut printers = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        let config = match parse_entry(entry) {
            Ok(config) => config,
            Err(reason) => {
                tracing::warn!(index, reason, "Skipping invalid virtual printer config");
                continue;
            }
        };

        let id = config.id();
        if !seen.insert(id.clone()) {
            tracing::warn!(
                index,
                printer_id = %id,
                name = %config.name,
                "Skipping virtual printer with duplicate id"
            );
            continue;
        }

        printers.push(config);
    }

    printers
}

fn parse_entry(entry: &Value) -> Result<VirtualPrinterConfig, &'static str> {
    let obj = entry.as_object().ok_or("entry is not an object")?;

    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .ok_or("missing or non-string 'name'")?;
    let path = obj
        .get("path")
        .and_then(Value::as_str)
        .ok_or("missing or non-string 'path'")?;

    let output_mode = match obj.get("output") {
        None | Some(Value::Null) => OutputMode::default(),
        Some(v) => serde_json::from_value::<OutputMode>(v.clone())
            .map_err(|_| "invalid 'output' (expected image, json or both)")?,
    };

    Ok(VirtualPrinterConfig {
        name: name.to_string(),
        path: PathBuf::from(path),
        output_mode,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_entries() {
        let printers = parse_virtual_printers(
            r#"[
                {"name": "Office", "path": "/tmp/a"},
                {"name": "Lab (2)", "path": "/tmp/b", "output": "both"}
            ]"#,
        );
        assert_eq!(printers.len(), 2);
        assert_eq!(printers[0].output_mode, OutputMode::Image);
        assert_eq!(printers[1].output_mode, OutputMode::Both);
        assert_eq!(printers[1].id(), "virtual:Lab_2");
    }

    #[test]
    fn test_malformed_entry_is_skipped() {
        let printers = parse_virtual_printers(
            r#"[
                {"name": "NoPath"},
                42,
                {"name": 7, "path": "/tmp/x"},
                {"name": "BadMode", "path": "/tmp/y", "output": "pdf"},
                {"name": "Good", "path": "/tmp/z", "output": "json"}
            ]"#,
        );
        assert_eq!(printers.len(), 1);
        assert_eq!(printers[0].name, "Good");
        assert_eq!(printers[0].output_mode, OutputMode::Json);
    }

    #[test]
    fn test_duplicate_id_first_wins() {
        let printers = parse_virtual_printers(
            r#"[
                {"name": "Front Desk", "path": "/tmp/first"},
                {"name": "Front_Desk", "path": "/tmp/second"},
                {"name": "(Front Desk)", "path": "/tmp/third"}
            ]"#,
        );
        assert_eq!(printers.len(), 1);
        assert_eq!(printers[0].path, PathBuf::from("/tmp/first"));
    }

    #[test]
    fn test_not_an_array() {
        assert!(parse_virtual_printers(r#"{"name": "x", "path": "y"}"#).is_empty());
        assert!(parse_virtual_printers("not json").is_empty());
        assert!(parse_virtual_printers("[]").is_empty());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list(" 10.0.0.5:9100, ,printer.local "),
            vec!["10.0.0.5:9100".to_string(), "printer.local".to_string()]
        );
    }
}
