use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use label_printer::{DeviceScanner, NetworkScanner};

use crate::core::Config;
use crate::printing::{
    BatchJobManager, CanvasRenderer, EnvVirtualPrinters, LabelDispatcher, LabelRenderer,
    PrinterResolver, VirtualPrinterSource,
};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，每个请求克隆一次成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | resolver | Arc<PrinterResolver> | 打印机选择与下发 |
/// | batch_jobs | Arc<BatchJobManager> | 批量打印任务注册表 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 打印机解析器
    pub resolver: Arc<PrinterResolver>,
    /// 批量任务管理器
    pub batch_jobs: Arc<BatchJobManager>,
    started_at: Instant,
}

impl ServerState {
    /// 使用指定组件构造 (测试时注入假设备扫描器/渲染器)
    pub fn with_components(
        config: Config,
        scanner: Arc<dyn DeviceScanner>,
        virtual_printers: Arc<dyn VirtualPrinterSource>,
        renderer: Arc<dyn LabelRenderer>,
    ) -> Self {
        let resolver = PrinterResolver::new(scanner, virtual_printers, renderer);
        let batch_jobs = BatchJobManager::new(config.batch_job_retention(), config.batch_event_buffer);

        Self {
            config,
            resolver: Arc::new(resolver),
            batch_jobs: Arc::new(batch_jobs),
            started_at: Instant::now(),
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 上传目录 (图片组件从这里读取文件)
    /// 2. 网络打印机扫描器 (LABEL_PRINTERS)
    /// 3. 虚拟打印机来源 (VIRTUAL_PRINTERS，每次解析时重新读取)
    /// 4. 渲染器与批量任务管理器
    pub fn initialize(config: &Config) -> Self {
        ensure_dir(Path::new(&config.upload_dir));

        let scanner = NetworkScanner::from_addrs(&config.label_printers);
        tracing::info!(
            network_printers = scanner.configured(),
            upload_dir = %config.upload_dir,
            "Printing backends ready"
        );

        Self::with_components(
            config.clone(),
            Arc::new(scanner),
            Arc::new(EnvVirtualPrinters),
            Arc::new(CanvasRenderer::new(&config.upload_dir)),
        )
    }

    /// 批量任务使用的下发通道
    pub fn dispatcher(&self) -> Arc<dyn LabelDispatcher> {
        self.resolver.clone()
    }

    /// 运行时间 (秒)
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

fn ensure_dir(path: &Path) {
    if let Err(e) = std::fs::create_dir_all(path) {
        tracing::warn!(path = %path.display(), error = %e, "Failed to create directory");
    }
}
