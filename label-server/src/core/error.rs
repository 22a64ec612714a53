use std::net::SocketAddr;

use thiserror::Error;

/// 服务器启动/运行错误
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP 服务器错误 ({addr}): {source}")]
    Serve {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ServerError>;
