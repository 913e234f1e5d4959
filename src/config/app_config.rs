// ==========================================
// 供货合同系统 - 运行配置
// ==========================================
// 加载顺序（后者覆盖前者）:
// 1. 内置默认值
// 2. SUPPLY_CONTRACTS_CONFIG 指向的 JSON 文件（可选）
// 3. 单项环境变量
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::db::DEFAULT_BUSY_TIMEOUT_MS;

/// 默认慢 SQL 阈值（毫秒）
///
/// 单表合同/到货查询和汇总过程在本地库上应为个位数毫秒；
/// 超过 100ms 通常是在等写锁或扫了整张到货表。调试与发布构建取同一值。
pub const DEFAULT_SLOW_SQL_MS: u64 = 100;

/// 环境变量名
pub mod env_keys {
    pub const CONFIG_FILE: &str = "SUPPLY_CONTRACTS_CONFIG";
    pub const DB_PATH: &str = "SUPPLY_CONTRACTS_DB_PATH";
    pub const BUSY_TIMEOUT_MS: &str = "SUPPLY_CONTRACTS_BUSY_TIMEOUT_MS";
    pub const SLOW_SQL_MS: &str = "SUPPLY_CONTRACTS_SLOW_SQL_MS";
}

/// 配置层错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("配置文件格式错误 ({path}): {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("环境变量 {key} 取值无效: {value}")]
    InvalidEnv { key: &'static str, value: String },
}

/// 运行配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite 数据库文件路径
    pub db_path: String,
    /// 每个连接的 busy_timeout（毫秒）
    pub busy_timeout_ms: u64,
    /// 慢 SQL 告警阈值（毫秒），0 表示关闭 SQL 统计
    pub slow_sql_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            slow_sql_ms: DEFAULT_SLOW_SQL_MS,
        }
    }
}

impl AppConfig {
    /// 指定数据库路径，其余取默认值
    pub fn with_db_path(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Self::default()
        }
    }

    /// 按 默认值 → 配置文件 → 环境变量 的顺序加载
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(env_keys::CONFIG_FILE) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;

        tracing::debug!(db_path = %config.db_path, "配置加载完成");
        Ok(config)
    }

    /// 从 JSON 文件读取；文件中缺省的字段取默认值
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    /// 应用环境变量覆盖
    ///
    /// `lookup` 抽象了环境读取，便于测试
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(env_keys::DB_PATH) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                self.db_path = trimmed.to_string();
            }
        }
        if let Some(v) = lookup(env_keys::BUSY_TIMEOUT_MS) {
            self.busy_timeout_ms = parse_millis(env_keys::BUSY_TIMEOUT_MS, &v)?;
        }
        if let Some(v) = lookup(env_keys::SLOW_SQL_MS) {
            self.slow_sql_ms = parse_millis(env_keys::SLOW_SQL_MS, &v)?;
        }
        Ok(())
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

fn parse_millis(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnv {
        key,
        value: value.to_string(),
    })
}

/// 获取默认数据库路径
///
/// # 返回
/// - 开发环境: 用户数据目录/supply-contracts-dev/supply_contracts.db
/// - 生产环境: 用户数据目录/supply-contracts/supply_contracts.db
/// - 拿不到用户数据目录时回退到当前目录
pub fn default_db_path() -> String {
    let mut path = PathBuf::from("./supply_contracts.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("supply-contracts-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("supply-contracts");
        }

        path = path.join("supply_contracts.db");
    }

    path.to_string_lossy().to_string()
}
