// ==========================================
// 供货合同系统 - 配置层
// ==========================================
// 职责: 运行参数加载（默认值 → JSON 配置文件 → 环境变量）
// ==========================================

pub mod app_config;

// 重导出核心配置
pub use app_config::{default_db_path, env_keys, AppConfig, ConfigError, DEFAULT_SLOW_SQL_MS};
