// ==========================================
// 供货合同系统 - 应用层
// ==========================================
// 职责: 由一份 AppConfig 装配全部 API，供 CLI 等调用方使用
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
