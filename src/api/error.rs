// ==========================================
// 供货合同系统 - API层错误类型
// ==========================================
// 职责: 定义调用方可见的错误分类，转换 Repository 错误
// 约束: 所有错误在检测到的操作内同步返回，不在内部恢复、不重试
// ==========================================

use chrono::NaiveDate;
use thiserror::Error;

use crate::repository::error::RepositoryError;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 数据访问错误
    // ==========================================
    /// 存储不可达、语法/类型错误、未归类的约束失败
    #[error("存储错误 ({context}): {source}")]
    StorageError {
        context: String,
        #[source]
        source: RepositoryError,
    },

    /// 调用方取消，进行中的 SQL 已中断
    #[error("操作已取消: {0}")]
    Cancelled(String),

    // ==========================================
    // 输入错误
    // ==========================================
    /// 日期格式错误、非数值参数等（写路径直接拒绝）
    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ==========================================
    // 业务规则错误
    // ==========================================
    /// 到货引用的合同不存在
    #[error("引用的合同不存在: contract_no={contract_no}, part_code={part_code}")]
    ReferenceNotFound { contract_no: i64, part_code: String },

    /// 到货日期超出合同有效期
    #[error("到货日期 {date} 超出合同有效期 [{start}, {end}]")]
    IntervalViolation {
        date: NaiveDate,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// 新建时主键重复
    #[error("主键重复: {0}")]
    DuplicateKey(String),

    /// 更新目标不存在
    #[error("资源未找到: {0}")]
    NotFound(String),
}

impl ApiError {
    /// 按仓储错误分类转换，并为存储错误附加上下文
    pub fn from_repository(context: impl Into<String>, err: RepositoryError) -> Self {
        let context = context.into();
        match err {
            RepositoryError::UniqueConstraintViolation(msg) => ApiError::DuplicateKey(msg),
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}({})", entity, id))
            }
            RepositoryError::Interrupted => ApiError::Cancelled(context),
            other => ApiError::StorageError {
                context,
                source: other,
            },
        }
    }
}

// ==========================================
// 从 RepositoryError 转换（无额外上下文）
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        ApiError::from_repository("数据库操作失败", err)
    }
}

/// 给仓储结果附加上下文
pub trait RepositoryResultExt<T> {
    fn context<F, S>(self, context: F) -> ApiResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> RepositoryResultExt<T> for Result<T, RepositoryError> {
    fn context<F, S>(self, context: F) -> ApiResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| ApiError::from_repository(context(), e))
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
