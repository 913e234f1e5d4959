// ==========================================
// 供货合同系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 说明: 所有 API 共用同一个 StorageGateway（只含路径与连接参数），
//       每次调用各自取连接，AppState 本身无锁
// ==========================================

use std::path::Path;
use std::sync::Arc;

use crate::api::error::{ApiResult, RepositoryResultExt};
use crate::api::{
    AnalyticsApi, ContractApi, DeliveryApi, OverviewApi, ProcedureApi, WarehouseApi,
};
use crate::config::AppConfig;
use crate::db::{install_schema, warn_on_schema_mismatch};
use crate::repository::error::RepositoryError;
use crate::repository::gateway::StorageGateway;

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    gateway: StorageGateway,

    /// 仓库API
    pub warehouse_api: Arc<WarehouseApi>,

    /// 合同API
    pub contract_api: Arc<ContractApi>,

    /// 到货API（写入经校验器）
    pub delivery_api: Arc<DeliveryApi>,

    /// 分析查询API（Q1/Q2/Q3）
    pub analytics_api: Arc<AnalyticsApi>,

    /// 合同执行汇总API
    pub procedure_api: Arc<ProcedureApi>,

    /// 首页总览API
    pub overview_api: Arc<OverviewApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// 数据库文件所在目录不存在时会先创建；不会自动建表（见 `install_schema`）
    pub fn new(config: &AppConfig) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", config.db_path);

        if let Some(parent) = Path::new(&config.db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("无法创建数据库目录 {}: {}", parent.display(), e))?;
            }
        }

        let gateway = StorageGateway::from_config(config);

        let state = Self {
            db_path: config.db_path.clone(),
            warehouse_api: Arc::new(WarehouseApi::new(gateway.clone())),
            contract_api: Arc::new(ContractApi::new(gateway.clone())),
            delivery_api: Arc::new(DeliveryApi::new(gateway.clone())),
            analytics_api: Arc::new(AnalyticsApi::new(gateway.clone())),
            procedure_api: Arc::new(ProcedureApi::new(gateway.clone())),
            overview_api: Arc::new(OverviewApi::new(gateway.clone())),
            gateway,
        };

        tracing::info!("AppState初始化完成");
        Ok(state)
    }

    /// 在当前库上安装 schema（幂等）
    pub async fn install_schema(&self) -> ApiResult<()> {
        self.gateway
            .with_connection("db.install_schema", |conn| -> Result<(), RepositoryError> {
                install_schema(conn)?;
                Ok(())
            })
            .await
            .context(|| format!("安装 schema ({})", self.db_path))?;

        tracing::info!(db_path = %self.db_path, "schema 已安装");
        Ok(())
    }

    /// 检查库的 schema_version，只告警
    pub async fn check_schema(&self) -> ApiResult<()> {
        self.gateway
            .with_connection("db.check_schema", |conn| -> Result<(), RepositoryError> {
                warn_on_schema_mismatch(conn);
                Ok(())
            })
            .await
            .context(|| format!("检查 schema ({})", self.db_path))
    }
}

/// 获取默认数据库路径
pub fn get_default_db_path() -> String {
    crate::config::default_db_path()
}
