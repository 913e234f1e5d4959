// ==========================================
// 供货合同系统 - 存储网关
// ==========================================
// 职责: 参数化执行 SQL，把结果行映射为类型化记录
// 约束:
// - 每次调用独立获取连接，返回前释放连接与游标（含错误路径）
// - 所有语句参数化绑定，不拼接字面量
// - 不做重试
// - 调用方丢弃 future 时中断进行中的 SQL
// ==========================================

use rusqlite::types::Value;
use rusqlite::{
    params_from_iter, Connection, InterruptHandle, OptionalExtension, Row, Transaction,
    TransactionBehavior,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::AppConfig;
use crate::db::{configure_sqlite_connection, DEFAULT_BUSY_TIMEOUT_MS};
use crate::perf::{install_sqlite_profiling, PerfGuard};
use crate::repository::error::{RepositoryError, RepositoryResult};

/// 文本参数
pub fn text_param(text: &str) -> Value {
    Value::Text(text.to_owned())
}

// ==========================================
// GatewaySettings - 连接参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySettings {
    pub busy_timeout: Duration,
    /// 慢 SQL 阈值（毫秒），0 表示关闭
    pub slow_sql_ms: u64,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
            slow_sql_ms: 0,
        }
    }
}

impl From<&AppConfig> for GatewaySettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            busy_timeout: config.busy_timeout(),
            slow_sql_ms: config.slow_sql_ms,
        }
    }
}

// ==========================================
// 取消支持
// ==========================================
// blocking 线程打开连接后登记 InterruptHandle；
// 调用方 future 被丢弃时 Guard 置位并中断。两边在同一把锁下读写，
// 因此要么 Guard 先置位（线程看到后直接放弃），要么线程先登记（Guard 中断它）。
// sqlite3_interrupt 只对正在执行的语句生效，语句之间到达的取消由 CancelToken 检查。
#[derive(Default)]
struct CancelSlot {
    cancelled: bool,
    handle: Option<InterruptHandle>,
}

/// 调用方取消信号（在 blocking 线程内读取）
#[derive(Clone)]
pub struct CancelToken {
    slot: Arc<Mutex<CancelSlot>>,
}

impl CancelToken {
    fn lock(&self) -> RepositoryResult<std::sync::MutexGuard<'_, CancelSlot>> {
        self.slot
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn is_cancelled(&self) -> bool {
        self.lock().map(|slot| slot.cancelled).unwrap_or(true)
    }

    /// 已取消时返回 Interrupted
    pub fn check(&self) -> RepositoryResult<()> {
        if self.is_cancelled() {
            return Err(RepositoryError::Interrupted);
        }
        Ok(())
    }

    /// 未取消才提交；检查与提交在同一把锁下，取消要么早于提交（回滚），要么晚于提交完成
    fn commit(&self, tx: Transaction<'_>) -> RepositoryResult<()> {
        let slot = self.lock()?;
        if slot.cancelled {
            // tx 在此 drop，自动回滚
            return Err(RepositoryError::Interrupted);
        }
        let result = tx.commit().map_err(|e| match RepositoryError::from(e) {
            RepositoryError::Interrupted => RepositoryError::Interrupted,
            other => RepositoryError::DatabaseTransactionError(other.to_string()),
        });
        drop(slot);
        result
    }
}

struct InterruptGuard {
    op: &'static str,
    slot: Arc<Mutex<CancelSlot>>,
    armed: bool,
}

impl InterruptGuard {
    fn new(op: &'static str, slot: Arc<Mutex<CancelSlot>>) -> Self {
        Self {
            op,
            slot,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Ok(mut slot) = self.slot.lock() {
            slot.cancelled = true;
            if let Some(handle) = slot.handle.as_ref() {
                handle.interrupt();
            }
        }
        tracing::debug!(op = self.op, "调用已取消，中断进行中的 SQL");
    }
}

// ==========================================
// StorageGateway - 存储网关
// ==========================================
/// 存储网关
///
/// 只持有数据库路径和连接参数，可廉价 Clone、跨任务共享
#[derive(Debug, Clone)]
pub struct StorageGateway {
    db_path: Arc<str>,
    settings: GatewaySettings,
}

impl StorageGateway {
    /// 使用默认连接参数创建网关
    pub fn new(db_path: impl Into<String>) -> Self {
        Self::with_settings(db_path, GatewaySettings::default())
    }

    pub fn with_settings(db_path: impl Into<String>, settings: GatewaySettings) -> Self {
        Self {
            db_path: Arc::from(db_path.into()),
            settings,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::with_settings(config.db_path.clone(), GatewaySettings::from(config))
    }

    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// 打开并配置一个短生命周期连接
    fn open(&self) -> RepositoryResult<Connection> {
        let mut conn = Connection::open(&*self.db_path).map_err(|e| {
            RepositoryError::DatabaseConnectionError(format!("{}: {}", self.db_path, e))
        })?;
        configure_sqlite_connection(&conn, self.settings.busy_timeout)?;
        install_sqlite_profiling(&mut conn, self.settings.slow_sql_ms);
        Ok(conn)
    }

    /// 在独立连接上执行一段同步数据库逻辑
    ///
    /// 逻辑运行在 tokio blocking 线程池；连接在闭包返回后立即释放。
    /// 返回的 future 被丢弃（超时/取消）时，进行中的 SQL 以 SQLITE_INTERRUPT 结束。
    pub async fn with_connection<T, E, F>(&self, op: &'static str, f: F) -> Result<T, E>
    where
        T: Send + 'static,
        E: From<RepositoryError> + Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, E> + Send + 'static,
    {
        self.run_cancellable(op, move |conn, _cancel| f(conn)).await
    }

    async fn run_cancellable<T, E, F>(&self, op: &'static str, f: F) -> Result<T, E>
    where
        T: Send + 'static,
        E: From<RepositoryError> + Send + 'static,
        F: FnOnce(&mut Connection, &CancelToken) -> Result<T, E> + Send + 'static,
    {
        let gateway = self.clone();
        let slot = Arc::new(Mutex::new(CancelSlot::default()));
        let guard = InterruptGuard::new(op, Arc::clone(&slot));
        let cancel = CancelToken { slot };

        let task = tokio::task::spawn_blocking(move || -> Result<T, E> {
            let _perf = PerfGuard::new(op);
            let mut conn = gateway.open()?;
            {
                let mut slot = cancel.lock()?;
                if slot.cancelled {
                    return Err(RepositoryError::Interrupted.into());
                }
                slot.handle = Some(conn.get_interrupt_handle());
            }
            f(&mut conn, &cancel)
        });

        let joined = task.await;
        guard.disarm();

        match joined {
            Ok(result) => result,
            Err(e) => Err(RepositoryError::InternalError(format!("{} 后台任务异常: {}", op, e)).into()),
        }
    }

    /// 多行查询
    pub async fn query<T, F>(&self, sql: &str, params: Vec<Value>, map: F) -> RepositoryResult<Vec<T>>
    where
        T: Send + 'static,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T> + Send + 'static,
    {
        let sql = sql.to_owned();
        self.with_connection("gateway.query", move |conn| -> RepositoryResult<Vec<T>> {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(params.iter()), map)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
        .await
    }

    /// 单行查询；无结果返回 NotFound
    pub async fn query_row<T, F>(&self, sql: &str, params: Vec<Value>, map: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T> + Send + 'static,
    {
        let sql = sql.to_owned();
        self.with_connection("gateway.query_row", move |conn| -> RepositoryResult<T> {
            Ok(conn.query_row(&sql, params_from_iter(params.iter()), map)?)
        })
        .await
    }

    /// 单行查询；无结果返回 None
    pub async fn query_optional<T, F>(
        &self,
        sql: &str,
        params: Vec<Value>,
        map: F,
    ) -> RepositoryResult<Option<T>>
    where
        T: Send + 'static,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T> + Send + 'static,
    {
        let sql = sql.to_owned();
        self.with_connection("gateway.query_optional", move |conn| -> RepositoryResult<Option<T>> {
            Ok(conn
                .query_row(&sql, params_from_iter(params.iter()), map)
                .optional()?)
        })
        .await
    }

    /// 执行写语句，返回受影响行数
    pub async fn execute(&self, sql: &str, params: Vec<Value>) -> RepositoryResult<usize> {
        let sql = sql.to_owned();
        self.with_connection("gateway.execute", move |conn| -> RepositoryResult<usize> {
            Ok(conn.execute(&sql, params_from_iter(params.iter()))?)
        })
        .await
    }

    /// 在 IMMEDIATE 事务中执行闭包
    ///
    /// 闭包返回 Ok 且调用方未取消时提交；返回 Err、中途被中断或已取消时回滚。
    /// 多步写入可在步骤之间调用 `cancel.check()` 提前放弃。
    pub async fn transaction<T, E, F>(&self, op: &'static str, f: F) -> Result<T, E>
    where
        T: Send + 'static,
        E: From<RepositoryError> + Send + 'static,
        F: FnOnce(&Transaction<'_>, &CancelToken) -> Result<T, E> + Send + 'static,
    {
        self.run_cancellable(op, move |conn, cancel| -> Result<T, E> {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(RepositoryError::from)?;
            cancel.check()?;
            let value = f(&tx, cancel)?;
            cancel.commit(tx)?;
            Ok(value)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use tempfile::NamedTempFile;

    const LONG_SQL: &str = "WITH RECURSIVE c(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM c WHERE x < 2000000000) SELECT COUNT(*) FROM c";

    fn setup() -> (NamedTempFile, StorageGateway) {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT NOT NULL);")
            .unwrap();
        (file, StorageGateway::new(path))
    }

    #[tokio::test]
    async fn test_execute_and_query() {
        let (_file, gateway) = setup();

        let n = gateway
            .execute(
                "INSERT INTO t (id, name) VALUES (?1, ?2), (?3, ?4)",
                vec![Value::from(1_i64), text_param("a"), Value::from(2_i64), text_param("b")],
            )
            .await
            .unwrap();
        assert_eq!(n, 2);

        let names = gateway
            .query("SELECT name FROM t ORDER BY id", vec![], |r| r.get::<_, String>(0))
            .await
            .unwrap();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn test_query_row_not_found() {
        let (_file, gateway) = setup();

        let err = gateway
            .query_row("SELECT name FROM t WHERE id = ?1", vec![Value::from(7_i64)], |r| {
                r.get::<_, String>(0)
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));

        let none = gateway
            .query_optional("SELECT name FROM t WHERE id = ?1", vec![Value::from(7_i64)], |r| {
                r.get::<_, String>(0)
            })
            .await
            .unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_syntax_error_surfaces() {
        let (_file, gateway) = setup();
        let err = gateway.execute("INSERT INTO nowhere VALUES (1)", vec![]).await.unwrap_err();
        assert!(matches!(err, RepositoryError::DatabaseQueryError(_)));
    }

    #[tokio::test]
    async fn test_transaction_rolls_back_on_error() {
        let (_file, gateway) = setup();

        let result: RepositoryResult<()> = gateway
            .transaction("test.rollback", |tx, _cancel| {
                tx.execute("INSERT INTO t (id, name) VALUES (1, 'x')", [])?;
                Err(RepositoryError::InternalError("abort".to_string()))
            })
            .await;
        assert!(result.is_err());

        let count = gateway
            .query_row("SELECT COUNT(*) FROM t", vec![], |r| r.get::<_, i64>(0))
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_unreachable_store() {
        let gateway = StorageGateway::new("/nonexistent-dir/for/sure/db.sqlite");
        let err = gateway.execute("SELECT 1", vec![]).await.unwrap_err();
        assert!(matches!(err, RepositoryError::DatabaseConnectionError(_)));
    }

    #[tokio::test]
    async fn test_dropped_future_interrupts_statement() {
        let (_file, gateway) = setup();
        let (tx, rx) = mpsc::channel();

        let fut = gateway.with_connection("test.long", move |conn| -> RepositoryResult<i64> {
            let result: RepositoryResult<i64> = conn
                .query_row(LONG_SQL, [], |r| r.get(0))
                .map_err(RepositoryError::from);
            let _ = tx.send(matches!(result, Err(RepositoryError::Interrupted)));
            result
        });

        let timed = tokio::time::timeout(Duration::from_millis(100), fut).await;
        assert!(timed.is_err());

        match rx.recv_timeout(Duration::from_secs(30)) {
            Ok(interrupted) => assert!(interrupted),
            // 取消早于连接登记，闭包未执行
            Err(mpsc::RecvTimeoutError::Disconnected) => {}
            Err(mpsc::RecvTimeoutError::Timeout) => panic!("statement was not interrupted"),
        }
    }

    #[tokio::test]
    async fn test_cancel_between_statements_rolls_back() {
        let (_file, gateway) = setup();

        let fut = gateway.transaction("test.slow_write", |tx, _cancel| -> RepositoryResult<()> {
            tx.execute("INSERT INTO t (id, name) VALUES (1, 'first')", [])?;
            // 取消在两条语句之间到达，此时没有语句可中断
            std::thread::sleep(Duration::from_millis(300));
            tx.execute("INSERT INTO t (id, name) VALUES (2, 'second')", [])?;
            Ok(())
        });

        let timed = tokio::time::timeout(Duration::from_millis(100), fut).await;
        assert!(timed.is_err());

        // IMMEDIATE 事务要等前一个写事务结束才能开始
        let count = gateway
            .transaction("test.barrier", |tx, _cancel| -> RepositoryResult<i64> {
                Ok(tx.query_row("SELECT COUNT(*) FROM t", [], |r| r.get(0))?)
            })
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_check_between_steps_stops_early() {
        let (_file, gateway) = setup();
        let (tx_done, rx_done) = mpsc::channel();

        let fut = gateway.transaction("test.checked_write", move |tx, cancel| -> RepositoryResult<()> {
            tx.execute("INSERT INTO t (id, name) VALUES (1, 'first')", [])?;
            std::thread::sleep(Duration::from_millis(300));
            let checked = cancel.check();
            let _ = tx_done.send(matches!(checked, Err(RepositoryError::Interrupted)));
            checked?;
            tx.execute("INSERT INTO t (id, name) VALUES (2, 'second')", [])?;
            Ok(())
        });

        let timed = tokio::time::timeout(Duration::from_millis(100), fut).await;
        assert!(timed.is_err());
        assert!(rx_done.recv_timeout(Duration::from_secs(10)).unwrap());

        let count = gateway
            .query_row("SELECT COUNT(*) FROM t", vec![], |r| r.get::<_, i64>(0))
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
