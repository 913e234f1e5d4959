// ==========================================
// 供货合同系统 - 查询参数解析
// ==========================================
// 策略: 查询参数解析失败时回退到默认值，不报错
//   解析成功 → 使用解析值
//   缺省 / 非数值 / 非有限数 → 使用文档化默认值
// ==========================================

use serde::{Deserialize, Serialize};

/// 单价阈值默认值
pub const DEFAULT_PRICE_THRESHOLD: f64 = 100.0;
/// 计划数量阈值默认值
pub const DEFAULT_PLAN_QTY_THRESHOLD: f64 = 1000.0;
/// 单笔到货数量阈值默认值
pub const DEFAULT_DELIVERY_QTY_THRESHOLD: f64 = 50.0;

/// 解析十进制阈值；只接受有限数
pub fn parse_threshold(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// 解析阈值，失败时使用默认值
pub fn threshold_or_default(name: &str, raw: Option<&str>, default: f64) -> f64 {
    match parse_threshold(raw) {
        Some(value) => value,
        None => {
            if let Some(raw) = raw {
                tracing::debug!(param = name, raw, default, "参数无法解析，使用默认值");
            }
            default
        }
    }
}

/// 单价阈值到货查询参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceThresholdParams {
    pub price: f64,
}

impl Default for PriceThresholdParams {
    fn default() -> Self {
        Self {
            price: DEFAULT_PRICE_THRESHOLD,
        }
    }
}

impl PriceThresholdParams {
    pub fn from_raw(price: Option<&str>) -> Self {
        Self {
            price: threshold_or_default("price", price, DEFAULT_PRICE_THRESHOLD),
        }
    }
}

/// 整仓达标合同查询参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BulkWarehouseParams {
    pub plan_qty: f64,
    pub delivery_qty: f64,
}

impl Default for BulkWarehouseParams {
    fn default() -> Self {
        Self {
            plan_qty: DEFAULT_PLAN_QTY_THRESHOLD,
            delivery_qty: DEFAULT_DELIVERY_QTY_THRESHOLD,
        }
    }
}

impl BulkWarehouseParams {
    pub fn from_raw(plan_qty: Option<&str>, delivery_qty: Option<&str>) -> Self {
        Self {
            plan_qty: threshold_or_default("plan_qty", plan_qty, DEFAULT_PLAN_QTY_THRESHOLD),
            delivery_qty: threshold_or_default(
                "delivery_qty",
                delivery_qty,
                DEFAULT_DELIVERY_QTY_THRESHOLD,
            ),
        }
    }
}
