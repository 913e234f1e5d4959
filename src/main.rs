// ==========================================
// 供货合同系统 - 命令行入口
// ==========================================
// 用法: supply-contracts [--csv] [--json-log] <命令> [参数...]
// 数据库路径与连接参数来自 AppConfig（配置文件/环境变量）
// 日志写 stderr，结果写 stdout
// ==========================================

use anyhow::{bail, Context, Result};
use serde::Serialize;

use supply_contracts::app::AppState;
use supply_contracts::config::AppConfig;
use supply_contracts::logging;

const USAGE: &str = "\
用法: supply-contracts [--csv] [--json-log] <命令> [参数...]

选项:
  --csv                         列表类命令以 CSV 输出
  --json-log                    日志以 JSON 行写 stderr

命令:
  init                          在当前库上安装 schema
  overview                      仓库 + 合同 + 到货总览（仅 JSON）
  warehouses                    仓库列表
  contracts                     合同列表
  deliveries                    到货列表
  view                          全量到货视图
  q1 [price]                    单价大于 price 的到货（默认 100）
  q2                            单价大于 100 的合同优先级
  q3 [plan_qty] [delivery_qty]  整仓达标合同（默认 1000 / 50）
  summary <contract_no> <part>  合同执行汇总（仅 JSON）
";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Json,
    Csv,
}

/// 命令行解析结果
#[derive(Debug, Default, PartialEq, Eq)]
struct CliArgs {
    format: OutputFormat,
    json_log: bool,
    help: bool,
    args: Vec<String>,
}

fn parse_args(raw: impl IntoIterator<Item = String>) -> CliArgs {
    let mut cli = CliArgs::default();
    for arg in raw {
        match arg.as_str() {
            "--csv" => cli.format = OutputFormat::Csv,
            "--json-log" => cli.json_log = true,
            "-h" | "--help" => cli.help = true,
            _ => cli.args.push(arg),
        }
    }
    cli
}

#[tokio::main]
async fn main() -> Result<()> {
    let CliArgs {
        format,
        json_log,
        help,
        args,
    } = parse_args(std::env::args().skip(1));

    if help {
        print!("{}", USAGE);
        return Ok(());
    }

    if json_log {
        logging::init_json();
    } else {
        logging::init();
    }

    let Some((command, rest)) = args.split_first() else {
        eprint!("{}", USAGE);
        bail!("缺少命令");
    };

    let config = AppConfig::load().context("加载配置失败")?;
    tracing::info!("供货合同系统 {}，数据库: {}", supply_contracts::VERSION, config.db_path);

    let state = AppState::new(&config).map_err(anyhow::Error::msg)?;
    if command != "init" {
        state.check_schema().await?;
    }

    let arg = |i: usize| rest.get(i).map(String::as_str);

    match command.as_str() {
        "init" => {
            state.install_schema().await?;
            eprintln!("schema 已安装: {}", state.db_path);
        }
        "overview" => {
            let overview = state.overview_api.overview().await?;
            print_json(&overview)?;
        }
        "warehouses" => print_rows(format, &state.warehouse_api.list_warehouses().await?)?,
        "contracts" => print_rows(format, &state.contract_api.list_contracts().await?)?,
        "deliveries" => print_rows(format, &state.delivery_api.list_deliveries().await?)?,
        "view" => print_rows(format, &state.delivery_api.list_delivery_view().await?)?,
        "q1" => {
            let rows = state.analytics_api.deliveries_above_price_raw(arg(0)).await?;
            print_rows(format, &rows)?;
        }
        "q2" => print_rows(format, &state.analytics_api.contract_priorities().await?)?,
        "q3" => {
            let rows = state
                .analytics_api
                .contracts_with_bulk_warehouse_raw(arg(0), arg(1))
                .await?;
            print_rows(format, &rows)?;
        }
        "summary" => {
            let (Some(contract_no), Some(part_code)) = (arg(0), arg(1)) else {
                bail!("用法: summary <contract_no> <part_code>");
            };
            let contract_no: i64 = contract_no
                .trim()
                .parse()
                .with_context(|| format!("contract_no 不是整数: {:?}", contract_no))?;
            let summary = state
                .procedure_api
                .contract_summary(contract_no, part_code)
                .await?;
            print_json(&summary)?;
        }
        other => {
            eprint!("{}", USAGE);
            bail!("未知命令: {}", other);
        }
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("序列化 JSON 失败")?;
    println!("{}", text);
    Ok(())
}

fn print_rows<T: Serialize>(format: OutputFormat, rows: &[T]) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(rows),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout().lock());
            for row in rows {
                writer.serialize(row).context("写出 CSV 失败")?;
            }
            writer.flush().context("写出 CSV 失败")?;
            Ok(())
        }
    }
}
