// ==========================================
// 学生数据处理管道 - 命令行入口
// ==========================================
// 子命令: generate / convert / import / list / export
// 输出: JSON 响应（stdout），日志输出到 stderr
// ==========================================

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use student_pipeline::api::validator::validate_page;
use student_pipeline::domain::page::{DEFAULT_EXPORT_PAGE_SIZE, DEFAULT_PAGE_SIZE};
use student_pipeline::{
    logging, AppConfig, DataApi, ExportRequest, SqliteStudentRepository, StudentApi, StudentFilter,
};

#[derive(Parser, Debug)]
#[command(name = "student-pipeline", version, about = "学生数据处理管道")]
struct Cli {
    /// JSON 配置文件（缺省时使用默认值 + 环境变量）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 以 JSON 行格式输出日志
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 生成模拟数据 Excel
    Generate {
        #[arg(long)]
        count: i64,
    },
    /// Excel 转 CSV
    Convert { xlsx: PathBuf },
    /// CSV 导入数据库
    Import { csv: PathBuf },
    /// 分页查询
    List {
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        size: u32,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// 导出
    Export {
        #[arg(long)]
        format: String,
        /// 指定页码时只导出该页
        #[arg(long)]
        page: Option<u32>,
        #[arg(long, default_value_t = DEFAULT_EXPORT_PAGE_SIZE)]
        size: u32,
        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// 学号
    #[arg(long)]
    id: Option<i64>,
    /// 班级
    #[arg(long)]
    class: Option<String>,
    /// 名 / 姓关键字
    #[arg(long)]
    search: Option<String>,
}

impl From<FilterArgs> for StudentFilter {
    fn from(args: FilterArgs) -> Self {
        StudentFilter {
            student_id: args.id,
            class_label: args.class,
            search: args.search,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.json_logs {
        logging::init_json();
    } else {
        logging::init();
    }

    let config = match &cli.config {
        Some(path) => AppConfig::from_json_file(path),
        None => AppConfig::from_env(),
    }
    .context("加载配置失败")?;
    config.ensure_dirs().context("创建数据目录失败")?;

    tracing::info!(
        version = student_pipeline::VERSION,
        db = %config.db_path.display(),
        data_dir = %config.data_dir.display(),
        "{} 启动",
        student_pipeline::APP_NAME
    );

    let repo = Arc::new(SqliteStudentRepository::new(&config.db_path_str()).context("打开数据库失败")?);

    match cli.command {
        Command::Generate { count } => {
            print_json(&DataApi::new(repo, &config).generate(count)?)?;
        }
        Command::Convert { xlsx } => {
            let file = File::open(&xlsx).with_context(|| format!("无法打开 {}", xlsx.display()))?;
            print_json(&DataApi::new(repo, &config).convert_excel_to_csv(file)?)?;
        }
        Command::Import { csv } => {
            let file = File::open(&csv).with_context(|| format!("无法打开 {}", csv.display()))?;
            print_json(&DataApi::new(repo, &config).upload_csv(file)?)?;
        }
        Command::List { page, size, filter } => {
            let request = validate_page(page, size)?;
            let api = StudentApi::from_config(repo, &config);
            print_json(&api.list_students(&filter.into(), request)?)?;
        }
        Command::Export {
            format,
            page,
            size,
            filter,
        } => {
            let page = page.map(|p| validate_page(p, size)).transpose()?;
            let api = StudentApi::from_config(repo, &config);
            let request = ExportRequest {
                format,
                criteria: filter.into(),
                page,
            };
            print_json(&api.export_students(&request)?)?;
        }
    }

    Ok(())
}
