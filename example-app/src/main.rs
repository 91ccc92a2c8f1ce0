//! # 示例应用程序
//!
//! 演示服务注册、依赖注入初始化与按能力解析

use clap::Parser;
use di_abstractions::{InitResult, Initializable, NewInstance, ServiceResolver};
use di_impl::Container;
use parking_lot::RwLock;
use registry_common::ContainerConfig;
use service_macros::Service;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "服务注册表示例应用")]
struct Args {
    /// 容器配置文件路径（toml/json/yaml）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 以 JSON 输出服务元数据
    #[arg(long)]
    describe: bool,
}

/// 问候能力
trait Greeter: Send + Sync {
    fn greet(&self, name: &str) -> String;
}

/// 问候语配置，可创建新实例
#[derive(Debug, Service)]
#[service(cloneable, provides(dyn Greeter))]
struct Salutation {
    prefix: RwLock<String>,
}

impl Salutation {
    fn new(prefix: &str) -> Self {
        Self {
            prefix: RwLock::new(prefix.to_string()),
        }
    }
}

impl Clone for Salutation {
    fn clone(&self) -> Self {
        Self::new(&self.prefix.read())
    }
}

impl Greeter for Salutation {
    fn greet(&self, name: &str) -> String {
        format!("{}, {}!", self.prefix.read(), name)
    }
}

/// 通过能力注入问候服务
#[derive(Default, Service)]
#[service(initializable)]
struct Reception {
    greeter: RwLock<Option<Arc<dyn Greeter>>>,
}

impl Reception {
    fn welcome(&self, name: &str) -> String {
        self.greeter
            .read()
            .as_ref()
            .map_or_else(|| "接待服务尚未初始化".to_string(), |greeter| greeter.greet(name))
    }
}

impl Initializable for Reception {
    type Deps = (Arc<dyn Greeter>,);

    fn init(&self, (greeter,): Self::Deps) -> InitResult {
        *self.greeter.write() = Some(greeter);
        Ok(())
    }
}

/// 持有问候语的独立副本
#[derive(Default, Service)]
#[service(initializable)]
struct Archive {
    salutation: RwLock<Option<Arc<Salutation>>>,
}

impl Initializable for Archive {
    type Deps = (NewInstance, Arc<Salutation>);

    fn init(&self, (_, salutation): Self::Deps) -> InitResult {
        *self.salutation.write() = Some(salutation);
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日志
    tracing_subscriber::fmt()
        .with_max_level(parse_log_level(&args.log_level))
        .init();

    info!("启动服务注册表示例应用");

    let config = ContainerConfig::load(args.config.as_deref())?;
    info!("容器配置: {:?}", config);

    let container = Container::with_config(config);

    // 注册顺序与依赖顺序无关
    container.register_service(Arc::new(Reception::default()));
    container.register_service(Arc::new(Archive::default()));
    container.register_service(Arc::new(Salutation::new("Olá")));

    let report = container.init()?;
    info!("已初始化: {:?}", report.initialized);

    let reception = container.get::<Reception>()?;
    println!("{}", reception.welcome("Maria"));

    // 共享实例的修改对接待服务可见，对副本不可见
    *container.get::<Salutation>()?.prefix.write() = "Bom dia".to_string();
    println!("{}", reception.welcome("Maria"));

    let archive = container.get::<Archive>()?;
    if let Some(copy) = archive.salutation.read().as_ref() {
        println!("{}", copy.greet("Maria"));
    }

    if args.describe {
        println!("{}", serde_json::to_string_pretty(&container.describe())?);
    }

    info!("示例应用结束");
    Ok(())
}

/// 解析日志级别
fn parse_log_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
