//! 构型直方图采样策略 (立方体 / 球形) 与欧拉数归一化方式的消融实验.
//!
//! 体模边长可通过环境变量 `$BONE_PHANTOM_EDGE` 指定.

mod algos;
mod result;
mod runner;

use log::LevelFilter;
use simple_logger::SimpleLogger;

fn main() -> std::io::Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .expect("Logger initialization error");
    runner::run().analyze()
}
