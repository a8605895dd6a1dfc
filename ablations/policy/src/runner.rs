//! 程序运行函数.

use crate::algos::{Profile, STRATEGIES};
use crate::result::AblationResult;
use log::info;
use std::thread;
use utils::loader;

/// 实际运行. 每种策略独占一个线程.
pub fn run() -> AblationResult {
    let edge = loader::edge_from_env_or_default();
    info!(
        "Running ablation studies on {edge}^3 phantoms with {} strategies ({} cores)...",
        STRATEGIES.len(),
        utils::cpus()
    );

    thread::scope(|s| {
        let handles = STRATEGIES.map(|t| s.spawn(move || t.run(edge)));
        let profiles: Vec<Profile> = handles
            .into_iter()
            .map(|th| th.join().expect("Thread joining error"))
            .collect();
        AblationResult::from_iter(STRATEGIES.iter().map(|t| t.name).zip(profiles))
    })
}
