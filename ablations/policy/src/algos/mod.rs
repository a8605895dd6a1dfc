//! 参与比较的策略.

mod profile;

use bone_berry::prelude::*;
use log::info;
use utils::loader;

pub use profile::Profile;

/// 每个体模上的输出网格.
const GRID: Idx3d = (3, 3, 3);

/// 构型直方图采样策略与欧拉数归一化方式的一种组合.
#[derive(Debug, Clone, Copy)]
pub struct Strategy {
    /// 报告中显示的名称.
    pub name: &'static str,

    /// 直方图采样策略.
    pub policy: SamplingPolicy,

    /// 欧拉数归一化方式.
    pub norm: EulerNorm,
}

/// 全部策略.
pub const STRATEGIES: [Strategy; 4] = [
    Strategy {
        name: "cube/per-volume",
        policy: SamplingPolicy::Cube,
        norm: EulerNorm::PerVolume,
    },
    Strategy {
        name: "cube/averaged",
        policy: SamplingPolicy::Cube,
        norm: EulerNorm::Averaged,
    },
    Strategy {
        name: "sphere/per-volume",
        policy: SamplingPolicy::Sphere,
        norm: EulerNorm::PerVolume,
    },
    Strategy {
        name: "sphere/averaged",
        policy: SamplingPolicy::Sphere,
        norm: EulerNorm::Averaged,
    },
];

impl Strategy {
    /// 在边长为 `edge` 的全部体模上做网格扫描, 统计耗时与结果.
    pub fn run(&self, edge: usize) -> Profile {
        let spec = AnalysisSpec::new(
            vec![Descriptor::Bvtv, Descriptor::Euler],
            (edge / 6).max(2),
            1.0,
            0,
        )
        .with_policy(self.policy)
        .with_euler_norm(self.norm);
        let analyzer = Analyzer::new(spec);

        let mut profile = Profile::new();
        for (name, volume) in loader::phantom_loader(edge) {
            info!("{}: phantom `{name}`...", self.name);
            // 每种策略独占一个线程, 此处使用串行扫描
            profile.scan_start();
            let scan = analyzer.scan_grid(&volume, GRID);
            profile.scan_done(
                scan.failed,
                scan.values.chunks_exact(scan.depth).map(|c| (c[0], c[1])),
            );
        }
        profile.finish()
    }
}
