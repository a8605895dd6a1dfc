//! 在规则输出网格上逐格分析.

use itertools::iproduct;
use log::{info, warn};
use ndarray::ArrayView4;

use super::Analyzer;
use crate::data::BinaryVolume;
use crate::error::MorphError;
use crate::{Idx3d, MorphResult};

/// 输出网格第 `i` 格 (共 `out` 格) 在长度为 `size` 的轴上对应的 ROI 球心坐标.
#[inline]
pub fn grid_center(i: usize, size: usize, out: usize) -> usize {
    ((i as f64 + 0.5) * (size - 1) as f64 / out as f64).floor() as usize
}

#[inline]
fn cell_center((iz, iy, ix): Idx3d, shape: Idx3d, out: Idx3d) -> Idx3d {
    (
        grid_center(iz, shape.0, out.0),
        grid_center(iy, shape.1, out.1),
        grid_center(ix, shape.2, out.2),
    )
}

/// 第 `k` 个输出格的 `(z, y, x)` 下标.
#[inline]
fn cell_index(k: usize, out: Idx3d) -> Idx3d {
    (k / (out.1 * out.2), k / out.2 % out.1, k % out.2)
}

/// 网格扫描结果. 数据按 `(z, y, x, 槽位)` 行优先存放.
#[derive(Debug, Clone, PartialEq)]
pub struct GridScan {
    /// 输出网格尺寸 `(z, y, x)`.
    pub output_sizes: Idx3d,

    /// 每格槽位数.
    pub depth: usize,

    /// 全部输出值.
    pub values: Vec<f64>,

    /// 分析失败 (保持为 0) 的格数.
    pub failed: usize,
}

impl GridScan {
    /// 以 `(z, y, x, 槽位)` 形状查看输出.
    pub fn view(&self) -> MorphResult<ArrayView4<'_, f64>> {
        let (z, y, x) = self.output_sizes;
        ArrayView4::from_shape((z, y, x, self.depth), &self.values)
            .map_err(|_| MorphError::ShapeMismatch)
    }

    /// 第 `cell` 格的全部槽位.
    pub fn cell(&self, (iz, iy, ix): Idx3d) -> &[f64] {
        let (_, oy, ox) = self.output_sizes;
        let k = (iz * oy + iy) * ox + ix;
        &self.values[k * self.depth..(k + 1) * self.depth]
    }

    /// 输出格总数.
    #[inline]
    pub fn cells(&self) -> usize {
        let (z, y, x) = self.output_sizes;
        z * y * x
    }
}

impl Analyzer {
    #[inline]
    fn assert_grid(&self, out: Idx3d) -> usize {
        assert!(out.0 > 0 && out.1 > 0 && out.2 > 0, "输出网格尺寸必须为正");
        let depth = self.spec().depth();
        assert!(depth > 0, "至少需要一个描述子");
        depth
    }

    /// 分析单个格子, 失败时记录日志并返回 `false`, `slot` 保持不变.
    fn fill_cell(&self, volume: &BinaryVolume, center: Idx3d, slot: &mut [f64]) -> bool {
        match self.analyze_roi(volume, center) {
            Ok(m) => {
                m.write_slots(self.spec().descriptors(), slot);
                true
            }
            Err(e) => {
                warn!("grid cell at {center:?} skipped: {e}");
                false
            }
        }
    }

    /// 按 z-y-x 顺序逐格分析. 失败的格子保持为 0.
    ///
    /// 如果 `output_sizes` 中存在 0 或者没有请求任何描述子, 则程序 panic.
    pub fn scan_grid(&self, volume: &BinaryVolume, output_sizes: Idx3d) -> GridScan {
        let depth = self.assert_grid(output_sizes);
        let shape = volume.shape();
        let (oz, oy, ox) = output_sizes;
        let mut values = vec![0.0; oz * oy * ox * depth];

        let mut failed = 0;
        for (cell, slot) in iproduct!(0..oz, 0..oy, 0..ox).zip(values.chunks_exact_mut(depth)) {
            let center = cell_center(cell, shape, output_sizes);
            if !self.fill_cell(volume, center, slot) {
                failed += 1;
            }
        }
        info!("grid scan {output_sizes:?}: {failed} cell(s) failed");

        GridScan {
            output_sizes,
            depth,
            values,
            failed,
        }
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use rayon::iter::{IndexedParallelIterator, ParallelIterator};
        use rayon::slice::ParallelSliceMut;
    }
}

/// 并发操作部分
#[cfg(feature = "rayon")]
impl Analyzer {
    /// 借助 `rayon`, 并行地逐格分析. 输出与 [`Analyzer::scan_grid`] 逐位相同.
    ///
    /// 如果 `output_sizes` 中存在 0 或者没有请求任何描述子, 则程序 panic.
    pub fn par_scan_grid(&self, volume: &BinaryVolume, output_sizes: Idx3d) -> GridScan {
        let depth = self.assert_grid(output_sizes);
        let shape = volume.shape();
        let (oz, oy, ox) = output_sizes;
        let mut values = vec![0.0; oz * oy * ox * depth];

        let failed = AtomicUsize::new(0);
        values
            .par_chunks_mut(depth)
            .enumerate()
            .for_each(|(k, slot)| {
                let center = cell_center(cell_index(k, output_sizes), shape, output_sizes);
                if !self.fill_cell(volume, center, slot) {
                    failed.fetch_add(1, Ordering::Release);
                }
            });
        let failed = failed.load(Ordering::Acquire);
        info!("parallel grid scan {output_sizes:?}: {failed} cell(s) failed");

        GridScan {
            output_sizes,
            depth,
            values,
            failed,
        }
    }
}
