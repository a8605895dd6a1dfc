//! 策略运行统计.

use std::time::{Duration, Instant};

/// ablation/benchmark 计时器.
///
/// 该计时器支持 "中途中断" 与 "结束中断, 继续开始计时".
#[derive(Clone, Debug)]
struct AccTimer {
    consumed: Duration,
    since: Instant,
}

impl AccTimer {
    /// 初始化计时器. 初始化时会视为已经开始计时 (`self.start()`).
    #[inline]
    fn new() -> Self {
        Self {
            consumed: Duration::ZERO,
            since: Instant::now(),
        }
    }

    /// 开始一轮计时.
    #[inline]
    fn start(&mut self) {
        self.since = Instant::now();
    }

    /// 结束计时, 并将这一区间的时间累加. 返回本轮计时时长.
    ///
    /// # 注意
    ///
    /// 上一次调用必须是 `self.start()`, 否则计算时间值无意义.
    #[inline]
    fn elapsed(&mut self) -> Duration {
        let d = self.since.elapsed();
        self.consumed += d;
        d
    }

    /// 累计时间 (以微秒为单位).
    #[inline]
    fn total_us(&self) -> u64 {
        self.consumed.as_micros() as u64
    }
}

/// 一种策略在全部体模上的运行统计.
#[derive(Clone, Debug)]
pub struct Profile {
    /// 分析失败的 ROI 个数.
    failed: u64,

    /// 成功分析的 ROI 个数.
    analyzed: u64,

    /// 网格扫描花费的总时间.
    scan_time: AccTimer,

    /// 整个任务花费的总时间 (包括体模生成).
    real_time: AccTimer,

    /// 最耗时的一次网格扫描.
    most: Option<Duration>,

    /// 成功 ROI 的 `BV/TV` 之和.
    bvtv_sum: f64,

    /// 成功 ROI 的欧拉数密度之和.
    euler_sum: f64,

    /// 欧拉数密度为正的 ROI 个数.
    positive_euler: u64,
}

impl Profile {
    /// 初始化. 总计时从此刻开始.
    #[inline]
    pub fn new() -> Self {
        Self {
            failed: 0,
            analyzed: 0,
            scan_time: AccTimer::new(),
            real_time: AccTimer::new(),
            most: None,
            bvtv_sum: 0.0,
            euler_sum: 0.0,
            positive_euler: 0,
        }
    }

    /// 开始一次网格扫描计时.
    #[inline]
    pub fn scan_start(&mut self) {
        self.scan_time.start();
    }

    /// 结束一次网格扫描计时, 并记录其结果.
    ///
    /// `cells` 逐格给出 `(BV/TV, 欧拉数密度)`, 其中包含 `failed` 个置 0 的失败格.
    pub fn scan_done<I: IntoIterator<Item = (f64, f64)>>(&mut self, failed: usize, cells: I) {
        let d = self.scan_time.elapsed();
        self.most = Some(self.most.map_or(d, |m| m.max(d)));
        let mut total = 0;
        for (bvtv, euler) in cells {
            total += 1;
            self.bvtv_sum += bvtv;
            self.euler_sum += euler;
            if euler > 0.0 {
                self.positive_euler += 1;
            }
        }
        self.failed += failed as u64;
        self.analyzed += total - failed as u64;
    }

    /// 结束全部计时.
    #[inline]
    pub fn finish(mut self) -> Self {
        self.real_time.elapsed();
        self
    }

    /// 失败的 ROI 个数.
    #[inline]
    pub fn get_failed(&self) -> u64 {
        self.failed
    }

    /// 成功的 ROI 个数.
    #[inline]
    pub fn get_analyzed(&self) -> u64 {
        self.analyzed
    }

    /// 欧拉数密度为正的 ROI 个数.
    #[inline]
    pub fn get_positive_euler(&self) -> u64 {
        self.positive_euler
    }

    /// 以微秒为单位获得网格扫描的总耗时.
    #[inline]
    pub fn get_scan_time_us(&self) -> u64 {
        self.scan_time.total_us()
    }

    /// 以微秒为单位获得整个任务的总耗时.
    #[inline]
    pub fn get_real_time_us(&self) -> u64 {
        self.real_time.total_us()
    }

    #[inline]
    fn average(&self, sum: f64) -> Option<f64> {
        match self.analyzed {
            0 => None,
            n => Some(sum / n as f64),
        }
    }

    /// 以微秒为单位获得单个 ROI (包括失败的) 的平均耗时.
    #[inline]
    pub fn get_avg_roi_time_us(&self) -> Option<f64> {
        match self.analyzed + self.failed {
            0 => None,
            n => Some(self.get_scan_time_us() as f64 / n as f64),
        }
    }

    /// 平均 `BV/TV`.
    #[inline]
    pub fn get_avg_bvtv(&self) -> Option<f64> {
        self.average(self.bvtv_sum)
    }

    /// 平均欧拉数密度.
    #[inline]
    pub fn get_avg_euler(&self) -> Option<f64> {
        self.average(self.euler_sum)
    }

    /// 最耗时的一次网格扫描. 如果没有扫描过任何体模, 则返回 `None`.
    #[inline]
    pub fn get_most_time_consuming(&self) -> Option<Duration> {
        self.most
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new()
    }
}
