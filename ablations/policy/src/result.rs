//! 实验结果.

use crate::algos::Profile;
use std::io::{self, Write};

/// 将 `profile` 的结果写进 `w` 中.
fn describe_into<W: Write>(name: &str, p: &Profile, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    #[inline]
    fn f64_to_display(f: Option<f64>) -> String {
        match f {
            Some(f) => format!("{f:.6}"),
            None => "/".to_string(),
        }
    }

    writeln!(w, "Profile `{name}`:")?;
    writeln!(w, "{S4}Failed ROIs: {}", p.get_failed())?;
    writeln!(w, "{S4}Analyzed ROIs: {}", p.get_analyzed())?;
    writeln!(w, "{S4}ROIs with positive Euler density: {}", p.get_positive_euler())?;
    writeln!(w, "{S4}Average BV/TV: {}", f64_to_display(p.get_avg_bvtv()))?;
    writeln!(w, "{S4}Average Euler density: {}", f64_to_display(p.get_avg_euler()))?;
    writeln!(w, "{S4}Grid scan total time: {} us", p.get_scan_time_us())?;
    writeln!(
        w,
        "{S4}Average time per ROI: {} us",
        f64_to_display(p.get_avg_roi_time_us())
    )?;
    writeln!(w, "{S4}Total machine time: {} us", p.get_real_time_us())?;
    let t = p.get_most_time_consuming().map(|d| d.as_micros() as f64);
    write!(w, "{S4}Most time-consuming grid scan costs {} us", f64_to_display(t))?;
    Ok(())
}

/// 消融实验最终结果.
pub struct AblationResult {
    data: Vec<(&'static str, Profile)>,
}

impl AblationResult {
    pub fn from_iter<I: IntoIterator<Item = (&'static str, Profile)>>(it: I) -> Self {
        Self {
            data: it.into_iter().collect(),
        }
    }

    /// 输出运行结果.
    pub fn analyze(&self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        utils::sep_to(&mut out)?;
        for (key, profile) in self.data.iter() {
            describe_into(key, profile, &mut out)?;
            writeln!(out)?;
            utils::sep_to(&mut out)?;
        }
        Ok(())
    }
}
