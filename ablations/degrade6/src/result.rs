//! 实验结果.

use crate::degrade::DegradeProfile;
use std::io::{self, Write};

/// 将 `profile` 的结果写进 `w` 中.
fn describe_into<W: Write>(name: &str, p: &DegradeProfile, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    #[inline]
    fn f64_to_display(f: f64) -> String {
        if f.is_finite() {
            format!("{f:.4}")
        } else {
            "/".to_string()
        }
    }

    writeln!(w, "Degradation `{name}`:")?;
    for (severity, iqm) in p.levels() {
        writeln!(w, "{S4}severity {severity}:")?;
        for (metric, value) in iqm.named() {
            writeln!(w, "{S4}{S4}{metric}: {}", f64_to_display(value))?;
        }
    }
    write!(w, "{S4}Wall time: {} ms", p.wall_ms())?;
    Ok(())
}

/// 消融实验最终结果.
pub struct AblationResult {
    data: Vec<(&'static str, DegradeProfile)>,
}

impl AblationResult {
    pub fn from_iter<I: IntoIterator<Item = (&'static str, DegradeProfile)>>(it: I) -> Self {
        Self {
            data: it.into_iter().collect(),
        }
    }

    /// 分析运行结果.
    pub fn analyze(&self) {
        utils::sep();
        let mut buf = Vec::with_capacity(512);

        for (key, profile) in self.data.iter() {
            describe_into(key, profile, &mut buf).unwrap();
            println!("{}", std::str::from_utf8(&buf).unwrap());
            buf.clear();

            utils::sep();
        }
    }
}
