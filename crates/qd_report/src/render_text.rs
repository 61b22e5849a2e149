//! Plain-text renderer for terminals. Deterministic, no colour, no locale.

use std::fmt::Write;

use crate::{CohortView, DistributionRow, RankingView, ReportView};

// ------------------------- text builder -------------------------

pub struct TextBuilder {
    buf: String,
}

impl Default for TextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBuilder {
    pub fn new() -> Self {
        Self { buf: String::with_capacity(4 * 1024) }
    }

    pub fn finish(self) -> String {
        self.buf
    }

    /// Title line plus who answered what.
    pub fn section_header(&mut self, v: &ReportView) {
        let _ = writeln!(self.buf, "[{}] {}", v.date_key, v.title);
        let _ = writeln!(self.buf, "{} answered: {}", v.nickname, v.chosen.text);
    }

    pub fn section_overall(&mut self, v: &ReportView) {
        let _ = writeln!(self.buf);
        let _ = writeln!(
            self.buf,
            "Overall: {} of {} respondents chose the same",
            v.overall_pct, v.total_respondents
        );
        self.distribution(&v.overall);
    }

    pub fn section_cohort(&mut self, c: &CohortView) {
        let _ = writeln!(self.buf);
        match &c.value {
            Some(value) => {
                let _ = writeln!(
                    self.buf,
                    "By {} ({}): {} of {} chose the same",
                    c.dimension, value, c.pct, c.population
                );
                self.distribution(&c.distribution);
            }
            None => {
                let _ = writeln!(self.buf, "By {}: not available", c.dimension);
            }
        }
    }

    pub fn section_ranking(&mut self, r: &RankingView) {
        let _ = writeln!(self.buf);
        let _ = writeln!(self.buf, "Ranking by {}:", r.dimension);
        if r.rows.is_empty() {
            let _ = writeln!(self.buf, "  (no data)");
            return;
        }
        for row in &r.rows {
            let _ = writeln!(
                self.buf,
                "  {:>2}. {:<8} {:<16} {:>8} ({}/{})",
                row.position, row.value, row.option_text, row.pct, row.count, row.group_size
            );
        }
    }

    fn distribution(&mut self, rows: &[DistributionRow]) {
        for r in rows {
            let _ = writeln!(self.buf, "  - {:<16} {:>5} {:>8}", r.text, r.count, r.pct);
        }
    }
}

// ------------------------- top-level entry -------------------------

/// Header → overall → cohorts → rankings.
pub fn render_text(v: &ReportView) -> String {
    let mut t = TextBuilder::new();
    t.section_header(v);
    t.section_overall(v);
    for c in &v.cohorts {
        t.section_cohort(c);
    }
    for r in &v.rankings {
        t.section_ranking(r);
    }
    t.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture;

    #[test]
    fn renders_every_section_in_order() {
        let out = render_text(&ReportView::from_report(&fixture::report(), 1));
        let header = out.find("[20240501] Cats or dogs?").unwrap();
        let overall = out.find("Overall: 66.7% of 3 respondents").unwrap();
        let mbti = out.find("By mbti (INFP): 50.0% of 2").unwrap();
        let gender = out.find("By gender: not available").unwrap();
        let ranking = out.find("Ranking by mbti:").unwrap();
        assert!(header < overall && overall < mbti && mbti < gender && gender < ranking);
        assert!(out.contains("kim answered: Cats"));
    }

    #[test]
    fn empty_ranking_says_so() {
        let out = render_text(&ReportView::from_report(&fixture::report(), 1));
        let region = out.find("Ranking by region:").unwrap();
        assert!(out[region..].contains("(no data)"));
    }
}
