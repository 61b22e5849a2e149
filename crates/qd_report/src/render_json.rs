//! JSON renderer: header → overall → cohorts → rankings.
//!
//! Key order is fixed by insertion into `serde_json::Map`, which requires the
//! `preserve_order` feature (enabled at workspace level).

use serde_json::{Map as JsonMap, Value};

use crate::{CohortView, DistributionRow, RankRow, RankingView, ReportView};

/// Build the report object in display order.
pub fn render_json(v: &ReportView) -> Value {
    let mut root = obj();

    // 1) header
    root.insert("answer_id".into(), Value::String(v.answer_id.clone()));
    root.insert("question".into(), question_json(v));
    root.insert("respondent".into(), respondent_json(v));

    // 2) overall
    let mut overall = obj();
    overall.insert("respondents".into(), Value::from(v.total_respondents));
    overall.insert("same_choice_pct".into(), Value::String(v.overall_pct.clone()));
    overall.insert("distribution".into(), distribution_json(&v.overall));
    root.insert("overall".into(), Value::Object(overall));

    // 3) cohorts
    root.insert(
        "cohorts".into(),
        Value::Array(v.cohorts.iter().map(cohort_json).collect()),
    );

    // 4) rankings
    root.insert(
        "rankings".into(),
        Value::Array(v.rankings.iter().map(ranking_json).collect()),
    );

    Value::Object(root)
}

/// `render_json` as pretty text with a trailing newline.
pub fn render_json_string(v: &ReportView) -> String {
    let mut s = serde_json::to_string_pretty(&render_json(v)).unwrap_or_default();
    s.push('\n');
    s
}

/* ----------------------- sections ----------------------- */

fn question_json(v: &ReportView) -> Value {
    // id → date_key → title
    let mut o = obj();
    o.insert("id".into(), Value::String(v.question_id.clone()));
    o.insert("date_key".into(), Value::String(v.date_key.clone()));
    o.insert("title".into(), Value::String(v.title.clone()));
    Value::Object(o)
}

fn respondent_json(v: &ReportView) -> Value {
    let mut o = obj();
    o.insert("user_id".into(), Value::String(v.user_id.clone()));
    o.insert("nickname".into(), Value::String(v.nickname.clone()));

    let mut chosen = obj();
    chosen.insert("id".into(), Value::String(v.chosen.id.clone()));
    chosen.insert("text".into(), Value::String(v.chosen.text.clone()));
    o.insert("chosen".into(), Value::Object(chosen));
    Value::Object(o)
}

fn cohort_json(c: &CohortView) -> Value {
    // dimension → value → population → same_choice_pct → distribution
    let mut o = obj();
    o.insert("dimension".into(), Value::String(c.dimension.as_str().to_string()));
    o.insert(
        "value".into(),
        c.value.as_ref().map_or(Value::Null, |s| Value::String(s.clone())),
    );
    o.insert("population".into(), Value::from(c.population));
    o.insert("same_choice_pct".into(), Value::String(c.pct.clone()));
    o.insert("distribution".into(), distribution_json(&c.distribution));
    Value::Object(o)
}

fn ranking_json(r: &RankingView) -> Value {
    let mut o = obj();
    o.insert("dimension".into(), Value::String(r.dimension.as_str().to_string()));
    o.insert(
        "entries".into(),
        Value::Array(r.rows.iter().map(rank_row_json).collect()),
    );
    Value::Object(o)
}

/* ----------------------- helpers ----------------------- */

#[inline]
fn obj() -> JsonMap<String, Value> {
    JsonMap::new()
}

fn distribution_json(rows: &[DistributionRow]) -> Value {
    Value::Array(
        rows.iter()
            .map(|r| {
                let mut o = obj();
                o.insert("option_id".into(), Value::String(r.option_id.clone()));
                o.insert("text".into(), Value::String(r.text.clone()));
                o.insert("count".into(), Value::from(r.count));
                o.insert("pct".into(), Value::String(r.pct.clone()));
                Value::Object(o)
            })
            .collect(),
    )
}

fn rank_row_json(r: &RankRow) -> Value {
    let mut o = obj();
    o.insert("position".into(), Value::from(r.position as u64));
    o.insert("value".into(), Value::String(r.value.clone()));
    o.insert("option_id".into(), Value::String(r.option_id.clone()));
    o.insert("option_text".into(), Value::String(r.option_text.clone()));
    o.insert("count".into(), Value::from(r.count));
    o.insert("group_size".into(), Value::from(r.group_size));
    o.insert("pct".into(), Value::String(r.pct.clone()));
    Value::Object(o)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture;

    fn view() -> ReportView {
        ReportView::from_report(&fixture::report(), 1)
    }

    #[test]
    fn top_level_keys_keep_display_order() {
        let v = render_json(&view());
        let keys: Vec<&str> = v.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["answer_id", "question", "respondent", "overall", "cohorts", "rankings"]);
    }

    #[test]
    fn cohorts_and_rankings_are_rendered() {
        let v = render_json(&view());
        assert_eq!(v["overall"]["same_choice_pct"], "66.7%");
        assert_eq!(v["cohorts"][0]["dimension"], "mbti");
        assert_eq!(v["cohorts"][0]["value"], "INFP");
        assert!(v["cohorts"][1]["value"].is_null());
        assert_eq!(v["rankings"][0]["entries"][0]["value"], "ESTJ");
        assert_eq!(v["rankings"][1]["dimension"], "region");
        assert_eq!(v["rankings"][1]["entries"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn string_form_ends_with_newline() {
        let s = render_json_string(&view());
        assert!(s.starts_with("{\n  \"answer_id\": \"a1\""));
        assert!(s.ends_with("}\n"));
    }
}
