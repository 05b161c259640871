use std::collections::HashMap;
use std::fmt::Write;

use axum::{extract::State, response::Html};

use crate::app_state::AppState;
use crate::error::ApiError;

/// `GET /`: read-only listing of every metric.
pub async fn index(State(app): State<AppState>) -> Result<Html<String>, ApiError> {
    let (counters, gauges) = app.store().export_all()?;
    Ok(Html(render_index(&counters, &gauges)))
}

pub fn render_index(counters: &HashMap<String, i64>, gauges: &HashMap<String, f64>) -> String {
    let mut counters: Vec<_> = counters.iter().collect();
    counters.sort();
    let mut gauges: Vec<_> = gauges.iter().collect();
    gauges.sort_by(|a, b| a.0.cmp(b.0));

    let mut out = String::from(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n<title>Metrics</title>\n</head>\n<body>\n",
    );
    out.push_str("<h1>Counters</h1>\n<ul>\n");
    for (name, value) in counters {
        let _ = writeln!(out, "<li>{}: {}</li>", escape_html(name), value);
    }
    out.push_str("</ul>\n<h1>Gauges</h1>\n<ul>\n");
    for (name, value) in gauges {
        let _ = writeln!(out, "<li>{}: {:.3}</li>", escape_html(name), value);
    }
    out.push_str("</ul>\n</body>\n</html>\n");
    out
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_sorted_and_escaped() {
        let counters = HashMap::from([("b".to_string(), 2), ("a".to_string(), 1)]);
        let gauges = HashMap::from([("<x>".to_string(), 1.5)]);
        let html = render_index(&counters, &gauges);

        let a = html.find("<li>a: 1</li>").unwrap();
        let b = html.find("<li>b: 2</li>").unwrap();
        assert!(a < b);
        assert!(html.contains("<li>&lt;x&gt;: 1.500</li>"));
    }
}
