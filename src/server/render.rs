//! Minimal HTML fragments for form submissions

use crate::pipeline::PipelineOutcome;
use std::fmt::Write;

/// Escape text for inclusion in HTML
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Result card for a handled submission
pub fn render_outcome(outcome: &PipelineOutcome) -> String {
    match outcome {
        PipelineOutcome::Rendered { symptoms, result } => {
            let mut html = String::new();
            let _ = write!(
                html,
                "<div class=\"prediction\" data-id=\"{}\">\n<h2>{}</h2>\n<p class=\"confidence\">{:.1}% confidence</p>\n",
                result.id,
                escape_html(&result.label),
                result.confidence_percent()
            );

            html.push_str("<ul class=\"symptoms\">\n");
            for symptom in symptoms {
                let _ = writeln!(html, "<li>{}</li>", escape_html(symptom));
            }
            html.push_str("</ul>\n<ol class=\"alternatives\">\n");
            for score in &result.ranked {
                let _ = writeln!(
                    html,
                    "<li>{} <span>{:.1}%</span></li>",
                    escape_html(&score.label),
                    score.probability * 100.0
                );
            }
            html.push_str("</ol>\n");

            if let Some(skew) = &result.version_skew {
                let _ = writeln!(
                    html,
                    "<p class=\"warning\">Model serialized with {}, read with {}</p>",
                    escape_html(&skew.artifact),
                    escape_html(&skew.reader)
                );
            }
            let _ = writeln!(
                html,
                "<p class=\"model\">model {}</p>\n</div>",
                escape_html(&result.model_version)
            );
            html
        }
        PipelineOutcome::Failed { kind, message } => {
            format!(
                "<div class=\"prediction error\" data-kind=\"{}\">\n<p>{}</p>\n</div>\n",
                kind.as_str(),
                escape_html(message)
            )
        }
    }
}
