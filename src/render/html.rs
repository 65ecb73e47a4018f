//! HTML rendering for annotated answers.
//!
//! Plain fragments pass through GFM Markdown; citation fragments become
//! inline `<details>` disclosure widgets listing their sources with an
//! outbound link and a sandboxed preview iframe. Markdown is compiled with
//! safe defaults: raw HTML in the answer text is escaped, since the text is
//! model output.

use markdown::{to_html_with_options, Options as MarkdownOptions};

use crate::grounding::{Fragment, WebSource};

/// Render a fragment sequence to an HTML string.
pub fn render_fragments(fragments: &[Fragment]) -> String {
    let mut html = String::new();
    for fragment in fragments {
        match fragment {
            Fragment::Plain { text } => {
                if text.trim().is_empty() {
                    // Whitespace between citations carries no markup; keep
                    // the characters without invoking the compiler
                    html.push_str(&escape_html(text));
                } else {
                    html.push_str(&render_markdown(text));
                }
            }
            Fragment::Citation { text, sources } => {
                html.push_str(&render_citation(text, sources));
            }
        }
    }
    html
}

/// Compile one block of Markdown to HTML
fn render_markdown(text: &str) -> String {
    let options = markdown_options();
    to_html_with_options(text, &options).unwrap_or_else(|_| escape_html(text))
}

/// Compile Markdown and unwrap a single enclosing paragraph, for inline
/// positions like the citation trigger
fn render_inline_markdown(text: &str) -> String {
    let html = render_markdown(text);
    let trimmed = html.trim();
    match trimmed
        .strip_prefix("<p>")
        .and_then(|rest| rest.strip_suffix("</p>"))
    {
        // Only unwrap when the whole output was one paragraph
        Some(inner) if !inner.contains("<p>") => inner.to_string(),
        _ => trimmed.to_string(),
    }
}

fn markdown_options() -> MarkdownOptions {
    // GFM defaults keep dangerous HTML and protocols off, which is what we
    // want for model output
    MarkdownOptions::gfm()
}

fn render_citation(text: &str, sources: &[WebSource]) -> String {
    let mut html = String::new();
    html.push_str(r#"<details class="citation"><summary class="citation-trigger">"#);
    html.push_str(&render_inline_markdown(text));
    html.push_str(r#"</summary><div class="citation-panel"><h4>Cited Sources</h4>"#);

    if sources.is_empty() {
        html.push_str(r#"<p class="citation-empty">No specific sources cited for this segment.</p>"#);
    } else {
        for source in sources {
            html.push_str(&render_source(source));
        }
    }

    html.push_str("</div></details>");
    html
}

fn render_source(source: &WebSource) -> String {
    let title = escape_html(&source.display_title());
    let uri = escape_html(&source.uri);
    format!(
        concat!(
            r#"<div class="citation-source">"#,
            r#"<p class="citation-source-title">{title}</p>"#,
            r#"<a href="{uri}" target="_blank" rel="noopener noreferrer">Open</a>"#,
            r#"<iframe src="{uri}" title="Preview: {title}" loading="lazy" "#,
            r#"sandbox="allow-scripts allow-same-origin"></iframe>"#,
            r#"</div>"#
        ),
        title = title,
        uri = uri,
    )
}

/// Escape text for interpolation into HTML content or attribute values
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn citation(text: &str, sources: Vec<WebSource>) -> Fragment {
        Fragment::Citation {
            text: text.to_string(),
            sources,
        }
    }

    fn plain(text: &str) -> Fragment {
        Fragment::Plain {
            text: text.to_string(),
        }
    }

    fn source(uri: &str, title: Option<&str>) -> WebSource {
        WebSource {
            uri: uri.to_string(),
            title: title.map(str::to_string),
        }
    }

    #[test]
    fn test_plain_markdown_renders() {
        let html = render_fragments(&[plain("Some **bold** text")]);
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_raw_html_in_answer_is_escaped() {
        let html = render_fragments(&[plain("see <script>alert(1)</script>")]);
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_citation_lists_sources() {
        let html = render_fragments(&[citation(
            "Sky is Blue",
            vec![source("https://example.com/sky", Some("Sky Facts"))],
        )]);
        assert!(html.contains("Sky is Blue"));
        assert!(html.contains("Sky Facts"));
        assert!(html.contains(r#"href="https://example.com/sky""#));
        assert!(html.contains("sandbox=\"allow-scripts allow-same-origin\""));
    }

    #[test]
    fn test_citation_without_sources_shows_marker() {
        let html = render_fragments(&[citation("orphan claim", vec![])]);
        assert!(html.contains("No specific sources cited for this segment."));
    }

    #[test]
    fn test_citation_trigger_is_inline() {
        let html = render_fragments(&[citation("has **emphasis**", vec![])]);
        let summary_start = html.find("<summary").unwrap();
        let summary_end = html.find("</summary>").unwrap();
        let summary = &html[summary_start..summary_end];
        assert!(summary.contains("<strong>emphasis</strong>"));
        assert!(!summary.contains("<p>"));
    }

    #[test]
    fn test_source_title_falls_back_to_host() {
        let html = render_fragments(&[citation(
            "x",
            vec![source("https://docs.example.com/page", None)],
        )]);
        assert!(html.contains("docs.example.com"));
    }

    #[test]
    fn test_whitespace_fragment_preserved() {
        let html = render_fragments(&[citation("a", vec![]), plain(" "), citation("b", vec![])]);
        assert!(html.contains("</details> <details"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;"
        );
    }
}
