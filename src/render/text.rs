//! Terminal rendering for annotated answers.
//!
//! Citation spans get bracketed reference numbers and the sources are
//! listed as footnotes. Numbering is per unique URI in order of first
//! appearance; this is a rendering choice on top of the fragment sequence,
//! which itself keeps duplicates.

use crate::grounding::Fragment;

/// Render a fragment sequence as plain text with `[n]` citation markers
/// and a trailing source list.
pub fn render_text(fragments: &[Fragment]) -> String {
    let mut body = String::new();
    // (uri, display title) in first-appearance order
    let mut footnotes: Vec<(String, String)> = Vec::new();

    for fragment in fragments {
        match fragment {
            Fragment::Plain { text } => body.push_str(text),
            Fragment::Citation { text, sources } => {
                body.push_str(text);

                let mut numbers = Vec::new();
                for source in sources {
                    let number = match footnotes.iter().position(|(uri, _)| uri == &source.uri) {
                        Some(index) => index + 1,
                        None => {
                            footnotes.push((source.uri.clone(), source.display_title()));
                            footnotes.len()
                        }
                    };
                    if !numbers.contains(&number) {
                        numbers.push(number);
                    }
                }
                for number in numbers {
                    body.push_str(&format!("[{number}]"));
                }
            }
        }
    }

    if !footnotes.is_empty() {
        body.push_str("\n\nSources:\n");
        for (index, (uri, title)) in footnotes.iter().enumerate() {
            body.push_str(&format!("  [{}] {} <{}>\n", index + 1, title, uri));
        }
    }

    body
}
