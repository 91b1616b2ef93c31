//! HTML rendering of a draft. All text is escaped.

use crate::generator::ContentDraft;
use crate::seo::article::FaqEntry;

use super::text::escape_html;

fn push_element(out: &mut String, tag: &str, text: &str) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    out.push_str(&escape_html(text.trim()));
    out.push_str("</");
    out.push_str(tag);
    out.push_str(">\n");
}

/// Renders the FAQ block: an `h2` heading followed by question/answer pairs.
pub fn render_faq(faq: &[FaqEntry]) -> String {
    if faq.is_empty() {
        return String::new();
    }

    let mut out = String::from("<section class=\"faq\">\n");
    push_element(&mut out, "h2", "Frequently Asked Questions");
    for entry in faq {
        push_element(&mut out, "h3", &entry.question);
        push_element(&mut out, "p", &entry.answer);
    }
    out.push_str("</section>\n");
    out
}

/// Renders the full article body with a single `h1` and the FAQ at the end.
///
/// Section levels outside 2..=3 are clamped so the hierarchy stays valid.
pub fn render_article(draft: &ContentDraft) -> String {
    let mut out = String::new();
    push_element(&mut out, "h1", &draft.title);

    for paragraph in draft.introduction.iter().filter(|p| !p.trim().is_empty()) {
        push_element(&mut out, "p", paragraph);
    }

    for section in &draft.sections {
        let tag = if section.level >= 3 { "h3" } else { "h2" };
        push_element(&mut out, tag, &section.heading);
        for paragraph in section.paragraphs.iter().filter(|p| !p.trim().is_empty()) {
            push_element(&mut out, "p", paragraph);
        }
    }

    out.push_str(&render_faq(&draft.faq));
    out
}
