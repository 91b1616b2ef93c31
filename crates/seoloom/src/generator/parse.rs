//! Decoding of the model's JSON reply into a [`ContentDraft`].

use serde::Deserialize;

use crate::seo::article::{ExternalReference, FaqEntry, InternalLink};
use crate::seo::text::count_words;

use super::{ContentDraft, DraftSection, GeneratorError, GeneratorResponse};

#[derive(Debug, Deserialize)]
struct DraftPayload {
    title: String,
    #[serde(default)]
    introduction: Vec<String>,
    #[serde(default)]
    sections: Vec<DraftSection>,
    #[serde(default)]
    title_tag: String,
    #[serde(default)]
    meta_description: String,
    #[serde(default)]
    primary_keyword: String,
    #[serde(default)]
    secondary_keywords: Vec<String>,
    #[serde(default)]
    internal_links: Vec<InternalLink>,
    #[serde(default)]
    external_references: Vec<ExternalReference>,
    #[serde(default)]
    faq: Vec<FaqEntry>,
}

/// Removes a surrounding Markdown code fence, with or without a language tag.
pub fn strip_code_fences(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        body = match rest.find('\n') {
            Some(idx) if rest[..idx].chars().all(|c| c.is_ascii_alphanumeric()) => &rest[idx + 1..],
            _ => rest,
        };
        body = body.trim_end();
        body = body.strip_suffix("```").unwrap_or(body);
    }
    body.trim()
}

/// Parses a generator response into a draft.
///
/// `topic` fills in the primary keyword when the model leaves it out.
pub fn parse_draft(
    response: &GeneratorResponse,
    topic: &str,
) -> Result<ContentDraft, GeneratorError> {
    let body = strip_code_fences(&response.text);
    if body.is_empty() {
        return Err(GeneratorError::Empty);
    }

    let payload: DraftPayload =
        serde_json::from_str(body).map_err(|e| GeneratorError::Malformed(e.to_string()))?;

    if payload.title.trim().is_empty() {
        return Err(GeneratorError::Malformed("missing title".to_string()));
    }
    let has_body = payload.introduction.iter().any(|p| !p.trim().is_empty())
        || payload
            .sections
            .iter()
            .any(|s| s.paragraphs.iter().any(|p| !p.trim().is_empty()));
    if !has_body {
        return Err(GeneratorError::Malformed("article has no body text".to_string()));
    }

    let primary_keyword = if payload.primary_keyword.trim().is_empty() {
        topic.to_string()
    } else {
        payload.primary_keyword.trim().to_string()
    };

    let mut draft = ContentDraft {
        title: payload.title.trim().to_string(),
        introduction: payload.introduction,
        sections: payload.sections,
        title_tag: payload.title_tag.trim().to_string(),
        meta_description: payload.meta_description.trim().to_string(),
        primary_keyword,
        secondary_keywords: payload.secondary_keywords,
        internal_links: payload.internal_links,
        external_references: payload.external_references,
        faq: payload.faq,
        word_count: 0,
        usage: response.usage,
    };
    draft.word_count = count_words(&draft.plain_text());

    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Usage;

    const REPLY: &str = r#"{
        "title": "Remote Work Guide",
        "introduction": ["Remote work is here to stay."],
        "sections": [{"heading": "Why", "paragraphs": ["Because it works."]}],
        "title_tag": "Remote Work Guide",
        "meta_description": "All about remote work.",
        "secondary_keywords": ["teams"],
        "internal_links": [{"anchor_text": "tools", "target_page": "remote-tools"}],
        "external_references": [
            {"source_name": "HBR", "url": "https://hbr.org", "context": "stats"}
        ],
        "faq": [{"question": "Is it good?", "answer": "Yes."}]
    }"#;

    fn response(text: &str) -> GeneratorResponse {
        GeneratorResponse {
            text: text.to_string(),
            usage: Some(Usage {
                input_tokens: 10,
                output_tokens: 20,
            }),
        }
    }

    #[test]
    fn test_parse_plain_json() {
        let draft = parse_draft(&response(REPLY), "remote work").unwrap();

        assert_eq!(draft.title, "Remote Work Guide");
        assert_eq!(draft.primary_keyword, "remote work");
        assert_eq!(draft.sections[0].level, 2);
        assert_eq!(draft.internal_links[0].context, "");
        assert_eq!(draft.usage.unwrap().output_tokens, 20);
        // Title 3, intro 6, heading 1, paragraph 3, FAQ 4.
        assert_eq!(draft.word_count, 17);
    }

    #[test]
    fn test_parse_fenced_json() {
        let fenced = format!("```json\n{}\n```", REPLY);
        assert!(parse_draft(&response(&fenced), "remote work").is_ok());

        let bare_fence = format!("```\n{}\n```\n", REPLY);
        assert!(parse_draft(&response(&bare_fence), "remote work").is_ok());
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("```{}```"), "{}");
        assert_eq!(strip_code_fences("  {} "), "{}");
    }

    #[test]
    fn test_empty_reply() {
        assert!(matches!(
            parse_draft(&response("  ```\n```  "), "x"),
            Err(GeneratorError::Empty)
        ));
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        assert!(matches!(
            parse_draft(&response("Sure! Here is your article."), "x"),
            Err(GeneratorError::Malformed(_))
        ));
    }

    #[test]
    fn test_missing_body_is_malformed() {
        let reply =
            r#"{"title": "Only a title", "sections": [{"heading": "H", "paragraphs": [" "]}]}"#;
        assert!(matches!(
            parse_draft(&response(reply), "x"),
            Err(GeneratorError::Malformed(_))
        ));
    }
}
