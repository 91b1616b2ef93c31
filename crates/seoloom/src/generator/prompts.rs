use crate::serp::analysis::SerpAnalysis;

use super::GenerationPrompt;

const SYSTEM_PROMPT: &str = "You are an experienced SEO content writer. \
You write accurate, engaging long-form articles and always answer with a single JSON object.";

/// Builds the generation prompt for one article from the SERP analysis.
pub fn build_prompt(
    topic: &str,
    language: &str,
    target_word_count: u32,
    analysis: &SerpAnalysis,
) -> GenerationPrompt {
    let outline = &analysis.outline;
    let keywords = &analysis.keywords;

    let sections = outline
        .sections
        .iter()
        .map(|s| {
            let mut block = format!("## {}", s.h2);
            for h3 in &s.h3 {
                block.push_str(&format!("\n### {}", h3));
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let faq_questions = analysis
        .questions
        .iter()
        .map(|q| format!("- {}", q))
        .collect::<Vec<_>>()
        .join("\n");

    let secondary = if keywords.secondary.is_empty() {
        "none".to_string()
    } else {
        keywords.secondary.join(", ")
    };

    let text = format!(
        r#"Write a complete, SEO-optimized article about "{topic}".

OUTLINE:
# {h1}

{sections}

REQUIREMENTS:
- Language: {language}
- Target word count: {target_word_count} words, counting title, body and FAQ
- Write in a natural, engaging style
- Use the exact phrase "{primary}" in the first paragraph
- Keep the density of "{primary}" between {density_min:.1}% and {density_max:.1}% (occurrences per 100 words)
- Work in these secondary keywords where they fit: {secondary}
- Write plain text only inside JSON strings (no HTML, no Markdown)
- Suggest 3-5 internal links and 2-4 authoritative external references
- Answer these questions in the FAQ:
{faq_questions}

OUTPUT FORMAT (a single JSON object):
{{
  "title": "Article title",
  "introduction": ["paragraph", "..."],
  "sections": [
    {{"heading": "Section heading", "level": 2, "paragraphs": ["paragraph", "..."]}},
    {{"heading": "Subsection heading", "level": 3, "paragraphs": ["..."]}}
  ],
  "title_tag": "SEO title under 60 characters",
  "meta_description": "Meta description under 160 characters",
  "primary_keyword": "{primary}",
  "secondary_keywords": ["keyword"],
  "internal_links": [{{"anchor_text": "text", "target_page": "page-slug", "context": "where it fits"}}],
  "external_references": [{{"source_name": "Source", "url": "https://...", "context": "what to cite"}}],
  "faq": [{{"question": "...", "answer": "..."}}]
}}

Respond with the JSON object only."#,
        topic = topic,
        h1 = outline.h1,
        sections = sections,
        language = language,
        target_word_count = target_word_count,
        primary = keywords.primary,
        density_min = keywords.target_density.min,
        density_max = keywords.target_density.max,
        secondary = secondary,
        faq_questions = faq_questions,
    );

    GenerationPrompt {
        topic: topic.to_string(),
        language: language.to_string(),
        target_word_count,
        outline: outline.clone(),
        questions: analysis.questions.clone(),
        keywords: keywords.clone(),
        system: SYSTEM_PROMPT.to_string(),
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serp::{DensityRange, MockSerpSource, SerpAnalyzer, SerpSource};

    fn analysis(topic: &str) -> SerpAnalysis {
        let data = MockSerpSource::default().fetch(topic).unwrap();
        SerpAnalyzer::new(DensityRange::new(1.0, 2.5)).analyze(data)
    }

    #[test]
    fn test_prompt_carries_outline_and_requirements() {
        let prompt = build_prompt("remote work", "en", 1200, &analysis("remote work"));

        assert!(prompt.text.contains("# The Complete Guide to Remote Work"));
        assert!(prompt.text.contains("## What is Remote Work?"));
        assert!(prompt.text.contains("### Key Benefits"));
        assert!(prompt.text.contains("Target word count: 1200 words"));
        assert!(prompt.text.contains("between 1.0% and 2.5%"));
        assert!(prompt.text.contains("- What tools are best for remote work?"));
        assert!(prompt.text.contains(r#""primary_keyword": "remote work""#));
    }

    #[test]
    fn test_prompt_fields() {
        let a = analysis("seo");
        let prompt = build_prompt("seo", "de", 900, &a);

        assert_eq!(prompt.language, "de");
        assert_eq!(prompt.target_word_count, 900);
        assert_eq!(prompt.outline, a.outline);
        assert_eq!(prompt.questions, a.questions);
        assert!(!prompt.system.is_empty());
    }
}
