//! Template-based generator that needs no network access.
//!
//! Output is a pure function of the prompt. It follows the outline, lands on
//! the requested word count and places the primary keyword so its density sits
//! at the middle of the target range. The reply is the same JSON a model would
//! send, so it goes through the normal parsing path.

use serde_json::json;

use crate::seo::text::{count_words, keyword_occurrences, slugify, title_case};

use super::{ContentGenerator, GenerationPrompt, GeneratorError, GeneratorResponse};

const SENTENCES_PER_PARAGRAPH: usize = 4;

const KEYWORD_SENTENCES: &[&str] = &[
    "Teams that treat {kw} as an ongoing practice tend to see steadier results.",
    "A clear plan for {kw} keeps everyone focused on the outcomes that matter.",
    "Reviewing your approach to {kw} every quarter helps you spot gaps early.",
    "The right habits around {kw} compound over months rather than days.",
    "Small experiments with {kw} reveal what actually works for your situation.",
    "Document what you learn about {kw} so new colleagues can ramp up quickly.",
];

const FILLER_SENTENCES: &[&str] = &[
    "Start by writing down the problem you want to solve and who feels it most.",
    "Clear goals make it easier to decide what to try first and what to skip.",
    "Most people underestimate how much consistency matters compared to raw effort.",
    "Measure a small number of signals and review them on a fixed schedule.",
    "Simple processes are easier to follow and far easier to improve later.",
    "Ask for feedback early, because assumptions are cheapest to fix at the start.",
    "Budget time for maintenance, since every new tool or habit needs some care.",
    "Share results openly so the whole group can learn from wins and misses alike.",
    "Avoid changing too many things at once or you will not know what helped.",
    "Write short checklists for recurring work to cut down on avoidable mistakes.",
    "Good documentation saves hours of repeated questions over the course of a year.",
    "Revisit old decisions when circumstances change instead of defending them by habit.",
];

const FAQ_ANSWERS: &[&str] = &[
    "It is a set of practices and tools that help people get better results with less wasted \
     effort. Understanding the basics makes every later decision easier.",
    "Pick one small goal, choose a simple tool, and review progress after two weeks. Expand \
     only once the first step feels routine.",
    "The main benefits are clearer priorities, fewer repeated mistakes, and results you can \
     measure and share with others.",
    "The best tools are the ones your group will actually use every day. Start with a short \
     list, trial each option, and keep what sticks.",
];

#[derive(Debug, Clone, Default)]
pub struct OfflineGenerator;

impl OfflineGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl ContentGenerator for OfflineGenerator {
    fn name(&self) -> &str {
        "offline"
    }

    fn generate(&self, prompt: &GenerationPrompt) -> Result<GeneratorResponse, GeneratorError> {
        let keyword = prompt.keywords.primary.trim();
        if keyword.is_empty() {
            return Err(GeneratorError::Malformed("prompt has no primary keyword".to_string()));
        }
        let target = prompt.target_word_count as usize;

        let title = prompt.outline.h1.clone();
        let intro_opening = format!(
            "This guide covers {} from the ground up, with practical steps you can apply today.",
            keyword
        );

        let mut headings: Vec<(String, u8)> = Vec::new();
        for section in &prompt.outline.sections {
            headings.push((section.h2.clone(), 2));
            for h3 in &section.h3 {
                headings.push((h3.clone(), 3));
            }
        }

        let faq: Vec<(String, String)> = prompt
            .questions
            .iter()
            .take(FAQ_ANSWERS.len())
            .zip(FAQ_ANSWERS)
            .map(|(q, a)| (q.clone(), a.to_string()))
            .collect();

        let mut fixed_text = vec![title.clone(), intro_opening.clone()];
        fixed_text.extend(headings.iter().map(|(h, _)| h.clone()));
        for (q, a) in &faq {
            fixed_text.push(q.clone());
            fixed_text.push(a.clone());
        }
        let fixed_text = fixed_text.join("\n\n");
        let fixed_words = count_words(&fixed_text);
        let fixed_hits = keyword_occurrences(&fixed_text, keyword);

        let wanted_hits =
            (target as f64 * prompt.keywords.target_density.midpoint() / 100.0).round() as usize;
        let keyword_lines: Vec<String> = (0..wanted_hits.saturating_sub(fixed_hits))
            .map(|i| KEYWORD_SENTENCES[i % KEYWORD_SENTENCES.len()].replace("{kw}", keyword))
            .collect();

        let mut words = fixed_words + keyword_lines.iter().map(|s| count_words(s)).sum::<usize>();
        let mut filler_lines: Vec<String> = Vec::new();
        let mut i = 0;
        while words < target {
            let sentence = FILLER_SENTENCES[i % FILLER_SENTENCES.len()];
            let len = count_words(sentence);
            let remaining = target - words;
            if len <= remaining {
                filler_lines.push(sentence.to_string());
                words += len;
            } else {
                filler_lines.push(truncate_sentence(sentence, remaining));
                words += remaining;
            }
            i += 1;
        }

        let body = interleave(filler_lines, keyword_lines);
        let (intro_extra, section_paragraphs) = distribute(body, headings.len() + 1);

        let mut introduction = vec![intro_opening];
        introduction.extend(intro_extra);

        let sections: Vec<_> = headings
            .into_iter()
            .zip(section_paragraphs)
            .map(|((heading, level), paragraphs)| {
                json!({ "heading": heading, "level": level, "paragraphs": paragraphs })
            })
            .collect();

        let slug = slugify(keyword);
        let reply = json!({
            "title": title,
            "introduction": introduction,
            "sections": sections,
            "title_tag": format!("{} - Complete Guide", title_case(keyword)),
            "meta_description": format!(
                "Learn everything about {}. Expert guide with tips and strategies.",
                keyword
            ),
            "primary_keyword": keyword,
            "secondary_keywords": prompt.keywords.secondary,
            "internal_links": [
                {
                    "anchor_text": format!("{} tools", keyword),
                    "target_page": format!("{}-tools", slug),
                    "context": "Tools and Resources"
                },
                {
                    "anchor_text": format!("{} strategies", keyword),
                    "target_page": format!("{}-strategies", slug),
                    "context": "Top Strategies"
                },
                {
                    "anchor_text": "common mistakes",
                    "target_page": format!("{}-mistakes", slug),
                    "context": "Best Practices and Tips"
                },
                {
                    "anchor_text": "getting started checklist",
                    "target_page": format!("{}-checklist", slug),
                    "context": "Getting Started"
                },
            ],
            "external_references": [
                {
                    "source_name": "Harvard Business Review",
                    "url": "https://hbr.org",
                    "context": "Research on team practices"
                },
                {
                    "source_name": "Gartner",
                    "url": "https://www.gartner.com",
                    "context": "Industry adoption figures"
                },
                {
                    "source_name": "Pew Research Center",
                    "url": "https://www.pewresearch.org",
                    "context": "Survey data"
                },
            ],
            "faq": faq
                .iter()
                .map(|(q, a)| json!({ "question": q, "answer": a }))
                .collect::<Vec<_>>(),
        });

        Ok(GeneratorResponse {
            text: reply.to_string(),
            usage: None,
        })
    }
}

fn truncate_sentence(sentence: &str, words: usize) -> String {
    let mut out = sentence
        .split_whitespace()
        .take(words)
        .collect::<Vec<_>>()
        .join(" ");
    let trimmed = out.trim_end_matches([',', '.']).len();
    out.truncate(trimmed);
    out.push('.');
    out
}

/// Spreads `sparse` evenly through `dense`.
fn interleave(dense: Vec<String>, sparse: Vec<String>) -> Vec<String> {
    let total = dense.len() + sparse.len();
    let sparse_len = sparse.len();
    let mut dense = dense.into_iter();
    let mut sparse = sparse.into_iter();
    let mut taken = 0;
    let mut out = Vec::with_capacity(total);
    for i in 0..total {
        if (taken + 1) * total <= (i + 1) * sparse_len {
            if let Some(s) = sparse.next() {
                out.push(s);
                taken += 1;
                continue;
            }
        }
        if let Some(s) = dense.next().or_else(|| sparse.next()) {
            out.push(s);
        }
    }
    out
}

/// Splits sentences into `slots` contiguous groups of paragraphs. The first
/// group belongs to the introduction.
fn distribute(sentences: Vec<String>, slots: usize) -> (Vec<String>, Vec<Vec<String>>) {
    let per_slot = sentences.len().div_ceil(slots.max(1)).max(1);
    let mut groups: Vec<Vec<String>> = sentences
        .chunks(per_slot)
        .map(|chunk| {
            chunk
                .chunks(SENTENCES_PER_PARAGRAPH)
                .map(|p| p.join(" "))
                .collect()
        })
        .collect();
    groups.resize(slots.max(1), Vec::new());

    let intro = groups.remove(0);
    (intro, groups)
}
