//! Collaborator fakes for driving the orchestrator into specific paths.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde_json::json;

use seoloom::generator::{
    build_prompt, ContentGenerator, GenerationPrompt, GeneratorError, GeneratorResponse,
    OfflineGenerator,
};
use seoloom::serp::{DensityRange, MockSerpSource, SerpAnalyzer, SerpData, SerpError, SerpSource};

/// Mock SERP results plus a call counter.
#[derive(Default)]
pub struct CountingSerpSource {
    inner: MockSerpSource,
    calls: AtomicUsize,
}

impl CountingSerpSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SerpSource for CountingSerpSource {
    fn fetch(&self, query: &str) -> Result<SerpData, SerpError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(query)
    }
}

/// Always unavailable.
pub struct FailingSerpSource;

impl SerpSource for FailingSerpSource {
    fn fetch(&self, _query: &str) -> Result<SerpData, SerpError> {
        Err(SerpError::Unavailable("connection refused".to_string()))
    }
}

/// Plays queued results in order, then falls back to the offline generator.
#[derive(Default)]
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<GeneratorResponse, GeneratorError>>>,
    fallback: OfflineGenerator,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_fail(self, error: GeneratorError) -> Self {
        self.push(Err(error));
        self
    }

    pub fn then_fail_times(self, times: usize, error: impl Fn() -> GeneratorError) -> Self {
        for _ in 0..times {
            self.push(Err(error()));
        }
        self
    }

    pub fn then_reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(GeneratorResponse {
            text: text.into(),
            usage: None,
        }));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn push(&self, item: Result<GeneratorResponse, GeneratorError>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(item);
        }
    }
}

impl ContentGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    fn generate(&self, prompt: &GenerationPrompt) -> Result<GeneratorResponse, GeneratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        match next {
            Some(result) => result,
            None => self.fallback.generate(prompt),
        }
    }
}

/// The offline draft for `topic` written to `words` words, whatever length the
/// job itself asked for.
pub fn offline_reply(topic: &str, words: u32) -> String {
    let data = MockSerpSource::default().fetch(topic).unwrap();
    let analysis = SerpAnalyzer::new(DensityRange::new(1.0, 3.0)).analyze(data);
    let prompt = build_prompt(topic, "en", words, &analysis);
    OfflineGenerator::new().generate(&prompt).unwrap().text
}

/// A well-formed reply of roughly `words` words that never mentions the topic,
/// so only the keyword density check fails.
pub fn keyword_free_reply(words: usize) -> String {
    let sections: Vec<_> = (1..=5)
        .map(|i| {
            json!({
                "heading": format!("Part {}", i),
                "paragraphs": [filler(words / 5)],
            })
        })
        .collect();

    json!({
        "title": "Guide",
        "introduction": ["A short introduction."],
        "sections": sections,
        "title_tag": "Guide",
        "meta_description": "Everything in one place.",
        "internal_links": [
            {"anchor_text": "one", "target_page": "one"},
            {"anchor_text": "two", "target_page": "two"},
            {"anchor_text": "three", "target_page": "three"}
        ],
        "external_references": [
            {"source_name": "Pew Research Center", "url": "https://www.pewresearch.org"},
            {"source_name": "Gartner", "url": "https://www.gartner.com"}
        ],
        "faq": [{"question": "Is this useful?", "answer": "It depends on the reader."}]
    })
    .to_string()
}

fn filler(words: usize) -> String {
    const WORDS: [&str; 8] = [
        "teams", "plan", "their", "work", "around", "clear", "weekly", "goals",
    ];
    (0..words)
        .map(|i| WORDS[i % WORDS.len()])
        .collect::<Vec<_>>()
        .join(" ")
}
