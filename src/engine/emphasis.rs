//! Emphasis post-pass: capitalize and bold the abstract/keyword
//! markers wherever they appear.

use crate::model::{Document, Run, RunContent};
use regex::Regex;
use std::sync::OnceLock;

/// Marker words that get uppercased and bolded.
const TARGET_WORDS: &[&str] = &["abstract", "keyword", "keywords"];

static TARGET_RE: OnceLock<Regex> = OnceLock::new();

fn target_re() -> &'static Regex {
    // Longest alternative first so "keywords" is not half-replaced.
    TARGET_RE.get_or_init(|| Regex::new(r"(?i)keywords|keyword|abstract").unwrap())
}

fn is_target_token(token: &str) -> bool {
    TARGET_WORDS
        .iter()
        .any(|w| token.eq_ignore_ascii_case(w))
}

/// Split text into alternating word / non-word tokens, both kept.
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut current_is_word: Option<bool> = None;

    for ch in text.chars() {
        let is_word = ch.is_alphanumeric() || ch == '_';
        if current_is_word != Some(is_word) && !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        current_is_word = Some(is_word);
        current.push(ch);
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Uppercase and bold every occurrence of "abstract" / "keyword" /
/// "keywords", rebuilding the run list so each marker sits in its own
/// bold run while surrounding text keeps its original run attributes.
pub fn emphasize_front_matter_terms(document: &mut Document) {
    for paragraph in document.paragraphs_mut() {
        let text = paragraph.text().to_lowercase();
        if !TARGET_WORDS.iter().any(|w| text.contains(w)) {
            continue;
        }

        let mut rebuilt: Vec<Run> = Vec::new();
        for run in paragraph.runs.drain(..) {
            let run_text = run.text();
            if run_text.is_empty() {
                // Drawings, fields, and breaks pass through untouched.
                if !run.content.iter().all(|c| matches!(c, RunContent::Text(_))) {
                    rebuilt.push(run);
                }
                continue;
            }

            let replaced = target_re()
                .replace_all(&run_text, |caps: &regex::Captures| {
                    caps[0].to_uppercase()
                })
                .into_owned();

            for token in tokenize(&replaced) {
                let mut props = run.props.clone();
                if is_target_token(&token) {
                    props.bold = Some(true);
                }
                rebuilt.push(Run::styled(token, props));
            }
        }
        paragraph.runs = rebuilt;
    }
}
