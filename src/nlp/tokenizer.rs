//! Unicode-aware segmentation
//!
//! This module provides UAX #29 sentence and word segmentation, plus paragraph
//! splitting on blank lines. Words come out normalized the same way registry
//! surface forms are, so n-grams can be matched against the registry directly.

use crate::registry::normalize_surface;
use unicode_segmentation::UnicodeSegmentation;

/// One sentence of a document with its normalized words
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceWords {
    /// Paragraph index within the document
    pub paragraph_idx: usize,
    /// Sentence index within the document (not reset per paragraph)
    pub sentence_idx: usize,
    /// Byte range of the sentence in the source text
    pub start: usize,
    pub end: usize,
    /// Lowercased alphanumeric words
    pub words: Vec<String>,
    /// Parallel to `words`: the source word started with an uppercase letter
    pub capitalized: Vec<bool>,
}

/// A Unicode-aware tokenizer following UAX #29
#[derive(Debug, Clone, Default)]
pub struct Tokenizer;

impl Tokenizer {
    pub fn new() -> Self {
        Self
    }

    /// Split a document into paragraphs, sentences and words
    pub fn tokenize(&self, text: &str) -> Vec<SentenceWords> {
        let mut sentences = Vec::new();
        let mut sentence_idx = 0;

        for (paragraph_idx, (para_start, para_end)) in
            self.paragraph_boundaries(text).into_iter().enumerate()
        {
            let paragraph = &text[para_start..para_end];
            for (start, end) in self.sentence_boundaries(paragraph) {
                let (words, capitalized): (Vec<String>, Vec<bool>) =
                    self.cased_words(&paragraph[start..end]).into_iter().unzip();
                if words.is_empty() {
                    continue;
                }
                sentences.push(SentenceWords {
                    paragraph_idx,
                    sentence_idx,
                    start: para_start + start,
                    end: para_start + end,
                    words,
                    capitalized,
                });
                sentence_idx += 1;
            }
        }

        sentences
    }

    /// Normalized words of a text fragment.
    ///
    /// Word-internal punctuation such as apostrophes splits the word, matching
    /// [`normalize_surface`].
    pub fn words(&self, text: &str) -> Vec<String> {
        self.cased_words(text).into_iter().map(|(word, _)| word).collect()
    }

    /// Normalized words paired with whether the source word was capitalized.
    ///
    /// Only the first piece of a split word carries the flag (`"Ohri's"` gives
    /// `("ohri", true), ("s", false)`).
    pub fn cased_words(&self, text: &str) -> Vec<(String, bool)> {
        text.unicode_words()
            .flat_map(|word| {
                let upper = word.chars().next().is_some_and(char::is_uppercase);
                normalize_surface(word)
                    .split(' ')
                    .filter(|w| !w.is_empty())
                    .enumerate()
                    .map(|(i, w)| (w.to_string(), upper && i == 0))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Paragraphs are separated by one or more blank lines
    fn paragraph_boundaries(&self, text: &str) -> Vec<(usize, usize)> {
        let mut boundaries = Vec::new();
        let mut start: Option<usize> = None;
        let mut last_end = 0;
        let mut offset = 0;

        for line in text.split_inclusive('\n') {
            let line_start = offset;
            offset += line.len();
            if line.trim().is_empty() {
                if let Some(s) = start.take() {
                    boundaries.push((s, last_end));
                }
            } else {
                start.get_or_insert(line_start);
                last_end = offset;
            }
        }
        if let Some(s) = start {
            boundaries.push((s, last_end));
        }

        boundaries
    }

    /// Find sentence boundaries in text
    fn sentence_boundaries(&self, text: &str) -> Vec<(usize, usize)> {
        let mut boundaries = Vec::new();
        let mut start = 0;

        for (idx, _) in text.split_sentence_bound_indices() {
            if idx > start {
                let segment = &text[start..idx];
                if !segment.trim().is_empty() {
                    boundaries.push((start, idx));
                }
            }
            start = idx;
        }

        // Handle last segment
        if start < text.len() {
            let segment = &text[start..];
            if !segment.trim().is_empty() {
                boundaries.push((start, text.len()));
            }
        }

        boundaries
    }
}
