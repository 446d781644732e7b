use unicode_segmentation::UnicodeSegmentation;

pub const MAX_KEYWORDS: usize = 10;

/// Words never reported as keywords.
const STOP_WORDS: &[&str] = &[
    "this", "that", "with", "have", "will", "from", "they", "been", "were", "said", "each", "which",
    "their", "time", "very", "good", "great", "nice", "love", "like", "really",
];

/// Function words that break a noun phrase.
const FUNCTION_WORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "am", "an", "and", "any", "are", "as", "at", "be",
    "because", "before", "but", "by", "can", "could", "did", "do", "does", "during", "for", "had",
    "has", "he", "her", "here", "him", "his", "how", "i", "if", "in", "into", "is", "it", "its",
    "just", "me", "more", "most", "my", "no", "not", "of", "on", "or", "our", "out", "over", "she",
    "so", "some", "than", "the", "them", "then", "there", "these", "those", "to", "too", "under",
    "up", "us", "was", "we", "what", "when", "where", "who", "why", "would", "you", "your",
];

const CLAUSE_BREAKS: &[char] = &['.', ',', ';', ':', '!', '?', '(', ')', '"', '\n'];

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

fn is_phrase_word(word: &str) -> bool {
    word.chars().count() > 1
        && word.chars().all(char::is_alphabetic)
        && !is_stop_word(word)
        && !FUNCTION_WORDS.contains(&word)
}

/// Adverbs, gerunds and past-tense verbs rarely close a noun phrase.
fn is_noun_like(word: &str) -> bool {
    let long = word.chars().count() > 4;
    !word.ends_with("ly") && !word.ends_with("ing") && !(long && word.ends_with("ed"))
}

fn is_significant(word: &str) -> bool {
    word.chars().count() > 3 && !is_stop_word(word)
}

fn push_unique(out: &mut Vec<String>, candidate: String) {
    if !out.contains(&candidate) {
        out.push(candidate);
    }
}

/// Emits the last (up to) three words of a run once trailing non-nouns are dropped.
fn flush_run(run: &mut Vec<&str>, phrases: &mut Vec<String>) {
    while run.last().is_some_and(|w| !is_noun_like(w)) {
        run.pop();
    }
    if run.len() >= 2 {
        let start = run.len().saturating_sub(3);
        phrases.push(run[start..].join(" "));
    }
    run.clear();
}

fn noun_phrases(words: &[String]) -> Vec<String> {
    let mut phrases = Vec::new();
    let mut run: Vec<&str> = Vec::new();

    for word in words {
        if is_phrase_word(word) {
            run.push(word.as_str());
        } else {
            flush_run(&mut run, &mut phrases);
        }
    }
    flush_run(&mut run, &mut phrases);
    phrases
}

/// Noun-phrase candidates followed by significant single words, lowercased,
/// deduplicated in first-seen order and capped at [`MAX_KEYWORDS`].
pub fn extract_keywords(text: &str) -> Vec<String> {
    let clauses: Vec<Vec<String>> = text
        .split(CLAUSE_BREAKS)
        .map(|clause| clause.unicode_words().map(str::to_lowercase).collect())
        .collect();

    let mut keywords = Vec::new();
    for words in &clauses {
        for phrase in noun_phrases(words) {
            push_unique(&mut keywords, phrase);
        }
    }
    for word in clauses.iter().flatten() {
        if is_significant(word) {
            push_unique(&mut keywords, word.clone());
        }
    }

    keywords.truncate(MAX_KEYWORDS);
    keywords
}
