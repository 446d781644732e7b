use std::collections::HashMap;

use super::PolarityAnalyzer;
use crate::error::Result;

/// Word valences on a -4..4 scale.
const VALENCES: &[(&str, f64)] = &[
    // positive
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("beautiful", 2.9),
    ("best", 3.2),
    ("brilliant", 2.8),
    ("charming", 2.4),
    ("clean", 1.7),
    ("comfortable", 1.5),
    ("cozy", 1.6),
    ("delicious", 2.7),
    ("delightful", 2.9),
    ("enjoy", 2.2),
    ("enjoyed", 2.3),
    ("excellent", 2.7),
    ("exceptional", 2.4),
    ("fabulous", 2.4),
    ("fantastic", 2.6),
    ("friendly", 2.2),
    ("fun", 2.3),
    ("glad", 2.0),
    ("good", 1.9),
    ("gorgeous", 3.0),
    ("great", 3.1),
    ("happy", 2.7),
    ("helpful", 1.8),
    ("impressive", 2.3),
    ("liked", 1.8),
    ("love", 3.2),
    ("loved", 2.9),
    ("lovely", 2.8),
    ("memorable", 1.9),
    ("nice", 1.8),
    ("outstanding", 3.0),
    ("perfect", 2.7),
    ("pleasant", 2.3),
    ("recommend", 1.5),
    ("recommended", 1.6),
    ("relaxing", 2.2),
    ("satisfied", 1.8),
    ("spotless", 2.0),
    ("stunning", 2.6),
    ("superb", 3.1),
    ("thank", 1.5),
    ("thanks", 1.9),
    ("welcoming", 2.0),
    ("wonderful", 2.7),
    ("worth", 0.9),
    // negative
    ("angry", -2.3),
    ("annoying", -1.7),
    ("awful", -2.0),
    ("bad", -2.5),
    ("broken", -1.5),
    ("complaint", -1.5),
    ("dangerous", -2.1),
    ("dirty", -1.9),
    ("disappointed", -1.9),
    ("disappointing", -2.2),
    ("disgusting", -2.4),
    ("fail", -2.5),
    ("failed", -2.3),
    ("filthy", -2.7),
    ("hate", -2.7),
    ("hated", -3.2),
    ("horrible", -2.5),
    ("mediocre", -1.0),
    ("mess", -1.5),
    ("nightmare", -2.4),
    ("noisy", -0.7),
    ("overpriced", -1.6),
    ("poor", -2.1),
    ("problem", -1.7),
    ("problems", -1.7),
    ("rude", -2.0),
    ("sad", -2.1),
    ("scam", -2.6),
    ("smelly", -1.7),
    ("terrible", -2.1),
    ("ugly", -2.3),
    ("uncomfortable", -1.6),
    ("unfriendly", -1.5),
    ("unhelpful", -1.8),
    ("unpleasant", -2.1),
    ("unsafe", -2.0),
    ("useless", -1.8),
    ("waste", -1.8),
    ("worse", -2.1),
    ("worst", -3.1),
];

const BOOST_INCREMENT: f64 = 0.293;
const BOOST_DECREMENT: f64 = -0.293;
const CAPS_INCREMENT: f64 = 0.733;
const NEGATION_SCALAR: f64 = -0.74;
const EXCLAMATION_INCREMENT: f64 = 0.292;
const QUESTION_INCREMENT: f64 = 0.18;
const NORMALIZATION_ALPHA: f64 = 15.0;

/// Damping applied to a booster 1, 2 and 3 tokens before the sentiment word.
const BOOSTER_DISTANCE_SCALE: [f64; 3] = [1.0, 0.95, 0.9];

const INCREMENTERS: &[&str] = &[
    "absolutely",
    "completely",
    "extremely",
    "highly",
    "incredibly",
    "really",
    "so",
    "super",
    "totally",
    "truly",
    "very",
];

const DECREMENTERS: &[&str] = &[
    "barely",
    "hardly",
    "marginally",
    "partly",
    "slightly",
    "somewhat",
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nor", "nothing", "nowhere", "without", "cannot", "neither",
];

struct Token {
    lower: String,
    shouting: bool,
}

fn tokenize(text: &str) -> Vec<Token> {
    text.split_whitespace()
        .filter_map(|raw| {
            let word = raw.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'');
            if word.is_empty() {
                return None;
            }
            let letters = word.chars().filter(|c| c.is_alphabetic()).count();
            Some(Token {
                lower: word.to_lowercase(),
                shouting: letters > 1 && word.chars().all(|c| !c.is_lowercase()),
            })
        })
        .collect()
}

fn is_negation(word: &str) -> bool {
    NEGATIONS.contains(&word) || word.ends_with("n't")
}

fn booster_value(word: &str) -> Option<f64> {
    if INCREMENTERS.contains(&word) {
        Some(BOOST_INCREMENT)
    } else if DECREMENTERS.contains(&word) {
        Some(BOOST_DECREMENT)
    } else {
        None
    }
}

fn punctuation_emphasis(text: &str) -> f64 {
    let exclamations = text.matches('!').count().min(4) as f64;
    let questions = text.matches('?').count();
    let question_boost = match questions {
        0 | 1 => 0.0,
        2 | 3 => questions as f64 * QUESTION_INCREMENT,
        _ => 0.96,
    };
    exclamations * EXCLAMATION_INCREMENT + question_boost
}

/// Rule-based compound polarity scorer.
///
/// Sums word valences adjusted for nearby boosters and negations, weights clauses
/// around "but", adds punctuation emphasis and normalizes with `x / sqrt(x² + 15)`.
#[derive(Debug, Clone)]
pub struct LexiconAnalyzer {
    valences: HashMap<&'static str, f64>,
}

impl Default for LexiconAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconAnalyzer {
    pub fn new() -> Self {
        Self {
            valences: VALENCES.iter().copied().collect(),
        }
    }

    pub fn valence(&self, word: &str) -> Option<f64> {
        self.valences.get(word).copied()
    }

    /// Compound score rounded to 4 decimals.
    pub fn compound(&self, text: &str) -> f64 {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return 0.0;
        }

        let mixed_case = tokens.iter().any(|t| t.shouting) && tokens.iter().any(|t| !t.shouting);
        let but_index = tokens.iter().position(|t| t.lower == "but");

        let mut sentiments = Vec::with_capacity(tokens.len());
        for (i, token) in tokens.iter().enumerate() {
            let Some(base) = self.valence(&token.lower) else {
                sentiments.push(0.0);
                continue;
            };

            let direction = base.signum();
            let mut valence = base;
            if mixed_case && token.shouting {
                valence += direction * CAPS_INCREMENT;
            }

            let mut negated = false;
            for distance in 1..=3 {
                let Some(j) = i.checked_sub(distance) else {
                    break;
                };
                let previous = &tokens[j].lower;
                if let Some(boost) = booster_value(previous) {
                    valence += direction * boost * BOOSTER_DISTANCE_SCALE[distance - 1];
                }
                if is_negation(previous) {
                    negated = true;
                }
            }
            if negated {
                valence *= NEGATION_SCALAR;
            }

            sentiments.push(valence);
        }

        if let Some(pivot) = but_index {
            for (i, value) in sentiments.iter_mut().enumerate() {
                if i < pivot {
                    *value *= 0.5;
                } else if i > pivot {
                    *value *= 1.5;
                }
            }
        }

        let mut total: f64 = sentiments.iter().sum();
        if total == 0.0 {
            return 0.0;
        }

        let emphasis = punctuation_emphasis(text);
        total += total.signum() * emphasis;

        let normalized = total / (total * total + NORMALIZATION_ALPHA).sqrt();
        round4(normalized.clamp(-1.0, 1.0))
    }
}

impl PolarityAnalyzer for LexiconAnalyzer {
    fn polarity(&self, text: &str) -> Result<f64> {
        Ok(self.compound(text))
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
