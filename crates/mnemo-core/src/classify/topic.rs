//! Keyword topic classifier and window similarity.
//!
//! Extracts a coarse topic label per message by keyword-category
//! matching: the first category with a hit wins, "general" is the
//! fallback. Window comparison uses multiset Jaccard similarity over
//! the per-message labels.

use std::collections::BTreeMap;

use super::{Classification, Classifier, tokenize};

/// Fallback label when no category matches.
pub const GENERAL_TOPIC: &str = "general";

/// Confidence assigned to a keyword hit.
const MATCH_CONFIDENCE: f64 = 0.8;
/// Confidence assigned to the general fallback.
const FALLBACK_CONFIDENCE: f64 = 0.3;

/// A topic category with its keyword list. First category to match
/// wins, so order in the table is significant.
struct TopicCategory {
    label: &'static str,
    keywords: &'static [&'static str],
}

const CATEGORIES: &[TopicCategory] = &[
    TopicCategory {
        label: "nutrition",
        keywords: &[
            "diet", "calorie", "calories", "protein", "meal", "food", "eat", "eating",
            "nutrition", "breakfast", "lunch", "dinner", "dieta", "caloria", "calorias",
            "proteína", "refeição", "comida", "comer", "nutrição", "almoço", "jantar",
            "lanche", "café",
        ],
    },
    TopicCategory {
        label: "exercise",
        keywords: &[
            "workout", "exercise", "gym", "run", "running", "training", "muscle", "yoga",
            "treino", "treinar", "exercício", "academia", "correr", "corrida", "músculo",
            "musculação", "caminhada",
        ],
    },
    TopicCategory {
        label: "productivity",
        keywords: &[
            "task", "reminder", "schedule", "meeting", "deadline", "productivity", "focus",
            "organize", "tarefa", "lembrete", "agenda", "reunião", "prazo", "produtividade",
            "foco", "organizar", "compromisso",
        ],
    },
    TopicCategory {
        label: "commands",
        keywords: &[
            "help", "menu", "start", "stop", "command", "ajuda", "comando", "iniciar",
            "parar",
        ],
    },
    TopicCategory {
        label: "financial",
        keywords: &[
            "pay", "payment", "price", "cost", "money", "budget", "invoice", "pagar",
            "pagamento", "preço", "custo", "dinheiro", "orçamento", "fatura", "pix",
            "boleto",
        ],
    },
    TopicCategory {
        label: "configuration",
        keywords: &[
            "settings", "setting", "configure", "config", "language", "notification",
            "preferences", "configuração", "configurar", "idioma", "notificação",
            "preferências", "ajustes",
        ],
    },
];

/// First-match-wins keyword topic classifier.
#[derive(Debug, Default, Clone)]
pub struct KeywordTopicClassifier;

impl KeywordTopicClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl Classifier for KeywordTopicClassifier {
    fn classify(&self, text: &str) -> Classification {
        // Slash-prefixed input is a command regardless of its words.
        if text.trim_start().starts_with('/') {
            return Classification {
                label: "commands".to_string(),
                confidence: MATCH_CONFIDENCE,
            };
        }

        let tokens = tokenize(text);
        for category in CATEGORIES {
            if tokens
                .iter()
                .any(|t| category.keywords.contains(&t.as_str()))
            {
                return Classification {
                    label: category.label.to_string(),
                    confidence: MATCH_CONFIDENCE,
                };
            }
        }

        Classification {
            label: GENERAL_TOPIC.to_string(),
            confidence: FALLBACK_CONFIDENCE,
        }
    }
}

/// Multiset of topic labels with occurrence counts.
pub fn topic_distribution<'a, I: IntoIterator<Item = &'a str>>(labels: I) -> BTreeMap<String, usize> {
    let mut dist = BTreeMap::new();
    for label in labels {
        *dist.entry(label.to_string()).or_insert(0) += 1;
    }
    dist
}

/// Multiset Jaccard similarity over label frequencies: sum of per-label
/// min relative frequencies over sum of per-label max relative
/// frequencies.
///
/// Frequencies rather than raw counts keep the comparison meaningful
/// between windows of different sizes -- a ten-message window and a
/// single message that share one topic compare as identical (1.0), not
/// as one tenth. Two empty distributions compare as 1.0 (no evidence of
/// change). Symmetric, and insensitive to message order within a
/// window.
pub fn jaccard_similarity(a: &BTreeMap<String, usize>, b: &BTreeMap<String, usize>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }

    let total_a: usize = a.values().sum();
    let total_b: usize = b.values().sum();
    if total_a == 0 || total_b == 0 {
        return if total_a == total_b { 1.0 } else { 0.0 };
    }

    let freq = |count: usize, total: usize| count as f64 / total as f64;

    let mut intersection = 0.0_f64;
    let mut union = 0.0_f64;
    for (label, &count_a) in a {
        let fa = freq(count_a, total_a);
        let fb = freq(b.get(label).copied().unwrap_or(0), total_b);
        intersection += fa.min(fb);
        union += fa.max(fb);
    }
    for (label, &count_b) in b {
        if !a.contains_key(label) {
            union += freq(count_b, total_b);
        }
    }

    if union == 0.0 { 1.0 } else { intersection / union }
}
