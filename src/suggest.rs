//! Keyword-driven category and source suggestions.
//!
//! An ordered rule list per record shape; the first rule with any substring
//! match against the lower-cased description wins. Purely advisory: the
//! result pre-fills a review screen and never blocks ingestion or overrides
//! a category the user picks downstream.

use crate::model::{RecordShape, Suggestion};

/// One suggestion rule: any keyword hit yields the label at the given
/// confidence. New merchants and patterns are supported by appending rules,
/// not by editing logic.
struct Rule {
    keywords: &'static [&'static str],
    label: &'static str,
    confidence: f64,
}

const EXPENSE_RULES: &[Rule] = &[
    Rule {
        keywords: &["salary", "payroll", "wages"],
        label: "payroll",
        confidence: 0.9,
    },
    Rule {
        keywords: &["rent", "lease", "landlord"],
        label: "rent",
        confidence: 0.9,
    },
    Rule {
        keywords: &["electricity", "power", "water", "internet", "utility", "airtime", "data"],
        label: "utilities",
        confidence: 0.85,
    },
    Rule {
        keywords: &["fuel", "diesel", "petrol", "transport", "uber", "bolt", "taxi"],
        label: "transport",
        confidence: 0.85,
    },
    Rule {
        keywords: &["restaurant", "cafe", "coffee", "food", "eatery", "lunch"],
        label: "meals",
        confidence: 0.8,
    },
    Rule {
        keywords: &["hotel", "flight", "airline", "travel", "booking"],
        label: "travel",
        confidence: 0.8,
    },
    Rule {
        keywords: &["insurance", "premium"],
        label: "insurance",
        confidence: 0.8,
    },
    Rule {
        keywords: &["advert", "marketing", "facebook ads", "google ads", "promotion"],
        label: "marketing",
        confidence: 0.8,
    },
    Rule {
        keywords: &["stationery", "supplies", "equipment", "printer"],
        label: "office supplies",
        confidence: 0.75,
    },
    Rule {
        keywords: &["bank charge", "charge", "fee", "commission", "stamp duty", "levy"],
        label: "bank charges",
        confidence: 0.7,
    },
    Rule {
        keywords: &["tax", "vat", "paye"],
        label: "taxes",
        confidence: 0.7,
    },
];

const REVENUE_RULES: &[Rule] = &[
    Rule {
        keywords: &["invoice", "inv-", "payment received"],
        label: "invoice payment",
        confidence: 0.85,
    },
    Rule {
        keywords: &["transfer from", "trf from", "inward"],
        label: "transfers in",
        confidence: 0.75,
    },
    Rule {
        keywords: &["interest"],
        label: "interest income",
        confidence: 0.8,
    },
    Rule {
        keywords: &["refund", "reversal"],
        label: "refunds",
        confidence: 0.75,
    },
    Rule {
        keywords: &["pos", "card payment", "checkout", "paystack", "stripe", "flutterwave"],
        label: "sales",
        confidence: 0.8,
    },
];

/// Fallback labels per shape, at a deliberately low confidence.
const DEFAULT_CONFIDENCE: f64 = 0.6;

/// Proposes a category (expense) or source (revenue) for a description.
/// Total: always returns a suggestion, defaulting to "other"/"sales".
pub fn suggest(description: &str, shape: RecordShape) -> Suggestion {
    let lower = description.to_lowercase();
    let (rules, default_label) = match shape {
        RecordShape::Expense => (EXPENSE_RULES, "other"),
        RecordShape::Revenue => (REVENUE_RULES, "sales"),
    };

    for rule in rules {
        if rule.keywords.iter().any(|k| lower.contains(k)) {
            return Suggestion {
                label: rule.label.to_string(),
                confidence: rule.confidence,
            };
        }
    }

    Suggestion {
        label: default_label.to_string(),
        confidence: DEFAULT_CONFIDENCE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expense_keyword_match() {
        let s = suggest("UBER TRIP LAGOS", RecordShape::Expense);
        assert_eq!(s.label, "transport");
        assert!(s.confidence > 0.8);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        // "SALARY" appears in an earlier rule than "transfer", and rule order
        // decides ties.
        let s = suggest("SALARY TRANSFER MARCH", RecordShape::Expense);
        assert_eq!(s.label, "payroll");
    }

    #[test]
    fn test_expense_default() {
        let s = suggest("XYZZY 0042", RecordShape::Expense);
        assert_eq!(s.label, "other");
        assert_eq!(s.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_revenue_match_and_default() {
        let s = suggest("PAYSTACK SETTLEMENT", RecordShape::Revenue);
        assert_eq!(s.label, "sales");
        assert!(s.confidence > DEFAULT_CONFIDENCE);

        let s = suggest("XYZZY 0042", RecordShape::Revenue);
        assert_eq!(s.label, "sales");
        assert_eq!(s.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_case_insensitive() {
        let s = suggest("monthly RENT payment", RecordShape::Expense);
        assert_eq!(s.label, "rent");
    }

    #[test]
    fn test_confidence_bounds() {
        for rule in EXPENSE_RULES.iter().chain(REVENUE_RULES.iter()) {
            assert!(rule.confidence > 0.0 && rule.confidence <= 1.0);
        }
    }
}
