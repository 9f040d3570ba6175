//! Ranked column-name patterns for resolving canonical fields.
//!
//! Bank exports disagree wildly about header spelling ("Date", "Trans. Date",
//! "TRANSACTION DATE", "Posting Date", ...). Rather than branching on each
//! known bank, resolution is driven by these data tables: per canonical field,
//! an ordered list of patterns ranked by specificity. Adding support for a new
//! export format means appending a pattern here, not editing logic.

/// How a candidate pattern is matched against a column label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Match {
    /// The label equals the pattern exactly, case and all.
    Exact(&'static str),
    /// The lower-cased label contains the lower-cased pattern.
    Contains(&'static str),
}

/// An ordered candidate list for one canonical field. Earlier entries win.
#[derive(Debug, Clone, Copy)]
pub struct FieldCandidates {
    pub field: &'static str,
    pub patterns: &'static [Match],
}

/// Candidates for the transaction date column.
pub const DATE: FieldCandidates = FieldCandidates {
    field: "date",
    patterns: &[
        Match::Exact("Date"),
        Match::Exact("Transaction Date"),
        Match::Exact("TRANSACTION DATE"),
        Match::Contains("transaction date"),
        Match::Contains("trans. date"),
        Match::Contains("posting date"),
        Match::Contains("posted date"),
        Match::Contains("post date"),
        Match::Contains("value date"),
        Match::Contains("date"),
    ],
};

/// Candidates for the description column.
pub const DESCRIPTION: FieldCandidates = FieldCandidates {
    field: "description",
    patterns: &[
        Match::Exact("Description"),
        Match::Exact("NARRATION"),
        Match::Contains("description"),
        Match::Contains("narration"),
        Match::Contains("narrative"),
        Match::Contains("details"),
        Match::Contains("particulars"),
        Match::Contains("memo"),
        Match::Contains("payee"),
        Match::Contains("merchant"),
        Match::Contains("remarks"),
    ],
};

/// Candidates for a dedicated credit (money in) column.
pub const CREDIT: FieldCandidates = FieldCandidates {
    field: "credit",
    patterns: &[
        Match::Exact("Credit"),
        Match::Contains("credit amount"),
        Match::Contains("credit"),
        Match::Contains("deposit"),
        Match::Contains("paid in"),
        Match::Contains("money in"),
        Match::Contains("inflow"),
    ],
};

/// Candidates for a dedicated debit (money out) column.
pub const DEBIT: FieldCandidates = FieldCandidates {
    field: "debit",
    patterns: &[
        Match::Exact("Debit"),
        Match::Contains("debit amount"),
        Match::Contains("debit"),
        Match::Contains("withdrawal"),
        Match::Contains("paid out"),
        Match::Contains("money out"),
        Match::Contains("outflow"),
    ],
};

/// Candidates for a single signed-amount column. Consulted only when neither
/// dedicated column is populated; dedicated columns take precedence so an
/// export carrying both is never double-counted.
pub const AMOUNT: FieldCandidates = FieldCandidates {
    field: "amount",
    patterns: &[
        Match::Exact("Amount"),
        Match::Contains("transaction amount"),
        Match::Contains("amount"),
        Match::Contains("value"),
    ],
};

/// Candidates for an explicit transaction-type column, e.g. "Transaction
/// Type" holding "credit"/"debit"/"DR"/"CR".
pub const TYPE: FieldCandidates = FieldCandidates {
    field: "type",
    patterns: &[
        Match::Exact("Type"),
        Match::Contains("transaction type"),
        Match::Contains("dr/cr"),
        Match::Contains("type"),
    ],
};

/// Secondary columns that can be composed into a description when none of the
/// [`DESCRIPTION`] candidates match.
pub const DESCRIPTION_COMPOSE: FieldCandidates = FieldCandidates {
    field: "description_compose",
    patterns: &[
        Match::Contains("counterparty"),
        Match::Contains("beneficiary"),
        Match::Contains("reference"),
        Match::Contains("category"),
        Match::Contains("channel"),
    ],
};

impl Match {
    /// Whether `label` satisfies this pattern.
    pub fn matches(&self, label: &str) -> bool {
        match self {
            Match::Exact(p) => label == *p,
            Match::Contains(p) => label.to_lowercase().contains(p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_is_case_sensitive() {
        assert!(Match::Exact("Date").matches("Date"));
        assert!(!Match::Exact("Date").matches("DATE"));
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        assert!(Match::Contains("transaction date").matches("TRANSACTION DATE"));
        assert!(Match::Contains("narration").matches("Narration / Details"));
    }

    #[test]
    fn test_specific_patterns_rank_before_generic() {
        // "Posting Date" must be matched by a pattern ranked above the bare
        // "date" catch-all, otherwise a sheet with both "Posting Date" and
        // "Date Added" columns could resolve unpredictably.
        let pos_specific = DATE
            .patterns
            .iter()
            .position(|p| p.matches("Posting Date"))
            .unwrap();
        let pos_generic = DATE
            .patterns
            .iter()
            .position(|p| matches!(p, Match::Contains("date")))
            .unwrap();
        assert!(pos_specific < pos_generic);
    }
}
