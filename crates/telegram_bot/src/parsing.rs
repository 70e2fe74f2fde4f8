use engine::Amount;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ParsedExpense {
    pub amount: Amount,
    pub category: String,
}

/// Parses a chat message into an expense.
///
/// Rules:
/// - input is trimmed and lowercased
/// - an optional leading `rm` is dropped (`rm12 makan`, `rm 12 makan`)
/// - first token is the amount, the rest (at least one token) the category
///
/// Returns `None` for anything else. Zero and negative amounts pass through.
pub(crate) fn parse_expense(raw: &str) -> Option<ParsedExpense> {
    let lowered = raw.trim().to_lowercase();
    let rest = lowered.strip_prefix("rm").unwrap_or(&lowered);

    let mut tokens = rest.split_whitespace();
    let amount = tokens.next()?.parse::<Amount>().ok()?;
    let category = tokens.collect::<Vec<_>>().join(" ");
    if category.is_empty() {
        return None;
    }

    Some(ParsedExpense { amount, category })
}
