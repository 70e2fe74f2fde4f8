//! Totals per category.

use std::collections::HashMap;

use crate::{Amount, Expense};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Amount,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Highest total first; equal totals keep the order in which the
    /// category first appeared in the input.
    pub by_category: Vec<CategoryTotal>,
    pub grand_total: Amount,
}

impl Summary {
    /// `true` when built from no records at all.
    pub fn is_empty(&self) -> bool {
        self.by_category.is_empty()
    }

    /// Sum of the per-category totals. Always equal to `grand_total`.
    pub fn category_sum(&self) -> Amount {
        self.by_category.iter().map(|c| c.total).sum()
    }
}

/// Aggregate `records` by exact category string.
pub fn summarize<'a, I>(records: I) -> Summary
where
    I: IntoIterator<Item = &'a Expense>,
{
    let mut by_category: Vec<CategoryTotal> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut grand_total = Amount::ZERO;

    for record in records {
        grand_total += record.amount;
        match index.get(record.category.as_str()) {
            Some(&i) => by_category[i].total += record.amount,
            None => {
                index.insert(record.category.as_str(), by_category.len());
                by_category.push(CategoryTotal {
                    category: record.category.clone(),
                    total: record.amount,
                });
            }
        }
    }

    // `sort_by` is stable, ties stay in first-seen order.
    by_category.sort_by(|a, b| b.total.cmp(&a.total));

    Summary {
        by_category,
        grand_total,
    }
}
