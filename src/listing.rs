//! In-memory shaping of content lists fetched from the database.

use chrono::NaiveDate;
use std::collections::HashSet;
use uuid::Uuid;

use crate::models::{Contest, ContestPhoto, FaqItem, PhotoCategory};

/// filter_contests
///
/// Case-insensitive substring match on title or description. A blank search keeps everything.
pub fn filter_contests(contests: Vec<Contest>, search: Option<&str>) -> Vec<Contest> {
    let needle = match search.map(str::trim) {
        Some(term) if !term.is_empty() => term.to_lowercase(),
        _ => return contests,
    };

    contests
        .into_iter()
        .filter(|c| {
            c.title.to_lowercase().contains(&needle)
                || c.description.to_lowercase().contains(&needle)
        })
        .collect()
}

/// split_gallery
///
/// Splits a contest's works into (winners, participants). Unapproved works are dropped.
pub fn split_gallery(photos: Vec<ContestPhoto>) -> (Vec<ContestPhoto>, Vec<ContestPhoto>) {
    photos
        .into_iter()
        .filter(|p| p.approved)
        .partition(|p| p.category == PhotoCategory::Winner)
}

/// next_faq_order
///
/// Position for a newly created item: one past the current maximum, starting at 1.
pub fn next_faq_order(items: &[FaqItem]) -> i32 {
    items.iter().map(|item| item.order).max().unwrap_or(0).max(0) + 1
}

/// plan_faq_reorder
///
/// Given the current items and the full id list in the desired order, returns the
/// `(id, position)` writes needed to make positions `1..=n` follow that order. Rows that
/// already sit at their target position are skipped.
///
/// The list must be a permutation of the current ids: no duplicates, none missing, none unknown.
pub fn plan_faq_reorder(current: &[FaqItem], ids: &[Uuid]) -> Result<Vec<(Uuid, i32)>, String> {
    if ids.len() != current.len() {
        return Err(format!(
            "Expected {} FAQ ids, got {}",
            current.len(),
            ids.len()
        ));
    }

    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(*id) {
            return Err(format!("Duplicate FAQ id {}", id));
        }
    }

    let mut writes = Vec::new();
    for (index, id) in ids.iter().enumerate() {
        let item = current
            .iter()
            .find(|item| item.id == *id)
            .ok_or_else(|| format!("Unknown FAQ id {}", id))?;

        let position = index as i32 + 1;
        if item.order != position {
            writes.push((*id, position));
        }
    }

    Ok(writes)
}

/// validate_contest_dates
pub fn validate_contest_dates(start: NaiveDate, end: NaiveDate) -> Result<(), String> {
    if end < start {
        return Err("Contest end date must not precede its start date".to_string());
    }
    Ok(())
}
