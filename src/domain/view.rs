//! Read-only views over a task collection
//!
//! Sorting, status filtering, text search and counters. Nothing here mutates
//! tasks; the store hands these functions an iterator in ascending id order.

use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::str::FromStr;
use thiserror::Error;

use super::task::Task;

#[derive(Debug, Error, PartialEq)]
pub enum ViewError {
    #[error("Unknown sort criterion '{0}' (use priority or date)")]
    UnknownSort(String),

    #[error("Unknown status filter '{0}' (use all, pending or completed)")]
    UnknownFilter(String),
}

/// Sort criterion for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// By priority rank, then id
    #[default]
    Priority,
    /// By creation time
    Date,
}

impl FromStr for SortKey {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "priority" | "prioridad" => Ok(SortKey::Priority),
            "date" | "fecha" => Ok(SortKey::Date),
            other => Err(ViewError::UnknownSort(other.to_string())),
        }
    }
}

/// Completion-state filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl StatusFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => !task.completed,
            StatusFilter::Completed => task.completed,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" | "todas" => Ok(StatusFilter::All),
            "pending" | "pendientes" => Ok(StatusFilter::Pending),
            "completed" | "completadas" => Ok(StatusFilter::Completed),
            other => Err(ViewError::UnknownFilter(other.to_string())),
        }
    }
}

/// Sorts tasks by the given criterion
///
/// Expects input in ascending id order. Priority sorting breaks ties by id;
/// date sorting is stable, so equal timestamps keep id order.
pub fn sort_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>, key: SortKey) -> Vec<&'a Task> {
    let mut sorted: Vec<&Task> = tasks.into_iter().collect();
    match key {
        SortKey::Priority => sorted.sort_by_key(|t| (t.priority.rank(), t.id)),
        SortKey::Date => sorted.sort_by_key(|t| t.created_at()),
    }
    sorted
}

/// Sorts, then filters without reordering
pub fn select<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    filter: StatusFilter,
    key: SortKey,
) -> Vec<&'a Task> {
    sort_tasks(tasks, key)
        .into_iter()
        .filter(|t| filter.matches(t))
        .collect()
}

/// A task matching a search, with the matched byte ranges of its description
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit<'a> {
    pub task: &'a Task,
    pub matches: Vec<Range<usize>>,
}

impl SearchHit<'_> {
    /// Renders the description with every match wrapped by `mark`
    pub fn highlighted(&self, mark: impl Fn(&str) -> String) -> String {
        let text = &self.task.description;
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for range in &self.matches {
            out.push_str(&text[last..range.start]);
            out.push_str(&mark(&text[range.clone()]));
            last = range.end;
        }
        out.push_str(&text[last..]);
        out
    }
}

/// Case-insensitive substring search over descriptions
///
/// An empty query matches every task and highlights nothing.
pub fn search<'a>(tasks: impl IntoIterator<Item = &'a Task>, query: &str) -> Vec<SearchHit<'a>> {
    // per-char lowercasing, the same way `match_at` folds the description
    let needle: Vec<char> = query.chars().flat_map(char::to_lowercase).collect();

    tasks
        .into_iter()
        .filter_map(|task| {
            if needle.is_empty() {
                return Some(SearchHit { task, matches: Vec::new() });
            }
            let matches = find_matches(&task.description, &needle);
            if matches.is_empty() {
                None
            } else {
                Some(SearchHit { task, matches })
            }
        })
        .collect()
}

/// Finds non-overlapping case-insensitive occurrences of `needle`
///
/// `needle` must already be lowercased. Ranges are byte offsets on char
/// boundaries of `haystack`.
fn find_matches(haystack: &str, needle: &[char]) -> Vec<Range<usize>> {
    let mut found = Vec::new();
    let mut pos = 0;

    while pos < haystack.len() {
        match match_at(haystack, pos, needle) {
            Some(end) => {
                found.push(pos..end);
                pos = end;
            }
            None => {
                let step = haystack[pos..].chars().next().map_or(1, char::len_utf8);
                pos += step;
            }
        }
    }

    found
}

/// Returns the end offset if `needle` matches starting at `start`
fn match_at(haystack: &str, start: usize, needle: &[char]) -> Option<usize> {
    let mut k = 0;
    for (offset, c) in haystack[start..].char_indices() {
        for lower in c.to_lowercase() {
            // a match may not end in the middle of a char's lowercase expansion
            if k == needle.len() || lower != needle[k] {
                return None;
            }
            k += 1;
        }
        if k == needle.len() {
            return Some(start + offset + c.len_utf8());
        }
    }
    None
}

/// Completion counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Stats {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
}

impl Stats {
    pub fn collect<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut stats = Stats::default();
        for task in tasks {
            stats.total += 1;
            if task.completed {
                stats.completed += 1;
            } else {
                stats.pending += 1;
            }
        }
        stats
    }
}
