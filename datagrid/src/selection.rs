//! Selection state and the click/keyboard rules that drive it.
//!
//! Selection tracks rows by key so it stays stable when the host replaces
//! the row collection with fresh values. All operations take the displayed
//! sequence (sorted row keys) as an argument and report whether the selected
//! set changed, so the caller decides what to notify.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::events::Modifiers;

/// How long a long-press suppresses the follow-up row click.
pub const LONG_PRESS_SUPPRESSION: Duration = Duration::from_millis(500);

/// Selection mode for a grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionMode {
    /// Clicks never select
    #[default]
    None,
    /// One row at a time
    Single,
    /// Ctrl/Shift/Alt-click and Shift+arrow build multi-row selections
    Multiple,
}

/// Which selected row a range extends from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeAnchor {
    /// The selected row furthest from the click.
    Furthest,
    /// The selected row closest to the click.
    Closest,
}

/// Keyboard navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Up,
    Down,
}

/// Key-based selection state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: HashSet<String>,
}

impl Selection {
    /// Create a new empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all selected keys (sorted for deterministic ordering).
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.selected.iter().cloned().collect();
        keys.sort();
        keys
    }

    /// Check if a key is selected.
    pub fn is_selected(&self, key: &str) -> bool {
        self.selected.contains(key)
    }

    /// Get the number of selected rows.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// The only selected key, if exactly one row is selected.
    pub fn single(&self) -> Option<&str> {
        if self.selected.len() == 1 {
            self.selected.iter().next().map(String::as_str)
        } else {
            None
        }
    }

    /// Clear all selection.
    pub fn clear(&mut self) -> bool {
        let changed = !self.selected.is_empty();
        self.selected.clear();
        changed
    }

    /// Replace the selection with exactly one key.
    pub fn select(&mut self, key: &str) -> bool {
        if self.selected.len() == 1 && self.selected.contains(key) {
            return false;
        }
        self.selected.clear();
        self.selected.insert(key.to_string());
        true
    }

    /// Add a key without touching the rest of the selection.
    pub fn insert(&mut self, key: &str) -> bool {
        self.selected.insert(key.to_string())
    }

    /// Toggle membership of a key (Ctrl+click behavior).
    pub fn toggle(&mut self, key: &str) -> bool {
        if !self.selected.remove(key) {
            self.selected.insert(key.to_string());
        }
        true
    }

    /// Select every key in the displayed sequence.
    pub fn select_all(&mut self, displayed: &[String]) -> bool {
        let mut changed = false;
        for key in displayed {
            changed |= self.selected.insert(key.clone());
        }
        changed
    }

    /// Drop keys that fail the predicate (e.g. rows that disappeared).
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) -> bool {
        let before = self.selected.len();
        self.selected.retain(|key| keep(key));
        before != self.selected.len()
    }

    /// Apply a row click.
    ///
    /// In single mode an unselected row replaces the selection and a selected
    /// row is left alone. In multi mode the modifiers pick the gesture, in
    /// this order: Ctrl+Shift extends from the furthest selected row, Shift
    /// replaces with the range from the closest selected row, Ctrl toggles,
    /// Alt selects only the clicked row, and a plain click on an unselected
    /// row selects only that row.
    pub fn click(
        &mut self,
        displayed: &[String],
        key: &str,
        modifiers: Modifiers,
        mode: SelectionMode,
    ) -> bool {
        match mode {
            SelectionMode::None => false,
            SelectionMode::Single => {
                if self.is_selected(key) {
                    false
                } else {
                    self.select(key)
                }
            }
            SelectionMode::Multiple => {
                if modifiers.ctrl && modifiers.shift {
                    self.range_select(displayed, key, RangeAnchor::Furthest, false)
                } else if modifiers.shift {
                    self.range_select(displayed, key, RangeAnchor::Closest, true)
                } else if modifiers.ctrl {
                    self.toggle(key)
                } else if modifiers.alt {
                    self.select(key)
                } else if self.is_selected(key) {
                    // Keep the multi-selection intact for a follow-up gesture.
                    false
                } else {
                    self.select(key)
                }
            }
        }
    }

    /// Select the range between the clicked row and a selected boundary row.
    ///
    /// With `replace` the range becomes the whole selection; otherwise it is
    /// added to the existing selection. When nothing is selected or the
    /// clicked row is not displayed, only the clicked row is selected.
    pub fn range_select(
        &mut self,
        displayed: &[String],
        key: &str,
        anchor: RangeAnchor,
        replace: bool,
    ) -> bool {
        let Some(range) = self.resolve_range(displayed, key, anchor) else {
            return if replace {
                self.select(key)
            } else {
                self.insert(key)
            };
        };

        if replace {
            let next: HashSet<String> = displayed[range].iter().cloned().collect();
            if next == self.selected {
                return false;
            }
            self.selected = next;
            true
        } else {
            let mut changed = false;
            for key in &displayed[range] {
                changed |= self.selected.insert(key.clone());
            }
            changed
        }
    }

    /// Find the inclusive index range between the clicked row and the
    /// furthest or closest selected row in the displayed sequence.
    pub fn resolve_range(
        &self,
        displayed: &[String],
        key: &str,
        anchor: RangeAnchor,
    ) -> Option<std::ops::RangeInclusive<usize>> {
        if self.selected.is_empty() {
            return None;
        }
        let clicked = displayed.iter().position(|k| k == key)?;

        let mut boundary: Option<(usize, usize)> = None;
        for (index, k) in displayed.iter().enumerate() {
            if !self.selected.contains(k) {
                continue;
            }
            let distance = index.abs_diff(clicked);
            let better = match (boundary, anchor) {
                (None, _) => true,
                (Some((_, best)), RangeAnchor::Furthest) => distance > best,
                (Some((_, best)), RangeAnchor::Closest) => distance < best,
            };
            if better {
                boundary = Some((index, distance));
            }
        }

        let (edge, _) = boundary?;
        Some(clicked.min(edge)..=clicked.max(edge))
    }

    /// Move the selection one row up or down.
    ///
    /// The topmost selected row is the pivot for `Up`, the bottommost for
    /// `Down`. With `extend` the adjacent row is added; otherwise it replaces
    /// the selection. With nothing selected the first row is selected. Moving
    /// past either end does nothing.
    pub fn navigate(&mut self, displayed: &[String], direction: Navigation, extend: bool) -> bool {
        let Some(first) = displayed.first() else {
            return false;
        };

        let mut selected_indices = displayed
            .iter()
            .enumerate()
            .filter(|(_, k)| self.selected.contains(*k))
            .map(|(i, _)| i);
        let Some(top) = selected_indices.next() else {
            return self.select(first);
        };
        let bottom = selected_indices.last().unwrap_or(top);

        let target = match direction {
            Navigation::Up => top.checked_sub(1),
            Navigation::Down => Some(bottom + 1).filter(|&i| i < displayed.len()),
        };
        let Some(target) = target else {
            return false;
        };

        let key = &displayed[target];
        if extend {
            self.insert(key)
        } else {
            self.select(key)
        }
    }
}

/// Swallows the synthetic click that follows a long press.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClickSuppression {
    deadline: Option<Instant>,
}

impl ClickSuppression {
    /// Start suppressing clicks after a long press at `at`.
    pub fn arm(&mut self, at: Instant) {
        self.deadline = Some(at + LONG_PRESS_SUPPRESSION);
    }

    /// Returns `true` if a click at `at` must be swallowed. Clears the window
    /// either way.
    pub fn should_swallow(&mut self, at: Instant) -> bool {
        self.deadline.take().is_some_and(|deadline| at < deadline)
    }

    /// Returns `true` while a suppression window is pending.
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }
}
