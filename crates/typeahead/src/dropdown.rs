//! Dropdown state: visibility, rendered rows and the active row.
//!
//! The dropdown is pure state; the instance mirrors it into the document
//! after every change.

use crate::candidate::Candidate;

/// What the dropdown currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DropdownContent {
    /// Nothing rendered yet.
    #[default]
    Empty,
    /// A single non-selectable "no results" row.
    NoResults,
    /// Selectable rows in provider order.
    Rows(Vec<Candidate>),
}

/// Dropdown state of one instance.
#[derive(Debug, Clone, Default)]
pub struct Dropdown {
    visible: bool,
    content: DropdownContent,
    active: Option<usize>,
}

impl Dropdown {
    /// Creates a hidden, empty dropdown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders `results` and shows the dropdown. The active row is reset.
    pub fn show(&mut self, results: Vec<Candidate>) {
        self.content = if results.is_empty() {
            DropdownContent::NoResults
        } else {
            DropdownContent::Rows(results)
        };
        self.active = None;
        self.visible = true;
    }

    /// Hides the dropdown. Rows and the active index are kept.
    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Returns true if the dropdown is shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The rendered content.
    pub fn content(&self) -> &DropdownContent {
        &self.content
    }

    /// The selectable rows.
    pub fn rows(&self) -> &[Candidate] {
        match &self.content {
            DropdownContent::Rows(rows) => rows,
            _ => &[],
        }
    }

    /// Index of the active row.
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// The candidate of the active row.
    pub fn active_candidate(&self) -> Option<&Candidate> {
        self.active.and_then(|i| self.rows().get(i))
    }

    /// Moves the active row down, clamping at the last row. Ignored while
    /// hidden.
    ///
    /// Returns true if the active row changed.
    pub fn move_down(&mut self) -> bool {
        self.visible && self.set_active(next_index(self.active, self.rows().len()))
    }

    /// Moves the active row up, clamping at the first row. Ignored while
    /// hidden.
    ///
    /// Returns true if the active row changed.
    pub fn move_up(&mut self) -> bool {
        self.visible && self.set_active(prev_index(self.active, self.rows().len()))
    }

    fn set_active(&mut self, next: Option<usize>) -> bool {
        let changed = next != self.active;
        self.active = next;
        changed
    }
}

/// The row after `active`: the first row when nothing is active, never past
/// the last row. `None` when there are no rows.
pub fn next_index(active: Option<usize>, rows: usize) -> Option<usize> {
    if rows == 0 {
        return None;
    }
    Some(match active {
        None => 0,
        Some(i) => (i + 1).min(rows - 1),
    })
}

/// The row before `active`: the first row when nothing is active, never
/// before the first row. `None` when there are no rows.
pub fn prev_index(active: Option<usize>, rows: usize) -> Option<usize> {
    if rows == 0 {
        return None;
    }
    Some(match active {
        None => 0,
        Some(i) => i.saturating_sub(1).min(rows - 1),
    })
}
