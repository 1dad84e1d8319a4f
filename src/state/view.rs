/// View controller
///
/// `Gallery` owns the catalog, the transient `ViewState` and the library.
/// Every user action is a method that mutates this state explicitly, so
/// the whole controller can be driven without a window.

use std::collections::BTreeMap;
use std::fmt;

use super::data::{Comment, ImageRecord, Rotation};
use super::library::Library;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOption {
    /// Lexicographic by filename
    Name,
    /// By id, which is manifest order
    #[default]
    Date,
    /// Most commented first
    Comments,
}

impl SortOption {
    pub const ALL: [SortOption; 3] = [SortOption::Name, SortOption::Date, SortOption::Comments];
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortOption::Name => "Name",
            SortOption::Date => "Date added",
            SortOption::Comments => "Most comments",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterOption {
    #[default]
    All,
    WithComments,
    WithoutComments,
    WithDescription,
    WithoutDescription,
}

impl FilterOption {
    pub const ALL: [FilterOption; 5] = [
        FilterOption::All,
        FilterOption::WithComments,
        FilterOption::WithoutComments,
        FilterOption::WithDescription,
        FilterOption::WithoutDescription,
    ];

    pub fn matches(self, record: &ImageRecord) -> bool {
        match self {
            FilterOption::All => true,
            FilterOption::WithComments => !record.comments.is_empty(),
            FilterOption::WithoutComments => record.comments.is_empty(),
            FilterOption::WithDescription => !record.description.is_empty(),
            FilterOption::WithoutDescription => record.description.is_empty(),
        }
    }
}

impl fmt::Display for FilterOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FilterOption::All => "All images",
            FilterOption::WithComments => "With comments",
            FilterOption::WithoutComments => "Without comments",
            FilterOption::WithDescription => "With description",
            FilterOption::WithoutDescription => "Without description",
        })
    }
}

/// True when the record's searchable text contains every whitespace-separated token of `term`
pub fn matches_search(record: &ImageRecord, term: &str) -> bool {
    let searchable = record.searchable_text();
    term.to_lowercase()
        .split_whitespace()
        .all(|token| searchable.contains(token))
}

/// Transient UI state. Never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    /// Cursor into `filtered`
    pub current_index: usize,
    /// Catalog positions of the visible images, in display order
    pub filtered: Vec<usize>,
    pub sort_option: SortOption,
    pub filter_option: FilterOption,
    /// Raw text of the last search, empty when the filter was applied last
    pub search_term: String,
    pub is_fullscreen: bool,
}

/// The view controller
#[derive(Debug)]
pub struct Gallery {
    catalog: Vec<ImageRecord>,
    state: ViewState,
    library: Library,
}

impl Gallery {
    pub fn new(library: Library) -> Self {
        Self {
            catalog: Vec::new(),
            state: ViewState::default(),
            library,
        }
    }

    /// Replace the catalog and show all of it from the start
    pub fn set_catalog(&mut self, catalog: Vec<ImageRecord>) {
        self.catalog = catalog;
        self.state.search_term.clear();
        self.state.filter_option = FilterOption::All;
        self.recompute(|_| true);
    }

    pub fn catalog(&self) -> &[ImageRecord] {
        &self.catalog
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    /// Visible images in display order
    pub fn filtered_images(&self) -> Vec<&ImageRecord> {
        self.state.filtered.iter().map(|&pos| &self.catalog[pos]).collect()
    }

    pub fn current(&self) -> Option<&ImageRecord> {
        self.state
            .filtered
            .get(self.state.current_index)
            .map(|&pos| &self.catalog[pos])
    }

    fn current_position(&self) -> Option<usize> {
        self.state.filtered.get(self.state.current_index).copied()
    }

    /// Rebuild `filtered` from the full catalog, apply the active sort and reset the cursor
    fn recompute(&mut self, keep: impl Fn(&ImageRecord) -> bool) {
        self.state.filtered = self
            .catalog
            .iter()
            .enumerate()
            .filter(|(_, record)| keep(*record))
            .map(|(pos, _)| pos)
            .collect();
        self.apply_sort();
        self.state.current_index = 0;
    }

    fn apply_sort(&mut self) {
        let catalog = &self.catalog;
        // sort_by is stable
        match self.state.sort_option {
            SortOption::Name => self
                .state
                .filtered
                .sort_by(|&a, &b| catalog[a].filename.cmp(&catalog[b].filename)),
            SortOption::Date => self
                .state
                .filtered
                .sort_by(|&a, &b| catalog[a].id.cmp(&catalog[b].id)),
            SortOption::Comments => self
                .state
                .filtered
                .sort_by(|&a, &b| catalog[b].comments.len().cmp(&catalog[a].comments.len())),
        }
    }

    /// Move the cursor by one, clamped to the visible range
    pub fn navigate(&mut self, direction: Direction) {
        let len = self.state.filtered.len();
        if len == 0 {
            return;
        }
        let index = &mut self.state.current_index;
        match direction {
            Direction::Previous => *index = index.saturating_sub(1),
            Direction::Next => *index = (*index + 1).min(len - 1),
        }
    }

    /// Show only images whose searchable text contains every token of `term`.
    /// Overrides any active filter.
    pub fn search(&mut self, term: &str) {
        self.state.search_term = term.to_string();
        self.state.filter_option = FilterOption::All;
        if term.trim().is_empty() {
            self.recompute(|_| true);
        } else {
            self.recompute(|record| matches_search(record, term));
        }
        tracing::debug!(term, visible = self.state.filtered.len(), "search applied");
    }

    /// Show only images matching `mode`. Overrides any active search.
    pub fn filter(&mut self, mode: FilterOption) {
        self.state.filter_option = mode;
        self.state.search_term.clear();
        self.recompute(|record| mode.matches(record));
        tracing::debug!(?mode, visible = self.state.filtered.len(), "filter applied");
    }

    /// Reorder the visible images in place
    pub fn sort(&mut self, mode: SortOption) {
        self.state.sort_option = mode;
        self.apply_sort();
    }

    /// Rotate the current image a quarter turn and persist the new angle
    pub fn rotate(&mut self, turn: Turn) -> Result<Option<Rotation>> {
        let Some(id) = self.current().map(|record| record.id) else {
            return Ok(None);
        };
        let current = self.library.rotation(id)?;
        let rotated = match turn {
            Turn::Left => current.left(),
            Turn::Right => current.right(),
        };
        self.library.set_rotation(id, rotated)?;
        tracing::debug!(%id, degrees = rotated.degrees(), "image rotated");
        Ok(Some(rotated))
    }

    /// Rotation of the current image, zero when nothing is shown
    pub fn current_rotation(&self) -> Result<Rotation> {
        match self.current() {
            Some(record) => self.library.rotation(record.id),
            None => Ok(Rotation::default()),
        }
    }

    /// Replace the current image's description and persist every description.
    /// Blank text is ignored and returns `false`.
    pub fn edit_description(&mut self, text: &str) -> Result<bool> {
        if text.trim().is_empty() {
            return Ok(false);
        }
        let Some(pos) = self.current_position() else {
            return Ok(false);
        };

        self.catalog[pos].description = text.to_string();

        let descriptions: BTreeMap<_, _> = self
            .catalog
            .iter()
            .map(|record| (record.id, record.description.clone()))
            .collect();
        self.library.set_descriptions(&descriptions)?;

        tracing::info!(id = %self.catalog[pos].id, "description updated");
        Ok(true)
    }

    /// Append a comment to the current image. Blank text is ignored and
    /// returns `false`.
    pub fn add_comment(&mut self, text: &str) -> Result<bool> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(false);
        }
        let Some(pos) = self.current_position() else {
            return Ok(false);
        };

        let id = self.catalog[pos].id;
        let comments = self.library.append_comment(id, Comment::now(text))?;
        self.catalog[pos].comments = comments;

        tracing::info!(%id, "comment added");
        Ok(true)
    }

    pub fn toggle_fullscreen(&mut self) -> bool {
        self.state.is_fullscreen = !self.state.is_fullscreen;
        self.state.is_fullscreen
    }

    /// Leave fullscreen. Returns `true` if it was active.
    pub fn exit_fullscreen(&mut self) -> bool {
        std::mem::replace(&mut self.state.is_fullscreen, false)
    }
}
