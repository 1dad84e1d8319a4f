/// Typed view model for the gallery window
///
/// Built from the controller after every state change. The iced view
/// only reads from it, so everything shown on screen can be tested here.

use chrono::Local;
use std::path::{Path, PathBuf};

use crate::state::view::{FilterOption, Gallery};

pub const EMPTY_PLACEHOLDER: &str = "No images found";
pub const NO_COMMENTS: &str = "No comments yet. Be the first to comment!";
pub const LOAD_FAILED: &str = "Failed to load image";

#[derive(Debug, Clone, PartialEq)]
pub struct CommentView {
    pub text: String,
    /// Local time, e.g. "2024-03-01 11:15"
    pub posted_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageView {
    pub id: String,
    pub path: PathBuf,
    pub name: String,
    pub description: String,
    pub rotation_degrees: u16,
    pub comments: Vec<CommentView>,
    /// Alt text shown instead of the image when it cannot be read
    pub load_error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GalleryView {
    /// `None` renders the empty placeholder
    pub image: Option<ImageView>,
    pub position: String,
    pub can_go_previous: bool,
    pub can_go_next: bool,
    pub search_summary: String,
    pub fullscreen: bool,
}

/// Summary line under the search box.
///
/// Counts are reported whenever a search term or a filter narrows the list.
pub fn search_summary(term: &str, filter: FilterOption, shown: usize, total: usize) -> String {
    if term.trim().is_empty() && filter == FilterOption::All {
        format!("Showing all {} images", total)
    } else if shown == 0 {
        "No matching images found".to_string()
    } else {
        format!("Showing {} of {} images", shown, total)
    }
}

/// Check that the file exists and has a readable image header
fn check_image(path: &Path) -> Option<String> {
    match image::image_dimensions(path) {
        Ok(_) => None,
        Err(e) => {
            tracing::error!(path = %path.display(), "failed to load image: {}", e);
            Some(LOAD_FAILED.to_string())
        }
    }
}

impl GalleryView {
    pub fn build(gallery: &Gallery, images_dir: &Path) -> Self {
        Self::build_with(gallery, images_dir, check_image)
    }

    /// Build the next view, reusing the load check while the image path is unchanged
    pub fn rebuild(&self, gallery: &Gallery, images_dir: &Path) -> Self {
        let previous = self.image.as_ref();
        Self::build_with(gallery, images_dir, |path| match previous {
            Some(image) if image.path == path => image.load_error.clone(),
            _ => check_image(path),
        })
    }

    fn build_with(
        gallery: &Gallery,
        images_dir: &Path,
        check: impl FnOnce(&Path) -> Option<String>,
    ) -> Self {
        let state = gallery.state();
        let shown = state.filtered.len();

        let image = gallery.current().map(|record| {
            let path = images_dir.join(&record.filename);
            let rotation = gallery.current_rotation().unwrap_or_else(|e| {
                tracing::warn!(id = %record.id, "using default rotation: {}", e);
                Default::default()
            });

            ImageView {
                id: record.id.to_string(),
                load_error: check(&path),
                path,
                name: record.name.clone(),
                description: record.description.clone(),
                rotation_degrees: rotation.degrees(),
                comments: record
                    .comments
                    .iter()
                    .map(|comment| CommentView {
                        text: comment.text.clone(),
                        posted_at: comment
                            .timestamp
                            .with_timezone(&Local)
                            .format("%Y-%m-%d %H:%M")
                            .to_string(),
                    })
                    .collect(),
            }
        });

        Self {
            position: if shown == 0 {
                String::new()
            } else {
                format!("{} / {}", state.current_index + 1, shown)
            },
            can_go_previous: shown > 0 && state.current_index > 0,
            can_go_next: shown > 0 && state.current_index + 1 < shown,
            search_summary: search_summary(
                &state.search_term,
                state.filter_option,
                shown,
                gallery.catalog().len(),
            ),
            fullscreen: state.is_fullscreen,
            image,
        }
    }

    /// Title line: the image name or the empty placeholder
    pub fn title(&self) -> &str {
        self.image
            .as_ref()
            .map(|image| image.name.as_str())
            .unwrap_or(EMPTY_PLACEHOLDER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::catalog::{build_records, Manifest};
    use crate::state::library::Library;
    use crate::state::store::MemoryStore;
    use crate::state::view::{Direction, Turn};

    fn gallery(files: &[&str]) -> Gallery {
        let manifest = Manifest {
            images: files.iter().map(|f| f.to_string()).collect(),
        };
        let mut gallery = Gallery::new(Library::new(MemoryStore::new()));
        gallery.set_catalog(build_records(&manifest));
        gallery
    }

    #[test]
    fn test_empty_catalog_shows_placeholder() {
        let view = GalleryView::build(&gallery(&[]), Path::new("images"));
        assert!(view.image.is_none());
        assert_eq!(view.title(), EMPTY_PLACEHOLDER);
        assert_eq!(view.search_summary, "Showing all 0 images");
        assert!(!view.can_go_previous && !view.can_go_next);
    }

    #[test]
    fn test_current_image_fields() {
        let dir = tempfile::tempdir().unwrap();
        image::RgbImage::new(2, 2)
            .save(dir.path().join("first_shot.png"))
            .unwrap();

        let mut gallery = gallery(&["first_shot.png", "missing.jpg"]);
        gallery.rotate(Turn::Left).unwrap();
        gallery.add_comment("sharp").unwrap();
        gallery.edit_description("morning light").unwrap();

        let view = GalleryView::build(&gallery, dir.path());
        let image = view.image.as_ref().unwrap();
        assert_eq!(view.title(), "first shot");
        assert_eq!(image.id, "1");
        assert_eq!(image.description, "morning light");
        assert_eq!(image.rotation_degrees, 270);
        assert_eq!(image.comments.len(), 1);
        assert_eq!(image.comments[0].text, "sharp");
        assert_eq!(image.load_error, None);
        assert_eq!(view.position, "1 / 2");
        assert!(!view.can_go_previous);
        assert!(view.can_go_next);

        gallery.navigate(Direction::Next);
        let view = GalleryView::build(&gallery, dir.path());
        let image = view.image.as_ref().unwrap();
        assert_eq!(image.load_error.as_deref(), Some(LOAD_FAILED));
        assert_eq!(image.rotation_degrees, 0);
        assert!(image.comments.is_empty());
        assert_eq!(view.position, "2 / 2");
        assert!(view.can_go_previous && !view.can_go_next);
    }

    #[test]
    fn test_search_summary_lines() {
        assert_eq!(search_summary("", FilterOption::All, 4, 4), "Showing all 4 images");
        assert_eq!(search_summary("zzz", FilterOption::All, 0, 4), "No matching images found");
        assert_eq!(search_summary("cat", FilterOption::All, 2, 4), "Showing 2 of 4 images");

        let mut gallery = gallery(&["cat.jpg", "dog.jpg"]);
        gallery.search("cat");
        let view = GalleryView::build(&gallery, Path::new("images"));
        assert_eq!(view.search_summary, "Showing 1 of 2 images");
    }

    #[test]
    fn test_filter_summary_counts_narrowed_list() {
        let mut gallery = gallery(&["a.jpg", "b.jpg", "c.jpg"]);
        gallery.add_comment("nice").unwrap();

        gallery.filter(FilterOption::WithComments);
        let view = GalleryView::build(&gallery, Path::new("images"));
        assert_eq!(view.search_summary, "Showing 1 of 3 images");

        gallery.filter(FilterOption::WithDescription);
        let view = GalleryView::build(&gallery, Path::new("images"));
        assert_eq!(view.search_summary, "No matching images found");

        gallery.filter(FilterOption::All);
        let view = GalleryView::build(&gallery, Path::new("images"));
        assert_eq!(view.search_summary, "Showing all 3 images");
    }

    #[test]
    fn test_rebuild_reuses_load_check_for_same_image() {
        let dir = tempfile::tempdir().unwrap();
        image::RgbImage::new(2, 2).save(dir.path().join("b.png")).unwrap();
        let mut gallery = gallery(&["a.png", "b.png"]);

        let view = GalleryView::build(&gallery, dir.path());
        assert_eq!(view.image.as_ref().unwrap().load_error.as_deref(), Some(LOAD_FAILED));

        // Same image: the earlier result stands even though the file now exists
        image::RgbImage::new(2, 2).save(dir.path().join("a.png")).unwrap();
        gallery.search("a");
        let view = view.rebuild(&gallery, dir.path());
        assert_eq!(view.image.as_ref().unwrap().load_error.as_deref(), Some(LOAD_FAILED));

        gallery.search("");
        gallery.navigate(Direction::Next);
        let view = view.rebuild(&gallery, dir.path());
        assert_eq!(view.image.as_ref().unwrap().path, dir.path().join("b.png"));
        assert_eq!(view.image.as_ref().unwrap().load_error, None);

        gallery.navigate(Direction::Previous);
        let view = view.rebuild(&gallery, dir.path());
        assert_eq!(view.image.as_ref().unwrap().load_error, None);
    }
}
