use clap::Parser;
use iced::keyboard::{self, key::Named, Key};
use iced::widget::{
    button, column, container, pick_list, row, scrollable, text, text_input, Column,
};
use iced::{window, Alignment, Degrees, Element, Length, Radians, Rotation, Subscription, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use gallery_viewer::config::{Args, GalleryConfig};
use gallery_viewer::error::Result;
use gallery_viewer::state::catalog::{self, Manifest};
use gallery_viewer::state::library::Library;
use gallery_viewer::state::store::{MemoryStore, SqliteStore};
use gallery_viewer::state::view::{Direction, FilterOption, Gallery, SortOption, Turn};
use gallery_viewer::ui::gallery::{GalleryView, EMPTY_PLACEHOLDER, NO_COMMENTS};

/// Main application state
struct GalleryApp {
    /// View controller owning the catalog and the library
    gallery: Gallery,
    config: GalleryConfig,
    /// View model rebuilt after every state change
    view: GalleryView,
    search: String,
    comment_draft: String,
    /// Some while the description editor is open
    description_draft: Option<String>,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// Background manifest read finished
    ManifestLoaded(std::result::Result<Manifest, String>),
    Previous,
    Next,
    SearchChanged(String),
    FilterSelected(FilterOption),
    SortSelected(SortOption),
    RotateLeft,
    RotateRight,
    EditDescription,
    DescriptionChanged(String),
    SaveDescription,
    CancelDescription,
    CommentChanged(String),
    SubmitComment,
    ToggleFullscreen,
    ExitFullscreen,
    /// User clicked the "Open Folder" button
    OpenFolder,
    /// Manifest of the picked folder was read, or scanned and written
    FolderOpened(std::result::Result<(PathBuf, Manifest), String>),
}

impl GalleryApp {
    /// Create the application and start reading the manifest
    fn new(config: GalleryConfig, library: Library) -> (Self, Task<Message>) {
        let manifest_path = config.manifest_path();
        tracing::info!(manifest = %manifest_path.display(), "gallery starting");

        let gallery = Gallery::new(library);
        let view = GalleryView::build(&gallery, &config.images_dir);

        (
            GalleryApp {
                gallery,
                config,
                view,
                search: String::new(),
                comment_draft: String::new(),
                description_draft: None,
                status: String::from("Loading..."),
            },
            Task::perform(
                catalog::read_manifest_async(manifest_path),
                Message::ManifestLoaded,
            ),
        )
    }

    fn title(&self) -> String {
        format!("Gallery Viewer - {}", self.view.title())
    }

    /// Rebuild the view model from the controller
    fn refresh(&mut self) {
        self.view = self.view.rebuild(&self.gallery, &self.config.images_dir);
    }

    /// Log a failed action and show it in the status line
    fn report<T>(&mut self, action: &str, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(action, "action failed: {}", e);
                self.status = format!("Could not {}: {}", action, e);
                None
            }
        }
    }

    fn set_fullscreen(&self, fullscreen: bool) -> Task<Message> {
        let mode = if fullscreen {
            window::Mode::Fullscreen
        } else {
            window::Mode::Windowed
        };
        window::get_latest().and_then(move |id| window::change_mode(id, mode))
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        let task = match message {
            Message::ManifestLoaded(Ok(manifest)) => {
                let records = catalog::from_manifest(&manifest, self.gallery.library());
                self.status = format!("{} images in catalog.", records.len());
                self.gallery.set_catalog(records);
                self.search.clear();
                Task::none()
            }
            Message::ManifestLoaded(Err(e)) => {
                tracing::error!("error loading manifest: {}", e);
                self.gallery.set_catalog(Vec::new());
                self.status = e;
                Task::none()
            }
            Message::Previous => {
                self.description_draft = None;
                self.gallery.navigate(Direction::Previous);
                Task::none()
            }
            Message::Next => {
                self.description_draft = None;
                self.gallery.navigate(Direction::Next);
                Task::none()
            }
            Message::SearchChanged(term) => {
                self.description_draft = None;
                self.gallery.search(&term);
                self.search = term;
                Task::none()
            }
            Message::FilterSelected(mode) => {
                self.description_draft = None;
                self.gallery.filter(mode);
                self.search.clear();
                Task::none()
            }
            Message::SortSelected(mode) => {
                self.gallery.sort(mode);
                Task::none()
            }
            Message::RotateLeft => {
                let result = self.gallery.rotate(Turn::Left);
                self.report("rotate image", result);
                Task::none()
            }
            Message::RotateRight => {
                let result = self.gallery.rotate(Turn::Right);
                self.report("rotate image", result);
                Task::none()
            }
            Message::EditDescription => {
                self.description_draft = self
                    .gallery
                    .current()
                    .map(|record| record.description.clone());
                Task::none()
            }
            Message::DescriptionChanged(value) => {
                if let Some(draft) = self.description_draft.as_mut() {
                    *draft = value;
                }
                Task::none()
            }
            Message::SaveDescription => {
                if let Some(draft) = self.description_draft.take() {
                    let result = self.gallery.edit_description(&draft);
                    if self.report("save description", result) == Some(true) {
                        self.status = String::from("Description saved.");
                    }
                }
                Task::none()
            }
            Message::CancelDescription => {
                self.description_draft = None;
                Task::none()
            }
            Message::CommentChanged(value) => {
                self.comment_draft = value;
                Task::none()
            }
            Message::SubmitComment => {
                let result = self.gallery.add_comment(&self.comment_draft);
                if self.report("add comment", result) == Some(true) {
                    self.comment_draft.clear();
                }
                Task::none()
            }
            Message::ToggleFullscreen => {
                let fullscreen = self.gallery.toggle_fullscreen();
                self.set_fullscreen(fullscreen)
            }
            Message::ExitFullscreen => {
                if self.gallery.exit_fullscreen() {
                    self.set_fullscreen(false)
                } else {
                    Task::none()
                }
            }
            Message::OpenFolder => {
                // Show the native folder picker dialog
                let folder = FileDialog::new()
                    .set_title("Select Folder with Images")
                    .pick_folder();

                match folder {
                    Some(folder) => {
                        self.status = format!("Opening {}...", folder.display());
                        Task::perform(catalog::open_folder_async(folder), Message::FolderOpened)
                    }
                    None => Task::none(),
                }
            }
            Message::FolderOpened(Ok((folder, manifest))) => {
                self.config.images_dir = folder;
                self.config.manifest = None;
                let records = catalog::from_manifest(&manifest, self.gallery.library());
                self.status = format!("{} images in catalog.", records.len());
                self.gallery.set_catalog(records);
                self.search.clear();
                self.description_draft = None;
                Task::none()
            }
            Message::FolderOpened(Err(e)) => {
                tracing::error!("opening folder failed: {}", e);
                self.status = format!("Could not open folder: {}", e);
                Task::none()
            }
        };

        self.refresh();
        task
    }

    fn subscription(&self) -> Subscription<Message> {
        keyboard::on_key_press(handle_key)
    }

    fn image_panel(&self) -> Element<'_, Message> {
        match &self.view.image {
            Some(image) => match &image.load_error {
                Some(alt) => text(alt.as_str()).size(18).into(),
                None => iced::widget::image(iced::widget::image::Handle::from_path(
                    image.path.clone(),
                ))
                .rotation(Rotation::Solid(Radians::from(Degrees(
                    image.rotation_degrees as f32,
                ))))
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            },
            None => text(EMPTY_PLACEHOLDER).size(24).into(),
        }
    }

    fn details_panel(&self) -> Element<'_, Message> {
        let Some(image) = &self.view.image else {
            return Column::new().into();
        };

        let description: Element<'_, Message> = match &self.description_draft {
            Some(draft) => row![
                text_input("Describe this image", draft)
                    .on_input(Message::DescriptionChanged)
                    .on_submit(Message::SaveDescription),
                button("Save").on_press(Message::SaveDescription),
                button("Cancel").on_press(Message::CancelDescription),
            ]
            .spacing(8)
            .into(),
            None => row![
                text(image.description.as_str()).width(Length::Fill),
                button("Edit").on_press(Message::EditDescription),
            ]
            .spacing(8)
            .align_y(Alignment::Center)
            .into(),
        };

        let comments: Element<'_, Message> = if image.comments.is_empty() {
            text(NO_COMMENTS).size(14).into()
        } else {
            Column::with_children(image.comments.iter().map(|comment| {
                column![
                    text(comment.text.as_str()),
                    text(comment.posted_at.as_str()).size(12),
                ]
                .spacing(2)
                .into()
            }))
            .spacing(10)
            .into()
        };

        column![
            description,
            text("Comments").size(18),
            scrollable(comments).height(Length::Fill),
            text_input("Add a comment", &self.comment_draft)
                .on_input(Message::CommentChanged)
                .on_submit(Message::SubmitComment),
        ]
        .spacing(12)
        .width(Length::Fixed(320.0))
        .into()
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        if self.view.fullscreen {
            return container(
                column![
                    button("Exit fullscreen").on_press(Message::ToggleFullscreen),
                    self.image_panel(),
                ]
                .spacing(8)
                .align_x(Alignment::End),
            )
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(8)
            .into();
        }

        let toolbar = row![
            text_input("Search images...", &self.search)
                .on_input(Message::SearchChanged)
                .width(Length::Fill),
            pick_list(
                FilterOption::ALL,
                Some(self.gallery.state().filter_option),
                Message::FilterSelected,
            ),
            pick_list(
                SortOption::ALL,
                Some(self.gallery.state().sort_option),
                Message::SortSelected,
            ),
            button("Open Folder").on_press(Message::OpenFolder),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        let controls = row![
            button("Previous").on_press_maybe(self.view.can_go_previous.then_some(Message::Previous)),
            text(self.view.position.as_str()),
            button("Next").on_press_maybe(self.view.can_go_next.then_some(Message::Next)),
            button("Rotate left").on_press_maybe(self.view.image.as_ref().map(|_| Message::RotateLeft)),
            button("Rotate right").on_press_maybe(self.view.image.as_ref().map(|_| Message::RotateRight)),
            button("Fullscreen").on_press(Message::ToggleFullscreen),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        let content = column![
            toolbar,
            text(self.view.search_summary.as_str()).size(14),
            text(self.view.title()).size(28),
            row![
                container(self.image_panel())
                    .width(Length::Fill)
                    .height(Length::Fill)
                    .center_x(Length::Fill)
                    .center_y(Length::Fill),
                self.details_panel(),
            ]
            .spacing(20)
            .height(Length::Fill),
            controls,
            text(self.status.as_str()).size(14),
        ]
        .spacing(12)
        .padding(20);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Arrow keys navigate and rotate, Escape leaves fullscreen
fn handle_key(key: Key, _modifiers: keyboard::Modifiers) -> Option<Message> {
    match key {
        Key::Named(Named::ArrowLeft) => Some(Message::Previous),
        Key::Named(Named::ArrowRight) => Some(Message::Next),
        Key::Named(Named::ArrowUp) => Some(Message::RotateLeft),
        Key::Named(Named::ArrowDown) => Some(Message::RotateRight),
        Key::Named(Named::Escape) => Some(Message::ExitFullscreen),
        _ => None,
    }
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Open the SQLite library, falling back to memory so the viewer still works
fn open_library(config: &GalleryConfig) -> Library {
    match SqliteStore::open(&config.database) {
        Ok(store) => Library::new(store),
        Err(e) => {
            tracing::warn!(
                path = %config.database.display(),
                "database unavailable, changes will not be saved: {}",
                e
            );
            Library::new(MemoryStore::new())
        }
    }
}

fn main() -> iced::Result {
    let args = Args::parse();

    let (config, config_error) = match GalleryConfig::resolve(&args) {
        Ok(config) => (config, None),
        Err(e) => {
            let mut config = GalleryConfig::default();
            config.apply_args(&args);
            (config, Some(e))
        }
    };

    init_tracing(&config.log_filter);
    if let Some(e) = config_error {
        tracing::warn!("ignoring config file: {}", e);
    }

    if args.scan {
        let manifest = catalog::scan_directory(&config.images_dir);
        if let Err(e) = catalog::write_manifest(&config.manifest_path(), &manifest) {
            tracing::error!("failed to write manifest: {}", e);
        }
    }

    let library = open_library(&config);

    iced::application(GalleryApp::title, GalleryApp::update, GalleryApp::view)
        .subscription(GalleryApp::subscription)
        .theme(GalleryApp::theme)
        .centered()
        .run_with(move || GalleryApp::new(config, library))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(key: Key) -> Option<Message> {
        handle_key(key, keyboard::Modifiers::default())
    }

    #[test]
    fn test_arrow_keys_navigate_and_rotate() {
        assert!(matches!(press(Key::Named(Named::ArrowLeft)), Some(Message::Previous)));
        assert!(matches!(press(Key::Named(Named::ArrowRight)), Some(Message::Next)));
        assert!(matches!(press(Key::Named(Named::ArrowUp)), Some(Message::RotateLeft)));
        assert!(matches!(press(Key::Named(Named::ArrowDown)), Some(Message::RotateRight)));
    }

    #[test]
    fn test_escape_exits_fullscreen() {
        assert!(matches!(press(Key::Named(Named::Escape)), Some(Message::ExitFullscreen)));
    }

    #[test]
    fn test_other_keys_are_ignored() {
        assert!(press(Key::Named(Named::Enter)).is_none());
        assert!(press(Key::Character("a".into())).is_none());
    }
}
