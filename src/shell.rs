/// Gallery shell
///
/// The non-visual half of the presentation layer. It owns the store and the
/// gallery state for the whole session, turns user `Message`s into store
/// mutations followed by a gallery reload, and keeps a one-line status
/// message describing the outcome of the last admin action.

use log::{info, warn};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use thiserror::Error;

use crate::artwork::samples;
use crate::state::data::ArtworkId;
use crate::state::error::StoreResult;
use crate::state::gallery::{GalleryState, ListView};
use crate::state::store::ArtworkStore;

/// Where the image for an add/edit comes from
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// An image file on disk
    File(PathBuf),
    /// One of the built-in sample images (1-5)
    Sample(u32),
}

/// Fields entered for an add or edit
#[derive(Debug, Clone, PartialEq)]
pub struct ArtworkForm {
    pub title: String,
    pub artist: String,
    pub description: String,
    /// `None` on edit keeps the current image; on add it means sample 1
    pub image: Option<ImageSource>,
}

/// Application messages (user commands)
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Next,
    Previous,
    SelectIndex(usize),
    OpenId(ArtworkId),
    ZoomIn,
    ZoomOut,
    Add(ArtworkForm),
    Edit(ArtworkForm),
    DeleteCurrent,
    LoadSamples,
    ClearSamples,
    ClearAll,
    Refresh,
    Count,
    List,
    Show,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("Unknown command '{0}'. Type 'help' for a list of commands.")]
    Unknown(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
    #[error("'{0}' is not a valid number")]
    InvalidNumber(String),
}

impl Message {
    /// Parse one line of user input
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        let message = match command.to_lowercase().as_str() {
            "next" | "n" => Message::Next,
            "prev" | "previous" | "p" => Message::Previous,
            "zoom+" | "+" | "=" => Message::ZoomIn,
            "zoom-" | "-" => Message::ZoomOut,
            "select" => Message::SelectIndex(parse_number(rest, "select")?),
            "open" => Message::OpenId(parse_number(rest, "open")?),
            "add" => Message::Add(parse_form(rest, "add")?),
            "edit" => Message::Edit(parse_form(rest, "edit")?),
            "delete" => Message::DeleteCurrent,
            "load-samples" => Message::LoadSamples,
            "clear-samples" => Message::ClearSamples,
            "clear-all" => Message::ClearAll,
            "refresh" => Message::Refresh,
            "count" => Message::Count,
            "list" | "ls" => Message::List,
            "show" => Message::Show,
            "help" | "?" => Message::Help,
            "quit" | "exit" | "q" => Message::Quit,
            _ => return Err(ParseError::Unknown(command.to_string())),
        };

        Ok(message)
    }
}

fn parse_number<T: std::str::FromStr>(text: &str, command: &'static str) -> Result<T, ParseError> {
    if text.is_empty() {
        return Err(ParseError::MissingArgument(command));
    }
    text.parse()
        .map_err(|_| ParseError::InvalidNumber(text.to_string()))
}

/// `title|artist|description[|image]`, where image is a sample number or a file path
fn parse_form(text: &str, command: &'static str) -> Result<ArtworkForm, ParseError> {
    if text.is_empty() {
        return Err(ParseError::MissingArgument(command));
    }

    let mut fields = text.splitn(4, '|').map(str::trim);
    let title = fields.next().unwrap_or_default().to_string();
    let artist = fields.next().unwrap_or_default().to_string();
    let description = fields.next().unwrap_or_default().to_string();
    let image = fields.next().filter(|s| !s.is_empty()).map(|s| match s.parse() {
        Ok(kind) => ImageSource::Sample(kind),
        Err(_) => ImageSource::File(PathBuf::from(s)),
    });

    Ok(ArtworkForm {
        title,
        artist,
        description,
        image,
    })
}

/// Whether the shell loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// What `view` renders below the caption
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Panel {
    Artwork,
    List,
    Help,
}

/// Text list of artworks kept in sync by the gallery
#[derive(Debug, Default)]
pub struct ArtworkList {
    pub labels: Vec<String>,
    pub selected: Option<usize>,
}

/// Shared handle so the shell can read what the gallery last pushed
#[derive(Debug, Clone, Default)]
pub struct SharedListView(Rc<RefCell<ArtworkList>>);

impl ListView for SharedListView {
    fn populate(&mut self, labels: &[String]) {
        self.0.borrow_mut().labels = labels.to_vec();
    }

    fn select(&mut self, index: Option<usize>) {
        self.0.borrow_mut().selected = index;
    }
}

const HELP: &str = "\
Commands:
  next | prev                 browse artworks
  select <n>                  select the n-th artwork (0-based)
  open <id>                   select the artwork with this ID
  zoom+ | zoom-               zoom the current artwork
  add t|a|d[|image]           add an artwork (image = file path or sample 1-5)
  edit t|a|d[|image]          edit the current artwork (no image keeps it)
  delete                      delete the current artwork
  load-samples                insert the five sample artworks
  clear-samples | clear-all   remove sample artworks / every artwork
  refresh | count | list | show | help | quit";

/// Main application state
pub struct GalleryShell {
    /// The artwork store, owned for the whole session
    store: ArtworkStore,
    gallery: GalleryState,
    list: SharedListView,
    /// Status message to display to the user
    status: String,
    panel: Panel,
}

impl GalleryShell {
    /// Create the shell around an initialized store and load the gallery
    pub fn new(store: ArtworkStore) -> Self {
        let list = SharedListView::default();
        let mut gallery = GalleryState::new();
        gallery.attach_view(Box::new(list.clone()));

        let mut shell = Self {
            store,
            gallery,
            list,
            status: String::new(),
            panel: Panel::Artwork,
        };

        shell.status = if !shell.reload_gallery() {
            "Failed to load artworks!".to_string()
        } else if shell.gallery.is_empty() {
            "No artworks in database. Type 'load-samples' to add sample artworks.".to_string()
        } else {
            format!("Ready. {} artworks in gallery.", shell.gallery.len())
        };

        shell
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn gallery(&self) -> &GalleryState {
        &self.gallery
    }

    pub fn store(&self) -> &ArtworkStore {
        &self.store
    }

    /// Handle a message and update state
    pub fn update(&mut self, message: Message) -> Control {
        self.panel = Panel::Artwork;

        match message {
            Message::Next => {
                self.gallery.select_next();
            }
            Message::Previous => {
                self.gallery.select_previous();
            }
            Message::SelectIndex(index) => {
                if !self.gallery.select_index(index) {
                    self.status = format!("No artwork at position {}", index);
                }
            }
            Message::OpenId(id) => self.open_id(id),
            Message::ZoomIn => {
                self.gallery.zoom_in();
            }
            Message::ZoomOut => {
                self.gallery.zoom_out();
            }
            Message::Add(form) => self.add_artwork(form),
            Message::Edit(form) => self.edit_current(form),
            Message::DeleteCurrent => self.delete_current(),
            Message::LoadSamples => self.load_samples(),
            Message::ClearSamples => {
                match self.store.delete_samples() {
                    Ok(_) => self.finish_admin("Sample artworks removed".to_string(), true),
                    Err(_) => self.finish_admin("Failed to remove samples".to_string(), false),
                }
            }
            Message::ClearAll => {
                match self.store.delete_all() {
                    Ok(_) => self.finish_admin("All artworks removed".to_string(), true),
                    Err(_) => self.finish_admin("Failed to clear all artworks".to_string(), false),
                }
            }
            Message::Refresh => {
                self.status = if self.reload_gallery() {
                    format!("Gallery refreshed. Total artworks: {}", self.gallery.len())
                } else {
                    "Failed to refresh gallery!".to_string()
                };
            }
            Message::Count => {
                self.status = match self.store.count() {
                    Ok(count) => format!("Total artworks in database: {}", count),
                    Err(_) => "Failed to count artworks!".to_string(),
                };
            }
            Message::List => self.panel = Panel::List,
            Message::Show => {}
            Message::Help => self.panel = Panel::Help,
            Message::Quit => return Control::Quit,
        }

        Control::Continue
    }

    /// Caption lines for the current artwork
    pub fn caption(&self) -> Vec<String> {
        match self.gallery.current_record() {
            Some(current) => {
                let mut lines = vec![
                    format!("Title: {} (ID: {})", current.title, current.id),
                    format!("Artist: {}", current.artist),
                ];
                if !current.description.is_empty() {
                    lines.push(current.description.clone());
                }
                match &current.image {
                    Some(image) => lines.push(format!(
                        "[{}x{} image at {:.0}%]",
                        image.width(),
                        image.height(),
                        self.gallery.zoom() * 100.0
                    )),
                    None => lines.push("[image unavailable]".to_string()),
                }
                lines
            }
            None => vec!["No Artworks Available".to_string()],
        }
    }

    /// Render the screen as text
    pub fn view(&self) -> String {
        let mut lines = match self.panel {
            Panel::Artwork => self.caption(),
            Panel::List => {
                let list = self.list.0.borrow();
                let rows: Vec<String> = list
                    .labels
                    .iter()
                    .enumerate()
                    .map(|(i, label)| {
                        let marker = if list.selected == Some(i) { ">" } else { " " };
                        format!("{} {:>3}  {}", marker, i, label)
                    })
                    .collect();
                if rows.is_empty() {
                    vec!["(no artworks)".to_string()]
                } else {
                    rows
                }
            }
            Panel::Help => HELP.lines().map(str::to_string).collect(),
        };

        if self.panel == Panel::Artwork && !self.gallery.is_empty() {
            let position = self.gallery.current_index().map_or(0, |i| i + 1);
            let mut nav = format!("{}/{}", position, self.gallery.len());
            if self.gallery.can_select_previous() {
                nav = format!("◄ {}", nav);
            }
            if self.gallery.can_select_next() {
                nav = format!("{} ►", nav);
            }
            lines.push(nav);
        }

        if !self.status().is_empty() {
            lines.push(format!("» {}", self.status()));
        }
        lines.join("\n")
    }

    /// Release the store. Called once at the end of the session.
    pub fn shutdown(mut self) -> StoreResult<()> {
        self.store.close()
    }

    // ========== Admin actions ==========

    fn add_artwork(&mut self, form: ArtworkForm) {
        let Some(form) = self.validated(form) else {
            return;
        };

        let result = match form.image {
            Some(ImageSource::File(path)) => {
                self.store
                    .insert_from_file(&form.title, &form.artist, &form.description, &path)
            }
            Some(ImageSource::Sample(kind)) => self.store.insert(
                &form.title,
                &form.artist,
                &form.description,
                &samples::sample_image(kind),
            ),
            None => self.store.insert(
                &form.title,
                &form.artist,
                &form.description,
                &samples::sample_image(1),
            ),
        };

        match result {
            Ok(id) => {
                self.finish_admin("Artwork added successfully!".to_string(), true);
                self.gallery.select_id(id);
            }
            Err(_) => self.finish_admin("Failed to add artwork!".to_string(), false),
        }
    }

    fn edit_current(&mut self, form: ArtworkForm) {
        let Some((id, current_image)) = self
            .gallery
            .current_record()
            .map(|r| (r.id, r.image.clone()))
        else {
            self.status = "No artwork selected".to_string();
            return;
        };
        let Some(form) = self.validated(form) else {
            return;
        };

        let result = match form.image {
            Some(ImageSource::File(path)) => {
                self.store
                    .update_from_file(id, &form.title, &form.artist, &form.description, &path)
            }
            Some(ImageSource::Sample(kind)) => self.store.update(
                id,
                &form.title,
                &form.artist,
                &form.description,
                &samples::sample_image(kind),
            ),
            None => match current_image {
                Some(image) => {
                    self.store
                        .update(id, &form.title, &form.artist, &form.description, &image)
                }
                None => {
                    self.status = "Current image is unreadable; choose a new image".to_string();
                    return;
                }
            },
        };

        match result {
            Ok(true) => self.finish_admin("Artwork updated successfully!".to_string(), true),
            _ => self.finish_admin("Failed to update artwork!".to_string(), false),
        }
    }

    fn delete_current(&mut self) {
        let Some(id) = self.gallery.current_record().map(|r| r.id) else {
            self.status = "No artwork selected".to_string();
            return;
        };

        match self.store.delete(id) {
            Ok(true) => self.finish_admin("Artwork deleted successfully!".to_string(), true),
            _ => self.finish_admin("Failed to delete artwork!".to_string(), false),
        }
    }

    fn load_samples(&mut self) {
        let loaded = samples::sample_artworks()
            .iter()
            .filter(|artwork| self.store.insert_artwork(artwork).is_ok())
            .count();

        if loaded == 0 {
            self.status = "Failed to load sample artworks!".to_string();
            return;
        }

        info!("Loaded {} sample artworks", loaded);
        self.finish_admin(format!("Loaded {} sample artworks into database", loaded), true);
    }

    /// Select an artwork by ID, confirming it still exists in the store
    fn open_id(&mut self, id: ArtworkId) {
        match self.store.get_by_id(id) {
            Ok(Some(_)) => {
                // The snapshot may predate the row; refetch once
                if !self.gallery.select_id(id) && self.reload_gallery() {
                    self.gallery.select_id(id);
                }
            }
            Ok(None) => self.status = format!("No artwork with ID {}", id),
            Err(_) => self.status = "Failed to load artwork!".to_string(),
        }
    }

    /// Trim the form and check the required fields
    fn validated(&mut self, form: ArtworkForm) -> Option<ArtworkForm> {
        let form = ArtworkForm {
            title: form.title.trim().to_string(),
            artist: form.artist.trim().to_string(),
            description: form.description.trim().to_string(),
            image: form.image,
        };

        if form.title.is_empty() || form.artist.is_empty() {
            self.status = "Title and Artist are required".to_string();
            return None;
        }
        Some(form)
    }

    /// Set the status of an admin action and reload after a successful write.
    ///
    /// A failed write leaves the gallery exactly as it was.
    fn finish_admin(&mut self, status: String, wrote: bool) {
        self.status = status;
        if wrote && !self.reload_gallery() {
            self.status.push_str(" (gallery reload failed)");
        }
    }

    /// Replace the gallery with the store's current contents
    fn reload_gallery(&mut self) -> bool {
        match self.store.get_all() {
            Ok(items) => {
                self.gallery.reload(items);
                true
            }
            Err(e) => {
                warn!("Keeping previous gallery snapshot: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artwork::codec;
    use image::RgbaImage;

    fn shell() -> GalleryShell {
        GalleryShell::new(ArtworkStore::open_in_memory().unwrap())
    }

    fn form(title: &str, artist: &str, image: Option<ImageSource>) -> ArtworkForm {
        ArtworkForm {
            title: title.to_string(),
            artist: artist.to_string(),
            description: String::new(),
            image,
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Message::parse("next"), Ok(Message::Next));
        assert_eq!(Message::parse("  PREV "), Ok(Message::Previous));
        assert_eq!(Message::parse("select 3"), Ok(Message::SelectIndex(3)));
        assert_eq!(Message::parse("open 12"), Ok(Message::OpenId(12)));
        assert_eq!(Message::parse("zoom+"), Ok(Message::ZoomIn));
        assert_eq!(
            Message::parse("select"),
            Err(ParseError::MissingArgument("select"))
        );
        assert_eq!(
            Message::parse("open twelve"),
            Err(ParseError::InvalidNumber("twelve".to_string()))
        );
        assert!(matches!(Message::parse("dance"), Err(ParseError::Unknown(_))));
    }

    #[test]
    fn test_parse_form() {
        let message = Message::parse("add Sunset | Me | warm colors | 2").unwrap();
        assert_eq!(
            message,
            Message::Add(ArtworkForm {
                title: "Sunset".to_string(),
                artist: "Me".to_string(),
                description: "warm colors".to_string(),
                image: Some(ImageSource::Sample(2)),
            })
        );

        let Message::Edit(edit) = Message::parse("edit A|B|C|/tmp/pic.png").unwrap() else {
            panic!("expected edit");
        };
        assert_eq!(edit.image, Some(ImageSource::File(PathBuf::from("/tmp/pic.png"))));

        let Message::Add(bare) = Message::parse("add Only Title").unwrap() else {
            panic!("expected add");
        };
        assert_eq!(bare.title, "Only Title");
        assert!(bare.artist.is_empty());
        assert_eq!(bare.image, None);
    }

    #[test]
    fn test_empty_store() {
        let shell = shell();
        assert!(shell.gallery().is_empty());
        assert_eq!(shell.gallery().current_index(), None);
        assert_eq!(shell.caption(), vec!["No Artworks Available"]);
        assert!(shell.status().contains("No artworks in database"));
    }

    #[test]
    fn test_load_samples_scenario() {
        let mut shell = shell();
        shell.update(Message::LoadSamples);

        assert_eq!(shell.status(), "Loaded 5 sample artworks into database");
        assert_eq!(shell.store().count().unwrap(), 5);
        assert_eq!(shell.gallery().len(), 5);
        assert_eq!(shell.gallery().current_index(), Some(0));

        let ids: Vec<ArtworkId> = shell.gallery().items().iter().map(|r| r.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(shell.caption()[0], format!("Title: Abstract Sunset (ID: {})", ids[0]));
    }

    #[test]
    fn test_add_requires_title_and_artist() {
        let mut shell = shell();
        shell.update(Message::Add(form("  ", "Someone", None)));

        assert_eq!(shell.status(), "Title and Artist are required");
        assert_eq!(shell.store().count().unwrap(), 0);
    }

    #[test]
    fn test_add_selects_new_artwork() {
        let mut shell = shell();
        shell.update(Message::LoadSamples);
        shell.update(Message::Add(form("Mine", "Me", Some(ImageSource::Sample(3)))));

        assert_eq!(shell.status(), "Artwork added successfully!");
        assert_eq!(shell.gallery().len(), 6);
        assert_eq!(shell.gallery().current_record().unwrap().title, "Mine");
    }

    #[test]
    fn test_failed_add_leaves_gallery_untouched() {
        let mut shell = shell();
        shell.update(Message::LoadSamples);
        shell.update(Message::Next);

        let missing = ImageSource::File(PathBuf::from("/nonexistent/art.png"));
        shell.update(Message::Add(form("Ghost", "Nobody", Some(missing))));

        assert_eq!(shell.status(), "Failed to add artwork!");
        assert_eq!(shell.gallery().len(), 5);
        assert_eq!(shell.gallery().current_index(), Some(1));
    }

    #[test]
    fn test_edit_keeps_image_when_none_given() {
        let mut shell = shell();
        shell.update(Message::Add(form("Before", "Me", Some(ImageSource::Sample(2)))));
        let id = shell.gallery().current_record().unwrap().id;

        shell.update(Message::Edit(form("After", "Me", None)));
        assert_eq!(shell.status(), "Artwork updated successfully!");

        let record = shell.store().get_by_id(id).unwrap().unwrap();
        assert_eq!(record.title, "After");
        assert_eq!(record.image, Some(samples::sample_image(2)));
        assert_eq!(shell.gallery().current_record().unwrap().title, "After");
    }

    #[test]
    fn test_edit_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.png");
        let image = RgbaImage::from_pixel(3, 3, image::Rgba([9, 8, 7, 255]));
        std::fs::write(&path, codec::encode(&image).unwrap()).unwrap();

        let mut shell = shell();
        shell.update(Message::LoadSamples);
        shell.update(Message::Edit(form("Swapped", "Me", Some(ImageSource::File(path)))));

        assert_eq!(shell.status(), "Artwork updated successfully!");
        assert_eq!(shell.gallery().current_record().unwrap().image, Some(image));
    }

    #[test]
    fn test_delete_current_walks_selection() {
        let mut shell = shell();
        shell.update(Message::LoadSamples);
        shell.update(Message::SelectIndex(4));

        shell.update(Message::DeleteCurrent);
        assert_eq!(shell.status(), "Artwork deleted successfully!");
        assert_eq!(shell.gallery().len(), 4);
        assert_eq!(shell.gallery().current_index(), Some(3));
    }

    #[test]
    fn test_delete_only_record_empties_gallery() {
        let mut shell = shell();
        shell.update(Message::Add(form("Solo", "Me", None)));
        shell.update(Message::DeleteCurrent);

        assert_eq!(shell.gallery().current_index(), None);
        assert_eq!(shell.caption(), vec!["No Artworks Available"]);

        // Everything stays a harmless no-op
        shell.update(Message::Next);
        shell.update(Message::Previous);
        shell.update(Message::ZoomIn);
        shell.update(Message::DeleteCurrent);
        assert_eq!(shell.status(), "No artwork selected");
    }

    #[test]
    fn test_clear_samples_and_all() {
        let mut shell = shell();
        shell.update(Message::LoadSamples);
        shell.update(Message::Add(form("Keep", "Real Painter", None)));

        shell.update(Message::ClearSamples);
        assert_eq!(shell.status(), "Sample artworks removed");
        assert_eq!(shell.gallery().len(), 1);
        assert_eq!(shell.gallery().current_record().unwrap().title, "Keep");

        shell.update(Message::ClearAll);
        assert_eq!(shell.status(), "All artworks removed");
        assert!(shell.gallery().is_empty());
    }

    #[test]
    fn test_open_id() {
        let mut shell = shell();
        shell.update(Message::LoadSamples);
        let last = shell.gallery().items()[4].id;

        shell.update(Message::OpenId(last));
        assert_eq!(shell.gallery().current_index(), Some(4));

        shell.update(Message::OpenId(last + 100));
        assert_eq!(shell.status(), format!("No artwork with ID {}", last + 100));
        assert_eq!(shell.gallery().current_index(), Some(4));
    }

    #[test]
    fn test_list_view_follows_gallery() {
        let mut shell = shell();
        shell.update(Message::LoadSamples);
        shell.update(Message::Next);
        shell.update(Message::List);

        let view = shell.view();
        assert!(view.contains(">   1  #"));
        assert!(view.contains("Geometric Harmony"));
    }

    #[test]
    fn test_writes_after_shutdown_path_fail_cleanly() {
        let mut shell = shell();
        shell.update(Message::LoadSamples);
        shell.store.close().unwrap();

        shell.update(Message::DeleteCurrent);
        assert_eq!(shell.status(), "Failed to delete artwork!");
        assert_eq!(shell.gallery().len(), 5);

        shell.update(Message::Refresh);
        assert_eq!(shell.status(), "Failed to refresh gallery!");
        assert_eq!(shell.gallery().len(), 5);

        shell.update(Message::LoadSamples);
        assert_eq!(shell.status(), "Failed to load sample artworks!");
        assert_eq!(shell.gallery().len(), 5);
    }

    #[test]
    fn test_quit() {
        let mut shell = shell();
        assert_eq!(shell.update(Message::Quit), Control::Quit);
        assert_eq!(shell.update(Message::Show), Control::Continue);
        shell.shutdown().unwrap();
    }
}
