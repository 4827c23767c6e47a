use common::{Category, guess_category};

use crate::color::{Color, default_color};

/// Locally unique, stable identifier for one model entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(u64);

/// How a mesh entered the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelOrigin {
    /// Chosen through the local file picker.
    Local,
    /// Rehydrated from a resolved share link.
    Remote,
}

/// A file chosen through the local picker.
#[derive(Debug, Clone)]
pub struct LocalFile {
    pub name: String,
    /// Local URL or path for the file's bytes.
    pub url: String,
}

/// One file descriptor returned by the share resolver.
#[derive(Debug, Clone)]
pub struct RemoteFile {
    pub url: String,
    pub original_name: Option<String>,
    pub category: Option<Category>,
}

/// Client-local view state for one mesh, independent of its origin.
#[derive(Debug, Clone)]
pub struct ModelEntry {
    pub id: ModelId,
    pub display_name: String,
    pub source_url: String,
    pub origin: ModelOrigin,
    pub category: Option<Category>,
    pub color: Color,
    /// Set once the user picks a color by hand; pins `color` across
    /// category changes.
    pub color_overridden: bool,
    pub opacity: f32,
    pub visible: bool,
}

impl ModelEntry {
    /// The one shared render-inclusion predicate.
    ///
    /// A mesh at opacity 0 must not reach the renderer: the draw call is
    /// wasted and blending can produce sorting artifacts.
    pub fn should_render(&self) -> bool {
        self.visible && self.opacity > 0.0
    }
}

/// Ordered collection of the session's model entries.
///
/// Adds append; nothing reorders. Entries are mutated only through the
/// setters below and dropped when the session ends or `remove` is called.
#[derive(Default)]
pub struct ModelStore {
    entries: Vec<ModelEntry>,
    next_id: u64,
}

impl ModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> ModelId {
        let id = ModelId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append locally-picked files.
    ///
    /// `category` applies to the whole batch; when absent, each file falls
    /// back to the filename heuristic.
    pub fn add_local(&mut self, files: Vec<LocalFile>, category: Option<Category>) -> Vec<ModelId> {
        let mut ids = Vec::with_capacity(files.len());
        for file in files {
            let id = self.allocate_id();
            let category = category.or_else(|| guess_category(&file.name));
            self.entries.push(ModelEntry {
                id,
                display_name: file.name,
                source_url: file.url,
                origin: ModelOrigin::Local,
                category,
                color: default_color(category),
                color_overridden: false,
                opacity: 1.0,
                visible: true,
            });
            ids.push(id);
        }
        ids
    }

    /// Append files from a resolved share, in resolver order.
    pub fn add_remote(&mut self, files: Vec<RemoteFile>) -> Vec<ModelId> {
        let mut ids = Vec::with_capacity(files.len());
        for file in files {
            let id = self.allocate_id();
            let display_name = file
                .original_name
                .clone()
                .or_else(|| {
                    file.url
                        .rsplit('/')
                        .next()
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| format!("mesh-{}", id.0));
            let category = file
                .category
                .or_else(|| guess_category(&display_name));
            self.entries.push(ModelEntry {
                id,
                display_name,
                source_url: file.url,
                origin: ModelOrigin::Remote,
                category,
                color: default_color(category),
                color_overridden: false,
                opacity: 1.0,
                visible: true,
            });
            ids.push(id);
        }
        ids
    }

    pub fn entries(&self) -> &[ModelEntry] {
        &self.entries
    }

    pub fn get(&self, id: ModelId) -> Option<&ModelEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    fn get_mut(&mut self, id: ModelId) -> Option<&mut ModelEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    pub fn set_visible(&mut self, id: ModelId, visible: bool) {
        if let Some(entry) = self.get_mut(id) {
            entry.visible = visible;
        }
    }

    /// Set opacity, clamped to `[0, 1]`. Non-finite input collapses to 0.
    pub fn set_opacity(&mut self, id: ModelId, opacity: f32) {
        if let Some(entry) = self.get_mut(id) {
            entry.opacity = if opacity.is_finite() {
                opacity.clamp(0.0, 1.0)
            } else {
                0.0
            };
        }
    }

    /// Reassign the category, re-deriving the display color unless the user
    /// overrode it.
    pub fn set_category(&mut self, id: ModelId, category: Option<Category>) {
        if let Some(entry) = self.get_mut(id) {
            entry.category = category;
            if !entry.color_overridden {
                entry.color = default_color(category);
            }
        }
    }

    /// Pick a color by hand, pinning it across later category changes.
    pub fn set_color(&mut self, id: ModelId, color: Color) {
        if let Some(entry) = self.get_mut(id) {
            entry.color = color;
            entry.color_overridden = true;
        }
    }

    /// Point an entry at a new source. The renderer disposes the old
    /// geometry and reloads on its next sync.
    pub fn set_source_url(&mut self, id: ModelId, url: impl Into<String>) {
        if let Some(entry) = self.get_mut(id) {
            entry.source_url = url.into();
        }
    }

    /// Drop an entry. Returns `false` for unknown ids.
    pub fn remove(&mut self, id: ModelId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// The entries a share upload includes: exactly the visible ones.
    ///
    /// Opacity is a display-only attribute of this session and is never
    /// transmitted.
    pub fn select_for_share(&self) -> Vec<&ModelEntry> {
        self.entries.iter().filter(|e| e.visible).collect()
    }
}
