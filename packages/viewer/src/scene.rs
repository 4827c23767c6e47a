use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::color::Color;
use crate::error::LoadError;
use crate::geometry::Geometry;
use crate::loader::GeometrySource;
use crate::model::{ModelEntry, ModelId, ModelOrigin, ModelStore};

/// Load state of one entry's geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryLoadState {
    /// Never part of the render set; nothing fetched yet.
    Unloaded,
    /// Fetch/parse in flight.
    Loading,
    /// Geometry resident and renderable.
    Ready,
    /// The last load attempt failed; the entry stays out of the scene.
    Error,
}

/// Surface material applied to every rendered mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Color,
    pub opacity: f32,
    pub metalness: f32,
    pub roughness: f32,
    /// Scans are open surfaces; render both faces.
    pub double_sided: bool,
}

impl Material {
    fn standard(color: Color, opacity: f32) -> Self {
        Self {
            color,
            opacity,
            metalness: 0.1,
            roughness: 0.75,
            double_sided: true,
        }
    }
}

/// One renderable mesh produced for the current frame.
pub struct RenderMesh {
    pub entry_id: ModelId,
    pub geometry: Arc<Geometry>,
    pub material: Material,
}

enum SlotState {
    Loading,
    Ready(Arc<Geometry>),
    Error,
}

struct Slot {
    source_url: String,
    /// Monotonic per-load token; a completion carrying an older generation
    /// is stale and gets discarded.
    generation: u64,
    state: SlotState,
}

struct LoadComplete {
    id: ModelId,
    generation: u64,
    result: Result<Geometry, LoadError>,
}

/// Keeps loaded geometry consistent with a [`ModelStore`].
///
/// One asynchronous load per entry and source URL: an entry enters `Loading`
/// when it first becomes renderable (remote entries load unconditionally on
/// first sync), and its old geometry is disposed whenever the source URL
/// changes or the entry is removed. Loads are independent; a failure or slow
/// fetch on one entry never blocks the others.
pub struct SceneRenderer {
    source: Arc<dyn GeometrySource>,
    slots: HashMap<ModelId, Slot>,
    next_generation: u64,
    tx: mpsc::UnboundedSender<LoadComplete>,
    rx: mpsc::UnboundedReceiver<LoadComplete>,
}

impl SceneRenderer {
    pub fn new(source: Arc<dyn GeometrySource>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            source,
            slots: HashMap::new(),
            next_generation: 0,
            tx,
            rx,
        }
    }

    /// Reconcile load state with the store, starting and disposing loads as
    /// needed. Call after any store mutation.
    pub fn sync(&mut self, store: &ModelStore) {
        // Dispose slots whose entry is gone; dropping the slot releases the
        // geometry, and any in-flight completion will find no slot.
        let live: HashSet<ModelId> = store.entries().iter().map(|e| e.id).collect();
        self.slots.retain(|id, _| live.contains(id));

        for entry in store.entries() {
            let start = match self.slots.get(&entry.id) {
                // A changed source invalidates whatever the slot holds.
                Some(slot) => slot.source_url != entry.source_url,
                // First load: when the entry becomes renderable, or
                // immediately for remote shares.
                None => entry.should_render() || entry.origin == ModelOrigin::Remote,
            };

            if start {
                self.begin_load(entry);
            }
        }
    }

    fn begin_load(&mut self, entry: &ModelEntry) {
        self.next_generation += 1;
        let generation = self.next_generation;

        self.slots.insert(
            entry.id,
            Slot {
                source_url: entry.source_url.clone(),
                generation,
                state: SlotState::Loading,
            },
        );

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let id = entry.id;
        let url = entry.source_url.clone();

        tokio::spawn(async move {
            let result = load_geometry(&*source, &url).await;
            // Receiver gone means the renderer itself was dropped.
            let _ = tx.send(LoadComplete {
                id,
                generation,
                result,
            });
        });
    }

    /// Drain finished loads without blocking. Returns how many completions
    /// were applied (stale and disposed ones are discarded silently).
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(msg) = self.rx.try_recv() {
            if self.apply(msg) {
                applied += 1;
            }
        }
        applied
    }

    /// Await completions until no load is in flight.
    pub async fn settle(&mut self) {
        while self
            .slots
            .values()
            .any(|slot| matches!(slot.state, SlotState::Loading))
        {
            let Some(msg) = self.rx.recv().await else {
                break;
            };
            self.apply(msg);
        }
    }

    fn apply(&mut self, msg: LoadComplete) -> bool {
        let Some(slot) = self.slots.get_mut(&msg.id) else {
            // Entry removed while loading.
            return false;
        };
        if slot.generation != msg.generation {
            // Superseded by a newer load for a changed source URL.
            return false;
        }

        match msg.result {
            Ok(mut geometry) => {
                // Source normals are untrusted; smooth-shade everything.
                geometry.compute_vertex_normals();
                slot.state = SlotState::Ready(Arc::new(geometry));
            }
            Err(e) => {
                tracing::warn!("geometry load failed for {}: {e}", slot.source_url);
                slot.state = SlotState::Error;
            }
        }
        true
    }

    /// Observable state for one entry.
    pub fn load_state(&self, id: ModelId) -> EntryLoadState {
        match self.slots.get(&id).map(|slot| &slot.state) {
            None => EntryLoadState::Unloaded,
            Some(SlotState::Loading) => EntryLoadState::Loading,
            Some(SlotState::Ready(_)) => EntryLoadState::Ready,
            Some(SlotState::Error) => EntryLoadState::Error,
        }
    }

    /// The meshes to draw this frame, in store order.
    ///
    /// One filter, applied in one place: `visible && opacity > 0 && Ready`.
    pub fn render_set(&self, store: &ModelStore) -> Vec<RenderMesh> {
        store
            .entries()
            .iter()
            .filter(|entry| entry.should_render())
            .filter_map(|entry| match self.slots.get(&entry.id) {
                Some(Slot {
                    state: SlotState::Ready(geometry),
                    ..
                }) => Some(RenderMesh {
                    entry_id: entry.id,
                    geometry: Arc::clone(geometry),
                    material: Material::standard(entry.color, entry.opacity),
                }),
                _ => None,
            })
            .collect()
    }
}

async fn load_geometry(source: &dyn GeometrySource, url: &str) -> Result<Geometry, LoadError> {
    let bytes = source.fetch(url).await?;
    crate::stl::parse_stl(&bytes)
}
