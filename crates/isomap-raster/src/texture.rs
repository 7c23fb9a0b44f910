//! Texture lookup
//!
//! Decoding happens outside the renderer. A [`TextureSource`] hands over
//! already-decoded frames, and a [`TextureCache`] memoizes them for the
//! duration of a single map render.

use isomap_core::ImageFrame;
use std::collections::HashMap;
use std::sync::Arc;

/// Provider of decoded textures, keyed by tile or object type id
pub trait TextureSource {
    /// Texture for a tile type
    fn tile_texture(&self, id: &str) -> Option<ImageFrame>;

    /// Sprite for an object type
    fn object_texture(&self, id: &str) -> Option<ImageFrame>;
}

/// In-memory texture set
#[derive(Debug, Clone, Default)]
pub struct MemoryTextures {
    tiles: HashMap<String, ImageFrame>,
    objects: HashMap<String, ImageFrame>,
}

impl MemoryTextures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tile texture
    pub fn add_tile(&mut self, id: impl Into<String>, frame: ImageFrame) {
        self.tiles.insert(id.into(), frame);
    }

    /// Add an object sprite
    pub fn add_object(&mut self, id: impl Into<String>, frame: ImageFrame) {
        self.objects.insert(id.into(), frame);
    }
}

impl TextureSource for MemoryTextures {
    fn tile_texture(&self, id: &str) -> Option<ImageFrame> {
        self.tiles.get(id).cloned()
    }

    fn object_texture(&self, id: &str) -> Option<ImageFrame> {
        self.objects.get(id).cloned()
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Total lookups
    pub lookups: u64,
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that went to the source
    pub misses: u64,
}

/// Per-render texture memo.
///
/// Misses are memoized as well, so a missing texture is asked for once.
pub struct TextureCache<'s> {
    source: &'s dyn TextureSource,
    tiles: HashMap<String, Option<Arc<ImageFrame>>>,
    objects: HashMap<String, Option<Arc<ImageFrame>>>,
    stats: CacheStats,
}

impl<'s> TextureCache<'s> {
    pub fn new(source: &'s dyn TextureSource) -> Self {
        Self {
            source,
            tiles: HashMap::new(),
            objects: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    /// Tile texture for a type id
    pub fn tile(&mut self, id: &str) -> Option<Arc<ImageFrame>> {
        let source = self.source;
        Self::lookup(&mut self.tiles, &mut self.stats, id, |id| {
            source.tile_texture(id)
        })
    }

    /// Object sprite for a type id
    pub fn object(&mut self, id: &str) -> Option<Arc<ImageFrame>> {
        let source = self.source;
        Self::lookup(&mut self.objects, &mut self.stats, id, |id| {
            source.object_texture(id)
        })
    }

    fn lookup(
        entries: &mut HashMap<String, Option<Arc<ImageFrame>>>,
        stats: &mut CacheStats,
        id: &str,
        load: impl FnOnce(&str) -> Option<ImageFrame>,
    ) -> Option<Arc<ImageFrame>> {
        stats.lookups += 1;

        if let Some(entry) = entries.get(id) {
            stats.hits += 1;
            return entry.clone();
        }

        stats.misses += 1;
        let entry = load(id).map(Arc::new);
        entries.insert(id.to_string(), entry.clone());
        entry
    }

    /// Cache statistics
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Number of distinct ids looked up
    pub fn len(&self) -> usize {
        self.tiles.len() + self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
