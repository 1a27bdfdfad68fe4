use crate::{CompressedImage, PreviewHandle, nice_id};
use common_types::AspectRatio;

/// One file picked by the user for the current draft.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// A staged media item scoped to one in-progress draft.
///
/// Created once its compression has completed, destroyed when it is removed
/// from the draft or the draft ends.
#[derive(Debug)]
pub struct MediaItem {
    id: String,
    file_name: String,
    preview: PreviewHandle,
    aspect_ratio: AspectRatio,
    compressed: CompressedImage,
}

impl MediaItem {
    pub fn from_selection(
        selection: &SelectedFile,
        compressed: CompressedImage,
    ) -> std::io::Result<Self> {
        Ok(Self {
            id: nice_id(8),
            file_name: selection.file_name.clone(),
            preview: PreviewHandle::new(&selection.bytes)?,
            aspect_ratio: AspectRatio::default(),
            compressed,
        })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub const fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    #[must_use]
    pub const fn preview(&self) -> &PreviewHandle {
        &self.preview
    }

    #[must_use]
    pub const fn compressed(&self) -> &CompressedImage {
        &self.compressed
    }

    #[must_use]
    pub fn original_byte_size(&self) -> u64 {
        self.compressed.original_byte_size
    }

    #[must_use]
    pub fn compressed_byte_size(&self) -> u64 {
        self.compressed.byte_size()
    }
}

/// Ordered collection of pending media items for one draft.
///
/// All mutation happens on the caller's single thread; operations never
/// interleave mid-way.
#[derive(Debug)]
pub struct StagingList {
    items: Vec<MediaItem>,
    default_ratio: AspectRatio,
}

impl StagingList {
    #[must_use]
    pub const fn new(default_ratio: AspectRatio) -> Self {
        Self {
            items: Vec::new(),
            default_ratio,
        }
    }

    /// Appends items, assigning the list's current default aspect ratio to
    /// each incoming item.
    pub fn add(&mut self, items: Vec<MediaItem>) {
        for mut item in items {
            item.aspect_ratio = self.default_ratio;
            self.items.push(item);
        }
    }

    /// Releases the item's preview and removes it. Out-of-bounds indices are
    /// ignored; the index always comes from a rendered list snapshot.
    pub fn remove(&mut self, index: usize) {
        if index >= self.items.len() {
            return;
        }
        let mut item = self.items.remove(index);
        item.preview.release();
    }

    /// Changes one item's display ratio. Out-of-bounds indices are ignored.
    pub fn set_ratio(&mut self, index: usize, ratio: AspectRatio) {
        if let Some(item) = self.items.get_mut(index) {
            item.aspect_ratio = ratio;
        }
    }

    pub fn set_default_ratio(&mut self, ratio: AspectRatio) {
        self.default_ratio = ratio;
    }

    #[must_use]
    pub const fn default_ratio(&self) -> AspectRatio {
        self.default_ratio
    }

    /// Releases every preview and empties the list. Invoked on successful
    /// submission and on draft cancellation.
    pub fn clear(&mut self) {
        for item in &mut self.items {
            item.preview.release();
        }
        self.items.clear();
    }

    #[must_use]
    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
