use crate::bank::object::{
    CompositionObject, PlaylistContainer, Segment, SwitchContainer, Track,
};
use crate::bank::Soundbank;
use crate::error::DecodeError;
use std::collections::HashMap;

/// Composition objects aggregated from any number of soundbanks.
///
/// Objects keep the order they were added in. Objects reference each other by id; a referenced id
/// that was never added (for example because it lives in a soundbank that wasn't loaded) is a
/// lookup miss, not an error.
#[derive(Clone, Debug, Default)]
pub struct ObjectGraph {
    objects: Vec<CompositionObject>,
    index: HashMap<u32, usize>,
}

impl ObjectGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes soundbanks in order and aggregates their objects.
    ///
    /// # Errors
    ///
    /// Returns the first decoding error, tagged with the index of the offending soundbank.
    pub fn decode_all<I, B>(blobs: I) -> Result<Self, DecodeError>
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let mut graph = Self::new();

        for (index, blob) in blobs.into_iter().enumerate() {
            let bank = Soundbank::parse(blob.as_ref()).map_err(|e| e.in_blob(index))?;
            graph.insert_bank(bank);
        }

        Ok(graph)
    }

    /// Adds the objects of a decoded soundbank.
    pub fn insert_bank(&mut self, bank: Soundbank) {
        bank.into_objects()
            .into_iter()
            .for_each(|object| self.push(object));
    }

    /// Adds a single object.
    ///
    /// If an object with the same id was already added, lookups keep returning the earlier one.
    pub fn push(&mut self, object: CompositionObject) {
        let position = self.objects.len();

        if *self.index.entry(object.id()).or_insert(position) != position {
            log::debug!("object 0x{:08x} was already added; keeping the first", object.id());
        }

        self.objects.push(object);
    }

    /// Returns the object with the given id.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&CompositionObject> {
        self.index.get(&id).map(|&index| &self.objects[index])
    }

    /// Returns the number of objects added, including those with duplicate ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns `true` if no objects were added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Returns every object, in the order they were added.
    pub fn objects(&self) -> impl Iterator<Item = &CompositionObject> {
        self.objects.iter()
    }

    /// Returns the tracks, in the order they were added.
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.objects.iter().filter_map(CompositionObject::as_track)
    }

    /// Returns the segments, in the order they were added.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.objects.iter().filter_map(CompositionObject::as_segment)
    }

    /// Returns the playlist containers, in the order they were added.
    pub fn playlist_containers(&self) -> impl Iterator<Item = &PlaylistContainer> {
        self.objects
            .iter()
            .filter_map(CompositionObject::as_playlist_container)
    }

    /// Returns the switch containers, in the order they were added.
    pub fn switch_containers(&self) -> impl Iterator<Item = &SwitchContainer> {
        self.objects
            .iter()
            .filter_map(CompositionObject::as_switch_container)
    }
}

impl FromIterator<CompositionObject> for ObjectGraph {
    fn from_iter<T: IntoIterator<Item = CompositionObject>>(iter: T) -> Self {
        let mut graph = Self::new();
        iter.into_iter().for_each(|object| graph.push(object));
        graph
    }
}
