use crate::bank::object::{CompositionObject, PlaylistContainer, Segment, SwitchContainer};
use crate::graph::ObjectGraph;
use crate::names::NameMap;
use crate::path::PathNode;
use crate::vocab::{GroupKind, Vocabulary};
use std::collections::HashSet;

/// Settings for [`NameResolver`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Don't traverse a root switch container whose first governing group is a state group.
    ///
    /// Such containers usually layer music that is already named through another root.
    pub skip_state_governed_roots: bool,
}

/// Walks an [`ObjectGraph`] and names the audio ids its switch containers lead to.
///
/// Names are built from the switch and state elements along each container's decision paths,
/// joined with `_`. Positional suffixes are added where a playlist container holds more than one
/// segment, a segment more than one track, or a track more than one audio source.
///
/// Resolution is deterministic for a given graph, but the numbering of colliding names depends
/// on the order objects were added to the graph. See [`NameMap`].
#[derive(Debug)]
pub struct NameResolver<'a> {
    graph: &'a ObjectGraph,
    vocab: &'a Vocabulary,
    options: ResolveOptions,
}

impl<'a> NameResolver<'a> {
    /// Creates a resolver with default options.
    #[must_use]
    pub fn new(graph: &'a ObjectGraph, vocab: &'a Vocabulary) -> Self {
        Self {
            graph,
            vocab,
            options: ResolveOptions::default(),
        }
    }

    /// Replaces the resolver's options.
    #[must_use]
    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the switch containers that no other switch container lists as a child, in graph
    /// order.
    ///
    /// Two containers that list each other are both excluded, so neither is traversed.
    #[must_use]
    pub fn roots(&self) -> Vec<&'a SwitchContainer> {
        let listed: HashSet<u32> = self
            .graph
            .switch_containers()
            .flat_map(|switch| {
                switch
                    .child_ids()
                    .iter()
                    .copied()
                    .filter(move |&child| child != switch.id())
            })
            .collect();

        self.graph
            .switch_containers()
            .filter(|switch| !listed.contains(&switch.id()))
            .collect()
    }

    /// Resolves names for every audio id reachable from a root switch container.
    #[must_use]
    pub fn resolve(&self) -> NameMap {
        let mut walk = Walk {
            graph: self.graph,
            vocab: self.vocab,
            names: NameMap::new(),
            active: HashSet::new(),
        };

        for root in self.roots() {
            let state_governed = root
                .groups()
                .first()
                .is_some_and(|group| group.kind == GroupKind::State);

            if state_governed && self.options.skip_state_governed_roots {
                log::debug!("skipping state-governed root 0x{:08x}", root.id());
                continue;
            }

            log::debug!("traversing root 0x{:08x}", root.id());
            walk.switch_container("", root);
        }

        walk.names
    }
}

// Switch containers nest once per layer of music logic; anything deeper is corrupt.
const MAX_NESTING: usize = 256;

struct Walk<'a> {
    graph: &'a ObjectGraph,
    vocab: &'a Vocabulary,
    names: NameMap,
    // switch containers currently being traversed
    active: HashSet<u32>,
}

impl<'a> Walk<'a> {
    fn switch_container(&mut self, name: &str, switch: &'a SwitchContainer) {
        if self.active.len() == MAX_NESTING {
            log::warn!(
                "switch container 0x{:08x} is nested more than {MAX_NESTING} deep; not traversing it",
                switch.id()
            );
            return;
        }

        if !self.active.insert(switch.id()) {
            log::warn!(
                "switch container 0x{:08x} is reachable from itself; not traversing it again",
                switch.id()
            );
            return;
        }

        // only the leaves directly below the root are named
        let paths: Vec<_> = switch
            .paths()
            .children()
            .iter()
            .filter_map(|node| match *node {
                PathNode::Leaf {
                    decided_by,
                    object_id,
                } => Some((decided_by, object_id)),
                PathNode::Branch { .. } => None,
            })
            .filter_map(|(decided_by, object_id)| {
                let Some(element) = self.vocab.element_name(decided_by) else {
                    log::debug!(
                        "switch container 0x{:08x}: no switch or state element 0x{decided_by:08x}",
                        switch.id()
                    );
                    return None;
                };

                let path_name = if name.is_empty() {
                    element.to_owned()
                } else {
                    format!("{name}_{element}")
                };

                Some((path_name, object_id))
            })
            .collect();

        let pathed: HashSet<u32> = paths.iter().map(|&(_, object_id)| object_id).collect();

        for (path_name, object_id) in &paths {
            self.descend(path_name, *object_id);
        }

        for &child in switch.child_ids() {
            if !pathed.contains(&child) {
                self.descend(name, child);
            }
        }

        let was_active = self.active.remove(&switch.id());
        debug_assert!(was_active);
    }

    fn descend(&mut self, name: &str, id: u32) {
        match self.graph.get(id) {
            Some(CompositionObject::SwitchContainer(switch)) => self.switch_container(name, switch),
            Some(CompositionObject::PlaylistContainer(playlist)) => self.playlist(name, playlist),
            Some(CompositionObject::Segment(segment)) => self.segment(name, segment),
            Some(CompositionObject::Track(_)) => {
                log::debug!("track 0x{id:08x} is not inside a segment; it is not named");
            }
            None => log::debug!("object 0x{id:08x} is not loaded"),
        }
    }

    fn playlist(&mut self, name: &str, playlist: &'a PlaylistContainer) {
        let segment_ids = playlist.segment_ids();

        for (i, &segment_id) in segment_ids.iter().enumerate() {
            let Some(segment) = self.graph.get(segment_id).and_then(CompositionObject::as_segment)
            else {
                log::debug!("segment 0x{segment_id:08x} is not loaded");
                continue;
            };

            self.segment(&with_index(name, i, segment_ids.len()), segment);
        }
    }

    fn segment(&mut self, name: &str, segment: &'a Segment) {
        let track_ids = segment.track_ids();

        for (j, &track_id) in track_ids.iter().enumerate() {
            let Some(track) = self.graph.get(track_id).and_then(CompositionObject::as_track) else {
                log::debug!("track 0x{track_id:08x} is not loaded");
                continue;
            };

            let track_name = with_index(name, j, track_ids.len());
            let audio_ids = track.audio_ids();

            for (k, &audio_id) in audio_ids.iter().enumerate() {
                self.names
                    .insert(with_index(&track_name, k, audio_ids.len()), audio_id);
            }
        }
    }
}

// A list with a single entry adds no index.
fn with_index(name: &str, index: usize, len: usize) -> String {
    if len > 1 {
        format!("{name}_{index}")
    } else {
        name.to_owned()
    }
}
