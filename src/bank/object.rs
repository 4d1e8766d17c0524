use super::error::{ObjectError, ObjectErrorKind};
use super::props::skip_node_properties;
use crate::path::{decode_path_table, PathNode};
use crate::read::{ReadResult, Reader};
use crate::vocab::GroupKind;
use std::io::Read;
use tap::Pipe;

/// Kind tags of the composition objects this crate decodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Music segment (tag `0x0A`).
    Segment,
    /// Music track (tag `0x0B`).
    Track,
    /// Music switch container (tag `0x0C`).
    SwitchContainer,
    /// Music playlist container (tag `0x0D`).
    PlaylistContainer,
}

impl ObjectKind {
    pub(crate) fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x0A => Some(Self::Segment),
            0x0B => Some(Self::Track),
            0x0C => Some(Self::SwitchContainer),
            0x0D => Some(Self::PlaylistContainer),
            _ => None,
        }
    }
}

/// A decoded composition object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompositionObject {
    /// See [`Track`].
    Track(Track),
    /// See [`Segment`].
    Segment(Segment),
    /// See [`PlaylistContainer`].
    PlaylistContainer(PlaylistContainer),
    /// See [`SwitchContainer`].
    SwitchContainer(SwitchContainer),
}

impl CompositionObject {
    /// Returns the object id.
    #[must_use]
    pub fn id(&self) -> u32 {
        match self {
            Self::Track(track) => track.id,
            Self::Segment(segment) => segment.id,
            Self::PlaylistContainer(playlist) => playlist.id,
            Self::SwitchContainer(switch) => switch.id,
        }
    }

    /// Returns the kind tag of the object.
    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Track(_) => ObjectKind::Track,
            Self::Segment(_) => ObjectKind::Segment,
            Self::PlaylistContainer(_) => ObjectKind::PlaylistContainer,
            Self::SwitchContainer(_) => ObjectKind::SwitchContainer,
        }
    }

    /// Returns the object if it is a track.
    #[must_use]
    pub fn as_track(&self) -> Option<&Track> {
        match self {
            Self::Track(track) => Some(track),
            _ => None,
        }
    }

    /// Returns the object if it is a segment.
    #[must_use]
    pub fn as_segment(&self) -> Option<&Segment> {
        match self {
            Self::Segment(segment) => Some(segment),
            _ => None,
        }
    }

    /// Returns the object if it is a playlist container.
    #[must_use]
    pub fn as_playlist_container(&self) -> Option<&PlaylistContainer> {
        match self {
            Self::PlaylistContainer(playlist) => Some(playlist),
            _ => None,
        }
    }

    /// Returns the object if it is a switch container.
    #[must_use]
    pub fn as_switch_container(&self) -> Option<&SwitchContainer> {
        match self {
            Self::SwitchContainer(switch) => Some(switch),
            _ => None,
        }
    }
}

/// A music track: the leaf object that references embedded audio.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Track {
    id: u32,
    audio_ids: Vec<u32>,
}

impl Track {
    /// Creates a track from its id and audio source ids.
    #[must_use]
    pub fn new(id: u32, audio_ids: Vec<u32>) -> Self {
        Self { id, audio_ids }
    }

    /// Returns the object id.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the audio source ids, in the order they appear in the bank.
    #[must_use]
    pub fn audio_ids(&self) -> &[u32] {
        &self.audio_ids
    }
}

/// A music segment, made of tracks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    id: u32,
    track_ids: Vec<u32>,
}

impl Segment {
    /// Creates a segment from its id and track ids.
    #[must_use]
    pub fn new(id: u32, track_ids: Vec<u32>) -> Self {
        Self { id, track_ids }
    }

    /// Returns the object id.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the ids of the tracks in this segment.
    #[must_use]
    pub fn track_ids(&self) -> &[u32] {
        &self.track_ids
    }
}

/// A music playlist container, made of segments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaylistContainer {
    id: u32,
    segment_ids: Vec<u32>,
}

impl PlaylistContainer {
    /// Creates a playlist container from its id and segment ids.
    #[must_use]
    pub fn new(id: u32, segment_ids: Vec<u32>) -> Self {
        Self { id, segment_ids }
    }

    /// Returns the object id.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the ids of the segments in this playlist.
    #[must_use]
    pub fn segment_ids(&self) -> &[u32] {
        &self.segment_ids
    }
}

/// A switch or state group that a switch container decides on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GoverningGroup {
    /// Id of the group.
    pub group_id: u32,
    /// Whether the group is a switch group or a state group.
    pub kind: GroupKind,
}

/// A music switch container: picks one of its children from switch and state values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwitchContainer {
    id: u32,
    child_ids: Vec<u32>,
    groups: Vec<GoverningGroup>,
    paths: PathNode,
}

impl SwitchContainer {
    /// Creates a switch container.
    ///
    /// Every leaf of `paths` is expected to reference one of `child_ids`.
    #[must_use]
    pub fn new(
        id: u32,
        child_ids: Vec<u32>,
        groups: Vec<GoverningGroup>,
        paths: PathNode,
    ) -> Self {
        Self {
            id,
            child_ids,
            groups,
            paths,
        }
    }

    /// Returns the object id.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the ids of the child objects, in the order they appear in the bank.
    #[must_use]
    pub fn child_ids(&self) -> &[u32] {
        &self.child_ids
    }

    /// Returns the groups the container's decision tree is built on.
    #[must_use]
    pub fn groups(&self) -> &[GoverningGroup] {
        &self.groups
    }

    /// Returns the root of the container's decision tree.
    #[must_use]
    pub fn paths(&self) -> &PathNode {
        &self.paths
    }
}

pub(super) fn parse<R: Read>(
    kind: ObjectKind,
    reader: &mut Reader<R>,
    id: u32,
) -> Result<CompositionObject, ObjectError> {
    reader
        .skip(1)
        .map_err(ObjectError::factory(id, ObjectErrorKind::Flags))?;

    match kind {
        ObjectKind::Track => parse_track(reader, id).map(CompositionObject::Track),
        ObjectKind::Segment => {
            skip_properties(reader, id)?;
            parse_id_list(reader, id)
                .map(|track_ids| Segment::new(id, track_ids))
                .map(CompositionObject::Segment)
        }
        ObjectKind::PlaylistContainer => {
            skip_properties(reader, id)?;
            parse_id_list(reader, id)
                .map(|segment_ids| PlaylistContainer::new(id, segment_ids))
                .map(CompositionObject::PlaylistContainer)
        }
        ObjectKind::SwitchContainer => {
            skip_properties(reader, id)?;
            parse_switch(reader, id).map(CompositionObject::SwitchContainer)
        }
    }
}

fn skip_properties<R: Read>(reader: &mut Reader<R>, id: u32) -> Result<(), ObjectError> {
    let consumed = skip_node_properties(reader, id)?;
    log::trace!("object 0x{id:08x}: skipped {consumed} bytes of shared properties");
    Ok(())
}

fn parse_track<R: Read>(reader: &mut Reader<R>, id: u32) -> Result<Track, ObjectError> {
    let count = reader
        .le_u32()
        .map_err(ObjectError::factory(id, ObjectErrorKind::SourceCount))?;

    let mut audio_ids = Vec::new();

    for index in 0..count {
        let audio_id = read_source(reader)
            .map_err(ObjectError::factory(id, ObjectErrorKind::Source { index }))?;
        audio_ids.push(audio_id);
    }

    Ok(Track::new(id, audio_ids))
}

fn read_source<R: Read>(reader: &mut Reader<R>) -> ReadResult<u32> {
    let source_type = reader.le_u16()?;
    if matches!(source_type, 1 | 2) {
        reader.skip(2)?;
    }

    let inclusion = reader.u8()?;
    let audio_id = reader.le_u32()?;

    // embedded and streamed sources carry an extra offset or size field
    if inclusion <= 2 {
        reader.skip(4)?;
    }
    reader.skip(1)?;

    Ok(audio_id)
}

fn parse_id_list<R: Read>(reader: &mut Reader<R>, id: u32) -> Result<Vec<u32>, ObjectError> {
    let count = reader
        .le_u32()
        .map_err(ObjectError::factory(id, ObjectErrorKind::ChildCount))?;

    read_ids(reader, count).map_err(ObjectError::factory(id, ObjectErrorKind::ChildIds))
}

fn read_ids<R: Read>(reader: &mut Reader<R>, count: u32) -> ReadResult<Vec<u32>> {
    (0..count).map(|_| reader.le_u32()).collect()
}

fn parse_switch<R: Read>(reader: &mut Reader<R>, id: u32) -> Result<SwitchContainer, ObjectError> {
    let child_ids = parse_id_list(reader, id)?;

    skip_stingers(reader).map_err(ObjectError::factory(id, ObjectErrorKind::Stingers))?;

    let transitions = reader
        .le_u32()
        .map_err(ObjectError::factory(id, ObjectErrorKind::Transitions))?;

    for index in 0..transitions {
        skip_transition(reader)
            .map_err(ObjectError::factory(id, ObjectErrorKind::Transition { index }))?;
    }

    let groups = parse_groups(reader, id)?;

    let table_len = reader
        .le_u32()
        .and_then(|len| reader.skip(1).map(|()| len))
        .map_err(ObjectError::factory(id, ObjectErrorKind::PathTableLength))?;

    let table_start = reader.position();
    let paths = reader
        .take(table_len as usize)
        .map_err(ObjectError::factory(id, ObjectErrorKind::PathTable))?
        .pipe(|table| decode_path_table(&table, &child_ids))
        .map_err(ObjectError::from_path(id, table_start))?;

    Ok(SwitchContainer::new(id, child_ids, groups, paths))
}

fn skip_stingers<R: Read>(reader: &mut Reader<R>) -> ReadResult<()> {
    reader.skip(23)?;
    let count = reader.le_u32()?;
    reader.skip(24usize.saturating_mul(count as usize))
}

fn skip_transition<R: Read>(reader: &mut Reader<R>) -> ReadResult<()> {
    let sources = reader.le_u32()?;
    reader.skip(4usize.saturating_mul(sources as usize))?;

    let destinations = reader.le_u32()?;
    reader.skip(4usize.saturating_mul(destinations as usize))?;

    reader.skip(47)?;
    if reader.u8()? == 1 {
        // transition segment settings
        reader.skip(30)?;
    }

    Ok(())
}

fn parse_groups<R: Read>(
    reader: &mut Reader<R>,
    id: u32,
) -> Result<Vec<GoverningGroup>, ObjectError> {
    let count = reader
        .skip(1)
        .and_then(|()| reader.le_u32())
        .map_err(ObjectError::factory(id, ObjectErrorKind::GroupCount))?;

    // group ids come first, followed by a separate array of one "is state group" byte per id
    let group_ids =
        read_ids(reader, count).map_err(ObjectError::factory(id, ObjectErrorKind::Groups))?;

    group_ids
        .into_iter()
        .map(|group_id| {
            reader.u8().map(|flag| GoverningGroup {
                group_id,
                kind: if flag == 1 {
                    GroupKind::State
                } else {
                    GroupKind::Switch
                },
            })
        })
        .collect::<ReadResult<_>>()
        .map_err(ObjectError::factory(id, ObjectErrorKind::Groups))
}
