use crate::error::DecodeError;
use crate::read::Reader;
pub(crate) mod error;
#[cfg(test)]
#[allow(unused_results)]
pub(crate) mod fixture;
pub(crate) mod object;
mod props;
use error::{BankError, BankErrorKind};
use object::{CompositionObject, ObjectKind, PlaylistContainer, Segment, SwitchContainer, Track};

const OBJECT_SECTION: [u8; 4] = *b"HIRC";

// only used for diagnostics
static SECTION_NAMES: phf::Map<&'static [u8], &'static str> = phf::phf_map! {
    b"BKHD" => "bank header",
    b"DIDX" => "media index",
    b"DATA" => "media data",
    b"HIRC" => "object hierarchy",
    b"STID" => "bank names",
    b"STMG" => "global settings",
    b"ENVS" => "environment curves",
    b"PLAT" => "platform",
    b"INIT" => "plugin list",
};

/// The composition objects of one decoded soundbank, in record order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Soundbank {
    objects: Vec<CompositionObject>,
}

impl Soundbank {
    /// Decodes the object section of a complete soundbank.
    ///
    /// Sections other than the object section are skipped, as are objects of kinds other than
    /// the four music kinds.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is truncated, a declared length runs past its enclosing
    /// section, a record's payload does not fit its declared length, or a switch container's
    /// path table is corrupt. Nothing is returned in that case, since a record boundary that
    /// can't be trusted makes every following record suspect.
    pub fn parse(data: &[u8]) -> Result<Self, DecodeError> {
        let objects = parse_sections(data)?;
        Ok(Self { objects })
    }

    /// Returns every decoded object.
    #[must_use]
    pub fn objects(&self) -> &[CompositionObject] {
        &self.objects
    }

    /// Returns the decoded tracks.
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.objects.iter().filter_map(CompositionObject::as_track)
    }

    /// Returns the decoded segments.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.objects.iter().filter_map(CompositionObject::as_segment)
    }

    /// Returns the decoded playlist containers.
    pub fn playlist_containers(&self) -> impl Iterator<Item = &PlaylistContainer> {
        self.objects
            .iter()
            .filter_map(CompositionObject::as_playlist_container)
    }

    /// Returns the decoded switch containers.
    pub fn switch_containers(&self) -> impl Iterator<Item = &SwitchContainer> {
        self.objects
            .iter()
            .filter_map(CompositionObject::as_switch_container)
    }

    pub(crate) fn into_objects(self) -> Vec<CompositionObject> {
        self.objects
    }
}

fn parse_sections(data: &[u8]) -> Result<Vec<CompositionObject>, BankError> {
    let mut reader = Reader::new(data);
    let mut objects = Vec::new();

    while reader.position() < data.len() {
        let tag = reader
            .take_const::<4>()
            .map_err(BankError::factory(BankErrorKind::SectionTag))?;

        let len = reader
            .le_u32()
            .map_err(BankError::factory(BankErrorKind::SectionLength))?;

        let end = reader
            .position()
            .checked_add(len as usize)
            .filter(|&end| end <= data.len())
            .ok_or_else(|| {
                BankError::new(BankErrorKind::SectionBounds { tag, len }, reader.position())
            })?;

        if tag == OBJECT_SECTION {
            let before = objects.len();
            parse_objects(&mut reader, end, &mut objects)?;
            log::debug!("decoded {} music objects", objects.len() - before);
        } else {
            log::debug!(
                "skipping {} section ({len} bytes)",
                SECTION_NAMES
                    .get(tag.as_slice())
                    .copied()
                    .unwrap_or("unknown")
            );
        }

        reader
            .advance_to(end)
            .map_err(BankError::factory(BankErrorKind::SectionEnd))?;
    }

    Ok(objects)
}

fn parse_objects(
    reader: &mut Reader<&[u8]>,
    section_end: usize,
    objects: &mut Vec<CompositionObject>,
) -> Result<(), BankError> {
    let count = reader
        .le_u32()
        .map_err(BankError::factory(BankErrorKind::ObjectCount))?;

    for index in 0..count {
        let (tag, len) = reader
            .u8()
            .and_then(|tag| reader.le_u32().map(|len| (tag, len)))
            .map_err(BankError::factory(BankErrorKind::ObjectHeader { index }))?;

        if len < 4 {
            return Err(BankError::new(
                BankErrorKind::ObjectLength { index, len },
                reader.position(),
            ));
        }

        // the declared length counts from the id field onward
        let end = reader
            .position()
            .checked_add(len as usize)
            .filter(|&end| end <= section_end)
            .ok_or_else(|| {
                BankError::new(BankErrorKind::ObjectBounds { index, len }, reader.position())
            })?;

        let id = reader
            .le_u32()
            .map_err(BankError::factory(BankErrorKind::ObjectHeader { index }))?;

        log::trace!("object record {index}: kind 0x{tag:02x}, id 0x{id:08x}, {len} bytes");

        if let Some(kind) = ObjectKind::from_tag(tag) {
            objects.push(object::parse(kind, reader, id)?);
        }

        // fields after the ones decoded above are not understood well enough to rely on
        reader
            .advance_to(end)
            .map_err(BankError::factory(BankErrorKind::ObjectEnd { id }))?;
    }

    Ok(())
}
