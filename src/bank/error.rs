use crate::path::PathError;
use crate::read::ReadError;
use std::{
    error::Error,
    fmt::{Display, Formatter, Result as FmtResult},
};

#[derive(Debug)]
pub(crate) struct BankError {
    kind: BankErrorKind,
    position: usize,
    source: Option<BankErrorSource>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BankErrorKind {
    SectionTag,
    SectionLength,
    SectionBounds { tag: [u8; 4], len: u32 },
    SectionEnd,
    ObjectCount,
    ObjectHeader { index: u32 },
    ObjectLength { index: u32, len: u32 },
    ObjectBounds { index: u32, len: u32 },
    ObjectEnd { id: u32 },
    Object,
}

#[derive(Debug)]
enum BankErrorSource {
    Read(ReadError),
    Object(ObjectError),
}

impl BankError {
    pub(crate) fn new(kind: BankErrorKind, position: usize) -> Self {
        Self {
            kind,
            position,
            source: None,
        }
    }

    pub(crate) fn new_with_source(kind: BankErrorKind, source: ReadError) -> Self {
        Self {
            kind,
            position: source.position(),
            source: Some(BankErrorSource::Read(source)),
        }
    }

    pub(crate) fn factory(kind: BankErrorKind) -> impl FnOnce(ReadError) -> Self {
        move |source| Self::new_with_source(kind, source)
    }

    pub(crate) fn position(&self) -> usize {
        self.position
    }

    #[cfg(test)]
    pub(crate) fn kind(&self) -> BankErrorKind {
        self.kind
    }

    #[cfg(test)]
    pub(crate) fn is_object_err_kind(&self, kind: ObjectErrorKind) -> bool {
        match &self.source {
            Some(BankErrorSource::Object(e)) => e.kind == kind,
            _ => false,
        }
    }
}

impl From<ObjectError> for BankError {
    fn from(value: ObjectError) -> Self {
        Self {
            kind: BankErrorKind::Object,
            position: value.position,
            source: Some(BankErrorSource::Object(value)),
        }
    }
}

impl Display for BankError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        #[allow(clippy::enum_glob_use)]
        use BankErrorKind::*;

        match self.kind {
            SectionTag => f.write_str("failed to read section tag"),
            SectionLength => f.write_str("failed to read section length"),
            SectionBounds { tag, len } => f.write_str(&format!(
                "section {} declared {len} bytes, which runs past the end of the soundbank",
                String::from_utf8_lossy(&tag)
            )),
            SectionEnd => f.write_str("composition objects did not end at the declared section end"),
            ObjectCount => f.write_str("failed to read number of composition objects"),
            ObjectHeader { index } => {
                f.write_str(&format!("failed to read header of object record {index}"))
            }
            ObjectLength { index, len } => f.write_str(&format!(
                "object record {index} declared {len} bytes, too few to hold its id"
            )),
            ObjectBounds { index, len } => f.write_str(&format!(
                "object record {index} declared {len} bytes, which runs past its section"
            )),
            ObjectEnd { id } => f.write_str(&format!(
                "object 0x{id:08x} was not consistent with its declared length"
            )),
            Object => f.write_str("failed to parse composition object"),
        }?;

        f.write_str(&format!(" - byte position {}", self.position))
    }
}

impl Error for BankError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.source {
            Some(source) => match source {
                BankErrorSource::Read(e) => Some(e),
                BankErrorSource::Object(e) => Some(e),
            },
            None => None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct ObjectError {
    id: u32,
    kind: ObjectErrorKind,
    position: usize,
    source: ObjectErrorSource,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ObjectErrorKind {
    Flags,
    Properties(PropertyBlock),
    SourceCount,
    Source { index: u32 },
    ChildCount,
    ChildIds,
    Stingers,
    Transitions,
    Transition { index: u32 },
    GroupCount,
    Groups,
    PathTableLength,
    PathTable,
    Paths,
}

/// The gated parts of the property block shared by segments and containers, in wire order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PropertyBlock {
    Effects,
    Base,
    Parameters,
    RandomizedParameters,
    Positioning,
    AutomationPath,
    Aux,
    Advanced,
    Properties,
    StateGroups,
    RtpcCurves,
}

#[derive(Debug)]
enum ObjectErrorSource {
    Read(ReadError),
    Path(PathError),
}

impl ObjectError {
    pub(crate) fn new_with_source(id: u32, kind: ObjectErrorKind, source: ReadError) -> Self {
        Self {
            id,
            kind,
            position: source.position(),
            source: ObjectErrorSource::Read(source),
        }
    }

    pub(crate) fn factory(id: u32, kind: ObjectErrorKind) -> impl FnOnce(ReadError) -> Self {
        move |source| Self::new_with_source(id, kind, source)
    }

    #[cfg(test)]
    pub(crate) fn kind(&self) -> ObjectErrorKind {
        self.kind
    }

    #[cfg(test)]
    pub(crate) fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn from_path(id: u32, table_start: usize) -> impl FnOnce(PathError) -> Self {
        move |source| Self {
            id,
            kind: ObjectErrorKind::Paths,
            position: table_start + source.offset(),
            source: ObjectErrorSource::Path(source),
        }
    }
}

impl Display for PropertyBlock {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Effects => "effects",
            Self::Base => "base parameters",
            Self::Parameters => "initial parameters",
            Self::RandomizedParameters => "randomized parameters",
            Self::Positioning => "positioning",
            Self::AutomationPath => "automation path",
            Self::Aux => "aux sends",
            Self::Advanced => "advanced settings",
            Self::Properties => "property array",
            Self::StateGroups => "state groups",
            Self::RtpcCurves => "RTPC curves",
        })
    }
}

impl Display for ObjectError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        #[allow(clippy::enum_glob_use)]
        use ObjectErrorKind::*;

        match self.kind {
            Flags => f.write_str("failed to read object flags"),
            Properties(block) => f.write_str(&format!("failed to read {block} block")),
            SourceCount => f.write_str("failed to read number of audio sources"),
            Source { index } => f.write_str(&format!("failed to read audio source {index}")),
            ChildCount => f.write_str("failed to read number of children"),
            ChildIds => f.write_str("failed to read child ids"),
            Stingers => f.write_str("failed to read stingers"),
            Transitions => f.write_str("failed to read number of transitions"),
            Transition { index } => f.write_str(&format!("failed to read transition {index}")),
            GroupCount => f.write_str("failed to read number of governing groups"),
            Groups => f.write_str("failed to read governing groups"),
            PathTableLength => f.write_str("failed to read length of path table"),
            PathTable => f.write_str("failed to read path table"),
            Paths => f.write_str("failed to decode path table"),
        }?;

        f.write_str(&format!(" - object 0x{:08x}", self.id))
    }
}

impl Error for ObjectError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.source {
            ObjectErrorSource::Read(e) => Some(e),
            ObjectErrorSource::Path(e) => Some(e),
        }
    }
}
