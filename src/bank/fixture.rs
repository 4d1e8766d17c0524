//! Builders for hand-made soundbank bytes used across the crate's tests.

#[derive(Default)]
pub(crate) struct ByteWriter(Vec<u8>);

impl ByteWriter {
    pub(crate) fn u8(&mut self, n: u8) -> &mut Self {
        self.0.push(n);
        self
    }

    pub(crate) fn le_u16(&mut self, n: u16) -> &mut Self {
        self.0.extend_from_slice(&n.to_le_bytes());
        self
    }

    pub(crate) fn le_u32(&mut self, n: u32) -> &mut Self {
        self.0.extend_from_slice(&n.to_le_bytes());
        self
    }

    pub(crate) fn bytes(&mut self, data: &[u8]) -> &mut Self {
        self.0.extend_from_slice(data);
        self
    }

    pub(crate) fn zeros(&mut self, len: usize) -> &mut Self {
        self.0.resize(self.0.len() + len, 0);
        self
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

/// Shape of the shared property block; every count and flag is written as given.
#[derive(Default)]
pub(crate) struct Properties {
    pub(crate) effects: u8,
    pub(crate) parameters: u8,
    pub(crate) randomized_parameters: u8,
    pub(crate) positioning: u8,
    pub(crate) automation_keys: u32,
    pub(crate) automation_paths: u32,
    pub(crate) aux: u8,
    pub(crate) properties: u8,
    pub(crate) state_groups: Vec<u8>,
    pub(crate) rtpc_points: Vec<u16>,
}

impl Properties {
    pub(crate) fn write(&self, out: &mut ByteWriter) {
        out.u8(0).u8(self.effects);
        if self.effects > 0 {
            out.u8(0).zeros(7 * usize::from(self.effects));
        }

        out.zeros(10);
        out.u8(self.parameters)
            .zeros(5 * usize::from(self.parameters));
        out.u8(self.randomized_parameters)
            .zeros(9 * usize::from(self.randomized_parameters));

        out.u8(self.positioning);
        if self.positioning >= 0x02 {
            out.u8(0);
            if self.positioning >= 0x20 {
                out.zeros(5)
                    .le_u32(self.automation_keys)
                    .zeros(16 * self.automation_keys as usize)
                    .le_u32(self.automation_paths)
                    .zeros(20 * self.automation_paths as usize);
            }
        }

        out.u8(self.aux);
        if self.aux >= 0x08 {
            out.zeros(16);
        }

        out.zeros(10);
        out.u8(self.properties).zeros(3 * usize::from(self.properties));

        out.u8(u8::try_from(self.state_groups.len()).unwrap());
        for &states in &self.state_groups {
            out.zeros(5).u8(states).zeros(8 * usize::from(states));
        }

        out.le_u16(u16::try_from(self.rtpc_points.len()).unwrap());
        for &points in &self.rtpc_points {
            out.zeros(12).le_u16(points).zeros(12 * usize::from(points));
        }
    }
}

pub(crate) const TRACK: u8 = 0x0B;
pub(crate) const SEGMENT: u8 = 0x0A;
pub(crate) const SWITCH: u8 = 0x0C;
pub(crate) const PLAYLIST: u8 = 0x0D;

pub(crate) fn record(kind: u8, id: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = ByteWriter::default();
    out.u8(kind)
        .le_u32(u32::try_from(payload.len() + 4).unwrap())
        .le_u32(id)
        .bytes(payload);
    out.into_bytes()
}

pub(crate) fn section(tag: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut out = ByteWriter::default();
    out.bytes(tag)
        .le_u32(u32::try_from(body.len()).unwrap())
        .bytes(body);
    out.into_bytes()
}

pub(crate) fn objects_section(records: &[Vec<u8>]) -> Vec<u8> {
    let mut body = ByteWriter::default();
    body.le_u32(u32::try_from(records.len()).unwrap())
        .bytes(&records.concat());
    section(b"HIRC", &body.into_bytes())
}

/// A soundbank with a header section, the given objects, and a trailing unrelated section.
pub(crate) fn bank(records: &[Vec<u8>]) -> Vec<u8> {
    [
        section(b"BKHD", &[0x8C, 0, 0, 0, 1, 2, 3, 4]),
        objects_section(records),
        section(b"STID", &[0; 6]),
    ]
    .concat()
}

/// (source type, inclusion type, source id)
pub(crate) fn track_payload(sources: &[(u16, u8, u32)]) -> Vec<u8> {
    let mut out = ByteWriter::default();
    out.u8(0)
        .le_u32(u32::try_from(sources.len()).unwrap());

    for &(source_type, inclusion, id) in sources {
        out.le_u16(source_type);
        if matches!(source_type, 1 | 2) {
            out.zeros(2);
        }
        out.u8(inclusion).le_u32(id);
        if inclusion <= 2 {
            out.le_u32(0xDEAD_BEEF);
        }
        out.u8(0);
    }

    out.into_bytes()
}

pub(crate) fn track(id: u32, audio_ids: &[u32]) -> Vec<u8> {
    let sources: Vec<_> = audio_ids.iter().map(|&audio| (0, 0, audio)).collect();
    record(TRACK, id, &track_payload(&sources))
}

pub(crate) fn list_payload(props: &Properties, ids: &[u32]) -> Vec<u8> {
    let mut out = ByteWriter::default();
    out.u8(0);
    props.write(&mut out);
    out.le_u32(u32::try_from(ids.len()).unwrap());
    for &id in ids {
        out.le_u32(id);
    }
    // trailing fields the decoder does not look at
    out.zeros(13);
    out.into_bytes()
}

pub(crate) fn segment(id: u32, track_ids: &[u32]) -> Vec<u8> {
    record(SEGMENT, id, &list_payload(&Properties::default(), track_ids))
}

pub(crate) fn playlist(id: u32, segment_ids: &[u32]) -> Vec<u8> {
    record(PLAYLIST, id, &list_payload(&Properties::default(), segment_ids))
}

#[derive(Default)]
pub(crate) struct SwitchFixture {
    pub(crate) props: Properties,
    pub(crate) children: Vec<u32>,
    pub(crate) stingers: u32,
    /// (source count, destination count, uses transition segment)
    pub(crate) transitions: Vec<(u32, u32, bool)>,
    /// (group id, is state group)
    pub(crate) groups: Vec<(u32, bool)>,
    /// (decided-by id, target)
    pub(crate) paths: Vec<(u32, u32)>,
}

impl SwitchFixture {
    pub(crate) fn payload(&self) -> Vec<u8> {
        let mut out = ByteWriter::default();
        out.u8(0);
        self.props.write(&mut out);

        out.le_u32(u32::try_from(self.children.len()).unwrap());
        for &child in &self.children {
            out.le_u32(child);
        }

        out.zeros(23)
            .le_u32(self.stingers)
            .zeros(24 * self.stingers as usize);

        out.le_u32(u32::try_from(self.transitions.len()).unwrap());
        for &(sources, destinations, segment) in &self.transitions {
            out.le_u32(sources).zeros(4 * sources as usize);
            out.le_u32(destinations).zeros(4 * destinations as usize);
            out.zeros(47).u8(u8::from(segment));
            if segment {
                out.zeros(30);
            }
        }

        out.u8(0)
            .le_u32(u32::try_from(self.groups.len()).unwrap());
        for &(group, _) in &self.groups {
            out.le_u32(group);
        }
        for &(_, is_state) in &self.groups {
            out.u8(u8::from(is_state));
        }

        out.le_u32(u32::try_from(self.paths.len() * 12).unwrap()).u8(0);
        for &(decided_by, target) in &self.paths {
            out.le_u32(decided_by).le_u32(target).zeros(4);
        }

        out.into_bytes()
    }

    pub(crate) fn record(&self, id: u32) -> Vec<u8> {
        record(SWITCH, id, &self.payload())
    }
}

pub(crate) fn branch(start: u16, count: u16) -> u32 {
    u32::from(start) | (u32::from(count) << 16)
}
