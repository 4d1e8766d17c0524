use super::error::{ObjectError, ObjectErrorKind, PropertyBlock};
use crate::read::{ReadResult, Reader};
use bilge::prelude::*;
use std::io::Read;

#[bitsize(8)]
#[derive(FromBits)]
struct PositioningFlags {
    override_parent: bool,
    routing: u4,
    automation: u3,
}

impl PositioningFlags {
    fn has_positioning(&self) -> bool {
        self.routing().value() != 0 || self.has_automation()
    }

    fn has_automation(&self) -> bool {
        self.automation().value() != 0
    }
}

#[bitsize(8)]
#[derive(FromBits)]
struct AuxFlags {
    routing: u3,
    sends: u5,
}

impl AuxFlags {
    fn has_aux_sends(&self) -> bool {
        self.sends().value() != 0
    }
}

/// Skips the property block that segments, playlist containers and switch containers share.
///
/// Each optional group is gated by its own count or flag byte, read in wire order. The returned
/// byte count is informational; callers must rely on the record's declared length to find the end
/// of the object.
pub(super) fn skip_node_properties<R: Read>(
    reader: &mut Reader<R>,
    id: u32,
) -> Result<usize, ObjectError> {
    let start = reader.position();
    let block = |block| ObjectError::factory(id, ObjectErrorKind::Properties(block));

    skip_effects(reader).map_err(block(PropertyBlock::Effects))?;
    reader.skip(10).map_err(block(PropertyBlock::Base))?;

    skip_counted_u8(reader, 5).map_err(block(PropertyBlock::Parameters))?;
    skip_counted_u8(reader, 9).map_err(block(PropertyBlock::RandomizedParameters))?;

    let positioning = reader
        .u8()
        .map(PositioningFlags::from)
        .map_err(block(PropertyBlock::Positioning))?;

    if positioning.has_positioning() {
        reader.skip(1).map_err(block(PropertyBlock::Positioning))?;

        if positioning.has_automation() {
            skip_automation_path(reader).map_err(block(PropertyBlock::AutomationPath))?;
        }
    }

    let aux = reader
        .u8()
        .map(AuxFlags::from)
        .map_err(block(PropertyBlock::Aux))?;

    if aux.has_aux_sends() {
        reader.skip(16).map_err(block(PropertyBlock::Aux))?;
    }

    reader.skip(10).map_err(block(PropertyBlock::Advanced))?;

    skip_counted_u8(reader, 3).map_err(block(PropertyBlock::Properties))?;
    skip_state_groups(reader).map_err(block(PropertyBlock::StateGroups))?;
    skip_rtpc_curves(reader).map_err(block(PropertyBlock::RtpcCurves))?;

    Ok(reader.position() - start)
}

fn skip_effects<R: Read>(reader: &mut Reader<R>) -> ReadResult<()> {
    reader.skip(1)?;
    let count = reader.u8()?;

    if count > 0 {
        // bypass flags, then one entry per effect
        reader.skip(1 + 7 * usize::from(count))?;
    }

    Ok(())
}

fn skip_automation_path<R: Read>(reader: &mut Reader<R>) -> ReadResult<()> {
    reader.skip(5)?;
    skip_counted_u32(reader, 16)?;
    skip_counted_u32(reader, 20)
}

fn skip_state_groups<R: Read>(reader: &mut Reader<R>) -> ReadResult<()> {
    for _ in 0..reader.u8()? {
        reader.skip(5)?;
        skip_counted_u8(reader, 8)?;
    }

    Ok(())
}

fn skip_rtpc_curves<R: Read>(reader: &mut Reader<R>) -> ReadResult<()> {
    for _ in 0..reader.le_u16()? {
        reader.skip(12)?;
        let points = reader.le_u16()?;
        reader.skip(12 * usize::from(points))?;
    }

    Ok(())
}

fn skip_counted_u8<R: Read>(reader: &mut Reader<R>, entry_size: usize) -> ReadResult<()> {
    let count = reader.u8()?;
    reader.skip(entry_size * usize::from(count))
}

fn skip_counted_u32<R: Read>(reader: &mut Reader<R>, entry_size: usize) -> ReadResult<()> {
    let count = reader.le_u32()?;
    reader.skip(entry_size.saturating_mul(count as usize))
}
