use serde::Serialize;

use crate::lnk::{
    context::DecodeContext,
    cursor::{ByteCursor, OutOfBounds},
    helpers::{Guid, decode_narrow_padded},
};

const TRACKER_LENGTH: u32 = 0x58;
const TRACKER_VERSION: u32 = 0;

/// TrackerDataBlock: data used by the Distributed Link Tracking service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tracker {
    pub length: u32,
    pub version: u32,
    /// NetBIOS name of the machine the target was last seen on.
    pub machine_id: String,
    pub droid: (Guid, Guid),
    pub droid_birth: (Guid, Guid),
}

impl Tracker {
    pub(crate) fn parse(
        payload: &mut ByteCursor,
        ctx: &mut DecodeContext,
    ) -> Result<Self, OutOfBounds> {
        let length_at = payload.absolute_position();
        let length = payload.read_u32()?;
        if length != TRACKER_LENGTH {
            ctx.mismatch(
                "TrackerDataBlock.Length",
                length_at,
                format!("{TRACKER_LENGTH:#x}"),
                format!("{length:#x}"),
            );
        }
        let version_at = payload.absolute_position();
        let version = payload.read_u32()?;
        if version != TRACKER_VERSION {
            ctx.mismatch("TrackerDataBlock.Version", version_at, TRACKER_VERSION, version);
        }

        let machine_id = decode_narrow_padded(payload.read_bytes(16)?, ctx.config.narrow_encoding);
        let droid = (payload.read_guid()?, payload.read_guid()?);
        let droid_birth = (payload.read_guid()?, payload.read_guid()?);

        Ok(Self {
            length,
            version,
            machine_id,
            droid,
            droid_birth,
        })
    }
}
