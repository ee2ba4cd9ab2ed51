use serde::Serialize;

use crate::lnk::{
    cursor::{ByteCursor, OutOfBounds},
    helpers::decode_utf16le_padded,
};

/// ShimDataBlock: name of the compatibility shim layer applied to the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shim {
    pub layer_name: String,
}

impl Shim {
    pub(crate) fn parse(payload: &mut ByteCursor) -> Result<Self, OutOfBounds> {
        let raw = payload.read_bytes(payload.remaining())?;
        Ok(Self {
            layer_name: decode_utf16le_padded(raw),
        })
    }
}
