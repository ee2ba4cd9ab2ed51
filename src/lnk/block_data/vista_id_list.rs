use serde::Serialize;

use crate::lnk::{
    context::DecodeContext,
    cursor::{ByteCursor, OutOfBounds},
    id_list::{ItemId, read_items},
};

/// VistaAndAboveIDListDataBlock: an alternate IDList used instead of the
/// LinkTargetIDList on Windows Vista and later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VistaIdList {
    pub items: Vec<ItemId>,
}

impl VistaIdList {
    pub(crate) fn parse(
        payload: &mut ByteCursor,
        ctx: &mut DecodeContext,
    ) -> Result<Self, OutOfBounds> {
        let items = read_items(payload, ctx, "VistaAndAboveIDListDataBlock")?;
        Ok(Self { items })
    }
}
