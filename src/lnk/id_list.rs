use log::debug;
use serde::{Serialize, Serializer};
use std::fmt::{self, Debug};

use crate::lnk::{
    context::DecodeContext,
    cursor::{ByteCursor, OutOfBounds},
};

/// One shell item. The bytes are kept opaque.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ItemId {
    /// ItemIDSize, including the size field itself.
    pub size: u16,
    #[serde(serialize_with = "serialize_hex")]
    pub data: Vec<u8>,
}

impl Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemId")
            .field("size", &self.size)
            .field("data", &hex_string(&self.data))
            .finish()
    }
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

fn serialize_hex<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex_string(bytes))
}

/// LinkTargetIDList (MS-SHLLINK 2.2).
#[derive(Debug, Clone, Serialize)]
pub struct IdList {
    /// IDListSize, excluding the size field itself.
    pub size: u16,
    pub items: Vec<ItemId>,
}

impl IdList {
    pub(crate) fn parse(ctx: &mut DecodeContext) -> Result<Self, OutOfBounds> {
        let size = ctx.cursor.read_u16()?;
        debug!(
            "[lnk] id list of {size} bytes at {:#x}",
            ctx.cursor.absolute_position()
        );
        let mut list = ctx.cursor.sub_cursor(size as usize)?;
        let items = read_items(&mut list, ctx, "LinkTargetIDList")?;
        Ok(Self { size, items })
    }
}

/// Reads items until the last two bytes of `list`, then consumes the
/// terminal ID there.
pub(crate) fn read_items(
    list: &mut ByteCursor,
    ctx: &mut DecodeContext,
    structure: &'static str,
) -> Result<Vec<ItemId>, OutOfBounds> {
    let terminator_at = list.len().saturating_sub(2);
    let mut items = Vec::new();

    while list.position() < terminator_at {
        let item_offset = list.absolute_position();
        let size = list.read_u16()?;
        if size < 2 {
            ctx.mismatch(
                structure,
                item_offset,
                format!(
                    "terminal ID at {:#x}",
                    list.absolute_position() - list.position() + terminator_at
                ),
                format!("item size {size}"),
            );
            return Ok(items);
        }
        let data = list.read_bytes(size as usize - 2)?.to_vec();
        items.push(ItemId { size, data });
    }

    let terminator_offset = list.absolute_position();
    let terminator = list.read_u16()?;
    if terminator != 0 {
        ctx.mismatch(structure, terminator_offset, "terminal ID 0", terminator);
    }

    Ok(items)
}
