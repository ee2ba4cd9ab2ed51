use log::debug;
use serde::Serialize;

use crate::lnk::{
    block_data::{
        console::Console, console_fe::ConsoleFe, environment::EnvironmentStrings,
        known_folder::KnownFolder, property_store::PropertyStore, shim::Shim,
        special_folder::SpecialFolder, tracker::Tracker, vista_id_list::VistaIdList,
    },
    context::{DecodeContext, Diagnostic},
    cursor::{ByteCursor, OutOfBounds},
};

pub mod console;
pub mod console_fe;
pub mod environment;
pub mod known_folder;
pub mod property_store;
pub mod shim;
pub mod special_folder;
pub mod tracker;
pub mod vista_id_list;

/// BlockSize (4) + BlockSignature (4).
const BLOCK_HEADER_SIZE: u32 = 8;
/// Any BlockSize below this is the TerminalBlock.
const TERMINAL_BLOCK_LIMIT: u32 = 4;

/// One ExtraData block (MS-SHLLINK 2.5).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "block")]
pub enum ExtraDataBlock {
    EnvironmentVariable(EnvironmentStrings),
    Console(Console),
    Tracker(Tracker),
    ConsoleFe(ConsoleFe),
    SpecialFolder(SpecialFolder),
    Darwin(EnvironmentStrings),
    IconEnvironment(EnvironmentStrings),
    Shim(Shim),
    PropertyStore(PropertyStore),
    KnownFolder(KnownFolder),
    VistaAndAboveIdList(VistaIdList),
}

impl ExtraDataBlock {
    pub fn signature(&self) -> BlockSignature {
        match self {
            ExtraDataBlock::EnvironmentVariable(_) => BlockSignature::EnvironmentVariableDataBlock,
            ExtraDataBlock::Console(_) => BlockSignature::ConsoleDataBlock,
            ExtraDataBlock::Tracker(_) => BlockSignature::TrackerDataBlock,
            ExtraDataBlock::ConsoleFe(_) => BlockSignature::ConsoleFEDataBlock,
            ExtraDataBlock::SpecialFolder(_) => BlockSignature::SpecialFolderDataBlock,
            ExtraDataBlock::Darwin(_) => BlockSignature::DarwinDataBlock,
            ExtraDataBlock::IconEnvironment(_) => BlockSignature::IconEnvironmentDataBlock,
            ExtraDataBlock::Shim(_) => BlockSignature::ShimDataBlock,
            ExtraDataBlock::PropertyStore(_) => BlockSignature::PropertyStoreDataBlock,
            ExtraDataBlock::KnownFolder(_) => BlockSignature::KnownFolderDataBlock,
            ExtraDataBlock::VistaAndAboveIdList(_) => BlockSignature::VistaAndAboveIDListDataBlock,
        }
    }
}

/// Reads blocks until the TerminalBlock, the end of the buffer, or a block
/// that cannot be decoded. Only a read past the buffer end is an error; a
/// block whose contents overrun its BlockSize is reported and ends the loop.
pub(crate) fn parse_extra_data(
    ctx: &mut DecodeContext,
) -> Result<Vec<ExtraDataBlock>, OutOfBounds> {
    let mut blocks = Vec::new();

    while ctx.cursor.remaining() >= 4 {
        let offset = ctx.cursor.absolute_position();
        let size = ctx.cursor.read_u32()?;
        if size < TERMINAL_BLOCK_LIMIT {
            debug!("[lnk] terminal block at {offset:#x}");
            break;
        }

        let raw_signature = ctx.cursor.read_u32()?;
        let Some(signature) = BlockSignature::from_u32(raw_signature) else {
            ctx.report(Diagnostic::UnknownExtraBlockSignature {
                offset,
                signature: raw_signature,
            });
            break;
        };
        if size < BLOCK_HEADER_SIZE {
            ctx.report(Diagnostic::UnsupportedLayout {
                structure: signature.name(),
                offset,
                reason: format!("block size {size} is smaller than its header"),
            });
            break;
        }

        debug!("[lnk] {signature:?} at {offset:#x}, {size} bytes");
        let mut payload = ctx.cursor.sub_cursor((size - BLOCK_HEADER_SIZE) as usize)?;

        let block = match parse_block(signature, &mut payload, ctx) {
            Ok(block) => block,
            Err(err) => {
                ctx.contain_overrun(signature.name(), offset, err)?;
                break;
            }
        };

        if payload.remaining() > 0 {
            debug!(
                "[lnk] {} unread bytes at the end of {signature:?}",
                payload.remaining()
            );
        }
        blocks.push(block);
    }

    Ok(blocks)
}

fn parse_block(
    signature: BlockSignature,
    payload: &mut ByteCursor,
    ctx: &mut DecodeContext,
) -> Result<ExtraDataBlock, OutOfBounds> {
    Ok(match signature {
        BlockSignature::EnvironmentVariableDataBlock => {
            ExtraDataBlock::EnvironmentVariable(EnvironmentStrings::parse(payload, ctx)?)
        }
        BlockSignature::ConsoleDataBlock => ExtraDataBlock::Console(Console::parse(payload)?),
        BlockSignature::TrackerDataBlock => ExtraDataBlock::Tracker(Tracker::parse(payload, ctx)?),
        BlockSignature::ConsoleFEDataBlock => ExtraDataBlock::ConsoleFe(ConsoleFe::parse(payload)?),
        BlockSignature::SpecialFolderDataBlock => {
            ExtraDataBlock::SpecialFolder(SpecialFolder::parse(payload)?)
        }
        BlockSignature::DarwinDataBlock => {
            ExtraDataBlock::Darwin(EnvironmentStrings::parse(payload, ctx)?)
        }
        BlockSignature::IconEnvironmentDataBlock => {
            ExtraDataBlock::IconEnvironment(EnvironmentStrings::parse(payload, ctx)?)
        }
        BlockSignature::ShimDataBlock => ExtraDataBlock::Shim(Shim::parse(payload)?),
        BlockSignature::PropertyStoreDataBlock => {
            ExtraDataBlock::PropertyStore(PropertyStore::parse(payload, ctx)?)
        }
        BlockSignature::KnownFolderDataBlock => {
            ExtraDataBlock::KnownFolder(KnownFolder::parse(payload)?)
        }
        BlockSignature::VistaAndAboveIDListDataBlock => {
            ExtraDataBlock::VistaAndAboveIdList(VistaIdList::parse(payload, ctx)?)
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlockSignature {
    ConsoleDataBlock,
    ConsoleFEDataBlock,
    DarwinDataBlock,
    EnvironmentVariableDataBlock,
    IconEnvironmentDataBlock,
    KnownFolderDataBlock,
    PropertyStoreDataBlock,
    ShimDataBlock,
    SpecialFolderDataBlock,
    TrackerDataBlock,
    VistaAndAboveIDListDataBlock,
}

impl BlockSignature {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0xA0000001 => Some(BlockSignature::EnvironmentVariableDataBlock),
            0xA0000002 => Some(BlockSignature::ConsoleDataBlock),
            0xA0000003 => Some(BlockSignature::TrackerDataBlock),
            0xA0000004 => Some(BlockSignature::ConsoleFEDataBlock),
            0xA0000005 => Some(BlockSignature::SpecialFolderDataBlock),
            0xA0000006 => Some(BlockSignature::DarwinDataBlock),
            0xA0000007 => Some(BlockSignature::IconEnvironmentDataBlock),
            0xA0000008 => Some(BlockSignature::ShimDataBlock),
            0xA0000009 => Some(BlockSignature::PropertyStoreDataBlock),
            0xA000000B => Some(BlockSignature::KnownFolderDataBlock),
            0xA000000C => Some(BlockSignature::VistaAndAboveIDListDataBlock),
            _ => None,
        }
    }

    pub fn to_u32(self) -> u32 {
        match self {
            BlockSignature::EnvironmentVariableDataBlock => 0xA0000001,
            BlockSignature::ConsoleDataBlock => 0xA0000002,
            BlockSignature::TrackerDataBlock => 0xA0000003,
            BlockSignature::ConsoleFEDataBlock => 0xA0000004,
            BlockSignature::SpecialFolderDataBlock => 0xA0000005,
            BlockSignature::DarwinDataBlock => 0xA0000006,
            BlockSignature::IconEnvironmentDataBlock => 0xA0000007,
            BlockSignature::ShimDataBlock => 0xA0000008,
            BlockSignature::PropertyStoreDataBlock => 0xA0000009,
            BlockSignature::KnownFolderDataBlock => 0xA000000B,
            BlockSignature::VistaAndAboveIDListDataBlock => 0xA000000C,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BlockSignature::ConsoleDataBlock => "ConsoleDataBlock",
            BlockSignature::ConsoleFEDataBlock => "ConsoleFEDataBlock",
            BlockSignature::DarwinDataBlock => "DarwinDataBlock",
            BlockSignature::EnvironmentVariableDataBlock => "EnvironmentVariableDataBlock",
            BlockSignature::IconEnvironmentDataBlock => "IconEnvironmentDataBlock",
            BlockSignature::KnownFolderDataBlock => "KnownFolderDataBlock",
            BlockSignature::PropertyStoreDataBlock => "PropertyStoreDataBlock",
            BlockSignature::ShimDataBlock => "ShimDataBlock",
            BlockSignature::SpecialFolderDataBlock => "SpecialFolderDataBlock",
            BlockSignature::TrackerDataBlock => "TrackerDataBlock",
            BlockSignature::VistaAndAboveIDListDataBlock => "VistaAndAboveIDListDataBlock",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecodeConfig;

    fn block(signature: u32, payload: &[u8]) -> Vec<u8> {
        let mut data = ((payload.len() + 8) as u32).to_le_bytes().to_vec();
        data.extend_from_slice(&signature.to_le_bytes());
        data.extend_from_slice(payload);
        data
    }

    #[test]
    fn test_signature_table() {
        for raw in 0xA0000001..=0xA000000C {
            match BlockSignature::from_u32(raw) {
                Some(signature) => assert_eq!(signature.to_u32(), raw),
                None => assert_eq!(raw, 0xA000000A),
            }
        }
        assert_eq!(BlockSignature::from_u32(0xA000000D), None);
    }

    #[test]
    fn test_terminal_block_ends_loop() {
        let mut data = block(0xA0000004, &65001u32.to_le_bytes());
        data.extend_from_slice(&[0, 0, 0, 0]);
        data.extend(block(0xA0000004, &437u32.to_le_bytes()));

        let mut ctx = DecodeContext::new(&data, DecodeConfig::default());
        let blocks = parse_extra_data(&mut ctx).unwrap();
        assert_eq!(blocks, vec![ExtraDataBlock::ConsoleFe(ConsoleFe { code_page: 65001 })]);
        assert_eq!(ctx.cursor.position(), 16);
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn test_unknown_signature_stops_cleanly() {
        let mut data = block(0xA0000004, &1252u32.to_le_bytes());
        data.extend(block(0xDEADBEEF, &[1, 2, 3, 4]));

        let mut ctx = DecodeContext::new(&data, DecodeConfig::default());
        let blocks = parse_extra_data(&mut ctx).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(
            ctx.diagnostics,
            vec![Diagnostic::UnknownExtraBlockSignature {
                offset: 12,
                signature: 0xDEADBEEF
            }]
        );
    }

    #[test]
    fn test_block_smaller_than_header() {
        let mut data = 6u32.to_le_bytes().to_vec();
        data.extend_from_slice(&0xA0000005u32.to_le_bytes());
        let mut ctx = DecodeContext::new(&data, DecodeConfig::default());
        let blocks = parse_extra_data(&mut ctx).unwrap();
        assert!(blocks.is_empty());
        assert!(matches!(
            ctx.diagnostics[0],
            Diagnostic::UnsupportedLayout {
                structure: "SpecialFolderDataBlock",
                ..
            }
        ));
    }

    #[test]
    fn test_declared_size_bounds_payload() {
        // SpecialFolder payload is 8 bytes; the block declares 4 extra.
        let mut payload = 0x24u32.to_le_bytes().to_vec();
        payload.extend_from_slice(&0x1Eu32.to_le_bytes());
        payload.extend_from_slice(&[0xAA; 4]);
        let mut data = block(0xA0000005, &payload);
        data.extend_from_slice(&[0, 0, 0, 0]);

        let mut ctx = DecodeContext::new(&data, DecodeConfig::default());
        let blocks = parse_extra_data(&mut ctx).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].signature(), BlockSignature::SpecialFolderDataBlock);
        assert_eq!(ctx.cursor.remaining(), 0);
    }

    #[test]
    fn test_block_past_buffer_end_is_fatal() {
        let mut data = 0x100u32.to_le_bytes().to_vec();
        data.extend_from_slice(&0xA0000003u32.to_le_bytes());
        data.extend_from_slice(&[0; 16]);
        let mut ctx = DecodeContext::new(&data, DecodeConfig::default());
        let err = parse_extra_data(&mut ctx).unwrap_err();
        assert_eq!(err.offset, 8);
    }

    #[test]
    fn test_undersized_block_is_reported() {
        // ConsoleFE needs 4 payload bytes but the block declares 2.
        let mut data = 10u32.to_le_bytes().to_vec();
        data.extend_from_slice(&0xA0000004u32.to_le_bytes());
        data.extend_from_slice(&[0xE9, 0xFD, 0, 0]);
        data.extend(block(0xA0000004, &437u32.to_le_bytes()));

        let mut ctx = DecodeContext::new(&data, DecodeConfig::default());
        let blocks = parse_extra_data(&mut ctx).unwrap();
        assert!(blocks.is_empty());
        assert_eq!(ctx.cursor.position(), 10);
        assert!(matches!(
            ctx.diagnostics.as_slice(),
            [Diagnostic::UnsupportedLayout {
                structure: "ConsoleFEDataBlock",
                offset: 0,
                ..
            }]
        ));
    }

    #[test]
    fn test_undersized_block_at_buffer_end_is_fatal() {
        let mut data = 10u32.to_le_bytes().to_vec();
        data.extend_from_slice(&0xA0000004u32.to_le_bytes());
        data.extend_from_slice(&[0xE9, 0xFD]);

        let mut ctx = DecodeContext::new(&data, DecodeConfig::default());
        let err = parse_extra_data(&mut ctx).unwrap_err();
        assert_eq!(err.end, 10);
    }

    #[test]
    fn test_short_trailer_is_ignored() {
        let data = [0x01, 0x02, 0x03];
        let mut ctx = DecodeContext::new(&data, DecodeConfig::default());
        assert!(parse_extra_data(&mut ctx).unwrap().is_empty());
    }
}
