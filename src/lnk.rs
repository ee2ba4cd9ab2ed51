use log::debug;
use serde::Serialize;
use std::io::{self, Read};

use crate::{
    config::DecodeConfig,
    lnk::{
        block_data::{BlockSignature, ExtraDataBlock, parse_extra_data},
        context::{DecodeContext, Diagnostic},
        cursor::OutOfBounds,
        header::{LinkFlags, ShellLinkHeader},
        id_list::IdList,
        link_info::LinkInfo,
        string_data::StringData,
    },
};

pub mod block_data;
pub mod context;
pub mod cursor;
pub mod header;
pub mod helpers;
pub mod id_list;
pub mod link_info;
pub mod string_data;

#[derive(Debug, thiserror::Error)]
pub enum LnkParseError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("truncated link: {0}")]
    OutOfBounds(#[from] OutOfBounds),
}

/// A decoded shell link.
///
/// Sections the header flags mark as absent are `None` (or empty). Anomalies
/// that did not stop decoding are listed in `diagnostics`, in the order they
/// were met.
#[derive(Debug, Clone, Serialize)]
pub struct Lnk {
    pub header: ShellLinkHeader,
    pub id_list: Option<IdList>,
    pub link_info: Option<LinkInfo>,
    pub string_data: StringData,
    pub extra_data: Vec<ExtraDataBlock>,
    pub diagnostics: Vec<Diagnostic>,
    /// Offset at which decoding stopped.
    pub end_offset: usize,
}

impl Lnk {
    pub fn parse(data: &[u8]) -> Result<Self, LnkParseError> {
        Self::parse_with(data, &DecodeConfig::default())
    }

    pub fn parse_with(data: &[u8], config: &DecodeConfig) -> Result<Self, LnkParseError> {
        let mut ctx = DecodeContext::new(data, config.clone());
        debug!("[lnk] decoding {} bytes", data.len());

        let header = ShellLinkHeader::parse(&mut ctx)?;
        let flags = header.link_flags;

        let id_list = if flags.contains(LinkFlags::HAS_LINK_TARGET_ID_LIST) {
            Some(IdList::parse(&mut ctx)?)
        } else {
            None
        };

        let link_info = if flags.contains(LinkFlags::HAS_LINK_INFO) {
            Some(LinkInfo::parse(&mut ctx)?)
        } else {
            None
        };

        let string_data = StringData::parse(&mut ctx, flags)?;
        let extra_data = parse_extra_data(&mut ctx)?;
        let end_offset = ctx.cursor.absolute_position();
        debug!(
            "[lnk] done at {end_offset:#x}, {} diagnostics",
            ctx.diagnostics.len()
        );

        Ok(Self {
            header,
            id_list,
            link_info,
            string_data,
            extra_data,
            diagnostics: ctx.diagnostics,
            end_offset,
        })
    }

    /// Reads `data` to the end, then decodes it.
    pub fn from_reader(data: &mut impl Read) -> Result<Self, LnkParseError> {
        Self::from_reader_with(data, &DecodeConfig::default())
    }

    pub fn from_reader_with(
        data: &mut impl Read,
        config: &DecodeConfig,
    ) -> Result<Self, LnkParseError> {
        let mut buffer = Vec::new();
        data.read_to_end(&mut buffer)?;
        Self::parse_with(&buffer, config)
    }

    /// First extra data block with the given signature.
    pub fn find_block(&self, signature: BlockSignature) -> Option<&ExtraDataBlock> {
        self.extra_data
            .iter()
            .find(|block| block.signature() == signature)
    }
}
