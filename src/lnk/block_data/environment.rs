use serde::Serialize;

use crate::lnk::{
    context::DecodeContext,
    cursor::{ByteCursor, OutOfBounds},
    helpers::{decode_narrow_padded, decode_utf16le_padded},
};

const ANSI_SIZE: usize = 260;
const UNICODE_SIZE: usize = 520;

/// Payload shared by the EnvironmentVariable, Darwin and IconEnvironment
/// blocks: a NUL-padded code page string followed by its UTF-16 twin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentStrings {
    pub target_ansi: String,
    pub target_unicode: String,
}

impl EnvironmentStrings {
    pub(crate) fn parse(
        payload: &mut ByteCursor,
        ctx: &mut DecodeContext,
    ) -> Result<Self, OutOfBounds> {
        let ansi = payload.read_bytes(ANSI_SIZE)?;
        let target_ansi = decode_narrow_padded(ansi, ctx.config.narrow_encoding);

        let unicode = payload.read_bytes(UNICODE_SIZE)?;
        let target_unicode = decode_utf16le_padded(unicode);

        Ok(Self {
            target_ansi,
            target_unicode,
        })
    }
}
