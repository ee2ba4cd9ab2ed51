use log::debug;
use serde::Serialize;

use crate::{
    config::NarrowCount,
    lnk::{
        context::DecodeContext,
        cursor::OutOfBounds,
        header::LinkFlags,
        helpers::decode_utf16le,
    },
};

/// StringData (MS-SHLLINK 2.4). Each entry is present only when its
/// header flag is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StringData {
    pub description: Option<String>,
    pub relative_path: Option<String>,
    pub working_dir: Option<String>,
    pub arguments: Option<String>,
    pub icon_location: Option<String>,
}

impl StringData {
    pub(crate) fn parse(ctx: &mut DecodeContext, flags: LinkFlags) -> Result<Self, OutOfBounds> {
        let unicode = flags.contains(LinkFlags::IS_UNICODE);
        debug!(
            "[lnk] string data at {:#x}, unicode: {unicode}",
            ctx.cursor.absolute_position()
        );

        let description = read_if(ctx, flags, LinkFlags::HAS_NAME)?;
        let relative_path = read_if(ctx, flags, LinkFlags::HAS_RELATIVE_PATH)?;
        let working_dir = read_if(ctx, flags, LinkFlags::HAS_WORKING_DIR)?;
        let arguments = read_if(ctx, flags, LinkFlags::HAS_ARGUMENTS)?;
        let icon_location = read_if(ctx, flags, LinkFlags::HAS_ICON_LOCATION)?;

        Ok(Self {
            description,
            relative_path,
            working_dir,
            arguments,
            icon_location,
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn read_if(
    ctx: &mut DecodeContext,
    flags: LinkFlags,
    flag: LinkFlags,
) -> Result<Option<String>, OutOfBounds> {
    if !flags.contains(flag) {
        return Ok(None);
    }
    let value = if flags.contains(LinkFlags::IS_UNICODE) {
        read_sized_utf16(ctx)?
    } else {
        read_sized_narrow(ctx)?
    };
    Ok(Some(value))
}

fn read_sized_utf16(ctx: &mut DecodeContext) -> Result<String, OutOfBounds> {
    let count = ctx.cursor.read_u16()? as usize;
    let raw = ctx.cursor.read_bytes(count * 2)?;
    Ok(decode_utf16le(raw))
}

fn read_sized_narrow(ctx: &mut DecodeContext) -> Result<String, OutOfBounds> {
    let size = match ctx.config.narrow_count {
        NarrowCount::U16 => ctx.cursor.read_u16()? as usize,
        NarrowCount::U32 => ctx.cursor.read_u32()? as usize,
    };
    let raw = ctx.cursor.read_bytes(size)?;
    Ok(ctx.narrow(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DecodeConfig, NarrowEncoding};

    fn wide(text: &str) -> Vec<u8> {
        let units: Vec<u16> = text.encode_utf16().collect();
        let mut data = (units.len() as u16).to_le_bytes().to_vec();
        data.extend(units.iter().flat_map(|unit| unit.to_le_bytes()));
        data
    }

    fn narrow_u32(text: &[u8]) -> Vec<u8> {
        let mut data = (text.len() as u32).to_le_bytes().to_vec();
        data.extend_from_slice(text);
        data
    }

    #[test]
    fn test_narrow_and_wide_agree() {
        let text = "--profile=work";
        let flags = LinkFlags::HAS_ARGUMENTS;

        let narrow = narrow_u32(text.as_bytes());
        let mut ctx = DecodeContext::new(&narrow, DecodeConfig::default());
        let from_narrow = StringData::parse(&mut ctx, flags).unwrap();

        let wide = wide(text);
        let mut ctx = DecodeContext::new(&wide, DecodeConfig::default());
        let from_wide = StringData::parse(&mut ctx, flags | LinkFlags::IS_UNICODE).unwrap();

        assert_eq!(from_narrow, from_wide);
        assert_eq!(from_wide.arguments.as_deref(), Some(text));
    }

    #[test]
    fn test_fixed_order_and_gating() {
        let mut data = wide("A shortcut");
        data.extend(wide(".\\app.exe"));
        data.extend(wide("%SystemRoot%\\app.ico"));
        let flags = LinkFlags::IS_UNICODE
            | LinkFlags::HAS_NAME
            | LinkFlags::HAS_RELATIVE_PATH
            | LinkFlags::HAS_ICON_LOCATION;

        let mut ctx = DecodeContext::new(&data, DecodeConfig::default());
        let strings = StringData::parse(&mut ctx, flags).unwrap();
        assert_eq!(strings.description.as_deref(), Some("A shortcut"));
        assert_eq!(strings.relative_path.as_deref(), Some(".\\app.exe"));
        assert_eq!(strings.working_dir, None);
        assert_eq!(strings.arguments, None);
        assert_eq!(strings.icon_location.as_deref(), Some("%SystemRoot%\\app.ico"));
        assert_eq!(ctx.cursor.remaining(), 0);
    }

    #[test]
    fn test_narrow_count_u16() {
        let data = [0x03, 0x00, b'c', b'a', b'f', 0xEE];
        let config = DecodeConfig::build().narrow_count(NarrowCount::U16);
        let mut ctx = DecodeContext::new(&data, config);
        let strings = StringData::parse(&mut ctx, LinkFlags::HAS_WORKING_DIR).unwrap();
        assert_eq!(strings.working_dir.as_deref(), Some("caf"));
        assert_eq!(ctx.cursor.position(), 5);
    }

    #[test]
    fn test_narrow_encodings() {
        let data = narrow_u32("café".as_bytes());

        let mut ctx = DecodeContext::new(&data, DecodeConfig::default());
        let latin1 = StringData::parse(&mut ctx, LinkFlags::HAS_NAME).unwrap();
        assert_eq!(latin1.description.as_deref(), Some("cafÃ©"));

        let config = DecodeConfig::build().narrow_encoding(NarrowEncoding::Utf8);
        let mut ctx = DecodeContext::new(&data, config);
        let utf8 = StringData::parse(&mut ctx, LinkFlags::HAS_NAME).unwrap();
        assert_eq!(utf8.description.as_deref(), Some("café"));
    }

    #[test]
    fn test_truncated_string_is_fatal() {
        let data = [0x10, 0x00, b'a', 0x00];
        let mut ctx = DecodeContext::new(&data, DecodeConfig::default());
        let flags = LinkFlags::HAS_NAME | LinkFlags::IS_UNICODE;
        assert!(StringData::parse(&mut ctx, flags).is_err());
    }

    #[test]
    fn test_no_flags_reads_nothing() {
        let data = [0xFF; 4];
        let mut ctx = DecodeContext::new(&data, DecodeConfig::default());
        let strings = StringData::parse(&mut ctx, LinkFlags::empty()).unwrap();
        assert!(strings.is_empty());
        assert_eq!(ctx.cursor.position(), 0);
    }
}
