use chrono::NaiveDateTime;
use log::debug;
use serde::Serialize;

use crate::lnk::{
    context::{DecodeContext, Diagnostic},
    cursor::{ByteCursor, OutOfBounds},
    helpers::{Guid, decode_narrow_padded, decode_utf16le_padded, filetime_to_datetime},
};

mod property_names;

pub use property_names::property_name;

const PROPERTY_STORAGE_VERSION: u32 = 0x5350_5331;
/// StorageSize (4) + Version (4) + FormatID (16).
const STORAGE_HEADER_SIZE: u32 = 24;
/// ValueSize (4) + Id (4) + Reserved (1).
const VALUE_HEADER_SIZE: u32 = 9;

/// Format ID of storages whose values are named by strings rather than ids.
const FMTID_STRING_NAMED: Guid = Guid {
    data1: 0xD5CDD505,
    data2: 0x2E9C,
    data3: 0x101B,
    data4: [0x93, 0x97, 0x08, 0x00, 0x2B, 0x2C, 0xF9, 0xAE],
};

/// PropertyStoreDataBlock: a sequence of serialized property storages.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PropertyStore {
    pub storages: Vec<PropertyStorage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyStorage {
    pub size: u32,
    pub format_id: Guid,
    pub values: Vec<PropertyValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyValue {
    pub id: u32,
    /// Canonical name such as `System.AppUserModel.ID`, when known.
    pub name: Option<&'static str>,
    pub value: TypedValue,
}

/// A decoded TypedPropertyValue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypedValue {
    Empty,
    Null,
    I1(i8),
    I2(i16),
    I4(i32),
    I8(i64),
    UI1(u8),
    UI2(u16),
    UI4(u32),
    UI8(u64),
    Int(i32),
    UInt(u32),
    R4(f32),
    R8(f64),
    /// Currency, in units of 1/10000.
    Currency(i64),
    /// OLE automation date: days since 1899-12-30.
    Date(f64),
    Error(u32),
    Bool(bool),
    Bstr(String),
    Lpstr(String),
    Lpwstr(String),
    FileTime(Option<NaiveDateTime>),
    Blob(Vec<u8>),
    Clsid(Guid),
    /// A type not decoded here, with the bytes following the type header.
    Unparsed { property_type: u16, data: Vec<u8> },
}

impl PropertyStore {
    /// Reads storages until a zero StorageSize. A storage that cannot be
    /// decoded is reported and ends the block, keeping the storages before it.
    pub(crate) fn parse(
        payload: &mut ByteCursor,
        ctx: &mut DecodeContext,
    ) -> Result<Self, OutOfBounds> {
        let mut storages = Vec::new();

        while payload.remaining() >= 4 {
            let storage_at = payload.absolute_position();
            match PropertyStorage::parse(payload, ctx) {
                Ok(Some(storage)) => storages.push(storage),
                Ok(None) => break,
                Err(err) => {
                    ctx.contain_overrun("PropertyStorage", storage_at, err)?;
                    break;
                }
            }
        }

        Ok(Self { storages })
    }

    /// Looks a value up by its canonical name.
    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.storages
            .iter()
            .flat_map(|storage| storage.values.iter())
            .find(|value| value.name == Some(name))
            .map(|value| &value.value)
    }
}

impl PropertyStorage {
    /// `None` when the storage list ends here.
    fn parse(
        payload: &mut ByteCursor,
        ctx: &mut DecodeContext,
    ) -> Result<Option<Self>, OutOfBounds> {
        let storage_at = payload.absolute_position();
        let size = payload.read_u32()?;
        if size == 0 {
            return Ok(None);
        }
        if size < STORAGE_HEADER_SIZE {
            ctx.mismatch(
                "PropertyStorage.StorageSize",
                storage_at,
                format!("at least {STORAGE_HEADER_SIZE}"),
                size,
            );
            return Ok(None);
        }

        let version = payload.read_u32()?;
        if version != PROPERTY_STORAGE_VERSION {
            ctx.mismatch(
                "PropertyStorage.Version",
                storage_at + 4,
                format!("{PROPERTY_STORAGE_VERSION:#010x}"),
                format!("{version:#010x}"),
            );
            return Ok(None);
        }

        let format_id = payload.read_guid()?;
        if format_id == FMTID_STRING_NAMED {
            ctx.report(Diagnostic::UnsupportedLayout {
                structure: "PropertyStorage",
                offset: storage_at,
                reason: format!("string-named properties ({format_id})"),
            });
            return Ok(None);
        }

        debug!("[lnk] property storage {format_id} at {storage_at:#x}");
        let mut storage = payload.sub_cursor((size - STORAGE_HEADER_SIZE) as usize)?;
        let values = parse_values(&mut storage, &format_id, ctx)?;
        Ok(Some(Self {
            size,
            format_id,
            values,
        }))
    }
}

/// Values up to a zero ValueSize. A value that overruns its ValueSize ends
/// the list; the values before it are kept.
fn parse_values(
    storage: &mut ByteCursor,
    format_id: &Guid,
    ctx: &mut DecodeContext,
) -> Result<Vec<PropertyValue>, OutOfBounds> {
    let mut values = Vec::new();

    while storage.remaining() >= 4 {
        let value_at = storage.absolute_position();
        match PropertyValue::parse(storage, format_id, ctx) {
            Ok(Some(value)) => values.push(value),
            Ok(None) => break,
            Err(err) => {
                ctx.contain_overrun("PropertyValue", value_at, err)?;
                break;
            }
        }
    }

    Ok(values)
}

impl PropertyValue {
    fn parse(
        storage: &mut ByteCursor,
        format_id: &Guid,
        ctx: &mut DecodeContext,
    ) -> Result<Option<Self>, OutOfBounds> {
        let value_at = storage.absolute_position();
        let value_size = storage.read_u32()?;
        if value_size == 0 {
            return Ok(None);
        }
        if value_size < VALUE_HEADER_SIZE {
            ctx.mismatch(
                "PropertyValue.ValueSize",
                value_at,
                format!("at least {VALUE_HEADER_SIZE}"),
                value_size,
            );
            return Ok(None);
        }

        let id = storage.read_u32()?;
        let _reserved = storage.read_u8()?;
        let mut value = storage.sub_cursor((value_size - VALUE_HEADER_SIZE) as usize)?;

        Ok(Some(Self {
            id,
            name: property_name(format_id, id),
            value: TypedValue::parse(&mut value, ctx)?,
        }))
    }
}

impl TypedValue {
    fn parse(value: &mut ByteCursor, ctx: &DecodeContext) -> Result<Self, OutOfBounds> {
        let property_type = value.read_u16()?;
        let _padding = value.read_u16()?;

        Ok(match property_type {
            0x0000 => TypedValue::Empty,
            0x0001 => TypedValue::Null,
            0x0002 => TypedValue::I2(value.read_i16()?),
            0x0003 => TypedValue::I4(value.read_i32()?),
            0x0004 => TypedValue::R4(value.read_f32()?),
            0x0005 => TypedValue::R8(value.read_f64()?),
            0x0006 => TypedValue::Currency(value.read_i64()?),
            0x0007 => TypedValue::Date(value.read_f64()?),
            0x0008 => {
                // property stores are written in the unicode code page
                let size = value.read_u32()? as usize;
                TypedValue::Bstr(decode_utf16le_padded(value.read_bytes(size)?))
            }
            0x000A => TypedValue::Error(value.read_u32()?),
            0x000B => TypedValue::Bool(value.read_u16()? != 0),
            0x0010 => TypedValue::I1(value.read_i8()?),
            0x0011 => TypedValue::UI1(value.read_u8()?),
            0x0012 => TypedValue::UI2(value.read_u16()?),
            0x0013 => TypedValue::UI4(value.read_u32()?),
            0x0014 => TypedValue::I8(value.read_i64()?),
            0x0015 => TypedValue::UI8(value.read_u64()?),
            0x0016 => TypedValue::Int(value.read_i32()?),
            0x0017 => TypedValue::UInt(value.read_u32()?),
            0x001E => {
                let size = value.read_u32()? as usize;
                let raw = value.read_bytes(size)?;
                TypedValue::Lpstr(decode_narrow_padded(raw, ctx.config.narrow_encoding))
            }
            0x001F => {
                // Length counts characters, terminator included
                let length = value.read_u32()? as usize;
                let raw = value.read_bytes(length.saturating_mul(2))?;
                TypedValue::Lpwstr(decode_utf16le_padded(raw))
            }
            0x0040 => TypedValue::FileTime(filetime_to_datetime(value.read_u64()?)),
            0x0041 => {
                let size = value.read_u32()? as usize;
                TypedValue::Blob(value.read_bytes(size)?.to_vec())
            }
            0x0048 => TypedValue::Clsid(value.read_guid()?),
            _ => TypedValue::Unparsed {
                property_type,
                data: value.read_bytes(value.remaining())?.to_vec(),
            },
        })
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::Bstr(text) | TypedValue::Lpstr(text) | TypedValue::Lpwstr(text) => {
                Some(text)
            }
            _ => None,
        }
    }
}
