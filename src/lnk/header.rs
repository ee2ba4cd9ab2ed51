use bitflags::bitflags;
use chrono::NaiveDateTime;
use log::debug;
use serde::Serialize;

use crate::lnk::{
    context::DecodeContext,
    cursor::OutOfBounds,
    helpers::{Guid, filetime_to_datetime, serialize_flag_names},
};

pub const HEADER_SIZE: usize = 0x4C;
const SIGNATURE: &[u8] = b"L\x00\x00\x00";
const GUID: &[u8] = b"\x01\x14\x02\x00\x00\x00\x00\x00\xc0\x00\x00\x00\x00\x00\x00F";

/// ShellLinkHeader (MS-SHLLINK 2.1).
#[derive(Debug, Clone, Serialize)]
pub struct ShellLinkHeader {
    pub header_size: u32,
    pub class_id: Guid,
    #[serde(serialize_with = "serialize_flag_names")]
    pub link_flags: LinkFlags,
    #[serde(serialize_with = "serialize_flag_names")]
    pub file_attributes: FileAttributeFlags,
    pub creation_time: Option<NaiveDateTime>,
    pub access_time: Option<NaiveDateTime>,
    pub write_time: Option<NaiveDateTime>,
    pub file_size: u32,
    pub icon_index: i32,
    pub show_command: ShowCommand,
    pub show_command_raw: u32,
    pub hotkey: Option<HotKey>,
}

impl ShellLinkHeader {
    pub(crate) fn parse(ctx: &mut DecodeContext) -> Result<Self, OutOfBounds> {
        let start = ctx.cursor.absolute_position();

        let signature = ctx.cursor.read_array::<4>()?;
        if signature != *SIGNATURE {
            ctx.mismatch("ShellLinkHeader.HeaderSize", start, "4C 00 00 00", hex(&signature));
        }
        let header_size = u32::from_le_bytes(signature);

        let clsid = ctx.cursor.read_array::<16>()?;
        if clsid != *GUID {
            ctx.mismatch(
                "ShellLinkHeader.LinkCLSID",
                start + 4,
                Guid::from_bytes(shell_link_clsid()),
                Guid::from_bytes(clsid),
            );
        }
        let class_id = Guid::from_bytes(clsid);

        let link_flags = LinkFlags::from_bits_truncate(ctx.cursor.read_u32()?);
        let file_attributes = FileAttributeFlags::from_bits_truncate(ctx.cursor.read_u32()?);
        debug!("[lnk] link flags: {link_flags:?}");

        let creation_time = filetime_to_datetime(ctx.cursor.read_u64()?);
        let access_time = filetime_to_datetime(ctx.cursor.read_u64()?);
        let write_time = filetime_to_datetime(ctx.cursor.read_u64()?);
        let file_size = ctx.cursor.read_u32()?;
        let icon_index = ctx.cursor.read_i32()?;

        let show_command_raw = ctx.cursor.read_u32()?;
        let show_command = ShowCommand::from_u32(show_command_raw);

        let key = ctx.cursor.read_u8()?;
        let modifiers = ctx.cursor.read_u8()?;
        let hotkey = HotKey::new(key, modifiers);

        // Reserved1 (u16), Reserved2 (u32), Reserved3 (u32)
        ctx.cursor.skip(10)?;

        Ok(Self {
            header_size,
            class_id,
            link_flags,
            file_attributes,
            creation_time,
            access_time,
            write_time,
            file_size,
            icon_index,
            show_command,
            show_command_raw,
            hotkey,
        })
    }
}

fn shell_link_clsid() -> [u8; 16] {
    let mut clsid = [0u8; 16];
    clsid.copy_from_slice(GUID);
    clsid
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| format!("{byte:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Window state of the launched application. Values other than the three
/// defined ones mean `Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ShowCommand {
    /// SW_SHOWNORMAL
    Normal = 1,
    /// SW_SHOWMAXIMIZED
    Maximized = 3,
    /// SW_SHOWMINNOACTIVE
    MinimizedNoActive = 7,
}

impl ShowCommand {
    pub fn from_u32(value: u32) -> Self {
        match value {
            3 => ShowCommand::Maximized,
            7 => ShowCommand::MinimizedNoActive,
            _ => ShowCommand::Normal,
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HotKeyModifiers: u8 {
        const SHIFT   = 0x01;
        const CONTROL = 0x02;
        const ALT     = 0x04;
    }
}

/// HotKeyFlags: a virtual key and its modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HotKey {
    pub key: u8,
    #[serde(serialize_with = "serialize_flag_names")]
    pub modifiers: HotKeyModifiers,
    /// Modifier names followed by the key name, e.g. `Ctrl+Alt+F5`. Unmapped
    /// codes contribute nothing.
    pub name: String,
}

impl HotKey {
    /// `None` when both bytes are zero.
    pub fn new(key: u8, modifiers: u8) -> Option<Self> {
        if key == 0 && modifiers == 0 {
            return None;
        }
        let modifiers = HotKeyModifiers::from_bits_truncate(modifiers);

        let mut name = String::new();
        for (flag, label) in [
            (HotKeyModifiers::SHIFT, "Shift+"),
            (HotKeyModifiers::CONTROL, "Ctrl+"),
            (HotKeyModifiers::ALT, "Alt+"),
        ] {
            if modifiers.contains(flag) {
                name.push_str(label);
            }
        }
        name.push_str(&key_name(key).unwrap_or_default());

        Some(Self {
            key,
            modifiers,
            name,
        })
    }
}

fn key_name(key: u8) -> Option<String> {
    match key {
        0x30..=0x39 | 0x41..=0x5A => Some((key as char).to_string()),
        0x70..=0x87 => Some(format!("F{}", key - 0x6F)),
        0x90 => Some("NUM LOCK".to_string()),
        0x91 => Some("SCROLL LOCK".to_string()),
        _ => None,
    }
}

bitflags! {
    /// The LinkFlags structure defines bits that specify which shell link structures are present in the file
    /// format after the ShellLinkHeader structure (section 2.1).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LinkFlags: u32 {
        /// A LinkTargetIDList structure follows the ShellLinkHeader.
        const HAS_LINK_TARGET_ID_LIST           = 0b0000_0000_0000_0000_0000_0000_0000_0001;

        /// A LinkInfo structure is present.
        const HAS_LINK_INFO                     = 0b0000_0000_0000_0000_0000_0000_0000_0010;

        /// A NAME_STRING StringData structure is present.
        const HAS_NAME                          = 0b0000_0000_0000_0000_0000_0000_0000_0100;

        /// A RELATIVE_PATH StringData structure is present.
        const HAS_RELATIVE_PATH                 = 0b0000_0000_0000_0000_0000_0000_0000_1000;

        /// A WORKING_DIR StringData structure is present.
        const HAS_WORKING_DIR                   = 0b0000_0000_0000_0000_0000_0000_0001_0000;

        /// A COMMAND_LINE_ARGUMENTS StringData structure is present.
        const HAS_ARGUMENTS                     = 0b0000_0000_0000_0000_0000_0000_0010_0000;

        /// An ICON_LOCATION StringData structure is present.
        const HAS_ICON_LOCATION                 = 0b0000_0000_0000_0000_0000_0000_0100_0000;

        /// The StringData section contains Unicode-encoded strings; otherwise, it
        /// contains strings that are encoded using the system default code page.
        const IS_UNICODE                        = 0b0000_0000_0000_0000_0000_0000_1000_0000;

        /// The LinkInfo structure is ignored.
        const FORCE_NO_LINK_INFO                = 0b0000_0000_0000_0000_0000_0001_0000_0000;

        /// The shell link is saved with an EnvironmentVariableDataBlock.
        const HAS_EXP_STRING                    = 0b0000_0000_0000_0000_0000_0010_0000_0000;

        /// The target is run in a separate virtual machine when launching a link
        /// target that is a 16-bit application.
        const RUN_IN_SEPARATE_PROCESS           = 0b0000_0000_0000_0000_0000_0100_0000_0000;

        /// A bit that is undefined and MUST be ignored.
        const UNUSED_1                          = 0b0000_0000_0000_0000_0000_1000_0000_0000;

        /// The shell link is saved with a DarwinDataBlock.
        const HAS_DARWIN_ID                     = 0b0000_0000_0000_0000_0001_0000_0000_0000;

        /// The application is run as a different user.
        const RUN_AS_USER                       = 0b0000_0000_0000_0000_0010_0000_0000_0000;

        /// The shell link is saved with an IconEnvironmentDataBlock.
        const HAS_EXP_ICON                      = 0b0000_0000_0000_0000_0100_0000_0000_0000;

        /// The file system location is represented in the shell namespace when the
        /// path to an item is parsed into an IDList.
        const NO_PID_I_ALIAS                    = 0b0000_0000_0000_0000_1000_0000_0000_0000;

        /// A bit that is undefined and MUST be ignored.
        const UNUSED_2                          = 0b0000_0000_0000_0001_0000_0000_0000_0000;

        /// The shell link is saved with a ShimDataBlock.
        const RUN_WITH_SHIM_LAYER               = 0b0000_0000_0000_0010_0000_0000_0000_0000;

        /// The TrackerDataBlock is ignored.
        const FORCE_NO_LINK_TRACK               = 0b0000_0000_0000_0100_0000_0000_0000_0000;

        /// Target properties are collected into the PropertyStoreDataBlock.
        const ENABLE_TARGET_METADATA            = 0b0000_0000_0000_1000_0000_0000_0000_0000;

        /// The EnvironmentVariableDataBlock is ignored.
        const DISABLE_LINK_PATH_TRACKING        = 0b0000_0000_0001_0000_0000_0000_0000_0000;

        /// The SpecialFolderDataBlock and the KnownFolderDataBlock are ignored.
        const DISABLE_KNOWN_FOLDER_TRACKING     = 0b0000_0000_0010_0000_0000_0000_0000_0000;

        /// The unaliased form of the known folder IDList is used.
        const DISABLE_KNOWN_FOLDER_ALIAS        = 0b0000_0000_0100_0000_0000_0000_0000_0000;

        /// A link may reference another link.
        const ALLOW_LINK_TO_LINK                = 0b0000_0000_1000_0000_0000_0000_0000_0000;

        /// The unaliased known folder or target IDList is used when saving.
        const UNALIAS_ON_SAVE                   = 0b0000_0001_0000_0000_0000_0000_0000_0000;

        /// The path in the EnvironmentVariableDataBlock refers to the target.
        const PREFER_ENVIRONMENT_PATH           = 0b0000_0010_0000_0000_0000_0000_0000_0000;

        /// The local path IDList is kept in the PropertyStoreDataBlock for UNC targets
        /// on the local machine.
        const KEEP_LOCAL_ID_LIST_FOR_UNC_TARGET = 0b0000_0100_0000_0000_0000_0000_0000_0000;
    }
}

bitflags! {
    /// The FileAttributesFlags structure defines bits that specify the file attributes of the link target, if the
    /// target is a file system item. It is possible for the target items attributes to be out of sync with this
    /// value.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FileAttributeFlags: u32 {
        const FILE_ATTRIBUTE_READONLY               = 0b0000_0000_0000_0000_0000_0000_0000_0001;
        const FILE_ATTRIBUTE_HIDDEN                 = 0b0000_0000_0000_0000_0000_0000_0000_0010;
        const FILE_ATTRIBUTE_SYSTEM                 = 0b0000_0000_0000_0000_0000_0000_0000_0100;
        /// A bit that MUST be zero.
        const RESERVED_1                            = 0b0000_0000_0000_0000_0000_0000_0000_1000;
        const FILE_ATTRIBUTE_DIRECTORY              = 0b0000_0000_0000_0000_0000_0000_0001_0000;
        const FILE_ATTRIBUTE_ARCHIVE                = 0b0000_0000_0000_0000_0000_0000_0010_0000;
        /// A bit that MUST be zero.
        const RESERVED_2                            = 0b0000_0000_0000_0000_0000_0000_0100_0000;
        /// If this bit is 1, all other bits in this structure MUST be clear.
        const FILE_ATTRIBUTE_NORMAL                 = 0b0000_0000_0000_0000_0000_0000_1000_0000;
        const FILE_ATTRIBUTE_TEMPORARY              = 0b0000_0000_0000_0000_0000_0001_0000_0000;
        const FILE_ATTRIBUTE_SPARSE_FILE            = 0b0000_0000_0000_0000_0000_0010_0000_0000;
        const FILE_ATTRIBUTE_REPARSE_POINT          = 0b0000_0000_0000_0000_0000_0100_0000_0000;
        const FILE_ATTRIBUTE_COMPRESSED             = 0b0000_0000_0000_0000_0000_1000_0000_0000;
        const FILE_ATTRIBUTE_OFFLINE                = 0b0000_0000_0000_0000_0001_0000_0000_0000;
        const FILE_ATTRIBUTE_NOT_CONTENT_INDEXED    = 0b0000_0000_0000_0000_0010_0000_0000_0000;
        const FILE_ATTRIBUTE_ENCRYPTED              = 0b0000_0000_0000_0000_0100_0000_0000_0000;
    }
}
