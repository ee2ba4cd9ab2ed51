use bitflags::bitflags;
use log::debug;
use serde::Serialize;

use crate::lnk::{
    context::DecodeContext,
    cursor::OutOfBounds,
    helpers::serialize_flag_names,
};

/// Offsets at or beyond this header size come with unicode variants.
const LINK_INFO_HEADER_OPTIONAL: u32 = 0x24;
/// A VolumeID label offset of this value points at LabelOffsetUnicode instead.
const VOLUME_LABEL_UNICODE_MARKER: u32 = 0x14;
/// NetNameOffset beyond this value means the unicode offsets are present.
const NETWORK_UNICODE_THRESHOLD: u32 = 0x14;

fn at(start: usize, offset: u32) -> usize {
    start.saturating_add(offset as usize)
}

/// LinkInfo (MS-SHLLINK 2.3).
#[derive(Debug, Clone, Serialize)]
pub struct LinkInfo {
    pub size: u32,
    pub header_size: u32,
    #[serde(serialize_with = "serialize_flag_names")]
    pub flags: LinkInfoFlags,
    pub volume_id_offset: u32,
    pub local_base_path_offset: u32,
    pub common_network_relative_link_offset: u32,
    pub common_path_suffix_offset: u32,
    pub local_base_path_offset_unicode: Option<u32>,
    pub common_path_suffix_offset_unicode: Option<u32>,
    pub target: Option<LinkTarget>,
    pub local_base_path: Option<String>,
    pub common_path_suffix: String,
    pub local_base_path_unicode: Option<String>,
    pub common_path_suffix_unicode: Option<String>,
}

/// Where the link target lives. The on-disk form wins when both flag bits
/// are set.
#[derive(Debug, Clone, Serialize)]
pub enum LinkTarget {
    Volume(VolumeId),
    Network(NetworkShareInfo),
}

impl LinkInfo {
    pub(crate) fn parse(ctx: &mut DecodeContext) -> Result<Self, OutOfBounds> {
        // Every offset below is relative to this position.
        let start = ctx.cursor.position();

        let size = ctx.cursor.read_u32()?;
        let header_size = ctx.cursor.read_u32()?;
        let flags = LinkInfoFlags::from_bits_truncate(ctx.cursor.read_u32()?);
        let volume_id_offset = ctx.cursor.read_u32()?;
        let local_base_path_offset = ctx.cursor.read_u32()?;
        let common_network_relative_link_offset = ctx.cursor.read_u32()?;
        let common_path_suffix_offset = ctx.cursor.read_u32()?;

        let (local_base_path_offset_unicode, common_path_suffix_offset_unicode) =
            if header_size >= LINK_INFO_HEADER_OPTIONAL {
                (Some(ctx.cursor.read_u32()?), Some(ctx.cursor.read_u32()?))
            } else {
                (None, None)
            };
        let fixed_end = ctx.cursor.position();
        debug!("[lnk] link info at {start:#x}, {size} bytes, flags {flags:?}");

        let mut local_base_path = None;
        let target = if flags.contains(LinkInfoFlags::VOLUME_ID_AND_LOCAL_BASE_PATH) {
            let volume = ctx.jump(at(start, volume_id_offset), VolumeId::parse)?;
            let path = ctx
                .cursor
                .jump(at(start, local_base_path_offset), |cursor| {
                    cursor.read_null_terminated()
                })?;
            local_base_path = Some(ctx.narrow(path));
            Some(LinkTarget::Volume(volume))
        } else if flags.contains(LinkInfoFlags::COMMON_NETWORK_RELATIVE_LINK_AND_PATH_SUFFIX) {
            let network = ctx.jump(
                at(start, common_network_relative_link_offset),
                NetworkShareInfo::parse,
            )?;
            Some(LinkTarget::Network(network))
        } else {
            None
        };

        let suffix = ctx
            .cursor
            .jump(at(start, common_path_suffix_offset), |cursor| {
                cursor.read_null_terminated()
            })?;
        let common_path_suffix = ctx.narrow(suffix);

        let local_base_path_unicode = match local_base_path_offset_unicode {
            Some(offset) if flags.contains(LinkInfoFlags::VOLUME_ID_AND_LOCAL_BASE_PATH) => {
                let units = ctx.cursor.jump(at(start, offset), |cursor| {
                    cursor.read_null_terminated_utf16()
                })?;
                Some(String::from_utf16_lossy(&units))
            }
            _ => None,
        };

        let common_path_suffix_unicode = match common_path_suffix_offset_unicode {
            Some(offset) => {
                let units = ctx.cursor.jump(at(start, offset), |cursor| {
                    cursor.read_null_terminated_utf16()
                })?;
                Some(String::from_utf16_lossy(&units))
            }
            None => None,
        };

        let declared_end = at(start, size);
        if declared_end < fixed_end {
            ctx.mismatch(
                "LinkInfo.LinkInfoSize",
                start,
                format!("at least {}", fixed_end - start),
                size,
            );
        }
        ctx.cursor.seek(declared_end.max(fixed_end))?;

        Ok(Self {
            size,
            header_size,
            flags,
            volume_id_offset,
            local_base_path_offset,
            common_network_relative_link_offset,
            common_path_suffix_offset,
            local_base_path_offset_unicode,
            common_path_suffix_offset_unicode,
            target,
            local_base_path,
            common_path_suffix,
            local_base_path_unicode,
            common_path_suffix_unicode,
        })
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LinkInfoFlags: u32 {
        /// VolumeID and LocalBasePath are present.
        const VOLUME_ID_AND_LOCAL_BASE_PATH                = 0b0000_0000_0000_0000_0000_0000_0000_0001;
        /// CommonNetworkRelativeLink is present.
        const COMMON_NETWORK_RELATIVE_LINK_AND_PATH_SUFFIX = 0b0000_0000_0000_0000_0000_0000_0000_0010;
    }
}

/// VolumeID (MS-SHLLINK 2.3.1).
#[derive(Debug, Clone, Serialize)]
pub struct VolumeId {
    pub size: u32,
    pub drive_type: DriveType,
    pub drive_serial_number: u32,
    pub volume_label_offset: u32,
    pub volume_label_offset_unicode: Option<u32>,
    pub volume_label: String,
}

impl VolumeId {
    fn parse(ctx: &mut DecodeContext) -> Result<Self, OutOfBounds> {
        // Label offsets are relative to the VolumeID, not to the LinkInfo.
        let start = ctx.cursor.position();

        let size = ctx.cursor.read_u32()?;
        let drive_type = DriveType::from_u32(ctx.cursor.read_u32()?);
        let drive_serial_number = ctx.cursor.read_u32()?;
        let volume_label_offset = ctx.cursor.read_u32()?;

        let (volume_label_offset_unicode, volume_label) =
            if volume_label_offset == VOLUME_LABEL_UNICODE_MARKER {
                let offset = ctx.cursor.read_u32()?;
                let units = ctx.cursor.jump(at(start, offset), |cursor| {
                    cursor.read_null_terminated_utf16()
                })?;
                (Some(offset), String::from_utf16_lossy(&units))
            } else {
                let label = ctx.cursor.jump(at(start, volume_label_offset), |cursor| {
                    cursor.read_null_terminated()
                })?;
                (None, ctx.narrow(label))
            };

        Ok(Self {
            size,
            drive_type,
            drive_serial_number,
            volume_label_offset,
            volume_label_offset_unicode,
            volume_label,
        })
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NetworkShareFlags: u32 {
        /// DeviceNameOffset is valid.
        const VALID_DEVICE   = 0b0000_0000_0000_0000_0000_0000_0000_0001;
        /// NetworkProviderType is valid.
        const VALID_NET_TYPE = 0b0000_0000_0000_0000_0000_0000_0000_0010;
    }
}

/// CommonNetworkRelativeLink (MS-SHLLINK 2.3.2).
#[derive(Debug, Clone, Serialize)]
pub struct NetworkShareInfo {
    pub size: u32,
    #[serde(serialize_with = "serialize_flag_names")]
    pub flags: NetworkShareFlags,
    pub net_name_offset: u32,
    pub device_name_offset: u32,
    pub provider_type: Option<NetworkProviderType>,
    pub net_name_offset_unicode: Option<u32>,
    pub device_name_offset_unicode: Option<u32>,
    pub net_name: String,
    pub device_name: Option<String>,
    pub net_name_unicode: Option<String>,
    pub device_name_unicode: Option<String>,
}

impl NetworkShareInfo {
    fn parse(ctx: &mut DecodeContext) -> Result<Self, OutOfBounds> {
        let start = ctx.cursor.position();

        let size = ctx.cursor.read_u32()?;
        let flags = NetworkShareFlags::from_bits_truncate(ctx.cursor.read_u32()?);
        let net_name_offset = ctx.cursor.read_u32()?;
        let device_name_offset = ctx.cursor.read_u32()?;

        let provider_type = if flags.contains(NetworkShareFlags::VALID_NET_TYPE) {
            Some(NetworkProviderType::from_u32(ctx.cursor.read_u32()?))
        } else {
            ctx.cursor.skip(4)?;
            None
        };

        let (net_name_offset_unicode, device_name_offset_unicode) =
            if net_name_offset > NETWORK_UNICODE_THRESHOLD {
                (Some(ctx.cursor.read_u32()?), Some(ctx.cursor.read_u32()?))
            } else {
                (None, None)
            };

        let name = ctx.cursor.jump(at(start, net_name_offset), |cursor| {
            cursor.read_null_terminated()
        })?;
        let net_name = ctx.narrow(name);

        let device_name = if flags.contains(NetworkShareFlags::VALID_DEVICE) {
            let name = ctx.cursor.jump(at(start, device_name_offset), |cursor| {
                cursor.read_null_terminated()
            })?;
            Some(ctx.narrow(name))
        } else {
            None
        };

        let net_name_unicode = match net_name_offset_unicode {
            Some(offset) => {
                let units = ctx.cursor.jump(at(start, offset), |cursor| {
                    cursor.read_null_terminated_utf16()
                })?;
                Some(String::from_utf16_lossy(&units))
            }
            None => None,
        };

        let device_name_unicode = match device_name_offset_unicode {
            Some(offset) if flags.contains(NetworkShareFlags::VALID_DEVICE) => {
                let units = ctx.cursor.jump(at(start, offset), |cursor| {
                    cursor.read_null_terminated_utf16()
                })?;
                Some(String::from_utf16_lossy(&units))
            }
            _ => None,
        };

        Ok(Self {
            size,
            flags,
            net_name_offset,
            device_name_offset,
            provider_type,
            net_name_offset_unicode,
            device_name_offset_unicode,
            net_name,
            device_name,
            net_name_unicode,
            device_name_unicode,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DriveType {
    Unknown,
    NoRootDir,
    Removable,
    Fixed,
    Remote,
    CdRom,
    RamDisk,
    Other(u32),
}

impl DriveType {
    pub fn from_u32(value: u32) -> Self {
        match value {
            0 => DriveType::Unknown,
            1 => DriveType::NoRootDir,
            2 => DriveType::Removable,
            3 => DriveType::Fixed,
            4 => DriveType::Remote,
            5 => DriveType::CdRom,
            6 => DriveType::RamDisk,
            other => DriveType::Other(other),
        }
    }
}

/// WNNC_NET_* network provider types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NetworkProviderType {
    Avid,
    Docuspace,
    Mangosoft,
    Sernet,
    Riverfront1,
    Riverfront2,
    Decorb,
    Protstor,
    FjRedir,
    Distinct,
    Twins,
    Rdr2Sample,
    Csc,
    ThreeInOne,
    ExtendNet,
    Stac,
    Foxbat,
    Yahoo,
    Exifs,
    Dav,
    Knoware,
    ObjectDire,
    Masfax,
    HobNfs,
    Shiva,
    Ibmal,
    Lock,
    Termsrv,
    Srt,
    Quincy,
    OpenAfs,
    Avid1,
    Dfs,
    Kwnp,
    Zenworks,
    DriveOnWeb,
    Vmware,
    Rsfx,
    Mfiles,
    MsNfs,
    Google,
    Other(u32),
}

impl NetworkProviderType {
    pub fn from_u32(value: u32) -> Self {
        match value {
            0x001A_0000 => Self::Avid,
            0x001B_0000 => Self::Docuspace,
            0x001C_0000 => Self::Mangosoft,
            0x001D_0000 => Self::Sernet,
            0x001E_0000 => Self::Riverfront1,
            0x001F_0000 => Self::Riverfront2,
            0x0020_0000 => Self::Decorb,
            0x0021_0000 => Self::Protstor,
            0x0022_0000 => Self::FjRedir,
            0x0023_0000 => Self::Distinct,
            0x0024_0000 => Self::Twins,
            0x0025_0000 => Self::Rdr2Sample,
            0x0026_0000 => Self::Csc,
            0x0027_0000 => Self::ThreeInOne,
            0x0029_0000 => Self::ExtendNet,
            0x002A_0000 => Self::Stac,
            0x002B_0000 => Self::Foxbat,
            0x002C_0000 => Self::Yahoo,
            0x002D_0000 => Self::Exifs,
            0x002E_0000 => Self::Dav,
            0x002F_0000 => Self::Knoware,
            0x0030_0000 => Self::ObjectDire,
            0x0031_0000 => Self::Masfax,
            0x0032_0000 => Self::HobNfs,
            0x0033_0000 => Self::Shiva,
            0x0034_0000 => Self::Ibmal,
            0x0035_0000 => Self::Lock,
            0x0036_0000 => Self::Termsrv,
            0x0037_0000 => Self::Srt,
            0x0038_0000 => Self::Quincy,
            0x0039_0000 => Self::OpenAfs,
            0x003A_0000 => Self::Avid1,
            0x003B_0000 => Self::Dfs,
            0x003C_0000 => Self::Kwnp,
            0x003D_0000 => Self::Zenworks,
            0x003E_0000 => Self::DriveOnWeb,
            0x003F_0000 => Self::Vmware,
            0x0040_0000 => Self::Rsfx,
            0x0041_0000 => Self::Mfiles,
            0x0042_0000 => Self::MsNfs,
            0x0043_0000 => Self::Google,
            other => Self::Other(other),
        }
    }
}
