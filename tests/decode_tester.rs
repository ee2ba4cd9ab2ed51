use std::io::Cursor;

use lnk_parser::{
    BlockSignature, DecodeConfig, Diagnostic, ExtraDataBlock, Guid, Lnk, LnkParseError,
    NarrowCount,
    lnk::{
        block_data::property_store::TypedValue,
        header::{LinkFlags, ShowCommand},
        link_info::{DriveType, LinkTarget},
    },
};

const HAS_LINK_TARGET_ID_LIST: u32 = 0x01;
const HAS_LINK_INFO: u32 = 0x02;
const HAS_NAME: u32 = 0x04;
const HAS_RELATIVE_PATH: u32 = 0x08;
const HAS_WORKING_DIR: u32 = 0x10;
const HAS_ARGUMENTS: u32 = 0x20;
const IS_UNICODE: u32 = 0x80;

const SHELL_LINK_CLSID: [u8; 16] = [
    0x01, 0x14, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x46,
];

/// Assembles a link file section by section.
struct LinkBuilder {
    data: Vec<u8>,
}

impl LinkBuilder {
    fn new(link_flags: u32) -> Self {
        let mut data = Vec::new();
        data.extend_from_slice(&0x4Cu32.to_le_bytes());
        data.extend_from_slice(&SHELL_LINK_CLSID);
        data.extend_from_slice(&link_flags.to_le_bytes());
        data.extend_from_slice(&0x20u32.to_le_bytes());
        data.extend_from_slice(&132_601_607_665_000_000u64.to_le_bytes());
        data.extend_from_slice(&132_601_607_665_000_000u64.to_le_bytes());
        data.extend_from_slice(&132_601_607_665_000_000u64.to_le_bytes());
        data.extend_from_slice(&0x0001_C000u32.to_le_bytes());
        data.extend_from_slice(&0i32.to_le_bytes());
        data.extend_from_slice(&7u32.to_le_bytes());
        data.extend_from_slice(&[0x43, 0x03]);
        data.extend_from_slice(&[0u8; 10]);
        Self { data }
    }

    fn id_list(mut self, items: &[&[u8]]) -> Self {
        let mut list = Vec::new();
        for item in items {
            list.extend_from_slice(&((item.len() + 2) as u16).to_le_bytes());
            list.extend_from_slice(item);
        }
        list.extend_from_slice(&[0, 0]);
        self.data.extend_from_slice(&(list.len() as u16).to_le_bytes());
        self.data.extend(list);
        self
    }

    /// LinkInfo with a fixed-drive VolumeID and a narrow local base path.
    fn local_link_info(mut self, label: &str, path: &str) -> Self {
        let header_size = 0x1Cu32;
        let mut volume = Vec::new();
        volume.extend_from_slice(&0u32.to_le_bytes());
        volume.extend_from_slice(&3u32.to_le_bytes());
        volume.extend_from_slice(&0x5A5A_0001u32.to_le_bytes());
        volume.extend_from_slice(&0x10u32.to_le_bytes());
        volume.extend_from_slice(label.as_bytes());
        volume.push(0);
        let volume_size = volume.len() as u32;
        volume[..4].copy_from_slice(&volume_size.to_le_bytes());

        let path_offset = header_size + volume_size;
        let suffix_offset = path_offset + path.len() as u32 + 1;
        let size = suffix_offset + 1;

        for value in [size, header_size, 0x1, header_size, path_offset, 0, suffix_offset] {
            self.data.extend_from_slice(&value.to_le_bytes());
        }
        self.data.extend(volume);
        self.data.extend_from_slice(path.as_bytes());
        self.data.push(0);
        self.data.push(0);
        self
    }

    fn wide_string(mut self, text: &str) -> Self {
        let units: Vec<u16> = text.encode_utf16().collect();
        self.data.extend_from_slice(&(units.len() as u16).to_le_bytes());
        self.data.extend(units.iter().flat_map(|unit| unit.to_le_bytes()));
        self
    }

    fn narrow_string(mut self, text: &str) -> Self {
        self.data.extend_from_slice(&(text.len() as u32).to_le_bytes());
        self.data.extend_from_slice(text.as_bytes());
        self
    }

    fn block(mut self, signature: u32, payload: &[u8]) -> Self {
        self.data.extend_from_slice(&((payload.len() + 8) as u32).to_le_bytes());
        self.data.extend_from_slice(&signature.to_le_bytes());
        self.data.extend_from_slice(payload);
        self
    }

    fn raw(mut self, bytes: &[u8]) -> Self {
        self.data.extend_from_slice(bytes);
        self
    }

    fn terminal(self) -> Vec<u8> {
        self.raw(&[0, 0, 0, 0]).data
    }
}

fn tracker_payload() -> Vec<u8> {
    let mut data = 0x58u32.to_le_bytes().to_vec();
    data.extend_from_slice(&0u32.to_le_bytes());
    let mut machine = b"workstation".to_vec();
    machine.resize(16, 0);
    data.extend(machine);
    for seed in [0x10u8, 0x20, 0x30, 0x40] {
        data.extend_from_slice(&[seed; 16]);
    }
    data
}

fn app_user_model_store(app_id: &str) -> Vec<u8> {
    let format_id: Guid = "9F4C2855-9F79-4B39-A8D0-E1D42DE1D5F3".parse().unwrap();
    let mut units: Vec<u16> = app_id.encode_utf16().collect();
    units.push(0);
    let mut typed = vec![0x1F, 0x00, 0x00, 0x00];
    typed.extend_from_slice(&(units.len() as u32).to_le_bytes());
    typed.extend(units.iter().flat_map(|unit| unit.to_le_bytes()));
    while typed.len() % 4 != 0 {
        typed.push(0);
    }

    let mut value = ((typed.len() + 9) as u32).to_le_bytes().to_vec();
    value.extend_from_slice(&5u32.to_le_bytes());
    value.push(0);
    value.extend(typed);

    let mut storage = ((24 + value.len() + 4) as u32).to_le_bytes().to_vec();
    storage.extend_from_slice(&0x5350_5331u32.to_le_bytes());
    storage.extend_from_slice(&format_id.to_bytes());
    storage.extend(value);
    storage.extend_from_slice(&[0, 0, 0, 0]);
    storage.extend_from_slice(&[0, 0, 0, 0]);
    storage
}

#[test]
fn test_minimal_link() {
    let data = LinkBuilder::new(0).terminal();
    let lnk = Lnk::parse(&data).unwrap();

    assert!(lnk.diagnostics.is_empty());
    assert!(lnk.id_list.is_none());
    assert!(lnk.link_info.is_none());
    assert!(lnk.string_data.is_empty());
    assert!(lnk.extra_data.is_empty());
    assert_eq!(lnk.end_offset, 80);
    assert_eq!(lnk.header.show_command, ShowCommand::MinimizedNoActive);
    assert_eq!(lnk.header.hotkey.as_ref().map(|key| key.name.as_str()), Some("Shift+Ctrl+C"));
    assert_eq!(lnk.header.file_size, 0x0001_C000);
}

#[test]
fn test_complete_link() {
    let flags = HAS_LINK_TARGET_ID_LIST
        | HAS_LINK_INFO
        | HAS_NAME
        | HAS_WORKING_DIR
        | HAS_ARGUMENTS
        | IS_UNICODE;
    let data = LinkBuilder::new(flags)
        .id_list(&[&[0x1F, 0x50, 0xE0, 0x4F], &[0x2F, 0x43, 0x3A, 0x5C]])
        .local_link_info("System", "C:\\Tools\\edit.exe")
        .wide_string("Text editor")
        .wide_string("C:\\Tools")
        .wide_string("--new-window")
        .block(0xA0000003, &tracker_payload())
        .block(0xA0000009, &app_user_model_store("Tools.Editor"))
        .terminal();

    let lnk = Lnk::parse(&data).unwrap();
    assert!(lnk.diagnostics.is_empty(), "{:?}", lnk.diagnostics);
    assert_eq!(lnk.end_offset, data.len());

    let id_list = lnk.id_list.as_ref().unwrap();
    assert_eq!(id_list.items.len(), 2);
    assert_eq!(id_list.items[1].data, vec![0x2F, 0x43, 0x3A, 0x5C]);

    let link_info = lnk.link_info.as_ref().unwrap();
    assert_eq!(link_info.local_base_path.as_deref(), Some("C:\\Tools\\edit.exe"));
    let Some(LinkTarget::Volume(volume)) = &link_info.target else {
        panic!("expected a volume target");
    };
    assert_eq!(volume.drive_type, DriveType::Fixed);
    assert_eq!(volume.volume_label, "System");

    assert_eq!(lnk.string_data.description.as_deref(), Some("Text editor"));
    assert_eq!(lnk.string_data.relative_path, None);
    assert_eq!(lnk.string_data.working_dir.as_deref(), Some("C:\\Tools"));
    assert_eq!(lnk.string_data.arguments.as_deref(), Some("--new-window"));

    assert_eq!(lnk.extra_data.len(), 2);
    let Some(ExtraDataBlock::Tracker(tracker)) = lnk.find_block(BlockSignature::TrackerDataBlock)
    else {
        panic!("expected a tracker block");
    };
    assert_eq!(tracker.machine_id, "workstation");
    assert_eq!(tracker.droid.1, Guid::from_bytes([0x20; 16]));

    let Some(ExtraDataBlock::PropertyStore(store)) =
        lnk.find_block(BlockSignature::PropertyStoreDataBlock)
    else {
        panic!("expected a property store block");
    };
    assert_eq!(
        store.get("System.AppUserModel.ID").and_then(TypedValue::as_str),
        Some("Tools.Editor")
    );
}

#[test]
fn test_link_flags_follow_bits() {
    let data = LinkBuilder::new(0x0008_0800).terminal();
    let lnk = Lnk::parse(&data).unwrap();
    let flags = lnk.header.link_flags;
    assert!(flags.contains(LinkFlags::ENABLE_TARGET_METADATA));
    assert!(flags.contains(LinkFlags::UNUSED_1));
    assert!(!flags.contains(LinkFlags::HAS_LINK_INFO));
    assert_eq!(flags.iter_names().count(), 2);
}

#[test]
fn test_shell_link_clsid_string() {
    let data = LinkBuilder::new(0).terminal();
    let lnk = Lnk::parse(&data).unwrap();
    assert_eq!(
        lnk.header.class_id.to_string(),
        "00021401-0000-0000-C000-000000000046"
    );

    let guid: Guid = "01140200-0000-0000-C000-000000000046".parse().unwrap();
    assert_eq!(Guid::from_bytes(guid.to_bytes()), guid);
    assert_eq!(guid.to_string(), "01140200-0000-0000-C000-000000000046");
}

#[test]
fn test_empty_id_list() {
    let data = LinkBuilder::new(HAS_LINK_TARGET_ID_LIST)
        .id_list(&[])
        .terminal();
    let lnk = Lnk::parse(&data).unwrap();
    assert_eq!(lnk.id_list.map(|list| list.items.len()), Some(0));
    assert_eq!(lnk.end_offset, 76 + 4 + 4);
}

#[test]
fn test_narrow_and_wide_string_data_agree() {
    let text = "%USERPROFILE%\\Documents";
    let wide = LinkBuilder::new(HAS_RELATIVE_PATH | IS_UNICODE)
        .wide_string(text)
        .terminal();
    let narrow = LinkBuilder::new(HAS_RELATIVE_PATH)
        .narrow_string(text)
        .terminal();

    let wide = Lnk::parse(&wide).unwrap();
    let narrow = Lnk::parse(&narrow).unwrap();
    assert_eq!(wide.string_data, narrow.string_data);
    assert_eq!(wide.string_data.relative_path.as_deref(), Some(text));
}

#[test]
fn test_narrow_count_u16() {
    let mut data = LinkBuilder::new(HAS_NAME).data;
    data.extend_from_slice(&5u16.to_le_bytes());
    data.extend_from_slice(b"hello");
    data.extend_from_slice(&[0, 0, 0, 0]);

    let config = DecodeConfig::build().narrow_count(NarrowCount::U16);
    let lnk = Lnk::parse_with(&data, &config).unwrap();
    assert_eq!(lnk.string_data.description.as_deref(), Some("hello"));
    assert_eq!(lnk.end_offset, data.len());
}

#[test]
fn test_tracker_then_garbage() {
    let data = LinkBuilder::new(0)
        .block(0xA0000003, &tracker_payload())
        .raw(&[0xDE, 0xAD, 0xBE, 0xEF, 0x01, 0x02, 0x03, 0x04])
        .data;

    let lnk = Lnk::parse(&data).unwrap();
    assert_eq!(lnk.extra_data.len(), 1);
    assert!(matches!(lnk.extra_data[0], ExtraDataBlock::Tracker(_)));
    assert_eq!(
        lnk.diagnostics,
        vec![Diagnostic::UnknownExtraBlockSignature {
            offset: 76 + 0x60,
            signature: 0x0403_0201,
        }]
    );
}

#[test]
fn test_undersized_tracker_keeps_earlier_sections() {
    let mut data = LinkBuilder::new(HAS_NAME).narrow_string("hi").data;
    let tracker_at = data.len();
    data.extend_from_slice(&0x20u32.to_le_bytes());
    data.extend_from_slice(&0xA0000003u32.to_le_bytes());
    data.extend(tracker_payload());
    data.extend_from_slice(&[0, 0, 0, 0]);

    let lnk = Lnk::parse(&data).unwrap();
    assert_eq!(lnk.string_data.description.as_deref(), Some("hi"));
    assert_eq!(lnk.header.file_size, 0x0001_C000);
    assert!(lnk.extra_data.is_empty());
    assert_eq!(lnk.end_offset, tracker_at + 0x20);
    match lnk.diagnostics.as_slice() {
        [Diagnostic::UnsupportedLayout {
            structure, offset, ..
        }] => {
            assert_eq!(*structure, "TrackerDataBlock");
            assert_eq!(*offset, tracker_at);
        }
        other => panic!("expected one UnsupportedLayout, got {other:?}"),
    }
}

#[test]
fn test_short_buffer_is_out_of_bounds() {
    let data = LinkBuilder::new(0).data;
    match Lnk::parse(&data[..60]) {
        Err(LnkParseError::OutOfBounds(err)) => assert_eq!(err.end, 60),
        other => panic!("expected OutOfBounds, got {other:?}"),
    }
}

#[test]
fn test_truncated_section_is_out_of_bounds() {
    let mut data = LinkBuilder::new(IS_UNICODE | HAS_ARGUMENTS).data;
    data.extend_from_slice(&40u16.to_le_bytes());
    data.extend_from_slice(&[0x41, 0x00]);
    assert!(matches!(
        Lnk::parse(&data),
        Err(LnkParseError::OutOfBounds(_))
    ));
}

#[test]
fn test_bad_class_id_still_decodes() {
    let mut data = LinkBuilder::new(HAS_NAME | IS_UNICODE)
        .wide_string("still here")
        .terminal();
    data[4] = 0x02;

    let lnk = Lnk::parse(&data).unwrap();
    assert_eq!(lnk.diagnostics.len(), 1);
    assert!(matches!(
        lnk.diagnostics[0],
        Diagnostic::FormatMismatch { offset: 4, .. }
    ));
    assert_eq!(lnk.string_data.description.as_deref(), Some("still here"));
}

#[test]
fn test_from_reader() {
    let data = LinkBuilder::new(HAS_ARGUMENTS | IS_UNICODE)
        .wide_string("-v")
        .terminal();
    let lnk = Lnk::from_reader(&mut Cursor::new(data)).unwrap();
    assert_eq!(lnk.string_data.arguments.as_deref(), Some("-v"));
}

#[test]
fn test_json_document() {
    let data = LinkBuilder::new(HAS_NAME | IS_UNICODE)
        .wide_string("Editor")
        .block(0xA0000004, &65001u32.to_le_bytes())
        .terminal();
    let lnk = Lnk::parse(&data).unwrap();
    let json = serde_json::to_value(&lnk).unwrap();

    assert_eq!(
        json["header"]["class_id"],
        "00021401-0000-0000-C000-000000000046"
    );
    assert_eq!(
        json["header"]["link_flags"],
        serde_json::json!(["HAS_NAME", "IS_UNICODE"])
    );
    assert_eq!(json["string_data"]["description"], "Editor");
    assert_eq!(json["extra_data"][0]["block"], "ConsoleFe");
    assert_eq!(json["extra_data"][0]["code_page"], 65001);
    assert_eq!(json["diagnostics"], serde_json::json!([]));
}
