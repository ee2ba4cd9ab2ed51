use serde::Serialize;

use crate::lnk::{
    cursor::{ByteCursor, OutOfBounds},
    helpers::decode_utf16le_padded,
};

const FACE_NAME_SIZE: usize = 64;

/// ConsoleDataBlock: display settings for a console application target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Console {
    pub fill_attributes: u16,
    pub popup_fill_attributes: u16,
    pub screen_buffer_size_x: i16,
    pub screen_buffer_size_y: i16,
    pub window_size_x: i16,
    pub window_size_y: i16,
    pub window_origin_x: i16,
    pub window_origin_y: i16,
    pub font_size: u32,
    pub font_family: u32,
    pub font_weight: u32,
    pub face_name: String,
    pub cursor_size: u32,
    pub full_screen: bool,
    pub quick_edit: bool,
    pub insert_mode: bool,
    pub auto_position: bool,
    pub history_buffer_size: u32,
    pub number_of_history_buffers: u32,
    pub history_no_dup: bool,
    pub color_table: [u32; 16],
}

impl Console {
    pub(crate) fn parse(payload: &mut ByteCursor) -> Result<Self, OutOfBounds> {
        let fill_attributes = payload.read_u16()?;
        let popup_fill_attributes = payload.read_u16()?;
        let screen_buffer_size_x = payload.read_i16()?;
        let screen_buffer_size_y = payload.read_i16()?;
        let window_size_x = payload.read_i16()?;
        let window_size_y = payload.read_i16()?;
        let window_origin_x = payload.read_i16()?;
        let window_origin_y = payload.read_i16()?;

        // Unused1, Unused2
        payload.skip(8)?;

        let font_size = payload.read_u32()?;
        let font_family = payload.read_u32()?;
        let font_weight = payload.read_u32()?;
        let face_name = decode_utf16le_padded(payload.read_bytes(FACE_NAME_SIZE)?);

        let cursor_size = payload.read_u32()?;
        let full_screen = payload.read_u32()? != 0;
        let quick_edit = payload.read_u32()? != 0;
        let insert_mode = payload.read_u32()? != 0;
        let auto_position = payload.read_u32()? != 0;
        let history_buffer_size = payload.read_u32()?;
        let number_of_history_buffers = payload.read_u32()?;
        let history_no_dup = payload.read_u32()? != 0;

        let mut color_table = [0u32; 16];
        for color in color_table.iter_mut() {
            *color = payload.read_u32()?;
        }

        Ok(Self {
            fill_attributes,
            popup_fill_attributes,
            screen_buffer_size_x,
            screen_buffer_size_y,
            window_size_x,
            window_size_y,
            window_origin_x,
            window_origin_y,
            font_size,
            font_family,
            font_weight,
            face_name,
            cursor_size,
            full_screen,
            quick_edit,
            insert_mode,
            auto_position,
            history_buffer_size,
            number_of_history_buffers,
            history_no_dup,
            color_table,
        })
    }
}
