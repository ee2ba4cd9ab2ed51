//! Decoder for Windows Shell Link (`.lnk`) files, following MS-SHLLINK.
//!
//! ```no_run
//! let data = std::fs::read("shortcut.lnk").unwrap();
//! let lnk = lnk_parser::Lnk::parse(&data).unwrap();
//! println!("{:?}", lnk.string_data.arguments);
//! ```

pub mod config;
pub mod lnk;

pub use config::{DecodeConfig, NarrowCount, NarrowEncoding};
pub use lnk::{
    Lnk, LnkParseError,
    block_data::{BlockSignature, ExtraDataBlock},
    context::Diagnostic,
    cursor::{ByteCursor, OutOfBounds},
    helpers::Guid,
};
