use serde::Serialize;

use crate::lnk::cursor::{ByteCursor, OutOfBounds};

/// ConsoleFEDataBlock: the code page used for console text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConsoleFe {
    pub code_page: u32,
}

impl ConsoleFe {
    pub(crate) fn parse(payload: &mut ByteCursor) -> Result<Self, OutOfBounds> {
        Ok(Self {
            code_page: payload.read_u32()?,
        })
    }
}
