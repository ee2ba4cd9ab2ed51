use serde::Serialize;

/// How narrow (code page) strings are turned into text.
///
/// Shell links store these in the code page of the machine that wrote them,
/// which the file does not record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum NarrowEncoding {
    /// Every byte maps to the code point of the same value.
    #[default]
    Latin1,
    /// UTF-8, invalid sequences replaced.
    Utf8,
}

/// Width of the length prefix of a StringData entry when `IS_UNICODE` is clear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum NarrowCount {
    /// 2-byte character count, as in MS-SHLLINK `CountCharacters`.
    U16,
    /// 4-byte byte count.
    #[default]
    U32,
}

#[derive(Debug, Clone, Default)]
pub struct DecodeConfig {
    pub(crate) narrow_encoding: NarrowEncoding,
    pub(crate) narrow_count: NarrowCount,
}

impl DecodeConfig {
    pub fn build() -> Self {
        Self::default()
    }

    pub fn narrow_encoding(self, narrow_encoding: NarrowEncoding) -> Self {
        DecodeConfig {
            narrow_encoding,
            ..self
        }
    }

    pub fn narrow_count(self, narrow_count: NarrowCount) -> Self {
        DecodeConfig {
            narrow_count,
            ..self
        }
    }

    pub fn get_narrow_encoding(&self) -> NarrowEncoding {
        self.narrow_encoding
    }

    pub fn get_narrow_count(&self) -> NarrowCount {
        self.narrow_count
    }
}
