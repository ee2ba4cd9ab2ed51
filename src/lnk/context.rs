use log::warn;
use serde::Serialize;
use std::fmt::{self, Display};

use crate::{
    config::DecodeConfig,
    lnk::{
        cursor::{ByteCursor, OutOfBounds},
        helpers::decode_narrow,
    },
};

/// A non-fatal anomaly met while decoding. Everything decoded before it is
/// still part of the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum Diagnostic {
    /// A constant field (signature, class id, version, terminator) holds an
    /// unexpected value. Decoding went on as if it matched.
    FormatMismatch {
        structure: &'static str,
        offset: usize,
        expected: String,
        found: String,
    },
    /// A structure whose layout is not decoded. The rest of that structure
    /// was skipped.
    UnsupportedLayout {
        structure: &'static str,
        offset: usize,
        reason: String,
    },
    /// Extra data ended at a block whose signature is not known.
    UnknownExtraBlockSignature { offset: usize, signature: u32 },
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::FormatMismatch {
                structure,
                offset,
                expected,
                found,
            } => write!(
                f,
                "{structure} at {offset:#x}: expected {expected}, found {found}"
            ),
            Diagnostic::UnsupportedLayout {
                structure,
                offset,
                reason,
            } => write!(f, "{structure} at {offset:#x} not decoded: {reason}"),
            Diagnostic::UnknownExtraBlockSignature { offset, signature } => write!(
                f,
                "unknown extra data signature {signature:#010x} at {offset:#x}, extra data decoding stopped"
            ),
        }
    }
}

/// State threaded through every decoder of one decode call.
pub struct DecodeContext<'a> {
    pub(crate) cursor: ByteCursor<'a>,
    pub(crate) config: DecodeConfig,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl<'a> DecodeContext<'a> {
    pub fn new(data: &'a [u8], config: DecodeConfig) -> Self {
        Self {
            cursor: ByteCursor::new(data),
            config,
            diagnostics: Vec::new(),
        }
    }

    /// Like [`ByteCursor::jump`], for decoders that need the whole context.
    pub fn jump<T>(
        &mut self,
        position: usize,
        read: impl FnOnce(&mut Self) -> Result<T, OutOfBounds>,
    ) -> Result<T, OutOfBounds> {
        let saved = self.cursor.position();
        self.cursor.seek(position)?;
        let result = read(self);
        self.cursor.seek(saved)?;
        result
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        warn!("[lnk] {diagnostic}");
        self.diagnostics.push(diagnostic);
    }

    /// Reports a read that ran past a size-bounded window as an
    /// `UnsupportedLayout` of `structure`. A window that ends at the buffer
    /// end means the buffer itself was overrun, so the error is returned.
    pub fn contain_overrun(
        &mut self,
        structure: &'static str,
        offset: usize,
        err: OutOfBounds,
    ) -> Result<(), OutOfBounds> {
        if err.end >= self.cursor.len() {
            return Err(err);
        }
        self.report(Diagnostic::UnsupportedLayout {
            structure,
            offset,
            reason: format!(
                "read of {} bytes at {:#x} overruns its declared size ending at {:#x}",
                err.requested, err.offset, err.end
            ),
        });
        Ok(())
    }

    pub fn narrow(&self, bytes: &[u8]) -> String {
        decode_narrow(bytes, self.config.narrow_encoding)
    }

    pub fn mismatch(
        &mut self,
        structure: &'static str,
        offset: usize,
        expected: impl Display,
        found: impl Display,
    ) {
        self.report(Diagnostic::FormatMismatch {
            structure,
            offset,
            expected: expected.to_string(),
            found: found.to_string(),
        });
    }
}
