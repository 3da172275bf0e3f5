use std::ops::Range;

use xi_rope::delta::Builder;
use xi_rope::{Delta, Rope, RopeInfo};

/// A text edit against the document buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    InsertText { at: usize, text: String },
    ReplaceRange { range: Range<usize>, text: String },
    DeleteRange { range: Range<usize> },
}

/// Compile a command into a delta over a buffer of `len` bytes.
///
/// Offsets past the end of the buffer are clamped to it.
pub(crate) fn compile_command(cmd: &Cmd, len: usize) -> Delta<RopeInfo> {
    let clamp = |range: &Range<usize>| {
        let start = range.start.min(len);
        start..range.end.clamp(start, len)
    };

    let mut builder = Builder::new(len);
    match cmd {
        Cmd::InsertText { at, text } => {
            let at = (*at).min(len);
            builder.replace(at..at, Rope::from(text.as_str()));
        }
        Cmd::ReplaceRange { range, text } => {
            builder.replace(clamp(range), Rope::from(text.as_str()));
        }
        Cmd::DeleteRange { range } => {
            builder.delete(clamp(range));
        }
    }
    builder.build()
}
