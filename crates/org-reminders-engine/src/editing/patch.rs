/// Result of applying a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Byte ranges of inserted text, in the new buffer
    pub changed: Vec<std::ops::Range<usize>>,
    pub version: u64,
}
