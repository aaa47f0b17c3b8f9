//! Shared position and line-mapping utilities.
//!
//! Every report in vintl is line-addressed, and extraction frequently hands
//! a sub-region of a file to another adapter. These helpers keep all line
//! numbers absolute to the outermost file.

/// Compute the 1-based line number of `offset` within `src`, where `src`
/// itself starts at `start_line` of the enclosing file.
///
/// This is the offset-propagation primitive for embedded regions: a
/// `<script>` block starting at line 12 hands its content to the script
/// adapter with `start_line = 12`, and positions inside the block come back
/// as absolute file lines.
pub fn line_to(src: &str, offset: usize, start_line: usize) -> usize {
    let offset = offset.min(src.len());
    start_line + src[..offset].bytes().filter(|b| *b == b'\n').count()
}
