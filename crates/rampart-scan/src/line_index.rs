/// Maps byte offsets into a source file to 1-based line numbers.
///
/// Built once per file and reused for every `Import`/diagnostic the scanner
/// emits, so line lookup is O(log n) instead of re-scanning the file per
/// offset.
pub struct LineIndex {
    /// Byte offset of the start of each line, in order.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Build the index over `source`.
    pub fn new(source: &str) -> LineIndex {
        let mut line_starts = vec![0];
        for pos in memchr::memchr_iter(b'\n', source.as_bytes()) {
            line_starts.push(pos + 1);
        }
        LineIndex { line_starts }
    }

    /// The 1-based line number containing byte offset `offset`.
    pub fn line_number(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(i) => i + 1,
            Err(i) => i,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line_is_one() {
        let idx = LineIndex::new("import a\nimport b\n");
        assert_eq!(idx.line_number(0), 1);
    }

    #[test]
    fn second_line_offset() {
        let idx = LineIndex::new("import a\nimport b\n");
        let offset = "import a\n".len();
        assert_eq!(idx.line_number(offset), 2);
    }
}
