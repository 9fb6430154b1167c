use jolt_core::FileId;
use similar::TextDiff;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilePreview {
    pub file: FileId,
    pub original: String,
    pub modified: String,
    pub unified_diff: String,
    pub edit_count: usize,
}

/// A `git`-style unified diff with three lines of context.
pub fn unified_diff(file: &FileId, original: &str, modified: &str) -> String {
    let diff = TextDiff::from_lines(original, modified);
    diff.unified_diff()
        .context_radius(3)
        .header(&format!("a/{}", file.as_str()), &format!("b/{}", file.as_str()))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn diff_has_headers_and_hunks() {
        let diff = unified_diff(
            &FileId::new("p/A.java"),
            "class A {\n  void m() {}\n}\n",
            "class A {\n  void n() {}\n}\n",
        );
        assert_eq!(
            diff,
            "--- a/p/A.java\n+++ b/p/A.java\n@@ -1,3 +1,3 @@\n class A {\n-  void m() {}\n+  void n() {}\n }\n"
        );
    }
}
