//! Input cleanup applied to every client supplied string.

const OPEN: &str = "<script";
const CLOSE: &str = "</script>";

/// Remove `<script ...>...</script>` fragments, case-insensitively.
///
/// An opening tag without a matching close is left untouched, as is anything
/// that only looks like one (`<scripts>`).
pub fn strip_script_tags(input: &str) -> String {
    // ASCII lowercasing keeps byte offsets identical to `input`.
    let lower = input.to_ascii_lowercase();
    let mut out = String::with_capacity(input.len());
    let mut cursor = 0;

    while let Some(rel) = lower[cursor..].find(OPEN) {
        let start = cursor + rel;
        let after = start + OPEN.len();
        let is_tag = lower
            .as_bytes()
            .get(after)
            .map_or(true, |b| !(b.is_ascii_alphanumeric() || *b == b'_'));
        if !is_tag {
            out.push_str(&input[cursor..after]);
            cursor = after;
            continue;
        }
        match lower[after..].find(CLOSE) {
            Some(end_rel) => {
                out.push_str(&input[cursor..start]);
                cursor = after + end_rel + CLOSE.len();
            }
            None => break,
        }
    }
    out.push_str(&input[cursor..]);
    out
}

/// Strip scripts and surrounding whitespace.
pub fn clean(input: &str) -> String {
    strip_script_tags(input).trim().to_string()
}

/// Like [`clean`], mapping a value that ends up empty to `None`.
pub fn clean_opt(input: Option<String>) -> Option<String> {
    input.map(|s| clean(&s)).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_script_blocks_case_insensitively() {
        assert_eq!(strip_script_tags("a<script>x()</script>b"), "ab");
        assert_eq!(strip_script_tags("a<SCRIPT type=\"t\">x</ScRiPt>b"), "ab");
        assert_eq!(strip_script_tags("<script>1</script>mid<script>2</script>"), "mid");
    }

    #[test]
    fn leaves_lookalikes_and_unterminated_tags() {
        assert_eq!(strip_script_tags("<scripts>ok</scripts>"), "<scripts>ok</scripts>");
        assert_eq!(strip_script_tags("x<script>never closed"), "x<script>never closed");
    }

    #[test]
    fn clean_opt_drops_blank_values() {
        assert_eq!(clean_opt(Some("   ".into())), None);
        assert_eq!(clean_opt(Some(" 555-0100 ".into())), Some("555-0100".into()));
        assert_eq!(clean_opt(None), None);
    }
}
