//! Balanced-brace JSON extraction (spec.md 4.F.2) and the manifest JSON
//! repair procedure (spec.md 4.G.3.f), both grounded on the teacher's
//! `ResponseParser::extract_json` but generalized from a single
//! `{...}`/```` ```json ```` scan to the narrower balanced-brace and
//! truncate-and-close passes each workflow step actually needs.

/// Scan `text` for the first balanced `{...}` object, honoring nested
/// braces and ignoring braces inside string literals. Returns `None` if
/// no balanced object is found.
pub fn extract_first_json_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = text.find('{')?;

    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Repair a truncated manifests payload (spec.md 4.G.3.f): locate the
/// `"manifests":` array opening, find the last complete-entry separator
/// `"},"` after it, truncate there, and close the array and object.
/// Returns `None` if no `"manifests":` key or no separator is found.
pub fn repair_truncated_manifests(text: &str) -> Option<String> {
    let manifests_at = text.find("\"manifests\":")?;
    let last_sep = text[manifests_at..].rfind("\"},")? + manifests_at;

    // Keep through the closing `"}` of the last complete entry.
    let cut = last_sep + "\"}".len();
    let mut repaired = text[..cut].to_string();
    repaired.push_str("]}");
    Some(repaired)
}

/// Strip a ```` ```json ... ``` ```` or ```` ``` ... ``` ```` fence if
/// present, returning the interior text untouched otherwise.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    for marker in ["```json", "```JSON", "```"] {
        if let Some(rest) = trimmed.strip_prefix(marker) {
            if let Some(end) = rest.rfind("```") {
                return rest[..end].trim();
            }
        }
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_simple_object() {
        let text = r#"here is the result: {"a": 1, "b": {"c": 2}} done"#;
        assert_eq!(
            extract_first_json_object(text),
            Some(r#"{"a": 1, "b": {"c": 2}}"#)
        );
    }

    #[test]
    fn ignores_braces_inside_strings() {
        let text = r#"{"a": "contains } a brace"}"#;
        assert_eq!(extract_first_json_object(text), Some(text));
    }

    #[test]
    fn returns_none_without_braces() {
        assert_eq!(extract_first_json_object("no json here"), None);
    }

    #[test]
    fn repairs_truncated_manifests_to_one_entry() {
        let truncated = r#"{"manifests":[{"file_name":"a.yaml","generated_code":"x"},{"file_name":"b.yaml","generated_code":"y"}"#;
        let repaired = repair_truncated_manifests(truncated).unwrap();
        let value: serde_json::Value = serde_json::from_str(&repaired).unwrap();
        let manifests = value["manifests"].as_array().unwrap();
        assert_eq!(manifests.len(), 1);
        assert_eq!(manifests[0]["file_name"], "a.yaml");
    }

    #[test]
    fn strips_json_code_fence() {
        let text = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fence(text), "{\"a\": 1}");
    }

    #[test]
    fn leaves_unfenced_text_alone() {
        assert_eq!(strip_code_fence("{\"a\": 1}"), "{\"a\": 1}");
    }
}
