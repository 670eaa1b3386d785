use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Substitutions and insertions applied to a file name.
///
/// Every entry of `find_strings` is matched exactly and case-sensitively and
/// replaced with the shared `replacement`. The extension is never touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameRule {
    pub find_strings: Vec<String>,
    pub replacement: String,
    pub prefix: String,
    pub suffix: String,
}

impl RenameRule {
    pub fn new(
        find_strings: Vec<String>,
        replacement: impl Into<String>,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        Self {
            find_strings,
            replacement: replacement.into(),
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    /// Builds a rule from the comma-separated form used by front ends.
    /// A lone string becomes a one-element list.
    pub fn from_find_text(
        find_text: &str,
        replacement: impl Into<String>,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        Self::new(parse_find_strings(find_text), replacement, prefix, suffix)
    }

    pub fn is_identity(&self) -> bool {
        self.prefix.is_empty()
            && self.suffix.is_empty()
            && self.find_strings.iter().all(String::is_empty)
    }
}

/// Splits `a,b,c` into its entries. Entries are kept verbatim (no trimming);
/// empty entries are dropped.
pub fn parse_find_strings(find_text: &str) -> Vec<String> {
    find_text
        .split(',')
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits a file name at its extension dot.
///
/// The dot must have at least one non-dot character before it, so leading
/// dots stay in the base: `.gitignore` has no extension, `.env.local` has
/// `.local`. The returned extension keeps its dot.
pub fn split_extension(name: &str) -> (&str, &str) {
    let leading_dots = name.len() - name.trim_start_matches('.').len();
    match name[leading_dots..].rfind('.') {
        Some(pos) => name.split_at(leading_dots + pos),
        None => (name, ""),
    }
}

pub fn compute_new_name(original_name: &str, rule: &RenameRule) -> String {
    let (base, ext) = split_extension(original_name);
    let base = replace_all(base, &rule.find_strings, &rule.replacement);
    format!("{}{}{}{}", rule.prefix, base, rule.suffix, ext)
}

// Longest first, otherwise a shorter needle can break up a longer one that
// contains it (`ab` inside `abc`).
fn replace_all(base: &str, find_strings: &[String], replacement: &str) -> String {
    let mut ordered: Vec<&str> = find_strings
        .iter()
        .map(String::as_str)
        .filter(|find| !find.is_empty())
        .collect();
    ordered.sort_by_key(|find| Reverse(find.chars().count()));

    ordered
        .into_iter()
        .fold(base.to_string(), |acc, find| acc.replace(find, replacement))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(find: &[&str], replacement: &str, prefix: &str, suffix: &str) -> RenameRule {
        RenameRule::new(
            find.iter().map(|v| v.to_string()).collect(),
            replacement,
            prefix,
            suffix,
        )
    }

    #[test]
    fn split_extension_uses_last_dot() {
        assert_eq!(split_extension("a.tar.gz"), ("a.tar", ".gz"));
        assert_eq!(split_extension("report.txt"), ("report", ".txt"));
        assert_eq!(split_extension("README"), ("README", ""));
        assert_eq!(split_extension("trailing."), ("trailing", "."));
        assert_eq!(split_extension(""), ("", ""));
    }

    #[test]
    fn split_extension_keeps_leading_dots_in_base() {
        assert_eq!(split_extension(".gitignore"), (".gitignore", ""));
        assert_eq!(split_extension("..hidden"), ("..hidden", ""));
        assert_eq!(split_extension(".env.local"), (".env", ".local"));
        assert_eq!(split_extension("..."), ("...", ""));
    }

    #[test]
    fn longest_find_string_is_replaced_first() {
        let value = compute_new_name("abcd.txt", &rule(&["ab", "abc"], "X", "", ""));
        assert_eq!(value, "Xd.txt");
    }

    #[test]
    fn equal_length_find_strings_keep_their_order() {
        // "ab" runs before "bc", so "abc" loses "ab" and "bc" no longer matches.
        let value = compute_new_name("abc", &rule(&["ab", "bc"], "_", "", ""));
        assert_eq!(value, "_c");

        let value = compute_new_name("abc", &rule(&["bc", "ab"], "_", "", ""));
        assert_eq!(value, "a_");
    }

    #[test]
    fn replacements_chain_through_the_list() {
        let value = compute_new_name("one_two.md", &rule(&["one", "two"], "x", "", ""));
        assert_eq!(value, "x_x.md");

        let value = compute_new_name("aaa.md", &rule(&["aa"], "b", "", ""));
        assert_eq!(value, "ba.md");
    }

    #[test]
    fn extension_is_never_altered() {
        let value = compute_new_name("txt_notes.txt", &rule(&["txt"], "doc", "", ""));
        assert_eq!(value, "doc_notes.txt");

        let value = compute_new_name("photo.JPG", &rule(&["JPG", "."], "png", "p_", "_s"));
        assert_eq!(value, "p_photo_s.JPG");
    }

    #[test]
    fn matching_is_case_sensitive() {
        let value = compute_new_name("Draft_draft.txt", &rule(&["draft"], "final", "", ""));
        assert_eq!(value, "Draft_final.txt");
    }

    #[test]
    fn prefix_and_suffix_wrap_the_base() {
        let value = compute_new_name("notes_draft.txt", &rule(&["draft"], "final", "", "_v2"));
        assert_eq!(value, "notes_final_v2.txt");

        let value = compute_new_name("README", &rule(&[], "", "old_", ""));
        assert_eq!(value, "old_README");
    }

    #[test]
    fn dotfile_gets_suffix_appended_to_whole_name() {
        let value = compute_new_name(".gitignore", &rule(&[], "", "", ".bak"));
        assert_eq!(value, ".gitignore.bak");
    }

    #[test]
    fn empty_rule_is_identity() {
        let empty = RenameRule::default();
        assert!(empty.is_identity());
        for name in ["a.tar.gz", ".gitignore", "README", "", "x.", "日本語.txt"] {
            assert_eq!(compute_new_name(name, &empty), name);
        }
    }

    #[test]
    fn empty_find_entries_are_ignored() {
        let value = compute_new_name("abc.txt", &rule(&["", "b"], "-", "", ""));
        assert_eq!(value, "a-c.txt");
    }

    #[test]
    fn find_text_is_split_on_commas_without_trimming() {
        assert_eq!(parse_find_strings("draft"), vec!["draft"]);
        assert_eq!(parse_find_strings("a, b,,c"), vec!["a", " b", "c"]);
        assert!(parse_find_strings("").is_empty());

        let rule = RenameRule::from_find_text("ab,abc", "X", "", "");
        assert_eq!(rule.find_strings, vec!["ab", "abc"]);
    }
}
