//! ID prefix constants.
//!
//! Every row ID has the form `{prefix}-{8 hex}`, generated server-side by
//! `RollDb::generate_id`.

pub const PREFIX_TEACHER: &str = "tch";
pub const PREFIX_CLASS: &str = "cls";
pub const PREFIX_SUBJECT: &str = "sub";
pub const PREFIX_ATTENDANCE: &str = "att";
pub const PREFIX_AUDIT: &str = "aud";

/// All known prefixes, for exhaustive generation tests.
pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_TEACHER,
    PREFIX_CLASS,
    PREFIX_SUBJECT,
    PREFIX_ATTENDANCE,
    PREFIX_AUDIT,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_are_three_chars_and_unique() {
        let mut seen = std::collections::HashSet::new();
        for prefix in ALL_PREFIXES {
            assert_eq!(prefix.len(), 3, "prefix '{prefix}' should be 3 chars");
            assert!(seen.insert(*prefix), "duplicate prefix '{prefix}'");
        }
    }
}
