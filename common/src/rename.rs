use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::{OsStrExt, OsStringExt};

/// Visible stand-in for a leading dot in template master copies.
///
/// Templates store would-be hidden files under this prefix (e.g. `DOT_gitignore`)
/// so they stay visible while editing the template; instantiated projects get the
/// real dot-file names back.
pub const DOTS_LONG: &str = "DOT_";

/// Which way a single path-segment name is rewritten during replication.
///
/// The two directions are exact inverses of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `.foo` -> `DOT_foo` (project names into template names)
    Hide,
    /// `DOT_foo` -> `.foo` (template names into project names)
    Reveal,
}

impl Direction {
    #[must_use]
    pub fn inverse(self) -> Self {
        match self {
            Direction::Hide => Direction::Reveal,
            Direction::Reveal => Direction::Hide,
        }
    }

    /// (old_prefix, new_prefix) pair selected by this direction.
    fn prefixes(self) -> (&'static [u8], &'static [u8]) {
        match self {
            Direction::Hide => (b".", DOTS_LONG.as_bytes()),
            Direction::Reveal => (DOTS_LONG.as_bytes(), b"."),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Direction::Hide => write!(f, "hide"),
            Direction::Reveal => write!(f, "reveal"),
        }
    }
}

/// Applies the rename rule to a single path segment.
///
/// If `name` starts with the direction's old prefix the prefix is replaced,
/// otherwise the name passes through unchanged. Operates on raw bytes so
/// non-UTF-8 filenames are renamed (or passed through) losslessly.
#[must_use]
pub fn rename_name(direction: Direction, name: &OsStr) -> OsString {
    let (old_prefix, new_prefix) = direction.prefixes();
    match name.as_bytes().strip_prefix(old_prefix) {
        Some(rest) => {
            let mut renamed = Vec::with_capacity(new_prefix.len() + rest.len());
            renamed.extend_from_slice(new_prefix);
            renamed.extend_from_slice(rest);
            OsString::from_vec(renamed)
        }
        None => name.to_owned(),
    }
}

#[cfg(test)]
mod rename_tests {
    use super::*;

    fn hide(name: &str) -> OsString {
        rename_name(Direction::Hide, OsStr::new(name))
    }

    fn reveal(name: &str) -> OsString {
        rename_name(Direction::Reveal, OsStr::new(name))
    }

    #[test]
    fn hide_renames_leading_dot() {
        assert_eq!(hide(".cfg"), OsString::from("DOT_cfg"));
        assert_eq!(hide(".gitignore"), OsString::from("DOT_gitignore"));
    }

    #[test]
    fn reveal_renames_marker() {
        assert_eq!(reveal("DOT_cfg"), OsString::from(".cfg"));
    }

    #[test]
    fn unrelated_names_pass_through() {
        assert_eq!(hide("main.tex"), OsString::from("main.tex"));
        assert_eq!(reveal("main.tex"), OsString::from("main.tex"));
        // prefix substitution is anchored at the start only
        assert_eq!(hide("a.cfg"), OsString::from("a.cfg"));
    }

    #[test]
    fn bare_prefix_names_are_renamed_too() {
        // no entry is ever skipped based on name, including the bare markers
        assert_eq!(hide("."), OsString::from("DOT_"));
        assert_eq!(reveal("DOT_"), OsString::from("."));
    }

    #[test]
    fn non_invertible_overlap_is_known() {
        // a name that already carries the opposite rule's output prefix is not
        // restored by a round trip; this is accepted behavior
        assert_eq!(hide("DOT_x"), OsString::from("DOT_x"));
        assert_eq!(reveal(&hide("DOT_x").to_string_lossy()), OsString::from(".x"));
    }

    #[test]
    fn non_utf8_names_are_handled() {
        use std::os::unix::ffi::OsStrExt;
        let name = OsStr::from_bytes(b".caf\xe9");
        assert_eq!(
            rename_name(Direction::Hide, name).as_bytes(),
            b"DOT_caf\xe9"
        );
        let plain = OsStr::from_bytes(b"caf\xe9");
        assert_eq!(rename_name(Direction::Hide, plain), plain.to_owned());
    }

    #[test]
    fn directions_are_inverses() {
        assert_eq!(Direction::Hide.inverse(), Direction::Reveal);
        assert_eq!(Direction::Reveal.inverse(), Direction::Hide);
    }

    mod roundtrip_props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn hide_then_reveal_is_identity(name in "[a-zA-Z0-9._-]{1,32}") {
                // names already starting with the marker hit the documented
                // prefix-overlap exception
                prop_assume!(!name.starts_with(DOTS_LONG));
                let there = rename_name(Direction::Hide, OsStr::new(&name));
                let back = rename_name(Direction::Reveal, &there);
                prop_assert_eq!(back, OsString::from(name));
            }

            #[test]
            fn reveal_then_hide_is_identity(name in "[a-zA-Z0-9._-]{1,32}") {
                prop_assume!(!name.starts_with('.'));
                let there = rename_name(Direction::Reveal, OsStr::new(&name));
                let back = rename_name(Direction::Hide, &there);
                prop_assert_eq!(back, OsString::from(name));
            }
        }
    }
}
