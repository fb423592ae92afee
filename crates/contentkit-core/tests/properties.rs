//! End-to-end checks of the command-line and file-name contracts.

use contentkit_core::cmdline::{self, BARE_VALUE_KEY};
use contentkit_core::filename::{
    add_guid, append_file_name_suffix, contains_guid, parse_guid, remove_guid,
};
use contentkit_core::hash::{HashMethod, hash_string};
use contentkit_core::text::chop;
use contentkit_core::{CommandLine, CoreError};
use uuid::Uuid;

const GUID: &str = "44935658-48B8-4F73-BC4C-8971570EE160";

#[test]
fn unquoted_lines_split_on_whitespace_runs() {
    let lines = [
        "prog.exe",
        "prog.exe a b c",
        "prog.exe\t-x\t\t1",
        "prog.exe -a 1\r\n-b 2\n-c",
    ];
    for line in lines {
        let normalized = cmdline::normalize(line);
        let tokens = cmdline::tokenize(line).tokens;
        assert_eq!(tokens.len(), normalized.split(' ').count(), "{line:?}");
    }
}

#[test]
fn name_value_and_valueless_flag() {
    let cmd = CommandLine::parse("prog.exe -name value -flag").expect("parse");
    let pairs: Vec<_> = cmd.parameters().iter().collect();
    assert_eq!(pairs, vec![("flag", ""), ("name", "value")]);
}

#[test]
fn single_bare_value() {
    let cmd = CommandLine::parse("prog.exe bareValue").expect("parse");
    let pairs: Vec<_> = cmd.parameters().iter().collect();
    assert_eq!(pairs, vec![(BARE_VALUE_KEY, "bareValue")]);
}

#[test]
fn duplicate_flags_fail() {
    let err = CommandLine::parse("prog.exe -x 1 -x 2").expect_err("duplicate flag");
    assert!(matches!(err, CoreError::DuplicateParameter { ref name } if name == "x"));
    assert_eq!(err.to_string(), "duplicate command-line parameter: x");
}

#[test]
fn unterminated_quote_is_reported() {
    let cmd = CommandLine::parse(r#"prog.exe -title "draft copy"#).expect("parse");
    assert!(cmd.has_unterminated_quote());
    assert_eq!(cmd.get("title"), Some("draft copy"));
}

#[test]
fn guid_detection_examples() {
    assert!(!contains_guid("filename.xml"));
    assert!(contains_guid(&format!("filename_{GUID}.xml")));
}

const ROUND_TRIP_NAMES: &[&str] = &[
    "filename.xml",
    "filename",
    "docs/topic.dita#/1234",
    r"maps\root.ditamap",
    // trailing dots
    "name.",
    "dir/report.",
    "archive..",
    ".",
    // dotfiles
    ".bashrc",
    "home/.profile",
    r"C:\Users\me\.gitconfig",
    // `#` and `.` in the directory part
    "dir#1/topic.xml",
    "build.out/v1.2/notes",
    // underscores and dots in the basename
    "my_file_name.xml",
    "_leading.xml",
    "trailing_.xml",
    "guide.v2.dita#sec_1",
    "unicode/résumé.xml",
];

#[test]
fn add_then_remove_restores_name() {
    for &name in ROUND_TRIP_NAMES {
        for _ in 0..5 {
            let g = Uuid::new_v4();
            let tagged = add_guid(name, g);
            assert!(contains_guid(&tagged), "{name:?} tagged as {tagged:?}");
            assert_eq!(parse_guid(&tagged), g, "{tagged:?}");
            assert_eq!(remove_guid(&tagged), name, "{tagged:?}");
        }
    }
}

#[test]
fn add_preserves_directory_and_fragment() {
    let g = Uuid::new_v4();
    for &name in ROUND_TRIP_NAMES {
        let tagged = add_guid(name, g);
        let (head, fragment) = name.rfind('#').map_or((name, ""), |i| name.split_at(i));
        let dir_end = head.rfind(['/', '\\']).map_or(0, |i| i + 1);
        assert!(tagged.starts_with(&head[..dir_end]), "{tagged:?}");
        assert!(tagged.ends_with(fragment), "{tagged:?}");
    }
}

#[test]
fn fragment_survives_removal() {
    assert_eq!(
        remove_guid(&format!("filename_{{{GUID}}}.xml#_abcd/1234")),
        "filename.xml#_abcd/1234"
    );
}

#[test]
fn add_is_idempotent_on_tagged_names() {
    let tagged = format!("filename_{GUID}.xml");
    assert_eq!(add_guid(&tagged, Uuid::new_v4()), tagged);
    let once = add_guid("other.xml", Uuid::new_v4());
    assert_eq!(add_guid(&once, Uuid::new_v4()), once);
}

#[test]
fn suffix_goes_before_guid() {
    assert_eq!(
        append_file_name_suffix(&format!("dir/file_{GUID}.xml#a"), "v2"),
        format!("dir/file_v2_{GUID}.xml#a")
    );
}

#[test]
fn chop_chunk_counts() {
    let text = "abcabcabcabcabca";
    for size in 1..=20 {
        assert_eq!(chop(text, size).expect("chop").len(), text.len().div_ceil(size));
    }
    assert!(matches!(chop(text, 0), Err(CoreError::InvalidArgument(_))));
}

#[test]
fn sha256_known_vector() {
    assert_eq!(
        hash_string("abc", HashMethod::Sha256, 0),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}
