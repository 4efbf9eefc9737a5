use release_notifier::{is_newer, parse, ParsedVersion};

#[test]
fn test_parse_examples() {
    let cases = [
        ("v3.2.1", (3, 2, 1, "")),
        ("3.2", (3, 2, 0, "")),
        ("2.0.0-RC1", (2, 0, 0, "-RC1")),
        ("nightly", (0, 0, 0, "nightly")),
        ("  v6.1.0-M1  ", (6, 1, 0, "-M1")),
    ];

    for (tag, (major, minor, patch, suffix)) in cases {
        assert_eq!(
            parse(tag),
            ParsedVersion::new(major, minor, patch, suffix),
            "parsing {tag:?}"
        );
    }
}

#[test]
fn test_is_newer_examples() {
    assert!(is_newer("3.2.1", "3.2.0"));
    assert!(!is_newer("3.2.0", "3.2.0"));
    assert!(is_newer("3.2.0", "3.2.0-RC1"));
    assert!(!is_newer("3.2.0-RC1", "3.2.0"));
    assert!(is_newer("v4.0.0", "v3.99.99"));
    assert!(is_newer("1.0.0", "nightly"));
}

#[test]
fn test_is_newer_never_panics_on_odd_input() {
    let odd = ["", " ", "v", "vv1", "1..2", "١٢٣", "18446744073709551616", "\n1.0"];
    for a in odd {
        assert!(!is_newer(a, a));
        for b in odd {
            let _ = is_newer(a, b);
        }
    }
}

#[test]
fn test_components_beyond_u64_stay_antisymmetric() {
    let a = "18446744073709551617.0.0";
    let b = "18446744073709551616.0.0";

    assert_ne!(parse(a).triple(), parse(b).triple());
    assert!(is_newer(a, b) ^ is_newer(b, a));
    assert!(is_newer(a, b));
}
