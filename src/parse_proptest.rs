//! Property-based tests for the listing and mirror parsers.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::mirror::detect_faulty_hosts;
    use crate::parse::{parse_installed_line, parse_installed_listing};
    use proptest::prelude::*;

    proptest! {
        /// Property: any line with a token produces a record with a non-empty name
        #[test]
        fn installed_line_name_never_empty(line in "[ \t]*[^ \t\r\n]{1,40}( [^\r\n]{0,40})?") {
            if let Some(record) = parse_installed_line(&line) {
                prop_assert!(!record.name.is_empty(), "empty name from {:?}", line);
                prop_assert!(!record.version.is_empty(), "empty version from {:?}", line);
            }
        }

        /// Property: the raw text is the trimmed input line
        #[test]
        fn installed_line_keeps_raw(line in "[a-z][a-z0-9.+-]{0,20}/[a-z]{1,8} [0-9.]{1,8}") {
            let record = parse_installed_line(&line).unwrap();
            prop_assert_eq!(record.raw.as_deref(), Some(line.trim()));
            prop_assert_eq!(record.version.as_str(), "unknown");
        }

        /// Property: name-version tokens split back into their parts
        #[test]
        fn hyphen_token_round_trips(name in "[a-z][a-z0-9-]{0,15}[a-z0-9]", version in "[0-9][0-9.]{0,8}") {
            let token = format!("{}-{}", name, version);
            let record = parse_installed_line(&token).unwrap();
            prop_assert_eq!(record.name, name);
            prop_assert_eq!(record.version, version);
        }

        /// Property: the listing never yields more records than input lines
        #[test]
        fn listing_bounded_by_lines(output in "([^\r\n]{0,30}\n){0,20}") {
            let records = parse_installed_listing(&output);
            prop_assert!(records.len() <= output.lines().count());
        }

        /// Property: text without any failure marker never disables a mirror
        #[test]
        fn no_marker_no_hosts(text in "[a-zA-Z0-9 :/.'\n]{0,200}") {
            prop_assume!(!text.contains("is not signed"));
            prop_assume!(!text.contains("NO_PUBKEY"));
            prop_assume!(!text.contains("EXPKEYSIG"));
            prop_assume!(!text.contains("KEYEXPIRED"));
            prop_assume!(!text.contains("public key is not available"));
            prop_assert!(detect_faulty_hosts(&text).is_empty());
        }

        /// Property: the detected host is exactly the one on the unsigned line
        #[test]
        fn unsigned_line_yields_its_host(host in "[a-z]{1,10}(\\.[a-z]{2,6}){1,2}", path in "[a-z0-9/]{0,20}") {
            let line = format!("E: The repository 'https://{}/{} InRelease' is not signed.", host, path);
            let hosts = detect_faulty_hosts(&line);
            prop_assert_eq!(hosts.into_iter().collect::<Vec<_>>(), vec![host]);
        }
    }
}
