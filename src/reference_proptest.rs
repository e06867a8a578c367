//! Property-based tests for the reference naming policy.
//!
//! These tests use proptest to generate random reference values and verify
//! that the name-cleaning rules hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::reference::ReferenceNaming;
    use proptest::prelude::*;

    proptest! {
        /// Property: whatever follows the first underscore is dropped
        #[test]
        fn suffix_after_underscore_is_ignored(
            stem in "[a-z0-9]{1,16}",
            suffix in "[a-zA-Z0-9_.-]{0,16}",
        ) {
            let naming = ReferenceNaming::default();
            let cleaned = naming.clean(&format!("{}_{}", stem, suffix));
            prop_assert_eq!(cleaned, format!("{}.yaml", stem));
        }

        /// Property: a reference without an underscore only gains the extension
        #[test]
        fn reference_without_underscore_gets_extension(reference in "[a-z0-9.]{0,24}") {
            let naming = ReferenceNaming::default();
            prop_assert_eq!(naming.clean(&reference), format!("{}.yaml", reference));
        }

        /// Property: the cleaned name always ends with the extension
        #[test]
        fn cleaned_name_ends_with_extension(reference in ".*") {
            let naming = ReferenceNaming::default();
            prop_assert!(naming.clean(&reference).ends_with(".yaml"));
        }

        /// Property: the cleaned name never contains an underscore
        #[test]
        fn cleaned_name_has_no_underscore(reference in ".*") {
            let naming = ReferenceNaming::default();
            prop_assert!(!naming.clean(&reference).contains('_'));
        }

        /// Property: verbatim naming returns the input unchanged
        #[test]
        fn verbatim_is_identity(reference in ".*") {
            prop_assert_eq!(ReferenceNaming::Verbatim.clean(&reference), reference);
        }
    }
}
