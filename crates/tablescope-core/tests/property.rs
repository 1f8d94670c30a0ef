use proptest::prelude::*;
use std::sync::Arc;
use tablescope_core::{homogenize, pluralize, singularize, CatalogSnapshot, StaticCatalog};

/// Regular nouns: consonant-vowel shapes ending in a plain consonant, which
/// no irregular or special suffix rule applies to.
const REGULAR_NOUN: &str = "[bdgkmnprt][aeiou][bdgkmnprt]{1,2}[aeiou][dkmnprt]";

/// Regular nouns ending in a silent `e` after `s` (`house`, `purchase`).
const SE_NOUN: &str = "[bdgkmnprt][aeiou][bdgkmnprt]{1,2}[aeio]se";

/// Nouns ending in `ie`. Their plural `-ies` reads like the plural of a
/// `-y` noun, so singularizing does not always recover them.
const IE_NOUN: &str = "[bdgkmnprt][aeiou][bdgkmnprt]{1,2}ie";

fn table_name() -> impl Strategy<Value = String> {
    prop_oneof![REGULAR_NOUN, SE_NOUN, IE_NOUN]
}

proptest! {
    #[test]
    fn singularize_inverts_pluralize(word in REGULAR_NOUN) {
        let plural = pluralize(&word);
        prop_assert_eq!(&plural, &format!("{word}s"));
        prop_assert_eq!(singularize(&plural), word);
    }

    #[test]
    fn singularize_inverts_pluralize_for_se_nouns(word in SE_NOUN) {
        let plural = pluralize(&word);
        prop_assert_eq!(&plural, &format!("{word}s"));
        prop_assert_eq!(singularize(&plural), word);
    }

    #[test]
    fn homogenize_is_idempotent(name in "[A-Za-z_][A-Za-z0-9_]{0,20}") {
        let once = homogenize(&name);
        prop_assert_eq!(homogenize(&once), once.clone());
    }

    #[test]
    fn unique_table_resolves_by_own_name(
        names in proptest::collection::hash_set(table_name(), 1..6),
    ) {
        let mut catalog = StaticCatalog::new().with_default_schema("dbo");
        for name in &names {
            catalog = catalog.with_table(Some("dbo"), name);
        }
        let snapshot = CatalogSnapshot::load(Arc::new(catalog), None).unwrap();

        for name in &names {
            let table = snapshot.find_table(&name.to_uppercase()).unwrap();
            prop_assert_eq!(table.actual_name(), name.as_str());

            let by_plural = snapshot.find_table(&pluralize(name)).unwrap();
            prop_assert_eq!(by_plural.actual_name(), name.as_str());
        }
    }
}
