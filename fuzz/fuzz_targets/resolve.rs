#![no_main]

use libfuzzer_sys::fuzz_target;
use std::sync::{Arc, OnceLock};
use tablescope_core::{pluralize, singularize, CatalogSnapshot, StaticCatalog};

fn snapshot() -> &'static CatalogSnapshot {
    static SNAPSHOT: OnceLock<CatalogSnapshot> = OnceLock::new();
    SNAPSHOT.get_or_init(|| {
        let catalog = StaticCatalog::new()
            .with_default_schema("dbo")
            .with_table(Some("dbo"), "Customers")
            .with_table(Some("dbo"), "Order")
            .with_table(Some("sales"), "Order")
            .with_table(None, "People")
            .with_procedure(Some("dbo"), "GetCustomers");
        CatalogSnapshot::load(Arc::new(catalog), None).expect("static catalog loads")
    })
}

fuzz_target!(|data: &[u8]| {
    if let Ok(name) = std::str::from_utf8(data) {
        let snapshot = snapshot();
        let _ = snapshot.find_table(name);
        let _ = snapshot.find_procedure(name);
        let _ = snapshot.build_object_name(name);
        let _ = snapshot.relation_type(name, name);
        let _ = singularize(&pluralize(name));
    }
});
