use std::sync::OnceLock;

use pretty_assertions::assert_eq;
use quantities::catalog::standard::{TIME, standard};
use quantities::prelude::*;

fn dec(s: &str) -> Decimal {
    s.parse().expect("valid decimal")
}

fn shift_catalog() -> &'static UnitCatalog {
    static SHIFTS: OnceLock<UnitCatalog> = OnceLock::new();
    SHIFTS.get_or_init(|| {
        let second = Unit::base("Second", base_dimension(TIME));
        let hour = sixty(&sixty(&second, "Minute"), "Hour");
        let shift = Unit::conversion("Shift", equal(8, &hour)).unwrap();
        let mut catalog = UnitCatalog::new();
        catalog.insert(&shift).unwrap();
        catalog
    })
}

#[test]
fn test_catalog_shared_between_threads() {
    let totals: Vec<Decimal> = std::thread::scope(|scope| {
        (1..=4)
            .map(|shifts| {
                scope.spawn(move || {
                    shift_catalog()
                        .convert_value(shifts, "Shift", "Minute")
                        .unwrap()
                })
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    assert_eq!(
        totals,
        vec![dec("480"), dec("960"), dec("1440"), dec("1920")]
    );
}

#[test]
fn test_real_world_storage() {
    let units = standard().unwrap();
    assert_eq!(
        units.convert_value(dec("4.7"), "Gigabyte", "Bit").unwrap(),
        dec("37600000000")
    );

    let ssd = units.convert_value(1, "Terabyte", "Tebibyte").unwrap();
    assert!((ssd.to_f64() - 0.909).abs() < 0.001, "{}", ssd);
}

#[test]
fn test_catalog_units_mix_with_local_definitions() {
    let units = standard().unwrap();
    let meter = units.get("Meter").unwrap();
    let furlong = Unit::conversion("Furlong", equal(dec("201.168"), meter)).unwrap();

    let mut extended = units.clone();
    extended.insert(&furlong).unwrap();
    assert_eq!(extended.len(), units.len() + 1);
    assert_eq!(extended.convert("Mile", "Furlong").unwrap(), dec("8"));
}

#[test]
fn test_unknown_unit_in_catalog() {
    let units = standard().unwrap();
    assert_eq!(
        units.convert("Parsec", "Meter"),
        Err(CatalogError::UnknownUnit("Parsec".to_string()))
    );
}
