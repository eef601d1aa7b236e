//! A ready-made catalog: the SI base units with common derived, imperial,
//! calendar, temperature and digital units.
//!
//! ```rust
//! use quantities::catalog::standard::standard;
//!
//! let units = standard().unwrap();
//! assert_eq!(units.convert("MeterPerSecond", "KilometerPerHour").unwrap().to_string(), "3.6");
//! assert_eq!(units.convert("Gibibyte", "Mebibyte").unwrap().to_string(), "1024");
//! ```

use std::sync::OnceLock;

use crate::{
    dimension::{Dimension, base_dimension},
    numeric::Decimal,
    units::{
        Operation, Unit, UnitError,
        prefixes::{
            binary_prefixes, centi, conv, equal, exa, giga, kilo, mega, micro, milli, nano, peta,
            pico, sixty, sum, tera,
        },
    },
};

use super::{CatalogError, UnitCatalog};

pub const LENGTH: &str = "Length";
pub const MASS: &str = "Mass";
pub const TIME: &str = "Time";
pub const ELECTRIC_CURRENT: &str = "ElectricCurrent";
pub const TEMPERATURE: &str = "Temperature";
pub const AMOUNT_OF_SUBSTANCE: &str = "AmountOfSubstance";
pub const LUMINOUS_INTENSITY: &str = "LuminousIntensity";
pub const INFORMATION: &str = "Information";

/// The shared standard catalog, built on first use.
pub fn standard() -> Result<&'static UnitCatalog, CatalogError> {
    static STANDARD: OnceLock<Result<UnitCatalog, CatalogError>> = OnceLock::new();
    STANDARD
        .get_or_init(standard_catalog)
        .as_ref()
        .map_err(Clone::clone)
}

fn dim(exponents: &[(&str, i64)]) -> Dimension {
    Dimension::from_exponents(exponents.iter().copied())
}

/// Builds a fresh copy of the standard catalog.
pub fn standard_catalog() -> Result<UnitCatalog, CatalogError> {
    let mut catalog = UnitCatalog::new();
    let invalid = |source: UnitError| CatalogError::InvalidUnit {
        name: "standard catalog".to_string(),
        source,
    };

    // SI base units
    let meter = Unit::base("Meter", base_dimension(LENGTH));
    let kilogram = Unit::base("Kilogram", base_dimension(MASS));
    let second = Unit::base("Second", base_dimension(TIME));
    let ampere = Unit::base("Ampere", base_dimension(ELECTRIC_CURRENT));
    let kelvin = Unit::base("Kelvin", base_dimension(TEMPERATURE));
    let mole = Unit::base("Mole", base_dimension(AMOUNT_OF_SUBSTANCE));
    let candela = Unit::base("Candela", base_dimension(LUMINOUS_INTENSITY));
    catalog.insert_all([&meter, &kilogram, &second, &ampere, &kelvin, &mole, &candela])?;

    // Length
    let kilometer = kilo(&meter);
    let centimeter = centi(&meter);
    let foot = Unit::conversion("Foot", equal(Decimal::new(3048, 4), &meter)).map_err(invalid)?;
    let mile = Unit::conversion("Mile", equal(Decimal::new(1609344, 3), &meter)).map_err(invalid)?;
    let nautical_mile = Unit::conversion("NauticalMile", equal(1852, &meter)).map_err(invalid)?;
    let length = [
        kilometer.clone(),
        centimeter.clone(),
        milli(&meter),
        micro(&meter),
        nano(&meter),
        Unit::conversion("Inch", equal(Decimal::new(254, 4), &meter)).map_err(invalid)?,
        foot.clone(),
        Unit::conversion("Yard", equal(Decimal::new(9144, 4), &meter)).map_err(invalid)?,
        mile.clone(),
        nautical_mile.clone(),
        Unit::conversion("LightYear", equal(9_460_730_472_580_800u64, &meter)).map_err(invalid)?,
    ];
    catalog.insert_all(&length)?;

    // Mass
    let gram = Unit::conversion("Gram", equal(Decimal::new(1, 3), &kilogram)).map_err(invalid)?;
    let mass = [
        milli(&gram),
        Unit::conversion("Tonne", equal(1000, &kilogram)).map_err(invalid)?,
        Unit::conversion("Pound", equal(Decimal::new(45_359_237, 8), &kilogram)).map_err(invalid)?,
        Unit::conversion("Ounce", equal(Decimal::new(28_349_523_125i64, 12), &kilogram))
            .map_err(invalid)?,
    ];
    catalog.insert(&gram)?;
    catalog.insert_all(&mass)?;

    // Time
    let minute = sixty(&second, "Minute");
    let hour = sixty(&minute, "Hour");
    let day = Unit::conversion("Day", equal(24, &hour)).map_err(invalid)?;
    let year = Unit::conversion("Year", equal(365, &day)).map_err(invalid)?;
    let time = [
        milli(&second),
        micro(&second),
        nano(&second),
        pico(&second),
        Unit::conversion("Week", equal(7, &day)).map_err(invalid)?,
        Unit::conversion("Fortnight", equal(14, &day)).map_err(invalid)?,
        Unit::conversion("Month", equal(30, &day)).map_err(invalid)?,
        Unit::conversion("JulianYear", equal(Decimal::new(36525, 2), &day)).map_err(invalid)?,
        Unit::conversion("Decade", equal(10, &year)).map_err(invalid)?,
        Unit::conversion("Century", equal(100, &year)).map_err(invalid)?,
        Unit::conversion("Millennium", equal(1000, &year)).map_err(invalid)?,
    ];
    catalog.insert_all([&minute, &hour, &day, &year])?;
    catalog.insert_all(&time)?;

    // Temperature
    let celsius = Unit::conversion("Celsius", sum(&kelvin, Decimal::new(27315, 2))).map_err(invalid)?;
    let fahrenheit = conv(
        "Fahrenheit",
        &kelvin,
        &[
            (Operation::Subtract, Decimal::from(32)),
            (Operation::Multiply, Decimal::from(5)),
            (Operation::Divide, Decimal::from(9)),
            (Operation::Add, Decimal::new(27315, 2)),
        ],
    )
    .map_err(invalid)?;
    catalog.insert_all([&celsius, &fahrenheit])?;

    // Area and volume
    let area = dim(&[(LENGTH, 2)]);
    let volume = dim(&[(LENGTH, 3)]);
    let square_meter =
        Unit::composed("SquareMeter", area.clone(), vec![meter.clone()]).map_err(invalid)?;
    let cubic_meter =
        Unit::composed("CubicMeter", volume.clone(), vec![meter.clone()]).map_err(invalid)?;
    let liter = Unit::conversion("Liter", equal(Decimal::new(1, 3), &cubic_meter)).map_err(invalid)?;
    let spatial = [
        Unit::composed("SquareKilometer", area.clone(), vec![kilometer.clone()]).map_err(invalid)?,
        Unit::composed("SquareCentimeter", area.clone(), vec![centimeter.clone()])
            .map_err(invalid)?,
        Unit::composed("SquareFoot", area, vec![foot.clone()]).map_err(invalid)?,
        Unit::conversion("Hectare", equal(10_000, &square_meter)).map_err(invalid)?,
        Unit::conversion("Acre", equal(Decimal::new(40_468_564_224i64, 7), &square_meter))
            .map_err(invalid)?,
        Unit::composed("CubicCentimeter", volume, vec![centimeter.clone()]).map_err(invalid)?,
        milli(&liter),
    ];
    catalog.insert_all([&square_meter, &cubic_meter, &liter])?;
    catalog.insert_all(&spatial)?;

    // Mechanics
    let speed = dim(&[(LENGTH, 1), (TIME, -1)]);
    let force = dim(&[(LENGTH, 1), (MASS, 1), (TIME, -2)]);
    let energy = dim(&[(LENGTH, 2), (MASS, 1), (TIME, -2)]);
    let joule = Unit::composed(
        "Joule",
        energy,
        vec![meter.clone(), kilogram.clone(), second.clone()],
    )
    .map_err(invalid)?;
    let mechanics = [
        Unit::composed("MeterPerSecond", speed.clone(), vec![meter.clone(), second.clone()])
            .map_err(invalid)?,
        Unit::composed("KilometerPerHour", speed.clone(), vec![kilometer, hour.clone()])
            .map_err(invalid)?,
        Unit::composed("MilePerHour", speed.clone(), vec![mile, hour.clone()]).map_err(invalid)?,
        Unit::composed("Knot", speed, vec![nautical_mile, hour.clone()]).map_err(invalid)?,
        Unit::composed(
            "MeterPerSecondSquared",
            dim(&[(LENGTH, 1), (TIME, -2)]),
            vec![meter.clone(), second.clone()],
        )
        .map_err(invalid)?,
        Unit::composed("Hertz", dim(&[(TIME, -1)]), vec![second.clone()]).map_err(invalid)?,
        Unit::composed(
            "Newton",
            force,
            vec![meter.clone(), kilogram.clone(), second.clone()],
        )
        .map_err(invalid)?,
        Unit::composed(
            "Pascal",
            dim(&[(LENGTH, -1), (MASS, 1), (TIME, -2)]),
            vec![meter.clone(), kilogram.clone(), second.clone()],
        )
        .map_err(invalid)?,
        Unit::composed(
            "Watt",
            dim(&[(LENGTH, 2), (MASS, 1), (TIME, -3)]),
            vec![meter.clone(), kilogram.clone(), second.clone()],
        )
        .map_err(invalid)?,
        kilo(&joule),
        Unit::conversion("Calorie", equal(Decimal::new(4184, 3), &joule)).map_err(invalid)?,
        Unit::conversion("KilowattHour", equal(3_600_000, &joule)).map_err(invalid)?,
        Unit::composed(
            "Coulomb",
            dim(&[(ELECTRIC_CURRENT, 1), (TIME, 1)]),
            vec![ampere.clone(), second.clone()],
        )
        .map_err(invalid)?,
    ];
    catalog.insert(&joule)?;
    catalog.insert_all(&mechanics)?;

    // Digital
    let bit = Unit::base("Bit", base_dimension(INFORMATION));
    let trit = Unit::base("Trit", base_dimension(INFORMATION));
    let byte = Unit::conversion("Byte", equal(8, &bit)).map_err(invalid)?;
    let tryte = Unit::conversion("Tryte", equal(6, &trit)).map_err(invalid)?;
    let bandwidth = dim(&[(INFORMATION, 1), (TIME, -1)]);
    let mut digital = vec![
        kilo(&byte),
        mega(&byte),
        giga(&byte),
        tera(&byte),
        peta(&byte),
        exa(&byte),
        kilo(&tryte),
        mega(&tryte),
        Unit::composed("BitPerSecond", bandwidth.clone(), vec![bit.clone(), second.clone()])
            .map_err(invalid)?,
        Unit::composed("KilobitPerSecond", bandwidth.clone(), vec![kilo(&bit), second.clone()])
            .map_err(invalid)?,
        Unit::composed("MegabitPerSecond", bandwidth, vec![mega(&bit), second])
            .map_err(invalid)?,
    ];
    digital.extend(binary_prefixes(&byte));
    catalog.insert_all([&bit, &trit, &byte, &tryte])?;
    catalog.insert_all(&digital)?;

    catalog.validate()?;
    Ok(catalog)
}
