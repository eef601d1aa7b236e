#![cfg(test)]

use crate::{
    dimension::{Dimension, base_dimension},
    units::Unit,
};

/// Route `log` output through the test harness. Safe to call repeatedly.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Base units shared by the unit tests.
pub struct Fixtures {
    pub length: Dimension,
    pub time: Dimension,
    pub mass: Dimension,
    pub meter: Unit,
    pub second: Unit,
    pub kilogram: Unit,
    pub kelvin: Unit,
    pub byte: Unit,
}

pub fn fixtures() -> Fixtures {
    let length = base_dimension("Length");
    let time = base_dimension("Time");
    let mass = base_dimension("Mass");

    Fixtures {
        meter: Unit::base("Meter", length.clone()),
        second: Unit::base("Second", time.clone()),
        kilogram: Unit::base("Kilogram", mass.clone()),
        kelvin: Unit::base("Kelvin", base_dimension("Temperature")),
        byte: Unit::base("Byte", base_dimension("Information")),
        length,
        time,
        mass,
    }
}
