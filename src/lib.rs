//! Units of measure with exact dimension bookkeeping and high-precision
//! conversion.
//!
//! ```rust
//! use quantities::prelude::*;
//!
//! let length = base_dimension("Length");
//! let time = base_dimension("Time");
//! let meter = Unit::base("Meter", length.clone());
//! let second = Unit::base("Second", time.clone());
//! let hour = sixty(&sixty(&second, "Minute"), "Hour");
//!
//! let speed = divide(&length, &time);
//! let mps = Unit::composed("MeterPerSecond", speed.clone(), vec![meter.clone(), second]).unwrap();
//! let kph = Unit::composed("KilometerPerHour", speed, vec![kilo(&meter), hour]).unwrap();
//!
//! assert_eq!(convert(&mps, &kph).unwrap().to_string(), "3.6");
//! ```

pub mod catalog;
pub mod convert;
pub mod dimension;
pub mod measurement;
pub mod numeric;
pub mod units;

mod test_utils;

pub use crate::catalog::{CatalogError, UnitCatalog};
pub use crate::convert::{ConvertError, ConvertOptions, convert, convert_with};
pub use crate::dimension::{Dimension, Exponent};
pub use crate::measurement::Measurement;
pub use crate::numeric::{Decimal, MathContext};
pub use crate::units::{Conversion, Operation, Unit, UnitError};

/// Everything needed to declare units and convert between them.
pub mod prelude {
    pub use crate::catalog::{CatalogError, UnitCatalog, standard::standard};
    pub use crate::convert::{
        ConvertError, ConvertOptions, OperationChain, Source, Step, convert, convert_with, resolve,
    };
    pub use crate::dimension::{
        Dimension, Exponent, base_dimension, dimensionless, divide, invert, multiply, power,
    };
    pub use crate::measurement::Measurement;
    pub use crate::numeric::{Decimal, MathContext};
    pub use crate::units::{
        Conversion, Operation, Unit, UnitError, base_unit, compatible, composed_unit,
        conversion_unit, dimension_of,
        prefixes::{
            binary_prefixes, centi, conv, deci, equal, kilo, mega, metric_prefixes, micro, milli,
            sixty, subtract, sum,
        },
    };
}
