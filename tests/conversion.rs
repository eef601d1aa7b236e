use pretty_assertions::assert_eq;
use proptest::prelude::*;
use quantities::prelude::*;

fn dec(s: &str) -> Decimal {
    s.parse().expect("valid decimal")
}

struct Units {
    meter: Unit,
    second: Unit,
    kelvin: Unit,
    foot: Unit,
    centimeter: Unit,
    square_meter: Unit,
    square_foot: Unit,
    square_centimeter: Unit,
    fahrenheit: Unit,
}

fn units() -> Units {
    let length = base_dimension("Length");
    let meter = Unit::base("Meter", length.clone());
    let second = Unit::base("Second", base_dimension("Time"));
    let kelvin = Unit::base("Kelvin", base_dimension("Temperature"));
    let foot = Unit::conversion("Foot", equal(dec("0.3048"), &meter)).unwrap();
    let centimeter = centi(&meter);
    let area = power(&length, 2);

    Units {
        square_meter: Unit::composed("SquareMeter", area.clone(), vec![meter.clone()]).unwrap(),
        square_foot: Unit::composed("SquareFoot", area.clone(), vec![foot.clone()]).unwrap(),
        square_centimeter: Unit::composed("SquareCentimeter", area, vec![centimeter.clone()])
            .unwrap(),
        fahrenheit: conv(
            "Fahrenheit",
            &kelvin,
            &[
                (Operation::Subtract, dec("32")),
                (Operation::Multiply, dec("5")),
                (Operation::Divide, dec("9")),
                (Operation::Add, dec("273.15")),
            ],
        )
        .unwrap(),
        meter,
        second,
        kelvin,
        foot,
        centimeter,
    }
}

#[test]
fn test_reflexivity_at_any_depth() {
    let u = units();
    let mut deep = u.meter.clone();
    for _ in 0..20 {
        deep = kilo(&deep);
    }

    for unit in [&u.meter, &u.foot, &u.square_foot, &u.fahrenheit, &deep] {
        assert_eq!(convert(unit, unit).unwrap(), Decimal::from(1), "{}", unit);
    }
}

#[test]
fn test_algebra_equivalence() {
    let length = base_dimension("Length");
    let time = base_dimension("Time");
    assert_eq!(multiply(&length, &length), power(&length, 2));
    assert_eq!(divide(&length, &time), multiply(&length, &power(&time, -1)));
    assert_eq!(divide(&length, &length), dimensionless());
}

#[test]
fn test_incompatible_units_name_both_sides() {
    let u = units();
    let err = convert(&u.meter, &u.second).unwrap_err();
    assert!(matches!(err, ConvertError::IncompatibleDimensions { .. }));
    let message = err.to_string();
    assert!(message.contains("Meter"), "{}", message);
    assert!(message.contains("Second"), "{}", message);
}

#[test]
fn test_division_keeps_every_digit() {
    let u = units();
    let half = Unit::conversion("HalfMeter", Conversion::new(u.meter.clone(), Operation::Divide, 2))
        .unwrap();
    let value = Measurement::new(dec("22222222222222222222"), half);
    assert_eq!(
        convert(&value, &u.meter).unwrap().to_string(),
        "11111111111111111111"
    );
}

#[test]
fn test_affine_chain() {
    let u = units();
    let freezing = Measurement::new(32, u.fahrenheit.clone());
    let boiling = Measurement::new(212, u.fahrenheit.clone());
    assert_eq!(convert(&freezing, &u.kelvin).unwrap(), dec("273.15"));
    assert_eq!(convert(&boiling, &u.kelvin).unwrap(), dec("373.15"));
}

#[test]
fn test_composed_power() {
    let u = units();
    let to_square_feet = convert(&u.square_meter, &u.square_foot).unwrap();
    let expected = dec("10.76391041670972230833350555590000");
    assert!(
        (&to_square_feet - &expected).abs() < dec("1e-30"),
        "{}",
        to_square_feet
    );
    assert!((to_square_feet.to_f64() - 10.7639).abs() < 1e-4);

    assert_eq!(
        convert(&u.square_meter, &u.square_centimeter).unwrap().to_string(),
        "10000"
    );
}

#[test]
fn test_prefix_chaining() {
    let u = units();
    assert_eq!(
        convert(&kilo(&kilo(&u.meter)), &u.meter).unwrap(),
        dec("1e6")
    );
    assert_eq!(convert(&milli(&kilo(&u.meter)), &u.meter).unwrap(), dec("1"));
    assert_eq!(convert(&u.centimeter, &milli(&u.meter)).unwrap(), dec("10"));
}

#[test]
fn test_measurement_display_after_conversion() {
    let u = units();
    let length = Measurement::new(dec("12"), u.foot.clone());
    let converted = length.convert_to(&u.meter).unwrap();
    assert_eq!(converted.to_string(), "3.6576 Meter");
}

fn close(a: &Decimal, b: &Decimal) -> bool {
    let tolerance = &(&b.abs() * &dec("1e-30")) + &dec("1e-30");
    (a - b).abs() <= tolerance
}

fn arb_value() -> impl Strategy<Value = Decimal> {
    (-1_000_000_000i64..1_000_000_000, 0i64..8).prop_map(|(c, s)| Decimal::new(c, s))
}

proptest! {
    #[test]
    fn prop_round_trip(value in arb_value(), pair in 0usize..5) {
        let u = units();
        let (from, to) = match pair {
            0 => (&u.meter, &u.foot),
            1 => (&u.kelvin, &u.fahrenheit),
            2 => (&u.square_meter, &u.square_foot),
            3 => (&u.square_centimeter, &u.square_foot),
            _ => (&u.centimeter, &u.foot),
        };

        let there = convert(&Measurement::new(value.clone(), from.clone()), to).unwrap();
        let back = convert(&Measurement::new(there.clone(), to.clone()), from).unwrap();
        prop_assert!(close(&back, &value), "{} -> {} -> {}", value, there, back);
    }

    #[test]
    fn prop_exact_linear_conversions(value in arb_value()) {
        let u = units();
        let km = kilo(&u.meter);
        let in_meters = convert(&Measurement::new(value.clone(), km.clone()), &u.meter).unwrap();
        prop_assert_eq!(&in_meters, &(&value * &Decimal::from(1000)));
        let back = convert(&Measurement::new(in_meters, u.meter.clone()), &km).unwrap();
        prop_assert_eq!(back, value);
    }
}
