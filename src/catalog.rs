use crate::model::{Session, Variable};

/// Build a session that contains the standard ECU catalog
pub(crate) fn standard_session(project_name: &str, version: &str) -> Session {
    let mut session = Session::new(project_name, version);
    load_standard_catalog(&mut session);
    session
}

/// Add the standard ECU signals to the session: engine, temperatures, throttle, pressures,
/// fuel trims, knock and boost control, plus a handful of calibration parameters
pub(crate) fn load_standard_catalog(session: &mut Session) {
    // Computation methods
    session.register_computation_method("CM_RPM", "X*0.25", "rpm", "RPM conversion");
    session.register_computation_method("CM_TEMP", "X*0.1-40", "degC", "Temperature conversion");
    session.register_computation_method("CM_TPS", "X*0.5", "%", "Throttle position conversion");
    session.register_computation_method("CM_AFR", "X*0.1", "AFR", "Air-fuel ratio");
    session.register_computation_method("CM_MAP", "X*0.1", "kPa", "Manifold pressure");
    session.register_computation_method("CM_TIMING", "X*0.5-20", "deg", "Ignition timing");
    session.register_computation_method("CM_VOLTAGE", "X*0.01", "V", "Voltage conversion");
    session.register_computation_method("CM_SPEED", "X", "km/h", "Vehicle speed");
    session.register_computation_method("CM_PRESSURE", "X*0.1", "kPa", "Pressure");

    let measurements = [
        // Engine
        ("engineRPM", 0x2000_1000, "UWORD", "Engine speed", "rpm", 0.0, 10000.0, Some("CM_RPM")),
        ("coolantTemp", 0x2000_1002, "SWORD", "Coolant temperature", "degC", -40.0, 150.0, Some("CM_TEMP")),
        ("intakeTemp", 0x2000_1004, "SWORD", "Intake air temperature", "degC", -40.0, 150.0, Some("CM_TEMP")),
        ("throttlePosition", 0x2000_1006, "UBYTE", "Throttle position sensor", "%", 0.0, 100.0, Some("CM_TPS")),
        ("manifoldPressure", 0x2000_1007, "UWORD", "Manifold absolute pressure", "kPa", 0.0, 300.0, Some("CM_MAP")),
        ("airFuelRatio", 0x2000_1009, "UWORD", "Measured air-fuel ratio", "AFR", 10.0, 20.0, Some("CM_AFR")),
        ("ignitionTiming", 0x2000_100B, "SBYTE", "Current ignition timing", "deg", -20.0, 60.0, Some("CM_TIMING")),
        ("batteryVoltage", 0x2000_100C, "UWORD", "Battery voltage", "V", 0.0, 20.0, Some("CM_VOLTAGE")),
        ("vehicleSpeed", 0x2000_100E, "UWORD", "Vehicle speed", "km/h", 0.0, 300.0, Some("CM_SPEED")),
        ("oilPressure", 0x2000_1010, "UWORD", "Engine oil pressure", "kPa", 0.0, 1000.0, Some("CM_PRESSURE")),
        // Fuel control
        ("shortTermFuelTrim", 0x2000_1020, "SBYTE", "Short term fuel trim", "%", -25.0, 25.0, None),
        ("longTermFuelTrim", 0x2000_1021, "SBYTE", "Long term fuel trim", "%", -25.0, 25.0, None),
        ("injectorPulseWidth", 0x2000_1022, "UWORD", "Injector pulse width", "us", 0.0, 20000.0, None),
        ("fuelPressure", 0x2000_1024, "UWORD", "Fuel rail pressure", "kPa", 0.0, 600.0, Some("CM_PRESSURE")),
        // Knock control
        ("knockRetard", 0x2000_1030, "UBYTE", "Knock retard", "deg", 0.0, 20.0, None),
        ("knockLevel", 0x2000_1031, "UBYTE", "Knock sensor level", "counts", 0.0, 255.0, None),
        // Boost control
        ("boostPressure", 0x2000_1040, "UWORD", "Boost pressure", "kPa", 0.0, 300.0, Some("CM_MAP")),
        ("boostTarget", 0x2000_1042, "UWORD", "Boost target", "kPa", 0.0, 300.0, Some("CM_MAP")),
        ("wastegatePosition", 0x2000_1044, "UBYTE", "Wastegate position", "%", 0.0, 100.0, None),
    ];
    for (name, address, datatype, description, unit, lower, upper, conversion) in measurements {
        session.register_measurement(catalog_variable(
            name, address, datatype, description, unit, lower, upper, conversion,
        ));
    }

    let characteristics = [
        ("idleRPMTarget", 0x2000_2000, "UWORD", "Target idle RPM", "rpm", 500.0, 2000.0, Some("CM_RPM")),
        ("fuelMapBaseValue", 0x2000_2002, "UWORD", "Base fuel map value", "ms", 0.0, 20.0, None),
        ("ignitionMapBaseValue", 0x2000_2004, "SBYTE", "Base ignition timing", "deg", -20.0, 60.0, Some("CM_TIMING")),
        ("boostTargetMax", 0x2000_2005, "UWORD", "Maximum boost target", "kPa", 0.0, 300.0, Some("CM_MAP")),
        ("revLimit", 0x2000_2007, "UWORD", "Engine rev limit", "rpm", 0.0, 12000.0, Some("CM_RPM")),
        ("launchRPM", 0x2000_2009, "UWORD", "Launch control RPM", "rpm", 2000.0, 6000.0, Some("CM_RPM")),
        ("tractionSlipTarget", 0x2000_200B, "UBYTE", "Traction control slip target", "%", 0.0, 30.0, None),
    ];
    for (name, address, datatype, description, unit, lower, upper, conversion) in characteristics {
        session.register_characteristic(catalog_variable(
            name, address, datatype, description, unit, lower, upper, conversion,
        ));
    }
}

#[allow(clippy::too_many_arguments)]
fn catalog_variable(
    name: &str,
    address: u32,
    datatype: &str,
    description: &str,
    unit: &str,
    lower_limit: f64,
    upper_limit: f64,
    conversion: Option<&str>,
) -> Variable {
    let variable = Variable::new(name, address, datatype)
        .with_description(description)
        .with_unit(unit)
        .with_limits(lower_limit, upper_limit);
    match conversion {
        Some(conversion) => variable.with_conversion(conversion),
        None => variable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NO_COMPU_METHOD;

    #[test]
    fn catalog_content() {
        let session = standard_session("TEST_PROJECT", "1.0");
        assert_eq!(session.project_name, "TEST_PROJECT");
        assert_eq!(session.compu_methods.len(), 9);
        assert_eq!(session.measurements.len(), 19);
        assert_eq!(session.characteristics.len(), 7);

        let engine_rpm = &session.measurements[0];
        assert_eq!(engine_rpm.name, "engineRPM");
        assert_eq!(engine_rpm.address, 0x20001000);
        assert_eq!(engine_rpm.datatype, "UWORD");
        assert_eq!(engine_rpm.conversion, "CM_RPM");
        assert_eq!(engine_rpm.upper_limit, 10000.0);

        let knock_level = session
            .measurements
            .iter()
            .find(|m| m.name == "knockLevel")
            .unwrap();
        assert_eq!(knock_level.conversion, NO_COMPU_METHOD);
        assert_eq!(knock_level.unit, "counts");

        let rev_limit = session
            .characteristics
            .iter()
            .find(|c| c.name == "revLimit")
            .unwrap();
        assert_eq!(rev_limit.address, 0x20002007);
        assert_eq!(rev_limit.upper_limit, 12000.0);
    }

    #[test]
    fn catalog_is_deterministic() {
        let first = standard_session("A", "1.0");
        let second = standard_session("A", "1.0");
        assert_eq!(first, second);
    }

    #[test]
    fn catalog_appends() {
        let mut session = Session::default();
        session.register_measurement(Variable::new("custom", 0x100, "UBYTE"));
        load_standard_catalog(&mut session);
        assert_eq!(session.measurements[0].name, "custom");
        assert_eq!(session.measurements.len(), 20);
    }
}
