/// Conversion reference used by variables that are stored in physical units already
pub(crate) const NO_COMPU_METHOD: &str = "NO_COMPU_METHOD";

pub(crate) const DEFAULT_PROJECT_NAME: &str = "FOME_RX8_ECU";
pub(crate) const DEFAULT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ComputationMethod {
    pub(crate) name: String,
    pub(crate) formula: String,
    pub(crate) unit: String,
    pub(crate) description: String,
}

/// A variable in ECU memory, either a MEASUREMENT or a CHARACTERISTIC
///
/// Both kinds share the same attributes; the only difference is the block they are
/// rendered into. For a CHARACTERISTIC the record layout is derived from the datatype.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Variable {
    pub(crate) name: String,
    pub(crate) address: u32,
    pub(crate) datatype: String,
    pub(crate) description: String,
    pub(crate) unit: String,
    pub(crate) lower_limit: f64,
    pub(crate) upper_limit: f64,
    pub(crate) conversion: String,
}

impl Variable {
    /// create a new variable; all optional attributes get their default values
    pub(crate) fn new(name: &str, address: u32, datatype: &str) -> Self {
        Self {
            name: name.to_string(),
            address,
            datatype: datatype.to_string(),
            description: String::new(),
            unit: String::new(),
            lower_limit: 0.0,
            upper_limit: 100.0,
            conversion: NO_COMPU_METHOD.to_string(),
        }
    }

    pub(crate) fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub(crate) fn with_unit(mut self, unit: &str) -> Self {
        self.unit = unit.to_string();
        self
    }

    pub(crate) fn with_limits(mut self, lower_limit: f64, upper_limit: f64) -> Self {
        self.lower_limit = lower_limit;
        self.upper_limit = upper_limit;
        self
    }

    pub(crate) fn with_conversion(mut self, conversion: &str) -> Self {
        self.conversion = conversion.to_string();
        self
    }
}

/// Everything that goes into one generated A2L file
///
/// Registration never validates anything: duplicate names, unknown datatypes and
/// references to missing conversions are stored as given and show up in the output.
/// Use `validate::check_session` to find these problems.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Session {
    pub(crate) project_name: String,
    pub(crate) version: String,
    pub(crate) compu_methods: Vec<ComputationMethod>,
    pub(crate) measurements: Vec<Variable>,
    pub(crate) characteristics: Vec<Variable>,
}

impl Session {
    pub(crate) fn new(project_name: &str, version: &str) -> Self {
        Self {
            project_name: project_name.to_string(),
            version: version.to_string(),
            compu_methods: Vec::new(),
            measurements: Vec::new(),
            characteristics: Vec::new(),
        }
    }

    pub(crate) fn register_computation_method(
        &mut self,
        name: &str,
        formula: &str,
        unit: &str,
        description: &str,
    ) {
        self.compu_methods.push(ComputationMethod {
            name: name.to_string(),
            formula: formula.to_string(),
            unit: unit.to_string(),
            description: description.to_string(),
        });
    }

    pub(crate) fn register_measurement(&mut self, measurement: Variable) {
        self.measurements.push(measurement);
    }

    pub(crate) fn register_characteristic(&mut self, characteristic: Variable) {
        self.characteristics.push(characteristic);
    }

    pub(crate) fn item_count(&self) -> usize {
        self.compu_methods.len() + self.measurements.len() + self.characteristics.len()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_PROJECT_NAME, DEFAULT_VERSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_defaults() {
        let var = Variable::new("testVar", 0xDEADBEEF, "ULONG");
        assert_eq!(var.description, "");
        assert_eq!(var.unit, "");
        assert_eq!(var.lower_limit, 0.0);
        assert_eq!(var.upper_limit, 100.0);
        assert_eq!(var.conversion, NO_COMPU_METHOD);
    }

    #[test]
    fn registration_keeps_order_and_duplicates() {
        let mut session = Session::default();
        assert_eq!(session.project_name, "FOME_RX8_ECU");
        assert_eq!(session.version, "1.0");

        session.register_computation_method("CM_A", "X*2", "units", "");
        session.register_computation_method("CM_A", "X*3", "units", "second definition");
        session.register_measurement(Variable::new("second", 0x1000, "UWORD"));
        session.register_measurement(Variable::new("first", 0x0FFF, "UBYTE"));
        session.register_characteristic(
            Variable::new("param", 0x2000, "SWORD")
                .with_description("Parameter")
                .with_unit("deg")
                .with_limits(-20.0, 60.0)
                .with_conversion("CM_A"),
        );

        assert_eq!(session.compu_methods.len(), 2);
        assert_eq!(session.compu_methods[1].formula, "X*3");
        assert_eq!(session.measurements[0].name, "second");
        assert_eq!(session.measurements[1].name, "first");
        let param = &session.characteristics[0];
        assert_eq!(param.unit, "deg");
        assert_eq!(param.lower_limit, -20.0);
        assert_eq!(param.conversion, "CM_A");
        assert_eq!(session.item_count(), 5);
    }
}
