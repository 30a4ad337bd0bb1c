use a2lfile::DataType;

/// The RECORD_LAYOUTs that are written into every file, in output order
const SCALAR_LAYOUT_TYPES: [DataType; 4] = [
    DataType::Ubyte,
    DataType::Sbyte,
    DataType::Uword,
    DataType::Sword,
];

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordLayoutInfo {
    pub(crate) name: String,
    pub(crate) fnc_values_type: DataType,
}

// A single value stored at the address of the CHARACTERISTIC, without any axis info
pub(crate) fn builtin_record_layouts() -> Vec<RecordLayoutInfo> {
    SCALAR_LAYOUT_TYPES
        .into_iter()
        .map(|datatype| RecordLayoutInfo {
            name: scalar_layout_name(&datatype.to_string()),
            fnc_values_type: datatype,
        })
        .collect()
}

/// Name of the RECORD_LAYOUT used by a scalar CHARACTERISTIC with the given datatype token.
/// The result is not guaranteed to be one of the built-in layouts.
pub(crate) fn scalar_layout_name(datatype: &str) -> String {
    format!("{datatype}_SCALAR")
}

pub(crate) fn is_builtin_layout(name: &str) -> bool {
    SCALAR_LAYOUT_TYPES
        .iter()
        .any(|datatype| scalar_layout_name(&datatype.to_string()) == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_layouts() {
        let layouts = builtin_record_layouts();
        let names: Vec<&str> = layouts.iter().map(|rl| rl.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["UBYTE_SCALAR", "SBYTE_SCALAR", "UWORD_SCALAR", "SWORD_SCALAR"]
        );
        assert_eq!(layouts[2].fnc_values_type, DataType::Uword);
    }

    #[test]
    fn derived_layout_names() {
        assert_eq!(scalar_layout_name("UWORD"), "UWORD_SCALAR");
        assert!(is_builtin_layout(&scalar_layout_name("SBYTE")));
        // there is no layout for 32 bit values
        assert!(!is_builtin_layout(&scalar_layout_name("ULONG")));
    }
}
