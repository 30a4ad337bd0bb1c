use a2lfile::DataType;

// map the datatype tokens of the generator input to a2l datatypes
// tokens are emitted verbatim, so only the exact A2L keywords are recognized
pub(crate) fn get_a2l_datatype(token: &str) -> Option<DataType> {
    match token {
        "UBYTE" => Some(DataType::Ubyte),
        "SBYTE" => Some(DataType::Sbyte),
        "UWORD" => Some(DataType::Uword),
        "SWORD" => Some(DataType::Sword),
        "ULONG" => Some(DataType::Ulong),
        "SLONG" => Some(DataType::Slong),
        "A_UINT64" => Some(DataType::AUint64),
        "A_INT64" => Some(DataType::AInt64),
        "FLOAT16_IEEE" => Some(DataType::Float16Ieee),
        "FLOAT32_IEEE" => Some(DataType::Float32Ieee),
        "FLOAT64_IEEE" => Some(DataType::Float64Ieee),
        _ => None,
    }
}
