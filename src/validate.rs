use fnv::FnvBuildHasher;
use indexmap::IndexMap;
use regex::Regex;
use std::collections::HashSet;

use crate::datatype::get_a2l_datatype;
use crate::error::GeneratorError;
use crate::model::{NO_COMPU_METHOD, Session, Variable};
use crate::record_layout::{is_builtin_layout, scalar_layout_name};

type FnvIndexMap<K, V> = IndexMap<K, V, FnvBuildHasher>;

/// Check the session for problems that would make the generated file unusable in
/// calibration tools. This check is optional: rendering does not depend on it.
pub(crate) fn check_session(session: &Session) -> Vec<String> {
    let mut log_msgs = Vec::new();
    // A2L identifiers; brackets and dots are allowed for array elements and struct members
    let ident_regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\[\]]*$").unwrap();

    if !ident_regex.is_match(&session.project_name) {
        log_msgs.push(format!(
            "PROJECT name \"{}\" is not a valid identifier",
            session.project_name
        ));
    }

    check_duplicates(
        session.compu_methods.iter().map(|cm| cm.name.as_str()),
        "COMPU_METHOD",
        &mut log_msgs,
    );
    check_duplicates(
        session.measurements.iter().map(|m| m.name.as_str()),
        "MEASUREMENT",
        &mut log_msgs,
    );
    check_duplicates(
        session.characteristics.iter().map(|c| c.name.as_str()),
        "CHARACTERISTIC",
        &mut log_msgs,
    );

    let compu_method_names: HashSet<&str> = session
        .compu_methods
        .iter()
        .map(|cm| cm.name.as_str())
        .collect();
    for compu_method in &session.compu_methods {
        if !ident_regex.is_match(&compu_method.name) {
            log_msgs.push(format!(
                "COMPU_METHOD name \"{}\" is not a valid identifier",
                compu_method.name
            ));
        }
    }

    for measurement in &session.measurements {
        check_variable(measurement, "MEASUREMENT", &compu_method_names, &ident_regex, &mut log_msgs);
    }
    for characteristic in &session.characteristics {
        check_variable(
            characteristic,
            "CHARACTERISTIC",
            &compu_method_names,
            &ident_regex,
            &mut log_msgs,
        );
        let record_layout = scalar_layout_name(&characteristic.datatype);
        if !is_builtin_layout(&record_layout) {
            log_msgs.push(format!(
                "CHARACTERISTIC {} references RECORD_LAYOUT {record_layout}, which is not defined",
                characteristic.name
            ));
        }
    }

    log_msgs
}

/// Like `check_session`, but any problem is an error
pub(crate) fn validate(session: &Session) -> Result<(), GeneratorError> {
    let log_msgs = check_session(session);
    if log_msgs.is_empty() {
        Ok(())
    } else {
        Err(GeneratorError::Validation(log_msgs))
    }
}

fn check_duplicates<'a>(
    names: impl Iterator<Item = &'a str>,
    blocktype: &str,
    log_msgs: &mut Vec<String>,
) {
    let mut name_count = FnvIndexMap::<&str, usize>::default();
    for name in names {
        *name_count.entry(name).or_insert(0) += 1;
    }
    for (name, count) in name_count {
        if count > 1 {
            log_msgs.push(format!("{blocktype} {name} is defined {count} times"));
        }
    }
}

fn check_variable(
    variable: &Variable,
    blocktype: &str,
    compu_method_names: &HashSet<&str>,
    ident_regex: &Regex,
    log_msgs: &mut Vec<String>,
) {
    let name = &variable.name;
    if !ident_regex.is_match(name) {
        log_msgs.push(format!("{blocktype} name \"{name}\" is not a valid identifier"));
    }
    if get_a2l_datatype(&variable.datatype).is_none() {
        log_msgs.push(format!(
            "{blocktype} {name} has unknown datatype \"{}\"",
            variable.datatype
        ));
    }
    if variable.conversion != NO_COMPU_METHOD
        && !compu_method_names.contains(variable.conversion.as_str())
    {
        log_msgs.push(format!(
            "{blocktype} {name} references COMPU_METHOD {}, which is not defined",
            variable.conversion
        ));
    }
    if variable.lower_limit > variable.upper_limit {
        log_msgs.push(format!(
            "{blocktype} {name}: lower limit {} is greater than upper limit {}",
            variable.lower_limit, variable.upper_limit
        ));
    }
}

/// Parse the generated text with a2lfile and run its consistency check on the result.
/// Returns the messages of both steps; parsing errors that prevent loading are returned as Err.
///
/// Every COMPU_METHOD is written as an identity RAT_FUNC that carries its formula as text
/// in a FORMULA block. a2lfile reports this combination for each COMPU_METHOD, so these
/// messages are left out.
pub(crate) fn check_rendered(a2l_text: &str) -> Result<Vec<String>, String> {
    let (a2l_file, load_msgs) =
        a2lfile::load_from_string(a2l_text, None, true).map_err(|err| err.to_string())?;
    let mut log_msgs: Vec<String> = load_msgs.iter().map(ToString::to_string).collect();
    log_msgs.extend(
        a2l_file
            .check()
            .iter()
            .map(ToString::to_string)
            .filter(|msg| !is_formula_text_message(msg)),
    );
    Ok(log_msgs)
}

fn is_formula_text_message(msg: &str) -> bool {
    msg.contains("RAT_FUNC must not have FORMULA")
}
