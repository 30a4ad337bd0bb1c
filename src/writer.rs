use std::fmt::Write;
use std::path::Path;

use crate::clock::Clock;
use crate::error::GeneratorError;
use crate::model::{ComputationMethod, Session, Variable};
use crate::record_layout::{RecordLayoutInfo, builtin_record_layouts, scalar_layout_name};

const ASAP2_VERSION: &str = "ASAP2_VERSION 1 61";
const ADDR_EPK: u32 = 0x2000_0000;
const EPK: &str = "FOME ECU";
const CUSTOMER: &str = "Open Source";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

// Writes /begin and /end tags with stack discipline; the indentation follows the nesting depth
struct BlockWriter {
    output: String,
    open_blocks: Vec<&'static str>,
}

impl BlockWriter {
    fn new() -> Self {
        Self {
            output: String::new(),
            open_blocks: Vec::new(),
        }
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.open_blocks.len() {
            self.output.push_str("  ");
        }
        self.output.push_str(text);
        self.output.push('\n');
    }

    fn blank(&mut self) {
        self.output.push('\n');
    }

    fn begin(&mut self, tag: &'static str, args: &str) {
        if args.is_empty() {
            self.line(&format!("/begin {tag}"));
        } else {
            self.line(&format!("/begin {tag} {args}"));
        }
        self.open_blocks.push(tag);
    }

    fn end(&mut self) {
        if let Some(tag) = self.open_blocks.pop() {
            self.line(&format!("/end {tag}"));
        }
    }

    fn finish(mut self) -> String {
        while !self.open_blocks.is_empty() {
            self.end();
        }
        // lines are newline separated, there is no newline after the final /end PROJECT
        if self.output.ends_with('\n') {
            self.output.pop();
        }
        self.output
    }
}

/// Render the complete A2L file for the session
///
/// Rendering never fails. The content of the session is not checked, so names of
/// missing COMPU_METHODs or unknown datatypes are written exactly as they were given.
/// Quoted strings are escaped; text with `"`, `\` or control characters is the only
/// input for which the output differs from writing the strings raw.
pub(crate) fn render(session: &Session, clock: &dyn Clock) -> String {
    let project_name = &session.project_name;
    let mut writer = BlockWriter::new();

    writer.line(ASAP2_VERSION);
    writer.begin("PROJECT", &format!("{project_name} {}", quoted(project_name)));
    writer.blank();

    writer.begin("HEADER", &quoted(project_name));
    writer.line(&format!("VERSION {}", quoted(&session.version)));
    writer.line(&format!("PROJECT_NO {project_name}"));
    writer.end();
    writer.blank();

    writer.begin("MODULE", &format!("{project_name}_Module \"\""));
    writer.blank();

    write_mod_common(&mut writer);
    write_mod_par(&mut writer, session, clock);
    for compu_method in &session.compu_methods {
        write_compu_method(&mut writer, compu_method);
    }
    for record_layout in builtin_record_layouts() {
        write_record_layout(&mut writer, &record_layout);
    }
    for measurement in &session.measurements {
        write_measurement(&mut writer, measurement);
    }
    for characteristic in &session.characteristics {
        write_characteristic(&mut writer, characteristic);
    }

    writer.end(); // MODULE
    writer.blank();
    writer.end(); // PROJECT

    writer.finish()
}

fn write_mod_common(writer: &mut BlockWriter) {
    writer.begin("MOD_COMMON", "\"\"");
    writer.line("BYTE_ORDER MSB_LAST");
    writer.line("ALIGNMENT_BYTE 1");
    writer.line("ALIGNMENT_WORD 2");
    writer.line("ALIGNMENT_LONG 4");
    writer.end();
    writer.blank();
}

fn write_mod_par(writer: &mut BlockWriter, session: &Session, clock: &dyn Clock) {
    let generated = format!("Generated {}", clock.now().format(TIMESTAMP_FORMAT));
    writer.begin("MOD_PAR", "\"\"");
    writer.line(&format!("VERSION {}", quoted(&session.version)));
    writer.line(&format!("ADDR_EPK {}", format_address(ADDR_EPK)));
    writer.line(&format!("EPK {}", quoted(EPK)));
    writer.line(&format!("CUSTOMER {}", quoted(CUSTOMER)));
    writer.line(&format!("USER {}", quoted(&generated)));
    writer.end();
    writer.blank();
}

// The conversion is always declared as an identity RAT_FUNC. The actual formula is only
// carried as text in the FORMULA sub-block.
fn write_compu_method(writer: &mut BlockWriter, compu_method: &ComputationMethod) {
    writer.begin(
        "COMPU_METHOD",
        &format!("{} {}", compu_method.name, quoted(&compu_method.description)),
    );
    writer.line(&format!("RAT_FUNC \"%6.2\" {}", quoted(&compu_method.unit)));
    writer.line("COEFFS 0 1 0 0 0 1");
    writer.begin("FORMULA", "");
    writer.line(&quoted(&compu_method.formula));
    writer.end();
    writer.end();
    writer.blank();
}

fn write_record_layout(writer: &mut BlockWriter, record_layout: &RecordLayoutInfo) {
    writer.begin("RECORD_LAYOUT", &record_layout.name);
    writer.line(&format!(
        "FNC_VALUES 1 {} ROW_DIR DIRECT",
        record_layout.fnc_values_type
    ));
    writer.end();
    writer.blank();
}

fn write_measurement(writer: &mut BlockWriter, measurement: &Variable) {
    writer.begin(
        "MEASUREMENT",
        &format!("{} {}", measurement.name, quoted(&measurement.description)),
    );
    // resolution 1, accuracy 0
    writer.line(&format!(
        "{} {} 1 0 {} {}",
        measurement.datatype,
        measurement.conversion,
        format_number(measurement.lower_limit),
        format_number(measurement.upper_limit)
    ));
    writer.line(&format!("ECU_ADDRESS {}", format_address(measurement.address)));
    write_phys_unit(writer, &measurement.unit);
    writer.end();
    writer.blank();
}

fn write_characteristic(writer: &mut BlockWriter, characteristic: &Variable) {
    writer.begin(
        "CHARACTERISTIC",
        &format!("{} {}", characteristic.name, quoted(&characteristic.description)),
    );
    // max_diff is always 0
    writer.line(&format!(
        "VALUE {} {} 0 {} {} {}",
        format_address(characteristic.address),
        scalar_layout_name(&characteristic.datatype),
        characteristic.conversion,
        format_number(characteristic.lower_limit),
        format_number(characteristic.upper_limit)
    ));
    write_phys_unit(writer, &characteristic.unit);
    writer.end();
    writer.blank();
}

fn write_phys_unit(writer: &mut BlockWriter, unit: &str) {
    if !unit.is_empty() {
        writer.line(&format!("PHYS_UNIT {}", quoted(unit)));
    }
}

pub(crate) fn format_address(address: u32) -> String {
    format!("0x{address:08X}")
}

// integral values are written without a decimal point, e.g. "150" instead of "150.0"
pub(crate) fn format_number(value: f64) -> String {
    if value == 0.0 {
        // avoid "-0"
        "0".to_string()
    } else {
        format!("{value}")
    }
}

// wrap a string in double quotes. Quotes and backslashes inside the string are escaped,
// otherwise the string would end early and the rest of the file could not be parsed
fn quoted(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + 2);
    result.push('"');
    for c in text.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            _ => result.push(c),
        }
    }
    result.push('"');
    result
}

/// Write the rendered text to a file, replacing any previous content
pub(crate) fn save(a2l_text: &str, path: &Path) -> Result<(), GeneratorError> {
    std::fs::write(path, a2l_text).map_err(|source| GeneratorError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Counts how often each kind of block occurs in the output. Used for the summary in verbose mode.
pub(crate) fn block_summary(a2l_text: &str) -> String {
    let mut summary = String::new();
    for tag in ["COMPU_METHOD", "RECORD_LAYOUT", "MEASUREMENT", "CHARACTERISTIC"] {
        let pattern = format!("/begin {tag} ");
        let count = a2l_text.matches(&pattern).count();
        let _ = writeln!(summary, "   {}: {count}", tag.to_ascii_lowercase());
    }
    summary
}
