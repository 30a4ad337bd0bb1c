use chrono::NaiveDateTime;
use clap::{Arg, ArgAction, Command, builder::ValueParser};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

mod catalog;
mod clock;
mod config;
mod datatype;
mod error;
mod model;
mod record_layout;
mod validate;
mod writer;

use model::{DEFAULT_PROJECT_NAME, DEFAULT_VERSION, Session};

fn main() -> ExitCode {
    match core() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            println!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn core() -> Result<(), String> {
    let args = argfile::expand_args(argfile::parse_response, argfile::PREFIX)
        .map_err(|err| format!("Failed to expand response file: {err}"))?;
    let generated = run(args)?;
    if generated.out_path.is_none() {
        println!("{}", generated.a2l_text);
    }
    Ok(())
}

struct Generated {
    a2l_text: String,
    // None if the output was not written to a file
    out_path: Option<PathBuf>,
}

// Implement all the operations supported by a2lgen
// They will always be performed in this order:
//  1) create the session, with the standard catalog if requested
//  2) load config files
//  3) strict validation
//  4) render
//  5) check the rendered output with a2lfile
//  6) output
// Nothing is written if any step before the output fails.
fn run<I, T>(args: I) -> Result<Generated, String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let arg_matches = get_args().get_matches_from(args);

    let verbose = arg_matches.get_flag("VERBOSE");
    let strict = arg_matches.get_flag("STRICT");

    cond_print(
        verbose,
        &format!("\na2lgen {}\n\n", env!("CARGO_PKG_VERSION")),
    );

    // 1) create the session
    let project_name = arg_matches
        .get_one::<String>("PROJECT")
        .map_or(DEFAULT_PROJECT_NAME, String::as_str);
    let version = arg_matches
        .get_one::<String>("PROJECT_VERSION")
        .map_or(DEFAULT_VERSION, String::as_str);
    let mut session = if arg_matches.get_flag("STANDARD") {
        let session = catalog::standard_session(project_name, version);
        cond_print(
            verbose,
            &format!(
                "Standard catalog added: {} computation methods, {} measurements, {} characteristics\n",
                session.compu_methods.len(),
                session.measurements.len(),
                session.characteristics.len()
            ),
        );
        session
    } else {
        Session::new(project_name, version)
    };

    // 2) config files
    if let Some(config_files) = arg_matches.get_many::<OsString>("CONFIG") {
        for config_file in config_files {
            let now = Instant::now();
            let count = config::load_into_session(&PathBuf::from(config_file), &mut session)
                .map_err(|err| err.to_string())?;
            cond_print(
                verbose,
                &format!(
                    "Config \"{}\" loaded ({:?}): {count} items added\n",
                    config_file.to_string_lossy(),
                    now.elapsed()
                ),
            );
        }
    }

    // 3) strict validation
    if strict {
        validate::validate(&session).map_err(|err| err.to_string())?;
        cond_print(
            verbose,
            &format!("Validation passed for {} items\n", session.item_count()),
        );
    }

    // 4) render
    let now = Instant::now();
    let a2l_text = match arg_matches.get_one::<String>("TIMESTAMP") {
        Some(timestamp) => {
            let fixed_time = NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M")
                .map_err(|err| format!("Invalid timestamp \"{timestamp}\": {err}"))?;
            writer::render(&session, &clock::FixedClock(fixed_time))
        }
        None => writer::render(&session, &clock::SystemClock),
    };
    cond_print(
        verbose,
        &format!(
            "A2L text generated ({:?})\nSummary:\n{}",
            now.elapsed(),
            writer::block_summary(&a2l_text)
        ),
    );

    // 5) a2lfile check
    if arg_matches.get_flag("CHECK") {
        let log_msgs = validate::check_rendered(&a2l_text)
            .map_err(|err| format!("Generated output could not be parsed: {err}"))?;
        for msg in &log_msgs {
            println!("    {msg}");
        }
        if strict && !log_msgs.is_empty() {
            return Err(format!(
                "Generated output has {} consistency problem(s)",
                log_msgs.len()
            ));
        }
        cond_print(
            verbose,
            &format!("Output checked: {} message(s)\n", log_msgs.len()),
        );
    }

    // 6) output
    let out_filename = arg_matches
        .get_one::<OsString>("OUTPUT")
        .ok_or_else(|| "No output file given".to_string())?;
    let out_path = if out_filename == "-" {
        None
    } else {
        let now = Instant::now();
        let out_path = PathBuf::from(out_filename);
        writer::save(&a2l_text, &out_path).map_err(|err| err.to_string())?;
        println!("Generated A2L file: {}", out_path.display());
        cond_print(verbose, &format!("Output written ({:?})\n", now.elapsed()));
        Some(out_path)
    };

    cond_print(verbose, "\nRun complete. Have a nice day!\n\n");

    Ok(Generated { a2l_text, out_path })
}

// set up the entire command line handling.
fn get_args() -> Command {
    Command::new("a2lgen")
        .about("Generate A2L files for calibration and measurement tools")
        .max_term_width(120)
        .arg(
            Arg::new("OUTPUT")
                .help("Output A2L file path. Use \"-\" to write to stdout.")
                .short('o')
                .long("output")
                .num_args(1)
                .value_name("A2LFILE")
                .value_parser(ValueParser::os_string())
                .default_value("fome_ecu.a2l"),
        )
        .arg(
            Arg::new("CONFIG")
                .help("JSON config file with variable definitions.\nThe sections \"compu_methods\", \"measurements\" and \"characteristics\" are all optional.\nThis arg can be given multiple times; the files are loaded in order.")
                .short('c')
                .long("config")
                .num_args(1)
                .value_name("JSONFILE")
                .value_parser(ValueParser::os_string())
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("PROJECT")
                .help("Project name")
                .short('p')
                .long("project")
                .num_args(1)
                .value_name("NAME")
                .default_value(DEFAULT_PROJECT_NAME),
        )
        .arg(
            Arg::new("PROJECT_VERSION")
                .help("Version string written to HEADER and MOD_PAR")
                .long("project-version")
                .num_args(1)
                .value_name("VERSION")
                .default_value(DEFAULT_VERSION),
        )
        .arg(
            Arg::new("TIMESTAMP")
                .help("Use this time (format \"YYYY-MM-DD HH:MM\") in MOD_PAR instead of the current time.\nThis makes the output reproducible.")
                .long("timestamp")
                .num_args(1)
                .value_name("TIME"),
        )
        .arg(
            Arg::new("STANDARD")
                .help("Include the standard ECU variables. They are added before the content of any config files.")
                .short('s')
                .long("standard")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("STRICT")
                .help("Check all variables before generating the output. An error will be reported for duplicate names, unknown datatypes, missing conversions or record layouts and inverted limits.")
                .long("strict")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("CHECK")
                .help("Parse the generated output with a2lfile and display any problems it finds.\nIn combination with --strict any problem is an error.")
                .long("check")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("VERBOSE")
                .help("Display additional information")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue),
        )
}

fn cond_print(cond: bool, text: &str) {
    if cond {
        print!("{text}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_definition() {
        get_args().debug_assert();
    }

    #[test]
    fn arg_defaults() {
        let matches = get_args().get_matches_from(["a2lgen"]);
        assert_eq!(
            matches.get_one::<String>("PROJECT").map(String::as_str),
            Some("FOME_RX8_ECU")
        );
        assert_eq!(
            matches.get_one::<String>("PROJECT_VERSION").map(String::as_str),
            Some("1.0")
        );
        assert_eq!(
            matches.get_one::<OsString>("OUTPUT"),
            Some(&OsString::from("fome_ecu.a2l"))
        );
        assert!(!matches.get_flag("STANDARD"));
        assert!(matches.get_many::<OsString>("CONFIG").is_none());
    }

    #[test]
    fn multiple_configs() {
        let matches = get_args().get_matches_from([
            "a2lgen", "-s", "-c", "first.json", "--config", "second.json", "-o", "out.a2l",
            "--strict",
        ]);
        let configs: Vec<&OsString> = matches.get_many::<OsString>("CONFIG").unwrap().collect();
        assert_eq!(configs, vec!["first.json", "second.json"]);
        assert!(matches.get_flag("STANDARD"));
        assert!(matches.get_flag("STRICT"));
        assert!(!matches.get_flag("CHECK"));
    }

    #[test]
    fn run_to_stdout_with_fixed_timestamp() {
        let generated = run([
            "a2lgen", "-s", "-p", "TEST_PROJECT", "--timestamp", "2024-05-17 08:30", "-o", "-",
        ])
        .unwrap();
        assert!(generated.out_path.is_none());
        assert!(generated.a2l_text.contains("      USER \"Generated 2024-05-17 08:30\"\n"));
        assert!(generated.a2l_text.contains("/begin PROJECT TEST_PROJECT \"TEST_PROJECT\""));
        assert!(generated.a2l_text.contains("/begin MEASUREMENT engineRPM "));

        // the same arguments give the same output
        let second = run([
            "a2lgen", "-s", "-p", "TEST_PROJECT", "--timestamp", "2024-05-17 08:30", "-o", "-",
        ])
        .unwrap();
        assert_eq!(generated.a2l_text, second.a2l_text);
    }

    #[test]
    fn run_invalid_timestamp() {
        let result = run(["a2lgen", "--timestamp", "17.05.2024", "-o", "-"]);
        let Err(errmsg) = result else {
            panic!("an invalid timestamp must be rejected");
        };
        assert!(errmsg.starts_with("Invalid timestamp \"17.05.2024\""));
    }

    #[test]
    fn run_bad_config_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("out.a2l");
        let config_path = dir.path().join("missing.json");
        let result = run([
            OsString::from("a2lgen"),
            OsString::from("-s"),
            OsString::from("-c"),
            config_path.into_os_string(),
            OsString::from("-o"),
            out_path.clone().into_os_string(),
        ]);
        let Err(errmsg) = result else {
            panic!("loading a missing config file must fail");
        };
        assert!(errmsg.starts_with("Failed to read config file"));
        assert!(!out_path.exists());
    }

    #[test]
    fn run_strict_and_check_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("out.a2l");
        let generated = run([
            OsString::from("a2lgen"),
            OsString::from("-s"),
            OsString::from("--strict"),
            OsString::from("--check"),
            OsString::from("--timestamp"),
            OsString::from("2024-05-17 08:30"),
            OsString::from("-o"),
            out_path.clone().into_os_string(),
        ])
        .unwrap();
        assert_eq!(generated.out_path.as_deref(), Some(out_path.as_path()));
        let written = std::fs::read_to_string(&out_path).unwrap();
        assert_eq!(written, generated.a2l_text);
    }

    #[test]
    fn run_strict_rejects_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("out.a2l");
        let config_path = dir.path().join("config.json");
        std::fs::write(
            &config_path,
            r#"{"measurements": [{"name": "m1", "address": 16, "datatype": "UBYTE", "conversion": "CM_MISSING"}]}"#,
        )
        .unwrap();

        let args = [
            OsString::from("a2lgen"),
            OsString::from("-c"),
            config_path.into_os_string(),
            OsString::from("-o"),
            out_path.clone().into_os_string(),
        ];
        // without --strict the dangling reference is written as is
        let generated = run(args.clone()).unwrap();
        assert!(generated.a2l_text.contains("UBYTE CM_MISSING 1 0 0 100"));
        std::fs::remove_file(&out_path).unwrap();

        let mut strict_args = args.to_vec();
        strict_args.push(OsString::from("--strict"));
        let Err(errmsg) = run(strict_args) else {
            panic!("strict mode must reject the missing COMPU_METHOD");
        };
        assert!(errmsg.starts_with("Validation failed with 1 problem(s)"));
        assert!(!out_path.exists());
    }
}
