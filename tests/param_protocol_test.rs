//! Parameter declaration, validation and the missing-parameter protocol,
//! exercised through the public API the way a generator binary uses it.

use std::fs;
use std::io::Cursor;

use autotest::{
    parse_spec, parse_spec_table, AutotestError, ChoiceParam, FloatParam, IntegerParam,
    LineTransport, Mode, ParamSpec, Scope, ScopeConfig, SpecFormat, TreeGen,
};
use tempfile::tempdir;

fn batch_scope(values: &[(&str, &str)]) -> Scope {
    let mut config = ScopeConfig::default();
    for (name, value) in values {
        config.params.insert(name.to_string(), value.to_string());
    }
    Scope::new(config)
}

// === VALIDATION ===

#[test]
fn test_integer_param_in_and_out_of_bounds() {
    let mut scope = batch_scope(&[("n", "5")]);
    let n = IntegerParam::new(&mut scope, "n", 1, 100000).unwrap();
    assert_eq!(n.get(&mut scope).unwrap(), 5);

    let mut scope = batch_scope(&[("n", "200000")]);
    let n = IntegerParam::new(&mut scope, "n", 1, 100000).unwrap();
    match n.get(&mut scope) {
        Err(AutotestError::OutOfBounds { name, value, .. }) => {
            assert_eq!(name, "n");
            assert_eq!(value, "200000");
        }
        other => panic!("expected OutOfBounds, got {:?}", other),
    }
}

#[test]
fn test_bounds_are_checked_for_every_value() {
    for v in -5i64..=15 {
        let mut scope = batch_scope(&[("k", v.to_string().as_str())]);
        let k = IntegerParam::new(&mut scope, "k", 0, 10).unwrap();
        assert_eq!(k.get(&mut scope).is_ok(), (0..=10).contains(&v), "value {}", v);
    }

    for v in [-0.5, 0.0, 0.3, 1.0, 1.01, 7.5] {
        let mut scope = batch_scope(&[("p", v.to_string().as_str())]);
        let p = FloatParam::with_defaults(&mut scope, "p").unwrap();
        let result = p.get(&mut scope);
        if (0.0..=1.0).contains(&v) {
            assert_eq!(result.unwrap(), v);
        } else {
            assert!(matches!(result, Err(AutotestError::OutOfBounds { .. })));
        }
    }
}

#[test]
fn test_choice_membership() {
    let choices = ["path", "star", "caterpillar"];
    for value in ["path", "star", "caterpillar", "cycle", "Path", "", " star ", "path\n"] {
        let mut scope = batch_scope(&[("shape", value)]);
        let shape = ChoiceParam::new(&mut scope, "shape", &choices).unwrap();
        let result = shape.get(&mut scope);
        if choices.contains(&value) {
            assert_eq!(result.unwrap(), value);
        } else {
            assert!(matches!(result, Err(AutotestError::InvalidChoice { .. })));
        }
    }
}

#[test]
fn test_duplicate_registration_across_generators() {
    let mut scope = batch_scope(&[]);
    let _first = TreeGen::new(&mut scope).unwrap();
    assert!(matches!(
        TreeGen::new(&mut scope),
        Err(AutotestError::DuplicateParameter { .. })
    ));
}

// === BATCH MODE ===

#[test]
fn test_batch_missing_dumps_specs_then_fails() {
    let dir = tempdir().unwrap();
    let dump = dir.path().join("params.sexp");
    let config = ScopeConfig {
        spec_output: dump.clone(),
        ..ScopeConfig::default()
    };
    let mut scope = Scope::new(config);

    let _n = IntegerParam::new(&mut scope, "n", 1, 10).unwrap();
    let x = FloatParam::new(&mut scope, "x", -1.0, 1.0).unwrap();
    let _tree = TreeGen::new(&mut scope).unwrap();

    match x.get(&mut scope) {
        Err(AutotestError::MissingParameter { name, dump_path }) => {
            assert_eq!(name, "x");
            assert_eq!(dump_path, dump);
        }
        other => panic!("expected MissingParameter, got {:?}", other),
    }

    let text = fs::read_to_string(&dump).unwrap();
    let table = parse_spec_table(text.trim(), SpecFormat::SExpr).unwrap();
    assert_eq!(table.get("x"), Some(&ParamSpec::Float { min: -1.0, max: 1.0 }));
    // Declared but never read parameters are listed too.
    assert!(table.contains_key("n"));
    assert!(table.contains_key("tree/loga"));
    assert!(table.contains_key("tree/logb"));
    assert_eq!(table.len(), 4);
}

#[test]
fn test_batch_dump_in_json() {
    let dir = tempdir().unwrap();
    let dump = dir.path().join("params.json");
    let config = ScopeConfig {
        spec_output: dump.clone(),
        spec_format: SpecFormat::Json,
        ..ScopeConfig::default()
    };
    let mut scope = Scope::new(config);
    let mode = ChoiceParam::new(&mut scope, "mode", &["fast", "slow"]).unwrap();

    assert!(mode.get(&mut scope).is_err());
    let text = fs::read_to_string(&dump).unwrap();
    let table = parse_spec_table(text.trim(), SpecFormat::Json).unwrap();
    assert_eq!(
        table.get("mode"),
        Some(&ParamSpec::Choice {
            choices: vec!["fast".to_string(), "slow".to_string()]
        })
    );
}

#[test]
fn test_dump_path_from_arguments() {
    let dir = tempdir().unwrap();
    let dump = dir.path().join("override.sexp");
    let config = ScopeConfig::from_args(vec![
        "-Pn".to_string(),
        "3".to_string(),
        "-po".to_string(),
        dump.to_string_lossy().into_owned(),
    ])
    .unwrap();
    let mut scope = Scope::new(config);
    let n = IntegerParam::new(&mut scope, "n", 1, 10).unwrap();
    let s = IntegerParam::new(&mut scope, "s", 1, 10).unwrap();

    assert_eq!(n.get(&mut scope).unwrap(), 3);
    assert!(!dump.exists());
    assert!(s.get(&mut scope).is_err());
    assert!(dump.exists());
}

// === INTERACTIVE MODE ===

#[test]
fn test_interactive_request_and_store() {
    let config = ScopeConfig {
        mode: Mode::Interactive,
        ..ScopeConfig::default()
    };
    let transport = LineTransport::new(Cursor::new("7\n"), Vec::new());
    let mut scope = Scope::with_transport(config, Box::new(transport));

    let n = IntegerParam::new(&mut scope, "n", 1, 10).unwrap();
    assert_eq!(n.get(&mut scope).unwrap(), 7);
    // The answer was stored: the exhausted input is not touched again.
    assert_eq!(n.get(&mut scope).unwrap(), 7);
    assert_eq!(scope.registry().lookup_raw("n"), Some("7"));
}

#[test]
fn test_interactive_answer_is_validated() {
    let config = ScopeConfig {
        mode: Mode::Interactive,
        ..ScopeConfig::default()
    };
    let transport = LineTransport::new(Cursor::new("11\n"), Vec::new());
    let mut scope = Scope::with_transport(config, Box::new(transport));

    let n = IntegerParam::new(&mut scope, "n", 1, 10).unwrap();
    assert!(matches!(n.get(&mut scope), Err(AutotestError::OutOfBounds { .. })));
}

#[test]
fn test_interactive_closed_input() {
    let config = ScopeConfig {
        mode: Mode::Interactive,
        ..ScopeConfig::default()
    };
    let transport = LineTransport::new(Cursor::new(""), Vec::new());
    let mut scope = Scope::with_transport(config, Box::new(transport));

    let n = IntegerParam::new(&mut scope, "n", 1, 10).unwrap();
    assert!(matches!(
        n.get(&mut scope),
        Err(AutotestError::InteractiveInputClosed { .. })
    ));
}

#[test]
fn test_interactive_request_line_carries_spec() {
    use std::cell::RefCell;
    use std::io::Write;
    use std::rc::Rc;

    // Shared sink so the test can inspect what the scope wrote.
    #[derive(Clone, Default)]
    struct Sink(Rc<RefCell<Vec<u8>>>);

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().write(buf)
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let sink = Sink::default();
    let config = ScopeConfig {
        mode: Mode::Interactive,
        ..ScopeConfig::default()
    };
    let transport = LineTransport::new(Cursor::new("0.5 star\n"), sink.clone());
    let mut scope = Scope::with_transport(config, Box::new(transport));

    let p = FloatParam::with_defaults(&mut scope, "p").unwrap();
    let shape = ChoiceParam::new(&mut scope, "shape", &["path", "star"]).unwrap();
    assert_eq!(p.get(&mut scope).unwrap(), 0.5);
    assert_eq!(shape.get(&mut scope).unwrap(), "star");

    let written = String::from_utf8(sink.0.borrow().clone()).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 2);

    let mut parts = lines[0].splitn(3, ' ');
    assert_eq!(parts.next(), Some("TU_PARAM_REQ"));
    assert_eq!(parts.next(), Some("p"));
    let spec = parse_spec(parts.next().unwrap(), SpecFormat::SExpr).unwrap();
    assert_eq!(spec, ParamSpec::Float { min: 0.0, max: 1.0 });

    assert_eq!(lines[1], "TU_PARAM_REQ shape ((type choice) (choices (path star)))");
}
