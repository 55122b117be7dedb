//! Gateway behavior that does not depend on a real store.

use std::cell::RefCell;
use std::rc::Rc;

use regex::Regex;
use student_records::{
    Gateway, GatewayResult, Student, StudentBackend, ValidationError, ValidationRules,
};
use student_records::GatewayError;

/// Records every call that reaches the backend.
#[derive(Clone, Default)]
struct Recorder {
    calls: Rc<RefCell<Vec<String>>>,
}

impl Recorder {
    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl StudentBackend for Recorder {
    fn ensure_schema(&self) -> GatewayResult<()> {
        self.calls.borrow_mut().push("ensure_schema".into());
        Ok(())
    }

    fn list_all(&self) -> GatewayResult<Vec<Student>> {
        self.calls.borrow_mut().push("list_all".into());
        Ok(Vec::new())
    }

    fn insert(&self, name: &str, course: &str, mobile: &str) -> GatewayResult<()> {
        self.calls
            .borrow_mut()
            .push(format!("insert {name}|{course}|{mobile}"));
        Ok(())
    }

    fn update(&self, id: i64, name: &str, course: &str, mobile: &str) -> GatewayResult<u64> {
        self.calls
            .borrow_mut()
            .push(format!("update {id} {name}|{course}|{mobile}"));
        Ok(0)
    }

    fn delete(&self, id: i64) -> GatewayResult<u64> {
        self.calls.borrow_mut().push(format!("delete {id}"));
        Ok(0)
    }

    fn find_by_name(&self, name: &str) -> GatewayResult<Vec<Student>> {
        self.calls.borrow_mut().push(format!("find {name}"));
        Ok(Vec::new())
    }

    fn describe(&self) -> String {
        "recorder".into()
    }
}

fn gateway(rules: ValidationRules) -> (Recorder, Gateway) {
    let recorder = Recorder::default();
    let gateway = Gateway::with_backend(Box::new(recorder.clone()), rules).unwrap();
    (recorder, gateway)
}

#[test]
fn opening_bootstraps_the_schema_once() {
    let (recorder, gateway) = gateway(ValidationRules::default());
    assert_eq!(recorder.calls(), vec!["ensure_schema"]);
    assert_eq!(gateway.describe(), "recorder");
}

#[test]
fn values_are_passed_through_verbatim() {
    let (recorder, gateway) = gateway(ValidationRules::default());
    gateway.insert(" Ada ", "Physics", " 555").unwrap();
    gateway.update(3, "Ada", "Biology", "").unwrap();
    gateway.find_by_name(" Ada ").unwrap();
    assert_eq!(
        recorder.calls()[1..],
        [
            "insert  Ada |Physics| 555".to_string(),
            "update 3 Ada|Biology|".to_string(),
            "find  Ada ".to_string(),
        ]
    );
}

#[test]
fn stale_ids_succeed_silently() {
    let (_recorder, gateway) = gateway(ValidationRules::default());
    assert!(gateway.update(42, "Ada", "Physics", "1").is_ok());
    assert!(gateway.delete(42).is_ok());
}

#[test]
fn validation_failures_issue_no_statement() {
    let rules = ValidationRules {
        name_max_len: 5,
        mobile_max_len: 4,
        mobile_pattern: Some(Regex::new(r"^[0-9]+$").unwrap()),
    };
    let (recorder, gateway) = gateway(rules);

    let cases = [
        ("", "Physics", "1", "Name is required."),
        ("Adelaide", "Physics", "1", "Name must be at most 5 characters."),
        ("Ada", "physics", "1", "\"physics\" is not one of the offered courses."),
        ("Ada", "Physics", "12345", "Mobile must be at most 4 characters."),
        ("Ada", "Physics", "12a", "Mobile does not match the required format (^[0-9]+$)."),
    ];
    for (name, course, mobile, message) in cases {
        let err = gateway.insert(name, course, mobile).unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)), "{err:?}");
        assert_eq!(err.to_string(), message);
        let err = gateway.update(1, name, course, mobile).unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    assert_eq!(recorder.calls(), vec!["ensure_schema"]);
}

#[test]
fn validation_error_is_exposed_as_a_typed_value() {
    let (_recorder, gateway) = gateway(ValidationRules::default());
    match gateway.insert("   ", "Biology", "1") {
        Err(GatewayError::Validation(ValidationError::Empty { field })) => {
            assert_eq!(field, "Name")
        }
        other => panic!("unexpected result: {other:?}"),
    }
}
