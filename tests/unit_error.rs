/// Unit tests for DiError, SourceError and Diagnostic rendering

use simple_di::{DiError, DiResult, Provider, ServiceCollection, SourceError};
use std::error::Error;
use std::path::PathBuf;

#[test]
fn test_error_display_not_found() {
    let error = DiError::NotFound("Clock".to_string());
    assert_eq!(error.to_string(), "No providers registered with name Clock");
}

#[test]
fn test_error_display_ambiguous() {
    let error = DiError::Ambiguous {
        name: "Plugin".to_string(),
        count: 3,
    };
    assert_eq!(
        error.to_string(),
        "More than one provider registered with name Plugin (3 found)"
    );
}

#[test]
fn test_error_display_redeclared() {
    let error = DiError::Redeclared("MyClass".to_string());
    assert_eq!(error.to_string(), "Cannot redefine depends of MyClass");
}

#[test]
fn test_error_display_unknown_provider() {
    let mut sc = ServiceCollection::new();
    let id = sc.add_provider(Provider::new("A", |_| ()));
    let error = DiError::UnknownProvider(id);
    assert_eq!(error.to_string(), "Unknown provider handle #0");
}

#[test]
fn test_error_display_type_mismatch() {
    let error = DiError::TypeMismatch {
        provider: "Clock".to_string(),
        expected: "alloc::string::String",
    };
    assert_eq!(
        error.to_string(),
        "Type mismatch for Clock: expected alloc::string::String"
    );
}

#[test]
fn test_error_display_invalid_cardinality() {
    let error = DiError::InvalidCardinality("many".to_string());
    assert_eq!(
        error.to_string(),
        "Invalid cardinality `many`, expected `single` or `multiple`"
    );
}

#[test]
fn test_error_is_std_error() {
    let error: Box<dyn Error + Send + Sync> = Box::new(DiError::Redeclared("Db".to_string()));
    assert_eq!(error.to_string(), "Cannot redefine depends of Db");
    assert!(error.source().is_none());
}

#[test]
fn test_di_result_propagates() {
    fn lookup(found: bool) -> DiResult<u8> {
        if found {
            Ok(1)
        } else {
            Err(DiError::NotFound("X".to_string()))
        }
    }

    fn wrapper(found: bool) -> DiResult<u8> {
        let value = lookup(found)?;
        Ok(value + 1)
    }

    assert_eq!(wrapper(true), Ok(2));
    assert_eq!(wrapper(false), Err(DiError::NotFound("X".to_string())));
}

#[test]
fn test_source_error_classification() {
    let invalid = SourceError::InvalidServiceNames {
        path: PathBuf::from("services/clock.json"),
        class: "Clock".to_string(),
    };
    assert!(invalid.is_reportable());
    assert!(invalid.to_string().starts_with("Cannot add Clock to DI container."));

    let unknown = SourceError::UnknownFactory {
        path: PathBuf::from("services/clock.json"),
        class: "Clock".to_string(),
    };
    assert!(!unknown.is_reportable());

    let io = SourceError::Io {
        path: PathBuf::from("services/clock.json"),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
    };
    assert!(!io.is_reportable());
    assert_eq!(io.origin(), PathBuf::from("services/clock.json").display().to_string());
    assert!(io.source().is_some());
}
