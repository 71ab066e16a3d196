use fes_core::errors::{ErrorInfo, FesError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("path", "smd1/colvar")
        .with_context("line", "7")
}

#[test]
fn parse_error_surface() {
    let err = FesError::Parse(sample_info("colvar_number", "invalid float"));
    assert_eq!(err.info().code, "colvar_number");
    assert!(err.info().context.contains_key("path"));
    let rendered = err.to_string();
    assert!(rendered.starts_with("parse error: invalid float (code: colvar_number)"));
    assert!(rendered.contains("line=7"));
}

#[test]
fn fit_error_surface_with_hint() {
    let err = FesError::Fit(
        ErrorInfo::new("krr_singular", "kernel system is singular").with_hint("increase alpha"),
    );
    assert_eq!(err.info().hint.as_deref(), Some("increase alpha"));
    assert!(err.to_string().ends_with("| hint: increase alpha"));
}

#[test]
fn shape_helper_records_lengths() {
    let err = FesError::shape("stack_len", "curve", 3000, 2999);
    match &err {
        FesError::Shape(info) => {
            assert_eq!(info.context["expected"], "3000");
            assert_eq!(info.context["found"], "2999");
        }
        other => panic!("unexpected variant {other:?}"),
    }
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = FesError::Config(ErrorInfo::new("kt_non_positive", "kT must be positive"));
    let json = serde_json::to_value(&err).expect("serialize");
    assert_eq!(json["family"], "Config");
    assert_eq!(json["detail"]["code"], "kt_non_positive");
    let decoded: FesError = serde_json::from_value(json).expect("deserialize");
    assert_eq!(decoded, err);
}
