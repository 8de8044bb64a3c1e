use ptf_derive::ptf_error;
use std::borrow::Cow;

#[ptf_error]
pub enum ProbeError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Index {index} is stale{}", format_context(.context))]
    Stale { index: u32, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read_probe() -> Result<(), std::io::Error> {
    Err(std::io::Error::other("bus timeout"))
}

#[test]
fn source_errors_convert_with_context() {
    let err = read_probe().context("reading probe").expect_err("probe read must fail");
    assert_eq!(err.kind(), "Io");
    assert_eq!(err.to_string(), "IO error (reading probe): bus timeout");
}

#[test]
fn question_mark_uses_from_conversion() {
    fn run() -> Result<(), ProbeError> {
        read_probe()?;
        Ok(())
    }

    let err = run().expect_err("probe read must fail");
    assert!(matches!(err, ProbeError::Io { context: None, .. }));
}

#[test]
fn context_is_attached_to_existing_errors() {
    let result: Result<(), ProbeError> = Err(ProbeError::Stale { index: 7, context: None });
    let err = result.context("policy fan-out").expect_err("must stay an error");
    assert_eq!(err.kind(), "Stale");
    assert_eq!(err.to_string(), "Index 7 is stale (policy fan-out)");
}

#[test]
fn internal_variant_accepts_strings() {
    let from_static: ProbeError = "static message".into();
    let from_owned: ProbeError = format!("owned {}", 1).into();

    assert_eq!(from_static.kind(), "Internal");
    assert_eq!(from_owned.to_string(), "Internal error: owned 1");
}
