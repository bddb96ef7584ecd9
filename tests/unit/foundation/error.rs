use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        RasterError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        RasterError::backend("x")
            .to_string()
            .contains("backend error:")
    );
    assert!(
        RasterError::config("x")
            .to_string()
            .contains("config error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("disk gone");
    let err = RasterError::Other(anyhow::Error::new(base));
    assert_eq!(err.to_string(), "disk gone");
}

#[test]
fn anyhow_converts_with_question_mark() {
    fn inner() -> RasterResult<()> {
        Err(anyhow::anyhow!("wrapped"))?;
        Ok(())
    }
    assert!(matches!(inner(), Err(RasterError::Other(_))));
}
