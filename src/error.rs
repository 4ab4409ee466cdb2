//! src/error.rs
use std::fmt;

/// Writes `e` followed by its `source()` chain, one numbered cause per line.
/// Used as the `Debug` impl of the crate's error types so that `main`
/// returning an error prints the whole story.
pub fn error_chain_fmt(f: &mut fmt::Formatter<'_>, e: &impl std::error::Error) -> fmt::Result {
    write!(f, "{e}")?;
    let causes = std::iter::successors(e.source(), |cause| cause.source());
    for (depth, cause) in causes.enumerate() {
        write!(f, "\n  {}: {cause}", depth + 1)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::error_chain_fmt;

    #[derive(thiserror::Error)]
    #[error("report channel broke")]
    struct Outer(#[source] Middle);

    #[derive(thiserror::Error, Debug)]
    #[error("write failed")]
    struct Middle(#[source] std::io::Error);

    impl std::fmt::Debug for Outer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            error_chain_fmt(f, self)
        }
    }

    #[test]
    fn should_number_every_cause_in_the_chain() {
        let err = Outer(Middle(std::io::Error::other("pipe closed")));
        assert_eq!(
            format!("{err:?}"),
            "report channel broke\n  1: write failed\n  2: pipe closed"
        );
    }

    #[test]
    fn should_print_just_the_message_without_causes() {
        let err = crate::counter::CountError::WorkerPanicked { index: 2 };
        assert_eq!(format!("{err:?}"), "Counting worker 2 panicked");
    }
}
