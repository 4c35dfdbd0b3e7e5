use crate::PaginationError;
use log::warn;

/// Collects internal invariant violations.
///
/// In strict mode the first violation aborts the run. Otherwise it is logged
/// and kept for the caller, and pagination continues on a best-effort basis.
#[derive(Debug, Clone, Default)]
pub struct Assertions {
    strict: bool,
    failures: Vec<String>,
}

impl Assertions {
    pub fn new(strict: bool) -> Self {
        Self {
            strict,
            failures: Vec::new(),
        }
    }

    pub fn check(
        &mut self,
        condition: bool,
        message: impl FnOnce() -> String,
    ) -> Result<(), PaginationError> {
        if condition {
            return Ok(());
        }
        self.report(PaginationError::Assertion(message()))
    }

    pub fn report(&mut self, error: PaginationError) -> Result<(), PaginationError> {
        let message = error.to_string();
        self.failures.push(message.clone());
        if self.strict {
            return Err(error);
        }
        warn!("{}", message);
        Ok(())
    }

    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<String> {
        self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permissive_mode_records_and_continues() {
        let mut assertions = Assertions::new(false);
        assert!(assertions.check(true, || unreachable!()).is_ok());
        assert!(assertions.check(false, || "bad".into()).is_ok());
        assert_eq!(assertions.failures().len(), 1);
        assert!(assertions.failures()[0].contains("bad"));
    }

    #[test]
    fn strict_mode_fails_fast() {
        let mut assertions = Assertions::new(true);
        let result = assertions.report(PaginationError::MissingAncestor);
        assert!(matches!(result, Err(PaginationError::MissingAncestor)));
    }
}
