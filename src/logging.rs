use std::fmt;

/// Request-scoped logger.
///
/// `RequestLog` is obtained from [`Ctx::log`](crate::Ctx::log) and borrows
/// the context, so every event carries the request id without threading it
/// by hand.
///
/// Credentials are `Secret<String>` and print as `[REDACTED]`, so formatting
/// them here is safe.
#[derive(Debug, Clone, Copy)]
pub struct RequestLog<'a> {
    request_id: &'a str,
    principal_id: Option<&'a str>,
}

impl<'a> RequestLog<'a> {
    pub(crate) fn new(request_id: &'a str, principal_id: Option<&'a str>) -> Self {
        Self {
            request_id,
            principal_id,
        }
    }

    /// Returns the request ID associated with this logger.
    pub fn request_id(&self) -> &str {
        self.request_id
    }

    /// Logs an info-level message.
    ///
    /// ```no_run
    /// # use client_projects::RequestLog;
    /// # fn example(log: RequestLog<'_>) {
    /// log.info(format_args!("listing {} projects", 3));
    /// # }
    /// ```
    pub fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(request_id = %self.request_id, principal = ?self.principal_id, "{}", args);
    }

    /// Logs a warning-level message.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(request_id = %self.request_id, principal = ?self.principal_id, "{}", args);
    }

    /// Logs an error-level message.
    pub fn error(&self, args: fmt::Arguments<'_>) {
        tracing::error!(request_id = %self.request_id, principal = ?self.principal_id, "{}", args);
    }

    /// Logs a debug-level message.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(request_id = %self.request_id, principal = ?self.principal_id, "{}", args);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_log_carries_ids() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let log = RequestLog::new("req-9", Some("read-only"));
        assert_eq!(log.request_id(), "req-9");

        log.info(format_args!("info {}", 1));
        log.warn(format_args!("warn {}", 2));
        log.debug(format_args!("debug {}", 3));
        log.error(format_args!("error {}", 4));
    }
}
