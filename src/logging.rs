//! Helper macro enforcing consistent readiness log fields.
//!
//! Keeps the `composite` (and optionally `resource`) correlation fields present on every
//! log emitted while a snapshot is evaluated so downstream parsing can rely on them.

/// Log an event for a composite/composed-resource pair plus any extra fields.
#[macro_export]
macro_rules! readiness_event {
    ($level:ident, $event:expr, composite = $composite:expr, resource = $resource:expr $(, $field:ident = $value:expr )* $(,)?) => {
        tracing::$level!(
            event = $event,
            composite = %$composite,
            resource = %$resource,
            $($field = %$value,)*
        )
    };
    ($level:ident, $event:expr, composite = $composite:expr $(, $field:ident = $value:expr )* $(,)?) => {
        tracing::$level!(
            event = $event,
            composite = %$composite,
            $($field = %$value,)*
        )
    };
}
