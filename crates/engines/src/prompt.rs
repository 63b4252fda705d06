use forms::FormError;
use gateway::Message;
use serde::de::DeserializeOwned;

/// One use-case of the structured pipeline: a fixed system instruction plus a
/// user message built from the caller's fields.
pub trait UseCase {
    /// Function name clients invoke, also used in logs and metrics.
    const NAME: &'static str;

    type Request: DeserializeOwned + Send + Sync;

    fn validate(request: &Self::Request) -> Result<(), FormError>;

    fn system_prompt() -> &'static str;

    fn user_message(request: &Self::Request) -> String;
}

/// The two-message exchange sent to the gateway.
pub fn build_exchange<U: UseCase>(request: &U::Request) -> Vec<Message> {
    vec![
        Message::system(U::system_prompt()),
        Message::user(U::user_message(request)),
    ]
}

/// `value` unless blank, in which case `default`.
pub(crate) fn or_default<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(default)
}
