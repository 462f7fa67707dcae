mod extract;

pub use extract::{API_KEY_HEADER, AuthError, OptionalUser, RequireUser};
