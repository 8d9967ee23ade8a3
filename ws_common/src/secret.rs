use std::fmt;

/// Wrapper for sensitive values such as the admin API key.
///
/// Both `Debug` and `Display` render a mask, so a `Secret` can sit inside a logged config struct without leaking.
/// Reading the raw value requires an explicit [`Secret::reveal`] call, which keeps every use grep-able.
#[derive(Clone, Default)]
pub struct Secret<T>(T);

impl<T> Secret<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    pub fn reveal(&self) -> &T {
        &self.0
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(****)")
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}
