//! Backend origin resolution.
//!
//! The only environment-sensitive logic of the console: which origin request
//! paths resolve against. A development build talks to the local development
//! server; any other build talks to the origin the console was pointed at.
//! Both defaults can be replaced at build time.

/// Development backend origin, overridable at build time through
/// `ONLYCONFIG_DEV_ORIGIN`.
pub const DEV_ORIGIN: &str = match option_env!("ONLYCONFIG_DEV_ORIGIN") {
    Some(origin) => origin,
    None => "http://localhost:8880",
};

/// Default page origin, overridable at build time through
/// `ONLYCONFIG_API_ORIGIN` and at run time through `--addr`.
pub const PAGE_ORIGIN: &str = match option_env!("ONLYCONFIG_API_ORIGIN") {
    Some(origin) => origin,
    None => "http://127.0.0.1:8880",
};

/// Build configuration the console was compiled under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildProfile {
    /// Debug build; requests go to [`DEV_ORIGIN`].
    Development,
    /// Release build; requests go to the page origin.
    Production,
}

impl BuildProfile {
    /// Profile of the running binary.
    pub const fn current() -> Self {
        if cfg!(debug_assertions) {
            Self::Development
        } else {
            Self::Production
        }
    }
}

/// A resolved backend origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoint {
    origin: String,
}

impl ApiEndpoint {
    /// Use `origin` as-is. A trailing `/` is dropped.
    pub fn new(origin: impl Into<String>) -> Self {
        let origin = origin.into();
        Self {
            origin: origin.trim_end_matches('/').to_owned(),
        }
    }

    /// Pick the origin for `profile`: [`DEV_ORIGIN`] in development,
    /// `page_origin` otherwise.
    pub fn for_profile(profile: BuildProfile, page_origin: &str) -> Self {
        match profile {
            BuildProfile::Development => Self::new(DEV_ORIGIN),
            BuildProfile::Production => Self::new(page_origin),
        }
    }

    /// The origin requests resolve against.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Absolute URL for `path`, with the leading `/` enforced exactly once.
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.origin)
        } else {
            format!("{}/{path}", self.origin)
        }
    }
}
