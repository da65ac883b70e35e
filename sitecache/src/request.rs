//! Intercepted request model.

use std::fmt;

/// HTTP method of an intercepted request.
///
/// Only GET requests are ever served from cache; everything else passes
/// through uninspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Patch,
    Options,
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestMethod::Get => "GET",
            RequestMethod::Head => "HEAD",
            RequestMethod::Post => "POST",
            RequestMethod::Put => "PUT",
            RequestMethod::Delete => "DELETE",
            RequestMethod::Patch => "PATCH",
            RequestMethod::Options => "OPTIONS",
        };
        f.write_str(name)
    }
}

/// Whether the request loads a page (navigation) or a subresource.
///
/// The offline fallback page is only ever served for navigations; failed
/// subresources propagate their failure instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    Navigate,
    Resource,
}

/// A request passing through the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    url: String,
    method: RequestMethod,
    mode: RequestMode,
}

impl FetchRequest {
    /// Create a request with explicit method and mode.
    pub fn new(url: impl Into<String>, method: RequestMethod, mode: RequestMode) -> Self {
        Self {
            url: url.into(),
            method,
            mode,
        }
    }

    /// A GET subresource request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(url, RequestMethod::Get, RequestMode::Resource)
    }

    /// A GET navigation request.
    pub fn navigate(url: impl Into<String>) -> Self {
        Self::new(url, RequestMethod::Get, RequestMode::Navigate)
    }

    /// The request URL (absolute, or a same-origin path).
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The request method.
    pub fn method(&self) -> RequestMethod {
        self.method
    }

    /// The request mode.
    pub fn mode(&self) -> RequestMode {
        self.mode
    }

    /// Whether this is a page navigation.
    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_constructor_defaults() {
        let request = FetchRequest::get("/index.html");
        assert_eq!(request.url(), "/index.html");
        assert_eq!(request.method(), RequestMethod::Get);
        assert_eq!(request.mode(), RequestMode::Resource);
        assert!(!request.is_navigation());
    }

    #[test]
    fn test_navigate_constructor() {
        let request = FetchRequest::navigate("https://site.test/");
        assert!(request.is_navigation());
        assert_eq!(request.method(), RequestMethod::Get);
    }

    #[test]
    fn test_method_display() {
        assert_eq!(RequestMethod::Get.to_string(), "GET");
        assert_eq!(RequestMethod::Post.to_string(), "POST");
    }
}
