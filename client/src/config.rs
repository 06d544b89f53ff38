use crate::error::ClientError;
use std::env;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_SITE_URL: &str = "http://localhost:5173";
pub const DEFAULT_PAGE_SIZE: usize = 6;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Collaborator base URL, always with a trailing slash so relative
    /// joins keep any path prefix.
    pub api_url: Url,
    /// Public origin of the front-end; share links point here.
    pub site_url: Url,
    pub page_size: usize,
}

impl ClientConfig {
    /// Reads `BLOG_API_URL`, `BLOG_SITE_URL` and `BLOG_PAGE_SIZE`, after
    /// loading a `.env` file if one exists.
    pub fn from_env() -> Result<Self, ClientError> {
        dotenvy::dotenv().ok();

        let api_url = env::var("BLOG_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let site_url = env::var("BLOG_SITE_URL").unwrap_or_else(|_| DEFAULT_SITE_URL.into());
        let page_size = match env::var("BLOG_PAGE_SIZE") {
            Ok(raw) => raw
                .parse()
                .ok()
                .filter(|n: &usize| *n > 0)
                .ok_or_else(|| ClientError::Validation(format!("Invalid BLOG_PAGE_SIZE: {raw}")))?,
            Err(_) => DEFAULT_PAGE_SIZE,
        };

        Self::new(&api_url, &site_url, page_size)
    }

    pub fn new(api_url: &str, site_url: &str, page_size: usize) -> Result<Self, ClientError> {
        Ok(Self {
            api_url: with_trailing_slash(api_url)?,
            site_url: with_trailing_slash(site_url)?,
            page_size: page_size.max(1),
        })
    }
}

fn with_trailing_slash(raw: &str) -> Result<Url, ClientError> {
    let raw = raw.trim();
    if raw.ends_with('/') {
        Ok(Url::parse(raw)?)
    } else {
        Ok(Url::parse(&format!("{raw}/"))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_urls_keep_their_path_prefix() {
        let config = ClientConfig::new("http://host:8080/api", "https://blog.example", 4).unwrap();

        assert_eq!(config.api_url.join("posts").unwrap().as_str(), "http://host:8080/api/posts");
        assert_eq!(config.site_url.as_str(), "https://blog.example/");
    }

    #[test]
    fn bad_url_is_rejected() {
        assert!(ClientConfig::new("not a url", DEFAULT_SITE_URL, 6).is_err());
    }
}
