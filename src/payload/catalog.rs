//! Fixed pools the synthesizer draws from.

pub const PAGES: &[&str] = &[
    "/",
    "/features",
    "/pricing",
    "/blog/post-1",
    "/blog/post-2",
    "/contact",
    "/app/dashboard",
    "/app/settings",
];

/// `None` is direct traffic (no referrer)
pub const REFERRERS: &[Option<&str>] = &[
    Some("https://google.com"),
    Some("https://twitter.com"),
    Some("https://linkedin.com"),
    Some("https://yandex.ru"),
    None,
];

/// Wire value for direct traffic in the flat schema
pub const DIRECT_REFERRER: &str = "direct";

pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 14_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Linux; Android 10; SM-A505FN) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.120 Mobile Safari/537.36",
];

pub const LOCALES: &[&str] = &["en-US", "ru-RU", "de-DE", "es-ES"];
