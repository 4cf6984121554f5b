/// Sites monitored when neither the command line nor the config file names any.
pub const DEFAULT_SITES: [&str; 10] = [
    "https://www.google.com",
    "https://www.youtube.com",
    "https://www.facebook.com",
    "https://www.instagram.com",
    "https://chat.openai.com",
    "https://www.x.com",
    "https://www.reddit.com",
    "https://www.whatsapp.com",
    "https://www.bing.com",
    "https://www.wikipedia.org",
];

pub const DEFAULT_LISTEN: &str = "127.0.0.1:3000";
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";

const DEFAULT_DB_FILE: &str = "sitemonitor.db";
const DEFAULT_LOG_FILE: &str = "sitewatch.log";

pub(crate) fn default_db_path() -> String {
    DEFAULT_DB_FILE.to_owned()
}

pub(crate) fn default_log_path() -> String {
    DEFAULT_LOG_FILE.to_owned()
}

pub(crate) fn default_sites() -> Vec<String> {
    DEFAULT_SITES.iter().map(|site| (*site).to_owned()).collect()
}
