//! Default values for optional config fields.

pub const DEFAULT_ROUTE: &str = "/interactions";

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

pub const DEFAULT_PORT: u16 = 8080;

pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const DEFAULT_LOG_DIR: &str = "logs";

pub const DEFAULT_NOT_FOUND_MESSAGE: &str = "command not implemented!";

pub const DEFAULT_CHECK_FAILED_MESSAGE: &str = "You cannot use this interaction.";

pub const DEFAULT_ERROR_MESSAGE: &str = "Something went wrong while handling this interaction.";

pub(crate) fn route() -> String {
    DEFAULT_ROUTE.to_string()
}

pub(crate) fn bind_address() -> String {
    DEFAULT_BIND_ADDRESS.to_string()
}

pub(crate) fn port() -> u16 {
    DEFAULT_PORT
}

pub(crate) fn api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

pub(crate) fn log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

pub(crate) fn log_dir() -> String {
    DEFAULT_LOG_DIR.to_string()
}

pub(crate) fn enabled() -> bool {
    true
}

pub(crate) fn not_found_message() -> String {
    DEFAULT_NOT_FOUND_MESSAGE.to_string()
}

pub(crate) fn check_failed_message() -> String {
    DEFAULT_CHECK_FAILED_MESSAGE.to_string()
}

pub(crate) fn error_message() -> String {
    DEFAULT_ERROR_MESSAGE.to_string()
}
