/// Intercept messages using the `log` crate and print them to STDERR, filtered
/// by the RUST_LOG environment variable. Defaults to "info".
pub fn setup() {
    use env_logger::{Builder, Env};
    Builder::from_env(Env::default().default_filter_or("info")).init();
}
