//! Configuration access port trait.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;

    /// All `key = value` entries of `section` in file order; empty when absent.
    fn get_section(&self, section: &str) -> Vec<(String, String)>;
}
