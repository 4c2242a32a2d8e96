//! Cross-cutting helpers shared by the workspace crates:
//! tracing bootstrap, the health payload and startup sanity checks.

pub mod types;
pub mod utils;
pub mod env;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health::ok();
        assert_eq!(h.status, "ok");
    }

    #[test]
    fn health_serializes_status() {
        let v = serde_json::to_value(types::Health::ok()).unwrap();
        assert_eq!(v["status"], "ok");
        assert!(v["version"].is_string());
    }
}
