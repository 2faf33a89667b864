use std::env;

/// Reads a boolean flag from the environment, falling back to `default` when the variable is
/// absent or holds something unrecognisable.
pub fn env_flag(var: &str, default: bool) -> bool {
    let value = match env::var(var) {
        Ok(v) => v,
        Err(_) => return default,
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

#[cfg(test)]
mod test {
    use super::env_flag;

    #[test]
    fn boolean_flags() {
        std::env::set_var("MPG_TEST_FLAG_A", "TRUE");
        std::env::set_var("MPG_TEST_FLAG_B", " off ");
        std::env::set_var("MPG_TEST_FLAG_C", "banana");
        assert!(env_flag("MPG_TEST_FLAG_A", false));
        assert!(!env_flag("MPG_TEST_FLAG_B", true));
        assert!(!env_flag("MPG_TEST_FLAG_C", false));
        assert!(env_flag("MPG_TEST_FLAG_UNSET", true));
    }
}
