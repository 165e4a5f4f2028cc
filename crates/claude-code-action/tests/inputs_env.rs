//! Input reading against the real process environment

use claude_code_action::{ActionConfig, Inputs, get_input};

#[test]
fn test_unset_input_is_empty() {
    temp_env::with_var_unset("INPUT_APIKEY", || {
        assert_eq!(get_input("apiKey"), "");
        assert_eq!(Inputs::from_env().get("apiKey"), "");
    });
}

#[test]
fn test_input_name_is_upper_cased() {
    temp_env::with_var("INPUT_APIKEY", Some("sk-123"), || {
        assert_eq!(get_input("apiKey"), "sk-123");
        assert_eq!(get_input("APIKEY"), "sk-123");
        assert_eq!(get_input("apikey"), "sk-123");
    });
}

#[test]
fn test_input_is_trimmed() {
    temp_env::with_var("INPUT_PROMPT", Some("  \tWrite a haiku\n "), || {
        assert_eq!(get_input("prompt"), "Write a haiku");
        assert_eq!(Inputs::from_env().get("prompt"), "Write a haiku");
    });
}

#[test]
fn test_whitespace_only_input_is_empty() {
    temp_env::with_var("INPUT_MODEL", Some("   "), || {
        assert_eq!(get_input("model"), "");
        assert_eq!(Inputs::from_env().get_optional("model"), None);
    });
}

#[test]
fn test_config_from_environment() {
    temp_env::with_vars(
        [
            ("INPUT_PROMPT", Some("Summarize the diff")),
            ("INPUT_MAXTURNS", Some("5")),
            ("INPUT_ALLOWEDTOOLS", Some("Read,Grep")),
            ("INPUT_PERMISSIONMODE", Some("plan")),
        ],
        || {
            let config = ActionConfig::from_inputs(&Inputs::from_env()).unwrap();
            assert_eq!(config.prompt, "Summarize the diff");
            assert_eq!(config.max_turns, Some(5));
            assert_eq!(config.allowed_tools, vec!["Read", "Grep"]);
            assert_eq!(config.permission_mode.as_str(), "plan");
        },
    );
}
