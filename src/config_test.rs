use super::*;

#[test]
fn auth_config_defaults_match_login_redirect_contract() {
    let config = AuthConfig::default();
    assert_eq!(config.storage_key, "token");
    assert_eq!(config.token_param, "token");
    assert_eq!(config.expiration_param, "expiration");
    assert_eq!(config.self_user_id, "@me");
}

#[test]
fn api_config_new_trims_trailing_slashes() {
    let config = ApiConfig::new("https://api.test//", "2022");
    assert_eq!(config.base_url, "https://api.test");
    assert_eq!(config.event_id, "2022");
}

#[test]
fn api_config_default_has_no_trailing_slash() {
    let config = ApiConfig::default();
    assert!(!config.base_url.is_empty());
    assert!(!config.base_url.ends_with('/'));
    assert!(!config.event_id.is_empty());
}
