//! Property tests for token encoding and the login form.

use proptest::prelude::*;

use oauth_key_bridge::server::oauth::login::render_api_key_form;
use oauth_key_bridge::server::oauth::{Claims, TokenCodec};

proptest! {
    #[test]
    fn codec_recovers_claims(api_key in "\\PC{1,64}", path in "[a-z0-9/]{0,32}") {
        let codec = TokenCodec::new(b"proptest-secret");
        let claims = Claims::authorization_code(api_key.clone(), format!("https://c.example/{path}"));

        let token = codec.encode(&claims).unwrap();
        let decoded = codec.decode(&token).unwrap();

        prop_assert_eq!(decoded, claims);
    }

    #[test]
    fn other_secret_never_decodes(api_key in "[a-zA-Z0-9_-]{1,40}", secret in "[a-z]{8,16}") {
        prop_assume!(secret != "proptest-secret");
        let token = TokenCodec::new(b"proptest-secret").encode(&Claims::access_token(api_key)).unwrap();

        prop_assert!(TokenCodec::new(secret.as_bytes()).decode(&token).is_err());
    }

    #[test]
    fn form_never_emits_raw_markup(name in "\\PC{0,40}", state in "\\PC{0,40}") {
        let html = render_api_key_form(&format!("<b>{name}"), "id", "https://c/cb", Some(&format!("\"{state}")), None);

        prop_assert!(!html.contains("<b>"));
        let raw_state_attr = format!("value=\"\"{state}");
        prop_assert!(!html.contains(&raw_state_attr));
    }
}
