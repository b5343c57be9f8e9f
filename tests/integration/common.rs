use chatter_sf_api::rest::Chatter;

/// Connect to the org named by `SF_AUTH_URL`.
///
/// Panics with a hint when the variable is missing or malformed; these
/// tests are only meant to run against a real org.
pub async fn connect() -> Chatter {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let auth_url = match std::env::var("SF_AUTH_URL") {
        Ok(url) if !url.is_empty() => url,
        _ => panic!(
            "SF_AUTH_URL is not set. Get one with `sf org display --verbose` \
             and export the 'Sfdx Auth Url' value."
        ),
    };

    if !auth_url.starts_with("force://") {
        panic!("SF_AUTH_URL must start with force://");
    }

    Chatter::from_sfdx_auth_url(&auth_url)
        .await
        .expect("Failed to connect with SF_AUTH_URL")
}
