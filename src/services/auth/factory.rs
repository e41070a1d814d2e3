/// Factory: build `AccessJwt` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::AccessJwt;

pub fn build_access_jwt(config: &Config) -> Arc<AccessJwt> {
    Arc::new(AccessJwt::new(
        config.access_token_secret.as_bytes(),
        config.access_token_ttl_seconds,
        config.access_token_leeway_seconds,
    ))
}
