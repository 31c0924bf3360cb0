/// Factory: build the `Authorizer` from application `Config`.
use std::sync::Arc;

use crate::config::AuthSettings;
use crate::services::auth::Authorizer;
use crate::services::auth::jwks::{HttpKeySource, KeySetError, KeySource};

pub fn build_authorizer(settings: &AuthSettings) -> Result<Arc<Authorizer>, KeySetError> {
    let source = HttpKeySource::new(&settings.domain, settings.jwks_timeout)?;

    tracing::info!(
        jwks = source.location(),
        audience = %settings.audience,
        algorithms = ?settings.algorithms,
        cache_ttl = ?settings.jwks_cache_ttl,
        min_refresh = ?settings.jwks_min_refresh,
        "authorizer configured"
    );

    Ok(Arc::new(Authorizer::new(settings, Arc::new(source))))
}
