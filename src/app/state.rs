use crate::{auth::jwt::JwtConfig, repositories::Store};

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub jwt_config: JwtConfig,
}

impl AppState {
    pub fn new(store: Store, jwt_config: JwtConfig) -> Self {
        Self { store, jwt_config }
    }
}
