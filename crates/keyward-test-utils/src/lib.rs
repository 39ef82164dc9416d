pub mod assertions;
pub mod server;
pub mod stores;

pub use assertions::{assert_api_error, assert_api_ok};
pub use server::{
    TEST_ADMIN_PASSWORD, create_test_app_state, create_test_config, create_test_router,
    create_test_router_and_stores, login_via_api, send_request,
};
pub use stores::{TestStores, create_test_stores};

#[cfg(test)]
mod tests {
    use super::*;
    use keyward_core::CodeStore;

    #[tokio::test]
    async fn test_stores_are_usable() {
        let stores = create_test_stores().await;

        // Verify we can query an empty code store
        let result = stores.code_store.list_codes().await.unwrap();
        assert!(result.is_empty());
    }
}
